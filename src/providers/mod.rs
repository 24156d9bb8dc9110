pub mod anthropic;
pub mod http_client;
pub mod response;
pub mod scrub;
pub mod sse;
pub mod streaming;
pub mod traits;

pub use anthropic::AnthropicProvider;
pub use http_client::build_solver_client;
pub use response::{
    ComposedResponse, ContentBlock, FileMetadata, StopReason, ToolResultPayload, Usage,
};
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use streaming::{
    BlockDelta, CliStreamSink, MessageAccumulator, MessageStream, NullStreamSink, ProviderStream,
    StreamEvent, StreamSink,
};
pub use traits::{
    CODE_EXECUTION_TOOL_NAME, CODE_EXECUTION_TOOL_TYPE, MessageRequest, Provider, ServerTool,
};
