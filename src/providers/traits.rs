use super::response::FileMetadata;
use super::streaming::MessageStream;
use async_trait::async_trait;
use serde::Serialize;

pub const CODE_EXECUTION_TOOL_NAME: &str = "code_execution";
pub const CODE_EXECUTION_TOOL_TYPE: &str = "code_execution_20250522";

/// A capability the service runs on its own side; declared, never executed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl ServerTool {
    pub fn code_execution() -> Self {
        Self {
            kind: CODE_EXECUTION_TOOL_TYPE.into(),
            name: CODE_EXECUTION_TOOL_NAME.into(),
        }
    }
}

/// A single-turn request: one user message plus the declared server tools.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub prompt: String,
    pub tools: Vec<ServerTool>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Open a streaming exchange. Errors here mean nothing was streamed.
    async fn stream_message(&self, request: MessageRequest) -> anyhow::Result<MessageStream>;

    async fn file_metadata(&self, file_id: &str) -> anyhow::Result<FileMetadata>;

    async fn download_file(&self, file_id: &str) -> anyhow::Result<Vec<u8>>;
}
