use crate::providers::{
    api_error, build_solver_client,
    response::FileMetadata,
    sse::{SseBuffer, frame_data},
    streaming::{MessageStream, ProviderStream, StreamEvent},
    traits::{MessageRequest, Provider},
};
use anyhow::{Context, bail};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder};

mod types;
use types::{Message, MessagesRequest};

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Code execution and the files endpoints are both beta surfaces.
const BETA_FEATURES: &str = "code-execution-2025-05-22,files-api-2025-04-14";
const MISSING_KEY: &str = "Anthropic credentials not set. Set ANTHROPIC_API_KEY.";

pub struct AnthropicProvider {
    api_key: Option<String>,
    cached_messages_url: String,
    cached_files_url: String,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<&str>) -> Self {
        Self::with_base_url(api_key, None)
    }

    pub fn with_base_url(api_key: Option<&str>, base_url: Option<&str>) -> Self {
        let base = base_url
            .map_or("https://api.anthropic.com", |u| u.trim_end_matches('/'))
            .to_string();
        Self {
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string),
            cached_messages_url: format!("{base}/v1/messages"),
            cached_files_url: format!("{base}/v1/files"),
            client: build_solver_client(),
        }
    }

    fn build_request(request: MessageRequest) -> MessagesRequest {
        MessagesRequest {
            model: request.model,
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user",
                content: request.prompt,
            }],
            tools: request.tools,
            stream: true,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!(MISSING_KEY))?;
        Ok(builder
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", BETA_FEATURES))
    }

    fn file_url(&self, file_id: &str, suffix: &str) -> anyhow::Result<String> {
        if file_id.is_empty() || file_id.contains(['/', '?', '#']) {
            bail!("invalid file id {file_id:?}");
        }
        Ok(format!("{}/{file_id}{suffix}", self.cached_files_url))
    }
}

/// Turn a raw body stream into decoded events. A transport error, a
/// malformed payload or a server `error` event is yielded once and ends the
/// stream.
pub(crate) fn sse_event_stream<S, B, E>(byte_stream: S) -> ProviderStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut buffer = SseBuffer::new();

        while let Some(chunk) = byte_stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => {
                    yield Err(anyhow::Error::new(error).context("response stream interrupted"));
                    return;
                }
            };
            buffer.push_chunk(chunk.as_ref());

            while let Some(frame) = buffer.next_event_block() {
                if let Some(data) = frame_data(&frame) {
                    let decoded = StreamEvent::decode(&data);
                    let failed = decoded.is_err();
                    yield decoded;
                    if failed {
                        return;
                    }
                }
            }
        }

        if let Some(frame) = buffer.take_remainder()
            && let Some(data) = frame_data(&frame)
        {
            yield StreamEvent::decode(&data);
        }
    };

    Box::pin(stream)
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn stream_message(&self, request: MessageRequest) -> anyhow::Result<MessageStream> {
        let body = Self::build_request(request);
        let response = self
            .authorized(self.client.post(&self.cached_messages_url))?
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("could not reach the messages endpoint")?;

        if !response.status().is_success() {
            return Err(api_error("Messages request", response).await);
        }

        Ok(MessageStream::new(sse_event_stream(response.bytes_stream())))
    }

    async fn file_metadata(&self, file_id: &str) -> anyhow::Result<FileMetadata> {
        let url = self.file_url(file_id, "")?;
        let response = self.authorized(self.client.get(url))?.send().await?;

        if !response.status().is_success() {
            return Err(api_error("File metadata lookup", response).await);
        }

        response
            .json()
            .await
            .context("file metadata response was not valid JSON")
    }

    async fn download_file(&self, file_id: &str) -> anyhow::Result<Vec<u8>> {
        let url = self.file_url(file_id, "/content")?;
        let response = self.authorized(self.client.get(url))?.send().await?;

        if !response.status().is_success() {
            return Err(api_error("File download", response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}
