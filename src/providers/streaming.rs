use crate::providers::response::{ComposedResponse, ContentBlock, StopReason, Usage};
use crate::ui::style;
use anyhow::{Result, bail};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

pub type ProviderStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send + 'static>>;

/// One decoded server-sent event of a streaming exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart {
        message: MessageStartBody,
    },
    ContentBlockStart {
        index: usize,
        content_block: ContentBlock,
    },
    ContentBlockDelta {
        index: usize,
        delta: BlockDelta,
    },
    ContentBlockStop {
        index: usize,
    },
    MessageDelta {
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Option<DeltaUsage>,
    },
    MessageStop,
    Ping,
    Error {
        error: StreamErrorBody,
    },
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Decode one `data:` payload. A server-side `error` event is surfaced as
    /// an `Err` so the exchange aborts like a transport failure would.
    pub fn decode(data: &str) -> Result<Self> {
        let event: Self = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("malformed stream event: {e}"))?;
        if let Self::Error { error } = &event {
            bail!("stream error ({}): {}", error.kind, error.message);
        }
        Ok(event)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageStartBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDelta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageDeltaBody {
    #[serde(default)]
    pub stop_reason: Option<StopReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeltaUsage {
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamErrorBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

// ─── Accumulation ───────────────────────────────────────────────────────────

/// Builds the composed message from stream events, the way the service
/// itself would have returned it from a non-streaming call.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    started: bool,
    stopped: bool,
    id: Option<String>,
    model: Option<String>,
    blocks: Vec<ContentBlock>,
    partial_inputs: HashMap<usize, String>,
    stop_reason: Option<StopReason>,
    usage: Usage,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the message. Blocks are numbered densely, so a
    /// block start that skips past the next free slot is an error.
    pub fn feed(&mut self, event: &StreamEvent) -> Result<()> {
        match event {
            StreamEvent::MessageStart { message } => {
                self.started = true;
                self.id.clone_from(&message.id);
                self.model.clone_from(&message.model);
                if let Some(usage) = message.usage {
                    self.usage = usage;
                }
            }
            StreamEvent::ContentBlockStart {
                index,
                content_block,
            } => {
                let next = self.blocks.len();
                match (*index).cmp(&next) {
                    Ordering::Less => self.blocks[*index] = content_block.clone(),
                    Ordering::Equal => self.blocks.push(content_block.clone()),
                    Ordering::Greater => {
                        bail!("content_block_start index {index} skips ahead of block {next}")
                    }
                }
            }
            StreamEvent::ContentBlockDelta { index, delta } => match delta {
                BlockDelta::TextDelta { text } => {
                    if let Some(ContentBlock::Text { text: existing }) = self.blocks.get_mut(*index)
                    {
                        existing.push_str(text);
                    } else {
                        tracing::debug!(index, "text delta for a non-text block; dropped");
                    }
                }
                BlockDelta::InputJsonDelta { partial_json } => {
                    self.partial_inputs
                        .entry(*index)
                        .or_default()
                        .push_str(partial_json);
                }
                BlockDelta::Other => {}
            },
            StreamEvent::ContentBlockStop { index } => self.close_block(*index),
            StreamEvent::MessageDelta { delta, usage } => {
                if delta.stop_reason.is_some() {
                    self.stop_reason.clone_from(&delta.stop_reason);
                }
                if let Some(usage) = usage {
                    self.usage.output_tokens = usage.output_tokens;
                }
            }
            StreamEvent::MessageStop => self.stopped = true,
            StreamEvent::Ping | StreamEvent::Error { .. } | StreamEvent::Unknown => {}
        }
        Ok(())
    }

    fn close_block(&mut self, index: usize) {
        let Some(partial) = self.partial_inputs.remove(&index) else {
            return;
        };
        let Some(ContentBlock::ServerToolUse { id, name, input }) = self.blocks.get_mut(index)
        else {
            return;
        };
        if partial.trim().is_empty() {
            return;
        }
        match serde_json::from_str::<serde_json::Value>(&partial) {
            Ok(parsed) => *input = parsed,
            Err(error) => {
                tracing::warn!(
                    tool_id = %id,
                    tool_name = %name,
                    "Skipping malformed streamed tool input JSON: {error}"
                );
            }
        }
    }

    pub fn finish(mut self) -> Result<ComposedResponse> {
        if !self.started {
            bail!("stream closed before message_start");
        }
        if !self.stopped {
            tracing::warn!("stream closed without message_stop; using partial message");
        }
        let open: Vec<usize> = self.partial_inputs.keys().copied().collect();
        for index in open {
            self.close_block(index);
        }

        Ok(ComposedResponse {
            id: self.id,
            model: self.model,
            content: self.blocks,
            stop_reason: self.stop_reason,
            usage: self.usage,
        })
    }
}

// ─── Exchange ───────────────────────────────────────────────────────────────

/// An open streaming exchange: the raw event stream joined with the
/// accumulator that composes the final message.
pub struct MessageStream {
    events: ProviderStream,
    accumulator: MessageAccumulator,
}

impl MessageStream {
    pub fn new(events: ProviderStream) -> Self {
        Self {
            events,
            accumulator: MessageAccumulator::new(),
        }
    }

    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        Self::new(Box::pin(futures_util::stream::iter(
            events.into_iter().map(Ok::<_, anyhow::Error>),
        )))
    }

    /// Next event in arrival order; `None` once the stream closes.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent>> {
        let item = self.events.next().await?;
        Some(item.and_then(|event| {
            self.accumulator.feed(&event)?;
            Ok(event)
        }))
    }

    /// Drain whatever is left and return the composed message.
    pub async fn final_message(mut self) -> Result<ComposedResponse> {
        while let Some(item) = self.events.next().await {
            self.accumulator.feed(&item?)?;
        }
        self.accumulator.finish()
    }
}

// ─── Progress sinks ─────────────────────────────────────────────────────────

#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn on_event(&self, event: &StreamEvent);
}

#[derive(Debug, Default)]
pub struct NullStreamSink;

#[async_trait]
impl StreamSink for NullStreamSink {
    async fn on_event(&self, _event: &StreamEvent) {}
}

/// Live progress trace for the terminal: block boundaries, tool names,
/// incremental text and the terminal status, in arrival order.
pub struct CliStreamSink {
    writer: Arc<dyn Fn(&str) + Send + Sync>,
}

impl CliStreamSink {
    pub fn new() -> Self {
        Self {
            writer: Arc::new(|text| {
                use std::io::Write;
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }),
        }
    }

    pub fn with_writer(writer: Arc<dyn Fn(&str) + Send + Sync>) -> Self {
        Self { writer }
    }

    /// The trace fragment for one event, if it produces any output.
    pub fn render(event: &StreamEvent) -> Option<String> {
        match event {
            StreamEvent::ContentBlockStart { content_block, .. } => match content_block {
                ContentBlock::Text { .. } => Some(format!("\n{} ", style::header("📝 Response:"))),
                ContentBlock::ServerToolUse { name, .. } => {
                    Some(format!("\n🔧 Using tool: {}\n", style::yellow(name)))
                }
                ContentBlock::CodeExecutionToolResult { .. } | ContentBlock::Unsupported => None,
            },
            StreamEvent::ContentBlockDelta {
                delta: BlockDelta::TextDelta { text },
                ..
            } => Some(text.clone()),
            StreamEvent::ContentBlockStop { .. } => Some("\n".to_string()),
            StreamEvent::MessageDelta {
                delta:
                    MessageDeltaBody {
                        stop_reason: Some(reason),
                    },
                ..
            } => Some(format!("\n{} {reason}\n", style::success("✅ Completed:"))),
            _ => None,
        }
    }
}

impl Default for CliStreamSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamSink for CliStreamSink {
    async fn on_event(&self, event: &StreamEvent) {
        if let Some(fragment) = Self::render(event) {
            (self.writer)(&fragment);
        }
    }
}
