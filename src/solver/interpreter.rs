use crate::error::DispatchError;
use crate::providers::{ComposedResponse, MessageStream, StreamSink};

/// Forward every event to `sink` in arrival order, then ask the exchange
/// for the composed message once the stream closes.
pub async fn interpret(
    mut stream: MessageStream,
    sink: &dyn StreamSink,
) -> Result<ComposedResponse, DispatchError> {
    let mut events = 0usize;
    while let Some(item) = stream.next_event().await {
        let event = item.map_err(|e| DispatchError::Stream(format!("{e:#}")))?;
        sink.on_event(&event).await;
        events += 1;
    }
    tracing::debug!(events, "stream closed");

    let message = stream
        .final_message()
        .await
        .map_err(|e| DispatchError::Incomplete(format!("{e:#}")))?;
    tracing::info!(
        blocks = message.content.len(),
        input_tokens = message.usage.input_tokens,
        output_tokens = message.usage.output_tokens,
        stop_reason = ?message.stop_reason,
        "response composed"
    );
    Ok(message)
}
