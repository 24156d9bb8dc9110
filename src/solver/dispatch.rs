use super::question::Question;
use crate::error::DispatchError;
use crate::providers::{MessageRequest, MessageStream, Provider, ServerTool};

const PROMPT_TEMPLATE: &str = "Solve this math problem using code execution:

Problem: {question}

Please:
1. Solve the problem with actual Python code
2. Create visualizations using matplotlib if helpful
3. Save any plots as PNG files using plt.savefig()
4. Show your calculations step by step
5. Use descriptive filenames for saved plots

Execute Python code to solve this problem.";

/// Wrap the question in the fixed solving instruction.
pub fn build_prompt(question: &Question) -> String {
    PROMPT_TEMPLATE.replace("{question}", question.text())
}

pub fn build_request(question: &Question, model: &str, max_tokens: u32) -> MessageRequest {
    MessageRequest {
        model: model.to_string(),
        max_tokens,
        prompt: build_prompt(question),
        tools: vec![ServerTool::code_execution()],
    }
}

/// Open the streaming exchange. Nothing is retained on failure.
pub async fn dispatch(
    provider: &dyn Provider,
    question: &Question,
    model: &str,
    max_tokens: u32,
) -> Result<MessageStream, DispatchError> {
    let request = build_request(question, model, max_tokens);
    tracing::debug!(
        ordinal = question.ordinal(),
        model,
        prompt_chars = request.prompt.len(),
        "opening exchange"
    );
    provider
        .stream_message(request)
        .await
        .map_err(|e| DispatchError::Open(format!("{e:#}")))
}
