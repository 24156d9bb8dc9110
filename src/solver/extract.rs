//! Side-effect-free projections over a composed response.
//!
//! Shape anomalies never escalate: a block that does not look the way a
//! projection expects simply contributes nothing.

use crate::providers::{CODE_EXECUTION_TOOL_NAME, ComposedResponse, ContentBlock, ToolResultPayload};

/// Opaque handle to an artifact held by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileReference {
    pub file_id: String,
}

impl FileReference {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
        }
    }
}

/// Every file produced by code execution, in order of appearance.
/// Duplicates are kept.
pub fn extract_file_references(response: &ComposedResponse) -> Vec<FileReference> {
    response
        .content
        .iter()
        .flat_map(|block| match block {
            ContentBlock::CodeExecutionToolResult { content, .. } => file_ids_in(content),
            ContentBlock::Text { .. }
            | ContentBlock::ServerToolUse { .. }
            | ContentBlock::Unsupported => Vec::new(),
        })
        .collect()
}

fn file_ids_in(payload: &serde_json::Value) -> Vec<FileReference> {
    match ToolResultPayload::from_value(payload) {
        Some(ToolResultPayload::CodeExecutionResult { content, .. }) => content
            .iter()
            .filter_map(|entry| entry.get("file_id")?.as_str())
            .map(FileReference::new)
            .collect(),
        Some(ToolResultPayload::CodeExecutionToolResultError { error_code }) => {
            tracing::debug!(?error_code, "code execution reported an error; no files");
            Vec::new()
        }
        Some(ToolResultPayload::Other) | None => {
            tracing::debug!("tool result without a code_execution_result payload");
            Vec::new()
        }
    }
}

/// Source of every `code_execution` invocation, in order of appearance.
pub fn extract_code_blocks(response: &ComposedResponse) -> Vec<String> {
    response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ServerToolUse { name, input, .. }
                if name.as_str() == CODE_EXECUTION_TOOL_NAME =>
            {
                input.get("code")?.as_str().map(str::to_string)
            }
            ContentBlock::Text { .. }
            | ContentBlock::ServerToolUse { .. }
            | ContentBlock::CodeExecutionToolResult { .. }
            | ContentBlock::Unsupported => None,
        })
        .collect()
}

/// Narrative text fragments, in order of appearance.
pub fn extract_text_fragments(response: &ComposedResponse) -> Vec<String> {
    response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::ServerToolUse { .. }
            | ContentBlock::CodeExecutionToolResult { .. }
            | ContentBlock::Unsupported => None,
        })
        .collect()
}

/// All three projections of one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text_fragments: Vec<String>,
    pub code_blocks: Vec<String>,
    pub file_references: Vec<FileReference>,
}

impl Extraction {
    pub fn from_response(response: &ComposedResponse) -> Self {
        Self {
            text_fragments: extract_text_fragments(response),
            code_blocks: extract_code_blocks(response),
            file_references: extract_file_references(response),
        }
    }
}
