//! Per-question pipeline: dispatch, interpret the stream, extract artifacts,
//! fetch files, render and persist the report.

pub mod dispatch;
pub mod extract;
pub mod fetch;
pub mod interpreter;
pub mod layout;
pub mod question;
pub mod report;

pub use extract::{Extraction, FileReference};
pub use fetch::{FetchOutcome, SavedFile};
pub use layout::OutputLayout;
pub use question::Question;
pub use report::Report;

use crate::config::{API_KEY_ENV, Config};
use crate::error::{ConfigError, FetchError, Result};
use crate::providers::{AnthropicProvider, ComposedResponse, Provider, StreamSink};
use chrono::Local;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a question is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dispatched,
    Streaming,
    Composed,
    Extracted,
    FilesFetched,
    Rendered,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Dispatched => "dispatched",
            Self::Streaming => "streaming",
            Self::Composed => "composed",
            Self::Extracted => "extracted",
            Self::FilesFetched => "files_fetched",
            Self::Rendered => "rendered",
            Self::Persisted => "persisted",
        };
        f.write_str(label)
    }
}

/// Hooks for the user-facing steps between streaming and the saved report.
pub trait ProgressReporter: Send + Sync {
    fn downloads_started(&self, _count: usize) {}
    fn file_saved(&self, _file: &SavedFile) {}
    fn file_failed(&self, _error: &FetchError) {}
    fn rendering(&self) {}
}

#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {}

/// Everything one successfully processed question produced.
#[derive(Debug)]
pub struct SolvedQuestion {
    pub question: Question,
    pub response: ComposedResponse,
    pub extraction: Extraction,
    pub fetch: FetchOutcome,
    pub report_path: PathBuf,
}

pub struct MathSolver {
    provider: Arc<dyn Provider>,
    layout: OutputLayout,
    model: String,
    max_tokens: u32,
}

impl MathSolver {
    pub fn new(
        provider: Arc<dyn Provider>,
        layout: OutputLayout,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            layout,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Self {
        Self::new(
            provider,
            OutputLayout::new(config.output_dir.clone()),
            config.model.clone(),
            config.max_tokens,
        )
    }

    /// Check the credential, build the HTTP provider and create the output
    /// directories. Nothing touches the network here.
    pub fn connect(config: &Config) -> std::result::Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        tracing::debug!(env_var = API_KEY_ENV, base_url = config.base_url(), "credential found");
        let provider = AnthropicProvider::with_base_url(Some(api_key), Some(config.base_url()));
        let solver = Self::from_config(config, Arc::new(provider));
        solver.layout.ensure()?;
        Ok(solver)
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Open the exchange and drive it to a composed response.
    pub async fn solve(
        &self,
        question: &Question,
        sink: &dyn StreamSink,
    ) -> Result<ComposedResponse> {
        let stream =
            dispatch::dispatch(self.provider.as_ref(), question, &self.model, self.max_tokens)
                .await?;
        log_stage(question, Stage::Streaming);
        Ok(interpreter::interpret(stream, sink).await?)
    }

    pub async fn fetch_files(&self, references: &[FileReference]) -> FetchOutcome {
        fetch::download_files(self.provider.as_ref(), references, self.layout.images_dir()).await
    }

    pub fn build_report(
        &self,
        question: &Question,
        response: &ComposedResponse,
        extraction: &Extraction,
        fetch: &FetchOutcome,
    ) -> Report {
        Report {
            question: question.text().to_string(),
            generated_at: Local::now(),
            model: response.model.clone().unwrap_or_else(|| self.model.clone()),
            text_fragments: extraction.text_fragments.clone(),
            code_blocks: extraction.code_blocks.clone(),
            images: fetch.saved.iter().map(|f| f.filename.clone()).collect(),
        }
    }

    /// Run one question end to end. A failed file download degrades the
    /// report; only dispatch, stream and report-write failures are errors.
    pub async fn process(
        &self,
        question: Question,
        sink: &dyn StreamSink,
        progress: &dyn ProgressReporter,
    ) -> Result<SolvedQuestion> {
        log_stage(&question, Stage::Dispatched);
        let response = self.solve(&question, sink).await?;
        log_stage(&question, Stage::Composed);

        let extraction = Extraction::from_response(&response);
        tracing::debug!(
            ordinal = question.ordinal(),
            texts = extraction.text_fragments.len(),
            code_blocks = extraction.code_blocks.len(),
            files = extraction.file_references.len(),
            "artifacts extracted"
        );
        log_stage(&question, Stage::Extracted);

        let fetch = if extraction.file_references.is_empty() {
            FetchOutcome::default()
        } else {
            progress.downloads_started(extraction.file_references.len());
            let outcome = self.fetch_files(&extraction.file_references).await;
            for file in &outcome.saved {
                progress.file_saved(file);
            }
            for error in &outcome.failures {
                progress.file_failed(error);
            }
            outcome
        };
        log_stage(&question, Stage::FilesFetched);

        progress.rendering();
        let report = self.build_report(&question, &response, &extraction, &fetch);
        log_stage(&question, Stage::Rendered);
        let report_path = report::write_report(&report, self.layout.reports_dir()).await?;
        log_stage(&question, Stage::Persisted);

        Ok(SolvedQuestion {
            question,
            response,
            extraction,
            fetch,
            report_path,
        })
    }
}

fn log_stage(question: &Question, stage: Stage) {
    tracing::debug!(
        ordinal = question.ordinal(),
        %stage,
        elapsed_ms = question.elapsed().num_milliseconds(),
        "stage"
    );
}
