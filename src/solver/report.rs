use crate::error::RenderError;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const GENERATOR: &str = "Claude 4 Math Solver";
const CODE_FENCE_LANGUAGE: &str = "python";
const MAX_QUESTION_CHARS: usize = 50;

/// Everything one report shows. Built once, rendered once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub question: String,
    pub generated_at: DateTime<Local>,
    pub model: String,
    pub text_fragments: Vec<String>,
    pub code_blocks: Vec<String>,
    /// Local file names under the images directory, in fetch order.
    pub images: Vec<String>,
}

impl Report {
    fn timestamp(&self) -> String {
        self.generated_at
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string()
    }

    /// The Markdown document. Section order is fixed; "Code Used" and
    /// "Generated Visualizations" only appear when they have entries.
    pub fn render(&self) -> String {
        let timestamp = self.timestamp();
        let question = &self.question;
        let mut doc = format!(
            "# Math Problem Solution Report\n\n\
             **Generated:** {timestamp}\n\
             **Question:** {question}\n\n\
             ---\n\n\
             ## Problem Statement\n\n\
             {question}\n\n\
             ---\n\n\
             ## Solution\n\n"
        );

        for text in &self.text_fragments {
            let _ = write!(doc, "{text}\n\n");
        }

        if !self.code_blocks.is_empty() {
            doc.push_str("---\n\n## Code Used\n\n");
            for (i, code) in self.code_blocks.iter().enumerate() {
                let _ = write!(
                    doc,
                    "### Code Block {}\n\n```{CODE_FENCE_LANGUAGE}\n{code}\n```\n\n",
                    i + 1
                );
            }
        }

        if !self.images.is_empty() {
            doc.push_str("---\n\n## Generated Visualizations\n\n");
            for name in &self.images {
                let _ = write!(doc, "![{name}](../images/{name})\n\n");
            }
        }

        let _ = write!(
            doc,
            "---\n\n\
             ## Report Details\n\n\
             - **Generated by:** {GENERATOR}\n\
             - **Model:** {model}\n\
             - **Timestamp:** {timestamp}\n\
             - **Files created:** {count} visualization(s)\n\n\
             ---\n\n\
             *This report was automatically generated using Claude's code execution capabilities.*\n",
            model = self.model,
            count = self.images.len(),
        );
        doc
    }

    pub fn filename(&self) -> String {
        report_filename(&self.question, self.generated_at)
    }
}

/// First 50 characters, keeping letters, digits, spaces, `-` and `_`;
/// trimmed, then spaces become underscores.
pub fn sanitize_question(question: &str) -> String {
    let kept: String = question
        .chars()
        .take(MAX_QUESTION_CHARS)
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim().replace(' ', "_")
}

/// `{YYYYMMDD_HHMMSS}_{sanitized question}.md`
pub fn report_filename(question: &str, at: DateTime<Local>) -> String {
    format!(
        "{}_{}.md",
        at.format("%Y%m%d_%H%M%S"),
        sanitize_question(question)
    )
}

/// Persist the report under `reports_dir`. The document lands under a
/// temporary name first and is renamed into place, so a failed write never
/// leaves a complete-looking report behind.
pub async fn write_report(report: &Report, reports_dir: &Path) -> Result<PathBuf, RenderError> {
    let filename = report.filename();
    let path = reports_dir.join(&filename);
    let staging = reports_dir.join(format!(".{filename}.partial"));

    if let Err(source) = tokio::fs::write(&staging, report.render()).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(RenderError::Write { path, source });
    }
    if let Err(source) = tokio::fs::rename(&staging, &path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(RenderError::Write { path, source });
    }
    tracing::debug!(path = %path.display(), "report persisted");
    Ok(path)
}
