use std::path::PathBuf;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the solver.
///
/// Each pipeline stage owns one variant. The session loop matches on these to
/// decide whether a failure is fatal (configuration) or scoped to a single
/// question; provider internals keep using `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum SolverError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Request / stream ────────────────────────────────────────────────
    #[error("solve failed: {0}")]
    Dispatch(#[from] DispatchError),

    // ── File download ───────────────────────────────────────────────────
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    // ── Report persistence ──────────────────────────────────────────────
    #[error("report: {0}")]
    Render(#[from] RenderError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SolverError {
    /// Only configuration problems end the process; everything else is
    /// scoped to the question that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: set the {env_var} environment variable")]
    MissingCredential { env_var: &'static str },

    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Dispatch errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("could not open exchange: {0}")]
    Open(String),

    #[error("stream interrupted: {0}")]
    Stream(String),

    #[error("stream ended without a composed message: {0}")]
    Incomplete(String),
}

// ─── Fetch errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("metadata for {file_id} unavailable: {message}")]
    Metadata { file_id: String, message: String },

    #[error("download of {file_id} failed: {message}")]
    Download { file_id: String, message: String },

    #[error("could not write {file_id} to {}: {source}", path.display())]
    Write {
        file_id: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn file_id(&self) -> &str {
        match self {
            Self::Metadata { file_id, .. }
            | Self::Download { file_id, .. }
            | Self::Write { file_id, .. } => file_id,
        }
    }
}

// ─── Render errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
