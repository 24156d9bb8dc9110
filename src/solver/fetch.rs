use super::extract::FileReference;
use crate::error::FetchError;
use crate::providers::Provider;
use std::path::{Path, PathBuf};

/// One artifact written to the images directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_id: String,
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Successfully written files, in reference order.
    pub saved: Vec<SavedFile>,
    pub failures: Vec<FetchError>,
}

impl FetchOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Resolve, download and write each referenced file. A failure for one file
/// is recorded and skipped; the rest still run.
pub async fn download_files(
    provider: &dyn Provider,
    references: &[FileReference],
    images_dir: &Path,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();
    for reference in references {
        match download_one(provider, reference, images_dir).await {
            Ok(saved) => {
                tracing::info!(
                    file_id = %saved.file_id,
                    path = %saved.path.display(),
                    "file saved"
                );
                outcome.saved.push(saved);
            }
            Err(error) => {
                tracing::warn!(file_id = %error.file_id(), "skipping file: {error}");
                outcome.failures.push(error);
            }
        }
    }
    outcome
}

async fn download_one(
    provider: &dyn Provider,
    reference: &FileReference,
    images_dir: &Path,
) -> Result<SavedFile, FetchError> {
    let file_id = reference.file_id.clone();
    let metadata = provider
        .file_metadata(&file_id)
        .await
        .map_err(|e| FetchError::Metadata {
            file_id: file_id.clone(),
            message: format!("{e:#}"),
        })?;
    let bytes = provider
        .download_file(&file_id)
        .await
        .map_err(|e| FetchError::Download {
            file_id: file_id.clone(),
            message: format!("{e:#}"),
        })?;

    let filename = local_filename(&metadata.filename, &file_id);
    let path = images_dir.join(&filename);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| FetchError::Write {
            file_id: file_id.clone(),
            path: path.clone(),
            source,
        })?;

    Ok(SavedFile {
        file_id,
        filename,
        path,
    })
}

/// Final path component of the remote name, so a name like `../x.png`
/// cannot escape the images directory. Falls back to the file id.
pub fn local_filename(remote: &str, file_id: &str) -> String {
    let candidate = remote
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if candidate.is_empty() || candidate == "." || candidate == ".." {
        file_id.to_string()
    } else {
        candidate.to_string()
    }
}
