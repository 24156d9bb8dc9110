use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const IMAGES_DIR: &str = "images";
const REPORTS_DIR: &str = "reports";

/// `<root>/images` for downloaded artifacts, `<root>/reports` for Markdown.
/// Created once at startup, then only appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    images: PathBuf,
    reports: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            images: root.join(IMAGES_DIR),
            reports: root.join(REPORTS_DIR),
            root,
        }
    }

    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.images)?;
        fs::create_dir_all(&self.reports)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> &Path {
        &self.images
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports
    }
}
