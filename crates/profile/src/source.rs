//! Local profile documents: the summary text and the resume.
//!
//! Both are optional. A missing or unreadable document yields an empty
//! string so the prompt can still be assembled from whatever is left.

use alterego_core::error::ProfileError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns a resume document into plain text.
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, path: &Path) -> Result<String, ProfileError>;
}

/// Reads the document as UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain"
    }

    fn extract(&self, path: &Path) -> Result<String, ProfileError> {
        std::fs::read_to_string(path).map_err(|e| unavailable(path, e))
    }
}

/// Extracts the text layer of a PDF. Files without a `.pdf` extension are
/// read as plain text.
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract(&self, path: &Path) -> Result<String, ProfileError> {
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return PlainTextExtractor.extract(path);
        }
        pdf_extract::extract_text(path).map_err(|e| unavailable(path, e))
    }
}

fn unavailable(path: &Path, reason: impl std::fmt::Display) -> ProfileError {
    ProfileError::SourceUnavailable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// The persona's local documents.
pub struct ProfileSource {
    summary_path: Option<PathBuf>,
    resume_path: Option<PathBuf>,
    extractor: Arc<dyn TextExtractor>,
}

impl ProfileSource {
    pub fn new(
        summary_path: Option<PathBuf>,
        resume_path: Option<PathBuf>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            summary_path,
            resume_path,
            extractor,
        }
    }

    /// The summary text, trimmed. Empty when absent or unreadable.
    pub fn load_summary(&self) -> String {
        match self.read(self.summary_path.as_deref(), &PlainTextExtractor) {
            Some(text) => text.trim().to_string(),
            None => String::new(),
        }
    }

    /// The resume text. Empty when absent or unreadable.
    pub fn load_resume(&self) -> String {
        self.read(self.resume_path.as_deref(), self.extractor.as_ref())
            .unwrap_or_default()
    }

    fn read(&self, path: Option<&Path>, extractor: &dyn TextExtractor) -> Option<String> {
        let path = path?;
        if !path.exists() {
            debug!(path = %path.display(), "Profile document not present");
            return None;
        }
        match extractor.extract(path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(extractor = extractor.name(), error = %e, "Could not read profile document");
                None
            }
        }
    }
}
