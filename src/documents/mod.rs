//! Document projector.
//!
//! Projects engine output into plain text, DOCX, XLSX, and PDF files
//! without collapsing formatting, and reverses it from a session. Detection
//! is never re-run on reassembled text; every projection works from the
//! engine's reported entity offsets.
//!
//! Failure semantics: errors on a single paragraph/cell/page are logged and
//! that unit is left unchanged; failing to open a document is fatal for the
//! call. Output files are written atomically (temp file + rename).

mod doc;
mod docx;
mod pdf;
mod text;
mod xlsx;

use crate::constants::{MAX_FILE_SIZE, TEXT_EXTENSIONS};
use crate::engine::RedactionEngine;
use crate::error::RedactError;
use anyhow::anyhow;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of `redact_file`. `session_id` is absent in black-box PDF mode,
/// where nothing is reversible.
#[derive(Debug, Clone, Serialize)]
pub struct FileRedaction {
    pub redacted_file_path: String,
    pub entities_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Result of `unredact_file`.
#[derive(Debug, Clone, Serialize)]
pub struct FileRestoration {
    pub unredacted_file_path: String,
    pub entities_restored: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    PlainText,
    Docx,
    Xlsx,
    Pdf,
    LegacyDoc,
}

impl DocumentKind {
    fn from_path(path: &Path) -> Result<Self, RedactError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            return Ok(Self::PlainText);
        }
        match extension.as_str() {
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            "doc" => Ok(Self::LegacyDoc),
            _ => Err(RedactError::UnknownFormat(extension)),
        }
    }
}

pub struct DocumentRedactor<'e> {
    engine: &'e RedactionEngine,
}

impl<'e> DocumentRedactor<'e> {
    pub fn new(engine: &'e RedactionEngine) -> Self {
        Self { engine }
    }

    /// Redact a document into `<base>_redacted<ext>` next to the input.
    /// Legacy DOC input is converted first and always yields DOCX output.
    pub async fn redact_file(
        &self,
        path: &Path,
        entity_types: Option<&[String]>,
        use_placeholders: bool,
    ) -> Result<FileRedaction, RedactError> {
        let kind = DocumentKind::from_path(path)?;
        check_input(path)?;

        let outcome = match kind {
            DocumentKind::PlainText => {
                let output = output_path(path, "_redacted", None);
                text::redact(self.engine, path, &output, entity_types).await?
            }
            DocumentKind::Docx => {
                let output = output_path(path, "_redacted", None);
                docx::redact(self.engine, path, &output, entity_types).await?
            }
            DocumentKind::Xlsx => {
                let output = output_path(path, "_redacted", None);
                xlsx::redact(self.engine, path, &output, entity_types).await?
            }
            DocumentKind::Pdf => {
                let output = output_path(path, "_redacted", None);
                pdf::redact(self.engine, path, &output, entity_types, use_placeholders).await?
            }
            DocumentKind::LegacyDoc => {
                let converted = doc::convert_to_docx(path).await?;
                let output = output_path(path, "_redacted", Some("docx"));
                let outcome =
                    docx::redact(self.engine, &converted, &output, entity_types).await;
                let _ = std::fs::remove_file(&converted);
                outcome?
            }
        };

        info!(
            input = %path.display(),
            output = %outcome.redacted_file_path,
            entities = outcome.entities_found,
            "document redacted"
        );
        Ok(outcome)
    }

    /// Reverse a redaction into `<base>_unredacted<ext>` using the
    /// session's mappings.
    pub async fn unredact_file(
        &self,
        path: &Path,
        session_id: &str,
    ) -> Result<FileRestoration, RedactError> {
        let kind = DocumentKind::from_path(path)?;
        check_input(path)?;
        let mappings = self
            .engine
            .store()
            .get(session_id)
            .await
            .ok_or_else(|| RedactError::SessionMissing(session_id.to_string()))?;

        let output = output_path(path, "_unredacted", None);
        let outcome = match kind {
            DocumentKind::PlainText => text::unredact(path, &output, &mappings).await?,
            DocumentKind::Docx => docx::unredact(path, &output, &mappings).await?,
            DocumentKind::Xlsx => xlsx::unredact(path, &output, &mappings).await?,
            DocumentKind::Pdf => pdf::unredact(path, &output, &mappings).await?,
            DocumentKind::LegacyDoc => {
                // redaction of a .doc always produced .docx, so there is
                // nothing this path could reverse
                return Err(RedactError::UnknownFormat("doc".to_string()));
            }
        };

        info!(
            input = %path.display(),
            output = %outcome.unredacted_file_path,
            restored = outcome.entities_restored,
            "document unredacted"
        );
        Ok(outcome)
    }
}

fn check_input(path: &Path) -> Result<(), RedactError> {
    if !path.exists() {
        return Err(RedactError::FileNotFound(path.to_path_buf()));
    }
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(RedactError::Other(anyhow!(
            "file size exceeds maximum limit of 50MB"
        )));
    }
    Ok(())
}

/// `<base><suffix><ext>` next to the input; `force_ext` overrides the
/// extension (DOC output becomes DOCX).
fn output_path(input: &Path, suffix: &str, force_ext: Option<&str>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = force_ext
        .map(str::to_string)
        .or_else(|| {
            input
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
        })
        .unwrap_or_default();
    let name = if ext.is_empty() {
        format!("{stem}{suffix}")
    } else {
        format!("{stem}{suffix}.{ext}")
    };
    input.with_file_name(name)
}

/// Write bytes through a temp file in the destination directory, then
/// rename into place.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RedactError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new()?,
    };
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| RedactError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_naming_keeps_extension() {
        let out = output_path(Path::new("/tmp/report.xlsx"), "_redacted", None);
        assert_eq!(out, PathBuf::from("/tmp/report_redacted.xlsx"));
    }

    #[test]
    fn output_naming_can_force_docx() {
        let out = output_path(Path::new("notes.doc"), "_redacted", Some("docx"));
        assert_eq!(out, PathBuf::from("notes_redacted.docx"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = DocumentKind::from_path(Path::new("slides.pptx"));
        assert!(matches!(err, Err(RedactError::UnknownFormat(ext)) if ext == "pptx"));
    }

    #[test]
    fn text_like_extensions_share_the_text_path() {
        for name in ["a.txt", "b.csv", "c.log", "d.md"] {
            assert_eq!(
                DocumentKind::from_path(Path::new(name)).unwrap(),
                DocumentKind::PlainText
            );
        }
    }
}
