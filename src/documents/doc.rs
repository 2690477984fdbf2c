//! Legacy DOC support.
//!
//! The binary Word format is not projected directly: the file is first
//! sniffed as a Compound File Binary container (a corrupt file and a
//! missing converter are different errors), converted to DOCX with
//! LibreOffice, and then handed to the DOCX projector. Output of a `.doc`
//! input is therefore always `.docx`.

use crate::error::RedactError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

pub(super) async fn convert_to_docx(input: &Path) -> Result<PathBuf, RedactError> {
    // A real DOC file is a CFB container with a WordDocument stream.
    let file = std::fs::File::open(input)?;
    let compound = cfb::CompoundFile::open(file)
        .map_err(|e| RedactError::CorruptedDocument(format!("not a DOC container: {e}")))?;
    if !compound.exists("WordDocument") {
        return Err(RedactError::CorruptedDocument(
            "missing WordDocument stream".to_string(),
        ));
    }
    drop(compound);

    let out_dir = tempfile::tempdir()?;
    let status = Command::new("soffice")
        .arg("--headless")
        .arg("--convert-to")
        .arg("docx")
        .arg("--outdir")
        .arg(out_dir.path())
        .arg(input)
        .output()
        .await;

    let output = match status {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "soffice not runnable");
            return Err(RedactError::ConverterUnavailable);
        }
    };
    if !output.status.success() {
        warn!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "soffice conversion failed"
        );
        return Err(RedactError::ConverterUnavailable);
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let converted = out_dir.path().join(format!("{stem}.docx"));
    if !converted.exists() {
        return Err(RedactError::ConverterUnavailable);
    }

    // move out of the temp dir so the caller controls the lifetime
    let kept = std::env::temp_dir().join(format!("{stem}-{}.docx", uuid::Uuid::new_v4()));
    std::fs::copy(&converted, &kept)?;
    debug!(converted = %kept.display(), "DOC converted to DOCX");
    Ok(kept)
}
