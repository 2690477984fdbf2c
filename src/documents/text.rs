//! Plain-text projector: the engine output is the file content.

use super::{write_atomic, FileRedaction, FileRestoration};
use crate::engine::{restore_placeholders, RedactionEngine};
use crate::error::RedactError;
use std::collections::HashMap;
use std::path::Path;

pub(super) async fn redact(
    engine: &RedactionEngine,
    input: &Path,
    output: &Path,
    entity_types: Option<&[String]>,
) -> Result<FileRedaction, RedactError> {
    let content = tokio::fs::read_to_string(input).await?;
    let outcome = engine.redact(&content, entity_types).await;
    write_atomic(output, outcome.redacted_text.as_bytes())?;
    Ok(FileRedaction {
        redacted_file_path: output.display().to_string(),
        entities_found: outcome.entities_found,
        session_id: Some(outcome.session_id),
    })
}

pub(super) async fn unredact(
    input: &Path,
    output: &Path,
    mappings: &HashMap<String, String>,
) -> Result<FileRestoration, RedactError> {
    let content = tokio::fs::read_to_string(input).await?;
    let (restored, entities_restored) = restore_placeholders(&content, mappings);
    write_atomic(output, restored.as_bytes())?;
    Ok(FileRestoration {
        unredacted_file_path: output.display().to_string(),
        entities_restored,
    })
}
