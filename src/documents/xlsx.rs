//! XLSX projector.
//!
//! A workbook is edited surgically: every `<si>` entry of the shared-string
//! table and every inline `<is>` string in a worksheet is one cell-text
//! unit. Units that the engine redacts are rewritten as a single
//! `<t xml:space="preserve">` element; every other part of the archive
//! (styles, formulas, merged ranges, sheet order) is copied through
//! byte-for-byte, so formatting survives. All units share one master
//! session so a workbook unredacts with a single id.

use super::{write_atomic, FileRedaction, FileRestoration};
use crate::engine::{restore_placeholders, RedactionEngine};
use crate::error::RedactError;
use anyhow::{anyhow, Context, Result as AnyResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

pub(super) async fn redact(
    engine: &RedactionEngine,
    input: &Path,
    output: &Path,
    entity_types: Option<&[String]>,
) -> Result<FileRedaction, RedactError> {
    let file = std::fs::File::open(input)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;

    // Collect the string-bearing parts and their units.
    let mut parts: Vec<(String, Vec<u8>, &'static [u8])> = Vec::new();
    for name in string_part_names(&mut archive) {
        let bytes = read_entry(&mut archive, &name)?;
        let container: &'static [u8] = if name == SHARED_STRINGS { b"si" } else { b"is" };
        parts.push((name, bytes, container));
    }

    let session_id = engine.store().create().await;
    let mut entities_found = 0;
    let mut rewritten: HashMap<String, Vec<u8>> = HashMap::new();

    for (name, bytes, container) in &parts {
        let units = match extract_units(bytes, container) {
            Ok(units) => units,
            Err(e) => {
                warn!(part = %name, error = %e, "unreadable string part left unchanged");
                continue;
            }
        };
        if units.is_empty() {
            continue;
        }

        let mut replacements: Vec<Option<String>> = Vec::with_capacity(units.len());
        for unit in &units {
            if unit.is_empty() {
                replacements.push(None);
                continue;
            }
            let outcome = engine.redact(unit, entity_types).await;
            if outcome.entities_found == 0 {
                replacements.push(None);
                continue;
            }
            entities_found += outcome.entities_found;
            for entity in &outcome.entities {
                engine
                    .store()
                    .add(
                        &session_id,
                        &entity.placeholder,
                        &unit[entity.original_start..entity.original_end],
                    )
                    .await;
            }
            replacements.push(Some(outcome.redacted_text));
        }

        if replacements.iter().any(Option::is_some) {
            match rewrite_units(bytes, container, &replacements) {
                Ok(updated) => {
                    rewritten.insert(name.clone(), updated);
                }
                Err(e) => {
                    warn!(part = %name, error = %e, "rewrite failed; part left unchanged");
                }
            }
        }
    }

    let packed = repack(&mut archive, &rewritten)?;
    write_atomic(output, &packed)?;

    debug!(entities_found, "workbook redacted");
    Ok(FileRedaction {
        redacted_file_path: output.display().to_string(),
        entities_found,
        session_id: Some(session_id),
    })
}

pub(super) async fn unredact(
    input: &Path,
    output: &Path,
    mappings: &HashMap<String, String>,
) -> Result<FileRestoration, RedactError> {
    let file = std::fs::File::open(input)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;

    let mut restored: HashSet<String> = HashSet::new();
    let mut rewritten: HashMap<String, Vec<u8>> = HashMap::new();

    for name in string_part_names(&mut archive) {
        let bytes = read_entry(&mut archive, &name)?;
        let container: &'static [u8] = if name == SHARED_STRINGS { b"si" } else { b"is" };
        let units = match extract_units(&bytes, container) {
            Ok(units) => units,
            Err(e) => {
                warn!(part = %name, error = %e, "unreadable string part left unchanged");
                continue;
            }
        };

        let mut replacements: Vec<Option<String>> = Vec::with_capacity(units.len());
        for unit in &units {
            for placeholder in mappings.keys() {
                if unit.contains(placeholder.as_str()) {
                    restored.insert(placeholder.clone());
                }
            }
            let (text, changed) = restore_placeholders(unit, mappings);
            replacements.push(if changed > 0 { Some(text) } else { None });
        }

        if replacements.iter().any(Option::is_some) {
            match rewrite_units(&bytes, container, &replacements) {
                Ok(updated) => {
                    rewritten.insert(name, updated);
                }
                Err(e) => {
                    warn!(part = %name, error = %e, "rewrite failed; part left unchanged");
                }
            }
        }
    }

    let packed = repack(&mut archive, &rewritten)?;
    write_atomic(output, &packed)?;

    Ok(FileRestoration {
        unredacted_file_path: output.display().to_string(),
        entities_restored: restored.len(),
    })
}

/// Archive entries that can hold cell text.
fn string_part_names<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            *name == SHARED_STRINGS
                || (name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
        })
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, RedactError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Copy the archive, substituting the rewritten parts. Everything else is
/// raw-copied so compression and metadata stay identical.
fn repack<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    rewritten: &HashMap<String, Vec<u8>>,
) -> Result<Vec<u8>, RedactError> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for index in 0..archive.len() {
        let name = archive
            .by_index_raw(index)
            .map_err(|e| RedactError::CorruptedDocument(e.to_string()))?
            .name()
            .to_string();
        if let Some(bytes) = rewritten.get(&name) {
            writer
                .start_file(name, zip::write::FileOptions::default())
                .map_err(|e| RedactError::Other(anyhow!("zip write: {e}")))?;
            writer.write_all(bytes)?;
        } else {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;
            writer
                .raw_copy_file(entry)
                .map_err(|e| RedactError::Other(anyhow!("zip copy: {e}")))?;
        }
    }
    let cursor = writer
        .finish()
        .map_err(|e| RedactError::Other(anyhow!("zip finish: {e}")))?;
    Ok(cursor.into_inner())
}

/// Visible text of each `<si>`/`<is>` unit, in document order. Rich-text
/// runs concatenate; phonetic annotations are skipped.
fn extract_units(xml: &[u8], container: &[u8]) -> AnyResult<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut units = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf).context("xml parse")? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                if name == container {
                    current = Some(String::new());
                } else if name == b"rPh" {
                    in_phonetic = true;
                } else if name == b"t" && current.is_some() && !in_phonetic {
                    in_text = true;
                }
            }
            Event::Empty(e) => {
                if e.name().as_ref() == container {
                    units.push(String::new());
                }
            }
            Event::Text(e) => {
                if in_text {
                    if let Some(unit) = current.as_mut() {
                        unit.push_str(&e.unescape().context("xml unescape")?);
                    }
                }
            }
            Event::End(e) => {
                let name = e.name().as_ref().to_vec();
                if name == container {
                    units.push(current.take().unwrap_or_default());
                } else if name == b"rPh" {
                    in_phonetic = false;
                } else if name == b"t" {
                    in_text = false;
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(units)
}

/// Stream the XML through, replacing the i-th container element with a
/// single plain-text node where a replacement is given.
fn rewrite_units(
    xml: &[u8],
    container: &[u8],
    replacements: &[Option<String>],
) -> AnyResult<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut unit_index = 0usize;
    let mut skipping = false;

    loop {
        let event = reader.read_event_into(&mut buf).context("xml parse")?;
        match &event {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == container => {
                let replacement = replacements.get(unit_index).and_then(Option::as_ref);
                unit_index += 1;
                if let Some(text) = replacement {
                    write_plain_unit(&mut writer, container, text)?;
                    skipping = true;
                } else {
                    writer.write_event(event)?;
                }
            }
            Event::Empty(e) if e.name().as_ref() == container => {
                unit_index += 1;
                writer.write_event(event)?;
            }
            Event::End(e) if e.name().as_ref() == container => {
                if skipping {
                    skipping = false;
                } else {
                    writer.write_event(event)?;
                }
            }
            _ => {
                if !skipping {
                    writer.write_event(event)?;
                }
            }
        }
        buf.clear();
    }
    Ok(writer.into_inner().into_inner())
}

fn write_plain_unit(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    container: &[u8],
    text: &str,
) -> AnyResult<()> {
    let container_name = std::str::from_utf8(container).context("container name")?;
    writer.write_event(Event::Start(BytesStart::new(container_name)))?;
    let mut t = BytesStart::new("t");
    t.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(t))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    writer.write_event(Event::End(BytesEnd::new(container_name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn engine() -> RedactionEngine {
        RedactionEngine::with_layers(EngineConfig::default(), None, None).unwrap()
    }

    const SHARED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3"><si><t>Contact john@example.com</t></si><si><r><rPr><b/></rPr><t>Totals</t></r></si><si><t>SSN 123-45-6789</t></si></sst>"#;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Call 555-123-4567</t></is></c><c r="C1"><f>SUM(D1:D9)</f><v>42</v></c></row></sheetData></worksheet>"#;

    const STYLES: &str = r#"<?xml version="1.0"?><styleSheet/>"#;

    fn build_fixture() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        for (name, content) in [
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", "<workbook/>"),
            ("xl/styles.xml", STYLES),
            ("xl/sharedStrings.xml", SHARED),
            ("xl/worksheets/sheet1.xml", SHEET),
        ] {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn entry_text(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn extract_units_skips_phonetics_and_joins_rich_text() {
        let xml = br#"<sst><si><r><t>Hello </t></r><r><t>World</t></r><rPh><t>furigana</t></rPh></si></sst>"#;
        let units = extract_units(xml, b"si").unwrap();
        assert_eq!(units, vec!["Hello World".to_string()]);
    }

    #[tokio::test]
    async fn workbook_cells_are_redacted_and_styles_survive() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.xlsx");
        std::fs::write(&input, build_fixture()).unwrap();

        let output = dir.path().join("book_redacted.xlsx");
        let eng = engine();
        let outcome = redact(&eng, &input, &output, None).await.unwrap();
        assert!(outcome.entities_found >= 3);

        let bytes = std::fs::read(&output).unwrap();
        let shared = entry_text(&bytes, "xl/sharedStrings.xml");
        assert!(shared.contains("[EMAIL_ADDRESS_1]"));
        assert!(!shared.contains("john@example.com"));
        assert!(shared.contains("Totals"), "clean cells are untouched");
        assert!(shared.contains("[US_SSN_1]"));

        let sheet = entry_text(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("[PHONE_NUMBER_1]"));
        assert!(!sheet.contains("555-123-4567"));
        assert!(sheet.contains("SUM(D1:D9)"), "formulas are preserved");

        assert_eq!(
            entry_text(&bytes, "xl/styles.xml"),
            STYLES,
            "untouched parts copy through byte-for-byte"
        );
    }

    #[tokio::test]
    async fn workbook_round_trip_restores_cells() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.xlsx");
        std::fs::write(&input, build_fixture()).unwrap();

        let eng = engine();
        let redacted = dir.path().join("book_redacted.xlsx");
        let outcome = redact(&eng, &input, &redacted, None).await.unwrap();
        let mappings = eng
            .store()
            .get(outcome.session_id.as_ref().unwrap())
            .await
            .unwrap();

        let restored = dir.path().join("book_unredacted.xlsx");
        let restoration = unredact(&redacted, &restored, &mappings).await.unwrap();
        assert!(restoration.entities_restored >= 3);

        let bytes = std::fs::read(&restored).unwrap();
        let shared = entry_text(&bytes, "xl/sharedStrings.xml");
        assert!(shared.contains("john@example.com"));
        assert!(shared.contains("123-45-6789"));
        let sheet = entry_text(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("555-123-4567"));
    }
}
