//! PDF projector.
//!
//! Each page is one unit. The page text is decoded from the content stream
//! (tracking the current font so string operands decode with the right
//! encoding), the engine runs on it, and each accepted original is then
//! located and replaced inside the show-text operands. Splicing in place
//! keeps the surrounding font, size, and color state, so a placeholder
//! renders with the original span's typography. When the span's font cannot
//! encode the placeholder, a standard fallback face is registered on the
//! page at the same size: serif faces map to "tiro", monospace to "cour",
//! anything else to "helv".
//!
//! Two modes: placeholder mode is reversible through the returned session;
//! black-box mode removes the text, paints a black rectangle near its
//! position, and returns no session. Reversibility relies on the
//! placeholder remaining searchable text; any downstream flattening of the
//! PDF breaks it.
//!
//! A failure on one page is logged and leaves that page unchanged; the
//! final save is atomic.

use super::{write_atomic, FileRedaction, FileRestoration};
use crate::engine::RedactionEngine;
use crate::error::RedactError;
use anyhow::{anyhow, Context, Result as AnyResult};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Per-page font table: resource name → (encoding, fallback face).
struct FontTable {
    encodings: BTreeMap<Vec<u8>, String>,
    faces: BTreeMap<Vec<u8>, &'static str>,
}

impl FontTable {
    fn collect(doc: &Document, page_id: ObjectId) -> Self {
        let mut encodings = BTreeMap::new();
        let mut faces = BTreeMap::new();
        for (name, font) in doc.get_page_fonts(page_id) {
            encodings.insert(name.clone(), font.get_font_encoding().to_string());
            let base = font
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_default();
            faces.insert(name, fallback_face(&base));
        }
        Self { encodings, faces }
    }

    fn encoding(&self, font: &[u8]) -> Option<&str> {
        self.encodings.get(font).map(String::as_str)
    }
}

/// Standard-face substitute for a font that cannot encode a placeholder.
fn fallback_face(base_font: &str) -> &'static str {
    let lower = base_font.to_lowercase();
    if lower.contains("times") || lower.contains("serif") || lower.contains("georgia")
        || lower.contains("garamond")
    {
        "tiro"
    } else if lower.contains("courier") || lower.contains("mono") || lower.contains("consol") {
        "cour"
    } else {
        "helv"
    }
}

fn face_base_font(face: &str) -> &'static str {
    match face {
        "tiro" => "Times-Roman",
        "cour" => "Courier",
        _ => "Helvetica",
    }
}

pub(super) async fn redact(
    engine: &RedactionEngine,
    input: &Path,
    output: &Path,
    entity_types: Option<&[String]>,
    use_placeholders: bool,
) -> Result<FileRedaction, RedactError> {
    let mut doc =
        Document::load(input).map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;

    let session_id = engine.store().create().await;
    let mut entities_found = 0;

    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    for (page_num, page_id) in pages {
        match redact_page(
            engine,
            &mut doc,
            page_id,
            entity_types,
            use_placeholders,
            &session_id,
        )
        .await
        {
            Ok(count) => entities_found += count,
            Err(e) => warn!(page = page_num, error = %e, "page redaction failed; page unchanged"),
        }
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RedactError::Other(anyhow!("saving pdf: {e}")))?;
    write_atomic(output, &buffer)?;

    Ok(FileRedaction {
        redacted_file_path: output.display().to_string(),
        entities_found,
        session_id: use_placeholders.then_some(session_id),
    })
}

async fn redact_page(
    engine: &RedactionEngine,
    doc: &mut Document,
    page_id: ObjectId,
    entity_types: Option<&[String]>,
    use_placeholders: bool,
    session_id: &str,
) -> AnyResult<usize> {
    let data = doc.get_page_content(page_id).context("page content")?;
    let content = Content::decode(&data).context("content decode")?;
    let fonts = FontTable::collect(doc, page_id);

    let page_text = decode_page_text(&content, &fonts);
    if page_text.trim().is_empty() {
        return Ok(0);
    }

    let outcome = engine.redact(&page_text, entity_types).await;
    if outcome.entities_found == 0 {
        return Ok(0);
    }

    // (from, to) pairs, longest original first so nested substrings never
    // steal a longer match.
    let mut pairs: Vec<(String, String)> = outcome
        .entities
        .iter()
        .map(|entity| {
            let original =
                page_text[entity.original_start..entity.original_end].to_string();
            let to = if use_placeholders {
                entity.placeholder.clone()
            } else {
                String::new()
            };
            (original, to)
        })
        .collect();
    pairs.sort_by_key(|(from, _)| std::cmp::Reverse(from.len()));
    pairs.dedup();

    if use_placeholders {
        for entity in &outcome.entities {
            engine
                .store()
                .add(
                    session_id,
                    &entity.placeholder,
                    &page_text[entity.original_start..entity.original_end],
                )
                .await;
        }
    }

    // Register fallback faces for fonts that cannot encode placeholder text.
    let mut fallbacks: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();
    if use_placeholders {
        let needy: Vec<(Vec<u8>, &'static str)> = fonts
            .encodings
            .iter()
            .filter(|(_, enc)| !encodes_cleanly(Some(enc), "[ABC_019]"))
            .map(|(name, _)| (name.clone(), *fonts.faces.get(name).unwrap_or(&"helv")))
            .collect();
        for (font_name, face) in needy {
            match ensure_fallback_font(doc, page_id, face) {
                Some(resource) => {
                    fallbacks.insert(font_name, resource);
                }
                None => warn!(
                    font = %String::from_utf8_lossy(&font_name),
                    "no fallback font available; spans in this font stay as-is"
                ),
            }
        }
    }

    let (new_content, replaced, rects) =
        splice_content(content, &fonts, &pairs, &fallbacks, !use_placeholders);
    if replaced == 0 {
        warn!("no page operand matched the detected text; page unchanged");
        return Ok(outcome.entities_found);
    }

    let mut new_content = new_content;
    if !use_placeholders && !rects.is_empty() {
        append_blackout_rects(&mut new_content, &rects);
    }

    let encoded = new_content.encode().context("content encode")?;
    doc.change_page_content(page_id, encoded)
        .context("change page content")?;
    debug!(replaced, "page spliced");
    Ok(outcome.entities_found)
}

pub(super) async fn unredact(
    input: &Path,
    output: &Path,
    mappings: &HashMap<String, String>,
) -> Result<FileRestoration, RedactError> {
    let mut doc =
        Document::load(input).map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;

    let mut restored: HashSet<String> = HashSet::new();
    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    for (page_num, page_id) in pages {
        let result: AnyResult<()> = (|| {
            let data = doc.get_page_content(page_id).context("page content")?;
            let content = Content::decode(&data).context("content decode")?;
            let fonts = FontTable::collect(&doc, page_id);

            let page_text = decode_page_text(&content, &fonts);
            let mut pairs: Vec<(String, String)> = Vec::new();
            for (placeholder, original) in mappings {
                if page_text.contains(placeholder.as_str()) {
                    restored.insert(placeholder.clone());
                    pairs.push((placeholder.clone(), original.clone()));
                }
            }
            if pairs.is_empty() {
                return Ok(());
            }
            pairs.sort_by_key(|(from, _)| std::cmp::Reverse(from.len()));

            let (new_content, _, _) =
                splice_content(content, &fonts, &pairs, &HashMap::new(), false);
            let encoded = new_content.encode().context("content encode")?;
            doc.change_page_content(page_id, encoded)
                .context("change page content")?;
            Ok(())
        })();
        if let Err(e) = result {
            warn!(page = page_num, error = %e, "page restoration failed; page unchanged");
        }
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RedactError::Other(anyhow!("saving pdf: {e}")))?;
    write_atomic(output, &buffer)?;

    Ok(FileRestoration {
        unredacted_file_path: output.display().to_string(),
        entities_restored: restored.len(),
    })
}

/// Which operand of a text-showing operator carries the string.
fn string_operand_index(operator: &str) -> Option<usize> {
    match operator {
        "Tj" | "'" => Some(0),
        "\"" => Some(2),
        _ => None,
    }
}

fn num(object: &Object) -> Option<f32> {
    match object {
        Object::Real(value) => Some(*value as f32),
        Object::Integer(value) => Some(*value as f32),
        _ => None,
    }
}

/// Decode the page's visible text in operator order. Show-text strings
/// concatenate; text-positioning operators break lines.
fn decode_page_text(content: &Content, fonts: &FontTable) -> String {
    let mut text = String::new();
    let mut current_font: Vec<u8> = Vec::new();

    let mut break_line = |text: &mut String| {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "Tf" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    current_font = name.clone();
                }
            }
            "Td" | "TD" | "T*" | "ET" => break_line(&mut text),
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        if let Object::String(bytes, _) = item {
                            text.push_str(&Document::decode_text(
                                fonts.encoding(&current_font),
                                bytes,
                            ));
                        }
                    }
                }
            }
            other => {
                if let Some(idx) = string_operand_index(other) {
                    if let Some(Object::String(bytes, _)) = op.operands.get(idx) {
                        text.push_str(&Document::decode_text(
                            fonts.encoding(&current_font),
                            bytes,
                        ));
                    }
                }
            }
        }
    }
    text
}

/// Apply `(from, to)` substitutions to every show-text operand. Returns the
/// rewritten content, the number of substitutions, and (for black-box mode)
/// the approximate rectangles of removed text.
fn splice_content(
    content: Content,
    fonts: &FontTable,
    pairs: &[(String, String)],
    fallbacks: &HashMap<Vec<u8>, Vec<u8>>,
    collect_rects: bool,
) -> (Content, usize, Vec<[f32; 4]>) {
    let mut new_ops: Vec<Operation> = Vec::with_capacity(content.operations.len());
    let mut replaced = 0usize;
    let mut rects: Vec<[f32; 4]> = Vec::new();

    let mut current_font: Vec<u8> = Vec::new();
    let mut current_size: f32 = 12.0;
    let mut cursor_x: f32 = 0.0;
    let mut cursor_y: f32 = 0.0;

    for op in content.operations {
        match op.operator.as_str() {
            "Tf" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    current_font = name.clone();
                }
                if let Some(size) = op.operands.get(1).and_then(num) {
                    current_size = size;
                }
                new_ops.push(op);
            }
            "Tm" => {
                if let (Some(x), Some(y)) = (
                    op.operands.get(4).and_then(num),
                    op.operands.get(5).and_then(num),
                ) {
                    cursor_x = x;
                    cursor_y = y;
                }
                new_ops.push(op);
            }
            "Td" | "TD" => {
                if let (Some(dx), Some(dy)) = (
                    op.operands.first().and_then(num),
                    op.operands.get(1).and_then(num),
                ) {
                    cursor_x += dx;
                    cursor_y += dy;
                }
                new_ops.push(op);
            }
            "TJ" => {
                let encoding = fonts.encoding(&current_font);
                let mut handled = false;
                if let Some(Object::Array(items)) = op.operands.first() {
                    let joined: String = items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => {
                                Some(Document::decode_text(encoding, bytes))
                            }
                            _ => None,
                        })
                        .collect();
                    if let Some(spliced) = substitute(&joined, pairs) {
                        // an original crossed the kerned fragments: collapse
                        // the array into one string so the splice is exact
                        replaced += 1;
                        if collect_rects {
                            rects.push(text_rect(cursor_x, cursor_y, current_size, &joined));
                        }
                        let emitted = emit_text_ops(
                            &spliced,
                            encoding,
                            &current_font,
                            current_size,
                            fallbacks,
                        );
                        new_ops.extend(emitted);
                        handled = true;
                    }
                }
                if !handled {
                    new_ops.push(op);
                }
            }
            operator => {
                let string_idx = string_operand_index(operator);
                let moves_line = matches!(operator, "'" | "\"");
                let mut handled = false;
                if let Some(idx) = string_idx {
                    let encoding = fonts.encoding(&current_font);
                    if let Some(Object::String(bytes, _)) = op.operands.get(idx) {
                        let decoded = Document::decode_text(encoding, bytes);
                        if let Some(spliced) = substitute(&decoded, pairs) {
                            replaced += 1;
                            if collect_rects {
                                rects.push(text_rect(
                                    cursor_x,
                                    cursor_y,
                                    current_size,
                                    &decoded,
                                ));
                            }
                            if moves_line {
                                // `'` and `"` show text on the next line;
                                // keep the line move when switching to Tj
                                new_ops.push(Operation::new("T*", vec![]));
                            }
                            let emitted = emit_text_ops(
                                &spliced,
                                encoding,
                                &current_font,
                                current_size,
                                fallbacks,
                            );
                            new_ops.extend(emitted);
                            handled = true;
                        }
                    }
                }
                if !handled {
                    new_ops.push(op);
                }
            }
        }
    }

    (
        Content {
            operations: new_ops,
        },
        replaced,
        rects,
    )
}

/// Apply all pairs to the text; `None` when nothing matched.
fn substitute(text: &str, pairs: &[(String, String)]) -> Option<String> {
    let mut result = text.to_string();
    let mut changed = false;
    for (from, to) in pairs {
        if !from.is_empty() && result.contains(from.as_str()) {
            result = result.replace(from.as_str(), to);
            changed = true;
        }
    }
    changed.then_some(result)
}

/// Emit show-text operations for the spliced string. When the current font
/// cannot encode it, the placeholder region is shown in the registered
/// fallback face at the same size, switching back afterwards.
fn emit_text_ops(
    text: &str,
    encoding: Option<&str>,
    current_font: &[u8],
    current_size: f32,
    fallbacks: &HashMap<Vec<u8>, Vec<u8>>,
) -> Vec<Operation> {
    if encodes_cleanly(encoding, text) {
        return vec![Operation::new(
            "Tj",
            vec![Object::String(
                Document::encode_text(encoding, text),
                StringFormat::Literal,
            )],
        )];
    }
    match fallbacks.get(current_font) {
        Some(resource) => vec![
            Operation::new(
                "Tf",
                vec![
                    Object::Name(resource.clone()),
                    Object::Real(current_size as _),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(
                    Document::encode_text(Some("StandardEncoding"), text),
                    StringFormat::Literal,
                )],
            ),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(current_font.to_vec()),
                    Object::Real(current_size as _),
                ],
            ),
        ],
        None => {
            // best effort in the original font
            vec![Operation::new(
                "Tj",
                vec![Object::String(
                    Document::encode_text(encoding, text),
                    StringFormat::Literal,
                )],
            )]
        }
    }
}

fn encodes_cleanly(encoding: Option<&str>, text: &str) -> bool {
    let encoded = Document::encode_text(encoding, text);
    Document::decode_text(encoding, &encoded) == text
}

/// Rough glyph-box estimate used for black-box rectangles.
fn text_rect(x: f32, y: f32, size: f32, text: &str) -> [f32; 4] {
    let width = 0.5 * size * text.chars().count() as f32;
    [x, y - 0.2 * size, width, 1.2 * size]
}

fn append_blackout_rects(content: &mut Content, rects: &[[f32; 4]]) {
    content.operations.push(Operation::new("q", vec![]));
    content.operations.push(Operation::new(
        "rg",
        vec![0.into(), 0.into(), 0.into()],
    ));
    for [x, y, w, h] in rects {
        content.operations.push(Operation::new(
            "re",
            vec![
                Object::Real(*x as _),
                Object::Real(*y as _),
                Object::Real(*w as _),
                Object::Real(*h as _),
            ],
        ));
        content.operations.push(Operation::new("f", vec![]));
    }
    content.operations.push(Operation::new("Q", vec![]));
}

/// Add a standard Type1 font to the page resources and return its resource
/// name. Returns `None` when the resources are structured in a way this
/// projector does not rewrite (e.g. inherited from the page tree).
fn ensure_fallback_font(
    doc: &mut Document,
    page_id: ObjectId,
    face: &str,
) -> Option<Vec<u8>> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face_base_font(face),
    });

    enum Location {
        Direct,
        Referenced(ObjectId),
    }
    let location = {
        let page = doc.get_dictionary(page_id).ok()?;
        match page.get(b"Resources") {
            Ok(Object::Dictionary(_)) => Location::Direct,
            Ok(Object::Reference(id)) => Location::Referenced(*id),
            _ => return None,
        }
    };

    let resources: &mut Dictionary = match location {
        Location::Direct => {
            let page = doc.get_object_mut(page_id).ok()?.as_dict_mut().ok()?;
            match page.get_mut(b"Resources").ok()? {
                Object::Dictionary(dict) => dict,
                _ => return None,
            }
        }
        Location::Referenced(id) => doc.get_object_mut(id).ok()?.as_dict_mut().ok()?,
    };

    let fonts: &mut Dictionary = match resources.get_mut(b"Font") {
        Ok(Object::Dictionary(dict)) => dict,
        _ => return None,
    };

    let mut index = 0usize;
    let name = loop {
        let candidate = format!("FRd{index}").into_bytes();
        if !fonts.has(&candidate) {
            break candidate;
        }
        index += 1;
    };
    fonts.set(name.clone(), Object::Reference(font_id));
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn engine() -> RedactionEngine {
        RedactionEngine::with_layers(EngineConfig::default(), None, None).unwrap()
    }

    /// One-page PDF showing `text` in Helvetica at `size` pt.
    fn build_fixture(text: &str, size: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(size)],
                ),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        text.as_bytes().to_vec(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn page_text(bytes: &[u8]) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let fonts = FontTable::collect(&doc, page_id);
        decode_page_text(&content, &fonts)
    }

    #[tokio::test]
    async fn placeholder_mode_replaces_text_and_keeps_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.pdf");
        std::fs::write(
            &input,
            build_fixture("Contact john@example.com for details.", 18),
        )
        .unwrap();

        let output = dir.path().join("page_redacted.pdf");
        let eng = engine();
        let outcome = redact(&eng, &input, &output, None, true).await.unwrap();
        assert_eq!(outcome.entities_found, 1);
        assert!(outcome.session_id.is_some());

        let bytes = std::fs::read(&output).unwrap();
        let text = page_text(&bytes);
        assert!(text.contains("[EMAIL_ADDRESS_1]"));
        assert!(!text.contains("john@example.com"));

        // the placeholder is governed by the original 18pt Tf
        let doc = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let mut size_at_placeholder = None;
        let mut current_size = 0.0f32;
        for op in &content.operations {
            if op.operator == "Tf" {
                if let Some(size) = op.operands.get(1).and_then(num) {
                    current_size = size;
                }
            }
            if op.operator == "Tj" {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    if String::from_utf8_lossy(bytes).contains("[EMAIL_ADDRESS_1]") {
                        size_at_placeholder = Some(current_size);
                    }
                }
            }
        }
        let size = size_at_placeholder.expect("placeholder operand present");
        assert!((size - 18.0).abs() <= 3.0, "font size {size} drifted");
    }

    #[tokio::test]
    async fn pdf_round_trip_restores_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.pdf");
        std::fs::write(&input, build_fixture("Send mail to a@b.com today.", 12)).unwrap();

        let eng = engine();
        let redacted = dir.path().join("page_redacted.pdf");
        let outcome = redact(&eng, &input, &redacted, None, true).await.unwrap();
        let mappings = eng
            .store()
            .get(outcome.session_id.as_ref().unwrap())
            .await
            .unwrap();

        let restored = dir.path().join("page_unredacted.pdf");
        let restoration = unredact(&redacted, &restored, &mappings).await.unwrap();
        assert_eq!(restoration.entities_restored, 1);

        let text = page_text(&std::fs::read(&restored).unwrap());
        assert!(text.contains("a@b.com"));
        assert!(!text.contains("[EMAIL_ADDRESS_1]"));
    }

    #[tokio::test]
    async fn black_box_mode_removes_text_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.pdf");
        std::fs::write(&input, build_fixture("SSN 123-45-6789 on file.", 12)).unwrap();

        let output = dir.path().join("page_redacted.pdf");
        let eng = engine();
        let outcome = redact(&eng, &input, &output, None, false).await.unwrap();
        assert!(outcome.session_id.is_none());
        assert_eq!(outcome.entities_found, 1);

        let bytes = std::fs::read(&output).unwrap();
        let text = page_text(&bytes);
        assert!(!text.contains("123-45-6789"));
        assert!(!text.contains("[US_SSN"));

        // a fill rectangle was painted over the removed span
        let doc = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        assert!(content.operations.iter().any(|op| op.operator == "re"));
        assert!(content.operations.iter().any(|op| op.operator == "f"));
    }

    #[test]
    fn fallback_face_mapping() {
        assert_eq!(fallback_face("Times-BoldItalic"), "tiro");
        assert_eq!(fallback_face("Courier-Oblique"), "cour");
        assert_eq!(fallback_face("Arial-Black"), "helv");
    }
}
