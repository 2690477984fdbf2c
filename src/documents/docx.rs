//! DOCX projector.
//!
//! Every paragraph (including table-cell paragraphs) is one unit: its text
//! is the concatenation of its runs, the engine runs on that text, and the
//! reported spans are spliced back through a run-index table. Entities are
//! processed right-to-left because a placeholder that is longer than its
//! original shifts every later offset; going right-to-left keeps the
//! earlier offsets valid. Runs that the span does not touch keep their
//! formatting untouched, and a placeholder inherits the formatting of the
//! first run it lands in.
//!
//! Paragraphs whose runs carry non-plain content (tabs, breaks, field
//! instructions) cannot be spliced safely; those fall back to writing the
//! whole redacted paragraph into the first run and clearing the rest.

use super::{write_atomic, FileRedaction, FileRestoration};
use crate::engine::{restore_placeholders, RedactionEngine, RedactionOutcome};
use crate::error::RedactError;
use anyhow::anyhow;
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCellContent,
    TableChild, TableRowChild, Text,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Index path of a run inside a paragraph: direct child, or a run nested
/// in a hyperlink.
#[derive(Debug, Clone, Copy)]
struct RunRef {
    child: usize,
    nested: Option<usize>,
}

/// One run's slice of the concatenated paragraph text.
#[derive(Debug, Clone)]
struct Segment {
    run: RunRef,
    start: usize,
    end: usize,
    /// At most one plain text child and nothing else; safe to splice.
    simple: bool,
}

pub(super) async fn redact(
    engine: &RedactionEngine,
    input: &Path,
    output: &Path,
    entity_types: Option<&[String]>,
) -> Result<FileRedaction, RedactError> {
    let buf = std::fs::read(input)?;
    let mut docx =
        read_docx(&buf).map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;

    // Pass 1: collect paragraph texts in document order.
    let mut texts: Vec<String> = Vec::new();
    visit_paragraphs(&docx.document.children, &mut |p| {
        texts.push(collect_segments(p).0);
    });

    // Detect per paragraph; the projector never re-runs detection on
    // reassembled text.
    let mut outcomes: Vec<Option<RedactionOutcome>> = Vec::with_capacity(texts.len());
    for text in &texts {
        if text.is_empty() {
            outcomes.push(None);
        } else {
            outcomes.push(Some(engine.redact(text, entity_types).await));
        }
    }

    // One master session accumulates every paragraph's mappings.
    let session_id = engine.store().create().await;
    let mut entities_found = 0;
    for (text, outcome) in texts.iter().zip(outcomes.iter()) {
        if let Some(outcome) = outcome {
            entities_found += outcome.entities_found;
            for entity in &outcome.entities {
                engine
                    .store()
                    .add(
                        &session_id,
                        &entity.placeholder,
                        &text[entity.original_start..entity.original_end],
                    )
                    .await;
            }
        }
    }

    // Pass 2: splice the placeholders into the runs.
    let mut pending = outcomes.into_iter();
    visit_paragraphs_mut(&mut docx.document.children, &mut |p| {
        if let Some(Some(outcome)) = pending.next() {
            apply_redaction(p, &outcome);
        }
    });

    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| RedactError::Other(anyhow!("packing docx: {e}")))?;
    write_atomic(output, &cursor.into_inner())?;

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
    let buf = std::fs::read(input)?;
    let mut docx =
        read_docx(&buf).map_err(|e| RedactError::CorruptedDocument(e.to_string()))?;

    let mut restored: HashSet<String> = HashSet::new();
    visit_paragraphs_mut(&mut docx.document.children, &mut |p| {
        for placeholder in apply_restoration(p, mappings) {
            restored.insert(placeholder);
        }
    });

    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| RedactError::Other(anyhow!("packing docx: {e}")))?;
    write_atomic(output, &cursor.into_inner())?;

    Ok(FileRestoration {
        unredacted_file_path: output.display().to_string(),
        entities_restored: restored.len(),
    })
}

/// Concatenated run text and the run-index table for one paragraph.
fn collect_segments(paragraph: &Paragraph) -> (String, Vec<Segment>) {
    let mut text = String::new();
    let mut segments = Vec::new();

    let push_run = |run: &Run, run_ref: RunRef, text: &mut String, segs: &mut Vec<Segment>| {
        let mut run_text = String::new();
        let mut text_children = 0;
        for child in &run.children {
            if let RunChild::Text(t) = child {
                run_text.push_str(&t.text);
                text_children += 1;
            }
        }
        let simple = text_children == run.children.len() && text_children <= 1;
        let start = text.len();
        text.push_str(&run_text);
        segs.push(Segment {
            run: run_ref,
            start,
            end: text.len(),
            simple,
        });
    };

    for (child_idx, child) in paragraph.children.iter().enumerate() {
        match child {
            ParagraphChild::Run(run) => push_run(
                run,
                RunRef {
                    child: child_idx,
                    nested: None,
                },
                &mut text,
                &mut segments,
            ),
            ParagraphChild::Hyperlink(link) => {
                for (nested_idx, nested) in link.children.iter().enumerate() {
                    if let ParagraphChild::Run(run) = nested {
                        push_run(
                            run,
                            RunRef {
                                child: child_idx,
                                nested: Some(nested_idx),
                            },
                            &mut text,
                            &mut segments,
                        );
                    }
                }
            }
            _ => {}
        }
    }

    (text, segments)
}

fn set_run_text(paragraph: &mut Paragraph, run_ref: RunRef, new_text: &str) {
    let child = match paragraph.children.get_mut(run_ref.child) {
        Some(child) => child,
        None => return,
    };
    let run: &mut Run = match (child, run_ref.nested) {
        (ParagraphChild::Run(run), None) => run,
        (ParagraphChild::Hyperlink(link), Some(nested_idx)) => {
            match link.children.get_mut(nested_idx) {
                Some(ParagraphChild::Run(run)) => run,
                _ => return,
            }
        }
        _ => return,
    };
    run.children = if new_text.is_empty() {
        Vec::new()
    } else {
        vec![RunChild::Text(Text::new(new_text))]
    };
}

/// Splice an engine outcome into the paragraph's runs.
fn apply_redaction(paragraph: &mut Paragraph, outcome: &RedactionOutcome) {
    if outcome.entities.is_empty() {
        return;
    }
    let (full, segments) = collect_segments(paragraph);
    if segments.is_empty() {
        return;
    }

    if segments.iter().all(|s| s.simple) {
        let mut texts: Vec<String> = segments
            .iter()
            .map(|s| full[s.start..s.end].to_string())
            .collect();

        for entity in outcome.entities.iter().rev() {
            let (span_start, span_end) = (entity.original_start, entity.original_end);
            let affected: Vec<usize> = segments
                .iter()
                .enumerate()
                .filter(|(_, s)| s.start < span_end && span_start < s.end)
                .map(|(i, _)| i)
                .collect();
            let (Some(&first), Some(&last)) = (affected.first(), affected.last()) else {
                continue;
            };

            if first == last {
                // span inside a single run
                let local_start = span_start - segments[first].start;
                let local_end = span_end - segments[first].start;
                texts[first].replace_range(local_start..local_end, &entity.placeholder);
            } else {
                // span crosses runs: prefix + placeholder in the first,
                // interior cleared, suffix kept in the last
                let local_start = span_start - segments[first].start;
                let prefix = texts[first][..local_start].to_string();
                texts[first] = format!("{prefix}{}", entity.placeholder);
                for &mid in &affected[1..affected.len() - 1] {
                    texts[mid].clear();
                }
                let local_end = span_end - segments[last].start;
                texts[last] = texts[last][local_end..].to_string();
            }
        }

        for (i, segment) in segments.iter().enumerate() {
            if texts[i] != full[segment.start..segment.end] {
                set_run_text(paragraph, segment.run, &texts[i]);
            }
        }
    } else {
        // unusual run content: abandon surgical replacement
        warn!("paragraph has non-plain runs; writing redacted text into first run");
        let mut first_written = false;
        for segment in &segments {
            if !first_written {
                set_run_text(paragraph, segment.run, &outcome.redacted_text);
                first_written = true;
            } else {
                set_run_text(paragraph, segment.run, "");
            }
        }
    }
    debug!(
        entities = outcome.entities.len(),
        "paragraph redaction applied"
    );
}

/// Replace placeholders with originals inside each run; fall back to a
/// paragraph-level rewrite when a placeholder straddles run boundaries.
fn apply_restoration(paragraph: &mut Paragraph, mappings: &HashMap<String, String>) -> Vec<String> {
    let (full, segments) = collect_segments(paragraph);
    if full.is_empty() {
        return Vec::new();
    }
    let occurred: Vec<String> = mappings
        .keys()
        .filter(|placeholder| full.contains(placeholder.as_str()))
        .cloned()
        .collect();
    if occurred.is_empty() {
        return Vec::new();
    }
    let (restored_full, _) = restore_placeholders(&full, mappings);

    let mut texts: Vec<String> = segments
        .iter()
        .map(|s| full[s.start..s.end].to_string())
        .collect();
    for text in texts.iter_mut() {
        for (placeholder, original) in mappings {
            if text.contains(placeholder.as_str()) {
                *text = text.replace(placeholder.as_str(), original);
            }
        }
    }

    let surgical_worked =
        segments.iter().all(|s| s.simple) && texts.concat() == restored_full;
    if surgical_worked {
        for (i, segment) in segments.iter().enumerate() {
            if texts[i] != full[segment.start..segment.end] {
                set_run_text(paragraph, segment.run, &texts[i]);
            }
        }
    } else {
        warn!("placeholder straddles runs; restoring at paragraph level");
        let mut first_written = false;
        for segment in &segments {
            if !first_written {
                set_run_text(paragraph, segment.run, &restored_full);
                first_written = true;
            } else {
                set_run_text(paragraph, segment.run, "");
            }
        }
    }
    occurred
}

fn visit_paragraphs<'a>(children: &'a [DocumentChild], f: &mut dyn FnMut(&'a Paragraph)) {
    for child in children {
        match child {
            DocumentChild::Paragraph(p) => f(p),
            DocumentChild::Table(t) => visit_table(t, f),
            _ => {}
        }
    }
}

fn visit_table<'a>(table: &'a Table, f: &mut dyn FnMut(&'a Paragraph)) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => f(p),
                    TableCellContent::Table(t) => visit_table(t, f),
                    _ => {}
                }
            }
        }
    }
}

fn visit_paragraphs_mut(children: &mut [DocumentChild], f: &mut dyn FnMut(&mut Paragraph)) {
    for child in children {
        match child {
            DocumentChild::Paragraph(p) => f(p),
            DocumentChild::Table(t) => visit_table_mut(t, f),
            _ => {}
        }
    }
}

fn visit_table_mut(table: &mut Table, f: &mut dyn FnMut(&mut Paragraph)) {
    for row in &mut table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &mut row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &mut cell.children {
                match content {
                    TableCellContent::Paragraph(p) => f(p),
                    TableCellContent::Table(t) => visit_table_mut(t, f),
                    _ => {}
                }
            }
        }
    }
}
