// Integration tests: structured-document projection
//
// Fixtures are built in memory (docx-rs for DOCX, zip for XLSX, lopdf for
// PDF) and pushed through the public DocumentRedactor surface.

use docx_rs::{read_docx, Docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, StringFormat};
use redact_engine::{DocumentRedactor, EngineConfig, RedactionEngine};
use std::io::Write;

fn engine() -> RedactionEngine {
    RedactionEngine::with_layers(EngineConfig::default(), None, None).unwrap()
}

fn docx_fixture() -> Vec<u8> {
    let paragraph = Paragraph::new()
        .add_run(Run::new().add_text("Contact "))
        .add_run(Run::new().add_text("John Smith").bold())
        .add_run(Run::new().add_text(" at "))
        .add_run(Run::new().add_text("john@example.com").italic())
        .add_run(Run::new().add_text(" today."));
    let mut cursor = std::io::Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(paragraph)
        .build()
        .pack(&mut cursor)
        .unwrap();
    cursor.into_inner()
}

fn docx_runs(buf: &[u8]) -> Vec<(String, bool, bool)> {
    let docx = read_docx(buf).unwrap();
    let mut runs = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            for pc in p.children {
                if let ParagraphChild::Run(run) = pc {
                    let text: String = run
                        .children
                        .iter()
                        .filter_map(|c| match c {
                            RunChild::Text(t) => Some(t.text.clone()),
                            _ => None,
                        })
                        .collect();
                    runs.push((
                        text,
                        run.run_property.bold.is_some(),
                        run.run_property.italic.is_some(),
                    ));
                }
            }
        }
    }
    runs
}

#[tokio::test]
async fn docx_redaction_preserves_run_formatting() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    std::fs::write(&input, docx_fixture()).unwrap();

    let eng = engine();
    let redactor = DocumentRedactor::new(&eng);
    let outcome = redactor.redact_file(&input, None, true).await.unwrap();
    assert_eq!(outcome.entities_found, 2);

    let runs = docx_runs(&std::fs::read(&outcome.redacted_file_path).unwrap());
    let full: String = runs.iter().map(|(t, _, _)| t.as_str()).collect();
    assert!(!full.contains("John Smith"));
    assert!(!full.contains("john@example.com"));
    assert!(full.starts_with("Contact "));
    assert!(full.ends_with(" today."));

    let bold: String = runs
        .iter()
        .filter(|(_, b, _)| *b)
        .map(|(t, _, _)| t.as_str())
        .collect();
    let italic: String = runs
        .iter()
        .filter(|(_, _, i)| *i)
        .map(|(t, _, _)| t.as_str())
        .collect();
    assert!(bold.contains("[PERSON_"), "bold run got the person placeholder");
    assert!(
        italic.contains("[EMAIL_ADDRESS_"),
        "italic run got the email placeholder"
    );
}

#[tokio::test]
async fn docx_unredact_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    std::fs::write(&input, docx_fixture()).unwrap();

    let eng = engine();
    let redactor = DocumentRedactor::new(&eng);
    let outcome = redactor.redact_file(&input, None, true).await.unwrap();
    let session_id = outcome.session_id.unwrap();

    let restoration = redactor
        .unredact_file(outcome.redacted_file_path.as_ref(), &session_id)
        .await
        .unwrap();
    assert_eq!(restoration.entities_restored, 2);

    let runs = docx_runs(&std::fs::read(&restoration.unredacted_file_path).unwrap());
    let full: String = runs.iter().map(|(t, _, _)| t.as_str()).collect();
    assert_eq!(full, "Contact John Smith at john@example.com today.");
}

fn xlsx_fixture() -> Vec<u8> {
    let shared = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2"><si><t>Invoice for kate@corp.example</t></si><si><t>Quarterly totals</t></si></sst>"#;
    let sheet = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><f>SUM(C1:C9)</f><v>7</v></c></row></sheetData></worksheet>"#;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    for (name, body) in [
        ("[Content_Types].xml", "<Types/>"),
        ("xl/workbook.xml", "<workbook/>"),
        ("xl/sharedStrings.xml", shared),
        ("xl/worksheets/sheet1.xml", sheet),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn zip_entry(bytes: &[u8], name: &str) -> String {
    use std::io::Read;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut body = String::new();
    entry.read_to_string(&mut body).unwrap();
    body
}

#[tokio::test]
async fn xlsx_round_trips_through_one_session() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("book.xlsx");
    std::fs::write(&input, xlsx_fixture()).unwrap();

    let eng = engine();
    let redactor = DocumentRedactor::new(&eng);
    let outcome = redactor.redact_file(&input, None, true).await.unwrap();
    assert_eq!(outcome.entities_found, 1);

    let redacted_bytes = std::fs::read(&outcome.redacted_file_path).unwrap();
    let shared = zip_entry(&redacted_bytes, "xl/sharedStrings.xml");
    assert!(shared.contains("[EMAIL_ADDRESS_1]"));
    assert!(shared.contains("Quarterly totals"));
    let sheet = zip_entry(&redacted_bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("SUM(C1:C9)"), "formulas survive");

    let restoration = redactor
        .unredact_file(
            outcome.redacted_file_path.as_ref(),
            &outcome.session_id.unwrap(),
        )
        .await
        .unwrap();
    let restored_bytes = std::fs::read(&restoration.unredacted_file_path).unwrap();
    assert!(zip_entry(&restored_bytes, "xl/sharedStrings.xml").contains("kate@corp.example"));
}

fn pdf_fixture(text: &str, size: i64) -> Vec<u8> {
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

fn pdf_tj_strings(bytes: &[u8]) -> Vec<(f32, String)> {
    let doc = Document::load_mem(bytes).unwrap();
    let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    let mut out = Vec::new();
    let mut size = 0.0f32;
    for op in &content.operations {
        match op.operator.as_str() {
            "Tf" => {
                if let Some(value) = op.operands.get(1) {
                    size = match value {
                        Object::Real(v) => *v as f32,
                        Object::Integer(v) => *v as f32,
                        _ => size,
                    };
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    out.push((size, String::from_utf8_lossy(bytes).to_string()));
                }
            }
            _ => {}
        }
    }
    out
}

#[tokio::test]
async fn pdf_placeholder_mode_keeps_font_size_within_three_points() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("flyer.pdf");
    std::fs::write(
        &input,
        pdf_fixture("Contact john@example.com for details.", 18),
    )
    .unwrap();

    let eng = engine();
    let redactor = DocumentRedactor::new(&eng);
    let outcome = redactor.redact_file(&input, None, true).await.unwrap();
    assert!(outcome.session_id.is_some());

    let strings = pdf_tj_strings(&std::fs::read(&outcome.redacted_file_path).unwrap());
    let (size, text) = strings
        .iter()
        .find(|(_, t)| t.contains("[EMAIL_ADDRESS_1]"))
        .expect("placeholder text present");
    assert!(!text.contains("john@example.com"));
    assert!((15.0..=21.0).contains(size), "size {size} outside [15, 21]");
}

#[tokio::test]
async fn pdf_black_box_mode_returns_no_session() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("record.pdf");
    std::fs::write(&input, pdf_fixture("Patient SSN 123-45-6789 noted.", 12)).unwrap();

    let eng = engine();
    let redactor = DocumentRedactor::new(&eng);
    let outcome = redactor.redact_file(&input, None, false).await.unwrap();
    assert!(outcome.session_id.is_none());
    assert_eq!(outcome.entities_found, 1);

    let strings = pdf_tj_strings(&std::fs::read(&outcome.redacted_file_path).unwrap());
    assert!(strings.iter().all(|(_, t)| !t.contains("123-45-6789")));
}
