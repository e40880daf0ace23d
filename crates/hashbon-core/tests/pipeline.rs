//! End-to-end extraction over PDFs built in memory.

use hashbon_core::export::{save_csv, UTF8_BOM};
use hashbon_core::models::vocabulary::COMPANY_COLUMN;
use hashbon_core::{
    process_pdf, to_tracking_rows, tracking_file_name, CellValue, HashbonConfig, HashbonError,
    PdfError,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use pretty_assertions::assert_eq;

fn utf16(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn text_at(text: &str, x: i64, y: i64) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![utf16(text)]),
        Operation::new("ET", vec![]),
    ]
}

fn row(cells: &[(&str, i64)], y: i64) -> Vec<Operation> {
    cells
        .iter()
        .filter(|(text, _)| !text.is_empty())
        .flat_map(|(text, x)| text_at(text, *x, y))
        .collect()
}

const COLUMNS: [i64; 4] = [50, 150, 250, 400];

fn table_rows(rows: &[[&str; 4]], top: i64) -> Vec<Operation> {
    rows.iter()
        .enumerate()
        .flat_map(|(i, cells)| {
            let placed: Vec<(&str, i64)> = cells.iter().copied().zip(COLUMNS).collect();
            row(&placed, top - 15 * i as i64)
        })
        .collect()
}

fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

fn milestone_page(first_stage: &str) -> Vec<Operation> {
    let mut operations = text_at("חשבון מאת KOT", 50, 780);
    operations.extend(table_rows(
        &[
            ["םוכס", "אחוז", "תיאור", "בלש"],
            ["1,000", "10%", "תכנון", first_stage],
            ["2,000", "20%", "היתר", "טופס 4"],
            ["3,000", "", "", "סה\"כ"],
        ],
        700,
    ));
    operations.extend(text_at("סה\"כ (כולל מע\"מ) לתשלום 3,510 ₪", 50, 600));
    operations
}

#[test]
fn test_pipeline_extracts_phases_and_totals() {
    let data = build_pdf(vec![milestone_page("חתימה על החוזה")]);
    let (content, result) = process_pdf(&data, &HashbonConfig::default()).unwrap();

    assert_eq!(content.pages.len(), 1);
    assert_eq!(result.company, "קיי.או.טי אדריכלים");
    assert_eq!(result.headers, vec!["סכום", "אחוז", "תיאור", "שלב"]);
    assert_eq!(result.phases.len(), 2);
    assert_eq!(result.phases[0].stage, CellValue::Text("חתימה על החוזה".into()));
    assert_eq!(result.phases[1].get("סכום"), Some(&CellValue::Number(2000.0)));
    assert_eq!(result.contract_total, 2000.0);
    assert_eq!(result.billed_total, 3000.0);
    assert_eq!(result.vat_total, 3510.0);
}

#[test]
fn test_pipeline_writes_tracking_csv() {
    let data = build_pdf(vec![milestone_page("חתימה על החוזה")]);
    let (_, result) = process_pdf(&data, &HashbonConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = HashbonConfig::default();
    let path = dir.path().join(tracking_file_name(
        std::path::Path::new("invoice.pdf"),
        &config.export.file_suffix,
    ));
    save_csv(&to_tracking_rows(&result, COMPANY_COLUMN), &path, &config.export).unwrap();

    assert!(path.ends_with("invoice_tracking.csv"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "סכום,אחוז,תיאור,שלב,שם/חברה נבחרת");
    assert_eq!(lines[1], "1000.0,10.0,תכנון,חתימה על החוזה,קיי.או.טי אדריכלים");
}

#[test]
fn test_pipeline_first_qualifying_table_wins() {
    let data = build_pdf(vec![milestone_page("מצגת דיירים"), milestone_page("הגשת ההיתר")]);
    let (content, result) = process_pdf(&data, &HashbonConfig::default()).unwrap();

    assert_eq!(content.tables().count(), 2);
    assert_eq!(result.phases.len(), 2);
    assert_eq!(result.phases[0].stage_text(), "מצגת דיירים");
    assert!(result.phases.iter().all(|p| p.stage_text() != "הגשת ההיתר"));
}

#[test]
fn test_pipeline_without_milestone_table() {
    let mut operations = text_at("ירון אליאב", 50, 780);
    operations.extend(table_rows(
        &[["פריט", "כמות", "מחיר", "הערה"], ["נייר", "2", "15", "-"]],
        700,
    ));
    let data = build_pdf(vec![operations]);

    let (content, result) = process_pdf(&data, &HashbonConfig::default()).unwrap();
    assert_eq!(content.tables().count(), 1);
    assert!(result.is_empty());
    assert!(result.headers.is_empty());
    assert_eq!(result.company, "ירון אליאב");
}

#[test]
fn test_pipeline_rejects_unreadable_input() {
    let err = process_pdf(b"%PDF-1.5 broken", &HashbonConfig::default()).unwrap_err();
    assert!(matches!(err, HashbonError::Pdf(PdfError::Parse(_))));
}
