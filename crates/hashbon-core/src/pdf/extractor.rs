//! PDF text and table extraction using lopdf and pdf-extract.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::table::{group_into_lines, lines_to_text, Table, TableFinder, TextSpan};
use super::{PdfContent, PdfPage, PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::TableConfig;

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.5;

/// TJ adjustment, in em, treated as a word break.
const WORD_BREAK_EM: f32 = 0.2;

fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn matrix_from(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = get_number(operand)?;
    }
    Some(m)
}

/// Content-stream walker producing positioned text spans.
struct SpanCollector<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    text_matrix: Matrix,
    line_matrix: Matrix,
    spans: Vec<TextSpan>,
}

impl<'a> SpanCollector<'a> {
    fn new(doc: &'a Document, fonts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            spans: Vec::new(),
        }
    }

    fn apply(&mut self, op: &Operation) {
        let operands = op.operands.as_slice();

        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix_from(operands) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.font = name.clone();
                }
                if let Some(size) = operands.get(1).and_then(get_number) {
                    self.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                if op.operator == "TD" {
                    self.leading = -ty;
                }
                self.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(m) = matrix_from(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(obj) = operands.first() {
                    self.show(obj);
                }
            }
            "'" => {
                self.next_line();
                if let Some(obj) = operands.first() {
                    self.show(obj);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(obj) = operands.get(2) {
                    self.show(obj);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_array(items);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&translate(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn show(&mut self, obj: &Object) {
        if let Object::String(bytes, _) = obj {
            let text = self.decode(bytes);
            let advance = text.chars().count() as f32 * GLYPH_ADVANCE * self.font_size;
            self.emit(text, advance);
        }
    }

    fn show_array(&mut self, items: &[Object]) {
        let mut text = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = self.decode(bytes);
                    advance += decoded.chars().count() as f32 * GLYPH_ADVANCE * self.font_size;
                    text.push_str(&decoded);
                }
                other => {
                    if let Some(adjust) = get_number(other) {
                        let shift = -adjust / 1000.0;
                        if shift >= WORD_BREAK_EM && !text.is_empty() && !text.ends_with(' ') {
                            text.push(' ');
                        }
                        advance += shift * self.font_size;
                    }
                }
            }
        }

        self.emit(text, advance);
    }

    fn emit(&mut self, text: String, advance: f32) {
        if !text.trim().is_empty() {
            let trm = multiply(&self.text_matrix, &self.ctm);
            let h_scale = (trm[0] * trm[0] + trm[1] * trm[1]).sqrt();
            let v_scale = (trm[2] * trm[2] + trm[3] * trm[3]).sqrt();
            trace!("span {:?} at ({:.1}, {:.1})", text, trm[4], trm[5]);
            self.spans.push(TextSpan::new(
                text.trim().to_string(),
                trm[4],
                trm[5],
                advance * h_scale,
                self.font_size * v_scale,
            ));
        }
        self.text_matrix = multiply(&translate(advance, 0.0), &self.text_matrix);
    }

    /// UTF-16BE when marked with a BOM, then the font encoding, then Latin-1.
    fn decode(&self, bytes: &[u8]) -> String {
        if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
            let utf16: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            return String::from_utf16_lossy(&utf16);
        }

        if let Some(font_dict) = self.fonts.get(&self.font) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }

        bytes.iter().map(|&b| b as char).collect()
    }
}

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    finder: TableFinder,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            finder: TableFinder::default(),
        }
    }

    /// Use custom table detection tolerances.
    pub fn with_table_config(mut self, config: TableConfig) -> Self {
        self.finder = TableFinder::new(config);
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn page_id(&self, doc: &Document, page: u32) -> Result<ObjectId> {
        doc.get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }

    /// Positioned text spans of a page.
    pub fn extract_page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        let doc = self.document()?;
        let page_id = self.page_id(doc, page)?;

        let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
        let content_data = doc
            .get_page_content(page_id)
            .map_err(|e| PdfError::ContentDecode {
                page,
                reason: e.to_string(),
            })?;
        let content = Content::decode(&content_data).map_err(|e| PdfError::ContentDecode {
            page,
            reason: e.to_string(),
        })?;

        let mut collector = SpanCollector::new(doc, fonts);
        for op in &content.operations {
            collector.apply(op);
        }

        trace!("Page {}: {} spans", page, collector.spans.len());
        Ok(collector.spans)
    }

    /// lopdf's own text extraction, used when the walker finds nothing.
    fn fallback_page_text(&self, doc: &Document, page: u32) -> String {
        match doc.extract_text(&[page]) {
            Ok(text) => text.trim_end().to_string(),
            Err(e) => {
                debug!("lopdf text extraction failed on page {}: {}", page, e);
                String::new()
            }
        }
    }

    fn read_page(&self, doc: &Document, number: u32) -> Result<PdfPage> {
        let spans = self.extract_page_spans(number)?;
        let lines = group_into_lines(&spans, self.finder.config().y_tolerance);

        let mut text = lines_to_text(&lines, self.finder.config().word_gap);
        if text.trim().is_empty() {
            text = self.fallback_page_text(doc, number);
        }
        let tables = self.finder.find_tables_in_lines(number, &lines);

        debug!(
            "Page {}: {} lines, {} chars, {} tables",
            number,
            lines.len(),
            text.chars().count(),
            tables.len()
        );

        Ok(PdfPage {
            number,
            text,
            tables,
        })
    }

    /// Extract text and tables from every page.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let doc = self.document()?;

        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let pages = (1..=page_count)
            .map(|number| self.read_page(doc, number))
            .collect::<Result<Vec<_>>>()?;

        let mut content = PdfContent::from_pages(pages);

        if content.text.trim().is_empty() {
            match pdf_extract::extract_text_from_mem(&self.raw_data) {
                Ok(text) => {
                    debug!("Recovered {} chars with pdf-extract", text.len());
                    content.text = text;
                }
                Err(e) => warn!("No text layer found: {}", e),
            }
        }

        Ok(content)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        let spans = self.extract_page_spans(page)?;
        let config = self.finder.config();
        let text = lines_to_text(&group_into_lines(&spans, config.y_tolerance), config.word_gap);

        if text.trim().is_empty() {
            return Ok(self.fallback_page_text(doc, page));
        }
        Ok(text)
    }

    fn extract_page_tables(&self, page: u32) -> Result<Vec<Table>> {
        let spans = self.extract_page_spans(page)?;
        Ok(self.finder.find_tables(page, &spans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream, StringFormat};

    fn utf16(text: &str) -> Object {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }

    fn build_pdf(operations: Vec<Operation>) -> Vec<u8> {
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

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
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

    fn text_at(text: &str, x: i64, y: i64) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![utf16(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_all().is_err());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        let err = extractor.load(b"not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_multiply_applies_translation_after_scale() {
        let scaled = multiply(&translate(10.0, 20.0), &[2.0, 0.0, 0.0, 2.0, 5.0, 5.0]);
        assert_eq!(scaled, [2.0, 0.0, 0.0, 2.0, 25.0, 45.0]);
    }

    #[test]
    fn test_extract_spans_with_cm() {
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new("cm", vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 0.into()]),
        ];
        operations.extend(text_at("שלום", 50, 700));
        operations.push(Operation::new("Q", vec![]));
        operations.extend(text_at("עולם", 50, 650));

        let mut extractor = PdfExtractor::new();
        extractor.load(&build_pdf(operations)).unwrap();

        let spans = extractor.extract_page_spans(1).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "שלום");
        assert_eq!(spans[0].x, 150.0);
        assert_eq!(spans[0].y, 700.0);
        assert_eq!(spans[1].x, 50.0);
        assert_eq!(spans[1].font_size, 10.0);
    }

    #[test]
    fn test_extract_all_finds_text_and_tables() {
        let mut operations = Vec::new();
        operations.extend(text_at("Invoice", 50, 780));
        operations.extend(text_at("100", 50, 700));
        operations.extend(text_at("שלב", 250, 700));
        operations.extend(text_at("1,000", 50, 685));
        operations.extend(text_at("תכנון", 250, 685));

        let mut extractor = PdfExtractor::new();
        extractor.load(&build_pdf(operations)).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let content = extractor.extract_all().unwrap();
        assert_eq!(content.pages.len(), 1);
        assert!(content.text.starts_with("Invoice\n100 שלב\n"));
        assert!(content.text.ends_with('\n'));

        let tables: Vec<&Table> = content.tables().collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].rows[1],
            vec![Some("1,000".to_string()), Some("תכנון".to_string())]
        );

        assert_eq!(extractor.extract_page_tables(1).unwrap().len(), 1);
        assert!(matches!(
            extractor.extract_page_text(2),
            Err(PdfError::InvalidPage(2))
        ));
    }

    #[test]
    fn test_page_without_text_is_not_an_error() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&build_pdf(vec![])).unwrap();

        let content = extractor.extract_all().unwrap();
        assert_eq!(content.pages.len(), 1);
        assert!(content.text.trim().is_empty());
        assert_eq!(content.tables().count(), 0);
    }

    #[test]
    fn test_abutting_runs_join_without_space() {
        let mut operations = Vec::new();
        operations.extend(text_at("1,", 50, 700));
        operations.extend(text_at("000", 60, 700));
        operations.extend(text_at("ב", 260, 700));
        operations.extend(text_at("ל", 255, 700));
        operations.extend(text_at("ש", 250, 700));
        operations.extend(text_at("2,000", 50, 685));
        operations.extend(text_at("היתר", 250, 685));

        let mut extractor = PdfExtractor::new();
        extractor.load(&build_pdf(operations)).unwrap();

        let content = extractor.extract_all().unwrap();
        assert!(content.text.starts_with("1,000 שלב\n"));

        let tables: Vec<&Table> = content.tables().collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].rows[0],
            vec![Some("1,000".to_string()), Some("שלב".to_string())]
        );
        assert_eq!(
            crate::invoice::rules::parse_number(tables[0].rows[0][0].as_deref()),
            1000.0
        );
    }

    #[test]
    fn test_separate_words_keep_their_space() {
        let mut operations = Vec::new();
        operations.extend(text_at("חתימה", 50, 700));
        operations.extend(text_at("על", 80, 700));

        let mut extractor = PdfExtractor::new();
        extractor.load(&build_pdf(operations)).unwrap();
        assert_eq!(extractor.extract_page_text(1).unwrap(), "חתימה על");
    }

    #[test]
    fn test_tj_array_joins_fragments() {
        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    utf16("סכום"),
                    Object::Integer(-400),
                    utf16("כולל"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];

        let mut extractor = PdfExtractor::new();
        extractor.load(&build_pdf(operations)).unwrap();
        assert_eq!(extractor.extract_page_text(1).unwrap(), "סכום כולל");
    }
}
