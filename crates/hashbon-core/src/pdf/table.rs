//! Table reconstruction from positioned text spans.
//!
//! Spans are grouped into lines by baseline, lines are cut into cells at wide
//! horizontal gaps, and runs of consecutive multi-cell lines become tables.
//! Columns are anchored on the widest row of each run; cells of the other
//! rows snap to the nearest anchor. Grids are always rectangular and ordered
//! left to right, so in a right-to-left document the last column is the
//! rightmost one.

use serde::Serialize;

use crate::models::config::TableConfig;

/// A run of text drawn at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Text content as decoded from the content stream.
    pub text: String,
    /// Left edge in page space.
    pub x: f32,
    /// Baseline in page space (origin bottom-left).
    pub y: f32,
    /// Estimated advance width.
    pub width: f32,
    /// Effective font size.
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
        }
    }

    /// Right edge in page space.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub y: f32,
}

impl TextLine {
    /// Line text, spans joined left to right.
    ///
    /// Spans closer than `word_gap` are parts of one word and are joined
    /// without a space.
    pub fn text(&self, word_gap: f32) -> String {
        let mut text = String::new();
        let mut right: Option<f32> = None;

        for span in &self.spans {
            if let Some(prev) = right {
                append_span(&mut text, prev, span, word_gap);
            } else {
                text.push_str(&span.text);
            }
            right = Some(right.map_or(span.right(), |r| r.max(span.right())));
        }

        text
    }

    /// Largest font size on the line.
    pub fn font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.font_size).fold(0.0, f32::max)
    }
}

/// Group spans into lines, top to bottom, each line sorted left to right.
pub fn group_into_lines(spans: &[TextSpan], y_tolerance: f32) -> Vec<TextLine> {
    let mut sorted: Vec<TextSpan> = spans
        .iter()
        .filter(|s| !s.text.trim().is_empty())
        .cloned()
        .collect();
    sorted.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    for span in sorted {
        match lines.last_mut() {
            Some(line) if (line.y - span.y).abs() <= y_tolerance => line.spans.push(span),
            _ => {
                let y = span.y;
                lines.push(TextLine { spans: vec![span], y });
            }
        }
    }

    for line in &mut lines {
        line.spans
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }

    lines
}

/// Page text: one line per baseline, top to bottom.
pub fn lines_to_text(lines: &[TextLine], word_gap: f32) -> String {
    lines
        .iter()
        .map(|line| line.text(word_gap))
        .collect::<Vec<_>>()
        .join("\n")
}

fn append_span(text: &mut String, prev_right: f32, span: &TextSpan, word_gap: f32) {
    if span.x - prev_right >= word_gap {
        text.push(' ');
    }
    text.push_str(&span.text);
}

/// A horizontal cluster of spans forming one cell.
#[derive(Debug, Clone)]
struct CellRun {
    text: String,
    left: f32,
    right: f32,
}

impl CellRun {
    fn center(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

fn split_cells(line: &TextLine, column_gap: f32, word_gap: f32) -> Vec<CellRun> {
    let mut cells: Vec<CellRun> = Vec::new();

    for span in &line.spans {
        match cells.last_mut() {
            Some(cell) if span.x - cell.right <= column_gap => {
                append_span(&mut cell.text, cell.right, span, word_gap);
                cell.right = cell.right.max(span.right());
            }
            _ => cells.push(CellRun {
                text: span.text.clone(),
                left: span.x,
                right: span.right(),
            }),
        }
    }

    cells
}

/// A rectangular grid of cells. Row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    /// Page number (1-indexed) the table was found on.
    pub page: u32,
    /// Cell grid; `None` where a row has no text in a column.
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(page: u32, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { page, rows }
    }

    /// Number of rows, header included.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the header row.
    pub fn num_cols(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Header row (first row).
    pub fn header(&self) -> Option<&[Option<String>]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Data rows (all rows except header).
    pub fn data_rows(&self) -> &[Vec<Option<String>>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Builds tables from the spans of one page.
pub struct TableFinder {
    config: TableConfig,
}

impl TableFinder {
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Find tables on a page, top to bottom.
    pub fn find_tables(&self, page: u32, spans: &[TextSpan]) -> Vec<Table> {
        let lines = group_into_lines(spans, self.config.y_tolerance);
        self.find_tables_in_lines(page, &lines)
    }

    /// Find tables in already grouped lines.
    pub fn find_tables_in_lines(&self, page: u32, lines: &[TextLine]) -> Vec<Table> {
        let mut tables = Vec::new();
        let mut run: Vec<(&TextLine, Vec<CellRun>)> = Vec::new();

        for line in lines {
            let cells = split_cells(line, self.config.column_gap, self.config.word_gap);
            let is_row = cells.len() >= self.config.min_columns.max(1);

            let continues = match run.last() {
                Some((prev, _)) => {
                    let step = prev.y - line.y;
                    let limit =
                        self.config.max_row_gap_factor * prev.font_size().max(line.font_size());
                    is_row && step <= limit
                }
                None => is_row,
            };

            if !continues {
                if let Some(table) = build_table(page, &run) {
                    tables.push(table);
                }
                run.clear();
            }

            if is_row {
                run.push((line, cells));
            }
        }

        if let Some(table) = build_table(page, &run) {
            tables.push(table);
        }

        tables
    }
}

impl Default for TableFinder {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

fn build_table(page: u32, run: &[(&TextLine, Vec<CellRun>)]) -> Option<Table> {
    if run.len() < 2 {
        return None;
    }

    // First widest row defines the columns.
    let anchors: Vec<f32> = run
        .iter()
        .map(|(_, cells)| cells)
        .fold(None::<&Vec<CellRun>>, |widest, cells| match widest {
            Some(w) if w.len() >= cells.len() => Some(w),
            _ => Some(cells),
        })?
        .iter()
        .map(CellRun::center)
        .collect();

    let rows = run
        .iter()
        .map(|(_, cells)| {
            let mut row: Vec<Option<String>> = vec![None; anchors.len()];
            for cell in cells {
                let col = nearest_anchor(&anchors, cell.center());
                match &mut row[col] {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&cell.text);
                    }
                    slot => *slot = Some(cell.text.clone()),
                }
            }
            row
        })
        .collect();

    Some(Table::new(page, rows))
}

fn nearest_anchor(anchors: &[f32], x: f32) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - x)
                .abs()
                .partial_cmp(&(*b - x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text, x, y, text.chars().count() as f32 * 5.0, 10.0)
    }

    fn cell(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    #[test]
    fn test_group_into_lines() {
        let spans = vec![
            span("World", 160.0, 700.0),
            span("Hello", 100.0, 701.5),
            span("Next line", 100.0, 680.0),
            span("   ", 300.0, 680.0),
        ];

        let lines = group_into_lines(&spans, 3.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(3.0), "Hello World");
        assert_eq!(lines[1].text(3.0), "Next line");
        assert_eq!(lines_to_text(&lines, 3.0), "Hello World\nNext line");
    }

    #[test]
    fn test_adjacent_spans_share_a_cell() {
        let line = TextLine {
            spans: vec![span("abc", 100.0, 700.0), span("def", 120.0, 700.0), span("x", 200.0, 700.0)],
            y: 700.0,
        };
        let cells = split_cells(&line, 12.0, 3.0);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].text, "abc def");
        assert_eq!(cells[1].text, "x");
    }

    #[test]
    fn test_abutting_spans_form_one_word() {
        let line = TextLine {
            spans: vec![span("1,", 50.0, 700.0), span("000", 60.0, 700.0), span("x", 200.0, 700.0)],
            y: 700.0,
        };
        assert_eq!(line.text(3.0), "1,000 x");

        let cells = split_cells(&line, 12.0, 3.0);
        assert_eq!(cells[0].text, "1,000");
        assert_eq!(cells[0].right, 75.0);
    }

    #[test]
    fn test_find_table_with_missing_cell() {
        let spans = vec![
            span("Invoice 12", 50.0, 760.0),
            span("a", 50.0, 700.0),
            span("b", 150.0, 700.0),
            span("c", 250.0, 700.0),
            span("1", 50.0, 685.0),
            span("3", 250.0, 685.0),
            span("4", 50.0, 670.0),
            span("5", 150.0, 670.0),
            span("6", 250.0, 670.0),
            span("Total due", 50.0, 600.0),
        ];

        let tables = TableFinder::default().find_tables(2, &spans);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.page, 2);
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_cols(), 3);
        assert_eq!(table.rows[1], vec![cell("1"), None, cell("3")]);
        assert_eq!(table.data_rows().len(), 2);
    }

    #[test]
    fn test_large_vertical_gap_splits_tables() {
        let spans = vec![
            span("a", 50.0, 700.0),
            span("b", 150.0, 700.0),
            span("c", 50.0, 690.0),
            span("d", 150.0, 690.0),
            span("e", 50.0, 500.0),
            span("f", 150.0, 500.0),
            span("g", 50.0, 490.0),
            span("h", 150.0, 490.0),
        ];

        let tables = TableFinder::default().find_tables(1, &spans);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows[0], vec![cell("a"), cell("b")]);
        assert_eq!(tables[1].rows[1], vec![cell("g"), cell("h")]);
    }

    #[test]
    fn test_single_row_is_not_a_table() {
        let spans = vec![span("a", 50.0, 700.0), span("b", 150.0, 700.0)];
        assert!(TableFinder::default().find_tables(1, &spans).is_empty());
    }

    #[test]
    fn test_empty_table_accessors() {
        let table = Table::default();
        assert_eq!(table.num_cols(), 0);
        assert!(table.header().is_none());
        assert!(table.data_rows().is_empty());
    }
}
