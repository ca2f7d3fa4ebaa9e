//! FILENAME: core/report-engine/src/default_renderer.rs
//! PURPOSE: Plain tabular layout used when no template is available.
//! CONTEXT: Title on row 0, column labels on row 2, then the tree: a shaded
//! label row per group, its children, its totals row and one spacer row.
//! A "Grand Total" row closes the sheet.

use engine::{CellRange, CellStyle, CellValue, Color, TextAlign, Worksheet};

use crate::definition::{ColumnFormat, ReportDefinition};
use crate::format::{format_amount, format_value};
use crate::processor::{ProcessedReport, ReportNode, Totals};
use crate::record::Record;
use crate::renderer::{RowCursor, GROUP_FALLBACK_PREFIX, TOTAL_FALLBACK_PREFIX};

pub const MAX_SHEET_NAME_LEN: usize = 31;
pub const DEFAULT_SHEET_NAME: &str = "Report";
pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

const TITLE_ROW: u32 = 0;
const HEADER_ROW: u32 = 2;
/// The title is merged across columns A..F.
const TITLE_LAST_COL: u32 = 5;
const TITLE_FONT_SIZE: u8 = 14;
const GROUP_FILL: Color = Color::new(0xEE, 0xEE, 0xEE);

/// Sheet name derived from a report title: characters Excel forbids are
/// dropped and the result is cut to 31 characters.
pub fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');

    if cleaned.is_empty() {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Lays out `report` on a fresh worksheet.
pub fn render_default<R: Record>(
    definition: &ReportDefinition,
    report: &ProcessedReport<'_, R>,
) -> Worksheet {
    let mut sheet = Worksheet::new(sheet_name(&definition.title));
    let mut layout = DefaultLayout {
        sheet: &mut sheet,
        definition,
    };

    layout.write_title();
    layout.write_header();

    let mut cursor = RowCursor::new(HEADER_ROW + 1);
    layout.write_nodes(&report.data, &mut cursor);
    layout.write_totals(&report.grand_totals, GRAND_TOTAL_LABEL.to_string(), &mut cursor);

    log::debug!(
        target: "REPORT",
        "default layout wrote {} rows",
        cursor.row()
    );

    sheet
}

struct DefaultLayout<'a> {
    sheet: &'a mut Worksheet,
    definition: &'a ReportDefinition,
}

impl DefaultLayout<'_> {
    fn write_title(&mut self) {
        self.sheet
            .set_value(TITLE_ROW, 0, self.definition.title.as_str());
        self.sheet.set_style(
            TITLE_ROW,
            0,
            CellStyle::new()
                .with_bold(true)
                .with_font_size(TITLE_FONT_SIZE),
        );
        self.sheet
            .merge(CellRange::on_row(TITLE_ROW, 0, TITLE_LAST_COL));
    }

    fn write_header(&mut self) {
        let bold = CellStyle::new().with_bold(true);
        for (col, column) in self.definition.columns.iter().enumerate() {
            let col = col as u32;
            self.sheet.set_value(HEADER_ROW, col, column.label.as_str());
            self.sheet.set_style(HEADER_ROW, col, bold.clone());
            if let Some(width) = column.width {
                self.sheet.column_widths.insert(col, width);
            }
        }
    }

    fn write_nodes<R: Record>(&mut self, nodes: &[ReportNode<'_, R>], cursor: &mut RowCursor) {
        for node in nodes {
            match node {
                ReportNode::Group(group) => {
                    let row = cursor.row();
                    let label = format!("{}{}", GROUP_FALLBACK_PREFIX, group.group_value);
                    self.sheet.set_value(row, 0, label);
                    self.sheet.set_style(
                        row,
                        0,
                        CellStyle::new().with_bold(true).with_fill(GROUP_FILL),
                    );
                    cursor.advance();

                    self.write_nodes(&group.items, cursor);

                    let label = format!("{}{}", TOTAL_FALLBACK_PREFIX, group.group_value);
                    self.write_totals(&group.totals, label, cursor);
                    // spacer
                    cursor.advance();
                }
                ReportNode::Item(record) => {
                    self.write_item(*record, cursor.row());
                    cursor.advance();
                }
            }
        }
    }

    fn write_item<R: Record>(&mut self, record: &R, row: u32) {
        for (col, column) in self.definition.columns.iter().enumerate() {
            let col = col as u32;
            let raw = record.field(&column.field);
            let value = match column.format {
                ColumnFormat::None => raw,
                format => CellValue::Text(format_value(&raw, format)),
            };
            self.sheet.set_value(row, col, value);
            if column.format == ColumnFormat::Currency {
                self.sheet.set_style(
                    row,
                    col,
                    CellStyle::new().with_text_align(TextAlign::Right),
                );
            }
        }
    }

    fn write_totals(&mut self, totals: &Totals, label: String, cursor: &mut RowCursor) {
        let row = cursor.row();
        let emphasis = CellStyle::new()
            .with_bold(true)
            .with_text_align(TextAlign::Right);

        self.sheet.set_value(row, 0, label);
        self.sheet.set_style(row, 0, emphasis.clone());

        for (col, column) in self.definition.columns.iter().enumerate() {
            if let Some(amount) = totals.get(&column.field) {
                let col = col as u32;
                self.sheet.set_value(row, col, format_amount(*amount));
                self.sheet.set_style(row, col, emphasis.clone());
            }
        }

        cursor.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name() {
        assert_eq!(sheet_name("Sales"), "Sales");
        assert_eq!(sheet_name(""), DEFAULT_SHEET_NAME);
        assert_eq!(sheet_name("Q1/Q2: [draft]"), "Q1Q2 draft");
        let long = "x".repeat(40);
        assert_eq!(sheet_name(&long).len(), MAX_SHEET_NAME_LEN);
    }
}
