//! FILENAME: core/report-engine/src/document.rs
//! PURPOSE: The spreadsheet primitives the template pipeline needs.
//! CONTEXT: Analysis, blueprint extraction and rendering only talk to this
//! trait. `engine::Worksheet` is the in-memory implementation; rows and
//! columns are 0-based.

use engine::{CellRange, CellStyle, CellValue, Hyperlink, Worksheet};

pub trait SheetDocument {
    fn cell_value(&self, row: u32, col: u32) -> CellValue;

    fn set_cell_value(&mut self, row: u32, col: u32, value: CellValue);

    /// Full style snapshot of a cell (the default style when unset).
    fn style(&self, row: u32, col: u32) -> CellStyle;

    fn apply_style(&mut self, row: u32, col: u32, style: &CellStyle);

    fn merge_cells(&mut self, range: CellRange);

    fn merged_ranges(&self) -> Vec<CellRange>;

    /// Inserts a blank row; rows at or after `row` move down by one.
    fn insert_row_before(&mut self, row: u32);

    /// Deletes a row; rows after it move up by one.
    fn remove_row(&mut self, row: u32);

    fn highest_row(&self) -> Option<u32>;

    fn highest_column(&self) -> Option<u32>;

    fn set_hyperlink(&mut self, row: u32, col: u32, link: Hyperlink);
}

impl SheetDocument for Worksheet {
    fn cell_value(&self, row: u32, col: u32) -> CellValue {
        self.value(row, col)
    }

    fn set_cell_value(&mut self, row: u32, col: u32, value: CellValue) {
        self.set_value(row, col, value);
    }

    fn style(&self, row: u32, col: u32) -> CellStyle {
        Worksheet::style(self, row, col).clone()
    }

    fn apply_style(&mut self, row: u32, col: u32, style: &CellStyle) {
        // Default style on an absent cell: nothing to store
        if self.get_cell(row, col).is_none() && *style == CellStyle::default() {
            return;
        }
        self.set_style(row, col, style.clone());
    }

    fn merge_cells(&mut self, range: CellRange) {
        self.merge(range);
    }

    fn merged_ranges(&self) -> Vec<CellRange> {
        self.merged_regions.clone()
    }

    fn insert_row_before(&mut self, row: u32) {
        Worksheet::insert_row_before(self, row);
    }

    fn remove_row(&mut self, row: u32) {
        Worksheet::remove_row(self, row);
    }

    fn highest_row(&self) -> Option<u32> {
        Worksheet::highest_row(self)
    }

    fn highest_column(&self) -> Option<u32> {
        Worksheet::highest_column(self)
    }

    fn set_hyperlink(&mut self, row: u32, col: u32, link: Hyperlink) {
        Worksheet::set_hyperlink(self, row, col, link);
    }
}
