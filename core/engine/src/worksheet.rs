//! FILENAME: core/engine/src/worksheet.rs
//! PURPOSE: A single in-memory worksheet: cells, styles, merges, hyperlinks, dimensions.
//! CONTEXT: Sparse storage (HashMap) keyed by 0-based (row, col), like the
//! spreadsheet grid. Row insertion and removal shift every positional
//! structure (cells, merged regions, hyperlinks, row heights) together so
//! callers can keep a single row cursor while growing the sheet.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cell::{Cell, CellValue};
use crate::coord::CellRange;
use crate::hyperlink::Hyperlink;
use crate::style::{CellStyle, StyleRegistry};

#[derive(Debug, Clone)]
pub struct Worksheet {
    pub name: String,

    /// Sparse storage: keys are (row, col), values are Cell instances.
    pub cells: HashMap<(u32, u32), Cell>,

    pub styles: StyleRegistry,

    pub merged_regions: Vec<CellRange>,

    pub hyperlinks: HashMap<(u32, u32), Hyperlink>,

    /// Column widths in Excel character units.
    pub column_widths: HashMap<u32, f64>,

    /// Row heights in points.
    pub row_heights: HashMap<u32, f64>,

    max_row: Option<u32>,
    max_col: Option<u32>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Worksheet {
            name: name.into(),
            cells: HashMap::new(),
            styles: StyleRegistry::new(),
            merged_regions: Vec::new(),
            hyperlinks: HashMap::new(),
            column_widths: HashMap::new(),
            row_heights: HashMap::new(),
            max_row: None,
            max_col: None,
        }
    }

    // ========================================================================
    // CELLS
    // ========================================================================

    /// Sets a cell at the specified coordinates.
    /// Updates the used-range bounds automatically.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.max_row = Some(self.max_row.map_or(row, |m| m.max(row)));
        self.max_col = Some(self.max_col.map_or(col, |m| m.max(col)));
        self.cells.insert((row, col), cell);
    }

    /// Returns None if the cell is not stored.
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// The cell's value, or Empty when the cell is not stored.
    pub fn value(&self, row: u32, col: u32) -> CellValue {
        self.get_cell(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Replaces the value and keeps the cell's style.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        let style_index = self.get_cell(row, col).map_or(0, |c| c.style_index);
        self.set_cell(
            row,
            col,
            Cell {
                value: value.into(),
                style_index,
            },
        );
    }

    // ========================================================================
    // STYLES
    // ========================================================================

    /// The resolved style of a cell (default style when not stored).
    pub fn style(&self, row: u32, col: u32) -> &CellStyle {
        let index = self.get_cell(row, col).map_or(0, |c| c.style_index);
        self.styles.get(index)
    }

    /// Sets the full style of a cell, creating a blank cell if needed.
    pub fn set_style(&mut self, row: u32, col: u32, style: CellStyle) {
        let style_index = self.styles.get_or_create(style);
        let value = self.value(row, col);
        self.set_cell(row, col, Cell { value, style_index });
    }

    // ========================================================================
    // MERGES & HYPERLINKS
    // ========================================================================

    /// Adds a merged region. A region overlapping an existing one replaces it.
    pub fn merge(&mut self, range: CellRange) {
        self.merged_regions.retain(|r| {
            range.end_row < r.start_row
                || range.start_row > r.end_row
                || range.end_col < r.start_col
                || range.start_col > r.end_col
        });
        self.merged_regions.push(range);
    }

    pub fn set_hyperlink(&mut self, row: u32, col: u32, link: Hyperlink) {
        self.hyperlinks.insert((row, col), link);
    }

    pub fn hyperlink(&self, row: u32, col: u32) -> Option<&Hyperlink> {
        self.hyperlinks.get(&(row, col))
    }

    // ========================================================================
    // BOUNDS
    // ========================================================================

    /// Highest used row index, or None for an empty sheet.
    pub fn highest_row(&self) -> Option<u32> {
        self.max_row
    }

    /// Highest used column index, or None for an empty sheet.
    pub fn highest_column(&self) -> Option<u32> {
        self.max_col
    }

    /// Recalculates the used range by scanning all cells.
    fn recalculate_bounds(&mut self) {
        self.max_row = self.cells.keys().map(|&(r, _)| r).max();
        self.max_col = self.cells.keys().map(|&(_, c)| c).max();
    }

    // ========================================================================
    // ROW STRUCTURE
    // ========================================================================

    /// Inserts one blank row before `row`; everything at or below it moves down.
    /// A merged region spanning the insertion point grows by one row.
    pub fn insert_row_before(&mut self, row: u32) {
        let below = |r: u32| r >= row;
        move_keys(&mut self.cells, |&(r, _)| below(r), |(r, c)| (r + 1, c));
        move_keys(&mut self.hyperlinks, |&(r, _)| below(r), |(r, c)| (r + 1, c));
        move_keys(&mut self.row_heights, |&r| below(r), |r| r + 1);

        for region in &mut self.merged_regions {
            if region.start_row >= row {
                region.start_row += 1;
                region.end_row += 1;
            } else if region.end_row >= row {
                region.end_row += 1;
            }
        }

        // Columns are unaffected; the last row moves only if it was shifted
        if let Some(max_row) = self.max_row.filter(|&m| m >= row) {
            self.max_row = Some(max_row + 1);
        }
    }

    /// Removes `row`; everything below it moves up by one.
    /// Merged regions lying entirely on the row are dropped, taller ones shrink.
    pub fn remove_row(&mut self, row: u32) {
        self.cells.retain(|&(r, _), _| r != row);
        self.hyperlinks.retain(|&(r, _), _| r != row);
        self.row_heights.remove(&row);

        move_keys(&mut self.cells, |&(r, _)| r > row, |(r, c)| (r - 1, c));
        move_keys(&mut self.hyperlinks, |&(r, _)| r > row, |(r, c)| (r - 1, c));
        move_keys(&mut self.row_heights, |&r| r > row, |r| r - 1);

        self.merged_regions.retain(|region| !region.is_within_row(row));
        for region in &mut self.merged_regions {
            if region.start_row > row {
                region.start_row -= 1;
                region.end_row -= 1;
            } else if region.end_row >= row {
                region.end_row -= 1;
            }
        }

        self.recalculate_bounds();
    }
}

impl Default for Worksheet {
    fn default() -> Self {
        Worksheet::new("Sheet1")
    }
}

/// Re-keys the entries selected by `affected`. All of them are taken out
/// before any is reinserted, so shifted keys never collide.
fn move_keys<K, V>(map: &mut HashMap<K, V>, affected: impl Fn(&K) -> bool, remap: impl Fn(K) -> K)
where
    K: Copy + Eq + Hash,
{
    let keys: Vec<K> = map.keys().filter(|k| affected(k)).copied().collect();
    let moved: Vec<(K, V)> = keys
        .into_iter()
        .filter_map(|key| map.remove(&key).map(|value| (remap(key), value)))
        .collect();
    map.extend(moved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn sample() -> Worksheet {
        let mut sheet = Worksheet::new("Test");
        sheet.set_value(0, 0, "header");
        sheet.set_value(1, 0, "body");
        sheet.set_value(2, 0, "footer");
        sheet.set_value(2, 3, 42.0);
        sheet
    }

    #[test]
    fn test_bounds_track_cells() {
        let mut sheet = Worksheet::new("Test");
        assert_eq!(sheet.highest_row(), None);
        assert_eq!(sheet.highest_column(), None);

        sheet.set_value(4, 2, "x");
        assert_eq!(sheet.highest_row(), Some(4));
        assert_eq!(sheet.highest_column(), Some(2));

        sheet.remove_row(4);
        assert_eq!(sheet.highest_row(), None);
        assert_eq!(sheet.highest_column(), None);
    }

    #[test]
    fn test_set_value_keeps_style() {
        let mut sheet = Worksheet::new("Test");
        sheet.set_style(0, 0, CellStyle::new().with_bold(true));
        sheet.set_value(0, 0, "bold text");

        assert!(sheet.style(0, 0).font.bold);
        assert_eq!(sheet.value(0, 0), CellValue::Text("bold text".to_string()));
    }

    #[test]
    fn test_insert_row_shifts_cells_and_merges() {
        let mut sheet = sample();
        sheet.merge(CellRange::on_row(2, 0, 2));
        sheet.set_hyperlink(2, 0, Hyperlink::new("/x"));
        sheet.row_heights.insert(2, 30.0);

        sheet.insert_row_before(1);

        assert_eq!(sheet.value(0, 0).display(), "header");
        assert!(sheet.value(1, 0).is_empty());
        assert_eq!(sheet.value(2, 0).display(), "body");
        assert_eq!(sheet.value(3, 0).display(), "footer");
        assert_eq!(sheet.value(3, 3), CellValue::Number(42.0));
        assert_eq!(sheet.merged_regions, vec![CellRange::on_row(3, 0, 2)]);
        assert!(sheet.hyperlink(3, 0).is_some());
        assert_eq!(sheet.row_heights.get(&3), Some(&30.0));
        assert_eq!(sheet.highest_row(), Some(3));
    }

    #[test]
    fn test_insert_below_used_range_keeps_bounds() {
        let mut sheet = sample();
        sheet.insert_row_before(10);
        assert_eq!(sheet.highest_row(), Some(2));
        assert_eq!(sheet.highest_column(), Some(3));
        assert_eq!(sheet.value(2, 3), CellValue::Number(42.0));

        sheet.insert_row_before(0);
        sheet.insert_row_before(0);
        assert_eq!(sheet.highest_row(), Some(4));
        assert_eq!(sheet.value(4, 0).display(), "footer");
        assert_eq!(sheet.cells.len(), 4);
    }

    #[test]
    fn test_insert_inside_tall_merge_grows_it() {
        let mut sheet = sample();
        sheet.merge(CellRange::new(0, 1, 2, 1));
        sheet.insert_row_before(1);
        assert_eq!(sheet.merged_regions, vec![CellRange::new(0, 1, 3, 1)]);
    }

    #[test]
    fn test_remove_row_shifts_up_and_drops_row_merges() {
        let mut sheet = sample();
        sheet.merge(CellRange::on_row(1, 0, 3));
        sheet.merge(CellRange::on_row(2, 0, 1));

        sheet.remove_row(1);

        assert_eq!(sheet.value(0, 0).display(), "header");
        assert_eq!(sheet.value(1, 0).display(), "footer");
        assert_eq!(sheet.value(1, 3), CellValue::Number(42.0));
        assert!(sheet.value(2, 0).is_empty());
        assert_eq!(sheet.merged_regions, vec![CellRange::on_row(1, 0, 1)]);
        assert_eq!(sheet.highest_row(), Some(1));
    }

    #[test]
    fn test_insert_then_remove_is_identity() {
        let mut sheet = sample();
        sheet.set_style(2, 0, CellStyle::new().with_fill(Color::new(238, 238, 238)));
        let before = sheet.cells.clone();

        sheet.insert_row_before(1);
        sheet.remove_row(1);

        assert_eq!(sheet.cells, before);
    }

    #[test]
    fn test_overlapping_merge_replaces_existing() {
        let mut sheet = Worksheet::new("Test");
        sheet.merge(CellRange::on_row(0, 0, 2));
        sheet.merge(CellRange::on_row(0, 1, 4));
        assert_eq!(sheet.merged_regions, vec![CellRange::on_row(0, 1, 4)]);
    }
}
