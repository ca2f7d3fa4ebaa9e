//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Utilities for converting between spreadsheet coordinate formats.
//! CONTEXT: Converts between A1-style notation ("A1", "AA100", "A1:C1") and the
//! 0-based (row, col) indices used internally.
//! Column "A" = 0, "B" = 1, ..., "Z" = 25, "AA" = 26, etc.
//! Row 1 in A1 notation = row 0 internally.

use serde::{Deserialize, Serialize};

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Converts a column string (e.g., "A", "AA", "ABC") to a 0-based column index.
/// Returns None for an empty string or non-alphabetic characters.
pub fn col_to_index(col_str: &str) -> Option<u32> {
    if col_str.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result.checked_mul(26)?.checked_add(digit)?;
    }
    Some(result - 1)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 1 -> "B", ..., 25 -> "Z", 26 -> "AA", 27 -> "AB", etc.
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Parses an A1-style reference ("B3", "$B$3") into a 0-based coordinate.
pub fn parse_a1(reference: &str) -> Option<CellCoord> {
    let cleaned: String = reference.chars().filter(|c| *c != '$').collect();
    let split = cleaned.find(|c: char| c.is_ascii_digit())?;
    let (col_part, row_part) = cleaned.split_at(split);
    let col = col_to_index(col_part)?;
    let row_num: u32 = row_part.parse().ok()?;
    if row_num == 0 {
        return None;
    }
    Some((row_num - 1, col))
}

/// Converts a 0-based (row, col) coordinate to an A1-style reference string.
/// (0, 0) -> "A1", (1, 1) -> "B2", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row + 1)
}

/// A rectangular block of cells, inclusive on both ends.
/// Used for merged regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    /// Creates a range, normalizing so that start <= end on both axes.
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        CellRange {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    /// A range spanning `start_col..=end_col` on a single row.
    pub fn on_row(row: u32, start_col: u32, end_col: u32) -> Self {
        CellRange::new(row, start_col, row, end_col)
    }

    /// Parses "A1:C3" (or a single "B2").
    pub fn parse(reference: &str) -> Option<Self> {
        match reference.split_once(':') {
            Some((start, end)) => {
                let (start_row, start_col) = parse_a1(start)?;
                let (end_row, end_col) = parse_a1(end)?;
                Some(CellRange::new(start_row, start_col, end_row, end_col))
            }
            None => {
                let (row, col) = parse_a1(reference)?;
                Some(CellRange::new(row, col, row, col))
            }
        }
    }

    /// True when both corners lie on `row`.
    pub fn is_within_row(&self, row: u32) -> bool {
        self.start_row == row && self.end_row == row
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn to_a1(&self) -> String {
        format!(
            "{}:{}",
            coord_to_a1((self.start_row, self.start_col)),
            coord_to_a1((self.end_row, self.end_col))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_index() {
        assert_eq!(col_to_index("A"), Some(0));
        assert_eq!(col_to_index("Z"), Some(25));
        assert_eq!(col_to_index("AA"), Some(26));
        assert_eq!(col_to_index("ZZ"), Some(701));
        assert_eq!(col_to_index("AAA"), Some(702));
        assert_eq!(col_to_index("a"), Some(0));
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
    }

    #[test]
    fn test_index_to_col() {
        assert_eq!(index_to_col(0), "A");
        assert_eq!(index_to_col(25), "Z");
        assert_eq!(index_to_col(26), "AA");
        assert_eq!(index_to_col(701), "ZZ");
        assert_eq!(index_to_col(702), "AAA");
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("A1"), Some((0, 0)));
        assert_eq!(parse_a1("B2"), Some((1, 1)));
        assert_eq!(parse_a1("$AA$100"), Some((99, 26)));
        assert_eq!(parse_a1("A0"), None);
        assert_eq!(parse_a1("12"), None);
        assert_eq!(parse_a1("C"), None);
    }

    #[test]
    fn test_coord_to_a1() {
        assert_eq!(coord_to_a1((0, 0)), "A1");
        assert_eq!(coord_to_a1((99, 26)), "AA100");
    }

    #[test]
    fn test_range_parse_normalizes() {
        let range = CellRange::parse("C3:A1").unwrap();
        assert_eq!(range, CellRange::new(0, 0, 2, 2));
        assert_eq!(range.to_a1(), "A1:C3");

        let single = CellRange::parse("B2").unwrap();
        assert!(single.is_within_row(1));
        assert!(single.contains(1, 1));
        assert!(!single.contains(1, 2));
    }

    #[test]
    fn test_range_within_row() {
        assert!(CellRange::on_row(4, 0, 3).is_within_row(4));
        assert!(!CellRange::new(4, 0, 5, 3).is_within_row(4));
    }
}
