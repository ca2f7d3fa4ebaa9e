//! FILENAME: core/report-engine/src/blueprint.rs
//! PURPOSE: Snapshots of template pattern rows.
//! CONTEXT: Each pattern row is captured once (values, full styles, merges
//! lying on the row) and then deleted from the sheet. The renderer stamps a
//! copy of the snapshot for every emitted row of that kind.

use std::collections::BTreeMap;

use engine::{CellRange, CellStyle, CellValue};

use crate::document::SheetDocument;
use crate::template::{RowKind, TemplateLayout};

#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintCell {
    pub value: CellValue,
    pub style: CellStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBlueprint {
    /// Column -> literal value and style.
    pub cells: BTreeMap<u32, BlueprintCell>,
    /// Merged column spans (start_col, end_col) on the row.
    pub merges: Vec<(u32, u32)>,
}

impl RowBlueprint {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.merges.is_empty()
    }

    /// Writes the literal values, styles and merges onto `row`.
    pub fn stamp<D: SheetDocument + ?Sized>(&self, doc: &mut D, row: u32) {
        for (&col, cell) in &self.cells {
            doc.set_cell_value(row, col, cell.value.clone());
            doc.apply_style(row, col, &cell.style);
        }
        for &(start_col, end_col) in &self.merges {
            doc.merge_cells(CellRange::on_row(row, start_col, end_col));
        }
    }
}

/// The captured pattern rows. A missing kind renders with the built-in fallback.
#[derive(Debug, Clone, Default)]
pub struct TemplateBlueprints {
    pub item: Option<RowBlueprint>,
    pub group_header: Option<RowBlueprint>,
    pub total: Option<RowBlueprint>,
}

impl TemplateBlueprints {
    pub fn get(&self, kind: RowKind) -> Option<&RowBlueprint> {
        match kind {
            RowKind::Item => self.item.as_ref(),
            RowKind::GroupHeader => self.group_header.as_ref(),
            RowKind::Total => self.total.as_ref(),
        }
    }
}

/// Captures every column up to the sheet's highest used column, plus the
/// merges whose start and end both lie on `row`.
pub fn extract_blueprint<D: SheetDocument + ?Sized>(doc: &D, row: u32) -> RowBlueprint {
    let mut blueprint = RowBlueprint::default();

    if let Some(last_col) = doc.highest_column() {
        for col in 0..=last_col {
            blueprint.cells.insert(
                col,
                BlueprintCell {
                    value: doc.cell_value(row, col),
                    style: doc.style(row, col),
                },
            );
        }
    }

    blueprint.merges = doc
        .merged_ranges()
        .into_iter()
        .filter(|range| range.is_within_row(row))
        .map(|range| (range.start_col, range.end_col))
        .collect();

    blueprint
}

/// Captures the blueprints named by `layout`, deletes their source rows
/// bottom-up and returns the row rendering starts at (the first deleted
/// row, or 0 when the template has no pattern rows).
pub fn extract_blueprints<D: SheetDocument + ?Sized>(
    doc: &mut D,
    layout: &TemplateLayout,
) -> (TemplateBlueprints, u32) {
    let capture = |kind: RowKind| layout.row(kind).map(|row| extract_blueprint(&*doc, row));

    let blueprints = TemplateBlueprints {
        item: capture(RowKind::Item),
        group_header: capture(RowKind::GroupHeader),
        total: capture(RowKind::Total),
    };

    let rows = layout.rows_descending();
    for &row in &rows {
        doc.remove_row(row);
    }
    let start_row = rows.last().copied().unwrap_or(0);

    log::debug!(
        target: "TEMPLATE",
        "captured blueprints (item={}, group={}, total={}), removed rows {:?}, start row {}",
        blueprints.item.is_some(),
        blueprints.group_header.is_some(),
        blueprints.total.is_some(),
        rows,
        start_row
    );

    (blueprints, start_row)
}
