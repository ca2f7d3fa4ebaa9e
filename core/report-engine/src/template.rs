//! FILENAME: core/report-engine/src/template.rs
//! Template Analyzer - finds the pattern rows of a report template.
//!
//! A template is an ordinary sheet: a header, a few pattern rows carrying
//! tags, and a footer. Pattern rows are classified by the tags they contain:
//!   - total row:  any `{{total_<field>}}` tag
//!   - group row:  a `{{group_value}}` tag
//!   - item row:   a `{{<field>}}` tag for one of the definition's columns
//!
//! A total row is only a total row. Otherwise a row can be both the group
//! row and the item row, in which case one template row feeds both
//! blueprints. Only the first row of each kind is used.

use crate::definition::ReportDefinition;
use crate::document::SheetDocument;
use crate::tags::{self, contains_tag_delimiter};

/// Rows scanned for `{{title}}` and parameter tags.
pub const GLOBAL_TAG_ROWS: u32 = 20;

pub const TITLE_TAG: &str = "title";
pub const GROUP_VALUE_TAG: &str = "group_value";
pub const GROUP_FIELD_TAG: &str = "group_field";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Item,
    GroupHeader,
    Total,
}

/// Indices of the first pattern row of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateLayout {
    pub item_row: Option<u32>,
    pub group_row: Option<u32>,
    pub total_row: Option<u32>,
}

impl TemplateLayout {
    pub fn row(&self, kind: RowKind) -> Option<u32> {
        match kind {
            RowKind::Item => self.item_row,
            RowKind::GroupHeader => self.group_row,
            RowKind::Total => self.total_row,
        }
    }

    fn slot(&mut self, kind: RowKind) -> &mut Option<u32> {
        match kind {
            RowKind::Item => &mut self.item_row,
            RowKind::GroupHeader => &mut self.group_row,
            RowKind::Total => &mut self.total_row,
        }
    }

    /// Pattern rows in descending order, the order they must be deleted in.
    pub fn rows_descending(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = [self.item_row, self.group_row, self.total_row]
            .into_iter()
            .flatten()
            .collect();
        rows.sort_unstable_by(|a, b| b.cmp(a));
        rows.dedup();
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.item_row.is_none() && self.group_row.is_none() && self.total_row.is_none()
    }
}

/// Classifies every row and records the first row found for each kind.
pub fn analyze_template<D: SheetDocument + ?Sized>(
    doc: &D,
    definition: &ReportDefinition,
) -> TemplateLayout {
    let mut layout = TemplateLayout::default();
    let (Some(last_row), Some(last_col)) = (doc.highest_row(), doc.highest_column()) else {
        return layout;
    };

    let column_fields: Vec<&str> = definition.columns.iter().map(|c| c.field.as_str()).collect();

    for row in 0..=last_row {
        for kind in classify_row(doc, row, last_col, &column_fields) {
            let slot = layout.slot(kind);
            if slot.is_none() {
                *slot = Some(row);
            }
        }
    }

    log::debug!(
        target: "TEMPLATE",
        "template layout: item={:?} group={:?} total={:?}",
        layout.item_row,
        layout.group_row,
        layout.total_row
    );

    layout
}

/// The kinds of a single row, empty when it carries no pattern tag.
pub fn classify_row<D: SheetDocument + ?Sized>(
    doc: &D,
    row: u32,
    last_col: u32,
    column_fields: &[&str],
) -> Vec<RowKind> {
    let mut has_item = false;
    let mut has_group = false;

    for col in 0..=last_col {
        let text = doc.cell_value(row, col).display();
        if !contains_tag_delimiter(&text) {
            continue;
        }
        for name in tags::tag_names(&text) {
            if tags::total_field(name).is_some() {
                return vec![RowKind::Total];
            }
            if name == GROUP_VALUE_TAG {
                has_group = true;
            } else if column_fields.contains(&name) {
                has_item = true;
            }
        }
    }

    let mut kinds = Vec::new();
    if has_group {
        kinds.push(RowKind::GroupHeader);
    }
    if has_item {
        kinds.push(RowKind::Item);
    }
    kinds
}

/// Substitutes `{{title}}` and parameter tags in the first rows of the
/// template. Other tags are left for the renderer. Returns the number of
/// cells changed.
pub fn replace_global_tags<D: SheetDocument + ?Sized>(
    doc: &mut D,
    definition: &ReportDefinition,
) -> usize {
    let (Some(last_row), Some(last_col)) = (doc.highest_row(), doc.highest_column()) else {
        return 0;
    };
    let row_limit = last_row.min(GLOBAL_TAG_ROWS - 1);

    let lookup = |name: &str| -> Option<String> {
        if name == TITLE_TAG {
            return Some(definition.title.clone());
        }
        definition.parameters.get(name).cloned()
    };

    let mut changed = 0;
    for row in 0..=row_limit {
        for col in 0..=last_col {
            let text = doc.cell_value(row, col).display();
            if !contains_tag_delimiter(&text) {
                continue;
            }
            let resolved = tags::resolve(&text, lookup);
            if resolved != text {
                doc.set_cell_value(row, col, resolved.into());
                changed += 1;
            }
        }
    }

    log::debug!(target: "TEMPLATE", "replaced global tags in {} cells", changed);
    changed
}
