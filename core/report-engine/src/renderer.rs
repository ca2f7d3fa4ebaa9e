//! FILENAME: core/report-engine/src/renderer.rs
//! Tree Renderer - writes a report tree into a template sheet.
//!
//! The walk is depth-first with one shared row cursor. Every emitted row is
//! inserted at the cursor (pushing the template footer down), stamped from
//! its blueprint, resolved against its node, and the cursor moves on by one:
//!
//!   group  -> header row, children, total row
//!   record -> item row
//!
//! A kind without a blueprint gets a minimal built-in row instead.

use engine::{CellStyle, CellValue, Color, Hyperlink};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::blueprint::{RowBlueprint, TemplateBlueprints};
use crate::definition::{ColumnFormat, ColumnSpec, ReportDefinition};
use crate::document::SheetDocument;
use crate::format::{format_amount, format_value};
use crate::processor::{GroupNode, ReportNode};
use crate::record::Record;
use crate::tags::{self, contains_tag_delimiter};
use crate::template::{GROUP_FIELD_TAG, GROUP_VALUE_TAG};

/// Tooltip of hyperlinks generated from column actions.
pub const LINK_TOOLTIP: &str = "Click to view details";

pub const GROUP_FALLBACK_PREFIX: &str = "Group: ";
pub const TOTAL_FALLBACK_PREFIX: &str = "Total ";

/// `{param}` placeholders in an action route.
static ROUTE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("route placeholder pattern is valid"));

/// Fills the `{param}` placeholders of a route from the record's fields.
pub fn build_route<R: Record + ?Sized>(route: &str, record: &R) -> String {
    ROUTE_PARAM
        .replace_all(route, |caps: &Captures| record.text(&caps[1]))
        .into_owned()
}

/// Font applied to hyperlinked cells: single underline, blue.
pub fn link_style(base: CellStyle) -> CellStyle {
    base.with_underline(true).with_text_color(Color::blue())
}

// ============================================================================
// CURSOR
// ============================================================================

/// Next row to emit. Only moves forward, one row per emitted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCursor {
    row: u32,
}

impl RowCursor {
    pub fn new(row: u32) -> Self {
        RowCursor { row }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub(crate) fn advance(&mut self) {
        self.row += 1;
    }
}

// ============================================================================
// RENDERER
// ============================================================================

pub struct TreeRenderer<'a, D: SheetDocument + ?Sized> {
    doc: &'a mut D,
    definition: &'a ReportDefinition,
    blueprints: &'a TemplateBlueprints,
}

impl<'a, D: SheetDocument + ?Sized> TreeRenderer<'a, D> {
    pub fn new(
        doc: &'a mut D,
        definition: &'a ReportDefinition,
        blueprints: &'a TemplateBlueprints,
    ) -> Self {
        TreeRenderer {
            doc,
            definition,
            blueprints,
        }
    }

    /// Renders `nodes` starting at `start_row`; returns the first row after
    /// the rendered block.
    pub fn render<R: Record>(&mut self, nodes: &[ReportNode<'_, R>], start_row: u32) -> u32 {
        let mut cursor = RowCursor::new(start_row);
        self.render_nodes(nodes, &mut cursor);

        log::debug!(
            target: "TEMPLATE",
            "rendered rows {}..{}",
            start_row,
            cursor.row()
        );
        cursor.row()
    }

    fn render_nodes<R: Record>(&mut self, nodes: &[ReportNode<'_, R>], cursor: &mut RowCursor) {
        for node in nodes {
            match node {
                ReportNode::Group(group) => {
                    self.emit_group_header(group, cursor);
                    self.render_nodes(&group.items, cursor);
                    self.emit_total(group, cursor);
                }
                ReportNode::Item(record) => self.emit_item(*record, cursor),
            }
        }
    }

    /// Inserts a blank row at the cursor and returns its index.
    fn open_row(&mut self, cursor: &RowCursor) -> u32 {
        self.doc.insert_row_before(cursor.row());
        cursor.row()
    }

    fn emit_group_header<R>(&mut self, group: &GroupNode<'_, R>, cursor: &mut RowCursor) {
        let blueprints = self.blueprints;
        let row = self.open_row(cursor);

        match blueprints.group_header.as_ref() {
            Some(blueprint) => {
                blueprint.stamp(&mut *self.doc, row);
                self.resolve_cells(blueprint, row, |name| match name {
                    GROUP_VALUE_TAG => Some(group.group_value.clone()),
                    GROUP_FIELD_TAG => Some(group.group_field.clone()),
                    _ => None,
                });
            }
            None => {
                let label = format!("{}{}", GROUP_FALLBACK_PREFIX, group.group_value);
                self.write_bold_label(row, label);
            }
        }

        cursor.advance();
    }

    fn emit_total<R>(&mut self, group: &GroupNode<'_, R>, cursor: &mut RowCursor) {
        let blueprints = self.blueprints;
        let row = self.open_row(cursor);

        match blueprints.total.as_ref() {
            Some(blueprint) => {
                blueprint.stamp(&mut *self.doc, row);
                self.resolve_cells(blueprint, row, |name| {
                    if name == GROUP_VALUE_TAG {
                        return Some(group.group_value.clone());
                    }
                    let field = tags::total_field(name)?;
                    group.totals.get(field).map(|amount| format_amount(*amount))
                });
            }
            None => {
                let label = format!("{}{}", TOTAL_FALLBACK_PREFIX, group.group_value);
                self.write_bold_label(row, label);
            }
        }

        cursor.advance();
    }

    fn emit_item<R: Record>(&mut self, record: &R, cursor: &mut RowCursor) {
        let blueprints = self.blueprints;
        let definition = self.definition;
        let row = self.open_row(cursor);

        match blueprints.item.as_ref() {
            Some(blueprint) => {
                blueprint.stamp(&mut *self.doc, row);
                self.resolve_item_cells(blueprint, row, record);
            }
            None => {
                for (col, column) in definition.columns.iter().enumerate() {
                    self.doc
                        .set_cell_value(row, col as u32, record.field(&column.field));
                }
            }
        }

        cursor.advance();
    }

    fn write_bold_label(&mut self, row: u32, label: String) {
        self.doc.set_cell_value(row, 0, CellValue::Text(label));
        let style = self.doc.style(row, 0).with_bold(true);
        self.doc.apply_style(row, 0, &style);
    }

    /// Resolves the tags of every stamped cell that carries one.
    fn resolve_cells<F>(&mut self, blueprint: &RowBlueprint, row: u32, mut lookup: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for &col in blueprint.cells.keys() {
            let text = self.doc.cell_value(row, col).display();
            if !contains_tag_delimiter(&text) {
                continue;
            }
            let resolved = tags::resolve(&text, &mut lookup);
            self.doc.set_cell_value(row, col, text_value(resolved));
        }
    }

    fn resolve_item_cells<R: Record>(&mut self, blueprint: &RowBlueprint, row: u32, record: &R) {
        let definition = self.definition;

        for &col in blueprint.cells.keys() {
            let text = self.doc.cell_value(row, col).display();
            if !contains_tag_delimiter(&text) {
                continue;
            }

            let present: Vec<&ColumnSpec> = tags::tag_names(&text)
                .into_iter()
                .filter_map(|name| definition.column(name))
                .collect();

            let value = match tags::sole_tag(&text).and_then(|name| definition.column(name)) {
                Some(column) if column.format == ColumnFormat::None => {
                    match record.field(&column.field) {
                        number @ CellValue::Number(_) => number,
                        other => text_value(other.display()),
                    }
                }
                _ => text_value(tags::resolve(&text, |name| {
                    definition
                        .column(name)
                        .map(|column| format_value(&record.field(name), column.format))
                })),
            };
            self.doc.set_cell_value(row, col, value);

            for column in present {
                if let Some(action) = &column.action {
                    let target = build_route(&action.route, record);
                    self.doc.set_hyperlink(
                        row,
                        col,
                        Hyperlink::new(target).with_tooltip(LINK_TOOLTIP),
                    );
                    let style = link_style(self.doc.style(row, col));
                    self.doc.apply_style(row, col, &style);
                }
            }
        }
    }
}

fn text_value(text: String) -> CellValue {
    if text.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(text)
    }
}

/// Renders `tree` into `doc` from `start_row`; returns the final cursor.
pub fn render<D, R>(
    doc: &mut D,
    definition: &ReportDefinition,
    tree: &[ReportNode<'_, R>],
    blueprints: &TemplateBlueprints,
    start_row: u32,
) -> u32
where
    D: SheetDocument + ?Sized,
    R: Record,
{
    TreeRenderer::new(doc, definition, blueprints).render(tree, start_row)
}
