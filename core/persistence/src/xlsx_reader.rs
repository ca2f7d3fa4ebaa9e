// FILENAME: core\persistence\src\xlsx_reader.rs

use crate::sheet_xml::read_sheet_layout;
use crate::PersistenceError;
use calamine::{open_workbook, Data, Reader, Xlsx};
use engine::cell::{Cell, CellValue};
use engine::hyperlink::Hyperlink;
use engine::worksheet::Worksheet;
use std::path::Path;

/// Loads the first worksheet of an XLSX file: values, styles, merged regions,
/// hyperlinks, column widths and row heights.
pub fn load_xlsx(path: &Path) -> Result<Worksheet, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PersistenceError::InvalidFormat("Workbook contains no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;

    let layout = read_sheet_layout(path)?;
    let mut sheet = Worksheet::new(sheet_name);

    // cellXfs index -> registry index
    let style_indices: Vec<usize> = layout
        .styles
        .into_iter()
        .map(|style| sheet.styles.get_or_create(style))
        .collect();

    for ((row, col), xf) in layout.cell_styles {
        let style_index = style_indices.get(xf).copied().unwrap_or(0);
        sheet.set_cell(row, col, Cell::new().with_style(style_index));
    }

    // Range positions are relative to its first used cell
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    for (row_idx, col_idx, data) in range.cells() {
        let value = match data {
            Data::Empty => continue,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::Error(e) => CellValue::Text(format!("#{:?}", e).to_uppercase()),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        };
        sheet.set_value(start_row + row_idx as u32, start_col + col_idx as u32, value);
    }

    for region in layout.merged_regions {
        sheet.merge(region);
    }
    for link in layout.hyperlinks {
        let (row, col) = link.coord;
        let mut hyperlink = Hyperlink::new(link.target);
        if let Some(tip) = link.tooltip {
            hyperlink = hyperlink.with_tooltip(tip);
        }
        sheet.set_hyperlink(row, col, hyperlink);
    }
    sheet.column_widths = layout.column_widths;
    sheet.row_heights = layout.row_heights;

    log::debug!(
        target: "PERSISTENCE",
        "loaded sheet '{}' from {}: {} cells, {} styles, {} merges",
        sheet.name,
        path.display(),
        sheet.cells.len(),
        sheet.styles.len(),
        sheet.merged_regions.len()
    );

    Ok(sheet)
}
