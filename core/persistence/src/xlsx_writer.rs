//! FILENAME: core/persistence/src/xlsx_writer.rs

use crate::PersistenceError;
use engine::cell::CellValue;
use engine::style::{BorderLineStyle, CellStyle, Color, TextAlign, VerticalAlign};
use engine::worksheet::Worksheet;
use rust_xlsxwriter::{
    Format, FormatAlign, FormatBorder, FormatPattern, FormatUnderline, Url,
    Workbook as XlsxWorkbook,
};
use std::path::Path;

/// Link schemes the XLSX writer stores as they are.
const WRITABLE_SCHEMES: [&str; 7] = [
    "http://", "https://", "ftp://", "ftps://", "mailto:", "file://", "internal:",
];

/// Prefix under which the XLSX writer keeps a relative target (`/orders/7`)
/// verbatim as an external relationship.
const RELATIVE_LINK_PREFIX: &str = "file:///";

/// The writer-side form of a hyperlink target.
fn link_url(target: &str) -> String {
    if WRITABLE_SCHEMES.iter().any(|s| target.starts_with(s)) {
        target.to_string()
    } else {
        format!("{}{}", RELATIVE_LINK_PREFIX, target)
    }
}

pub fn save_xlsx(sheet: &Worksheet, path: &Path) -> Result<(), PersistenceError> {
    let mut xlsx = build_workbook(sheet)?;
    xlsx.save(path)?;
    log::debug!(target: "PERSISTENCE", "saved sheet '{}' to {}", sheet.name, path.display());
    Ok(())
}

/// Serializes the sheet to XLSX bytes.
pub fn save_xlsx_to_buffer(sheet: &Worksheet) -> Result<Vec<u8>, PersistenceError> {
    let mut xlsx = build_workbook(sheet)?;
    Ok(xlsx.save_to_buffer()?)
}

fn build_workbook(sheet: &Worksheet) -> Result<XlsxWorkbook, PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();
    let worksheet = xlsx.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for (col, width) in &sheet.column_widths {
        worksheet.set_column_width(*col as u16, *width)?;
    }

    for (row, height) in &sheet.row_heights {
        worksheet.set_row_height(*row, *height)?;
    }

    let format_for = |row: u32, col: u32| -> Option<Format> {
        sheet
            .get_cell(row, col)
            .filter(|cell| cell.style_index > 0)
            .map(|cell| convert_style_to_format(sheet.styles.get(cell.style_index)))
    };

    // Merges first: the anchor value is written over the merge afterwards
    for region in &sheet.merged_regions {
        if region.start_row == region.end_row && region.start_col == region.end_col {
            continue;
        }
        let format = format_for(region.start_row, region.start_col).unwrap_or_else(Format::new);
        worksheet.merge_range(
            region.start_row,
            region.start_col as u16,
            region.end_row,
            region.end_col as u16,
            "",
            &format,
        )?;
    }

    let mut positions: Vec<&(u32, u32)> = sheet.cells.keys().collect();
    positions.sort();

    for &(row, col) in positions {
        let Some(cell) = sheet.get_cell(row, col) else {
            continue;
        };
        let format = format_for(row, col);
        let col16 = col as u16;

        if let Some(link) = sheet.hyperlink(row, col) {
            let mut url = Url::new(link_url(&link.target));
            let text = cell.value.display();
            if !text.is_empty() {
                url = url.set_text(text);
            }
            if let Some(tip) = &link.tooltip {
                url = url.set_tip(tip.as_str());
            }
            match &format {
                Some(fmt) => worksheet.write_url_with_format(row, col16, url, fmt)?,
                None => worksheet.write_url(row, col16, url)?,
            };
            continue;
        }

        match (&cell.value, &format) {
            (CellValue::Empty, Some(fmt)) => {
                worksheet.write_blank(row, col16, fmt)?;
            }
            (CellValue::Empty, None) => {}
            (CellValue::Number(n), Some(fmt)) => {
                worksheet.write_number_with_format(row, col16, *n, fmt)?;
            }
            (CellValue::Number(n), None) => {
                worksheet.write_number(row, col16, *n)?;
            }
            (CellValue::Text(s), Some(fmt)) => {
                worksheet.write_string_with_format(row, col16, s, fmt)?;
            }
            (CellValue::Text(s), None) => {
                worksheet.write_string(row, col16, s)?;
            }
            (CellValue::Boolean(b), Some(fmt)) => {
                worksheet.write_boolean_with_format(row, col16, *b, fmt)?;
            }
            (CellValue::Boolean(b), None) => {
                worksheet.write_boolean(row, col16, *b)?;
            }
        }
    }

    Ok(xlsx)
}

fn convert_style_to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    // Font settings
    if style.font.bold {
        format = format.set_bold();
    }
    if style.font.italic {
        format = format.set_italic();
    }
    if style.font.underline {
        format = format.set_underline(FormatUnderline::Single);
    }
    if style.font.strikethrough {
        format = format.set_font_strikethrough();
    }

    format = format.set_font_size(style.font.size as f64);
    format = format.set_font_name(&style.font.name);

    if style.font.color != Color::black() {
        format = format.set_font_color(color_to_xlsx(&style.font.color));
    }

    if let Some(fill) = &style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(color_to_xlsx(fill));
    }

    // Borders
    let edges = [
        (&style.borders.top, 0),
        (&style.borders.right, 1),
        (&style.borders.bottom, 2),
        (&style.borders.left, 3),
    ];
    for (edge, side) in edges {
        if edge.is_none() {
            continue;
        }
        let line = convert_border_line(edge.style);
        let color = color_to_xlsx(&edge.color);
        format = match side {
            0 => format.set_border_top(line).set_border_top_color(color),
            1 => format.set_border_right(line).set_border_right_color(color),
            2 => format.set_border_bottom(line).set_border_bottom_color(color),
            _ => format.set_border_left(line).set_border_left_color(color),
        };
    }

    // Horizontal alignment
    match style.alignment.horizontal {
        TextAlign::General => {}
        TextAlign::Left => format = format.set_align(FormatAlign::Left),
        TextAlign::Center => format = format.set_align(FormatAlign::Center),
        TextAlign::Right => format = format.set_align(FormatAlign::Right),
    }

    // Vertical alignment
    match style.alignment.vertical {
        VerticalAlign::Bottom => {}
        VerticalAlign::Top => format = format.set_align(FormatAlign::Top),
        VerticalAlign::Middle => format = format.set_align(FormatAlign::VerticalCenter),
    }

    if style.alignment.wrap_text {
        format = format.set_text_wrap();
    }
    if style.alignment.indent > 0 {
        format = format.set_indent(style.alignment.indent);
    }

    if !style.has_general_format() {
        format = format.set_num_format(&style.number_format);
    }

    format
}

fn convert_border_line(line: BorderLineStyle) -> FormatBorder {
    match line {
        BorderLineStyle::None => FormatBorder::None,
        BorderLineStyle::Thin => FormatBorder::Thin,
        BorderLineStyle::Medium => FormatBorder::Medium,
        BorderLineStyle::Thick => FormatBorder::Thick,
        BorderLineStyle::Dashed => FormatBorder::Dashed,
        BorderLineStyle::Dotted => FormatBorder::Dotted,
        BorderLineStyle::Double => FormatBorder::Double,
    }
}

fn color_to_xlsx(color: &Color) -> rust_xlsxwriter::Color {
    rust_xlsxwriter::Color::RGB(color.to_rgb())
}
