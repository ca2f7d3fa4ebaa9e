//! FILENAME: core/persistence/src/lib.rs
//! Persistence Module
//!
//! Loads report templates from XLSX files and saves rendered worksheets back
//! to XLSX. Only the first worksheet of a workbook is read.

mod error;
mod sheet_xml;
mod xlsx_reader;
mod xlsx_writer;

pub use error::PersistenceError;
pub use xlsx_reader::load_xlsx;
pub use xlsx_writer::{save_xlsx, save_xlsx_to_buffer};

#[cfg(test)]
mod tests {
    use super::*;
    use engine::coord::CellRange;
    use engine::style::{BorderLineStyle, BorderStyle, Borders, CellStyle, Color, TextAlign};
    use engine::{CellValue, Hyperlink, Worksheet};

    fn template_like_sheet() -> Worksheet {
        let mut sheet = Worksheet::new("Template");
        sheet.set_value(0, 0, "{{title}}");
        sheet.set_style(0, 0, CellStyle::new().with_bold(true).with_font_size(14));
        sheet.merge(CellRange::on_row(0, 0, 3));

        let bordered = CellStyle::new()
            .with_fill(Color::new(0xEE, 0xEE, 0xEE))
            .with_text_align(TextAlign::Right)
            .with_number_format("#,##0.00")
            .with_borders(Borders {
                bottom: BorderStyle {
                    style: BorderLineStyle::Thin,
                    color: Color::black(),
                },
                ..Borders::default()
            });
        sheet.set_value(2, 1, 1234.5);
        sheet.set_style(2, 1, bordered);
        sheet.set_value(2, 2, true);
        sheet.set_style(3, 0, CellStyle::new().with_italic(true));
        sheet.column_widths.insert(0, 25.0);
        sheet
    }

    #[test]
    fn test_xlsx_roundtrip_preserves_values_styles_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.xlsx");
        let original = template_like_sheet();

        save_xlsx(&original, &path).unwrap();
        let loaded = load_xlsx(&path).unwrap();

        assert_eq!(loaded.name, "Template");
        assert_eq!(loaded.value(0, 0), CellValue::Text("{{title}}".to_string()));
        assert_eq!(loaded.value(2, 1), CellValue::Number(1234.5));
        assert_eq!(loaded.value(2, 2), CellValue::Boolean(true));

        assert!(loaded.style(0, 0).font.bold);
        assert_eq!(loaded.style(0, 0).font.size, 14);

        let numeric = loaded.style(2, 1);
        assert_eq!(numeric.fill, Some(Color::new(0xEE, 0xEE, 0xEE)));
        assert_eq!(numeric.alignment.horizontal, TextAlign::Right);
        assert_eq!(numeric.number_format, "#,##0.00");
        assert_eq!(numeric.borders.bottom.style, BorderLineStyle::Thin);

        // Styled blank cells survive
        assert!(loaded.value(3, 0).is_empty());
        assert!(loaded.style(3, 0).font.italic);

        assert_eq!(loaded.merged_regions, vec![CellRange::on_row(0, 0, 3)]);
        assert!(loaded.column_widths.contains_key(&0));
    }

    #[test]
    fn test_hyperlinks_survive_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.xlsx");

        let mut sheet = Worksheet::new("Links");
        sheet.set_value(0, 0, "10,00");
        sheet.set_hyperlink(0, 0, Hyperlink::new("/orders/7").with_tooltip("Click to view details"));
        sheet.set_value(1, 0, "site");
        sheet.set_hyperlink(1, 0, Hyperlink::new("https://example.com").with_tooltip("Open"));

        save_xlsx(&sheet, &path).unwrap();
        let loaded = load_xlsx(&path).unwrap();

        let relative = loaded.hyperlink(0, 0).unwrap();
        assert_eq!(relative.target, "/orders/7");
        assert_eq!(relative.tooltip.as_deref(), Some("Click to view details"));
        assert_eq!(loaded.value(0, 0).display(), "10,00");

        let absolute = loaded.hyperlink(1, 0).unwrap();
        assert_eq!(absolute.target, "https://example.com");
        assert_eq!(absolute.tooltip.as_deref(), Some("Open"));
        assert!(loaded.hyperlink(2, 0).is_none());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_xlsx(&dir.path().join("missing.xlsx")).is_err());
    }
}
