//! FILENAME: tests/common/mod.rs
//! Fixtures shared by the report-engine integration tests.

#![allow(dead_code)]

use engine::{CellRange, CellStyle, Color, Worksheet};
use report_engine::{ColumnFormat, ColumnSpec, GroupField, ReportDefinition};
use serde_json::{json, Value};

/// Three sales rows over two regions.
pub fn sales_records() -> Vec<Value> {
    vec![
        json!({"region": "N", "amount": 100}),
        json!({"region": "N", "amount": 50}),
        json!({"region": "S", "amount": 30}),
    ]
}

/// Orders with two grouping levels (region > seller) and mixed amount types.
pub fn order_records() -> Vec<Value> {
    vec![
        json!({"id": 1, "region": "N", "seller_id": 10, "seller": "Ana", "amount": 1000.25, "created": "2024-01-05"}),
        json!({"id": 2, "region": "S", "seller_id": 20, "seller": "Bruno", "amount": "250.5", "created": "2024-01-06"}),
        json!({"id": 3, "region": "N", "seller_id": 11, "seller": "Caio", "amount": 10, "created": "2024-02-01"}),
        json!({"id": 4, "region": "N", "seller_id": 10, "seller": "Ana", "amount": null, "created": "bad"}),
        json!({"id": 5, "region": "S", "seller_id": 20, "seller": "Bruno", "amount": "abc"}),
        json!({"id": 6, "region": "N", "seller_id": 11, "seller": "Caio", "amount": -4.75, "created": "2024-03-09T08:00:00Z"}),
    ]
}

pub fn sales_definition() -> ReportDefinition {
    ReportDefinition::new("Sales")
        .with_column(ColumnSpec::new("region", "Region"))
        .with_column(
            ColumnSpec::new("amount", "Amount")
                .with_format(ColumnFormat::Currency)
                .with_width(15.0),
        )
        .with_group_by(GroupField::new("region"))
        .with_totalizer("amount")
}

pub fn orders_definition() -> ReportDefinition {
    ReportDefinition::new("Orders by seller")
        .with_column(ColumnSpec::new("id", "ID"))
        .with_column(
            ColumnSpec::new("amount", "Amount")
                .with_format(ColumnFormat::Currency)
                .with_action("/orders/{id}"),
        )
        .with_column(ColumnSpec::new("created", "Date").with_format(ColumnFormat::Date))
        .with_group_by(GroupField::new("region"))
        .with_group_by(GroupField::with_display("seller_id", "seller"))
        .with_totalizer("amount")
        .with_parameter("user", "ana")
}

/// A template with a header, the three pattern rows and a footer:
///
/// ```text
/// 0  {{title}} (bold, merged A:C)
/// 1  Printed by {{user}}
/// 2  {{group_value}} (filled)
/// 3  {{id}} | {{amount}} | {{created}}  (amount right aligned)
/// 4  Total {{group_value}} | {{total_amount}} (merged B:C)
/// 5  End of report
/// ```
pub fn orders_template() -> Worksheet {
    let mut sheet = Worksheet::new("Template");

    sheet.set_value(0, 0, "{{title}}");
    sheet.set_style(0, 0, CellStyle::new().with_bold(true));
    sheet.merge(CellRange::on_row(0, 0, 2));

    sheet.set_value(1, 0, "Printed by {{user}}");

    sheet.set_value(2, 0, "{{group_value}}");
    sheet.set_style(2, 0, CellStyle::new().with_fill(Color::new(0xDD, 0xEB, 0xF7)));

    sheet.set_value(3, 0, "{{id}}");
    sheet.set_value(3, 1, "{{amount}}");
    sheet.set_style(
        3,
        1,
        CellStyle::new().with_text_align(engine::TextAlign::Right),
    );
    sheet.set_value(3, 2, "{{created}}");

    sheet.set_value(4, 0, "Total {{group_value}}");
    sheet.set_value(4, 1, "{{total_amount}}");
    sheet.set_style(4, 1, CellStyle::new().with_bold(true));
    sheet.merge(CellRange::on_row(4, 1, 2));

    sheet.set_value(5, 0, "End of report");
    sheet
}

/// Display text of every cell in column `col`, from row 0 to the last row.
pub fn column_text(sheet: &Worksheet, col: u32) -> Vec<String> {
    let last = sheet.highest_row().map_or(0, |r| r + 1);
    (0..last).map(|row| sheet.value(row, col).display()).collect()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
