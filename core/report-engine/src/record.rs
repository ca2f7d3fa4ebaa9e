//! FILENAME: core/report-engine/src/record.rs
//! PURPOSE: Uniform field access over input records.
//! CONTEXT: Records arrive as JSON rows, string-keyed maps, or application
//! structs. Everything downstream reads them through `Record::field`, which
//! never fails: a missing field is `CellValue::Empty` (displays as "",
//! coerces to 0).

use engine::CellValue;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// One input data row.
///
/// Structs implement this directly (attribute access):
///
/// ```
/// use engine::CellValue;
/// use report_engine::Record;
///
/// struct Order { id: i64, amount: f64 }
///
/// impl Record for Order {
///     fn field(&self, name: &str) -> CellValue {
///         match name {
///             "id" => self.id.into(),
///             "amount" => self.amount.into(),
///             _ => CellValue::Empty,
///         }
///     }
/// }
///
/// let order = Order { id: 7, amount: 10.0 };
/// assert_eq!(order.field("id").display(), "7");
/// assert!(order.field("missing").is_empty());
/// ```
pub trait Record {
    fn field(&self, name: &str) -> CellValue;

    /// Display text of a field ("" when missing).
    fn text(&self, name: &str) -> String {
        self.field(name).display()
    }

    /// Numeric value of a field (0.0 when missing or non-numeric).
    fn number(&self, name: &str) -> f64 {
        self.field(name).to_number()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> CellValue {
        (**self).field(name)
    }
}

impl<V, S> Record for HashMap<String, V, S>
where
    V: Into<CellValue> + Clone,
    S: BuildHasher,
{
    fn field(&self, name: &str) -> CellValue {
        self.get(name).cloned().map(Into::into).unwrap_or_default()
    }
}

impl<V> Record for BTreeMap<String, V>
where
    V: Into<CellValue> + Clone,
{
    fn field(&self, name: &str) -> CellValue {
        self.get(name).cloned().map(Into::into).unwrap_or_default()
    }
}

impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> CellValue {
        self.get(name).map(json_to_cell_value).unwrap_or_default()
    }
}

/// A JSON value is a record when it is an object; anything else has no fields.
impl Record for Value {
    fn field(&self, name: &str) -> CellValue {
        match self {
            Value::Object(map) => map.field(name),
            _ => CellValue::Empty,
        }
    }
}

fn json_to_cell_value(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
        Value::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_record_access() {
        let row = json!({"id": 7, "region": "N", "paid": true, "note": null, "tags": ["a"]});
        assert_eq!(row.field("id"), CellValue::Number(7.0));
        assert_eq!(row.text("id"), "7");
        assert_eq!(row.field("region"), CellValue::Text("N".to_string()));
        assert_eq!(row.field("paid"), CellValue::Boolean(true));
        assert!(row.field("note").is_empty());
        assert_eq!(row.text("tags"), "[\"a\"]");
        assert!(row.field("missing").is_empty());
        assert_eq!(row.number("missing"), 0.0);
    }

    #[test]
    fn test_non_object_json_has_no_fields() {
        assert!(json!([1, 2]).field("0").is_empty());
    }

    #[test]
    fn test_map_records() {
        let mut strings: HashMap<String, String> = HashMap::new();
        strings.insert("amount".to_string(), "12.5".to_string());
        assert_eq!(strings.number("amount"), 12.5);
        assert_eq!(strings.text("other"), "");

        let mut values: BTreeMap<String, CellValue> = BTreeMap::new();
        values.insert("amount".to_string(), CellValue::Number(3.0));
        assert_eq!(values.number("amount"), 3.0);
        assert_eq!((&values).number("amount"), 3.0);
    }
}
