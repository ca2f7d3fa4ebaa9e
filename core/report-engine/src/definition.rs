//! FILENAME: core/report-engine/src/definition.rs
//! Report Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a report:
//! which columns are shown and how they are formatted, which fields the
//! records are grouped by, which fields are totaled, plus the title and
//! free-form header parameters. A definition is read-only once built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ReportError;

// ============================================================================
// COLUMN FORMAT
// ============================================================================

/// How a column value is formatted when written into an item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnFormat {
    /// Raw value, unformatted. Also used for unrecognized format names.
    #[default]
    None,
    /// Two fraction digits, comma decimal separator, dot thousands separator.
    Currency,
    /// Day/month/year, zero padded.
    Date,
}

impl From<String> for ColumnFormat {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "currency" => ColumnFormat::Currency,
            "date" => ColumnFormat::Date,
            _ => ColumnFormat::None,
        }
    }
}

impl From<ColumnFormat> for String {
    fn from(format: ColumnFormat) -> Self {
        match format {
            ColumnFormat::None => "none",
            ColumnFormat::Currency => "currency",
            ColumnFormat::Date => "date",
        }
        .to_string()
    }
}

// ============================================================================
// COLUMN
// ============================================================================

/// A navigation action attached to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAction {
    /// Address template; `{param}` placeholders are filled from the record.
    pub route: String,
}

/// One displayed column of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Record field shown in this column (also the `{{field}}` tag name).
    pub field: String,
    /// Header label.
    pub label: String,
    #[serde(default)]
    pub format: ColumnFormat,
    /// Column width in Excel character units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ColumnAction>,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnSpec {
            field: field.into(),
            label: label.into(),
            format: ColumnFormat::None,
            width: None,
            action: None,
        }
    }

    pub fn with_format(mut self, format: ColumnFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_action(mut self, route: impl Into<String>) -> Self {
        self.action = Some(ColumnAction {
            route: route.into(),
        });
        self
    }
}

// ============================================================================
// GROUP FIELD
// ============================================================================

/// A grouping level: records are partitioned by `field`, and the group is
/// labelled with the value of `display` (or `field` when no display field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GroupFieldSpec")]
pub struct GroupField {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl GroupField {
    pub fn new(field: impl Into<String>) -> Self {
        GroupField {
            field: field.into(),
            display: None,
        }
    }

    /// Groups by `field` but labels the group with `display`.
    pub fn with_display(field: impl Into<String>, display: impl Into<String>) -> Self {
        GroupField {
            field: field.into(),
            display: Some(display.into()),
        }
    }

    /// The field whose value labels the group.
    pub fn display_field(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.field)
    }
}

/// Accepts either `"region"` or `{ "field": "region_id", "display": "region" }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum GroupFieldSpec {
    Name(String),
    Pair {
        field: String,
        #[serde(default)]
        display: Option<String>,
    },
}

impl From<GroupFieldSpec> for GroupField {
    fn from(spec: GroupFieldSpec) -> Self {
        match spec {
            GroupFieldSpec::Name(field) => GroupField::new(field),
            GroupFieldSpec::Pair { field, display } => GroupField { field, display },
        }
    }
}

// ============================================================================
// REPORT DEFINITION
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDefinition {
    pub title: String,
    /// Displayed columns, in order.
    pub columns: Vec<ColumnSpec>,
    /// Grouping levels; the first entry is the outermost group.
    pub group_by: Vec<GroupField>,
    /// Fields summed at every tree level.
    pub totalizers: Vec<String>,
    /// Header values substituted into `{{name}}` tags (user, date, filters).
    pub parameters: BTreeMap<String, String>,
}

impl ReportDefinition {
    pub fn new(title: impl Into<String>) -> Self {
        ReportDefinition {
            title: title.into(),
            ..ReportDefinition::default()
        }
    }

    /// Parses a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_group_by(mut self, group: GroupField) -> Self {
        self.group_by.push(group);
        self
    }

    pub fn with_totalizer(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.totalizers.contains(&field) {
            self.totalizers.push(field);
        }
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Looks up a column by field name.
    pub fn column(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_accepts_both_group_forms() {
        let json = r#"{
            "title": "Sales",
            "columns": [
                {"field": "id", "label": "ID", "action": {"route": "/orders/{id}"}},
                {"field": "amount", "label": "Amount", "format": "currency", "width": 15},
                {"field": "created", "label": "Date", "format": "DATE"},
                {"field": "note", "label": "Note", "format": "string"}
            ],
            "group_by": ["region", {"field": "seller_id", "display": "seller_name"}],
            "totalizers": ["amount"],
            "parameters": {"user": "ana"}
        }"#;

        let def = ReportDefinition::from_json(json).unwrap();
        assert_eq!(def.title, "Sales");
        assert_eq!(def.columns.len(), 4);
        assert_eq!(def.columns[1].format, ColumnFormat::Currency);
        assert_eq!(def.columns[1].width, Some(15.0));
        assert_eq!(def.columns[2].format, ColumnFormat::Date);
        assert_eq!(def.columns[3].format, ColumnFormat::None);
        assert_eq!(
            def.columns[0].action.as_ref().map(|a| a.route.as_str()),
            Some("/orders/{id}")
        );
        assert_eq!(def.group_by[0], GroupField::new("region"));
        assert_eq!(def.group_by[1].display_field(), "seller_name");
        assert_eq!(def.totalizers, vec!["amount".to_string()]);
        assert_eq!(def.parameters.get("user").map(String::as_str), Some("ana"));
    }

    #[test]
    fn test_from_json_defaults_and_errors() {
        let def = ReportDefinition::from_json("{}").unwrap();
        assert!(def.columns.is_empty());
        assert!(def.group_by.is_empty());

        assert!(ReportDefinition::from_json("{\"columns\": 3}").is_err());
    }

    #[test]
    fn test_builder_deduplicates_totalizers() {
        let def = ReportDefinition::default()
            .with_title("T")
            .with_totalizer("amount")
            .with_totalizer("amount")
            .with_column(ColumnSpec::new("amount", "Amount").with_format(ColumnFormat::Currency));
        assert_eq!(def.title, "T");
        assert_eq!(def.totalizers.len(), 1);
        assert!(def.column("amount").is_some());
        assert!(def.column("missing").is_none());
    }

    #[test]
    fn test_definition_json_roundtrip() {
        let def = ReportDefinition::new("T")
            .with_group_by(GroupField::with_display("code", "name"))
            .with_column(ColumnSpec::new("amount", "Amount").with_format(ColumnFormat::Date));
        let json = serde_json::to_string(&def).unwrap();
        assert_eq!(ReportDefinition::from_json(&json).unwrap(), def);
    }
}
