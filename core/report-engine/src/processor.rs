//! FILENAME: core/report-engine/src/processor.rs
//! Report Processor - turns a flat record list into the grouped, totaled tree.
//!
//! Grouping is recursive: the first group field partitions the records by
//! raw value (first-seen order of keys is kept), each partition becomes a
//! GroupNode whose totals cover its whole record subset, and the remaining
//! group fields are applied to the partition to build the node's items.
//! When no group fields remain, the records themselves are the leaves.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::definition::{ColumnSpec, GroupField, ReportDefinition};
use crate::record::Record;
use crate::ReportError;

/// Field -> accumulated sum. Every totalizer field is present.
pub type Totals = BTreeMap<String, f64>;

// ============================================================================
// TREE
// ============================================================================

/// Aggregated node for one distinct value of a grouping field.
#[derive(Debug, Serialize)]
pub struct GroupNode<'r, R> {
    /// Raw field the records were partitioned by.
    pub group_field: String,
    /// Label, taken from the display field of the first record in the group.
    pub group_value: String,
    /// Partition key (display text of the raw field value).
    pub group_key: String,
    /// Sums over the node's entire subtree.
    pub totals: Totals,
    pub items: Vec<ReportNode<'r, R>>,
}

/// An element of the report tree: a group, or a leaf record.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportNode<'r, R> {
    Group(GroupNode<'r, R>),
    Item(&'r R),
}

impl<'r, R> ReportNode<'r, R> {
    pub fn as_group(&self) -> Option<&GroupNode<'r, R>> {
        match self {
            ReportNode::Group(group) => Some(group),
            ReportNode::Item(_) => None,
        }
    }

    fn collect_leaves(&self, out: &mut Vec<&'r R>) {
        match self {
            ReportNode::Group(group) => {
                for item in &group.items {
                    item.collect_leaves(out);
                }
            }
            ReportNode::Item(record) => out.push(*record),
        }
    }
}

/// Pre-order leaf traversal of a tree.
pub fn leaves<'r, R>(nodes: &[ReportNode<'r, R>]) -> Vec<&'r R> {
    let mut out = Vec::new();
    for node in nodes {
        node.collect_leaves(&mut out);
    }
    out
}

/// Number of group levels above the leaves (0 for a flat list).
pub fn tree_depth<R>(nodes: &[ReportNode<'_, R>]) -> usize {
    nodes
        .iter()
        .filter_map(ReportNode::as_group)
        .map(|group| 1 + tree_depth(&group.items))
        .max()
        .unwrap_or(0)
}

// ============================================================================
// PROCESSED REPORT
// ============================================================================

/// Header information carried alongside the tree.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub title: String,
    pub parameters: BTreeMap<String, String>,
    pub columns: Vec<ColumnSpec>,
}

/// The processor's output: what every renderer consumes.
#[derive(Debug, Serialize)]
pub struct ProcessedReport<'r, R> {
    pub metadata: ReportMetadata,
    pub data: Vec<ReportNode<'r, R>>,
    pub grand_totals: Totals,
}

impl<'r, R: Serialize> ProcessedReport<'r, R> {
    /// Serializes the report for external HTML/PDF renderers.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// PROCESSOR
// ============================================================================

pub struct ReportProcessor<'d> {
    definition: &'d ReportDefinition,
}

impl<'d> ReportProcessor<'d> {
    pub fn new(definition: &'d ReportDefinition) -> Self {
        ReportProcessor { definition }
    }

    pub fn process<'r, R: Record>(&self, records: &'r [R]) -> ProcessedReport<'r, R> {
        let (data, grand_totals) = process(
            records,
            &self.definition.group_by,
            &self.definition.totalizers,
        );

        log::debug!(
            target: "REPORT",
            "processed {} records into {} top-level nodes (depth {})",
            records.len(),
            data.len(),
            tree_depth(&data)
        );

        ProcessedReport {
            metadata: ReportMetadata {
                title: self.definition.title.clone(),
                parameters: self.definition.parameters.clone(),
                columns: self.definition.columns.clone(),
            },
            data,
            grand_totals,
        }
    }
}

/// Builds the report tree and the grand totals. Total over any input.
pub fn process<'r, R: Record>(
    records: &'r [R],
    group_fields: &[GroupField],
    totalizers: &[String],
) -> (Vec<ReportNode<'r, R>>, Totals) {
    let rows: Vec<&'r R> = records.iter().collect();
    let tree = group_records(&rows, group_fields, totalizers);
    let grand_totals = calculate_totals(&rows, totalizers);
    (tree, grand_totals)
}

/// Records sharing one key at the current level.
struct Partition<'r, R> {
    key: String,
    label: String,
    rows: Vec<&'r R>,
}

fn group_records<'r, R: Record>(
    rows: &[&'r R],
    group_fields: &[GroupField],
    totalizers: &[String],
) -> Vec<ReportNode<'r, R>> {
    let Some((group, remaining)) = group_fields.split_first() else {
        return rows.iter().map(|row| ReportNode::Item(*row)).collect();
    };

    let mut partitions: Vec<Partition<'r, R>> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for &row in rows {
        let key = row.text(&group.field);
        match index_by_key.get(&key) {
            Some(&index) => partitions[index].rows.push(row),
            None => {
                index_by_key.insert(key.clone(), partitions.len());
                partitions.push(Partition {
                    key,
                    label: row.text(group.display_field()),
                    rows: vec![row],
                });
            }
        }
    }

    partitions
        .into_iter()
        .map(|partition| {
            // Totals cover the whole partition, before it is split further
            let totals = calculate_totals(&partition.rows, totalizers);
            let items = group_records(&partition.rows, remaining, totalizers);
            ReportNode::Group(GroupNode {
                group_field: group.field.clone(),
                group_value: partition.label,
                group_key: partition.key,
                totals,
                items,
            })
        })
        .collect()
}

fn calculate_totals<R: Record>(rows: &[&R], fields: &[String]) -> Totals {
    let mut totals: Totals = fields.iter().map(|f| (f.clone(), 0.0)).collect();

    // Keys are unique even when a field is listed twice
    for row in rows {
        for (field, sum) in totals.iter_mut() {
            *sum += row.number(field);
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sales() -> Vec<Value> {
        vec![
            json!({"region": "N", "amount": 100}),
            json!({"region": "N", "amount": 50}),
            json!({"region": "S", "amount": 30}),
        ]
    }

    #[test]
    fn test_single_level_grouping() {
        let records = sales();
        let (tree, grand) = process(&records, &[GroupField::new("region")], &["amount".to_string()]);

        assert_eq!(tree.len(), 2);
        let north = tree[0].as_group().unwrap();
        assert_eq!(north.group_value, "N");
        assert_eq!(north.group_field, "region");
        assert_eq!(north.totals["amount"], 150.0);
        assert_eq!(north.items.len(), 2);

        let south = tree[1].as_group().unwrap();
        assert_eq!(south.totals["amount"], 30.0);
        assert_eq!(grand["amount"], 180.0);
    }

    #[test]
    fn test_no_group_fields_returns_leaves() {
        let records = sales();
        let (tree, grand) = process(&records, &[], &["amount".to_string()]);
        assert_eq!(tree.len(), 3);
        assert!(tree.iter().all(|n| matches!(n, ReportNode::Item(_))));
        assert_eq!(tree_depth(&tree), 0);
        assert_eq!(grand["amount"], 180.0);
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<Value> = Vec::new();
        let (tree, grand) = process(&records, &[GroupField::new("region")], &["amount".to_string()]);
        assert!(tree.is_empty());
        assert_eq!(grand["amount"], 0.0);
    }

    #[test]
    fn test_key_and_label_from_different_fields() {
        let records = vec![
            json!({"code": 1, "name": "First", "v": "2"}),
            json!({"code": 2, "name": "Second", "v": "x"}),
            json!({"code": 1, "name": "Renamed", "v": 3}),
        ];
        let (tree, _) = process(
            &records,
            &[GroupField::with_display("code", "name")],
            &["v".to_string()],
        );

        assert_eq!(tree.len(), 2);
        let first = tree[0].as_group().unwrap();
        assert_eq!(first.group_key, "1");
        // Label comes from the first record with the key
        assert_eq!(first.group_value, "First");
        assert_eq!(first.totals["v"], 5.0);
        assert_eq!(tree[1].as_group().unwrap().totals["v"], 0.0);
    }

    #[test]
    fn test_missing_group_field_forms_empty_key_group() {
        let records = vec![json!({"amount": 1}), json!({"region": "N", "amount": 2})];
        let (tree, _) = process(&records, &[GroupField::new("region")], &["amount".to_string()]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].as_group().unwrap().group_value, "");
    }

    #[test]
    fn test_processed_report_serializes() {
        let records = sales();
        let definition = ReportDefinition::new("Sales")
            .with_group_by(GroupField::new("region"))
            .with_totalizer("amount");
        let report = ReportProcessor::new(&definition).process(&records);

        let json: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["metadata"]["title"], "Sales");
        assert_eq!(json["grand_totals"]["amount"], 180.0);
        assert_eq!(json["data"][0]["group_value"], "N");
        assert_eq!(json["data"][0]["items"][1]["amount"], 50);
    }

    #[test]
    fn test_repeated_totalizer_is_summed_once() {
        let records = sales();
        let definition = ReportDefinition::from_json(
            r#"{"title": "Sales", "group_by": ["region"], "totalizers": ["amount", "amount"]}"#,
        )
        .unwrap();
        let report = ReportProcessor::new(&definition).process(&records);

        assert_eq!(report.grand_totals["amount"], 180.0);
        assert_eq!(report.grand_totals.len(), 1);
        assert_eq!(report.data[0].as_group().unwrap().totals["amount"], 150.0);

        let (_, grand) = process(&records, &[], &["amount".to_string(), "amount".to_string()]);
        assert_eq!(grand["amount"], 180.0);
    }
}
