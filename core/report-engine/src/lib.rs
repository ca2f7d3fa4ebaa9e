//! FILENAME: core/report-engine/src/lib.rs
//! Report engine: grouped, totaled reports rendered into worksheets.
//!
//! Records are grouped by the definition's group fields into a tree whose
//! nodes carry subtree totals, then written into a spreadsheet, either by
//! filling an XLSX row template or with a plain default layout.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the report IS)
//! - `record` / `processor`: Grouping and totals (HOW the tree is built)
//! - `template` / `blueprint` / `renderer`: Row-template rendering
//! - `default_renderer`: Layout used without a template
//! - `generator`: Entry point tying a report to an output sheet

pub mod blueprint;
pub mod default_renderer;
pub mod definition;
pub mod document;
pub mod error;
pub mod format;
pub mod generator;
pub mod processor;
pub mod record;
pub mod renderer;
pub mod tags;
pub mod template;

pub use blueprint::{extract_blueprint, extract_blueprints, BlueprintCell, RowBlueprint, TemplateBlueprints};
pub use default_renderer::render_default;
pub use definition::*;
pub use document::SheetDocument;
pub use error::ReportError;
pub use format::{format_amount, format_date};
pub use generator::{render_template, ReportGenerator};
pub use processor::{
    leaves, process, GroupNode, ProcessedReport, ReportMetadata, ReportNode, ReportProcessor,
    Totals,
};
pub use record::Record;
pub use renderer::{render, RowCursor, TreeRenderer};
pub use template::{analyze_template, replace_global_tags, RowKind, TemplateLayout};
