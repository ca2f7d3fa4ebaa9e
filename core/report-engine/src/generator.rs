//! FILENAME: core/report-engine/src/generator.rs
//! PURPOSE: Produces the spreadsheet for a processed report.
//! CONTEXT: With a template the pipeline is analyze -> replace global tags ->
//! capture blueprints -> delete pattern rows -> render. Without one (or when
//! the template cannot be loaded) the default tabular layout is used.

use std::path::Path;

use engine::Worksheet;
use persistence::{load_xlsx, save_xlsx, save_xlsx_to_buffer};

use crate::blueprint::extract_blueprints;
use crate::default_renderer::render_default;
use crate::definition::ReportDefinition;
use crate::document::SheetDocument;
use crate::processor::ProcessedReport;
use crate::record::Record;
use crate::renderer::render;
use crate::template::{analyze_template, replace_global_tags};
use crate::ReportError;

/// Runs the template pipeline over `doc`; returns the row after the
/// rendered block.
pub fn render_template<D, R>(
    doc: &mut D,
    definition: &ReportDefinition,
    report: &ProcessedReport<'_, R>,
) -> u32
where
    D: SheetDocument + ?Sized,
    R: Record,
{
    let layout = analyze_template(doc, definition);
    replace_global_tags(doc, definition);
    let (blueprints, start_row) = extract_blueprints(doc, &layout);
    render(doc, definition, &report.data, &blueprints, start_row)
}

pub struct ReportGenerator<'a, 'r, R> {
    definition: &'a ReportDefinition,
    report: &'a ProcessedReport<'r, R>,
    template: Option<Worksheet>,
}

impl<'a, 'r, R: Record> ReportGenerator<'a, 'r, R> {
    pub fn new(definition: &'a ReportDefinition, report: &'a ProcessedReport<'r, R>) -> Self {
        ReportGenerator {
            definition,
            report,
            template: None,
        }
    }

    /// Uses the first worksheet of an XLSX file as template. A file that
    /// cannot be loaded leaves the generator on the default layout.
    pub fn with_template_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match load_xlsx(path) {
            Ok(sheet) => self.template = Some(sheet),
            Err(e) => {
                log::warn!(
                    target: "REPORT",
                    "template {} could not be loaded, using default layout: {}",
                    path.display(),
                    e
                );
            }
        }
        self
    }

    pub fn with_template(mut self, template: Worksheet) -> Self {
        self.template = Some(template);
        self
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Builds the output sheet. The template itself is left untouched, so a
    /// generator can be run more than once.
    pub fn generate(&self) -> Worksheet {
        match &self.template {
            Some(template) => {
                let mut sheet = template.clone();
                let end_row = render_template(&mut sheet, self.definition, self.report);
                log::info!(
                    target: "REPORT",
                    "generated '{}' from template (body ends before row {})",
                    self.definition.title,
                    end_row
                );
                sheet
            }
            None => {
                let sheet = render_default(self.definition, self.report);
                log::info!(
                    target: "REPORT",
                    "generated '{}' with default layout",
                    self.definition.title
                );
                sheet
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        save_xlsx(&self.generate(), path.as_ref())?;
        Ok(())
    }

    /// XLSX bytes of the generated sheet.
    pub fn to_buffer(&self) -> Result<Vec<u8>, ReportError> {
        Ok(save_xlsx_to_buffer(&self.generate())?)
    }
}
