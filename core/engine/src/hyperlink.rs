//! FILENAME: core/engine/src/hyperlink.rs
//! PURPOSE: Cell hyperlinks (external URLs and in-app routes).

use serde::{Deserialize, Serialize};

/// A hyperlink attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hyperlink {
    /// The link address (URL or route path).
    pub target: String,
    /// Tooltip/screen tip text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl Hyperlink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}
