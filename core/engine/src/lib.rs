//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the worksheet document model.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod cell;
pub mod coord;
pub mod hyperlink;
pub mod style;
pub mod worksheet;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellValue};
pub use coord::{col_to_index, coord_to_a1, index_to_col, parse_a1, CellCoord, CellRange};
pub use hyperlink::Hyperlink;
pub use style::{
    Alignment, BorderLineStyle, BorderStyle, Borders, CellStyle, Color, FontStyle,
    StyleRegistry, TextAlign, VerticalAlign, GENERAL_FORMAT,
};
pub use worksheet::Worksheet;
