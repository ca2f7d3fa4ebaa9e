//! FILENAME: core/report-engine/src/error.rs

use persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Invalid report definition: {0}")]
    Definition(#[from] serde_json::Error),
}
