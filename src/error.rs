// error.rs
use thiserror::Error;

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("The file loaded but is empty: {0}")]
    EmptyDataset(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unsupported aggregation '{0}' (use sum/mean/count/max/min)")]
    UnsupportedAggregation(String),

    #[error("Field '{field}' holds non-numeric value '{value}' and cannot be aggregated with '{op}'")]
    NonNumericValue {
        field: String,
        value: String,
        op: String,
    },

    #[error("Nothing to choose from: {0}")]
    NoChoices(String),

    #[error("No stored result named '{0}'")]
    UnknownResult(String),

    #[error("Result name cannot be empty")]
    EmptyName,

    #[error("Input closed")]
    InputClosed,
}
