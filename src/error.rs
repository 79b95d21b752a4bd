use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("source could not be read: {0}")]
    SourceRead(String),

    #[error("compensation column '{column}' holds non-numeric data")]
    SchemaMismatch { column: String },

    #[error("cleaned table could not be persisted: {0}")]
    DestinationWrite(String),

    #[error("warehouse gateway error: {0}")]
    Warehouse(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InsightError>;
