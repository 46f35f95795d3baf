//! Error types for the import layer.

use crate::db::DbError;

/// Errors produced while importing rows into the store.
#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    /// The store rejected a read or write.
    #[error(transparent)]
    Db(#[from] DbError),
    /// The source file could not be read as CSV.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// A row is missing a column the command needs.
    #[error("missing column: {0}")]
    MissingColumn(String),
    /// A required date column could not be parsed.
    #[error("invalid date in column {column}: {value:?}")]
    InvalidDate { column: String, value: String },
    /// Any of the above, tagged with the source line it came from.
    #[error("line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    pub fn at_line(self, line: u64) -> Self {
        match self {
            already @ ImportError::Row { .. } => already,
            other => ImportError::Row {
                line,
                source: Box::new(other),
            },
        }
    }
}
