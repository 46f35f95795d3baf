//! Row-at-a-time CSV import driver.
//!
//! An [`ImportCommand`] turns each source row into at most one new record;
//! [`run_import`] feeds it rows, persists what it returns, and calls
//! [`ImportCommand::post_handle`] once the file is exhausted.

use std::collections::HashMap;
use std::io::Read;

use serde::Serialize;

use crate::db::Db;
use crate::error::ImportError;

/// One source row: column name to raw text.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn new(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let values = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.trim().to_string(), value.to_string()))
            .collect();
        Self { values }
    }

    /// Raw value of `column`, or `MissingColumn` if the row does not have it.
    pub fn get(&self, column: &str) -> Result<&str, ImportError> {
        self.values
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| ImportError::MissingColumn(column.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A record produced by a command that the driver knows how to store.
pub trait NewRecord {
    fn insert(&self, db: &Db) -> Result<i64, ImportError>;
}

/// A per-dataset import step.
pub trait ImportCommand {
    type Record: NewRecord;

    /// Handle one row. Return a record to have the driver insert it, or
    /// `None` when the row was fully handled (e.g. an existing record updated).
    fn serialize(&mut self, db: &Db, row: &Row) -> Result<Option<Self::Record>, ImportError>;

    /// Called once after the last row.
    fn post_handle(&mut self, _db: &Db) -> Result<(), ImportError> {
        Ok(())
    }
}

/// Counters for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows: u64,
    pub created: u64,
}

/// Feed every row of `reader` to `command`.
///
/// `on_row` is invoked after each row is handled, with the running row count.
/// The first failing row aborts the run; its error carries the source line.
pub fn run_import<R, C, F>(
    db: &Db,
    reader: &mut csv::Reader<R>,
    command: &mut C,
    mut on_row: F,
) -> Result<ImportSummary, ImportError>
where
    R: Read,
    C: ImportCommand,
    F: FnMut(u64),
{
    let headers = reader.headers()?.clone();
    let mut summary = ImportSummary::default();
    let mut record = csv::StringRecord::new();

    loop {
        let line = reader.position().line();
        let has_record = reader
            .read_record(&mut record)
            .map_err(|e| ImportError::from(e).at_line(line))?;
        if !has_record {
            break;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(line);

        let row = Row::new(&headers, &record);
        if let Some(new_record) = command
            .serialize(db, &row)
            .map_err(|e| e.at_line(line))?
        {
            new_record.insert(db).map_err(|e| e.at_line(line))?;
            summary.created += 1;
        }

        summary.rows += 1;
        on_row(summary.rows);
    }

    command.post_handle(db)?;

    tracing::info!(
        "Import finished: {} rows read, {} records created",
        summary.rows,
        summary.created
    );
    Ok(summary)
}
