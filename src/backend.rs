use crate::{NativeError, Value};
use std::sync::Arc;

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A fetched row with its corresponding column labels.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values, aligned by index with `labels`.
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }

    pub fn names(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
}

/// Per-row outcome of a batched statement.
///
/// `Unknown` models a driver that does not report per-row counts; it always
/// means success, never a conflict signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCount {
    Unknown,
    Exact(u64),
}

impl RowCount {
    /// True only for a reported count of exactly zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, RowCount::Exact(0))
    }
}

/// Synchronous execution seam over one open connection.
///
/// One logical session owns exactly one implementation instance; batched
/// operations on it never interleave with other work on the same connection.
/// Implementations report failures as raw [`NativeError`]s; classification
/// into semantic error kinds is the dialect's job.
pub trait Backend {
    /// Runs a row-returning statement.
    fn fetch(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> std::result::Result<Vec<RowLabeled>, NativeError>;

    /// Runs a single statement and returns the total affected-row count.
    fn execute(&mut self, sql: &str, params: &[Value]) -> std::result::Result<u64, NativeError>;

    /// Runs one parameterized statement once per row and returns the per-row
    /// outcomes, in input order. A driver unable to report counts returns
    /// `RowCount::Unknown` entries.
    fn execute_batch(
        &mut self,
        sql: &str,
        rows: &[Row],
    ) -> std::result::Result<Vec<RowCount>, NativeError>;

    fn commit(&mut self) -> std::result::Result<(), NativeError> {
        Ok(())
    }

    fn rollback(&mut self) -> std::result::Result<(), NativeError> {
        Ok(())
    }
}
