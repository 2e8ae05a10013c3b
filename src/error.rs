use std::fmt;
use thiserror::Error;

/// Raw error surface reported by a [`Backend`](crate::Backend).
///
/// Carries whatever the underlying store exposes: a numeric vendor code, a
/// SQLSTATE, the message text and optionally the driver error itself. The
/// active dialect classifies it into one of the [`Error`] kinds.
#[derive(Debug, Default)]
pub struct NativeError {
    /// Vendor-specific numeric error code.
    pub code: Option<i32>,
    /// Five-character SQLSTATE when the store reports one.
    pub state: Option<String>,
    pub message: String,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::error::Error for NativeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
    pub fn with_cause(mut self, cause: anyhow::Error) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "[{}] ", code)?;
        }
        if let Some(state) = &self.state {
            write!(f, "[{}] ", state)?;
        }
        f.write_str(&self.message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid schema definition, raised eagerly while building the model.
    /// Always fatal, never retried.
    #[error("schema error in relation `{relation}`: {message}")]
    Schema { relation: String, message: String },

    /// Unclassified store failure, surfaced to the caller as-is.
    #[error("{op} failed on `{table}`: {source}")]
    Operation {
        op: &'static str,
        table: String,
        #[source]
        source: NativeError,
    },

    /// Unique-constraint violation recognized by the active dialect.
    #[error("duplicate key on `{table}` during {op}: {source}")]
    DuplicateKey {
        op: &'static str,
        table: String,
        #[source]
        source: NativeError,
    },

    /// Update or delete that affected zero rows: the row is gone or its
    /// version no longer matches. `rows` holds the batch indices concerned.
    #[error("optimistic concurrency conflict on `{table}` during {op} ({} row(s))", rows.len())]
    Conflict {
        op: &'static str,
        table: String,
        rows: Vec<usize>,
    },
}

impl Error {
    pub fn schema(relation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema {
            relation: relation.into(),
            message: message.into(),
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}
