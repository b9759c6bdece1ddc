use std::fmt;

use crate::attribute::WireType;
use crate::value::{DataFailure, NativeKind};

/// Category of an error. Lets callers decide between fail fast, skip the
/// row, or retry the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Code and schema disagree — permanent, retrying cannot help.
    Config,
    /// A stored value does not fit its field — bad row.
    Data,
    /// Conditional write rejected by the store.
    Conflict,
    /// The store call itself failed.
    Store,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Data => f.write_str("data"),
            ErrorKind::Conflict => f.write_str("conflict"),
            ErrorKind::Store => f.write_str("store"),
        }
    }
}

/// Mismatch between a record type and the data or arguments it is used with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{record}: fields '{first}' and '{second}' both map to wire column '{column}'")]
    DuplicateWireName {
        record: &'static str,
        column: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("{record}: no field matches wire column '{column}'")]
    UnknownColumn { record: &'static str, column: String },

    #[error("{record}: column '{column}' is declared {expected} but the stored value is {found}")]
    WireTypeMismatch {
        record: &'static str,
        column: String,
        expected: WireType,
        found: WireType,
    },

    #[error("{operation}: {argument} must not be empty")]
    EmptyArgument {
        operation: &'static str,
        argument: &'static str,
    },

    #[error("invalid store config: {0}")]
    InvalidStoreConfig(String),
}

/// A wire value that could not be turned into its field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column '{column}': {failure} for {kind} field: {raw:?}")]
pub struct DataError {
    pub column: String,
    pub raw: String,
    pub kind: NativeKind,
    pub failure: DataFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("conditional write on table '{table}' rejected: {condition}")]
    Conflict { table: String, condition: String },

    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Data(_) => ErrorKind::Data,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Store(_) => ErrorKind::Store,
        }
    }

    /// Config errors reflect a programming defect and must abort the
    /// current operation.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Config
    }

    /// Add context to the error.
    ///
    /// Only `Store` messages are free text; other variants carry structured
    /// fields and are returned unchanged.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            Error::Store(msg) => Error::Store(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
