use std::{fmt, io, num::ParseIntError, path::PathBuf};

use thiserror::Error;

use crate::normalize::DateError;

/// Position of a legacy booking in the input array, plus its `_id` when it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub index: usize,
    pub legacy_id: Option<String>,
}

impl RecordRef {
    pub fn new(index: usize, legacy_id: Option<String>) -> Self {
        Self { index, legacy_id }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.legacy_id {
            Some(id) => write!(f, "record #{} (_id {})", self.index, id),
            None => write!(f, "record #{}", self.index),
        }
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a JSON array of documents: {source}", path.display())]
    InputJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{record}: missing or malformed field: {source}")]
    MalformedRecord {
        record: RecordRef,
        #[source]
        source: serde_json::Error,
    },

    #[error("{record}: name is empty")]
    EmptyName { record: RecordRef },

    #[error("{record}: cannot parse {field} {value:?}: {source}")]
    InvalidDate {
        record: RecordRef,
        field: &'static str,
        value: String,
        #[source]
        source: DateError,
    },

    #[error("{record}: {field} {value:?} is not an object id: {source}")]
    InvalidObjectId {
        record: RecordRef,
        field: &'static str,
        value: String,
        #[source]
        source: bson::oid::Error,
    },

    #[error("{record}: phone number {value:?} cannot be stored as an integer: {source}")]
    InvalidPhone {
        record: RecordRef,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to encode document as BSON: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("failed to write {}: {source}", path.display())]
    OutputJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write failure report {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl MigrationError {
    /// The legacy booking this error belongs to, if it is a per-record error.
    pub fn record(&self) -> Option<&RecordRef> {
        match self {
            MigrationError::MalformedRecord { record, .. }
            | MigrationError::EmptyName { record }
            | MigrationError::InvalidDate { record, .. }
            | MigrationError::InvalidObjectId { record, .. }
            | MigrationError::InvalidPhone { record, .. } => Some(record),
            _ => None,
        }
    }
}
