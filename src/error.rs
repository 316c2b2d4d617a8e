//! Error taxonomy for store and engine failures.
//!
//! Only infrastructure and transactional failures live here. Expected
//! validation outcomes (naming mismatches, URI collisions, similar
//! properties) are reported as plain result structs by the engines and never
//! travel through this type.

use oxigraph::io::RdfParseError;
use oxigraph::model::IriParseError;
use oxigraph::store::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the library.
pub type OntologyResult<T> = Result<T, OntologyError>;

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid IRI: {0}")]
    InvalidIri(#[from] IriParseError),

    #[error("failed to parse RDF content: {0}")]
    Parse(#[from] RdfParseError),

    #[error("cannot {operation} inside a read session")]
    ReadOnlySession { operation: &'static str },

    #[error("session already finished")]
    SessionClosed,

    #[error("commit rejected by the store: {reason}")]
    CommitRejected { reason: String },

    #[error("individual `{identifier}` not found in graph `{graph}`")]
    IndividualNotFound { graph: String, identifier: String },

    #[error("class `{identifier}` not found in graph `{graph}`")]
    ClassNotFound { graph: String, identifier: String },

    #[error("property `{identifier}` not found in graph `{graph}`")]
    PropertyNotFound { graph: String, identifier: String },

    #[error("`{value}` is not a valid {range} value for property `{property}`")]
    InvalidValue {
        property: String,
        range: String,
        value: String,
    },

    #[error("failed to serialize RDF: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("graph `{0}` does not exist")]
    GraphNotFound(String),

    #[error("external service `{service}` failed: {message}")]
    External { service: &'static str, message: String },
}

/// Coarse classification used for logging and by callers deciding whether to
/// retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    ClientError,
    Transaction,
    Storage,
    External,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::ClientError => "client_error",
            ErrorCategory::Transaction => "transaction",
            ErrorCategory::Storage => "storage",
            ErrorCategory::External => "external",
        };
        f.write_str(text)
    }
}

impl OntologyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OntologyError::IndividualNotFound { .. }
            | OntologyError::ClassNotFound { .. }
            | OntologyError::PropertyNotFound { .. }
            | OntologyError::GraphNotFound(_) => ErrorCategory::NotFound,
            OntologyError::InvalidIri(_)
            | OntologyError::Parse(_)
            | OntologyError::InvalidValue { .. }
            | OntologyError::ReadOnlySession { .. } => ErrorCategory::ClientError,
            OntologyError::SessionClosed | OntologyError::CommitRejected { .. } => {
                ErrorCategory::Transaction
            }
            OntologyError::Storage(_) | OntologyError::Serialize(_) => ErrorCategory::Storage,
            OntologyError::External { .. } => ErrorCategory::External,
        }
    }

    /// Storage hiccups and external outages may succeed on a later attempt;
    /// everything else is a caller bug or a definitive answer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Storage | ErrorCategory::External
        ) || matches!(self, OntologyError::CommitRejected { .. })
    }

    pub(crate) fn external(service: &'static str, message: impl Into<String>) -> Self {
        OntologyError::External {
            service,
            message: message.into(),
        }
    }
}
