use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct DialectAttempt {
    pub dialect: &'static str,
    pub message: String,
}

impl DialectAttempt {
    pub fn new(dialect: &'static str, message: impl Into<String>) -> Self {
        Self {
            dialect,
            message: message.into(),
        }
    }
}

impl fmt::Display for DialectAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dialect, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{dialect} dialect mismatch: {reason}")]
    DialectMismatch {
        dialect: &'static str,
        reason: String,
    },

    #[error("{dialect} CSV error: {source}")]
    Csv {
        dialect: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{dialect} validation error: {message}")]
    Validation {
        dialect: &'static str,
        message: String,
    },

    #[error("{dialect} file contained no rows with a complete (data, hora) key")]
    EmptyData { dialect: &'static str },

    #[error("no dialect recognized this file; attempts: {attempts:?}")]
    NoMatchingDialect { attempts: Vec<DialectAttempt> },
}
