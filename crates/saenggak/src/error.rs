// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Error types for Saenggak

use thiserror::Error;

/// Result type alias for Saenggak operations
pub type Result<T> = core::result::Result<T, Error>;

/// Main error type for the Saenggak library
#[derive(Error, Debug)]
pub enum Error {
    /// Text-generation oracle failures (hard failures, never retried here)
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Prompt construction errors (e.g. empty action text)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Sampling budget validation errors
    #[error("Budget error: {0}")]
    Budget(String),

    /// Parse errors (prompt templates, answer canonicalization)
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an oracle error
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    /// Create a prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    /// Create a budget error
    pub fn budget(msg: impl Into<String>) -> Self {
        Self::Budget(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Check if this error originates from the oracle rather than this library.
    ///
    /// Oracle errors are the caller's to handle (e.g. retrying a whole
    /// trajectory); everything else indicates misuse or a bug.
    #[inline]
    pub fn is_oracle_error(&self) -> bool {
        matches!(self, Self::Oracle(_))
    }

    /// Get the error category for logging/metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Oracle(_) => "oracle",
            Self::Prompt(_) => "prompt",
            Self::Budget(_) => "budget",
            Self::Parse(_) => "parse",
            Self::Json(_) => "json",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}
