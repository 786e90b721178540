//! Error types for tfgraph operations.
//!
//! This module provides the main error type [`TfGraphError`] which wraps the
//! error conditions that can occur before or around diagram generation.
//! Generation itself never fails once a [`DiagramBuilder`](crate::DiagramBuilder)
//! has been constructed.

use std::{io, ops::Range};

use thiserror::Error;

use crate::config::ConfigError;

/// The main error type for tfgraph operations.
///
/// # Diagnostic Variants
///
/// The `Input` variant keeps the offending source text and, when known, the
/// byte range of the problem so callers can render a source snippet.
#[derive(Debug, Error)]
pub enum TfGraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {message}")]
    Input {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },
}

impl TfGraphError {
    /// Create a new `Input` error with the associated source text.
    pub fn new_input_error(
        message: impl Into<String>,
        span: Option<Range<usize>>,
        src: impl Into<String>,
    ) -> Self {
        Self::Input {
            message: message.into(),
            span,
            src: src.into(),
        }
    }
}
