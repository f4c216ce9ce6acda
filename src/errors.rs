/*!
 * Error types for the voxgen application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to the speech synthesis service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Error establishing or maintaining the synthesis connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when sending a synthesis request fails
    #[error("Synthesis request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a service response or frame fails
    #[error("Failed to parse service response: {0}")]
    ParseError(String),

    /// Error returned by the service itself
    #[error("Service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// The synthesis stream completed without producing any audio data
    #[error("Service returned no audio data")]
    EmptyAudio,
}

/// Errors that can occur while serializing subtitle documents
#[derive(Error, Debug)]
pub enum FormatError {
    /// A cue with an invalid time range cannot be serialized
    #[error("Invalid cue time range at entry {seq_num}: end {end_ms}ms <= start {start_ms}ms")]
    InvalidTimeRange {
        /// Sequence number of the offending cue
        seq_num: usize,
        /// Cue start in milliseconds
        start_ms: u64,
        /// Cue end in milliseconds
        end_ms: u64,
    },

    /// A document without cues has nothing to serialize
    #[error("Subtitle document contains no cues")]
    EmptyDocument,
}

/// Errors that can occur during speech generation
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Error from the synthesis service
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Error serializing the subtitle document
    #[error("Subtitle format error: {0}")]
    Format(#[from] FormatError),

    /// Error creating directories or writing output files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the synthesis service
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Error from subtitle serialization
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Error from speech generation
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
