//! Error types for linesh
//!
//! Malformed scripts never produce an error: unknown variables expand to
//! nothing, bad conditions are false and unterminated blocks end at end of
//! input. What remains here are failures of the host environment that the
//! interpreter cannot turn into an exit status.

use thiserror::Error;

/// Result type alias using linesh's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// linesh error types.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while writing builtin output or reading the script.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Execution error raised by a builtin that cannot continue.
    ///
    /// Aborts the running script; use a non-zero status for ordinary failures.
    #[error("execution error: {0}")]
    Execution(String),
}
