//! Error types for simd-pow operations.
//!
//! Only the checked API reports errors. The unchecked kernel bodies treat the
//! same conditions as caller preconditions.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when applying a kernel or binding a dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input and output buffers have different lengths.
    #[error("length mismatch: input has {input_len} elements, output has {output_len} elements")]
    LengthMismatch {
        /// Length of the input buffer.
        input_len: usize,
        /// Length of the output buffer.
        output_len: usize,
    },

    /// A buffer passed to an aligned variant does not start on its vector boundary.
    #[error("{variant} requires {required}-byte aligned buffers, got address {address:#x}")]
    Misaligned {
        /// Name of the variant that rejected the buffer.
        variant: &'static str,
        /// Required alignment in bytes.
        required: usize,
        /// Offending start address.
        address: usize,
    },

    /// The variant's instruction set is not supported by the running CPU.
    #[error("{0} is not supported on this CPU")]
    Unsupported(&'static str),

    /// No variant with this name is compiled into the crate.
    #[error("unknown kernel variant '{0}'")]
    UnknownVariant(String),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found or unreadable.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),
}
