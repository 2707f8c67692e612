//! # simd-pow
//!
//! Elementwise `f32` power kernel with interchangeable scalar and SIMD variants.
//!
//! Every variant computes `output[i] = input[i].powf(exponent)` and can stand
//! in for any other: they differ only in speed and in whether they require
//! aligned buffers. Negative bases are handled by factoring
//! `x^p = sign(x)^p * |x|^p`, with `(-1)^p` computed once per call.
//!
//! ## Quick Start
//!
//! ```rust
//! use simd_pow::prelude::*;
//!
//! let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
//! let mut output = vec![0.0; input.len()];
//!
//! // Bound once on first use to the fastest variant the CPU supports
//! power_32f(&mut output, &input, 2.0)?;
//! assert!((output[9] - 81.0).abs() < 1e-3);
//! # Ok::<(), simd_pow::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `vector-math` (default): vectorized `log2`/`exp2`/`pow` bodies for the SIMD
//!   variants. Without it they run the scalar loop under the same names.
//! - `config`: YAML dispatch configuration via `serde`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]

// ============================================================================
// Core Modules
// ============================================================================

/// The capability contract shared by every variant.
pub mod kernel;

/// Instruction-set tags and runtime detection.
pub mod isa;

/// Concrete kernel variants (generic, SSE2, SSE4.1, AVX2, NEON).
pub mod variants;

/// Vectorized log2/exp2/pow used by the SIMD variants.
#[cfg(feature = "vector-math")]
#[cfg_attr(docsrs, doc(cfg(feature = "vector-math")))]
pub mod math;

// ============================================================================
// Dispatch
// ============================================================================

/// Variant registry and the once-bound dispatcher.
pub mod dispatch;

/// Dispatch configuration (environment, YAML).
pub mod config;

/// Aligned buffers for the aligned variants.
pub mod aligned;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for simd-pow operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and functions for convenient imports.
///
/// ```rust
/// use simd_pow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aligned::AlignedVec;
    pub use crate::config::DispatchConfig;
    pub use crate::dispatch::{
        available_variants, dispatcher, find, power_32f, power_32f_in_place, variants, Dispatcher,
    };
    pub use crate::error::{Error, Result};
    pub use crate::isa::Isa;
    pub use crate::kernel::{Alignment, PowerKernel};
    pub use crate::variants::GenericPower;
}
