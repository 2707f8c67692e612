//! The capability contract every power-kernel variant satisfies.
//!
//! A variant computes `output[i] = input[i].powf(exponent)` for every index,
//! with the rounding and domain behavior of the real-valued power function.
//! Variants differ only in speed and in whether they require aligned buffers,
//! so a caller can swap one for another without observing a difference.
//!
//! # Safety
//!
//! [`PowerKernel::apply_unchecked`] is the raw function-call boundary: length,
//! alignment and ISA availability are caller preconditions and violating them
//! is undefined behavior. [`PowerKernel::apply`] and
//! [`PowerKernel::apply_in_place`] check the same conditions and report them
//! as [`Error`]s.
#![allow(unsafe_code)]

use std::fmt;

use crate::error::{Error, Result};
use crate::isa::Isa;

/// Memory-alignment requirement of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Both buffers must start on the ISA's natural vector boundary.
    Aligned,
    /// Any `f32`-aligned buffer is accepted.
    Unaligned,
}

impl Alignment {
    /// Stable tag used in variant names (`a` or `u`).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Aligned => "a",
            Self::Unaligned => "u",
        }
    }

    /// Maps the `ALIGNED` const parameter of the SIMD variants.
    #[must_use]
    pub const fn from_flag(aligned: bool) -> Self {
        if aligned {
            Self::Aligned
        } else {
            Self::Unaligned
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aligned => f.write_str("aligned"),
            Self::Unaligned => f.write_str("unaligned"),
        }
    }
}

/// Returns true if `ptr` is a multiple of `align` bytes.
///
/// An `align` that is not a power of two (including zero) is never satisfied.
#[inline]
#[must_use]
pub fn is_aligned<T>(ptr: *const T, align: usize) -> bool {
    align.is_power_of_two() && (ptr as usize) & (align - 1) == 0
}

/// Elementwise `powf` kernel.
pub trait PowerKernel: Send + Sync + fmt::Debug {
    /// Stable variant name, e.g. `power_32f_a_sse2`.
    fn name(&self) -> &'static str;

    /// Instruction set the variant is written for.
    fn isa(&self) -> Isa;

    /// Alignment the variant requires of its buffers.
    fn alignment(&self) -> Alignment;

    /// Elements processed per vector batch.
    fn lanes(&self) -> usize {
        self.isa().f32_lanes()
    }

    /// Required start-address alignment in bytes.
    fn required_alignment(&self) -> usize {
        match self.alignment() {
            Alignment::Aligned => self.isa().natural_alignment(),
            Alignment::Unaligned => std::mem::align_of::<f32>(),
        }
    }

    /// Returns true if the running CPU can execute this variant.
    fn is_available(&self) -> bool {
        self.isa().is_supported()
    }

    /// Raises `count` elements of `input` to `exponent` into `output`.
    ///
    /// # Safety
    ///
    /// - `input` must be valid for `count` reads and `output` for `count` writes
    /// - both must satisfy [`required_alignment`](Self::required_alignment)
    /// - the CPU must support [`isa`](Self::isa)
    /// - `input` and `output` may be the same pointer, but must not otherwise overlap
    unsafe fn apply_unchecked(&self, output: *mut f32, input: *const f32, exponent: f32, count: usize);

    /// Checked form of [`apply_unchecked`](Self::apply_unchecked).
    fn apply(&self, output: &mut [f32], input: &[f32], exponent: f32) -> Result<()> {
        if input.len() != output.len() {
            return Err(Error::LengthMismatch {
                input_len: input.len(),
                output_len: output.len(),
            });
        }
        if input.is_empty() {
            return Ok(());
        }
        self.check_buffer(input.as_ptr())?;
        self.check_buffer(output.as_ptr())?;

        // SAFETY: lengths match, alignment and ISA were checked above, and the
        // borrow checker rules out overlap between `input` and `output`
        unsafe { self.apply_unchecked(output.as_mut_ptr(), input.as_ptr(), exponent, input.len()) };
        Ok(())
    }

    /// Raises every element of `data` to `exponent`, overwriting it.
    fn apply_in_place(&self, data: &mut [f32], exponent: f32) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.check_buffer(data.as_ptr())?;

        let ptr = data.as_mut_ptr();
        // SAFETY: every variant reads element i before writing element i
        unsafe { self.apply_unchecked(ptr, ptr, exponent, data.len()) };
        Ok(())
    }

    /// Verifies ISA availability and the start-address alignment of one buffer.
    fn check_buffer(&self, ptr: *const f32) -> Result<()> {
        if !self.is_available() {
            return Err(Error::Unsupported(self.name()));
        }
        let required = self.required_alignment();
        if !is_aligned(ptr, required) {
            return Err(Error::Misaligned {
                variant: self.name(),
                required,
                address: ptr as usize,
            });
        }
        Ok(())
    }
}
