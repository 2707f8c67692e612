//! Portable scalar variant, the reference every SIMD variant is checked against.
#![allow(unsafe_code)]

use crate::isa::Isa;
use crate::kernel::{Alignment, PowerKernel};

/// `power_32f_generic`: one `powf` per element, no alignment requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPower;

impl GenericPower {
    /// Stable variant name.
    pub const NAME: &'static str = "power_32f_generic";
}

impl PowerKernel for GenericPower {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn isa(&self) -> Isa {
        Isa::Generic
    }

    fn alignment(&self) -> Alignment {
        Alignment::Unaligned
    }

    unsafe fn apply_unchecked(&self, output: *mut f32, input: *const f32, exponent: f32, count: usize) {
        // SAFETY: the caller guarantees both pointers are valid for `count` elements
        unsafe { power_range(output, input, exponent, 0, count) };
    }
}

/// Scalar loop over `[start, end)`; also the tail of every SIMD variant.
///
/// # Safety
///
/// `input` must be valid for reads and `output` for writes over `[start, end)`.
/// They may be the same pointer.
#[inline]
pub(crate) unsafe fn power_range(output: *mut f32, input: *const f32, exponent: f32, start: usize, end: usize) {
    for i in start..end {
        // SAFETY: i < end, within the caller's bounds
        unsafe { *output.add(i) = (*input.add(i)).powf(exponent) };
    }
}
