//! SSE2 variants (4 lanes), blending with and/andnot/or.
//!
//! # Safety
//!
//! SSE2 is part of the x86_64 baseline; the aligned variant additionally
//! requires 16-byte aligned buffers.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

use super::generic::power_range;
use crate::isa::Isa;
use crate::kernel::{Alignment, PowerKernel};

/// SSE2 power kernel. `ALIGNED` selects aligned loads and stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sse2Power<const ALIGNED: bool>;

/// `power_32f_a_sse2`
pub type Sse2PowerAligned = Sse2Power<true>;
/// `power_32f_u_sse2`
pub type Sse2PowerUnaligned = Sse2Power<false>;

impl<const ALIGNED: bool> PowerKernel for Sse2Power<ALIGNED> {
    fn name(&self) -> &'static str {
        if ALIGNED {
            "power_32f_a_sse2"
        } else {
            "power_32f_u_sse2"
        }
    }

    fn isa(&self) -> Isa {
        Isa::Sse2
    }

    fn alignment(&self) -> Alignment {
        Alignment::from_flag(ALIGNED)
    }

    unsafe fn apply_unchecked(&self, output: *mut f32, input: *const f32, exponent: f32, count: usize) {
        // SAFETY: pointer validity, alignment and ISA support are the caller's contract
        unsafe { power_sse2::<ALIGNED>(output, input, exponent, count) };
    }
}

#[target_feature(enable = "sse2")]
unsafe fn power_sse2<const ALIGNED: bool>(output: *mut f32, input: *const f32, exponent: f32, count: usize) {
    #[cfg(feature = "vector-math")]
    let number = batches_sse2::<ALIGNED>(output, input, exponent, count);
    #[cfg(not(feature = "vector-math"))]
    let number = 0;

    power_range(output, input, exponent, number, count);
}

/// Processes every full batch of 4 and returns the first unprocessed index.
#[cfg(feature = "vector-math")]
#[target_feature(enable = "sse2")]
unsafe fn batches_sse2<const ALIGNED: bool>(
    output: *mut f32,
    input: *const f32,
    exponent: f32,
    count: usize,
) -> usize {
    use crate::math::sse2::pow_ps;

    let quarter_points = count / 4;
    let v_power = _mm_set1_ps(exponent);
    let zero = _mm_setzero_ps();
    let ones = _mm_set1_ps(1.0);
    let negative_one_to_power = _mm_set1_ps((-1.0f32).powf(exponent));

    let mut a_ptr = input;
    let mut c_ptr = output;
    for _ in 0..quarter_points {
        let a_val = if ALIGNED { _mm_load_ps(a_ptr) } else { _mm_loadu_ps(a_ptr) };
        let sign_mask = _mm_cmplt_ps(a_val, zero);
        let negated = _mm_sub_ps(zero, a_val);
        let a_val = _mm_or_ps(_mm_andnot_ps(sign_mask, a_val), _mm_and_ps(sign_mask, negated));

        // pow_ps only handles non-negative bases; the sign comes back through
        // the (-1)^p correction
        let c_val = pow_ps(a_val, v_power);
        let correction =
            _mm_or_ps(_mm_andnot_ps(sign_mask, ones), _mm_and_ps(sign_mask, negative_one_to_power));
        let c_val = _mm_mul_ps(correction, c_val);

        if ALIGNED {
            _mm_store_ps(c_ptr, c_val);
        } else {
            _mm_storeu_ps(c_ptr, c_val);
        }

        a_ptr = a_ptr.add(4);
        c_ptr = c_ptr.add(4);
    }

    quarter_points * 4
}
