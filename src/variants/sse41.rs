//! SSE4.1 variants (4 lanes), blending with `blendv`.
//!
//! Same arithmetic as the SSE2 variants; only the lane blend differs.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

use super::generic::power_range;
use crate::isa::Isa;
use crate::kernel::{Alignment, PowerKernel};

/// SSE4.1 power kernel. `ALIGNED` selects aligned loads and stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sse41Power<const ALIGNED: bool>;

/// `power_32f_a_sse4_1`
pub type Sse41PowerAligned = Sse41Power<true>;
/// `power_32f_u_sse4_1`
pub type Sse41PowerUnaligned = Sse41Power<false>;

impl<const ALIGNED: bool> PowerKernel for Sse41Power<ALIGNED> {
    fn name(&self) -> &'static str {
        if ALIGNED {
            "power_32f_a_sse4_1"
        } else {
            "power_32f_u_sse4_1"
        }
    }

    fn isa(&self) -> Isa {
        Isa::Sse41
    }

    fn alignment(&self) -> Alignment {
        Alignment::from_flag(ALIGNED)
    }

    unsafe fn apply_unchecked(&self, output: *mut f32, input: *const f32, exponent: f32, count: usize) {
        // SAFETY: pointer validity, alignment and ISA support are the caller's contract
        unsafe { power_sse41::<ALIGNED>(output, input, exponent, count) };
    }
}

#[target_feature(enable = "sse4.1")]
unsafe fn power_sse41<const ALIGNED: bool>(output: *mut f32, input: *const f32, exponent: f32, count: usize) {
    #[cfg(feature = "vector-math")]
    let number = batches_sse41::<ALIGNED>(output, input, exponent, count);
    #[cfg(not(feature = "vector-math"))]
    let number = 0;

    power_range(output, input, exponent, number, count);
}

#[cfg(feature = "vector-math")]
#[target_feature(enable = "sse4.1")]
unsafe fn batches_sse41<const ALIGNED: bool>(
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
        let a_val = _mm_blendv_ps(a_val, negated, sign_mask);

        let c_val = pow_ps(a_val, v_power);
        let c_val = _mm_mul_ps(_mm_blendv_ps(ones, negative_one_to_power, sign_mask), c_val);

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
