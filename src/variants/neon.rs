//! NEON variants (4 lanes), blending with bit-select.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::aarch64::*;

use super::generic::power_range;
use crate::isa::Isa;
use crate::kernel::{Alignment, PowerKernel};

/// NEON power kernel.
///
/// NEON has no separate aligned load; the aligned variant exists so the
/// dispatcher naming stays uniform and enforces the 16-byte precondition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeonPower<const ALIGNED: bool>;

/// `power_32f_a_neon`
pub type NeonPowerAligned = NeonPower<true>;
/// `power_32f_u_neon`
pub type NeonPowerUnaligned = NeonPower<false>;

impl<const ALIGNED: bool> PowerKernel for NeonPower<ALIGNED> {
    fn name(&self) -> &'static str {
        if ALIGNED {
            "power_32f_a_neon"
        } else {
            "power_32f_u_neon"
        }
    }

    fn isa(&self) -> Isa {
        Isa::Neon
    }

    fn alignment(&self) -> Alignment {
        Alignment::from_flag(ALIGNED)
    }

    unsafe fn apply_unchecked(&self, output: *mut f32, input: *const f32, exponent: f32, count: usize) {
        // SAFETY: the caller guarantees both pointers are valid for `count`
        // elements; NEON is mandatory on aarch64
        #[cfg(feature = "vector-math")]
        let number = unsafe { batches_neon(output, input, exponent, count) };
        #[cfg(not(feature = "vector-math"))]
        let number = 0;

        // SAFETY: as above, over the remaining `[number, count)`
        unsafe { power_range(output, input, exponent, number, count) };
    }
}

#[cfg(feature = "vector-math")]
unsafe fn batches_neon(output: *mut f32, input: *const f32, exponent: f32, count: usize) -> usize {
    use crate::math::neon::vpowq_f32;

    let quarter_points = count / 4;
    let v_power = vdupq_n_f32(exponent);
    let zero = vdupq_n_f32(0.0);
    let ones = vdupq_n_f32(1.0);
    let negative_one_to_power = vdupq_n_f32((-1.0f32).powf(exponent));

    let mut a_ptr = input;
    let mut c_ptr = output;
    for _ in 0..quarter_points {
        let a_val = vld1q_f32(a_ptr);
        let sign_mask = vcltq_f32(a_val, zero);
        let a_val = vbslq_f32(sign_mask, vnegq_f32(a_val), a_val);

        let c_val = vpowq_f32(a_val, v_power);
        let c_val = vmulq_f32(vbslq_f32(sign_mask, negative_one_to_power, ones), c_val);

        vst1q_f32(c_ptr, c_val);

        a_ptr = a_ptr.add(4);
        c_ptr = c_ptr.add(4);
    }

    quarter_points * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neon_cubes() {
        let input = [-2.0f32, -1.0, 0.0, 1.0, 2.0];
        let mut output = [0.0f32; 5];
        NeonPowerUnaligned::default().apply(&mut output, &input, 3.0).unwrap();
        let expected = [-8.0f32, -1.0, 0.0, 1.0, 8.0];
        for (got, want) in output.iter().zip(expected.iter()) {
            assert!((got - want).abs() <= want.abs() * 1e-5, "got {got}, want {want}");
        }
    }
}
