//! AVX2 variants (8 lanes).
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

use super::generic::power_range;
use crate::isa::Isa;
use crate::kernel::{Alignment, PowerKernel};

/// AVX2 power kernel. `ALIGNED` selects 32-byte aligned loads and stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avx2Power<const ALIGNED: bool>;

/// `power_32f_a_avx2`
pub type Avx2PowerAligned = Avx2Power<true>;
/// `power_32f_u_avx2`
pub type Avx2PowerUnaligned = Avx2Power<false>;

impl<const ALIGNED: bool> PowerKernel for Avx2Power<ALIGNED> {
    fn name(&self) -> &'static str {
        if ALIGNED {
            "power_32f_a_avx2"
        } else {
            "power_32f_u_avx2"
        }
    }

    fn isa(&self) -> Isa {
        Isa::Avx2
    }

    fn alignment(&self) -> Alignment {
        Alignment::from_flag(ALIGNED)
    }

    unsafe fn apply_unchecked(&self, output: *mut f32, input: *const f32, exponent: f32, count: usize) {
        // SAFETY: pointer validity, alignment and ISA support are the caller's contract
        unsafe { power_avx2::<ALIGNED>(output, input, exponent, count) };
    }
}

#[target_feature(enable = "avx2")]
unsafe fn power_avx2<const ALIGNED: bool>(output: *mut f32, input: *const f32, exponent: f32, count: usize) {
    #[cfg(feature = "vector-math")]
    let number = batches_avx2::<ALIGNED>(output, input, exponent, count);
    #[cfg(not(feature = "vector-math"))]
    let number = 0;

    power_range(output, input, exponent, number, count);
}

#[cfg(feature = "vector-math")]
#[target_feature(enable = "avx2")]
unsafe fn batches_avx2<const ALIGNED: bool>(
    output: *mut f32,
    input: *const f32,
    exponent: f32,
    count: usize,
) -> usize {
    use crate::math::avx2::pow_ps;

    let eighth_points = count / 8;
    let v_power = _mm256_set1_ps(exponent);
    let zero = _mm256_setzero_ps();
    let ones = _mm256_set1_ps(1.0);
    let negative_one_to_power = _mm256_set1_ps((-1.0f32).powf(exponent));

    let mut a_ptr = input;
    let mut c_ptr = output;
    for _ in 0..eighth_points {
        let a_val = if ALIGNED { _mm256_load_ps(a_ptr) } else { _mm256_loadu_ps(a_ptr) };
        let sign_mask = _mm256_cmp_ps::<_CMP_LT_OQ>(a_val, zero);
        let negated = _mm256_sub_ps(zero, a_val);
        let a_val = _mm256_blendv_ps(a_val, negated, sign_mask);

        let c_val = pow_ps(a_val, v_power);
        let c_val = _mm256_mul_ps(_mm256_blendv_ps(ones, negative_one_to_power, sign_mask), c_val);

        if ALIGNED {
            _mm256_store_ps(c_ptr, c_val);
        } else {
            _mm256_storeu_ps(c_ptr, c_val);
        }

        a_ptr = a_ptr.add(8);
        c_ptr = c_ptr.add(8);
    }

    eighth_points * 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligned::AlignedVec;
    use crate::Error;

    #[test]
    fn test_avx2_names() {
        assert_eq!(Avx2PowerAligned::default().name(), "power_32f_a_avx2");
        assert_eq!(Avx2PowerUnaligned::default().name(), "power_32f_u_avx2");
        assert_eq!(Avx2PowerAligned::default().lanes(), 8);
        assert_eq!(Avx2PowerAligned::default().required_alignment(), 32);
    }

    #[test]
    fn test_avx2_aligned_sign_handling() {
        if !is_x86_feature_detected!("avx2") {
            println!("Skipping AVX2 test: AVX2 not supported");
            return;
        }

        let values: Vec<f32> = (0..19).map(|i| i as f32 - 9.0).collect();
        let input = AlignedVec::from_slice(&values);
        let mut output = AlignedVec::zeroed(values.len());
        for exponent in [2.0f32, 3.0, -2.0] {
            Avx2PowerAligned::default().apply(&mut output, &input, exponent).unwrap();
            for (got, &x) in output.iter().zip(values.iter()) {
                let want = x.powf(exponent);
                if want.is_infinite() {
                    assert_eq!(*got, want);
                } else {
                    assert!((got - want).abs() <= want.abs() * 1e-5, "{x}^{exponent}: got {got}, want {want}");
                }
            }
        }
    }

    #[test]
    fn test_avx2_aligned_rejects_16_byte_offset() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }

        let input = AlignedVec::zeroed(16);
        let mut output = AlignedVec::zeroed(16);
        let err = Avx2PowerAligned::default()
            .apply(&mut output[4..], &input[4..], 2.0)
            .unwrap_err();
        assert!(matches!(err, Error::Misaligned { required: 32, .. }));
    }

    #[test]
    fn test_avx2_unavailable_reports_unsupported() {
        if is_x86_feature_detected!("avx2") {
            return;
        }

        let mut output = [0.0f32; 8];
        let err = Avx2PowerUnaligned::default().apply(&mut output, &[1.0; 8], 2.0).unwrap_err();
        assert_eq!(err, Error::Unsupported("power_32f_u_avx2"));
    }
}
