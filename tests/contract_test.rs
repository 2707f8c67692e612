//! Contract tests: every variant against the generic scalar kernel.
//!
//! Run: cargo test --test contract_test

#![allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::needless_range_loop
)]

use proptest::prelude::*;

use simd_pow::prelude::{
    available_variants, power_32f, variants, AlignedVec, Alignment, Error, GenericPower, PowerKernel,
};

const TOLERANCE: f32 = 1e-5;

/// Runs `variant` on 64-byte aligned copies of `input`.
fn run_aligned(variant: &dyn PowerKernel, input: &[f32], exponent: f32) -> Vec<f32> {
    let input = AlignedVec::from_slice(input);
    let mut output = AlignedVec::zeroed(input.len());
    variant.apply(&mut output, &input, exponent).unwrap();
    output.to_vec()
}

/// Runs `variant` on buffers that start one element past an aligned boundary.
fn run_offset(variant: &dyn PowerKernel, input: &[f32], exponent: f32) -> Vec<f32> {
    let mut padded = vec![0.0f32];
    padded.extend_from_slice(input);
    let padded = AlignedVec::from_slice(&padded);
    let mut output = AlignedVec::zeroed(padded.len());
    variant.apply(&mut output[1..], &padded[1..], exponent).unwrap();
    output[1..].to_vec()
}

fn generic(input: &[f32], exponent: f32) -> Vec<f32> {
    run_aligned(&GenericPower, input, exponent)
}

/// Same NaN/Inf classification, and finite values within relative tolerance.
fn agrees(got: f32, want: f32) -> bool {
    if want.is_nan() || got.is_nan() {
        return want.is_nan() && got.is_nan();
    }
    if want.is_infinite() || got.is_infinite() {
        return want.is_infinite() && got.is_infinite();
    }
    let diff = (got - want).abs();
    diff <= want.abs() * TOLERANCE || diff <= f32::MIN_POSITIVE
}

fn assert_agrees(name: &str, got: &[f32], want: &[f32], input: &[f32], exponent: f32) {
    assert_eq!(got.len(), want.len(), "{name}: length changed");
    for i in 0..want.len() {
        assert!(
            agrees(got[i], want[i]),
            "{name}: index {i}, base {} ^ {exponent}: got {}, want {}",
            input[i],
            got[i],
            want[i]
        );
    }
}

fn unaligned_variants() -> impl Iterator<Item = &'static dyn PowerKernel> {
    available_variants()
        .into_iter()
        .filter(|v| v.alignment() == Alignment::Unaligned)
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_squares_of_first_ten_integers() {
    let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
    let expected = [0.0f32, 1.0, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0, 64.0, 81.0];

    for v in available_variants() {
        let got = run_aligned(v, &input, 2.0);
        assert_agrees(v.name(), &got, &expected, &input, 2.0);
    }
}

#[test]
fn test_cubes_keep_sign() {
    let input = [-2.0f32, -1.0, 0.0, 1.0, 2.0];
    let expected = [-8.0f32, -1.0, 0.0, 1.0, 8.0];

    for v in available_variants() {
        let got = run_aligned(v, &input, 3.0);
        assert_agrees(v.name(), &got, &expected, &input, 3.0);
        assert!(got[0] < 0.0 && got[1] < 0.0, "{}: lost sign", v.name());
    }
}

#[test]
fn test_sqrt_of_negative_is_nan() {
    for v in available_variants() {
        let got = run_aligned(v, &[-4.0], 0.5);
        assert!(got[0].is_nan(), "{}: got {}", v.name(), got[0]);
    }
}

#[test]
fn test_sqrt_of_negative_is_nan_inside_full_batch() {
    let input = [-4.0f32; 16];
    for v in available_variants() {
        let got = run_aligned(v, &input, 0.5);
        assert!(got.iter().all(|x| x.is_nan()), "{}: got {got:?}", v.name());
    }
}

// ============================================================================
// Tail handling
// ============================================================================

#[test]
fn test_every_tail_length() {
    for v in available_variants() {
        let w = v.lanes();
        for k in [0, 1, 2, 5] {
            for extra in 0..w {
                let count = w * k + extra;
                let input: Vec<f32> = (0..count).map(|i| (i as f32 - 7.0) * 0.75).collect();
                let want = generic(&input, 3.0);
                let got = run_aligned(v, &input, 3.0);
                assert_agrees(v.name(), &got, &want, &input, 3.0);
            }
        }
    }
}

#[test]
fn test_every_tail_length_offset_buffers() {
    for v in unaligned_variants() {
        let w = v.lanes();
        for count in 0..(w * 3 + w) {
            let input: Vec<f32> = (0..count).map(|i| 0.5 + i as f32).collect();
            let want = generic(&input, 1.5);
            let got = run_offset(v, &input, 1.5);
            assert_agrees(v.name(), &got, &want, &input, 1.5);
        }
    }
}

// ============================================================================
// Sign handling
// ============================================================================

#[test]
fn test_negative_bases_integer_exponents() {
    let input: Vec<f32> = (1..=24).map(|i| -(i as f32) * 0.5).collect();

    for exponent in [2.0f32, 3.0, -2.0, -3.0, 1.0, 0.0] {
        let want: Vec<f32> = input.iter().map(|x| x.powf(exponent)).collect();
        for v in available_variants() {
            let got = run_aligned(v, &input, exponent);
            assert_agrees(v.name(), &got, &want, &input, exponent);
            for i in 0..got.len() {
                assert_eq!(
                    got[i].is_sign_negative(),
                    want[i].is_sign_negative(),
                    "{}: sign at {i} for exponent {exponent}",
                    v.name()
                );
            }
        }
    }
}

#[test]
fn test_zero_exponent_gives_one() {
    let input = [-3.0f32, -1.0, 0.0, 0.5, 1.0, 2.0, 100.0, 1e-30];
    for v in available_variants() {
        let got = run_aligned(v, &input, 0.0);
        assert!(got.iter().all(|&x| x == 1.0), "{}: got {got:?}", v.name());
    }
}

#[test]
fn test_special_values_match_generic() {
    let input = [
        f32::NAN,
        f32::INFINITY,
        0.0,
        1.0,
        -1.0,
        f32::MAX,
        f32::MIN_POSITIVE,
    ];
    for exponent in [2.0f32, -1.0, 0.5] {
        let want = generic(&input, exponent);
        for v in available_variants() {
            let got = run_aligned(v, &input, exponent);
            assert_agrees(v.name(), &got, &want, &input, exponent);
        }
    }
}

#[test]
fn test_results_just_below_max_stay_finite() {
    let big = 1.844_674_3e19_f32;
    let cases = [
        (f32::MAX, 1.0f32),
        (-f32::MAX, 1.0),
        (big, 2.0),
        (-big, 2.0),
        (f32::MAX, 0.5),
        (f32::MAX.sqrt(), 2.0),
    ];
    for (base, exponent) in cases {
        // Full batch of one base so every lane goes through the vector path
        let input = [base; 16];
        let want = base.powf(exponent);
        assert!(want.is_finite());
        for v in available_variants() {
            let got = run_aligned(v, &input, exponent);
            assert_agrees(v.name(), &got, &[want; 16], &input, exponent);
        }
    }

    let input = [f32::MAX, -f32::MAX, f32::MAX, -f32::MAX, f32::MAX, -f32::MAX, f32::MAX, -f32::MAX];
    for v in available_variants() {
        let got = run_aligned(v, &input, 1.0);
        assert_eq!(got.as_slice(), input.as_slice(), "{}", v.name());
    }
}

#[test]
fn test_overflow_boundary_matches_generic() {
    let input: Vec<f32> = (0..64).map(|i| f32::MAX / (1.0 + i as f32 * 1e-7)).collect();
    for exponent in [1.0f32, 1.000_000_1, 0.999_999_9] {
        let want = generic(&input, exponent);
        for v in available_variants() {
            let got = run_aligned(v, &input, exponent);
            assert_agrees(v.name(), &got, &want, &input, exponent);
        }
    }
}

// ============================================================================
// Zero length, idempotence, in place
// ============================================================================

#[test]
fn test_zero_length_is_noop() {
    for v in variants() {
        let mut output: [f32; 0] = [];
        v.apply(&mut output, &[], 2.0).unwrap();
        v.apply_in_place(&mut output, 2.0).unwrap();
    }
}

#[test]
fn test_generic_is_idempotent() {
    let input: Vec<f32> = (0..101).map(|i| (i as f32 - 50.0) * 0.37).collect();
    let first = generic(&input, 2.5);
    let second = generic(&input, 2.5);
    let first_bits: Vec<u32> = first.iter().map(|x| x.to_bits()).collect();
    let second_bits: Vec<u32> = second.iter().map(|x| x.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
}

#[test]
fn test_in_place_matches_out_of_place() {
    let input: Vec<f32> = (0..37).map(|i| i as f32 * 0.25).collect();
    for v in available_variants() {
        let want = run_aligned(v, &input, 1.75);
        let mut data = AlignedVec::from_slice(&input);
        v.apply_in_place(&mut data, 1.75).unwrap();
        assert_eq!(data.as_slice(), want.as_slice(), "{}", v.name());
    }
}

#[test]
fn test_length_mismatch_reported() {
    for v in available_variants() {
        let input = AlignedVec::zeroed(8);
        let mut output = AlignedVec::zeroed(7);
        let err = v.apply(&mut output, &input, 2.0).unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                input_len: 8,
                output_len: 7
            }
        );
    }
}

#[test]
fn test_global_entry_point_accepts_any_buffer() {
    let input: Vec<f32> = (0..33).map(|i| i as f32).collect();
    let padded = AlignedVec::from_slice(&input);
    let mut output = AlignedVec::zeroed(input.len());

    power_32f(&mut output[1..], &padded[1..], 2.0).unwrap();
    let want = generic(&input[1..], 2.0);
    assert_agrees("power_32f", &output[1..], &want, &input[1..], 2.0);
}

// ============================================================================
// Property-based equivalence
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every available variant agrees with the generic kernel on aligned buffers
    #[test]
    fn prop_variants_match_generic(
        input in prop::collection::vec(-100.0f32..100.0, 0..200),
        exponent in -3.0f32..3.0
    ) {
        let want = generic(&input, exponent);
        for v in available_variants() {
            let got = run_aligned(v, &input, exponent);
            for i in 0..want.len() {
                prop_assert!(
                    agrees(got[i], want[i]),
                    "{}: {} ^ {} = {}, want {}", v.name(), input[i], exponent, got[i], want[i]
                );
            }
        }
    }

    /// Integer exponents keep sign on negative bases
    #[test]
    fn prop_integer_exponents_match_generic(
        input in prop::collection::vec(-20.0f32..20.0, 0..100),
        exponent in -4i32..=4
    ) {
        let exponent = exponent as f32;
        let want = generic(&input, exponent);
        for v in available_variants() {
            let got = run_aligned(v, &input, exponent);
            for i in 0..want.len() {
                prop_assert!(agrees(got[i], want[i]), "{}: index {}", v.name(), i);
            }
        }
    }

    /// Unaligned variants accept buffers at any f32 offset
    #[test]
    fn prop_unaligned_variants_match_generic_at_offset(
        input in prop::collection::vec(0.0f32..1000.0, 0..100),
        exponent in -2.0f32..2.0
    ) {
        let want = generic(&input, exponent);
        for v in unaligned_variants() {
            let got = run_offset(v, &input, exponent);
            for i in 0..want.len() {
                prop_assert!(agrees(got[i], want[i]), "{}: index {}", v.name(), i);
            }
        }
    }
}
