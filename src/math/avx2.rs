//! AVX2 (`__m256`, 8 x f32) vector math.
//!
//! # Safety
//!
//! Callers must have verified AVX2 support at runtime.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

use super::{
    ABS_MASK, ATANH_POLY, EXP2_MAX, EXP2_MIN, EXP2_POLY, EXPONENT_BIAS, MANTISSA_MASK, ONE_BITS,
    SPLIT_MASK, TWO_LOG2_E, TWO_POW_23,
};

/// `log2(a)` for finite positive lanes, as integer exponent `e` and
/// `log2` of the reduced mantissa.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn log2_parts_ps(a: __m256) -> (__m256, __m256) {
    let one = _mm256_set1_ps(1.0);

    let subnormal = _mm256_cmp_ps::<_CMP_LT_OQ>(a, _mm256_set1_ps(f32::MIN_POSITIVE));
    let scaled = _mm256_blendv_ps(a, _mm256_mul_ps(a, _mm256_set1_ps(TWO_POW_23)), subnormal);
    let bits = _mm256_castps_si256(scaled);

    let biased = _mm256_srli_epi32::<23>(bits);
    let mut e = _mm256_cvtepi32_ps(_mm256_sub_epi32(biased, _mm256_set1_epi32(EXPONENT_BIAS)));
    e = _mm256_sub_ps(e, _mm256_and_ps(subnormal, _mm256_set1_ps(23.0)));

    let mantissa = _mm256_or_si256(
        _mm256_and_si256(bits, _mm256_set1_epi32(MANTISSA_MASK)),
        _mm256_set1_epi32(ONE_BITS),
    );
    let mut m = _mm256_castsi256_ps(mantissa);

    let high = _mm256_cmp_ps::<_CMP_GT_OQ>(m, _mm256_set1_ps(std::f32::consts::SQRT_2));
    m = _mm256_blendv_ps(m, _mm256_mul_ps(m, _mm256_set1_ps(0.5)), high);
    e = _mm256_add_ps(e, _mm256_and_ps(high, one));

    let y = _mm256_div_ps(_mm256_sub_ps(m, one), _mm256_add_ps(m, one));
    let y2 = _mm256_mul_ps(y, y);
    let mut poly = _mm256_set1_ps(ATANH_POLY[0]);
    for &c in &ATANH_POLY[1..] {
        poly = _mm256_add_ps(_mm256_mul_ps(poly, y2), _mm256_set1_ps(c));
    }
    (e, _mm256_mul_ps(_mm256_mul_ps(y, poly), _mm256_set1_ps(TWO_LOG2_E)))
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn log2_specials_ps(a: __m256, result: __m256) -> __m256 {
    let zero = _mm256_cmp_ps::<_CMP_EQ_OQ>(a, _mm256_setzero_ps());
    let result = _mm256_blendv_ps(result, _mm256_set1_ps(f32::NEG_INFINITY), zero);
    let inf = _mm256_cmp_ps::<_CMP_EQ_OQ>(a, _mm256_set1_ps(f32::INFINITY));
    let result = _mm256_blendv_ps(result, a, inf);
    _mm256_blendv_ps(result, a, _mm256_cmp_ps::<_CMP_UNORD_Q>(a, a))
}

/// `log2(|x|)` for 8 lanes.
#[inline]
#[target_feature(enable = "avx2")]
pub unsafe fn log2_ps(x: __m256) -> __m256 {
    let a = _mm256_and_ps(x, _mm256_castsi256_ps(_mm256_set1_epi32(ABS_MASK)));
    let (e, log2_m) = log2_parts_ps(a);
    log2_specials_ps(a, _mm256_add_ps(e, log2_m))
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn exp2_poly_ps(f: __m256) -> __m256 {
    let mut poly = _mm256_set1_ps(EXP2_POLY[0]);
    for &c in &EXP2_POLY[1..] {
        poly = _mm256_add_ps(_mm256_mul_ps(poly, f), _mm256_set1_ps(c));
    }
    poly
}

/// `x * 2^n` for `n` in `[-151, 129]`.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn scale_ps(x: __m256, n: __m256i) -> __m256 {
    let bias = _mm256_set1_epi32(EXPONENT_BIAS);
    let n1 = _mm256_srai_epi32::<1>(n);
    let n2 = _mm256_sub_epi32(n, n1);
    let s1 = _mm256_castsi256_ps(_mm256_slli_epi32::<23>(_mm256_add_epi32(n1, bias)));
    let s2 = _mm256_castsi256_ps(_mm256_slli_epi32::<23>(_mm256_add_epi32(n2, bias)));
    _mm256_mul_ps(_mm256_mul_ps(x, s1), s2)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn clamp_exp2_ps(t: __m256) -> __m256 {
    _mm256_min_ps(
        _mm256_max_ps(t, _mm256_set1_ps(EXP2_MIN)),
        _mm256_set1_ps(EXP2_MAX),
    )
}

/// `2^t` for 8 lanes.
#[inline]
#[target_feature(enable = "avx2")]
pub unsafe fn exp2_ps(t: __m256) -> __m256 {
    let clamped = clamp_exp2_ps(t);
    let n = _mm256_cvtps_epi32(clamped);
    let f = _mm256_sub_ps(clamped, _mm256_cvtepi32_ps(n));
    let result = scale_ps(exp2_poly_ps(f), n);

    _mm256_blendv_ps(result, t, _mm256_cmp_ps::<_CMP_UNORD_Q>(t, t))
}

/// `a^p` for 8 non-negative bases.
#[inline]
#[target_feature(enable = "avx2")]
pub unsafe fn pow_ps(a: __m256, p: __m256) -> __m256 {
    let one = _mm256_set1_ps(1.0);
    let inf = _mm256_set1_ps(f32::INFINITY);
    let abs_mask = _mm256_castsi256_ps(_mm256_set1_epi32(ABS_MASK));
    let a = _mm256_and_ps(a, abs_mask);

    let (e, log2_m) = log2_parts_ps(a);

    // Exact p * e from the two 12-bit halves of p
    let p_hi = _mm256_and_ps(p, _mm256_castsi256_ps(_mm256_set1_epi32(SPLIT_MASK)));
    let p_lo = _mm256_sub_ps(p, p_hi);
    let hi = _mm256_mul_ps(p_hi, e);
    let lo = _mm256_add_ps(_mm256_mul_ps(p_lo, e), _mm256_mul_ps(p, log2_m));

    let regular = _mm256_and_ps(
        _mm256_and_ps(
            _mm256_cmp_ps::<_CMP_GT_OQ>(a, _mm256_setzero_ps()),
            _mm256_cmp_ps::<_CMP_LT_OQ>(a, inf),
        ),
        _mm256_cmp_ps::<_CMP_LT_OQ>(_mm256_and_ps(p, abs_mask), inf),
    );
    let plain = _mm256_mul_ps(p, log2_specials_ps(a, _mm256_add_ps(e, log2_m)));
    let t = _mm256_blendv_ps(plain, _mm256_add_ps(hi, lo), regular);

    let clamped = clamp_exp2_ps(t);
    let n = _mm256_cvtps_epi32(clamped);
    let n_f = _mm256_cvtepi32_ps(n);
    let split = _mm256_and_ps(regular, _mm256_cmp_ps::<_CMP_EQ_OQ>(clamped, t));
    let f = _mm256_blendv_ps(
        _mm256_sub_ps(clamped, n_f),
        _mm256_add_ps(_mm256_sub_ps(hi, n_f), lo),
        split,
    );

    let mut result = scale_ps(exp2_poly_ps(f), n);
    result = _mm256_blendv_ps(result, t, _mm256_cmp_ps::<_CMP_UNORD_Q>(t, t));
    let p_zero = _mm256_cmp_ps::<_CMP_EQ_OQ>(p, _mm256_setzero_ps());
    result = _mm256_blendv_ps(result, one, p_zero);
    _mm256_blendv_ps(result, one, _mm256_cmp_ps::<_CMP_EQ_OQ>(a, one))
}
