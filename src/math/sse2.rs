//! SSE2 (`__m128`, 4 x f32) vector math.
//!
//! # Safety
//!
//! Every function requires SSE2, which is part of the x86_64 baseline.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

use super::{
    ABS_MASK, ATANH_POLY, EXP2_MAX, EXP2_MIN, EXP2_POLY, EXPONENT_BIAS, MANTISSA_MASK, ONE_BITS,
    SPLIT_MASK, TWO_LOG2_E, TWO_POW_23,
};

/// Lane select: `a` where `mask` is set, `b` elsewhere.
#[inline]
#[target_feature(enable = "sse2")]
pub unsafe fn select_ps(mask: __m128, a: __m128, b: __m128) -> __m128 {
    _mm_or_ps(_mm_and_ps(mask, a), _mm_andnot_ps(mask, b))
}

/// `log2(a)` for finite positive lanes, as integer exponent `e` and
/// `log2` of the mantissa reduced to `[sqrt(1/2), sqrt(2))`.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn log2_parts_ps(a: __m128) -> (__m128, __m128) {
    let one = _mm_set1_ps(1.0);

    // Subnormals: scale into the normal range, compensate in the exponent
    let subnormal = _mm_cmplt_ps(a, _mm_set1_ps(f32::MIN_POSITIVE));
    let scaled = select_ps(subnormal, _mm_mul_ps(a, _mm_set1_ps(TWO_POW_23)), a);
    let bits = _mm_castps_si128(scaled);

    let biased = _mm_srli_epi32(bits, 23);
    let mut e = _mm_cvtepi32_ps(_mm_sub_epi32(biased, _mm_set1_epi32(EXPONENT_BIAS)));
    e = _mm_sub_ps(e, _mm_and_ps(subnormal, _mm_set1_ps(23.0)));

    let mantissa = _mm_or_si128(
        _mm_and_si128(bits, _mm_set1_epi32(MANTISSA_MASK)),
        _mm_set1_epi32(ONE_BITS),
    );
    let mut m = _mm_castsi128_ps(mantissa);

    // [1, 2) -> [sqrt(1/2), sqrt(2))
    let high = _mm_cmpgt_ps(m, _mm_set1_ps(std::f32::consts::SQRT_2));
    m = select_ps(high, _mm_mul_ps(m, _mm_set1_ps(0.5)), m);
    e = _mm_add_ps(e, _mm_and_ps(high, one));

    let y = _mm_div_ps(_mm_sub_ps(m, one), _mm_add_ps(m, one));
    let y2 = _mm_mul_ps(y, y);
    let mut poly = _mm_set1_ps(ATANH_POLY[0]);
    for &c in &ATANH_POLY[1..] {
        poly = _mm_add_ps(_mm_mul_ps(poly, y2), _mm_set1_ps(c));
    }
    (e, _mm_mul_ps(_mm_mul_ps(y, poly), _mm_set1_ps(TWO_LOG2_E)))
}

/// Replaces lanes where `a` is zero, infinite or NaN with `log2(a)`.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn log2_specials_ps(a: __m128, result: __m128) -> __m128 {
    let result = select_ps(_mm_cmpeq_ps(a, _mm_setzero_ps()), _mm_set1_ps(f32::NEG_INFINITY), result);
    let result = select_ps(_mm_cmpeq_ps(a, _mm_set1_ps(f32::INFINITY)), a, result);
    select_ps(_mm_cmpunord_ps(a, a), a, result)
}

/// `log2(|x|)` for 4 lanes.
#[inline]
#[target_feature(enable = "sse2")]
pub unsafe fn log2_ps(x: __m128) -> __m128 {
    let a = _mm_and_ps(x, _mm_castsi128_ps(_mm_set1_epi32(ABS_MASK)));
    let (e, log2_m) = log2_parts_ps(a);
    log2_specials_ps(a, _mm_add_ps(e, log2_m))
}

/// `2^f` for `|f|` around 1/2 or less.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn exp2_poly_ps(f: __m128) -> __m128 {
    let mut poly = _mm_set1_ps(EXP2_POLY[0]);
    for &c in &EXP2_POLY[1..] {
        poly = _mm_add_ps(_mm_mul_ps(poly, f), _mm_set1_ps(c));
    }
    poly
}

/// `x * 2^n` for `n` in `[-151, 129]`, in two steps so neither factor leaves
/// the normal range.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn scale_ps(x: __m128, n: __m128i) -> __m128 {
    let bias = _mm_set1_epi32(EXPONENT_BIAS);
    let n1 = _mm_srai_epi32(n, 1);
    let n2 = _mm_sub_epi32(n, n1);
    let s1 = _mm_castsi128_ps(_mm_slli_epi32(_mm_add_epi32(n1, bias), 23));
    let s2 = _mm_castsi128_ps(_mm_slli_epi32(_mm_add_epi32(n2, bias), 23));
    _mm_mul_ps(_mm_mul_ps(x, s1), s2)
}

/// `2^t` for 4 lanes.
#[inline]
#[target_feature(enable = "sse2")]
pub unsafe fn exp2_ps(t: __m128) -> __m128 {
    // max/min return the second operand for NaN lanes, so the conversion
    // below never sees a NaN
    let clamped = _mm_min_ps(_mm_max_ps(t, _mm_set1_ps(EXP2_MIN)), _mm_set1_ps(EXP2_MAX));

    // Default MXCSR rounding is round-to-nearest-even
    let n = _mm_cvtps_epi32(clamped);
    let f = _mm_sub_ps(clamped, _mm_cvtepi32_ps(n));
    let result = scale_ps(exp2_poly_ps(f), n);

    select_ps(_mm_cmpunord_ps(t, t), t, result)
}

/// `a^p` for 4 non-negative bases.
#[inline]
#[target_feature(enable = "sse2")]
pub unsafe fn pow_ps(a: __m128, p: __m128) -> __m128 {
    let one = _mm_set1_ps(1.0);
    let inf = _mm_set1_ps(f32::INFINITY);
    let abs_mask = _mm_castsi128_ps(_mm_set1_epi32(ABS_MASK));
    let a = _mm_and_ps(a, abs_mask);

    let (e, log2_m) = log2_parts_ps(a);

    // p * e is exact as p_hi * e + p_lo * e: each half of p has 12
    // significant bits and |e| <= 150 has 8
    let p_hi = _mm_and_ps(p, _mm_castsi128_ps(_mm_set1_epi32(SPLIT_MASK)));
    let p_lo = _mm_sub_ps(p, p_hi);
    let hi = _mm_mul_ps(p_hi, e);
    let lo = _mm_add_ps(_mm_mul_ps(p_lo, e), _mm_mul_ps(p, log2_m));

    // Zero, infinite or NaN bases and non-finite exponents take the plain product
    let regular = _mm_and_ps(
        _mm_and_ps(_mm_cmpgt_ps(a, _mm_setzero_ps()), _mm_cmplt_ps(a, inf)),
        _mm_cmplt_ps(_mm_and_ps(p, abs_mask), inf),
    );
    let plain = _mm_mul_ps(p, log2_specials_ps(a, _mm_add_ps(e, log2_m)));
    let t = select_ps(regular, _mm_add_ps(hi, lo), plain);

    let clamped = _mm_min_ps(_mm_max_ps(t, _mm_set1_ps(EXP2_MIN)), _mm_set1_ps(EXP2_MAX));
    let n = _mm_cvtps_epi32(clamped);
    let n_f = _mm_cvtepi32_ps(n);
    let split = _mm_and_ps(regular, _mm_cmpeq_ps(clamped, t));
    let f = select_ps(
        split,
        _mm_add_ps(_mm_sub_ps(hi, n_f), lo),
        _mm_sub_ps(clamped, n_f),
    );

    let mut result = scale_ps(exp2_poly_ps(f), n);
    result = select_ps(_mm_cmpunord_ps(t, t), t, result);
    result = select_ps(_mm_cmpeq_ps(p, _mm_setzero_ps()), one, result);
    select_ps(_mm_cmpeq_ps(a, one), one, result)
}
