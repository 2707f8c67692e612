//! NEON (`float32x4_t`, 4 x f32) vector math.
//!
//! # Safety
//!
//! NEON is mandatory on AArch64, so these are safe to call on any aarch64 CPU.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::aarch64::*;

use super::{
    ATANH_POLY, EXP2_MAX, EXP2_MIN, EXP2_POLY, EXPONENT_BIAS, MANTISSA_MASK, ONE_BITS,
    SPLIT_MASK, TWO_LOG2_E, TWO_POW_23,
};

#[inline]
unsafe fn is_nan(x: float32x4_t) -> uint32x4_t {
    vmvnq_u32(vceqq_f32(x, x))
}

/// `log2(a)` for finite positive lanes, as integer exponent `e` and
/// `log2` of the reduced mantissa.
#[inline]
unsafe fn vlog2q_parts_f32(a: float32x4_t) -> (float32x4_t, float32x4_t) {
    let one = vdupq_n_f32(1.0);
    let zero = vdupq_n_f32(0.0);

    let subnormal = vcltq_f32(a, vdupq_n_f32(f32::MIN_POSITIVE));
    let scaled = vbslq_f32(subnormal, vmulq_f32(a, vdupq_n_f32(TWO_POW_23)), a);
    let bits = vreinterpretq_s32_f32(scaled);

    let biased = vreinterpretq_s32_u32(vshrq_n_u32::<23>(vreinterpretq_u32_s32(bits)));
    let mut e = vcvtq_f32_s32(vsubq_s32(biased, vdupq_n_s32(EXPONENT_BIAS)));
    e = vsubq_f32(e, vbslq_f32(subnormal, vdupq_n_f32(23.0), zero));

    let mantissa = vorrq_s32(vandq_s32(bits, vdupq_n_s32(MANTISSA_MASK)), vdupq_n_s32(ONE_BITS));
    let mut m = vreinterpretq_f32_s32(mantissa);

    let high = vcgtq_f32(m, vdupq_n_f32(std::f32::consts::SQRT_2));
    m = vbslq_f32(high, vmulq_f32(m, vdupq_n_f32(0.5)), m);
    e = vaddq_f32(e, vbslq_f32(high, one, zero));

    let y = vdivq_f32(vsubq_f32(m, one), vaddq_f32(m, one));
    let y2 = vmulq_f32(y, y);
    let mut poly = vdupq_n_f32(ATANH_POLY[0]);
    for &c in &ATANH_POLY[1..] {
        poly = vaddq_f32(vmulq_f32(poly, y2), vdupq_n_f32(c));
    }
    (e, vmulq_f32(vmulq_f32(y, poly), vdupq_n_f32(TWO_LOG2_E)))
}

#[inline]
unsafe fn vlog2q_specials_f32(a: float32x4_t, result: float32x4_t) -> float32x4_t {
    let result = vbslq_f32(vceqq_f32(a, vdupq_n_f32(0.0)), vdupq_n_f32(f32::NEG_INFINITY), result);
    let result = vbslq_f32(vceqq_f32(a, vdupq_n_f32(f32::INFINITY)), a, result);
    vbslq_f32(is_nan(a), a, result)
}

/// `log2(|x|)` for 4 lanes.
#[inline]
pub unsafe fn vlog2q_f32(x: float32x4_t) -> float32x4_t {
    let a = vabsq_f32(x);
    let (e, log2_m) = vlog2q_parts_f32(a);
    vlog2q_specials_f32(a, vaddq_f32(e, log2_m))
}

#[inline]
unsafe fn vexp2q_poly_f32(f: float32x4_t) -> float32x4_t {
    let mut poly = vdupq_n_f32(EXP2_POLY[0]);
    for &c in &EXP2_POLY[1..] {
        poly = vaddq_f32(vmulq_f32(poly, f), vdupq_n_f32(c));
    }
    poly
}

/// `x * 2^n` for `n` in `[-151, 129]`.
#[inline]
unsafe fn vscaleq_f32(x: float32x4_t, n: int32x4_t) -> float32x4_t {
    let bias = vdupq_n_s32(EXPONENT_BIAS);
    let n1 = vshrq_n_s32::<1>(n);
    let n2 = vsubq_s32(n, n1);
    let s1 = vreinterpretq_f32_s32(vshlq_n_s32::<23>(vaddq_s32(n1, bias)));
    let s2 = vreinterpretq_f32_s32(vshlq_n_s32::<23>(vaddq_s32(n2, bias)));
    vmulq_f32(vmulq_f32(x, s1), s2)
}

/// `2^t` for 4 lanes.
#[inline]
pub unsafe fn vexp2q_f32(t: float32x4_t) -> float32x4_t {
    // NaN lanes convert to 0 and are replaced at the end
    let clamped = vminq_f32(vmaxq_f32(t, vdupq_n_f32(EXP2_MIN)), vdupq_n_f32(EXP2_MAX));

    let n = vcvtnq_s32_f32(clamped);
    let f = vsubq_f32(clamped, vcvtq_f32_s32(n));
    let result = vscaleq_f32(vexp2q_poly_f32(f), n);

    vbslq_f32(is_nan(t), t, result)
}

/// `a^p` for 4 non-negative bases.
#[inline]
pub unsafe fn vpowq_f32(a: float32x4_t, p: float32x4_t) -> float32x4_t {
    let one = vdupq_n_f32(1.0);
    let inf = vdupq_n_f32(f32::INFINITY);
    let a = vabsq_f32(a);

    let (e, log2_m) = vlog2q_parts_f32(a);

    // Exact p * e from the two 12-bit halves of p
    let p_hi = vreinterpretq_f32_s32(vandq_s32(vreinterpretq_s32_f32(p), vdupq_n_s32(SPLIT_MASK)));
    let p_lo = vsubq_f32(p, p_hi);
    let hi = vmulq_f32(p_hi, e);
    let lo = vaddq_f32(vmulq_f32(p_lo, e), vmulq_f32(p, log2_m));

    let regular = vandq_u32(
        vandq_u32(vcgtq_f32(a, vdupq_n_f32(0.0)), vcltq_f32(a, inf)),
        vcltq_f32(vabsq_f32(p), inf),
    );
    let plain = vmulq_f32(p, vlog2q_specials_f32(a, vaddq_f32(e, log2_m)));
    let t = vbslq_f32(regular, vaddq_f32(hi, lo), plain);

    let clamped = vminq_f32(vmaxq_f32(t, vdupq_n_f32(EXP2_MIN)), vdupq_n_f32(EXP2_MAX));
    let n = vcvtnq_s32_f32(clamped);
    let n_f = vcvtq_f32_s32(n);
    let split = vandq_u32(regular, vceqq_f32(clamped, t));
    let f = vbslq_f32(split, vaddq_f32(vsubq_f32(hi, n_f), lo), vsubq_f32(clamped, n_f));

    let mut result = vscaleq_f32(vexp2q_poly_f32(f), n);
    result = vbslq_f32(is_nan(t), t, result);
    result = vbslq_f32(vceqq_f32(p, vdupq_n_f32(0.0)), one, result);
    vbslq_f32(vceqq_f32(a, one), one, result)
}
