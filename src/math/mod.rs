//! Vectorized `log2`, `exp2` and `pow` for non-negative bases.
//!
//! These are the vector-math primitives the SIMD kernel variants build on.
//! They ignore the sign bit of the base; the kernels factor the sign out
//! before calling them and apply `(-1)^p` afterwards.
//!
//! ## Algorithm
//!
//! - `log2(a)`: exponent from the IEEE-754 bits (subnormals renormalized by
//!   `2^23`), mantissa reduced to `[sqrt(1/2), sqrt(2))`, then
//!   `ln(m) = 2 * atanh((m - 1) / (m + 1))` as an odd series.
//! - `exp2(t)`: `t = n + f` with `n = round(t)`, `|f| <= 1/2`, Taylor series
//!   of `2^f` to degree 7, and `2^n` assembled as `2^(n/2) * 2^(n - n/2)` so
//!   results in the subnormal range and overflow to infinity come out right.
//! - `pow(a, p) = exp2(p * log2(a))`, with `p == 0` and `a == 1` forced to
//!   `1.0` the way `powf` defines them. `log2(a)` stays split as `e + l`
//!   (integer exponent, mantissa log) and `p * e` is formed exactly from
//!   `p` cut into two 12-bit halves, so `n = round(t)` and `f = t - n` carry
//!   no rounding from the integer part. Results just below `f32::MAX` stay
//!   finite.
//!
//! Accuracy is a few ULP of `p * l` carried into the result, well inside a
//! `1e-5` relative tolerance for results in the normal range.

#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

#[cfg(target_arch = "aarch64")]
pub mod neon;

/// `atanh` series coefficients `1/15, 1/13, ..., 1/3, 1`, highest order first.
pub(crate) const ATANH_POLY: [f32; 8] = [
    1.0 / 15.0,
    1.0 / 13.0,
    1.0 / 11.0,
    1.0 / 9.0,
    1.0 / 7.0,
    1.0 / 5.0,
    1.0 / 3.0,
    1.0,
];

/// Taylor coefficients `ln(2)^k / k!` of `2^f`, highest order first.
pub(crate) const EXP2_POLY: [f32; 8] = [
    1.525273380405984e-5,
    1.540353039338161e-4,
    1.333355814642844e-3,
    9.618129107628477e-3,
    5.550410866482158e-2,
    2.402265069591007e-1,
    6.931471805599453e-1,
    1.0,
];

/// `2 * log2(e)`: converts `atanh` of the reduced mantissa into `log2(m)`.
pub(crate) const TWO_LOG2_E: f32 = 2.0 * std::f32::consts::LOG2_E;

/// `2^23`, scales subnormal inputs into the normal range.
pub(crate) const TWO_POW_23: f32 = 8_388_608.0;

/// Below this, `2^t` rounds to zero even for the largest `2^f`.
pub(crate) const EXP2_MIN: f32 = -151.0;

/// Above this, `2^t` is infinite.
pub(crate) const EXP2_MAX: f32 = 129.0;

pub(crate) const EXPONENT_BIAS: i32 = 127;
pub(crate) const MANTISSA_MASK: i32 = 0x007f_ffff;
pub(crate) const ONE_BITS: i32 = 0x3f80_0000;
#[cfg(target_arch = "x86_64")]
pub(crate) const ABS_MASK: i32 = 0x7fff_ffff;

/// Keeps sign, exponent and the top 11 mantissa bits (`0xffff_f000`).
pub(crate) const SPLIT_MASK: i32 = -4096;

/// Scalar rendition of the vector algorithm, lane-for-lane.
///
/// Used to check the constants independently of any instruction set.
#[cfg(test)]
pub(crate) fn pow_reference(a: f32, p: f32) -> f32 {
    fn log2_parts(a: f32) -> (f32, f32) {
        let mut a = a;
        let mut e_adj = 0.0;
        if a < f32::MIN_POSITIVE {
            a *= TWO_POW_23;
            e_adj = 23.0;
        }
        let bits = a.to_bits() as i32;
        let mut e = ((bits >> 23) - EXPONENT_BIAS) as f32 - e_adj;
        let mut m = f32::from_bits(((bits & MANTISSA_MASK) | ONE_BITS) as u32);
        if m > std::f32::consts::SQRT_2 {
            m *= 0.5;
            e += 1.0;
        }
        let y = (m - 1.0) / (m + 1.0);
        let y2 = y * y;
        let poly = ATANH_POLY[1..].iter().fold(ATANH_POLY[0], |acc, &c| acc * y2 + c);
        (e, y * poly * TWO_LOG2_E)
    }

    fn log2(a: f32) -> f32 {
        if a.is_nan() {
            return a;
        }
        if a == 0.0 {
            return f32::NEG_INFINITY;
        }
        if a.is_infinite() {
            return f32::INFINITY;
        }
        let (e, l) = log2_parts(a);
        e + l
    }

    fn scale(poly: f32, n: i32) -> f32 {
        let n1 = n >> 1;
        let n2 = n - n1;
        let s1 = f32::from_bits(((n1 + EXPONENT_BIAS) << 23) as u32);
        let s2 = f32::from_bits(((n2 + EXPONENT_BIAS) << 23) as u32);
        poly * s1 * s2
    }

    fn exp2_poly(f: f32) -> f32 {
        EXP2_POLY[1..].iter().fold(EXP2_POLY[0], |acc, &c| acc * f + c)
    }

    // f32::round_ties_even needs a newer toolchain than the crate's MSRV
    fn round_ties_even(x: f32) -> f32 {
        let r = x.round();
        if (x - x.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
            r - x.signum()
        } else {
            r
        }
    }

    if p == 0.0 || a == 1.0 {
        return 1.0;
    }
    let a = a.abs();

    let regular = a > 0.0 && a.is_finite() && p.is_finite();
    let (e, l) = log2_parts(a);
    let p_hi = f32::from_bits(p.to_bits() & SPLIT_MASK as u32);
    let p_lo = p - p_hi;
    let hi = p_hi * e;
    let lo = p_lo * e + p * l;

    let t = if regular { hi + lo } else { p * log2(a) };
    if t.is_nan() {
        return t;
    }
    let clamped = t.clamp(EXP2_MIN, EXP2_MAX);
    let n = round_ties_even(clamped);
    let f = if regular && clamped == t {
        (hi - n) + lo
    } else {
        clamped - n
    };
    scale(exp2_poly(f), n as i32)
}
