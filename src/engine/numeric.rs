//! Guarded arithmetic: corrupt readings must never push NaN or Infinity into
//! a total, so every product or quotient that touches raw input goes through
//! these helpers.

/// Returns `value` if finite, otherwise `0.0`.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Multiplies two operands, returning `0.0` if either operand or the product
/// is non-finite.
pub fn guarded_mul(a: f64, b: f64) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return 0.0;
    }
    finite_or_zero(a * b)
}

/// Divides `num` by `den`, returning `0.0` for a zero divisor or any
/// non-finite operand or result.
pub fn guarded_div(num: f64, den: f64) -> f64 {
    if !num.is_finite() || !den.is_finite() || den == 0.0 {
        return 0.0;
    }
    finite_or_zero(num / den)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
