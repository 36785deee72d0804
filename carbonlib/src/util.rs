// Numeric guard helpers shared across the calculation pipeline.
//
// The engine substitutes conservative defaults instead of propagating
// NaN/Infinity: ratios with a legitimately zero denominator yield 0, and
// malformed numeric inputs are coerced to a documented default.

/// Return `value` if it is a finite number, otherwise `default`.
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Divide `numerator` by `denominator`, returning 0 when the denominator
/// is zero or the quotient is not finite.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or(numerator / denominator, 0.0)
}

/// Percentage reduction from `baseline` to `adjusted`, 0 when the baseline
/// is zero.
pub fn reduction_percent(baseline: f64, adjusted: f64) -> f64 {
    ratio_or_zero(baseline - adjusted, baseline) * 100.0
}

/// Clamp a percentage input to the [0, 100] range, treating non-finite
/// values as 0.
pub fn clamp_percent(value: f64) -> f64 {
    finite_or(value, 0.0).clamp(0.0, 100.0)
}
