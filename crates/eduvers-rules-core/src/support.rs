//! # Support Arithmetic
//!
//! The only module allowed to do floating-point arithmetic.
//!
//! Mining works on integer occurrence counts. Ratios are formed here, and
//! threshold checks compare the correctly rounded quotient `count / total`
//! against the threshold, so `3 / 10` meets a threshold of `0.3` exactly.
#![allow(clippy::float_arithmetic)]

/// `numerator / denominator`, or 0 when the denominator is 0.
#[must_use]
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Check `numerator / denominator >= threshold`.
#[must_use]
pub fn meets(numerator: u64, denominator: u64, threshold: f64) -> bool {
    denominator != 0 && ratio(numerator, denominator) >= threshold
}

/// Smallest occurrence count `k` with `k / total >= min_support`.
///
/// Returns `total + 1` when no count can reach the threshold, so nothing is
/// frequent. Callers validate `min_support` to (0, 1] first.
#[must_use]
pub fn min_count(min_support: f64, total: u64) -> u64 {
    if total == 0 {
        return 1;
    }
    let estimate = (min_support * total as f64).floor().max(0.0) as u64;
    let mut k = estimate.min(total.saturating_add(1));
    while k <= total && !meets(k, total, min_support) {
        k += 1;
    }
    while k > 1 && meets(k - 1, total, min_support) {
        k -= 1;
    }
    k.max(1)
}

/// `confidence / consequent_support`, or 0 when the consequent never occurs.
#[must_use]
pub fn lift(confidence: f64, consequent_support: f64) -> f64 {
    if consequent_support <= 0.0 {
        return 0.0;
    }
    confidence / consequent_support
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_zero_denominator() {
        assert_eq!(ratio(3, 0).to_bits(), 0.0f64.to_bits());
        assert_eq!(ratio(1, 4).to_bits(), 0.25f64.to_bits());
    }

    #[test]
    fn exact_ratio_meets_threshold() {
        assert!(meets(3, 10, 0.3));
        assert!(meets(2, 4, 0.5));
        assert!(!meets(1, 4, 0.5));
    }

    #[test]
    fn min_count_rounds_up() {
        assert_eq!(min_count(0.5, 4), 2);
        assert_eq!(min_count(0.3, 10), 3);
        assert_eq!(min_count(0.1, 25), 3);
        assert_eq!(min_count(0.9, 4), 4);
        assert_eq!(min_count(1.0, 7), 7);
    }

    #[test]
    fn min_count_never_below_one() {
        assert_eq!(min_count(0.0001, 5), 1);
        assert_eq!(min_count(0.5, 0), 1);
    }
}
