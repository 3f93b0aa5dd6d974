//! Floating point comparisons, thin wrappers around the `approx` crate.

use approx::AbsDiffEq;

/// Tolerance used when checking that initial proportions sum to one.
pub const PROPORTION_TOLERANCE: f64 = 1e-9;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// True if `values` sum to one within [`PROPORTION_TOLERANCE`].
#[must_use]
pub fn sums_to_one(values: &[f64]) -> bool {
    almost_eq(values.iter().sum(), 1.0, PROPORTION_TOLERANCE)
}

/// True if `p` is a probability, i.e. a finite value in `[0, 1]`.
#[must_use]
pub fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr, $prec:expr $(,)?) => {
        if !$crate::numeric::almost_eq($a, $b, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`)",
                $prec, $a, $b
            );
        }
    };
}
