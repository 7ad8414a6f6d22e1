//! Salary figure resolution
//!
//! Reduces a vacancy's salary range to the single figure that enters the
//! per-query average.

use crate::domain::SalaryRange;
use crate::error::Result;

/// Representative salary of one vacancy.
///
/// With both bounds present the midpoint is taken with integer division
/// (truncated toward zero) before widening, so `(100_001 + 200_000) / 2`
/// yields `150_000.0`. The sum is taken in `i128`, so any pair of
/// non-negative `i64` bounds resolves without overflow.
pub fn resolve(range: &SalaryRange) -> f64 {
    match *range {
        SalaryRange::Between { from, to } => ((i128::from(from) + i128::from(to)) / 2) as f64,
        SalaryRange::UpTo { to } => to as f64,
        SalaryRange::From { from } => from as f64,
    }
}

/// Same as [`resolve`] for raw nullable bounds. Both bounds absent is an
/// upstream filtering bug and is reported as a precondition violation.
pub fn resolve_bounds(lower: Option<i64>, upper: Option<i64>) -> Result<f64> {
    SalaryRange::from_bounds(lower, upper).map(|range| resolve(&range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;

    #[test]
    fn test_resolve_both_bounds() {
        assert_eq!(resolve_bounds(Some(100_000), Some(200_000)).unwrap(), 150_000.0);
    }

    #[test]
    fn test_resolve_single_bound() {
        assert_eq!(resolve_bounds(Some(100_000), None).unwrap(), 100_000.0);
        assert_eq!(resolve_bounds(None, Some(200_000)).unwrap(), 200_000.0);
    }

    #[test]
    fn test_resolve_truncates_midpoint() {
        assert_eq!(resolve(&SalaryRange::Between { from: 1, to: 2 }), 1.0);
        assert_eq!(
            resolve(&SalaryRange::Between {
                from: 100_001,
                to: 200_000
            }),
            150_000.0
        );
    }

    #[test]
    fn test_resolve_no_bounds_fails_fast() {
        let err = resolve_bounds(None, None).unwrap_err();
        assert!(matches!(err, AnalyticsError::Precondition(_)));
    }

    #[test]
    fn test_resolve_does_not_overflow_on_large_bounds() {
        let top = i32::MAX as i64;
        assert_eq!(resolve_bounds(Some(top), Some(top)).unwrap(), top as f64);
    }

    #[test]
    fn test_resolve_full_i64_range() {
        let figure = resolve_bounds(Some(i64::MAX), Some(i64::MAX)).unwrap();
        assert_eq!(figure, i64::MAX as f64);

        let figure = resolve_bounds(Some(i64::MAX), Some(2)).unwrap();
        assert!(figure > 0.0);
        assert_eq!(figure, (i64::MAX / 2 + 1) as f64);
    }
}
