//! Assertion macros for sample data.

/// Assert that two floating-point values are approximately equal.
///
/// ```rust
/// use balance_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(1.0_f64, 1.0001_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
}

/// Assert that a sequence never decreases.
///
/// ```rust
/// use balance_test_helpers::assert_sorted;
///
/// assert_sorted!(&[0.1, 0.2, 0.2, 0.3]);
/// ```
#[macro_export]
macro_rules! assert_sorted {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev > curr {
                    panic!(
                        "assertion failed: collection is not sorted\n  first unsorted pair at index {}: {:?} > {:?}",
                        i, prev, curr
                    );
                }
                prev = curr;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_tolerance() {
        assert_approx_eq!(2.5_f64, 2.5004, 0.001);
    }

    #[test]
    #[should_panic(expected = "left ≈ right")]
    fn test_approx_eq_outside_tolerance() {
        assert_approx_eq!(2.5_f64, 2.6, 0.001);
    }

    #[test]
    #[should_panic(expected = "not sorted")]
    fn test_sorted_rejects_decrease() {
        assert_sorted!(&[1.0, 3.0, 2.0]);
    }
}
