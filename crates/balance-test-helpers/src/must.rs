//! Unwrap helper with a good error message.
//!
//! Replaces `expect()` on `Option`s in test code. `#[track_caller]` keeps the
//! panic location at the call site.

/// Unwrap an `Option`, panicking with `msg` on `None`.
///
/// ```rust
/// use balance_test_helpers::must_some;
///
/// assert_eq!(must_some(Some(3), "value present"), 3);
/// ```
///
/// # Panics
///
/// Panics if the option is `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_must_some_value() {
        assert_eq!(must_some(Some("x"), "present"), "x");
    }

    #[test]
    #[should_panic(expected = "must_some: expected value")]
    fn test_must_some_none() {
        let _ = must_some(None::<i32>, "expected value");
    }
}
