//! Predicate - content test used as a routing key

/// A side-effect free test over a record payload.
///
/// Predicates run synchronously on the dispatch path, so they must be cheap and
/// deterministic. Any `Fn(&T) -> bool` closure is a predicate.
///
/// # Examples
/// ```
/// use contracts::Predicate;
///
/// let even = |n: &i64| n % 2 == 0;
/// assert!(even.matches(&4));
/// assert!(!even.matches(&7));
/// ```
pub trait Predicate<T>: Send + Sync {
    /// Whether `record` satisfies this predicate
    fn matches(&self, record: &T) -> bool;
}

impl<T, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    #[inline]
    fn matches(&self, record: &T) -> bool {
        self(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LongerThan(usize);

    impl Predicate<String> for LongerThan {
        fn matches(&self, record: &String) -> bool {
            record.len() > self.0
        }
    }

    #[test]
    fn test_closure_is_predicate() {
        let starts_with_a = |s: &String| s.starts_with('a');
        assert!(starts_with_a.matches(&"apple".to_string()));
        assert!(!starts_with_a.matches(&"pear".to_string()));
    }

    #[test]
    fn test_boxed_predicate() {
        let boxed: Box<dyn Predicate<String>> = Box::new(LongerThan(3));
        assert!(boxed.matches(&"four".to_string()));
        assert!(!boxed.matches(&"two".to_string()));
    }
}
