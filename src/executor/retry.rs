use crate::config::RetryPolicy;
use crate::error::ErrorClass;

impl RetryPolicy {
    /// Whether an attempt at `depth` (0 for the first attempt) that failed with `class`
    /// should be retried.
    ///
    /// Both rules read the same depth: after any conflict retry a unique violation is no
    /// longer retried, and retrying a unique violation counts against the conflict bound.
    #[must_use]
    pub fn should_retry(&self, depth: u32, class: ErrorClass) -> bool {
        match class {
            ErrorClass::SerializationConflict => depth < self.max_conflict_retries,
            ErrorClass::SpuriousUniqueViolation => self.retry_unique_violation && depth == 0,
            ErrorClass::Other => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_retry_up_to_the_bound() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0, ErrorClass::SerializationConflict));
        assert!(policy.should_retry(9, ErrorClass::SerializationConflict));
        assert!(!policy.should_retry(10, ErrorClass::SerializationConflict));
    }

    #[test]
    fn unique_violation_only_at_depth_zero() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0, ErrorClass::SpuriousUniqueViolation));
        assert!(!policy.should_retry(1, ErrorClass::SpuriousUniqueViolation));
        assert!(!policy.should_retry(5, ErrorClass::SpuriousUniqueViolation));
    }

    #[test]
    fn other_errors_never_retry() {
        assert!(!RetryPolicy::default().should_retry(0, ErrorClass::Other));
    }

    #[test]
    fn disabled_policy_never_retries() {
        let policy = RetryPolicy::no_retries();
        assert!(!policy.should_retry(0, ErrorClass::SerializationConflict));
        assert!(!policy.should_retry(0, ErrorClass::SpuriousUniqueViolation));
    }
}
