//! Reduces per-recipient outcomes to one overall job status.

use crate::core::models::{OverallStatus, RecipientOutcome};

/// Every attempt succeeded -> `Success`; some did -> `PartialSuccess`;
/// none did (or there were no attempts) -> `Failed`.
///
/// Only the counts matter, so the order of `outcomes` never changes the result.
pub fn aggregate(outcomes: &[RecipientOutcome]) -> OverallStatus {
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    match succeeded {
        0 => OverallStatus::Failed,
        n if n == outcomes.len() => OverallStatus::Success,
        _ => OverallStatus::PartialSuccess,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(email: &str) -> RecipientOutcome {
        RecipientOutcome::success(email, "Message delivered")
    }

    fn failed(email: &str) -> RecipientOutcome {
        RecipientOutcome::error(email, "connection refused")
    }

    #[test]
    fn all_success() {
        assert_eq!(aggregate(&[ok("a@x.com"), ok("b@x.com")]), OverallStatus::Success);
        assert_eq!(aggregate(&[ok("a@x.com")]), OverallStatus::Success);
    }

    #[test]
    fn mixed_is_partial() {
        assert_eq!(
            aggregate(&[failed("a@x.com"), ok("b@x.com"), failed("c@x.com")]),
            OverallStatus::PartialSuccess
        );
    }

    #[test]
    fn all_error_or_nothing_is_failed() {
        assert_eq!(aggregate(&[failed("a@x.com")]), OverallStatus::Failed);
        assert_eq!(aggregate(&[failed("a@x.com"), failed("b@x.com")]), OverallStatus::Failed);
        assert_eq!(aggregate(&[]), OverallStatus::Failed);
    }

    #[test]
    fn order_does_not_matter() {
        let outcomes = vec![ok("a@x.com"), failed("b@x.com"), ok("c@x.com"), failed("d@x.com")];
        let expected = aggregate(&outcomes);
        for shift in 0..outcomes.len() {
            let mut rotated = outcomes.clone();
            rotated.rotate_left(shift);
            assert_eq!(aggregate(&rotated), expected);
            rotated.reverse();
            assert_eq!(aggregate(&rotated), expected);
        }
    }
}
