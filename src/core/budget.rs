// src/core/budget.rs — Shared retry budget

/// Retry policy shared by both loops: the execution-repair loop
/// (Execute → Generate) and the verification loop (Verify → Plan) draw from
/// the same attempt counter, so total stage invocations stay bounded by
/// `max_attempts` rather than compounding per loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryBudget {
    max_attempts: u32,
}

impl RetryBudget {
    /// `max_attempts == 0` means no retries: fail fast after the first
    /// recoverable failure of any kind.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_retry_below_budget() {
        let budget = RetryBudget::new(3);
        assert!(budget.can_retry(0));
        assert!(budget.can_retry(2));
    }

    #[test]
    fn test_cannot_retry_at_or_above_budget() {
        let budget = RetryBudget::new(3);
        assert!(!budget.can_retry(3));
        assert!(!budget.can_retry(4));
    }

    #[test]
    fn test_zero_budget_fails_fast() {
        let budget = RetryBudget::new(0);
        assert!(!budget.can_retry(0));
    }

    #[test]
    fn test_is_pure() {
        let budget = RetryBudget::new(2);
        assert_eq!(budget.can_retry(1), budget.can_retry(1));
        assert_eq!(budget.max_attempts(), 2);
    }
}
