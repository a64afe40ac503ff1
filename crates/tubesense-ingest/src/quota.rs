//! Quota unit accounting for a single collection run.

/// Every list call costs one unit against the daily quota.
pub const UNITS_PER_LIST_CALL: u64 = 1;

/// Counts units spent and, optionally, refuses calls past a budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotaMeter {
    used: u64,
    budget: Option<u64>,
}

impl QuotaMeter {
    pub fn new(budget: Option<u64>) -> Self {
        Self { used: 0, budget }
    }

    /// Whether one more list call fits in the budget.
    pub fn can_afford_call(&self) -> bool {
        self.budget
            .is_none_or(|b| self.used + UNITS_PER_LIST_CALL <= b)
    }

    pub fn charge_call(&mut self) {
        self.used += UNITS_PER_LIST_CALL;
    }

    pub fn used(&self) -> u64 {
        self.used
    }
}
