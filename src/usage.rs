//! Credit usage accounting.
//!
//! The forwarding endpoint reports how many credits each call consumed. The
//! [`UsageTracker`] folds those reports into a running total and derives how
//! much of a fixed budget remains. It never talks to the network.

use serde::{Deserialize, Serialize};

/// Default credit budget for a conversation.
pub const DEFAULT_BUDGET: u64 = 100;

/// A snapshot of credit usage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageState {
    /// Credits consumed since the last reset.
    pub used: u64,
    /// `budget - used`, or `None` before any credit information arrived.
    pub remaining: Option<i64>,
    /// The fixed budget.
    pub budget: u64,
}

impl UsageState {
    /// Fraction of the budget remaining, clamped to `[0, 1]`.
    ///
    /// Unknown remaining credit reads as zero, as does a zero budget.
    pub fn fraction_remaining(&self) -> f64 {
        match self.remaining {
            Some(remaining) if self.budget > 0 => {
                (remaining as f64 / self.budget as f64).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// Accumulates credits used against a fixed budget.
#[derive(Clone, Debug)]
pub struct UsageTracker {
    state: UsageState,
}

impl UsageTracker {
    /// Creates a tracker with the given budget and no credit information yet.
    pub fn new(budget: u64) -> Self {
        Self {
            state: UsageState {
                used: 0,
                remaining: None,
                budget,
            },
        }
    }

    /// Adds `credits` to the running total.
    ///
    /// Negative values count as zero. `remaining` is not clamped and goes
    /// negative once the budget is overspent.
    pub fn record(&mut self, credits: i64) -> UsageState {
        let credits = credits.max(0) as u64;
        self.state.used = self.state.used.saturating_add(credits);
        self.state.remaining = Some(remaining(self.state.budget, self.state.used));
        self.state
    }

    /// Starts a new billing window: nothing used, the whole budget remaining.
    pub fn reset(&mut self) -> UsageState {
        self.state.used = 0;
        self.state.remaining = Some(remaining(self.state.budget, 0));
        self.state
    }

    /// Returns the current usage snapshot.
    pub fn state(&self) -> UsageState {
        self.state
    }

    /// Returns the configured budget.
    pub fn budget(&self) -> u64 {
        self.state.budget
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

fn remaining(budget: u64, used: u64) -> i64 {
    let budget = i64::try_from(budget).unwrap_or(i64::MAX);
    let used = i64::try_from(used).unwrap_or(i64::MAX);
    budget.saturating_sub(used)
}

/// Interprets a `creditsUsed` field from a reply.
///
/// Absent or `null` yields `None`. Anything else present yields a credit
/// count: non-numeric and negative values become zero and fractions are
/// truncated toward zero.
pub fn credits_from_json(value: Option<&serde_json::Value>) -> Option<i64> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let credits = if let Some(n) = value.as_i64() {
        n
    } else if let Some(n) = value.as_u64() {
        i64::try_from(n).unwrap_or(i64::MAX)
    } else if let Some(n) = value.as_f64() {
        if n.is_finite() { n.trunc() as i64 } else { 0 }
    } else {
        0
    };
    Some(credits.max(0))
}
