//! Soft wall-clock budget for one analysis request.
//!
//! The budget is advisory. It is sampled between stages to decide whether
//! the next stage is still worth starting; it never cancels a call that is
//! already in flight.

use std::time::{Duration, Instant};

use crate::defaults;

/// Which stages may still be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BudgetStage {
    /// Every stage runs.
    Full,
    /// The vision LLM is no longer started.
    SkipLlm,
    /// Only the static table and the generic estimate remain.
    StaticOnly,
    /// No further labels are processed.
    Exhausted,
}

impl BudgetStage {
    pub fn allows_llm(self) -> bool {
        self == BudgetStage::Full
    }

    pub fn allows_database(self) -> bool {
        self <= BudgetStage::SkipLlm
    }

    pub fn is_exhausted(self) -> bool {
        self == BudgetStage::Exhausted
    }
}

/// Elapsed-time tracker with the 30% / 70% / 100% checkpoints.
///
/// A zero limit disables the budget: every stage stays available.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisBudget {
    started: Instant,
    limit: Duration,
}

impl Default for AnalysisBudget {
    fn default() -> Self {
        Self::new(Duration::from_secs(defaults::ANALYSIS_BUDGET_SECS))
    }
}

impl AnalysisBudget {
    /// Start a budget now.
    pub fn new(limit: Duration) -> Self {
        Self::started_at(Instant::now(), limit)
    }

    /// Budget measured from an explicit start instant.
    pub fn started_at(started: Instant, limit: Duration) -> Self {
        Self { started, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed time as a fraction of the limit (0.0 when disabled).
    pub fn fraction_used(&self) -> f64 {
        if self.limit.is_zero() {
            return 0.0;
        }
        self.elapsed().as_secs_f64() / self.limit.as_secs_f64()
    }

    /// Stage for the current elapsed time.
    pub fn stage(&self) -> BudgetStage {
        stage_for(self.fraction_used())
    }
}

/// Map a used fraction of the budget to a stage.
pub fn stage_for(fraction: f64) -> BudgetStage {
    if fraction >= 1.0 {
        BudgetStage::Exhausted
    } else if fraction >= defaults::BUDGET_DATABASE_CUTOFF {
        BudgetStage::StaticOnly
    } else if fraction >= defaults::BUDGET_LLM_CUTOFF {
        BudgetStage::SkipLlm
    } else {
        BudgetStage::Full
    }
}
