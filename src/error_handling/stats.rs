//! Survey statistics tracking.
//!
//! Thread-safe counters of per-site outcomes for one survey pass.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::SurveyOutcome;

/// Thread-safe survey outcome tracker.
///
/// Every [`SurveyOutcome`] starts at zero; counters are atomics so the struct can
/// be shared across tasks behind an `Arc`.
pub struct SurveyStats {
    outcomes: HashMap<SurveyOutcome, AtomicUsize>,
}

impl SurveyStats {
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for outcome in SurveyOutcome::iter() {
            outcomes.insert(outcome, AtomicUsize::new(0));
        }
        SurveyStats { outcomes }
    }

    pub fn increment(&self, outcome: SurveyOutcome) {
        if let Some(counter) = self.outcomes.get(&outcome) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment outcome counter for {:?} which is not in the map",
                outcome
            );
        }
    }

    pub fn get_count(&self, outcome: SurveyOutcome) -> usize {
        self.outcomes
            .get(&outcome)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total across all outcome types.
    pub fn total(&self) -> usize {
        SurveyOutcome::iter().map(|o| self.get_count(o)).sum()
    }
}

impl Default for SurveyStats {
    fn default() -> Self {
        Self::new()
    }
}
