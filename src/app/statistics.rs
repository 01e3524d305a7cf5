//! Uptime aggregates and survey statistics printing.

use chrono::{DateTime, Utc};
use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{SurveyOutcome, SurveyStats};
use crate::tracked::TrackedSite;

/// Mean and median uptime, in whole seconds, over a set of sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UptimeSummary {
    pub sites: usize,
    pub mean_secs: i64,
    pub median_secs: i64,
}

/// Aggregates site uptimes as of `now`. An empty set yields zeros.
pub fn uptime_summary(sites: &[TrackedSite], now: DateTime<Utc>) -> UptimeSummary {
    let mut uptimes: Vec<i64> = sites
        .iter()
        .map(|site| site.duration_at(now).num_seconds())
        .collect();
    if uptimes.is_empty() {
        return UptimeSummary::default();
    }

    let total: i64 = uptimes.iter().sum();
    UptimeSummary {
        sites: uptimes.len(),
        mean_secs: total / uptimes.len() as i64,
        median_secs: median(&mut uptimes),
    }
}

/// Median of `values`; the mean of the two middle values for an even count.
///
/// Sorts `values` in place. Returns zero for an empty slice.
pub fn median(values: &mut [i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2
    }
}

/// Prints survey outcome counts to the log.
pub fn print_survey_statistics(stats: &SurveyStats) {
    let total = stats.total();
    if total == 0 {
        info!("No survey outcomes recorded");
        return;
    }

    info!("Survey outcomes ({} total):", total);
    for outcome in SurveyOutcome::iter() {
        let count = stats.get_count(outcome);
        if count > 0 {
            info!("   {}: {}", outcome.as_str(), count);
        }
    }
}
