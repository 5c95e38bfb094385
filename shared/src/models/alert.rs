//! Alert decision outcomes and the cooldown policy

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Quiet window between repeat alerts for the same farm
pub const COOLDOWN_HOURS: i64 = 24;

/// Outcome of a single analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Alerted,
    Suppressed,
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Alerted => "alerted",
            AnalysisState::Suppressed => "suppressed",
        }
    }
}

/// Why an analysis pass did not raise an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    BelowThreshold,
    LowConfidence,
    CooldownActive,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::BelowThreshold => "below_threshold",
            SuppressReason::LowConfidence => "low_confidence",
            SuppressReason::CooldownActive => "cooldown_active",
        }
    }
}

/// Whether a new alert may fire given the farm's last alert record.
///
/// `last` is the previous alert time and its severity rank, if any. A new
/// alert is allowed when there is no history, the quiet window has lapsed,
/// or the candidate is strictly more severe than what was last sent.
pub fn cooldown_allows(
    now: DateTime<Utc>,
    last: Option<(DateTime<Utc>, i16)>,
    candidate_rank: i16,
) -> bool {
    match last {
        None => true,
        Some((last_at, last_rank)) => {
            last_at < now - Duration::hours(COOLDOWN_HOURS) || candidate_rank > last_rank
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hours_ago: i64) -> DateTime<Utc> {
        Utc::now() - Duration::hours(hours_ago)
    }

    #[test]
    fn first_alert_always_passes() {
        assert!(cooldown_allows(Utc::now(), None, 2));
    }

    #[test]
    fn repeat_at_same_severity_is_suppressed_inside_window() {
        let now = Utc::now();
        assert!(!cooldown_allows(now, Some((at(2), 3)), 3));
        assert!(!cooldown_allows(now, Some((at(23), 3)), 2));
    }

    #[test]
    fn lapsed_window_allows_any_severity() {
        let now = Utc::now();
        assert!(cooldown_allows(now, Some((at(25), 4)), 1));
    }

    #[test]
    fn escalation_overrides_active_cooldown() {
        let now = Utc::now();
        assert!(cooldown_allows(now, Some((at(1), 2)), 3));
        assert!(!cooldown_allows(now, Some((at(1), 3)), 3));
    }
}
