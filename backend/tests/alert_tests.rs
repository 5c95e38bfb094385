//! Alert decision tests
//!
//! Tests for alert gating including:
//! - The severity and confidence guard
//! - Cooldown suppression and escalation override
//! - Suppress reason tagging
//! - Notification urgency per stress level

use proptest::prelude::*;

use chrono::{DateTime, Duration, Utc};
use shared::models::{
    classify_value, cooldown_allows, AnalysisState, StressAssessment, StressLevel, SuppressReason,
    ALERT_CONFIDENCE_FLOOR, COOLDOWN_HOURS,
};
use shared::types::Urgency;

// ============================================================================
// Helper Types and Functions
// ============================================================================

/// Why an assessment is withheld, following the analysis decision order
pub fn suppression_for(assessment: &StressAssessment) -> Option<SuppressReason> {
    if assessment.warrants_alert() {
        return None;
    }
    if assessment.level <= StressLevel::Low {
        Some(SuppressReason::BelowThreshold)
    } else {
        Some(SuppressReason::LowConfidence)
    }
}

/// Full gate for one analysis pass: guard first, then the cooldown window
pub fn decide(
    assessment: &StressAssessment,
    now: DateTime<Utc>,
    last: Option<(DateTime<Utc>, i16)>,
) -> (AnalysisState, Option<SuppressReason>) {
    if let Some(reason) = suppression_for(assessment) {
        return (AnalysisState::Suppressed, Some(reason));
    }
    if !cooldown_allows(now, last, assessment.level.severity_rank()) {
        return (AnalysisState::Suppressed, Some(SuppressReason::CooldownActive));
    }
    (AnalysisState::Alerted, None)
}

fn assessment(level: StressLevel, confidence: f64) -> StressAssessment {
    StressAssessment { level, confidence }
}

fn minutes_ago(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    now - Duration::minutes(minutes)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Healthy and low readings never fire, whatever the confidence
    #[test]
    fn test_mild_levels_never_alert() {
        for confidence in [0.7, 0.9, 1.0] {
            assert!(!assessment(StressLevel::Healthy, confidence).warrants_alert());
            assert!(!assessment(StressLevel::Low, confidence).warrants_alert());
        }
    }

    /// Moderate stress fires once confidence reaches the floor
    #[test]
    fn test_moderate_alerts_at_the_confidence_floor() {
        assert!(assessment(StressLevel::Moderate, 0.7).warrants_alert());
        assert!(!assessment(StressLevel::Moderate, 0.69).warrants_alert());
    }

    /// The confidence floor itself is enough
    #[test]
    fn test_confidence_floor_is_inclusive() {
        let at_floor = assessment(StressLevel::Severe, ALERT_CONFIDENCE_FLOOR);
        assert!(at_floor.warrants_alert());
    }

    /// Suppression reasons distinguish a mild level from a weak signal
    #[test]
    fn test_suppression_reasons() {
        assert_eq!(
            suppression_for(&assessment(StressLevel::Healthy, 0.9)),
            Some(SuppressReason::BelowThreshold)
        );
        assert_eq!(
            suppression_for(&assessment(StressLevel::Low, 0.9)),
            Some(SuppressReason::BelowThreshold)
        );
        assert_eq!(
            suppression_for(&assessment(StressLevel::Moderate, 0.5)),
            Some(SuppressReason::LowConfidence)
        );
        assert_eq!(suppression_for(&assessment(StressLevel::Severe, 0.9)), None);
    }

    /// A farm with no alert history can always fire
    #[test]
    fn test_first_alert_is_never_suppressed() {
        let now = Utc::now();
        for rank in 0..=4 {
            assert!(cooldown_allows(now, None, rank));
        }
    }

    /// Repeats inside the quiet window are held back
    #[test]
    fn test_repeat_within_window_is_suppressed() {
        let now = Utc::now();
        let last = Some((minutes_ago(now, 120), 3));

        assert!(!cooldown_allows(now, last, 3));
        assert!(!cooldown_allows(now, last, 2));
    }

    /// A worsening farm breaks through an active window
    #[test]
    fn test_escalation_breaks_the_window() {
        let now = Utc::now();
        let last = Some((minutes_ago(now, 60), 2));

        assert!(cooldown_allows(now, last, 3));
        assert!(cooldown_allows(now, last, 4));
    }

    /// The window edge is strict: one minute past it reopens the farm
    #[test]
    fn test_window_boundary() {
        let now = Utc::now();
        let window_minutes = COOLDOWN_HOURS * 60;

        let just_inside = Some((minutes_ago(now, window_minutes - 1), 3));
        assert!(!cooldown_allows(now, just_inside, 3));

        let just_outside = Some((minutes_ago(now, window_minutes + 1), 3));
        assert!(cooldown_allows(now, just_outside, 3));
    }

    /// After the window lapses even a milder alert may fire
    #[test]
    fn test_lapsed_window_allows_lower_severity() {
        let now = Utc::now();
        let last = Some((minutes_ago(now, 25 * 60), 4));
        assert!(cooldown_allows(now, last, 1));
    }

    /// Urgency tags step up with severity
    #[test]
    fn test_urgency_tags() {
        assert_eq!(StressLevel::Severe.urgency(), Urgency::Critical);
        assert_eq!(StressLevel::High.urgency(), Urgency::Urgent);
        assert_eq!(StressLevel::Moderate.urgency(), Urgency::Normal);
        assert_eq!(StressLevel::Low.urgency(), Urgency::Normal);
        assert_eq!(StressLevel::Healthy.urgency(), Urgency::Normal);
    }

    /// Outcome labels are stable snake_case strings
    #[test]
    fn test_outcome_labels() {
        assert_eq!(AnalysisState::Alerted.as_str(), "alerted");
        assert_eq!(AnalysisState::Suppressed.as_str(), "suppressed");
        assert_eq!(SuppressReason::BelowThreshold.as_str(), "below_threshold");
        assert_eq!(SuppressReason::LowConfidence.as_str(), "low_confidence");
        assert_eq!(SuppressReason::CooldownActive.as_str(), "cooldown_active");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy covering every stress level
    fn level_strategy() -> impl Strategy<Value = StressLevel> {
        (0usize..5).prop_map(|i| StressLevel::all()[i])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A strictly more severe candidate always fires, window or not
        #[test]
        fn prop_escalation_always_allows(
            elapsed_minutes in 0i64..4320,
            last_rank in 0i16..4,
            step in 1i16..=2
        ) {
            let now = Utc::now();
            let last = Some((minutes_ago(now, elapsed_minutes), last_rank));
            let candidate = (last_rank + step).min(4);

            prop_assert!(candidate > last_rank);
            prop_assert!(cooldown_allows(now, last, candidate));
        }

        /// Inside the window, anything at or below the last severity is held
        #[test]
        fn prop_active_window_blocks_non_escalation(
            elapsed_minutes in 0i64..(COOLDOWN_HOURS * 60),
            last_rank in 0i16..=4,
            raw in 0i16..=4
        ) {
            let now = Utc::now();
            let last = Some((minutes_ago(now, elapsed_minutes), last_rank));
            let candidate = raw.min(last_rank);

            prop_assert!(!cooldown_allows(now, last, candidate));
        }

        /// Once the window lapses, any severity may fire
        #[test]
        fn prop_lapsed_window_allows_anything(
            elapsed_minutes in (COOLDOWN_HOURS * 60 + 1)..100_000i64,
            last_rank in 0i16..=4,
            candidate in 0i16..=4
        ) {
            let now = Utc::now();
            let last = Some((minutes_ago(now, elapsed_minutes), last_rank));

            prop_assert!(cooldown_allows(now, last, candidate));
        }

        /// The guard fires exactly when severity and confidence both clear
        #[test]
        fn prop_guard_requires_both_conditions(
            level in level_strategy(),
            confidence in 0.0f64..=1.0
        ) {
            let fires = assessment(level, confidence).warrants_alert();
            let expected =
                level > StressLevel::Low && confidence >= ALERT_CONFIDENCE_FLOOR;

            prop_assert_eq!(fires, expected);
        }

        /// Any reading under the moderate threshold is always alertable
        #[test]
        fn prop_stressed_readings_always_clear_the_guard(
            ndvi in 0.0f64..0.4,
            slope in -0.30f64..=0.10
        ) {
            prop_assert!(classify_value(ndvi, slope).warrants_alert());
        }

        /// A healthy canopy without a steep decline never alerts
        #[test]
        fn prop_healthy_canopy_never_alerts(
            ndvi in 0.5f64..=1.0,
            slope in -0.05f64..=0.10
        ) {
            prop_assert!(!classify_value(ndvi, slope).warrants_alert());
        }
    }
}

// ============================================================================
// Decision Flow
// ============================================================================

#[cfg(test)]
mod decision_flow {
    use super::*;

    /// A fresh severe farm alerts with no suppress reason
    #[test]
    fn test_fresh_severe_farm_alerts() {
        let now = Utc::now();
        let result = decide(&assessment(StressLevel::Severe, 0.9), now, None);
        assert_eq!(result, (AnalysisState::Alerted, None));
    }

    /// The same farm an hour later is held by the cooldown
    #[test]
    fn test_repeat_is_held_by_cooldown() {
        let now = Utc::now();
        let last = Some((minutes_ago(now, 60), 4));

        let result = decide(&assessment(StressLevel::Severe, 0.9), now, last);
        assert_eq!(
            result,
            (
                AnalysisState::Suppressed,
                Some(SuppressReason::CooldownActive)
            )
        );
    }

    /// Worsening stress overrides the window and fires again
    #[test]
    fn test_escalation_fires_through_cooldown() {
        let now = Utc::now();
        let last = Some((minutes_ago(now, 60), 2));

        let result = decide(&assessment(StressLevel::High, 0.8), now, last);
        assert_eq!(result, (AnalysisState::Alerted, None));
    }

    /// A weak signal is reported as such even when a window is active
    #[test]
    fn test_weak_signal_reported_before_cooldown() {
        let now = Utc::now();
        let last = Some((minutes_ago(now, 60), 2));

        let result = decide(&assessment(StressLevel::Moderate, 0.5), now, last);
        assert_eq!(
            result,
            (
                AnalysisState::Suppressed,
                Some(SuppressReason::LowConfidence)
            )
        );
    }

    /// The next day the farm is eligible again
    #[test]
    fn test_next_day_farm_is_eligible_again() {
        let now = Utc::now();
        let last = Some((minutes_ago(now, 26 * 60), 4));

        let result = decide(&assessment(StressLevel::Moderate, 0.7), now, last);
        assert_eq!(result, (AnalysisState::Alerted, None));
    }
}
