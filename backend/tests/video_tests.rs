//! Training video progress tests
//!
//! Tests for watch progress tracking including:
//! - Progress field validation
//! - Completion inference from position and duration
//! - Sticky completion across re-watches

use proptest::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Validate one progress update, mirroring the service's field checks
pub fn validate_progress(
    video_id: &str,
    position_seconds: i32,
    duration_seconds: Option<i32>,
) -> Result<(), &'static str> {
    if video_id.trim().is_empty() {
        return Err("Video id cannot be empty");
    }
    if position_seconds < 0 {
        return Err("Position cannot be negative");
    }
    if let Some(duration) = duration_seconds {
        if duration <= 0 {
            return Err("Duration must be positive");
        }
    }
    Ok(())
}

/// Whether this update marks the video complete.
///
/// Watching past the end of a known duration counts as completion even
/// without the explicit flag.
pub fn completion_after_update(
    explicit: Option<bool>,
    position_seconds: i32,
    duration_seconds: Option<i32>,
) -> bool {
    explicit.unwrap_or(false)
        || duration_seconds
            .map(|d| position_seconds >= d)
            .unwrap_or(false)
}

/// Merge a new completion flag into the stored row; completion is sticky
pub fn merged_completion(stored: bool, incoming: bool) -> bool {
    stored || incoming
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_blank_video_id_rejected() {
        assert!(validate_progress("", 10, None).is_err());
        assert!(validate_progress("   ", 10, None).is_err());
        assert!(validate_progress("vid-drip-irrigation", 10, None).is_ok());
    }

    #[test]
    fn test_negative_position_rejected() {
        assert!(validate_progress("vid-1", -1, None).is_err());
        assert!(validate_progress("vid-1", 0, None).is_ok());
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        assert!(validate_progress("vid-1", 10, Some(0)).is_err());
        assert!(validate_progress("vid-1", 10, Some(-5)).is_err());
        assert!(validate_progress("vid-1", 10, Some(300)).is_ok());
    }

    /// Reaching the end of a known duration completes the video
    #[test]
    fn test_watching_to_the_end_completes() {
        assert!(completion_after_update(None, 300, Some(300)));
        assert!(completion_after_update(None, 301, Some(300)));
        assert!(!completion_after_update(None, 299, Some(300)));
    }

    /// Without a duration only the explicit flag completes
    #[test]
    fn test_unknown_duration_needs_explicit_flag() {
        assert!(!completion_after_update(None, 10_000, None));
        assert!(completion_after_update(Some(true), 10, None));
    }

    /// The explicit flag wins regardless of position
    #[test]
    fn test_explicit_flag_completes_anywhere() {
        assert!(completion_after_update(Some(true), 0, Some(300)));
    }

    /// Rewinding a finished video keeps it completed
    #[test]
    fn test_completion_survives_rewind() {
        let stored = true;
        let incoming = completion_after_update(None, 12, Some(300));
        assert!(!incoming);
        assert!(merged_completion(stored, incoming));
    }

    /// An unfinished video completes once any update says so
    #[test]
    fn test_completion_latches_on() {
        assert!(merged_completion(false, true));
        assert!(!merged_completion(false, false));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for watch positions
    fn position_strategy() -> impl Strategy<Value = i32> {
        0i32..=20_000
    }

    /// Strategy for optional known durations
    fn duration_strategy() -> impl Strategy<Value = Option<i32>> {
        prop::option::of(1i32..=20_000)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Valid fields always pass validation
        #[test]
        fn prop_valid_updates_accepted(
            position in position_strategy(),
            duration in duration_strategy()
        ) {
            prop_assert!(validate_progress("vid-1", position, duration).is_ok());
        }

        /// Position at or past a known duration always completes
        #[test]
        fn prop_position_past_duration_completes(
            duration in 1i32..=20_000,
            overshoot in 0i32..=500
        ) {
            prop_assert!(completion_after_update(
                None,
                duration + overshoot,
                Some(duration)
            ));
        }

        /// Position short of the duration never self-completes
        #[test]
        fn prop_position_short_of_duration_does_not_complete(
            duration in 2i32..=20_000
        ) {
            prop_assert!(!completion_after_update(None, duration - 1, Some(duration)));
        }

        /// Completion never reverts, whatever the sequence of updates
        #[test]
        fn prop_completion_is_monotone(
            updates in prop::collection::vec(any::<bool>(), 1..10)
        ) {
            let mut stored = false;
            let mut ever_completed = false;

            for incoming in updates {
                stored = merged_completion(stored, incoming);
                ever_completed = ever_completed || incoming;
                prop_assert_eq!(stored, ever_completed);
            }
        }

        /// The explicit flag completes independently of position
        #[test]
        fn prop_explicit_flag_always_completes(
            position in position_strategy(),
            duration in duration_strategy()
        ) {
            prop_assert!(completion_after_update(Some(true), position, duration));
        }
    }
}
