//! Notification dispatch tests
//!
//! Tests for alert delivery including:
//! - SMS delivery with in-app fallback
//! - Gateway failure handling
//! - Message text composition
//! - Read-state transitions on the in-app feed

use proptest::prelude::*;

use chrono::{DateTime, Duration, Utc};

// ============================================================================
// Helper Types and Functions
// ============================================================================

/// What the SMS gateway reported for one send attempt
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome {
    Accepted { message_id: Option<String> },
    Declined { error: Option<String> },
    Unreachable { error: String },
}

/// The notification row written for one alert delivery
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub channel: &'static str,
    pub sms_message_id: Option<String>,
    pub error_message: Option<String>,
}

/// Resolve the delivery channel for an alert.
///
/// Without a phone on file the alert goes straight to the in-app feed.
/// A gateway refusal or outage also falls back to in-app, keeping the
/// gateway's error for later inspection. Delivery always produces a
/// record; the alert itself never depends on the SMS leg.
pub fn dispatch(phone: Option<&str>, outcome: GatewayOutcome) -> DispatchRecord {
    if phone.is_none() {
        return DispatchRecord {
            channel: "in_app",
            sms_message_id: None,
            error_message: None,
        };
    }

    match outcome {
        GatewayOutcome::Accepted { message_id } => DispatchRecord {
            channel: "sms",
            sms_message_id: message_id,
            error_message: None,
        },
        GatewayOutcome::Declined { error } => DispatchRecord {
            channel: "in_app",
            sms_message_id: None,
            error_message: error,
        },
        GatewayOutcome::Unreachable { error } => DispatchRecord {
            channel: "in_app",
            sms_message_id: None,
            error_message: Some(error),
        },
    }
}

/// Compose the text sent over SMS
pub fn sms_text(title: &str, message: &str) -> String {
    format!("{}\n\n{}", title, message)
}

/// First read stamps the time; later reads keep the original stamp
pub fn mark_read(read_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    read_at.or(Some(now))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// No phone on file means the alert only reaches the in-app feed
    #[test]
    fn test_no_phone_goes_in_app() {
        let record = dispatch(None, GatewayOutcome::Accepted { message_id: None });

        assert_eq!(record.channel, "in_app");
        assert_eq!(record.sms_message_id, None);
        assert_eq!(record.error_message, None);
    }

    /// An accepted send is recorded as SMS with the gateway's id
    #[test]
    fn test_accepted_send_records_sms_channel() {
        let record = dispatch(
            Some("0812345678"),
            GatewayOutcome::Accepted {
                message_id: Some("msg-1881".to_string()),
            },
        );

        assert_eq!(record.channel, "sms");
        assert_eq!(record.sms_message_id.as_deref(), Some("msg-1881"));
        assert_eq!(record.error_message, None);
    }

    /// A declined send falls back to in-app and keeps the gateway error
    #[test]
    fn test_declined_send_falls_back_with_error() {
        let record = dispatch(
            Some("0812345678"),
            GatewayOutcome::Declined {
                error: Some("Out of quota".to_string()),
            },
        );

        assert_eq!(record.channel, "in_app");
        assert_eq!(record.sms_message_id, None);
        assert_eq!(record.error_message.as_deref(), Some("Out of quota"));
    }

    /// A gateway outage still delivers in-app
    #[test]
    fn test_unreachable_gateway_falls_back() {
        let record = dispatch(
            Some("0812345678"),
            GatewayOutcome::Unreachable {
                error: "connection timed out".to_string(),
            },
        );

        assert_eq!(record.channel, "in_app");
        assert_eq!(
            record.error_message.as_deref(),
            Some("connection timed out")
        );
    }

    /// SMS text leads with the title, then a blank line, then the body
    #[test]
    fn test_sms_text_layout() {
        let text = sms_text(
            "High crop stress on North Field",
            "NDVI for North Field is 0.28.",
        );

        assert!(text.starts_with("High crop stress on North Field"));
        assert!(text.contains("\n\n"));
        assert!(text.ends_with("NDVI for North Field is 0.28."));
    }

    /// The first read sets the timestamp
    #[test]
    fn test_first_read_stamps_time() {
        let now = Utc::now();
        assert_eq!(mark_read(None, now), Some(now));
    }

    /// Re-reading keeps the original timestamp
    #[test]
    fn test_re_read_keeps_original_stamp() {
        let first = Utc::now() - Duration::hours(3);
        let later = Utc::now();

        assert_eq!(mark_read(Some(first), later), Some(first));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for optional phone numbers
    fn phone_strategy() -> impl Strategy<Value = Option<String>> {
        prop::option::of("0[0-9]{9}")
    }

    /// Strategy for gateway outcomes
    fn outcome_strategy() -> impl Strategy<Value = GatewayOutcome> {
        prop_oneof![
            prop::option::of("[a-z0-9-]{6,12}")
                .prop_map(|message_id| GatewayOutcome::Accepted { message_id }),
            prop::option::of("[A-Za-z ]{5,30}")
                .prop_map(|error| GatewayOutcome::Declined { error }),
            "[a-z ]{5,30}".prop_map(|error| GatewayOutcome::Unreachable { error }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// SMS is used only when a phone is on file and the gateway accepted
        #[test]
        fn prop_sms_only_with_phone_and_acceptance(
            phone in phone_strategy(),
            outcome in outcome_strategy()
        ) {
            let record = dispatch(phone.as_deref(), outcome.clone());

            let accepted = matches!(outcome, GatewayOutcome::Accepted { .. });
            if phone.is_some() && accepted {
                prop_assert_eq!(record.channel, "sms");
            } else {
                prop_assert_eq!(record.channel, "in_app");
            }
        }

        /// A gateway message id is only ever recorded on the SMS channel
        #[test]
        fn prop_message_id_implies_sms_channel(
            phone in phone_strategy(),
            outcome in outcome_strategy()
        ) {
            let record = dispatch(phone.as_deref(), outcome);

            if record.sms_message_id.is_some() {
                prop_assert_eq!(record.channel, "sms");
            }
        }

        /// Delivery never drops an alert: every attempt produces a record
        #[test]
        fn prop_every_attempt_produces_a_record(
            phone in phone_strategy(),
            outcome in outcome_strategy()
        ) {
            let record = dispatch(phone.as_deref(), outcome);
            prop_assert!(record.channel == "sms" || record.channel == "in_app");
        }

        /// A successful SMS leg never carries an error message
        #[test]
        fn prop_sms_channel_has_no_error(
            phone in phone_strategy(),
            outcome in outcome_strategy()
        ) {
            let record = dispatch(phone.as_deref(), outcome);

            if record.channel == "sms" {
                prop_assert!(record.error_message.is_none());
            }
        }

        /// Marking read is idempotent on the stamp
        #[test]
        fn prop_mark_read_is_idempotent(hours_apart in 1i64..100) {
            let first = Utc::now();
            let later = first + Duration::hours(hours_apart);

            let stamped = mark_read(None, first);
            prop_assert_eq!(mark_read(stamped, later), stamped);
        }
    }
}

// ============================================================================
// Feed Simulation
// ============================================================================

#[cfg(test)]
mod feed_simulation {
    use super::*;

    pub struct FeedItem {
        pub read_at: Option<DateTime<Utc>>,
    }

    pub fn unread_count(feed: &[FeedItem]) -> usize {
        feed.iter().filter(|item| item.read_at.is_none()).count()
    }

    #[test]
    fn test_unread_count_over_mixed_feed() {
        let now = Utc::now();
        let feed = [
            FeedItem { read_at: None },
            FeedItem {
                read_at: Some(now),
            },
            FeedItem { read_at: None },
        ];

        assert_eq!(unread_count(&feed), 2);
    }

    #[test]
    fn test_reading_one_item_decrements_unread() {
        let now = Utc::now();
        let mut feed = vec![FeedItem { read_at: None }, FeedItem { read_at: None }];
        assert_eq!(unread_count(&feed), 2);

        feed[0].read_at = mark_read(feed[0].read_at, now);
        assert_eq!(unread_count(&feed), 1);
    }

    #[test]
    fn test_mark_all_clears_the_feed() {
        let now = Utc::now();
        let mut feed = vec![
            FeedItem { read_at: None },
            FeedItem { read_at: None },
            FeedItem {
                read_at: Some(now - Duration::hours(1)),
            },
        ];

        for item in feed.iter_mut() {
            item.read_at = mark_read(item.read_at, now);
        }

        assert_eq!(unread_count(&feed), 0);
        // The already-read item keeps its earlier stamp
        assert_eq!(feed[2].read_at, Some(now - Duration::hours(1)));
    }
}
