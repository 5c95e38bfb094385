//! Crop stress classification
//!
//! Maps an NDVI reading (and the recent trend) to one of five ordered
//! severity levels with a fixed per-branch confidence.

use serde::{Deserialize, Serialize};

use crate::models::ndvi::NdviSample;
use crate::types::Urgency;

/// A trend falling faster than this escalates the level one step
pub const ESCALATION_SLOPE: f64 = -0.05;

/// Minimum classifier confidence for an alert to fire
pub const ALERT_CONFIDENCE_FLOOR: f64 = 0.7;

/// Crop stress severity, ordered from healthy to severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    #[default]
    Healthy,
    Low,
    Moderate,
    High,
    Severe,
}

impl StressLevel {
    /// Severity index 0-4, matching the enum order
    pub fn severity_rank(&self) -> i16 {
        match self {
            StressLevel::Healthy => 0,
            StressLevel::Low => 1,
            StressLevel::Moderate => 2,
            StressLevel::High => 3,
            StressLevel::Severe => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Healthy => "healthy",
            StressLevel::Low => "low",
            StressLevel::Moderate => "moderate",
            StressLevel::High => "high",
            StressLevel::Severe => "severe",
        }
    }

    /// All levels in ascending severity order
    pub fn all() -> [StressLevel; 5] {
        [
            StressLevel::Healthy,
            StressLevel::Low,
            StressLevel::Moderate,
            StressLevel::High,
            StressLevel::Severe,
        ]
    }

    /// One severity step up, capped at severe
    pub fn escalate(&self) -> StressLevel {
        match self {
            StressLevel::Healthy => StressLevel::Low,
            StressLevel::Low => StressLevel::Moderate,
            StressLevel::Moderate => StressLevel::High,
            StressLevel::High | StressLevel::Severe => StressLevel::Severe,
        }
    }

    /// Urgency tag carried on notifications for this level
    pub fn urgency(&self) -> Urgency {
        match self {
            StressLevel::Severe => Urgency::Critical,
            StressLevel::High => Urgency::Urgent,
            _ => Urgency::Normal,
        }
    }
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StressLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(StressLevel::Healthy),
            "low" => Ok(StressLevel::Low),
            "moderate" => Ok(StressLevel::Moderate),
            "high" => Ok(StressLevel::High),
            "severe" => Ok(StressLevel::Severe),
            _ => Err("unknown stress level"),
        }
    }
}

/// Result of classifying a farm's current stress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StressAssessment {
    pub level: StressLevel,
    pub confidence: f64,
}

impl StressAssessment {
    /// An alert fires only above low stress and at sufficient confidence
    pub fn warrants_alert(&self) -> bool {
        self.level > StressLevel::Low && self.confidence >= ALERT_CONFIDENCE_FLOOR
    }
}

/// Map an NDVI value to its base stress level via fixed thresholds
pub fn base_level(ndvi: f64) -> StressLevel {
    if ndvi < 0.2 {
        StressLevel::Severe
    } else if ndvi < 0.3 {
        StressLevel::High
    } else if ndvi < 0.4 {
        StressLevel::Moderate
    } else if ndvi < 0.5 {
        StressLevel::Low
    } else {
        StressLevel::Healthy
    }
}

/// Fixed confidence per base-threshold branch, not calibrated
fn branch_confidence(base: StressLevel) -> f64 {
    match base {
        StressLevel::Severe => 0.9,
        StressLevel::High => 0.8,
        StressLevel::Moderate => 0.7,
        _ => 0.8,
    }
}

/// Classify a single NDVI value, escalating one step on a steep decline.
///
/// Confidence follows the base-threshold branch; escalation changes only
/// the level.
pub fn classify_value(ndvi: f64, trend_slope: f64) -> StressAssessment {
    let base = base_level(ndvi);
    let level = if trend_slope < ESCALATION_SLOPE {
        base.escalate()
    } else {
        base
    };

    StressAssessment {
        level,
        confidence: branch_confidence(base),
    }
}

/// Classify crop stress from a date-descending sample history.
///
/// The most recent reading drives the base level. An empty history reads
/// as healthy at the default confidence.
pub fn classify(samples: &[NdviSample], trend_slope: f64) -> StressAssessment {
    match samples.first() {
        Some(latest) => classify_value(latest.ndvi, trend_slope),
        None => StressAssessment {
            level: StressLevel::Healthy,
            confidence: branch_confidence(StressLevel::Healthy),
        },
    }
}

/// Canned agronomy advice per stress level
pub fn default_recommendations(level: StressLevel) -> &'static [&'static str] {
    match level {
        StressLevel::Healthy => &["Vegetation vigor is normal; continue the current schedule."],
        StressLevel::Low => &[
            "Monitor the next NDVI readings for a continued decline.",
            "Verify irrigation coverage in low-lying sections.",
        ],
        StressLevel::Moderate => &[
            "Increase irrigation frequency in the affected zones.",
            "Scout the field for early pest or disease symptoms.",
            "Re-check soil moisture at root depth.",
        ],
        StressLevel::High => &[
            "Apply supplemental irrigation within 48 hours.",
            "Inspect the canopy for pest infestation or nutrient deficiency.",
            "Consider foliar feeding to reduce stress while root causes are addressed.",
        ],
        StressLevel::Severe => &[
            "Immediate field inspection is required.",
            "Apply emergency irrigation if soil moisture is depleted.",
            "Engage an agronomist; widespread canopy loss is likely without intervention.",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_is_capped_at_severe() {
        assert_eq!(StressLevel::Severe.escalate(), StressLevel::Severe);
        assert_eq!(StressLevel::High.escalate(), StressLevel::Severe);
        assert_eq!(StressLevel::Healthy.escalate(), StressLevel::Low);
    }

    #[test]
    fn severity_ranks_follow_enum_order() {
        let ranks: Vec<i16> = StressLevel::all().iter().map(|l| l.severity_rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
        assert!(StressLevel::Severe > StressLevel::High);
        assert!(StressLevel::Low < StressLevel::Moderate);
    }

    #[test]
    fn level_text_round_trips() {
        for level in StressLevel::all() {
            assert_eq!(level.as_str().parse::<StressLevel>(), Ok(level));
        }
        assert!("critical".parse::<StressLevel>().is_err());
    }

    #[test]
    fn every_level_has_recommendations() {
        for level in StressLevel::all() {
            assert!(!default_recommendations(level).is_empty());
        }
    }
}
