//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Crop types supported by the monitoring pipeline
pub const SUPPORTED_CROPS: &[&str] = &[
    "maize", "wheat", "rice", "soybean", "cotton", "sorghum", "sugarcane", "other",
];

/// Notification urgency tag attached to dispatched messages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    Urgent,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Urgent => "urgent",
            Urgency::Critical => "critical",
        }
    }
}
