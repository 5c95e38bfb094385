//! External service integrations
//!
//! Each capability is a trait with a real HTTP implementation and a
//! deterministic fallback used when no credentials are configured.

pub mod imagery;
pub mod sms;
pub mod stress_ai;
pub mod video_search;

pub use imagery::{ImageryProvider, SatelliteImageryClient, SyntheticImagery};
pub use sms::{ConsoleSmsChannel, DispatchReceipt, NotificationChannel, SmsGatewayClient};
pub use stress_ai::{
    LlmStressAnalyzer, RuleBasedAnalyzer, StressAnalysis, StressAnalyzer, StressContext,
};
pub use video_search::{VideoResult, VideoSearchClient};
