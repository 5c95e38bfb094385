//! LLM-backed crop stress analysis
//!
//! Sends the NDVI context to a chat-completion endpoint and parses the
//! structured JSON verdict out of the reply. The rule-based analyzer mirrors
//! the same interface on top of the threshold classifier and never fails.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::models::{classify_value, default_recommendations, NdviSample, StressLevel};

use crate::error::{AppError, AppResult};

/// Method tag for LLM-produced analyses
pub const METHOD_LLM: &str = "llm";

/// Method tag for rule-based analyses
pub const METHOD_RULE_BASED: &str = "rule_based";

/// Input handed to a stress analyzer
#[derive(Debug, Clone, Serialize)]
pub struct StressContext {
    pub crop_type: String,
    pub latest_ndvi: f64,
    pub trend_slope: f64,
    /// Recent samples, date-descending
    pub recent: Vec<NdviSample>,
}

/// Analyzer verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressAnalysis {
    pub level: StressLevel,
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub method: String,
}

/// Produces a stress verdict for a farm context
#[async_trait]
pub trait StressAnalyzer: Send + Sync {
    async fn analyze(&self, context: &StressContext) -> AppResult<StressAnalysis>;
}

/// Client for the LLM analysis endpoint
#[derive(Clone)]
pub struct LlmStressAnalyzer {
    api_endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// JSON verdict expected inside the model reply
#[derive(Debug, Deserialize)]
struct LlmVerdict {
    stress_level: String,
    confidence: f64,
    recommendations: Vec<String>,
}

const SYSTEM_PROMPT: &str = "You are an agronomy assistant assessing crop stress \
from satellite vegetation-index readings. Reply with a single JSON object: \
{\"stress_level\": one of \"healthy\"|\"low\"|\"moderate\"|\"high\"|\"severe\", \
\"confidence\": number between 0 and 1, \"recommendations\": array of short strings}.";

impl LlmStressAnalyzer {
    /// Create a new LLM analyzer client
    pub fn new(api_endpoint: String, api_key: String, model: String) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_endpoint,
            api_key,
            model,
            http_client,
        }
    }

    fn build_prompt(context: &StressContext) -> String {
        let mut prompt = format!(
            "Crop: {}\nLatest NDVI: {:.3}\nTrend slope: {:.4} per day\nRecent readings (newest first):\n",
            context.crop_type, context.latest_ndvi, context.trend_slope
        );
        for sample in &context.recent {
            prompt.push_str(&format!(
                "  {} ndvi={:.3} cloud={:.0}%\n",
                sample.date, sample.ndvi, sample.cloud_cover
            ));
        }
        prompt.push_str("Assess the stress level for this field.");
        prompt
    }

    /// Parse the model reply into an analysis, tolerating markdown fences
    fn parse_verdict(content: &str) -> AppResult<StressAnalysis> {
        let trimmed = content.trim();
        let body = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .map(|rest| rest.trim_end_matches("```"))
            .unwrap_or(trimmed)
            .trim();

        let verdict: LlmVerdict = serde_json::from_str(body).map_err(|e| {
            AppError::ExternalService(format!("Unparseable analysis reply: {}", e))
        })?;

        let level: StressLevel = verdict.stress_level.parse().map_err(|_| {
            AppError::ExternalService(format!(
                "Unknown stress level in reply: {}",
                verdict.stress_level
            ))
        })?;

        if !(0.0..=1.0).contains(&verdict.confidence) {
            return Err(AppError::ExternalService(format!(
                "Confidence out of range: {}",
                verdict.confidence
            )));
        }

        Ok(StressAnalysis {
            level,
            confidence: verdict.confidence,
            recommendations: verdict.recommendations,
            method: METHOD_LLM.to_string(),
        })
    }
}

#[async_trait]
impl StressAnalyzer for LlmStressAnalyzer {
    async fn analyze(&self, context: &StressContext) -> AppResult<StressAnalysis> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(context),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Analysis request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Analysis API returned {}: {}",
                status, body
            )));
        }

        let data: ChatResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse analysis response: {}", e))
        })?;

        let content = data
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AppError::ExternalService("Empty analysis response".to_string()))?;

        Self::parse_verdict(content)
    }
}

/// Analyzer backed by the threshold classifier; used when no LLM key is
/// configured and as the fallback when the LLM call fails.
pub struct RuleBasedAnalyzer;

#[async_trait]
impl StressAnalyzer for RuleBasedAnalyzer {
    async fn analyze(&self, context: &StressContext) -> AppResult<StressAnalysis> {
        let assessment = classify_value(context.latest_ndvi, context.trend_slope);

        Ok(StressAnalysis {
            level: assessment.level,
            confidence: assessment.confidence,
            recommendations: default_recommendations(assessment.level)
                .iter()
                .map(|s| s.to_string())
                .collect(),
            method: METHOD_RULE_BASED.to_string(),
        })
    }
}
