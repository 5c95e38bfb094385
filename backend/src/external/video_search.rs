//! Advisory video search client
//!
//! Queries a video platform for agronomy guidance matching a search term.
//! Deployments without an API key are served from a small built-in catalog
//! so the learning section of the app never comes up empty.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A video offered to the farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResult {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Client for the video search API
#[derive(Clone)]
pub struct VideoSearchClient {
    api_endpoint: String,
    api_key: String,
    max_results: u32,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct YtSearchResponse {
    items: Vec<YtItem>,
}

#[derive(Debug, Deserialize)]
struct YtItem {
    id: YtVideoId,
    snippet: YtSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YtVideoId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YtSnippet {
    title: String,
    description: String,
    channel_title: String,
    thumbnails: Option<YtThumbnails>,
}

#[derive(Debug, Deserialize)]
struct YtThumbnails {
    medium: Option<YtThumbnail>,
}

#[derive(Debug, Deserialize)]
struct YtThumbnail {
    url: String,
}

impl VideoSearchClient {
    /// Create a new video search client
    pub fn new(api_endpoint: String, api_key: String, max_results: u32) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_endpoint,
            api_key,
            max_results,
            http_client,
        }
    }

    /// Search for advisory videos matching the query
    pub async fn search(&self, query: &str) -> AppResult<Vec<VideoResult>> {
        let url = format!("{}/search", self.api_endpoint);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query),
                ("maxResults", &self.max_results.to_string()),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Video search failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Video API returned {}: {}",
                status, body
            )));
        }

        let data: YtSearchResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse video response: {}", e))
        })?;

        let results = data
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(VideoResult {
                    video_id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    channel: item.snippet.channel_title,
                    thumbnail_url: item
                        .snippet
                        .thumbnails
                        .and_then(|t| t.medium)
                        .map(|t| t.url),
                })
            })
            .collect();

        Ok(results)
    }
}

/// Curated fallback catalog served when no video API key is configured
pub fn builtin_catalog(query: &str) -> Vec<VideoResult> {
    const CATALOG: &[(&str, &str, &str)] = &[
        (
            "builtin-ndvi-basics",
            "Understanding NDVI Maps for Your Fields",
            "How to read vegetation index imagery and what healthy values look like across the season.",
        ),
        (
            "builtin-irrigation-scheduling",
            "Irrigation Scheduling Under Drought Stress",
            "Prioritizing water when NDVI shows early stress, including deficit irrigation for row crops.",
        ),
        (
            "builtin-soil-moisture",
            "Checking Soil Moisture the Right Way",
            "Hands-on soil probing to confirm satellite stress signals before committing water.",
        ),
        (
            "builtin-pest-scouting",
            "Field Scouting for Pests and Disease",
            "Separating pest damage from water stress when vegetation indices decline.",
        ),
        (
            "builtin-fertilizer-timing",
            "Fertilizer Timing for Stressed Crops",
            "Why feeding a drought-stressed crop can backfire and when to resume nitrogen.",
        ),
        (
            "builtin-cover-crops",
            "Cover Crops for Soil Water Retention",
            "Improving infiltration and next-season resilience with winter cover.",
        ),
    ];

    let needle = query.trim().to_lowercase();

    CATALOG
        .iter()
        .filter(|(_, title, description)| {
            needle.is_empty()
                || needle.split_whitespace().any(|term| {
                    title.to_lowercase().contains(term)
                        || description.to_lowercase().contains(term)
                })
        })
        .map(|(video_id, title, description)| VideoResult {
            video_id: video_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            channel: "CropWatch Academy".to_string(),
            thumbnail_url: None,
        })
        .collect()
}
