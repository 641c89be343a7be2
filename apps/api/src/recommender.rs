//! Recommendation client — the single point of entry for calls to the
//! external recommendation webhook. The webhook owns the actual
//! recommendation computation; this module only ships the profile payload
//! and parses the response defensively.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Bound on the webhook call; a slow upstream fails the interaction rather
/// than hanging it.
const WEBHOOK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("Recommendation request timed out")]
    Timeout,

    #[error("Recommendation request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Recommendation service returned status {status}")]
    Upstream { status: u16 },

    #[error("Recommendation response could not be parsed: {0}")]
    Malformed(String),
}

/// Payload POSTed to the webhook. Skills and interests are split out of
/// their comma-joined stored form here.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationPayload {
    pub name: String,
    pub gmail: String,
    pub skills: Vec<String>,
    pub education: String,
    pub interests: Vec<String>,
}

impl RecommendationPayload {
    pub fn new(name: &str, gmail: &str, skills: &str, education: &str, interests: &str) -> Self {
        Self {
            name: name.to_string(),
            gmail: gmail.to_string(),
            skills: split_list(skills),
            education: education.to_string(),
            interests: split_list(interests),
        }
    }
}

/// Splits a comma-joined field into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Webhook response. Every field is optional: a partially-filled entry is
/// rendered with placeholders instead of failing the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
    #[serde(default)]
    pub courses: Vec<CourseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    apply_options: Vec<ApplyOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyOption {
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

impl JobEntry {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("N/A")
    }

    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or("Unknown")
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or("Unknown")
    }

    /// Top-level link, or the first alternative application option's link.
    pub fn link(&self) -> Option<&str> {
        self.link
            .as_deref()
            .or_else(|| self.apply_options.first().and_then(|o| o.link.as_deref()))
    }
}

impl CourseEntry {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Course")
    }

    pub fn platform(&self) -> &str {
        self.platform.as_deref().unwrap_or("Unknown Platform")
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}

/// The one client used for all webhook calls. No automatic retries: a
/// failed call surfaces to the user, who resubmits manually.
#[derive(Clone)]
pub struct RecommenderClient {
    client: reqwest::Client,
    webhook_url: String,
}

impl RecommenderClient {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(WEBHOOK_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            webhook_url,
        }
    }

    pub async fn request(
        &self,
        payload: &RecommendationPayload,
    ) -> Result<RecommendationResponse, RecommenderError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RecommenderError::Timeout
                } else {
                    RecommenderError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecommenderError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RecommenderError::Timeout
            } else {
                RecommenderError::Network(e)
            }
        })?;

        let parsed: RecommendationResponse =
            serde_json::from_str(&body).map_err(|e| RecommenderError::Malformed(e.to_string()))?;

        debug!(
            "Webhook returned {} job(s), {} course(s)",
            parsed.jobs.len(),
            parsed.courses.len()
        );
        Ok(parsed)
    }
}
