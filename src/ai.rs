use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::store::records::SymptomLog;

const CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const VISION_MODEL: &str = "llama-3.2-90b-vision-preview";
const TEXT_MODEL: &str = "llama-3.3-70b-versatile";

const VISION_TIMEOUT: Duration = Duration::from_secs(60);
const TEXT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream analysis failure. Callers degrade to default values and keep the
/// underlying log record; this error never aborts a save.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis API key not configured")]
    NotConfigured,
    #[error("analysis request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("analysis response unusable: {0}")]
    Malformed(String),
}

/// Nutrition analysis of a meal photo. `Default` is the zeroed analysis used
/// when the upstream call fails or no photo was supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealAnalysis {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub foods_identified: Vec<String>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default = "default_health_score")]
    pub health_score: i64,
    #[serde(default)]
    pub suggestions: String,
}

fn default_health_score() -> i64 {
    5
}

impl Default for MealAnalysis {
    fn default() -> Self {
        MealAnalysis {
            description: "Meal logged".into(),
            foods_identified: Vec::new(),
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            fiber: 0.0,
            health_score: default_health_score(),
            suggestions: String::new(),
        }
    }
}

/// Client for the Groq OpenAI-compatible chat-completions API. Every request
/// carries a timeout so a slow model never blocks the record store.
pub struct AiClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl AiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    async fn completion(
        &self,
        model: &str,
        system: &str,
        user_content: Value,
        temperature: f64,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<String, AnalysisError> {
        let key = self.api_key.as_deref().ok_or(AnalysisError::NotConfigured)?;
        let resp = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(key)
            .timeout(timeout)
            .json(&json!({
                "model": model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user_content },
                ],
                "temperature": temperature,
                "max_tokens": max_tokens,
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = resp.json().await?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| AnalysisError::Malformed("missing completion content".into()))
    }

    /// Nutrition analysis of a meal photo.
    pub async fn analyze_meal_image(&self, image: &[u8]) -> Result<MealAnalysis, AnalysisError> {
        let image_b64 = BASE64.encode(image);
        let content = self
            .completion(
                VISION_MODEL,
                "Analyze food images and return JSON with: description, foods_identified \
                 (array), calories (number), protein (number), carbs (number), fat (number), \
                 fiber (number), health_score (1-10), suggestions (string). Be realistic with \
                 portions.",
                json!([
                    { "type": "text", "text": "Analyze this meal's nutrition. Return only valid JSON." },
                    { "type": "image_url", "image_url": { "url": format!("data:image/jpeg;base64,{image_b64}") } },
                ]),
                0.3,
                1000,
                VISION_TIMEOUT,
            )
            .await?;

        debug!(len = content.len(), "meal analysis response");
        serde_json::from_str(extract_json_block(&content))
            .map_err(|e| AnalysisError::Malformed(e.to_string()))
    }

    /// Pattern analysis over a user's recent symptom history.
    pub async fn analyze_symptoms(&self, symptoms: &[SymptomLog]) -> Result<String, AnalysisError> {
        let listing = symptoms
            .iter()
            .map(|s| {
                let when = s.logged_at.format(&Rfc3339).unwrap_or_default();
                format!("- {} (severity: {}/10) on {}", s.symptom, s.severity, when)
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.completion(
            TEXT_MODEL,
            "You are a wellness assistant. Identify patterns in symptoms and suggest \
             lifestyle improvements. Never diagnose - recommend seeing a doctor for concerns.",
            json!(format!(
                "My recent symptoms:\n{listing}\n\nWhat patterns do you notice?"
            )),
            0.4,
            500,
            TEXT_TIMEOUT,
        )
        .await
    }

    /// Free-form wellness chat grounded in the user's recent stats.
    pub async fn chat(&self, message: &str, user_context: &str) -> Result<String, AnalysisError> {
        self.completion(
            TEXT_MODEL,
            &format!(
                "You are a friendly wellness assistant for HealthLog. Help with nutrition, \
                 wellness, and health tracking questions. Never diagnose conditions. \
                 {user_context}"
            ),
            json!(message),
            0.7,
            500,
            TEXT_TIMEOUT,
        )
        .await
    }
}

/// Models often wrap their JSON in markdown fences; tolerate both fenced and
/// bare output.
fn extract_json_block(content: &str) -> &str {
    if let Some(rest) = content.split("```json").nth(1) {
        rest.split("```").next().unwrap_or(rest).trim()
    } else if let Some(rest) = content.split("```").nth(1) {
        rest.trim()
    } else {
        content.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json() {
        let content = "Here you go:\n```json\n{\"calories\": 500}\n```\nEnjoy!";
        assert_eq!(extract_json_block(content), "{\"calories\": 500}");
    }

    #[test]
    fn extracts_plain_fences() {
        let content = "```\n{\"calories\": 300}\n```";
        assert_eq!(extract_json_block(content), "{\"calories\": 300}");
    }

    #[test]
    fn passes_bare_json_through() {
        assert_eq!(extract_json_block("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn partial_analysis_fills_defaults() {
        let analysis: MealAnalysis =
            serde_json::from_str(r#"{"description": "salad", "calories": 320}"#).expect("parse");
        assert_eq!(analysis.description, "salad");
        assert_eq!(analysis.calories, 320.0);
        assert_eq!(analysis.protein, 0.0);
        assert_eq!(analysis.health_score, 5);
    }

    #[test]
    fn default_analysis_is_zeroed_with_mid_health_score() {
        let analysis = MealAnalysis::default();
        assert_eq!(analysis.calories, 0.0);
        assert_eq!(analysis.health_score, 5);
        assert_eq!(analysis.description, "Meal logged");
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let client = AiClient::new(None);
        let err = client.analyze_meal_image(b"bytes").await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotConfigured));
    }
}
