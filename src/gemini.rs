use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, error};

use crate::config::Config;
use crate::models::{Category, InvalidRecommendation, OutfitRecommendation, StylingCriteria};

#[derive(Debug, Error)]
pub enum StylistError {
    #[error("GEMINI_API_KEY is not configured")] MissingApiKey,
    #[error("HTTP error: {0}")] Http(String),
    #[error("service returned {status}: {body}")] Status { status: u16, body: String },
    #[error("response contained no text")] EmptyResponse,
    #[error("parse error: {0}")] Parse(String),
    #[error("schema violation: {0}")] Schema(#[from] InvalidRecommendation),
}

/// Produces one outfit recommendation per call.
#[async_trait]
pub trait Stylist: Send + Sync {
    async fn generate(&self, criteria: &StylingCriteria) -> Result<OutfitRecommendation, StylistError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, StylistError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StylistError::Http(e.to_string()))?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn redact(&self, text: &str) -> String {
        match &self.api_key {
            Some(key) => text.replace(key.as_str(), "***"),
            None => text.to_string(),
        }
    }

    async fn perform_api_call(&self, api_key: &str, prompt: &str) -> Result<String, StylistError> {
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, api_key);
        info!("🔗 Making request to: {}", self.redact(&url));

        let request_body = build_request_body(prompt);

        let response = self.client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| StylistError::Http(self.redact(&e.to_string())))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await
            .map_err(|e| StylistError::Http(self.redact(&e.to_string())))?;

        if !status.is_success() {
            error!("❌ API Error response: {}", truncate(&response_text, 500));
            return Err(StylistError::Status { status: status.as_u16(), body: truncate(&response_text, 500) });
        }

        info!("📥 Raw Gemini API response: {}", truncate(&response_text, 1000));

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| StylistError::Parse(format!("envelope: {}", e)))?;

        extract_text(&parsed).ok_or(StylistError::EmptyResponse)
    }
}

#[async_trait]
impl Stylist for GeminiClient {
    async fn generate(&self, criteria: &StylingCriteria) -> Result<OutfitRecommendation, StylistError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("❌ Refusing to call Gemini: no API key configured");
            return Err(StylistError::MissingApiKey);
        };

        let prompt = build_prompt(criteria);
        info!("🎯 Curating outfit for occasion '{}' with prompt: {}", criteria.occasion, truncate(&prompt, 120));

        let text = self.perform_api_call(api_key, &prompt).await?;
        let recommendation = parse_recommendation(&text)?;

        info!("✅ Recommendation '{}' with {} components", recommendation.title, recommendation.components.len());
        Ok(recommendation)
    }
}

pub fn build_prompt(criteria: &StylingCriteria) -> String {
    format!(
        "You are a celebrated personal stylist. Curate one complete, wearable outfit for the situation below.\n\
        Occasion: {occasion}\n\
        Weather: {weather}\n\
        Mood: {mood}\n\n\
        Give the look an evocative title and a named color palette of hex codes. \
        List each garment or accessory with a short description and its category \
        (top, bottom, outerwear, footwear or accessory). If the weather calls for it, add layering advice. \
        Finish with a few sentences on the style psychology: why this outfit suits the occasion and the mood.",
        occasion = criteria.occasion.trim(),
        weather = criteria.weather_or_placeholder(),
        mood = criteria.mood_or_placeholder(),
    )
}

/// Gemini `responseSchema` mirroring [`OutfitRecommendation`].
pub fn response_schema() -> Value {
    let categories: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "colorPalette": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "colors": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["name", "colors"]
            },
            "components": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "item": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "category": { "type": "STRING", "enum": categories }
                    },
                    "required": ["item", "description", "category"]
                }
            },
            "layeringAdvice": { "type": "STRING" },
            "stylePsychology": { "type": "STRING" }
        },
        "required": ["title", "colorPalette", "components", "stylePsychology"],
        "propertyOrdering": ["title", "colorPalette", "components", "layeringAdvice", "stylePsychology"]
    })
}

pub fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{"text": prompt}]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
            "temperature": 0.7,
            "candidateCount": 1
        }
    })
}

/// Parses the model's text as a recommendation, rejecting anything the schema forbids.
pub fn parse_recommendation(text: &str) -> Result<OutfitRecommendation, StylistError> {
    let body = strip_code_fence(text);
    let recommendation: OutfitRecommendation = serde_json::from_str(body)
        .map_err(|e| StylistError::Parse(e.to_string()))?;
    recommendation.validate()?;
    Ok(recommendation)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.trim_start_matches("json");
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...[{} chars]", &s[..idx], s.chars().count()),
        None => s.to_string(),
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    #[allow(dead_code)]
    Other(Value),
}

fn extract_text(resp: &GeminiResponse) -> Option<String> {
    let candidate = resp.candidates.first()?;
    let text: String = candidate.content.parts.iter()
        .filter_map(|p| match p { Part::Text { text } => Some(text.as_str()), Part::Other(_) => None })
        .collect();
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}
