use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Extractor;

const API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_ENV: &str = "GOOGLE_API_KEY";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const EXTRACTION_PROMPT: &str = "\
Please analyze this documentation and extract clear, actionable instructions on how to use the feature described.

Focus on:
1. Step-by-step instructions for using the feature
2. Key actions or workflows the user should perform
3. Important settings or configurations
4. Expected outcomes or results
5. Any prerequisites or setup requirements

Provide the instructions in a clear, concise format that can be used for browser automation.
Do not return JSON, just plain text instructions.";

/// Extracts feature-usage instructions with the Gemini `generateContent` API.
pub struct GeminiExtractor {
    client: reqwest::Client,
    model: String,
    api_key: String,
}

impl GeminiExtractor {
    /// Requires `GOOGLE_API_KEY` in the environment.
    pub fn new(model: Option<String>) -> Result<Self> {
        let api_key = match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => key,
            _ => bail!("missing credentials: set {}", API_KEY_ENV),
        };
        Ok(Self {
            client: reqwest::Client::new(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
        })
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract_usage(&self, text: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: EXTRACTION_PROMPT,
                    },
                    Part { text },
                ],
            }],
        };

        let resp = self
            .client
            .post(format!(
                "{}/{}:generateContent?key={}",
                API_URL, self.model, self.api_key
            ))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Gemini API error ({}): {}", status, text);
        }

        let api_resp: GenerateResponse = resp.json().await?;

        let instructions: String = api_resp
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if instructions.is_empty() {
            bail!("no usage instructions could be extracted");
        }

        Ok(instructions)
    }
}

// --- API types ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}
