use std::time::Duration;

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::adapters::{AdapterError, ScreenImage, TextGenerator};
use crate::sanitize::preview;

const API_KEY_HEADER: &str = "x-goog-api-key";
const ERROR_BODY_PREVIEW: usize = 300;

/// Blocking client for the `generateContent` endpoint of one model.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: &SecretString,
        timeout: Duration,
    ) -> Result<Self, AdapterError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

fn build_request<'a>(prompt: &'a str, image: Option<&ScreenImage>) -> GenerateRequest<'a> {
    let mut parts = vec![RequestPart::Text { text: prompt }];
    if let Some(image) = image {
        parts.push(RequestPart::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type(),
                data: image.to_base64(),
            },
        });
    }
    GenerateRequest {
        contents: vec![Content { role: "user", parts }],
    }
}

fn parse_response(body: &str) -> Result<String, AdapterError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AdapterError::InvalidResponse(format!("malformed JSON: {}", e)))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AdapterError::InvalidResponse(format!(
            "prompt blocked: {}",
            reason
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AdapterError::InvalidResponse("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(AdapterError::InvalidResponse(format!(
            "empty answer (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}

impl TextGenerator for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model, with_image = image.is_some()))]
    fn generate(&self, prompt: &str, image: Option<&ScreenImage>) -> Result<String, AdapterError> {
        let body = build_request(prompt, image);

        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body: preview(&text, ERROR_BODY_PREVIEW),
            });
        }

        let answer = parse_response(&text)?;
        debug!(chars = answer.chars().count(), "Model answered");
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
