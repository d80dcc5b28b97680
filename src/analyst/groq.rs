// src/analyst/groq.rs

//! Live analyst backed by an OpenAI-compatible chat completions endpoint
//! (Groq by default).

use super::collaborator::{AnalysisRequest, Analyst};
use crate::error::AnalystError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    response_format: ResponseFormat,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct GroqAnalyst {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    request_timeout: Duration,
}

impl GroqAnalyst {
    /// A missing key is not an error here; every call then fails with
    /// `MissingCredential` and the run degrades to the fallback rule.
    pub fn new(api_key: Option<String>, request_timeout: Duration) -> Result<Self, AnalystError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AnalystError::from_reqwest(e, request_timeout))?;
        Ok(Self {
            client,
            base_url: GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            request_timeout,
        })
    }

    /// Reads the key from `GROQ_API_KEY`.
    pub fn from_env(request_timeout: Duration) -> Result<Self, AnalystError> {
        Self::new(std::env::var(API_KEY_VAR).ok(), request_timeout)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.2,
        }
    }
}

impl Analyst for GroqAnalyst {
    fn name(&self) -> &str {
        &self.model
    }

    fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalystError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AnalystError::MissingCredential(API_KEY_VAR))?;

        let prompt = request.prompt();
        debug!(model = %self.model, step = request.step, "requesting analyst recommendation");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&self.body(&prompt))
            .send()
            .map_err(|e| AnalystError::from_reqwest(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalystError::Unavailable(format!(
                "{} returned {status}",
                self.base_url
            )));
        }

        let body: ChatResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                AnalystError::Timeout(self.request_timeout)
            } else {
                AnalystError::malformed(format!("unreadable completion: {e}"))
            }
        })?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalystError::malformed("completion had no message content"))
    }
}
