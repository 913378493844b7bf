use super::{CompletionClient, CompletionRequest};
use crate::config::Config;
use crate::logw;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const BODY_SNIPPET_CHARS: usize = 800;

/// OpenAI-compatible chat completions client (Groq by default).
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, cfg))
    }

    pub fn with_client(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            api_key: cfg.groq_key.clone(),
            base_url: cfg.llm_base_url.clone(),
            model: cfg.llm_model.clone(),
        }
    }

    fn request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": request.prompt},
            ],
            "temperature": request.temperature,
        });
        if request.json_response {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }
}

fn log_provider_error(root: &serde_json::Value) -> bool {
    let Some(err) = root.get("error") else {
        return false;
    };
    if let Some(msg) = err.get("message").and_then(|v| v.as_str()) {
        logw(format!("LLM error message: {}", msg));
    }
    if let Some(typ) = err.get("type").and_then(|v| v.as_str()) {
        logw(format!("LLM error type: {}", typ));
    }
    if let Some(code) = err.get("code").and_then(|v| v.as_str()) {
        logw(format!("LLM error code: {}", code));
    }
    true
}

fn extract_message_text(resp_json: &str) -> Option<String> {
    let root: serde_json::Value = serde_json::from_str(resp_json).ok()?;
    if log_provider_error(&root) {
        return None;
    }

    root.get("choices")?
        .as_array()?
        .iter()
        .find_map(|choice| {
            choice
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
        })
        .map(str::to_string)
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .context("LLM request failed")?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            if !raw.is_empty() {
                let snippet = raw.chars().take(BODY_SNIPPET_CHARS).collect::<String>();
                logw(format!("LLM raw body: {}", snippet));
            }
            anyhow::bail!("LLM HTTP {}", status.as_u16());
        }

        extract_message_text(&raw).context("LLM response parse failed")
    }
}
