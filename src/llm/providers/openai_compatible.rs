use std::time::Duration;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::errors::{PilotError, PilotResult};
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CallConfig, ChatCompletion, ChatMessage, LlmResponse, ToolDef};

/// Client for any server speaking the OpenAI chat-completions protocol
/// (LM Studio, llama.cpp server, vLLM, OpenAI itself).
pub struct OpenAiCompatibleProvider {
    id: String,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        id: String,
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> PilotResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            id,
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout,
            client,
        })
    }

    pub fn from_config(cfg: &LlmConfig) -> PilotResult<Self> {
        Self::new(
            cfg.model.clone(),
            cfg.endpoint.clone(),
            cfg.api_key.clone(),
            cfg.timeout(),
        )
    }

    fn map_transport(&self, e: reqwest::Error) -> PilotError {
        if e.is_timeout() {
            PilotError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            PilotError::Http(e)
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
        cfg: &CallConfig,
    ) -> PilotResult<LlmResponse> {
        let body = build_request_body(messages, tools, cfg)?;

        tracing::debug!(
            provider = %self.id,
            model = %cfg.model,
            messages = messages.len(),
            "sending LLM request"
        );
        tracing::debug!(
            body = %serde_json::to_string(&redact_images(&body)).unwrap_or_default(),
            "request body (sanitized, base64 omitted)"
        );

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(|e| self.map_transport(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(PilotError::LlmProvider(format!("{status}: {err_body}")));
        }

        let text = response.text().await.map_err(|e| self.map_transport(e))?;
        let parsed = parse_completion(&text)?;

        tracing::info!(
            content_len = parsed.content.as_deref().map_or(0, str::len),
            tool_calls = parsed.tool_calls.len(),
            tools = ?parsed.tool_calls.iter().map(|tc| tc.function.name.as_str()).collect::<Vec<_>>(),
            "LLM JSON response received"
        );
        Ok(parsed)
    }
}

/// `{model, messages, tools, tool_choice, temperature, max_tokens}`.
fn build_request_body(
    messages: &[ChatMessage],
    tools: &[ToolDef],
    cfg: &CallConfig,
) -> PilotResult<serde_json::Value> {
    Ok(serde_json::json!({
        "model": cfg.model,
        "messages": messages,
        "tools": serde_json::to_value(tools)?,
        "tool_choice": "auto",
        "temperature": cfg.temperature,
        "max_tokens": cfg.max_tokens,
    }))
}

/// Extract `choices[0].message`. Anything not shaped like a chat completion is fatal.
fn parse_completion(text: &str) -> PilotResult<LlmResponse> {
    let completion: ChatCompletion =
        serde_json::from_str(text).map_err(|e| PilotError::MalformedResponse(e.to_string()))?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| PilotError::MalformedResponse("response has no choices".into()))?;
    Ok(LlmResponse {
        content: choice.message.content,
        tool_calls: choice.message.tool_calls.unwrap_or_default(),
    })
}

/// Copy of `body` with every inline image URL replaced, for logging.
fn redact_images(body: &serde_json::Value) -> serde_json::Value {
    let mut log_body = body.clone();
    if let Some(msgs) = log_body.get_mut("messages").and_then(|m| m.as_array_mut()) {
        for msg in msgs {
            let Some(parts) = msg.get_mut("content").and_then(|c| c.as_array_mut()) else {
                continue;
            };
            for part in parts {
                if part.get("type").and_then(|t| t.as_str()) == Some("image_url") {
                    if let Some(url) = part.pointer_mut("/image_url/url") {
                        *url = serde_json::Value::String("<omitted_base64_image>".to_string());
                    }
                }
            }
        }
    }
    log_body
}
