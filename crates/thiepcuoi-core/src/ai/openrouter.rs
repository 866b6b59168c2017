use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Completion, CompletionBackend, CompletionRequest};
use crate::config::ChatConfig;
use crate::error::{ExchangeError, ExchangeResult};

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;
const APP_TITLE: &str = "Wedding Invitation Chatbot";

#[derive(Serialize)]
struct OpenRouterMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: Vec<OpenRouterMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

/// OpenRouter chat-completions client (OpenAI-compatible wire format).
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    url: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(config: &ChatConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.completions_url(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> ExchangeResult<Completion> {
        let body = OpenRouterRequest {
            model: &self.model,
            messages: vec![
                OpenRouterMessage {
                    role: "system",
                    content: &request.system,
                },
                OpenRouterMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %self.model, url = %self.url, "sending completion request");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", request.api_key.expose()))
            .header("Content-Type", "application/json")
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, body = %text, "completion provider returned an error status");
            return Err(ExchangeError::connection(format!("API Error: {}", status)));
        }

        let text = response.text().await?;
        let payload: Value = serde_json::from_str(&text)?;
        Ok(extract_reply(&payload))
    }
}

/// Pull `choices[0].message.content` out of a response body.
pub fn extract_reply(payload: &Value) -> Completion {
    payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(|content| Completion::Text(content.to_string()))
        .unwrap_or(Completion::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_choice_content() {
        let payload = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "169k-730k tuỳ gói"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(
            extract_reply(&payload),
            Completion::Text("169k-730k tuỳ gói".to_string())
        );
    }

    #[test]
    fn missing_or_empty_content_is_not_a_reply() {
        let cases = [
            json!({"choices": []}),
            json!({"choices": [{"message": {"content": ""}}]}),
            json!({"choices": [{"message": {"content": null}}]}),
            json!({"choices": [{"message": {"content": 42}}]}),
            json!({"choices": [{"text": "legacy"}]}),
            json!({"error": {"message": "rate limited"}}),
            json!([]),
        ];
        for payload in cases {
            assert_eq!(extract_reply(&payload), Completion::Missing, "{payload}");
        }
    }

    #[test]
    fn request_body_has_fixed_sampling_parameters() {
        let body = OpenRouterRequest {
            model: "deepseek/deepseek-chat:free",
            messages: vec![
                OpenRouterMessage {
                    role: "system",
                    content: "persona",
                },
                OpenRouterMessage {
                    role: "user",
                    content: "Giá thiệp bao nhiêu?",
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "deepseek/deepseek-chat:free");
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Giá thiệp bao nhiêu?");
    }
}
