//! Client for the external chat-completion API (branch B of the analysis
//! endpoint). One blocking round trip, no retry, no streaming; the first
//! choice's message object is returned exactly as the provider sent it.

use anyhow::anyhow;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

/// Model identifier the endpoint always forwards with.
pub const COMPLETION_MODEL: &str = "gpt-3.5-turbo";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Explicitly constructed client, owned by the composition root and injected
/// into the router state.
pub struct CompletionClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl CompletionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Forward the message list verbatim and return `choices[0].message`
    /// unmodified.
    pub async fn chat(&self, messages: &[Value]) -> anyhow::Result<Value> {
        let payload = json!({
            "model": COMPLETION_MODEL,
            "messages": messages,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "completion API request failed: {}",
                response.status()
            ));
        }

        let body: Value = response.json().await?;
        let message = body["choices"][0]
            .get("message")
            .cloned()
            .ok_or_else(|| anyhow!("completion API returned no choices"))?;

        info!("Completion API returned a choice");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Round trip against the real API.
    /// Usage: OPENAI_API_KEY=key cargo test live_completion_round_trip
    #[tokio::test]
    async fn live_completion_round_trip() -> anyhow::Result<()> {
        let Ok(api_key) = std::env::var("OPENAI_API_KEY") else {
            println!("Skipping test - set OPENAI_API_KEY environment variable");
            return Ok(());
        };

        let client = CompletionClient::new(api_key);
        let messages = vec![json!({"role": "user", "content": "Say OK."})];
        let message = client.chat(&messages).await?;

        assert_eq!(message["role"], "assistant");
        assert!(message["content"].is_string());
        Ok(())
    }
}
