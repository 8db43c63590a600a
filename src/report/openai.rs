use super::{parse_structured_report, ReportError, ReportGenerator, ReportKind, ReportRequest, StructuredReport};
use crate::core::config::LlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

const SYSTEM_PROMPT: &str = "You are an AI-SEO auditor. You assess how well a web page can be discovered, understood and quoted by AI answer engines (ChatGPT, Gemini, Perplexity, Copilot). Reply with ONE JSON object and nothing else, using exactly this shape: {\"score\": <integer 0-100>, \"ai_superpowers\": [{\"title\": <string>, \"explanation\": <string>}], \"ai_opportunities\": [{\"title\": <string>, \"explanation\": <string>}], \"ai_engine_insights\": {<engine name>: <string>}}. No markdown, no commentary.";

/// [`ReportGenerator`] backed by any OpenAI-compatible `chat/completions` endpoint.
pub struct OpenAiReportGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiReportGenerator {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1024,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// `None` when no key is configured anywhere.
    pub fn from_config(client: Client, cfg: &LlmConfig) -> Option<Self> {
        let api_key = cfg.resolve_api_key()?;
        Some(
            Self::new(client, cfg.resolve_base_url(), api_key, cfg.resolve_model())
                .with_max_tokens(cfg.resolve_max_tokens()),
        )
    }

    fn user_prompt(request: &ReportRequest) -> String {
        let ask = match request.kind {
            ReportKind::Summary => {
                "Summarize the AI-SEO strengths and opportunities of this page. Give at most 3 superpowers and 3 opportunities with one-sentence explanations."
            }
            ReportKind::Full => {
                "Provide a detailed AI-SEO report (superpowers and opportunities) for this page. Give up to 8 superpowers and 8 opportunities with concrete, actionable explanations, and an insight for each major AI engine."
            }
        };
        format!(
            "{}\n\nurl: {}\ncontent:\n{}",
            ask, request.url, request.page_text
        )
    }
}

#[async_trait]
impl ReportGenerator for OpenAiReportGenerator {
    async fn generate(&self, request: &ReportRequest) -> Result<StructuredReport, ReportError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        info!(
            "Requesting {} report for {} from model {}",
            request.kind.as_str(),
            request.url,
            self.model
        );

        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0.2,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": Self::user_prompt(request)}
            ]
        });

        let builder = self.client.post(url).json(&body);
        // Key-less local endpoints (Ollama / LM Studio) work without the header.
        let builder = if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(self.api_key.trim())
        };
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("chat.completions failed: status={}", status);
            return Err(ReportError::Upstream(format!(
                "status={} body={}",
                status,
                text.chars().take(500).collect::<String>()
            )));
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            ReportError::MalformedResponse(format!("response is not JSON: {}", e))
        })?;

        let content = value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ReportError::MalformedResponse("missing choices[0].message.content".to_string())
            })?;

        parse_structured_report(content)
    }
}
