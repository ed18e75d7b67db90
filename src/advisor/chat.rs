//! OpenAI-compatible chat-completion advisor.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::advisor::Advisor;
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_MODEL: &str = "qwen-plus";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const SYSTEM_PROMPT: &str = "You are a data analysis expert. Based on the following curve-fitting \
results, give practical recommendations.";

/// Endpoint, model and credential for [`ChatAdvisor`].
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl AdvisorConfig {
    /// Read `DASHSCOPE_API_KEY` and the `FITRANK_ADVISOR_*` overrides (after loading `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let timeout_secs = var("FITRANK_ADVISOR_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key: var("DASHSCOPE_API_KEY"),
            base_url: var("FITRANK_ADVISOR_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: var("FITRANK_ADVISOR_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

fn request_body<'a>(model: &'a str, summary: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: summary,
            },
        ],
    }
}

fn first_reply(resp: ChatResponse) -> Result<String, AppError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AppError::new(4, "Chat response contained no reply."))
}

pub struct ChatAdvisor {
    client: Client,
    config: AdvisorConfig,
}

impl ChatAdvisor {
    pub fn new(config: AdvisorConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::new(AdvisorConfig::from_env())
    }
}

impl Advisor for ChatAdvisor {
    fn advise(&self, summary: &str) -> Result<String, AppError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::new(2, "Missing DASHSCOPE_API_KEY in environment (.env)."))?;

        tracing::debug!(model = %self.config.model, url = %self.config.endpoint(), "requesting advisory");
        let resp = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .json(&request_body(&self.config.model, summary))
            .send()
            .map_err(|e| AppError::new(4, format!("Chat request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Chat request failed with status {}.", resp.status()),
            ));
        }

        let body: ChatResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse chat response: {e}")))?;
        first_reply(body)
    }
}
