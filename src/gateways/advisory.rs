//! Advisory gateway.
//!
//! An opaque question-answering service used for today's action, stage
//! summaries and chat. `ChatCompletionsGateway` speaks the OpenAI-compatible
//! chat completions protocol; `DisabledAdvisoryGateway` always reports that no
//! advisory service is configured.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::UpstreamError;
use crate::config::AdvisoryConfig;

const SERVICE: &str = "advisory";

/// Inputs of the action planner prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub stage: String,
    pub weather: String,
    pub knowledge: String,
    pub question: Option<String>,
}

impl ActionRequest {
    pub fn daily(stage: impl Into<String>, weather: impl Into<String>, knowledge: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            weather: weather.into(),
            knowledge: knowledge.into(),
            question: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }
}

/// Knowledge context used while no retrieval index is wired in
pub fn default_knowledge(crop: &str, stage: &str) -> String {
    format!("Standard agricultural practices for {crop} at {stage} stage.")
}

pub fn render_action_prompt(request: &ActionRequest) -> String {
    format!(
        "You are the Action Planner Agent for CropMind AI.\n\
         \n\
         CONTEXT:\n\
         - Current Crop Stage: {stage}\n\
         - Weather Situation: {weather}\n\
         - Agricultural Knowledge: {knowledge}\n\
         - Farmer's Input: {question}\n\
         \n\
         GOAL:\n\
         Decide the SINGLE most important action for the farmer today.\n\
         Must be short, actionable, and farmer-friendly.\n\
         Explain WHY based on the situation.\n\
         \n\
         Output format:\n\
         ACTION: [The Action]\n\
         REASON: [Short explanation]",
        stage = request.stage,
        weather = request.weather,
        knowledge = request.knowledge,
        question = request
            .question
            .as_deref()
            .unwrap_or("General daily advice requested."),
    )
}

pub fn render_translation_prompt(content: &str, target_language: &str) -> String {
    format!(
        "Translate the following agricultural advice to {target_language}. \
         Keep the tone helpful and professional: \n\n {content}"
    )
}

pub fn is_english(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case("english")
}

/// Pull actionable steps out of a planner answer: the `ACTION:` line plus any
/// bulleted or numbered lines.
pub fn parse_actionable_steps(answer: &str) -> Vec<String> {
    answer
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some(action) = line.strip_prefix("ACTION:") {
                return Some(action.trim().to_string());
            }
            let bullet = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .or_else(|| line.strip_prefix("• "))
                .or_else(|| {
                    let digits = line.find(|c: char| !c.is_ascii_digit())?;
                    (digits > 0)
                        .then(|| line[digits..].strip_prefix(". "))
                        .flatten()
                })?;
            Some(bullet.trim().to_string())
        })
        .filter(|step| !step.is_empty())
        .collect()
}

#[async_trait]
pub trait AdvisoryGateway: Send + Sync {
    /// The single most important action for the farmer right now
    async fn plan_action(&self, request: &ActionRequest) -> Result<String, UpstreamError>;

    async fn translate(&self, content: &str, target_language: &str) -> Result<String, UpstreamError>;

    /// Plan, then translate unless the farmer reads English
    async fn advise(&self, request: &ActionRequest, language: &str) -> Result<String, UpstreamError> {
        let answer = self.plan_action(request).await?;
        if is_english(language) {
            return Ok(answer);
        }
        self.translate(&answer, language).await
    }
}

pub struct ChatCompletionsGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    planner_temperature: f32,
    translation_temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsGateway {
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self, UpstreamError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| UpstreamError::unavailable(SERVICE, e))?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            planner_temperature: config.planner_temperature,
            translation_temperature: config.translation_temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn complete(&self, prompt: String, temperature: f32) -> Result<String, UpstreamError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature,
            max_tokens: self.max_tokens,
        };

        let mut http_request = self.client.post(self.chat_completions_url());
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::unavailable(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::unavailable(
                SERVICE,
                format!("HTTP {status}: {body}"),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::invalid_response(SERVICE, e))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| UpstreamError::invalid_response(SERVICE, "no content in response"))?;

        debug!(model = %self.model, chars = content.len(), "Advisory completion received");
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[async_trait]
impl AdvisoryGateway for ChatCompletionsGateway {
    async fn plan_action(&self, request: &ActionRequest) -> Result<String, UpstreamError> {
        self.complete(render_action_prompt(request), self.planner_temperature)
            .await
    }

    async fn translate(&self, content: &str, target_language: &str) -> Result<String, UpstreamError> {
        if is_english(target_language) {
            return Ok(content.to_string());
        }
        self.complete(
            render_translation_prompt(content, target_language),
            self.translation_temperature,
        )
        .await
    }
}

/// Stand-in used when no advisory service is enabled
pub struct DisabledAdvisoryGateway;

#[async_trait]
impl AdvisoryGateway for DisabledAdvisoryGateway {
    async fn plan_action(&self, _request: &ActionRequest) -> Result<String, UpstreamError> {
        Err(UpstreamError::not_configured(SERVICE))
    }

    async fn translate(&self, _content: &str, _target_language: &str) -> Result<String, UpstreamError> {
        Err(UpstreamError::not_configured(SERVICE))
    }
}
