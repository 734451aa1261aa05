//! OpenAI-compatible HTTP implementation of the scorer capability.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use crate::github::error::ReportError;

use super::throttle::SlidingWindowThrottle;
use super::{DimensionScores, PrScorePayload, PullRequestScoreService};

const DEFAULT_MODEL: &str = "qwen-plus";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_REQUESTS_PER_MINUTE: usize = 30;

const NO_LINKS_RULES: &str = "Strict rule - never generate links:\n\
    - Never use Markdown link syntax such as `[text](url)` or `[#123](url)`.\n\
    - Never use GitHub reference syntax such as `#123`, `owner/repo#123`, \
    `issue #123`, `PR #123`, or `apache#123`.\n\
    - When mentioning an issue, pull request, or discussion, use plain text \
    such as `Issue-123`, `PR-123`, or `Discussion-123` (hyphen, no hash).";

const SCORE_SYSTEM_PROMPT: &str = "You are a senior code reviewer assessing the \
    quality, value, and importance of pull requests. Analyse the change, its \
    type, its scope of impact, and the problem it solves, then score each of \
    the following dimensions from 0 to 10.\n\n\
    Baseline quality dimensions (judge all four objectively and equally):\n\
    - code_quality_score: code style, readability, design, best practice\n\
    - test_coverage_score: unit tests, integration tests, edge-case coverage\n\
    - doc_maintain_score: comments, documentation updates, maintainability\n\
    - compliance_security_score: vulnerabilities, compliance, dependency safety\n\n\
    Value dimensions (judge against the change's type and circumstances):\n\
    - merge_history_score: whether the scope of impact matches the change's \
    importance. A high-importance change with a wide scope is reasonable; a \
    low-importance change with a wide scope adds review burden without need \
    and deserves a low score. Consider backward compatibility and the effect \
    on the system.\n\
    - collaboration_score: the change's core value and importance. feat/opt \
    changes usually carry more value, fixes score with the severity of the \
    problem, test/docs changes carry comparatively less. Consider urgency, \
    business value, and whether a key problem is solved.\n\n\
    Special cases:\n\
    - A pull request marked WIP must not be marked down for being unfinished; \
    score its importance and the expected effect once it lands.\n\
    - A low-importance change touching many files should score low on scope \
    reasonableness.\n\n\
    The comment field must be detailed, readable, and split into paragraphs: \
    core value (2-3 sentences), key strengths (2-3 sentences), suggested \
    improvements (1-2 sentences, omit when there are none), and an overall \
    assessment (1-2 sentences). Keep it within 200-300 words, professional \
    and constructive.\n\n";

const DISCUSSION_SYSTEM_PROMPT: &str = "You are a technical community analyst \
    who explains the heart of a technical discussion. Summarise the core \
    points, questions, or proposals concisely and professionally in at most \
    100 words.\n\n";

const ISSUE_SYSTEM_PROMPT: &str = "You are a technical triage analyst who \
    extracts the core problem from an issue. Summarise the essential problem, \
    error, or request in at most 150 words, discarding all template \
    boilerplate (such as 'Check Ahead' or 'I have searched' sections).\n\n";

/// Configuration for [`OpenAiScoreService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiScoreConfig {
    /// Base API URL (e.g. `https://dashscope.aliyuncs.com/compatible-mode/v1`).
    pub base_url: String,
    /// Model identifier sent in chat-completions requests.
    pub model: String,
    /// API key used for bearer authentication; `None` disables calls.
    pub api_key: Option<String>,
    /// HTTP timeout per call.
    pub timeout: Duration,
    /// Sliding-window call budget per rolling minute.
    pub max_requests_per_minute: usize,
}

impl Default for OpenAiScoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_requests_per_minute: DEFAULT_MAX_REQUESTS_PER_MINUTE,
        }
    }
}

/// OpenAI-compatible scorer implementation.
#[derive(Debug)]
pub struct OpenAiScoreService {
    config: OpenAiScoreConfig,
    throttle: Mutex<SlidingWindowThrottle>,
}

impl OpenAiScoreService {
    /// Creates a service from explicit configuration.
    #[must_use]
    pub fn new(config: OpenAiScoreConfig) -> Self {
        let throttle = Mutex::new(SlidingWindowThrottle::per_minute(
            config.max_requests_per_minute,
        ));
        Self { config, throttle }
    }

    fn extract_api_key(&self) -> Result<&str, ReportError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ReportError::Configuration {
                message: "AI API key is required".to_owned(),
            })
    }

    fn create_http_client(&self) -> Result<Client, ReportError> {
        Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|error| ReportError::Configuration {
                message: format!("failed to configure AI HTTP client: {error}"),
            })
    }

    fn acquire_slot(&self) {
        let mut throttle = self
            .throttle
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        throttle.acquire();
    }

    /// Runs one chat-completions call and returns the parsed JSON content
    /// of the assistant message.
    fn chat_json(&self, system_prompt: &str, user_prompt: String) -> Result<Value, ReportError> {
        let api_key = self.extract_api_key()?;
        self.acquire_slot();

        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatCompletionsRequest {
            model: self.config.model.as_str(),
            messages: vec![
                ChatCompletionsMessage {
                    role: "system",
                    content: format!("{system_prompt}{NO_LINKS_RULES}"),
                },
                ChatCompletionsMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let client = self.create_http_client()?;
        let response = client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .map_err(|error| ReportError::Network {
                message: format!("AI request transport failed: {error}"),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(ReportError::Api {
                message: format!("AI request failed with status {}: {body}", status.as_u16()),
            });
        }

        let response_payload: ChatCompletionsResponse =
            response.json().map_err(|error| ReportError::Api {
                message: format!("AI response JSON decoding failed: {error}"),
            })?;

        let content = response_payload
            .choices
            .first()
            .and_then(|choice| parse_content_value(&choice.message.content))
            .ok_or_else(|| ReportError::Api {
                message: "AI response did not contain assistant text".to_owned(),
            })?;

        serde_json::from_str(content).map_err(|error| ReportError::Api {
            message: format!("AI response content was not valid JSON: {error}"),
        })
    }
}

impl PullRequestScoreService for OpenAiScoreService {
    fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }

    fn score_pull_request(&self, context: &str) -> Result<PrScorePayload, ReportError> {
        let user_prompt = format!(
            "Analyse the following pull request, focusing on its value, its \
             importance, and whether its scope of impact is reasonable:\n\n\
             {context}\n\n\
             Return JSON containing every score field (0-10) and a detailed \
             `comment`. The comment must be split into paragraphs covering \
             core value, key strengths, suggested improvements, and an \
             overall assessment, within 200-300 words. If this is a WIP pull \
             request, score its expected value; do not mark it down for \
             being unfinished.\n\n\
             Never use link or reference syntax; mention items as plain text \
             such as `Issue-123` or `PR-123`."
        );
        let value = self.chat_json(SCORE_SYSTEM_PROMPT, user_prompt)?;
        Ok(PrScorePayload {
            scores: DimensionScores::from_response(&value),
            comment: extract_summary_text(&value, &["comment"]),
        })
    }

    fn summarize_issue(&self, context: &str) -> Result<String, ReportError> {
        let user_prompt = format!(
            "Extract the core problem from the following issue, discarding \
             template boilerplate:\n\n{context}\n\n\
             Return JSON with a `summary` field (the core problem in at most \
             150 words, free of template text).\n\n\
             Never use link or reference syntax; mention items as plain text \
             such as `Issue-123` or `PR-123`."
        );
        let value = self.chat_json(ISSUE_SYSTEM_PROMPT, user_prompt)?;
        Ok(extract_summary_text(&value, &["summary", "comment"]))
    }

    fn summarize_discussion(&self, context: &str) -> Result<String, ReportError> {
        let user_prompt = format!(
            "Summarise the core content of the following discussion:\n\n\
             {context}\n\n\
             Return JSON with a `summary` field (at most 100 words).\n\n\
             Never use link or reference syntax; mention items as plain text \
             such as `Issue-123` or `PR-123`."
        );
        let value = self.chat_json(DISCUSSION_SYSTEM_PROMPT, user_prompt)?;
        Ok(extract_summary_text(&value, &["summary", "comment"]))
    }
}

/// Returns the first non-empty string among the named fields.
fn extract_summary_text(value: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_owned()
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionsMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, serde::Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, serde::Deserialize)]
struct ChatContentPart {
    text: Option<String>,
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoiceMessage {
    content: ChatContent,
}

fn parse_content_value(content: &ChatContent) -> Option<&str> {
    match content {
        ChatContent::Text(text) => Some(text.as_str()),
        ChatContent::Parts(parts) => parts
            .iter()
            .find_map(|part| part.text.as_deref().or(part.content.as_deref())),
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
