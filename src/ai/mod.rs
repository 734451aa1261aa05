//! External scorer capability: service contract, outcome types, and
//! graceful-fallback helpers.
//!
//! Every scorer interaction degrades instead of failing: missing
//! credentials or a failed call produce a tagged placeholder outcome, so
//! the analysis pipeline always completes with at worst a less-rich
//! result.

mod openai;
mod throttle;

pub use openai::{OpenAiScoreConfig, OpenAiScoreService};
pub use throttle::{SlidingWindowThrottle, SystemTimeSource, TimeSource};

use serde_json::Value;

use crate::github::error::ReportError;

/// The six quality/value dimensions supplied by the external scorer, each
/// on a 0-10 scale.
///
/// Dimension values are untrusted external input: missing or non-numeric
/// entries default to 0 rather than failing the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionScores {
    /// Code style, readability, design.
    pub code_quality: i64,
    /// Unit/integration/edge-case coverage.
    pub test_coverage: i64,
    /// Comments, documentation updates, maintainability.
    pub doc_maintain: i64,
    /// Vulnerabilities, compliance, dependency safety.
    pub compliance_security: i64,
    /// Whether the blast radius matches the change's importance.
    pub merge_history: i64,
    /// Core value and importance of the change.
    pub collaboration: i64,
}

impl DimensionScores {
    /// All-zero scores, used for degraded outcomes.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            code_quality: 0,
            test_coverage: 0,
            doc_maintain: 0,
            compliance_security: 0,
            merge_history: 0,
            collaboration: 0,
        }
    }

    /// Extracts scores from a scorer response object, defaulting every
    /// missing or non-numeric dimension to 0.
    #[must_use]
    pub fn from_response(value: &Value) -> Self {
        let score = |key: &str| {
            value.get(key).map_or(0, |entry| {
                entry
                    .as_i64()
                    .or_else(|| entry.as_f64().map(|float| float as i64))
                    .unwrap_or(0)
            })
        };
        Self {
            code_quality: score("code_quality_score"),
            test_coverage: score("test_coverage_score"),
            doc_maintain: score("doc_maintain_score"),
            compliance_security: score("compliance_security_score"),
            merge_history: score("merge_history_score"),
            collaboration: score("collaboration_score"),
        }
    }
}

/// Successful scorer response for a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrScorePayload {
    /// The six dimension scores.
    pub scores: DimensionScores,
    /// Free-text review comment.
    pub comment: String,
}

/// Outcome of scoring one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// The scorer returned dimension scores and a comment.
    Scored(PrScorePayload),
    /// The scorer was unavailable; scores default to zero.
    Degraded {
        /// Human-readable cause, carried as data rather than an error.
        reason: String,
    },
}

impl ScoreOutcome {
    /// Dimension scores, zeroed for degraded outcomes.
    #[must_use]
    pub const fn scores(&self) -> DimensionScores {
        match self {
            Self::Scored(payload) => payload.scores,
            Self::Degraded { .. } => DimensionScores::zeroed(),
        }
    }

    /// The review comment, when one was generated.
    #[must_use]
    pub fn advice(&self) -> Option<&str> {
        match self {
            Self::Scored(payload) => Some(payload.comment.as_str()),
            Self::Degraded { .. } => None,
        }
    }
}

/// Outcome of asking the scorer for a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The scorer produced a non-empty summary.
    Generated(String),
    /// The scorer was unavailable or returned nothing usable.
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

impl SummaryOutcome {
    /// The generated text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Generated(text) => Some(text.as_str()),
            Self::Unavailable { .. } => None,
        }
    }
}

/// External scorer contract.
///
/// Implementations are expected to be expensive and rate-limited; callers
/// go through the `*_with_fallback` helpers so failures degrade into
/// placeholder outcomes.
pub trait PullRequestScoreService: Send + Sync + std::fmt::Debug {
    /// True when credentials are present and a real call can be made.
    fn is_configured(&self) -> bool;

    /// Scores a pull request from its context document.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the provider call fails.
    fn score_pull_request(&self, context: &str) -> Result<PrScorePayload, ReportError>;

    /// Summarises an issue from its context document.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the provider call fails.
    fn summarize_issue(&self, context: &str) -> Result<String, ReportError>;

    /// Summarises a discussion from its context document.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the provider call fails.
    fn summarize_discussion(&self, context: &str) -> Result<String, ReportError>;
}

const UNCONFIGURED_REASON: &str = "AI API key not configured; the model was not called";

/// Scores a pull request while guaranteeing a graceful outcome.
#[must_use]
pub fn score_with_fallback(service: &dyn PullRequestScoreService, context: &str) -> ScoreOutcome {
    if !service.is_configured() {
        return ScoreOutcome::Degraded {
            reason: UNCONFIGURED_REASON.to_owned(),
        };
    }
    match service.score_pull_request(context) {
        Ok(payload) => ScoreOutcome::Scored(payload),
        Err(error) => ScoreOutcome::Degraded {
            reason: format!("AI scoring failed: {error}"),
        },
    }
}

/// Summarises an issue while guaranteeing a graceful outcome.
#[must_use]
pub fn summarize_issue_with_fallback(
    service: &dyn PullRequestScoreService,
    context: &str,
) -> SummaryOutcome {
    summary_outcome(service.is_configured(), || service.summarize_issue(context))
}

/// Summarises a discussion while guaranteeing a graceful outcome.
#[must_use]
pub fn summarize_discussion_with_fallback(
    service: &dyn PullRequestScoreService,
    context: &str,
) -> SummaryOutcome {
    summary_outcome(service.is_configured(), || {
        service.summarize_discussion(context)
    })
}

fn summary_outcome(
    configured: bool,
    call: impl FnOnce() -> Result<String, ReportError>,
) -> SummaryOutcome {
    if !configured {
        return SummaryOutcome::Unavailable {
            reason: UNCONFIGURED_REASON.to_owned(),
        };
    }
    match call() {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                SummaryOutcome::Unavailable {
                    reason: "AI summary was empty".to_owned(),
                }
            } else {
                SummaryOutcome::Generated(trimmed.to_owned())
            }
        }
        Err(error) => SummaryOutcome::Unavailable {
            reason: format!("AI summary failed: {error}"),
        },
    }
}
