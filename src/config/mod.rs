//! Application configuration loaded from CLI, environment, and files.
//!
//! Configuration merges command-line arguments, `HERALD_*` environment
//! variables, and a discovered `.herald.toml` file using ortho-config's
//! layered approach (defaults < file < environment < CLI).
//!
//! # Configuration File
//!
//! Place `.herald.toml` in the current directory, home directory, or XDG
//! config directory with:
//!
//! ```toml
//! source_owner = "apache"
//! source_repo = "answer"
//! target_owner = "octocat"
//! target_repo = "reports"
//! period = "day"
//! ai_base_url = "https://dashscope.aliyuncs.com/compatible-mode/v1"
//! ai_api_key = "${AI_API_KEY}"
//! create_issue = true
//! ```
//!
//! Token-like values support a `${ENV_VAR}` indirection so secrets can
//! stay out of the file.

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::analysis::window::PeriodKind;
use crate::github::error::ReportError;
use crate::github::locator::{AccessToken, RepositoryLocator};

/// Application configuration supporting CLI, environment, and file
/// sources.
///
/// # Environment Variables
///
/// Every field maps to a `HERALD_`-prefixed variable, e.g.
/// `HERALD_SOURCE_OWNER` or `HERALD_AI_API_KEY`. GitHub tokens
/// additionally fall back to the legacy `GITHUB_TOKEN` variable.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "HERALD",
    discovery(
        dotfile_name = ".herald.toml",
        config_file_name = "herald.toml",
        app_name = "herald"
    )
)]
pub struct HeraldConfig {
    /// Owner of the repository to analyse.
    #[ortho_config()]
    pub source_owner: Option<String>,

    /// Name of the repository to analyse.
    #[ortho_config()]
    pub source_repo: Option<String>,

    /// Token for reading the source repository. Optional for public
    /// repositories; required for discussions. Supports `${ENV_VAR}`.
    #[ortho_config()]
    pub source_token: Option<String>,

    /// Owner of the repository that receives the summary issue.
    #[ortho_config()]
    pub target_owner: Option<String>,

    /// Name of the repository that receives the summary issue.
    #[ortho_config()]
    pub target_repo: Option<String>,

    /// Token for creating the summary issue. Supports `${ENV_VAR}`.
    #[ortho_config()]
    pub target_token: Option<String>,

    /// Base URL of the OpenAI-compatible scoring service.
    #[ortho_config()]
    pub ai_base_url: Option<String>,

    /// API key for the scoring service; absent means no calls are made.
    /// Supports `${ENV_VAR}`.
    #[ortho_config()]
    pub ai_api_key: Option<String>,

    /// Model identifier for the scoring service.
    #[ortho_config()]
    pub ai_model: String,

    /// Scoring-service call budget per rolling minute.
    #[ortho_config()]
    pub ai_max_requests_per_minute: usize,

    /// Reporting period: `today`, `day`, or `week`.
    #[ortho_config()]
    pub period: String,

    /// Upper bound on issues fetched per run.
    #[ortho_config()]
    pub max_issue_count: usize,

    /// Upper bound on pull requests fetched per run.
    #[ortho_config()]
    pub max_pr_count: usize,

    /// Upper bound on discussions fetched per run.
    #[ortho_config()]
    pub max_discussion_count: usize,

    /// Directory the Markdown report file is written to.
    #[ortho_config()]
    pub report_dir: String,

    /// Whether to publish the summary issue to the target repository.
    #[ortho_config()]
    pub create_issue: bool,

    /// Labels applied to the published issue, in addition to the period
    /// label.
    #[ortho_config()]
    pub issue_labels: Vec<String>,

    /// Fixed UTC offset, in hours, of the report timezone. Anchors the
    /// `today` period's midnight and all displayed timestamps.
    #[ortho_config()]
    pub utc_offset_hours: i32,
}

const DEFAULT_AI_MODEL: &str = "qwen-plus";
const DEFAULT_AI_MAX_REQUESTS_PER_MINUTE: usize = 30;
const DEFAULT_PERIOD: &str = "day";
const DEFAULT_MAX_ISSUE_COUNT: usize = 300;
const DEFAULT_MAX_PR_COUNT: usize = 200;
const DEFAULT_MAX_DISCUSSION_COUNT: usize = 100;
const DEFAULT_REPORT_DIR: &str = "reports";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            source_owner: None,
            source_repo: None,
            source_token: None,
            target_owner: None,
            target_repo: None,
            target_token: None,
            ai_base_url: None,
            ai_api_key: None,
            ai_model: DEFAULT_AI_MODEL.to_owned(),
            ai_max_requests_per_minute: DEFAULT_AI_MAX_REQUESTS_PER_MINUTE,
            period: DEFAULT_PERIOD.to_owned(),
            max_issue_count: DEFAULT_MAX_ISSUE_COUNT,
            max_pr_count: DEFAULT_MAX_PR_COUNT,
            max_discussion_count: DEFAULT_MAX_DISCUSSION_COUNT,
            report_dir: DEFAULT_REPORT_DIR.to_owned(),
            create_issue: false,
            issue_labels: vec!["automated".to_owned(), "report".to_owned()],
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl HeraldConfig {
    /// Locator for the repository being analysed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] when owner or repo is
    /// missing.
    pub fn require_source(&self) -> Result<RepositoryLocator, ReportError> {
        require_repository(
            self.source_owner.as_deref(),
            self.source_repo.as_deref(),
            "source",
        )
    }

    /// Locator for the repository receiving the summary issue.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] when owner or repo is
    /// missing.
    pub fn require_target(&self) -> Result<RepositoryLocator, ReportError> {
        require_repository(
            self.target_owner.as_deref(),
            self.target_repo.as_deref(),
            "target",
        )
    }

    /// Parsed reporting period.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] for an unsupported value.
    pub fn period_kind(&self) -> Result<PeriodKind, ReportError> {
        PeriodKind::parse(&self.period)
    }

    /// Token for the source repository, when one resolves.
    #[must_use]
    pub fn source_access_token(&self) -> Option<AccessToken> {
        resolve_github_token(self.source_token.as_deref())
    }

    /// Token for the target repository, when one resolves.
    #[must_use]
    pub fn target_access_token(&self) -> Option<AccessToken> {
        resolve_github_token(self.target_token.as_deref())
    }

    /// API key for the scoring service, when one resolves.
    #[must_use]
    pub fn resolved_ai_api_key(&self) -> Option<String> {
        resolve_secret(self.ai_api_key.as_deref(), env_lookup)
    }
}

fn require_repository(
    owner: Option<&str>,
    repo: Option<&str>,
    role: &str,
) -> Result<RepositoryLocator, ReportError> {
    match (owner, repo) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            RepositoryLocator::new(owner, repo)
        }
        _ => Err(ReportError::Configuration {
            message: format!("{role} repository owner and name must be configured"),
        }),
    }
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn resolve_github_token(raw: Option<&str>) -> Option<AccessToken> {
    resolve_secret(raw, env_lookup)
        .or_else(|| env_lookup("GITHUB_TOKEN"))
        .and_then(|value| AccessToken::new(value).ok())
}

/// Resolves a secret value, expanding a `${ENV_VAR}` indirection through
/// the supplied lookup.
fn resolve_secret(raw: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(name) = raw.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        return lookup(name);
    }
    Some(raw.to_owned())
}

#[cfg(test)]
mod tests;
