//! Assembly of per-record analysis results.
//!
//! The assembler runs the classifiers and scoring functions over raw
//! records, folds in external scorer outcomes, and produces immutable
//! analysis records for the renderers. External enhancement is always
//! best-effort: a degraded scorer only makes the output less rich, never
//! absent.

use std::collections::HashMap;

use crate::ai::{
    DimensionScores, PullRequestScoreService, ScoreOutcome, SummaryOutcome,
    summarize_discussion_with_fallback, summarize_issue_with_fallback,
};
use crate::github::models::{RawDiscussion, RawIssue, RawPullRequest};

use super::classify::{IssueCategory, PrType, classify_issue_category, detect_pr_type};
use super::scoring::{
    Priority, Rating, SizeCategory, composite_score, priority_for, rating_for,
    size_category_and_score, type_score,
};
use super::summary::{clip, summarize};
use super::window::Windowed;

const SUMMARY_MAX_CHARS: usize = 200;
const AI_ISSUE_SUMMARY_MAX_CHARS: usize = 200;
const AI_ISSUE_CONTEXT_BODY_CHARS: usize = 800;
const AI_DISCUSSION_SUMMARY_MAX_CHARS: usize = 300;
const AI_DISCUSSION_CONTEXT_BODY_CHARS: usize = 500;
const REVIEW_COMMENT_MAX_CHARS: usize = 500;

/// The external reviewer's verdict attached to a pull request analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommentary {
    /// The reviewer produced advice text.
    Advice(String),
    /// The reviewer was unavailable.
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

impl ReviewCommentary {
    /// The advice text, when the reviewer produced one.
    #[must_use]
    pub fn advice(&self) -> Option<&str> {
        match self {
            Self::Advice(text) => Some(text.as_str()),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Analysis result for one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueAnalysis {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue state.
    pub state: String,
    /// Label names.
    pub labels: Vec<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Close timestamp, when closed.
    pub closed_at: Option<String>,
    /// Author login.
    pub author: String,
    /// Assignee logins.
    pub assignees: Vec<String>,
    /// Comment count.
    pub comments: u64,
    /// Classified category.
    pub category: IssueCategory,
    /// One-line summary.
    pub summary: String,
    /// Whether the issue was created inside the report window.
    pub created_in_period: bool,
}

/// Analysis result for one discussion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionAnalysis {
    /// Discussion number.
    pub number: u64,
    /// Discussion title.
    pub title: String,
    /// Discussion state.
    pub state: String,
    /// Label names.
    pub labels: Vec<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last-update timestamp.
    pub updated_at: String,
    /// Author login.
    pub author: String,
    /// Comment count.
    pub comments: u64,
    /// Discussion category name.
    pub category: String,
    /// One-line heuristic summary.
    pub summary: String,
    /// AI-generated explanation, when the scorer produced one.
    pub ai_summary: Option<String>,
    /// Whether the discussion was created inside the report window.
    pub created_in_period: bool,
}

/// Analysis result for one pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct PrAnalysis {
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Pull request state.
    pub state: String,
    /// Label names.
    pub labels: Vec<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Merge timestamp, when merged.
    pub merged_at: Option<String>,
    /// Author login.
    pub author: String,
    /// Changed file count.
    pub changed_files: u64,
    /// Added line count.
    pub additions: u64,
    /// Deleted line count.
    pub deletions: u64,
    /// Commit count.
    pub commits: u64,
    /// Detected type.
    pub pr_type: PrType,
    /// Size bucket.
    pub size_category: SizeCategory,
    /// Review priority.
    pub priority: Priority,
    /// Heuristic type score.
    pub type_score: u8,
    /// Heuristic size score.
    pub size_score: u8,
    /// Externally supplied dimension scores (zeroed when degraded).
    pub scores: DimensionScores,
    /// Weighted composite score on a 0-100 scale.
    pub total_score: f64,
    /// Rating band for the composite score.
    pub rating: Rating,
    /// External reviewer commentary.
    pub commentary: ReviewCommentary,
    /// Whether the pull request was created inside the report window.
    pub created_in_period: bool,
}

/// Analyses issues, enhancing summaries through the scorer when one is
/// available. Scorer failures silently keep the heuristic summary.
#[must_use]
pub fn analyze_issues(
    issues: Vec<Windowed<RawIssue>>,
    scorer: Option<&dyn PullRequestScoreService>,
) -> Vec<IssueAnalysis> {
    issues
        .into_iter()
        .map(|windowed| {
            let issue = windowed.record;
            let title = issue.title.clone().unwrap_or_default();
            let body = issue.body.clone().unwrap_or_default();
            let category = classify_issue_category(&title, &body, &issue.labels);

            let mut summary = summarize(&title, &body, SUMMARY_MAX_CHARS);
            if let Some(scorer) = scorer {
                let context = format!(
                    "Title: {title}\nBody: {}",
                    clip(&body, AI_ISSUE_CONTEXT_BODY_CHARS)
                );
                if let SummaryOutcome::Generated(text) =
                    summarize_issue_with_fallback(scorer, &context)
                {
                    summary = clip(&text, AI_ISSUE_SUMMARY_MAX_CHARS);
                }
            }

            IssueAnalysis {
                number: issue.number,
                title,
                state: issue.state.unwrap_or_default(),
                labels: issue.labels,
                created_at: issue.created_at.unwrap_or_default(),
                closed_at: issue.closed_at,
                author: issue.author.unwrap_or_default(),
                assignees: issue.assignees,
                comments: issue.comments,
                category,
                summary,
                created_in_period: windowed.created_in_period,
            }
        })
        .collect()
}

/// Analyses discussions, attaching an AI explanation when the scorer
/// produces one.
#[must_use]
pub fn analyze_discussions(
    discussions: Vec<Windowed<RawDiscussion>>,
    scorer: Option<&dyn PullRequestScoreService>,
) -> Vec<DiscussionAnalysis> {
    discussions
        .into_iter()
        .map(|windowed| {
            let discussion = windowed.record;
            let title = discussion.title.clone().unwrap_or_default();
            let body = discussion.body.clone().unwrap_or_default();
            let category = discussion
                .category
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "general".to_owned());
            let summary = summarize(&title, &body, SUMMARY_MAX_CHARS);

            let ai_summary = scorer.and_then(|scorer| {
                let context = format!(
                    "Title: {title}\nBody: {}",
                    clip(&body, AI_DISCUSSION_CONTEXT_BODY_CHARS)
                );
                match summarize_discussion_with_fallback(scorer, &context) {
                    SummaryOutcome::Generated(text) => {
                        Some(clip(&text, AI_DISCUSSION_SUMMARY_MAX_CHARS))
                    }
                    SummaryOutcome::Unavailable { .. } => None,
                }
            });

            DiscussionAnalysis {
                number: discussion.number,
                title,
                state: discussion.state.unwrap_or_else(|| "open".to_owned()),
                labels: discussion.labels,
                created_at: discussion.created_at.unwrap_or_default(),
                updated_at: discussion.updated_at.unwrap_or_default(),
                author: discussion.author.unwrap_or_default(),
                comments: discussion.comments,
                category,
                summary,
                ai_summary,
                created_in_period: windowed.created_in_period,
            }
        })
        .collect()
}

/// Analyses detailed pull requests against previously collected scorer
/// outcomes, keyed by pull request number.
#[must_use]
pub fn analyze_pull_requests(
    details: Vec<RawPullRequest>,
    score_results: &HashMap<u64, ScoreOutcome>,
) -> Vec<PrAnalysis> {
    details
        .into_iter()
        .map(|pull_request| {
            let title = pull_request.title.clone().unwrap_or_default();
            let body = pull_request.body.clone().unwrap_or_default();
            let pr_type = detect_pr_type(&title, &body, &pull_request.labels);
            let type_score = type_score(pr_type);
            let (size_category, size_score) =
                size_category_and_score(pull_request.additions, pull_request.deletions);
            let priority = priority_for(pr_type);

            let outcome = score_results
                .get(&pull_request.number)
                .cloned()
                .unwrap_or_else(|| ScoreOutcome::Degraded {
                    reason: "no score result was recorded for this pull request".to_owned(),
                });
            let scores = outcome.scores();
            let commentary = match outcome {
                ScoreOutcome::Scored(payload) => {
                    ReviewCommentary::Advice(clip(&payload.comment, REVIEW_COMMENT_MAX_CHARS))
                }
                ScoreOutcome::Degraded { reason } => ReviewCommentary::Unavailable { reason },
            };

            let total_score = composite_score(
                type_score,
                size_score,
                scores.code_quality,
                scores.test_coverage,
                scores.doc_maintain,
                scores.compliance_security,
                scores.merge_history,
                scores.collaboration,
            );

            PrAnalysis {
                number: pull_request.number,
                title,
                state: pull_request.state.unwrap_or_default(),
                labels: pull_request.labels,
                created_at: pull_request.created_at.unwrap_or_default(),
                merged_at: pull_request.merged_at,
                author: pull_request.author.unwrap_or_default(),
                changed_files: pull_request.changed_files,
                additions: pull_request.additions,
                deletions: pull_request.deletions,
                commits: pull_request.commits,
                pr_type,
                size_category,
                priority,
                type_score,
                size_score,
                scores,
                total_score,
                rating: rating_for(total_score),
                commentary,
                created_in_period: true,
            }
        })
        .collect()
}
