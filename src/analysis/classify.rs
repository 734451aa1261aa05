//! Rule-based text classifiers for issues and pull requests.
//!
//! Classification stays cheap, deterministic, and explainable: plain
//! case-insensitive substring checks over titles, bodies, and label names,
//! evaluated as a first-match-wins cascade. The buckets only need to be
//! good enough to drive scoring weights and report grouping.

/// Category assigned to an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCategory {
    /// Something is broken.
    Bug,
    /// A request for new behaviour.
    FeatureRequest,
    /// A usage question or call for help.
    Question,
    /// Everything else.
    Other,
}

impl IssueCategory {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::FeatureRequest => "feature request",
            Self::Question => "question",
            Self::Other => "other",
        }
    }
}

/// Conventional-commit style type assigned to a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrType {
    /// New functionality.
    Feat,
    /// Bug fix.
    Fix,
    /// Refactoring or optimisation.
    Opt,
    /// Test-only change.
    Test,
    /// Documentation change.
    Docs,
    /// Anything that matches none of the above.
    Other,
}

impl PrType {
    /// Label used in reports and scoring hints.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Opt => "opt",
            Self::Test => "test",
            Self::Docs => "docs",
            Self::Other => "other",
        }
    }
}

fn lowered_text_and_labels(title: &str, body: &str, labels: &[String]) -> (String, String) {
    let text = format!("{title}\n{body}").to_lowercase();
    let label_text = labels.join(" ").to_lowercase();
    (text, label_text)
}

/// Buckets an issue by its title, body, and labels.
///
/// The cascade checks bug signals first, then feature signals, then
/// question signals; the first match wins.
#[must_use]
pub fn classify_issue_category(title: &str, body: &str, labels: &[String]) -> IssueCategory {
    let (text, label_text) = lowered_text_and_labels(title, body, labels);

    if label_text.contains("bug")
        || text.contains("bug")
        || text.contains("error")
        || text.contains("fix")
    {
        return IssueCategory::Bug;
    }
    if label_text.contains("feature")
        || label_text.contains("enhancement")
        || text.contains("feat")
        || text.contains("request")
    {
        return IssueCategory::FeatureRequest;
    }
    if label_text.contains("question") || text.contains("how to") || label_text.contains("help") {
        return IssueCategory::Question;
    }
    IssueCategory::Other
}

/// Detects the pull request type from its title, body, and labels.
#[must_use]
pub fn detect_pr_type(title: &str, body: &str, labels: &[String]) -> PrType {
    let (text, label_text) = lowered_text_and_labels(title, body, labels);

    if text.contains("feat") || text.contains("feature") || label_text.contains("enhancement") {
        return PrType::Feat;
    }
    if text.contains("fix") || label_text.contains("bug") {
        return PrType::Fix;
    }
    if text.contains("refactor") || text.contains("opt") || text.contains("optimization") {
        return PrType::Opt;
    }
    if label_text.contains("test") || text.contains("test") {
        return PrType::Test;
    }
    if label_text.contains("doc") || text.contains("docs") {
        return PrType::Docs;
    }
    PrType::Other
}

/// Detects a work-in-progress marker on a pull request.
#[must_use]
pub fn detect_wip(title: &str, body: &str, labels: &[String]) -> bool {
    let (text, label_text) = lowered_text_and_labels(title, body, labels);
    text.contains("wip")
        || label_text.contains("wip")
        || title.trim_start().starts_with("WIP")
        || title.trim_start().starts_with("[WIP]")
}
