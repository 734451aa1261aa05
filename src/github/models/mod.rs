//! Data models for the issues, pull requests, and discussions a report
//! run consumes.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into the public domain types. The domain types keep explicit
//! `Option` semantics for fields the API may omit; numeric defaults are
//! applied where the reporting pipeline treats absent and zero alike.

use serde::Deserialize;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// An issue as listed by the repository feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIssue {
    /// Issue number.
    pub number: u64,
    /// Title of the issue.
    pub title: Option<String>,
    /// Body text, if any.
    pub body: Option<String>,
    /// State (e.g. open, closed).
    pub state: Option<String>,
    /// Label names in API order.
    pub labels: Vec<String>,
    /// Creation timestamp (ISO 8601 format).
    pub created_at: Option<String>,
    /// Last update timestamp (ISO 8601 format).
    pub updated_at: Option<String>,
    /// Close timestamp, when the issue is closed.
    pub closed_at: Option<String>,
    /// Author login if present.
    pub author: Option<String>,
    /// Assignee logins.
    pub assignees: Vec<String>,
    /// Comment count.
    pub comments: u64,
}

/// A pull request as listed or detailed by the repository feed.
///
/// The listing endpoint omits the change statistics and file list; those
/// fields stay at their defaults until [`pull_request_detail`] fills them.
///
/// [`pull_request_detail`]: crate::github::RepositoryFeed::pull_request_detail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPullRequest {
    /// Pull request number.
    pub number: u64,
    /// Title of the pull request.
    pub title: Option<String>,
    /// Body text, if any.
    pub body: Option<String>,
    /// State (e.g. open, closed).
    pub state: Option<String>,
    /// Label names in API order.
    pub labels: Vec<String>,
    /// Creation timestamp (ISO 8601 format).
    pub created_at: Option<String>,
    /// Last update timestamp (ISO 8601 format).
    pub updated_at: Option<String>,
    /// Merge timestamp, when merged.
    pub merged_at: Option<String>,
    /// Author login if present.
    pub author: Option<String>,
    /// Added line count.
    pub additions: u64,
    /// Deleted line count.
    pub deletions: u64,
    /// Changed file count.
    pub changed_files: u64,
    /// Commit count.
    pub commits: u64,
    /// Issue comment count.
    pub comments: u64,
    /// Review comment count.
    pub review_comments: u64,
    /// Changed files, present only on detail responses.
    pub files: Vec<PullRequestFile>,
}

/// Change status of a file within a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileStatus {
    /// File was added by the pull request.
    Added,
    /// File was removed by the pull request.
    Removed,
    /// File was modified (or renamed/copied, which the report treats the
    /// same way).
    #[default]
    Modified,
}

/// A single changed file within a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestFile {
    /// Path of the file within the repository.
    pub filename: String,
    /// Change status reported by the API.
    pub status: FileStatus,
    /// Added line count for this file.
    pub additions: u64,
    /// Deleted line count for this file.
    pub deletions: u64,
}

/// A discussion as returned by the GraphQL feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDiscussion {
    /// Discussion number.
    pub number: u64,
    /// Title of the discussion.
    pub title: Option<String>,
    /// Body text, if any.
    pub body: Option<String>,
    /// Normalised state: `open` or `closed`.
    pub state: Option<String>,
    /// Label names in API order.
    pub labels: Vec<String>,
    /// Creation timestamp (ISO 8601 format).
    pub created_at: Option<String>,
    /// Last update timestamp (ISO 8601 format).
    pub updated_at: Option<String>,
    /// Author login if present.
    pub author: Option<String>,
    /// Comment count.
    pub comments: u64,
    /// Discussion category name; empty when the API omits it.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiLabel {
    pub(super) name: Option<String>,
}

/// Issue listing payload. The `/issues` endpoint also returns pull
/// requests; those carry a `pull_request` key and are filtered out by the
/// gateway.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiIssue {
    pub(super) number: u64,
    pub(super) title: Option<String>,
    pub(super) body: Option<String>,
    pub(super) state: Option<String>,
    #[serde(default)]
    pub(super) labels: Vec<ApiLabel>,
    pub(super) created_at: Option<String>,
    pub(super) updated_at: Option<String>,
    pub(super) closed_at: Option<String>,
    pub(super) user: Option<ApiUser>,
    #[serde(default)]
    pub(super) assignees: Vec<ApiUser>,
    #[serde(default)]
    pub(super) comments: u64,
    pub(super) pull_request: Option<serde_json::Value>,
}

impl ApiIssue {
    pub(super) const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    pub(super) title: Option<String>,
    pub(super) body: Option<String>,
    pub(super) state: Option<String>,
    #[serde(default)]
    pub(super) labels: Vec<ApiLabel>,
    pub(super) created_at: Option<String>,
    pub(super) updated_at: Option<String>,
    pub(super) merged_at: Option<String>,
    pub(super) user: Option<ApiUser>,
    #[serde(default)]
    pub(super) additions: u64,
    #[serde(default)]
    pub(super) deletions: u64,
    #[serde(default)]
    pub(super) changed_files: u64,
    #[serde(default)]
    pub(super) commits: u64,
    #[serde(default)]
    pub(super) comments: u64,
    #[serde(default)]
    pub(super) review_comments: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequestFile {
    pub(super) filename: Option<String>,
    pub(super) status: Option<String>,
    #[serde(default)]
    pub(super) additions: u64,
    #[serde(default)]
    pub(super) deletions: u64,
}

fn label_names(labels: Vec<ApiLabel>) -> Vec<String> {
    labels
        .into_iter()
        .filter_map(|label| label.name)
        .collect()
}

impl From<ApiIssue> for RawIssue {
    fn from(value: ApiIssue) -> Self {
        Self {
            number: value.number,
            title: value.title,
            body: value.body,
            state: value.state,
            labels: label_names(value.labels),
            created_at: value.created_at,
            updated_at: value.updated_at,
            closed_at: value.closed_at,
            author: value.user.and_then(|user| user.login),
            assignees: value
                .assignees
                .into_iter()
                .filter_map(|user| user.login)
                .collect(),
            comments: value.comments,
        }
    }
}

impl From<ApiPullRequest> for RawPullRequest {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            number: value.number,
            title: value.title,
            body: value.body,
            state: value.state,
            labels: label_names(value.labels),
            created_at: value.created_at,
            updated_at: value.updated_at,
            merged_at: value.merged_at,
            author: value.user.and_then(|user| user.login),
            additions: value.additions,
            deletions: value.deletions,
            changed_files: value.changed_files,
            commits: value.commits,
            comments: value.comments,
            review_comments: value.review_comments,
            files: Vec::new(),
        }
    }
}

impl From<ApiPullRequestFile> for PullRequestFile {
    fn from(value: ApiPullRequestFile) -> Self {
        let status = match value.status.as_deref() {
            Some("added") => FileStatus::Added,
            Some("removed") => FileStatus::Removed,
            _ => FileStatus::Modified,
        };
        Self {
            filename: value.filename.unwrap_or_default(),
            status,
            additions: value.additions,
            deletions: value.deletions,
        }
    }
}
