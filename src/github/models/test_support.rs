//! Test helpers for constructing raw record fixtures.
//!
//! These builders reduce boilerplate when tests need issues, pull
//! requests, or discussions with only a few fields of interest set.

use super::{RawDiscussion, RawIssue, RawPullRequest};

/// Constructs a minimal open issue with a number, title, and body.
#[must_use]
pub fn minimal_issue(number: u64, title: &str, body: &str) -> RawIssue {
    RawIssue {
        number,
        title: Some(title.to_owned()),
        body: Some(body.to_owned()),
        state: Some("open".to_owned()),
        author: Some("alice".to_owned()),
        ..Default::default()
    }
}

/// Constructs an issue with explicit created/updated timestamps.
#[must_use]
pub fn issue_with_timestamps(number: u64, created_at: &str, updated_at: &str) -> RawIssue {
    RawIssue {
        created_at: Some(created_at.to_owned()),
        updated_at: Some(updated_at.to_owned()),
        ..minimal_issue(number, &format!("Issue {number}"), "")
    }
}

/// Constructs a minimal open pull request with change statistics.
#[must_use]
pub fn minimal_pull_request(number: u64, title: &str, additions: u64, deletions: u64) -> RawPullRequest {
    RawPullRequest {
        number,
        title: Some(title.to_owned()),
        state: Some("open".to_owned()),
        author: Some("alice".to_owned()),
        additions,
        deletions,
        ..Default::default()
    }
}

/// Constructs a minimal open discussion.
#[must_use]
pub fn minimal_discussion(number: u64, title: &str, body: &str) -> RawDiscussion {
    RawDiscussion {
        number,
        title: Some(title.to_owned()),
        body: Some(body.to_owned()),
        state: Some("open".to_owned()),
        author: Some("alice".to_owned()),
        category: Some("General".to_owned()),
        ..Default::default()
    }
}
