//! Gateways for reading repository activity and publishing report issues
//! through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementations handle real HTTP requests.

mod client;
mod discussions;
mod error_mapping;
mod feed;
mod publisher;

pub use feed::OctocrabFeedGateway;
pub use publisher::OctocrabIssuePublisher;

use async_trait::async_trait;

use crate::github::error::ReportError;
use crate::github::locator::RepositoryLocator;
use crate::github::models::{RawDiscussion, RawIssue, RawPullRequest};

/// Source of the raw records a report run analyses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryFeed: Send + Sync {
    /// Lists issues, excluding pull requests, newest first.
    async fn list_issues<'a>(
        &self,
        locator: &RepositoryLocator,
        state: &str,
        since: Option<&'a str>,
        max_count: usize,
    ) -> Result<Vec<RawIssue>, ReportError>;

    /// Lists pull requests without change statistics.
    async fn list_pull_requests(
        &self,
        locator: &RepositoryLocator,
        state: &str,
        max_count: usize,
    ) -> Result<Vec<RawPullRequest>, ReportError>;

    /// Fetches one pull request with change statistics and its file list.
    async fn pull_request_detail(
        &self,
        locator: &RepositoryLocator,
        number: u64,
    ) -> Result<RawPullRequest, ReportError>;

    /// Lists discussions via the GraphQL API.
    ///
    /// Returns an empty list, not an error, when no token is configured or
    /// the repository denies access to discussions.
    async fn list_discussions<'a>(
        &self,
        locator: &RepositoryLocator,
        since: Option<&'a str>,
        max_count: usize,
    ) -> Result<Vec<RawDiscussion>, ReportError>;
}

/// Sink that can create the summary issue in the target repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssuePublisher: Send + Sync {
    /// Creates a new issue and returns its number.
    async fn create_issue(
        &self,
        locator: &RepositoryLocator,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, ReportError>;
}
