//! GitHub access layer: locators, domain models, and Octocrab gateways.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use error::ReportError;
pub use gateway::{IssuePublisher, OctocrabFeedGateway, OctocrabIssuePublisher, RepositoryFeed};
pub use locator::{AccessToken, RepositoryLocator, RepositoryName, RepositoryOwner};
pub use models::{FileStatus, PullRequestFile, RawDiscussion, RawIssue, RawPullRequest};
