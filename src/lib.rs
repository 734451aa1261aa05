//! Herald library crate providing repository activity analysis and
//! report generation.
//!
//! Herald pulls issues, pull requests, and discussions from a source
//! repository, classifies and scores them with rule-based heuristics
//! blended with an optional external scoring model, and renders a
//! Markdown report, optionally publishing a condensed summary as an
//! issue in a target repository.

pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod github;
pub mod report;

pub use config::HeraldConfig;
pub use github::{
    AccessToken, OctocrabFeedGateway, OctocrabIssuePublisher, RawDiscussion, RawIssue,
    RawPullRequest, ReportError, RepositoryLocator,
};
