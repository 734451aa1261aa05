//! Octocrab implementation of the repository feed.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Serialize;

use crate::github::error::ReportError;
use crate::github::locator::{AccessToken, RepositoryLocator};
use crate::github::models::{
    ApiIssue, ApiPullRequest, ApiPullRequestFile, RawDiscussion, RawIssue, RawPullRequest,
};

use super::RepositoryFeed;
use super::client::build_octocrab_client;
use super::discussions::fetch_discussions;
use super::error_mapping::map_octocrab_error;

/// Listing endpoints return at most this many records per page.
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Serialize)]
struct ListParams<'a> {
    state: &'a str,
    per_page: usize,
    page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<&'a str>,
}

/// Octocrab-backed feed gateway.
pub struct OctocrabFeedGateway {
    client: Octocrab,
    has_token: bool,
}

impl OctocrabFeedGateway {
    /// Builds a feed gateway for the given repository.
    ///
    /// A token is optional for the REST listing endpoints; without one the
    /// discussion feed degrades to an empty list.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidUrl` when the base URI cannot be parsed
    /// or `ReportError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: Option<&AccessToken>,
        locator: &RepositoryLocator,
    ) -> Result<Self, ReportError> {
        let client = build_octocrab_client(token, locator)?;
        Ok(Self {
            client,
            has_token: token.is_some(),
        })
    }
}

#[async_trait]
impl RepositoryFeed for OctocrabFeedGateway {
    async fn list_issues<'a>(
        &self,
        locator: &RepositoryLocator,
        state: &str,
        since: Option<&'a str>,
        max_count: usize,
    ) -> Result<Vec<RawIssue>, ReportError> {
        let per_page = MAX_PER_PAGE.min(max_count);
        let mut collected: Vec<RawIssue> = Vec::new();
        let mut page = 1;

        while collected.len() < max_count {
            let params = ListParams {
                state,
                per_page,
                page,
                since,
            };
            let batch: Vec<ApiIssue> = self
                .client
                .get(locator.issues_path(), Some(&params))
                .await
                .map_err(|error| map_octocrab_error("list issues", &error))?;
            if batch.is_empty() {
                break;
            }

            let fetched = batch.len();
            collected.extend(
                batch
                    .into_iter()
                    .filter(|issue| !issue.is_pull_request())
                    .map(RawIssue::from)
                    .take(max_count - collected.len()),
            );
            if fetched < per_page {
                break;
            }
            page += 1;
        }

        Ok(collected)
    }

    async fn list_pull_requests(
        &self,
        locator: &RepositoryLocator,
        state: &str,
        max_count: usize,
    ) -> Result<Vec<RawPullRequest>, ReportError> {
        let per_page = MAX_PER_PAGE.min(max_count);
        let mut collected: Vec<RawPullRequest> = Vec::new();
        let mut page = 1;

        while collected.len() < max_count {
            let params = ListParams {
                state,
                per_page,
                page,
                since: None,
            };
            let batch: Vec<ApiPullRequest> = self
                .client
                .get(locator.pulls_path(), Some(&params))
                .await
                .map_err(|error| map_octocrab_error("list pull requests", &error))?;
            if batch.is_empty() {
                break;
            }

            let fetched = batch.len();
            collected.extend(
                batch
                    .into_iter()
                    .map(RawPullRequest::from)
                    .take(max_count - collected.len()),
            );
            if fetched < per_page {
                break;
            }
            page += 1;
        }

        Ok(collected)
    }

    async fn pull_request_detail(
        &self,
        locator: &RepositoryLocator,
        number: u64,
    ) -> Result<RawPullRequest, ReportError> {
        let detail: ApiPullRequest = self
            .client
            .get(locator.pull_detail_path(number), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("pull request detail", &error))?;
        let files: Vec<ApiPullRequestFile> = self
            .client
            .get(locator.pull_files_path(number), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("pull request files", &error))?;

        let mut pull_request = RawPullRequest::from(detail);
        pull_request.files = files.into_iter().map(Into::into).collect();
        Ok(pull_request)
    }

    async fn list_discussions<'a>(
        &self,
        locator: &RepositoryLocator,
        since: Option<&'a str>,
        max_count: usize,
    ) -> Result<Vec<RawDiscussion>, ReportError> {
        if !self.has_token {
            return Ok(Vec::new());
        }
        Ok(fetch_discussions(&self.client, locator, since, max_count).await)
    }
}
