//! Octocrab implementation of the target-repository issue publisher.

use std::collections::BTreeSet;

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::github::error::ReportError;
use crate::github::locator::{AccessToken, RepositoryLocator};

use super::IssuePublisher;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error;

#[derive(Debug, Serialize)]
struct CreateIssueBody<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    labels: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct AddLabelsBody {
    labels: Vec<String>,
}

/// Octocrab-backed issue publisher.
pub struct OctocrabIssuePublisher {
    client: Octocrab,
}

impl OctocrabIssuePublisher {
    /// Builds a publisher for the given repository. Issue creation always
    /// requires a token.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidUrl` when the base URI cannot be parsed
    /// or `ReportError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &AccessToken,
        locator: &RepositoryLocator,
    ) -> Result<Self, ReportError> {
        let client = build_octocrab_client(Some(token), locator)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl IssuePublisher for OctocrabIssuePublisher {
    async fn create_issue(
        &self,
        locator: &RepositoryLocator,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, ReportError> {
        let valid_labels: Vec<&str> = labels
            .iter()
            .map(String::as_str)
            .filter(|label| !label.is_empty())
            .collect();

        let payload = CreateIssueBody {
            title,
            body,
            labels: valid_labels.clone(),
        };
        let created: Value = self
            .client
            .post(locator.issues_path(), Some(&payload))
            .await
            .map_err(|error| map_octocrab_error("create issue", &error))?;

        let number = created
            .pointer("/number")
            .and_then(Value::as_u64)
            .ok_or_else(|| ReportError::Api {
                message: "issue creation response did not include a number".to_owned(),
            })?;

        // Labels occasionally fail to apply on creation; backfill whatever
        // is missing so the report issue stays discoverable by label.
        let applied: BTreeSet<&str> = created
            .pointer("/labels")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|label| label.pointer("/name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        let missing: Vec<String> = valid_labels
            .iter()
            .filter(|label| !applied.contains(**label))
            .map(|label| (*label).to_owned())
            .collect();

        if !missing.is_empty() {
            let backfill = AddLabelsBody { labels: missing };
            let outcome: Result<Value, _> = self
                .client
                .post(locator.issue_labels_path(number), Some(&backfill))
                .await;
            if let Err(error) = outcome {
                warn!(%number, %error, "issue created but labels could not be applied");
            }
        }

        Ok(number)
    }
}
