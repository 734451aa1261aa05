//! Octocrab client construction helpers for gateway implementations.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::ReportError;
use crate::github::locator::{AccessToken, RepositoryLocator};

use super::error_mapping::map_octocrab_error;

/// Builds an Octocrab client for the given repository, optionally
/// authenticated.
///
/// Reads of public repositories work without a token; discussions and
/// issue creation require one, which the callers enforce.
///
/// # Errors
///
/// Returns `ReportError::InvalidUrl` when the base URI cannot be parsed or
/// `ReportError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: Option<&AccessToken>,
    locator: &RepositoryLocator,
) -> Result<Octocrab, ReportError> {
    let base_uri: Uri = locator
        .api_base()
        .as_str()
        .parse::<Uri>()
        .map_err(|error| ReportError::InvalidUrl(error.to_string()))?;

    let mut builder = Octocrab::builder();
    if let Some(token) = token {
        builder = builder.personal_token(token.as_ref());
    }

    builder
        .base_uri(base_uri)
        .map_err(|error| ReportError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
