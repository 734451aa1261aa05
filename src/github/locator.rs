//! Identity wrappers locating the repositories a report run touches.

use url::Url;

use super::error::ReportError;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, ReportError> {
        if value.is_empty() {
            return Err(ReportError::MissingRepositorySegment);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, ReportError> {
        if value.is_empty() {
            return Err(ReportError::MissingRepositorySegment);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ReportError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ReportError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// A repository identity plus the API base it is reached through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Builds a locator for a repository on github.com.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::MissingRepositorySegment` when either segment is
    /// empty.
    pub fn new(owner: &str, repository: &str) -> Result<Self, ReportError> {
        let owner = RepositoryOwner::new(owner)?;
        let repository = RepositoryName::new(repository)?;
        let api_base = Url::parse(GITHUB_API_BASE)
            .map_err(|error| ReportError::InvalidUrl(error.to_string()))?;
        Ok(Self {
            api_base,
            owner,
            repository,
        })
    }

    /// API base URL for this repository's host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// `owner/name` form used in report headings and issue titles.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    /// REST path listing issues for this repository.
    #[must_use]
    pub fn issues_path(&self) -> String {
        format!(
            "/repos/{}/{}/issues",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// REST path listing pull requests for this repository.
    #[must_use]
    pub fn pulls_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// REST path for a single pull request.
    #[must_use]
    pub fn pull_detail_path(&self, number: u64) -> String {
        format!("{}/{number}", self.pulls_path())
    }

    /// REST path listing the changed files of a pull request.
    #[must_use]
    pub fn pull_files_path(&self, number: u64) -> String {
        format!("{}/{number}/files", self.pulls_path())
    }

    /// REST path for adding labels to an existing issue.
    #[must_use]
    pub fn issue_labels_path(&self, number: u64) -> String {
        format!("{}/{number}/labels", self.issues_path())
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessToken, RepositoryLocator};
    use crate::github::error::ReportError;

    #[test]
    fn locator_builds_rest_paths() {
        let locator =
            RepositoryLocator::new("octocat", "hello-world").expect("locator should build");
        assert_eq!(locator.full_name(), "octocat/hello-world");
        assert_eq!(locator.issues_path(), "/repos/octocat/hello-world/issues");
        assert_eq!(
            locator.pull_files_path(7),
            "/repos/octocat/hello-world/pulls/7/files"
        );
        assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
    }

    #[test]
    fn locator_rejects_empty_segments() {
        let error = RepositoryLocator::new("", "repo").expect_err("empty owner should fail");
        assert_eq!(error, ReportError::MissingRepositorySegment);
    }

    #[test]
    fn token_trims_and_rejects_blank() {
        let token = AccessToken::new("  ghp_abc  ").expect("token should be accepted");
        assert_eq!(token.value(), "ghp_abc");
        assert!(AccessToken::new("   ").is_err());
    }
}
