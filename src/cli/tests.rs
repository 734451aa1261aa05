//! Pipeline tests driven through mocked gateways.

use camino::Utf8Path;
use chrono::{FixedOffset, TimeZone, Utc};

use crate::ai::{PrScorePayload, PullRequestScoreService};
use crate::analysis::window::{PeriodKind, PeriodWindow};
use crate::config::HeraldConfig;
use crate::github::error::ReportError;
use crate::github::gateway::{MockIssuePublisher, MockRepositoryFeed};
use crate::github::locator::RepositoryLocator;
use crate::github::models::test_support::{issue_with_timestamps, minimal_pull_request};

use super::run_pipeline;

#[derive(Debug)]
struct UnconfiguredScorer;

impl PullRequestScoreService for UnconfiguredScorer {
    fn is_configured(&self) -> bool {
        false
    }
    fn score_pull_request(&self, _context: &str) -> Result<PrScorePayload, ReportError> {
        Err(ReportError::Configuration {
            message: "unconfigured".to_owned(),
        })
    }
    fn summarize_issue(&self, _context: &str) -> Result<String, ReportError> {
        Err(ReportError::Configuration {
            message: "unconfigured".to_owned(),
        })
    }
    fn summarize_discussion(&self, _context: &str) -> Result<String, ReportError> {
        Err(ReportError::Configuration {
            message: "unconfigured".to_owned(),
        })
    }
}

fn fixed_window() -> (PeriodWindow, chrono::DateTime<Utc>, FixedOffset) {
    let offset = FixedOffset::east_opt(8 * 3600).expect("offset should be valid");
    let now = Utc
        .with_ymd_and_hms(2024, 5, 2, 9, 30, 0)
        .single()
        .expect("valid");
    (
        PeriodWindow::for_kind(PeriodKind::Day, now, offset),
        now,
        offset,
    )
}

fn in_window_pull_request(number: u64) -> crate::github::models::RawPullRequest {
    let mut pull_request = minimal_pull_request(number, "feat: add caching layer", 300, 10);
    pull_request.created_at = Some("2024-05-01T10:00:00Z".to_owned());
    pull_request.updated_at = Some("2024-05-01T10:00:00Z".to_owned());
    pull_request
}

fn mock_feed() -> MockRepositoryFeed {
    let mut feed = MockRepositoryFeed::new();
    feed.expect_list_issues().returning(|_, _, _, _| {
        Ok(vec![issue_with_timestamps(
            3,
            "2024-05-01T08:00:00Z",
            "2024-05-01T08:00:00Z",
        )])
    });
    feed.expect_list_pull_requests()
        .returning(|_, _, _| Ok(vec![in_window_pull_request(7)]));
    feed.expect_pull_request_detail()
        .returning(|_, number| Ok(in_window_pull_request(number)));
    feed.expect_list_discussions()
        .returning(|_, _, _| Ok(Vec::new()));
    feed
}

fn test_config(report_dir: &Utf8Path, create_issue: bool) -> HeraldConfig {
    HeraldConfig {
        source_owner: Some("apache".to_owned()),
        source_repo: Some("answer".to_owned()),
        target_owner: Some("octocat".to_owned()),
        target_repo: Some("reports".to_owned()),
        report_dir: report_dir.to_string(),
        create_issue,
        ..HeraldConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_writes_report_and_publishes_issue() {
    let dir = tempfile::tempdir().expect("tempdir should create");
    let report_dir = Utf8Path::from_path(dir.path()).expect("tempdir path should be UTF-8");
    let config = test_config(report_dir, true);
    let source = RepositoryLocator::new("apache", "answer").expect("locator should build");
    let target = RepositoryLocator::new("octocat", "reports").expect("locator should build");
    let (window, now, offset) = fixed_window();

    let feed = mock_feed();
    let mut publisher = MockIssuePublisher::new();
    publisher
        .expect_create_issue()
        .times(1)
        .withf(|_, title, body, labels| {
            title.starts_with("Daily Report - apache/answer")
                && body.contains("PR-7")
                && labels.contains(&"daily".to_owned())
        })
        .returning(|_, _, _, _| Ok(42));

    run_pipeline(
        &config,
        &source,
        &target,
        &window,
        offset,
        now,
        &feed,
        Some(&publisher),
        &UnconfiguredScorer,
    )
    .await
    .expect("pipeline should succeed");

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("report dir should read")
        .collect();
    assert_eq!(entries.len(), 1, "exactly one report file expected");
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_survives_pull_request_detail_failures() {
    let dir = tempfile::tempdir().expect("tempdir should create");
    let report_dir = Utf8Path::from_path(dir.path()).expect("tempdir path should be UTF-8");
    let config = test_config(report_dir, false);
    let source = RepositoryLocator::new("apache", "answer").expect("locator should build");
    let target = RepositoryLocator::new("octocat", "reports").expect("locator should build");
    let (window, now, offset) = fixed_window();

    let mut feed = MockRepositoryFeed::new();
    feed.expect_list_issues().returning(|_, _, _, _| Ok(Vec::new()));
    feed.expect_list_pull_requests()
        .returning(|_, _, _| Ok(vec![in_window_pull_request(7)]));
    feed.expect_pull_request_detail().returning(|_, _| {
        Err(ReportError::Network {
            message: "boom".to_owned(),
        })
    });
    feed.expect_list_discussions().returning(|_, _, _| {
        Err(ReportError::Api {
            message: "discussions disabled".to_owned(),
        })
    });

    run_pipeline(
        &config,
        &source,
        &target,
        &window,
        offset,
        now,
        &feed,
        None,
        &UnconfiguredScorer,
    )
    .await
    .expect("pipeline should degrade, not fail");
}
