//! CLI orchestration: one report run from fetch to published artefacts.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

use camino::Utf8Path;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::task;
use tracing::warn;

use crate::ai::{
    OpenAiScoreConfig, OpenAiScoreService, PullRequestScoreService, ScoreOutcome,
    score_with_fallback,
};
use crate::analysis::assemble::{
    analyze_discussions, analyze_issues, analyze_pull_requests,
};
use crate::analysis::summary::build_pr_context;
use crate::analysis::window::{
    PeriodWindow, WindowPartition, filter_created_in_window, partition_by_window,
};
use crate::config::HeraldConfig;
use crate::github::error::ReportError;
use crate::github::gateway::{IssuePublisher, RepositoryFeed};
use crate::github::locator::RepositoryLocator;
use crate::github::models::RawPullRequest;
use crate::github::{OctocrabFeedGateway, OctocrabIssuePublisher};
use crate::report::{build_issue_document, generate_markdown_report};

const AI_CALL_TIMEOUT_SECS: u64 = 60;

/// Runs one report generation pass from loaded configuration.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] for incomplete configuration
/// and propagates GitHub or I/O failures from the fetch and render
/// stages. External scorer failures never surface here; they degrade the
/// report instead.
pub async fn run(config: HeraldConfig) -> Result<(), ReportError> {
    let source = config.require_source()?;
    let target = config.require_target()?;
    let period = config.period_kind()?;
    let offset = report_offset(&config)?;
    let now = Utc::now();
    let window = PeriodWindow::for_kind(period, now, offset);

    let source_token = config.source_access_token();
    let feed = OctocrabFeedGateway::for_token(source_token.as_ref(), &source)?;

    let scorer = OpenAiScoreService::new(OpenAiScoreConfig {
        base_url: config.ai_base_url.clone().unwrap_or_default(),
        model: config.ai_model.clone(),
        api_key: config.resolved_ai_api_key(),
        timeout: Duration::from_secs(AI_CALL_TIMEOUT_SECS),
        max_requests_per_minute: config.ai_max_requests_per_minute,
    });

    let publisher = if config.create_issue {
        match config.target_access_token() {
            Some(token) => Some(OctocrabIssuePublisher::for_token(&token, &target)?),
            None => None,
        }
    } else {
        None
    };

    run_pipeline(
        &config,
        &source,
        &target,
        &window,
        offset,
        now,
        &feed,
        publisher
            .as_ref()
            .map(|publisher| publisher as &dyn IssuePublisher),
        &scorer,
    )
    .await
}

fn report_offset(config: &HeraldConfig) -> Result<FixedOffset, ReportError> {
    FixedOffset::east_opt(config.utc_offset_hours.saturating_mul(3600)).ok_or_else(|| {
        ReportError::Configuration {
            message: format!(
                "utc_offset_hours {} is out of range",
                config.utc_offset_hours
            ),
        }
    })
}

/// The fetch/analyse/render pipeline, parameterised over its gateways so
/// tests can drive it with mocks.
#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    config: &HeraldConfig,
    source: &RepositoryLocator,
    target: &RepositoryLocator,
    window: &PeriodWindow,
    offset: FixedOffset,
    now: DateTime<Utc>,
    feed: &dyn RepositoryFeed,
    publisher: Option<&dyn IssuePublisher>,
    scorer: &dyn PullRequestScoreService,
) -> Result<(), ReportError> {
    emit(&format!(
        "Analysing {} activity for {} ({} to {})",
        window.kind().description(),
        source.full_name(),
        window.start().to_rfc3339(),
        window.end().to_rfc3339()
    ))?;

    let since = window.since();

    let raw_issues = feed
        .list_issues(source, "all", Some(&since), config.max_issue_count)
        .await?;
    let issue_partition = partition_by_window(raw_issues, window);
    emit_partition_counts("issues", &issue_partition)?;

    let raw_prs = feed
        .list_pull_requests(source, "all", config.max_pr_count)
        .await?;
    let prs = filter_created_in_window(raw_prs, window);

    let discussion_partition = match feed
        .list_discussions(source, Some(&since), config.max_discussion_count)
        .await
    {
        Ok(raw_discussions) => {
            let partition = partition_by_window(raw_discussions, window);
            emit_partition_counts("discussions", &partition)?;
            partition
        }
        Err(error) => {
            warn!(%error, "failed to fetch discussions; continuing without them");
            WindowPartition {
                records: Vec::new(),
                created_count: 0,
                updated_count: 0,
            }
        }
    };

    emit(&format!(
        "Found {} issues, {} pull requests, {} discussions in the period",
        issue_partition.records.len(),
        prs.len(),
        discussion_partition.records.len()
    ))?;

    let mut detailed: Vec<RawPullRequest> = Vec::new();
    for pull_request in &prs {
        match feed.pull_request_detail(source, pull_request.number).await {
            Ok(detail) => detailed.push(detail),
            Err(error) => {
                emit(&format!(
                    "Warning: failed to load details for PR-{}: {error}",
                    pull_request.number
                ))?;
            }
        }
    }

    // The scorer uses a blocking HTTP client with its own cooperative
    // throttle, so every interaction runs via block_in_place.
    let mut score_results: HashMap<u64, ScoreOutcome> = HashMap::new();
    for pull_request in &detailed {
        let context = build_pr_context(pull_request);
        let outcome = task::block_in_place(|| score_with_fallback(scorer, &context));
        score_results.insert(pull_request.number, outcome);
    }

    let issues_analysis =
        task::block_in_place(|| analyze_issues(issue_partition.records, Some(scorer)));
    let prs_analysis = analyze_pull_requests(detailed, &score_results);
    let discussions_analysis = task::block_in_place(|| {
        analyze_discussions(discussion_partition.records, Some(scorer))
    });

    let report_path = generate_markdown_report(
        Utf8Path::new(&config.report_dir),
        &source.full_name(),
        window,
        offset,
        now,
        &issues_analysis,
        &prs_analysis,
        &discussions_analysis,
    )?;
    emit(&format!("Report written to {report_path}"))?;

    if config.create_issue {
        if let Some(publisher) = publisher {
            let document = build_issue_document(
                &source.full_name(),
                window,
                offset,
                now,
                &issues_analysis,
                &prs_analysis,
                &discussions_analysis,
                &config.issue_labels,
            );
            match publisher
                .create_issue(target, &document.title, &document.body, &document.labels)
                .await
            {
                Ok(number) => emit(&format!(
                    "Created issue #{number} in {}",
                    target.full_name()
                ))?,
                Err(error) => {
                    emit(&format!("Warning: failed to create summary issue: {error}"))?;
                }
            }
        } else {
            emit("No target token configured; skipping issue creation")?;
        }
    }

    Ok(())
}

fn emit_partition_counts<T>(
    noun: &str,
    partition: &WindowPartition<T>,
) -> Result<(), ReportError> {
    emit(&format!(
        "Period {noun}: {} created, {} updated",
        partition.created_count, partition.updated_count
    ))
}

fn emit(message: &str) -> Result<(), ReportError> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{message}").map_err(|error| ReportError::Io {
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests;
