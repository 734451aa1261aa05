//! Markdown report file generation.
//!
//! Renders the full activity report consumed from the analysis records.
//! Formatting only: every decision (scores, buckets, window membership)
//! was made upstream.

use std::cmp::Ordering;
use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, FixedOffset, Utc};

use crate::analysis::assemble::{DiscussionAnalysis, IssueAnalysis, PrAnalysis};
use crate::analysis::window::PeriodWindow;
use crate::github::error::ReportError;

use super::format_local;
use super::truncate_cell;

/// Writes the report to `report_dir/report-<timestamp>.md` and returns
/// the path.
///
/// # Errors
///
/// Returns [`ReportError::Io`] when the directory cannot be created or
/// the file cannot be written.
pub fn generate_markdown_report(
    report_dir: &Utf8Path,
    repo_full_name: &str,
    window: &PeriodWindow,
    offset: FixedOffset,
    generated_at: DateTime<Utc>,
    issues: &[IssueAnalysis],
    prs: &[PrAnalysis],
    discussions: &[DiscussionAnalysis],
) -> Result<Utf8PathBuf, ReportError> {
    fs::create_dir_all(report_dir).map_err(|error| io_error(&error))?;
    let slug = generated_at.format("%Y%m%d-%H%M%S");
    let path = report_dir.join(format!("report-{slug}.md"));

    let mut file = fs::File::create(&path).map_err(|error| io_error(&error))?;
    write_report(
        &mut file,
        repo_full_name,
        window,
        offset,
        generated_at,
        issues,
        prs,
        discussions,
    )?;
    Ok(path)
}

/// Writes the full report to the given writer.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if writing fails.
#[allow(clippy::too_many_arguments)]
pub fn write_report<W: Write>(
    writer: &mut W,
    repo_full_name: &str,
    window: &PeriodWindow,
    offset: FixedOffset,
    generated_at: DateTime<Utc>,
    issues: &[IssueAnalysis],
    prs: &[PrAnalysis],
    discussions: &[DiscussionAnalysis],
) -> Result<(), ReportError> {
    write_header(
        writer,
        repo_full_name,
        window,
        offset,
        generated_at,
        issues.len(),
        prs.len(),
        discussions.len(),
    )?;

    let ranked = rank_by_score(prs);

    if !prs.is_empty() {
        write_pr_summary_table(writer, &ranked)?;
    }
    if !issues.is_empty() {
        write_issue_summary_table(writer, issues)?;
    }
    if !prs.is_empty() {
        writeln!(writer, "## Pull Request Details").map_err(|e| io_error(&e))?;
        for pr in &ranked {
            write_pr_detail(writer, pr)?;
        }
    }
    if !issues.is_empty() {
        write_issue_details(writer, issues)?;
    }
    if !discussions.is_empty() {
        write_discussion_details(writer, discussions)?;
    }

    Ok(())
}

/// Pull requests ordered by composite score, best first.
fn rank_by_score<'a>(prs: &'a [PrAnalysis]) -> Vec<&'a PrAnalysis> {
    let mut ranked: Vec<&PrAnalysis> = prs.iter().collect();
    ranked.sort_by(|left, right| {
        right
            .total_score
            .partial_cmp(&left.total_score)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

#[allow(clippy::too_many_arguments)]
fn write_header<W: Write>(
    writer: &mut W,
    repo_full_name: &str,
    window: &PeriodWindow,
    offset: FixedOffset,
    generated_at: DateTime<Utc>,
    issue_count: usize,
    pr_count: usize,
    discussion_count: usize,
) -> Result<(), ReportError> {
    writeln!(
        writer,
        "# {} Activity Report - {repo_full_name}",
        window.kind().display()
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- **Generated**: {}",
        format_local(generated_at, offset)
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer, "- **Period**: {}", window.kind().description())
        .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- **Range**: {} to {}",
        format_local(window.start(), offset),
        format_local(window.end(), offset)
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer, "- **Issues**: {issue_count}").map_err(|e| io_error(&e))?;
    writeln!(writer, "- **Pull requests**: {pr_count}").map_err(|e| io_error(&e))?;
    writeln!(writer, "- **Discussions**: {discussion_count}").map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    Ok(())
}

fn write_pr_summary_table<W: Write>(
    writer: &mut W,
    ranked: &[&PrAnalysis],
) -> Result<(), ReportError> {
    writeln!(writer, "## Pull Request Summary").map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "| Number | Title | Author | Type | Priority | Size | Score | Rating | State |"
    )
    .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "| --- | --- | --- | --- | --- | --- | --- | --- | --- |"
    )
    .map_err(|e| io_error(&e))?;
    for pr in ranked {
        writeln!(
            writer,
            "| PR-{} | {} | {} | {} | {} | {} | {} | {} | {} |",
            pr.number,
            truncate_cell(&pr.title, 40),
            pr.author,
            pr.pr_type.label(),
            pr.priority.label(),
            pr.size_category.label(),
            pr.total_score,
            pr.rating.label(),
            pr.state
        )
        .map_err(|e| io_error(&e))?;
    }
    writeln!(writer).map_err(|e| io_error(&e))?;
    Ok(())
}

fn write_issue_summary_table<W: Write>(
    writer: &mut W,
    issues: &[IssueAnalysis],
) -> Result<(), ReportError> {
    writeln!(writer, "## Issue Summary").map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "| Number | Title | Author | State | Category | Comments | Created |"
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer, "| --- | --- | --- | --- | --- | --- | --- |").map_err(|e| io_error(&e))?;
    for issue in issues {
        writeln!(
            writer,
            "| Issue-{} | {} | {} | {} | {} | {} | {} |",
            issue.number,
            truncate_cell(&issue.title, 40),
            issue.author,
            issue.state,
            issue.category.label(),
            issue.comments,
            truncate_cell(&issue.created_at, 10)
        )
        .map_err(|e| io_error(&e))?;
    }
    writeln!(writer).map_err(|e| io_error(&e))?;
    Ok(())
}

fn write_pr_detail<W: Write>(writer: &mut W, pr: &PrAnalysis) -> Result<(), ReportError> {
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(writer, "### PR-{} - {}", pr.number, pr.title).map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(writer, "- Author: {}", pr.author).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- State: {} (merged: {})",
        pr.state,
        pr.merged_at.is_some()
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer, "- Created: {}", pr.created_at).map_err(|e| io_error(&e))?;
    writeln!(writer, "- Changed files: {}", pr.changed_files).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- Added / deleted lines: +{} / -{}",
        pr.additions, pr.deletions
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer, "- Commits: {}", pr.commits).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- Type: {}, priority: {}",
        pr.pr_type.label(),
        pr.priority.label()
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer, "- Size: {}", pr.size_category.label()).map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(writer, "**Dimension scores (0-10):**").map_err(|e| io_error(&e))?;
    writeln!(writer, "- Change type: {}", pr.type_score).map_err(|e| io_error(&e))?;
    writeln!(writer, "- Change size: {}", pr.size_score).map_err(|e| io_error(&e))?;
    writeln!(writer, "- Code quality: {}", pr.scores.code_quality).map_err(|e| io_error(&e))?;
    writeln!(writer, "- Test coverage: {}", pr.scores.test_coverage).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- Documentation and maintainability: {}",
        pr.scores.doc_maintain
    )
    .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- Compliance and security: {}",
        pr.scores.compliance_security
    )
    .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- Scope reasonableness: {}",
        pr.scores.merge_history
    )
    .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "- Value and importance: {}",
        pr.scores.collaboration
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "**Composite score: {} ({})**",
        pr.total_score,
        pr.rating.label()
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    if let Some(advice) = pr.commentary.advice() {
        writeln!(writer, "**AI review:**").map_err(|e| io_error(&e))?;
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "{advice}").map_err(|e| io_error(&e))?;
        writeln!(writer).map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn write_issue_details<W: Write>(
    writer: &mut W,
    issues: &[IssueAnalysis],
) -> Result<(), ReportError> {
    writeln!(writer, "## Issue Details").map_err(|e| io_error(&e))?;
    for issue in issues {
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "### Issue-{} - {}", issue.number, issue.title)
            .map_err(|e| io_error(&e))?;
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Author: {}", issue.author).map_err(|e| io_error(&e))?;
        writeln!(writer, "- State: {}", issue.state).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Category: {}", issue.category.label()).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Labels: {}", join_or_none(&issue.labels)).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Comments: {}", issue.comments).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Created: {}", issue.created_at).map_err(|e| io_error(&e))?;
        if let Some(closed_at) = issue.closed_at.as_deref() {
            writeln!(writer, "- Closed: {closed_at}").map_err(|e| io_error(&e))?;
        }
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "Summary: {}", issue.summary).map_err(|e| io_error(&e))?;
    }
    writeln!(writer).map_err(|e| io_error(&e))?;
    Ok(())
}

fn write_discussion_details<W: Write>(
    writer: &mut W,
    discussions: &[DiscussionAnalysis],
) -> Result<(), ReportError> {
    writeln!(writer, "## Discussion Details").map_err(|e| io_error(&e))?;

    let created: Vec<&DiscussionAnalysis> = discussions
        .iter()
        .filter(|discussion| discussion.created_in_period)
        .collect();
    let updated: Vec<&DiscussionAnalysis> = discussions
        .iter()
        .filter(|discussion| !discussion.created_in_period)
        .collect();

    if !created.is_empty() {
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "### Created in this period").map_err(|e| io_error(&e))?;
        write_discussion_group(writer, &created)?;
    }
    if !updated.is_empty() {
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "### Updated in this period").map_err(|e| io_error(&e))?;
        write_discussion_group(writer, &updated)?;
    }
    Ok(())
}

fn write_discussion_group<W: Write>(
    writer: &mut W,
    discussions: &[&DiscussionAnalysis],
) -> Result<(), ReportError> {
    let mut ordered: Vec<&&DiscussionAnalysis> = discussions.iter().collect();
    ordered.sort_by(|left, right| right.number.cmp(&left.number));

    for discussion in ordered {
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(
            writer,
            "#### Discussion-{} - {}",
            discussion.number, discussion.title
        )
        .map_err(|e| io_error(&e))?;
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Author: {}", discussion.author).map_err(|e| io_error(&e))?;
        writeln!(writer, "- State: {}", discussion.state).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Category: {}", discussion.category).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Labels: {}", join_or_none(&discussion.labels))
            .map_err(|e| io_error(&e))?;
        writeln!(writer, "- Comments: {}", discussion.comments).map_err(|e| io_error(&e))?;
        writeln!(writer, "- Created: {}", discussion.created_at).map_err(|e| io_error(&e))?;
        if !discussion.updated_at.is_empty() {
            writeln!(writer, "- Updated: {}", discussion.updated_at).map_err(|e| io_error(&e))?;
        }
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(writer, "Summary: {}", discussion.summary).map_err(|e| io_error(&e))?;
        if let Some(ai_summary) = discussion.ai_summary.as_deref() {
            writeln!(writer, "AI summary: {ai_summary}").map_err(|e| io_error(&e))?;
        }
    }
    Ok(())
}

fn join_or_none(labels: &[String]) -> String {
    if labels.is_empty() {
        "none".to_owned()
    } else {
        labels.join(", ")
    }
}

fn io_error(error: &io::Error) -> ReportError {
    ReportError::Io {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use chrono::{FixedOffset, TimeZone, Utc};

    use crate::analysis::window::{PeriodKind, PeriodWindow};
    use crate::report::test_fixtures::{sample_discussion, sample_issue, sample_pr};

    use super::{generate_markdown_report, write_report};

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).expect("offset should be valid")
    }

    fn window() -> PeriodWindow {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 2, 9, 30, 0)
            .single()
            .expect("valid");
        PeriodWindow::for_kind(PeriodKind::Day, now, offset())
    }

    fn render() -> String {
        let mut output = Vec::new();
        let generated_at = Utc
            .with_ymd_and_hms(2024, 5, 2, 9, 30, 0)
            .single()
            .expect("valid");
        write_report(
            &mut output,
            "octocat/hello-world",
            &window(),
            offset(),
            generated_at,
            &[sample_issue(3, true)],
            &[sample_pr(7, 72.5), sample_pr(8, 90.0)],
            &[sample_discussion(9, false)],
        )
        .expect("report should render");
        String::from_utf8(output).expect("report should be UTF-8")
    }

    #[test]
    fn report_carries_header_tables_and_sections() {
        let report = render();
        assert!(report.contains("# Daily Activity Report - octocat/hello-world"));
        assert!(report.contains("- **Generated**: 2024-05-02 17:30:00 (UTC+08:00)"));
        assert!(report.contains("## Pull Request Summary"));
        assert!(report.contains("| PR-8 |"));
        assert!(report.contains("## Issue Summary"));
        assert!(report.contains("### Issue-3"));
        assert!(report.contains("### Updated in this period"));
        assert!(report.contains("#### Discussion-9"));
    }

    #[test]
    fn pull_requests_are_ranked_by_score() {
        let report = render();
        let best = report.find("### PR-8").expect("PR-8 section expected");
        let runner_up = report.find("### PR-7").expect("PR-7 section expected");
        assert!(best < runner_up, "higher score should render first");
    }

    #[test]
    fn report_file_lands_in_the_report_directory() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let report_dir = Utf8Path::from_path(dir.path()).expect("tempdir path should be UTF-8");
        let generated_at = Utc
            .with_ymd_and_hms(2024, 5, 2, 9, 30, 0)
            .single()
            .expect("valid");

        let path = generate_markdown_report(
            report_dir,
            "octocat/hello-world",
            &window(),
            offset(),
            generated_at,
            &[],
            &[sample_pr(7, 72.5)],
            &[],
        )
        .expect("report file should be written");

        assert_eq!(path.file_name(), Some("report-20240502-093000.md"));
        let contents = std::fs::read_to_string(path).expect("report should read back");
        assert!(contents.contains("PR-7"));
    }
}
