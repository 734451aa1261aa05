//! Condensed analysis document published as an issue in the target
//! repository.
//!
//! Carries an overview, the top pull requests with their dimension
//! scores, grouped issue and discussion sections, and a fixed
//! scoring-rubric appendix so readers can interpret the numbers without
//! leaving the issue.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::analysis::assemble::{DiscussionAnalysis, IssueAnalysis, PrAnalysis};
use crate::analysis::classify::IssueCategory;
use crate::analysis::window::{PeriodKind, PeriodWindow};

use super::format_local;
use super::truncate_cell;

const TOP_PR_TABLE_ROWS: usize = 10;
const TOP_PR_DETAIL_BLOCKS: usize = 5;
const SECTION_SUMMARY_CHARS: usize = 150;

/// A ready-to-publish issue: title, body, and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDocument {
    /// Issue title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Labels to apply, configured labels plus the period label.
    pub labels: Vec<String>,
}

/// Builds the condensed analysis issue for the target repository.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn build_issue_document(
    source_full_name: &str,
    window: &PeriodWindow,
    offset: FixedOffset,
    now: DateTime<Utc>,
    issues: &[IssueAnalysis],
    prs: &[PrAnalysis],
    discussions: &[DiscussionAnalysis],
    base_labels: &[String],
) -> IssueDocument {
    let title = build_title(source_full_name, window, now);

    let mut lines: Vec<String> = Vec::new();
    push_overview(&mut lines, source_full_name, window, offset, now, issues, prs);
    if !prs.is_empty() {
        push_pr_section(&mut lines, prs);
    }
    if !issues.is_empty() {
        push_issue_section(&mut lines, issues);
    }
    if !discussions.is_empty() {
        push_discussion_section(&mut lines, discussions);
    }
    push_rubric_appendix(&mut lines, source_full_name);

    let mut labels: Vec<String> = base_labels.to_vec();
    labels.push(window.kind().issue_label().to_owned());

    IssueDocument {
        title,
        body: lines.join("\n"),
        labels,
    }
}

fn build_title(source_full_name: &str, window: &PeriodWindow, now: DateTime<Utc>) -> String {
    let display = window.kind().display();
    let date = match window.kind() {
        PeriodKind::Today => now.format("%Y-%m-%d").to_string(),
        PeriodKind::Day => (window.end() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string(),
        PeriodKind::Week => format!(
            "{} to {}",
            window.start().format("%Y-%m-%d"),
            (window.end() - Duration::days(1)).format("%Y-%m-%d")
        ),
    };
    format!("{display} Report - {source_full_name} - {date}")
}

fn push_overview(
    lines: &mut Vec<String>,
    source_full_name: &str,
    window: &PeriodWindow,
    offset: FixedOffset,
    now: DateTime<Utc>,
    issues: &[IssueAnalysis],
    prs: &[PrAnalysis],
) {
    lines.push(format!(
        "## {} Analysis Report - `{source_full_name}`",
        window.kind().display()
    ));
    lines.push(String::new());
    lines.push(format!(
        "**Range**: {} to {}",
        format_local(window.start(), offset),
        format_local(window.end(), offset)
    ));
    lines.push(format!("**Generated**: {}", format_local(now, offset)));
    lines.push(String::new());
    lines.push("### Overview".to_owned());
    lines.push(String::new());
    lines.push(format!("- **Issues**: {}", issues.len()));
    lines.push(format!("- **Pull requests**: {}", prs.len()));
    lines.push(String::new());
}

fn push_pr_section(lines: &mut Vec<String>, prs: &[PrAnalysis]) {
    let mut ranked: Vec<&PrAnalysis> = prs.iter().collect();
    ranked.sort_by(|left, right| {
        right
            .total_score
            .partial_cmp(&left.total_score)
            .unwrap_or(Ordering::Equal)
    });

    lines.push("## Pull Request Analysis".to_owned());
    lines.push(String::new());
    lines.push("### Score Overview".to_owned());
    lines.push(String::new());
    lines.push("| PR | Title | Author | Type | Size | Score | State |".to_owned());
    lines.push("| --- | --- | --- | --- | --- | --- | --- |".to_owned());
    for pr in ranked.iter().take(TOP_PR_TABLE_ROWS) {
        lines.push(format!(
            "| PR-{} | {} | {} | {} | {} | {} | {} |",
            pr.number,
            truncate_cell(&pr.title, 40),
            pr.author,
            pr.pr_type.label(),
            pr.size_category.label(),
            pr.total_score,
            pr.state
        ));
    }
    lines.push(String::new());
    lines.push("### Highlighted Pull Requests".to_owned());
    lines.push(String::new());

    for pr in ranked.iter().take(TOP_PR_DETAIL_BLOCKS) {
        push_pr_detail(lines, pr);
    }
}

fn push_pr_detail(lines: &mut Vec<String>, pr: &PrAnalysis) {
    let merged_note = if pr.merged_at.is_some() {
        " (merged)"
    } else {
        ""
    };
    lines.push(format!("#### PR-{}: {}", pr.number, pr.title));
    lines.push(String::new());
    lines.push("| Basics | Key figures | Composite |".to_owned());
    lines.push("| --- | --- | --- |".to_owned());
    lines.push(format!(
        "| Author: {}<br>Type: `{}`<br>Priority: `{}`<br>Size: `{}`<br>State: {}{} | \
         Changed files: {}<br>Added: `+{}`<br>Deleted: `-{}`<br>Commits: {} | \
         **{}**<br>({}) |",
        pr.author,
        pr.pr_type.label(),
        pr.priority.label(),
        pr.size_category.label(),
        pr.state,
        merged_note,
        pr.changed_files,
        pr.additions,
        pr.deletions,
        pr.commits,
        pr.total_score,
        pr.rating.label()
    ));
    lines.push(String::new());
    lines.push("**Dimension scores** (0-10)".to_owned());
    lines.push(String::new());
    lines.push("| Dimension | Score |".to_owned());
    lines.push("| --- | --- |".to_owned());
    lines.push(format!("| Code quality | **{}** |", pr.scores.code_quality));
    lines.push(format!("| Test coverage | **{}** |", pr.scores.test_coverage));
    lines.push(format!(
        "| Documentation and maintainability | **{}** |",
        pr.scores.doc_maintain
    ));
    lines.push(format!(
        "| Compliance and security | **{}** |",
        pr.scores.compliance_security
    ));
    lines.push(format!(
        "| Scope reasonableness | **{}** |",
        pr.scores.merge_history
    ));
    lines.push(format!(
        "| Value and importance | **{}** |",
        pr.scores.collaboration
    ));
    lines.push(String::new());

    if let Some(advice) = pr.commentary.advice() {
        if !advice.trim().is_empty() {
            lines.push("**AI review**".to_owned());
            lines.push(String::new());
            lines.push(format!("> {}", advice.replace('\n', "\n> ")));
            lines.push(String::new());
        }
    }

    lines.push("---".to_owned());
    lines.push(String::new());
}

fn push_issue_section(lines: &mut Vec<String>, issues: &[IssueAnalysis]) {
    let open = issues.iter().filter(|issue| issue.state == "open").count();
    let closed = issues.iter().filter(|issue| issue.state == "closed").count();
    let created: Vec<&IssueAnalysis> = issues
        .iter()
        .filter(|issue| issue.created_in_period)
        .collect();
    let updated: Vec<&IssueAnalysis> = issues
        .iter()
        .filter(|issue| !issue.created_in_period)
        .collect();
    let bugs = issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::Bug)
        .count();
    let features = issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::FeatureRequest)
        .count();
    let others = issues.len() - bugs - features;

    lines.push("## Issue Analysis".to_owned());
    lines.push(String::new());
    lines.push("### Issue Statistics".to_owned());
    lines.push(String::new());
    lines.push(format!("- **Open**: {open} | **Closed**: {closed}"));
    lines.push(format!(
        "- **Created in period**: {} | **Updated in period**: {}",
        created.len(),
        updated.len()
    ));
    lines.push(format!(
        "- **Bug reports**: {bugs} | **Feature requests**: {features} | **Other**: {others}"
    ));
    lines.push(String::new());

    if !created.is_empty() {
        lines.push("### Issues Created in This Period".to_owned());
        lines.push(String::new());
        push_issue_groups(lines, &created, "new");
    }
    if !updated.is_empty() {
        lines.push("### Issues Updated in This Period".to_owned());
        lines.push(String::new());
        push_issue_groups(lines, &updated, "updated");
    }
}

fn push_issue_groups(lines: &mut Vec<String>, issues: &[&IssueAnalysis], note: &str) {
    let groups = [
        (IssueCategory::Bug, format!("#### Bug Reports ({note})")),
        (
            IssueCategory::FeatureRequest,
            format!("#### Feature Requests ({note})"),
        ),
    ];

    for (category, heading) in groups {
        let mut members: Vec<&&IssueAnalysis> = issues
            .iter()
            .filter(|issue| issue.category == category)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|left, right| right.number.cmp(&left.number));
        lines.push(heading);
        lines.push(String::new());
        for issue in &members {
            push_issue_entry(lines, issue);
        }
    }

    let mut rest: Vec<&&IssueAnalysis> = issues
        .iter()
        .filter(|issue| {
            issue.category != IssueCategory::Bug
                && issue.category != IssueCategory::FeatureRequest
        })
        .collect();
    if !rest.is_empty() {
        rest.sort_by(|left, right| right.number.cmp(&left.number));
        lines.push(format!("#### Other Issues ({note})"));
        lines.push(String::new());
        for issue in &rest {
            push_issue_entry(lines, issue);
        }
    }
}

fn push_issue_entry(lines: &mut Vec<String>, issue: &IssueAnalysis) {
    lines.push(format!("**Issue-{}**: {}", issue.number, issue.title));
    lines.push(format!(
        "- Author: {} | State: {} | Comments: {}",
        issue.author, issue.state, issue.comments
    ));
    lines.push(format!(
        "- Summary: {}",
        truncate_cell(&issue.summary, SECTION_SUMMARY_CHARS)
    ));
    lines.push(String::new());
}

fn push_discussion_section(lines: &mut Vec<String>, discussions: &[DiscussionAnalysis]) {
    let open = discussions
        .iter()
        .filter(|discussion| discussion.state == "open")
        .count();
    let closed = discussions
        .iter()
        .filter(|discussion| discussion.state == "closed")
        .count();
    let created: Vec<&DiscussionAnalysis> = discussions
        .iter()
        .filter(|discussion| discussion.created_in_period)
        .collect();
    let updated: Vec<&DiscussionAnalysis> = discussions
        .iter()
        .filter(|discussion| !discussion.created_in_period)
        .collect();

    lines.push("## Discussion Analysis".to_owned());
    lines.push(String::new());
    lines.push("### Discussion Statistics".to_owned());
    lines.push(String::new());
    lines.push(format!("- **Open**: {open} | **Closed**: {closed}"));
    lines.push(format!(
        "- **Created in period**: {} | **Updated in period**: {}",
        created.len(),
        updated.len()
    ));
    lines.push(String::new());

    if !created.is_empty() {
        lines.push("### Discussions Created in This Period".to_owned());
        lines.push(String::new());
        push_discussion_entries(lines, &created);
    }
    if !updated.is_empty() {
        lines.push("### Discussions Updated in This Period".to_owned());
        lines.push(String::new());
        push_discussion_entries(lines, &updated);
    }
}

fn push_discussion_entries(lines: &mut Vec<String>, discussions: &[&DiscussionAnalysis]) {
    let mut ordered: Vec<&&DiscussionAnalysis> = discussions.iter().collect();
    ordered.sort_by(|left, right| right.number.cmp(&left.number));

    for discussion in ordered {
        lines.push(format!(
            "**Discussion-{}**: {}",
            discussion.number, discussion.title
        ));
        lines.push(format!(
            "- Author: {} | State: {} | Comments: {} | Category: {}",
            discussion.author, discussion.state, discussion.comments, discussion.category
        ));
        lines.push(format!(
            "- Summary: {}",
            truncate_cell(&discussion.summary, SECTION_SUMMARY_CHARS)
        ));
        if let Some(ai_summary) = discussion.ai_summary.as_deref() {
            lines.push(format!("- **AI explanation**: {ai_summary}"));
        }
        lines.push(String::new());
    }
}

fn push_rubric_appendix(lines: &mut Vec<String>, source_full_name: &str) {
    lines.extend(
        [
            "## Full Report and Scoring Rubric",
            "",
            "### Full report",
            "",
            "The detailed report is written to the `reports/` directory of this repository.",
            "",
            "### Scoring rubric",
            "",
            "**Composite rating bands**:",
            "",
            "| Score range | Rating | Meaning |",
            "| --- | --- | --- |",
            "| >80 | excellent | High code quality, thorough tests and docs, safe and compliant, standout scope and value |",
            "| 60-80 | good | Solid overall quality with limited room for improvement |",
            "| <60 | fair | Meets the basics but has clear gaps |",
            "",
            "**Dimension scores** (0-10):",
            "",
            "- **Code quality**: style, readability, design, best practice",
            "- **Test coverage**: unit tests, integration tests, edge cases",
            "- **Documentation and maintainability**: comments, doc updates, maintainability",
            "- **Compliance and security**: vulnerabilities, compliance, dependency safety",
            "- **Scope reasonableness**: whether the blast radius matches the change's importance; an important change touching many files is reasonable, a minor one doing so adds review burden and scores low",
            "- **Value and importance**: the change's core purpose, business value, and whether it solves a key problem",
            "",
            "---",
        ]
        .into_iter()
        .map(ToOwned::to_owned),
    );
    lines.push(format!(
        "*This issue was created automatically; analysed source repository: `{source_full_name}`*"
    ));
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use crate::analysis::window::{PeriodKind, PeriodWindow};
    use crate::report::test_fixtures::{sample_discussion, sample_issue, sample_pr};

    use super::build_issue_document;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).expect("offset should be valid")
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0)
            .single()
            .expect("valid")
    }

    fn document(kind: PeriodKind) -> super::IssueDocument {
        let window = PeriodWindow::for_kind(kind, now(), offset());
        build_issue_document(
            "octocat/hello-world",
            &window,
            offset(),
            now(),
            &[sample_issue(3, true), sample_issue(4, false)],
            &[sample_pr(7, 72.5)],
            &[sample_discussion(9, true)],
            &["automated".to_owned(), "report".to_owned()],
        )
    }

    #[test]
    fn daily_title_names_the_covered_day() {
        let document = document(PeriodKind::Day);
        assert_eq!(
            document.title,
            "Daily Report - octocat/hello-world - 2024-05-01"
        );
    }

    #[test]
    fn weekly_title_names_the_covered_range() {
        let document = document(PeriodKind::Week);
        assert_eq!(
            document.title,
            "Weekly Report - octocat/hello-world - 2024-04-22 to 2024-04-28"
        );
    }

    #[test]
    fn labels_carry_the_period_label() {
        let document = document(PeriodKind::Day);
        assert_eq!(
            document.labels,
            vec![
                "automated".to_owned(),
                "report".to_owned(),
                "daily".to_owned()
            ]
        );
    }

    #[test]
    fn body_carries_sections_and_rubric() {
        let document = document(PeriodKind::Day);
        assert!(document.body.contains("## Pull Request Analysis"));
        assert!(document.body.contains("#### PR-7: feat: change 7"));
        assert!(document.body.contains("| Code quality | **7** |"));
        assert!(document.body.contains("> Looks solid overall."));
        assert!(document.body.contains("### Issues Created in This Period"));
        assert!(document.body.contains("#### Bug Reports (new)"));
        assert!(document.body.contains("## Discussion Analysis"));
        assert!(document.body.contains("- **AI explanation**:"));
        assert!(document.body.contains("### Scoring rubric"));
        assert!(document.body.contains("`octocat/hello-world`"));
    }
}
