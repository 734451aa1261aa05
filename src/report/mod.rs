//! Report artefact rendering: the Markdown report file and the condensed
//! issue document published to the target repository.

pub mod issue_body;
pub mod markdown;

pub use issue_body::{IssueDocument, build_issue_document};
pub use markdown::{generate_markdown_report, write_report};

use chrono::{DateTime, FixedOffset, Utc};

use crate::analysis::summary::clip;

/// Formats a timestamp in the report timezone, e.g.
/// `2024-05-02 17:30:00 (UTC+08:00)`.
#[must_use]
pub(crate) fn format_local(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "{} (UTC{offset})",
        timestamp.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S")
    )
}

/// Clips a value for a fixed-width table cell.
#[must_use]
pub(crate) fn truncate_cell(text: &str, max_chars: usize) -> String {
    clip(text, max_chars)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! Shared analysis fixtures for renderer tests.

    use crate::ai::DimensionScores;
    use crate::analysis::assemble::{
        DiscussionAnalysis, IssueAnalysis, PrAnalysis, ReviewCommentary,
    };
    use crate::analysis::classify::{IssueCategory, PrType};
    use crate::analysis::scoring::{Priority, SizeCategory, rating_for};

    pub fn sample_pr(number: u64, total_score: f64) -> PrAnalysis {
        PrAnalysis {
            number,
            title: format!("feat: change {number}"),
            state: "open".to_owned(),
            labels: vec!["enhancement".to_owned()],
            created_at: "2024-05-01T10:00:00Z".to_owned(),
            merged_at: None,
            author: "alice".to_owned(),
            changed_files: 3,
            additions: 300,
            deletions: 10,
            commits: 4,
            pr_type: PrType::Feat,
            size_category: SizeCategory::Large,
            priority: Priority::P1,
            type_score: 10,
            size_score: 9,
            scores: DimensionScores {
                code_quality: 7,
                test_coverage: 7,
                doc_maintain: 7,
                compliance_security: 7,
                merge_history: 7,
                collaboration: 7,
            },
            total_score,
            rating: rating_for(total_score),
            commentary: ReviewCommentary::Advice("Looks solid overall.".to_owned()),
            created_in_period: true,
        }
    }

    pub fn sample_issue(number: u64, created_in_period: bool) -> IssueAnalysis {
        IssueAnalysis {
            number,
            title: format!("Crash report {number}"),
            state: "open".to_owned(),
            labels: vec!["bug".to_owned()],
            created_at: "2024-05-01T10:00:00Z".to_owned(),
            closed_at: None,
            author: "bob".to_owned(),
            assignees: Vec::new(),
            comments: 2,
            category: IssueCategory::Bug,
            summary: "The binary aborts at boot".to_owned(),
            created_in_period,
        }
    }

    pub fn sample_discussion(number: u64, created_in_period: bool) -> DiscussionAnalysis {
        DiscussionAnalysis {
            number,
            title: format!("Thread {number}"),
            state: "open".to_owned(),
            labels: Vec::new(),
            created_at: "2024-05-01T10:00:00Z".to_owned(),
            updated_at: "2024-05-01T12:00:00Z".to_owned(),
            author: "carol".to_owned(),
            comments: 5,
            category: "Ideas".to_owned(),
            summary: "Should we cache more aggressively".to_owned(),
            ai_summary: Some("Proposes a wider caching strategy".to_owned()),
            created_in_period,
        }
    }
}
