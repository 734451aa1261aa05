//! The analysis core: classifiers, scoring, summarisation, window
//! partitioning, and assembly of per-record analysis results.

pub mod assemble;
pub mod classify;
pub mod scoring;
pub mod summary;
pub mod window;

pub use assemble::{
    DiscussionAnalysis, IssueAnalysis, PrAnalysis, ReviewCommentary, analyze_discussions,
    analyze_issues, analyze_pull_requests,
};
pub use classify::{IssueCategory, PrType, classify_issue_category, detect_pr_type, detect_wip};
pub use scoring::{
    Priority, Rating, SizeCategory, composite_score, priority_for, rating_for,
    size_category_and_score, type_score,
};
pub use summary::{build_pr_context, clean_references, summarize};
pub use window::{
    PeriodKind, PeriodWindow, Timestamped, WindowPartition, Windowed, filter_created_in_window,
    parse_timestamp, partition_by_window,
};
