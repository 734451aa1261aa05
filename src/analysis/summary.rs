//! Text summarisation, cross-reference sanitisation, and the scoring
//! context document sent to the external reviewer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::github::models::{FileStatus, RawPullRequest};

use super::classify::{PrType, detect_pr_type, detect_wip};

/// Issue/discussion template blocks stripped before summarising.
///
/// Matched case-insensitively with `.` spanning line breaks, so a block is
/// consumed greedily up to the next section header.
static TEMPLATE_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)### Check Ahead.*?###",
        r"(?is)### Checklist.*?###",
        r"(?is)\[x\] I have searched.*?###",
        r"(?is)### Environment.*?###",
        r"(?is)### Description.*?###",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("template pattern should compile"))
    .collect()
});

/// Residual template markers that force the title-only fallback.
const RESIDUAL_MARKERS: [&str; 2] = ["check ahead", "searched the issues"];

/// Cross-reference rewrites applied in order, most specific first, so the
/// generic `#123` rule cannot consume the word-prefixed forms.
static REFERENCE_REWRITES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bpull\s+request\s+#(\d+)", "PR-$1"),
        (r"(?i)\bdiscussion\s+#(\d+)", "Discussion-$1"),
        (r"(?i)\bissue\s+#(\d+)", "Issue-$1"),
        (r"(?i)\bpr\s+#(\d+)", "PR-$1"),
        (r"(\w+)/(\w+)#(\d+)", "$1-$2-$3"),
        (r"(\w+)#(\d+)", "$1-$2"),
        (r"#(\d+)", "Item-$1"),
    ]
    .iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("reference pattern should compile"),
            *replacement,
        )
    })
    .collect()
});

/// Truncates to `max_chars` characters, appending `...` when shortened.
///
/// Output length never exceeds `max_chars + 3`. Operates on character
/// counts, never byte offsets, so multi-byte text cannot split.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let mut output: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        output.push_str("...");
    }
    output
}

/// Truncates to `max_chars` characters with no ellipsis marker.
#[must_use]
pub fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Produces a one-line summary from a title and body.
///
/// Template boilerplate is stripped from the body, the remainder is
/// joined with the title and whitespace-collapsed. When the combined text
/// is shorter than 20 characters or still carries template markers, the
/// (possibly truncated) title alone is returned instead.
#[must_use]
pub fn summarize(title: &str, body: &str, max_chars: usize) -> String {
    let mut cleaned_body = body.to_owned();
    for pattern in TEMPLATE_BLOCKS.iter() {
        cleaned_body = pattern.replace_all(&cleaned_body, "").into_owned();
    }

    let combined = format!("{title} {cleaned_body}");
    let text = combined.split_whitespace().collect::<Vec<_>>().join(" ");

    let lowered = text.to_lowercase();
    if text.trim().chars().count() < 20
        || RESIDUAL_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
    {
        return truncate_with_ellipsis(title, max_chars);
    }

    truncate_with_ellipsis(&text, max_chars)
}

/// Rewrites cross-reference shorthand into non-linkable plain text.
///
/// `owner/repo#123` becomes `owner-repo-123`, `apache#123` becomes
/// `apache-123`, `issue #123` becomes `Issue-123`, `pr #123` and
/// `pull request #123` become `PR-123`, `discussion #123` becomes
/// `Discussion-123`, and any leftover `#123` becomes `Item-123`. The
/// rendered report and any created issue must not accidentally link to
/// unrelated items.
#[must_use]
pub fn clean_references(text: &str) -> String {
    let mut cleaned = text.to_owned();
    for (pattern, replacement) in REFERENCE_REWRITES.iter() {
        cleaned = pattern.replace_all(&cleaned, *replacement).into_owned();
    }
    cleaned
}

const MAX_FILES_CONSIDERED: usize = 50;
const MAX_ADDED_SHOWN: usize = 20;
const MAX_MODIFIED_SHOWN: usize = 30;
const MAX_REMOVED_SHOWN: usize = 10;

/// Assembles the structured context document handed to the external
/// scorer.
///
/// This output is the scorer's only view of the pull request, so the
/// layout is a formatting contract: overview metadata, change statistics,
/// the sanitised description, a categorised file listing, labels, and
/// closing hints keyed off the detected type and WIP status.
#[must_use]
pub fn build_pr_context(pull_request: &RawPullRequest) -> String {
    let title = pull_request.title.as_deref().unwrap_or("");
    let body = pull_request.body.as_deref().unwrap_or("");
    let body = if body.is_empty() {
        "No description".to_owned()
    } else {
        clean_references(body)
    };
    let author = pull_request.author.as_deref().unwrap_or("unknown");
    let pr_type = detect_pr_type(title, &body, &pull_request.labels);
    let is_wip = detect_wip(title, &body, &pull_request.labels);

    let mut context = String::new();
    context.push_str("## Pull Request Overview\n\n");
    context.push_str(&format!("**Title**: {title}\n"));
    context.push_str(&format!("**Author**: {author}\n"));
    context.push_str(&format!("**Type**: {}\n", pr_type.label()));
    if is_wip {
        context.push_str(
            "**Status**: WIP (in progress) - score on expected value and importance; \
             do not mark it down for being unfinished\n",
        );
    } else {
        let state = pull_request.state.as_deref().unwrap_or("unknown");
        context.push_str(&format!("**Status**: {state}"));
        if let Some(merged_at) = pull_request.merged_at.as_deref() {
            context.push_str(&format!(" (merged at {merged_at})"));
        }
        context.push('\n');
    }
    context.push_str(&format!(
        "**Created**: {}\n",
        pull_request.created_at.as_deref().unwrap_or("unknown")
    ));
    if let Some(updated_at) = pull_request.updated_at.as_deref() {
        context.push_str(&format!("**Updated**: {updated_at}\n"));
    }

    context.push_str("\n**Change statistics**:\n");
    context.push_str(&format!(
        "- Changed files: {}\n",
        pull_request.changed_files
    ));
    context.push_str(&format!("- Added lines: +{}\n", pull_request.additions));
    context.push_str(&format!("- Deleted lines: -{}\n", pull_request.deletions));
    context.push_str(&format!("- Commits: {}\n", pull_request.commits));
    context.push_str(&format!("- Comments: {}\n", pull_request.comments));
    if pull_request.review_comments > 0 {
        context.push_str(&format!(
            "- Review comments: {}\n",
            pull_request.review_comments
        ));
    }

    context.push_str(&format!("\n**Description**:\n{body}\n\n"));

    push_file_changes(&mut context, pull_request);

    if !pull_request.labels.is_empty() {
        context.push_str(&format!(
            "**Labels**: {}\n\n",
            pull_request.labels.join(", ")
        ));
    }

    context.push_str("**Scoring hints**:\n");
    match pr_type {
        PrType::Feat | PrType::Opt => {
            context.push_str(&format!(
                "- This is a {} pull request; these usually carry high value, and a \
                 wide blast radius is reasonable when the change is important\n",
                pr_type.label()
            ));
        }
        PrType::Test | PrType::Docs => {
            context.push_str(&format!(
                "- This is a {} pull request; these carry comparatively low value, and a \
                 wide blast radius with low importance deserves a low score (it adds \
                 review burden without much need)\n",
                pr_type.label()
            ));
        }
        PrType::Fix | PrType::Other => {}
    }
    if is_wip {
        context.push_str(
            "- This is a WIP pull request; score its expected value and importance, \
             focusing on the effect once it lands\n",
        );
    }

    context.push_str("---\n\n");
    context.push_str(
        "Assess this pull request professionally, focusing on its value, its \
         importance, and whether its scope of impact is reasonable.",
    );

    context
}

fn push_file_changes(context: &mut String, pull_request: &RawPullRequest) {
    if pull_request.files.is_empty() {
        return;
    }

    context.push_str("## File Changes\n\n");
    let mut added: Vec<String> = Vec::new();
    let mut modified: Vec<String> = Vec::new();
    let mut removed: Vec<String> = Vec::new();

    for file in pull_request.files.iter().take(MAX_FILES_CONSIDERED) {
        let changes = file.additions + file.deletions;
        match file.status {
            FileStatus::Added => added.push(format!(
                "- `{}` (added, +{} lines)",
                file.filename, file.additions
            )),
            FileStatus::Removed => removed.push(format!(
                "- `{}` (removed, -{} lines)",
                file.filename, file.deletions
            )),
            FileStatus::Modified => modified.push(format!(
                "- `{}` (modified, +{}/-{}, {changes} lines changed)",
                file.filename, file.additions, file.deletions
            )),
        }
    }

    if !added.is_empty() {
        context.push_str("### Added files:\n");
        context.push_str(&added[..added.len().min(MAX_ADDED_SHOWN)].join("\n"));
        context.push_str("\n\n");
    }
    if !modified.is_empty() {
        context.push_str("### Modified files:\n");
        context.push_str(&modified[..modified.len().min(MAX_MODIFIED_SHOWN)].join("\n"));
        context.push_str("\n\n");
    }
    if !removed.is_empty() {
        context.push_str("### Removed files:\n");
        context.push_str(&removed[..removed.len().min(MAX_REMOVED_SHOWN)].join("\n"));
        context.push_str("\n\n");
    }

    let total_changes: u64 = pull_request
        .files
        .iter()
        .map(|file| file.additions + file.deletions)
        .sum();
    context.push_str(&format!(
        "**Total**: {} files, {total_changes} changed lines\n\n",
        pull_request.files.len()
    ));
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::github::models::{FileStatus, PullRequestFile, RawPullRequest};

    use super::{build_pr_context, clean_references, summarize, truncate_with_ellipsis};

    #[rstest]
    #[case::repo_shorthand("Fixes apache#123 and #45", "Fixes apache-123 and Item-45")]
    #[case::owner_repo("see rust-lang/rust#99", "see rust-lang-rust-99")]
    #[case::issue_word("closes issue #123", "closes Issue-123")]
    #[case::pr_word("depends on pr #7", "depends on PR-7")]
    #[case::pull_request_words("see pull request #7", "see PR-7")]
    #[case::discussion_word("from discussion #12", "from Discussion-12")]
    #[case::bare("ref #5", "ref Item-5")]
    #[case::mixed_case("Closes Issue #8", "Closes Issue-8")]
    #[case::untouched("no references here", "no references here")]
    fn reference_rewrites(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_references(input), expected);
    }

    #[test]
    fn specific_patterns_are_not_double_rewritten() {
        // "issue #123" must not first degrade into "issue Item-123".
        assert_eq!(
            clean_references("issue #123 and pr #4 and #9"),
            "Issue-123 and PR-4 and Item-9"
        );
    }

    #[test]
    fn summarize_joins_title_and_body() {
        let summary = summarize("Crash on start", "The app panics when the config is missing", 200);
        assert_eq!(
            summary,
            "Crash on start The app panics when the config is missing"
        );
    }

    #[test]
    fn summarize_strips_template_blocks() {
        let body = "### Check Ahead\n- [x] I have searched the issues\n### Environment\nlinux\n### Description actual problem text that is long enough";
        let summary = summarize("Broken pipeline", body, 200);
        assert!(!summary.to_lowercase().contains("check ahead"));
    }

    #[test]
    fn summarize_falls_back_to_title_when_text_is_short() {
        assert_eq!(summarize("Tiny", "", 200), "Tiny");
    }

    #[test]
    fn summarize_of_empty_inputs_is_empty() {
        assert_eq!(summarize("", "", 200), "");
    }

    #[test]
    fn summarize_falls_back_when_residual_markers_survive() {
        let summary = summarize(
            "Login fails",
            "please check ahead before filing anything else here",
            200,
        );
        assert_eq!(summary, "Login fails");
    }

    #[test]
    fn summarize_truncates_with_ellipsis() {
        let body = "word ".repeat(100);
        let summary = summarize("Long report", &body, 40);
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() <= 43);
    }

    #[test]
    fn truncate_never_exceeds_limit_plus_marker() {
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abcd...");
        assert_eq!(truncate_with_ellipsis("abcd", 4), "abcd");
        assert_eq!(truncate_with_ellipsis("héllo wörld", 5), "héllo...");
    }

    fn sample_pull_request() -> RawPullRequest {
        RawPullRequest {
            number: 42,
            title: Some("feat: add caching layer".to_owned()),
            body: Some("Implements a cache, see #12".to_owned()),
            state: Some("open".to_owned()),
            author: Some("alice".to_owned()),
            labels: vec!["enhancement".to_owned()],
            created_at: Some("2024-05-01T10:00:00Z".to_owned()),
            additions: 300,
            deletions: 10,
            changed_files: 3,
            commits: 4,
            comments: 2,
            files: vec![
                PullRequestFile {
                    filename: "src/cache.rs".to_owned(),
                    status: FileStatus::Added,
                    additions: 280,
                    deletions: 0,
                },
                PullRequestFile {
                    filename: "src/lib.rs".to_owned(),
                    status: FileStatus::Modified,
                    additions: 20,
                    deletions: 10,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn pr_context_carries_metadata_statistics_and_hints() {
        let context = build_pr_context(&sample_pull_request());
        assert!(context.contains("**Title**: feat: add caching layer"));
        assert!(context.contains("**Type**: feat"));
        assert!(context.contains("- Added lines: +300"));
        assert!(context.contains("### Added files:"));
        assert!(context.contains("`src/cache.rs` (added, +280 lines)"));
        assert!(context.contains("**Total**: 2 files, 310 changed lines"));
        assert!(context.contains("**Labels**: enhancement"));
        assert!(context.contains("high value"));
        // References in the body must be sanitised before the scorer sees
        // them.
        assert!(context.contains("see Item-12"));
        assert!(!context.contains("see #12"));
    }

    #[test]
    fn pr_context_replaces_empty_body_and_flags_wip() {
        let mut pull_request = sample_pull_request();
        pull_request.title = Some("[WIP] feat: add caching layer".to_owned());
        pull_request.body = None;
        let context = build_pr_context(&pull_request);
        assert!(context.contains("No description"));
        assert!(context.contains("WIP (in progress)"));
        assert!(context.contains("score its expected value"));
    }
}
