//! Tests for configuration defaults and secret resolution.

use crate::github::error::ReportError;

use super::{HeraldConfig, resolve_secret};

#[test]
fn defaults_match_documented_values() {
    let config = HeraldConfig::default();
    assert_eq!(config.ai_model, "qwen-plus");
    assert_eq!(config.ai_max_requests_per_minute, 30);
    assert_eq!(config.period, "day");
    assert_eq!(config.max_issue_count, 300);
    assert_eq!(config.max_pr_count, 200);
    assert_eq!(config.max_discussion_count, 100);
    assert_eq!(config.report_dir, "reports");
    assert!(!config.create_issue);
    assert_eq!(
        config.issue_labels,
        vec!["automated".to_owned(), "report".to_owned()]
    );
    assert_eq!(config.utc_offset_hours, 8);
}

#[test]
fn source_repository_is_required() {
    let config = HeraldConfig::default();
    let error = config
        .require_source()
        .expect_err("missing source should fail");
    assert!(matches!(error, ReportError::Configuration { .. }));
}

#[test]
fn configured_repositories_resolve_to_locators() {
    let config = HeraldConfig {
        source_owner: Some("apache".to_owned()),
        source_repo: Some("answer".to_owned()),
        target_owner: Some("octocat".to_owned()),
        target_repo: Some("reports".to_owned()),
        ..HeraldConfig::default()
    };
    assert_eq!(
        config
            .require_source()
            .expect("source should resolve")
            .full_name(),
        "apache/answer"
    );
    assert_eq!(
        config
            .require_target()
            .expect("target should resolve")
            .full_name(),
        "octocat/reports"
    );
}

#[test]
fn unsupported_period_is_a_configuration_error() {
    let config = HeraldConfig {
        period: "fortnight".to_owned(),
        ..HeraldConfig::default()
    };
    assert!(matches!(
        config.period_kind(),
        Err(ReportError::Configuration { .. })
    ));
}

#[test]
fn resolve_secret_passes_plain_values_through() {
    let resolved = resolve_secret(Some("ghp_plain"), |_| None);
    assert_eq!(resolved.as_deref(), Some("ghp_plain"));
}

#[test]
fn resolve_secret_expands_env_references() {
    let resolved = resolve_secret(Some("${MY_SECRET}"), |name| {
        (name == "MY_SECRET").then(|| "resolved-value".to_owned())
    });
    assert_eq!(resolved.as_deref(), Some("resolved-value"));
}

#[test]
fn resolve_secret_returns_none_for_missing_reference() {
    assert!(resolve_secret(Some("${ABSENT}"), |_| None).is_none());
}

#[test]
fn resolve_secret_ignores_blank_values() {
    assert!(resolve_secret(Some("   "), |_| None).is_none());
    assert!(resolve_secret(None, |_| None).is_none());
}
