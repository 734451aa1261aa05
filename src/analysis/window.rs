//! Time-window computation and record partitioning.
//!
//! A report run covers one period window. Records are split into those
//! created inside the window and those merely updated inside it, so the
//! report can separate new items from new activity.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};

use crate::github::error::ReportError;
use crate::github::models::{RawDiscussion, RawIssue, RawPullRequest};

/// The reporting period selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    /// Midnight (report timezone) up to now; both ends inclusive.
    Today,
    /// The previous UTC day.
    Day,
    /// The previous Monday-to-Sunday week.
    Week,
}

impl PeriodKind {
    /// Parses the configuration value.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Configuration` for anything other than
    /// `today`, `day`, or `week`.
    pub fn parse(value: &str) -> Result<Self, ReportError> {
        match value.to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(ReportError::Configuration {
                message: format!("unsupported period '{other}': use 'today', 'day' or 'week'"),
            }),
        }
    }

    /// Human-readable period description for report headers.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Today => "today so far",
            Self::Day => "yesterday",
            Self::Week => "last week (Monday to Sunday)",
        }
    }

    /// Label added to the published issue (e.g. as a GitHub label).
    #[must_use]
    pub const fn issue_label(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Day => "daily",
            Self::Week => "weekly",
        }
    }

    /// Heading word for the report and issue titles.
    #[must_use]
    pub const fn display(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Day => "Daily",
            Self::Week => "Weekly",
        }
    }
}

/// A resolved period window.
///
/// The `Today` variant is closed on both ends; the other variants are
/// half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    kind: PeriodKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl PeriodWindow {
    /// Computes the window for a period kind relative to `now`.
    ///
    /// `offset` is the report timezone used to anchor the `Today`
    /// variant's midnight; the other variants are anchored in UTC.
    #[must_use]
    pub fn for_kind(kind: PeriodKind, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        match kind {
            PeriodKind::Today => {
                let local = now.with_timezone(&offset);
                let midnight = offset
                    .with_ymd_and_hms(local.year(), local.month(), local.day(), 0, 0, 0)
                    .single()
                    .map_or(now, |start| start.with_timezone(&Utc));
                Self {
                    kind,
                    start: midnight,
                    end: now,
                }
            }
            PeriodKind::Day => {
                let end = Utc
                    .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
                    .single()
                    .unwrap_or(now);
                Self {
                    kind,
                    start: end - Duration::days(1),
                    end,
                }
            }
            PeriodKind::Week => {
                let today = Utc
                    .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
                    .single()
                    .unwrap_or(now);
                let days_since_monday =
                    i64::from(today.weekday().num_days_from_monday());
                let start = today - Duration::days(days_since_monday + 7);
                Self {
                    kind,
                    start,
                    end: start + Duration::days(7),
                }
            }
        }
    }

    /// The period kind this window was derived from.
    #[must_use]
    pub const fn kind(&self) -> PeriodKind {
        self.kind
    }

    /// Window start (inclusive).
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window end (inclusive for `Today`, exclusive otherwise).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// ISO-8601 form of the window start, used as the `since` query hint.
    #[must_use]
    pub fn since(&self) -> String {
        self.start.to_rfc3339()
    }

    /// Whether a timestamp falls inside the window.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        match self.kind {
            PeriodKind::Today => self.start <= timestamp && timestamp <= self.end,
            PeriodKind::Day | PeriodKind::Week => {
                self.start <= timestamp && timestamp < self.end
            }
        }
    }
}

/// Parses an ISO-8601 timestamp; a trailing `Z` is accepted as UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// View of a record's identity and activity timestamps.
pub trait Timestamped {
    /// Deduplication identifier.
    fn id(&self) -> u64;
    /// Creation timestamp, if the source supplied one.
    fn created_at(&self) -> Option<&str>;
    /// Last-update timestamp, if the source supplied one.
    fn updated_at(&self) -> Option<&str>;
}

impl Timestamped for RawIssue {
    fn id(&self) -> u64 {
        self.number
    }
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

impl Timestamped for RawPullRequest {
    fn id(&self) -> u64 {
        self.number
    }
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

impl Timestamped for RawDiscussion {
    fn id(&self) -> u64 {
        self.number
    }
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

/// A record that survived window filtering, tagged with the bucket it
/// landed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Windowed<T> {
    /// The surviving record.
    pub record: T,
    /// True when the record was created inside the window, false when it
    /// was only updated inside it.
    pub created_in_period: bool,
}

impl<T: Timestamped> Timestamped for Windowed<T> {
    fn id(&self) -> u64 {
        self.record.id()
    }
    fn created_at(&self) -> Option<&str> {
        self.record.created_at()
    }
    fn updated_at(&self) -> Option<&str> {
        self.record.updated_at()
    }
}

/// Result of partitioning a record collection against a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPartition<T> {
    /// Surviving records: all created-in-period records first, then the
    /// updated-in-period records, deduplicated by identifier.
    pub records: Vec<Windowed<T>>,
    /// Created-in-period count before deduplication.
    pub created_count: usize,
    /// Updated-in-period count before deduplication.
    pub updated_count: usize,
}

/// Splits records into created-in-period and updated-in-period buckets.
///
/// A record with a missing or unparsable `created_at` is dropped, as is a
/// record whose present `updated_at` cannot be parsed. A missing
/// `updated_at` falls back to the creation time, which keeps the record
/// out of the updated bucket. The merged output lists created records
/// first and deduplicates by identifier with first occurrence winning, so
/// a record qualifying for both buckets reports as created.
#[must_use]
pub fn partition_by_window<T: Timestamped>(
    records: Vec<T>,
    window: &PeriodWindow,
) -> WindowPartition<T> {
    let mut created: Vec<T> = Vec::new();
    let mut updated: Vec<T> = Vec::new();

    for record in records {
        let Some(created_raw) = record.created_at() else {
            continue;
        };
        let Some(created_at) = parse_timestamp(created_raw) else {
            continue;
        };
        let updated_at = match record.updated_at() {
            None => created_at,
            Some(raw) if raw.is_empty() => created_at,
            Some(raw) => match parse_timestamp(raw) {
                Some(parsed) => parsed,
                None => continue,
            },
        };

        if window.contains(created_at) {
            created.push(record);
        } else if window.contains(updated_at) && updated_at != created_at {
            updated.push(record);
        }
    }

    let created_count = created.len();
    let updated_count = updated.len();

    let mut seen: HashSet<u64> = HashSet::new();
    let mut merged: Vec<Windowed<T>> = Vec::new();
    for (record, created_in_period) in created
        .into_iter()
        .map(|record| (record, true))
        .chain(updated.into_iter().map(|record| (record, false)))
    {
        if record.id() != 0 && seen.insert(record.id()) {
            merged.push(Windowed {
                record,
                created_in_period,
            });
        }
    }

    WindowPartition {
        records: merged,
        created_count,
        updated_count,
    }
}

/// Retains only the records created inside the window.
///
/// Pull requests use this simpler filter: the report has no
/// updated-in-period section for them.
#[must_use]
pub fn filter_created_in_window<T: Timestamped>(records: Vec<T>, window: &PeriodWindow) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| {
            record
                .created_at()
                .and_then(parse_timestamp)
                .is_some_and(|created_at| window.contains(created_at))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};
    use rstest::rstest;

    use crate::github::models::RawIssue;
    use crate::github::models::test_support::issue_with_timestamps;

    use super::{
        PeriodKind, PeriodWindow, Timestamped, filter_created_in_window, parse_timestamp,
        partition_by_window,
    };

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).expect("offset should be valid")
    }

    fn day_window() -> PeriodWindow {
        // now = 2024-05-02T09:30:00Z, so the day window is all of May 1st.
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).single().expect("valid");
        PeriodWindow::for_kind(PeriodKind::Day, now, utc_offset())
    }

    #[test]
    fn day_window_covers_previous_utc_day_half_open() {
        let window = day_window();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single().expect("valid");
        let end = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).single().expect("valid");
        assert_eq!(window.start(), start);
        assert_eq!(window.end(), end);
        assert!(window.contains(start));
        assert!(!window.contains(end));
    }

    #[test]
    fn today_window_is_closed_and_anchored_in_report_timezone() {
        // 2024-05-01T17:00:00Z is already May 2nd 01:00 at UTC+8, so the
        // window starts at May 1st 16:00 UTC.
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).single().expect("valid");
        let window = PeriodWindow::for_kind(PeriodKind::Today, now, utc_offset());
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).single().expect("valid");
        assert_eq!(window.start(), start);
        assert!(window.contains(now), "closed window includes its end");
    }

    #[test]
    fn week_window_spans_previous_monday_to_sunday() {
        // 2024-05-02 is a Thursday; the previous week runs Mon Apr 22 to
        // Mon Apr 29 (exclusive).
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).single().expect("valid");
        let window = PeriodWindow::for_kind(PeriodKind::Week, now, utc_offset());
        let start = Utc.with_ymd_and_hms(2024, 4, 22, 0, 0, 0).single().expect("valid");
        let end = Utc.with_ymd_and_hms(2024, 4, 29, 0, 0, 0).single().expect("valid");
        assert_eq!(window.start(), start);
        assert_eq!(window.end(), end);
    }

    #[rstest]
    #[case::zulu("2024-05-01T10:00:00Z")]
    #[case::offset("2024-05-01T18:00:00+08:00")]
    fn parse_timestamp_accepts_zulu_and_offset(#[case] raw: &str) {
        let parsed = parse_timestamp(raw).expect("timestamp should parse");
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single().expect("valid")
        );
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn partition_buckets_created_and_updated() {
        let records = vec![
            issue_with_timestamps(1, "2024-05-01T10:00:00Z", "2024-05-01T10:00:00Z"),
            issue_with_timestamps(2, "2024-04-20T10:00:00Z", "2024-05-01T12:00:00Z"),
            issue_with_timestamps(3, "2024-04-20T10:00:00Z", "2024-04-21T10:00:00Z"),
        ];
        let partition = partition_by_window(records, &day_window());

        assert_eq!(partition.created_count, 1);
        assert_eq!(partition.updated_count, 1);
        let flags: Vec<(u64, bool)> = partition
            .records
            .iter()
            .map(|windowed| (windowed.id(), windowed.created_in_period))
            .collect();
        assert_eq!(flags, vec![(1, true), (2, false)]);
    }

    #[test]
    fn partition_drops_unparsable_timestamps() {
        let mut bad_created = issue_with_timestamps(1, "not a date", "2024-05-01T10:00:00Z");
        bad_created.title = Some("bad created".to_owned());
        let bad_updated = issue_with_timestamps(2, "2024-05-01T10:00:00Z", "not a date");
        let missing_created = RawIssue {
            number: 3,
            updated_at: Some("2024-05-01T10:00:00Z".to_owned()),
            ..RawIssue::default()
        };

        let partition =
            partition_by_window(vec![bad_created, bad_updated, missing_created], &day_window());
        assert!(partition.records.is_empty());
    }

    #[test]
    fn update_equal_to_creation_is_not_activity() {
        let records = vec![issue_with_timestamps(
            7,
            "2024-04-20T10:00:00Z",
            "2024-04-20T10:00:00Z",
        )];
        let partition = partition_by_window(records, &day_window());
        assert!(partition.records.is_empty());
    }

    #[test]
    fn missing_updated_at_falls_back_to_creation_time() {
        let mut record = issue_with_timestamps(4, "2024-05-01T10:00:00Z", "");
        record.updated_at = None;
        let partition = partition_by_window(vec![record], &day_window());
        assert_eq!(partition.records.len(), 1);
        assert!(partition.records[0].created_in_period);
    }

    #[test]
    fn duplicate_identifiers_keep_first_occurrence() {
        let records = vec![
            issue_with_timestamps(5, "2024-05-01T08:00:00Z", "2024-05-01T08:00:00Z"),
            issue_with_timestamps(5, "2024-04-01T08:00:00Z", "2024-05-01T09:00:00Z"),
        ];
        let partition = partition_by_window(records, &day_window());
        assert_eq!(partition.records.len(), 1);
        assert!(partition.records[0].created_in_period);
    }

    #[test]
    fn partition_is_idempotent_on_its_own_output() {
        let records = vec![
            issue_with_timestamps(1, "2024-05-01T10:00:00Z", "2024-05-01T11:00:00Z"),
            issue_with_timestamps(2, "2024-04-20T10:00:00Z", "2024-05-01T12:00:00Z"),
        ];
        let window = day_window();
        let first = partition_by_window(records, &window);
        let second = partition_by_window(first.records.clone(), &window);

        let inner: Vec<_> = second
            .records
            .iter()
            .map(|windowed| windowed.record.clone())
            .collect();
        assert_eq!(first.records, inner);
        for windowed in &second.records {
            assert_eq!(windowed.created_in_period, windowed.record.created_in_period);
        }
    }

    #[test]
    fn created_filter_keeps_only_in_window_records() {
        let records = vec![
            issue_with_timestamps(1, "2024-05-01T10:00:00Z", "2024-05-01T10:00:00Z"),
            issue_with_timestamps(2, "2024-04-20T10:00:00Z", "2024-05-01T12:00:00Z"),
        ];
        let filtered = filter_created_in_window(records, &day_window());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].number, 1);
    }
}
