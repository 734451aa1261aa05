//! Heuristic sub-scores and the weighted composite score for pull requests.

use super::classify::PrType;

/// Size bucket derived from the total changed line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCategory {
    /// Fewer than 50 changed lines.
    Small,
    /// 50 to 200 changed lines, inclusive on both ends.
    Medium,
    /// More than 200 changed lines.
    Large,
}

impl SizeCategory {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Review priority derived from the pull request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// New features first.
    P1,
    /// Optimisations next.
    P2,
    /// Fixes and docs.
    P3,
    /// Test-only changes last.
    P4,
}

impl Priority {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }
}

/// Overall rating band for a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    /// Composite score above 80.
    Excellent,
    /// Composite score above 60, up to and including 80.
    Good,
    /// Composite score of 60 or below.
    Fair,
}

impl Rating {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
        }
    }
}

/// Fixed heuristic score for a pull request type, on a 0-10 scale.
#[must_use]
pub const fn type_score(pr_type: PrType) -> u8 {
    match pr_type {
        PrType::Feat => 10,
        PrType::Opt => 8,
        PrType::Fix => 6,
        PrType::Test => 4,
        PrType::Docs | PrType::Other => 5,
    }
}

/// Buckets a change by total line count and assigns its heuristic score.
///
/// The 50 and 200 thresholds are load-bearing for report bucketing: both
/// boundary values land in the medium bucket.
#[must_use]
pub const fn size_category_and_score(additions: u64, deletions: u64) -> (SizeCategory, u8) {
    let lines = additions + deletions;
    if lines < 50 {
        (SizeCategory::Small, 5)
    } else if lines <= 200 {
        (SizeCategory::Medium, 7)
    } else {
        (SizeCategory::Large, 9)
    }
}

/// Review priority for a pull request type.
#[must_use]
pub const fn priority_for(pr_type: PrType) -> Priority {
    match pr_type {
        PrType::Feat => Priority::P1,
        PrType::Opt => Priority::P2,
        PrType::Fix | PrType::Docs | PrType::Other => Priority::P3,
        PrType::Test => Priority::P4,
    }
}

const TYPE_WEIGHT: f64 = 0.05;
const SIZE_WEIGHT: f64 = 0.05;
const DIMENSION_WEIGHT: f64 = 0.15;

/// Weighted composite score on a 0-100 scale, rounded to one decimal.
///
/// Every input sits on a 0-10 scale and is scaled by 10 before weighting.
/// The heuristic signals (type, size) act as minor tie-breakers at 5%
/// each; the four baseline-quality dimensions and the two value dimensions
/// carry 15% each. Downstream rating thresholds assume exactly this
/// weighting.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn composite_score(
    type_score: u8,
    size_score: u8,
    code_quality: i64,
    test_coverage: i64,
    doc_maintain: i64,
    compliance_security: i64,
    merge_history: i64,
    collaboration: i64,
) -> f64 {
    let mut total = 0.0;
    total += f64::from(type_score) * 10.0 * TYPE_WEIGHT;
    total += f64::from(size_score) * 10.0 * SIZE_WEIGHT;
    for dimension in [
        code_quality,
        test_coverage,
        doc_maintain,
        compliance_security,
        merge_history,
        collaboration,
    ] {
        total += dimension as f64 * 10.0 * DIMENSION_WEIGHT;
    }
    (total * 10.0).round() / 10.0
}

/// Rating band for a composite score. Boundary values (exactly 80,
/// exactly 60) land in the lower band.
#[must_use]
pub fn rating_for(total_score: f64) -> Rating {
    if total_score > 80.0 {
        Rating::Excellent
    } else if total_score > 60.0 {
        Rating::Good
    } else {
        Rating::Fair
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::super::classify::PrType;
    use super::{
        Priority, Rating, SizeCategory, composite_score, priority_for, rating_for,
        size_category_and_score, type_score,
    };

    #[rstest]
    #[case(PrType::Feat, 10)]
    #[case(PrType::Opt, 8)]
    #[case(PrType::Fix, 6)]
    #[case(PrType::Test, 4)]
    #[case(PrType::Docs, 5)]
    #[case(PrType::Other, 5)]
    fn type_scores(#[case] pr_type: PrType, #[case] expected: u8) {
        assert_eq!(type_score(pr_type), expected);
    }

    #[rstest]
    #[case::zero(0, 0, SizeCategory::Small, 5)]
    #[case::just_below(30, 19, SizeCategory::Small, 5)]
    #[case::lower_boundary(25, 25, SizeCategory::Medium, 7)]
    #[case::upper_boundary(100, 100, SizeCategory::Medium, 7)]
    #[case::just_above(200, 1, SizeCategory::Large, 9)]
    #[case::huge(5000, 1000, SizeCategory::Large, 9)]
    fn size_boundaries(
        #[case] additions: u64,
        #[case] deletions: u64,
        #[case] category: SizeCategory,
        #[case] score: u8,
    ) {
        assert_eq!(size_category_and_score(additions, deletions), (category, score));
    }

    #[rstest]
    #[case(PrType::Feat, Priority::P1)]
    #[case(PrType::Opt, Priority::P2)]
    #[case(PrType::Fix, Priority::P3)]
    #[case(PrType::Docs, Priority::P3)]
    #[case(PrType::Other, Priority::P3)]
    #[case(PrType::Test, Priority::P4)]
    fn priorities(#[case] pr_type: PrType, #[case] expected: Priority) {
        assert_eq!(priority_for(pr_type), expected);
    }

    #[test]
    fn composite_score_matches_documented_weighting() {
        // 10*10*0.05 + 9*10*0.05 + 7*10*0.15*6 = 5 + 4.5 + 63 = 72.5
        let total = composite_score(10, 9, 7, 7, 7, 7, 7, 7);
        assert!((total - 72.5).abs() < f64::EPSILON);
    }

    #[test]
    fn composite_score_spans_zero_to_hundred() {
        let floor = composite_score(0, 0, 0, 0, 0, 0, 0, 0);
        let ceiling = composite_score(10, 10, 10, 10, 10, 10, 10, 10);
        assert!((floor - 0.0).abs() < f64::EPSILON);
        assert!((ceiling - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn composite_score_rounds_to_one_decimal() {
        // 5*0.5 + 5*0.5 + (3+4+5+6+7+8)*1.5 = 2.5 + 2.5 + 49.5 = 54.5
        let total = composite_score(5, 5, 3, 4, 5, 6, 7, 8);
        assert!((total - 54.5).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(80.1, Rating::Excellent)]
    #[case(80.0, Rating::Good)]
    #[case(60.1, Rating::Good)]
    #[case(60.0, Rating::Fair)]
    #[case(0.0, Rating::Fair)]
    fn rating_boundaries(#[case] score: f64, #[case] expected: Rating) {
        assert_eq!(rating_for(score), expected);
    }
}
