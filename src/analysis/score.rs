use crate::types::{PageMetrics, ScoreResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const SCORE_FLOOR: u8 = 1;
pub const SCORE_CEILING: u8 = 10;
pub const MAX_GOOD_POINTS: usize = 10;
pub const MAX_BAD_POINTS: usize = 15;

/// Generic statements used to pad `good_points` up to
/// [`ScoringPolicy::good_point_target`]. Appended in order, never shuffled.
const FILLER_GOOD_POINTS: &[&str] = &[
    "Page responded with parseable HTML.",
    "Document structure could be analysed without errors.",
    "Page is reachable by crawlers.",
    "Markup is served as a single HTML document.",
    "Content is available without client-side rendering for the checked tags.",
];

/// Penalties and windows used by [`score_with_policy`].
///
/// Loaded from the `scoring` section of `seo-scout.json`; any omitted field
/// keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub missing_title_penalty: u8,
    pub title_length_penalty: u8,
    pub title_min_chars: usize,
    pub title_max_chars: usize,
    pub missing_description_penalty: u8,
    pub description_length_penalty: u8,
    pub description_min_chars: usize,
    pub description_max_chars: usize,
    pub missing_canonical_penalty: u8,
    pub missing_heading_penalty: u8,
    /// Per image without alt text.
    pub missing_alt_penalty: u8,
    pub max_alt_penalty: u8,
    /// Pad `good_points` with filler up to this many entries. `0` disables.
    pub good_point_target: usize,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            missing_title_penalty: 2,
            title_length_penalty: 1,
            title_min_chars: 30,
            title_max_chars: 60,
            missing_description_penalty: 2,
            description_length_penalty: 1,
            description_min_chars: 50,
            description_max_chars: 160,
            missing_canonical_penalty: 1,
            missing_heading_penalty: 1,
            missing_alt_penalty: 1,
            max_alt_penalty: 3,
            good_point_target: 0,
        }
    }
}

impl ScoringPolicy {
    fn title_window(&self) -> RangeInclusive<usize> {
        self.title_min_chars..=self.title_max_chars
    }

    fn description_window(&self) -> RangeInclusive<usize> {
        self.description_min_chars..=self.description_max_chars
    }
}

/// Score with the default policy.
pub fn score(metrics: &PageMetrics) -> ScoreResult {
    score_with_policy(metrics, &ScoringPolicy::default())
}

/// Start from [`SCORE_CEILING`], subtract one penalty per failed check and
/// clamp to `[SCORE_FLOOR, SCORE_CEILING]`.
///
/// A page with no title, description, canonical or heading is scored at the
/// floor outright. The score therefore jumps: an empty page scores 1, while
/// the same page with only a one-character title scores 5 (10 minus the
/// title-length, description, canonical and heading penalties).
pub fn score_with_policy(metrics: &PageMetrics, policy: &ScoringPolicy) -> ScoreResult {
    let mut penalty: u32 = 0;
    let mut good_points = Vec::new();
    let mut bad_points = Vec::new();

    // Title
    if !metrics.has_title() {
        penalty += u32::from(policy.missing_title_penalty);
        bad_points.push("Page is missing a <title> tag.".to_string());
    } else if !policy.title_window().contains(&metrics.title_length) {
        penalty += u32::from(policy.title_length_penalty);
        bad_points.push(format!(
            "Title is {} characters long; aim for {}-{} characters.",
            metrics.title_length, policy.title_min_chars, policy.title_max_chars
        ));
    } else {
        good_points.push(format!(
            "Title is {} characters long, within the recommended {}-{}.",
            metrics.title_length, policy.title_min_chars, policy.title_max_chars
        ));
    }

    // Meta description
    if !metrics.has_meta_description() {
        penalty += u32::from(policy.missing_description_penalty);
        bad_points.push("Page is missing a meta description.".to_string());
    } else if !policy
        .description_window()
        .contains(&metrics.meta_description_length)
    {
        penalty += u32::from(policy.description_length_penalty);
        bad_points.push(format!(
            "Meta description is {} characters long; aim for {}-{} characters.",
            metrics.meta_description_length,
            policy.description_min_chars,
            policy.description_max_chars
        ));
    } else {
        good_points.push(format!(
            "Meta description is {} characters long, within the recommended {}-{}.",
            metrics.meta_description_length,
            policy.description_min_chars,
            policy.description_max_chars
        ));
    }

    // Canonical
    if metrics.has_canonical() {
        good_points.push(format!("Canonical URL is declared ({}).", metrics.canonical_url));
    } else {
        penalty += u32::from(policy.missing_canonical_penalty);
        bad_points.push("No canonical link is declared.".to_string());
    }

    // Heading
    if metrics.has_heading {
        good_points.push("Page has a top-level <h1> heading.".to_string());
    } else {
        penalty += u32::from(policy.missing_heading_penalty);
        bad_points.push("Page has no top-level <h1> heading.".to_string());
    }

    // Images
    if metrics.images_without_alt_text > 0 {
        let per_image = u32::try_from(metrics.images_without_alt_text)
            .unwrap_or(u32::MAX)
            .saturating_mul(u32::from(policy.missing_alt_penalty));
        penalty += per_image.min(u32::from(policy.max_alt_penalty));
        bad_points.push(format!(
            "{} of {} images are missing alt text.",
            metrics.images_without_alt_text, metrics.total_images
        ));
    } else if metrics.total_images > 0 {
        good_points.push(format!("All {} images have alt text.", metrics.total_images));
    }

    let score = if metrics.is_structurally_empty() {
        SCORE_FLOOR
    } else {
        clamp_score(i64::from(SCORE_CEILING) - i64::from(penalty))
    };

    let target = policy.good_point_target.min(MAX_GOOD_POINTS);
    for filler in FILLER_GOOD_POINTS {
        if good_points.len() >= target {
            break;
        }
        good_points.push((*filler).to_string());
    }

    good_points.truncate(MAX_GOOD_POINTS);
    bad_points.truncate(MAX_BAD_POINTS);

    ScoreResult {
        score,
        good_points,
        bad_points,
    }
}

fn clamp_score(raw: i64) -> u8 {
    let clamped = raw.clamp(i64::from(SCORE_FLOOR), i64::from(SCORE_CEILING));
    u8::try_from(clamped).unwrap_or(SCORE_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::metrics::extract_metrics;

    fn optimal_metrics() -> PageMetrics {
        PageMetrics {
            title: "t".repeat(45),
            title_length: 45,
            meta_description: "d".repeat(100),
            meta_description_length: 100,
            canonical_url: "https://example.com/".to_string(),
            has_heading: true,
            total_images: 0,
            images_without_alt_text: 0,
        }
    }

    #[test]
    fn test_optimal_page_scores_maximum() {
        let html = format!(
            r#"<html><head>
                <title>{}</title>
                <meta name="description" content="{}">
                <link rel="canonical" href="https://example.com/">
            </head><body><h1>Welcome</h1><p>Hello.</p></body></html>"#,
            "a".repeat(45),
            "b".repeat(100)
        );
        let result = score(&extract_metrics(&html));

        assert_eq!(result.score, SCORE_CEILING);
        assert!(result.bad_points.is_empty(), "{:?}", result.bad_points);
        assert_eq!(result.good_points.len(), 4);
        assert!(result.good_points[0].starts_with("Title"));
        assert!(result.good_points[1].starts_with("Meta description"));
        assert!(result.good_points[2].starts_with("Canonical"));
        assert!(result.good_points[3].contains("<h1>"));
    }

    #[test]
    fn test_everything_missing_scores_floor() {
        let html = r#"<body><img src="1"><img src="2"><img src="3"><img src="4"><img src="5"></body>"#;
        let metrics = extract_metrics(html);
        assert_eq!(metrics.total_images, 5);
        assert_eq!(metrics.images_without_alt_text, 5);

        let result = score(&metrics);
        assert_eq!(result.score, SCORE_FLOOR);
        assert!(result.good_points.is_empty());
        assert_eq!(result.bad_points.len(), 5);
        assert!(result.bad_points[4].contains("5 of 5 images"));
    }

    #[test]
    fn test_short_title_gets_length_penalty_not_missing_penalty() {
        let mut metrics = optimal_metrics();
        metrics.title = "x".repeat(20);
        metrics.title_length = 20;

        let result = score(&metrics);
        assert_eq!(result.score, SCORE_CEILING - 1);
        assert_eq!(result.bad_points.len(), 1);
        assert!(result.bad_points[0].contains("20 characters"));
    }

    #[test]
    fn test_long_description_gets_length_penalty() {
        let mut metrics = optimal_metrics();
        metrics.meta_description_length = 200;
        let result = score(&metrics);
        assert_eq!(result.score, 9);
    }

    #[test]
    fn test_empty_input_scores_floor_with_all_bad_points() {
        let metrics = extract_metrics("");
        let result = score(&metrics);
        assert_eq!(result.score, SCORE_FLOOR);
        assert!(result.good_points.is_empty());
        assert_eq!(result.bad_points.len(), 4);
        assert!(result.bad_points.iter().any(|p| p.contains("<title>")));
        assert!(result.bad_points.iter().any(|p| p.contains("meta description")));
        assert!(result.bad_points.iter().any(|p| p.contains("canonical")));
        assert!(result.bad_points.iter().any(|p| p.contains("<h1>")));
    }

    #[test]
    fn test_single_signal_leaves_the_floor() {
        let empty = PageMetrics::default();
        let one_char_title = PageMetrics {
            title: "x".to_string(),
            title_length: 1,
            ..PageMetrics::default()
        };
        assert_eq!(score(&empty).score, SCORE_FLOOR);
        assert_eq!(score(&one_char_title).score, 5);
    }

    #[test]
    fn test_alt_penalty_is_capped() {
        let mut metrics = optimal_metrics();
        metrics.total_images = 40;
        metrics.images_without_alt_text = 40;
        assert_eq!(score(&metrics).score, 7);

        metrics.images_without_alt_text = 2;
        assert_eq!(score(&metrics).score, 8);
    }

    #[test]
    fn test_all_images_with_alt_is_a_good_point() {
        let mut metrics = optimal_metrics();
        metrics.total_images = 3;
        let result = score(&metrics);
        assert_eq!(result.score, SCORE_CEILING);
        assert!(result.good_points.iter().any(|p| p == "All 3 images have alt text."));
    }

    #[test]
    fn test_score_stays_in_range_under_harsh_policy() {
        let policy = ScoringPolicy {
            missing_canonical_penalty: 200,
            missing_heading_penalty: 200,
            ..ScoringPolicy::default()
        };
        let mut metrics = optimal_metrics();
        metrics.canonical_url.clear();
        metrics.has_heading = false;
        let result = score_with_policy(&metrics, &policy);
        assert_eq!(result.score, SCORE_FLOOR);
    }

    #[test]
    fn test_filler_pads_good_points_deterministically() {
        let policy = ScoringPolicy {
            good_point_target: 6,
            ..ScoringPolicy::default()
        };
        let first = score_with_policy(&optimal_metrics(), &policy);
        let second = score_with_policy(&optimal_metrics(), &policy);
        assert_eq!(first.good_points.len(), 6);
        assert_eq!(first.good_points[4], FILLER_GOOD_POINTS[0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_filler_never_exceeds_cap() {
        let policy = ScoringPolicy {
            good_point_target: 50,
            ..ScoringPolicy::default()
        };
        let result = score_with_policy(&optimal_metrics(), &policy);
        assert!(result.good_points.len() <= MAX_GOOD_POINTS);
    }

    #[test]
    fn test_extract_and_score_is_idempotent() {
        let html = r#"<title>Short</title><h1>Hi</h1><img src="x"><meta name="description" content="tiny">"#;
        let a = score(&extract_metrics(html));
        let b = score(&extract_metrics(html));
        assert_eq!(a, b);
        assert_eq!(extract_metrics(html), extract_metrics(html));
    }

    #[test]
    fn test_policy_deserializes_partial_overrides() {
        let policy: ScoringPolicy =
            serde_json::from_str(r#"{"title_min_chars": 10, "max_alt_penalty": 5}"#).unwrap();
        assert_eq!(policy.title_min_chars, 10);
        assert_eq!(policy.max_alt_penalty, 5);
        assert_eq!(policy.title_max_chars, 60);
    }
}
