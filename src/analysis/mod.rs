pub mod score;

pub use score::{
    score, score_with_policy, ScoringPolicy, MAX_BAD_POINTS, MAX_GOOD_POINTS, SCORE_CEILING,
    SCORE_FLOOR,
};

use crate::scraping::metrics::extract_metrics;
use crate::types::{AnalysisReport, PageMetrics, ScoreResult};
use chrono::Utc;

/// Metrics and score for one fetched page.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub url: String,
    pub metrics: PageMetrics,
    pub result: ScoreResult,
}

impl PageAnalysis {
    pub fn summary(&self) -> String {
        format!(
            "This site scored {}/{} for SEO.",
            self.result.score, SCORE_CEILING
        )
    }

    pub fn into_report(self) -> AnalysisReport {
        let summary = self.summary();
        AnalysisReport {
            tested_url: self.url,
            seo_score: self.result.score,
            max_score: SCORE_CEILING,
            summary,
            metrics: self.metrics,
            good_points: self.result.good_points,
            bad_points: self.result.bad_points,
            analyzed_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Extract and score in one step.
pub fn analyze_html(url: &str, html: &str, policy: &ScoringPolicy) -> PageAnalysis {
    let metrics = extract_metrics(html);
    let result = score_with_policy(&metrics, policy);
    PageAnalysis {
        url: url.to_string(),
        metrics,
        result,
    }
}
