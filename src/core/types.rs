use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────────────────
// Page analysis
// ───────────────────────────────────────────────────────────────────────────

/// SEO signals derived from one HTML document.
///
/// Built once by [`crate::scraping::metrics::extract_metrics`] and never
/// mutated afterwards. Missing elements show up as empty strings, `false` or
/// zero rather than as an error.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    pub title: String,
    /// Unicode scalar count of `title`.
    pub title_length: usize,
    pub meta_description: String,
    pub meta_description_length: usize,
    pub canonical_url: String,
    /// True when some `<h1>` carries non-empty text.
    pub has_heading: bool,
    pub total_images: usize,
    /// Always `<= total_images`.
    pub images_without_alt_text: usize,
}

impl PageMetrics {
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    pub fn has_meta_description(&self) -> bool {
        !self.meta_description.is_empty()
    }

    pub fn has_canonical(&self) -> bool {
        !self.canonical_url.is_empty()
    }

    /// No title, description, canonical or heading: nothing to work with.
    pub fn is_structurally_empty(&self) -> bool {
        !self.has_title() && !self.has_meta_description() && !self.has_canonical() && !self.has_heading
    }
}

/// Bounded score plus the human-readable checks that produced it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: u8,
    pub good_points: Vec<String>,
    pub bad_points: Vec<String>,
}

// ───────────────────────────────────────────────────────────────────────────
// HTTP surface
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "html" => Some(OutputFormat::Html),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AnalyzeQuery {
    #[serde(default)]
    pub url: Option<String>,
    /// `json` (default) or `html`. Kept as text so a bad value gets a JSON error.
    #[serde(default)]
    pub format: Option<String>,
}

/// JSON body returned by `/analyze`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub tested_url: String,
    pub seo_score: u8,
    pub max_score: u8,
    pub summary: String,
    pub metrics: PageMetrics,
    pub good_points: Vec<String>,
    pub bad_points: Vec<String>,
    /// RFC 3339 timestamp.
    pub analyzed_at: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FriendlyQuery {
    #[serde(default, rename = "type")]
    pub report_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
