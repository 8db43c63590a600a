//! AI-SEO reports delegated to an external language model.
//!
//! The model is treated as an untrusted collaborator: whatever it returns is
//! run through [`parse_structured_report`] before it reaches a client, and
//! anything that does not fit the schema surfaces as
//! [`ReportError::MalformedResponse`].

pub mod openai;

pub use openai::OpenAiReportGenerator;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

pub const MAX_FINDINGS: usize = 10;
pub const MAX_REPORT_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Summary,
    Full,
}

impl ReportKind {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "summary" => Some(ReportKind::Summary),
            "full" => Some(ReportKind::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Summary => "summary",
            ReportKind::Full => "full",
        }
    }
}

/// Input handed to a [`ReportGenerator`].
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Normalized target URL.
    pub url: String,
    pub kind: ReportKind,
    /// Readable page text (markdown), already truncated.
    pub page_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    pub explanation: String,
}

/// Validated report returned by `/friendly`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReport {
    /// Percentage, `0..=100`.
    pub score: u8,
    #[serde(default)]
    pub ai_superpowers: Vec<Finding>,
    #[serde(default)]
    pub ai_opportunities: Vec<Finding>,
    #[serde(default)]
    pub ai_engine_insights: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report generation is disabled")]
    Disabled,

    #[error("no API key configured for the report generator")]
    MissingApiKey,

    #[error("report generator request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("report generator returned an error: {0}")]
    Upstream(String),

    #[error("malformed external response: {0}")]
    MalformedResponse(String),
}

/// Turns a URL plus page text into a [`StructuredReport`].
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, request: &ReportRequest) -> Result<StructuredReport, ReportError>;
}

/// Stand-in used when the LLM is switched off or has no key.
pub struct DisabledReportGenerator {
    reason: DisabledReason,
}

#[derive(Debug, Clone, Copy)]
enum DisabledReason {
    Switched,
    NoKey,
}

impl DisabledReportGenerator {
    pub fn switched_off() -> Self {
        Self {
            reason: DisabledReason::Switched,
        }
    }

    pub fn missing_key() -> Self {
        Self {
            reason: DisabledReason::NoKey,
        }
    }
}

#[async_trait]
impl ReportGenerator for DisabledReportGenerator {
    async fn generate(&self, _request: &ReportRequest) -> Result<StructuredReport, ReportError> {
        match self.reason {
            DisabledReason::Switched => Err(ReportError::Disabled),
            DisabledReason::NoKey => Err(ReportError::MissingApiKey),
        }
    }
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n(.*?)\n?\s*```\s*$").expect("static regex")
    })
}

/// Remove a surrounding markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    match code_fence_re().captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

fn validate_findings(label: &str, findings: &mut Vec<Finding>) -> Result<(), ReportError> {
    for (i, finding) in findings.iter_mut().enumerate() {
        finding.title = finding.title.trim().to_string();
        finding.explanation = finding.explanation.trim().to_string();
        if finding.title.is_empty() || finding.explanation.is_empty() {
            return Err(ReportError::MalformedResponse(format!(
                "{}[{}] has an empty title or explanation",
                label, i
            )));
        }
    }
    findings.truncate(MAX_FINDINGS);
    Ok(())
}

/// Parse and validate raw model output.
pub fn parse_structured_report(raw: &str) -> Result<StructuredReport, ReportError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ReportError::MalformedResponse("empty response".to_string()));
    }

    let mut report: StructuredReport = serde_json::from_str(body)
        .map_err(|e| ReportError::MalformedResponse(format!("not a report object: {}", e)))?;

    if report.score > MAX_REPORT_SCORE {
        return Err(ReportError::MalformedResponse(format!(
            "score {} is outside 0..={}",
            report.score, MAX_REPORT_SCORE
        )));
    }

    validate_findings("ai_superpowers", &mut report.ai_superpowers)?;
    validate_findings("ai_opportunities", &mut report.ai_opportunities)?;

    if report.ai_superpowers.is_empty() && report.ai_opportunities.is_empty() {
        return Err(ReportError::MalformedResponse(
            "report has neither superpowers nor opportunities".to_string(),
        ));
    }

    if let Some((engine, _)) = report
        .ai_engine_insights
        .iter()
        .find(|(engine, text)| engine.trim().is_empty() || text.trim().is_empty())
    {
        return Err(ReportError::MalformedResponse(format!(
            "engine insight {:?} is empty",
            engine
        )));
    }

    Ok(report)
}
