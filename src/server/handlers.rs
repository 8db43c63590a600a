use crate::analysis::analyze_html;
use crate::features::inquiries::{Inquiry, InquiryError, InquiryForm};
use crate::render::{render_inquiry_thanks, render_report_page};
use crate::report::{ReportError, ReportKind, ReportRequest, StructuredReport};
use crate::scraping::fetch::{normalize_target_url, FetchError};
use crate::scraping::text::page_text;
use crate::types::*;
use crate::AppState;
use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    Form,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(error)))
}

fn fetch_error(e: FetchError) -> ApiError {
    match e {
        FetchError::InvalidUrl(_) | FetchError::UnsupportedScheme(_) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new("Invalid URL").with_detail(e.to_string())))
        }
        FetchError::Request(_) | FetchError::Status(_) | FetchError::TooLarge { .. } => {
            warn!("Fetch failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(
                    ErrorResponse::new("Error retrieving content from the provided URL")
                        .with_detail(e.to_string()),
                ),
            )
        }
    }
}

fn report_error(e: ReportError) -> ApiError {
    match e {
        ReportError::Disabled | ReportError::MissingApiKey => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("AI reports are not available").with_detail(e.to_string())),
        ),
        ReportError::MalformedResponse(ref detail) => {
            warn!("Report generator returned malformed output: {}", detail);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new("malformed external response").with_detail(detail.clone())),
            )
        }
        ReportError::Transport(_) | ReportError::Upstream(_) => {
            error!("Report generation failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new("Failed to process URL").with_detail(e.to_string())),
            )
        }
    }
}

/// Fetch under the outbound concurrency limit.
async fn fetch_page(state: &AppState, url: &Url) -> Result<String, ApiError> {
    let _permit = state
        .outbound_limit
        .acquire()
        .await
        .map_err(|_| api_error(StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down"))?;
    state.fetcher.fetch(url).await.map_err(fetch_error)
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "seo-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /`: usage hint without `?url=`, otherwise the same as `/analyze`.
pub async fn root(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Response, ApiError> {
    if !query.url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
        return Ok(Json(MessageResponse {
            message: "Please provide a ?url= parameter".to_string(),
        })
        .into_response());
    }
    analyze(State(state), Query(query)).await
}

fn output_format(raw: Option<&str>) -> Result<OutputFormat, ApiError> {
    match raw.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(OutputFormat::default()),
        Some(value) => OutputFormat::parse_str(value).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(
                    ErrorResponse::new("Invalid format")
                        .with_detail(format!("expected json or html, got {:?}", value)),
                ),
            )
        }),
    }
}

/// `GET /analyze?url=..&format=json|html`
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Response, ApiError> {
    let raw_url = query
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing url query parameter"))?;
    let format = output_format(query.format.as_deref())?;
    let url = normalize_target_url(raw_url).map_err(fetch_error)?;

    let html = fetch_page(&state, &url).await?;
    let analysis = analyze_html(url.as_str(), &html, &state.config.scoring);
    info!(
        "Analyzed {}: score {} ({} good, {} bad)",
        url,
        analysis.result.score,
        analysis.result.good_points.len(),
        analysis.result.bad_points.len()
    );

    let response = match format {
        OutputFormat::Json => Json(analysis.into_report()).into_response(),
        OutputFormat::Html => {
            Html(render_report_page(&analysis.url, &analysis.metrics, &analysis.result)).into_response()
        }
    };
    Ok(response)
}

/// `GET /friendly?type=summary|full&url=..`: LLM-generated AI-SEO report.
pub async fn friendly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FriendlyQuery>,
) -> Result<Json<StructuredReport>, ApiError> {
    let kind = query.report_type.as_deref().and_then(ReportKind::parse_str);
    let (Some(kind), Some(raw_url)) = (kind, query.url.as_deref().filter(|u| !u.trim().is_empty()))
    else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing or invalid parameters"));
    };
    let url = normalize_target_url(raw_url).map_err(fetch_error)?;

    info!("Building {} report for {}", kind.as_str(), url);
    let html = fetch_page(&state, &url).await?;
    let request = ReportRequest {
        url: url.to_string(),
        kind,
        page_text: page_text(&html, state.config.llm.resolve_max_page_chars()),
    };

    let report = state
        .report_generator
        .generate(&request)
        .await
        .map_err(report_error)?;
    Ok(Json(report))
}

fn is_form_submission(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// `POST /inquiries`: accepts the HTML report's form post or a JSON body.
pub async fn submit_inquiry(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let from_browser = is_form_submission(&request);
    let form = if from_browser {
        match Form::<InquiryForm>::from_request(request, &()).await {
            Ok(Form(form)) => form,
            Err(rejection) => {
                return api_error(StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
            }
        }
    } else {
        match Json::<InquiryForm>::from_request(request, &()).await {
            Ok(Json(form)) => form,
            Err(rejection) => {
                return api_error(StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
            }
        }
    };

    match state.inquiries.submit(&form).await {
        Ok(inquiry) if from_browser => {
            (StatusCode::CREATED, Html(render_inquiry_thanks(&inquiry))).into_response()
        }
        Ok(inquiry) => (StatusCode::CREATED, Json(inquiry)).into_response(),
        Err(e @ InquiryError::StoreFull(_)) => {
            api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
        Err(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

/// Token from an `Authorization: Bearer <token>` value. The scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Compares every byte regardless of where the first mismatch is.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// `GET /inquiries` requires `Authorization: Bearer <admin_token>`.
pub async fn list_inquiries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Inquiry>>, ApiError> {
    let Some(expected) = state.config.resolve_admin_token() else {
        return Err(api_error(StatusCode::FORBIDDEN, "Inquiry listing is disabled"));
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    if !presented.is_some_and(|token| tokens_match(token, &expected)) {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Invalid admin token"));
    }
    Ok(Json(state.inquiries.list().await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("  BEARER   abc  "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("s3cret", "s3cret"));
        assert!(!tokens_match("s3creT", "s3cret"));
        assert!(!tokens_match("s3cre", "s3cret"));
        assert!(!tokens_match("", "s3cret"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(output_format(None).unwrap(), OutputFormat::Json);
        assert_eq!(output_format(Some(" ")).unwrap(), OutputFormat::Json);
        assert_eq!(output_format(Some("HTML")).unwrap(), OutputFormat::Html);
        let (status, Json(body)) = output_format(Some("pdf")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid format");
    }
}
