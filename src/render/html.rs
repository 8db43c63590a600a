use crate::analysis::SCORE_CEILING;
use crate::features::inquiries::Inquiry;
use crate::types::{PageMetrics, ScoreResult};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::fmt::Write;

const STYLE: &str = r#"
  body { font-family: system-ui, -apple-system, "Segoe UI", sans-serif; margin: 0; background: #f4f6fb; color: #1c2333; }
  main { max-width: 760px; margin: 2rem auto; padding: 0 1rem; }
  .card { background: #fff; border-radius: 12px; box-shadow: 0 2px 8px rgba(0,0,0,.06); padding: 1.5rem; margin-bottom: 1.25rem; }
  h1 { font-size: 1.4rem; margin: 0 0 .25rem; }
  .url { color: #5a6478; word-break: break-all; }
  .gauge { height: 14px; border-radius: 7px; background: linear-gradient(90deg, #e5484d, #f5a524, #30a46c); position: relative; margin: 1rem 0 .5rem; }
  .marker { position: absolute; top: -5px; width: 4px; height: 24px; background: #1c2333; border-radius: 2px; }
  .score { font-size: 2.5rem; font-weight: 700; }
  ul { padding-left: 1.1rem; }
  li { margin: .35rem 0; }
  .good li::marker { content: "✅ "; }
  .bad li::marker { content: "🚨 "; }
  table { width: 100%; border-collapse: collapse; }
  td { padding: .35rem .25rem; border-bottom: 1px solid #eef0f5; }
  td:first-child { color: #5a6478; width: 45%; }
  form { display: grid; gap: .6rem; }
  input { padding: .6rem; border: 1px solid #cfd5e3; border-radius: 8px; font-size: 1rem; }
  button { padding: .7rem; border: 0; border-radius: 8px; background: #3e63dd; color: #fff; font-size: 1rem; cursor: pointer; }
  a { color: #3e63dd; }
"#;

/// Minimal escaping for text and double-quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn list_items(points: &[String], empty: &str) -> String {
    if points.is_empty() {
        return format!("<li>{}</li>", escape_html(empty));
    }
    points
        .iter()
        .map(|p| format!("<li>{}</li>", escape_html(p)))
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "—".to_string()
    } else {
        escape_html(value)
    }
}

fn metrics_rows(metrics: &PageMetrics) -> String {
    let rows = [
        ("Title", or_dash(&metrics.title)),
        ("Title length", metrics.title_length.to_string()),
        ("Meta description", or_dash(&metrics.meta_description)),
        (
            "Meta description length",
            metrics.meta_description_length.to_string(),
        ),
        ("Canonical URL", or_dash(&metrics.canonical_url)),
        (
            "Top-level heading",
            if metrics.has_heading { "yes" } else { "no" }.to_string(),
        ),
        ("Images", metrics.total_images.to_string()),
        (
            "Images without alt text",
            metrics.images_without_alt_text.to_string(),
        ),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = write!(out, "\n        <tr><td>{}</td><td>{}</td></tr>", label, value);
    }
    out
}

/// Self-contained report page with the lead-capture form.
pub fn render_report_page(url: &str, metrics: &PageMetrics, result: &ScoreResult) -> String {
    let escaped_url = escape_html(url);
    let marker_pct = u32::from(result.score) * 100 / u32::from(SCORE_CEILING);
    let ai_report_link = format!(
        "/friendly?type=full&amp;url={}",
        utf8_percent_encode(url, NON_ALPHANUMERIC)
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>SEO report for {escaped_url}</title>
  <style>{STYLE}</style>
</head>
<body>
<main>
  <section class="card">
    <h1>SEO report</h1>
    <div class="url">{escaped_url}</div>
    <div class="gauge"><div class="marker" style="left: calc({marker_pct}% - 2px)"></div></div>
    <div class="score">{score}/{ceiling}</div>
  </section>
  <section class="card">
    <h2>What's working</h2>
    <ul class="good">
        {good}
    </ul>
    <h2>What to fix</h2>
    <ul class="bad">
        {bad}
    </ul>
  </section>
  <section class="card">
    <h2>Signals</h2>
    <table>{rows}
    </table>
  </section>
  <section class="card">
    <h2>Get the full report</h2>
    <p>Leave your details and we'll send a detailed AI-SEO review of this page, or <a href="{ai_report_link}">generate one now</a>.</p>
    <form method="post" action="/inquiries">
      <input type="hidden" name="url" value="{escaped_url}">
      <input name="name" placeholder="Name" required>
      <input name="email" type="email" placeholder="Email" required>
      <input name="company" placeholder="Company">
      <button type="submit">Send me the full report</button>
    </form>
  </section>
</main>
</body>
</html>
"#,
        score = result.score,
        ceiling = SCORE_CEILING,
        good = list_items(&result.good_points, "No passing checks yet."),
        bad = list_items(&result.bad_points, "No issues found."),
        rows = metrics_rows(metrics),
    )
}

/// Confirmation shown after a browser form submission.
pub fn render_inquiry_thanks(inquiry: &Inquiry) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Thanks!</title>
  <style>{STYLE}</style>
</head>
<body>
<main>
  <section class="card">
    <h1>✅ Thanks, {name}!</h1>
    <p>We'll send the full report for <span class="url">{url}</span> to {email}.</p>
  </section>
</main>
</body>
</html>
"#,
        name = escape_html(&inquiry.name),
        url = or_dash(&inquiry.url),
        email = escape_html(&inquiry.email),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::score;
    use crate::scraping::metrics::extract_metrics;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_report_page_contains_results_and_form() {
        let metrics = extract_metrics("<title>Tiny</title><h1>Hi</h1>");
        let result = score(&metrics);
        let page = render_report_page("https://example.com/?q=1&r=2", &metrics, &result);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(&format!("{}/10", result.score)));
        assert!(page.contains("https://example.com/?q=1&amp;r=2"));
        assert!(page.contains(r#"<form method="post" action="/inquiries">"#));
        assert!(page.contains(r#"name="email""#));
        assert!(page.contains("url=https%3A%2F%2Fexample%2Ecom%2F%3Fq%3D1%26r%3D2"));
        for point in &result.bad_points {
            assert!(page.contains(&escape_html(point)));
        }
    }

    #[test]
    fn test_report_page_escapes_page_supplied_text() {
        let metrics = extract_metrics(
            r#"<title>&lt;script&gt;alert(1)&lt;/script&gt;</title><meta name="description" content="&quot;><img src=x>">"#,
        );
        let result = score(&metrics);
        let page = render_report_page("https://example.com/", &metrics, &result);
        assert!(!page.contains("<script>alert(1)"));
        assert!(!page.contains("<img src=x>"));
    }

    #[test]
    fn test_empty_lists_render_placeholder() {
        let result = ScoreResult {
            score: 10,
            good_points: vec![],
            bad_points: vec![],
        };
        let page = render_report_page("https://example.com/", &PageMetrics::default(), &result);
        assert!(page.contains("No issues found."));
        assert!(page.contains("No passing checks yet."));
    }
}
