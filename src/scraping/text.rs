use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("static regex"))
}

/// Drop `<script>`, `<style>` and `<noscript>` bodies before conversion.
fn strip_non_content(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = document.root_element().html();
    if let Ok(selector) = Selector::parse("script, style, noscript, template") {
        for el in document.select(&selector) {
            let fragment = el.html();
            out = out.replacen(&fragment, "", 1);
        }
    }
    out
}

/// Readable markdown rendition of a page, capped at `max_chars` characters.
///
/// Used to feed page content to the report generator without shipping raw
/// markup.
pub fn page_text(html: &str, max_chars: usize) -> String {
    let cleaned = strip_non_content(html);
    let markdown = html2md::parse_html(&cleaned);
    let collapsed = blank_lines_re().replace_all(markdown.trim(), "\n\n");

    if collapsed.chars().count() <= max_chars {
        return collapsed.into_owned();
    }
    let mut truncated: String = collapsed.chars().take(max_chars).collect();
    truncated.push_str("\n…[truncated]");
    truncated
}
