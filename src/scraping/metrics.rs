use crate::types::PageMetrics;
use scraper::{ElementRef, Html, Selector};

/// Derive [`PageMetrics`] from raw HTML.
///
/// Never fails: html5ever recovers from any markup, and missing elements
/// simply leave the corresponding field at its default.
pub fn extract_metrics(html: &str) -> PageMetrics {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let meta_description = extract_meta_description(&document);
    let canonical_url = extract_canonical(&document);
    let (total_images, images_without_alt_text) = count_images(&document);

    PageMetrics {
        title_length: title.chars().count(),
        meta_description_length: meta_description.chars().count(),
        title,
        meta_description,
        canonical_url,
        has_heading: has_heading(&document),
        total_images,
        images_without_alt_text,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first `<title>`.
fn extract_title(document: &Html) -> String {
    if let Ok(selector) = Selector::parse("title") {
        if let Some(title_element) = document.select(&selector).next() {
            return element_text(title_element);
        }
    }
    String::new()
}

/// `content` of the first `<meta name="description">`, name compared case-insensitively.
fn extract_meta_description(document: &Html) -> String {
    let Ok(selector) = Selector::parse("meta[name]") else {
        return String::new();
    };

    document
        .select(&selector)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

/// `href` of the first `<link>` whose `rel` token list contains `canonical`.
fn extract_canonical(document: &Html) -> String {
    let Ok(selector) = Selector::parse("link[rel]") else {
        return String::new();
    };

    document
        .select(&selector)
        .find(|el| {
            el.value().attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
        })
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default()
}

fn has_heading(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("h1") else {
        return false;
    };
    document
        .select(&selector)
        .any(|h1| !element_text(h1).is_empty())
}

/// Returns `(total, without_alt)`; whitespace-only alt text counts as missing.
fn count_images(document: &Html) -> (usize, usize) {
    let Ok(selector) = Selector::parse("img") else {
        return (0, 0);
    };

    let mut total = 0;
    let mut without_alt = 0;
    for img in document.select(&selector) {
        total += 1;
        let has_alt = img
            .value()
            .attr("alt")
            .is_some_and(|alt| !alt.trim().is_empty());
        if !has_alt {
            without_alt += 1;
        }
    }
    (total, without_alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_defaults() {
        let metrics = extract_metrics("");
        assert_eq!(metrics, PageMetrics::default());
        assert!(!metrics.has_heading);
    }

    #[test]
    fn test_full_page() {
        let html = r#"
            <html>
                <head>
                    <title>  Rust Web Services | Example Co  </title>
                    <meta name="description" content="  Build fast, safe web services.  ">
                    <link rel="canonical" href="https://example.com/rust">
                </head>
                <body>
                    <h1>Rust Web Services</h1>
                    <img src="a.png" alt="diagram">
                    <img src="b.png">
                    <img src="c.png" alt="   ">
                </body>
            </html>
        "#;

        let metrics = extract_metrics(html);
        assert_eq!(metrics.title, "Rust Web Services | Example Co");
        assert_eq!(metrics.title_length, 30);
        assert_eq!(metrics.meta_description, "Build fast, safe web services.");
        assert_eq!(metrics.meta_description_length, 30);
        assert_eq!(metrics.canonical_url, "https://example.com/rust");
        assert!(metrics.has_heading);
        assert_eq!(metrics.total_images, 3);
        assert_eq!(metrics.images_without_alt_text, 2);
    }

    #[test]
    fn test_first_match_wins() {
        let html = r#"
            <head>
                <title>First</title>
                <title>Second</title>
                <meta name="description" content="one">
                <meta name="description" content="two">
                <link rel="canonical" href="/a">
                <link rel="canonical" href="/b">
            </head>
        "#;
        let metrics = extract_metrics(html);
        assert_eq!(metrics.title, "First");
        assert_eq!(metrics.meta_description, "one");
        assert_eq!(metrics.canonical_url, "/a");
    }

    #[test]
    fn test_attribute_matching_is_case_insensitive() {
        let html = r#"
            <head>
                <META NAME="Description" CONTENT="Shouting markup">
                <link rel="alternate Canonical" href="https://example.com/">
                <link rel="stylesheet" href="style.css">
            </head>
        "#;
        let metrics = extract_metrics(html);
        assert_eq!(metrics.meta_description, "Shouting markup");
        assert_eq!(metrics.canonical_url, "https://example.com/");
    }

    #[test]
    fn test_empty_h1_is_not_a_heading() {
        let metrics = extract_metrics("<body><h1>   </h1><h2>Sub</h2></body>");
        assert!(!metrics.has_heading);

        let metrics = extract_metrics("<body><h1></h1><h1>Real</h1></body>");
        assert!(metrics.has_heading);
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let html = "<html><head><title>Broken<body><img alt=><img <<< ><h1>Hi";
        let metrics = extract_metrics(html);
        assert_eq!(metrics.title_length, metrics.title.chars().count());
        assert!(metrics.images_without_alt_text <= metrics.total_images);
    }

    #[test]
    fn test_title_length_counts_characters_not_bytes() {
        let metrics = extract_metrics("<title>Café crème</title>");
        assert_eq!(metrics.title_length, 10);
    }

    #[test]
    fn test_meta_without_content_is_empty() {
        let metrics = extract_metrics(r#"<meta name="description">"#);
        assert_eq!(metrics.meta_description, "");
        assert_eq!(metrics.meta_description_length, 0);
    }
}
