//! Same-origin link discovery

use scraper::{Html, Selector};
use url::Url;

/// Extract absolute same-origin hyperlinks from an HTML document.
///
/// Hrefs are resolved against `base_url`; only links whose resolved URL
/// shares the page's own origin are kept. Fragments are stripped so anchor
/// variants of one page dedup to a single URL.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let origin = base_url.origin();
    let mut links = Vec::new();

    for elem in document.select(&selector) {
        let Some(href) = elem.value().attr("href") else {
            continue;
        };

        let Ok(mut resolved) = base_url.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        if resolved.origin() == origin {
            links.push(resolved);
        }
    }

    links
}

/// Site-relative path of a fetched document's final URL
pub fn relative_path(url: &Url) -> String {
    url.path().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_same_origin_links() {
        let base = Url::parse("https://example.ru/news/").unwrap();
        let html = r#"
        <html><body>
            <a href="/about">About</a>
            <a href="item1">Relative</a>
            <a href="https://example.ru/contact">Absolute</a>
            <a href="https://other.ru/page">External</a>
            <a href="mailto:x@example.ru">Mail</a>
        </body></html>
        "#;

        let links = extract_links(html, &base);
        let strs: Vec<String> = links.iter().map(|u| u.to_string()).collect();

        assert_eq!(
            strs,
            vec![
                "https://example.ru/about",
                "https://example.ru/news/item1",
                "https://example.ru/contact",
            ]
        );
    }

    #[test]
    fn test_fragments_are_stripped() {
        let base = Url::parse("https://example.ru/page").unwrap();
        let links = extract_links(r##"<a href="#section">Down</a>"##, &base);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].to_string(), "https://example.ru/page");
    }

    #[test]
    fn test_relative_path() {
        let url = Url::parse("https://example.ru/news/item1?q=1").unwrap();
        assert_eq!(relative_path(&url), "/news/item1");

        let root = Url::parse("https://example.ru").unwrap();
        assert_eq!(relative_path(&root), "/");
    }
}
