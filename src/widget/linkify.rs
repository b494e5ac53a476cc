//! URL linkification for transcript text.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::escape_html;

/// `http`/`https` followed by anything up to whitespace, a quote, an angle
/// bracket or a parenthesis.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"'()]+"#).unwrap_or_else(|e| panic!("invalid URL pattern: {e}"))
});

/// Wrap every URL in `text` in a link that opens in a new browsing context
/// without an opener reference.
///
/// With `escape` set, the text between links and the URLs themselves are
/// HTML-escaped; otherwise they are copied through untouched.
pub fn linkify(text: &str, escape: bool) -> String {
    let encode = |s: &str| if escape { escape_html(s) } else { s.to_string() };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in URL_PATTERN.find_iter(text) {
        out.push_str(&encode(&text[last..m.start()]));
        let url = encode(m.as_str());
        out.push_str(&format!(
            r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
        ));
        last = m.end();
    }
    out.push_str(&encode(&text[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(linkify("no links here", true), "no links here");
        assert_eq!(linkify("会費は無料です。", false), "会費は無料です。");
        assert_eq!(linkify("", true), "");
    }

    #[test]
    fn test_single_url() {
        assert_eq!(
            linkify("hi there https://example.com", true),
            r#"hi there <a href="https://example.com" target="_blank" rel="noopener noreferrer">https://example.com</a>"#
        );
    }

    #[test]
    fn test_url_stops_at_delimiters() {
        let out = linkify("see (http://a.test/x) and 'https://b.test/y'.", false);
        assert!(out.contains(r#"<a href="http://a.test/x" "#));
        assert!(out.contains(">http://a.test/x</a>)"));
        assert!(out.contains(r#"<a href="https://b.test/y" "#));
        assert!(out.ends_with("</a>'."));
    }

    #[test]
    fn test_multiple_urls_keep_surrounding_text() {
        let out = linkify("a https://x.test b http://y.test c", false);
        assert_eq!(out.matches("<a href=").count(), 2);
        assert!(out.starts_with("a <a href=\"https://x.test\""));
        assert!(out.contains("</a> b <a href=\"http://y.test\""));
        assert!(out.ends_with("</a> c"));
    }

    #[test]
    fn test_scheme_must_be_http() {
        assert_eq!(linkify("ftp://files.test", true), "ftp://files.test");
        assert_eq!(linkify("https://", true), "https://");
    }

    #[test]
    fn test_escaping() {
        let out = linkify("<b>bold</b> https://x.test/?a=1&b=2", true);
        assert!(out.starts_with("&lt;b&gt;bold&lt;/b&gt; "));
        assert!(out.contains(r#"href="https://x.test/?a=1&amp;b=2""#));

        let raw = linkify("<b>bold</b>", false);
        assert_eq!(raw, "<b>bold</b>");
    }
}
