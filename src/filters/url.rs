use super::FAILSAFE;
use crate::content::ContentType;
use crate::html::is_html_space;
use std::fmt::Write;

/// Returns `true` for relative URLs and URLs with the `http`, `https` or `mailto` scheme.
pub(super) fn is_safe_url(url: &str) -> bool {
    match url.find(':') {
        Some(i) if !url[..i].contains('/') => {
            let scheme = &url[..i];

            ["http", "https", "mailto"]
                .iter()
                .any(|safe| scheme.eq_ignore_ascii_case(safe))
        }
        _ => true,
    }
}

pub(super) fn filter_url(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::Url || is_safe_url(text) {
        text.to_owned()
    } else {
        format!("#{FAILSAFE}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Escape,
    Normalize,
    NormalizePath,
}

impl Mode {
    fn keeps(self, b: u8) -> bool {
        match b {
            // NOTE: unreserved in RFC 3986.
            b'-' | b'.' | b'_' | b'~' => true,
            _ if b.is_ascii_alphanumeric() => true,
            b'#' | b'&' | b'?' => self == Mode::Normalize,
            // NOTE: `'`, `(` and `)` are sub-delims, but are encoded anyway, so the output can be
            // embedded in single quoted attributes and unquoted `url(...)`. A `%` is kept when
            // normalizing, so that existing escapes aren't encoded twice.
            b'!' | b'$' | b'*' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'@' | b'[' | b']'
            | b'%' => self != Mode::Escape,
            _ => false,
        }
    }
}

fn percent_encode(text: &str, mode: Mode) -> String {
    let mut encoded = String::with_capacity(text.len() + 16);

    for b in text.bytes() {
        if mode.keeps(b) {
            encoded.push(char::from(b));
        } else {
            let _ = write!(encoded, "%{b:02x}");
        }
    }

    encoded
}

pub(super) fn normalize_url(text: &str) -> String {
    percent_encode(text, Mode::Normalize)
}

pub(super) fn normalize_url_path(text: &str) -> String {
    percent_encode(text, Mode::NormalizePath)
}

pub(super) fn escape_url(text: &str) -> String {
    percent_encode(text, Mode::Escape)
}

/// Percent-encodes the bytes that end the path of a URL.
pub(super) fn encode_separators(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '?' => encoded.push_str("%3f"),
            '#' => encoded.push_str("%23"),
            '&' => encoded.push_str("%26"),
            _ => encoded.push(ch),
        }
    }

    encoded
}

pub(super) fn filter_srcset(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::Url {
        // NOTE: normalizing encodes the whitespace that separates the URL from its metadata,
        // commas separate image candidates.
        return normalize_url(text).replace(',', "%2c");
    }

    let mut filtered = String::with_capacity(text.len() + 16);

    for (i, candidate) in text.split(',').enumerate() {
        if i > 0 {
            filtered.push(',');
        }

        filter_srcset_candidate(candidate, &mut filtered);
    }

    filtered
}

fn filter_srcset_candidate(candidate: &str, filtered: &mut String) {
    let bytes = candidate.as_bytes();
    let start = bytes
        .iter()
        .position(|&b| !is_html_space(b))
        .unwrap_or(bytes.len());
    let end = bytes[start..]
        .iter()
        .position(|&b| is_html_space(b))
        .map_or(bytes.len(), |i| start + i);

    let url = &candidate[start..end];

    // NOTE: metadata made of spaces and alphanumerics needs no normalization.
    let is_safe_metadata = bytes[end..]
        .iter()
        .all(|&b| is_html_space(b) || b.is_ascii_alphanumeric());

    if is_safe_url(url) && is_safe_metadata {
        filtered.push_str(&candidate[..start]);
        filtered.push_str(&normalize_url(url));
        filtered.push_str(&candidate[end..]);
    } else {
        filtered.push('#');
        filtered.push_str(FAILSAFE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_urls() {
        let cases = [
            ("", true),
            ("/foo", true),
            ("foo", true),
            ("http://example.com", true),
            ("HTTPS://example.com", true),
            ("mailto:foo@example.com", true),
            ("/foo:bar", true),
            ("javascript:alert(1)", false),
            ("JavaScript:alert(1)", false),
            ("data:text/html,<b>", false),
            (" javascript:alert(1)", false),
            ("vbscript:x", false),
        ];

        for (url, expected) in cases {
            assert_eq!(is_safe_url(url), expected, "{url:?}");
        }

        assert_eq!(filter_url("javascript:x", ContentType::Plain), "#ZgotmplZ");
        assert_eq!(filter_url("javascript:x", ContentType::Url), "javascript:x");
    }

    #[test]
    fn normalization() {
        let cases = [
            ("", ""),
            (
                "http://example.com:80/foo/bar?q=foo%20&bar=x+y#frag",
                "http://example.com:80/foo/bar?q=foo%20&bar=x+y#frag",
            ),
            (" ", "%20"),
            ("%7c", "%7c"),
            ("%7C", "%7C"),
            ("%2", "%2"),
            ("%", "%"),
            ("%z", "%z"),
            ("/foo|bar/%5c\u{1234}", "/foo%7cbar/%5c%e1%88%b4"),
            ("'\"()<>", "%27%22%28%29%3c%3e"),
        ];

        for (text, expected) in cases {
            assert_eq!(normalize_url(text), expected, "{text:?}");
        }

        assert_eq!(normalize_url_path("a?b=c&d#e"), "a%3fb=c%26d%23e");
    }

    #[test]
    fn escaping() {
        assert_eq!(
            escape_url("a b&c=d/e?f#g%h~"),
            "a%20b%26c%3dd%2fe%3ff%23g%25h~"
        );
        assert_eq!(escape_url("\u{e9}"), "%c3%a9");
        assert_eq!(encode_separators("a?b#c&d"), "a%3fb%23c%26d");
    }

    #[test]
    fn srcsets() {
        let cases = [
            ("", ""),
            ("/img.png", "/img.png"),
            ("/img.png 2x", "/img.png 2x"),
            (" /a.png 1x, /b.png 2x ", " /a.png 1x, /b.png 2x "),
            ("/a.png 200w", "/a.png 200w"),
            ("/a b.png 200w", "#ZgotmplZ"),
            ("javascript:alert(1) 1x, /b.png 2x", "#ZgotmplZ, /b.png 2x"),
            ("/a.png 1.5x", "#ZgotmplZ"),
            ("/a.png?x=(1)", "/a.png?x=%281%29"),
        ];

        for (text, expected) in cases {
            assert_eq!(filter_srcset(text, ContentType::Plain), expected, "{text:?}");
        }

        assert_eq!(
            filter_srcset("/a b,c.png", ContentType::Url),
            "/a%20b%2cc.png"
        );
    }
}
