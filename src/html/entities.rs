//! Character reference decoding for attribute values.
//!
//! Values of URL, JS and CSS attributes are tracked in their decoded form, so that
//! `onclick="alert(&quot;x&quot;)"` is lexed as a JS string. The decoder records where every
//! decoded byte came from: a transition that stops inside the decoded text maps back to a raw
//! offset. Only references that decode to ASCII (plus a few combining sequences starting with an
//! ASCII character) affect the sub-grammars; other named references are left as they are.

use memchr::memchr;
use std::borrow::Cow;

// NOTE: the longest named reference in the HTML standard.
const MAX_NAME_LEN: usize = 32;

const NAMED_REFS: &[(&str, &str)] = &[
    ("AMP", "&"),
    ("DiacriticalGrave", "`"),
    ("GT", ">"),
    ("Hat", "^"),
    ("LT", "<"),
    ("NewLine", "\n"),
    ("QUOT", "\""),
    ("Tab", "\t"),
    ("UnderBar", "_"),
    ("VerticalLine", "|"),
    ("amp", "&"),
    ("apos", "'"),
    ("ast", "*"),
    ("bne", "=\u{20E5}"),
    ("bsol", "\\"),
    ("colon", ":"),
    ("comma", ","),
    ("commat", "@"),
    ("dollar", "$"),
    ("equals", "="),
    ("excl", "!"),
    ("fjlig", "fj"),
    ("grave", "`"),
    ("gt", ">"),
    ("lbrace", "{"),
    ("lbrack", "["),
    ("lcub", "{"),
    ("lowbar", "_"),
    ("lpar", "("),
    ("lsqb", "["),
    ("lt", "<"),
    ("midast", "*"),
    ("num", "#"),
    ("nvgt", ">\u{20D2}"),
    ("nvlt", "<\u{20D2}"),
    ("percnt", "%"),
    ("period", "."),
    ("plus", "+"),
    ("quest", "?"),
    ("quot", "\""),
    ("rbrace", "}"),
    ("rbrack", "]"),
    ("rcub", "}"),
    ("rpar", ")"),
    ("rsqb", "]"),
    ("semi", ";"),
    ("sol", "/"),
    ("verbar", "|"),
    ("vert", "|"),
];

// NOTE: legacy references that are recognized without the trailing semicolon.
const LEGACY_REFS: &[(&str, &str)] = &[
    ("AMP", "&"),
    ("GT", ">"),
    ("LT", "<"),
    ("QUOT", "\""),
    ("amp", "&"),
    ("gt", ">"),
    ("lt", "<"),
    ("quot", "\""),
];

const WINDOWS_1252_REPLACEMENTS: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn lookup(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| table[i].1)
}

#[derive(Debug, PartialEq, Eq)]
enum CharRef {
    Char(char),
    Str(&'static str),
}

#[derive(Debug, PartialEq, Eq)]
enum RefMatch {
    /// Not a character reference: the `&` stands for itself.
    None,
    /// A reference of the given raw length.
    Ref(CharRef, usize),
    /// The text ends before the reference does.
    Incomplete,
}

fn numeric_char(code_point: u32) -> char {
    match code_point {
        0x80..=0x9F => WINDOWS_1252_REPLACEMENTS[(code_point - 0x80) as usize],
        0 | 0xD800..=0xDFFF => '\u{FFFD}',
        _ => char::from_u32(code_point).unwrap_or('\u{FFFD}'),
    }
}

/// Matches a character reference at the start of `s` (which starts with `&`). The second
/// element of the result is `true` if the reference runs up to the end of `s`, so that more text
/// could change its meaning.
fn match_char_ref(s: &[u8], last: bool) -> (RefMatch, bool) {
    if s.get(1) == Some(&b'#') {
        let mut start = 2;
        let hex = matches!(s.get(2), Some(b'x' | b'X'));

        if hex {
            start += 1;
        }

        let end = s[start.min(s.len())..]
            .iter()
            .position(|&b| {
                if hex {
                    !b.is_ascii_hexdigit()
                } else {
                    !b.is_ascii_digit()
                }
            })
            .map_or(s.len(), |i| i + start);

        if end >= s.len() && !last {
            return (RefMatch::Incomplete, true);
        }

        if end <= start {
            return (RefMatch::None, end >= s.len());
        }

        let radix = if hex { 16 } else { 10 };
        let code_point = s[start..end].iter().fold(0u32, |acc, &b| {
            // NOTE: anything above U+10FFFF is replaced anyway.
            let digit = char::from(b).to_digit(radix).unwrap_or(0);

            acc.saturating_mul(radix).saturating_add(digit).min(0x11_0000)
        });

        let len = if s.get(end) == Some(&b';') { end + 1 } else { end };

        return (
            RefMatch::Ref(CharRef::Char(numeric_char(code_point)), len),
            end >= s.len(),
        );
    }

    let end = s[1..]
        .iter()
        .position(|b| !b.is_ascii_alphanumeric())
        .map_or(s.len(), |i| i + 1);

    let touches_end = end >= s.len();

    if touches_end && !last && end - 1 <= MAX_NAME_LEN {
        return (RefMatch::Incomplete, true);
    }

    if end == 1 {
        return (RefMatch::None, touches_end);
    }

    // NOTE: the name is ASCII alphanumeric.
    let name = std::str::from_utf8(&s[1..end]).unwrap_or_default();

    if s.get(end) == Some(&b';') {
        if let Some(decoded) = lookup(NAMED_REFS, name) {
            return (RefMatch::Ref(CharRef::Str(decoded), end + 1), false);
        }
    }

    // NOTE: inside attribute values, a legacy reference followed by `=` is not decoded.
    if s.get(end) != Some(&b'=') {
        if let Some(decoded) = lookup(LEGACY_REFS, name) {
            return (RefMatch::Ref(CharRef::Str(decoded), end), touches_end);
        }
    }

    (RefMatch::None, touches_end && end - 1 <= MAX_NAME_LEN)
}

/// Attribute value text with character references decoded.
#[derive(Debug)]
pub(crate) struct DecodedText<'t> {
    text: Cow<'t, str>,
    // NOTE: raw offset of every byte of `text`; `None` when nothing was decoded.
    offsets: Option<Vec<usize>>,
    raw_len: usize,
    ends_with_ref: bool,
}

impl DecodedText<'_> {
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of raw bytes the decoded text accounts for. It's less than the raw length only if
    /// the raw text ends with an incomplete character reference.
    #[inline]
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Returns `true` if the raw text ends with a character reference (or something that could
    /// become one) that following text could extend.
    #[inline]
    pub fn ends_with_ref(&self) -> bool {
        self.ends_with_ref
    }

    /// Maps an offset in the decoded text back to the raw text.
    pub fn raw_offset(&self, offset: usize) -> usize {
        if offset >= self.text.len() {
            return self.raw_len;
        }

        match &self.offsets {
            Some(offsets) => offsets[offset],
            None => offset,
        }
    }
}

/// Decodes character references in attribute value text.
///
/// If `last` is `false`, a reference that reaches the end of `raw` is not decoded: it's left
/// out of the result and [`DecodedText::raw_len`] stops before it.
pub(crate) fn decode_char_refs(raw: &str, last: bool) -> DecodedText<'_> {
    let bytes = raw.as_bytes();

    let Some(first_amp) = memchr(b'&', bytes) else {
        return DecodedText {
            text: Cow::Borrowed(raw),
            offsets: None,
            raw_len: raw.len(),
            ends_with_ref: false,
        };
    };

    let mut text = String::with_capacity(raw.len());
    let mut offsets = Vec::with_capacity(raw.len());
    let mut copied = 0;
    let mut amp = first_amp;
    let mut raw_len = raw.len();
    let mut ends_with_ref;

    loop {
        text.push_str(&raw[copied..amp]);
        offsets.extend(copied..amp);

        let (ref_match, touches_end) = match_char_ref(&bytes[amp..], last);

        ends_with_ref = touches_end;

        match ref_match {
            RefMatch::Ref(decoded, len) => {
                let before = text.len();

                match decoded {
                    CharRef::Char(ch) => text.push(ch),
                    CharRef::Str(s) => text.push_str(s),
                };

                offsets.extend(std::iter::repeat(amp).take(text.len() - before));
                copied = amp + len;
            }
            RefMatch::None => {
                text.push('&');
                offsets.push(amp);
                copied = amp + 1;
            }
            RefMatch::Incomplete => {
                raw_len = amp;
                break;
            }
        }

        match memchr(b'&', &bytes[copied..]) {
            Some(i) => amp = copied + i,
            // NOTE: if the last reference touches the end, the rest of the text is part of it,
            // even when it didn't match anything yet (`&apo`).
            None => {
                text.push_str(&raw[copied..]);
                offsets.extend(copied..raw.len());
                break;
            }
        }
    }

    DecodedText {
        text: Cow::Owned(text),
        offsets: Some(offsets),
        raw_len,
        ends_with_ref,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> String {
        decode_char_refs(raw, true).text().to_owned()
    }

    #[test]
    fn tables_are_sorted() {
        for table in [NAMED_REFS, LEGACY_REFS] {
            assert!(table.windows(2).all(|w| w[0].0 < w[1].0));
        }
    }

    #[test]
    fn no_references() {
        let decoded = decode_char_refs("foo bar", false);

        assert_eq!(decoded.text(), "foo bar");
        assert_eq!(decoded.raw_len(), 7);
        assert_eq!(decoded.raw_offset(4), 4);
        assert!(!decoded.ends_with_ref());
    }

    #[test]
    fn named_references() {
        assert_eq!(decode("alert(&quot;Hi!&quot;)"), "alert(\"Hi!\")");
        assert_eq!(decode("&lpar;&rpar;&colon;&sol;&quest;"), "():/?");
        assert_eq!(decode("&eacute;&amp;"), "&eacute;&");
        assert_eq!(decode("&nvlt;"), "<\u{20D2}");
        assert_eq!(decode("&unknown;"), "&unknown;");
    }

    #[test]
    fn legacy_references() {
        assert_eq!(decode("a&ampb"), "a&ampb");
        assert_eq!(decode("a&amp b"), "a& b");
        assert_eq!(decode("&lt"), "<");
        assert_eq!(decode("x&lt=1"), "x&lt=1");
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode("&#39;&#x27;&#X27"), "'''");
        assert_eq!(decode("&#106;avascript"), "javascript");
        assert_eq!(decode("&#0;"), "\u{FFFD}");
        assert_eq!(decode("&#128;"), "\u{20AC}");
        assert_eq!(decode("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode("&#99999999999;"), "\u{FFFD}");
        assert_eq!(decode("&#;"), "&#;");
        assert_eq!(decode("&#x;"), "&#x;");
    }

    #[test]
    fn incomplete_references() {
        for raw in ["ab&", "ab&#", "ab&#x3", "ab&quo", "ab&amp"] {
            let decoded = decode_char_refs(raw, false);

            assert_eq!(decoded.text(), "ab", "{raw}");
            assert_eq!(decoded.raw_len(), 2, "{raw}");
            assert!(decoded.ends_with_ref(), "{raw}");
        }

        let decoded = decode_char_refs("&quot;ab&#3", true);

        assert_eq!(decoded.text(), "\"ab\u{3}");
        assert_eq!(decoded.raw_len(), 11);
        assert!(decoded.ends_with_ref());
    }

    #[test]
    fn long_names_are_not_incomplete() {
        let raw = format!("&{}", "a".repeat(40));
        let decoded = decode_char_refs(&raw, false);

        assert_eq!(decoded.text(), raw);
        assert_eq!(decoded.raw_len(), raw.len());
        assert!(!decoded.ends_with_ref());
    }

    #[test]
    fn unmatched_names_at_the_end() {
        for raw in ["f('&apo", "x:'&quo", "/x&colo", "a&amp;b&"] {
            let decoded = decode_char_refs(raw, true);

            assert_eq!(decoded.raw_len(), raw.len(), "{raw}");
            assert!(decoded.ends_with_ref(), "{raw}");
        }

        for raw in ["&apo x", "&quo;", "&amp;b"] {
            assert!(!decode_char_refs(raw, true).ends_with_ref(), "{raw}");
        }
    }

    #[test]
    fn raw_offsets() {
        let decoded = decode_char_refs("a&quot;b&#x2f;c", true);

        assert_eq!(decoded.text(), "a\"b/c");

        let offsets = (0..=5).map(|i| decoded.raw_offset(i)).collect::<Vec<_>>();

        assert_eq!(offsets, [0, 1, 7, 8, 14, 15]);
    }
}
