use super::FAILSAFE;
use crate::content::ContentType;
use crate::context::AttrKind;
use crate::html::attr_kind;
use crate::scanner::strip_tags;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Html,
    // NOTE: the normalizing tables keep `&`: trusted HTML is already escaped.
    HtmlNorm,
    Nospace,
    NospaceNorm,
}

impl Table {
    #[inline]
    fn is_norm(self) -> bool {
        matches!(self, Table::HtmlNorm | Table::NospaceNorm)
    }

    #[inline]
    fn is_nospace(self) -> bool {
        matches!(self, Table::Nospace | Table::NospaceNorm)
    }

    fn replacement(self, ch: char) -> Option<&'static str> {
        let nospace = self.is_nospace();

        Some(match ch {
            '\0' if nospace => "&#xfffd;",
            '\0' => "\u{FFFD}",
            '"' => "&#34;",
            '&' if self.is_norm() => return None,
            '&' => "&amp;",
            '\'' => "&#39;",
            '+' => "&#43;",
            '<' => "&lt;",
            '>' => "&gt;",
            '\t' if nospace => "&#9;",
            '\n' if nospace => "&#10;",
            '\x0b' if nospace => "&#11;",
            '\x0c' if nospace => "&#12;",
            '\r' if nospace => "&#13;",
            ' ' if nospace => "&#32;",
            '=' if nospace => "&#61;",
            '`' if nospace => "&#96;",
            _ => return None,
        })
    }
}

fn replace(text: &str, table: Table) -> String {
    let mut escaped = String::with_capacity(text.len() + 16);

    for ch in text.chars() {
        if let Some(replacement) = table.replacement(ch) {
            escaped.push_str(replacement);
        } else if table.is_nospace()
            && matches!(ch, '\u{FDD0}'..='\u{FDEF}' | '\u{FFF0}'..='\u{FFFF}')
        {
            // NOTE: IE rejects these in unquoted attribute values.
            let _ = write!(escaped, "&#x{:x};", u32::from(ch));
        } else {
            escaped.push(ch);
        }
    }

    escaped
}

pub(super) fn escape_html(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::Html {
        return text.to_owned();
    }

    replace(text, Table::Html)
}

pub(super) fn escape_rcdata(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::Html {
        return replace(text, Table::HtmlNorm);
    }

    replace(text, Table::Html)
}

pub(super) fn escape_attr(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::Html {
        return replace(&strip_tags(text), Table::HtmlNorm);
    }

    replace(text, Table::Html)
}

pub(super) fn escape_html_nospace(text: &str, content_type: ContentType) -> String {
    // NOTE: an empty unquoted value would make the next attribute its value.
    if text.is_empty() {
        return FAILSAFE.to_owned();
    }

    if content_type == ContentType::Html {
        return replace(&strip_tags(text), Table::NospaceNorm);
    }

    replace(text, Table::Nospace)
}

pub(super) fn filter_html_name(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::HtmlAttr {
        return text.to_owned();
    }

    let name = text.to_ascii_lowercase();

    // NOTE: a dynamic name must not turn the attribute value into a URL, script or style.
    let is_safe = !name.is_empty()
        && attr_kind(&name) == AttrKind::Ordinary
        && name.bytes().all(|b| b.is_ascii_alphanumeric());

    if is_safe {
        name
    } else {
        FAILSAFE.to_owned()
    }
}
