mod attr;
mod entities;

pub(crate) use self::attr::attr_kind;
pub(crate) use self::entities::decode_char_refs;

/// HTML whitespace.
#[inline]
pub(crate) fn is_html_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0c' | b'\r')
}

/// Bytes that end a tag name (or a special end tag's name).
#[inline]
pub(crate) fn is_tag_name_end(b: u8) -> bool {
    is_html_space(b) || b == b'>' || b == b'/'
}
