use std::ops::Deref;

/// A piece of literal text handed to the transition engine.
///
/// A chunk that is not the `last` one may be followed by more literal text, so tokens that
/// reach its end are left unconsumed. The `last` chunk is followed by a value boundary (or the
/// end of the input), and every token in it is final.
#[derive(Debug, Copy, Clone)]
pub struct Chunk<'t> {
    text: &'t str,
    last: bool,
}

impl<'t> Chunk<'t> {
    #[inline]
    #[must_use]
    pub fn new(text: &'t str, last: bool) -> Self {
        Chunk { text, last }
    }

    /// A chunk that may be followed by more literal text.
    #[inline]
    #[must_use]
    pub fn partial(text: &'t str) -> Self {
        Chunk::new(text, false)
    }

    /// A chunk that is followed by a value boundary.
    #[inline]
    #[must_use]
    pub fn last(text: &'t str) -> Self {
        Chunk::new(text, true)
    }

    #[inline]
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.last
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// The first `len` bytes. Unless `last` is set, the text that follows is unknown.
    #[inline]
    pub(crate) fn prefix(&self, len: usize, last: bool) -> Chunk<'t> {
        Chunk::new(&self.text[..len], last)
    }
}

impl Deref for Chunk<'_> {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.text
    }
}
