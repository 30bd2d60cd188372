use rand::{thread_rng, Rng};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use std::env;
use std::fmt::{self, Formatter};

/// Picks the size of the chunks literal text of `len` bytes is split into.
///
/// Random, unless set with the `CHUNK_SIZE` environment variable.
pub fn chunk_size(len: usize) -> usize {
    match env::var("CHUNK_SIZE") {
        Ok(val) => val.parse().unwrap(),
        Err(_) => {
            if len > 1 {
                thread_rng().gen_range(1..len)
            } else {
                1
            }
        }
    }
}

/// Literal text that is written in chunks.
#[derive(Debug, Clone)]
pub struct ChunkedInput {
    input: String,
}

impl From<&str> for ChunkedInput {
    fn from(input: &str) -> Self {
        ChunkedInput {
            input: input.to_owned(),
        }
    }
}

impl ChunkedInput {
    pub fn as_str(&self) -> &str {
        &self.input
    }

    /// Splits the input into chunks of `chunk_size` bytes, extended to the next character
    /// boundary where needed.
    pub fn chunks(&self, chunk_size: usize) -> Vec<&str> {
        let mut chunks = Vec::new();
        let mut rest = self.input.as_str();

        while !rest.is_empty() {
            let mut end = chunk_size.clamp(1, rest.len());

            while !rest.is_char_boundary(end) {
                end += 1;
            }

            let (chunk, tail) = rest.split_at(end);

            chunks.push(chunk);
            rest = tail;
        }

        chunks
    }

    /// Splits the input at random character boundaries.
    pub fn random_chunks(&self) -> Vec<&str> {
        let mut rng = thread_rng();
        let mut chunks = Vec::new();
        let mut rest = self.input.as_str();

        while !rest.is_empty() {
            let mut end = rng.gen_range(1..=rest.len());

            while !rest.is_char_boundary(end) {
                end += 1;
            }

            let (chunk, tail) = rest.split_at(end);

            chunks.push(chunk);
            rest = tail;
        }

        chunks
    }
}

impl<'de> Deserialize<'de> for ChunkedInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringVisitor;

        impl Visitor<'_> for StringVisitor {
            type Value = ChunkedInput;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("a string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.into())
            }
        }

        deserializer.deserialize_string(StringVisitor)
    }
}

#[test]
fn chunks_keep_characters_whole() {
    let input = ChunkedInput::from("a\u{e9}b\u{1D11E}");

    assert_eq!(input.chunks(1), ["a", "\u{e9}", "b", "\u{1D11E}"]);
    assert_eq!(input.chunks(2), ["a\u{e9}", "b\u{1D11E}"]);
    assert_eq!(input.chunks(100), ["a\u{e9}b\u{1D11E}"]);
    assert_eq!(input.random_chunks().concat(), input.as_str());
}
