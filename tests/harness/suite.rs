use super::{chunk_size, ChunkedInput};
use html_autoescape::content::{Css, Html, HtmlAttr, Js, JsStr, Url};
use html_autoescape::{EscapeError, Escaper};
use serde_derive::Deserialize;
use serde_json::from_reader;
use std::fs::File;
use std::io::BufReader;

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum TrustTag {
    Css,
    Html,
    HtmlAttr,
    Js,
    JsStr,
    Url,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Literal(ChunkedInput),
    Value(serde_json::Value),
    Trusted { content_type: TrustTag, text: String },
}

impl Op {
    fn apply(
        &self,
        escaper: &mut Escaper<Vec<u8>>,
        chunk_size: Option<usize>,
    ) -> Result<(), EscapeError> {
        match self {
            Op::Literal(input) => match chunk_size {
                Some(size) => input
                    .chunks(size)
                    .into_iter()
                    .try_for_each(|chunk| escaper.write_literal(chunk)),
                None => escaper.write_literal(input.as_str()),
            },
            Op::Value(value) => escaper.write_value(value),
            Op::Trusted { content_type, text } => {
                let text = text.as_str();

                match content_type {
                    TrustTag::Css => escaper.write_value(Css(text)),
                    TrustTag::Html => escaper.write_value(Html(text)),
                    TrustTag::HtmlAttr => escaper.write_value(HtmlAttr(text)),
                    TrustTag::Js => escaper.write_value(Js(text)),
                    TrustTag::JsStr => escaper.write_value(JsStr(text)),
                    TrustTag::Url => escaper.write_value(Url(text)),
                }
            }
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Test {
    pub description: String,
    pub ops: Vec<Op>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Test {
    fn literal_len(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Literal(input) => input.as_str().len(),
                _ => 0,
            })
            .sum()
    }

    fn run(&self, chunk_size: Option<usize>) -> (String, Result<(), EscapeError>) {
        let mut escaper = Escaper::new(Vec::new());
        let result = self
            .ops
            .iter()
            .try_for_each(|op| op.apply(&mut escaper, chunk_size));

        (String::from_utf8(escaper.into_inner()).unwrap(), result)
    }

    fn check_with(&self, chunk_size: Option<usize>) {
        let (output, result) = self.run(chunk_size);
        let name = format!("{} (chunk size: {chunk_size:?})", self.description);

        match (&self.error, result) {
            (Some(kind), Err(EscapeError::Context(err))) => {
                assert_eq!(&format!("{:?}", err.kind()), kind, "{name}: {err}");
            }
            (Some(kind), other) => panic!("{name}: expected {kind} error, got {other:?}"),
            (None, Ok(())) => (),
            (None, Err(err)) => panic!("{name}: {err}"),
        }

        // NOTE: chunks of a failing literal that precede the failing one are written.
        if chunk_size.is_none() || self.error.is_none() {
            if let Some(expected) = &self.output {
                assert_eq!(&output, expected, "{name}");
            }
        }
    }

    /// Runs the test with whole literals, then with literals written in chunks.
    pub fn check(&self) {
        self.check_with(None);
        self.check_with(Some(chunk_size(self.literal_len())));
    }
}

#[derive(Deserialize)]
struct Suite {
    #[serde(default)]
    pub tests: Vec<Test>,
}

macro_rules! read_tests {
    ($path:expr) => {
        glob::glob(&format!(
            "{}/tests/data/{}",
            env!("CARGO_MANIFEST_DIR"),
            $path
        ))
        .unwrap()
        .map(|path| BufReader::new(File::open(path.unwrap()).unwrap()))
    };
}

pub fn get_tests(path: &str) -> Vec<Test> {
    let mut tests = Vec::new();

    for file in read_tests!(path) {
        tests.extend(from_reader::<_, Suite>(file).unwrap().tests);
    }

    assert!(!tests.is_empty(), "no tests in {path}");

    tests
}
