use crate::harness::ChunkedInput;
use html_autoescape::{Escaper, Item, MemorySettings, Scanner, State};
use rand::{thread_rng, Rng};

const DOCS: &[&str] = &[
    r#"<a href="/search?q=x&amp;y=1" onclick="f(&quot;a&quot;)">link</a>"#,
    "<script>var x = a++ / 2; if (ret) return /re[/]g/.test(s) // c\n</script>",
    r#"<style>p { background: url( "/img?x" ) } /* c */ a { b: 'c\27' }</style>"#,
    "<!-- c -- x --> <textarea><b></textarea><title>t</title>",
    r#"<p style="a: b" title='x' data-x=y>text</p>"#,
    r#"<script>x = "a\"b"; y = 'c\'d'; z = `e\`f`</script>"#,
    r#"<a onclick="x = 1 &#47; 2; y = /a[&sol;]/" href='javascript&colon;'>"#,
    "<div><span title=\"&lt;\">&amp;</span><br/></div>",
    "<p>caf\u{e9} \u{1F600} <b title=\"\u{e9}t\u{e9}\">\u{2603}</b></p>",
];

const RUNS: usize = 50;

#[test]
fn random_splits_keep_context_and_output() {
    for doc in DOCS {
        let input = ChunkedInput::from(*doc);
        let mut whole = Escaper::new(Vec::new());

        whole.write_literal(doc).unwrap();

        for _ in 0..RUNS {
            let chunks = input.random_chunks();
            let mut chunked = Escaper::new(Vec::new());

            for chunk in &chunks {
                chunked.write_literal(chunk).unwrap();
            }

            assert_eq!(chunked.context(), whole.context(), "{chunks:?}");
            assert_eq!(chunked.get_ref(), whole.get_ref(), "{chunks:?}");
            assert_eq!(chunked.into_inner(), doc.as_bytes());
        }
    }
}

#[test]
fn random_splits_keep_scanner_state() {
    for doc in DOCS {
        let input = ChunkedInput::from(*doc);
        let mut whole = Scanner::new(&MemorySettings::default());

        whole.feed(doc).unwrap();
        whole.flush().unwrap();

        for _ in 0..RUNS {
            let chunks = input.random_chunks();
            let mut chunked = Scanner::new(&MemorySettings::default());

            for chunk in &chunks {
                chunked.feed(chunk).unwrap();
            }

            chunked.flush().unwrap();

            assert_eq!(chunked.context(), whole.context(), "{chunks:?}");
            assert_eq!(chunked.blocked_bytes(), "");
        }
    }
}

fn random_text(len: usize) -> String {
    const ALPHABET: &[char] = &[
        'a', 'b', 'Z', '0', ' ', '\n', '<', '>', '&', '\'', '"', '+', '=', '/', '!', '-', '\0',
        '\u{e9}', '\u{1F600}',
    ];

    let mut rng = thread_rng();

    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

#[test]
fn values_in_text_cant_open_markup() {
    for _ in 0..RUNS * 4 {
        let value = random_text(thread_rng().gen_range(0..40));
        let mut escaper = Escaper::new(Vec::new());

        escaper.write_literal("<p>").unwrap();
        escaper.write_value(value.as_str()).unwrap();

        assert_eq!(escaper.context().state(), State::Text, "{value:?}");

        let output = String::from_utf8(escaper.into_inner()).unwrap();
        let escaped = &output["<p>".len()..];

        assert!(
            !escaped.contains(['<', '>', '\'', '"', '\0']),
            "{value:?} => {escaped:?}"
        );
        assert_eq!(
            escaped.matches('&').count(),
            escaped.matches(';').count(),
            "{value:?} => {escaped:?}"
        );
    }
}

#[test]
fn values_in_attributes_stay_inside() {
    for _ in 0..RUNS * 4 {
        let value = random_text(thread_rng().gen_range(0..40));
        let mut escaper = Escaper::new(Vec::new());

        escaper.write_literal("<p title=").unwrap();
        escaper.write_value(value.as_str()).unwrap();
        escaper.write_literal(">").unwrap();

        assert_eq!(escaper.context().state(), State::Text, "{value:?}");
    }
}

#[test]
fn print_alternates_literals_and_values() {
    let mut rng = thread_rng();

    for _ in 0..RUNS {
        let parts: Vec<String> = (0..rng.gen_range(1..8)).map(|_| random_text(5)).collect();
        let literals: Vec<&str> = parts.iter().step_by(2).map(|s| s.as_str()).collect();

        // Values are written in text, so literals may only contain safe characters.
        let literals: Vec<String> = literals
            .into_iter()
            .map(|s| s.replace(['<', '&'], "x"))
            .collect();

        let mut items = Vec::new();
        let mut expected = Escaper::new(Vec::new());

        for (i, part) in parts.iter().enumerate() {
            if i % 2 == 0 {
                let literal = &literals[i / 2];

                items.push(Item::Str(literal));
                expected.write_literal(literal).unwrap();
            } else {
                items.push(Item::Str(part));
                expected.write_value(part.as_str()).unwrap();
            }
        }

        let mut printed = Escaper::new(Vec::new());

        printed.print(&items).unwrap();

        assert_eq!(printed.into_inner(), expected.into_inner(), "{items:?}");
    }
}
