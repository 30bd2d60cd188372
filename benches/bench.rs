use criterion::{criterion_group, criterion_main};

mod inputs {
    const ROWS: usize = 200;

    /// A page of literal markup with text, attribute, URL, script and style contexts.
    pub fn page() -> String {
        let mut page = String::from(
            "<!DOCTYPE html><html><head><title>Bench</title>\
             <style>p { color: red; background: url('/bg.png') } /* c */</style>\
             <script>var x = 1 / 2; if (x) { y = /re[/]g/.test('a') } // c\n</script>\
             </head><body>",
        );

        for i in 0..ROWS {
            page.push_str(&format!(
                "<div class=\"row-{i}\" title='Row {i}' data-x={i}>\
                 <a href=\"/items/{i}?sort=asc&amp;page=2#top\" onclick=\"go({i}); return false\">\
                 Item {i} &amp; more</a><!-- row {i} --></div>\n"
            ));
        }

        page.push_str("</body></html>");
        page
    }

    /// Splits the text into chunks of `size` bytes, extended to character boundaries.
    pub fn chunks(text: &str, size: usize) -> Vec<&str> {
        let mut chunks = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            let mut end = size.min(rest.len());

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

macro_rules! define_group {
    ($group_name:expr, [ $( ($name:expr, $fn:expr) ),+ ]) => {
        use criterion::{BenchmarkId, Criterion};

        pub fn group(c: &mut Criterion) {
            let mut group = c.benchmark_group($group_name);

            $(
                for (input_name, input, throughput) in inputs() {
                    group.throughput(throughput);
                    group.bench_with_input(BenchmarkId::new($name, input_name), &input, $fn);
                }
            )+

            group.finish();
        }
    };
}

mod cases;

criterion_group!(benches, cases::scanning::group, cases::escaping::group);
criterion_main!(benches);
