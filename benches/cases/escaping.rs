use criterion::{Bencher, Throughput};
use html_autoescape::content::Url;
use html_autoescape::Escaper;
use std::hint::black_box;

const ROWS: usize = 200;

fn inputs() -> Vec<(&'static str, usize, Throughput)> {
    vec![("rows", ROWS, Throughput::Elements(ROWS as u64))]
}

fn write_rows(escaper: &mut Escaper<Vec<u8>>, rows: usize) {
    for i in 0..rows {
        escaper.write_literal("<tr><td title=").unwrap();
        escaper.write_value("Row <b>").unwrap();
        escaper.write_literal("><a href=\"").unwrap();
        escaper.write_value(Url("/items")).unwrap();
        escaper.write_literal("?id=").unwrap();
        escaper.write_value(i).unwrap();
        escaper.write_literal("&amp;q=").unwrap();
        escaper.write_value("fish & chips").unwrap();
        escaper.write_literal("\" onclick=\"select(").unwrap();
        escaper.write_value("it's").unwrap();
        escaper.write_literal(", ").unwrap();
        escaper.write_value(i).unwrap();
        escaper.write_literal(")\">").unwrap();
        escaper.write_value("Tom & Jerry").unwrap();
        escaper.write_literal("</a></td><td style=\"color: ").unwrap();
        escaper.write_value("red").unwrap();
        escaper.write_literal("\">x</td></tr>\n").unwrap();
    }
}

fn print_rows(escaper: &mut Escaper<Vec<u8>>, rows: usize) {
    for _ in 0..rows {
        escaper
            .print(&[
                "<li class=\"".into(),
                "item".into(),
                "\">".into(),
                "<script>alert(1)</script>".into(),
                "</li>\n".into(),
            ])
            .unwrap();
    }
}

define_group!(
    "Escaping",
    [
        ("Values in mixed contexts", |b: &mut Bencher<'_>, rows: &usize| {
            b.iter(|| {
                let mut escaper = Escaper::new(Vec::with_capacity(64 * 1024));

                write_rows(&mut escaper, *rows);

                black_box(escaper.into_inner())
            })
        }),
        ("Print", |b: &mut Bencher<'_>, rows: &usize| {
            b.iter(|| {
                let mut escaper = Escaper::new(Vec::with_capacity(64 * 1024));

                print_rows(&mut escaper, *rows);

                black_box(escaper.into_inner())
            })
        })
    ]
);
