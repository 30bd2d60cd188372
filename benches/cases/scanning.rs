use crate::inputs::{chunks, page};
use criterion::{Bencher, Throughput};
use html_autoescape::{MemorySettings, Scanner};
use std::hint::black_box;

fn inputs() -> Vec<(&'static str, String, Throughput)> {
    let page = page();
    let len = page.len() as u64;

    vec![("page", page, Throughput::Bytes(len))]
}

fn create_runner(chunk_size: usize) -> impl FnMut(&mut Bencher<'_>, &String) {
    move |b, input: &String| {
        let chunks = chunks(input, chunk_size);

        b.iter(|| {
            let mut scanner = Scanner::new(&MemorySettings::default());

            for chunk in &chunks {
                scanner.feed(chunk).unwrap();
            }

            scanner.flush().unwrap();

            black_box(scanner.context().state())
        })
    }
}

define_group!(
    "Scanning",
    [
        ("Whole input", create_runner(usize::MAX)),
        ("1024 byte chunks", create_runner(1024)),
        ("16 byte chunks", create_runner(16))
    ]
);
