use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sectional::{
    Cardinality, FileDescription, FileReader, FileSectionDescription, FileVersionsDescription,
    SectionOrdering, UnknownSections,
};
use std::io::Cursor;

const TAG_FILE: u64 = 0x1010101020202020;
const TAG_END:  u64 = 0x2020202030303030;
const TAG_HEAD: u64 = 0xAAAAAAAAAAAAAAAA;
const TAG_BODY: u64 = 0xBBBBBBBBBBBBBBBB;

fn section(out: &mut Vec<u8>, tag: u64, size: usize) {
    out.extend_from_slice(&tag.to_be_bytes());
    out.extend_from_slice(&(size as u64).to_be_bytes());
    out.resize(out.len() + size, 0x42);
    while out.len() % 16 != 0 {
        out.push(0);
    }
}

fn image(body_sections: usize, size: usize) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&TAG_FILE.to_be_bytes());
    out.extend_from_slice(&1u32.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    section(&mut out, TAG_HEAD, 64);
    for _ in 0..body_sections {
        section(&mut out, TAG_BODY, size);
    }
    section(&mut out, TAG_END, 0);
    out
}

fn formats() -> FileVersionsDescription {
    let d = FileDescription::new(
        TAG_FILE,
        1,
        0,
        TAG_END,
        vec![
            FileSectionDescription::new(TAG_HEAD, Cardinality::One, SectionOrdering::MustBeFirst),
            FileSectionDescription::any_order(TAG_BODY, Cardinality::ZeroToN),
        ],
        UnknownSections::NotPermitted,
    )
    .unwrap();
    FileVersionsDescription::new(vec![d]).unwrap()
}

fn bench_open(c: &mut Criterion) {
    let small = image(10_000, 7);
    let large = image(64, 64 * 1024);

    c.bench_function("open_10k_sections", |b| {
        b.iter(|| FileReader::open(Cursor::new(black_box(&small[..])), TAG_FILE, TAG_END).unwrap())
    });
    c.bench_function("open_64_large_sections", |b| {
        b.iter(|| FileReader::open(Cursor::new(black_box(&large[..])), TAG_FILE, TAG_END).unwrap())
    });
}

fn bench_open_checked(c: &mut Criterion) {
    let data = image(10_000, 7);
    let versions = formats();

    c.bench_function("open_checked_10k_sections", |b| {
        b.iter(|| {
            FileReader::open_checked("bench", Cursor::new(black_box(&data[..])), TAG_FILE, TAG_END, &versions)
                .unwrap()
        })
    });
}

fn bench_read_sections(c: &mut Criterion) {
    let data = image(64, 64 * 1024);
    let mut reader = FileReader::open(Cursor::new(&data[..]), TAG_FILE, TAG_END).unwrap();
    let sections: Vec<_> = reader.sections().iter().copied().collect();

    c.bench_function("read_64_payloads", |b| {
        b.iter(|| {
            for s in &sections {
                black_box(reader.read_section(s).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_open, bench_open_checked, bench_read_sections);
criterion_main!(benches);
