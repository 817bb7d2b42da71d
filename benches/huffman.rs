//! Benchmark the flattened two-level Huffman table builder.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jpeg_core::huffman::HuffmanTable;

fn build_table(leaf_counts: [u8; 16], values: &[u8]) -> HuffmanTable {
    HuffmanTable::new(leaf_counts, values).expect("valid table")
}

fn criterion_benchmark(c: &mut Criterion) {
    // a realistic luminance AC table, lifted from a typical baseline encoder.
    let leaf_counts: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 119];
    let values: Vec<u8> = vec![
        0, 1, 2, 3, 17, 4, 5, 33, 49, 6, 18, 65, 81, 7, 97, 113, 19, 34, 50, 129, 8, 20, 66, 145,
        161, 177, 193, 9, 35, 51, 82, 240, 21, 98, 114, 209, 10, 22, 36, 52, 225, 37, 241, 23, 24,
        25, 26, 38, 39, 40, 41, 42, 53, 54, 55, 56, 57, 58, 67, 68, 69, 70, 71, 72, 73, 74, 83,
        84, 85, 86, 87, 88, 89, 90, 99, 100, 101, 102, 103, 104, 105, 106, 115, 116, 117, 118,
        119, 120, 121, 122, 130, 131, 132, 133, 134, 135, 136, 137, 138, 146, 147, 148, 149, 150,
        151, 152, 153, 154, 162, 163, 164, 165, 166, 167, 168, 169, 170, 178, 179, 180, 181, 182,
        183, 184, 185, 186, 194, 195, 196, 197, 198, 199, 200, 201, 202, 210, 211, 212, 213, 214,
        215, 216, 217, 218, 226, 227, 228, 229, 230, 231, 232, 233, 234, 242, 243, 244, 245, 246,
        247, 248, 249, 250,
    ];

    c.bench_function("Huffman table construction", |b| {
        b.iter(|| build_table(black_box(leaf_counts), black_box(&values)))
    });

    let table = build_table(leaf_counts, &values);
    c.bench_function("Huffman decode", |b| {
        b.iter(|| table.decode(black_box(0xABCD)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
