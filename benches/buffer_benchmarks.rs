//! Benchmarks for buffer editing operations.
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tern_buffer::{Buffer, Position, VarTable};

/// Generates a large text string for benchmarking.
fn generate_large_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {i}: This is a sample line of text for benchmarking purposes.\n"))
        .collect()
}

/// Benchmarks buffer creation.
fn bench_buffer_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_creation");

    for size in [100, 1000, 10000, 100000].iter() {
        let text = generate_large_text(*size);

        group.bench_with_input(BenchmarkId::new("from_text", size), &text, |b, text| {
            b.iter(|| {
                let buffer = Buffer::from_text("bench", black_box(text.as_str()));
                black_box(buffer)
            })
        });
    }

    group.finish();
}

/// Benchmarks typing, with and without markers to adjust.
fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion");
    let globals = VarTable::new();
    let base_text = generate_large_text(1000);

    group.bench_function("insert_string_middle", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::from_text("bench", &base_text);
                buffer.goto_point(Position::new(500, 10));
                buffer
            },
            |mut buffer| {
                buffer.insert_string(black_box("inserted text")).unwrap();
                black_box(buffer)
            },
        )
    });

    for markers in [0, 10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("insert_char_with_markers", markers),
            markers,
            |b, &markers| {
                b.iter_with_setup(
                    || {
                        let mut buffer = Buffer::from_text("bench", &base_text);
                        for n in 0..markers {
                            let pt = buffer.make_point(n * 7, 3);
                            buffer.marker_new(pt);
                        }
                        buffer.goto_point(Position::new(500, 10));
                        buffer
                    },
                    |mut buffer| {
                        for c in "typed".chars() {
                            buffer.insert_char(black_box(c), &globals).unwrap();
                        }
                        black_box(buffer)
                    },
                )
            },
        );
    }

    group.finish();
}

/// Benchmarks line splitting and joining.
fn bench_split_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_join");
    let base_text = generate_large_text(1000);

    group.bench_function("split_then_join", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::from_text("bench", &base_text);
                buffer.goto_point(Position::new(500, 20));
                buffer
            },
            |mut buffer| {
                buffer.intercalate_newline().unwrap();
                buffer.delete_char().unwrap();
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks undo.
fn bench_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo");
    let globals = VarTable::new();

    group.bench_function("undo_single", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::new("bench");
                buffer.insert_string("test").unwrap();
                buffer
            },
            |mut buffer| {
                buffer.undo().unwrap();
                black_box(buffer)
            },
        )
    });

    group.bench_function("undo_100_operations", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::new("bench");
                for _ in 0..100 {
                    buffer.insert_char('x', &globals).unwrap();
                }
                buffer
            },
            |mut buffer| {
                for _ in 0..100 {
                    buffer.undo().unwrap();
                }
                black_box(buffer)
            },
        )
    });

    group.bench_function("undo_sequence_100", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::new("bench");
                buffer
                    .undo_sequence(|bp| {
                        for _ in 0..100 {
                            bp.insert_char('x', &globals)?;
                        }
                        Ok(())
                    })
                    .unwrap();
                buffer
            },
            |mut buffer| {
                buffer.undo().unwrap();
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks line access.
fn bench_line_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_access");

    let text = generate_large_text(100000);
    let buffer = Buffer::from_text("bench", &text);

    group.bench_function("line_text", |b| {
        b.iter(|| {
            let line = buffer.line_text(black_box(50000)).unwrap();
            black_box(line.len())
        })
    });

    group.bench_function("contents", |b| b.iter(|| black_box(buffer.contents())));

    group.finish();
}

criterion_group!(
    benches,
    bench_buffer_creation,
    bench_insertion,
    bench_split_join,
    bench_undo,
    bench_line_access,
);

criterion_main!(benches);
