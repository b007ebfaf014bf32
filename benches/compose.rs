// this_file: benches/compose.rs
//! Benchmarks for compositing, layout and encoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use snapline::synthetic::{SyntheticEngine, SyntheticFont, SyntheticGlyph};
use snapline::{CanvasSize, Context, FontRole, FontSource, OutputFormat, RenderConfig};

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

fn engine() -> SyntheticEngine {
    let mask: Vec<u8> = (0..12 * 22).map(|i| (i * 7 % 256) as u8).collect();
    let font = ALPHABET.chars().fold(SyntheticFont::new(), |font, ch| {
        font.glyph(
            ch,
            SyntheticGlyph::from_mask(12, 22, mask.clone())
                .with_bearing(2, 24)
                .with_advance(16),
        )
    });
    SyntheticEngine::new().with_font("bench", font)
}

fn context(rows: u32, cols: u32) -> Context<SyntheticEngine> {
    let mut ctx = Context::new(
        engine(),
        RenderConfig::default(),
        CanvasSize::Grid { rows, cols },
    )
    .unwrap();
    ctx.add_font(&FontSource::path("bench"), FontRole::Regular)
        .unwrap();
    ctx
}

fn bench_draw_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_text");
    for len in [1usize, 16, 80] {
        let text: String = ALPHABET.chars().cycle().take(len).collect();
        let mut ctx = context(1, 80);
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| black_box(ctx.draw_text(0, 0, text).unwrap()));
        });
    }
    group.finish();
}

fn bench_fill(c: &mut Criterion) {
    let mut ctx = context(24, 80);
    c.bench_function("fill_24x80", |b| {
        b.iter(|| ctx.clear());
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut ctx = context(24, 80);
    let line: String = ALPHABET.chars().cycle().take(80).collect();
    for row in 0..24 {
        ctx.draw_text(row, 0, &line).unwrap();
    }

    let mut group = c.benchmark_group("encode_24x80");
    for format in [OutputFormat::Png, OutputFormat::Ppm] {
        group.bench_function(format.to_string(), |b| {
            b.iter(|| black_box(ctx.encode_as(format).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_draw_text, bench_fill, bench_encode);
criterion_main!(benches);
