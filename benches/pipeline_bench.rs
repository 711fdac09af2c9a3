use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use longshot::compose::compose;
use longshot::coverage::is_fully_covered;
use longshot::{plan_tiles, CapturedTile, Size};

// Benchmarks for the pure stages of a long capture. Run with:
//    cargo bench

fn bench_plan_tiles(c: &mut Criterion) {
    let document = Size::new(1080.0, 250_000.0);
    c.bench_function("plan_tiles_250k", |b| {
        b.iter(|| plan_tiles(black_box(document), black_box(1200.0), black_box(2048.0)))
    });
}

fn bench_coverage(c: &mut Criterion) {
    let rects = plan_tiles(Size::new(1080.0, 250_000.0), 1200.0, 2048.0);
    c.bench_function("is_fully_covered_250k", |b| {
        b.iter(|| is_fully_covered(black_box(rects.iter().copied()), 250_000.0, 1.0))
    });
}

fn bench_compose(c: &mut Criterion) {
    let document = Size::new(800.0, 5200.0);
    let scale = 1080.0 / document.width;
    let rects = plan_tiles(document, 900.0, 2048.0);

    c.bench_function("compose_1080x7020", |b| {
        b.iter_batched(
            || {
                rects
                    .iter()
                    .map(|rect| {
                        let dest = rect.scaled(scale);
                        let pixels = RgbaImage::from_pixel(
                            dest.width.round() as u32,
                            dest.height.round() as u32,
                            Rgba([200, 210, 220, 255]),
                        );
                        CapturedTile::new(dest, pixels)
                    })
                    .collect::<Vec<_>>()
            },
            |tiles| compose(1080, document.height * scale, tiles),
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_plan_tiles, bench_coverage, bench_compose);
criterion_main!(benches);
