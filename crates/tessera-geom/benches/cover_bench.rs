use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use tessera_geom::{cover, cover_until, sprite_bounds, Rect, SpriteQuad};

fn scattered_rects(count: usize) -> Vec<Rect> {
    (0..count)
        .map(|i| {
            let f = i as f32;
            Rect::new((f * 37.0) % 640.0, (f * 91.0) % 360.0, 8.0 + f % 24.0, 8.0 + f % 16.0)
        })
        .collect()
}

fn bench_cover(c: &mut Criterion) {
    let rects = scattered_rects(64);

    c.bench_function("cover_64", |b| b.iter(|| cover(black_box(&rects))));
}

fn bench_cover_until(c: &mut Criterion) {
    // Flag halfway through to exercise the early exit
    let rects = scattered_rects(64);
    let items: Vec<_> = rects
        .iter()
        .enumerate()
        .map(|(i, rect)| (Some(*rect), i == 32))
        .collect();

    c.bench_function("cover_until_64", |b| {
        b.iter(|| cover_until(black_box(items.iter().copied())))
    });
}

fn bench_sprite_bounds(c: &mut Criterion) {
    let mut quad = SpriteQuad::new(Vec2::new(120.0, 80.0), Vec2::new(24.0, 16.0));
    quad.rotation = 0.7;
    quad.scale = Vec2::new(-1.5, 2.0);

    c.bench_function("sprite_bounds_rotated", |b| {
        b.iter(|| sprite_bounds(black_box(&quad)))
    });
}

criterion_group!(benches, bench_cover, bench_cover_until, bench_sprite_bounds);
criterion_main!(benches);
