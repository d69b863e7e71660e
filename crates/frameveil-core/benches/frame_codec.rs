use criterion::{criterion_group, criterion_main, Criterion};
use frameveil_core::media::frame::{embed_frame, reveal_frame};
use image::{ImageBuffer, Rgb, RgbImage};

fn synthetic(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([x as u8, y as u8, (x ^ y) as u8])
    })
}

pub fn frame_embedding(c: &mut Criterion) {
    c.bench_function("Frame Embedding 640x360", |b| {
        let cover = synthetic(640, 360);
        let secret = synthetic(320, 180);

        b.iter(|| embed_frame(&cover, &secret))
    });
}

pub fn frame_revealing(c: &mut Criterion) {
    c.bench_function("Frame Revealing 640x360", |b| {
        let stego = synthetic(640, 360);

        b.iter(|| reveal_frame(&stego))
    });
}

criterion_group!(benches, frame_embedding, frame_revealing);
criterion_main!(benches);
