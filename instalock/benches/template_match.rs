use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{imageops, GrayImage, Luma};
use instalock::detection::{find, Template};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn texture(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = GrayImage::from_fn(width / 8 + 2, height / 8 + 2, |_, _| {
        Luma([rng.gen_range(0..=255u8)])
    });
    imageops::resize(&noise, width, height, imageops::FilterType::Triangle)
}

fn bench_find_template(c: &mut Criterion) {
    let screen = texture(1920, 1080, 1);
    let present =
        Template::from_gray("avatar", imageops::crop_imm(&screen, 811, 937, 84, 84).to_image());
    let absent = Template::from_gray("absent", texture(84, 84, 2));

    c.bench_function("find_avatar_1080p_present", |b| {
        b.iter(|| black_box(find(black_box(&screen), &present, 0.8)))
    });
    c.bench_function("find_avatar_1080p_absent", |b| {
        b.iter(|| black_box(find(black_box(&screen), &absent, 0.8)))
    });
}

criterion_group!(benches, bench_find_template);
criterion_main!(benches);
