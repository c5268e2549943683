use criterion::{criterion_group, criterion_main, Criterion, black_box};

use tilegen::core::types::IVec2;
use tilegen::generation::{
    CellField, CellularConfig, GenerationConfig, GenerationMethod, NoiseConfig, NoiseField,
    PartitionTree, RoomCorridorBuilder, SpacePartitionConfig,
};
use tilegen::math::Rect;
use tilegen::random::SeededRandom;
use tilegen::{CancellationSignal, TileGrid};

fn bench_partition_build(c: &mut Criterion) {
    let root = Rect::new(0, 0, 256, 256);

    c.bench_function("partition_build_256_depth8", |b| {
        b.iter(|| {
            let mut rng = SeededRandom::new(1);
            PartitionTree::build(black_box(root), 8, IVec2::new(5, 5), &mut rng)
        });
    });
}

fn bench_dungeon_plan(c: &mut Criterion) {
    let builder = RoomCorridorBuilder::new(SpacePartitionConfig {
        max_leaf_count: 64,
        max_split_depth: 8,
        ..Default::default()
    });

    c.bench_function("dungeon_plan_256", |b| {
        b.iter(|| {
            let mut rng = SeededRandom::new(2);
            builder.plan(black_box(Rect::new(0, 0, 256, 256)), &mut rng)
        });
    });
}

fn bench_cellular_step(c: &mut Criterion) {
    let grid = TileGrid::new(256, 256);
    let field = CellField::seed(&grid, 45, &mut SeededRandom::new(3));

    c.bench_function("cellular_step_256", |b| {
        b.iter(|| black_box(&field).step(4));
    });
}

fn bench_noise_sample(c: &mut Criterion) {
    let field = NoiseField::new(&NoiseConfig::default());

    c.bench_function("noise_sample_64x64", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for y in 0..64 {
                for x in 0..64 {
                    sum += field.sample(x as f32, y as f32);
                }
            }
            black_box(sum)
        });
    });
}

fn bench_generate_full(c: &mut Criterion) {
    let configs = [
        ("generate_bsp_128", GenerationMethod::SpacePartition(SpacePartitionConfig::default())),
        ("generate_cellular_128", GenerationMethod::CellularAutomaton(CellularConfig::default())),
        ("generate_noise_128", GenerationMethod::NoiseField(NoiseConfig::default())),
    ];

    for (name, method) in configs {
        let config = GenerationConfig {
            seed: Some(4),
            step_delay_ms: 0,
            ..GenerationConfig::with_method(method)
        };
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut grid = TileGrid::new(128, 128);
                tilegen::generate(&config, &mut grid, &CancellationSignal::new()).unwrap();
                grid
            });
        });
    }
}

criterion_group!(
    benches,
    bench_partition_build,
    bench_dungeon_plan,
    bench_cellular_step,
    bench_noise_sample,
    bench_generate_full,
);
criterion_main!(benches);
