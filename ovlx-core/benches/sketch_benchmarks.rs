use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ovlx_core::{
    generate_sketch_elements, Execution, MatcherFactory, MinimizerIndex, OverlapPipeline,
    PipelineParams, ReadSet, SketchParams,
};

fn generate_test_sequence(length: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..length)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 62) as usize]
        })
        .collect()
}

/// Reads tiling a random genome with 50% overlap between neighbours
fn generate_test_reads(reads: usize, read_length: usize) -> ReadSet {
    let step = read_length / 2;
    let genome = generate_test_sequence(step * (reads + 1), 42);
    (0..reads)
        .map(|i| {
            (
                format!("read_{}", i),
                genome[i * step..i * step + read_length].to_vec(),
            )
        })
        .collect()
}

fn bench_sketch_read(c: &mut Criterion) {
    let read = generate_test_sequence(10000, 1);
    let mut group = c.benchmark_group("sketch_10kb");

    for &(k, w) in &[(15u32, 10u32), (19, 10), (15, 5)] {
        let params = SketchParams::new(k, w, false);
        group.bench_with_input(BenchmarkId::new("minimizers", format!("k{}_w{}", k, w)), &params, |b, params| {
            b.iter(|| black_box(generate_sketch_elements(black_box(&read), 0, params)))
        });
    }

    let hashed = SketchParams::new(15, 10, true);
    group.bench_function("minimizers_hashed_k15_w10", |b| {
        b.iter(|| black_box(generate_sketch_elements(black_box(&read), 0, &hashed)))
    });
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let reads = generate_test_reads(200, 5000);
    let params = SketchParams::default();
    let mut group = c.benchmark_group("index_200x5kb");

    for execution in [Execution::Sequential, Execution::Parallel] {
        group.bench_function(format!("{:?}", execution), |b| {
            b.iter(|| black_box(MinimizerIndex::build(&reads, 0, 200, &params, execution)))
        });
    }
    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let reads = generate_test_reads(200, 5000);
    let index = MinimizerIndex::build(&reads, 0, 200, &SketchParams::default(), Execution::Parallel)
        .expect("valid parameters");
    let matcher = MatcherFactory::create(Execution::Parallel, None);

    c.bench_function("match_200x5kb_all_vs_all", |b| {
        b.iter(|| black_box(matcher.find_anchors(&index, &index, true)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let reads = generate_test_reads(100, 5000);
    let pipeline = OverlapPipeline::new(PipelineParams::default()).expect("valid parameters");

    c.bench_function("pipeline_100x5kb_all_vs_all", |b| {
        b.iter(|| black_box(pipeline.all_vs_all(&reads)))
    });
}

criterion_group!(
    benches,
    bench_sketch_read,
    bench_index_build,
    bench_matching,
    bench_pipeline
);
criterion_main!(benches);
