use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use response_linearizer::linearization::{CalibrationDataset, Corrector, CorrectorConfig, Frame};

fn mock_counts(x: usize, y: usize, exposure: f64) -> f64 {
    let gain = 1.0 + 0.001 * ((x + 3 * y) % 64) as f64;
    100.0 + gain * 20000.0 * (1.0 - (-exposure / 30.0).exp())
}

fn mock_dataset(width: usize, height: usize, exposures: &[f64]) -> CalibrationDataset {
    let frames: Vec<Frame<f64>> = exposures
        .iter()
        .map(|&t| Frame::from_fn(width, height, |x, y| mock_counts(x, y, t)).unwrap())
        .collect();
    CalibrationDataset::new(exposures.to_vec(), frames).unwrap()
}

fn gapped_exposures() -> Vec<f64> {
    (1..=16)
        .map(|i| f64::from(i) * 0.5)
        .chain((0..8).map(|i| 50.0 + f64::from(i) * 0.5))
        .collect()
}

fn benchmark_construction_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction_by_size");
    let exposures = gapped_exposures();

    let sizes = vec![(64, 64, "64x64"), (256, 256, "256x256"), (512, 512, "512x512")];

    for (width, height, label) in sizes {
        let dataset = mock_dataset(width, height, &exposures);

        group.bench_with_input(BenchmarkId::from_parameter(label), &dataset, |b, dataset| {
            b.iter(|| Corrector::new(black_box(dataset)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_correction_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("correction_by_size");
    let exposures = gapped_exposures();

    let sizes = vec![(64, 64, "64x64"), (256, 256, "256x256"), (512, 512, "512x512")];

    for (width, height, label) in sizes {
        let corrector = Corrector::new(&mock_dataset(width, height, &exposures)).unwrap();
        let image = Frame::from_fn(width, height, |x, y| mock_counts(x, y, 20.0) as u16).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(label), &image, |b, image| {
            b.iter(|| corrector.correct(black_box(image)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_supersampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_supersampling");
    let dataset = mock_dataset(256, 256, &gapped_exposures());
    let image = Frame::from_fn(256, 256, |x, y| mock_counts(x, y, 3.0)).unwrap();

    for factor in [1usize, 2, 4, 8] {
        let config = CorrectorConfig::builder().cluster_supersampling(factor).build();
        let corrector = Corrector::with_config(&dataset, &config).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(factor), &image, |b, image| {
            b.iter(|| corrector.correct(black_box(image)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_fallback_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("fallback_overhead");
    let corrector = Corrector::new(&mock_dataset(256, 256, &gapped_exposures())).unwrap();

    group.bench_function("all_in_range", |b| {
        let image = Frame::new(256, 256, vec![5000.0f32; 256 * 256]).unwrap();
        b.iter(|| corrector.correct(black_box(&image)).unwrap());
    });

    group.bench_function("all_uncorrectable", |b| {
        let image = Frame::new(256, 256, vec![1.0e9f32; 256 * 256]).unwrap();
        b.iter(|| corrector.correct(black_box(&image)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_construction_sizes,
    benchmark_correction_sizes,
    benchmark_supersampling,
    benchmark_fallback_overhead
);
criterion_main!(benches);
