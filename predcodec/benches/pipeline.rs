use criterion::{Criterion, criterion_group, criterion_main};
use predcodec::{Grid, ImageGrid, Pipeline, PipelineConfig, Predictor, Rounding, huffman, predictor::encode_residuals};
use std::hint::black_box;

fn generate_data() -> ImageGrid {
  Grid::from_fn(|row, col| ((row * 16 + col) % 4) as i32 + 100)
}

fn criterion_benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("predcodec");
  group.significance_level(0.1).sample_size(50);

  let image = generate_data();

  group.bench_with_input("predict_p4", &image, |b, image| {
    b.iter(|| encode_residuals(black_box(image), black_box(Predictor::P4), black_box(Rounding::Truncate)))
  });

  let residuals = encode_residuals(&image, Predictor::P4, Rounding::Truncate);
  group.bench_with_input("huffman_encode", &residuals, |b, residuals| b.iter(|| huffman::encode_grid(black_box(residuals))));

  let pipeline = Pipeline::new(PipelineConfig::default());
  group.bench_with_input("run_all", &image, |b, image| b.iter(|| pipeline.run_all(black_box(image))));

  group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
