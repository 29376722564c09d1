// SPDX-License-Identifier: LGPL-2.1

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
  PredcodecError, Result,
  bitstream::{self, PackedStream},
  config::{PipelineConfig, Rounding},
  grid::{CodewordGrid, GRID_LEN, ImageGrid, ResidualGrid},
  huffman,
  predictor::{Predictor, encode_residuals},
  reconstruct::decode_image,
};

/// Bits of the uncompressed image, 8 bits per pixel
pub const UNCOMPRESSED_BITS: usize = 8 * GRID_LEN;

/// Compression and fidelity figures of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
  /// Sum of all codeword lengths
  pub compressed_bits: usize,
  /// `2048 / compressed_bits`
  pub compression_ratio: f64,
  /// `compressed_bits / 256`
  pub bits_per_pixel: f64,
  /// Root mean square difference between original and reconstruction
  pub rms_error: f64,
  /// Reconstruction equals the original
  pub lossless: bool,
  /// Codewords outside the fixed table
  pub fallback_count: usize,
  /// Size of the packed bitstream
  pub packed_bytes: usize,
}

impl Metrics {
  pub fn compute(original: &ImageGrid, reconstructed: &ImageGrid, codes: &CodewordGrid, packed: &PackedStream) -> Self {
    let compressed_bits = huffman::compressed_bits(codes);
    Self {
      compressed_bits,
      compression_ratio: compression_ratio(compressed_bits),
      bits_per_pixel: compressed_bits as f64 / GRID_LEN as f64,
      rms_error: rms_error(original, reconstructed),
      lossless: original == reconstructed,
      fallback_count: huffman::fallback_count(codes),
      packed_bytes: packed.bytes.len(),
    }
  }
}

pub fn compression_ratio(compressed_bits: usize) -> f64 {
  UNCOMPRESSED_BITS as f64 / compressed_bits as f64
}

pub fn rms_error(original: &ImageGrid, reconstructed: &ImageGrid) -> f64 {
  let sum: f64 = original
    .pixels()
    .iter()
    .zip(reconstructed.pixels())
    .map(|(a, b)| {
      let d = *a as f64 - *b as f64;
      d * d
    })
    .sum();
  (sum / GRID_LEN as f64).sqrt()
}

/// All intermediate grids and metrics of one predictor run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
  pub predictor: Predictor,
  pub formula: &'static str,
  pub rounding: Rounding,
  pub residuals: ResidualGrid,
  pub codewords: CodewordGrid,
  pub decoded: ResidualGrid,
  pub reconstructed: ImageGrid,
  #[serde(skip)]
  pub packed: PackedStream,
  pub metrics: Metrics,
}

/// Predict, entropy code, decode and reconstruct
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
  config: PipelineConfig,
}

impl Pipeline {
  pub fn new(config: PipelineConfig) -> Self {
    Self { config }
  }

  /// Run a single predictor
  pub fn run(&self, image: &ImageGrid, predictor: Predictor) -> Result<RunReport> {
    let rounding = self.config.rounding;
    let residuals = encode_residuals(image, predictor, rounding);
    let codewords = huffman::encode_grid(&residuals);
    let decoded = huffman::decode_grid(&codewords);

    // Entropy coding must be exact on symbol level
    if let Some((row, col, _)) = residuals.cells().find(|(row, col, v)| decoded.at(*row, *col) != *v) {
      return Err(PredcodecError::CodecMismatch { row, col });
    }

    let reconstructed = decode_image(predictor, &decoded, rounding);
    let packed = bitstream::pack(&codewords)?;
    let metrics = Metrics::compute(image, &reconstructed, &codewords, &packed);
    debug!("{}: {:?}", predictor, metrics);
    if predictor.uses_halving() && !metrics.lossless {
      debug!("{} is not exact with rounding {}, rms error: {}", predictor, rounding, metrics.rms_error);
    }
    info!(
      "{}: {} bits, ratio {:.2}, {:.2} bits/pixel, rms error {}",
      predictor, metrics.compressed_bits, metrics.compression_ratio, metrics.bits_per_pixel, metrics.rms_error
    );

    Ok(RunReport {
      predictor,
      formula: predictor.formula(),
      rounding,
      residuals,
      codewords,
      decoded,
      reconstructed,
      packed,
      metrics,
    })
  }

  /// Run every configured predictor, reports are in predictor order.
  /// Runs share no state, the first failing run aborts the batch.
  pub fn run_all(&self, image: &ImageGrid) -> Result<Vec<RunReport>> {
    debug!("Running {} predictors", self.config.predictors.len());
    self.config.predictors.par_iter().map(|p| self.run(image, *p)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grid::Grid;

  #[test]
  fn constant_zero_image() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let image = Grid::new();
    let reports = Pipeline::default().run_all(&image)?;
    assert_eq!(reports.len(), 7);
    for report in reports {
      assert_eq!(report.metrics.compressed_bits, 256);
      assert_eq!(report.metrics.compression_ratio, 8.0);
      assert_eq!(report.metrics.bits_per_pixel, 1.0);
      assert_eq!(report.metrics.rms_error, 0.0);
      assert_eq!(report.metrics.packed_bytes, 32);
      assert!(report.codewords.pixels().iter().all(|cw| cw.to_string() == "1"));
    }
    Ok(())
  }

  #[test]
  fn constant_100_image() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let image = Grid::from_fn(|_, _| 100);
    for rounding in Rounding::ALL {
      let pipeline = Pipeline::new(PipelineConfig::default().with_rounding(rounding));
      for report in pipeline.run_all(&image)? {
        assert_eq!(report.codewords.at(0, 0).to_string(), "1100100");
        assert!(report.codewords.pixels().iter().skip(1).all(|cw| cw.to_string() == "1"));
        assert_eq!(report.metrics.compressed_bits, 255 + 7);
        assert_eq!(report.metrics.fallback_count, 1);
        assert_eq!(report.metrics.rms_error, 0.0);
        assert!(report.metrics.lossless);
        assert_eq!(report.reconstructed, image);
      }
    }
    Ok(())
  }

  #[test]
  fn reports_in_predictor_order() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let image = Grid::from_fn(|row, col| (row * col) as i32);
    let reports = Pipeline::default().run_all(&image)?;
    let order: Vec<u8> = reports.iter().map(|r| r.predictor.as_u8()).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7]);
    let config = PipelineConfig::default().with_predictors(&[Predictor::P6, Predictor::P3]);
    let reports = Pipeline::new(config).run_all(&image)?;
    assert_eq!(reports.iter().map(|r| r.predictor).collect::<Vec<_>>(), vec![Predictor::P3, Predictor::P6]);
    Ok(())
  }

  #[test]
  fn decoded_equals_residuals() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    // Large jumps produce fallback codewords, still exact per symbol
    let image = Grid::from_fn(|row, col| if (row + col) % 2 == 0 { 200 } else { 3 });
    for report in Pipeline::default().run_all(&image)? {
      assert_eq!(report.decoded, report.residuals);
      assert!(report.metrics.fallback_count > 0);
      assert!(report.metrics.lossless);
    }
    Ok(())
  }

  #[test]
  fn extreme_values_wrap_exactly() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let image = Grid::from_fn(|row, col| if (row + col) % 2 == 0 { i32::MAX } else { i32::MIN });
    for rounding in Rounding::ALL {
      let pipeline = Pipeline::new(PipelineConfig::default().with_rounding(rounding));
      for report in pipeline.run_all(&image)? {
        assert_eq!(report.decoded, report.residuals, "{} with {}", report.predictor, rounding);
        assert!(report.metrics.rms_error.is_finite());
        if !report.predictor.uses_halving() || rounding.is_symmetric() {
          assert!(report.metrics.lossless, "{} with {}", report.predictor, rounding);
          assert_eq!(report.reconstructed, image);
        }
      }
    }
    Ok(())
  }

  #[test]
  fn rms_error_values() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let a = Grid::new();
    let b = Grid::from_fn(|_, _| 2);
    assert_eq!(rms_error(&a, &a), 0.0);
    assert_eq!(rms_error(&a, &b), 2.0);
    let mut c = Grid::new();
    *c.at_mut(4, 4) = 16;
    assert_eq!(rms_error(&a, &c), 1.0);
    assert_eq!(compression_ratio(512), 4.0);
    Ok(())
  }

  #[test]
  fn report_serializes() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let report = Pipeline::default().run(&Grid::new(), Predictor::P4)?;
    let yaml = serde_yaml::to_string(&report)?;
    assert!(yaml.contains("predictor: 4"));
    assert!(yaml.contains("compressionRatio: 8"));
    assert!(yaml.contains("rounding: truncate"));
    assert!(!yaml.contains("packed:"));
    Ok(())
  }
}
