// SPDX-License-Identifier: LGPL-2.1

use std::{fmt::Display, io::Write};

use clap::ArgMatches;
use itertools::Itertools;
use predcodec::{GRID_LEN, Grid, ImageGrid, RunReport, pipeline::UNCOMPRESSED_BITS};
use serde::Serialize;

/// Column width for integer grids
const CELL_WIDTH: usize = 4;

pub fn print_output<T: Serialize + ?Sized>(obj: &T, options: &ArgMatches) -> crate::Result<()> {
  if options.get_flag("yaml") {
    let yaml = serde_yaml::to_string(obj)?;
    println!("{}", yaml);
  } else {
    let json = serde_json::to_string_pretty(obj)?;
    println!("{}", json);
  }
  Ok(())
}

/// Write a grid with every cell right aligned to `width`
fn write_grid<W, T>(out: &mut W, title: &str, grid: &Grid<T>, width: usize) -> std::io::Result<()>
where
  W: Write + ?Sized,
  T: Copy + Default + Display,
{
  writeln!(out, "{}", title)?;
  for row in grid.rows() {
    writeln!(out, "{}", row.iter().map(|v| format!("{:>width$}", v.to_string(), width = width)).join(" "))?;
  }
  writeln!(out)
}

pub fn write_summary<W: Write + ?Sized>(out: &mut W, report: &RunReport) -> std::io::Result<()> {
  let m = &report.metrics;
  writeln!(out, "Predictor {}: {}", report.predictor.as_u8(), report.formula)?;
  writeln!(
    out,
    "Compression ratio: {} / {} = {:.2}",
    UNCOMPRESSED_BITS, m.compressed_bits, m.compression_ratio
  )?;
  writeln!(out, "Average bits/pixel: {} / {} = {:.2}", m.compressed_bits, GRID_LEN, m.bits_per_pixel)?;
  writeln!(out, "RMS error: {}", m.rms_error)?;
  if m.fallback_count > 0 {
    writeln!(out, "Codewords outside Huffman table: {}", m.fallback_count)?;
  }
  writeln!(out)
}

pub fn write_report<W: Write + ?Sized>(out: &mut W, image: &ImageGrid, report: &RunReport) -> std::io::Result<()> {
  let code_width = report.codewords.pixels().iter().map(|cw| cw.len()).max().unwrap_or(1);
  writeln!(out, "=== Predictor {}: {} ===", report.predictor.as_u8(), report.formula)?;
  write_grid(out, "Original image", image, CELL_WIDTH)?;
  write_grid(out, "Coefficients after predictor", &report.residuals, CELL_WIDTH)?;
  write_grid(out, "Compressed image as a binary sequence", &report.codewords, code_width)?;
  write_grid(out, "Image after Huffman decoder", &report.decoded, CELL_WIDTH)?;
  write_grid(out, "Image after decompression", &report.reconstructed, CELL_WIDTH)?;
  write_summary(out, report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use predcodec::{Pipeline, Predictor};

  #[test]
  fn summary_lines() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let report = Pipeline::default().run(&Grid::new(), Predictor::P1)?;
    let mut buf = Vec::new();
    write_summary(&mut buf, &report)?;
    let text = String::from_utf8(buf)?;
    assert!(text.contains("Predictor 1: X = A"));
    assert!(text.contains("Compression ratio: 2048 / 256 = 8.00"));
    assert!(text.contains("Average bits/pixel: 256 / 256 = 1.00"));
    assert!(text.contains("RMS error: 0"));
    assert!(!text.contains("outside"));
    Ok(())
  }

  #[test]
  fn report_sections() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let image = Grid::from_fn(|_, _| 100);
    let report = Pipeline::default().run(&image, Predictor::P7)?;
    let mut buf = Vec::new();
    write_report(&mut buf, &image, &report)?;
    let text = String::from_utf8(buf)?;
    for title in [
      "Original image",
      "Coefficients after predictor",
      "Compressed image as a binary sequence",
      "Image after Huffman decoder",
      "Image after decompression",
    ] {
      assert!(text.contains(title), "missing section {}", title);
    }
    // Codewords are aligned to the 7 bit fallback of the first sample
    assert!(text.contains("1100100       1       1"));
    assert!(text.contains(" 100  100  100"));
    assert!(text.contains("Compression ratio: 2048 / 262 = 7.82"));
    assert!(text.contains("Average bits/pixel: 262 / 256 = 1.02"));
    assert!(text.contains("Codewords outside Huffman table: 1"));
    Ok(())
  }
}
