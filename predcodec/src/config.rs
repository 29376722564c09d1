// SPDX-License-Identifier: LGPL-2.1

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{PredcodecError, envparams, predictor::Predictor};

/// How the halving in predictors 5-7 is rounded.
///
/// | mode        | encode      | decode      |
/// |-------------|-------------|-------------|
/// | `Truncate`  | `d / 2`     | `d / 2`     |
/// | `CeilFloor` | `ceil(d/2)` | `floor(d/2)`|
/// | `Shift`     | `d >> 1`    | `d >> 1`    |
///
/// `Truncate` rounds toward zero on both sides. Ceiling or floor of
/// an integer quotient that is already truncated are no-ops, so this is
/// also what `ceil(d / 2)` and `floor(d / 2)` give in integer arithmetic.
/// `CeilFloor` applies the rounding to the exact half, which makes the
/// encoder and decoder disagree for odd differences.
/// `Shift` is the ITU T.81 convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rounding {
  #[default]
  Truncate,
  CeilFloor,
  Shift,
}

impl Rounding {
  pub const ALL: [Rounding; 3] = [Rounding::Truncate, Rounding::CeilFloor, Rounding::Shift];

  /// Halving used when computing the prediction for encoding
  #[inline(always)]
  pub fn half_encode(self, d: i32) -> i32 {
    match self {
      Self::Truncate => d / 2,
      Self::CeilFloor => (d >> 1) + (d & 1),
      Self::Shift => d >> 1,
    }
  }

  /// Halving used when computing the prediction for reconstruction
  #[inline(always)]
  pub fn half_decode(self, d: i32) -> i32 {
    match self {
      Self::Truncate => d / 2,
      Self::CeilFloor => d >> 1,
      Self::Shift => d >> 1,
    }
  }

  /// True if encode and decode halving agree for every input
  pub fn is_symmetric(self) -> bool {
    !matches!(self, Self::CeilFloor)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Truncate => "truncate",
      Self::CeilFloor => "ceil-floor",
      Self::Shift => "shift",
    }
  }
}

impl Display for Rounding {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Rounding {
  type Err = PredcodecError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "truncate" => Ok(Self::Truncate),
      "ceil-floor" | "ceilfloor" => Ok(Self::CeilFloor),
      "shift" => Ok(Self::Shift),
      other => Err(PredcodecError::InvalidRounding(other.to_string())),
    }
  }
}

/// Parameters for a pipeline batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
  pub rounding: Rounding,
  pub predictors: Vec<Predictor>,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      rounding: Rounding::default(),
      predictors: Predictor::all().to_vec(),
    }
  }
}

impl PipelineConfig {
  /// Default config with overrides from environment variables
  pub fn from_env() -> Self {
    let mut config = Self::default();
    if let Some(rounding) = envparams::predcodec_rounding() {
      config.rounding = rounding;
    }
    config
  }

  pub fn with_rounding(mut self, rounding: Rounding) -> Self {
    self.rounding = rounding;
    self
  }

  /// Restrict runs to the given predictors, sorted and deduplicated.
  /// An empty list keeps all predictors.
  pub fn with_predictors(mut self, predictors: &[Predictor]) -> Self {
    if !predictors.is_empty() {
      let mut predictors = predictors.to_vec();
      predictors.sort();
      predictors.dedup();
      self.predictors = predictors;
    }
    self
  }
}
