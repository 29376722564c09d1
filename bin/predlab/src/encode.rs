// SPDX-License-Identifier: LGPL-2.1

use std::{
  io::{BufWriter, Write},
  path::PathBuf,
};

use clap::ArgMatches;
use log::{debug, info};
use predcodec::{Pipeline, PipelineConfig, Predictor, Rounding, load_image};

use crate::{AppError, output};

/// Build the pipeline config, CLI switches override the environment
fn pipeline_config(options: &ArgMatches) -> crate::Result<PipelineConfig> {
  let mut config = PipelineConfig::from_env();
  if let Some(rounding) = options.get_one::<Rounding>("rounding") {
    config = config.with_rounding(*rounding);
  }
  let predictors = options
    .get_many::<u8>("predictor")
    .into_iter()
    .flatten()
    .map(|p| Predictor::try_from(*p))
    .collect::<predcodec::Result<Vec<_>>>()?;
  Ok(config.with_predictors(&predictors))
}

/// Run all selected predictors on the input image
pub fn encode(options: &ArgMatches) -> crate::Result<()> {
  let in_file: &PathBuf = options
    .get_one("FILE")
    .ok_or_else(|| AppError::InvalidCmdSwitch("FILE not available".into()))?;
  debug!("Infile: {:?}", in_file);

  if options.get_flag("summary") && (options.get_flag("json") || options.get_flag("yaml")) {
    return Err(AppError::InvalidCmdSwitch("--summary can not be combined with --json or --yaml".into()));
  }

  // Image is validated before any predictor runs
  let image = load_image(in_file)?;
  let config = pipeline_config(options)?;
  info!("Rounding: {}, predictors: {:?}", config.rounding, config.predictors);

  let reports = Pipeline::new(config).run_all(&image)?;

  if options.get_flag("json") || options.get_flag("yaml") {
    return output::print_output(&reports, options);
  }

  let mut out = BufWriter::new(std::io::stdout());
  for report in &reports {
    if options.get_flag("summary") {
      output::write_summary(&mut out, report)?;
    } else {
      output::write_report(&mut out, &image, report)?;
    }
  }
  out.flush()?;
  Ok(())
}
