// SPDX-License-Identifier: LGPL-2.1

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, crate_version, value_parser};
use log::debug;
use predcodec::Rounding;

pub fn create_app() -> Command {
  debug!("Creating CLAP app configuration");
  Command::new("predlab")
    .version(crate_version!())
    .about("predlab - Lossless predictive coding of 16x16 grayscale images")
    .arg(
      Arg::new("debug")
        .short('d')
        .action(ArgAction::Count)
        .global(true)
        .help("Sets the level of debugging information"),
    )
    .arg(
      Arg::new("predictor")
        .short('p')
        .long("predictor")
        .action(ArgAction::Append)
        .value_parser(value_parser!(u8).range(1..=7))
        .help("LJPEG predictor (1-7), can be repeated, default is all"),
    )
    .arg(
      Arg::new("rounding")
        .long("rounding")
        .value_parser(validate_rounding)
        .help("Halving of predictors 5-7: 'truncate', 'ceil-floor' or 'shift'"),
    )
    .arg(Arg::new("summary").long("summary").action(ArgAction::SetTrue).help("Print only the metrics"))
    .arg(
      Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .conflicts_with("yaml")
        .help("Format reports as JSON"),
    )
    .arg(Arg::new("yaml").long("yaml").action(ArgAction::SetTrue).help("Format reports as YAML"))
    .arg(
      Arg::new("FILE")
        .default_value("image.txt")
        .value_parser(value_parser!(PathBuf))
        .help("Input file with 256 whitespace separated integers"),
    )
}

fn validate_rounding(v: &str) -> Result<Rounding, String> {
  v.parse::<Rounding>().map_err(|err| err.to_string())
}
