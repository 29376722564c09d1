// SPDX-License-Identifier: LGPL-2.1

use log::warn;

use crate::config::Rounding;

pub(crate) fn predcodec_rounding() -> Option<Rounding> {
  match std::env::var("PREDCODEC_ROUNDING").map(|val| val.parse::<Rounding>()) {
    Ok(Ok(value)) => Some(value),
    Ok(Err(err)) => {
      warn!("Invalid value for PREDCODEC_ROUNDING: {}", err);
      None
    }
    Err(_) => None,
  }
}
