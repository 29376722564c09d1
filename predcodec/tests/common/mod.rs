// SPDX-License-Identifier: LGPL-2.1

use std::path::PathBuf;

use anyhow::Context;

use predcodec::{ImageGrid, load_image};

pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn testdata_file(name: &str) -> PathBuf {
  let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  path.push("data/testdata");
  path.push(name);
  path
}

/// Smooth ramp with a bright block in the middle
pub(crate) fn fixture_image() -> anyhow::Result<ImageGrid> {
  let path = testdata_file("image.txt");
  load_image(&path).with_context(|| format!("Failed to load fixture {}", path.display()))
}
