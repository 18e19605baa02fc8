//! Lists the compiled bundles currently present in an output directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::asset_paths::is_source_map;

/// Filenames found in a bundle directory, source maps excluded, sorted by name.
///
/// A directory that does not exist yet lists nothing, since a project without scripts
/// never creates one.
pub fn scan_bundle_dir(dir: &Path) -> Result<Vec<String>> {
  if !dir.is_dir() {
    tracing::debug!(dir = %dir.display(), "bundle directory absent");
    return Ok(Vec::new());
  }

  let mut listing = Vec::new();
  for entry in
    fs::read_dir(dir).with_context(|| format!("failed to read bundle directory {}", dir.display()))?
  {
    let entry = entry?;
    if !entry.file_type()?.is_file() {
      continue;
    }

    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };

    if !is_source_map(name) {
      listing.push(name.to_string());
    }
  }

  listing.sort();
  Ok(listing)
}
