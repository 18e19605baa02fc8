//! Publishes image sources into the distribution assets.

use anyhow::{Context, Result};

use crate::asset_paths::is_image_source;
use crate::models::{Stage, StageReport};
use crate::project::BuildContext;
use crate::stages::{collect_files, install_file, isolate};

/// Publish every image below the images source directory, keeping relative paths.
pub fn publish_images(context: &BuildContext) -> Result<StageReport> {
  let mut report = StageReport::new(Stage::Images);
  let source_dir = context.images_source_dir();
  let output_dir = context.images_dist_dir();

  for source in collect_files(&source_dir, is_image_source)? {
    isolate(&mut report, &source, || {
      let relative = source
        .strip_prefix(&source_dir)
        .with_context(|| format!("{} escapes {}", source.display(), source_dir.display()))?;
      install_file(&source, &output_dir.join(relative))
    });
  }

  tracing::info!(
    written = report.written.len(),
    skipped = report.skipped,
    failed = report.failures.len(),
    "published images"
  );
  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ProjectConfig;
  use crate::mode::HashMode;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn copies_images_and_ignores_other_files() {
    let dir = tempdir().unwrap();
    let images = dir.path().join("src/assets/images");
    fs::create_dir_all(images.join("icons")).unwrap();
    fs::write(images.join("logo.png"), [0u8, 1]).unwrap();
    fs::write(images.join("icons/favicon.ico"), [2u8]).unwrap();
    fs::write(images.join("README.txt"), "notes").unwrap();

    let context = BuildContext::new(
      dir.path(),
      ProjectConfig::default().into_layout(),
      HashMode::Development,
    );
    let report = publish_images(&context).unwrap();

    let output = dir.path().join("dist/assets/images");
    assert_eq!(report.written.len(), 2);
    assert!(output.join("logo.png").exists());
    assert!(output.join("icons/favicon.ico").exists());
    assert!(!output.join("README.txt").exists());

    let again = publish_images(&context).unwrap();
    assert!(again.written.is_empty());
    assert_eq!(again.skipped, 2);
  }
}
