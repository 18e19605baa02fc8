//! Dependency vendoring pass.

use anyhow::{Context, Result};

use crate::asset_paths::is_vendored_file;
use crate::config::PackageManifest;
use crate::models::{Stage, StageReport};
use crate::project::BuildContext;
use crate::stages::{collect_files, install_file, isolate};

/// Copy the published files of every runtime dependency into the distribution tree.
///
/// Only files changed since the previous run are copied again. With no dependencies the
/// pass logs and succeeds without touching the distribution tree.
pub fn vendor_dependencies(context: &BuildContext) -> Result<StageReport> {
  let mut report = StageReport::new(Stage::Vendor);
  let manifest = PackageManifest::load_from_path(context.package_manifest())?;
  let dependencies = manifest.dependency_names();
  if dependencies.is_empty() {
    tracing::info!("no dependencies specified");
    return Ok(report);
  }

  let packages_dir = context.node_modules_dir();
  let vendor_dir = context.vendor_dist_dir();
  for dependency in &dependencies {
    let package_dir = packages_dir.join(dependency);
    if !package_dir.is_dir() {
      tracing::warn!(%dependency, dir = %package_dir.display(), "dependency is not installed");
      continue;
    }

    for source in collect_files(&package_dir, is_vendored_file)? {
      isolate(&mut report, &source, || {
        let relative = source
          .strip_prefix(&packages_dir)
          .with_context(|| format!("{} escapes {}", source.display(), packages_dir.display()))?;
        install_file(&source, &vendor_dir.join(relative))
      });
    }
  }

  tracing::info!(
    dependencies = dependencies.len(),
    written = report.written.len(),
    skipped = report.skipped,
    "vendored dependencies"
  );
  Ok(report)
}
