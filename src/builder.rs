//! Build orchestrator: clears, compiles, publishes and renders in dependency order.

use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, Result, bail};

use crate::models::{BuildReport, StageReport};
use crate::pipeline::AssetKind;
use crate::project::BuildContext;
use crate::stages::{assets, images, pages, vendor};

/// Runs the stages of one build invocation.
pub struct SiteBuilder {
  context: BuildContext,
}

impl SiteBuilder {
  /// Create a builder for the provided build context.
  pub fn new(context: BuildContext) -> Self {
    Self { context }
  }

  /// Context the builder runs with.
  pub fn context(&self) -> &BuildContext {
    &self.context
  }

  /// Remove the distribution tree. A tree that does not exist is already clear.
  pub fn clear(&self) -> Result<()> {
    let dist_dir = self.context.dist_dir();
    match fs::remove_dir_all(&dist_dir) {
      Ok(()) => {
        tracing::info!(dir = %dist_dir.display(), "cleared distribution tree");
        Ok(())
      }
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
      Err(err) => Err(err).with_context(|| format!("failed to remove {}", dist_dir.display())),
    }
  }

  /// Full production build: start from an empty tree, then run every stage.
  pub fn build(&self) -> Result<BuildReport> {
    self.clear()?;
    self.run()
  }

  /// Incremental development build; `clean` clears the tree first.
  pub fn develop(&self, clean: bool) -> Result<BuildReport> {
    if clean {
      self.clear()?;
    }
    self.run()
  }

  /// Copy runtime dependencies only.
  pub fn vendor(&self) -> Result<StageReport> {
    vendor::vendor_dependencies(&self.context)
  }

  /// Run every stage against the current tree.
  ///
  /// Scripts, styles and images write disjoint directories and run concurrently. Pages
  /// scan the bundle directories, so they start only once those stages are done.
  pub fn run(&self) -> Result<BuildReport> {
    let context = &self.context;
    let mut report = BuildReport {
      build_id: context.mode.build_id().map(ToString::to_string),
      stages: Vec::new(),
    };
    tracing::info!(
      root = %context.root.display(),
      build_id = report.build_id.as_deref().unwrap_or("none"),
      "starting build"
    );

    let ((scripts, styles), images) = rayon::join(
      || {
        rayon::join(
          || assets::compile_kind(context, AssetKind::Script),
          || assets::compile_kind(context, AssetKind::Style),
        )
      },
      || images::publish_images(context),
    );
    report.stages.extend(scripts?);
    report.stages.extend(styles?);
    report.stages.push(images?);

    let failed = report.failures().count();
    if failed > 0 {
      if context.mode.is_production() {
        bail!("{failed} source file(s) failed to compile");
      }
      tracing::warn!(failed, "continuing development build with failed sources");
    }

    report.stages.push(pages::render_pages(context)?);
    report.stages.push(self.vendor()?);

    tracing::info!(written = report.written(), "build finished");
    Ok(report)
  }
}
