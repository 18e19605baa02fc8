//! Project layout and the per-invocation build context.

use std::path::PathBuf;

use crate::mode::HashMode;
use crate::pipeline::{AssetKind, Pipeline};

/// Directory and file names describing where sources live and where outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
  /// Source root relative to the project root.
  pub source_dir: String,
  /// Distribution root relative to the project root.
  pub dist_dir: String,
  /// Partial templates below the source root.
  pub partials_dir: String,
  /// Page templates below the source root.
  pub pages_dir: String,
  /// Script, style and image sources below the source root.
  pub source_assets_dir: String,
  /// Image sources below the source assets directory.
  pub images_dir: String,
  /// Template data file below the source root.
  pub strings_file: String,
  /// Extension of partial and page templates.
  pub template_extension: String,
  /// Package manifest listing runtime dependencies, relative to the project root.
  pub package_manifest: String,
  /// Installed packages relative to the project root.
  pub node_modules_dir: String,
  /// Vendored packages below the distribution root.
  pub vendor_dir: String,
  /// Bundle and image outputs below the distribution root.
  pub dist_assets_dir: String,
  /// Command compiling plain scripts; empty copies the source through.
  pub js_command: Vec<String>,
  /// Command compiling typed scripts; empty copies the source through.
  pub ts_command: Vec<String>,
}

impl ProjectLayout {
  /// External command configured for a script pipeline.
  pub fn script_command(&self, pipeline: Pipeline) -> &[String] {
    match pipeline {
      Pipeline::Ts => &self.ts_command,
      _ => &self.js_command,
    }
  }
}

/// Everything a single build invocation needs: where the project is, how it is laid out
/// and which hash mode is active.
#[derive(Debug, Clone)]
pub struct BuildContext {
  /// Project root every layout path is resolved against.
  pub root: PathBuf,
  /// Layout description.
  pub layout: ProjectLayout,
  /// Hash mode for this invocation.
  pub mode: HashMode,
}

impl BuildContext {
  /// Create a context for the given project root.
  pub fn new(root: impl Into<PathBuf>, layout: ProjectLayout, mode: HashMode) -> Self {
    Self {
      root: root.into(),
      layout,
      mode,
    }
  }

  /// Source root.
  pub fn source_dir(&self) -> PathBuf {
    self.root.join(&self.layout.source_dir)
  }

  /// Partial templates directory.
  pub fn partials_dir(&self) -> PathBuf {
    self.source_dir().join(&self.layout.partials_dir)
  }

  /// Page templates directory.
  pub fn pages_dir(&self) -> PathBuf {
    self.source_dir().join(&self.layout.pages_dir)
  }

  /// Template data file.
  pub fn strings_file(&self) -> PathBuf {
    self.source_dir().join(&self.layout.strings_file)
  }

  /// Source directory consumed by a pipeline.
  pub fn pipeline_source_dir(&self, pipeline: Pipeline) -> PathBuf {
    self
      .source_dir()
      .join(&self.layout.source_assets_dir)
      .join(pipeline.source_dir_name())
  }

  /// Image sources directory.
  pub fn images_source_dir(&self) -> PathBuf {
    self
      .source_dir()
      .join(&self.layout.source_assets_dir)
      .join(&self.layout.images_dir)
  }

  /// Package manifest path.
  pub fn package_manifest(&self) -> PathBuf {
    self.root.join(&self.layout.package_manifest)
  }

  /// Installed packages directory.
  pub fn node_modules_dir(&self) -> PathBuf {
    self.root.join(&self.layout.node_modules_dir)
  }

  /// Distribution root.
  pub fn dist_dir(&self) -> PathBuf {
    self.root.join(&self.layout.dist_dir)
  }

  /// Output directory for bundles of the given kind.
  pub fn bundle_dir(&self, kind: AssetKind) -> PathBuf {
    self.dist_assets_dir().join(kind.dir_name())
  }

  /// Output directory for published images.
  pub fn images_dist_dir(&self) -> PathBuf {
    self.dist_assets_dir().join(&self.layout.images_dir)
  }

  /// Output directory for vendored packages.
  pub fn vendor_dist_dir(&self) -> PathBuf {
    self.dist_dir().join(&self.layout.vendor_dir)
  }

  fn dist_assets_dir(&self) -> PathBuf {
    self.dist_dir().join(&self.layout.dist_assets_dir)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ProjectConfig;

  #[test]
  fn resolves_conventional_directories() {
    let context = BuildContext::new(
      "/site",
      ProjectConfig::default().into_layout(),
      HashMode::Development,
    );

    assert_eq!(context.pages_dir(), PathBuf::from("/site/src/pages"));
    assert_eq!(
      context.pipeline_source_dir(Pipeline::Scss),
      PathBuf::from("/site/src/assets/scss")
    );
    assert_eq!(
      context.bundle_dir(AssetKind::Script),
      PathBuf::from("/site/dist/assets/js")
    );
    assert_eq!(
      context.images_dist_dir(),
      PathBuf::from("/site/dist/assets/images")
    );
    assert_eq!(
      context.vendor_dist_dir(),
      PathBuf::from("/site/dist/node_modules")
    );
  }

  #[test]
  fn script_commands_follow_pipeline() {
    let layout = ProjectConfig::default().into_layout();
    assert_eq!(layout.script_command(Pipeline::Js), vec!["esbuild", "--minify"]);
    assert_eq!(layout.script_command(Pipeline::Ts)[0], "esbuild");
  }
}
