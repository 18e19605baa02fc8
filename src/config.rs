//! Project configuration loader and the package manifest read by the vendoring pass.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::project::ProjectLayout;

/// Configuration file searched for in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "bundler.config.json";

/// Discoverable project configuration describing filesystem layout and compilers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
  /// Source root relative to the project root.
  pub source_dir: String,
  /// Distribution root relative to the project root.
  pub dist_dir: String,
  /// Partial templates below the source root.
  pub partials_dir: String,
  /// Page templates below the source root.
  pub pages_dir: String,
  /// Asset sources below the source root.
  pub source_assets_dir: String,
  /// Image sources below the asset sources, and image outputs below the dist assets.
  pub images_dir: String,
  /// JSON template data below the source root.
  pub strings_file: String,
  /// Extension shared by partial and page templates.
  pub template_extension: String,
  /// Package manifest listing runtime dependencies.
  pub package_manifest: String,
  /// Installed packages directory.
  pub node_modules_dir: String,
  /// Vendored packages below the distribution root.
  pub vendor_dir: String,
  /// Bundle and image outputs below the distribution root.
  pub dist_assets_dir: String,
  /// Command reading plain JavaScript on stdin and writing the bundle to stdout.
  pub js_command: Vec<String>,
  /// Command reading TypeScript on stdin and writing the bundle to stdout.
  pub ts_command: Vec<String>,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      source_dir: "src".into(),
      dist_dir: "dist".into(),
      partials_dir: "partials".into(),
      pages_dir: "pages".into(),
      source_assets_dir: "assets".into(),
      images_dir: "images".into(),
      strings_file: "strings.json".into(),
      template_extension: "hbs".into(),
      package_manifest: "package.json".into(),
      node_modules_dir: "node_modules".into(),
      vendor_dir: "node_modules".into(),
      dist_assets_dir: "assets".into(),
      js_command: vec!["esbuild".into(), "--minify".into()],
      ts_command: vec!["esbuild".into(), "--loader=ts".into(), "--minify".into()],
    }
  }
}

impl ProjectConfig {
  /// Attempt to load configuration from the project root.
  ///
  /// A missing file yields the defaults. A file that fails to parse is reported and the
  /// defaults are used so a typo never leaves the build without a layout.
  pub fn discover(project_root: &Path) -> Self {
    let candidate = project_root.join(DEFAULT_CONFIG_FILE);
    if !candidate.exists() {
      return Self::default();
    }
    Self::from_path(&candidate).unwrap_or_else(|| {
      tracing::warn!(path = %candidate.display(), "ignoring unreadable configuration");
      Self::default()
    })
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Convert the configuration into an owned layout description.
  pub fn into_layout(self) -> ProjectLayout {
    ProjectLayout {
      source_dir: self.source_dir,
      dist_dir: self.dist_dir,
      partials_dir: self.partials_dir,
      pages_dir: self.pages_dir,
      source_assets_dir: self.source_assets_dir,
      images_dir: self.images_dir,
      strings_file: self.strings_file,
      template_extension: self.template_extension,
      package_manifest: self.package_manifest,
      node_modules_dir: self.node_modules_dir,
      vendor_dir: self.vendor_dir,
      dist_assets_dir: self.dist_assets_dir,
      js_command: self.js_command,
      ts_command: self.ts_command,
    }
  }
}

/// The subset of `package.json` the vendoring pass reads.
#[derive(Debug, Default, Deserialize)]
pub struct PackageManifest {
  #[serde(default)]
  dependencies: Map<String, Value>,
}

/// Errors that can occur while loading the package manifest.
#[derive(Debug)]
pub enum PackageManifestError {
  /// Failed to read the manifest from disk.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the manifest JSON.
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl PackageManifest {
  /// Load the manifest if present; a missing file lists no dependencies.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, PackageManifestError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(PackageManifestError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    serde_json::from_str(&contents).map_err(|err| PackageManifestError::Parse {
      path: path.to_path_buf(),
      source: err,
    })
  }

  /// Runtime dependency names, sorted.
  pub fn dependency_names(&self) -> Vec<String> {
    self.dependencies.keys().cloned().collect()
  }
}

impl std::fmt::Display for PackageManifestError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io { path, source } => {
        write!(f, "failed to read {}: {}", path.display(), source)
      }
      Self::Parse { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
    }
  }
}

impl std::error::Error for PackageManifestError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
    }
  }
}
