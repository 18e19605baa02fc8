#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod compiler;
pub mod config;
pub mod mode;
pub mod models;
pub mod pipeline;
pub mod project;
pub mod references;
pub mod render;
pub mod scanner;
pub mod stages;

pub use builder::SiteBuilder;
pub use config::{DEFAULT_CONFIG_FILE, PackageManifest, PackageManifestError, ProjectConfig};
pub use mode::{BuildId, HashMode};
pub use models::{BuildReport, Stage, StageFailure, StageReport};
pub use pipeline::{AssetKind, Pipeline};
pub use project::{BuildContext, ProjectLayout};
pub use references::{ReferenceResolver, RenderedPage, ResolvedPage};
pub use render::PageRenderer;
