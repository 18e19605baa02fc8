//! Origin pipelines and the asset kinds they produce.

use std::fmt;

/// The two kinds of bundle that get referenced from pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
  /// Compiled scripts written to `assets/js`.
  Script,
  /// Compiled stylesheets written to `assets/css`.
  Style,
}

impl AssetKind {
  /// Directory name below the distribution assets root.
  pub fn dir_name(self) -> &'static str {
    match self {
      Self::Script => "js",
      Self::Style => "css",
    }
  }

  /// Extension carried by every bundle of this kind.
  pub fn extension(self) -> &'static str {
    match self {
      Self::Script => "js",
      Self::Style => "css",
    }
  }

  /// Pipelines whose bundles land in this kind's directory.
  pub fn pipelines(self) -> &'static [Pipeline] {
    match self {
      Self::Script => &[Pipeline::Ts, Pipeline::Js],
      Self::Style => &[Pipeline::Sass, Pipeline::Scss, Pipeline::Css],
    }
  }

  /// Render the HTML tag referencing a bundle at `/assets/<dir>/<file>`.
  pub fn tag(self, file: &str) -> String {
    match self {
      Self::Script => format!(r#"<script src="/assets/js/{file}"></script>"#),
      Self::Style => format!(r#"<link rel="stylesheet" href="/assets/css/{file}">"#),
    }
  }
}

/// Source pipeline that produced a bundle, encoded as the filename's leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
  /// Plain JavaScript.
  Js,
  /// TypeScript.
  Ts,
  /// Indented-syntax Sass.
  Sass,
  /// SCSS.
  Scss,
  /// Plain CSS.
  Css,
}

impl Pipeline {
  /// Every pipeline, in the order the compile stages run them.
  pub const ALL: [Pipeline; 5] = [Self::Ts, Self::Js, Self::Sass, Self::Scss, Self::Css];

  /// Filename tag identifying this pipeline.
  pub fn tag(self) -> &'static str {
    match self {
      Self::Js => "js",
      Self::Ts => "ts",
      Self::Sass => "sass",
      Self::Scss => "scss",
      Self::Css => "css",
    }
  }

  /// Parse a filename tag back into a pipeline.
  pub fn from_tag(tag: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|pipeline| pipeline.tag() == tag)
  }

  /// Asset kind of the bundles this pipeline writes.
  pub fn kind(self) -> AssetKind {
    match self {
      Self::Js | Self::Ts => AssetKind::Script,
      Self::Sass | Self::Scss | Self::Css => AssetKind::Style,
    }
  }

  /// Extension of the source files consumed by this pipeline.
  pub fn source_extension(self) -> &'static str {
    self.tag()
  }

  /// Directory below the source assets root holding this pipeline's inputs.
  pub fn source_dir_name(self) -> &'static str {
    self.tag()
  }
}

impl fmt::Display for Pipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}
