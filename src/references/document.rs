use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::mode::HashMode;
use crate::pipeline::AssetKind;
use crate::project::BuildContext;
use crate::references::slots::AssetSlots;
use crate::references::splice::SpliceReader;
use crate::references::tags::render_tags;
use crate::scanner::scan_bundle_dir;
use crate::stages::{write_atomic, write_atomic_from};

/// Page body either held in memory or produced by a reader.
pub enum PageContents {
  /// Fully rendered HTML.
  Buffered(String),
  /// HTML produced incrementally.
  Streamed(Box<dyn Read + Send>),
}

impl fmt::Debug for PageContents {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Buffered(text) => f.debug_tuple("Buffered").field(&text.len()).finish(),
      Self::Streamed(_) => f.write_str("Streamed"),
    }
  }
}

impl PageContents {
  /// Drain the contents into a string.
  pub fn into_string(self) -> io::Result<String> {
    match self {
      Self::Buffered(text) => Ok(text),
      Self::Streamed(mut reader) => {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(text)
      }
    }
  }
}

/// A page straight out of the template engine, still holding its slot markers.
#[derive(Debug)]
pub struct RenderedPage {
  /// Output path relative to the distribution root, e.g. `blog/post.html`.
  pub relative_path: PathBuf,
  /// Rendered HTML.
  pub contents: PageContents,
  /// Markers emitted while rendering this page.
  pub slots: AssetSlots,
}

impl RenderedPage {
  /// Base name used to pick page-specific bundles: the file name up to its first dot.
  pub fn base_name(&self) -> &str {
    page_base_name(&self.relative_path)
  }
}

/// A page whose slot markers have all been replaced; the only form that gets written.
#[derive(Debug)]
pub struct ResolvedPage {
  /// Output path relative to the distribution root.
  pub relative_path: PathBuf,
  /// Final HTML.
  pub contents: PageContents,
}

impl ResolvedPage {
  /// Write the page below `dist_dir`, creating parent directories as needed. The page is
  /// staged beside its target and moved into place once complete.
  pub fn write_to(self, dist_dir: &Path) -> Result<PathBuf> {
    let target = dist_dir.join(&self.relative_path);
    match self.contents {
      PageContents::Buffered(text) => write_atomic(&target, text.as_bytes())?,
      PageContents::Streamed(reader) => write_atomic_from(&target, reader)?,
    }
    Ok(target)
  }
}

/// Snapshot of both bundle directories taken before pages are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleListings {
  scripts: Vec<String>,
  styles: Vec<String>,
}

impl BundleListings {
  /// Listings supplied directly.
  pub fn new(scripts: Vec<String>, styles: Vec<String>) -> Self {
    Self { scripts, styles }
  }

  /// Scan both bundle directories of the build.
  pub fn scan(context: &BuildContext) -> Result<Self> {
    Ok(Self {
      scripts: scan_bundle_dir(&context.bundle_dir(AssetKind::Script))?,
      styles: scan_bundle_dir(&context.bundle_dir(AssetKind::Style))?,
    })
  }

  /// Listing for the given kind.
  pub fn listing(&self, kind: AssetKind) -> &[String] {
    match kind {
      AssetKind::Script => &self.scripts,
      AssetKind::Style => &self.styles,
    }
  }
}

/// Splices bundle reference tags into rendered pages.
#[derive(Debug, Clone)]
pub struct ReferenceResolver<'a> {
  mode: &'a HashMode,
  listings: BundleListings,
}

impl<'a> ReferenceResolver<'a> {
  /// Resolver over a fixed pair of listings.
  pub fn new(mode: &'a HashMode, listings: BundleListings) -> Self {
    Self { mode, listings }
  }

  /// Tags of the given kind for the page with this base name.
  pub fn tags_for(&self, kind: AssetKind, page: &str) -> String {
    render_tags(self.listings.listing(kind), kind, page, self.mode)
  }

  /// Replace both slot markers of a rendered page with its bundle tags.
  pub fn resolve(&self, page: RenderedPage) -> ResolvedPage {
    let base_name = page.base_name().to_string();
    let scripts = self.tags_for(AssetKind::Script, &base_name);
    let styles = self.tags_for(AssetKind::Style, &base_name);
    tracing::debug!(
      page = %page.relative_path.display(),
      base_name = %base_name,
      scripts = scripts.len(),
      styles = styles.len(),
      "resolving asset slots"
    );

    let script_marker = page.slots.marker(AssetKind::Script);
    let style_marker = page.slots.marker(AssetKind::Style);
    let contents = match page.contents {
      PageContents::Buffered(text) => PageContents::Buffered(
        text
          .replace(script_marker, &scripts)
          .replace(style_marker, &styles),
      ),
      PageContents::Streamed(reader) => {
        let scripts_spliced = SpliceReader::new(reader, script_marker, scripts);
        PageContents::Streamed(Box::new(SpliceReader::new(
          scripts_spliced,
          style_marker,
          styles,
        )))
      }
    };

    ResolvedPage {
      relative_path: page.relative_path,
      contents,
    }
  }
}

/// The part of a page's file name before its first dot.
pub fn page_base_name(path: &Path) -> &str {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .and_then(|name| name.split('.').next())
    .unwrap_or_default()
}
