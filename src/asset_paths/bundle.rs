use crate::mode::HashMode;
use crate::pipeline::{AssetKind, Pipeline};

/// Produce the output filename for a compiled bundle.
///
/// The shape is `<pipeline-tag>.<basename>[-<build id>].min.<ext>`. Pages rely on this
/// exact layout to find their bundles, so every compile stage names outputs through here.
pub fn bundle_file_name(pipeline: Pipeline, basename: &str, mode: &HashMode) -> String {
  format!(
    "{}.{}{}.min.{}",
    pipeline.tag(),
    basename,
    mode.filename_suffix(),
    pipeline.kind().extension()
  )
}

/// A bundle filename split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile<'a> {
  /// Full filename as listed in the bundle directory.
  pub file_name: &'a str,
  /// Pipeline that produced the bundle.
  pub pipeline: Pipeline,
  /// Page basename (or `main`) with any build id removed.
  pub page: &'a str,
  /// Whether the `.min` marker is present.
  pub minified: bool,
}

impl<'a> BundleFile<'a> {
  /// Basename shared by every page.
  pub const SHARED_PAGE: &'static str = "main";

  /// Parse a listed filename for the given asset kind.
  ///
  /// Returns `None` for source maps, unknown pipeline tags, pipelines of the other kind and
  /// files whose extension does not match the kind. In production the `-<build id>` suffix
  /// is stripped from the basename.
  pub fn parse(file_name: &'a str, kind: AssetKind, mode: &HashMode) -> Option<Self> {
    let (tag, rest) = file_name.split_once('.')?;
    let pipeline = Pipeline::from_tag(tag)?;
    if pipeline.kind() != kind {
      return None;
    }

    let (stem, tail) = rest.split_once('.')?;
    let extension = tail.rsplit('.').next()?;
    if extension != kind.extension() || stem.is_empty() {
      return None;
    }

    let page = match mode.build_id() {
      Some(id) => stem
        .strip_suffix(id.as_str())
        .and_then(|value| value.strip_suffix('-'))
        .unwrap_or(stem),
      None => stem,
    };

    Some(Self {
      file_name,
      pipeline,
      page,
      minified: tail.starts_with("min."),
    })
  }

  /// Returns `true` for bundles included on every page: any basename starting with `main`.
  pub fn is_shared(&self) -> bool {
    self.page.starts_with(Self::SHARED_PAGE)
  }

  /// Returns `true` when the bundle belongs on the page with the given base name.
  ///
  /// Basenames match by prefix, so `about-us` and `about-team` both land on `about`.
  pub fn applies_to(&self, page: &str) -> bool {
    self.is_shared() || (!page.is_empty() && self.page.starts_with(page))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_development_bundles() {
    let mode = HashMode::Development;
    assert_eq!(bundle_file_name(Pipeline::Ts, "about", &mode), "ts.about.min.js");
    assert_eq!(bundle_file_name(Pipeline::Scss, "main", &mode), "scss.main.min.css");
  }

  #[test]
  fn names_production_bundles() {
    let mode = HashMode::production_with("abc123");
    assert_eq!(
      bundle_file_name(Pipeline::Js, "main", &mode),
      "js.main-abc123.min.js"
    );
    assert_eq!(
      bundle_file_name(Pipeline::Sass, "about", &mode),
      "sass.about-abc123.min.css"
    );
  }

  #[test]
  fn parses_listed_bundles() {
    let mode = HashMode::Development;
    let parsed = BundleFile::parse("ts.about.min.js", AssetKind::Script, &mode).unwrap();
    assert_eq!(parsed.pipeline, Pipeline::Ts);
    assert_eq!(parsed.page, "about");
    assert!(parsed.minified);
    assert!(parsed.applies_to("about"));
    assert!(!parsed.applies_to("contact"));
  }

  #[test]
  fn rejects_maps_and_foreign_files() {
    let mode = HashMode::Development;
    assert!(BundleFile::parse("js.main.min.js.map", AssetKind::Script, &mode).is_none());
    assert!(BundleFile::parse("css.main.min.css", AssetKind::Script, &mode).is_none());
    assert!(BundleFile::parse("vendor.min.js", AssetKind::Script, &mode).is_none());
    assert!(BundleFile::parse("js.main", AssetKind::Script, &mode).is_none());
    assert!(BundleFile::parse("js..min.js", AssetKind::Script, &mode).is_none());
  }

  #[test]
  fn strips_build_id_in_production() {
    let mode = HashMode::production_with("abc123");
    let parsed = BundleFile::parse("scss.about-abc123.min.css", AssetKind::Style, &mode).unwrap();
    assert_eq!(parsed.page, "about");

    let stale = BundleFile::parse("scss.about-old.min.css", AssetKind::Style, &mode).unwrap();
    assert_eq!(stale.page, "about-old");
  }

  #[test]
  fn basenames_match_by_prefix() {
    let mode = HashMode::Development;
    let team = BundleFile::parse("ts.about-us.min.js", AssetKind::Script, &mode).unwrap();
    assert!(team.applies_to("about"));
    assert!(!team.applies_to("contact"));

    let vendor = BundleFile::parse("js.main-vendor.min.js", AssetKind::Script, &mode).unwrap();
    assert!(vendor.is_shared());
    assert!(vendor.applies_to("contact"));

    let hashed = HashMode::production_with("abc123");
    let extra = BundleFile::parse("js.main-vendor-abc123.min.js", AssetKind::Script, &hashed);
    assert_eq!(extra.unwrap().page, "main-vendor");
  }

  #[test]
  fn unminified_bundles_still_parse() {
    let mode = HashMode::Development;
    let parsed = BundleFile::parse("js.main.js", AssetKind::Script, &mode).unwrap();
    assert!(!parsed.minified);
    assert!(parsed.is_shared());
  }
}
