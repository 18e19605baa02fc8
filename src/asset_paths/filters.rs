use std::path::Path;

use regex::Regex;

fn image_source_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)\.(png|jpe?g|gif|svg|ico)$").expect("invalid image extension regex")
  })
}

/// Determine whether a listed bundle file is a source map.
pub fn is_source_map(file_name: &str) -> bool {
  file_name.ends_with(".map")
}

/// Determine whether a file under the images source tree should be published.
pub fn is_image_source(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| image_source_pattern().is_match(name))
}

/// Determine whether a file inside a dependency package gets vendored.
///
/// Only names with an extension are published and dotfiles are skipped, matching the
/// `**/*.*` selection used for package contents.
pub fn is_vendored_file(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| !name.starts_with('.') && name.contains('.'))
}

/// Determine whether a source file belongs to a pipeline with the given extension.
pub fn has_extension(path: &Path, extension: &str) -> bool {
  path
    .extension()
    .and_then(|value| value.to_str())
    .is_some_and(|value| value.eq_ignore_ascii_case(extension))
}
