use crate::asset_paths::BundleFile;
use crate::mode::HashMode;
use crate::pipeline::AssetKind;

/// Tag for an explicitly named bundle, as emitted by `{{script "name"}}` / `{{style "name"}}`.
///
/// The build id is appended to the name as given; the author names the file without it.
pub fn explicit_tag(kind: AssetKind, name: &str, mode: &HashMode) -> String {
  kind.tag(&format!("{name}{}", mode.filename_suffix()))
}

/// Bundles from `listing` that belong on the page with the given base name.
///
/// Bundles whose basename starts with `main` (every pipeline of the kind) are selected
/// along with those whose basename starts with the page's base name. Listing order is
/// preserved.
pub fn select_bundles<'a>(
  listing: &'a [String],
  kind: AssetKind,
  page: &str,
  mode: &HashMode,
) -> Vec<&'a str> {
  listing
    .iter()
    .filter_map(|name| BundleFile::parse(name, kind, mode))
    .filter(|bundle| bundle.applies_to(page))
    .map(|bundle| bundle.file_name)
    .collect()
}

/// Concatenated reference tags for the page, empty when nothing matches.
pub fn render_tags(listing: &[String], kind: AssetKind, page: &str, mode: &HashMode) -> String {
  select_bundles(listing, kind, page, mode)
    .into_iter()
    .map(|file| kind.tag(file))
    .collect()
}
