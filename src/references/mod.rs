//! Resolution of bundle references inside rendered pages.
//!
//! Rendering happens in two stages. While a template renders, the `script` and `style`
//! helpers either emit a literal tag for an explicitly named bundle or leave an
//! [`AssetSlots`] marker. Once every bundle has been written, [`ReferenceResolver`] swaps
//! each marker for the tags of the bundles that belong to that page.

mod document;
mod slots;
mod splice;
mod tags;

pub use document::{
  BundleListings, PageContents, ReferenceResolver, RenderedPage, ResolvedPage, page_base_name,
};
pub use slots::AssetSlots;
pub use splice::SpliceReader;
pub use tags::{explicit_tag, render_tags, select_bundles};
