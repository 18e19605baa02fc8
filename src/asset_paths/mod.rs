//! Naming and filtering rules for files flowing through the pipeline.
//!
//! Bundle naming is load-bearing: the compile stages write names through
//! [`bundle_file_name`] and the page stage reads them back through [`BundleFile::parse`].

mod bundle;
mod filters;

pub use bundle::{BundleFile, bundle_file_name};
pub use filters::{has_extension, is_image_source, is_source_map, is_vendored_file};
