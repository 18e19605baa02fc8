//! Page stage: render, resolve bundle references, write.

use anyhow::Result;

use crate::models::{Stage, StageReport};
use crate::project::BuildContext;
use crate::references::{BundleListings, ReferenceResolver};
use crate::render::PageRenderer;

/// Render every page and write it with its bundle tags spliced in.
///
/// Bundle directories are scanned once, so this must run after the compile stages. A
/// template error fails the whole stage.
pub fn render_pages(context: &BuildContext) -> Result<StageReport> {
  let mut report = StageReport::new(Stage::Pages);
  let listings = BundleListings::scan(context)?;
  let resolver = ReferenceResolver::new(&context.mode, listings);
  let mut renderer = PageRenderer::new(context)?;
  let dist_dir = context.dist_dir();

  for source in renderer.page_sources()? {
    let rendered = renderer.render_page(&source)?;
    let written = resolver.resolve(rendered).write_to(&dist_dir)?;
    tracing::debug!(source = %source.display(), output = %written.display(), "wrote page");
    report.written.push(written);
  }

  tracing::info!(pages = report.written.len(), "rendered pages");
  Ok(report)
}
