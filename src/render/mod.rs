//! Page rendering with Handlebars.
//!
//! One [`PageRenderer`] is one render session: it owns a registry with every partial and
//! helper registered, and the [`AssetSlots`] its `script`/`style` helpers emit.

mod helpers;
mod layouts;
mod minify;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::Value;

use crate::asset_paths::has_extension;
use crate::project::BuildContext;
use crate::references::{AssetSlots, PageContents, RenderedPage};
use crate::stages::collect_files;

pub use helpers::{
  AssetHelper, CapitalsHelper, ImageHelper, PageLinkHelper, image_src, image_url, page_link,
  register_helpers,
};
pub use layouts::{
  BlockHelper, ContentHelper, ContentMode, ExtendHelper, LayoutStack, register_layout_helpers,
};
pub use minify::collapse_whitespace;

/// Renders page templates into [`RenderedPage`]s.
pub struct PageRenderer {
  registry: Handlebars<'static>,
  slots: AssetSlots,
  data: Value,
  pages_dir: PathBuf,
  template_extension: String,
}

impl PageRenderer {
  /// Prepare a render session: helpers for the build's mode, every partial, template data.
  pub fn new(context: &BuildContext) -> Result<Self> {
    let slots = AssetSlots::for_mode(&context.mode);
    let mut registry = Handlebars::new();
    register_helpers(&mut registry, &context.mode, &slots);

    let extension = &context.layout.template_extension;
    let partials_dir = context.partials_dir();
    for partial in collect_files(&partials_dir, |path| has_extension(path, extension))? {
      let name = template_name(&partials_dir, &partial)?;
      let source = fs::read_to_string(&partial)
        .with_context(|| format!("failed to read partial {}", partial.display()))?;
      registry
        .register_partial(&name, source)
        .with_context(|| format!("failed to parse partial {}", partial.display()))?;
      tracing::trace!(partial = %name, "registered partial");
    }

    Ok(Self {
      registry,
      slots,
      data: load_template_data(&context.strings_file())?,
      pages_dir: context.pages_dir(),
      template_extension: extension.clone(),
    })
  }

  /// Page templates of the project, sorted by path.
  pub fn page_sources(&self) -> Result<Vec<PathBuf>> {
    collect_files(&self.pages_dir, |path| {
      has_extension(path, &self.template_extension)
    })
  }

  /// Render one page template, collapse its whitespace and keep its slot markers.
  ///
  /// References to unknown partials fail the render.
  pub fn render_page(&mut self, source: &Path) -> Result<RenderedPage> {
    let name = template_name(&self.pages_dir, source)?;
    let template = fs::read_to_string(source)
      .with_context(|| format!("failed to read page {}", source.display()))?;
    self
      .registry
      .register_template_string(&name, template)
      .with_context(|| format!("failed to parse page {}", source.display()))?;

    let html = self
      .registry
      .render(&name, &self.data)
      .with_context(|| format!("failed to render page {}", source.display()))?;

    Ok(RenderedPage {
      relative_path: PathBuf::from(format!("{name}.html")),
      contents: PageContents::Buffered(collapse_whitespace(&html)),
      slots: self.slots.clone(),
    })
  }

  /// Markers emitted by this session.
  pub fn slots(&self) -> &AssetSlots {
    &self.slots
  }
}

/// Template name: path relative to `root`, forward slashes, extension removed.
fn template_name(root: &Path, path: &Path) -> Result<String> {
  let relative = path
    .strip_prefix(root)
    .with_context(|| format!("{} is outside {}", path.display(), root.display()))?
    .with_extension("");
  Ok(relative.to_string_lossy().replace('\\', "/"))
}

/// Template data from the strings file; a project without one renders with an empty
/// object.
fn load_template_data(path: &Path) -> Result<Value> {
  if !path.exists() {
    tracing::warn!(path = %path.display(), "no template data file, rendering with empty data");
    return Ok(Value::Object(Default::default()));
  }

  let content = fs::read_to_string(path)
    .with_context(|| format!("failed to read template data {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse template data {}", path.display()))
}
