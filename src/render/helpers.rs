//! Template helpers exposed to page authors.

use handlebars::{
  Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
};

use super::layouts::register_layout_helpers;
use crate::mode::HashMode;
use crate::pipeline::AssetKind;
use crate::references::{AssetSlots, explicit_tag};

/// Anchor tag; an empty path renders nothing and the label defaults to the path.
pub fn page_link(
  path: Option<&str>,
  label: Option<&str>,
  target: Option<&str>,
  classes: Option<&str>,
  id: Option<&str>,
) -> String {
  let Some(path) = path.filter(|path| !path.is_empty()) else {
    return String::new();
  };

  format!(
    r#"<a target="{}" href="{}" class="{}" id="{}">{}</a>"#,
    target.unwrap_or_default(),
    path,
    classes.unwrap_or_default(),
    id.unwrap_or_default(),
    label.unwrap_or(path)
  )
}

/// Image served from the published images directory.
pub fn image_src(path: Option<&str>, classes: Option<&str>, style: Option<&str>) -> String {
  match path.filter(|path| !path.is_empty()) {
    Some(path) => image_tag(&format!("/assets/images/{path}"), classes, style),
    None => String::new(),
  }
}

/// Image served from an absolute URL.
pub fn image_url(url: Option<&str>, classes: Option<&str>, style: Option<&str>) -> String {
  match url.filter(|url| !url.is_empty()) {
    Some(url) => image_tag(url, classes, style),
    None => String::new(),
  }
}

fn image_tag(src: &str, classes: Option<&str>, style: Option<&str>) -> String {
  format!(
    r#"<img src="{}" alt="image" class="{}" style="{}">"#,
    src,
    classes.unwrap_or_default(),
    style.unwrap_or_default()
  )
}

fn string_param<'a>(h: &'a Helper<'_>, index: usize) -> Option<&'a str> {
  h.param(index).and_then(|param| param.value().as_str())
}

/// `{{page path label target classes id}}`.
#[derive(Debug, Clone, Copy)]
pub struct PageLinkHelper;

impl HelperDef for PageLinkHelper {
  fn call<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'rc>,
    _: &'reg Handlebars<'reg>,
    _: &'rc Context,
    _: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
  ) -> HelperResult {
    out.write(&page_link(
      string_param(h, 0),
      string_param(h, 1),
      string_param(h, 2),
      string_param(h, 3),
      string_param(h, 4),
    ))?;
    Ok(())
  }
}

/// `{{image_src path classes style}}` and `{{image_url url classes style}}`.
#[derive(Debug, Clone, Copy)]
pub enum ImageHelper {
  /// Path below `/assets/images`.
  Local,
  /// Absolute URL.
  Remote,
}

impl HelperDef for ImageHelper {
  fn call<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'rc>,
    _: &'reg Handlebars<'reg>,
    _: &'rc Context,
    _: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
  ) -> HelperResult {
    let (source, classes, style) = (string_param(h, 0), string_param(h, 1), string_param(h, 2));
    let tag = match self {
      Self::Local => image_src(source, classes, style),
      Self::Remote => image_url(source, classes, style),
    };
    out.write(&tag)?;
    Ok(())
  }
}

/// `{{capitals text}}`.
#[derive(Debug, Clone, Copy)]
pub struct CapitalsHelper;

impl HelperDef for CapitalsHelper {
  fn call<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'rc>,
    _: &'reg Handlebars<'reg>,
    _: &'rc Context,
    _: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
  ) -> HelperResult {
    out.write(&string_param(h, 0).unwrap_or_default().to_uppercase())?;
    Ok(())
  }
}

/// `{{script}}` / `{{style}}` with an optional explicit bundle name.
///
/// A name produces a literal tag right away; without one the page's slot marker is left
/// for the resolver.
#[derive(Debug, Clone)]
pub struct AssetHelper {
  kind: AssetKind,
  mode: HashMode,
  slots: AssetSlots,
}

impl AssetHelper {
  /// Helper for one asset kind in the given mode and render session.
  pub fn new(kind: AssetKind, mode: HashMode, slots: AssetSlots) -> Self {
    Self { kind, mode, slots }
  }

  /// Text emitted for an optional bundle name.
  pub fn emit(&self, name: Option<&str>) -> String {
    match name.filter(|name| !name.is_empty()) {
      Some(name) => explicit_tag(self.kind, name, &self.mode),
      None => self.slots.marker(self.kind).to_string(),
    }
  }
}

impl HelperDef for AssetHelper {
  fn call<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'rc>,
    _: &'reg Handlebars<'reg>,
    _: &'rc Context,
    _: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
  ) -> HelperResult {
    out.write(&self.emit(string_param(h, 0)))?;
    Ok(())
  }
}

/// Register every helper on a registry for one render session.
pub fn register_helpers(registry: &mut Handlebars<'static>, mode: &HashMode, slots: &AssetSlots) {
  registry.register_helper("page", Box::new(PageLinkHelper));
  registry.register_helper("image_src", Box::new(ImageHelper::Local));
  registry.register_helper("image_url", Box::new(ImageHelper::Remote));
  registry.register_helper("capitals", Box::new(CapitalsHelper));
  registry.register_helper(
    "script",
    Box::new(AssetHelper::new(AssetKind::Script, mode.clone(), slots.clone())),
  );
  registry.register_helper(
    "style",
    Box::new(AssetHelper::new(AssetKind::Style, mode.clone(), slots.clone())),
  );
  register_layout_helpers(registry);
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn registry(mode: &HashMode, slots: &AssetSlots) -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    register_helpers(&mut registry, mode, slots);
    registry
  }

  #[test]
  fn page_link_defaults_missing_arguments() {
    assert_eq!(
      page_link(Some("/about"), None, None, None, None),
      r#"<a target="" href="/about" class="" id="">/about</a>"#
    );
    assert_eq!(
      page_link(Some("/"), Some("Home"), Some("_blank"), Some("nav"), Some("home")),
      r#"<a target="_blank" href="/" class="nav" id="home">Home</a>"#
    );
    assert_eq!(page_link(Some(""), Some("Home"), None, None, None), "");
    assert_eq!(page_link(None, None, None, None, None), "");
  }

  #[test]
  fn image_helpers_build_img_tags() {
    assert_eq!(
      image_src(Some("logo.png"), Some("round"), None),
      r#"<img src="/assets/images/logo.png" alt="image" class="round" style="">"#
    );
    assert_eq!(
      image_url(Some("https://cdn.example.com/a.jpg"), None, Some("width: 10px")),
      r#"<img src="https://cdn.example.com/a.jpg" alt="image" class="" style="width: 10px">"#
    );
    assert_eq!(image_src(None, Some("round"), None), "");
  }

  #[test]
  fn helpers_render_through_templates() {
    let mode = HashMode::Development;
    let slots = AssetSlots::with_nonce(&mode, "n");
    let registry = registry(&mode, &slots);

    let html = registry
      .render_template(
        r#"{{capitals title}} {{page "/blog" "Blog" "_self" 42}} {{image_src "a.png"}}"#,
        &json!({"title": "welcome"}),
      )
      .unwrap();
    assert_eq!(
      html,
      r#"WELCOME <a target="_self" href="/blog" class="" id="">Blog</a> <img src="/assets/images/a.png" alt="image" class="" style="">"#
    );
  }

  #[test]
  fn asset_helpers_emit_markers_or_explicit_tags() {
    let mode = HashMode::production_with("abc123");
    let slots = AssetSlots::with_nonce(&mode, "n");
    let registry = registry(&mode, &slots);

    let html = registry
      .render_template(r#"{{style}}{{script}}{{style "theme"}}"#, &json!({}))
      .unwrap();
    assert_eq!(
      html,
      format!(
        r#"{}{}<link rel="stylesheet" href="/assets/css/theme-abc123">"#,
        slots.marker(AssetKind::Style),
        slots.marker(AssetKind::Script)
      )
    );
  }
}
