//! Layout inheritance helpers: `extend`, `embed`, `block` and `content`.
//!
//! A page wraps its body in `{{#extend "layout"}}`; `{{#content "name"}}` blocks inside it
//! fill the layout's `{{#block "name"}}default{{/block}}` slots. Content can replace the
//! default (the default mode), or `append`/`prepend` to it. A layout may itself extend
//! another layout; the outermost page's content is applied last and wins. `embed` renders
//! a partial with its own content, isolated from any surrounding layout.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use handlebars::{
  Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
  RenderErrorReason, Renderable,
};

/// How a content block combines with the block default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
  /// Replace the default.
  Replace,
  /// Render after the current value.
  Append,
  /// Render before the current value.
  Prepend,
}

impl ContentMode {
  fn parse(mode: Option<&str>) -> Result<Self, RenderError> {
    match mode.map(str::to_ascii_lowercase).as_deref() {
      None | Some("replace") => Ok(Self::Replace),
      Some("append") => Ok(Self::Append),
      Some("prepend") => Ok(Self::Prepend),
      Some(other) => Err(RenderErrorReason::Other(format!("unknown content mode `{other}`")).into()),
    }
  }
}

#[derive(Debug, Clone)]
struct ContentAction {
  name: String,
  mode: ContentMode,
  html: String,
}

#[derive(Debug)]
enum Frame {
  /// Gathering the content blocks of an `extend`/`embed` body.
  Collecting(Vec<ContentAction>),
  /// Rendering a layout with these actions, innermost first.
  Applying(Vec<ContentAction>),
}

/// Layout state shared by the helpers of one registry.
#[derive(Debug, Clone, Default)]
pub struct LayoutStack {
  frames: Arc<Mutex<Vec<Frame>>>,
}

impl LayoutStack {
  fn frames(&self) -> MutexGuard<'_, Vec<Frame>> {
    self.frames.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Actions of the nearest layout being applied, innermost first.
  fn applying(&self) -> Vec<ContentAction> {
    self
      .frames()
      .iter()
      .rev()
      .find_map(|frame| match frame {
        Frame::Applying(actions) => Some(actions.clone()),
        Frame::Collecting(_) => None,
      })
      .unwrap_or_default()
  }
}

fn name_param<'a>(h: &'a Helper<'_>, helper: &'static str) -> Result<&'a str, RenderError> {
  h.param(0)
    .and_then(|param| param.value().as_str())
    .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex(helper, 0).into())
}

/// `{{#extend "layout"}}` and `{{#embed "partial"}}`.
#[derive(Debug, Clone)]
pub struct ExtendHelper {
  stack: LayoutStack,
  isolated: bool,
}

impl ExtendHelper {
  /// `extend`: content from enclosing layouts still applies below this one.
  pub fn extend(stack: LayoutStack) -> Self {
    Self {
      stack,
      isolated: false,
    }
  }

  /// `embed`: only the embedded body's own content applies.
  pub fn embed(stack: LayoutStack) -> Self {
    Self {
      stack,
      isolated: true,
    }
  }
}

impl HelperDef for ExtendHelper {
  fn call<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
  ) -> HelperResult {
    let helper = if self.isolated { "embed" } else { "extend" };
    let layout = name_param(h, helper)?;
    if !r.has_template(layout) {
      return Err(RenderErrorReason::PartialNotFound(layout.to_string()).into());
    }

    self.stack.frames().push(Frame::Collecting(Vec::new()));
    let body = h.template().map(|t| t.renders(r, ctx, rc)).transpose();
    let own = match self.stack.frames().pop() {
      Some(Frame::Collecting(actions)) => actions,
      _ => Vec::new(),
    };
    body?;

    let mut actions = own;
    if !self.isolated {
      actions.extend(self.stack.applying());
    }

    self.stack.frames().push(Frame::Applying(actions));
    let rendered = r.render_with_context(layout, ctx);
    self.stack.frames().pop();

    out.write(&rendered?)?;
    Ok(())
  }
}

/// `{{#block "name"}}default{{/block}}`.
#[derive(Debug, Clone)]
pub struct BlockHelper {
  stack: LayoutStack,
}

impl BlockHelper {
  /// Block slots resolved against the given stack.
  pub fn new(stack: LayoutStack) -> Self {
    Self { stack }
  }
}

impl HelperDef for BlockHelper {
  fn call<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
  ) -> HelperResult {
    let name = name_param(h, "block")?;
    let mut value = match h.template() {
      Some(t) => t.renders(r, ctx, rc)?,
      None => String::new(),
    };

    for action in self.stack.applying().into_iter().filter(|a| a.name == name) {
      value = match action.mode {
        ContentMode::Replace => action.html,
        ContentMode::Append => value + &action.html,
        ContentMode::Prepend => action.html + &value,
      };
    }

    out.write(&value)?;
    Ok(())
  }
}

/// `{{#content "name" mode="append"}}...{{/content}}`.
///
/// Outside an `extend`/`embed` body it renders nothing.
#[derive(Debug, Clone)]
pub struct ContentHelper {
  stack: LayoutStack,
}

impl ContentHelper {
  /// Content blocks recorded on the given stack.
  pub fn new(stack: LayoutStack) -> Self {
    Self { stack }
  }
}

impl HelperDef for ContentHelper {
  fn call<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    _: &mut dyn Output,
  ) -> HelperResult {
    let name = name_param(h, "content")?.to_string();
    let mode = ContentMode::parse(
      h.hash_get("mode")
        .and_then(|mode| mode.value().as_str()),
    )?;
    let html = match h.template() {
      Some(t) => t.renders(r, ctx, rc)?,
      None => String::new(),
    };

    if let Some(Frame::Collecting(actions)) = self.stack.frames().last_mut() {
      actions.push(ContentAction { name, mode, html });
    }
    Ok(())
  }
}

/// Register the layout helpers, sharing one stack.
pub fn register_layout_helpers(registry: &mut Handlebars<'static>) {
  let stack = LayoutStack::default();
  registry.register_helper("extend", Box::new(ExtendHelper::extend(stack.clone())));
  registry.register_helper("embed", Box::new(ExtendHelper::embed(stack.clone())));
  registry.register_helper("block", Box::new(BlockHelper::new(stack.clone())));
  registry.register_helper("content", Box::new(ContentHelper::new(stack)));
}
