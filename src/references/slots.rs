use uuid::Uuid;

use crate::mode::HashMode;
use crate::pipeline::AssetKind;

/// Markers left in rendered HTML where the page's bundle tags will be spliced in.
///
/// Each render session gets its own nonce so a marker can never collide with authored
/// content. Markers are inert tags rather than comments so HTML whitespace collapsing
/// keeps them intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSlots {
  script: String,
  style: String,
}

impl AssetSlots {
  /// Fresh markers for a render session in the given mode.
  pub fn for_mode(mode: &HashMode) -> Self {
    Self::with_nonce(mode, &Uuid::new_v4().simple().to_string())
  }

  /// Markers built from a fixed nonce.
  pub fn with_nonce(mode: &HashMode, nonce: &str) -> Self {
    let token = match mode.build_id() {
      Some(id) => format!("asset-slot:{nonce}:{id}"),
      None => format!("asset-slot:{nonce}"),
    };

    Self {
      script: format!(r#"<script src="{token}"></script>"#),
      style: format!(r#"<link rel="stylesheet" href="{token}">"#),
    }
  }

  /// Marker text for the given asset kind.
  pub fn marker(&self, kind: AssetKind) -> &str {
    match kind {
      AssetKind::Script => &self.script,
      AssetKind::Style => &self.style,
    }
  }
}
