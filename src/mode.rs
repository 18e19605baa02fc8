//! Build mode selection and the cache-busting build identifier.

use std::fmt;

use uuid::Uuid;

/// Unique token appended to bundle filenames during a production build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(String);

impl BuildId {
  /// Generate a fresh identifier for a new production build.
  pub fn generate() -> Self {
    Self(Uuid::new_v4().to_string())
  }

  /// Wrap an existing token, e.g. one supplied on the command line.
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  /// Borrow the identifier text.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for BuildId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Whether bundle filenames carry a build identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HashMode {
  /// Plain filenames, incremental rebuilds.
  #[default]
  Development,
  /// Filenames suffixed with `-<build id>`.
  Production(BuildId),
}

impl HashMode {
  /// Enter production mode with a newly generated build identifier.
  pub fn production() -> Self {
    Self::Production(BuildId::generate())
  }

  /// Enter production mode with a caller-supplied build identifier.
  pub fn production_with(id: impl Into<String>) -> Self {
    Self::Production(BuildId::new(id))
  }

  /// The active build identifier, if any.
  pub fn build_id(&self) -> Option<&BuildId> {
    match self {
      Self::Development => None,
      Self::Production(id) => Some(id),
    }
  }

  /// Returns `true` for production builds.
  pub fn is_production(&self) -> bool {
    matches!(self, Self::Production(_))
  }

  /// Suffix inserted after a bundle basename: `-<id>` in production, empty otherwise.
  pub fn filename_suffix(&self) -> String {
    match self {
      Self::Development => String::new(),
      Self::Production(id) => format!("-{id}"),
    }
  }
}
