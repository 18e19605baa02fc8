//! Reports produced while running a build.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::pipeline::Pipeline;

/// One unit of work in a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  /// Compile one script or style pipeline.
  Compile(#[serde(serialize_with = "serialize_pipeline")] Pipeline),
  /// Publish images.
  Images,
  /// Render, resolve and write pages.
  Pages,
  /// Copy runtime dependencies.
  Vendor,
}

fn serialize_pipeline<S: serde::Serializer>(
  pipeline: &Pipeline,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(pipeline.tag())
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Compile(pipeline) => write!(f, "{pipeline}"),
      Self::Images => f.write_str("images"),
      Self::Pages => f.write_str("pages"),
      Self::Vendor => f.write_str("vendor"),
    }
  }
}

/// A source file the fault barrier caught failing.
#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
  /// Source file being processed.
  pub source: PathBuf,
  /// Error chain rendered as text.
  pub message: String,
}

/// Outcome of a single stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
  /// Stage that produced the report.
  pub stage: Stage,
  /// Files written by the stage.
  pub written: Vec<PathBuf>,
  /// Sources whose outputs were already up to date.
  pub skipped: usize,
  /// Sources that failed.
  pub failures: Vec<StageFailure>,
}

impl StageReport {
  /// Empty report for a stage.
  pub fn new(stage: Stage) -> Self {
    Self {
      stage,
      written: Vec::new(),
      skipped: 0,
      failures: Vec::new(),
    }
  }

  /// Record a failed source.
  pub fn fail(&mut self, source: &Path, error: &anyhow::Error) {
    self.failures.push(StageFailure {
      source: source.to_path_buf(),
      message: format!("{error:#}"),
    });
  }
}

/// Reports of every stage in the order they finished.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
  /// Build id used for this build, when hashing.
  pub build_id: Option<String>,
  /// Individual stage reports.
  pub stages: Vec<StageReport>,
}

impl BuildReport {
  /// Every failure across stages.
  pub fn failures(&self) -> impl Iterator<Item = (Stage, &StageFailure)> {
    self
      .stages
      .iter()
      .flat_map(|report| report.failures.iter().map(move |failure| (report.stage, failure)))
  }

  /// Total number of files written.
  pub fn written(&self) -> usize {
    self.stages.iter().map(|report| report.written.len()).sum()
  }

  /// Report for a given stage, if it ran.
  pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
    self.stages.iter().find(|report| report.stage == stage)
  }
}
