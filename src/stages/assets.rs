//! Script and style compile stages.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::asset_paths::{bundle_file_name, has_extension};
use crate::compiler::{AssetCompiler, compiler_for};
use crate::models::{Stage, StageReport};
use crate::pipeline::{AssetKind, Pipeline};
use crate::project::BuildContext;
use crate::stages::{FileOutcome, collect_files, is_stale_against, isolate, write_atomic};

/// Compile every pipeline of one asset kind, in pipeline order.
pub fn compile_kind(context: &BuildContext, kind: AssetKind) -> Result<Vec<StageReport>> {
  kind
    .pipelines()
    .iter()
    .map(|&pipeline| compile_pipeline(context, pipeline, compiler_for(context, pipeline).as_ref()))
    .collect()
}

/// Compile every source of a pipeline into the bundle directory of its kind.
pub fn compile_pipeline(
  context: &BuildContext,
  pipeline: Pipeline,
  compiler: &dyn AssetCompiler,
) -> Result<StageReport> {
  let mut report = StageReport::new(Stage::Compile(pipeline));
  let source_dir = context.pipeline_source_dir(pipeline);
  let sources = collect_files(&source_dir, |path| is_pipeline_entry(pipeline, path))?;
  if sources.is_empty() {
    tracing::debug!(%pipeline, dir = %source_dir.display(), "no sources");
    return Ok(report);
  }

  let output_dir = context.bundle_dir(pipeline.kind());
  fs::create_dir_all(&output_dir)
    .with_context(|| format!("failed to create {}", output_dir.display()))?;
  let imports = shared_imports(pipeline, &source_dir)?;

  for source in &sources {
    isolate(&mut report, source, || {
      let target = bundle_target(context, &output_dir, pipeline, source)?;
      let inputs: Vec<&Path> = std::iter::once(source.as_path())
        .chain(imports.iter().map(PathBuf::as_path))
        .collect();
      if !is_stale_against(&inputs, &target)? {
        return Ok(FileOutcome::Fresh);
      }

      let bundle = compiler.compile(source)?;
      write_atomic(&target, bundle.as_bytes())?;
      Ok(FileOutcome::Written(target))
    });
  }

  tracing::info!(
    %pipeline,
    written = report.written.len(),
    skipped = report.skipped,
    failed = report.failures.len(),
    "compiled"
  );
  Ok(report)
}

/// Sass partials (leading underscore) are only ever imported, never bundled.
fn is_pipeline_entry(pipeline: Pipeline, path: &Path) -> bool {
  if !has_extension(path, pipeline.source_extension()) {
    return false;
  }

  match pipeline {
    Pipeline::Sass | Pipeline::Scss => !path
      .file_name()
      .and_then(|name| name.to_str())
      .is_some_and(|name| name.starts_with('_')),
    _ => true,
  }
}

/// Every file a Sass entry may import: all sources of the pipeline, partials included.
fn shared_imports(pipeline: Pipeline, source_dir: &Path) -> Result<Vec<PathBuf>> {
  match pipeline {
    Pipeline::Sass | Pipeline::Scss => {
      collect_files(source_dir, |path| has_extension(path, pipeline.source_extension()))
    }
    _ => Ok(Vec::new()),
  }
}

fn bundle_target(
  context: &BuildContext,
  output_dir: &Path,
  pipeline: Pipeline,
  source: &Path,
) -> Result<PathBuf> {
  let stem = source
    .file_stem()
    .and_then(|stem| stem.to_str())
    .with_context(|| format!("{} has no usable file name", source.display()))?;

  Ok(output_dir.join(bundle_file_name(pipeline, stem, &context.mode)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compiler::{Passthrough, StyleCompiler};
  use crate::config::ProjectConfig;
  use crate::mode::HashMode;
  use anyhow::bail;
  use std::fs::File;
  use std::time::{Duration, SystemTime};
  use tempfile::tempdir;

  struct Failing;

  impl AssetCompiler for Failing {
    fn compile(&self, source: &Path) -> Result<String> {
      if source.ends_with("broken.js") {
        bail!("unexpected token");
      }
      Passthrough.compile(source)
    }
  }

  fn context(root: &Path, mode: HashMode) -> BuildContext {
    BuildContext::new(root, ProjectConfig::default().into_layout(), mode)
  }

  fn write_source(root: &Path, relative: &str, contents: &str) {
    let path = root.join("src/assets").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
  }

  #[test]
  fn names_outputs_by_pipeline_and_mode() {
    let dir = tempdir().unwrap();
    write_source(dir.path(), "js/main.js", "let a = 1;");
    write_source(dir.path(), "js/pages/about.js", "let b = 2;");

    let context = context(dir.path(), HashMode::production_with("abc123"));
    let report = compile_pipeline(&context, Pipeline::Js, &Passthrough).unwrap();

    let js_dir = dir.path().join("dist/assets/js");
    assert_eq!(report.written, vec![
      js_dir.join("js.main-abc123.min.js"),
      js_dir.join("js.about-abc123.min.js"),
    ]);
    assert_eq!(
      fs::read_to_string(js_dir.join("js.main-abc123.min.js")).unwrap(),
      "let a = 1;"
    );
  }

  #[test]
  fn one_failing_source_does_not_stop_the_batch() {
    let dir = tempdir().unwrap();
    write_source(dir.path(), "js/broken.js", "let = ;");
    write_source(dir.path(), "js/main.js", "let a = 1;");

    let context = context(dir.path(), HashMode::Development);
    let report = compile_pipeline(&context, Pipeline::Js, &Failing).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("unexpected token"));
    assert!(dir.path().join("dist/assets/js/js.main.min.js").exists());
  }

  #[test]
  fn up_to_date_outputs_are_skipped() {
    let dir = tempdir().unwrap();
    write_source(dir.path(), "js/main.js", "let a = 1;");
    let context = context(dir.path(), HashMode::Development);

    let first = compile_pipeline(&context, Pipeline::Js, &Passthrough).unwrap();
    let second = compile_pipeline(&context, Pipeline::Js, &Passthrough).unwrap();
    assert_eq!(first.written.len(), 1);
    assert!(second.written.is_empty());
    assert_eq!(second.skipped, 1);
  }

  #[test]
  fn compiles_style_pipelines_and_skips_partials() {
    let dir = tempdir().unwrap();
    write_source(dir.path(), "scss/_vars.scss", "$c: blue;");
    write_source(dir.path(), "scss/main.scss", "@import 'vars';\nbody { color: $c; }");
    write_source(dir.path(), "css/about.css", "p  {  margin : 0 ; }");

    let context = context(dir.path(), HashMode::Development);
    let reports = compile_kind(&context, AssetKind::Style).unwrap();
    assert!(reports.iter().all(|report| report.failures.is_empty()));

    let css_dir = dir.path().join("dist/assets/css");
    let main = fs::read_to_string(css_dir.join("scss.main.min.css")).unwrap();
    assert!(main.contains("body{color:blue}"));
    assert!(css_dir.join("css.about.min.css").exists());
    assert!(!css_dir.join("scss._vars.min.css").exists());
  }

  #[test]
  fn edited_sass_partials_recompile_their_importers() {
    let dir = tempdir().unwrap();
    write_source(dir.path(), "scss/_vars.scss", "$c: blue;");
    write_source(dir.path(), "scss/main.scss", "@import 'vars';\nbody { color: $c; }");
    let context = context(dir.path(), HashMode::Development);

    let first = compile_pipeline(&context, Pipeline::Scss, &StyleCompiler::default()).unwrap();
    assert_eq!(first.written.len(), 1);
    let fresh = compile_pipeline(&context, Pipeline::Scss, &StyleCompiler::default()).unwrap();
    assert_eq!(fresh.skipped, 1);

    let partial = dir.path().join("src/assets/scss/_vars.scss");
    fs::write(&partial, "$c: red;").unwrap();
    File::options()
      .write(true)
      .open(&partial)
      .unwrap()
      .set_modified(SystemTime::now() + Duration::from_secs(60))
      .unwrap();

    let rebuilt = compile_pipeline(&context, Pipeline::Scss, &StyleCompiler::default()).unwrap();
    assert_eq!(rebuilt.written.len(), 1);
    let main = fs::read_to_string(dir.path().join("dist/assets/css/scss.main.min.css")).unwrap();
    assert!(main.contains("body{color:red}"));
  }

  #[test]
  fn missing_source_directories_are_empty_stages() {
    let dir = tempdir().unwrap();
    let context = context(dir.path(), HashMode::Development);
    let report = compile_pipeline(&context, Pipeline::Ts, &Passthrough).unwrap();
    assert!(report.written.is_empty());
    assert!(!dir.path().join("dist/assets/js").exists());
  }
}
