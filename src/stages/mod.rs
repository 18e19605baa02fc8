//! Build stages. Each stage owns one output directory and reports what it wrote.
//!
//! Per-file work runs through [`isolate`], the fault barrier: a file that fails is logged
//! and recorded in the stage report while the rest of the batch carries on.

pub mod assets;
pub mod images;
pub mod pages;
pub mod vendor;

use std::fs::{self, File};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use same_file::is_same_file;
use walkdir::WalkDir;

use crate::models::StageReport;

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FileOutcome {
  /// Output written at this path.
  Written(PathBuf),
  /// Output already up to date.
  Fresh,
}

/// Run per-file work inside the fault barrier.
pub(crate) fn isolate<F>(report: &mut StageReport, source: &Path, work: F)
where
  F: FnOnce() -> Result<FileOutcome>,
{
  match work() {
    Ok(FileOutcome::Written(path)) => {
      tracing::debug!(stage = %report.stage, source = %source.display(), output = %path.display(), "wrote");
      report.written.push(path);
    }
    Ok(FileOutcome::Fresh) => {
      tracing::trace!(stage = %report.stage, source = %source.display(), "up to date");
      report.skipped += 1;
    }
    Err(err) => {
      tracing::error!(stage = %report.stage, source = %source.display(), error = %format!("{err:#}"), "failed");
      report.fail(source, &err);
    }
  }
}

/// Files below `root` accepted by `keep`, sorted by path. Hidden entries are skipped and a
/// missing root yields nothing.
pub(crate) fn collect_files(root: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
  if !root.is_dir() {
    return Ok(Vec::new());
  }

  let mut files = Vec::new();
  let walker = WalkDir::new(root)
    .into_iter()
    .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
  for entry in walker {
    let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
    if entry.file_type().is_file() && keep(entry.path()) {
      files.push(entry.into_path());
    }
  }

  files.sort();
  Ok(files)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
  entry
    .file_name()
    .to_str()
    .is_some_and(|name| name.starts_with('.'))
}

/// Whether `output` is missing or older than `source`.
pub(crate) fn is_stale(source: &Path, output: &Path) -> Result<bool> {
  is_stale_against(&[source], output)
}

/// Whether `output` is missing or older than any of `inputs`.
pub(crate) fn is_stale_against(inputs: &[&Path], output: &Path) -> Result<bool> {
  let output_modified = match fs::metadata(output) {
    Ok(metadata) => metadata.modified()?,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
    Err(err) => return Err(err).with_context(|| format!("failed to stat {}", output.display())),
  };

  for input in inputs {
    let modified = fs::metadata(input)
      .and_then(|metadata| metadata.modified())
      .with_context(|| format!("failed to stat {}", input.display()))?;
    if modified > output_modified {
      return Ok(true);
    }
  }
  Ok(false)
}

/// Write `contents` to `target` through a sibling temporary file so readers never observe
/// a partially written output.
pub(crate) fn write_atomic(target: &Path, contents: &[u8]) -> Result<()> {
  write_atomic_from(target, contents)
}

/// [`write_atomic`] for streamed contents. The staging file is removed if the copy fails.
pub(crate) fn write_atomic_from(target: &Path, mut contents: impl Read) -> Result<()> {
  let parent = target
    .parent()
    .with_context(|| format!("{} has no parent directory", target.display()))?;
  fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;

  let file_name = target
    .file_name()
    .and_then(|name| name.to_str())
    .with_context(|| format!("{} has no file name", target.display()))?;
  let staging = parent.join(format!(".{file_name}.partial"));

  let copied = File::create(&staging).and_then(|mut file| io::copy(&mut contents, &mut file));
  if let Err(err) = copied {
    let _ = fs::remove_file(&staging);
    return Err(err).with_context(|| format!("failed to write {}", staging.display()));
  }
  fs::rename(&staging, target).with_context(|| format!("failed to move {} into place", target.display()))
}

/// Publish `source` at `destination` unless an up-to-date copy is already there.
///
/// Hard links are preferred; copying is the fallback across devices.
pub(crate) fn install_file(source: &Path, destination: &Path) -> Result<FileOutcome> {
  if destination.exists() {
    if is_same_file(source, destination)? || !is_stale(source, destination)? {
      return Ok(FileOutcome::Fresh);
    }
    fs::remove_file(destination)
      .with_context(|| format!("failed to replace {}", destination.display()))?;
  } else if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }

  match fs::hard_link(source, destination) {
    Ok(()) => {}
    Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(FileOutcome::Fresh),
    Err(_) => {
      fs::copy(source, destination).with_context(|| {
        format!(
          "failed to copy {} to {}",
          source.display(),
          destination.display()
        )
      })?;
    }
  }

  Ok(FileOutcome::Written(destination.to_path_buf()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Stage;
  use anyhow::anyhow;
  use std::time::{Duration, SystemTime};
  use tempfile::tempdir;

  #[test]
  fn barrier_records_failures_and_continues() {
    let mut report = StageReport::new(Stage::Images);
    isolate(&mut report, Path::new("a.png"), || Err(anyhow!("corrupt")));
    isolate(&mut report, Path::new("b.png"), || {
      Ok(FileOutcome::Written(PathBuf::from("dist/b.png")))
    });
    isolate(&mut report, Path::new("c.png"), || Ok(FileOutcome::Fresh));

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, PathBuf::from("a.png"));
    assert_eq!(report.written, vec![PathBuf::from("dist/b.png")]);
    assert_eq!(report.skipped, 1);
  }

  #[test]
  fn collects_sorted_visible_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("nested")).unwrap();
    fs::create_dir_all(root.join(".cache")).unwrap();
    fs::write(root.join("b.ts"), "").unwrap();
    fs::write(root.join("nested/a.ts"), "").unwrap();
    fs::write(root.join(".cache/c.ts"), "").unwrap();
    fs::write(root.join("notes.md"), "").unwrap();

    let files = collect_files(root, |path| {
      path.extension().is_some_and(|ext| ext == "ts")
    })
    .unwrap();
    assert_eq!(files, vec![root.join("b.ts"), root.join("nested/a.ts")]);
    assert!(collect_files(&root.join("missing"), |_| true).unwrap().is_empty());
  }

  #[test]
  fn missing_outputs_are_stale() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("main.css");
    fs::write(&source, "a{}").unwrap();
    assert!(is_stale(&source, &dir.path().join("out.css")).unwrap());

    let output = dir.path().join("out.css");
    fs::write(&output, "a{}").unwrap();
    assert!(!is_stale(&source, &output).unwrap());
  }

  #[test]
  fn atomic_writes_leave_no_staging_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("js/js.main.min.js");
    write_atomic(&target, b"one").unwrap();
    write_atomic(&target, b"two").unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "two");
    let names: Vec<_> = fs::read_dir(dir.path().join("js"))
      .unwrap()
      .map(|entry| entry.unwrap().file_name())
      .collect();
    assert_eq!(names.len(), 1);
  }

  #[test]
  fn any_newer_input_makes_an_output_stale() {
    let dir = tempdir().unwrap();
    let entry = dir.path().join("main.scss");
    let import = dir.path().join("_vars.scss");
    let output = dir.path().join("scss.main.min.css");
    fs::write(&entry, "").unwrap();
    fs::write(&import, "").unwrap();
    fs::write(&output, "").unwrap();
    assert!(!is_stale_against(&[entry.as_path(), import.as_path()], &output).unwrap());

    File::options()
      .write(true)
      .open(&import)
      .unwrap()
      .set_modified(SystemTime::now() + Duration::from_secs(60))
      .unwrap();
    assert!(!is_stale(&entry, &output).unwrap());
    assert!(is_stale_against(&[entry.as_path(), import.as_path()], &output).unwrap());
  }

  #[test]
  fn failed_streamed_writes_clean_up() {
    struct Broken;
    impl Read for Broken {
      fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("source went away"))
      }
    }

    let dir = tempdir().unwrap();
    let target = dir.path().join("index.html");
    assert!(write_atomic_from(&target, Broken).is_err());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
  }

  #[test]
  fn install_file_reuses_existing_links() -> Result<()> {
    let temp = tempdir()?;
    let source = temp.path().join("source/file.txt");
    fs::create_dir_all(source.parent().unwrap())?;
    fs::write(&source, b"content")?;
    let destination = temp.path().join("mirror/nested/file.txt");

    assert_eq!(
      install_file(&source, &destination)?,
      FileOutcome::Written(destination.clone())
    );
    assert!(is_same_file(&source, &destination)?);
    assert_eq!(install_file(&source, &destination)?, FileOutcome::Fresh);

    Ok(())
  }
}
