//! Adapters around the external tools that turn one source file into one bundle.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use grass::{Options, OutputStyle};

use crate::pipeline::Pipeline;
use crate::project::BuildContext;

/// Turns a single source file into the text of its bundle.
pub trait AssetCompiler: Send + Sync {
  /// Compile `source` and return the bundle contents.
  fn compile(&self, source: &Path) -> Result<String>;
}

/// Copies sources through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl AssetCompiler for Passthrough {
  fn compile(&self, source: &Path) -> Result<String> {
    fs::read_to_string(source).with_context(|| format!("failed to read {}", source.display()))
  }
}

/// Runs an external command with the source on stdin and takes the bundle from stdout.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
  program: String,
  args: Vec<String>,
}

impl CommandCompiler {
  /// Build from a command line; `None` when the command is empty.
  pub fn from_command_line(command: &[String]) -> Option<Self> {
    let (program, args) = command.split_first()?;
    Some(Self {
      program: program.clone(),
      args: args.to_vec(),
    })
  }
}

impl AssetCompiler for CommandCompiler {
  fn compile(&self, source: &Path) -> Result<String> {
    let input =
      fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;

    let mut child = Command::new(&self.program)
      .args(&self.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .with_context(|| format!("failed to run `{}`", self.program))?;

    let mut stdin = child
      .stdin
      .take()
      .ok_or_else(|| anyhow!("failed to open stdin of `{}`", self.program))?;
    let writer = thread::spawn(move || stdin.write_all(&input));

    let output = child
      .wait_with_output()
      .with_context(|| format!("failed to wait for `{}`", self.program))?;

    if !output.status.success() {
      bail!(
        "`{}` failed with status {} on {}: {}",
        self.program,
        output.status,
        source.display(),
        String::from_utf8_lossy(&output.stderr).trim()
      );
    }

    writer
      .join()
      .map_err(|_| anyhow!("stdin writer for `{}` panicked", self.program))?
      .with_context(|| format!("failed to feed {} to `{}`", source.display(), self.program))?;

    String::from_utf8(output.stdout)
      .with_context(|| format!("`{}` produced non UTF-8 output", self.program))
  }
}

/// Compiles Sass, SCSS and plain CSS into compressed CSS with `grass`.
///
/// The input syntax follows the source extension.
#[derive(Debug, Clone, Default)]
pub struct StyleCompiler {
  load_paths: Vec<PathBuf>,
}

impl StyleCompiler {
  /// Compiler resolving `@use`/`@import` against the given directories.
  pub fn new(load_paths: Vec<PathBuf>) -> Self {
    Self { load_paths }
  }
}

impl AssetCompiler for StyleCompiler {
  fn compile(&self, source: &Path) -> Result<String> {
    let options = Options::default()
      .load_paths(&self.load_paths)
      .style(OutputStyle::Compressed);

    grass::from_path(source, &options)
      .map_err(|err| anyhow!("failed to compile {}: {}", source.display(), err))
  }
}

/// Pick the compiler configured for a pipeline.
pub fn compiler_for(context: &BuildContext, pipeline: Pipeline) -> Box<dyn AssetCompiler> {
  match pipeline {
    Pipeline::Js | Pipeline::Ts => {
      match CommandCompiler::from_command_line(context.layout.script_command(pipeline)) {
        Some(command) => Box::new(command),
        None => Box::new(Passthrough),
      }
    }
    Pipeline::Sass | Pipeline::Scss | Pipeline::Css => {
      Box::new(StyleCompiler::new(vec![context.node_modules_dir()]))
    }
  }
}
