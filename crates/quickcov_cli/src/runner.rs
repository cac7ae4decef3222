//! Test runner adapter: test discovery, argument construction and spawning.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use quickcov_cache::ChangedFiles;
use quickcov_config::{RunnerConfig, TestMatcher};

/// Errors from invoking the test runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The runner process could not be started.
    #[error("failed to start test runner '{program}': {source}")]
    Spawn {
        /// The executable that was attempted.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The runner exited unsuccessfully and the failure policy is `abort`.
    #[error("test runner failed ({})", describe_code(.code))]
    RunnerFailed {
        /// Exit code, or `None` if the runner was killed by a signal.
        code: Option<i32>,
    },

    /// The runner exited without writing a coverage report.
    #[error("test runner wrote no coverage report at {} ({})", .path.display(), describe_code(.code))]
    MissingReport {
        /// Where the report was expected.
        path: PathBuf,
        /// The runner's exit code.
        code: Option<i32>,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Finds every test file under `root`, as sorted root-relative paths.
pub fn discover_test_files(root: &Path, matcher: &TestMatcher) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_dir(root, Path::new(""), matcher, &mut files)?;
    files.sort();
    tracing::debug!(count = files.len(), "discovered test files");
    Ok(files)
}

/// Recursively walks `root/rel`, collecting test files relative to `root`.
fn walk_dir(
    root: &Path,
    rel: &Path,
    matcher: &TestMatcher,
    files: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(root.join(rel))? {
        let entry = entry?;
        let rel_path = rel.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if matcher.skips_dir(&rel_path) {
                tracing::debug!(dir = %rel_path.display(), "skipping ignored directory");
                continue;
            }
            walk_dir(root, &rel_path, matcher, files)?;
        } else if (file_type.is_file() || entry.path().is_file()) && matcher.is_test(&rel_path) {
            files.push(rel_path);
        }
    }
    Ok(())
}

/// A fully built runner command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerInvocation {
    /// Executable to spawn.
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
}

impl RunnerInvocation {
    /// The full-suite invocation used when no snapshot exists yet.
    pub fn first_run(runner: &RunnerConfig) -> Self {
        let mut args = runner.args.clone();
        args.extend(runner.coverage_flags.iter().cloned());
        Self {
            program: runner.program.clone(),
            args,
        }
    }

    /// An invocation scoped to the changed files.
    ///
    /// Layout: `[tests...] [<related flag> sources...] <coverage flags> <bail flag>`.
    /// The related flag is only emitted when there are changed source files.
    pub fn scoped(runner: &RunnerConfig, changed: &ChangedFiles) -> Self {
        let mut args = runner.args.clone();
        args.extend(changed.test_files.iter().map(|p| path_arg(p)));
        if !changed.source_files.is_empty() {
            args.push(runner.related_flag.clone());
            args.extend(changed.source_files.iter().map(|p| path_arg(p)));
        }
        args.extend(runner.coverage_flags.iter().cloned());
        if !runner.bail_flag.is_empty() {
            args.push(runner.bail_flag.clone());
        }
        Self {
            program: runner.program.clone(),
            args,
        }
    }

    /// Runs the command in `cwd` with inherited stdio and waits for it.
    pub fn spawn(&self, cwd: &Path) -> Result<ExitStatus, RunnerError> {
        tracing::info!(program = %self.program, args = self.args.len(), "spawning test runner");
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(cwd)
            .status()
            .map_err(|source| RunnerError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(%status, "test runner finished");
        Ok(status)
    }
}

impl fmt::Display for RunnerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
