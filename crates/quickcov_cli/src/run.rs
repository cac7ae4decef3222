//! The quickcov run: full first run or scoped incremental run, then the table.
//!
//! Without a snapshot the whole suite runs with coverage and the snapshot is
//! built from scratch. With one, only tests related to files that changed
//! since are re-run and their coverage is merged into the snapshot. Either
//! way the project-wide totals are printed at the end.

use std::fmt::Display;
use std::io::ErrorKind;
use std::path::Path;
use std::process::ExitStatus;
use std::time::{Duration, Instant};

use quickcov_cache::{ChangedFiles, Planner};
use quickcov_config::{FailurePolicy, TestMatcher};
use quickcov_coverage::{read_coverage_report, CoverageError, CoverageReport, CoverageStats};

use crate::project::Project;
use crate::render::CoverageRenderer;
use crate::runner::{discover_test_files, RunnerError, RunnerInvocation};
use crate::GlobalArgs;

/// What a run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No snapshot existed (or `--reset`); the full suite ran.
    FirstRun,
    /// Some files changed; a scoped run was merged into the snapshot.
    Scoped(ChangedFiles),
    /// Nothing changed; the cached results were reused.
    UpToDate,
    /// `--dry-run`: the invocation was printed and nothing else happened.
    DryRun(RunnerInvocation),
}

/// Run-scoped results, handed back to the caller for rendering.
#[derive(Debug)]
pub struct RunSummary {
    /// What happened.
    pub outcome: RunOutcome,
    /// Project coverage before a scoped run, for delta annotations.
    pub before: Option<CoverageStats>,
    /// Project coverage after the run.
    pub after: CoverageStats,
    /// Whether the runner exited successfully. `true` when it didn't run.
    pub runner_succeeded: bool,
    /// Wall-clock time the runner took, if it ran.
    pub elapsed: Option<Duration>,
}

impl RunSummary {
    /// Process exit code: failing tests fail the invocation even when their
    /// coverage was merged.
    pub fn exit_code(&self) -> i32 {
        if self.runner_succeeded {
            0
        } else {
            1
        }
    }
}

/// Runs quickcov for the current project.
///
/// Returns exit code 0 on success and 1 if the test runner reported failures.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let renderer = CoverageRenderer::new(global.color);

    if !global.quiet {
        eprintln!("{}", renderer.greeting());
    }

    if global.verbose {
        eprintln!("   Project root: {}", project.root.display());
    }

    let summary = execute(&project, global, &renderer)?;
    tracing::debug!(elapsed = ?summary.elapsed, succeeded = summary.runner_succeeded, "run finished");

    match summary.outcome {
        RunOutcome::DryRun(ref invocation) => {
            println!("{invocation}");
            return Ok(0);
        }
        RunOutcome::Scoped(ref changed) => {
            tracing::info!(files = changed.len(), "merged scoped run");
        }
        RunOutcome::FirstRun | RunOutcome::UpToDate => {}
    }
    print!("{}", renderer.table(summary.before.as_ref(), &summary.after));

    Ok(summary.exit_code())
}

/// Plans and performs the run for `project` without printing the table.
pub fn execute(
    project: &Project,
    global: &GlobalArgs,
    renderer: &CoverageRenderer,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let store = project.cache_store();
    let planner = Planner::new(&project.root);

    let matcher = TestMatcher::from_config(&project.config.runner)?;
    let candidates = discover_test_files(&project.root, &matcher)?;
    tracing::info!(tests = candidates.len(), root = %project.root.display(), "discovered tests");

    // a reset rebuilds from scratch; the old snapshot stays until the new one
    // is saved over it
    if global.reset || !store.exists() {
        return first_run(project, global, renderer, &planner, &candidates);
    }

    status(global, "Cache file found. Looking for changes...");
    let snapshot = store.load()?;
    let changed = planner.plan_changes(&candidates, &snapshot)?;
    let before = snapshot.aggregate();

    if changed.is_empty() {
        status(global, "No changes were found. Showing cached results.\n");
        return Ok(RunSummary {
            outcome: RunOutcome::UpToDate,
            before: None,
            after: before,
            runner_succeeded: true,
            elapsed: None,
        });
    }

    status(global, renderer.changed_files(&changed));
    let invocation = RunnerInvocation::scoped(&project.config.runner, &changed);
    if global.dry_run {
        return Ok(dry_run(invocation, before));
    }
    status(
        global,
        format!("Running tests with {}\n", renderer.command(&invocation.to_string())),
    );

    let report_path = project.report_path();
    discard_report(&report_path)?;
    let start = Instant::now();
    let exit = invocation.spawn(&project.root)?;
    let elapsed = start.elapsed();
    let runner_succeeded = check_exit(exit, project.config.runner.on_failure)?;

    let report = read_fresh_report(&report_path, exit)?;
    let merged = planner.merge_results(&snapshot, &report, &changed.test_files, &candidates)?;
    store.save(&merged)?;

    status(global, "Changes have been saved.");
    if let Some(full) = merged.first_run_elapsed_time {
        status(
            global,
            format!(
                "Scoped run took {:.1}s (full run: {full:.1}s)\n",
                elapsed.as_secs_f64()
            ),
        );
    }

    Ok(RunSummary {
        outcome: RunOutcome::Scoped(changed),
        before: Some(before),
        after: merged.aggregate(),
        runner_succeeded,
        elapsed: Some(elapsed),
    })
}

fn first_run(
    project: &Project,
    global: &GlobalArgs,
    renderer: &CoverageRenderer,
    planner: &Planner,
    candidates: &[std::path::PathBuf],
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let invocation = RunnerInvocation::first_run(&project.config.runner);
    if global.reset {
        status(global, "Rebuilding the cache. Running the full suite.");
    } else {
        status(global, "Cache file not found. Running the full suite.");
    }
    if global.dry_run {
        return Ok(dry_run(invocation, CoverageStats::default()));
    }
    status(
        global,
        format!("Running tests with {}\n", renderer.command(&invocation.to_string())),
    );

    let report_path = project.report_path();
    discard_report(&report_path)?;
    let start = Instant::now();
    let exit = invocation.spawn(&project.root)?;
    let elapsed = start.elapsed();
    let runner_succeeded = check_exit(exit, project.config.runner.on_failure)?;

    let report = read_fresh_report(&report_path, exit)?;
    let snapshot = planner.build_initial(&report, candidates, Some(elapsed.as_secs_f64()))?;
    project.cache_store().save(&snapshot)?;
    status(global, format!("Cache built in {:.1}s.\n", elapsed.as_secs_f64()));

    Ok(RunSummary {
        outcome: RunOutcome::FirstRun,
        before: None,
        after: snapshot.aggregate(),
        runner_succeeded,
        elapsed: Some(elapsed),
    })
}

fn dry_run(invocation: RunnerInvocation, current: CoverageStats) -> RunSummary {
    RunSummary {
        outcome: RunOutcome::DryRun(invocation),
        before: None,
        after: current,
        runner_succeeded: true,
        elapsed: None,
    }
}

/// Applies the failure policy to the runner's exit status.
///
/// Returns whether the runner succeeded; a failure under
/// [`FailurePolicy::Abort`] becomes an error so nothing gets merged.
fn check_exit(exit: ExitStatus, policy: FailurePolicy) -> Result<bool, RunnerError> {
    if exit.success() {
        return Ok(true);
    }
    match policy {
        FailurePolicy::Abort => Err(RunnerError::RunnerFailed { code: exit.code() }),
        FailurePolicy::Merge => {
            tracing::warn!(code = ?exit.code(), "test runner failed, merging its coverage anyway");
            Ok(false)
        }
    }
}

/// Removes the previous run's report so it can't be mistaken for this run's.
fn discard_report(path: &Path) -> Result<(), CoverageError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed previous coverage report");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoverageError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Reads the report the runner just wrote. A missing report is fatal.
fn read_fresh_report(
    path: &Path,
    exit: ExitStatus,
) -> Result<CoverageReport, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(RunnerError::MissingReport {
            path: path.to_path_buf(),
            code: exit.code(),
        }
        .into());
    }
    Ok(read_coverage_report(path)?)
}

fn status(global: &GlobalArgs, message: impl Display) {
    if !global.quiet {
        eprintln!("{message}");
    }
}
