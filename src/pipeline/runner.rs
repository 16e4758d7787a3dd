//! The [`PipelineRunner`] trait and its process-spawning implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::bus::EventBus;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Failure of a single pipeline invocation.
///
/// One invocation failing is never fatal to the run — the orchestrator marks
/// the item `error` and moves on.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The bundled interpreter is not where the configuration says it is.
    #[error("Pipeline interpreter not found: {0}")]
    MissingInterpreter(PathBuf),

    /// The child process could not be spawned.
    #[error("Failed to start pipeline process: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O on the child's output streams or while waiting for it.
    #[error("Pipeline I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The process ran but exited unsuccessfully.
    #[error("Pipeline exited with {}", match .code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    })]
    Failed { code: Option<i32> },
}

// ---------------------------------------------------------------------------
// PipelineRunner trait
// ---------------------------------------------------------------------------

/// Thread-safe interface for executing the full pipeline on one media file.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc<dyn PipelineRunner>` and called from the run loop task.
///
/// # Contract
///
/// - The call resolves only when the invocation has fully completed or
///   failed; there is no mid-flight cancellation.
/// - Log lines produced during execution are published to the event bus as
///   a side effect, not returned.
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    /// Run the whole pipeline for the media file at `path`.
    async fn run(&self, path: &Path) -> Result<(), PipelineError>;
}

// ---------------------------------------------------------------------------
// ProcessPipelineRunner
// ---------------------------------------------------------------------------

/// Production runner that spawns the bundled interpreter on the pipeline
/// driver script.
///
/// stdout lines are forwarded to the bus verbatim (they carry the stage
/// markers the status state machine watches for); stderr lines are
/// forwarded with an `ERR: ` prefix so they stay distinguishable in the
/// shared log stream.
pub struct ProcessPipelineRunner {
    interpreter: PathBuf,
    script: PathBuf,
    workdir: PathBuf,
    /// Directories prepended to `PATH` for the child (bundled ffmpeg and
    /// llama builds).
    extra_path_dirs: Vec<PathBuf>,
    bus: EventBus,
}

impl ProcessPipelineRunner {
    pub fn new(
        interpreter: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
        extra_path_dirs: Vec<PathBuf>,
        bus: EventBus,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            workdir: workdir.into(),
            extra_path_dirs,
            bus,
        }
    }

    /// Current `PATH` with the bundled tool directories prepended.
    fn augmented_path(&self) -> std::ffi::OsString {
        let existing = std::env::var_os("PATH").unwrap_or_default();
        let mut parts: Vec<PathBuf> = self.extra_path_dirs.clone();
        parts.extend(std::env::split_paths(&existing));
        std::env::join_paths(parts).unwrap_or(existing)
    }
}

#[async_trait]
impl PipelineRunner for ProcessPipelineRunner {
    async fn run(&self, path: &Path) -> Result<(), PipelineError> {
        if !self.interpreter.exists() {
            self.bus.log(format!(
                "[System] Bundled interpreter not found: {}",
                self.interpreter.display()
            ));
            return Err(PipelineError::MissingInterpreter(self.interpreter.clone()));
        }

        self.bus
            .log(format!("Invoking engine: {}", self.interpreter.display()));

        let mut child = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg(path)
            .current_dir(&self.workdir)
            .env("PATH", self.augmented_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(PipelineError::Spawn)?;

        // Pump both streams concurrently so neither pipe can fill up and
        // stall the child.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let out_bus = self.bus.clone();
        let out_task = tokio::spawn(async move {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    out_bus.log(line);
                }
            }
        });

        let err_bus = self.bus.clone();
        let err_task = tokio::spawn(async move {
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    err_bus.log(format!("ERR: {line}"));
                }
            }
        });

        let status = child.wait().await?;
        let _ = out_task.await;
        let _ = err_task.await;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::Failed {
                code: status.code(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
