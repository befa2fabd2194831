//! Runs the real HTDP binary: one child process per request, in its own
//! throwaway directory.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{Engine, EngineExecution, RunPlan};
use crate::codec;
use crate::config::EngineConfig;
use crate::consts::WORK_DIR_PREFIX;
use crate::error::{EngineError, EngineUnavailable};
use crate::request::TransformationRequest;

/// Drives the HTDP executable named in [`EngineConfig`].
pub struct HtdpEngine {
    config: EngineConfig,
}

impl HtdpEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn create_work_dir(&self) -> Result<TempDir, EngineError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORK_DIR_PREFIX);
        let created = match &self.config.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        created.map_err(|e| EngineError::io("failed to create HTDP working directory", e))
    }

    /// Spawn the engine, feed it `stdin`, and collect its transcript.
    async fn run(
        &self,
        binary: &Path,
        stdin: String,
        timeout: Duration,
    ) -> Result<(String, String), EngineError> {
        let mut child = Command::new(binary)
            .current_dir(engine_dir(binary))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::io(format!("failed to spawn {}", binary.display()), e))?;

        let mut pipe = child.stdin.take().ok_or_else(|| {
            EngineError::io(
                "failed to open HTDP stdin",
                std::io::Error::other("stdin was not captured"),
            )
        })?;
        let feed = async move {
            let written = pipe.write_all(stdin.as_bytes()).await;
            drop(pipe);
            written
        };

        let started = Instant::now();
        let run = async move { tokio::join!(feed, child.wait_with_output()) };
        let (fed, output) = match tokio::time::timeout(timeout, run).await {
            Ok(finished) => finished,
            Err(_) => {
                warn!(limit_ms = timeout.as_millis() as u64, "HTDP timed out, killing it");
                return Err(EngineError::Timeout { limit: timeout });
            }
        };

        // The engine may exit before reading all of stdin; its exit status decides.
        if let Err(e) = fed {
            debug!(error = %e, "HTDP closed stdin early");
        }
        let output = output.map_err(|e| EngineError::io("failed to wait for HTDP", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            code = ?output.status.code(),
            "HTDP exited"
        );

        if !output.status.success() {
            warn!(code = ?output.status.code(), "HTDP exited unsuccessfully");
            return Err(EngineError::ExecutionFailed {
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok((stdout, stderr))
    }
}

#[async_trait]
impl Engine for HtdpEngine {
    async fn invoke(
        &self,
        request: &TransformationRequest,
        timeout: Duration,
    ) -> Result<EngineExecution, EngineError> {
        let binary = ensure_executable(&self.config.binary).await?;

        // Removed on drop, whichever way this function returns.
        let work_dir = self.create_work_dir()?;
        let plan = RunPlan::new(request, work_dir.path());
        debug!(
            work_dir = %work_dir.path().display(),
            points = request.points().len(),
            script = ?plan.script,
            "prepared HTDP run"
        );

        tokio::fs::write(&plan.input_path, &plan.input_file)
            .await
            .map_err(|e| {
                EngineError::io(format!("failed to write {}", plan.input_path.display()), e)
            })?;

        let (stdout, stderr) = self.run(&binary, plan.stdin(), timeout).await?;

        let results = codec::read_output_file(&plan.output_path)
            .await
            .inspect_err(|e| {
                warn!(path = %plan.output_path.display(), error = %e, "failed to read HTDP output");
            })?;
        info!(
            input_frame = request.input_frame(),
            output_frame = request.output_frame(),
            results = results.len(),
            "HTDP transformation finished"
        );

        Ok(EngineExecution {
            stdout,
            stderr,
            results,
        })
    }
}

/// Check the binary exists and is executable; return its absolute path.
pub async fn ensure_executable(binary: &Path) -> Result<PathBuf, EngineUnavailable> {
    let metadata = tokio::fs::metadata(binary)
        .await
        .map_err(|_| EngineUnavailable::NotFound(binary.to_path_buf()))?;
    if !metadata.is_file() || !is_executable(&metadata) {
        return Err(EngineUnavailable::NotExecutable(binary.to_path_buf()));
    }
    tokio::fs::canonicalize(binary)
        .await
        .map_err(|_| EngineUnavailable::NotFound(binary.to_path_buf()))
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// HTDP runs from the directory that holds it.
fn engine_dir(binary: &Path) -> &Path {
    match binary.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
