//! qpdf invocation.
//!
//! The tool is a black box: it is handed complete files on disk, its stdout is
//! discarded and its stderr is kept as diagnostics for failed runs.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::error::ProcessingError;

/// Files `--replace-input` may leave next to its target: the rewrite in
/// progress, and the original it keeps when the run ends with warnings.
pub const REPLACE_INPUT_SIBLINGS: [&str; 2] = [".~qpdf-temp#", ".~qpdf-orig"];

#[derive(Debug, Clone)]
pub struct QpdfService {
    binary: String,
    timeout: Duration,
}

impl QpdfService {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// `qpdf --decrypt <input> <output>`: rewrite the document without encryption
    /// or the metadata that travels with it.
    #[tracing::instrument(skip(self, input, output))]
    pub async fn decrypt(&self, input: &Path, output: &Path) -> Result<(), ProcessingError> {
        let args = vec![
            OsString::from("--decrypt"),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ];
        self.run(args, false).await.map(|_| ())
    }

    /// Rewrite content streams into a normalized, uncompressed-then-recompressed form.
    #[tracing::instrument(skip(self, input, output))]
    pub async fn normalize(&self, input: &Path, output: &Path) -> Result<(), ProcessingError> {
        let args = vec![
            OsString::from("--normalize-content=y"),
            OsString::from("--compress-streams=y"),
            OsString::from("--decode-level=specialized"),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ];
        self.run(args, false).await.map(|_| ())
    }
    /// Run a JSON job file against `target`, replacing it in place.
    #[tracing::instrument(skip(self, job_file, target))]
    pub async fn run_job(&self, job_file: &Path, target: &Path) -> Result<(), ProcessingError> {
        let mut job_arg = OsString::from("--job-json-file=");
        job_arg.push(job_file.as_os_str());
        let args = vec![
            job_arg,
            OsString::from("--replace-input"),
            target.as_os_str().to_owned(),
        ];
        self.run(args, false).await.map(|_| ())
    }

    /// First line of `qpdf --version`.
    pub async fn version(&self) -> Result<String, ProcessingError> {
        let output = self.run(vec![OsString::from("--version")], true).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    async fn run(&self, args: Vec<OsString>, capture_stdout: bool) -> Result<Output, ProcessingError> {
        let stdout = if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessingError::ToolExecution {
                message: format!("Failed to execute {}: {}", self.binary, e),
                diagnostics: None,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ProcessingError::ToolExecution {
                message: format!("Failed to wait for {}: {}", self.binary, e),
                diagnostics: None,
            })?,
            Err(_) => {
                tracing::warn!(
                    binary = %self.binary,
                    timeout_secs = self.timeout.as_secs(),
                    "Tool timed out, killing it"
                );
                return Err(ProcessingError::ToolExecution {
                    message: format!(
                        "{} timed out after {}s",
                        self.binary,
                        self.timeout.as_secs()
                    ),
                    diagnostics: None,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                binary = %self.binary,
                status = %output.status,
                stderr = %stderr,
                "Tool exited with failure"
            );
            return Err(ProcessingError::ToolExecution {
                message: format!("{} failed ({})", self.binary, output.status),
                diagnostics: (!stderr.is_empty()).then_some(stderr),
            });
        }

        Ok(output)
    }
}
