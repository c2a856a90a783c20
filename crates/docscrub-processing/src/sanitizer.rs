//! Document sanitization and redaction pipelines.
//!
//! Every pipeline follows the same shape: materialize the upload into a
//! request-owned temporary file, hand complete files to qpdf, read the result
//! into memory, and let the [`TempResource`] guards remove everything when the
//! function returns. The result is always fully read before any guard drops.

use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use uuid::Uuid;

use crate::error::ProcessingError;
use crate::qpdf::{QpdfService, REPLACE_INPUT_SIBLINGS};
use crate::redaction::RedactionPlan;
use crate::temp::{ScratchArea, TempResource};

/// Runs qpdf against uploaded documents, at most `max_concurrent_jobs` at a time.
#[derive(Clone)]
pub struct DocumentSanitizer {
    qpdf: QpdfService,
    scratch: ScratchArea,
    permits: Arc<Semaphore>,
}

impl DocumentSanitizer {
    pub fn new(qpdf: QpdfService, scratch: ScratchArea, max_concurrent_jobs: usize) -> Self {
        Self {
            qpdf,
            scratch,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    pub fn qpdf(&self) -> &QpdfService {
        &self.qpdf
    }

    /// Strip metadata from `upload` with `qpdf --decrypt` and return the result.
    ///
    /// Both temporary files are gone by the time this returns, on success and
    /// on every error path.
    #[tracing::instrument(
        skip(self, upload),
        fields(job_id = %Uuid::new_v4(), input_bytes = upload.len())
    )]
    pub async fn process(&self, upload: &[u8]) -> Result<Vec<u8>, ProcessingError> {
        let _permit = self.acquire().await?;

        let input = self.scratch.materialize(upload).await?;
        let output = input.derive("no_meta", "pdf");

        self.qpdf.decrypt(input.path(), output.path()).await?;
        let sanitized = output.read().await?;

        tracing::info!(output_bytes = sanitized.len(), "Document sanitized");
        Ok(sanitized)
    }

    /// Normalize `upload`, then apply the redaction job described by `plan`.
    #[tracing::instrument(
        skip(self, upload, plan),
        fields(
            job_id = %Uuid::new_v4(),
            input_bytes = upload.len(),
            pages = plan.page_count(),
            rectangles = plan.rectangle_count()
        )
    )]
    pub async fn redact(
        &self,
        upload: &[u8],
        plan: &RedactionPlan,
    ) -> Result<Vec<u8>, ProcessingError> {
        let _permit = self.acquire().await?;

        let input = self.scratch.materialize(upload).await?;
        let normalized = input.derive("normalized", "pdf");
        let job: TempResource = input.derive("job", "json");
        let _siblings: Vec<TempResource> = REPLACE_INPUT_SIBLINGS
            .iter()
            .map(|suffix| normalized.with_suffix(suffix))
            .collect();

        tracing::debug!("Normalizing document");
        self.qpdf.normalize(input.path(), normalized.path()).await?;

        job.write(&plan.to_job_json()?).await?;
        tracing::debug!(job_file = %job.path().display(), "Running redaction job");
        self.qpdf.run_job(job.path(), normalized.path()).await?;

        let redacted = normalized.read().await?;
        tracing::info!(output_bytes = redacted.len(), "Document redacted");
        Ok(redacted)
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>, ProcessingError> {
        self.permits
            .acquire()
            .await
            .map_err(|_| ProcessingError::ToolExecution {
                message: "Sanitizer is shutting down".to_string(),
                diagnostics: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        scratch_entries, write_stub_tool, COPY_TOOL, FAILING_TOOL, PARTIAL_OUTPUT_TOOL,
        REDACT_TOOL, REDACT_WITH_WARNINGS_TOOL, SLOW_TOOL,
    };
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _tools: TempDir,
        scratch: TempDir,
        sanitizer: DocumentSanitizer,
    }

    fn fixture(script: &str, timeout: Duration) -> Fixture {
        let tools = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let binary = write_stub_tool(tools.path(), "qpdf", script);
        let sanitizer = DocumentSanitizer::new(
            QpdfService::new(binary.to_string_lossy(), timeout),
            ScratchArea::new(scratch.path()),
            4,
        );
        Fixture {
            _tools: tools,
            scratch,
            sanitizer,
        }
    }

    #[tokio::test]
    async fn test_process_returns_tool_output_and_cleans_up() {
        let fx = fixture(COPY_TOOL, Duration::from_secs(10));

        let output = fx.sanitizer.process(b"%PDF-1.7 document").await.unwrap();
        assert_eq!(output, b"%PDF-1.7 document");
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_process_tool_failure_cleans_up() {
        let fx = fixture(FAILING_TOOL, Duration::from_secs(10));

        let err = fx.sanitizer.process(b"not a pdf").await.unwrap_err();
        assert!(matches!(err, ProcessingError::ToolExecution { .. }));
        assert!(err.diagnostics().unwrap().contains("not a PDF file"));
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_process_partial_output_is_removed() {
        let fx = fixture(PARTIAL_OUTPUT_TOOL, Duration::from_secs(10));

        assert!(fx.sanitizer.process(b"%PDF-1.7").await.is_err());
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_process_empty_upload_is_passed_to_tool() {
        let fx = fixture(FAILING_TOOL, Duration::from_secs(10));

        let err = fx.sanitizer.process(b"").await.unwrap_err();
        assert!(matches!(err, ProcessingError::ToolExecution { .. }));
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_process_timeout_cleans_up() {
        let fx = fixture(SLOW_TOOL, Duration::from_millis(300));

        let err = fx.sanitizer.process(b"%PDF-1.7").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_process_missing_tool_cleans_up() {
        let scratch = TempDir::new().unwrap();
        let sanitizer = DocumentSanitizer::new(
            QpdfService::new("/nonexistent/qpdf", Duration::from_secs(10)),
            ScratchArea::new(scratch.path()),
            1,
        );

        let err = sanitizer.process(b"%PDF-1.7").await.unwrap_err();
        assert!(matches!(err, ProcessingError::ToolExecution { .. }));
        assert!(scratch_entries(scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_process_unwritable_scratch_is_io_error() {
        let tools = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let sanitizer = DocumentSanitizer::new(
            QpdfService::new(
                write_stub_tool(tools.path(), "qpdf", COPY_TOOL).to_string_lossy(),
                Duration::from_secs(10),
            ),
            ScratchArea::new(scratch.path().join("missing")),
            1,
        );

        let err = sanitizer.process(b"%PDF-1.7").await.unwrap_err();
        assert!(matches!(err, ProcessingError::Io { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_request_cleans_up() {
        let fx = fixture(SLOW_TOOL, Duration::from_secs(30));

        let result = tokio::time::timeout(
            Duration::from_millis(300),
            fx.sanitizer.process(b"%PDF-1.7"),
        )
        .await;
        assert!(result.is_err());
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_get_their_own_output() {
        let fx = fixture(COPY_TOOL, Duration::from_secs(10));

        let mut handles = Vec::new();
        for i in 0..8 {
            let sanitizer = fx.sanitizer.clone();
            handles.push(tokio::spawn(async move {
                let body = format!("%PDF-1.7 document number {i}").into_bytes();
                let output = sanitizer.process(&body).await.unwrap();
                (body, output)
            }));
        }

        for handle in handles {
            let (body, output) = handle.await.unwrap();
            assert_eq!(body, output);
        }
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_redact_runs_normalize_then_job() {
        let fx = fixture(REDACT_TOOL, Duration::from_secs(10));
        let plan = RedactionPlan::parse(
            r#"[{"page": 0, "page_height": 792, "x0": 10, "y0": 10, "x1": 20, "y1": 20}]"#,
        )
        .unwrap();

        // The stub replaces the target with the job file, so the output is the job.
        let output = fx.sanitizer.redact(b"%PDF-1.7", &plan).await.unwrap();
        let job: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(job["steps"][0]["type"], "redact");
        assert_eq!(job["steps"][0]["page"], 1);
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_redact_warning_exit_removes_replace_input_leftovers() {
        let fx = fixture(REDACT_WITH_WARNINGS_TOOL, Duration::from_secs(10));
        let plan = RedactionPlan::parse("[]").unwrap();

        let err = fx.sanitizer.redact(b"%PDF-1.7", &plan).await.unwrap_err();
        assert!(matches!(err, ProcessingError::ToolExecution { .. }));
        assert!(err.diagnostics().unwrap().contains("operation succeeded with warnings"));
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_redact_failure_cleans_up() {
        let fx = fixture(FAILING_TOOL, Duration::from_secs(10));
        let plan = RedactionPlan::parse("[]").unwrap();

        assert!(fx.sanitizer.redact(b"%PDF-1.7", &plan).await.is_err());
        assert!(scratch_entries(fx.scratch.path()).is_empty());
    }
}
