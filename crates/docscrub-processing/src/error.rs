use docscrub_core::AppError;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// Writing the input resource, or reading the output resource, failed.
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    /// The tool could not be started, timed out, or exited with a non-zero status.
    #[error("{message}")]
    ToolExecution {
        message: String,
        diagnostics: Option<String>,
    },

    #[error("Invalid locations format: {0}")]
    InvalidLocations(String),
}

impl ProcessingError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| ProcessingError::Io { context, source }
    }

    /// Diagnostic text captured from the tool, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            ProcessingError::ToolExecution { diagnostics, .. } => diagnostics.as_deref(),
            _ => None,
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Io { .. } => AppError::Io(err.to_string()),
            ProcessingError::ToolExecution {
                message,
                diagnostics,
            } => AppError::ToolExecution {
                message,
                diagnostics,
            },
            ProcessingError::InvalidLocations(_) => AppError::InvalidInput(err.to_string()),
        }
    }
}
