use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ErrorKind, SnippetFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure,
    Timeout,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output lines captured from one snippet run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub lines: Vec<String>,
    /// Lines dropped after the capture limit was reached.
    pub dropped: usize,
}

/// Outcome of running a single snippet.
///
/// `error` is `Some` exactly when `status` is not `Success`; use the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub snippet_id: String,
    pub status: ExecutionStatus,
    pub output: Vec<String>,
    pub output_truncated: bool,
    pub error: Option<SnippetFailure>,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn success(snippet_id: impl Into<String>, output: CapturedOutput, duration_ms: u64) -> Self {
        Self {
            snippet_id: snippet_id.into(),
            status: ExecutionStatus::Success,
            output_truncated: output.dropped > 0,
            output: output.lines,
            error: None,
            duration_ms,
        }
    }

    pub fn failure(
        snippet_id: impl Into<String>,
        failure: SnippetFailure,
        output: CapturedOutput,
        duration_ms: u64,
    ) -> Self {
        Self {
            snippet_id: snippet_id.into(),
            status: ExecutionStatus::Failure,
            output_truncated: output.dropped > 0,
            output: output.lines,
            error: Some(failure),
            duration_ms,
        }
    }

    pub fn timeout(
        snippet_id: impl Into<String>,
        limit_ms: u64,
        output: CapturedOutput,
        duration_ms: u64,
    ) -> Self {
        Self {
            snippet_id: snippet_id.into(),
            status: ExecutionStatus::Timeout,
            output_truncated: output.dropped > 0,
            output: output.lines,
            error: Some(SnippetFailure::new(
                ErrorKind::Timeout,
                format!("timed out after {limit_ms}ms"),
            )),
            duration_ms,
        }
    }

    /// Result for a snippet the run never got to because it was cancelled.
    pub fn not_started(snippet_id: impl Into<String>) -> Self {
        Self::failure(
            snippet_id,
            SnippetFailure::new(ErrorKind::Cancelled, "run cancelled before snippet started"),
            CapturedOutput::default(),
            0,
        )
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_present_iff_not_success() {
        let ok = ExecutionResult::success("a", CapturedOutput::default(), 1);
        assert!(ok.error.is_none());

        let failed =
            ExecutionResult::failure("b", SnippetFailure::other("boom"), CapturedOutput::default(), 1);
        assert!(failed.error.is_some());

        let timed = ExecutionResult::timeout("c", 100, CapturedOutput::default(), 100);
        assert_eq!(timed.status, ExecutionStatus::Timeout);
        assert_eq!(timed.error.unwrap().kind, ErrorKind::Timeout);
    }

    #[test]
    fn truncation_flag_follows_dropped_lines() {
        let out = CapturedOutput {
            lines: vec!["x".into()],
            dropped: 3,
        };
        assert!(ExecutionResult::success("a", out, 0).output_truncated);
    }

    #[test]
    fn named_failures_keep_custom_error_names() {
        let f = SnippetFailure::named("TypeError", "x is not a function");
        assert_eq!(f.kind, ErrorKind::TypeLike);
        assert_eq!(f.message, "x is not a function");

        let f = SnippetFailure::named("Error", "boom");
        assert_eq!(f.message, "boom");

        let f = SnippetFailure::named("ValidationError", "bad input");
        assert_eq!(f.kind, ErrorKind::Other);
        assert_eq!(f.message, "ValidationError: bad input");
    }
}
