use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinError;

use crate::registry::SnippetEntry;

use super::cancel::CancelToken;
use super::traits::SandboxPlugin;
use super::types::{ErrorKind, ExecutionResult, ExecutorOpts, SnippetFailure};

enum Outcome {
    Finished(Result<(), SnippetFailure>),
    TimedOut,
    Cancelled,
}

/// Runs one snippet at a time through a [`SandboxPlugin`], with output capture and a timeout.
///
/// # Cancellation is cooperative
///
/// A timed-out (or cancelled) run is abandoned: the sandbox task is aborted at its
/// next await point and subprocess sandboxes kill their child on drop. Code that
/// blocks a thread without yielding keeps running in the background; the executor
/// only guarantees it stops *waiting* and records `Timeout`.
pub struct Executor {
    sandbox: Arc<dyn SandboxPlugin>,
    opts: ExecutorOpts,
}

impl Executor {
    pub fn new(sandbox: Arc<dyn SandboxPlugin>, opts: ExecutorOpts) -> Self {
        Self { sandbox, opts }
    }

    pub fn opts(&self) -> &ExecutorOpts {
        &self.opts
    }

    pub fn sandbox_name(&self) -> &str {
        self.sandbox.name()
    }

    pub async fn execute(&self, entry: &SnippetEntry) -> ExecutionResult {
        self.execute_with_cancel(entry, &CancelToken::new()).await
    }

    /// Run `entry` with fresh capabilities. Never fails: every outcome is a result.
    pub async fn execute_with_cancel(
        &self,
        entry: &SnippetEntry,
        cancel: &CancelToken,
    ) -> ExecutionResult {
        let caps = self.opts.capabilities.instantiate();
        let console = caps.console.clone();
        let sandbox = self.sandbox.clone();
        let snippet = entry.clone();
        let timeout = self.opts.timeout;

        tracing::debug!(
            snippet_id = %entry.id,
            sandbox = %self.sandbox.name(),
            timeout_ms = timeout.as_millis() as u64,
            "snippet start"
        );

        let start = Instant::now();
        // Own task per snippet: its own timer, and a panicking sandbox cannot unwind into the run.
        let mut handle = tokio::spawn(async move { sandbox.execute(&snippet, &caps).await });

        let outcome = tokio::select! {
            joined = &mut handle => Outcome::Finished(match joined {
                Ok(res) => res,
                Err(e) => Err(join_failure(e)),
            }),
            _ = tokio::time::sleep(timeout) => {
                handle.abort();
                Outcome::TimedOut
            }
            _ = cancel.cancelled() => {
                handle.abort();
                Outcome::Cancelled
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let output = console.snapshot();

        let result = match outcome {
            Outcome::Finished(Ok(())) => ExecutionResult::success(&entry.id, output, duration_ms),
            Outcome::Finished(Err(failure)) => {
                ExecutionResult::failure(&entry.id, failure, output, duration_ms)
            }
            Outcome::TimedOut => {
                tracing::warn!(
                    snippet_id = %entry.id,
                    timeout_ms = timeout.as_millis() as u64,
                    "snippet timed out; abandoning it"
                );
                ExecutionResult::timeout(&entry.id, timeout.as_millis() as u64, output, duration_ms)
            }
            Outcome::Cancelled => {
                tracing::warn!(snippet_id = %entry.id, "snippet cancelled");
                ExecutionResult::failure(
                    &entry.id,
                    SnippetFailure::new(ErrorKind::Cancelled, "run cancelled while snippet was running"),
                    output,
                    duration_ms,
                )
            }
        };

        tracing::info!(
            snippet_id = %entry.id,
            status = %result.status,
            duration_ms = result.duration_ms,
            "snippet finished"
        );
        result
    }
}

fn join_failure(err: JoinError) -> SnippetFailure {
    if err.is_panic() {
        let payload = err.into_panic();
        SnippetFailure::other(format!("sandbox panicked: {}", panic_message(payload.as_ref())))
    } else {
        SnippetFailure::new(ErrorKind::Cancelled, "sandbox task was cancelled")
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::capabilities::Capabilities;
    use crate::executor::types::ExecutionStatus;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Interprets a tiny line language: `print <text>`, `throw <Name>: <msg>`, `sleep <ms>`, `panic`.
    struct LineSandbox;

    #[async_trait]
    impl SandboxPlugin for LineSandbox {
        fn name(&self) -> &str {
            "line"
        }

        async fn execute(
            &self,
            snippet: &SnippetEntry,
            caps: &Capabilities,
        ) -> Result<(), SnippetFailure> {
            for line in snippet.source.lines() {
                if let Some(text) = line.strip_prefix("print ") {
                    caps.console.print(text);
                } else if let Some(err) = line.strip_prefix("throw ") {
                    return Err(crate::executor::parse_error_line(err)
                        .unwrap_or_else(|| SnippetFailure::other(err)));
                } else if let Some(ms) = line.strip_prefix("sleep ") {
                    let ms: u64 = ms.parse().unwrap_or(0);
                    caps.clock.sleep(Duration::from_millis(ms)).await;
                } else if line == "panic" {
                    panic!("sandbox exploded");
                }
            }
            Ok(())
        }
    }

    fn executor(timeout_ms: u64) -> Executor {
        Executor::new(
            Arc::new(LineSandbox),
            ExecutorOpts::default().with_timeout(Duration::from_millis(timeout_ms)),
        )
    }

    #[test]
    fn captures_output_on_success() {
        let entry = SnippetEntry::new("a", "A", "Demo", "print x\nprint y");
        let result = tokio_test::block_on(executor(1000).execute(&entry));
        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(result.output, vec!["x", "y"]);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn classifies_thrown_errors() {
        let entry = SnippetEntry::new("b", "B", "Demo", "print before\nthrow TypeError: nope");
        let result = executor(1000).execute(&entry).await;
        assert_eq!(result.status, ExecutionStatus::Failure);
        assert_eq!(result.output, vec!["before"]);
        let err = result.error.unwrap();
        assert_eq!(err.kind, ErrorKind::TypeLike);
        assert_eq!(err.message, "nope");
    }

    #[tokio::test]
    async fn timeout_keeps_partial_output() {
        let entry = SnippetEntry::new("c", "C", "Demo", "print started\nsleep 10000\nprint never");
        let result = executor(50).execute(&entry).await;
        assert_eq!(result.status, ExecutionStatus::Timeout);
        assert_eq!(result.output, vec!["started"]);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Timeout);
        assert!(result.duration_ms < 5000);
    }

    #[tokio::test]
    async fn panics_become_failures() {
        let entry = SnippetEntry::new("d", "D", "Demo", "panic");
        let result = executor(1000).execute(&entry).await;
        assert_eq!(result.status, ExecutionStatus::Failure);
        assert!(result.error.unwrap().message.contains("sandbox exploded"));
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_wait() {
        let entry = SnippetEntry::new("e", "E", "Demo", "sleep 10000");
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let result = executor(60_000).execute_with_cancel(&entry, &cancel).await;
        assert_eq!(result.status, ExecutionStatus::Failure);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Cancelled);
    }
}
