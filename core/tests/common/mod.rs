#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snipbox_core::api::{
    Capabilities, Executor, ExecutorOpts, SandboxPlugin, SnippetEntry, SnippetFailure,
};

/// In-process sandbox driven by a line script:
/// `print <text>`, `throw <Name>: <msg>`, `sleep <ms>`, `store <key>=<value>`, `load <key>`.
pub struct ScriptSandbox;

#[async_trait]
impl SandboxPlugin for ScriptSandbox {
    fn name(&self) -> &str {
        "script"
    }

    async fn execute(
        &self,
        snippet: &SnippetEntry,
        caps: &Capabilities,
    ) -> Result<(), SnippetFailure> {
        for line in snippet.source.lines() {
            let (op, arg) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
            match op {
                "print" => caps.console.print(arg),
                "throw" => {
                    let (name, msg) = arg.split_once(':').unwrap_or((arg, ""));
                    return Err(SnippetFailure::named(name, msg));
                }
                "sleep" => {
                    let ms = arg.parse().unwrap_or(0);
                    caps.clock.sleep(Duration::from_millis(ms)).await;
                }
                "store" => {
                    let (k, v) = arg.split_once('=').unwrap_or((arg, ""));
                    caps.local_storage.set_item(k, v);
                }
                "load" => {
                    let value = caps.local_storage.get_item(arg).unwrap_or_else(|| "null".into());
                    caps.console.print(value);
                }
                "" => {}
                other => return Err(SnippetFailure::other(format!("unknown op {other}"))),
            }
        }
        Ok(())
    }
}

/// Route library tracing to the test harness output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("snipbox_core=debug")
        .with_test_writer()
        .try_init();
}

pub fn snippet(id: &str, category: &str, source: &str) -> SnippetEntry {
    SnippetEntry::new(id, id.to_uppercase(), category, source)
}

pub fn executor(timeout_ms: u64) -> Executor {
    Executor::new(
        Arc::new(ScriptSandbox),
        ExecutorOpts::default().with_timeout(Duration::from_millis(timeout_ms)),
    )
}
