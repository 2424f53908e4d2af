use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use snipbox_core::api::{Capabilities, SandboxConfig, SandboxPlugin, SnippetEntry, SnippetFailure};
use snipbox_core::executor::failure_from_stderr;
use snipbox_core::util::RingLines;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::io_pump::pump_lines;

/// Stderr lines kept for failure diagnosis.
pub const STDERR_TAIL_LINES: usize = 64;

const NODE_PRELUDE: &str = include_str!("prelude/node.js");

#[derive(Debug, Clone)]
enum Prelude {
    /// Collapsed to one line that the first source line is appended to, so the
    /// interpreter's line numbers still match the snippet.
    Inline(String),
    /// Runs on its own lines before the source.
    Lines(String),
}

/// Runs each snippet in a fresh interpreter process, source piped through stdin.
///
/// Without a configured `workdir` every run gets its own temporary working directory,
/// removed when the run ends.
#[derive(Debug, Clone)]
pub struct ProcessSandbox {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    clear_env: bool,
    workdir: Option<PathBuf>,
    prelude: Option<Prelude>,
}

impl ProcessSandbox {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            clear_env: false,
            workdir: None,
            prelude: None,
        }
    }

    pub fn from_config(cfg: &SandboxConfig) -> Result<Self> {
        let prelude = match cfg.prelude_path.as_deref() {
            Some(path) => Some(Prelude::Lines(
                std::fs::read_to_string(path).with_context(|| format!("read prelude {path}"))?,
            )),
            None if cfg.inject_prelude && is_node(&cfg.program) => {
                Some(Prelude::Inline(collapse_prelude(NODE_PRELUDE)))
            }
            None => None,
        };

        Ok(Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            env: cfg.env.clone(),
            clear_env: cfg.clear_env,
            workdir: cfg.workdir.as_ref().map(PathBuf::from),
            prelude,
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_clear_env(mut self, clear_env: bool) -> Self {
        self.clear_env = clear_env;
        self
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn with_prelude(mut self, prelude: impl Into<String>) -> Self {
        self.prelude = Some(Prelude::Lines(prelude.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, snippet: &SnippetEntry, caps: &Capabilities, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if self.clear_env {
            cmd.env_clear();
            if let Some(path) = std::env::var_os("PATH") {
                cmd.env("PATH", path);
            }
        }
        cmd.envs(&self.env);
        cmd.envs(caps.env_vars(snippet));
        cmd.current_dir(cwd);
        cmd
    }

    fn payload(&self, snippet: &SnippetEntry) -> String {
        match &self.prelude {
            Some(Prelude::Inline(prelude)) => format!("{prelude}{}\n", snippet.source),
            Some(Prelude::Lines(prelude)) => format!("{prelude}\n{}\n", snippet.source),
            None => format!("{}\n", snippet.source),
        }
    }
}

#[async_trait]
impl SandboxPlugin for ProcessSandbox {
    fn name(&self) -> &str {
        "process"
    }

    async fn execute(
        &self,
        snippet: &SnippetEntry,
        caps: &Capabilities,
    ) -> Result<(), SnippetFailure> {
        // Removed on drop, after the child and its pipes are done.
        let scratch;
        let cwd: &Path = match &self.workdir {
            Some(dir) => dir,
            None => {
                scratch = tempfile::Builder::new()
                    .prefix("snipbox-")
                    .tempdir()
                    .map_err(|e| {
                        SnippetFailure::other(format!("failed to create working directory: {e}"))
                    })?;
                scratch.path()
            }
        };

        let mut child = self.command(snippet, caps, cwd).spawn().map_err(|e| {
            SnippetFailure::other(format!("failed to start {}: {e}", self.program))
        })?;

        tracing::debug!(
            snippet_id = %snippet.id,
            program = %self.program,
            pid = child.id().unwrap_or_default(),
            "sandbox process spawned"
        );

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let payload = self.payload(snippet);
        let writer = stdin.map(|mut stdin| {
            tokio::spawn(async move {
                // The interpreter may exit before reading everything; a broken pipe is not our failure.
                let _ = stdin.write_all(payload.as_bytes()).await;
                let _ = stdin.shutdown().await;
            })
        });

        let console = caps.console.clone();
        let out_task = stdout.map(|rd| pump_lines(rd, "stdout", move |line| console.print(line)));

        let tail = RingLines::new(STDERR_TAIL_LINES);
        let err_ring = tail.clone();
        let err_task = stderr.map(|rd| pump_lines(rd, "stderr", move |line| err_ring.push(line)));

        let status = child
            .wait()
            .await
            .map_err(|e| SnippetFailure::other(format!("failed to wait for {}: {e}", self.program)))?;

        for task in [out_task, err_task].into_iter().flatten() {
            let _ = task.await;
        }
        if let Some(writer) = writer {
            let _ = writer.await;
        }

        if status.success() {
            return Ok(());
        }

        let lines = tail.to_vec();
        tracing::debug!(
            snippet_id = %snippet.id,
            exit_code = ?status.code(),
            stderr_lines = lines.len(),
            "sandbox process failed"
        );
        Err(failure_from_stderr(&lines, status.code()))
    }
}

/// Join a prelude onto one line: blank and whole-line `//` comment lines are dropped.
fn collapse_prelude(src: &str) -> String {
    let mut out = src
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("//"))
        .collect::<Vec<_>>()
        .join(" ");
    out.push(' ');
    out
}

fn is_node(program: &str) -> bool {
    Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.eq_ignore_ascii_case("node") || stem.eq_ignore_ascii_case("nodejs"))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snipbox_core::api::{CapabilityTemplate, Clock, ErrorKind};

    fn sh() -> ProcessSandbox {
        ProcessSandbox::new("/bin/sh")
    }

    fn run(sandbox: &ProcessSandbox, source: &str) -> (Result<(), SnippetFailure>, Vec<String>) {
        let caps = CapabilityTemplate::default().instantiate();
        let entry = SnippetEntry::new("demo", "Demo", "Shell", source);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let res = rt.block_on(sandbox.execute(&entry, &caps));
        (res, caps.console.snapshot().lines)
    }

    #[test]
    fn captures_stdout_lines() {
        let (res, lines) = run(&sh(), "echo one\necho two");
        assert!(res.is_ok());
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn non_zero_exit_is_classified_from_stderr() {
        let (res, lines) = run(
            &sh(),
            "echo partial\necho 'TypeError: x is not a function' >&2\nexit 1",
        );
        let failure = res.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::TypeLike);
        assert_eq!(failure.message, "x is not a function");
        assert_eq!(lines, vec!["partial"]);
    }

    #[test]
    fn silent_failure_reports_exit_status() {
        let (res, _) = run(&sh(), "exit 3");
        let failure = res.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::Other);
        assert_eq!(failure.message, "process exited with status 3");
    }

    #[test]
    fn missing_program_is_a_failure() {
        let (res, _) = run(&ProcessSandbox::new("/definitely/not/here"), "whatever");
        let failure = res.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::Other);
        assert!(failure.message.starts_with("failed to start /definitely/not/here"));
    }

    #[test]
    fn capabilities_arrive_as_env() {
        let caps = CapabilityTemplate {
            clock: Clock::fixed_ms(42),
            ..CapabilityTemplate::default()
        }
        .instantiate();
        let entry = SnippetEntry::new(
            "env-demo",
            "Env",
            "Shell",
            "echo \"$SNIPBOX_SNIPPET_ID $SNIPBOX_CATEGORY $SNIPBOX_NOW_MS $EXTRA\"",
        );
        let sandbox = sh().with_env("EXTRA", "yes").with_clear_env(true);

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(sandbox.execute(&entry, &caps)).unwrap();
        assert_eq!(caps.console.snapshot().lines, vec!["env-demo Shell 42 yes"]);
    }

    #[test]
    fn prelude_runs_before_source() {
        let sandbox = sh().with_prelude("GREETING=hello");
        let (res, lines) = run(&sandbox, "echo $GREETING");
        assert!(res.is_ok());
        assert_eq!(lines, vec!["hello"]);
    }

    #[test]
    fn builtin_prelude_shares_the_first_source_line() {
        let node = ProcessSandbox::from_config(&SandboxConfig::default()).unwrap();
        let entry = SnippetEntry::new("n", "N", "Js", "let a = 1;\nthrow new Error('x');");
        let payload = node.payload(&entry);

        let lines: Vec<&str> = payload.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("(() => {"));
        assert!(lines[0].ends_with("})(); let a = 1;"));
        assert_eq!(lines[1], "throw new Error('x');");
    }

    #[test]
    fn runs_in_a_private_scratch_directory() {
        let (res, lines) = run(&sh(), "echo note > note.txt\npwd");
        assert!(res.is_ok());
        let scratch = PathBuf::from(&lines[0]);
        assert_ne!(Some(scratch.clone()), std::env::current_dir().ok());
        assert!(!scratch.exists());
        assert!(!Path::new("note.txt").exists());
    }

    #[test]
    fn configured_workdir_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = sh().with_workdir(dir.path());
        let (res, _) = run(&sandbox, "echo kept > kept.txt");
        assert!(res.is_ok());
        assert!(dir.path().join("kept.txt").exists());
    }

    #[test]
    fn builtin_prelude_only_for_node() {
        let cfg = SandboxConfig::default();
        let node = ProcessSandbox::from_config(&cfg).unwrap();
        assert!(matches!(&node.prelude, Some(Prelude::Inline(p)) if p.contains("localStorage")));

        let cfg = SandboxConfig {
            program: "/bin/sh".into(),
            ..SandboxConfig::default()
        };
        assert!(ProcessSandbox::from_config(&cfg).unwrap().prelude.is_none());
    }
}
