use std::sync::Arc;

use clap::Parser;
use snipbox_cli::app;
use snipbox_cli::commands::cli;
use snipbox_core::api::{AppConfig, AppContext, CancelToken, CliError, LoggingConfig};
use snipbox_plugins::services::PluginServicesFactory;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = load_config(args.config.as_deref())?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    let ctx = AppContext::new(cfg, Some(Arc::new(PluginServicesFactory)));

    match args.command {
        cli::Commands::Run(run_args) => {
            let cancel = CancelToken::new();
            spawn_ctrl_c(cancel.clone());
            app::run_cmd(run_args, &ctx, cancel).await
        }
        cli::Commands::List(list_args) => app::list_cmd(list_args, &ctx).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig, CliError> {
    let loaded = match path {
        Some(path) => snipbox_core::config::load_from_path(path),
        None => snipbox_core::config::load_default(),
    };
    loaded.map_err(|e| CliError::Config(format!("{e:#}")))
}

/// First Ctrl-C cancels the run; snippets not yet started are still reported.
fn spawn_ctrl_c(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling run");
            cancel.cancel();
        }
    });
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("snipbox"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("snipbox.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Ok(());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
