//! CLI 应用装配层：合并配置覆盖、加载目录、构建 services，执行并输出报告。
use std::path::Path;

use snipbox_core::api::{
    self as core_api, AppConfig, AppContext, CancelToken, CliError, Executor, ExecutorOpts,
    LoaderOptions, RenderStyle, ReportFormat, RunOpts, SnippetFilter, SnippetRegistry,
};
use snipbox_plugins::factory;
use tokio::io::AsyncWriteExt;

use crate::commands::cli::{ListArgs, Parallelism, RunArgs};
use crate::commands::list::render_catalog;

/// Fold `snipbox run` flags into the loaded configuration. Flags win.
pub fn apply_run_overrides(cfg: &mut AppConfig, args: &RunArgs) {
    if let Some(root) = &args.root {
        cfg.registry.root = root.to_string_lossy().into_owned();
    }
    if let Some(ms) = args.timeout_ms {
        cfg.executor.timeout_ms = ms;
    }
    match args.parallel {
        Some(Parallelism::Auto) => cfg.executor.max_parallel = 0,
        Some(Parallelism::Fixed(n)) => cfg.executor.max_parallel = n,
        None => {}
    }
    if let Some(format) = &args.format {
        cfg.report.format = format.clone();
    }
    cfg.report.ascii |= args.ascii;
    cfg.report.pretty |= args.pretty;
    if args.no_progress {
        cfg.executor.progress_bar = false;
    }
}

fn load_catalog(cfg: &AppConfig) -> Result<SnippetRegistry, CliError> {
    let root = Path::new(&cfg.registry.root);
    let registry = core_api::load_registry(root, &LoaderOptions::from_config(&cfg.registry))?;
    tracing::debug!(
        root = %root.display(),
        snippets = registry.len(),
        categories = registry.categories().len(),
        "catalog loaded"
    );
    Ok(registry)
}

async fn write_report(text: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            tokio::fs::write(path, text).await?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// `snipbox run`. Returns 0 when every snippet succeeded, 1 otherwise.
#[tracing::instrument(name = "cli.run", skip_all)]
pub async fn run_cmd(
    args: RunArgs,
    ctx: &AppContext,
    cancel: CancelToken,
) -> Result<i32, CliError> {
    let mut cfg = ctx.cfg().clone();
    apply_run_overrides(&mut cfg, &args);

    // Resolve the format before running anything so a typo fails fast.
    let format: ReportFormat = cfg.report.format.parse()?;
    let style = RenderStyle {
        ascii: cfg.report.ascii,
        pretty: cfg.report.pretty,
    };

    let registry = load_catalog(&cfg)?;
    let selection = registry.select(&args.selection())?;

    let ctx = ctx.with_config(cfg.clone());
    let services = ctx.build_services(&cfg).await?;

    let parallel = services
        .concurrency
        .calculate_concurrency(&factory::concurrency_context(selection.len(), None));
    let run_opts = RunOpts {
        max_parallel: parallel,
        progress_bar: cfg.executor.progress_bar && atty::is(atty::Stream::Stderr),
    };
    tracing::debug!(
        selected = selection.len(),
        strategy = %services.concurrency.name(),
        max_parallel = parallel,
        "run planned"
    );

    let executor = Executor::new(services.sandbox.clone(), ExecutorOpts::from_config(&cfg));
    let report = core_api::run_snippets(&executor, selection, &run_opts, &cancel).await?;

    let rendered = factory::render_report(&report, format, style);
    write_report(&rendered, args.output.as_deref()).await?;

    Ok(if report.all_succeeded() { 0 } else { 1 })
}

/// `snipbox list`.
pub async fn list_cmd(args: ListArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let mut cfg = ctx.cfg().clone();
    if let Some(root) = &args.root {
        cfg.registry.root = root.to_string_lossy().into_owned();
    }
    let format: ReportFormat = args.format.parse()?;

    let registry = load_catalog(&cfg)?;
    let filter = match &args.category {
        Some(category) => SnippetFilter::Category(category.clone()),
        None => SnippetFilter::All,
    };
    let entries: Vec<_> = registry.list(&filter).collect();
    if entries.is_empty() {
        if let Some(category) = &args.category {
            return Err(core_api::RegistryError::UnknownCategory(category.clone()).into());
        }
    }

    write_report(&render_catalog(&entries, format), None).await?;
    Ok(0)
}
