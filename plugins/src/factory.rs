use std::sync::Arc;

use anyhow::Result;

use snipbox_core::api::{
    AppConfig, ConcurrencyContext, ConcurrencyStrategyPlugin, RenderError, RenderStyle, Report, ReportFormat,
    ReportRenderer, SandboxPlugin,
};

use crate::executor::{
    CpuConcurrencyPlugin, FixedConcurrencyPlugin, JsonRendererPlugin, TextRendererPlugin,
};
use crate::sandbox::ProcessSandbox;

pub fn build_sandbox(cfg: &AppConfig) -> Result<Arc<dyn SandboxPlugin>> {
    let sandbox = ProcessSandbox::from_config(&cfg.sandbox)?;
    tracing::debug!(program = %sandbox.program(), "sandbox configured");
    Ok(Arc::new(sandbox))
}

pub fn build_concurrency(cfg: &AppConfig) -> Arc<dyn ConcurrencyStrategyPlugin> {
    match cfg.executor.max_parallel {
        0 => Arc::new(CpuConcurrencyPlugin),
        n => Arc::new(FixedConcurrencyPlugin::new(n)),
    }
}

/// Facts a concurrency strategy decides from, for a run over `pending` snippets.
pub fn concurrency_context(pending: usize, requested: Option<usize>) -> ConcurrencyContext {
    ConcurrencyContext {
        available_cpus: num_cpus::get(),
        pending_snippets: pending,
        requested,
    }
}

pub fn build_renderer(format: ReportFormat, style: RenderStyle) -> Box<dyn ReportRenderer> {
    match format {
        ReportFormat::Text => Box::new(TextRendererPlugin::new(style.ascii)),
        ReportFormat::Structured => Box::new(JsonRendererPlugin::new(style.pretty)),
    }
}

/// Renderer for a user-supplied format name such as `text` or `json`.
pub fn build_renderer_named(
    format: &str,
    style: RenderStyle,
) -> Result<Box<dyn ReportRenderer>, RenderError> {
    Ok(build_renderer(format.parse()?, style))
}

pub fn render_report(report: &Report, format: ReportFormat, style: RenderStyle) -> String {
    build_renderer(format, style).render(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_is_rejected() {
        let err = build_renderer_named("yaml", RenderStyle::default())
            .err()
            .expect("yaml is not a report format");
        assert_eq!(err, RenderError::UnsupportedFormat("yaml".into()));

        let renderer = build_renderer_named("JSON", RenderStyle::default()).unwrap();
        assert_eq!(renderer.format(), ReportFormat::Structured);
    }

    #[test]
    fn zero_parallelism_means_per_cpu() {
        let mut cfg = AppConfig::default();
        cfg.executor.max_parallel = 0;
        let strategy = build_concurrency(&cfg);
        assert_eq!(strategy.name(), "cpu");
        let n = strategy.calculate_concurrency(&concurrency_context(1000, None));
        assert!((1..=1000).contains(&n));

        cfg.executor.max_parallel = 4;
        let strategy = build_concurrency(&cfg);
        let ctx = ConcurrencyContext {
            available_cpus: 16,
            pending_snippets: 10,
            requested: None,
        };
        assert_eq!(strategy.calculate_concurrency(&ctx), 4);
    }

    #[test]
    fn sandbox_follows_config() {
        let mut cfg = AppConfig::default();
        cfg.sandbox.program = "/usr/bin/env".into();
        assert_eq!(build_sandbox(&cfg).unwrap().name(), "process");

        cfg.sandbox.prelude_path = Some("/no/such/prelude.js".into());
        assert!(build_sandbox(&cfg).is_err());
    }
}
