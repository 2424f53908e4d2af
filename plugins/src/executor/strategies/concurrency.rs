use snipbox_core::api::{ConcurrencyContext, ConcurrencyStrategyPlugin};

/// One CPU, one snippet. Used for `--parallel auto` and `max_parallel = 0`.
pub struct CpuConcurrencyPlugin;

pub struct FixedConcurrencyPlugin {
    fixed: usize,
}

impl FixedConcurrencyPlugin {
    pub fn new(fixed: usize) -> Self {
        Self { fixed }
    }
}

impl ConcurrencyStrategyPlugin for CpuConcurrencyPlugin {
    fn name(&self) -> &str {
        "cpu"
    }

    fn calculate_concurrency(&self, context: &ConcurrencyContext) -> usize {
        let desired = context.requested.unwrap_or(context.available_cpus);
        desired.clamp(1, context.pending_snippets.max(1))
    }
}

impl ConcurrencyStrategyPlugin for FixedConcurrencyPlugin {
    fn name(&self) -> &str {
        "fixed"
    }

    fn calculate_concurrency(&self, context: &ConcurrencyContext) -> usize {
        let desired = context.requested.unwrap_or(self.fixed);
        desired.clamp(1, context.pending_snippets.max(1))
    }
}
