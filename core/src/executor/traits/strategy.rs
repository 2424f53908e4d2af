/// 并发控制策略插件
pub trait ConcurrencyStrategyPlugin: Send + Sync {
    fn name(&self) -> &str;
    fn calculate_concurrency(&self, context: &ConcurrencyContext) -> usize;
}

#[derive(Debug, Clone)]
pub struct ConcurrencyContext {
    pub available_cpus: usize,
    pub pending_snippets: usize,
    pub requested: Option<usize>,
}
