//! ServicesFactory 实现：从配置构建 sandbox 与并发策略，供 CLI 复用。
use async_trait::async_trait;
use snipbox_core::api::{AppConfig, CliError, Services, ServicesFactory};

use crate::factory;

pub struct PluginServicesFactory;

impl Default for PluginServicesFactory {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError> {
        let sandbox =
            factory::build_sandbox(cfg).map_err(|e| CliError::Config(format!("{e:#}")))?;
        let concurrency = factory::build_concurrency(cfg);
        Ok(Services {
            sandbox,
            concurrency,
        })
    }
}
