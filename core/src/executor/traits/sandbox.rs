use async_trait::async_trait;

use crate::executor::capabilities::Capabilities;
use crate::executor::types::SnippetFailure;
use crate::registry::SnippetEntry;

/// 沙箱插件：在隔离环境中运行单个代码片段
///
/// Implementations write everything the snippet prints to `caps.console` and return
/// `Err` when the snippet raised. The executor owns timing: a sandbox should yield
/// regularly (await points) so a timed-out run can be abandoned.
#[async_trait]
pub trait SandboxPlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(
        &self,
        snippet: &SnippetEntry,
        caps: &Capabilities,
    ) -> Result<(), SnippetFailure>;
}
