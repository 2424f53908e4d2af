use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;

use super::Report;

/// Closed set of report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Structured,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Structured => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" | "structured" => Ok(Self::Structured),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Presentation knobs shared by renderers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStyle {
    /// ASCII-only markers (no Unicode)
    pub ascii: bool,
    /// Pretty-print structured output
    pub pretty: bool,
}

/// 报告渲染器插件（纯函数：Report → String，不做 I/O）
pub trait ReportRenderer: Send + Sync {
    fn name(&self) -> &str;
    fn format(&self) -> ReportFormat;
    fn render(&self, report: &Report) -> String;
}
