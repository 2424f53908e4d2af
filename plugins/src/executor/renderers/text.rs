use snipbox_core::api::{ExecutionStatus, Report, ReportEntry, ReportFormat, ReportRenderer};

pub struct TextRendererPlugin {
    ascii_only: bool,
}

impl TextRendererPlugin {
    pub fn new(ascii_only: bool) -> Self {
        Self { ascii_only }
    }

    fn marker(&self, status: ExecutionStatus) -> &'static str {
        match (status, self.ascii_only) {
            (ExecutionStatus::Success, true) => "[ OK ]",
            (ExecutionStatus::Failure, true) => "[FAIL]",
            (ExecutionStatus::Timeout, true) => "[TIME]",
            (ExecutionStatus::Success, false) => "✔",
            (ExecutionStatus::Failure, false) => "✘",
            (ExecutionStatus::Timeout, false) => "⏱",
        }
    }

    fn format_entry(&self, entry: &ReportEntry) -> String {
        let result = &entry.result;
        let mut out = format!(
            "{} {} - {} [{}] ({}ms)",
            self.marker(result.status),
            entry.snippet.id,
            entry.snippet.title,
            entry.snippet.category,
            result.duration_ms
        );
        for line in &result.output {
            out.push_str(&format!("\n    {line}"));
        }
        if result.output_truncated {
            let ellipsis = if self.ascii_only { "..." } else { "…" };
            out.push_str(&format!("\n    {ellipsis} output truncated"));
        }
        if let Some(err) = &result.error {
            out.push_str(&format!("\n    ! {}: {}", err.kind, err.message));
        }
        out
    }
}

impl ReportRenderer for TextRendererPlugin {
    fn name(&self) -> &str {
        "text-renderer"
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Text
    }

    fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        for entry in report.entries() {
            out.push_str(&self.format_entry(entry));
            out.push('\n');
        }
        let summary = report.summary();
        out.push_str(&format!(
            "\n{} snippets: {} succeeded, {} failed, {} timed out ({}ms)\n",
            report.len(),
            summary.success,
            summary.failure,
            summary.timeout,
            report.duration_ms()
        ));
        out
    }
}
