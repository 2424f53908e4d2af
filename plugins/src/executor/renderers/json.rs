use serde_json::{json, Map, Value};
use snipbox_core::api::{Report, ReportEntry, ReportFormat, ReportRenderer};

pub struct JsonRendererPlugin {
    pretty_print: bool,
}

impl JsonRendererPlugin {
    pub fn new(pretty_print: bool) -> Self {
        Self { pretty_print }
    }

    fn entry_to_json(entry: &ReportEntry) -> Value {
        let result = &entry.result;
        let mut obj = Map::new();
        obj.insert("id".into(), json!(entry.snippet.id));
        obj.insert("title".into(), json!(entry.snippet.title));
        obj.insert("category".into(), json!(entry.snippet.category));
        obj.insert("status".into(), json!(result.status));
        obj.insert("durationMs".into(), json!(result.duration_ms));
        obj.insert("output".into(), json!(result.output));
        if result.output_truncated {
            obj.insert("outputTruncated".into(), json!(true));
        }
        if let Some(err) = &result.error {
            obj.insert(
                "error".into(),
                json!({
                    "message": err.message,
                    "kind": err.kind,
                }),
            );
        }
        Value::Object(obj)
    }

    pub fn report_to_json(&self, report: &Report) -> Value {
        let summary = report.summary();
        json!({
            "runId": report.run_id(),
            "startedAt": report.started_at().to_rfc3339(),
            "durationMs": report.duration_ms(),
            "entries": report.entries().iter().map(Self::entry_to_json).collect::<Vec<_>>(),
            "summary": {
                "success": summary.success,
                "failure": summary.failure,
                "timeout": summary.timeout,
            }
        })
    }
}

impl ReportRenderer for JsonRendererPlugin {
    fn name(&self) -> &str {
        "json-renderer"
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Structured
    }

    fn render(&self, report: &Report) -> String {
        let value = self.report_to_json(report);
        if self.pretty_print {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    }
}
