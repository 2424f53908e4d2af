use thiserror::Error;

/// Misuse of the result aggregator. These indicate a bug in the caller.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AggregateError {
    #[error("result for snippet '{0}' was already recorded")]
    DuplicateRecord(String),

    #[error("result for snippet '{result_id}' recorded against entry '{entry_id}'")]
    Mismatch { entry_id: String, result_id: String },

    #[error("selection index {index} already holds a result; cannot record '{entry_id}' there")]
    IndexTaken { index: usize, entry_id: String },

    #[error("report is already finalized")]
    ClosedReport,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("unsupported report format: {0} (expected text or json)")]
    UnsupportedFormat(String),
}
