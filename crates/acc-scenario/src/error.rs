use thiserror::Error;

use acc_core::AccError;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario parse error: {0}")]
    Parse(String),

    #[error("duplicate {kind} id {label:?}")]
    Duplicate { kind: &'static str, label: String },

    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source:   quick_xml::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] AccError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
