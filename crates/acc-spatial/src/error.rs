//! Spatial-subsystem error type.

use thiserror::Error;

use acc_core::{AccError, LinkId, Mode, NodeId};

/// Errors produced by `acc-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("link {0} not found in network")]
    LinkNotFound(LinkId),

    #[error("network has no nodes")]
    EmptyNetwork,

    #[error("mode {0} is not routed on the network")]
    NotANetworkMode(Mode),

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("duplicate {kind} id {label:?}")]
    Duplicate { kind: &'static str, label: String },

    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error(transparent)]
    Core(#[from] AccError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
