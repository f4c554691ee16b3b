//! Error types for loading the two map datasets.

use thiserror::Error;

/// Failure to retrieve or parse one of the input sources.
///
/// Every variant is fatal to a run: nothing is rendered unless both
/// sources load.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("source '{source_id}' is unreachable: {reason}")]
    Unreachable { source_id: String, reason: String },

    #[error("source '{source_id}' answered with HTTP {status}")]
    Status { source_id: String, status: u16 },

    #[error("source '{source_id}' is not valid JSON for its schema: {error}")]
    Malformed {
        source_id: String,
        #[source]
        error: serde_json::Error,
    },

    #[error("source '{source_id}' has an unusable topology: {error}")]
    Topology {
        source_id: String,
        #[source]
        error: TopologyError,
    },

    #[error("failed to read '{source_id}': {error}")]
    Io {
        source_id: String,
        #[source]
        error: std::io::Error,
    },
}

/// Structural problems found while decoding a TopoJSON topology.
#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("object '{0}' not found in topology")]
    MissingObject(String),

    #[error("arc index {index} out of range ({count} arcs)")]
    ArcOutOfRange { index: i64, count: usize },

    #[error("arc {0} has a position with fewer than two coordinates")]
    ShortPosition(usize),

    #[error("geometry '{kind}' has malformed arcs: {reason}")]
    MalformedArcs { kind: String, reason: String },
}
