use thiserror::Error;

/// Failures surfaced by the engine. Configuration problems are caught
/// before any traversal starts; `ValidationMismatch` only exists when
/// the differential check against Dijkstra is enabled.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown mode '{0}' (expected sequential, parallel, parallel-bucket-fusion or dijkstra)")]
    InvalidMode(String),

    #[error("distance mismatch at node {node}: engine {got}, dijkstra {reference}")]
    ValidationMismatch { node: u32, got: u64, reference: u64 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
