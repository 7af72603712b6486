//! Single-source shortest paths via delta-stepping.
//!
//! Buckets of width `delta` replace Dijkstra's strict priority order:
//! light edges (weight <= delta) are chased eagerly inside the current
//! bucket, heavy edges are deferred until the bucket settles, and whole
//! buckets of "safe" nodes are relaxed per round. The parallel variants
//! fork rounds over a fixed rayon pool; a Dijkstra reference engine
//! backs the differential validation mode.

pub mod buckets;
pub mod digraph;
pub mod distances;
pub mod engine;
pub mod error;

pub use digraph::Digraph;
pub use distances::INF;
pub use engine::{DeltaStepping, EngineConfig, Mode};
pub use error::EngineError;
