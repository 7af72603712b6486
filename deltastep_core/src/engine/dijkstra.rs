use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::digraph::Digraph;
use crate::distances::INF;
use crate::error::EngineError;

/// Textbook binary-heap Dijkstra with lazy deletion: a popped entry
/// whose distance no longer matches the table is stale and skipped.
pub(crate) fn run(graph: &Digraph, source: u32) -> Vec<u64> {
    let mut dist = vec![INF; graph.node_count()];
    dist[source as usize] = 0;

    let mut heap = BinaryHeap::new();
    heap.push(Reverse((0u64, source)));

    while let Some(Reverse((node_dist, node))) = heap.pop() {
        if node_dist > dist[node as usize] {
            continue;
        }
        for (dest, weight) in graph.out_edges(node) {
            let candidate = node_dist + weight as u64;
            if candidate < dist[dest as usize] {
                dist[dest as usize] = candidate;
                heap.push(Reverse((candidate, dest)));
            }
        }
    }

    dist
}

/// Differential check: re-runs Dijkstra from the same source and
/// reports the first divergent node.
pub(crate) fn check(graph: &Digraph, source: u32, got: &[u64]) -> Result<(), EngineError> {
    let reference = run(graph, source);
    for (node, (&engine_dist, &reference_dist)) in got.iter().zip(reference.iter()).enumerate() {
        if engine_dist != reference_dist {
            return Err(EngineError::ValidationMismatch {
                node: node as u32,
                got: engine_dist,
                reference: reference_dist,
            });
        }
    }
    Ok(())
}
