use roaring::RoaringBitmap;

use super::bucket_count;
use crate::buckets::BucketQueue;
use crate::digraph::Digraph;
use crate::distances::{DistanceTable, INF};

/// Single-threaded delta-stepping: drain the lowest non-empty bucket to
/// its light-edge fixpoint, then relax heavy edges once per node that
/// transited the bucket, then rotate to the next bucket.
pub(crate) fn run(graph: &Digraph, delta: u64, source: u32) -> Vec<u64> {
    let num_nodes = graph.node_count();
    let dist = DistanceTable::new(num_nodes, source);
    let mut buckets = BucketQueue::new(bucket_count(graph.max_edge_weight(), delta), num_nodes);
    buckets.insert(source, 0);

    let mut removed = RoaringBitmap::new();
    let mut requests: Vec<(u32, u64)> = Vec::new();

    while let Some(current) = buckets.advance() {
        removed.clear();

        // Light-edge fixpoint: a light relaxation can reinsert its
        // target into this same bucket, so drain until it stays empty.
        loop {
            let members = buckets.take(current);
            if members.is_empty() {
                break;
            }
            requests.clear();
            for &node in &members {
                removed.insert(node);
                light_requests(graph, &dist, delta, node, &mut requests);
            }
            for &(node, candidate) in &requests {
                relax(&dist, &mut buckets, delta, node, candidate);
            }
        }

        // Heavy edges cannot land back in the current bucket, so one
        // pass over the removed-set after the fixpoint is enough.
        requests.clear();
        for node in removed.iter() {
            heavy_requests(graph, &dist, delta, node, &mut requests);
        }
        for &(node, candidate) in &requests {
            relax(&dist, &mut buckets, delta, node, candidate);
        }
    }

    dist.snapshot()
}

fn light_requests(
    graph: &Digraph,
    dist: &DistanceTable,
    delta: u64,
    node: u32,
    out: &mut Vec<(u32, u64)>,
) {
    let node_dist = dist.get(node);
    for (dest, weight) in graph.out_edges(node) {
        if weight as u64 <= delta {
            out.push((dest, node_dist + weight as u64));
        }
    }
}

fn heavy_requests(
    graph: &Digraph,
    dist: &DistanceTable,
    delta: u64,
    node: u32,
    out: &mut Vec<(u32, u64)>,
) {
    let node_dist = dist.get(node);
    for (dest, weight) in graph.out_edges(node) {
        if weight as u64 > delta {
            out.push((dest, node_dist + weight as u64));
        }
    }
}

/// The single point of mutation for distances and bucket membership.
fn relax(dist: &DistanceTable, buckets: &mut BucketQueue, delta: u64, node: u32, candidate: u64) {
    let current = dist.get(node);
    if candidate < current {
        if current != INF {
            buckets.remove(node);
        }
        buckets.insert(node, (candidate / delta) as usize);
        dist.set(node, candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_distances() {
        let graph = Digraph::from_edges(
            5,
            &[(0, 1, 2), (0, 2, 5), (1, 2, 1), (1, 3, 4), (2, 4, 1), (3, 4, 1)],
        );
        assert_eq!(run(&graph, 2, 0), vec![0, 2, 3, 6, 4]);
    }

    #[test]
    fn single_node_no_edges() {
        let graph = Digraph::from_edges(1, &[]);
        assert_eq!(run(&graph, 2, 0), vec![0]);
    }

    #[test]
    fn disconnected_node_keeps_sentinel() {
        let graph = Digraph::from_edges(4, &[(0, 1, 3), (1, 2, 3)]);
        assert_eq!(run(&graph, 2, 0), vec![0, 3, 6, INF]);
    }

    #[test]
    fn same_bucket_reinsertion_converges() {
        // 0 -> 1 directly costs 3; 0 -> 2 -> 1 costs 2 and both hops
        // are light, so node 1 is relaxed twice inside bucket 0.
        let graph = Digraph::from_edges(3, &[(0, 1, 3), (0, 2, 1), (2, 1, 1)]);
        assert_eq!(run(&graph, 4, 0), vec![0, 2, 1]);
    }

    #[test]
    fn delta_one_degenerates_to_per_distance_buckets() {
        let graph = Digraph::from_edges(
            5,
            &[(0, 1, 2), (0, 2, 5), (1, 2, 1), (1, 3, 4), (2, 4, 1), (3, 4, 1)],
        );
        assert_eq!(run(&graph, 1, 0), vec![0, 2, 3, 6, 4]);
    }

    #[test]
    fn queued_nodes_stay_in_their_distance_band() {
        // Replays the run loop step by step so membership can be
        // checked between mutations: whenever a node is queued, its
        // recorded bucket index must equal its distance divided by
        // delta, both after each light batch and after the heavy pass.
        let graph = Digraph::from_edges(
            5,
            &[(0, 1, 2), (0, 2, 5), (1, 2, 1), (1, 3, 4), (2, 4, 1), (3, 4, 1)],
        );
        let delta = 2u64;
        let num_nodes = graph.node_count();
        let dist = DistanceTable::new(num_nodes, 0);
        let mut buckets =
            BucketQueue::new(bucket_count(graph.max_edge_weight(), delta), num_nodes);
        buckets.insert(0, 0);

        let in_band = |dist: &DistanceTable, buckets: &BucketQueue| {
            for node in 0..num_nodes as u32 {
                if let Some(bucket) = buckets.bucket_of(node) {
                    assert_eq!(bucket as u64, dist.get(node) / delta, "node {node}");
                }
            }
        };

        let mut removed = RoaringBitmap::new();
        let mut requests: Vec<(u32, u64)> = Vec::new();
        while let Some(current) = buckets.advance() {
            in_band(&dist, &buckets);
            removed.clear();
            loop {
                let members = buckets.take(current);
                if members.is_empty() {
                    break;
                }
                requests.clear();
                for &node in &members {
                    removed.insert(node);
                    light_requests(&graph, &dist, delta, node, &mut requests);
                }
                for &(node, candidate) in &requests {
                    relax(&dist, &mut buckets, delta, node, candidate);
                }
                in_band(&dist, &buckets);
            }
            requests.clear();
            for node in removed.iter() {
                heavy_requests(&graph, &dist, delta, node, &mut requests);
            }
            for &(node, candidate) in &requests {
                relax(&dist, &mut buckets, delta, node, candidate);
            }
            in_band(&dist, &buckets);
        }
        assert_eq!(dist.snapshot(), vec![0, 2, 3, 6, 4]);
    }

    #[test]
    fn zero_weight_cycle_terminates() {
        let graph = Digraph::from_edges(3, &[(0, 1, 0), (1, 0, 0), (1, 2, 1)]);
        assert_eq!(run(&graph, 1, 0), vec![0, 0, 1]);
    }
}
