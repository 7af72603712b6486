use ahash::AHashMap;
use rayon::prelude::*;
use roaring::RoaringBitmap;

use super::bucket_count;
use crate::buckets::SharedBuckets;
use crate::digraph::Digraph;
use crate::distances::DistanceTable;
use crate::error::EngineError;

/// Local buckets smaller than this are drained in place before the
/// merge. Tunable; never affects final distances.
pub(crate) const FUSION_THRESHOLD: usize = 64;

/// Buckets produced inside one fork-join task. Owned exclusively by the
/// task, so no synchronization; merged into the shared store at the end
/// of the task under the per-index mutexes.
struct LocalBuckets {
    slots: AHashMap<usize, Vec<u32>>,
}

impl LocalBuckets {
    fn new() -> Self {
        LocalBuckets {
            slots: AHashMap::new(),
        }
    }

    fn push(&mut self, bucket: usize, node: u32) {
        self.slots.entry(bucket).or_default().push(node);
    }

    fn len_of(&self, bucket: usize) -> usize {
        self.slots.get(&bucket).map_or(0, Vec::len)
    }

    fn take(&mut self, bucket: usize) -> Vec<u32> {
        self.slots.get_mut(&bucket).map(std::mem::take).unwrap_or_default()
    }

    fn merge_into(self, shared: &SharedBuckets) {
        for (bucket, nodes) in self.slots {
            if !nodes.is_empty() {
                shared.append(bucket, &nodes);
            }
        }
    }
}

/// Parallel delta-stepping over a fixed rayon pool. Each outer round
/// drains the globally-lowest bucket in fork-join sub-rounds: workers
/// relax light edges through CAS on the distance table into task-local
/// buckets, merge them, and the single-threaded decision phase compares
/// bucket sizes to detect reinsertion. `fusion_threshold == 0` disables
/// bucket fusion.
pub(crate) fn run(
    graph: &Digraph,
    delta: u64,
    source: u32,
    threads: usize,
    fusion_threshold: usize,
) -> Result<Vec<u64>, EngineError> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

    let num_nodes = graph.node_count();
    let dist = DistanceTable::new(num_nodes, source);
    let mut shared = SharedBuckets::new(bucket_count(graph.max_edge_weight(), delta));
    shared.push(0, source);

    let mut removed = RoaringBitmap::new();

    while let Some(current) = shared.advance() {
        removed.clear();
        let mut offset = 0;

        // Light sub-rounds: fork over the unprocessed suffix, join,
        // then check whether reinsertions extended the bucket.
        loop {
            let members = shared.suffix(current, offset);
            if members.is_empty() {
                break;
            }
            for &node in &members {
                removed.insert(node);
            }
            let size_before = offset + members.len();

            let chunk = chunk_size(members.len(), threads);
            let fused: Vec<u32> = pool.install(|| {
                members
                    .par_chunks(chunk)
                    .map(|nodes| {
                        let mut local = LocalBuckets::new();
                        let mut fused = Vec::new();
                        for &node in nodes {
                            let node_dist = dist.get(node);
                            if node_dist / delta != current as u64 {
                                continue; // stale entry, settled earlier
                            }
                            relax_light(graph, &dist, delta, node, node_dist, &mut local);
                        }
                        if fusion_threshold > 0 {
                            fuse(graph, &dist, delta, current, fusion_threshold, &mut local, &mut fused);
                        }
                        local.merge_into(&shared);
                        fused
                    })
                    .flatten_iter()
                    .collect()
            });
            // Nodes finished inside a task never reach the shared
            // bucket, but their heavy edges still fire this round.
            for node in fused {
                removed.insert(node);
            }

            let size_after = shared.len_of(current);
            if size_after == size_before {
                // No reinsertion this round: the bucket is settled.
                shared.clear(current);
                break;
            }
            offset = size_before;
        }

        // Heavy pass, once per node that transited the bucket. Every
        // target index is strictly above `current`.
        let settled: Vec<u32> = removed.iter().collect();
        if settled.is_empty() {
            continue;
        }
        let chunk = chunk_size(settled.len(), threads);
        pool.install(|| {
            settled.par_chunks(chunk).for_each(|nodes| {
                let mut local = LocalBuckets::new();
                for &node in nodes {
                    let node_dist = dist.get(node);
                    relax_heavy(graph, &dist, delta, node, node_dist, &mut local);
                }
                local.merge_into(&shared);
            });
        });
    }

    Ok(dist.snapshot())
}

fn chunk_size(len: usize, threads: usize) -> usize {
    len.div_ceil(threads * 4).max(1)
}

fn relax_light(
    graph: &Digraph,
    dist: &DistanceTable,
    delta: u64,
    node: u32,
    node_dist: u64,
    local: &mut LocalBuckets,
) {
    for (dest, weight) in graph.out_edges(node) {
        if weight as u64 <= delta {
            let candidate = node_dist + weight as u64;
            if dist.try_improve(dest, candidate) {
                local.push((candidate / delta) as usize, dest);
            }
        }
    }
}

fn relax_heavy(
    graph: &Digraph,
    dist: &DistanceTable,
    delta: u64,
    node: u32,
    node_dist: u64,
    local: &mut LocalBuckets,
) {
    for (dest, weight) in graph.out_edges(node) {
        if weight as u64 > delta {
            let candidate = node_dist + weight as u64;
            if dist.try_improve(dest, candidate) {
                local.push((candidate / delta) as usize, dest);
            }
        }
    }
}

/// Bucket fusion: while this task's share of the current bucket is
/// small, finish its same-band reinsertion chain in place instead of
/// paying a merge round for it. Only the current band is fused, so
/// every relaxation stays anchored at the window origin and bucket
/// indices cannot run off the circular store. Drained nodes are
/// reported so the
/// caller can add them to the removed-set.
fn fuse(
    graph: &Digraph,
    dist: &DistanceTable,
    delta: u64,
    current: usize,
    threshold: usize,
    local: &mut LocalBuckets,
    fused: &mut Vec<u32>,
) {
    loop {
        let size = local.len_of(current);
        if size == 0 || size >= threshold {
            break;
        }
        let members = local.take(current);
        for node in members {
            let node_dist = dist.get(node);
            if node_dist / delta != current as u64 {
                continue;
            }
            fused.push(node);
            relax_light(graph, dist, delta, node, node_dist, local);
        }
    }
}
