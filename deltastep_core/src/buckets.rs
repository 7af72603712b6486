use std::mem;
use std::sync::Mutex;

/// Circular bucket queue with exact membership, used by the sequential
/// engine. Bucket `k` holds the nodes whose tentative distance lies in
/// `[k*delta, (k+1)*delta)`. Absolute bucket indices grow without bound
/// over a run; only a window of `slots.len()` consecutive indices can
/// be non-empty at once, so index `k` lives in slot `k % slots.len()`
/// and advancing the window origin reclaims the drained prefix without
/// moving anything.
pub struct BucketQueue {
    base: usize,
    slots: Vec<Vec<u32>>,
    // node -> (absolute bucket index, offset within the slot)
    position: Vec<Option<(usize, usize)>>,
    len: usize,
}

impl BucketQueue {
    pub fn new(num_buckets: usize, num_nodes: usize) -> Self {
        debug_assert!(num_buckets >= 1);
        BucketQueue {
            base: 0,
            slots: vec![Vec::new(); num_buckets],
            position: vec![None; num_nodes],
            len: 0,
        }
    }

    #[inline]
    fn slot(&self, bucket: usize) -> usize {
        bucket % self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Queues a node into an absolute bucket index. The caller removes
    /// the node first if it is already queued elsewhere.
    pub fn insert(&mut self, node: u32, bucket: usize) {
        debug_assert!(self.position[node as usize].is_none());
        debug_assert!(bucket >= self.base && bucket < self.base + self.slots.len());
        let slot = self.slot(bucket);
        self.position[node as usize] = Some((bucket, self.slots[slot].len()));
        self.slots[slot].push(node);
        self.len += 1;
    }

    /// Unqueues a node if it is queued; a no-op otherwise. Swap-removal
    /// keeps the operation O(1), fixing up the displaced entry's
    /// recorded offset.
    pub fn remove(&mut self, node: u32) {
        let Some((bucket, at)) = self.position[node as usize].take() else {
            return;
        };
        let slot = self.slot(bucket);
        self.slots[slot].swap_remove(at);
        if let Some(&moved) = self.slots[slot].get(at) {
            self.position[moved as usize] = Some((bucket, at));
        }
        self.len -= 1;
    }

    /// Drains a bucket, unqueueing every member.
    pub fn take(&mut self, bucket: usize) -> Vec<u32> {
        let slot = self.slot(bucket);
        let drained = mem::take(&mut self.slots[slot]);
        for &node in &drained {
            self.position[node as usize] = None;
        }
        self.len -= drained.len();
        drained
    }

    /// Rotates the window origin to the lowest non-empty bucket and
    /// returns its absolute index; `None` once every bucket is empty.
    pub fn advance(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        for offset in 0..self.slots.len() {
            let bucket = self.base + offset;
            if !self.slots[self.slot(bucket)].is_empty() {
                self.base = bucket;
                return Some(bucket);
            }
        }
        None
    }

    /// The absolute bucket index a node is currently recorded under,
    /// for assertions that relate membership back to distances.
    #[cfg(test)]
    pub fn bucket_of(&self, node: u32) -> Option<usize> {
        self.position[node as usize].map(|(bucket, _)| bucket)
    }
}

/// Shared bucket store for the parallel engines: append-only within a
/// round, one mutex per slot so merges into different bucket indices
/// never contend. Membership is not exact: a node whose distance
/// improves again leaves a stale entry behind, and drains filter those
/// by re-deriving the bucket index from the current distance.
pub struct SharedBuckets {
    base: usize,
    slots: Vec<Mutex<Vec<u32>>>,
}

impl SharedBuckets {
    pub fn new(num_buckets: usize) -> Self {
        debug_assert!(num_buckets >= 1);
        SharedBuckets {
            base: 0,
            slots: (0..num_buckets).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    #[inline]
    fn slot(&self, bucket: usize) -> &Mutex<Vec<u32>> {
        debug_assert!(bucket >= self.base && bucket < self.base + self.slots.len());
        &self.slots[bucket % self.slots.len()]
    }

    pub fn push(&self, bucket: usize, node: u32) {
        self.slot(bucket).lock().unwrap().push(node);
    }

    pub fn append(&self, bucket: usize, nodes: &[u32]) {
        self.slot(bucket).lock().unwrap().extend_from_slice(nodes);
    }

    pub fn len_of(&self, bucket: usize) -> usize {
        self.slot(bucket).lock().unwrap().len()
    }

    /// Copies the members appended at or after `from`. Between rounds
    /// only the suffix is new, so re-scans stay bounded.
    pub fn suffix(&self, bucket: usize, from: usize) -> Vec<u32> {
        self.slot(bucket).lock().unwrap()[from..].to_vec()
    }

    pub fn clear(&self, bucket: usize) {
        self.slot(bucket).lock().unwrap().clear();
    }

    /// Rotates the window origin to the lowest non-empty bucket; only
    /// called from the single-threaded decision phase.
    pub fn advance(&mut self) -> Option<usize> {
        for offset in 0..self.slots.len() {
            let bucket = self.base + offset;
            if !self.slots[bucket % self.slots.len()].lock().unwrap().is_empty() {
                self.base = bucket;
                return Some(bucket);
            }
        }
        None
    }
}
