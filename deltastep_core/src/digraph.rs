/// Immutable weighted digraph in Compressed Sparse Row (CSR) form.
/// Replaces Vec<Vec<(u32, u32)>>.
#[derive(Debug)]
pub struct Digraph {
    // Points to the start index in `dests`/`weights` for a given node id.
    // Length = node_count + 1
    offsets: Vec<usize>,

    // The contiguous list of all edge destinations and weights.
    dests: Vec<u32>,
    weights: Vec<u32>,

    // Largest weight seen during construction; sizes the bucket window.
    max_edge_weight: u32,
}

impl Digraph {
    /// Builds the CSR layout from unsorted `(src, dst, weight)` triples.
    /// Two passes: a degree histogram to compute offsets, then a cursor
    /// write into storage allocated once. Edges whose endpoints fall
    /// outside `[0, num_nodes)` are dropped.
    pub fn from_edges(num_nodes: usize, edges: &[(u32, u32, u32)]) -> Self {
        let in_range =
            |src: u32, dst: u32| (src as usize) < num_nodes && (dst as usize) < num_nodes;

        // 1. Pass 1: count out-degrees
        let mut counts = vec![0usize; num_nodes];
        for &(src, dst, _) in edges {
            if in_range(src, dst) {
                counts[src as usize] += 1;
            }
        }

        // 2. Offsets (cumulative sum)
        let mut offsets = Vec::with_capacity(num_nodes + 1);
        let mut current_offset = 0;
        offsets.push(0);
        for count in counts {
            current_offset += count;
            offsets.push(current_offset);
        }

        // 3. Pass 2: populate destinations and weights at exact size
        let total_edges = offsets[num_nodes];
        let mut dests = vec![0u32; total_edges];
        let mut weights = vec![0u32; total_edges];
        let mut max_edge_weight = 0;

        let mut write_cursors = offsets.clone();
        for &(src, dst, weight) in edges {
            if in_range(src, dst) {
                let pos = write_cursors[src as usize];
                dests[pos] = dst;
                weights[pos] = weight;
                write_cursors[src as usize] += 1;
                max_edge_weight = max_edge_weight.max(weight);
            }
        }

        Digraph {
            offsets,
            dests,
            weights,
            max_edge_weight,
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.dests.len()
    }

    pub fn max_edge_weight(&self) -> u32 {
        self.max_edge_weight
    }

    /// Outgoing `(dest, weight)` pairs of a node; empty for a leaf.
    #[inline]
    pub fn out_edges(&self, node: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        let start = self.offsets[node as usize];
        let end = self.offsets[node as usize + 1];
        self.dests[start..end]
            .iter()
            .copied()
            .zip(self.weights[start..end].iter().copied())
    }

    #[inline]
    pub fn out_degree(&self, node: u32) -> usize {
        self.offsets[node as usize + 1] - self.offsets[node as usize]
    }
}
