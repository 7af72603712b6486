use std::io::{self, Write};
use std::str::FromStr;

use crate::digraph::Digraph;
use crate::distances::INF;
use crate::error::EngineError;

mod dijkstra;
mod parallel;
mod sequential;

/// Buckets needed so that any relaxation launched from the current
/// window origin lands inside the circular store.
pub(crate) fn bucket_count(max_edge_weight: u32, delta: u64) -> usize {
    ((max_edge_weight as u64).div_ceil(delta) + 1) as usize
}

/// Algorithm variant, selected by name at invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sequential,
    Parallel,
    ParallelBucketFusion,
    Dijkstra,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Sequential => "sequential",
            Mode::Parallel => "parallel",
            Mode::ParallelBucketFusion => "parallel-bucket-fusion",
            Mode::Dijkstra => "dijkstra",
        }
    }
}

impl FromStr for Mode {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<Self, EngineError> {
        match name {
            "sequential" => Ok(Mode::Sequential),
            "parallel" => Ok(Mode::Parallel),
            "parallel-bucket-fusion" => Ok(Mode::ParallelBucketFusion),
            "dijkstra" => Ok(Mode::Dijkstra),
            other => Err(EngineError::InvalidMode(other.to_string())),
        }
    }
}

/// Per-run parameters; an explicit value, never process-global state,
/// so engines with different geometries can run concurrently.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bucket width; edges with weight <= delta are light.
    pub delta: u64,
    /// Worker pool size for the parallel modes.
    pub threads: usize,
    /// Re-run Dijkstra after the selected mode and fail on divergence.
    pub validate: bool,
}

impl EngineConfig {
    pub fn new(delta: u64, threads: usize) -> Self {
        EngineConfig {
            delta,
            threads,
            validate: false,
        }
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.delta < 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "delta must be >= 1, got {}",
                self.delta
            )));
        }
        if self.threads < 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "thread count must be >= 1, got {}",
                self.threads
            )));
        }
        Ok(())
    }
}

/// Front door of the engine: holds a borrowed graph view plus the run
/// configuration, and exposes the final distance table after `run`.
pub struct DeltaStepping<'g> {
    graph: &'g Digraph,
    config: EngineConfig,
    dist: Vec<u64>,
}

impl<'g> DeltaStepping<'g> {
    /// Configuration errors are reported here, before any traversal.
    pub fn new(graph: &'g Digraph, config: EngineConfig) -> Result<Self, EngineError> {
        if graph.node_count() == 0 {
            return Err(EngineError::EmptyGraph);
        }
        config.check()?;
        Ok(DeltaStepping {
            graph,
            config,
            dist: Vec::new(),
        })
    }

    /// Runs the selected variant from `source` to a fixed point. With
    /// `validate` set, non-reference modes are differentially checked
    /// against Dijkstra afterwards.
    pub fn run(&mut self, source: u32, mode: Mode) -> Result<(), EngineError> {
        if source as usize >= self.graph.node_count() {
            return Err(EngineError::InvalidConfiguration(format!(
                "source {} out of range for {} nodes",
                source,
                self.graph.node_count()
            )));
        }

        let dist = match mode {
            Mode::Sequential => sequential::run(self.graph, self.config.delta, source),
            Mode::Parallel => {
                parallel::run(self.graph, self.config.delta, source, self.config.threads, 0)?
            }
            Mode::ParallelBucketFusion => parallel::run(
                self.graph,
                self.config.delta,
                source,
                self.config.threads,
                parallel::FUSION_THRESHOLD,
            )?,
            Mode::Dijkstra => dijkstra::run(self.graph, source),
        };

        if self.config.validate && mode != Mode::Dijkstra {
            dijkstra::check(self.graph, source, &dist)?;
        }

        self.dist = dist;
        Ok(())
    }

    /// Final distances in node-id order; `INF` marks unreachable.
    /// Empty before the first `run`.
    pub fn distances(&self) -> &[u64] {
        &self.dist
    }

    /// Streams `node<TAB>distance` lines in node-id order; unreachable
    /// nodes print as `inf`.
    pub fn write_distances<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (node, &dist) in self.dist.iter().enumerate() {
            if dist == INF {
                writeln!(writer, "{node}\tinf")?;
            } else {
                writeln!(writer, "{node}\t{dist}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [Mode; 4] = [
        Mode::Sequential,
        Mode::Parallel,
        Mode::ParallelBucketFusion,
        Mode::Dijkstra,
    ];

    fn scenario_graph() -> Digraph {
        Digraph::from_edges(
            5,
            &[(0, 1, 2), (0, 2, 5), (1, 2, 1), (1, 3, 4), (2, 4, 1), (3, 4, 1)],
        )
    }

    #[test]
    fn scenario_all_modes() {
        let graph = scenario_graph();
        for mode in ALL_MODES {
            let mut engine = DeltaStepping::new(&graph, EngineConfig::new(2, 2)).unwrap();
            engine.run(0, mode).unwrap();
            assert_eq!(engine.distances(), &[0, 2, 3, 6, 4], "mode {}", mode.as_str());
        }
    }

    #[test]
    fn single_node_all_modes() {
        let graph = Digraph::from_edges(1, &[]);
        for mode in ALL_MODES {
            let mut engine = DeltaStepping::new(&graph, EngineConfig::new(2, 2)).unwrap();
            engine.run(0, mode).unwrap();
            assert_eq!(engine.distances(), &[0]);
        }
    }

    #[test]
    fn rerun_is_idempotent() {
        let graph = scenario_graph();
        let mut engine = DeltaStepping::new(&graph, EngineConfig::new(3, 4)).unwrap();
        engine.run(0, Mode::Parallel).unwrap();
        let first = engine.distances().to_vec();
        engine.run(0, Mode::Parallel).unwrap();
        assert_eq!(engine.distances(), &first[..]);
    }

    #[test]
    fn validate_flag_accepts_correct_runs() {
        let graph = scenario_graph();
        let mut config = EngineConfig::new(2, 2);
        config.validate = true;
        let mut engine = DeltaStepping::new(&graph, config).unwrap();
        for mode in ALL_MODES {
            engine.run(0, mode).unwrap();
        }
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("sequential".parse::<Mode>().unwrap(), Mode::Sequential);
        assert_eq!("parallel".parse::<Mode>().unwrap(), Mode::Parallel);
        assert_eq!(
            "parallel-bucket-fusion".parse::<Mode>().unwrap(),
            Mode::ParallelBucketFusion
        );
        assert_eq!("dijkstra".parse::<Mode>().unwrap(), Mode::Dijkstra);
        match "bellman-ford".parse::<Mode>() {
            Err(EngineError::InvalidMode(name)) => assert_eq!(name, "bellman-ford"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_configuration_is_rejected_before_running() {
        let graph = scenario_graph();
        assert!(matches!(
            DeltaStepping::new(&graph, EngineConfig::new(0, 2)),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DeltaStepping::new(&graph, EngineConfig::new(2, 0)),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn empty_graph_is_rejected() {
        let graph = Digraph::from_edges(0, &[]);
        assert!(matches!(
            DeltaStepping::new(&graph, EngineConfig::new(2, 2)),
            Err(EngineError::EmptyGraph)
        ));
    }

    #[test]
    fn out_of_range_source_is_rejected() {
        let graph = scenario_graph();
        let mut engine = DeltaStepping::new(&graph, EngineConfig::new(2, 2)).unwrap();
        assert!(matches!(
            engine.run(9, Mode::Sequential),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn write_distances_format() {
        let graph = Digraph::from_edges(3, &[(0, 1, 4)]);
        let mut engine = DeltaStepping::new(&graph, EngineConfig::new(2, 1)).unwrap();
        engine.run(0, Mode::Sequential).unwrap();
        let mut out = Vec::new();
        engine.write_distances(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\t0\n1\t4\n2\tinf\n");
    }
}
