//! PageRank over a [`GraphView`].
//!
//! The kernel precomputes the outbound-degree table once, then produces
//! one immutable [`RankState`] per round under the generic convergence
//! driver. The per-round update runs in whichever of two equivalent modes
//! matches the storage's native edge direction: Pull gathers from
//! predecessors (one writer per slot), Push scatters to successors
//! (serialized writes). Nodes without outbound edges keep their mass to
//! themselves and contribute nothing; the division is guarded, so a
//! dangling node can never inject NaN or infinity into the scores.

use crate::common::{EdgeDirection, GraphError, GraphView, NodeId};
use crate::convergence::{run_to_convergence, RankConfig, RankResult, RankState, RankingAlgorithm};
use crate::progress::{NoProgress, ProgressListener};
use tracing::debug;

/// PageRank kernel bound to a graph view.
///
/// The update mode and the outbound-degree table are fixed at
/// construction; running the kernel allocates a fresh score array per
/// round and never mutates a previous round.
pub struct PageRank<'g, G> {
    graph: &'g G,
    config: RankConfig,
    /// Out-degree per node id, computed once over the whole graph.
    out_degree: Vec<usize>,
    /// Teleport mass `(1 - d) / n`; zero when d == 1 or the graph is empty.
    damping_amount: f64,
    /// Update strategy, resolved once from the storage direction.
    mode: EdgeDirection,
    listener: &'g dyn ProgressListener,
}

impl<'g, G> std::fmt::Debug for PageRank<'g, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRank")
            .field("config", &self.config)
            .field("out_degree", &self.out_degree)
            .field("damping_amount", &self.damping_amount)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<'g, G: GraphView> PageRank<'g, G> {
    /// Build the kernel, validating the view and precomputing out-degrees.
    pub fn new(graph: &'g G, config: RankConfig) -> RankResult<Self> {
        Self::with_listener(graph, config, &NoProgress)
    }

    /// Like [`new`](PageRank::new), but reports per-node progress to
    /// `listener` during the precompute and every later round.
    pub fn with_listener(
        graph: &'g G,
        config: RankConfig,
        listener: &'g dyn ProgressListener,
    ) -> RankResult<Self> {
        let out_degree = out_degrees(graph, listener)?;
        let node_count = graph.node_count();
        let damping_amount = if node_count == 0 {
            0.0
        } else {
            (1.0 - config.damping_factor()) / node_count as f64
        };
        let mode = graph.native_direction();
        debug!(
            "precomputed out-degrees for {} nodes, {:?} storage",
            node_count, mode
        );

        Ok(Self {
            graph,
            config,
            out_degree,
            damping_amount,
            mode,
            listener,
        })
    }

    /// Score gathered by `node` from its predecessors, 0.0 for ids that
    /// are not live nodes. Each slot has exactly one writer, which is what
    /// lets the Pull pass fan out across threads.
    fn pulled_score(&self, node: NodeId, prev: &RankState) -> Result<f64, GraphError> {
        if !self.graph.contains_node(node) {
            return Ok(0.0);
        }
        let mut gathered = 0.0;
        for &neighbor in self.graph.neighbors(node) {
            let slot = neighbor as usize;
            let score = match prev.scores.get(slot) {
                Some(&score) => score,
                None => {
                    return Err(GraphError::NeighborOutOfRange {
                        node,
                        neighbor,
                        max_node_id: self.graph.max_node_id(),
                    })
                }
            };
            let degree = self.out_degree[slot];
            if degree > 0 {
                gathered += score / degree as f64;
            }
        }
        self.listener.node_processed();
        Ok(gathered)
    }

    #[cfg(feature = "rayon")]
    fn pull_round(&self, prev: &RankState) -> Result<Vec<f64>, GraphError> {
        use rayon::prelude::*;
        (0..prev.scores.len())
            .into_par_iter()
            .map(|slot| self.pulled_score(slot as NodeId, prev))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn pull_round(&self, prev: &RankState) -> Result<Vec<f64>, GraphError> {
        (0..prev.scores.len())
            .map(|slot| self.pulled_score(slot as NodeId, prev))
            .collect()
    }

    /// Scatter pass: every source spreads `score / out_degree` over its
    /// successors. Writes from different sources land in the same slots,
    /// so this pass stays sequential.
    fn push_round(&self, prev: &RankState) -> Result<Vec<f64>, GraphError> {
        let mut after = vec![0.0; prev.scores.len()];
        let mut failure: Option<GraphError> = None;

        self.graph.for_each_node(|node| {
            if failure.is_some() {
                return;
            }
            let score = match prev.scores.get(node as usize) {
                Some(&score) => score,
                None => {
                    failure = Some(GraphError::NodeOutOfRange {
                        node,
                        max_node_id: self.graph.max_node_id(),
                    });
                    return;
                }
            };
            let degree = self.out_degree[node as usize];
            if degree > 0 {
                let given = score / degree as f64;
                for &successor in self.graph.neighbors(node) {
                    match after.get_mut(successor as usize) {
                        Some(entry) => *entry += given,
                        None => {
                            failure = Some(GraphError::NeighborOutOfRange {
                                node,
                                neighbor: successor,
                                max_node_id: self.graph.max_node_id(),
                            });
                            return;
                        }
                    }
                }
            }
            self.listener.node_processed();
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(after),
        }
    }
}

impl<'g, G: GraphView> RankingAlgorithm for PageRank<'g, G> {
    fn config(&self) -> &RankConfig {
        &self.config
    }

    fn initial_state(&self) -> RankState {
        let len = self.graph.max_node_id() as usize + 1;
        let mut scores = vec![0.0; len];
        let node_count = self.graph.node_count();
        if node_count > 0 {
            let uniform = 1.0 / node_count as f64;
            self.graph.for_each_node(|node| {
                scores[node as usize] = uniform;
            });
        }
        // Sentinel error above any tolerance: round 0 never counts as
        // converged.
        RankState::new(scores, 100.0 + self.config.tolerance(), 0)
    }

    fn transition(&self, prev: &RankState) -> RankResult<RankState> {
        let mut after = match self.mode {
            EdgeDirection::Incoming => self.pull_round(prev)?,
            EdgeDirection::Outgoing => self.push_round(prev)?,
        };

        // d == 1 leaves no teleport mass and the pass would be an identity.
        if self.damping_amount > 0.0 {
            let damping_factor = self.config.damping_factor();
            self.graph.for_each_node(|node| {
                let entry = &mut after[node as usize];
                *entry = self.damping_amount + damping_factor * *entry;
            });
        }

        let error = prev
            .scores
            .iter()
            .zip(after.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        Ok(RankState::new(after, error, prev.iteration + 1))
    }
}

/// Run PageRank on a graph view to convergence.
pub fn page_rank<G: GraphView>(graph: &G, config: RankConfig) -> RankResult<RankState> {
    let kernel = PageRank::new(graph, config)?;
    run_to_convergence(&kernel)
}

/// Out-degree per node id, recovered from whichever direction the storage
/// holds: with outgoing adjacency a node's own count grows per neighbor,
/// with incoming adjacency each neighbor's count grows. O(total edges),
/// runs once per kernel.
fn out_degrees<G: GraphView>(
    graph: &G,
    listener: &dyn ProgressListener,
) -> Result<Vec<usize>, GraphError> {
    let max_node_id = graph.max_node_id();
    let len = max_node_id as usize + 1;
    let mut degrees = vec![0usize; len];
    let mut failure: Option<GraphError> = None;
    let direction = graph.native_direction();

    graph.for_each_node(|node| {
        if failure.is_some() {
            return;
        }
        if node > max_node_id {
            failure = Some(GraphError::NodeOutOfRange { node, max_node_id });
            return;
        }
        for &neighbor in graph.neighbors(node) {
            if neighbor > max_node_id {
                failure = Some(GraphError::NeighborOutOfRange {
                    node,
                    neighbor,
                    max_node_id,
                });
                return;
            }
        }
        match direction {
            EdgeDirection::Outgoing => degrees[node as usize] += graph.neighbors(node).len(),
            EdgeDirection::Incoming => {
                for &neighbor in graph.neighbors(node) {
                    degrees[neighbor as usize] += 1;
                }
            }
        }
        listener.node_processed();
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(degrees),
    }
}
