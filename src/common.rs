//! Shared graph abstractions for link-analysis algorithms.
//!
//! Algorithms consume the graph through the read-only [`GraphView`]
//! interface; storage lives elsewhere. [`CsrGraph`] is the bundled
//! compressed-sparse-row implementation, sufficient for tests, benchmarks,
//! and callers without their own storage layer.

use thiserror::Error;

/// Node identifier type (u64)
pub type NodeId = u64;

/// Which edge direction a neighbor sequence represents.
///
/// A storage backend keeps adjacency in one direction and answers
/// [`GraphView::neighbors`] from it without a reverse-index lookup. The
/// direction is a property of the storage, not of individual nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeDirection {
    /// `neighbors(v)` yields the sources of v's in-edges (predecessors).
    Incoming,
    /// `neighbors(v)` yields the targets of v's out-edges (successors).
    Outgoing,
}

/// Graph consistency errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An enumerated node id exceeds the declared id space
    #[error("node id {node} exceeds the maximum node id {max_node_id}")]
    NodeOutOfRange { node: NodeId, max_node_id: NodeId },

    /// A neighbor id exceeds the declared id space
    #[error("neighbor {neighbor} of node {node} exceeds the maximum node id {max_node_id}")]
    NeighborOutOfRange {
        node: NodeId,
        neighbor: NodeId,
        max_node_id: NodeId,
    },

    /// An edge endpoint does not refer to an existing node
    #[error("edge endpoint {endpoint} does not refer to an existing node")]
    UnknownEndpoint { endpoint: NodeId },
}

/// Read-only view of a directed graph over a contiguous, possibly sparse
/// id space `[0, max_node_id]`.
///
/// `neighbors` returns whichever edge direction the storage holds natively
/// ([`native_direction`](GraphView::native_direction) says which); the
/// kernel picks its update strategy from that flag once, at construction.
/// Views are shared across worker threads during parallel passes, hence
/// the `Sync` bound.
pub trait GraphView: Sync {
    /// Largest node id in the view's id space.
    fn max_node_id(&self) -> NodeId;

    /// Number of live nodes. May be smaller than `max_node_id + 1` when
    /// the id space is sparse.
    fn node_count(&self) -> usize;

    /// Whether `id` refers to a live node.
    fn contains_node(&self, id: NodeId) -> bool;

    /// Visit every live node. The enumeration order defines the summation
    /// order of scatter passes.
    fn for_each_node<F: FnMut(NodeId)>(&self, visit: F);

    /// The node's neighbor sequence in the storage's native direction.
    fn neighbors(&self, id: NodeId) -> &[NodeId];

    /// Which direction [`neighbors`](GraphView::neighbors) represents.
    fn native_direction(&self) -> EdgeDirection;
}

/// A dense, integer-indexed graph view in Compressed Sparse Row format.
///
/// Adjacency is stored in a single direction, chosen at construction; the
/// same edge list produces equivalent rankings either way, only the
/// kernel's update strategy differs.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    max_node_id: NodeId,
    node_count: usize,
    /// Liveness per id. Size = max_node_id + 1
    exists: Vec<bool>,
    /// Offsets into `targets`. Size = max_node_id + 2
    offsets: Vec<usize>,
    /// Contiguous array of neighbor ids
    targets: Vec<NodeId>,
    direction: EdgeDirection,
}

impl CsrGraph {
    /// Build a view from an edge list.
    ///
    /// `edges` are `(source, target)` pairs regardless of `direction`;
    /// `direction` only selects which endpoint the adjacency is keyed by.
    /// Endpoints outside `[0, max_node_id]` or naming an id absent from
    /// `nodes` are rejected.
    pub fn from_edges(
        max_node_id: NodeId,
        nodes: &[NodeId],
        edges: &[(NodeId, NodeId)],
        direction: EdgeDirection,
    ) -> Result<Self, GraphError> {
        let len = max_node_id as usize + 1;

        let mut exists = vec![false; len];
        for &id in nodes {
            if id > max_node_id {
                return Err(GraphError::NodeOutOfRange {
                    node: id,
                    max_node_id,
                });
            }
            exists[id as usize] = true;
        }
        let node_count = exists.iter().filter(|&&live| live).count();

        // Count adjacency per storage key, then prefix-sum into offsets.
        let mut counts = vec![0usize; len];
        for &(source, target) in edges {
            for endpoint in [source, target] {
                if endpoint > max_node_id || !exists[endpoint as usize] {
                    return Err(GraphError::UnknownEndpoint { endpoint });
                }
            }
            let key = match direction {
                EdgeDirection::Outgoing => source,
                EdgeDirection::Incoming => target,
            };
            counts[key as usize] += 1;
        }

        let mut offsets = vec![0usize; len + 1];
        for i in 0..len {
            offsets[i + 1] = offsets[i] + counts[i];
        }

        let mut targets = vec![0 as NodeId; edges.len()];
        let mut cursor = offsets.clone();
        for &(source, target) in edges {
            let (key, value) = match direction {
                EdgeDirection::Outgoing => (source, target),
                EdgeDirection::Incoming => (target, source),
            };
            targets[cursor[key as usize]] = value;
            cursor[key as usize] += 1;
        }

        Ok(CsrGraph {
            max_node_id,
            node_count,
            exists,
            offsets,
            targets,
            direction,
        })
    }

    /// Degree of `id` in the stored direction.
    pub fn degree(&self, id: NodeId) -> usize {
        let i = id as usize;
        self.offsets[i + 1] - self.offsets[i]
    }
}

impl GraphView for CsrGraph {
    fn max_node_id(&self) -> NodeId {
        self.max_node_id
    }

    fn node_count(&self) -> usize {
        self.node_count
    }

    fn contains_node(&self, id: NodeId) -> bool {
        self.exists.get(id as usize).copied().unwrap_or(false)
    }

    fn for_each_node<F: FnMut(NodeId)>(&self, mut visit: F) {
        for (id, &live) in self.exists.iter().enumerate() {
            if live {
                visit(id as NodeId);
            }
        }
    }

    fn neighbors(&self, id: NodeId) -> &[NodeId] {
        let i = id as usize;
        &self.targets[self.offsets[i]..self.offsets[i + 1]]
    }

    fn native_direction(&self) -> EdgeDirection {
        self.direction
    }
}
