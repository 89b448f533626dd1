//! Convergence-driven link analysis for directed graphs.
//!
//! Ranks every node of a directed graph by damped power iteration
//! (PageRank). The computation is split into a generic convergence driver
//! (produce an initial ranking state, apply an algorithm's transition
//! function until an error tolerance or iteration cap is reached) and a
//! PageRank kernel that picks between two equivalent per-round update
//! strategies (gather from predecessors vs. scatter to successors)
//! depending on which edge direction the graph's storage exposes
//! efficiently. Graph storage itself stays behind the narrow [`GraphView`]
//! interface; any backend that can enumerate its nodes and hand out
//! neighbor slices plugs in.
//!
//! # Example
//!
//! ```rust
//! use linkrank::{page_rank, CsrGraph, EdgeDirection, RankConfig};
//!
//! // 3-node cycle: 0 -> 1 -> 2 -> 0
//! let graph = CsrGraph::from_edges(
//!     2,
//!     &[0, 1, 2],
//!     &[(0, 1), (1, 2), (2, 0)],
//!     EdgeDirection::Incoming,
//! )
//! .unwrap();
//!
//! let config = RankConfig::default().with_max_iterations(None).unwrap();
//! let state = page_rank(&graph, config).unwrap();
//!
//! // Perfect symmetry: every node ends up with a third of the mass.
//! assert!((state.score(0) - 1.0 / 3.0).abs() < 1e-8);
//! ```

#![warn(clippy::all)]

pub mod common;
pub mod convergence;
pub mod pagerank;
pub mod progress;

// Re-export main types for convenience
pub use common::{CsrGraph, EdgeDirection, GraphError, GraphView, NodeId};
pub use convergence::{
    run_to_convergence, ConfigError, RankConfig, RankError, RankResult, RankState,
    RankingAlgorithm,
};
pub use pagerank::{page_rank, PageRank};
pub use progress::{NoProgress, ProgressCounter, ProgressListener};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
