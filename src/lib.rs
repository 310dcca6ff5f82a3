//! # node2walk
//!
//! Second-order biased random walks (node2vec) over weighted graphs, sampled
//! in O(1) per step.
//!
//! Transition probabilities are precomputed once with
//! [Walker’s Alias Method](https://en.wikipedia.org/wiki/Alias_method): one
//! table per node for the first step, and one table per directed edge
//! `(prev, cur)` for every later step. The walks feed a sequence-embedding
//! trainer (skip-gram or similar), which lives outside this crate.
//!
//! The pipeline has three stages:
//!
//! 1. Build or adapt a graph implementing [`Graph`] ([`AdjacencyGraph`] is
//!    provided).
//! 2. [`TransitionModel::preprocess`] it with the return parameter `p` and
//!    in-out parameter `q`.
//! 3. Draw single walks with [`walk`], or stream a whole corpus with
//!    [`WalkCampaign::generate`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use node2walk::{AdjacencyGraph, TransitionModel, WalkCampaign};
//! use rand::SeedableRng;
//!
//! # fn main() -> node2walk::Result<()> {
//! let graph = AdjacencyGraph::from_unweighted_edges(false, [(1, 2), (2, 3), (3, 1), (3, 4)]);
//! let model = TransitionModel::preprocess(&graph, false, 1.0, 0.5)?;
//!
//! let campaign = WalkCampaign::new(10, 80, true);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! for sentence in campaign.generate(&model, &mut rng)?.rendered() {
//!     // hand `sentence: Vec<String>` to the trainer
//! }
//! # Ok(()) }
//! ```
//!
//! ## Performance
//! * **Preprocess**: O(E · avg_degree) time and space, dominated by edge tables.
//! * **Walk step**: O(1) (2 random numbers, 1 branch, no hashing).
//! * **Corpus**: `num_walks × |nodes|` walks, streamed one at a time.
//!
//! ## Gotchas
//! * Weights must be **non-negative**, finite, and not all zero around a node.
//! * The model is immutable. Rebuild it if `p`, `q` or any weight changes.
//! * Neighbors are ordered by node identifier, so `Node: Ord` is required.
//!
//! ## Features
//! * `parallel`: `generate_parallel`, rayon-sharded and thread-count stable.
//! * `serde`: (de)serialize [`TransitionConfig`] and [`WalkCampaign`].
//!
//! ---
//!
//! Logging goes through `tracing`; install a subscriber to see it.

mod alias;
mod campaign;
mod error;
mod graph;
#[cfg(feature = "parallel")]
mod parallel;
mod transition;
mod walk;

pub use alias::{AliasTable, NORMALIZATION_TOLERANCE};
pub use campaign::{WalkCampaign, Walks};
pub use error::{Error, ProbError, Result};
pub use graph::{AdjacencyGraph, Graph};
#[cfg(feature = "parallel")]
pub use parallel::generate_parallel;
pub use transition::{
    TransitionConfig, TransitionModel, build_edge_table, build_node_tables, edge_bias_weights,
};
pub use walk::{Walk, render, walk};
