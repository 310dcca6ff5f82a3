//! Second-order transition probabilities, precomputed as alias tables.
//!
//! Every node gets a first-step table over its neighbors, and every directed
//! edge `(prev, cur)` gets a table over `cur`'s neighbors biased by the
//! return parameter `p` and the in-out parameter `q`:
//!
//! * `w(cur, x) / p` when `x == prev`,
//! * `w(cur, x)` when there is an edge `(x, prev)`,
//! * `w(cur, x) / q` otherwise.
//!
//! Neighbors are always ordered by node identifier. The model keeps that order
//! in one adjacency index which both table construction and sampling read,
//! so a table index always means the same neighbor.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::alias::AliasTable;
use crate::error::{Error, Result};
use crate::graph::Graph;

/// Bias parameters and preprocessing switches.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransitionConfig {
    /// Return parameter: high values discourage stepping straight back.
    pub p: f64,
    /// In-out parameter: low values push the walk outward.
    pub q: f64,
    /// Treat arcs as one-way. When false every arc is walkable both ways.
    pub directed: bool,
    /// Fail with [`Error::DisconnectedNode`] on nodes without neighbors
    /// instead of letting walks from them stop after one node.
    pub require_neighbors: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            p: 1.0,
            q: 1.0,
            directed: false,
            require_neighbors: false,
        }
    }
}

impl TransitionConfig {
    pub fn validate(&self) -> Result<()> {
        check_bias(self.p, self.q)
    }
}

fn check_bias(p: f64, q: f64) -> Result<()> {
    for (name, value) in [("p", p), ("q", q)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
    }
    Ok(())
}

#[inline]
fn biased(weight: f64, returns: bool, stays_local: bool, p: f64, q: f64) -> f64 {
    if returns {
        weight / p
    } else if stays_local {
        weight
    } else {
        weight / q
    }
}

/// Node list plus per-node neighbor slots sorted by node identifier.
#[derive(Debug, Clone)]
pub(crate) struct AdjacencyIndex<N> {
    pub(crate) nodes: Vec<N>,
    slots: HashMap<N, usize>,
    pub(crate) neighbors: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
}

impl<N> AdjacencyIndex<N>
where
    N: Clone + Eq + Hash + Ord + Debug,
{
    fn build<G: Graph<Node = N>>(graph: &G, directed: bool) -> Result<Self> {
        let nodes = graph.nodes();
        let mut slots = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            slots.insert(node.clone(), i);
        }

        let mut arcs: Vec<HashMap<usize, f64>> = vec![HashMap::new(); nodes.len()];
        for (u, node) in nodes.iter().enumerate() {
            for nbr in graph.neighbors(node) {
                let v = *slots
                    .get(&nbr)
                    .ok_or_else(|| Error::UnknownNode(format!("{nbr:?} (neighbor of {node:?})")))?;
                let w = graph
                    .edge_weight(node, &nbr)
                    .ok_or_else(|| Error::UnknownNode(format!("edge ({node:?}, {nbr:?})")))?;
                arcs[u].insert(v, w);
            }
        }

        if !directed {
            let one_way: Vec<(usize, usize, f64)> = arcs
                .iter()
                .enumerate()
                .flat_map(|(u, out)| out.iter().map(move |(&v, &w)| (u, v, w)))
                .filter(|&(u, v, _)| !arcs[v].contains_key(&u))
                .collect();
            for (u, v, w) in one_way {
                arcs[v].insert(u, w);
            }
        }

        let mut neighbors = Vec::with_capacity(nodes.len());
        let mut weights = Vec::with_capacity(nodes.len());
        for out in arcs {
            let mut pairs: Vec<(usize, f64)> = out.into_iter().collect();
            pairs.sort_by(|a, b| nodes[a.0].cmp(&nodes[b.0]));
            neighbors.push(pairs.iter().map(|&(v, _)| v).collect());
            weights.push(pairs.into_iter().map(|(_, w)| w).collect());
        }

        Ok(Self {
            nodes,
            slots,
            neighbors,
            weights,
        })
    }

    pub(crate) fn slot(&self, node: &N) -> Result<usize> {
        self.slots
            .get(node)
            .copied()
            .ok_or_else(|| Error::UnknownNode(format!("{node:?}")))
    }

    /// Position of `target` within `source`'s sorted neighbor list.
    fn position(&self, source: usize, target: usize) -> Option<usize> {
        let key = &self.nodes[target];
        self.neighbors[source]
            .binary_search_by(|&v| self.nodes[v].cmp(key))
            .ok()
    }

    fn has_arc(&self, source: usize, target: usize) -> bool {
        self.position(source, target).is_some()
    }
}

/// Alias tables for every node and every directed edge of a graph.
///
/// Only obtainable through [`TransitionModel::preprocess`], so a model is
/// always fully built. It never changes afterwards and can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct TransitionModel<N> {
    pub(crate) index: AdjacencyIndex<N>,
    pub(crate) node_tables: Vec<AliasTable>,
    /// `edge_tables[u][j]` belongs to the arc `u -> index.neighbors[u][j]`.
    pub(crate) edge_tables: Vec<Vec<AliasTable>>,
    config: TransitionConfig,
}

impl<N> TransitionModel<N>
where
    N: Clone + Eq + Hash + Ord + Debug,
{
    /// Precompute all transition tables for `graph`.
    ///
    /// Time and space are `O(E * avg_degree)`; build once per `(p, q)` and
    /// reuse for every walk.
    pub fn preprocess<G: Graph<Node = N>>(graph: &G, is_directed: bool, p: f64, q: f64) -> Result<Self> {
        Self::with_config(
            graph,
            &TransitionConfig {
                p,
                q,
                directed: is_directed,
                ..TransitionConfig::default()
            },
        )
    }

    pub fn with_config<G: Graph<Node = N>>(graph: &G, config: &TransitionConfig) -> Result<Self> {
        config.validate()?;
        let index = AdjacencyIndex::build(graph, config.directed)?;
        debug!(
            nodes = index.nodes.len(),
            directed = config.directed,
            "built adjacency index"
        );

        let self_loops = (0..index.nodes.len())
            .filter(|&u| index.has_arc(u, u))
            .count();
        if self_loops > 0 {
            warn!(self_loops, "graph has self-loops; they are biased like any other neighbor");
        }

        let mut node_tables = Vec::with_capacity(index.nodes.len());
        for (u, node) in index.nodes.iter().enumerate() {
            let weights = &index.weights[u];
            if weights.is_empty() {
                if config.require_neighbors {
                    return Err(Error::DisconnectedNode(format!("{node:?}")));
                }
                node_tables.push(AliasTable::empty());
                continue;
            }
            let table = AliasTable::from_weights(weights)
                .map_err(|e| Error::distribution(format!("node {node:?}"), e))?;
            node_tables.push(table);
        }

        let mut edge_tables = Vec::with_capacity(index.nodes.len());
        let mut count = 0usize;
        let mut buf = Vec::new();
        for (u, out) in index.neighbors.iter().enumerate() {
            let mut tables = Vec::with_capacity(out.len());
            for &v in out {
                tables.push(edge_table_from_index(&index, u, v, config.p, config.q, &mut buf)?);
            }
            count += tables.len();
            edge_tables.push(tables);
        }
        debug!(edge_tables = count, p = config.p, q = config.q, "preprocessed transition probabilities");

        Ok(Self {
            index,
            node_tables,
            edge_tables,
            config: *config,
        })
    }

    /// First-step table of `node`. Empty when `node` has no neighbors.
    pub fn node_table(&self, node: &N) -> Result<&AliasTable> {
        Ok(&self.node_tables[self.index.slot(node)?])
    }

    /// Table used at `cur` after arriving from `prev`.
    pub fn edge_table(&self, prev: &N, cur: &N) -> Result<&AliasTable> {
        let u = self.index.slot(prev)?;
        let v = self.index.slot(cur)?;
        let j = self
            .index
            .position(u, v)
            .ok_or_else(|| Error::UnknownNode(format!("edge ({prev:?}, {cur:?})")))?;
        Ok(&self.edge_tables[u][j])
    }

    /// Neighbors of `node` in the order table indices refer to.
    pub fn neighbors(&self, node: &N) -> Result<Vec<&N>> {
        let u = self.index.slot(node)?;
        Ok(self.index.neighbors[u]
            .iter()
            .map(|&v| &self.index.nodes[v])
            .collect())
    }

    /// Nodes in the graph's enumeration order.
    pub fn nodes(&self) -> &[N] {
        &self.index.nodes
    }

    pub fn node_count(&self) -> usize {
        self.index.nodes.len()
    }

    pub fn edge_table_count(&self) -> usize {
        self.edge_tables.iter().map(Vec::len).sum()
    }

    pub fn p(&self) -> f64 {
        self.config.p
    }

    pub fn q(&self) -> f64 {
        self.config.q
    }

    pub fn is_directed(&self) -> bool {
        self.config.directed
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }
}

fn edge_table_from_index<N: Clone + Eq + Hash + Ord + Debug>(
    index: &AdjacencyIndex<N>,
    prev: usize,
    cur: usize,
    p: f64,
    q: f64,
    buf: &mut Vec<f64>,
) -> Result<AliasTable> {
    let nbrs = &index.neighbors[cur];
    if nbrs.is_empty() {
        return Ok(AliasTable::empty());
    }

    buf.clear();
    buf.extend(
        nbrs.iter()
            .zip(&index.weights[cur])
            .map(|(&x, &w)| biased(w, x == prev, index.has_arc(x, prev), p, q)),
    );

    AliasTable::from_weights(buf).map_err(|e| {
        Error::distribution(
            format!("edge ({:?}, {:?})", index.nodes[prev], index.nodes[cur]),
            e,
        )
    })
}

fn sorted_neighbors<G: Graph>(graph: &G, node: &G::Node) -> Result<Vec<(G::Node, f64)>> {
    let mut nbrs = graph.neighbors(node);
    nbrs.sort();
    nbrs.into_iter()
        .map(|nbr| {
            let w = graph
                .edge_weight(node, &nbr)
                .ok_or_else(|| Error::UnknownNode(format!("edge ({node:?}, {nbr:?})")))?;
            Ok((nbr, w))
        })
        .collect()
}

/// First-step tables straight from a graph, keyed by node.
///
/// Nodes without neighbors map to an empty table.
pub fn build_node_tables<G: Graph>(graph: &G) -> Result<HashMap<G::Node, AliasTable>> {
    let mut tables = HashMap::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let weights: Vec<f64> = sorted_neighbors(graph, &node)?
            .into_iter()
            .map(|(_, w)| w)
            .collect();
        let table = if weights.is_empty() {
            AliasTable::empty()
        } else {
            AliasTable::from_weights(&weights)
                .map_err(|e| Error::distribution(format!("node {node:?}"), e))?
        };
        tables.insert(node, table);
    }
    Ok(tables)
}

/// Unnormalized second-order weights of `cur`'s neighbors after arriving from
/// `prev`, in table order.
pub fn edge_bias_weights<G: Graph>(
    graph: &G,
    prev: &G::Node,
    cur: &G::Node,
    p: f64,
    q: f64,
) -> Result<Vec<(G::Node, f64)>> {
    check_bias(p, q)?;
    Ok(sorted_neighbors(graph, cur)?
        .into_iter()
        .map(|(x, w)| {
            let b = biased(w, &x == prev, graph.has_edge(&x, prev), p, q);
            (x, b)
        })
        .collect())
}

/// Second-order table for the edge `(prev, cur)` straight from a graph.
pub fn build_edge_table<G: Graph>(
    graph: &G,
    prev: &G::Node,
    cur: &G::Node,
    p: f64,
    q: f64,
) -> Result<AliasTable> {
    let weights: Vec<f64> = edge_bias_weights(graph, prev, cur, p, q)?
        .into_iter()
        .map(|(_, w)| w)
        .collect();
    if weights.is_empty() {
        return Ok(AliasTable::empty());
    }
    AliasTable::from_weights(&weights)
        .map_err(|e| Error::distribution(format!("edge ({prev:?}, {cur:?})"), e))
}
