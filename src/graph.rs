//! Graph adapter trait and a small in-memory weighted graph.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// What the walk sampler needs from a weighted graph.
///
/// Neighbors are returned in no particular order; the transition model sorts
/// them once by node identifier and keeps that order for sampling.
pub trait Graph {
    type Node: Clone + Eq + Hash + Ord + Debug;

    /// All nodes, in the graph's natural enumeration order.
    fn nodes(&self) -> Vec<Self::Node>;

    /// Out-neighbors of `node` (all neighbors if undirected). Unknown nodes
    /// have none.
    fn neighbors(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn edge_weight(&self, source: &Self::Node, target: &Self::Node) -> Option<f64>;

    fn has_edge(&self, source: &Self::Node, target: &Self::Node) -> bool {
        self.edge_weight(source, target).is_some()
    }

    fn is_directed(&self) -> bool;

    fn node_count(&self) -> usize {
        self.nodes().len()
    }
}

/// Adjacency-map graph keyed by arbitrary hashable node identifiers.
///
/// Nodes enumerate in insertion order. Adding an edge twice overwrites its
/// weight, so there is at most one edge per ordered pair.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph<N> {
    directed: bool,
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    adj: Vec<HashMap<usize, f64>>,
}

impl<N: Clone + Eq + Hash> AdjacencyGraph<N> {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            nodes: Vec::new(),
            index: HashMap::new(),
            adj: Vec::new(),
        }
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Insert `node` if missing and return its position in node order.
    pub fn add_node(&mut self, node: N) -> usize {
        if let Some(&i) = self.index.get(&node) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(node.clone(), i);
        self.nodes.push(node);
        self.adj.push(HashMap::new());
        i
    }

    /// Add `source -> target` (and the reverse when undirected).
    pub fn add_edge(&mut self, source: N, target: N, weight: f64) {
        let s = self.add_node(source);
        let t = self.add_node(target);
        self.adj[s].insert(t, weight);
        if !self.directed {
            self.adj[t].insert(s, weight);
        }
    }

    /// Add an edge with the default weight of 1.0.
    pub fn add_unweighted_edge(&mut self, source: N, target: N) {
        self.add_edge(source, target, 1.0);
    }

    pub fn from_edges<I>(directed: bool, edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N, f64)>,
    {
        let mut g = Self::new(directed);
        for (s, t, w) in edges {
            g.add_edge(s, t, w);
        }
        g
    }

    pub fn from_unweighted_edges<I>(directed: bool, edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
    {
        Self::from_edges(directed, edges.into_iter().map(|(s, t)| (s, t, 1.0)))
    }

    pub fn edge_count(&self) -> usize {
        let arcs: usize = self.adj.iter().map(HashMap::len).sum();
        if self.directed {
            arcs
        } else {
            let loops = self
                .adj
                .iter()
                .enumerate()
                .filter(|(i, nbrs)| nbrs.contains_key(i))
                .count();
            (arcs + loops) / 2
        }
    }
}

impl<N> Graph for AdjacencyGraph<N>
where
    N: Clone + Eq + Hash + Ord + Debug,
{
    type Node = N;

    fn nodes(&self) -> Vec<N> {
        self.nodes.clone()
    }

    fn neighbors(&self, node: &N) -> Vec<N> {
        match self.index.get(node) {
            Some(&i) => self.adj[i].keys().map(|&j| self.nodes[j].clone()).collect(),
            None => Vec::new(),
        }
    }

    fn edge_weight(&self, source: &N, target: &N) -> Option<f64> {
        let s = *self.index.get(source)?;
        let t = *self.index.get(target)?;
        self.adj[s].get(&t).copied()
    }

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undirected_edges_are_symmetric() {
        let g = AdjacencyGraph::from_edges(false, [("a", "b", 2.0), ("b", "c", 0.5)]);
        assert_eq!(g.edge_weight(&"b", &"a"), Some(2.0));
        assert!(g.has_edge(&"c", &"b"));
        assert!(!g.has_edge(&"a", &"c"));
        assert_eq!(g.edge_count(), 2);
        let mut nbrs = g.neighbors(&"b");
        nbrs.sort();
        assert_eq!(nbrs, vec!["a", "c"]);
    }

    #[test]
    fn directed_edges_are_one_way() {
        let g = AdjacencyGraph::from_unweighted_edges(true, [(1u32, 2u32), (2, 3)]);
        assert!(g.is_directed());
        assert_eq!(g.edge_weight(&1, &2), Some(1.0));
        assert_eq!(g.edge_weight(&2, &1), None);
        assert!(g.neighbors(&3).is_empty());
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn node_order_is_insertion_order() {
        let mut g = AdjacencyGraph::undirected();
        g.add_node(30u32);
        g.add_unweighted_edge(10, 20);
        g.add_node(10);
        assert_eq!(g.nodes(), vec![30, 10, 20]);
        assert!(g.neighbors(&99).is_empty());
    }

    #[test]
    fn repeated_edge_overwrites_weight() {
        let mut g = AdjacencyGraph::directed();
        g.add_edge('x', 'y', 1.0);
        g.add_edge('x', 'y', 4.0);
        assert_eq!(g.edge_weight(&'x', &'y'), Some(4.0));
        assert_eq!(g.edge_count(), 1);
    }
}
