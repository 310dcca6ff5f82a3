//! Single biased walks over a preprocessed [`TransitionModel`].

use std::fmt::{Debug, Display};
use std::hash::Hash;

use rand::Rng;

use crate::error::{Error, Result};
use crate::transition::TransitionModel;

/// Node sequence starting at the walk's start node.
pub type Walk<N> = Vec<N>;

/// Simulate one walk of at most `walk_length` nodes from `start`.
///
/// The first step samples from `start`'s node table, every later step from
/// the table of the edge just traversed. The walk ends early at a node with
/// no neighbors, so an isolated start yields `[start]`.
///
/// # Errors
/// * [`Error::InvalidParameter`] if `walk_length` is zero.
/// * [`Error::UnknownNode`] if `start` is not in the model.
pub fn walk<N, R>(model: &TransitionModel<N>, walk_length: usize, start: &N, rng: &mut R) -> Result<Walk<N>>
where
    N: Clone + Eq + Hash + Ord + Debug,
    R: Rng + ?Sized,
{
    if walk_length == 0 {
        return Err(Error::InvalidParameter("walk_length must be at least 1".into()));
    }
    let slot = model.index.slot(start)?;
    Ok(walk_from_slot(model, slot, walk_length, rng))
}

pub(crate) fn walk_from_slot<N, R>(
    model: &TransitionModel<N>,
    start: usize,
    walk_length: usize,
    rng: &mut R,
) -> Walk<N>
where
    N: Clone,
    R: Rng + ?Sized,
{
    let index = &model.index;
    let mut walk = Vec::with_capacity(walk_length);
    walk.push(index.nodes[start].clone());

    let mut cur = start;
    // (prev, slot of cur in prev's neighbor list)
    let mut arrived: Option<(usize, usize)> = None;

    while walk.len() < walk_length {
        let nbrs = &index.neighbors[cur];
        if nbrs.is_empty() {
            break;
        }

        let table = match arrived {
            None => &model.node_tables[cur],
            Some((prev, j)) => &model.edge_tables[prev][j],
        };
        let k = table.sample_index(rng);
        let next = nbrs[k];

        walk.push(index.nodes[next].clone());
        arrived = Some((cur, k));
        cur = next;
    }

    walk
}

/// Render a walk as strings, the form sequence-embedding trainers consume.
pub fn render<N: Display>(walk: &[N]) -> Vec<String> {
    walk.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AdjacencyGraph, Graph};
    use rand::{SeedableRng, rngs::StdRng};

    fn complete(n: u32) -> AdjacencyGraph<u32> {
        let mut g = AdjacencyGraph::undirected();
        for i in 0..n {
            for j in (i + 1)..n {
                g.add_unweighted_edge(i, j);
            }
        }
        g
    }

    #[test]
    fn complete_graph_walks_reach_full_length() {
        let g = complete(5);
        let model = TransitionModel::preprocess(&g, false, 0.5, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for start in 0..5 {
            for len in [1, 2, 7, 40] {
                let w = walk(&model, len, &start, &mut rng).unwrap();
                assert_eq!(w.len(), len);
                assert_eq!(w[0], start);
            }
        }
    }

    #[test]
    fn steps_follow_edges() {
        let g = AdjacencyGraph::from_unweighted_edges(false, [(0u32, 1u32), (1, 2), (2, 3), (3, 1)]);
        let model = TransitionModel::preprocess(&g, false, 1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let w = walk(&model, 12, &0, &mut rng).unwrap();
            for pair in w.windows(2) {
                assert!(g.edge_weight(&pair[0], &pair[1]).is_some(), "{pair:?}");
            }
        }
    }

    #[test]
    fn isolated_start_is_a_single_node_walk() {
        let mut g = AdjacencyGraph::undirected();
        g.add_node("lonely");
        g.add_unweighted_edge("a", "b");
        let model = TransitionModel::preprocess(&g, false, 1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(walk(&model, 10, &"lonely", &mut rng).unwrap(), vec!["lonely"]);
    }

    #[test]
    fn directed_walk_stops_at_sink() {
        let g = AdjacencyGraph::from_unweighted_edges(true, [(1u32, 2u32), (2, 3)]);
        let model = TransitionModel::preprocess(&g, true, 1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(walk(&model, 10, &1, &mut rng).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn high_return_bias_backtracks() {
        // Star around 0: with tiny p every second step returns to the hub.
        let g = AdjacencyGraph::from_unweighted_edges(false, [(0u32, 1u32), (0, 2), (0, 3), (1, 2)]);
        let model = TransitionModel::preprocess(&g, false, 1e-9, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let w = walk(&model, 9, &3, &mut rng).unwrap();
        assert_eq!(w, vec![3, 0, 3, 0, 3, 0, 3, 0, 3]);
    }

    #[test]
    fn errors() {
        let g = complete(3);
        let model = TransitionModel::preprocess(&g, false, 1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(walk(&model, 0, &0, &mut rng), Err(Error::InvalidParameter(_))));
        assert!(matches!(walk(&model, 5, &42, &mut rng), Err(Error::UnknownNode(_))));
    }

    #[test]
    fn same_seed_same_walk() {
        let g = complete(6);
        let model = TransitionModel::preprocess(&g, false, 2.0, 0.5).unwrap();
        let a = walk(&model, 30, &2, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = walk(&model, 30, &2, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
        assert_eq!(render(&a[..2]), vec![a[0].to_string(), a[1].to_string()]);
    }
}
