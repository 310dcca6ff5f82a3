//! Repeated walk generation over every node of a model.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::transition::TransitionModel;
use crate::walk::{Walk, render, walk_from_slot};

/// How many walks to start from each node, how long they are, and whether
/// node order is reshuffled every epoch.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkCampaign {
    /// Epochs, i.e. walks per node.
    pub num_walks: usize,
    /// Maximum nodes per walk.
    pub walk_length: usize,
    pub shuffle: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    passes: AtomicUsize,
}

impl Default for WalkCampaign {
    fn default() -> Self {
        Self::new(10, 80, true)
    }
}

impl Clone for WalkCampaign {
    fn clone(&self) -> Self {
        Self::new(self.num_walks, self.walk_length, self.shuffle)
    }
}

impl WalkCampaign {
    pub fn new(num_walks: usize, walk_length: usize, shuffle: bool) -> Self {
        Self {
            num_walks,
            walk_length,
            shuffle,
            passes: AtomicUsize::new(0),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_walks == 0 {
            return Err(Error::InvalidParameter("num_walks must be at least 1".into()));
        }
        if self.walk_length == 0 {
            return Err(Error::InvalidParameter("walk_length must be at least 1".into()));
        }
        Ok(())
    }

    /// Total walks a single pass yields over `model`.
    pub fn total_walks<N>(&self, model: &TransitionModel<N>) -> usize
    where
        N: Clone + Eq + Hash + Ord + Debug,
    {
        self.num_walks * model.node_count()
    }

    /// Number of times [`generate`](Self::generate) has been called.
    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::Relaxed)
    }

    /// Lazily produce `num_walks * node_count` walks.
    ///
    /// Each call starts a fresh pass; the only state carried between passes
    /// is whatever `rng` carries. Pass `&mut rng` to keep using the generator
    /// afterwards. Dropping the iterator early is fine.
    pub fn generate<'m, N, R>(&self, model: &'m TransitionModel<N>, rng: R) -> Result<Walks<'m, N, R>>
    where
        N: Clone + Eq + Hash + Ord + Debug,
        R: Rng,
    {
        self.validate()?;
        let pass = self.passes.fetch_add(1, Ordering::Relaxed);
        info!(pass, nodes = model.node_count(), num_walks = self.num_walks, "walk iteration");
        Ok(Walks {
            model,
            rng,
            order: (0..model.node_count()).collect(),
            num_walks: self.num_walks,
            walk_length: self.walk_length,
            shuffle: self.shuffle,
            epoch: 0,
            pos: 0,
        })
    }
}

/// Pull-based stream of walks, epoch by epoch.
#[derive(Debug)]
pub struct Walks<'m, N, R> {
    model: &'m TransitionModel<N>,
    rng: R,
    order: Vec<usize>,
    num_walks: usize,
    walk_length: usize,
    shuffle: bool,
    epoch: usize,
    pos: usize,
}

impl<'m, N, R> Walks<'m, N, R>
where
    N: Clone + Eq + Hash + Ord + Debug,
    R: Rng,
{
    /// Zero-based epoch the next walk belongs to.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// The same stream with every node rendered through `Display`.
    pub fn rendered(self) -> impl Iterator<Item = Vec<String>> + 'm
    where
        N: Display + 'm,
        R: 'm,
    {
        self.map(|w| render(&w))
    }

    fn remaining(&self) -> usize {
        if self.epoch >= self.num_walks {
            return 0;
        }
        (self.num_walks - self.epoch) * self.order.len() - self.pos
    }
}

impl<N, R> Iterator for Walks<'_, N, R>
where
    N: Clone + Eq + Hash + Ord + Debug,
    R: Rng,
{
    type Item = Walk<N>;

    fn next(&mut self) -> Option<Walk<N>> {
        if self.epoch >= self.num_walks || self.order.is_empty() {
            return None;
        }
        if self.pos == 0 {
            debug!(epoch = self.epoch + 1, num_walks = self.num_walks, "walk epoch");
            if self.shuffle {
                self.order.shuffle(&mut self.rng);
            }
        }

        let start = self.order[self.pos];
        let walk = walk_from_slot(self.model, start, self.walk_length, &mut self.rng);

        self.pos += 1;
        if self.pos == self.order.len() {
            self.pos = 0;
            self.epoch += 1;
        }
        Some(walk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<N, R> ExactSizeIterator for Walks<'_, N, R>
where
    N: Clone + Eq + Hash + Ord + Debug,
    R: Rng,
{
}

impl<N, R> FusedIterator for Walks<'_, N, R>
where
    N: Clone + Eq + Hash + Ord + Debug,
    R: Rng,
{
}
