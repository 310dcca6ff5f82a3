//! Walk generation sharded across rayon workers.
//!
//! Invariant: output is identical for a fixed `seed`, independent of the
//! number of threads. Every epoch's node order and every walk draw from their
//! own `Pcg64` stream derived from the seed, so no generator is shared.

use std::fmt::Debug;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use tracing::info;

use crate::campaign::WalkCampaign;
use crate::error::Result;
use crate::transition::TransitionModel;
use crate::walk::{Walk, walk_from_slot};

fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

// Distinct PCG stream selectors keep epoch shuffles and walks apart for every seed.
const SHUFFLE_STREAM: u128 = 0x5348_5546_464c_4521;
const WALK_STREAM: u128 = 0x5741_4c4b_5354_4550;

fn shuffle_rng(seed: u64, epoch: u64) -> Pcg64 {
    Pcg64::new(u128::from(mix64(seed ^ epoch)), SHUFFLE_STREAM)
}

fn walk_rng(seed: u64, job: u64) -> Pcg64 {
    let hi = u128::from(mix64(seed));
    let lo = u128::from(mix64(seed ^ mix64(job)));
    Pcg64::new((hi << 64) | lo, WALK_STREAM)
}

/// Generate every walk of `campaign` in parallel, in epoch order.
///
/// Unlike [`WalkCampaign::generate`] this materializes all walks.
pub fn generate_parallel<N>(
    model: &TransitionModel<N>,
    campaign: &WalkCampaign,
    seed: u64,
) -> Result<Vec<Walk<N>>>
where
    N: Clone + Eq + Hash + Ord + Debug + Send + Sync,
{
    campaign.validate()?;
    let n = model.node_count();
    info!(nodes = n, num_walks = campaign.num_walks, "parallel walk generation");

    let mut order: Vec<usize> = (0..n).collect();
    let mut jobs: Vec<usize> = Vec::with_capacity(n * campaign.num_walks);
    for epoch in 0..campaign.num_walks as u64 {
        if campaign.shuffle {
            order.shuffle(&mut shuffle_rng(seed, epoch));
        }
        jobs.extend_from_slice(&order);
    }

    let walk_length = campaign.walk_length;
    Ok(jobs
        .par_iter()
        .enumerate()
        .map(|(i, &start)| {
            let mut rng = walk_rng(seed, i as u64);
            walk_from_slot(model, start, walk_length, &mut rng)
        })
        .collect())
}
