//! Walker's Alias Method for O(1) sampling from a discrete distribution.

use crate::error::ProbError;
use rand::Rng;

/// Probabilities passed to [`AliasTable::new`] must sum to 1.0 within this.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// Alias table for discrete distribution sampling.
///
/// Index `k` keeps itself with probability `prob[k]` and redirects to
/// `alias[k]` otherwise. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    prob: Vec<f64>,
    alias: Vec<usize>,
}

impl AliasTable {
    /// Build from a probability vector that already sums to 1.0.
    ///
    /// # Errors
    /// * [`ProbError::Empty`] if `probs` is empty.
    /// * [`ProbError::Negative`] / [`ProbError::NonFinite`] on a bad entry.
    /// * [`ProbError::ZeroSum`] if every entry is zero.
    /// * [`ProbError::NotNormalized`] if the sum is off by more than
    ///   [`NORMALIZATION_TOLERANCE`].
    pub fn new(probs: &[f64]) -> Result<Self, ProbError> {
        let sum = checked_sum(probs)?;
        if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
            return Err(ProbError::NotNormalized { sum });
        }
        // Rescale by the actual sum anyway so rounding drift never leaks in.
        Ok(Self::construct(probs, sum))
    }

    /// Build from non-negative, unnormalized weights. O(n).
    pub fn from_weights(weights: &[f64]) -> Result<Self, ProbError> {
        let sum = checked_sum(weights)?;
        Ok(Self::construct(weights, sum))
    }

    /// The table of a node with no outgoing edges. Never sampled.
    pub const fn empty() -> Self {
        Self {
            prob: Vec::new(),
            alias: Vec::new(),
        }
    }

    fn construct(weights: &[f64], sum: f64) -> Self {
        let n = weights.len();

        // Scale so average is 1.
        let mut scaled: Vec<f64> = weights.iter().map(|&w| w * n as f64 / sum).collect();

        let mut prob = vec![0.0f64; n];
        let mut alias = (0..n).collect::<Vec<_>>();

        let mut small = Vec::with_capacity(n);
        let mut large = Vec::with_capacity(n);

        // Exactly 1.0 counts as large.
        for (i, &p) in scaled.iter().enumerate() {
            if p < 1.0 {
                small.push(i);
            } else {
                large.push(i);
            }
        }

        // Peek before popping so neither bucket loses an index when the other runs dry.
        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            large.pop();
            prob[s] = scaled[s]; // in [0,1)
            alias[s] = l;

            scaled[l] = (scaled[l] + scaled[s]) - 1.0;

            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // Unpaired indices hold 1.0 up to rounding: keep themselves always.
        for i in small.into_iter().chain(large) {
            prob[i] = 1.0;
            alias[i] = i;
        }

        Self { prob, alias }
    }

    /// Draw a single sample in O(1), consuming exactly two uniform draws.
    ///
    /// # Panics
    /// If the table is empty.
    #[inline]
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.prob.len();
        let i = rng.random_range(0..n);
        let u: f64 = rng.random();
        if u < self.prob[i] { i } else { self.alias[i] }
    }

    /// Draw k samples, returning counts per index (useful for checks).
    #[cfg(test)]
    pub(crate) fn sample_counts<R: Rng + ?Sized>(&self, rng: &mut R, draws: usize) -> Vec<usize> {
        let mut counts = vec![0usize; self.prob.len()];
        for _ in 0..draws {
            counts[self.sample_index(rng)] += 1;
        }
        counts
    }

    /// Keep-thresholds, one per outcome.
    pub fn probs(&self) -> &[f64] {
        &self.prob
    }

    /// Redirect targets, one per outcome.
    pub fn aliases(&self) -> &[usize] {
        &self.alias
    }

    pub fn len(&self) -> usize {
        self.prob.len()
    }
    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }
}

fn checked_sum(weights: &[f64]) -> Result<f64, ProbError> {
    if weights.is_empty() {
        return Err(ProbError::Empty);
    }

    let mut sum = 0.0f64;
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() {
            return Err(ProbError::NonFinite { index, value });
        }
        if value < 0.0 {
            return Err(ProbError::Negative { index, value });
        }
        sum += value;
    }
    if !sum.is_finite() {
        return Err(ProbError::NonFinite {
            index: weights.len() - 1,
            value: sum,
        });
    }
    if sum == 0.0 {
        return Err(ProbError::ZeroSum);
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_pcg::Pcg32;

    fn normalized(weights: &[f64]) -> Vec<f64> {
        let sum: f64 = weights.iter().sum();
        weights.iter().map(|w| w / sum).collect()
    }

    fn assert_frequencies(probs: &[f64], seed: u64) {
        let alias = AliasTable::new(probs).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let draws = 200_000usize;
        let counts = alias.sample_counts(&mut rng, draws);
        for (i, &c) in counts.iter().enumerate() {
            let emp = c as f64 / draws as f64;
            assert!(
                (emp - probs[i]).abs() < 0.01,
                "k={} i={i} emp={emp} p={}",
                probs.len(),
                probs[i]
            );
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(AliasTable::new(&[]), Err(ProbError::Empty)));
        assert!(matches!(
            AliasTable::from_weights(&[0.0, 0.0]),
            Err(ProbError::ZeroSum)
        ));
        assert!(matches!(
            AliasTable::new(&[-0.1, 1.1]),
            Err(ProbError::Negative { index: 0, .. })
        ));
        assert!(matches!(
            AliasTable::from_weights(&[1.0, f64::NAN]),
            Err(ProbError::NonFinite { index: 1, .. })
        ));
        assert!(matches!(
            AliasTable::new(&[0.2, 0.2]),
            Err(ProbError::NotNormalized { .. })
        ));
    }

    #[test]
    fn matches_distribution_across_sizes() {
        assert_frequencies(&[1.0], 1);
        assert_frequencies(&[0.3, 0.7], 2);
        let ten: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        assert_frequencies(&normalized(&ten), 3);
        let hundred: Vec<f64> = (0..100).map(|i| 1.0 + (i % 7) as f64).collect();
        assert_frequencies(&normalized(&hundred), 4);
    }

    #[test]
    fn matches_skewed_distribution() {
        let mut weights = vec![1.0; 10];
        weights[3] = 500.0;
        assert_frequencies(&normalized(&weights), 5);

        let mut weights = vec![1.0; 100];
        weights[99] = 1_000.0;
        assert_frequencies(&normalized(&weights), 6);
    }

    #[test]
    fn two_outcome_table_layout() {
        // [0.8, 0.2] scales to [1.6, 0.4]: index 1 keeps 0.4 and donates to 0.
        let alias = AliasTable::new(&[0.8, 0.2]).unwrap();
        assert_eq!(alias.aliases(), &[0, 0]);
        assert!((alias.probs()[0] - 1.0).abs() < 1e-12);
        assert!((alias.probs()[1] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn exact_one_is_treated_as_large() {
        let alias = AliasTable::new(&[0.5, 0.5]).unwrap();
        assert_eq!(alias.probs(), &[1.0, 1.0]);
        assert_eq!(alias.aliases(), &[0, 1]);
    }

    #[test]
    fn unpaired_indices_keep_probability_one() {
        let single = AliasTable::new(&[1.0]).unwrap();
        assert_eq!(single.probs(), &[1.0]);
        assert_eq!(single.aliases(), &[0]);

        // [0.3, 0.7] scales to [0.6, 1.4]; after pairing, index 1 is left alone.
        let pair = AliasTable::new(&[0.3, 0.7]).unwrap();
        assert_eq!(pair.aliases(), &[1, 1]);
        assert!((pair.probs()[0] - 0.6).abs() < 1e-12);
        assert_eq!(pair.probs()[1], 1.0);
    }

    #[test]
    fn same_seed_same_draws() {
        let alias = AliasTable::from_weights(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        let xs: Vec<usize> = (0..1_000).map(|_| alias.sample_index(&mut a)).collect();
        let ys: Vec<usize> = (0..1_000).map(|_| alias.sample_index(&mut b)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn degenerate_singleton() {
        let alias = AliasTable::from_weights(&[5.0]).unwrap();
        let mut rng = rand::rng();
        for _ in 0..1000 {
            assert_eq!(alias.sample_index(&mut rng), 0);
        }
    }

    #[test]
    fn zero_weight_outcome_is_never_drawn() {
        let alias = AliasTable::from_weights(&[0.0, 1.0, 0.0, 3.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let counts = alias.sample_counts(&mut rng, 50_000);
        assert_eq!(counts[0], 0);
        assert_eq!(counts[2], 0);
    }
}
