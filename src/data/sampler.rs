//! Uniform sampling of dataset rows without replacement, across runs.
//!
//! The used set is seeded from the checkpoint, so a resumed campaign never
//! draws a row that an earlier run already consumed.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("All {table_len} bolt dimensions have been used ({used} used indices); no more unique bolts can be created.")]
    Exhausted { table_len: usize, used: usize },
}

/// Tracks consumed row indices and draws unused ones.
#[derive(Debug, Clone)]
pub struct UnusedIndexSampler {
    table_len: usize,
    used: BTreeSet<usize>,
}

impl UnusedIndexSampler {
    /// `used` may contain indices beyond `table_len` (a smaller table than last run);
    /// they are kept so the checkpoint does not lose them, but they are never drawn.
    pub fn new(table_len: usize, used: impl IntoIterator<Item = usize>) -> Self {
        Self {
            table_len,
            used: used.into_iter().collect(),
        }
    }

    pub fn table_len(&self) -> usize {
        self.table_len
    }

    pub fn used(&self) -> &BTreeSet<usize> {
        &self.used
    }

    pub fn unused_indices(&self) -> Vec<usize> {
        (0..self.table_len)
            .filter(|idx| !self.used.contains(idx))
            .collect()
    }

    pub fn unused_count(&self) -> usize {
        let used_in_range = self.used.range(..self.table_len).count();
        self.table_len - used_in_range
    }

    /// Pick a uniformly random unused index and mark it used.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, SampleError> {
        let available = self.unused_indices();
        let &index = available.choose(rng).ok_or(SampleError::Exhausted {
            table_len: self.table_len,
            used: self.used.len(),
        })?;
        self.used.insert(index);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn draws_are_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sampler = UnusedIndexSampler::new(50, []);
        let mut seen = HashSet::new();

        for _ in 0..50 {
            let idx = sampler.draw(&mut rng).unwrap();
            assert!(idx < 50);
            assert!(seen.insert(idx), "index {idx} drawn twice");
        }
        assert_eq!(sampler.unused_count(), 0);
    }

    #[test]
    fn resumed_sampler_skips_seeded_indices() {
        let seeded: Vec<usize> = (0..30).step_by(2).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let mut sampler = UnusedIndexSampler::new(30, seeded.clone());
        assert_eq!(sampler.unused_count(), 15);

        for _ in 0..15 {
            let idx = sampler.draw(&mut rng).unwrap();
            assert!(!seeded.contains(&idx));
        }
        assert_eq!(sampler.used().len(), 30);
    }

    #[test]
    fn exhausted_sampler_fails_immediately() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sampler = UnusedIndexSampler::new(3, [0, 1, 2]);

        let err = sampler.draw(&mut rng).unwrap_err();
        assert_eq!(err, SampleError::Exhausted { table_len: 3, used: 3 });
        // Repeated calls keep failing the same way.
        assert_eq!(sampler.draw(&mut rng).unwrap_err(), err);
    }

    #[test]
    fn out_of_range_indices_are_kept_but_not_counted() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sampler = UnusedIndexSampler::new(2, [0, 9]);
        assert_eq!(sampler.unused_count(), 1);
        assert_eq!(sampler.draw(&mut rng).unwrap(), 1);
        assert!(sampler.draw(&mut rng).is_err());
        assert!(sampler.used().contains(&9));
    }
}
