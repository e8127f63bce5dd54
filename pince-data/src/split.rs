// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};

use pince_core::error::PinceError;

/// Train and validation indices of a dataset
///
/// The first `floor(split * len)` indices are used for training and the
/// remainder for validation. With a seed the indices are shuffled first,
/// so the same seed always yields the same split.
///
/// # Examples
///
/// ```
/// use pince_data::ValidationSplit;
///
/// let split = ValidationSplit::new(10, 0.8, None).unwrap();
/// assert_eq!(split.train(), &[0, 1, 2, 3, 4, 5, 6, 7]);
/// assert_eq!(split.validation(), &[8, 9]);
///
/// let a = ValidationSplit::new(100, 0.8, Some(123)).unwrap();
/// let b = ValidationSplit::new(100, 0.8, Some(123)).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSplit {
    indices: Vec<usize>,
    split: usize,
}

impl ValidationSplit {
    /// Split `len` indices into train and validation sets
    ///
    /// # Arguments
    ///
    /// * `len` - Number of images in the dataset
    /// * `split` - Fraction in [0, 1] of images used for training
    /// * `shuffle_seed` - Shuffle indices with this seed before splitting
    pub fn new(len: usize, split: f32, shuffle_seed: Option<u64>) -> Result<Self, PinceError> {
        if !(0.0..=1.0).contains(&split) {
            return Err(PinceError::InvalidInput(format!(
                "Split must lie in [0, 1], got {}",
                split
            )));
        }

        let mut indices: Vec<usize> = (0..len).collect();

        if let Some(seed) = shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }

        let split = ((split as f64 * len as f64).floor() as usize).min(len);

        Ok(Self { indices, split })
    }

    pub fn train(&self) -> &[usize] {
        &self.indices[..self.split]
    }

    pub fn validation(&self) -> &[usize] {
        &self.indices[self.split..]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = ValidationSplit::new(885, 0.8, Some(123)).unwrap();
        assert_eq!(split.train().len(), 708);
        assert_eq!(split.validation().len(), 177);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let split = ValidationSplit::new(50, 0.5, Some(7)).unwrap();

        let mut all: Vec<usize> = split
            .train()
            .iter()
            .chain(split.validation())
            .copied()
            .collect();
        all.sort();

        assert_eq!(all, (0..50).collect::<Vec<usize>>());
    }

    #[test]
    fn test_seeds_differ() {
        let a = ValidationSplit::new(100, 0.8, Some(1)).unwrap();
        let b = ValidationSplit::new(100, 0.8, Some(2)).unwrap();
        assert_ne!(a.validation(), b.validation());
    }

    #[test]
    fn test_split_bounds() {
        assert!(ValidationSplit::new(10, -0.1, None).is_err());
        assert!(ValidationSplit::new(10, 1.1, None).is_err());
        assert!(ValidationSplit::new(10, 1.0, None).unwrap().validation().is_empty());
        assert_eq!(ValidationSplit::new(10, 0.0, None).unwrap().validation().len(), 10);
        assert!(ValidationSplit::new(0, 0.8, Some(3)).unwrap().validation().is_empty());
    }
}
