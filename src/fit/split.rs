//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::AppError;

/// Minimum rows needed before splitting and in the train partition.
pub const MIN_ROWS: usize = 2;

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with a seeded RNG and hold out `ceil(n * test_fraction)` rows.
///
/// Identical `(n_rows, test_fraction, seed)` always yields identical partitions.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> Result<Split, AppError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AppError::InvalidConfig(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    if n_rows < MIN_ROWS {
        return Err(AppError::InsufficientData {
            stage: "train/test split",
            rows: n_rows,
            needed: MIN_ROWS,
        });
    }

    let n_test = ((n_rows as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.clamp(1, n_rows - 1);
    let n_train = n_rows - n_test;
    if n_train < MIN_ROWS {
        return Err(AppError::InsufficientData {
            stage: "model fit (train partition)",
            rows: n_train,
            needed: MIN_ROWS,
        });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    tracing::info!(train = train.len(), test = indices.len(), seed, "split rows");

    Ok(Split {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let a = train_test_split(100, 0.2, 42).unwrap();
        let b = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.test.len(), 20);
        assert_eq!(a.train.len(), 80);

        let c = train_test_split(100, 0.2, 7).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn partitions_cover_every_row_once() {
        let split = train_test_split(37, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 8);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn single_row_is_insufficient() {
        match train_test_split(1, 0.2, 42) {
            Err(AppError::InsufficientData { rows, needed, .. }) => {
                assert_eq!(rows, 1);
                assert_eq!(needed, 2);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
        assert!(matches!(train_test_split(0, 0.2, 42), Err(AppError::InsufficientData { .. })));
    }

    #[test]
    fn two_rows_leave_too_small_a_train_partition() {
        assert!(matches!(
            train_test_split(2, 0.2, 42),
            Err(AppError::InsufficientData { rows: 1, .. })
        ));
        let split = train_test_split(3, 0.2, 42).unwrap();
        assert_eq!((split.train.len(), split.test.len()), (2, 1));
    }
}
