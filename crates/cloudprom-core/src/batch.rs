//! Splitting a series set into bounded query batches.

use crate::error::{CloudPromError, Result};

/// Partition `items` into consecutive chunks of at most `batch_size`.
///
/// Order is preserved; every item lands in exactly one chunk and only the
/// last chunk may be short.
pub fn split_by_batch<T: Clone>(items: &[T], batch_size: usize) -> Result<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(CloudPromError::InvalidArgument(
            "batch size must be greater than zero".into(),
        ));
    }
    Ok(items.chunks(batch_size).map(<[T]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_coverage() {
        for n in 0..12usize {
            for b in 1..6usize {
                let items: Vec<usize> = (0..n).collect();
                let batches = split_by_batch(&items, b).unwrap();
                assert_eq!(batches.len(), n.div_ceil(b), "n={n} b={b}");
                if let Some((last, full)) = batches.split_last() {
                    assert!(full.iter().all(|c| c.len() == b));
                    assert!(!last.is_empty() && last.len() <= b);
                }
                let flat: Vec<usize> = batches.into_iter().flatten().collect();
                assert_eq!(flat, items);
            }
        }
    }

    #[test]
    fn zero_batch_size_is_invalid() {
        let err = split_by_batch(&[1, 2, 3], 0).unwrap_err();
        assert_eq!(err.kind().as_str(), "INVALID_ARGUMENT");
    }
}
