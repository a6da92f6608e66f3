//! Vector math for centroid scoring.

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when either vector has zero norm or the dimensions differ,
/// so a degenerate embedding never produces NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Elementwise arithmetic mean of a set of vectors.
///
/// Dimension comes from the first vector. Returns `None` for an empty set.
pub fn centroid<'a, I>(vectors: I) -> Option<Vec<f32>>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut vectors = vectors.into_iter();
    let first = vectors.next()?;

    let mut sums: Vec<f64> = first.iter().map(|x| *x as f64).collect();
    let mut count = 1usize;

    for vector in vectors {
        for (sum, x) in sums.iter_mut().zip(vector) {
            *sum += *x as f64;
        }
        count += 1;
    }

    Some(sums.into_iter().map(|s| (s / count as f64) as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let a = cosine_similarity(&[0.9, 0.1], &[1.0, 0.0]);
        let b = cosine_similarity(&[9.0, 1.0], &[3.0, 0.0]);
        assert!((a - b).abs() < 1e-9);
        assert!((a - 0.9939).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let score = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]);
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
    }

    #[test]
    fn test_cosine_dimension_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_centroid_is_elementwise_mean() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [3.0f32, 4.0, 5.0];
        let c = centroid([&a[..], &b[..]]).unwrap();
        assert_eq!(c, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_centroid_single_vector_is_itself() {
        let a = [0.25f32, -0.5];
        assert_eq!(centroid([&a[..]]).unwrap(), vec![0.25, -0.5]);
    }

    #[test]
    fn test_centroid_is_deterministic() {
        let vectors: Vec<Vec<f32>> = (0..50)
            .map(|i| (0..8).map(|j| ((i * 7 + j * 3) % 11) as f32 * 0.137).collect())
            .collect();

        let first = centroid(vectors.iter().map(Vec::as_slice)).unwrap();
        let second = centroid(vectors.iter().map(Vec::as_slice)).unwrap();

        let first_bits: Vec<u32> = first.iter().map(|x| x.to_bits()).collect();
        let second_bits: Vec<u32> = second.iter().map(|x| x.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }

    #[test]
    fn test_centroid_empty_is_none() {
        assert!(centroid(std::iter::empty::<&[f32]>()).is_none());
    }
}
