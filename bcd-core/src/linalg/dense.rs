//! Dense vector kernels.

#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(ai, bi)| ai * bi).sum()
}

#[inline]
pub fn norm2(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Euclidean distance between two vectors of equal length.
#[inline]
pub fn dist2(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| (ai - bi) * (ai - bi))
        .sum::<f64>()
        .sqrt()
}

/// Componentwise `max(v, 0)` in place.
#[inline]
pub fn project_nonneg(v: &mut [f64]) {
    for vi in v.iter_mut() {
        // NaN maps to 0 as well
        if !(*vi > 0.0) {
            *vi = 0.0;
        }
    }
}

/// `max(v, 0)` as a new vector.
pub fn positive_part(v: &[f64]) -> Vec<f64> {
    let mut out = v.to_vec();
    project_nonneg(&mut out);
    out
}

#[inline]
pub fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norms() {
        assert!((norm2(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert!((dist2(&[1.0, 0.0], &[0.0, 1.0]) - 2f64.sqrt()).abs() < 1e-12);
        assert!((dot(&[1.0, 2.0], &[3.0, 4.0]) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_positive_part() {
        assert_eq!(positive_part(&[-1.0, 0.0, 2.5]), vec![0.0, 0.0, 2.5]);

        let mut v = vec![f64::NAN, -0.0, 1.0];
        project_nonneg(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 1.0]);
    }
}
