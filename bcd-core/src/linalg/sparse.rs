//! Sparse matrix types and operations.
//!
//! Linking sub-matrices `A_idx` are stored in CSC (Compressed Sparse Column)
//! format: one column per 0-1 decision variable of the block, so `A_idx x_idx`
//! for a 0-1 vector is a sum of the selected columns.

use sprs::{CsMat, TriMat};

use crate::error::{BcdError, BcdResult};

/// Sparse matrix in CSC format.
pub type SparseCsc = CsMat<f64>;

/// Build a sparse CSC matrix from triplets (row, col, value).
///
/// Duplicate entries are summed.
pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> SparseCsc
where
    I: IntoIterator<Item = (usize, usize, f64)>,
{
    let mut tri = TriMat::new((nrows, ncols));
    for (i, j, v) in triplets {
        tri.add_triplet(i, j, v);
    }
    tri.to_csc()
}

/// Build an `nrows × ncols` CSC matrix from dense rows.
///
/// Every row must have exactly `ncols` entries.
pub fn from_dense_rows(rows: &[Vec<f64>], ncols: usize) -> BcdResult<SparseCsc> {
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
        return Err(BcdError::Configuration(format!(
            "dense row {} has {} entries, expected {}",
            i,
            row.len(),
            ncols
        )));
    }
    let triplets = rows.iter().enumerate().flat_map(|(i, row)| {
        row.iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(move |(j, &v)| (i, j, v))
    });
    Ok(from_triplets(rows.len(), ncols, triplets))
}

/// Sparse matrix-vector product: y = alpha * A * x + beta * y
pub fn spmv(a: &SparseCsc, x: &[f64], y: &mut [f64], alpha: f64, beta: f64) {
    assert_eq!(a.cols(), x.len());
    assert_eq!(a.rows(), y.len());

    if beta == 0.0 {
        y.fill(0.0);
    } else if beta != 1.0 {
        for yi in y.iter_mut() {
            *yi *= beta;
        }
    }

    if alpha != 0.0 {
        for (col_idx, col) in a.outer_iterator().enumerate() {
            let xj = x[col_idx];
            if xj == 0.0 {
                continue;
            }
            for (row, &val) in col.iter() {
                y[row] += alpha * val * xj;
            }
        }
    }
}

/// Transpose-vector product: y = alpha * A^T * x + beta * y
pub fn spmv_transpose(a: &SparseCsc, x: &[f64], y: &mut [f64], alpha: f64, beta: f64) {
    assert_eq!(a.rows(), x.len());
    assert_eq!(a.cols(), y.len());

    if beta == 0.0 {
        y.fill(0.0);
    } else if beta != 1.0 {
        for yi in y.iter_mut() {
            *yi *= beta;
        }
    }

    // For CSC, A^T is equivalent to treating columns as rows
    if alpha != 0.0 {
        for (col_idx, col) in a.outer_iterator().enumerate() {
            let mut acc = 0.0;
            for (row, &val) in col.iter() {
                acc += val * x[row];
            }
            y[col_idx] += alpha * acc;
        }
    }
}

/// Squared Frobenius norm (sum of squared stored entries).
pub fn frobenius_norm_sq(a: &SparseCsc) -> f64 {
    a.data().iter().map(|v| v * v).sum()
}

/// Copy column `col` into a dense vector of length `a.rows()`.
pub fn dense_column(a: &SparseCsc, col: usize) -> Vec<f64> {
    let mut out = vec![0.0; a.rows()];
    if let Some(view) = a.outer_view(col) {
        for (row, &val) in view.iter() {
            out[row] = val;
        }
    }
    out
}
