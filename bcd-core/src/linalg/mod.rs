//! Linear algebra layer.
//!
//! Sparse linking-matrix products and the dense vector kernels used by the
//! block updates and outer diagnostics.

pub mod dense;
pub mod sparse;
