//! Tuning/state store and bound tracking for one solve.

mod bounds;
mod params;

pub use bounds::BoundHistory;
pub use params::BcdParams;
