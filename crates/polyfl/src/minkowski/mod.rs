//! Minkowski sum and difference.

mod diff;
mod sum;


pub use diff::minkowski_difference;
pub use sum::minkowski_sum;
