//! Re-exports [`fastvec`]'s spilling vector.
//!
//! It's a high-performance vector crate tuned for small data sizes,
//! which fits handler snapshots.

pub use fastvec::FastVec;
