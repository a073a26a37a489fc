//! Spatial partitioning data structures
//!
//! Provides the uniform bump grid used by the broad phase to find nearby
//! characters and particles.

mod bump_grid;

pub use bump_grid::{Bucket, BumpGrid, CellId, IndexStats};
