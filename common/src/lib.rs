//! Shared surface of the discrete spatial indexes: positions and inclusive
//! AABBs on a 2D power-of-two grid, batch entry records, grid resolutions,
//! the Morton (Z-order) codec, and the [`SpatialIndex`] contract the index
//! crates implement.

pub mod index;
pub mod morton;
pub mod resolution;
pub mod types;

pub use index::SpatialIndex;
pub use morton::MortonCode;
pub use resolution::Resolution;
pub use types::{Aabb, EntriesMove, Entry, Pos};
