use crate::types::{Aabb, EntriesMove, Entry};

/// A discrete spatial index over a 2D power-of-two grid: at most one value
/// per integer cell, point lookups, AABB range queries, and bulk
/// insert/remove/move batches.
///
/// Invalid inputs are skipped silently rather than reported: out-of-bounds
/// positions, absent values on insert, removes aimed at empty space. `get`,
/// `query_range` and `count` are the authoritative outputs.
pub trait SpatialIndex<T> {
    /// Insert many values at once. Entries apply in input order, so a later
    /// entry overwrites an earlier one at the same cell.
    fn bulk_insert(&mut self, entries: &[Entry<T>]);

    /// Remove whatever is stored at the given positions. An entry carrying a
    /// value clears its cell only when the stored value compares equal.
    fn bulk_remove(&mut self, entries: &[Entry<T>]);

    /// Move values between cells; all removes apply before any insert.
    fn bulk_move(&mut self, moves: &EntriesMove<T>);

    /// Single lookup at (x, y). Out of bounds reads as absent.
    fn get(&self, x: u32, y: u32) -> Option<&T>;

    /// Fill a prefix of `out` with the values inside `aabb`, up to
    /// `out.len()`, and return the number written. Slots past the result are
    /// left `None`.
    fn query_range(&self, aabb: Aabb, out: &mut [Option<T>]) -> usize;

    /// Number of occupied cells.
    fn count(&self) -> u64;

    /// Inclusive bounds of the handled space.
    fn bounds(&self) -> Aabb;
}
