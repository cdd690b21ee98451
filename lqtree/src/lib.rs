//! Linear (array-backed) quadtree over a 2D power-of-two grid. Values live
//! at integer coordinates in a dense Morton-indexed cell array, giving O(1)
//! point operations and a cache-friendly row scan for AABB range queries.
//!
//! The name is conventional; the structure is a flat array, not a tree.

use common::morton::{self, MortonCode};
use common::{Aabb, EntriesMove, Entry, Pos, Resolution, SpatialIndex};

pub struct LinearQuadTree<T> {
    cells: Vec<Option<T>>,
    max_coord: u32,
    resolution: Resolution,
    count: u64,
}

impl<T: Clone + PartialEq> LinearQuadTree<T> {
    /// Allocates all `2^(2k)` cell slots up front; at `Size1024x1024` that
    /// is about a million slots.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            cells: vec![None; resolution.cells() as usize],
            max_coord: resolution.max_coord(),
            resolution,
            count: 0,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn bulk_insert(&mut self, entries: &[Entry<T>]) {
        for entry in entries {
            self.insert_one(entry);
        }
    }

    pub fn insert_one(&mut self, entry: &Entry<T>) {
        if let Some(value) = &entry.value {
            self.insert_at(entry.pos, value);
        }
    }

    /// Stores a copy of `value` at `pos`, overwriting any occupant. Out of
    /// bounds positions are ignored.
    pub fn insert_at(&mut self, pos: Pos, value: &T) {
        if !self.in_bounds(pos.x, pos.y) {
            return;
        }
        self.set_cell(MortonCode::new(pos.x, pos.y), Some(value.clone()));
    }

    pub fn bulk_remove(&mut self, entries: &[Entry<T>]) {
        for entry in entries {
            self.remove_one(entry);
        }
    }

    pub fn remove_one(&mut self, entry: &Entry<T>) {
        self.remove_at(entry.pos, entry.value.as_ref());
    }

    /// With `Some(value)`, clears the cell only when the stored value
    /// compares equal, so a stale remove cannot evict a newer occupant. With
    /// `None`, clears whatever occupies the cell.
    pub fn remove_at(&mut self, pos: Pos, value: Option<&T>) {
        if !self.in_bounds(pos.x, pos.y) {
            return;
        }
        let code = MortonCode::new(pos.x, pos.y);
        let clear = match value {
            None => true,
            Some(value) => self.cells[code.index()].as_ref() == Some(value),
        };
        if clear {
            self.set_cell(code, None);
        }
    }

    pub fn bulk_move(&mut self, moves: &EntriesMove<T>) {
        self.bulk_remove(&moves.old);
        self.bulk_insert(&moves.new);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells[MortonCode::new(x, y).index()].as_ref()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(Pos::new(0, 0), Pos::new(self.max_coord, self.max_coord))
    }

    /// Fills a prefix of `out` with the values inside `aabb`, in the
    /// row-major order of the clamped box, and returns the number written.
    /// The scan stops once `out` is full.
    pub fn query_range(&self, aabb: Aabb, out: &mut [Option<T>]) -> usize {
        if out.is_empty() {
            return 0;
        }
        out.fill(None);
        if self.count == 0 {
            return 0;
        }
        let Some(clamped) = self.clamp_to_bounds(aabb) else {
            return 0;
        };

        let limit = out.len();
        let mut written = 0;
        morton::for_each_area_code(clamped, |_, code| {
            if written >= limit {
                return;
            }
            if let Some(value) = &self.cells[code.index()] {
                out[written] = Some(value.clone());
                written += 1;
            }
        });
        written
    }

    fn in_bounds(&self, x: u32, y: u32) -> bool {
        x <= self.max_coord && y <= self.max_coord
    }

    fn clamp_to_bounds(&self, mut aabb: Aabb) -> Option<Aabb> {
        if aabb.min.x > self.max_coord || aabb.min.y > self.max_coord {
            return None;
        }
        aabb.max.x = aabb.max.x.min(self.max_coord);
        aabb.max.y = aabb.max.y.min(self.max_coord);
        Some(aabb)
    }

    // Single write point for cell contents so `count` stays in step.
    fn set_cell(&mut self, code: MortonCode, value: Option<T>) {
        let slot = &mut self.cells[code.index()];
        match (slot.is_some(), value.is_some()) {
            (false, true) => self.count += 1,
            (true, false) => self.count -= 1,
            _ => {}
        }
        *slot = value;
    }
}

impl<T: Clone + PartialEq> SpatialIndex<T> for LinearQuadTree<T> {
    fn bulk_insert(&mut self, entries: &[Entry<T>]) {
        LinearQuadTree::bulk_insert(self, entries);
    }

    fn bulk_remove(&mut self, entries: &[Entry<T>]) {
        LinearQuadTree::bulk_remove(self, entries);
    }

    fn bulk_move(&mut self, moves: &EntriesMove<T>) {
        LinearQuadTree::bulk_move(self, moves);
    }

    fn get(&self, x: u32, y: u32) -> Option<&T> {
        LinearQuadTree::get(self, x, y)
    }

    fn query_range(&self, aabb: Aabb, out: &mut [Option<T>]) -> usize {
        LinearQuadTree::query_range(self, aabb, out)
    }

    fn count(&self) -> u64 {
        LinearQuadTree::count(self)
    }

    fn bounds(&self) -> Aabb {
        LinearQuadTree::bounds(self)
    }
}
