//! Z-order bucket grid: shards world space into equally sized power-of-two
//! chunks, each backed by a chunk-local linear quadtree. Memory scales with
//! the populated area instead of the world area, so it covers worlds too
//! large to back with one dense cell array.

use common::{Aabb, EntriesMove, Entry, Pos, Resolution, SpatialIndex};
use fxhash::FxHashMap;
use lqtree::LinearQuadTree;

/// Origin tile of a bucket in chunk units (world position >> chunk depth).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub x: u32,
    pub y: u32,
}

pub struct BucketGrid<T> {
    chunk_shift: u32,
    chunk_mask: u32,
    bucket_resolution: Resolution,
    bound: Aabb,
    buckets: FxHashMap<ChunkKey, LinearQuadTree<T>>,
    count: u64,
}

impl<T: Clone + PartialEq> BucketGrid<T> {
    /// `bucket_resolution` fixes the chunk side. Pick it near the typical
    /// query window: if most queries are under 32x32, a 64 or 128 chunk
    /// keeps each query inside one to four buckets; much smaller chunks pay
    /// for extra map lookups, much larger ones waste memory per populated
    /// region.
    pub fn new(bucket_resolution: Resolution, bound: Aabb) -> Self {
        Self {
            chunk_shift: bucket_resolution.depth(),
            chunk_mask: bucket_resolution.max_coord(),
            bucket_resolution,
            bound,
            buckets: FxHashMap::default(),
            count: 0,
        }
    }

    pub fn bulk_insert(&mut self, entries: &[Entry<T>]) {
        for entry in entries {
            let Some(value) = &entry.value else { continue };
            if !self.bound.contains(entry.pos) {
                continue;
            }
            let (key, local) = self.chunk_key(entry.pos);
            let resolution = self.bucket_resolution;
            let bucket = self
                .buckets
                .entry(key)
                .or_insert_with(|| LinearQuadTree::new(resolution));

            let before = bucket.count();
            bucket.insert_at(local, value);
            let after = bucket.count();
            self.adjust_count(before, after);
        }
    }

    /// Missing buckets are skipped, never created. A bucket is dropped as
    /// soon as it empties out; lookups treat a missing bucket the same as an
    /// empty one.
    pub fn bulk_remove(&mut self, entries: &[Entry<T>]) {
        for entry in entries {
            if !self.bound.contains(entry.pos) {
                continue;
            }
            let (key, local) = self.chunk_key(entry.pos);
            let Some(bucket) = self.buckets.get_mut(&key) else {
                continue;
            };

            let before = bucket.count();
            bucket.remove_at(local, entry.value.as_ref());
            let after = bucket.count();
            if after == 0 {
                self.buckets.remove(&key);
            }
            self.adjust_count(before, after);
        }
    }

    /// A move may cross chunk boundaries, so removes and inserts resolve
    /// their buckets independently: all removes apply, then all inserts.
    pub fn bulk_move(&mut self, moves: &EntriesMove<T>) {
        if moves.is_empty() {
            return;
        }
        self.bulk_remove(&moves.old);
        self.bulk_insert(&moves.new);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        let pos = Pos::new(x, y);
        if !self.bound.contains(pos) {
            return None;
        }
        let (key, local) = self.chunk_key(pos);
        self.buckets.get(&key)?.get(local.x, local.y)
    }

    /// Fills a prefix of `out` with the values inside `aabb` and returns the
    /// number written. Buckets are visited in chunk row-major order and each
    /// contributes its own deterministic scan; the walk stops early once
    /// `out` is full.
    pub fn query_range(&self, aabb: Aabb, out: &mut [Option<T>]) -> usize {
        if out.is_empty() {
            return 0;
        }
        out.fill(None);
        if self.buckets.is_empty() || !self.bound.intersects(&aabb) {
            return 0;
        }
        let aabb = self.clamp_to_bound(aabb);

        let min_chunk_x = aabb.min.x >> self.chunk_shift;
        let max_chunk_x = aabb.max.x >> self.chunk_shift;
        let min_chunk_y = aabb.min.y >> self.chunk_shift;
        let max_chunk_y = aabb.max.y >> self.chunk_shift;

        let mut written = 0;
        for cx in min_chunk_x..=max_chunk_x {
            for cy in min_chunk_y..=max_chunk_y {
                if written == out.len() {
                    return written;
                }
                let Some(bucket) = self.buckets.get(&ChunkKey { x: cx, y: cy }) else {
                    continue;
                };

                let chunk_min_x = cx << self.chunk_shift;
                let chunk_min_y = cy << self.chunk_shift;
                let chunk_max_x = chunk_min_x + self.chunk_mask;
                let chunk_max_y = chunk_min_y + self.chunk_mask;

                // Intersect the query with this chunk's world box, then
                // shift into bucket-local coordinates.
                let local = Aabb::new(
                    Pos::new(
                        aabb.min.x.max(chunk_min_x) - chunk_min_x,
                        aabb.min.y.max(chunk_min_y) - chunk_min_y,
                    ),
                    Pos::new(
                        aabb.max.x.min(chunk_max_x) - chunk_min_x,
                        aabb.max.y.min(chunk_max_y) - chunk_min_y,
                    ),
                );

                written += bucket.query_range(local, &mut out[written..]);
            }
        }
        written
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn bounds(&self) -> Aabb {
        self.bound
    }

    // S is a power of two, so chunk routing is a shift and the local
    // position a mask.
    fn chunk_key(&self, pos: Pos) -> (ChunkKey, Pos) {
        let key = ChunkKey {
            x: pos.x >> self.chunk_shift,
            y: pos.y >> self.chunk_shift,
        };
        let local = Pos::new(pos.x & self.chunk_mask, pos.y & self.chunk_mask);
        (key, local)
    }

    fn adjust_count(&mut self, before: u64, after: u64) {
        if after > before {
            self.count += after - before;
        } else {
            self.count -= before - after;
        }
    }

    fn clamp_to_bound(&self, mut aabb: Aabb) -> Aabb {
        aabb.min.x = aabb.min.x.max(self.bound.min.x);
        aabb.min.y = aabb.min.y.max(self.bound.min.y);
        aabb.max.x = aabb.max.x.min(self.bound.max.x);
        aabb.max.y = aabb.max.y.min(self.bound.max.y);
        aabb
    }
}

impl<T: Clone + PartialEq> SpatialIndex<T> for BucketGrid<T> {
    fn bulk_insert(&mut self, entries: &[Entry<T>]) {
        BucketGrid::bulk_insert(self, entries);
    }

    fn bulk_remove(&mut self, entries: &[Entry<T>]) {
        BucketGrid::bulk_remove(self, entries);
    }

    fn bulk_move(&mut self, moves: &EntriesMove<T>) {
        BucketGrid::bulk_move(self, moves);
    }

    fn get(&self, x: u32, y: u32) -> Option<&T> {
        BucketGrid::get(self, x, y)
    }

    fn query_range(&self, aabb: Aabb, out: &mut [Option<T>]) -> usize {
        BucketGrid::query_range(self, aabb, out)
    }

    fn count(&self) -> u64 {
        BucketGrid::count(self)
    }

    fn bounds(&self) -> Aabb {
        BucketGrid::bounds(self)
    }
}
