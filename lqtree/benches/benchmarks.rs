use common::{Aabb, EntriesMove, Entry, Pos, Resolution};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lqtree::LinearQuadTree;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_COORD: u32 = 1023;

fn rand_pos(rng: &mut StdRng) -> Pos {
    Pos::new(rng.gen_range(0..=MAX_COORD), rng.gen_range(0..=MAX_COORD))
}

fn bulk_move_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);

    let entries: Vec<Entry<u32>> = (0..10_000)
        .map(|i| {
            let pos = rand_pos(&mut rng);
            Entry::new(pos.x, pos.y, i)
        })
        .collect();

    // Move a subset back and forth so the tree keeps its population.
    let mut forward = EntriesMove::with_capacity(4_000);
    let mut backward = EntriesMove::with_capacity(4_000);
    for entry in entries.iter().take(4_000) {
        let new_pos = rand_pos(&mut rng);
        let value = entry.value.unwrap();
        forward.append(value, entry.pos, new_pos);
        backward.append(value, new_pos, entry.pos);
    }

    let mut qt = LinearQuadTree::new(Resolution::Size1024x1024);
    qt.bulk_insert(&entries);

    c.bench_function("lqtree_bulk_move_10k_4k", |b| {
        let mut flip = false;
        b.iter(|| {
            if flip {
                qt.bulk_move(black_box(&backward));
            } else {
                qt.bulk_move(black_box(&forward));
            }
            flip = !flip;
        })
    });
}

fn query_range_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);

    let entries: Vec<Entry<u32>> = (0..100_000)
        .map(|i| {
            let pos = rand_pos(&mut rng);
            Entry::new(pos.x, pos.y, i)
        })
        .collect();

    let mut qt = LinearQuadTree::new(Resolution::Size1024x1024);
    qt.bulk_insert(&entries);

    const QUERY_SIZE: u32 = 64;
    let queries: Vec<Aabb> = (0..128)
        .map(|_| {
            let min_x = rng.gen_range(0..=MAX_COORD - QUERY_SIZE);
            let min_y = rng.gen_range(0..=MAX_COORD - QUERY_SIZE);
            Aabb::new(
                Pos::new(min_x, min_y),
                Pos::new(min_x + QUERY_SIZE - 1, min_y + QUERY_SIZE - 1),
            )
        })
        .collect();

    let mut out = vec![None; 4096];
    c.bench_function("lqtree_query_range_100k_64sz", |b| {
        let mut i = 0;
        b.iter(|| {
            let written = qt.query_range(black_box(queries[i % queries.len()]), &mut out);
            i += 1;
            written
        })
    });
}

criterion_group!(benches, bulk_move_benchmark, query_range_benchmark);
criterion_main!(benches);
