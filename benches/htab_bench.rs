use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use htab::{HashTable, Key};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// Baseline: hashbrown's HashTable driven by the same precomputed hashes.
type Baseline<'k> = hashbrown::HashTable<(Key<'k>, u64)>;

fn baseline_put<'a, 'k>(t: &'a mut Baseline<'k>, k: Key<'k>) -> &'a mut u64 {
    let (_, v) = t
        .entry(k.hash(), |(e, _)| *e == k, |(e, _)| e.hash())
        .or_insert_with(|| (k, 0))
        .into_mut();
    v
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    let keys: Vec<String> = lcg(1).take(100_000).map(key).collect();
    let prehashed: Vec<Key> = keys.iter().map(|k| Key::from(k.as_str())).collect();

    c.bench_function("htab::insert_fresh_100k", |b| {
        b.iter_batched(
            HashTable::<u64>::new,
            |mut t| {
                for (i, &k) in prehashed.iter().enumerate() {
                    *t.put(k).unwrap() = i as u64;
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("htab::insert_presized_100k", |b| {
        b.iter_batched(
            || HashTable::<u64>::with_capacity(1 << 18).unwrap(),
            |mut t| {
                for (i, &k) in prehashed.iter().enumerate() {
                    *t.put(k).unwrap() = i as u64;
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("hashbrown::insert_fresh_100k", |b| {
        b.iter_batched(
            Baseline::new,
            |mut t| {
                for (i, &k) in prehashed.iter().enumerate() {
                    *baseline_put(&mut t, k) = i as u64;
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_intern_repeat(c: &mut Criterion) {
    // 100k probes over 5k distinct symbols: mostly existing-key fetches.
    let symbols: Vec<String> = lcg(3).take(5_000).map(key).collect();
    let mut s = 0x9e3779b97f4a7c15u64;
    let stream: Vec<Key> = (0..100_000)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            Key::from(symbols[(s as usize) % symbols.len()].as_str())
        })
        .collect();

    c.bench_function("htab::intern_100k_over_5k", |b| {
        b.iter_batched(
            HashTable::<Option<u32>>::new,
            |mut t| {
                let mut next = 0u32;
                for &k in &stream {
                    let id = t.put(k).unwrap().get_or_insert_with(|| {
                        next += 1;
                        next
                    });
                    black_box(*id);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_miss(c: &mut Criterion) {
    let keys: Vec<String> = lcg(7).take(100_000).map(key).collect();
    let misses: Vec<String> = lcg(0xdead_beef).take(10_000).map(key).collect();
    let mut t: HashTable<u64> = HashTable::new();
    let mut base = Baseline::new();
    for (i, k) in keys.iter().enumerate() {
        *t.put(Key::from(k.as_str())).unwrap() = i as u64;
        *baseline_put(&mut base, Key::from(k.as_str())) = i as u64;
    }
    let hits: Vec<Key> = keys.iter().step_by(10).map(|k| Key::from(k.as_str())).collect();
    let misses: Vec<Key> = misses.iter().map(|k| Key::from(k.as_str())).collect();

    c.bench_function("htab::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for k in &hits {
                black_box(t.get(k));
            }
        })
    });

    c.bench_function("htab::get_miss_10k_on_100k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(t.get(k));
            }
        })
    });

    c.bench_function("hashbrown::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for k in &hits {
                black_box(base.find(k.hash(), |(e, _)| e == k));
            }
        })
    });
}

fn bench_key_build(c: &mut Criterion) {
    let keys: Vec<String> = lcg(11).take(10_000).map(key).collect();
    c.bench_function("key::from_bytes_10k", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(Key::from_bytes(k.as_bytes()));
            }
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_intern_repeat
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_miss, bench_key_build
}
criterion_main!(benches_insert, benches_ops);
