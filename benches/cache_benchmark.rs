use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tripffer_client::cache::{CacheConfig, Invalidation, QueryCache, QueryKey, Resource};

const RESOURCES: [Resource; 4] = [
    Resource::HotelDetails,
    Resource::HotelSearch,
    Resource::Reviews,
    Resource::Bookings,
];

// Concurrent mix of cached reads, completed fetches and invalidating writes
pub fn cache_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_cache");

    for max_entries in [64usize, 256, 1024].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_entries),
            max_entries,
            |b, &max_entries| {
                b.iter(|| {
                    let cache = Arc::new(QueryCache::new(CacheConfig {
                        stale_time: Duration::from_secs(300),
                        max_entries,
                    }));

                    // ~1KB response body per query
                    let mut rng = thread_rng();
                    let body = Bytes::from((0..1024).map(|_| rng.gen::<u8>()).collect::<Vec<_>>());

                    let mut handles = vec![];
                    for _ in 0..4 {
                        let cache = Arc::clone(&cache);
                        let body = body.clone();

                        let handle = thread::spawn(move || {
                            let mut rng = thread_rng();

                            for _ in 0..250 {
                                let resource = *RESOURCES.choose(&mut rng).unwrap_or(&Resource::HotelDetails);
                                let key = QueryKey::with_id(resource, rng.gen_range(0..200u32));

                                let roll: f64 = rng.gen();
                                if roll < 0.05 {
                                    // Successful write
                                    cache.invalidate(&Invalidation::Resource(resource));
                                } else if roll < 0.35 {
                                    let ticket = cache.begin_fetch(key);
                                    cache.complete_fetch(ticket, body.clone());
                                } else {
                                    let _ = cache.get(&key);
                                }
                            }
                        });

                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }

                    black_box(cache.stats())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, cache_benchmark);
criterion_main!(benches);
