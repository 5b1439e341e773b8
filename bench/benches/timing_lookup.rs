use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, Criterion, SamplingMode,
};

use kds::sparse_array::key_of;
use kds::{HashIndex, Mark, SparseArray};
use kds_bench::gen_random_ints;

const SAMPLE_SIZE: usize = 30;
const WARM_UP_TIME: Duration = Duration::from_secs(5);
const MEASURE_TIME: Duration = Duration::from_secs(10);

const SEED_INTS: u64 = 334;
const SEED_QUERIES: u64 = 114514;

const NUM_INTS: &[usize] = &[1 << 10, 1 << 15, 1 << 20];
const NUM_QUERIES: usize = 1000;

fn criterion_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing_lookup");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);

    let max_nints = *NUM_INTS.last().unwrap();
    let vals = gen_random_ints(max_nints, 0, 1 << 40, SEED_INTS);

    perform_lookup(&mut group, &vals);
}

fn run_hash_queries(ht: &HashIndex, queries: &[i64]) {
    let mut sum = 0;
    for &q in queries {
        sum += ht.for_each_possible(q).count();
    }
    if sum == 0 {
        panic!("Should not come.");
    }
}

fn run_sparse_queries(xa: &SparseArray, queries: &[i64]) {
    let mut sum = 0;
    for &q in queries {
        sum += xa.gang_lookup(key_of(q), 8).len();
    }
    if sum == 0 {
        panic!("Should not come.");
    }
}

fn run_marked_queries(xa: &SparseArray, queries: &[i64]) {
    let mut sum = 0;
    for &q in queries {
        sum += xa.gang_lookup_by_mark(Mark::MARK_0, key_of(q), 8).len();
    }
    if sum == 0 {
        panic!("Should not come.");
    }
}

fn perform_lookup(group: &mut BenchmarkGroup<WallTime>, vals: &[i64]) {
    for &nints in NUM_INTS {
        let vals = &vals[..nints];
        let queries: Vec<_> = gen_random_ints(NUM_QUERIES, 0, nints as i64 - 1, SEED_QUERIES)
            .into_iter()
            .map(|i| vals[i as usize])
            .collect();

        let nints_str = format!("n_{nints}");

        group.bench_function(format!("{nints_str}/kds/HashIndex"), |b| {
            let mut ht = HashIndex::default();
            for &v in vals {
                ht.insert(v).unwrap();
            }
            b.iter(|| run_hash_queries(&ht, &queries));
        });

        group.bench_function(format!("{nints_str}/kds/SparseArray"), |b| {
            let mut xa = SparseArray::new();
            for &v in vals {
                xa.insert(key_of(v), v).unwrap();
            }
            b.iter(|| run_sparse_queries(&xa, &queries));
        });

        group.bench_function(format!("{nints_str}/kds/SparseArray/marked"), |b| {
            let mut xa = SparseArray::new();
            for &v in vals {
                xa.insert(key_of(v), v).unwrap();
                xa.set_mark(key_of(v), Mark::MARK_0);
            }
            b.iter(|| run_marked_queries(&xa, &queries));
        });
    }
}

criterion_group!(benches, criterion_lookup);

criterion_main!(benches);
