use clustergroup::{ClusterGroup, LinkageMethod};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Build a synthetic stream of similarities over `n` points arranged into
/// `n / cluster_size` dense blocks (high intra-block similarity, a faint
/// cross-block edge), so merging actually does work proportional to `n`
/// rather than bottoming out after the first round.
fn synthetic_points(n: usize, cluster_size: usize) -> Vec<(String, String, f64)> {
    let mut sims = Vec::new();
    let mut block_start = 0;
    while block_start < n {
        let block_end = (block_start + cluster_size).min(n);
        for i in block_start..block_end {
            for j in (i + 1)..block_end {
                let score = 0.9 - 0.001 * ((i + j) % 10) as f64;
                sims.push((format!("p{}", i), format!("p{}", j), score));
            }
        }
        if block_end < n {
            sims.push((format!("p{}", block_end - 1), format!("p{}", block_end), 0.1));
        }
        block_start = block_end;
    }
    sims
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_merge");
    for &(n, cluster_size) in &[(200usize, 10usize), (2000, 10)] {
        let sims = synthetic_points(n, cluster_size);
        for method in [LinkageMethod::Complete, LinkageMethod::Single, LinkageMethod::Average] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", method), n),
                &sims,
                |b, sims| {
                    b.iter(|| {
                        let mut g = ClusterGroup::new(n, method);
                        for (a, bb, score) in sims {
                            g.add_sim(a, bb, *score);
                        }
                        while g.merge(0.0) {}
                        black_box(g.size());
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
