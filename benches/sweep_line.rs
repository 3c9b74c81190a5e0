use criterion::{criterion_group, criterion_main, Criterion};
use sweepline::algorithms::intersection::naive;
use sweepline::data::{LineSegment, Point};
use sweepline::find_intersections;

/// Deterministic segment soup from a small LCG; no RNG dependency and
/// identical inputs on every run.
fn gen_segments(n: usize) -> Vec<LineSegment> {
  let mut state: u64 = 0x2545_f491_4f6c_dd1d;
  let mut next = move || {
    state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
    // 53 high bits as a float in [0, 1).
    (state >> 11) as f64 / (1u64 << 53) as f64
  };
  (0..n)
    .map(|_| {
      let x = next() * 1000.0;
      let y = next() * 1000.0;
      LineSegment::new(
        Point::new(x, y),
        Point::new(x + 10.0 + next() * 90.0, y + next() * 200.0 - 100.0),
      )
    })
    .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
  let s100 = gen_segments(100);
  let s1000 = gen_segments(1000);

  c.bench_function("find_intersections(1e2)", |b| {
    b.iter(|| find_intersections(&s100))
  });
  c.bench_function("find_intersections(1e3)", |b| {
    b.iter(|| find_intersections(&s1000))
  });
  c.bench_function("naive(1e2)", |b| b.iter(|| naive::segment_intersections(&s100)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
