use criterion::{criterion_group, criterion_main};


use dispatch::register_benchmarks as register_dispatch_benchmarks;
use primitives::register_benchmarks as register_primitive_benchmarks;

// Define the benchmark groups
criterion_group!(
    benches,
    register_primitive_benchmarks,
    register_dispatch_benchmarks,
);

criterion_main!(benches);
