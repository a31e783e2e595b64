use criterion::{criterion_group, criterion_main};

mod scheduling;

use checksum::register_benchmarks as register_checksum_benchmarks;
use scheduling::register_benchmarks as register_scheduling_benchmarks;
use serialization::register_benchmarks as register_serialization_benchmarks;

criterion_group!(
    benches,
    register_checksum_benchmarks,
    register_scheduling_benchmarks,
    register_serialization_benchmarks,
);

criterion_main!(benches);
