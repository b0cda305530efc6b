//! # Stake Consensus Benchmarks
//!
//! | Path | Work |
//! |------|------|
//! | accepted stake claim | index lookup, UTXO lookup, ECDSA recovery |
//! | rejected stake claim | index lookup, UTXO and mempool miss |
//! | block validity | kernel plus coinbase payout |

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shared_types::OutPoint;
use stake_consensus::StakeConsensusApi;
use stake_tests::fixture::StakeTestChain;
use std::time::Duration;

fn bench_check_proof_of_stake(c: &mut Criterion) {
    let fixture = StakeTestChain::activated();
    let stake = fixture
        .mature_stake()
        .expect("activated chain holds a mature stake");
    let valid = fixture.build_pos_block(stake);
    let unknown = fixture.build_pos_block(OutPoint::new([0x5A; 32], 0));

    let mut group = c.benchmark_group("stake-kernel");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("check_proof_of_stake_valid", |b| {
        b.iter(|| black_box(fixture.service.check_proof_of_stake(black_box(&valid))))
    });

    group.bench_function("check_proof_of_stake_unknown_stake", |b| {
        b.iter(|| black_box(fixture.service.check_proof_of_stake(black_box(&unknown))))
    });

    group.bench_function("check_block_validity", |b| {
        b.iter(|| black_box(fixture.service.check_block_validity(black_box(&valid))))
    });

    group.finish();
}

criterion_group!(benches, bench_check_proof_of_stake);
criterion_main!(benches);
