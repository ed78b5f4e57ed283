use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pingsim_core::{ProbeModel, target::is_valid_target};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;

fn target(c: &mut Criterion) {
    c.bench_function("valid_dotted_quad", |b| {
        b.iter(|| is_valid_target(black_box("192.168.100.200")))
    });
    c.bench_function("out_of_range_dotted_quad", |b| {
        b.iter(|| is_valid_target(black_box("192.168.100.256")))
    });
    c.bench_function("hostname", |b| {
        b.iter(|| is_valid_target(black_box("sub-domain.example.org")))
    });
}

fn simulate(c: &mut Criterion) {
    let model = ProbeModel::default();
    let mut rng = ChaChaRng::seed_from_u64(0);

    c.bench_function("simulate", |b| b.iter(|| model.simulate(black_box(&mut rng))));
}

criterion_group!(benches, target, simulate);
criterion_main!(benches);
