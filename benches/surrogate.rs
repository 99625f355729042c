use criterion::{criterion_group, criterion_main, Criterion};

use adasg::algorithm::local::LocalStrategy;
use adasg::basis::closed::ClosedBasis;
use adasg::config::Config;
use adasg::errors::AdaptError;
use adasg::grids::closed::ClosedGrid;
use adasg::interpolator::{AdaptiveTarget, Interpolator, Target};
use adasg::surrogate::Surrogate;

struct Ridges;

impl Target for Ridges
{
    fn dimensions(&self) -> (usize, usize)
    {
        (2, 1)
    }

    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        value[0] = (10.0 * point[0]).sin() * (7.0 * point[1]).cos() + point[0] * point[1];
        Ok(())
    }
}

impl AdaptiveTarget for Ridges
{
    fn refine(&self, surplus: &[f64]) -> bool
    {
        surplus[0].abs() > 1e-4
    }
}

fn construct() -> (Interpolator<ClosedGrid, ClosedBasis>, Surrogate)
{
    let config = Config { min_level: 2, max_level: 10, max_nodes: 20_000, ..Config::default() };
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = LocalStrategy::new(&Ridges, grid, &config);
    let surrogate = interpolator.compute(&Ridges, &mut strategy).unwrap();
    (interpolator, surrogate)
}

fn bench_compute(c: &mut Criterion)
{
    c.bench_function("construct surrogate", |b| b.iter(construct));
}

fn bench_evaluate(c: &mut Criterion)
{
    let (interpolator, surrogate) = construct();
    let points: Vec<f64> = (0..2000).map(|i| (i % 997) as f64 / 997.0).collect();
    c.bench_function("evaluate surrogate", |b|
    {
        b.iter(|| interpolator.evaluate(&surrogate, &points))
    });
}

criterion_group!(benches, bench_compute, bench_evaluate);
criterion_main!(benches);
