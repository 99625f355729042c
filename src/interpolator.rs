use crate::algorithm::{support, Element, Strategy};
use crate::basis::Basis;
use crate::config::Config;
use crate::errors::AdaptError;
use crate::execution::Workers;
use crate::grids::Grid;
use crate::surrogate::Surrogate;

///
/// A quantity of interest over the unit hypercube. `compute` is called
/// concurrently on disjoint point slices and must be reentrant.
///
pub trait Target: Sync
{
    /// The number of inputs and the number of outputs.
    fn dimensions(&self) -> (usize, usize);

    /// The value of the quantity at a point.
    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>;
}

///
/// The extra hooks the node-wise strategy needs: a per-node breeding
/// decision from the hierarchical surplus, and a per-level progress
/// callback.
///
pub trait AdaptiveTarget: Target
{
    fn refine(&self, surplus: &[f64]) -> bool;

    fn monitor(&self, _level: u32, _passive: usize, _active: usize) {}
}

///
/// The driver: owns the surrogate under construction and orchestrates
/// the loop between a strategy (which proposes nodes) and the worker
/// pool (which measures the target and the current approximation at
/// them). A failing step is not committed.
///
pub struct Interpolator<G: Grid, B: Basis>
{
    grid: G,
    basis: B,
    workers: Workers,
}

impl<G: Grid, B: Basis> Interpolator<G, B>
{
    pub fn new(grid: G, basis: B, config: &Config) -> Result<Self, AdaptError>
    {
        config.validate()?;
        Ok(Self { grid, basis, workers: Workers::new(config.workers)? })
    }

    /// Construct an interpolant for a quantity of interest.
    pub fn compute<T, S>(&self, target: &T, strategy: &mut S) -> Result<Surrogate, AdaptError>
    where
        T: Target + ?Sized,
        S: Strategy,
    {
        let (ni, no) = target.dimensions();
        if ni == 0 || no == 0
        {
            return Err(AdaptError::InvalidDimensions);
        }

        let mut surrogate = Surrogate::new(ni, no);

        let mut next = strategy.first()?;
        while let Some(mut state) = next
        {
            if state.indices.is_empty()
            {
                break;
            }

            let nodes = self.grid.compute(&state.indices);
            let values = self.workers.invoke(target, &nodes, ni, no)?;
            let approximations = self.workers.approximate(
                &self.basis,
                surrogate.indices(),
                surrogate.surpluses(),
                &nodes,
                ni,
                no,
            );
            let surpluses = support::subtract(&values, &approximations);

            let nn = state.indices.len() / ni;
            let mut scores = Vec::with_capacity(nn);
            for i in 0..nn
            {
                let element = Element {
                    index: &state.indices[i * ni..(i + 1) * ni],
                    value: &values[i * no..(i + 1) * no],
                    surplus: &surpluses[i * no..(i + 1) * no],
                };
                scores.push(strategy.score(&element));
            }

            surrogate.push(&state.indices, &surpluses);

            state.values = values;
            state.surpluses = surpluses;
            state.scores = scores;
            next = strategy.next(state)?;
        }

        Ok(surrogate)
    }

    /// Evaluate a constructed interpolant at a set of points.
    pub fn evaluate(&self, surrogate: &Surrogate, points: &[f64]) -> Vec<f64>
    {
        self.workers.approximate(
            &self.basis,
            surrogate.indices(),
            surrogate.surpluses(),
            points,
            surrogate.inputs(),
            surrogate.outputs(),
        )
    }
}

#[cfg(test)]
use crate::algorithm::local::LocalStrategy;
#[cfg(test)]
use crate::basis::closed::ClosedBasis;
#[cfg(test)]
use crate::grids::closed::ClosedGrid;

#[cfg(test)]
struct Constant;

#[cfg(test)]
impl Target for Constant
{
    fn dimensions(&self) -> (usize, usize)
    {
        (2, 1)
    }

    fn compute(&self, _point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        value[0] = 7.0;
        Ok(())
    }
}

#[cfg(test)]
impl AdaptiveTarget for Constant
{
    fn refine(&self, _surplus: &[f64]) -> bool
    {
        false
    }
}

#[cfg(test)]
struct Linear;

#[cfg(test)]
impl Target for Linear
{
    fn dimensions(&self) -> (usize, usize)
    {
        (2, 1)
    }

    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        value[0] = 2.0 * point[0] + 3.0 * point[1] - 1.0;
        Ok(())
    }
}

#[cfg(test)]
impl AdaptiveTarget for Linear
{
    fn refine(&self, surplus: &[f64]) -> bool
    {
        surplus[0].abs() > 1e-10
    }
}

#[cfg(test)]
struct Greedy;

#[cfg(test)]
impl Target for Greedy
{
    fn dimensions(&self) -> (usize, usize)
    {
        (2, 1)
    }

    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        value[0] = (9.0 * point[0]).sin() + (7.0 * point[1]).cos();
        Ok(())
    }
}

#[cfg(test)]
impl AdaptiveTarget for Greedy
{
    fn refine(&self, _surplus: &[f64]) -> bool
    {
        true
    }
}

#[test]
fn check_constant_target()
{
    let config = Config { min_level: 1, max_level: 3, max_nodes: 1000, ..Config::default() };
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = LocalStrategy::new(&Constant, grid, &config);
    let surrogate = interpolator.compute(&Constant, &mut strategy).unwrap();

    // Only the root carries a surplus.
    assert_eq!(surrogate.surpluses()[0], 7.0);
    for &surplus in &surrogate.surpluses()[1..]
    {
        assert_eq!(surplus, 0.0);
    }

    let points = [0.0, 0.0, 0.31, 0.77, 1.0, 0.5, 0.5, 0.5];
    for value in interpolator.evaluate(&surrogate, &points)
    {
        assert!((value - 7.0).abs() < 1e-12);
    }
}

#[test]
fn check_linear_exactness()
{
    let config = Config { min_level: 2, max_level: 8, max_nodes: 10_000, ..Config::default() };
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = LocalStrategy::new(&Linear, grid, &config);
    let surrogate = interpolator.compute(&Linear, &mut strategy).unwrap();

    let points = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.5, 0.5];
    let values = interpolator.evaluate(&surrogate, &points);
    for (point, value) in points.chunks_exact(2).zip(&values)
    {
        let exact = 2.0 * point[0] + 3.0 * point[1] - 1.0;
        assert!((value - exact).abs() < 1e-12, "at {point:?}");
    }
}

#[test]
fn check_max_nodes_is_exact()
{
    let config = Config { min_level: 1, max_level: 100, max_nodes: 50, ..Config::default() };
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = LocalStrategy::new(&Greedy, grid, &config);
    let surrogate = interpolator.compute(&Greedy, &mut strategy).unwrap();
    assert_eq!(surrogate.nodes(), 50);
}

#[test]
fn check_invalid_bounds()
{
    let config = Config { min_level: 5, max_level: 3, ..Config::default() };
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    assert_eq!(
        Interpolator::new(grid, basis, &config).err(),
        Some(AdaptError::InvalidLevelBounds)
    );
}

#[test]
fn check_failure_leaves_surrogate_empty()
{
    struct Failing;

    impl Target for Failing
    {
        fn dimensions(&self) -> (usize, usize)
        {
            (2, 1)
        }

        fn compute(&self, _point: &[f64], _value: &mut [f64]) -> Result<(), AdaptError>
        {
            Err(AdaptError::TargetFailure)
        }
    }

    impl AdaptiveTarget for Failing
    {
        fn refine(&self, _surplus: &[f64]) -> bool
        {
            false
        }
    }

    let config = Config::default();
    let grid = ClosedGrid::new(2);
    let basis = ClosedBasis::new(2, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = LocalStrategy::new(&Failing, grid, &config);
    assert_eq!(
        interpolator.compute(&Failing, &mut strategy).err(),
        Some(AdaptError::TargetFailure)
    );
}
