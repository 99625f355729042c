use crate::algorithm::support;
use crate::algorithm::threshold::Threshold;
use crate::algorithm::tracker::Tracker;
use crate::algorithm::{Element, State, Strategy};
use crate::config::Config;
use crate::errors::AdaptError;
use crate::grids::Grid;
use crate::index::LevelOrder;

///
/// Dimension-wise adaptation over the generalized sparse grid. Each
/// admitted level index carries a priority (mean score of its nodes) and
/// a per-output error row (compressed from its surpluses); the strategy
/// keeps expanding the highest-priority active index until the error
/// table passes the threshold, the lattice is exhausted, or no positive
/// priority remains.
///
pub struct GlobalStrategy<G: Grid>
{
    inputs: usize,
    outputs: usize,
    grid: G,

    min_level: u32,
    max_level: u32,

    tracker: Tracker,
    threshold: Threshold,

    priority: Vec<f64>,
    accuracy: Vec<f64>,
}

impl<G: Grid> GlobalStrategy<G>
{
    pub fn new(inputs: usize, outputs: usize, grid: G, config: &Config) -> Self
    {
        Self {
            inputs,
            outputs,
            grid,
            min_level: config.min_level,
            max_level: config.max_level,
            tracker: Tracker::new(inputs, config.max_level, usize::MAX),
            threshold: Threshold::new(outputs, config.absolute_error, config.relative_error),
            priority: Vec::new(),
            accuracy: Vec::new(),
        }
    }

    fn initiate(&self, lindices: Vec<LevelOrder>) -> Result<State, AdaptError>
    {
        let (indices, counts) = self.grid.index(&lindices)?;
        Ok(State { lindices, indices, counts, ..Default::default() })
    }

    fn consume(&mut self, state: &State)
    {
        let no = self.outputs;
        let np = self.priority.len();
        let na = self.accuracy.len();
        let nn = state.counts.len();

        self.priority.resize(np + nn, 0.0);
        self.accuracy.resize(na + nn * no, 0.0);

        let levels = support::levelize(&state.lindices, self.inputs);

        let mut o = 0;
        for i in 0..nn
        {
            let count = state.counts[i];
            if levels[i] < self.min_level as u64
            {
                self.priority[np + i] = f64::INFINITY;
                self.accuracy[na + i * no..na + (i + 1) * no].fill(f64::INFINITY);
            }
            else if levels[i] < self.max_level as u64
            {
                self.priority[np + i] = support::average(&state.scores[o..o + count]);
                self.threshold.compress(
                    &mut self.accuracy[na + i * no..na + (i + 1) * no],
                    &state.surpluses[o * no..(o + count) * no],
                );
            }
            else
            {
                self.priority[np + i] = f64::NEG_INFINITY;
            }
            o += count;
        }

        self.threshold.update(&state.values);
    }

    fn choose(&self) -> Option<usize>
    {
        let mut k = None;
        let mut max = f64::NEG_INFINITY;
        for &i in self.tracker.active()
        {
            if self.priority[i] > max
            {
                max = self.priority[i];
                k = Some(i);
            }
        }
        if max <= 0.0
        {
            return None;
        }
        k
    }
}

impl<G: Grid> Strategy for GlobalStrategy<G>
{
    fn first(&mut self) -> Result<Option<State>, AdaptError>
    {
        let lindices = self.tracker.forward(0).to_vec();
        Ok(Some(self.initiate(lindices)?))
    }

    fn next(&mut self, state: State) -> Result<Option<State>, AdaptError>
    {
        self.consume(&state);
        loop
        {
            if self.threshold.check(&self.accuracy, self.tracker.active())
            {
                return Ok(None);
            }
            let Some(k) = self.choose() else { return Ok(None) };
            let lindices = self.tracker.forward(k).to_vec();
            if lindices.is_empty()
            {
                // The choice could not be expanded; it is no longer
                // active, so the search continues over the rest.
                continue;
            }
            return Ok(Some(self.initiate(lindices)?));
        }
    }

    fn score(&self, element: &Element) -> f64
    {
        support::sum_absolute(element.surplus)
    }
}

#[cfg(test)]
use crate::interpolator::{Interpolator, Target};

#[cfg(test)]
struct Quadratic;

#[cfg(test)]
impl Target for Quadratic
{
    fn dimensions(&self) -> (usize, usize)
    {
        (1, 1)
    }

    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        value[0] = point[0] * point[0];
        Ok(())
    }
}

#[test]
fn check_quadratic_stops_on_threshold()
{
    use crate::basis::closed::ClosedBasis;
    use crate::grids::closed::ClosedGrid;

    let config = Config {
        min_level: 1,
        max_level: 10,
        absolute_error: 1e-4,
        relative_error: 1e-4,
        ..Config::default()
    };
    let grid = ClosedGrid::new(1);
    let basis = ClosedBasis::new(1, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = GlobalStrategy::new(1, 1, grid, &config);
    let surrogate = interpolator.compute(&Quadratic, &mut strategy).unwrap();

    // The hat surplus of x^2 at level l is exactly 2^(-2l), so the
    // chain stops after level 7, the first level within 1e-4.
    assert_eq!(surrogate.nodes(), 129);

    for point in [0.0, 0.1, 0.37, 0.5, 0.93, 1.0]
    {
        let value = interpolator.evaluate(&surrogate, &[point])[0];
        assert!((value - point * point).abs() < 1e-3, "at {point}");
    }
}

#[test]
fn check_level_cap_disables_refinement()
{
    use crate::basis::closed::ClosedBasis;
    use crate::grids::closed::ClosedGrid;

    let config = Config {
        min_level: 1,
        max_level: 3,
        absolute_error: 1e-12,
        relative_error: 1e-12,
        ..Config::default()
    };
    let grid = ClosedGrid::new(1);
    let basis = ClosedBasis::new(1, 1);
    let interpolator = Interpolator::new(grid, basis, &config).unwrap();
    let mut strategy = GlobalStrategy::new(1, 1, grid, &config);
    let surrogate = interpolator.compute(&Quadratic, &mut strategy).unwrap();

    // Levels 0 through 3 only: 1 + 2 + 2 + 4 nodes.
    assert_eq!(surrogate.nodes(), 9);
}
