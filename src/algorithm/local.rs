use crate::algorithm::support;
use crate::algorithm::{Element, State, Strategy};
use crate::config::Config;
use crate::errors::AdaptError;
use crate::grids::Grid;
use crate::index::LevelOrder;
use crate::interpolator::AdaptiveTarget;

///
/// Node-wise adaptation: a breadth-first walk over levels in which every
/// active node asks the target whether its surplus warrants breeding.
/// Nodes below `min_level` always breed; the walk stops at `max_level`
/// or when `max_nodes` is reached, trimming trailing children so the cap
/// is met exactly.
///
pub struct LocalStrategy<'a, T: AdaptiveTarget, G: Grid>
{
    target: &'a T,
    grid: G,

    inputs: usize,
    outputs: usize,

    min_level: u32,
    max_level: u32,
    max_nodes: usize,

    level: u32,
    active: usize,
    passive: usize,
}

impl<'a, T: AdaptiveTarget, G: Grid> LocalStrategy<'a, T, G>
{
    pub fn new(target: &'a T, grid: G, config: &Config) -> Self
    {
        let (inputs, outputs) = target.dimensions();
        Self {
            target,
            grid,
            inputs,
            outputs,
            min_level: config.min_level,
            max_level: config.max_level,
            max_nodes: config.max_nodes,
            level: 0,
            active: 1,
            passive: 0,
        }
    }
}

impl<T: AdaptiveTarget, G: Grid> Strategy for LocalStrategy<'_, T, G>
{
    fn first(&mut self) -> Result<Option<State>, AdaptError>
    {
        self.target.monitor(0, 0, 1);
        Ok(Some(State { indices: vec![LevelOrder::ROOT; self.inputs], ..Default::default() }))
    }

    fn next(&mut self, state: State) -> Result<Option<State>, AdaptError>
    {
        let (ni, no) = (self.inputs, self.outputs);
        let na = self.active;

        if self.level >= self.max_level || self.passive + na >= self.max_nodes
        {
            return Ok(None);
        }

        let mut indices = state.indices;
        if self.level >= self.min_level
        {
            // Keep the indices passing the surplus test, compacted in
            // place in their original order.
            let mut kept = 0;
            for i in 0..na
            {
                if self.target.refine(&state.surpluses[i * no..(i + 1) * no])
                {
                    if kept != i
                    {
                        indices.copy_within(i * ni..(i + 1) * ni, kept * ni);
                    }
                    kept += 1;
                }
            }
            indices.truncate(kept * ni);
        }

        let mut children = self.grid.children(&indices)?;

        self.passive += na;
        let mut na = children.len() / ni;
        if self.passive + na > self.max_nodes
        {
            na = self.max_nodes - self.passive;
            children.truncate(na * ni);
        }
        if na == 0
        {
            return Ok(None);
        }

        self.active = na;
        self.level += 1;
        self.target.monitor(self.level, self.passive, self.active);

        Ok(Some(State { indices: children, ..Default::default() }))
    }

    fn score(&self, element: &Element) -> f64
    {
        support::sum_absolute(element.surplus) / element.surplus.len() as f64
    }
}
