use crate::basis::Basis;
use crate::index::LevelOrder;

///
/// Tensor-product hierarchical polynomial basis on the closed grid. The
/// factor in each dimension is the hat function when the effective power
/// is 1 and a Lagrange polynomial through the node and its ancestors
/// otherwise. The effective power is clamped to the node's level, so the
/// ancestor walk never runs past the root.
///
#[derive(Clone, Copy, Debug)]
pub struct ClosedBasis
{
    inputs: usize,
    power: u32,
}

impl ClosedBasis
{
    pub fn new(inputs: usize, power: u32) -> Self
    {
        Self { inputs, power }
    }

    pub fn inputs(&self) -> usize
    {
        self.inputs
    }
}

impl Basis for ClosedBasis
{
    fn compute(&self, index: &[LevelOrder], point: &[f64]) -> f64
    {
        let mut value = 1.0;

        for (word, &x) in index.iter().zip(point)
        {
            let level = word.level();
            let power = level.min(self.power);
            if power == 0
            {
                continue; // value *= 1.0
            }

            let (xi, step) = word.node();
            let delta = (x - xi).abs();
            if delta >= step
            {
                return 0.0; // value *= 0.0
            }

            if power == 1
            {
                value *= 1.0 - delta / step;
                continue;
            }

            let (xl, xr) = (xi - step, xi + step);
            value *= (x - xl) / (xi - xl);
            value *= (x - xr) / (xi - xr);

            // The immediate parent sits at xi - step or xi + step and is
            // already accounted for; ancestors start at the grandparent.
            let mut ancestor = word.parent();
            for _ in 3..power
            {
                ancestor = ancestor.parent();
                let (xj, _) = ancestor.node();
                value *= (x - xj) / (xi - xj);
            }
        }

        value
    }

    fn integrate(&self, _index: &[LevelOrder]) -> f64
    {
        0.0
    }
}

#[test]
fn check_hat_values()
{
    let basis = ClosedBasis::new(1, 1);
    let root = [LevelOrder::ROOT];
    assert_eq!(basis.compute(&root, &[0.0]), 1.0);
    assert_eq!(basis.compute(&root, &[0.3]), 1.0);
    assert_eq!(basis.compute(&root, &[1.0]), 1.0);

    let left = [LevelOrder::from_parts(1, 0)];
    assert_eq!(basis.compute(&left, &[0.0]), 1.0);
    assert_eq!(basis.compute(&left, &[0.25]), 0.5);
    assert_eq!(basis.compute(&left, &[0.5]), 0.0);

    let mid = [LevelOrder::from_parts(2, 1)];
    assert_eq!(basis.compute(&mid, &[0.25]), 1.0);
    assert_eq!(basis.compute(&mid, &[0.125]), 0.5);
    assert_eq!(basis.compute(&mid, &[0.5]), 0.0);
}

#[test]
fn check_support_locality()
{
    let basis = ClosedBasis::new(2, 3);
    let index = [LevelOrder::from_parts(2, 1), LevelOrder::from_parts(3, 5)];
    // Outside the support in either dimension the product vanishes.
    assert_eq!(basis.compute(&index, &[0.55, 0.625]), 0.0);
    assert_eq!(basis.compute(&index, &[0.25, 0.80]), 0.0);
    assert!(basis.compute(&index, &[0.30, 0.60]) != 0.0);
}

#[test]
fn check_unit_at_own_node()
{
    for power in 1..5u32
    {
        let basis = ClosedBasis::new(1, power);
        for (level, order) in [(0u32, 0u32), (1, 0), (1, 2), (2, 1), (2, 3), (3, 3), (4, 9)]
        {
            let index = [LevelOrder::from_parts(level, order)];
            let (x, _) = index[0].node();
            let value = basis.compute(&index, &[x]);
            assert!((value - 1.0).abs() < 1e-12, "power {power} level {level} order {order}");
        }
    }
}

#[test]
fn check_quadratic_factor()
{
    // Power 2 at level 2: the factor through the node and its two
    // neighbours at +/- step.
    let basis = ClosedBasis::new(1, 2);
    let index = [LevelOrder::from_parts(2, 1)];
    let (xi, step) = index[0].node();
    let (xl, xr) = (xi - step, xi + step);
    let x = 0.3;
    let expected = (x - xl) / (xi - xl) * ((x - xr) / (xi - xr));
    assert!((basis.compute(&index, &[x]) - expected).abs() < 1e-15);
}

#[test]
fn check_power_clamped_to_level()
{
    // At level 1 any power behaves like the hat.
    let flat = ClosedBasis::new(1, 1);
    let high = ClosedBasis::new(1, 7);
    let index = [LevelOrder::from_parts(1, 2)];
    for x in [0.55, 0.7, 0.95]
    {
        assert_eq!(flat.compute(&index, &[x]), high.compute(&index, &[x]));
    }
}
