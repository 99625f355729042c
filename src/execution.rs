use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::{ParallelSlice, ParallelSliceMut};

use crate::basis::Basis;
use crate::errors::AdaptError;
use crate::index::LevelOrder;
use crate::interpolator::Target;

///
/// The evaluation pool: a fan-out/fan-in parallel map over node lists.
/// Results are written into disjoint per-point slots, so the output is
/// ordered by input index and bit-identical for any worker count.
///
pub struct Workers
{
    pool: rayon::ThreadPool,
}

impl Workers
{
    /// A pool of `count` workers; 0 means one per hardware thread.
    pub fn new(count: usize) -> Result<Self, AdaptError>
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(count)
            .build()
            .map_err(|_| AdaptError::ThreadPoolFailed)?;
        Ok(Self { pool })
    }

    ///
    /// Evaluate the target at each node. The first target failure is
    /// surfaced and remaining work is skipped; no partial values leak
    /// out.
    ///
    pub fn invoke<T: Target + ?Sized>(
        &self,
        target: &T,
        nodes: &[f64],
        ni: usize,
        no: usize,
    ) -> Result<Vec<f64>, AdaptError>
    {
        let nn = nodes.len() / ni;
        let mut values = vec![0.0; nn * no];
        self.pool.install(||
        {
            nodes
                .par_chunks(ni)
                .zip(values.par_chunks_mut(no))
                .try_for_each(|(point, value)| target.compute(point, value))
        })?;
        Ok(values)
    }

    ///
    /// Evaluate the interpolant given by `indices` and `surpluses` at
    /// each query point, skipping zero-weighted terms.
    ///
    pub fn approximate<B: Basis + ?Sized>(
        &self,
        basis: &B,
        indices: &[LevelOrder],
        surpluses: &[f64],
        points: &[f64],
        ni: usize,
        no: usize,
    ) -> Vec<f64>
    {
        let np = points.len() / ni;
        let mut values = vec![0.0; np * no];
        self.pool.install(||
        {
            points
                .par_chunks(ni)
                .zip(values.par_chunks_mut(no))
                .for_each(|(point, value)|
                {
                    for (index, surplus) in indices.chunks(ni).zip(surpluses.chunks(no))
                    {
                        let weight = basis.compute(index, point);
                        if weight == 0.0
                        {
                            continue;
                        }
                        for (v, &s) in value.iter_mut().zip(surplus)
                        {
                            *v += weight * s;
                        }
                    }
                })
        });
        values
    }
}

#[cfg(test)]
struct Paraboloid;

#[cfg(test)]
impl Target for Paraboloid
{
    fn dimensions(&self) -> (usize, usize)
    {
        (2, 1)
    }

    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        value[0] = point[0] * point[0] + point[1] * point[1];
        Ok(())
    }
}

#[cfg(test)]
struct Faulty;

#[cfg(test)]
impl Target for Faulty
{
    fn dimensions(&self) -> (usize, usize)
    {
        (1, 1)
    }

    fn compute(&self, point: &[f64], value: &mut [f64]) -> Result<(), AdaptError>
    {
        if point[0] > 0.5
        {
            return Err(AdaptError::TargetFailure);
        }
        value[0] = point[0];
        Ok(())
    }
}

#[test]
fn check_invoke_order()
{
    let nodes: Vec<f64> = (0..64).map(|i| i as f64 / 64.0).collect();
    let expected: Vec<f64> = nodes
        .chunks_exact(2)
        .map(|p| p[0] * p[0] + p[1] * p[1])
        .collect();
    for count in [1, 2, 8]
    {
        let workers = Workers::new(count).unwrap();
        let values = workers.invoke(&Paraboloid, &nodes, 2, 1).unwrap();
        assert_eq!(values, expected);
    }
}

#[test]
fn check_invoke_surfaces_failure()
{
    let workers = Workers::new(4).unwrap();
    let nodes = vec![0.1, 0.2, 0.9, 0.3];
    assert_eq!(workers.invoke(&Faulty, &nodes, 1, 1), Err(AdaptError::TargetFailure));
}

#[test]
fn check_approximate_determinism()
{
    use crate::basis::closed::ClosedBasis;

    let indices = vec![
        LevelOrder::ROOT,
        LevelOrder::from_parts(1, 0),
        LevelOrder::from_parts(1, 2),
        LevelOrder::from_parts(2, 1),
    ];
    let surpluses = vec![1.0, 0.25, -0.5, 0.125];
    let basis = ClosedBasis::new(1, 1);
    let points: Vec<f64> = (0..101).map(|i| i as f64 / 100.0).collect();

    let reference = Workers::new(1)
        .unwrap()
        .approximate(&basis, &indices, &surpluses, &points, 1, 1);
    for count in [2, 8]
    {
        let workers = Workers::new(count).unwrap();
        let values = workers.approximate(&basis, &indices, &surpluses, &points, 1, 1);
        assert_eq!(values, reference);
    }
}
