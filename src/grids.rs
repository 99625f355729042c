use crate::errors::AdaptError;
use crate::index::LevelOrder;

pub mod closed;

///
/// A sparse grid: maps packed indices to node coordinates and enumerates
/// descendants. Implementations are cheap value types invoked in hot
/// loops.
///
pub trait Grid
{
    /// Nodes corresponding to a set of indices, dimension-major.
    fn compute(&self, indices: &[LevelOrder]) -> Vec<f64>;

    /// Child indices corresponding to a set of parent indices.
    fn children(&self, indices: &[LevelOrder]) -> Result<Vec<LevelOrder>, AdaptError>;

    ///
    /// Single-node indices spanned by a set of level indices, together
    /// with the number of nodes contributed by each level index.
    ///
    fn index(&self, lindices: &[LevelOrder]) -> Result<(Vec<LevelOrder>, Vec<usize>), AdaptError>;
}
