use serde::{Deserialize, Serialize};

use crate::index::LevelOrder;

///
/// The produced interpolant: packed node indices and their hierarchical
/// surpluses, in append order. The append order is authoritative; nodes
/// are never reordered or mutated after insertion. Indices use the 32/32
/// level/order split of [`crate::index::LevelOrder`].
///
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Surrogate
{
    inputs: usize,
    outputs: usize,
    nodes: usize,
    indices: Vec<LevelOrder>,
    surpluses: Vec<f64>,
}

impl Surrogate
{
    pub fn new(inputs: usize, outputs: usize) -> Self
    {
        Self { inputs, outputs, nodes: 0, indices: Vec::new(), surpluses: Vec::new() }
    }

    pub fn inputs(&self) -> usize
    {
        self.inputs
    }

    pub fn outputs(&self) -> usize
    {
        self.outputs
    }

    pub fn nodes(&self) -> usize
    {
        self.nodes
    }

    pub fn indices(&self) -> &[LevelOrder]
    {
        &self.indices
    }

    pub fn surpluses(&self) -> &[f64]
    {
        &self.surpluses
    }

    /// Append a batch of nodes and their surpluses.
    pub fn push(&mut self, indices: &[LevelOrder], surpluses: &[f64])
    {
        debug_assert_eq!(indices.len() / self.inputs, surpluses.len() / self.outputs);
        self.indices.extend_from_slice(indices);
        self.surpluses.extend_from_slice(surpluses);
        self.nodes = self.indices.len() / self.inputs;
    }
}

#[test]
fn check_push()
{
    let mut surrogate = Surrogate::new(2, 1);
    surrogate.push(&[LevelOrder::ROOT, LevelOrder::ROOT], &[7.0]);
    surrogate.push(
        &[
            LevelOrder::from_parts(1, 0), LevelOrder::ROOT,
            LevelOrder::from_parts(1, 2), LevelOrder::ROOT,
        ],
        &[0.5, -0.5],
    );
    assert_eq!(surrogate.nodes(), 3);
    assert_eq!(surrogate.indices().len(), 6);
    assert_eq!(surrogate.surpluses(), &[7.0, 0.5, -0.5]);
}
