use crate::errors::AdaptError;
use crate::grids::Grid;
use crate::index::LevelOrder;

///
/// The closed equidistant grid on [0, 1]^n. Level 0 holds the centre,
/// level 1 the two endpoints, and each level l >= 2 the interior dyadic
/// points with odd orders.
///
#[derive(Clone, Copy, Debug)]
pub struct ClosedGrid
{
    inputs: usize,
}

impl ClosedGrid
{
    pub fn new(inputs: usize) -> Self
    {
        Self { inputs }
    }

    pub fn inputs(&self) -> usize
    {
        self.inputs
    }

    fn orders(level: u64) -> Result<Vec<LevelOrder>, AdaptError>
    {
        let list = match level
        {
            0 => vec![LevelOrder::ROOT],
            1 => vec![LevelOrder::from_parts(1, 0), LevelOrder::from_parts(1, 2)],
            2..=32 => (0..(1u64 << (level - 1)))
                .map(|i| LevelOrder::pack(level, 2 * i + 1))
                .collect::<Result<_, _>>()?,
            _ => return Err(AdaptError::OrderOverflow),
        };
        Ok(list)
    }
}

impl Grid for ClosedGrid
{
    fn compute(&self, indices: &[LevelOrder]) -> Vec<f64>
    {
        indices.iter().map(|index| index.node().0).collect()
    }

    fn children(&self, indices: &[LevelOrder]) -> Result<Vec<LevelOrder>, AdaptError>
    {
        let nd = self.inputs;
        let nn = indices.len() / nd;
        let mut child_indices = Vec::with_capacity(2 * nn * nd * nd);

        let mut push = |parent: &[LevelOrder], d: usize, level: u64, order: u64| -> Result<(), AdaptError>
        {
            let word = LevelOrder::pack(level, order)?;
            child_indices.extend_from_slice(parent);
            let base = child_indices.len() - nd;
            child_indices[base + d] = word;
            Ok(())
        };

        for parent in indices.chunks_exact(nd)
        {
            for d in 0..nd
            {
                let level = parent[d].level() as u64;
                let order = parent[d].order() as u64;
                match level
                {
                    0 =>
                    {
                        push(parent, d, 1, 0)?;
                        push(parent, d, 1, 2)?;
                    }
                    1 =>
                    {
                        push(parent, d, 2, order + 1)?;
                    }
                    _ =>
                    {
                        push(parent, d, level + 1, 2 * order - 1)?;
                        push(parent, d, level + 1, 2 * order + 1)?;
                    }
                }
            }
        }

        Ok(child_indices)
    }

    fn index(&self, lindices: &[LevelOrder]) -> Result<(Vec<LevelOrder>, Vec<usize>), AdaptError>
    {
        let nd = self.inputs;
        let nn = lindices.len() / nd;
        let mut indices = Vec::new();
        let mut counts = Vec::with_capacity(nn);

        for lindex in lindices.chunks_exact(nd)
        {
            let before = indices.len();

            let mut orders = Vec::with_capacity(nd);
            for word in lindex
            {
                orders.push(Self::orders(word.level() as u64)?);
            }

            let mut cursor = vec![0usize; nd];
            loop
            {
                for d in 0..nd
                {
                    indices.push(orders[d][cursor[d]]);
                }
                let mut d = 0;
                while d < nd
                {
                    cursor[d] += 1;
                    if cursor[d] < orders[d].len()
                    {
                        break;
                    }
                    cursor[d] = 0;
                    d += 1;
                }
                if d == nd
                {
                    break;
                }
            }

            counts.push((indices.len() - before) / nd);
        }

        Ok((indices, counts))
    }
}

#[test]
fn check_children_one_dimension()
{
    let grid = ClosedGrid::new(1);
    let children = grid.children(&[LevelOrder::ROOT]).unwrap();
    assert_eq!(children, vec![LevelOrder::from_parts(1, 0), LevelOrder::from_parts(1, 2)]);

    let children = grid.children(&[LevelOrder::from_parts(1, 0)]).unwrap();
    assert_eq!(children, vec![LevelOrder::from_parts(2, 1)]);

    let children = grid.children(&[LevelOrder::from_parts(1, 2)]).unwrap();
    assert_eq!(children, vec![LevelOrder::from_parts(2, 3)]);

    let children = grid.children(&[LevelOrder::from_parts(2, 1)]).unwrap();
    assert_eq!(children, vec![LevelOrder::from_parts(3, 1), LevelOrder::from_parts(3, 3)]);
}

#[test]
fn check_children_share_other_dimensions()
{
    let grid = ClosedGrid::new(2);
    let parent = [LevelOrder::from_parts(1, 0), LevelOrder::from_parts(2, 3)];
    let children = grid.children(&parent).unwrap();
    assert_eq!(children.len(), 3 * 2);
    assert_eq!(&children[0..2], &[LevelOrder::from_parts(2, 1), LevelOrder::from_parts(2, 3)]);
    assert_eq!(&children[2..4], &[LevelOrder::from_parts(1, 0), LevelOrder::from_parts(3, 5)]);
    assert_eq!(&children[4..6], &[LevelOrder::from_parts(1, 0), LevelOrder::from_parts(3, 7)]);
}

#[test]
fn check_compute()
{
    let grid = ClosedGrid::new(2);
    let nodes = grid.compute(&[
        LevelOrder::ROOT,
        LevelOrder::from_parts(1, 2),
        LevelOrder::from_parts(2, 1),
        LevelOrder::from_parts(3, 5),
    ]);
    assert_eq!(nodes, vec![0.5, 1.0, 0.25, 0.625]);
}

#[test]
fn check_index_expansion()
{
    let grid = ClosedGrid::new(2);

    let root = [LevelOrder::ROOT, LevelOrder::ROOT];
    let (indices, counts) = grid.index(&root).unwrap();
    assert_eq!(counts, vec![1]);
    assert_eq!(indices, root.to_vec());

    // Levels (2, 1): two odd orders in the first dimension, two endpoints
    // in the second.
    let lindex = [LevelOrder::from_parts(2, 0), LevelOrder::from_parts(1, 0)];
    let (indices, counts) = grid.index(&lindex).unwrap();
    assert_eq!(counts, vec![4]);
    assert_eq!(indices.len(), 4 * 2);
    for single in indices.chunks_exact(2)
    {
        assert_eq!(single[0].level(), 2);
        assert_eq!(single[0].order() % 2, 1);
        assert_eq!(single[1].level(), 1);
        assert!(single[1].order() == 0 || single[1].order() == 2);
    }
}

#[test]
fn check_index_counts_partition()
{
    let grid = ClosedGrid::new(3);
    let lindices = [
        LevelOrder::ROOT, LevelOrder::ROOT, LevelOrder::ROOT,
        LevelOrder::from_parts(1, 0), LevelOrder::from_parts(3, 0), LevelOrder::ROOT,
    ];
    let (indices, counts) = grid.index(&lindices).unwrap();
    assert_eq!(counts, vec![1, 2 * 4]);
    assert_eq!(indices.len(), (1 + 8) * 3);
}
