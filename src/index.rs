use bitfield_struct::bitfield;
use serde::{Deserialize, Serialize};

use crate::errors::AdaptError;

/// Number of low bits of a packed word holding the level; the remaining
/// bits hold the order. The same split is used by every producer and
/// consumer of packed indices, including the surrogate's external shape.
pub const LEVEL_SIZE: u32 = 32;
pub const LEVEL_MASK: u64 = (1 << LEVEL_SIZE) - 1;
pub const ORDER_MASK: u64 = u64::MAX >> LEVEL_SIZE;

///
/// One dimension of a grid index packed into a 64-bit word. A
/// multi-dimensional index is a contiguous run of these, one per
/// dimension. A level index (levels only) uses the same layout with the
/// order fixed to zero.
///
#[bitfield(u64, new = false)]
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LevelOrder
{
    pub level: u32,
    pub order: u32,
}

impl LevelOrder
{
    pub const ROOT: Self = Self::from_parts(0, 0);

    #[inline]
    pub const fn from_parts(level: u32, order: u32) -> Self
    {
        Self::from_bits(level as u64 | ((order as u64) << LEVEL_SIZE))
    }

    /// Checked packing of wide values into the 32/32 split.
    pub fn pack(level: u64, order: u64) -> Result<Self, AdaptError>
    {
        if level > LEVEL_MASK
        {
            return Err(AdaptError::LevelOverflow);
        }
        if order > ORDER_MASK
        {
            return Err(AdaptError::OrderOverflow);
        }
        Ok(Self::from_bits(level | (order << LEVEL_SIZE)))
    }

    /// Coordinate of the node and its support half-width.
    #[inline]
    pub fn node(self) -> (f64, f64)
    {
        let level = self.level();
        if level == 0
        {
            (0.5, 1.0)
        }
        else
        {
            let step = (-(level as f64)).exp2();
            (self.order() as f64 * step, step)
        }
    }

    ///
    /// The immediate ancestor whose support contains this node. The root
    /// has no parent; callers guard level 0.
    ///
    #[inline]
    pub fn parent(self) -> Self
    {
        let (level, order) = (self.level(), self.order());
        match level
        {
            0 => self,
            1 => Self::ROOT,
            2 => Self::from_parts(1, order - 1),
            _ =>
            {
                let order = if ((order - 1) / 2) % 2 == 0 { (order + 1) / 2 } else { (order - 1) / 2 };
                Self::from_parts(level - 1, order)
            }
        }
    }

    ///
    /// The mirror node under the same parent. Nodes without a sibling
    /// (the root, and level 2, whose parent has a single child) are
    /// returned unchanged.
    ///
    #[inline]
    pub fn sibling(self) -> Self
    {
        let (level, order) = (self.level(), self.order());
        match level
        {
            0 | 2 => self,
            1 => Self::from_parts(1, if order == 0 { 2 } else { 0 }),
            _ =>
            {
                let order = if ((order - 1) / 2) % 2 == 1 { order - 2 } else { order + 2 };
                Self::from_parts(level, order)
            }
        }
    }
}

#[test]
fn check_pack_bounds()
{
    assert!(LevelOrder::pack(3, 5).is_ok());
    assert_eq!(LevelOrder::pack(1 << 32, 0), Err(AdaptError::LevelOverflow));
    assert_eq!(LevelOrder::pack(0, 1 << 32), Err(AdaptError::OrderOverflow));
    let word = LevelOrder::pack(4, 11).unwrap();
    assert_eq!((word.level(), word.order()), (4, 11));
}

#[test]
fn check_node_placement()
{
    assert_eq!(LevelOrder::ROOT.node(), (0.5, 1.0));
    assert_eq!(LevelOrder::from_parts(1, 0).node(), (0.0, 0.5));
    assert_eq!(LevelOrder::from_parts(1, 2).node(), (1.0, 0.5));
    assert_eq!(LevelOrder::from_parts(2, 1).node(), (0.25, 0.25));
    assert_eq!(LevelOrder::from_parts(3, 5).node(), (0.625, 0.125));
}

#[test]
fn check_parent_chain()
{
    assert_eq!(LevelOrder::from_parts(1, 2).parent(), LevelOrder::ROOT);
    assert_eq!(LevelOrder::from_parts(2, 1).parent(), LevelOrder::from_parts(1, 0));
    assert_eq!(LevelOrder::from_parts(2, 3).parent(), LevelOrder::from_parts(1, 2));
    assert_eq!(LevelOrder::from_parts(3, 1).parent(), LevelOrder::from_parts(2, 1));
    assert_eq!(LevelOrder::from_parts(3, 3).parent(), LevelOrder::from_parts(2, 1));
    assert_eq!(LevelOrder::from_parts(3, 5).parent(), LevelOrder::from_parts(2, 3));
    assert_eq!(LevelOrder::from_parts(3, 7).parent(), LevelOrder::from_parts(2, 3));
}

#[test]
fn check_parent_support()
{
    // The parent's node lies within the support half-width of the child.
    for level in 1..8u32
    {
        let orders: Vec<u32> = match level
        {
            1 => vec![0, 2],
            _ => (0..(1u32 << (level - 1))).map(|i| 2 * i + 1).collect(),
        };
        for order in orders
        {
            let child = LevelOrder::from_parts(level, order);
            let (x, step) = child.node();
            let (px, _) = child.parent().node();
            assert!((x - px).abs() <= step, "level {level} order {order}");
        }
    }
}

#[test]
fn check_sibling()
{
    assert_eq!(LevelOrder::ROOT.sibling(), LevelOrder::ROOT);
    assert_eq!(LevelOrder::from_parts(1, 0).sibling(), LevelOrder::from_parts(1, 2));
    assert_eq!(LevelOrder::from_parts(1, 2).sibling(), LevelOrder::from_parts(1, 0));
    assert_eq!(LevelOrder::from_parts(2, 1).sibling(), LevelOrder::from_parts(2, 1));
    assert_eq!(LevelOrder::from_parts(3, 1).sibling(), LevelOrder::from_parts(3, 3));
    assert_eq!(LevelOrder::from_parts(3, 3).sibling(), LevelOrder::from_parts(3, 1));
}
