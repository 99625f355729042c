use indexmap::IndexSet;
use nohash_hasher::BuildNoHashHasher;
use rustc_hash::FxBuildHasher;

use crate::index::LevelOrder;

pub type FastU64Map<V> = std::collections::HashMap<u64, V, BuildNoHashHasher<u64>>;

/// Insertion-ordered set of node positions, so that priority scans and
/// tie-breaking are deterministic across runs.
pub type ActiveSet = IndexSet<usize, FxBuildHasher>;

///
/// Book-keeper of level indices for the generalized sparse grid. Admitted
/// level indices are append-only; the active subset is still open for
/// forward expansion. `forward` and `backward` reference neighbours in
/// the lattice, keyed by node position times dimension count plus
/// dimension, and each edge goes from a lower to a higher level.
///
pub struct Tracker
{
    indices: Vec<LevelOrder>,
    active: ActiveSet,

    ni: usize,
    nn: usize,
    lmax: u32,
    imax: usize,

    forward: FastU64Map<usize>,
    backward: FastU64Map<usize>,

    initialized: bool,
}

impl Tracker
{
    pub fn new(ni: usize, lmax: u32, imax: usize) -> Self
    {
        let mut active = ActiveSet::default();
        active.insert(0);
        Self {
            indices: vec![LevelOrder::ROOT; ni],
            active,
            ni,
            nn: 1,
            lmax,
            imax,
            forward: FastU64Map::default(),
            backward: FastU64Map::default(),
            initialized: false,
        }
    }

    ///
    /// Deactivate a level index and admit the admissible part of its
    /// forward neighbourhood, returning the newly admitted level indices.
    /// The first call bootstraps the tracker and returns the root.
    ///
    pub fn forward(&mut self, k: usize) -> &[LevelOrder]
    {
        if !self.initialized
        {
            self.initialized = true;
            return &self.indices;
        }

        let ni = self.ni;
        let mut nn = self.nn;

        self.active.shift_remove(&k);

        'outer: for i in 0..ni
        {
            if nn >= self.imax
            {
                break;
            }
            if self.indices[k * ni + i].level() >= self.lmax
            {
                continue;
            }

            // A neighbour in direction i is admissible only if, in every
            // other occupied dimension j, the index one step back in j
            // and one step forward in i exists and has been consumed.
            let mut new_backward = Vec::with_capacity(ni);
            for j in 0..ni
            {
                if i == j || self.indices[k * ni + j].level() == 0
                {
                    continue;
                }
                let Some(&b) = self.backward.get(&self.key(k, j)) else { continue 'outer };
                match self.forward.get(&self.key(b, i))
                {
                    Some(&l) if !self.active.contains(&l) => new_backward.push((j, l)),
                    _ => continue 'outer,
                }
            }
            new_backward.push((i, k));

            for &(j, l) in &new_backward
            {
                let from = self.key(l, j);
                let to = self.key(nn, j);
                self.forward.insert(from, nn);
                self.backward.insert(to, l);
            }

            for d in 0..ni
            {
                let word = self.indices[k * ni + d];
                self.indices.push(word);
            }
            let grown = self.indices.len() - ni + i;
            let level = self.indices[grown].level();
            self.indices[grown] = LevelOrder::from_parts(level + 1, 0);

            self.active.insert(nn);
            nn += 1;
        }

        let admitted = self.nn;
        self.nn = nn;
        &self.indices[admitted * ni..]
    }

    pub fn active(&self) -> &ActiveSet
    {
        &self.active
    }

    pub fn indices(&self) -> &[LevelOrder]
    {
        &self.indices
    }

    pub fn count_total(&self) -> usize
    {
        self.nn
    }

    pub fn count_active(&self) -> usize
    {
        self.active.len()
    }

    pub fn count_passive(&self) -> usize
    {
        self.count_total() - self.count_active()
    }

    #[inline]
    fn key(&self, node: usize, dimension: usize) -> u64
    {
        (node * self.ni + dimension) as u64
    }
}

#[cfg(test)]
fn predecessors_present(tracker: &Tracker, lindex: &[LevelOrder]) -> bool
{
    let ni = lindex.len();
    (0..ni).filter(|&i| lindex[i].level() > 0).all(|i|
    {
        let mut predecessor = lindex.to_vec();
        predecessor[i] = LevelOrder::from_parts(lindex[i].level() - 1, 0);
        tracker.indices().chunks_exact(ni).any(|candidate| candidate == predecessor)
    })
}

#[test]
fn check_bootstrap()
{
    let mut tracker = Tracker::new(2, 4, 100);
    let first = tracker.forward(0).to_vec();
    assert_eq!(first, vec![LevelOrder::ROOT; 2]);
    assert_eq!(tracker.count_total(), 1);
    assert_eq!(tracker.count_active(), 1);
}

#[test]
fn check_forward_from_root()
{
    let mut tracker = Tracker::new(2, 4, 100);
    tracker.forward(0);
    let admitted = tracker.forward(0).to_vec();
    // One neighbour per dimension.
    assert_eq!(admitted.len(), 2 * 2);
    assert_eq!(&admitted[0..2], &[LevelOrder::from_parts(1, 0), LevelOrder::ROOT]);
    assert_eq!(&admitted[2..4], &[LevelOrder::ROOT, LevelOrder::from_parts(1, 0)]);
    assert_eq!(tracker.count_active(), 2);
    assert_eq!(tracker.count_passive(), 1);
}

#[test]
fn check_diagonal_requires_consumed_neighbours()
{
    let mut tracker = Tracker::new(2, 4, 100);
    tracker.forward(0);
    tracker.forward(0);
    // Expanding (1, 0) while (0, 1) is still active must not admit
    // (1, 1); only (2, 0) appears.
    let admitted = tracker.forward(1).to_vec();
    assert_eq!(admitted.len(), 2);
    assert_eq!(&admitted[0..2], &[LevelOrder::from_parts(2, 0), LevelOrder::ROOT]);
    // Now both parents of (1, 1) are passive, so expanding (0, 1)
    // admits it together with (0, 2).
    let admitted = tracker.forward(2).to_vec();
    assert_eq!(admitted.len(), 2 * 2);
    assert_eq!(&admitted[0..2], &[LevelOrder::from_parts(1, 0), LevelOrder::from_parts(1, 0)]);
    assert_eq!(&admitted[2..4], &[LevelOrder::ROOT, LevelOrder::from_parts(2, 0)]);
}

#[test]
fn check_admissibility_under_saturation()
{
    let (ni, lmax, imax) = (3, 4, 20);
    let mut tracker = Tracker::new(ni, lmax, imax);
    tracker.forward(0);
    loop
    {
        let Some(&k) = tracker.active().first() else { break };
        tracker.forward(k);
        if tracker.count_active() == 0
        {
            break;
        }
    }
    assert!(tracker.count_total() <= imax);
    for lindex in tracker.indices().chunks_exact(ni)
    {
        assert!(predecessors_present(&tracker, lindex));
        assert!(lindex.iter().all(|word| word.level() <= lmax));
    }
}

#[test]
fn check_level_cap()
{
    let mut tracker = Tracker::new(1, 2, 100);
    tracker.forward(0);
    tracker.forward(0); // admits level 1
    tracker.forward(1); // admits level 2
    let admitted = tracker.forward(2).to_vec(); // level 2 == lmax, nothing to admit
    assert!(admitted.is_empty());
    assert_eq!(tracker.count_total(), 3);
    assert_eq!(tracker.count_active(), 0);
}
