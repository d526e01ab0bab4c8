//! Parallel index sets: local numbering of distributed entities.
//!
//! A [`ParallelIndexSet`] maps the global index of an entity of the
//! undistributed grid to its local index and [`Attribute`] on this process.
//! It is filled between [`ParallelIndexSet::begin_resize`] and
//! [`ParallelIndexSet::end_resize`] and read-only afterwards.

use crate::debug_invariants::{DebugInvariants, violation};
use crate::mesh_error::MeshHaloError;
use crate::overlap::OverlapMap;
use std::collections::BTreeSet;

/// Ownership attribute of a distributed entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Attribute {
    /// This process holds the authoritative copy.
    Owner,
    /// Ghost replica of an entity owned elsewhere.
    Copy,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocalIndex {
    index: usize,
    attribute: Attribute,
    public: bool,
}

impl LocalIndex {
    pub const fn new(index: usize, attribute: Attribute, public: bool) -> Self {
        Self {
            index,
            attribute,
            public,
        }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Whether the entity may be referenced by other processes.
    pub const fn is_public(&self) -> bool {
        self.public
    }
}

/// One `(global, local)` entry of an index set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexPair {
    global: usize,
    local: LocalIndex,
}

impl IndexPair {
    pub const fn global(&self) -> usize {
        self.global
    }

    pub const fn local(&self) -> LocalIndex {
        self.local
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
enum ResizeState {
    #[default]
    Ground,
    Resize,
}

#[derive(Clone, Debug, Default)]
pub struct ParallelIndexSet {
    pairs: Vec<IndexPair>,
    by_local: Vec<usize>,
    state: ResizeState,
}

impl ParallelIndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the set for mutation.
    pub fn begin_resize(&mut self) -> Result<(), MeshHaloError> {
        if self.state == ResizeState::Resize {
            return Err(MeshHaloError::IndexSetResizing);
        }
        self.state = ResizeState::Resize;
        Ok(())
    }

    /// Add an entry. Only allowed inside the resize bracket.
    pub fn add(&mut self, global: usize, local: LocalIndex) -> Result<(), MeshHaloError> {
        if self.state != ResizeState::Resize {
            return Err(MeshHaloError::IndexSetNotResizing);
        }
        self.pairs.push(IndexPair { global, local });
        Ok(())
    }

    /// Close the resize bracket: sort by global index and freeze.
    ///
    /// Fails if a global index was added twice or the local indices are not
    /// a permutation of `0..len`.
    pub fn end_resize(&mut self) -> Result<(), MeshHaloError> {
        if self.state != ResizeState::Resize {
            return Err(MeshHaloError::IndexSetNotResizing);
        }
        self.pairs.sort_by_key(|p| p.global);
        if let Some(w) = self.pairs.windows(2).find(|w| w[0].global == w[1].global) {
            return Err(MeshHaloError::DuplicateGlobalIndex(w[0].global));
        }
        let mut by_local = vec![usize::MAX; self.pairs.len()];
        for (pos, pair) in self.pairs.iter().enumerate() {
            match by_local.get_mut(pair.local.index) {
                Some(slot) if *slot == usize::MAX => *slot = pos,
                _ => {
                    return Err(violation(format!(
                        "local index {} is duplicated or outside 0..{}",
                        pair.local.index,
                        self.pairs.len()
                    )));
                }
            }
        }
        self.by_local = by_local;
        self.state = ResizeState::Ground;
        Ok(())
    }

    pub fn is_resizing(&self) -> bool {
        self.state == ResizeState::Resize
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Look up the entry of a global index.
    pub fn get(&self, global: usize) -> Result<Option<&IndexPair>, MeshHaloError> {
        if self.is_resizing() {
            return Err(MeshHaloError::IndexSetResizing);
        }
        Ok(self
            .pairs
            .binary_search_by_key(&global, |p| p.global)
            .ok()
            .map(|pos| &self.pairs[pos]))
    }

    /// Look up the entry of a local index.
    pub fn by_local(&self, local: usize) -> Result<Option<&IndexPair>, MeshHaloError> {
        if self.is_resizing() {
            return Err(MeshHaloError::IndexSetResizing);
        }
        Ok(self.by_local.get(local).map(|&pos| &self.pairs[pos]))
    }

    /// Entries in ascending global order.
    pub fn iter(&self) -> std::slice::Iter<'_, IndexPair> {
        self.pairs.iter()
    }

    pub fn count(&self, attribute: Attribute) -> usize {
        self.pairs
            .iter()
            .filter(|p| p.local.attribute == attribute)
            .count()
    }
}

impl<'a> IntoIterator for &'a ParallelIndexSet {
    type Item = &'a IndexPair;
    type IntoIter = std::slice::Iter<'a, IndexPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl DebugInvariants for ParallelIndexSet {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "ParallelIndexSet");
    }

    fn validate_invariants(&self) -> Result<(), MeshHaloError> {
        if self.is_resizing() {
            return Err(MeshHaloError::IndexSetResizing);
        }
        if self.pairs.windows(2).any(|w| w[0].global >= w[1].global) {
            return Err(violation("index set is not strictly sorted by global index"));
        }
        for (local, &pos) in self.by_local.iter().enumerate() {
            if self.pairs.get(pos).map(|p| p.local.index) != Some(local) {
                return Err(violation(format!("local index {local} is not mapped back")));
            }
        }
        Ok(())
    }
}

/// Cell numbering of one process, as produced by [`build_cell_index_set`].
#[derive(Clone, Debug, Default)]
pub struct CellIndexSet {
    /// Frozen `global → (local, attribute)` set.
    pub index_set: ParallelIndexSet,
    /// Global cell index → local index, `None` for cells absent here.
    pub global_to_local: Vec<Option<usize>>,
}

/// Number the cells this process owns or ghosts.
///
/// Cells are visited in global order; a cell is kept when `my_rank` owns it
/// or appears in its overlap set. Local indices are handed out in that order,
/// so numbering is stable and deterministic.
pub fn build_cell_index_set(
    overlap: &OverlapMap,
    cell_part: &[usize],
    my_rank: usize,
) -> Result<CellIndexSet, MeshHaloError> {
    if overlap.len() != cell_part.len() {
        return Err(MeshHaloError::PartitionLengthMismatch {
            expected: overlap.len(),
            got: cell_part.len(),
        });
    }
    let mut index_set = ParallelIndexSet::new();
    let mut global_to_local = Vec::with_capacity(cell_part.len());
    let mut count = 0usize;

    index_set.begin_resize()?;
    for (global, &owner) in cell_part.iter().enumerate() {
        let attribute = if owner == my_rank {
            Some(Attribute::Owner)
        } else if overlap.ranks(global).contains(&my_rank) {
            Some(Attribute::Copy)
        } else {
            None
        };
        match attribute {
            Some(attribute) => {
                global_to_local.push(Some(count));
                index_set.add(global, LocalIndex::new(count, attribute, true))?;
                count += 1;
            }
            None => global_to_local.push(None),
        }
    }
    index_set.end_resize()?;

    log::debug!(
        "rank {my_rank}: {} owned and {} copied cells",
        index_set.count(Attribute::Owner),
        index_set.count(Attribute::Copy)
    );
    if index_set.count(Attribute::Owner) == 0 {
        log::warn!("rank {my_rank} owns no cells");
    }

    Ok(CellIndexSet {
        index_set,
        global_to_local,
    })
}

/// Ranks other than `my_rank` that this process exchanges cells with.
pub fn neighbour_ranks(
    index_set: &ParallelIndexSet,
    overlap: &OverlapMap,
    cell_part: &[usize],
    my_rank: usize,
) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    for pair in index_set {
        match pair.local().attribute() {
            Attribute::Copy => {
                out.insert(cell_part[pair.global()]);
            }
            Attribute::Owner => out.extend(overlap.ranks(pair.global()).iter().copied()),
        }
    }
    out.remove(&my_rank);
    out
}
