//! Overlap growth: which ranks keep a ghost copy of which cells.
//!
//! Starting from every rank's owned cells, each layer makes the
//! face-neighbours of the cells a rank already sees visible to that rank.
//! After `k` layers a cell is ghosted on rank `r` exactly when it lies within
//! `k` face hops of a cell owned by `r`.

use crate::mesh_error::MeshHaloError;
use crate::topology::grid::GlobalGrid;
use std::collections::BTreeSet;

/// Per global cell, the ranks other than its owner that hold it as a Copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlapMap {
    ranks: Vec<BTreeSet<usize>>,
}

impl OverlapMap {
    /// Map over `num_cells` cells with no ghosts.
    pub fn new(num_cells: usize) -> Self {
        Self {
            ranks: vec![BTreeSet::new(); num_cells],
        }
    }

    /// Record that `rank` ghosts `cell`. Returns `false` if it already did.
    pub fn insert(&mut self, cell: usize, rank: usize) -> bool {
        self.ranks[cell].insert(rank)
    }

    /// Ghosting ranks of `cell`, ascending.
    pub fn ranks(&self, cell: usize) -> &BTreeSet<usize> {
        &self.ranks[cell]
    }

    pub fn is_shared(&self, cell: usize) -> bool {
        !self.ranks[cell].is_empty()
    }

    /// Number of cells covered by the map.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Number of `(cell, ghosting rank)` pairs.
    pub fn num_copies(&self) -> usize {
        self.ranks.iter().map(BTreeSet::len).sum()
    }
}

/// Check that `parts` assigns every one of `num_cells` cells to a rank below `num_ranks`.
pub fn validate_partition(
    parts: &[usize],
    num_cells: usize,
    num_ranks: usize,
) -> Result<(), MeshHaloError> {
    if parts.len() != num_cells {
        return Err(MeshHaloError::PartitionLengthMismatch {
            expected: num_cells,
            got: parts.len(),
        });
    }
    if let Some((cell, &rank)) = parts.iter().enumerate().find(|(_, r)| **r >= num_ranks) {
        return Err(MeshHaloError::RankOutOfRange {
            cell,
            rank,
            size: num_ranks,
        });
    }
    Ok(())
}

/// Grow `layers` overlap layers around every rank's owned cells.
///
/// `cell_part` must already be validated against the grid and process group.
/// With `layers == 0` the result has no ghosts at all.
pub fn add_overlap_layers<C, F, P>(
    grid: &GlobalGrid<C, F, P>,
    cell_part: &[usize],
    layers: usize,
) -> OverlapMap {
    let mut overlap = OverlapMap::new(grid.num_cells());
    let mut frontier: Vec<(usize, usize)> = cell_part.iter().copied().enumerate().collect();
    for layer in 0..layers {
        let mut next = Vec::new();
        for &(cell, rank) in &frontier {
            for nbr in grid.face_neighbours(cell) {
                if cell_part[nbr] != rank && overlap.insert(nbr, rank) {
                    next.push((nbr, rank));
                }
            }
        }
        log::trace!("overlap layer {}: {} new ghost copies", layer + 1, next.len());
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::meshgen::cartesian_box;

    #[test]
    fn zero_layers_means_no_ghosts() {
        let grid = cartesian_box(4, 1, 1).unwrap();
        let ov = add_overlap_layers(&grid, &[0, 0, 1, 1], 0);
        assert_eq!(ov.num_copies(), 0);
    }

    #[test]
    fn layers_extend_hop_by_hop() {
        let grid = cartesian_box(6, 1, 1).unwrap();
        let parts = [0, 0, 0, 1, 1, 1];
        let ov = add_overlap_layers(&grid, &parts, 2);
        // rank 1 sees cells 1 and 2, rank 0 sees cells 3 and 4
        assert!(ov.ranks(2).contains(&1));
        assert!(ov.ranks(1).contains(&1));
        assert!(!ov.ranks(0).contains(&1));
        assert!(ov.ranks(3).contains(&0));
        assert!(ov.ranks(4).contains(&0));
        assert!(!ov.ranks(5).contains(&0));
        assert_eq!(ov.num_copies(), 4);
    }

    #[test]
    fn owner_never_ghosts_its_own_cell() {
        let grid = cartesian_box(3, 3, 1).unwrap();
        let parts: Vec<usize> = (0..9).map(|c| c % 3).collect();
        let ov = add_overlap_layers(&grid, &parts, 3);
        for (cell, &owner) in parts.iter().enumerate() {
            assert!(!ov.ranks(cell).contains(&owner));
        }
    }

    #[test]
    fn partition_validation() {
        assert!(validate_partition(&[0, 1], 2, 2).is_ok());
        assert!(matches!(
            validate_partition(&[0, 2], 2, 2),
            Err(MeshHaloError::RankOutOfRange { cell: 1, rank: 2, size: 2 })
        ));
        assert!(matches!(
            validate_partition(&[0], 2, 2),
            Err(MeshHaloError::PartitionLengthMismatch { expected: 2, got: 1 })
        ));
    }
}
