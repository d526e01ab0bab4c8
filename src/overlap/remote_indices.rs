//! Remote references of shared cells, grouped by neighbour rank.
//!
//! The lists are derived from the overlap map and the local index set alone:
//! every process knows the full overlap map, so both sides of a pair build
//! matching lists without talking to each other. Each list is in ascending
//! global order, which is what lets two ranks pair entries positionally.

use crate::mesh_error::MeshHaloError;
use crate::overlap::OverlapMap;
use crate::topology::index_set::{Attribute, ParallelIndexSet, neighbour_ranks};
use std::collections::BTreeMap;

/// A local entity together with its attribute on one remote rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RemoteIndex {
    local: usize,
    global: usize,
    local_attribute: Attribute,
    remote_attribute: Attribute,
}

impl RemoteIndex {
    pub const fn local(&self) -> usize {
        self.local
    }

    pub const fn global(&self) -> usize {
        self.global
    }

    pub const fn local_attribute(&self) -> Attribute {
        self.local_attribute
    }

    pub const fn remote_attribute(&self) -> Attribute {
        self.remote_attribute
    }
}

#[derive(Clone, Debug, Default)]
pub struct RemoteIndices {
    my_rank: usize,
    lists: BTreeMap<usize, Vec<RemoteIndex>>,
    synced: bool,
}

impl RemoteIndices {
    /// Resolve the remote references of every shared local cell.
    ///
    /// A Copy cell is registered under its owner with remote attribute Owner.
    /// An Owner cell is registered under every rank of its overlap set, in
    /// ascending rank order, with remote attribute Copy.
    pub fn resolve(
        index_set: &ParallelIndexSet,
        overlap: &OverlapMap,
        cell_part: &[usize],
        my_rank: usize,
    ) -> Result<Self, MeshHaloError> {
        let mut lists: BTreeMap<usize, Vec<RemoteIndex>> =
            neighbour_ranks(index_set, overlap, cell_part, my_rank)
                .into_iter()
                .map(|r| (r, Vec::new()))
                .collect();

        for pair in index_set {
            let local = pair.local();
            let global = pair.global();
            match local.attribute() {
                Attribute::Copy => {
                    let owner = cell_part[global];
                    lists
                        .get_mut(&owner)
                        .ok_or(MeshHaloError::UnknownNeighbor(owner))?
                        .push(RemoteIndex {
                            local: local.index(),
                            global,
                            local_attribute: Attribute::Copy,
                            remote_attribute: Attribute::Owner,
                        });
                }
                Attribute::Owner => {
                    for &rank in overlap.ranks(global).iter().filter(|&&r| r != my_rank) {
                        lists
                            .get_mut(&rank)
                            .ok_or(MeshHaloError::UnknownNeighbor(rank))?
                            .push(RemoteIndex {
                                local: local.index(),
                                global,
                                local_attribute: Attribute::Owner,
                                remote_attribute: Attribute::Copy,
                            });
                    }
                }
            }
        }

        if lists.is_empty() {
            log::debug!("rank {my_rank}: no neighbours, empty synchronisation round");
        } else {
            for (rank, list) in &lists {
                log::trace!("rank {my_rank}: {} remote indices shared with rank {rank}", list.len());
            }
        }

        Ok(Self {
            my_rank,
            lists,
            synced: true,
        })
    }

    pub fn my_rank(&self) -> usize {
        self.my_rank
    }

    /// Whether the lists are complete and consistent with the index set.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn neighbours(&self) -> impl Iterator<Item = usize> + '_ {
        self.lists.keys().copied()
    }

    pub fn num_neighbours(&self) -> usize {
        self.lists.len()
    }

    /// References shared with `rank`, ascending by global index.
    pub fn list(&self, rank: usize) -> &[RemoteIndex] {
        self.lists.get(&rank).map_or(&[][..], |v| v.as_slice())
    }

    /// `(rank, list)` pairs in ascending rank order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[RemoteIndex])> + '_ {
        self.lists.iter().map(|(&r, l)| (r, l.as_slice()))
    }
}
