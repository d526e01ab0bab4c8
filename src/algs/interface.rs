//! Communication interfaces: per neighbour rank, which local entities to send
//! and which to receive, for each category of partition-type relationship.
//!
//! A category is a pair (source set, destination set) of partition types.
//! For a shared entity with type `mine` here and `other` on rank `r`, the
//! entity goes into the send list towards `r` when `mine` is a source type and
//! `other` a destination type, and into the receive list from `r` in the
//! mirrored case. Lists keep the order of the shared entities they are built
//! from, which is increasing global order on both sides of every pair, so
//! peers match items positionally without exchanging indices.

use crate::mesh_error::MeshHaloError;
use crate::overlap::remote_indices::RemoteIndices;
use crate::topology::partition_type::{PartitionSet, PartitionType};
use std::collections::BTreeMap;

/// Closed set of interface categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum InterfaceCategory {
    /// Interior∪Border → Interior∪Border.
    InteriorBorderInteriorBorder,
    /// Interior∪Border → All.
    InteriorBorderAll,
    /// Overlap∪Front → Overlap∪Front.
    OverlapOverlapFront,
    /// Overlap → All.
    OverlapAll,
    /// All → All.
    AllAll,
}

impl InterfaceCategory {
    /// Categories built for points and faces.
    pub const ALL: [InterfaceCategory; 5] = [
        InterfaceCategory::InteriorBorderInteriorBorder,
        InterfaceCategory::InteriorBorderAll,
        InterfaceCategory::OverlapOverlapFront,
        InterfaceCategory::OverlapAll,
        InterfaceCategory::AllAll,
    ];

    /// Categories built for cells. Two owners never share a cell, so
    /// Interior∪Border → Interior∪Border would always be empty.
    pub const CELL: [InterfaceCategory; 4] = [
        InterfaceCategory::InteriorBorderAll,
        InterfaceCategory::OverlapOverlapFront,
        InterfaceCategory::OverlapAll,
        InterfaceCategory::AllAll,
    ];

    pub const fn source(self) -> PartitionSet {
        match self {
            InterfaceCategory::InteriorBorderInteriorBorder | InterfaceCategory::InteriorBorderAll => {
                PartitionSet::INTERIOR_BORDER
            }
            InterfaceCategory::OverlapOverlapFront => PartitionSet::OVERLAP_FRONT,
            InterfaceCategory::OverlapAll => PartitionSet::OVERLAP,
            InterfaceCategory::AllAll => PartitionSet::ALL,
        }
    }

    pub const fn destination(self) -> PartitionSet {
        match self {
            InterfaceCategory::InteriorBorderInteriorBorder => PartitionSet::INTERIOR_BORDER,
            InterfaceCategory::OverlapOverlapFront => PartitionSet::OVERLAP_FRONT,
            InterfaceCategory::InteriorBorderAll
            | InterfaceCategory::OverlapAll
            | InterfaceCategory::AllAll => PartitionSet::ALL,
        }
    }

    /// Whether an entity of type `mine` is sent to a peer where it has type `other`.
    #[inline]
    pub const fn sends(self, mine: PartitionType, other: PartitionType) -> bool {
        self.source().contains(mine) && self.destination().contains(other)
    }

    /// Whether an entity of type `mine` is received from a peer where it has type `other`.
    #[inline]
    pub const fn receives(self, mine: PartitionType, other: PartitionType) -> bool {
        self.source().contains(other) && self.destination().contains(mine)
    }
}

/// One entity shared with one remote rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SharedEntity {
    pub rank: usize,
    pub index: usize,
    pub mine: PartitionType,
    pub other: PartitionType,
}

/// Send and receive lists of local indices for one neighbour rank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceLists {
    send: Vec<usize>,
    receive: Vec<usize>,
}

impl InterfaceLists {
    pub fn send(&self) -> &[usize] {
        &self.send
    }

    pub fn receive(&self) -> &[usize] {
        &self.receive
    }

    pub fn is_empty(&self) -> bool {
        self.send.is_empty() && self.receive.is_empty()
    }
}

/// One category's lists for every neighbour rank that has any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Interface {
    lists: BTreeMap<usize, InterfaceLists>,
}

impl Interface {
    pub fn get(&self, rank: usize) -> Option<&InterfaceLists> {
        self.lists.get(&rank)
    }

    /// Local indices sent to `rank`; empty when there are none.
    pub fn send_to(&self, rank: usize) -> &[usize] {
        self.lists.get(&rank).map_or(&[][..], |l| l.send())
    }

    /// Local indices received from `rank`; empty when there are none.
    pub fn receive_from(&self, rank: usize) -> &[usize] {
        self.lists.get(&rank).map_or(&[][..], |l| l.receive())
    }

    pub fn neighbours(&self) -> impl Iterator<Item = usize> + '_ {
        self.lists.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &InterfaceLists)> + '_ {
        self.lists.iter().map(|(&r, l)| (r, l))
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Total number of `(send, receive)` entries over all ranks.
    pub fn len(&self) -> (usize, usize) {
        self.lists
            .values()
            .fold((0, 0), |(s, r), l| (s + l.send.len(), r + l.receive.len()))
    }
}

/// Result of the sizing pass: per rank, `(send, receive)` counts of one category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceSizes {
    counts: BTreeMap<usize, (usize, usize)>,
}

impl InterfaceSizes {
    pub fn measure(category: InterfaceCategory, entities: &[SharedEntity]) -> Self {
        let mut counts: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
        for e in entities {
            let send = category.sends(e.mine, e.other);
            let recv = category.receives(e.mine, e.other);
            if send || recv {
                let c = counts.entry(e.rank).or_default();
                c.0 += usize::from(send);
                c.1 += usize::from(recv);
            }
        }
        Self { counts }
    }

    pub fn get(&self, rank: usize) -> (usize, usize) {
        self.counts.get(&rank).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, (usize, usize))> + '_ {
        self.counts.iter().map(|(&r, &c)| (r, c))
    }
}

/// Build one category from the sizing pass, then check the fill against it.
pub fn build_interface(
    category: InterfaceCategory,
    entities: &[SharedEntity],
) -> Result<Interface, MeshHaloError> {
    let sizes = InterfaceSizes::measure(category, entities);
    let mut lists: BTreeMap<usize, InterfaceLists> = sizes
        .iter()
        .map(|(rank, (s, r))| {
            (
                rank,
                InterfaceLists {
                    send: Vec::with_capacity(s),
                    receive: Vec::with_capacity(r),
                },
            )
        })
        .collect();

    for e in entities {
        let send = category.sends(e.mine, e.other);
        let recv = category.receives(e.mine, e.other);
        if !(send || recv) {
            continue;
        }
        let l = lists.get_mut(&e.rank).ok_or(MeshHaloError::InterfaceSizeMismatch {
            rank: e.rank,
            expected: 0,
            got: 1,
        })?;
        if send {
            l.send.push(e.index);
        }
        if recv {
            l.receive.push(e.index);
        }
    }

    for (&rank, l) in &lists {
        let (s, r) = sizes.get(rank);
        if l.send.len() != s || l.receive.len() != r {
            return Err(MeshHaloError::InterfaceSizeMismatch {
                rank,
                expected: s + r,
                got: l.send.len() + l.receive.len(),
            });
        }
    }
    Ok(Interface { lists })
}

/// Interfaces of one entity codimension, by category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommInterfaces {
    interfaces: BTreeMap<InterfaceCategory, Interface>,
}

impl CommInterfaces {
    pub fn build(
        categories: &[InterfaceCategory],
        entities: &[SharedEntity],
    ) -> Result<Self, MeshHaloError> {
        let mut interfaces = BTreeMap::new();
        for &category in categories {
            let interface = build_interface(category, entities)?;
            log::trace!("{category:?}: {:?} (send, receive) entries", interface.len());
            interfaces.insert(category, interface);
        }
        Ok(Self { interfaces })
    }

    /// The interface of `category`, if that category was built.
    pub fn get(&self, category: InterfaceCategory) -> Option<&Interface> {
        self.interfaces.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = InterfaceCategory> + '_ {
        self.interfaces.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

/// Shared cells as seen through the remote index lists.
pub fn shared_cells(remote: &RemoteIndices) -> Vec<SharedEntity> {
    remote
        .iter()
        .flat_map(|(rank, list)| {
            list.iter().map(move |ri| SharedEntity {
                rank,
                index: ri.local(),
                mine: PartitionType::of_attribute(ri.local_attribute()),
                other: PartitionType::of_attribute(ri.remote_attribute()),
            })
        })
        .collect()
}

/// Shared entities as seen through an exchanged attribute map
/// (`local entity → remote rank → remote type`).
pub fn shared_from_attributes(
    my_types: &[PartitionType],
    attributes: &BTreeMap<usize, BTreeMap<usize, PartitionType>>,
) -> Vec<SharedEntity> {
    let mut out = Vec::new();
    for (&index, remotes) in attributes {
        for (&rank, &other) in remotes {
            out.push(SharedEntity {
                rank,
                index,
                mine: my_types[index],
                other,
            });
        }
    }
    // group by rank; the sort is stable so each rank keeps increasing local order
    out.sort_by_key(|e| e.rank);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use PartitionType::*;

    fn shared(rank: usize, index: usize, mine: PartitionType, other: PartitionType) -> SharedEntity {
        SharedEntity {
            rank,
            index,
            mine,
            other,
        }
    }

    #[test]
    fn predicates_mirror_each_other() {
        for c in InterfaceCategory::ALL {
            for a in PartitionType::ALL {
                for b in PartitionType::ALL {
                    assert_eq!(c.sends(a, b), c.receives(b, a), "{c:?} {a:?} {b:?}");
                }
            }
        }
        assert!(InterfaceCategory::InteriorBorderAll.sends(Interior, Overlap));
        assert!(!InterfaceCategory::InteriorBorderAll.sends(Overlap, Interior));
        assert!(InterfaceCategory::InteriorBorderAll.receives(Overlap, Interior));
        assert!(!InterfaceCategory::OverlapOverlapFront.sends(Overlap, Interior));
    }

    #[test]
    fn owner_and_copy_land_on_opposite_sides() {
        let owner_side = [shared(1, 0, Interior, Overlap)];
        let copy_side = [shared(0, 1, Overlap, Interior)];
        let a = build_interface(InterfaceCategory::InteriorBorderAll, &owner_side).unwrap();
        let b = build_interface(InterfaceCategory::InteriorBorderAll, &copy_side).unwrap();
        assert_eq!(a.send_to(1), &[0]);
        assert!(a.receive_from(1).is_empty());
        assert_eq!(b.receive_from(0), &[1]);
        assert!(b.send_to(0).is_empty());
    }

    #[test]
    fn all_all_is_symmetric_and_ordered() {
        let entities = [
            shared(2, 1, Border, Front),
            shared(2, 4, Interior, Overlap),
            shared(3, 0, Overlap, Overlap),
        ];
        let i = build_interface(InterfaceCategory::AllAll, &entities).unwrap();
        assert_eq!(i.send_to(2), &[1, 4]);
        assert_eq!(i.receive_from(2), &[1, 4]);
        assert_eq!(i.neighbours().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(i.len(), (3, 3));
    }

    #[test]
    fn unmatched_ranks_have_no_lists() {
        let entities = [shared(5, 0, Interior, Interior)];
        let i = build_interface(InterfaceCategory::OverlapAll, &entities).unwrap();
        assert!(i.is_empty());
        assert!(i.get(5).is_none());
        assert_eq!(InterfaceSizes::measure(InterfaceCategory::OverlapAll, &entities).get(5), (0, 0));
    }

    #[test]
    fn attribute_map_is_grouped_by_rank() {
        let types = [Border, Front, Interior];
        let attrs = BTreeMap::from([
            (0, BTreeMap::from([(1, Front), (2, Border)])),
            (2, BTreeMap::from([(1, Overlap)])),
        ]);
        let shared = shared_from_attributes(&types, &attrs);
        let order: Vec<_> = shared.iter().map(|e| (e.rank, e.index)).collect();
        assert_eq!(order, vec![(1, 0), (1, 2), (2, 0)]);
        let ifaces = CommInterfaces::build(&InterfaceCategory::ALL, &shared).unwrap();
        assert_eq!(ifaces.get(InterfaceCategory::InteriorBorderAll).unwrap().send_to(1), &[0, 2]);
        assert_eq!(ifaces.categories().count(), 5);
    }
}
