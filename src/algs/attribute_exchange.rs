//! One round of partition-type exchange over the All↔All cell interface.
//!
//! For every cell it sends to a neighbour, a process ships one
//! [`WireAttribute`] per entity incident to that cell (points or faces). The
//! neighbour walks its receive list of the same cells in the same order and
//! attributes each record to its own local copy of the entity. Both sides
//! derive the message length from the same incidence rows, so buffers are
//! sized exactly before anything is sent.

use crate::algs::channel::exchange_exact;
use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::interface::Interface;
use crate::algs::wire::WireAttribute;
use crate::debug_invariants::violation;
use crate::mesh_error::MeshHaloError;
use crate::topology::entity::EntityRep;
use crate::topology::grid::CELL_CORNERS;
use crate::topology::partition_type::PartitionType;
use crate::topology::sparse_table::SparseTable;
use std::collections::BTreeMap;

/// `local entity → remote rank → partition type on that rank`.
pub type AttributeMap = BTreeMap<usize, BTreeMap<usize, PartitionType>>;

/// Entities of one codimension incident to each local cell.
pub trait CellIncidence {
    fn incident(&self, cell: usize) -> impl Iterator<Item = usize> + '_;
    fn num_incident(&self, cell: usize) -> usize;
}

impl CellIncidence for [[usize; CELL_CORNERS]] {
    fn incident(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self[cell].iter().copied()
    }

    fn num_incident(&self, _cell: usize) -> usize {
        CELL_CORNERS
    }
}

impl CellIncidence for SparseTable<EntityRep> {
    fn incident(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(cell).iter().map(|f| f.index())
    }

    fn num_incident(&self, cell: usize) -> usize {
        self.row_size(cell)
    }
}

/// Ship `entity_types` of the entities incident to every sent cell and collect
/// what the neighbours report about the entities of every received cell.
///
/// Ranks without cells in either direction take no part in the round; with no
/// neighbours at all the round is empty and the map is empty.
pub fn exchange_attributes<C, I>(
    comm: &C,
    tag: CommTag,
    all_all: &Interface,
    incidence: &I,
    entity_types: &[PartitionType],
) -> Result<AttributeMap, MeshHaloError>
where
    C: Communicator,
    I: CellIncidence + ?Sized,
{
    let me = comm.rank();
    let mut outgoing = BTreeMap::new();
    let mut expected = BTreeMap::new();
    for (rank, lists) in all_all.iter() {
        let records: Vec<WireAttribute> = lists
            .send()
            .iter()
            .flat_map(|&cell| incidence.incident(cell))
            .map(|e| WireAttribute::new(me, entity_types[e]))
            .collect();
        let count: usize = lists.receive().iter().map(|&cell| incidence.num_incident(cell)).sum();
        log::trace!(
            "rank {me}: {} attribute records to rank {rank}, expecting {count}",
            records.len()
        );
        outgoing.insert(rank, records);
        expected.insert(rank, count);
    }

    let received = exchange_exact(comm, tag, &outgoing, &expected)?;

    let mut attributes = AttributeMap::new();
    for (rank, lists) in all_all.iter() {
        let Some(records) = received.get(&rank) else {
            continue;
        };
        let mut records = records.iter();
        for &cell in lists.receive() {
            for entity in incidence.incident(cell) {
                let rec = records.next().ok_or(MeshHaloError::BufferSizeMismatch {
                    neighbor: rank,
                    expected: expected[&rank] * size_of::<WireAttribute>(),
                    got: received[&rank].len() * size_of::<WireAttribute>(),
                })?;
                if rec.rank() != rank {
                    return Err(violation(format!(
                        "record from rank {rank} claims to come from rank {}",
                        rec.rank()
                    )));
                }
                let t = rec.partition_type().ok_or(MeshHaloError::InvalidWireCode {
                    neighbor: rank,
                    code: rec.code(),
                })?;
                attributes.entry(entity).or_default().entry(rank).or_insert(t);
            }
        }
    }
    log::debug!("rank {me}: {} entities shared with other ranks", attributes.len());
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{LocalComm, NoComm};
    use crate::algs::interface::{InterfaceCategory, SharedEntity, build_interface};
    use PartitionType::*;

    /// Two ranks each holding cells 0 and 1 of a line, cell `rank` owned.
    fn all_all_for(rank: usize) -> Interface {
        let peer = 1 - rank;
        let entities = [
            SharedEntity { rank: peer, index: 0, mine: if rank == 0 { Interior } else { Overlap }, other: Overlap },
            SharedEntity { rank: peer, index: 1, mine: if rank == 1 { Interior } else { Overlap }, other: Interior },
        ];
        build_interface(InterfaceCategory::AllAll, &entities).unwrap()
    }

    #[test]
    fn point_types_reach_the_peer() {
        // cell c has corners c..c+8, the two cells share corners 1..8
        let corners: Vec<[usize; CELL_CORNERS]> =
            (0..2).map(|c| std::array::from_fn(|k| c + k)).collect();
        let comms = LocalComm::world(2);
        let maps: Vec<AttributeMap> = std::thread::scope(|s| {
            let handles: Vec<_> = comms
                .iter()
                .map(|comm| {
                    let corners = corners.as_slice();
                    s.spawn(move || {
                        let rank = comm.rank();
                        let types = vec![if rank == 0 { Border } else { Front }; 9];
                        exchange_attributes(comm, CommTag::new(0x60), &all_all_for(rank), corners, &types)
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(maps[0].len(), 9);
        assert_eq!(maps[0][&4][&1], Front);
        assert_eq!(maps[1][&8][&0], Border);
        assert!(maps[1].values().all(|m| m.len() == 1));
    }

    #[test]
    fn empty_interface_is_an_empty_round() {
        let corners: Vec<[usize; CELL_CORNERS]> = vec![[0; CELL_CORNERS]];
        let map = exchange_attributes(
            &NoComm,
            CommTag::new(1),
            &Interface::default(),
            corners.as_slice(),
            &[Interior],
        )
        .unwrap();
        assert!(map.is_empty());
    }
}
