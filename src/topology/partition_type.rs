//! Partition types and their classification for cells, faces and points.
//!
//! Cells are classified from their attribute alone. Faces look at the cells
//! on both sides. Points take the strongest type among their incident faces;
//! see [`update_point_type`] for the update rule and why the result does not
//! depend on the face visitation order.

use crate::topology::entity::CellSide;
use crate::topology::index_set::{Attribute, ParallelIndexSet};
use crate::topology::sparse_table::SparseTable;

/// Refinement of [`Attribute`] reflecting adjacency to other processes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum PartitionType {
    Interior = 0,
    Border = 1,
    Overlap = 2,
    Front = 3,
}

impl PartitionType {
    pub const ALL: [PartitionType; 4] = [
        PartitionType::Interior,
        PartitionType::Border,
        PartitionType::Overlap,
        PartitionType::Front,
    ];

    /// One-byte code used on the wire.
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PartitionType::Interior),
            1 => Some(PartitionType::Border),
            2 => Some(PartitionType::Overlap),
            3 => Some(PartitionType::Front),
            _ => None,
        }
    }

    /// Type a cell with the given attribute starts with.
    pub const fn of_attribute(attribute: Attribute) -> Self {
        match attribute {
            Attribute::Owner => PartitionType::Interior,
            Attribute::Copy => PartitionType::Overlap,
        }
    }
}

/// Small set of partition types, one bit per variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartitionSet(u8);

impl PartitionSet {
    pub const EMPTY: PartitionSet = PartitionSet(0);
    pub const INTERIOR: PartitionSet = PartitionSet::single(PartitionType::Interior);
    pub const OVERLAP: PartitionSet = PartitionSet::single(PartitionType::Overlap);
    pub const INTERIOR_BORDER: PartitionSet = PartitionSet::single(PartitionType::Interior)
        .with(PartitionType::Border);
    pub const OVERLAP_FRONT: PartitionSet = PartitionSet::single(PartitionType::Overlap)
        .with(PartitionType::Front);
    pub const ALL: PartitionSet = PartitionSet(0b1111);

    pub const fn single(t: PartitionType) -> Self {
        PartitionSet(1 << t as u8)
    }

    pub const fn with(self, t: PartitionType) -> Self {
        PartitionSet(self.0 | (1 << t as u8))
    }

    pub const fn contains(self, t: PartitionType) -> bool {
        self.0 & (1 << t as u8) != 0
    }
}

/// Owner cells are Interior, Copy cells are Overlap, in local index order.
pub fn cell_partition_types(index_set: &ParallelIndexSet) -> Vec<PartitionType> {
    let mut types = vec![PartitionType::Overlap; index_set.len()];
    for pair in index_set.iter() {
        types[pair.local().index()] = PartitionType::of_attribute(pair.local().attribute());
    }
    types
}

/// Type of a face given its face→cell row and the local cell types.
///
/// - domain boundary (single side): the type of its cell;
/// - both cells present: their common type, or Border when one is Interior
///   and the other Overlap;
/// - far cell absent (partition cut): Front when the present cell is a ghost,
///   Border when it is owned (zero overlap layers).
pub fn face_partition_type(row: &[CellSide], cell_types: &[PartitionType]) -> PartitionType {
    let present: Vec<PartitionType> = row.iter().filter_map(|s| s.cell()).map(|c| cell_types[c]).collect();
    let cut = row.iter().any(|s| s.is_absent());
    match (present.as_slice(), cut) {
        ([t], false) => *t,
        ([PartitionType::Interior], true) => PartitionType::Border,
        ([_], true) => PartitionType::Front,
        ([a, b], _) if a == b => *a,
        ([_, _], _) => PartitionType::Border,
        // A face without any local cell is never extracted.
        _ => PartitionType::Front,
    }
}

/// Classify every local face.
pub fn face_partition_types(
    face_to_cell: &SparseTable<CellSide>,
    cell_types: &[PartitionType],
) -> Vec<PartitionType> {
    face_to_cell
        .rows()
        .map(|row| face_partition_type(row, cell_types))
        .collect()
}

/// Update a point's type after visiting one more incident face.
///
/// Interior is replaced by anything but Overlap, Overlap is replaced by
/// anything, Front is replaced only by Border, Border is never replaced.
/// Every replacement moves up the chain `Overlap < Interior < Front < Border`
/// and the face type is the maximum of the two whenever a replacement
/// happens, so the final value is the maximum over all incident faces
/// (and Overlap for a point with none). Visiting order is irrelevant.
#[inline]
pub fn update_point_type(old: PartitionType, face: PartitionType) -> PartitionType {
    use PartitionType::*;
    match (old, face) {
        (Interior, f) if f != Overlap => f,
        (Overlap, f) => f,
        (Front, Border) => Border,
        (o, _) => o,
    }
}

/// Classify points from the types of their incident faces.
///
/// Faces are visited in ascending local index order.
pub fn point_partition_types(
    face_to_point: &SparseTable<usize>,
    face_types: &[PartitionType],
    num_points: usize,
) -> Vec<PartitionType> {
    let mut types = vec![PartitionType::Overlap; num_points];
    for (face, points) in face_to_point.rows().enumerate() {
        let face_type = face_types[face];
        for &p in points {
            types[p] = update_point_type(types[p], face_type);
        }
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use PartitionType::*;

    fn rank(t: PartitionType) -> u8 {
        match t {
            Overlap => 0,
            Interior => 1,
            Front => 2,
            Border => 3,
        }
    }

    #[test]
    fn update_rule_is_a_maximum() {
        for old in PartitionType::ALL {
            for face in PartitionType::ALL {
                let expected = if rank(face) > rank(old) { face } else { old };
                assert_eq!(update_point_type(old, face), expected, "{old:?} + {face:?}");
            }
        }
    }

    #[test]
    fn face_types_from_sides() {
        let cells = [Interior, Overlap];
        let s = |c: Option<usize>| CellSide::new(c, true);
        assert_eq!(face_partition_type(&[s(Some(0))], &cells), Interior);
        assert_eq!(face_partition_type(&[s(Some(1))], &cells), Overlap);
        assert_eq!(face_partition_type(&[s(Some(0)), s(Some(0))], &cells), Interior);
        assert_eq!(face_partition_type(&[s(Some(0)), s(Some(1))], &cells), Border);
        assert_eq!(face_partition_type(&[s(Some(1)), s(None)], &cells), Front);
        assert_eq!(face_partition_type(&[s(None), s(Some(0))], &cells), Border);
    }

    #[test]
    fn partition_sets() {
        assert!(PartitionSet::INTERIOR_BORDER.contains(Border));
        assert!(!PartitionSet::INTERIOR_BORDER.contains(Overlap));
        assert!(PartitionSet::OVERLAP_FRONT.contains(Front));
        assert!(PartitionType::ALL.iter().all(|&t| PartitionSet::ALL.contains(t)));
        assert!(!PartitionSet::EMPTY.contains(Interior));
    }

    #[test]
    fn codes_round_trip_and_reject_unknown() {
        for t in PartitionType::ALL {
            assert_eq!(PartitionType::from_code(t.code()), Some(t));
        }
        assert_eq!(PartitionType::from_code(9), None);
    }
}
