//! The undistributed grid every process starts from.
//!
//! A [`GlobalGrid`] holds the full connectivity of a structured grid together
//! with opaque per-entity payloads (`C` per cell, `F` per face, `P` per point).
//! Payloads are never inspected by this crate; they are only filtered and
//! reordered together with the entities they belong to.

use crate::mesh_error::MeshHaloError;
use crate::topology::entity::{EntityRep, FaceTag};
use crate::topology::id_set::GlobalIdSet;
use crate::topology::sparse_table::SparseTable;

/// Number of corner points stored per cell.
pub const CELL_CORNERS: usize = 8;

#[derive(Clone, Debug)]
pub struct GlobalGrid<C = (), F = (), P = ()> {
    pub(crate) cell_to_face: SparseTable<EntityRep>,
    pub(crate) face_to_cell: SparseTable<EntityRep>,
    pub(crate) face_to_point: SparseTable<usize>,
    pub(crate) cell_to_point: Vec<[usize; CELL_CORNERS]>,
    pub(crate) num_points: usize,
    pub(crate) face_tag: Option<Vec<FaceTag>>,
    pub(crate) global_cell: Vec<usize>,
    pub(crate) logical_cartesian_size: [usize; 3],
    pub(crate) unique_boundary_ids: Option<Vec<usize>>,
    pub(crate) global_ids: GlobalIdSet,
    pub(crate) cell_data: Vec<C>,
    pub(crate) face_data: Vec<F>,
    pub(crate) point_data: Vec<P>,
}

impl GlobalGrid {
    /// Assemble a grid from its connectivity tables.
    ///
    /// Every index is range-checked. Global ids default to
    /// [`GlobalIdSet::sequential`], the global cartesian index of a cell to its
    /// own index, and payloads to `()`.
    pub fn new(
        cell_to_face: SparseTable<EntityRep>,
        face_to_cell: SparseTable<EntityRep>,
        face_to_point: SparseTable<usize>,
        cell_to_point: Vec<[usize; CELL_CORNERS]>,
        num_points: usize,
    ) -> Result<Self, MeshHaloError> {
        let num_cells = cell_to_face.len();
        let num_faces = face_to_cell.len();
        if face_to_point.len() != num_faces {
            return Err(MeshHaloError::TableLengthMismatch {
                what: "face_to_point",
                expected: num_faces,
                got: face_to_point.len(),
            });
        }
        if cell_to_point.len() != num_cells {
            return Err(MeshHaloError::TableLengthMismatch {
                what: "cell_to_point",
                expected: num_cells,
                got: cell_to_point.len(),
            });
        }
        check_rows("cell_to_face", "face", num_faces, cell_to_face.rows().map(|r| r.iter().map(|f| f.index())))?;
        check_rows("face_to_cell", "cell", num_cells, face_to_cell.rows().map(|r| r.iter().map(|c| c.index())))?;
        check_rows("face_to_point", "point", num_points, face_to_point.rows().map(|r| r.iter().copied()))?;
        check_rows("cell_to_point", "point", num_points, cell_to_point.iter().map(|r| r.iter().copied()))?;
        if let Some((row, r)) = face_to_cell.rows().enumerate().find(|(_, r)| r.is_empty() || r.len() > 2) {
            return Err(MeshHaloError::InvariantViolation(format!(
                "face {row} has {} cell neighbours, expected 1 or 2",
                r.len()
            )));
        }

        Ok(Self {
            cell_to_face,
            face_to_cell,
            face_to_point,
            cell_to_point,
            num_points,
            face_tag: None,
            global_cell: (0..num_cells).collect(),
            logical_cartesian_size: [num_cells, 1, 1],
            unique_boundary_ids: None,
            global_ids: GlobalIdSet::sequential(num_cells, num_faces, num_points),
            cell_data: vec![(); num_cells],
            face_data: vec![(); num_faces],
            point_data: vec![(); num_points],
        })
    }
}

fn check_rows<R, I>(table: &'static str, codim: &'static str, len: usize, rows: R) -> Result<(), MeshHaloError>
where
    R: Iterator<Item = I>,
    I: Iterator<Item = usize>,
{
    for (row, entries) in rows.enumerate() {
        for index in entries {
            if index >= len {
                return Err(MeshHaloError::EntityOutOfRange {
                    table,
                    row,
                    codim,
                    index,
                    len,
                });
            }
        }
    }
    Ok(())
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), MeshHaloError> {
    if expected == got {
        Ok(())
    } else {
        Err(MeshHaloError::TableLengthMismatch { what, expected, got })
    }
}

impl<C, F, P> GlobalGrid<C, F, P> {
    /// Replace the payloads. Each vector needs one entry per entity.
    pub fn with_payloads<C2, F2, P2>(
        self,
        cell_data: Vec<C2>,
        face_data: Vec<F2>,
        point_data: Vec<P2>,
    ) -> Result<GlobalGrid<C2, F2, P2>, MeshHaloError> {
        check_len("cell payload", self.num_cells(), cell_data.len())?;
        check_len("face payload", self.num_faces(), face_data.len())?;
        check_len("point payload", self.num_points(), point_data.len())?;
        Ok(GlobalGrid {
            cell_to_face: self.cell_to_face,
            face_to_cell: self.face_to_cell,
            face_to_point: self.face_to_point,
            cell_to_point: self.cell_to_point,
            num_points: self.num_points,
            face_tag: self.face_tag,
            global_cell: self.global_cell,
            logical_cartesian_size: self.logical_cartesian_size,
            unique_boundary_ids: self.unique_boundary_ids,
            global_ids: self.global_ids,
            cell_data,
            face_data,
            point_data,
        })
    }

    pub fn with_global_ids(mut self, ids: GlobalIdSet) -> Result<Self, MeshHaloError> {
        use crate::topology::entity::Codim;
        check_len("cell global ids", self.num_cells(), ids.len(Codim::Cell))?;
        check_len("face global ids", self.num_faces(), ids.len(Codim::Face))?;
        check_len("point global ids", self.num_points(), ids.len(Codim::Point))?;
        self.global_ids = ids;
        Ok(self)
    }

    pub fn with_face_tags(mut self, tags: Vec<FaceTag>) -> Result<Self, MeshHaloError> {
        check_len("face tags", self.num_faces(), tags.len())?;
        self.face_tag = Some(tags);
        Ok(self)
    }

    /// Set the logical cartesian dimensions and the cartesian index of every cell.
    pub fn with_cartesian_index(
        mut self,
        logical_cartesian_size: [usize; 3],
        global_cell: Vec<usize>,
    ) -> Result<Self, MeshHaloError> {
        check_len("global cell indices", self.num_cells(), global_cell.len())?;
        self.logical_cartesian_size = logical_cartesian_size;
        self.global_cell = global_cell;
        Ok(self)
    }

    /// Number faces on the domain boundary `1..=n` in face order.
    ///
    /// Interior faces get id 0. A face is on the domain boundary when it has a
    /// single cell neighbour.
    pub fn compute_unique_boundary_ids(&mut self) {
        let mut count = 0;
        let ids = self
            .face_to_cell
            .rows()
            .map(|row| {
                if row.len() == 1 {
                    count += 1;
                    count
                } else {
                    0
                }
            })
            .collect();
        log::debug!("unique boundary ids range from 1 to {count}");
        self.unique_boundary_ids = Some(ids);
    }

    pub fn num_cells(&self) -> usize {
        self.cell_to_face.len()
    }

    pub fn num_faces(&self) -> usize {
        self.face_to_cell.len()
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn cell_to_face(&self) -> &SparseTable<EntityRep> {
        &self.cell_to_face
    }

    pub fn face_to_cell(&self) -> &SparseTable<EntityRep> {
        &self.face_to_cell
    }

    pub fn face_to_point(&self) -> &SparseTable<usize> {
        &self.face_to_point
    }

    pub fn cell_to_point(&self) -> &[[usize; CELL_CORNERS]] {
        &self.cell_to_point
    }

    pub fn face_tags(&self) -> Option<&[FaceTag]> {
        self.face_tag.as_deref()
    }

    pub fn unique_boundary_ids(&self) -> Option<&[usize]> {
        self.unique_boundary_ids.as_deref()
    }

    pub fn global_cell(&self) -> &[usize] {
        &self.global_cell
    }

    pub fn logical_cartesian_size(&self) -> [usize; 3] {
        self.logical_cartesian_size
    }

    pub fn global_ids(&self) -> &GlobalIdSet {
        &self.global_ids
    }

    pub fn cell_data(&self) -> &[C] {
        &self.cell_data
    }

    pub fn face_data(&self) -> &[F] {
        &self.face_data
    }

    pub fn point_data(&self) -> &[P] {
        &self.point_data
    }

    /// Cells sharing a face with `cell`, in cell→face row order.
    pub fn face_neighbours(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.cell_to_face.row(cell).iter().filter_map(move |f| {
            self.face_to_cell
                .row(f.index())
                .iter()
                .map(|c| c.index())
                .find(|&c| c != cell)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::meshgen::cartesian_box;

    #[test]
    fn out_of_range_face_is_rejected() {
        let c2f = SparseTable::from_rows(vec![vec![EntityRep::new(3, true)]]);
        let f2c = SparseTable::from_rows(vec![vec![EntityRep::new(0, false)]]);
        let f2p = SparseTable::from_rows(vec![vec![0usize]]);
        let err = GlobalGrid::new(c2f, f2c, f2p, vec![[0; 8]], 1).unwrap_err();
        assert!(matches!(
            err,
            MeshHaloError::EntityOutOfRange { table: "cell_to_face", index: 3, .. }
        ));
    }

    #[test]
    fn unique_boundary_ids_count_single_neighbour_faces() {
        let mut grid = cartesian_box(2, 1, 1).unwrap();
        grid.compute_unique_boundary_ids();
        let ids = grid.unique_boundary_ids().unwrap();
        // 2x1x1 box: 11 faces, only the shared I-face is interior.
        assert_eq!(ids.len(), 11);
        assert_eq!(ids.iter().filter(|&&id| id == 0).count(), 1);
        assert_eq!(*ids.iter().max().unwrap(), 10);
    }

    #[test]
    fn face_neighbours_follow_shared_faces() {
        let grid = cartesian_box(3, 1, 1).unwrap();
        let n: Vec<_> = grid.face_neighbours(1).collect();
        assert_eq!(n, vec![0, 2]);
        assert_eq!(grid.face_neighbours(0).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn payload_length_is_checked() {
        let grid = cartesian_box(2, 1, 1).unwrap();
        let err = grid.with_payloads(vec![1u8], vec![(); 11], vec![(); 12]).unwrap_err();
        assert!(matches!(err, MeshHaloError::TableLengthMismatch { what: "cell payload", .. }));
    }
}
