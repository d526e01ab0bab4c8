//! Global identifiers per codimension with reverse lookup.

use crate::mesh_error::MeshHaloError;
use crate::topology::entity::{Codim, GlobalId};
use hashbrown::HashMap;

/// `local index → GlobalId` tables for cells, faces and points, plus the
/// inverse maps.
#[derive(Clone, Debug, Default)]
pub struct GlobalIdSet {
    cell: Vec<GlobalId>,
    face: Vec<GlobalId>,
    point: Vec<GlobalId>,
    cell_index: HashMap<GlobalId, usize>,
    face_index: HashMap<GlobalId, usize>,
    point_index: HashMap<GlobalId, usize>,
}

impl GlobalIdSet {
    /// Ids for an undistributed grid: cells take `0..nc`, faces `nc..nc+nf`
    /// and points follow, so no two entities share an id.
    pub fn sequential(num_cells: usize, num_faces: usize, num_points: usize) -> Self {
        let ids = |start: usize, n: usize| -> Vec<GlobalId> {
            (start..start + n).map(|i| GlobalId::new(i as u64)).collect()
        };
        Self::build(
            ids(0, num_cells),
            ids(num_cells, num_faces),
            ids(num_cells + num_faces, num_points),
        )
    }

    /// Build from explicit tables. Ids must be unique within each codimension.
    pub fn from_tables(
        cell: Vec<GlobalId>,
        face: Vec<GlobalId>,
        point: Vec<GlobalId>,
    ) -> Result<Self, MeshHaloError> {
        let set = Self::build(cell, face, point);
        for codim in [Codim::Cell, Codim::Face, Codim::Point] {
            if set.reverse(codim).len() != set.table(codim).len() {
                return Err(MeshHaloError::InvariantViolation(format!(
                    "duplicate {} global ids",
                    codim.name()
                )));
            }
        }
        Ok(set)
    }

    fn build(cell: Vec<GlobalId>, face: Vec<GlobalId>, point: Vec<GlobalId>) -> Self {
        let invert = |ids: &[GlobalId]| -> HashMap<GlobalId, usize> {
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect()
        };
        Self {
            cell_index: invert(&cell),
            face_index: invert(&face),
            point_index: invert(&point),
            cell,
            face,
            point,
        }
    }

    pub fn table(&self, codim: Codim) -> &[GlobalId] {
        match codim {
            Codim::Cell => &self.cell,
            Codim::Face => &self.face,
            Codim::Point => &self.point,
        }
    }

    fn reverse(&self, codim: Codim) -> &HashMap<GlobalId, usize> {
        match codim {
            Codim::Cell => &self.cell_index,
            Codim::Face => &self.face_index,
            Codim::Point => &self.point_index,
        }
    }

    /// GlobalId of local entity `index`.
    pub fn id(&self, codim: Codim, index: usize) -> Option<GlobalId> {
        self.table(codim).get(index).copied()
    }

    /// Local index of the entity carrying `id`, if it exists here.
    pub fn local_index(&self, codim: Codim, id: GlobalId) -> Option<usize> {
        self.reverse(codim).get(&id).copied()
    }

    pub fn len(&self, codim: Codim) -> usize {
        self.table(codim).len()
    }
}
