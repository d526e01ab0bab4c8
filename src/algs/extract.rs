//! Restrict the global grid to the cells one process holds.
//!
//! Faces present locally are those referenced by a local cell; points present
//! locally are those referenced by a present face. Both are renumbered densely
//! in increasing global order, so relative order always survives. Every
//! per-entity table (payloads, global ids, face tags, boundary ids, cartesian
//! indices) is filtered with the same renumbering, in lock-step with the
//! connectivity.

use crate::mesh_error::MeshHaloError;
use crate::topology::entity::{CellSide, Codim, EntityRep, FaceTag};
use crate::topology::grid::{CELL_CORNERS, GlobalGrid};
use crate::topology::id_set::GlobalIdSet;
use crate::topology::index_set::CellIndexSet;
use crate::topology::sparse_table::SparseTable;
use itertools::Itertools;

/// Incidence counts of the entities of one codimension.
#[derive(Clone, Debug, Default)]
pub struct Presence {
    counts: Vec<u32>,
}

impl Presence {
    pub fn new(len: usize) -> Self {
        Self {
            counts: vec![0; len],
        }
    }

    /// Record one more reference to `index`.
    #[inline]
    pub fn touch(&mut self, index: usize) {
        self.counts[index] += 1;
    }

    pub fn count(&self, index: usize) -> u32 {
        self.counts[index]
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.counts[index] > 0
    }

    pub fn num_present(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Dense renumbering of a subset of global indices, in increasing global order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Renumbering {
    to_local: Vec<Option<usize>>,
    to_global: Vec<usize>,
}

impl Renumbering {
    /// Number every present entry, in order.
    pub fn from_presence(presence: &Presence) -> Self {
        let mut to_global = Vec::with_capacity(presence.num_present());
        let to_local = (0..presence.counts.len())
            .map(|g| {
                presence.is_present(g).then(|| {
                    to_global.push(g);
                    to_global.len() - 1
                })
            })
            .collect();
        Self {
            to_local,
            to_global,
        }
    }

    /// Renumbering given by a `global → local` map whose locals are dense.
    pub fn from_map(global_to_local: &[Option<usize>]) -> Self {
        let mut to_global = vec![0; global_to_local.iter().flatten().count()];
        for (g, l) in global_to_local.iter().enumerate() {
            if let Some(l) = l {
                to_global[*l] = g;
            }
        }
        Self {
            to_local: global_to_local.to_vec(),
            to_global,
        }
    }

    pub fn local(&self, global: usize) -> Option<usize> {
        self.to_local.get(global).copied().flatten()
    }

    /// Local index of `global`, which must be present.
    pub fn require(&self, codim: Codim, global: usize) -> Result<usize, MeshHaloError> {
        self.local(global).ok_or(MeshHaloError::MissingLocalEntity {
            codim: codim.name(),
            global,
        })
    }

    pub fn global(&self, local: usize) -> usize {
        self.to_global[local]
    }

    /// Global index of every local entity.
    pub fn to_global(&self) -> &[usize] {
        &self.to_global
    }

    pub fn len(&self) -> usize {
        self.to_global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_global.is_empty()
    }

    /// Subset a per-global-entity table into local order.
    pub fn filter<T: Clone>(&self, table: &[T]) -> Vec<T> {
        self.to_global.iter().map(|&g| table[g].clone()).collect_vec()
    }
}

/// Connectivity of one process' subgrid in local numbering.
#[derive(Clone, Debug, Default)]
pub struct LocalTopology {
    pub cell_to_face: SparseTable<EntityRep>,
    pub face_to_cell: SparseTable<CellSide>,
    pub face_to_point: SparseTable<usize>,
    pub cell_to_point: Vec<[usize; CELL_CORNERS]>,
    pub cells: Renumbering,
    pub faces: Renumbering,
    pub points: Renumbering,
}

/// Per-entity tables of one process' subgrid, filtered alongside [`LocalTopology`].
#[derive(Clone, Debug, Default)]
pub struct LocalPayloads<C, F, P> {
    pub cell_data: Vec<C>,
    pub face_data: Vec<F>,
    pub point_data: Vec<P>,
    pub global_ids: GlobalIdSet,
    pub face_tags: Option<Vec<FaceTag>>,
    pub unique_boundary_ids: Option<Vec<usize>>,
    pub global_cell: Vec<usize>,
}

/// Restrict and renumber the connectivity to the cells of `cells`.
///
/// Fails with [`MeshHaloError::MissingLocalEntity`] when a cell corner is not
/// a point of any local face.
pub fn extract_topology<C, F, P>(
    grid: &GlobalGrid<C, F, P>,
    cells: &CellIndexSet,
) -> Result<LocalTopology, MeshHaloError> {
    let cell_map = Renumbering::from_map(&cells.global_to_local);

    let mut face_presence = Presence::new(grid.num_faces());
    for &g in cell_map.to_global() {
        for f in grid.cell_to_face.row(g) {
            face_presence.touch(f.index());
        }
    }
    let faces = Renumbering::from_presence(&face_presence);

    let mut point_presence = Presence::new(grid.num_points());
    for &f in faces.to_global() {
        for &p in grid.face_to_point.row(f) {
            point_presence.touch(p);
        }
    }
    let points = Renumbering::from_presence(&point_presence);

    let mut cell_to_face =
        SparseTable::with_capacity(cell_map.len(), grid.cell_to_face.data_size().min(6 * cell_map.len()));
    let mut cell_to_point = Vec::with_capacity(cell_map.len());
    for &g in cell_map.to_global() {
        let row = grid
            .cell_to_face
            .row(g)
            .iter()
            .map(|f| faces.require(Codim::Face, f.index()).map(|l| f.with_index(l)))
            .collect::<Result<Vec<_>, _>>()?;
        cell_to_face.append_row(row);

        let mut corners = [0usize; CELL_CORNERS];
        for (slot, &p) in corners.iter_mut().zip(&grid.cell_to_point[g]) {
            *slot = points.require(Codim::Point, p)?;
        }
        cell_to_point.push(corners);
    }

    let mut face_to_cell = SparseTable::with_capacity(faces.len(), 2 * faces.len());
    let mut face_to_point = SparseTable::with_capacity(faces.len(), 4 * faces.len());
    for &f in faces.to_global() {
        face_to_cell.append_row(
            grid.face_to_cell
                .row(f)
                .iter()
                .map(|c| CellSide::new(cell_map.local(c.index()), c.orientation())),
        );
        let row = grid
            .face_to_point
            .row(f)
            .iter()
            .map(|&p| points.require(Codim::Point, p))
            .collect::<Result<Vec<_>, _>>()?;
        face_to_point.append_row(row);
    }

    log::debug!(
        "extracted {} cells, {} faces, {} points",
        cell_map.len(),
        faces.len(),
        points.len()
    );

    Ok(LocalTopology {
        cell_to_face,
        face_to_cell,
        face_to_point,
        cell_to_point,
        cells: cell_map,
        faces,
        points,
    })
}

/// Filter every per-entity table of `grid` with the renumberings of `topo`.
pub fn extract_payloads<C, F, P>(
    grid: &GlobalGrid<C, F, P>,
    topo: &LocalTopology,
) -> Result<LocalPayloads<C, F, P>, MeshHaloError>
where
    C: Clone,
    F: Clone,
    P: Clone,
{
    let ids = &grid.global_ids;
    let global_ids = GlobalIdSet::from_tables(
        topo.cells.filter(ids.table(Codim::Cell)),
        topo.faces.filter(ids.table(Codim::Face)),
        topo.points.filter(ids.table(Codim::Point)),
    )?;
    Ok(LocalPayloads {
        cell_data: topo.cells.filter(&grid.cell_data),
        face_data: topo.faces.filter(&grid.face_data),
        point_data: topo.points.filter(&grid.point_data),
        global_ids,
        face_tags: grid.face_tag.as_deref().map(|t| topo.faces.filter(t)),
        unique_boundary_ids: grid.unique_boundary_ids.as_deref().map(|u| topo.faces.filter(u)),
        global_cell: topo.cells.filter(&grid.global_cell),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::meshgen::cartesian_box;
    use crate::overlap::OverlapMap;
    use crate::topology::index_set::build_cell_index_set;

    fn first_cell_only() -> (GlobalGrid, LocalTopology) {
        let grid = cartesian_box(2, 1, 1).unwrap();
        let cells = build_cell_index_set(&OverlapMap::new(2), &[0, 1], 0).unwrap();
        let topo = extract_topology(&grid, &cells).unwrap();
        (grid, topo)
    }

    #[test]
    fn presence_keeps_faces_of_local_cells() {
        let (_, topo) = first_cell_only();
        assert_eq!(topo.faces.to_global(), &[0, 1, 3, 5, 7, 9]);
        assert_eq!(topo.points.len(), 8);
        assert_eq!(topo.cell_to_face.row(0).len(), 6);
    }

    #[test]
    fn cut_face_keeps_absent_side_and_orientation() {
        let (_, topo) = first_cell_only();
        let row = topo.face_to_cell.row(1);
        assert_eq!(row.len(), 2);
        assert_eq!(row[0], CellSide::new(Some(0), true));
        assert!(row[1].is_absent());
        assert!(!row[1].orientation());
        assert_eq!(topo.face_to_cell.row(0).len(), 1);
    }

    #[test]
    fn renumbering_preserves_order() {
        let mut presence = Presence::new(6);
        for i in [4, 1, 4, 5] {
            presence.touch(i);
        }
        let r = Renumbering::from_presence(&presence);
        assert_eq!(r.to_global(), &[1, 4, 5]);
        assert_eq!(r.local(4), Some(1));
        assert_eq!(r.local(0), None);
        assert_eq!(presence.count(4), 2);
        assert!(matches!(
            r.require(Codim::Point, 2),
            Err(MeshHaloError::MissingLocalEntity { codim: "point", global: 2 })
        ));
    }

    #[test]
    fn payloads_follow_their_entities() {
        let (grid, topo) = first_cell_only();
        let nf = grid.num_faces();
        let np = grid.num_points();
        let mut grid = grid
            .with_payloads(
                vec!['a', 'b'],
                (0..nf).collect::<Vec<usize>>(),
                (0..np).map(|p| p * 10).collect::<Vec<usize>>(),
            )
            .unwrap();
        grid.compute_unique_boundary_ids();
        let local = extract_payloads(&grid, &topo).unwrap();
        assert_eq!(local.cell_data, vec!['a']);
        assert_eq!(local.face_data, topo.faces.to_global());
        assert_eq!(local.point_data[3], topo.points.global(3) * 10);
        assert_eq!(local.global_cell, vec![0]);
        // face 1 is the interior face of the box
        assert_eq!(local.unique_boundary_ids.as_ref().unwrap()[1], 0);
        for (l, &g) in topo.faces.to_global().iter().enumerate() {
            assert_eq!(
                local.global_ids.id(Codim::Face, l),
                grid.global_ids().id(Codim::Face, g)
            );
        }
    }

    #[test]
    fn corner_outside_local_faces_is_an_error() {
        let mut grid = cartesian_box(2, 1, 1).unwrap();
        // cell 0 claims a corner that only cell 1's faces carry
        grid.cell_to_point[0][0] = 2;
        let cells = build_cell_index_set(&OverlapMap::new(2), &[0, 1], 0).unwrap();
        assert!(matches!(
            extract_topology(&grid, &cells),
            Err(MeshHaloError::MissingLocalEntity { codim: "point", global: 2 })
        ));
    }
}
