//! Distribute a globally replicated grid over a process group.
//!
//! Every process calls [`distribute_global_grid`] with the same grid and
//! partition. Each one keeps the cells it owns plus `overlap_layers` layers of
//! ghost cells, renumbers everything locally and builds the interfaces used to
//! exchange per-entity data with its neighbours. The only communication is a
//! single round that tells each process how its neighbours classify shared
//! points (and faces, when requested).

use crate::algs::attribute_exchange::{AttributeMap, exchange_attributes};
use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::extract::{LocalPayloads, LocalTopology, extract_payloads, extract_topology};
use crate::algs::interface::{
    CommInterfaces, Interface, InterfaceCategory, shared_cells, shared_from_attributes,
};
use crate::debug_invariants::{DebugInvariants, violation};
use crate::mesh_error::MeshHaloError;
use crate::overlap::remote_indices::RemoteIndices;
use crate::overlap::{add_overlap_layers, validate_partition};
use crate::topology::entity::{CellSide, Codim, EntityRep, FaceTag, GlobalId};
use crate::topology::grid::{CELL_CORNERS, GlobalGrid};
use crate::topology::id_set::GlobalIdSet;
use crate::topology::index_set::{ParallelIndexSet, build_cell_index_set};
use crate::topology::partition_type::{
    PartitionType, cell_partition_types, face_partition_types, point_partition_types,
};
use crate::topology::sparse_table::SparseTable;

/// Message tags used by one distribution call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DistributionTags {
    pub point_attributes: CommTag,
    pub face_attributes: CommTag,
}

impl DistributionTags {
    pub const fn from_base(base: CommTag) -> Self {
        Self {
            point_attributes: base,
            face_attributes: base.offset(1),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DistributionConfig {
    /// Number of face-adjacency layers of ghost cells around the owned cells.
    pub overlap_layers: usize,
    /// Also exchange face partition types and build face interfaces.
    pub face_interfaces: bool,
    pub tags: DistributionTags,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            overlap_layers: 1,
            face_interfaces: false,
            tags: DistributionTags::from_base(CommTag::new(0xC0DE)),
        }
    }
}

impl DistributionConfig {
    pub fn with_overlap_layers(mut self, layers: usize) -> Self {
        self.overlap_layers = layers;
        self
    }

    pub fn with_face_interfaces(mut self, enabled: bool) -> Self {
        self.face_interfaces = enabled;
        self
    }

    pub fn with_tags(mut self, tags: DistributionTags) -> Self {
        self.tags = tags;
        self
    }
}

/// The subgrid of one process with everything needed to talk to its neighbours.
///
/// Built once by [`distribute_global_grid`] and immutable afterwards.
#[derive(Clone, Debug)]
pub struct DistributedGrid<C = (), F = (), P = ()> {
    rank: usize,
    size: usize,
    topology: LocalTopology,
    payloads: LocalPayloads<C, F, P>,
    logical_cartesian_size: [usize; 3],
    cell_index_set: ParallelIndexSet,
    remote_indices: RemoteIndices,
    cell_types: Vec<PartitionType>,
    face_types: Vec<PartitionType>,
    point_types: Vec<PartitionType>,
    cell_interfaces: CommInterfaces,
    point_interfaces: CommInterfaces,
    face_interfaces: Option<CommInterfaces>,
    point_attributes: AttributeMap,
    face_attributes: Option<AttributeMap>,
}

impl<C, F, P> DistributedGrid<C, F, P> {
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of processes the grid was distributed over.
    pub fn num_ranks(&self) -> usize {
        self.size
    }

    /// Number of local entities of codimension `codim`.
    pub fn size(&self, codim: Codim) -> usize {
        match codim {
            Codim::Cell => self.topology.cells.len(),
            Codim::Face => self.topology.faces.len(),
            Codim::Point => self.topology.points.len(),
        }
    }

    pub fn num_cells(&self) -> usize {
        self.size(Codim::Cell)
    }

    pub fn num_faces(&self) -> usize {
        self.size(Codim::Face)
    }

    pub fn num_points(&self) -> usize {
        self.size(Codim::Point)
    }

    pub fn cell_to_face(&self) -> &SparseTable<EntityRep> {
        &self.topology.cell_to_face
    }

    pub fn face_to_cell(&self) -> &SparseTable<CellSide> {
        &self.topology.face_to_cell
    }

    pub fn face_to_point(&self) -> &SparseTable<usize> {
        &self.topology.face_to_point
    }

    pub fn cell_to_point(&self) -> &[[usize; CELL_CORNERS]] {
        &self.topology.cell_to_point
    }

    /// Index of a local entity in the global grid.
    pub fn global_index(&self, codim: Codim, local: usize) -> usize {
        match codim {
            Codim::Cell => self.topology.cells.global(local),
            Codim::Face => self.topology.faces.global(local),
            Codim::Point => self.topology.points.global(local),
        }
    }

    /// Local index of a global-grid entity, if it is present here.
    pub fn local_index(&self, codim: Codim, global: usize) -> Option<usize> {
        match codim {
            Codim::Cell => self.topology.cells.local(global),
            Codim::Face => self.topology.faces.local(global),
            Codim::Point => self.topology.points.local(global),
        }
    }

    pub fn global_ids(&self) -> &GlobalIdSet {
        &self.payloads.global_ids
    }

    pub fn global_id(&self, codim: Codim, local: usize) -> Option<GlobalId> {
        self.payloads.global_ids.id(codim, local)
    }

    pub fn cell_data(&self) -> &[C] {
        &self.payloads.cell_data
    }

    pub fn face_data(&self) -> &[F] {
        &self.payloads.face_data
    }

    pub fn point_data(&self) -> &[P] {
        &self.payloads.point_data
    }

    pub fn face_tags(&self) -> Option<&[FaceTag]> {
        self.payloads.face_tags.as_deref()
    }

    pub fn unique_boundary_ids(&self) -> Option<&[usize]> {
        self.payloads.unique_boundary_ids.as_deref()
    }

    /// Cartesian index of every local cell.
    pub fn global_cell(&self) -> &[usize] {
        &self.payloads.global_cell
    }

    pub fn logical_cartesian_size(&self) -> [usize; 3] {
        self.logical_cartesian_size
    }

    pub fn cell_index_set(&self) -> &ParallelIndexSet {
        &self.cell_index_set
    }

    pub fn remote_indices(&self) -> &RemoteIndices {
        &self.remote_indices
    }

    pub fn partition_types(&self, codim: Codim) -> &[PartitionType] {
        match codim {
            Codim::Cell => &self.cell_types,
            Codim::Face => &self.face_types,
            Codim::Point => &self.point_types,
        }
    }

    pub fn cell_interfaces(&self) -> &CommInterfaces {
        &self.cell_interfaces
    }

    pub fn point_interfaces(&self) -> &CommInterfaces {
        &self.point_interfaces
    }

    /// Face interfaces; `None` unless requested in the configuration.
    pub fn face_interfaces(&self) -> Option<&CommInterfaces> {
        self.face_interfaces.as_ref()
    }

    pub fn cell_interface(&self, category: InterfaceCategory) -> Option<&Interface> {
        self.cell_interfaces.get(category)
    }

    pub fn point_interface(&self, category: InterfaceCategory) -> Option<&Interface> {
        self.point_interfaces.get(category)
    }

    /// Partition types neighbours reported for shared points.
    pub fn point_attributes(&self) -> &AttributeMap {
        &self.point_attributes
    }

    pub fn face_attributes(&self) -> Option<&AttributeMap> {
        self.face_attributes.as_ref()
    }
}

impl<C, F, P> DebugInvariants for DistributedGrid<C, F, P> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "DistributedGrid");
    }

    fn validate_invariants(&self) -> Result<(), MeshHaloError> {
        let (nc, nf, np) = (self.num_cells(), self.num_faces(), self.num_points());
        let lengths = [
            ("cell_to_face", nc, self.topology.cell_to_face.len()),
            ("cell_to_point", nc, self.topology.cell_to_point.len()),
            ("face_to_cell", nf, self.topology.face_to_cell.len()),
            ("face_to_point", nf, self.topology.face_to_point.len()),
            ("cell index set", nc, self.cell_index_set.len()),
            ("cell types", nc, self.cell_types.len()),
            ("face types", nf, self.face_types.len()),
            ("point types", np, self.point_types.len()),
        ];
        for (what, expected, got) in lengths {
            if expected != got {
                return Err(MeshHaloError::TableLengthMismatch { what, expected, got });
            }
        }
        self.topology.cell_to_face.validate_invariants()?;
        self.topology.face_to_cell.validate_invariants()?;
        self.cell_index_set.validate_invariants()?;
        for (face, row) in self.topology.face_to_cell.rows().enumerate() {
            if row.is_empty() || row.len() > 2 || row.iter().all(|s| s.is_absent()) {
                return Err(violation(format!("face {face} has no valid cell sides")));
            }
        }
        if self.topology.cells.to_global().windows(2).any(|w| w[0] >= w[1])
            || self.topology.faces.to_global().windows(2).any(|w| w[0] >= w[1])
            || self.topology.points.to_global().windows(2).any(|w| w[0] >= w[1])
        {
            return Err(violation("local numbering does not preserve global order"));
        }
        Ok(())
    }
}

/// Build this process' part of `grid` under the partition `cell_part`.
///
/// `cell_part[c]` is the rank owning global cell `c`. All processes must call
/// this with identical `grid`, `cell_part` and `config`; input errors are then
/// detected identically everywhere, before any communication.
pub fn distribute_global_grid<C, F, P, Comm>(
    grid: &GlobalGrid<C, F, P>,
    cell_part: &[usize],
    config: &DistributionConfig,
    comm: &Comm,
) -> Result<DistributedGrid<C, F, P>, MeshHaloError>
where
    C: Clone,
    F: Clone,
    P: Clone,
    Comm: Communicator,
{
    let rank = comm.rank();
    let size = comm.size();
    validate_partition(cell_part, grid.num_cells(), size)?;

    let overlap = add_overlap_layers(grid, cell_part, config.overlap_layers);
    log::debug!(
        "rank {rank}: {} ghost copies over {} layers",
        overlap.num_copies(),
        config.overlap_layers
    );

    let cells = build_cell_index_set(&overlap, cell_part, rank)?;
    let remote_indices = RemoteIndices::resolve(&cells.index_set, &overlap, cell_part, rank)?;

    let topology = extract_topology(grid, &cells)?;
    let payloads = extract_payloads(grid, &topology)?;

    let cell_types = cell_partition_types(&cells.index_set);
    let face_types = face_partition_types(&topology.face_to_cell, &cell_types);
    let point_types =
        point_partition_types(&topology.face_to_point, &face_types, topology.points.len());

    let cell_interfaces =
        CommInterfaces::build(&InterfaceCategory::CELL, &shared_cells(&remote_indices))?;
    let all_all = cell_interfaces
        .get(InterfaceCategory::AllAll)
        .ok_or_else(|| violation("all-to-all cell interface was not built"))?;

    let point_attributes = exchange_attributes(
        comm,
        config.tags.point_attributes,
        all_all,
        topology.cell_to_point.as_slice(),
        &point_types,
    )?;
    let point_interfaces = CommInterfaces::build(
        &InterfaceCategory::ALL,
        &shared_from_attributes(&point_types, &point_attributes),
    )?;

    let (face_interfaces, face_attributes) = if config.face_interfaces {
        let attributes = exchange_attributes(
            comm,
            config.tags.face_attributes,
            all_all,
            &topology.cell_to_face,
            &face_types,
        )?;
        let interfaces = CommInterfaces::build(
            &InterfaceCategory::ALL,
            &shared_from_attributes(&face_types, &attributes),
        )?;
        (Some(interfaces), Some(attributes))
    } else {
        (None, None)
    };

    log::debug!(
        "rank {rank}: distributed grid with {} cells, {} faces, {} points, {} neighbours",
        topology.cells.len(),
        topology.faces.len(),
        topology.points.len(),
        remote_indices.num_neighbours()
    );

    let distributed = DistributedGrid {
        rank,
        size,
        topology,
        payloads,
        logical_cartesian_size: grid.logical_cartesian_size(),
        cell_index_set: cells.index_set,
        remote_indices,
        cell_types,
        face_types,
        point_types,
        cell_interfaces,
        point_interfaces,
        face_interfaces,
        point_attributes,
        face_attributes,
    };
    distributed.debug_assert_invariants();
    Ok(distributed)
}
