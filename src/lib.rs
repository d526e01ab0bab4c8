#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-halo
//!
//! mesh-halo distributes a globally replicated structured grid over a group of
//! processes. Given the full grid and a cell → rank partition, every process
//! builds its own subgrid (owned cells plus a configurable number of ghost
//! layers), renumbered locally, together with the communication interfaces
//! used to exchange per-entity data with its neighbours.
//!
//! ## Features
//! - Overlap growth by face adjacency, any number of layers
//! - Order-preserving local renumbering of cells, faces and points, with
//!   payloads, global ids and face tags filtered in lock-step
//! - Interior / Border / Overlap / Front classification of every entity
//! - Cell, point and (optionally) face interfaces for five send/receive
//!   categories, and `Pod` halo exchange along any of them
//! - Pluggable communication backends (serial, in-process threads, MPI)
//!
//! ## Usage
//!
//! ```
//! use mesh_halo::prelude::*;
//!
//! let grid = cartesian_box(4, 1, 1)?;
//! let local = distribute_global_grid(&grid, &[0; 4], &DistributionConfig::default(), &NoComm)?;
//! assert_eq!(local.num_cells(), 4);
//! # Ok::<(), mesh_halo::mesh_error::MeshHaloError>(())
//! ```
//!
//! With more than one process every rank calls `distribute_global_grid` with
//! the same grid, partition and configuration and its own communicator.

pub mod algs;
pub mod debug_invariants;
pub mod mesh_error;
pub mod overlap;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{CommTag, Communicator, LocalComm, NoComm, Wait};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::distribute::{
        DistributedGrid, DistributionConfig, DistributionTags, distribute_global_grid,
    };
    pub use crate::algs::halo::{backward, forward};
    pub use crate::algs::interface::{CommInterfaces, Interface, InterfaceCategory};
    pub use crate::algs::meshgen::cartesian_box;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::MeshHaloError;
    pub use crate::overlap::validate_partition;
    pub use crate::topology::{
        Attribute, CellSide, Codim, EntityRep, GlobalGrid, GlobalId, PartitionType, SparseTable,
    };
}
