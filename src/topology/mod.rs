//! Top-level module for grid topology.
//!
//! This module provides:
//! - entity references, face sides and global ids
//! - the compressed row table used for all connectivity
//! - the undistributed [`GlobalGrid`]
//! - parallel index sets and partition types of distributed entities

pub mod entity;
pub mod grid;
pub mod id_set;
pub mod index_set;
pub mod partition_type;
pub mod sparse_table;

pub use entity::{CellSide, Codim, EntityRep, FaceTag, GlobalId};
pub use grid::{CELL_CORNERS, GlobalGrid};
pub use id_set::GlobalIdSet;
pub use index_set::{Attribute, ParallelIndexSet};
pub use partition_type::{PartitionSet, PartitionType};
pub use sparse_table::SparseTable;
