//! Overlap module: which ranks ghost which cells, and the remote references
//! that follow from it.

pub mod expand;
pub mod remote_indices;

pub use expand::{OverlapMap, add_overlap_layers, validate_partition};
pub use remote_indices::{RemoteIndex, RemoteIndices};
