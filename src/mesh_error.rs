//! MeshHaloError: unified error type for mesh-halo public APIs
//!
//! Every condition below is a broken precondition or invariant of the
//! distribution pipeline. None of them is retried; the caller receives the
//! error instead of a partially built subgrid.

use thiserror::Error;

/// Error carried as the source of [`MeshHaloError::CommError`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CommError(pub String);

/// Unified error type for mesh-halo operations.
#[derive(Debug, Error)]
pub enum MeshHaloError {
    /// The partition vector does not cover every global cell.
    #[error("partition assigns {got} cells but the grid has {expected}")]
    PartitionLengthMismatch { expected: usize, got: usize },
    /// A cell is assigned to a rank outside the process group.
    #[error("cell {cell} is assigned to rank {rank}, but the process group has {size} ranks")]
    RankOutOfRange { cell: usize, rank: usize, size: usize },
    /// A connectivity table references an entity beyond its codimension's range.
    #[error("{table} row {row} references {codim} index {index}, but only {len} exist")]
    EntityOutOfRange {
        table: &'static str,
        row: usize,
        codim: &'static str,
        index: usize,
        len: usize,
    },
    /// A per-entity table does not have one entry per entity.
    #[error("{what} has {got} entries, expected {expected}")]
    TableLengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// `add` was called on an index set that is not between `begin_resize` and `end_resize`.
    #[error("index set mutated outside of its resize bracket")]
    IndexSetNotResizing,
    /// `begin_resize` was called twice, or a lookup happened mid-resize.
    #[error("index set is still being resized")]
    IndexSetResizing,
    /// The same global index was added twice to one index set.
    #[error("global index {0} added twice to the index set")]
    DuplicateGlobalIndex(usize),
    /// A local entity was required but the entity is absent from this subgrid.
    #[error("{codim} {global} is referenced by a local entity but is not present locally")]
    MissingLocalEntity { codim: &'static str, global: usize },
    /// A remote reference names a rank that was never registered as a neighbour.
    #[error("no remote index list registered for neighbour rank {0}")]
    UnknownNeighbor(usize),
    /// The two passes of interface construction disagree.
    #[error("interface fill for rank {rank} produced {got} entries, sizing pass computed {expected}")]
    InterfaceSizeMismatch {
        rank: usize,
        expected: usize,
        got: usize,
    },
    /// A value slice passed to a halo exchange is shorter than the interface requires.
    #[error("interface references local index {index}, but the data slice has {len} entries")]
    DataIndexOutOfRange { index: usize, len: usize },
    /// Communication error with a specific neighbour.
    #[error("communication error with rank {neighbor}: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A received message does not have the exact size computed by the sizing pass.
    #[error("buffer size mismatch from rank {neighbor}: expected {expected} bytes, got {got}")]
    BufferSizeMismatch {
        neighbor: usize,
        expected: usize,
        got: usize,
    },
    /// A wire record carried an unknown partition type code.
    #[error("rank {neighbor} sent unknown partition type code {code}")]
    InvalidWireCode { neighbor: usize, code: u8 },
    /// Invariant check failed.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
