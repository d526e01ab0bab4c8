//! Re-export public algorithms.

pub mod attribute_exchange;
pub mod channel;
pub mod communicator;
pub mod distribute;
pub mod extract;
pub mod halo;
pub mod interface;
pub mod meshgen;
pub mod wire;

pub use distribute::{DistributedGrid, DistributionConfig, DistributionTags, distribute_global_grid};
pub use interface::{CommInterfaces, Interface, InterfaceCategory};
