//! Fixed-layout, little-endian wire types for the exchange paths.

use crate::topology::partition_type::PartitionType;
use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use std::mem::{align_of, size_of};

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// One partition-type announcement: "on rank `rank`, this entity has type `code`".
///
/// Multi-byte integers are stored pre-LE with `.to_le()` and decoded with
/// `.from_le()`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct WireAttribute {
    rank_le: u32,
    code: u8,
    reserved: [u8; 3], // keep zero
}

impl WireAttribute {
    pub fn new(rank: usize, partition_type: PartitionType) -> Self {
        Self {
            rank_le: (rank as u32).to_le(),
            code: partition_type.code(),
            reserved: [0; 3],
        }
    }

    pub fn rank(&self) -> usize {
        u32::from_le(self.rank_le) as usize
    }

    /// Raw type code; see [`PartitionType::from_code`].
    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn partition_type(&self) -> Option<PartitionType> {
        PartitionType::from_code(self.code)
    }
}

const_assert_eq!(size_of::<WireAttribute>(), 8);
const_assert_eq!(align_of::<WireAttribute>(), 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_bytes_are_little_endian() {
        let rec = WireAttribute::new(0x0102, PartitionType::Front);
        let bytes = cast_slice(std::slice::from_ref(&rec));
        assert_eq!(bytes, &[0x02, 0x01, 0, 0, 3, 0, 0, 0]);
        assert_eq!(rec.rank(), 0x0102);
        assert_eq!(rec.partition_type(), Some(PartitionType::Front));
    }

    #[test]
    fn unknown_code_is_not_a_type() {
        let mut rec = WireAttribute::new(1, PartitionType::Interior);
        cast_slice_mut(std::slice::from_mut(&mut rec))[4] = 7;
        assert_eq!(rec.code(), 7);
        assert_eq!(rec.partition_type(), None);
    }
}
