//! Entity handles: oriented references, face sides and global identifiers.
//!
//! Local indices are plain `usize` values, dense and zero-based per
//! codimension. Absence is always spelled `Option::None`; no index value is
//! reserved as a marker.

use std::fmt;

/// Codimension of a grid entity.
///
/// Points have codimension 3; edges (codimension 2) are not represented.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Codim {
    Cell,
    Face,
    Point,
}

impl Codim {
    /// Numeric codimension (0, 1 or 3).
    pub const fn value(self) -> usize {
        match self {
            Codim::Cell => 0,
            Codim::Face => 1,
            Codim::Point => 3,
        }
    }

    /// Lower-case name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Codim::Cell => "cell",
            Codim::Face => "face",
            Codim::Point => "point",
        }
    }
}

/// An index together with an orientation flag.
///
/// For a cell→face entry `orientation == true` means the face normal points
/// out of the cell. For a face→cell entry it means the cell lies on the side
/// the normal points away from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct EntityRep {
    index: usize,
    orientation: bool,
}

impl EntityRep {
    #[inline]
    pub const fn new(index: usize, orientation: bool) -> Self {
        Self { index, orientation }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }

    #[inline]
    pub const fn orientation(self) -> bool {
        self.orientation
    }

    /// Same orientation, different index.
    #[inline]
    pub const fn with_index(self, index: usize) -> Self {
        Self {
            index,
            orientation: self.orientation,
        }
    }
}

/// One side of a face: the adjacent cell, which may not exist in this subgrid.
///
/// Along a partition cut the far cell is absent but the orientation of the
/// entry is kept, so callers that look at "the cell on the positive side" of
/// a face still find the correct slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CellSide {
    cell: Option<usize>,
    orientation: bool,
}

impl CellSide {
    #[inline]
    pub const fn new(cell: Option<usize>, orientation: bool) -> Self {
        Self { cell, orientation }
    }

    #[inline]
    pub const fn present(rep: EntityRep) -> Self {
        Self {
            cell: Some(rep.index()),
            orientation: rep.orientation(),
        }
    }

    #[inline]
    pub const fn cell(self) -> Option<usize> {
        self.cell
    }

    #[inline]
    pub const fn orientation(self) -> bool {
        self.orientation
    }

    #[inline]
    pub const fn is_absent(self) -> bool {
        self.cell.is_none()
    }
}

/// Stable cross-process identifier of an entity of the undistributed grid.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[repr(transparent)]
pub struct GlobalId(u64);

impl GlobalId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobalId").field(&self.0).finish()
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical direction of a face in a structured grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FaceTag {
    /// Normal along the first logical axis.
    I,
    /// Normal along the second logical axis.
    J,
    /// Normal along the third logical axis.
    K,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codim_values() {
        assert_eq!(Codim::Cell.value(), 0);
        assert_eq!(Codim::Face.value(), 1);
        assert_eq!(Codim::Point.value(), 3);
    }

    #[test]
    fn absent_side_keeps_orientation() {
        let side = CellSide::new(None, true);
        assert!(side.is_absent());
        assert!(side.orientation());
        let side = CellSide::present(EntityRep::new(4, false));
        assert_eq!(side.cell(), Some(4));
        assert!(!side.orientation());
    }

    #[test]
    fn with_index_preserves_orientation() {
        let r = EntityRep::new(10, true).with_index(2);
        assert_eq!(r, EntityRep::new(2, true));
    }
}
