//! Structured box generator.
//!
//! Produces the connectivity of an `nx × ny × nz` hexahedral grid in the
//! layout [`GlobalGrid`] expects: faces are numbered I-faces first, then
//! J-faces, then K-faces, each block ordered with the first logical index
//! running fastest.

use crate::mesh_error::MeshHaloError;
use crate::topology::entity::{EntityRep, FaceTag};
use crate::topology::grid::{CELL_CORNERS, GlobalGrid};
use crate::topology::sparse_table::SparseTable;

struct BoxNumbering {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl BoxNumbering {
    fn point(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.nx + 1) * (j + (self.ny + 1) * k)
    }

    fn cell(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    fn num_i_faces(&self) -> usize {
        (self.nx + 1) * self.ny * self.nz
    }

    fn num_j_faces(&self) -> usize {
        self.nx * (self.ny + 1) * self.nz
    }

    fn num_k_faces(&self) -> usize {
        self.nx * self.ny * (self.nz + 1)
    }

    fn i_face(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.nx + 1) * (j + self.ny * k)
    }

    fn j_face(&self, i: usize, j: usize, k: usize) -> usize {
        self.num_i_faces() + i + self.nx * (j + (self.ny + 1) * k)
    }

    fn k_face(&self, i: usize, j: usize, k: usize) -> usize {
        self.num_i_faces() + self.num_j_faces() + i + self.nx * (j + self.ny * k)
    }
}

/// Build a hexahedral box grid with `nx × ny × nz` cells.
///
/// Face orientation is `true` for the cell on the negative side of the face
/// (its normal points out of that cell). Face tags, the global cartesian
/// index and the logical cartesian size are filled in.
pub fn cartesian_box(nx: usize, ny: usize, nz: usize) -> Result<GlobalGrid, MeshHaloError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(MeshHaloError::InvariantViolation(format!(
            "box dimensions must be non-zero, got {nx}x{ny}x{nz}"
        )));
    }
    let n = BoxNumbering { nx, ny, nz };
    let num_cells = nx * ny * nz;
    let num_faces = n.num_i_faces() + n.num_j_faces() + n.num_k_faces();
    let num_points = (nx + 1) * (ny + 1) * (nz + 1);

    let mut face_to_cell = SparseTable::with_capacity(num_faces, 2 * num_faces);
    let mut face_to_point = SparseTable::with_capacity(num_faces, 4 * num_faces);
    let mut face_tag = Vec::with_capacity(num_faces);

    // Each face row lists the cell below it first, then the cell above it.
    let mut push_face = |below: Option<usize>, above: Option<usize>, corners: [usize; 4], tag| {
        let row = below
            .map(|c| EntityRep::new(c, true))
            .into_iter()
            .chain(above.map(|c| EntityRep::new(c, false)));
        face_to_cell.append_row(row);
        face_to_point.append_row(corners);
        face_tag.push(tag);
    };

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..=nx {
                push_face(
                    (i > 0).then(|| n.cell(i - 1, j, k)),
                    (i < nx).then(|| n.cell(i, j, k)),
                    [
                        n.point(i, j, k),
                        n.point(i, j + 1, k),
                        n.point(i, j + 1, k + 1),
                        n.point(i, j, k + 1),
                    ],
                    FaceTag::I,
                );
            }
        }
    }
    for k in 0..nz {
        for j in 0..=ny {
            for i in 0..nx {
                push_face(
                    (j > 0).then(|| n.cell(i, j - 1, k)),
                    (j < ny).then(|| n.cell(i, j, k)),
                    [
                        n.point(i, j, k),
                        n.point(i + 1, j, k),
                        n.point(i + 1, j, k + 1),
                        n.point(i, j, k + 1),
                    ],
                    FaceTag::J,
                );
            }
        }
    }
    for k in 0..=nz {
        for j in 0..ny {
            for i in 0..nx {
                push_face(
                    (k > 0).then(|| n.cell(i, j, k - 1)),
                    (k < nz).then(|| n.cell(i, j, k)),
                    [
                        n.point(i, j, k),
                        n.point(i + 1, j, k),
                        n.point(i + 1, j + 1, k),
                        n.point(i, j + 1, k),
                    ],
                    FaceTag::K,
                );
            }
        }
    }

    let mut cell_to_face = SparseTable::with_capacity(num_cells, 6 * num_cells);
    let mut cell_to_point = Vec::with_capacity(num_cells);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                cell_to_face.append_row([
                    EntityRep::new(n.i_face(i, j, k), false),
                    EntityRep::new(n.i_face(i + 1, j, k), true),
                    EntityRep::new(n.j_face(i, j, k), false),
                    EntityRep::new(n.j_face(i, j + 1, k), true),
                    EntityRep::new(n.k_face(i, j, k), false),
                    EntityRep::new(n.k_face(i, j, k + 1), true),
                ]);
                let mut corners = [0usize; CELL_CORNERS];
                let mut c = 0;
                for dk in 0..2 {
                    for dj in 0..2 {
                        for di in 0..2 {
                            corners[c] = n.point(i + di, j + dj, k + dk);
                            c += 1;
                        }
                    }
                }
                cell_to_point.push(corners);
            }
        }
    }

    GlobalGrid::new(cell_to_face, face_to_cell, face_to_point, cell_to_point, num_points)?
        .with_face_tags(face_tag)?
        .with_cartesian_index([nx, ny, nz], (0..num_cells).collect())
}
