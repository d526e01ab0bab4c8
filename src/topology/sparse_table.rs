//! Row-compressed table with variable-length rows.
//!
//! Used for every connectivity relation whose arity varies per entity
//! (cell→face, face→cell, face→point). Rows are appended once and never
//! edited in place.

use crate::debug_invariants::{DebugInvariants, violation};
use crate::mesh_error::MeshHaloError;
use std::ops::Index;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SparseTable<T> {
    data: Vec<T>,
    row_start: Vec<usize>,
}

impl<T> Default for SparseTable<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            row_start: vec![0],
        }
    }
}

impl<T> SparseTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with room for `rows` rows and `nnz` entries.
    pub fn with_capacity(rows: usize, nnz: usize) -> Self {
        let mut row_start = Vec::with_capacity(rows + 1);
        row_start.push(0);
        Self {
            data: Vec::with_capacity(nnz),
            row_start,
        }
    }

    /// Build from an iterator of rows.
    pub fn from_rows<R, I>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = T>,
    {
        let mut table = Self::default();
        for row in rows {
            table.append_row(row);
        }
        table
    }

    pub fn reserve(&mut self, rows: usize, nnz: usize) {
        self.row_start.reserve(rows);
        self.data.reserve(nnz);
    }

    /// Append one row at the end of the table.
    pub fn append_row<I: IntoIterator<Item = T>>(&mut self, row: I) {
        self.data.extend(row);
        self.row_start.push(self.data.len());
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_start.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of stored entries over all rows.
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn row_size(&self, row: usize) -> usize {
        self.row_start[row + 1] - self.row_start[row]
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[self.row_start[row]..self.row_start[row + 1]]
    }

    pub fn get(&self, row: usize) -> Option<&[T]> {
        (row < self.len()).then(|| self.row(row))
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.len()).map(move |r| self.row(r))
    }
}

impl<T> Index<usize> for SparseTable<T> {
    type Output = [T];

    fn index(&self, row: usize) -> &[T] {
        self.row(row)
    }
}

impl<T> DebugInvariants for SparseTable<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "SparseTable");
    }

    fn validate_invariants(&self) -> Result<(), MeshHaloError> {
        if self.row_start.first() != Some(&0) {
            return Err(violation("row offsets must start at zero"));
        }
        if let Some(w) = self.row_start.windows(2).find(|w| w[0] > w[1]) {
            return Err(violation(format!(
                "row offsets decrease ({} > {})",
                w[0], w[1]
            )));
        }
        if self.row_start.last() != Some(&self.data.len()) {
            return Err(violation("last row offset must equal the data length"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_keep_their_boundaries() {
        let t = SparseTable::from_rows(vec![vec![1, 2, 3], vec![], vec![4]]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.data_size(), 4);
        assert_eq!(t.row(0), &[1, 2, 3]);
        assert!(t.row(1).is_empty());
        assert_eq!(&t[2], &[4]);
        assert_eq!(t.row_size(0), 3);
        assert!(t.get(3).is_none());
        t.validate_invariants().unwrap();
    }

    #[test]
    fn empty_table_is_valid() {
        let t: SparseTable<u8> = SparseTable::with_capacity(4, 16);
        assert!(t.is_empty());
        assert_eq!(t.rows().count(), 0);
        t.validate_invariants().unwrap();
    }
}
