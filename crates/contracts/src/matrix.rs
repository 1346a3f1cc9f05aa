//! SimilarityMatrix - Matrix builder output
//!
//! Dense row-major matrix: rows are student frames, columns are teacher frames.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// All-pairs frame similarity
///
/// `get(s, t)` is the similarity between student frame `s` and teacher frame
/// `t`. Diagonals are addressed by offset `d = student - teacher`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Wrap a row-major buffer of `rows * cols` values
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, ContractError> {
        if data.len() != rows * cols {
            return Err(ContractError::Other(format!(
                "similarity matrix buffer has {} values, expected {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// `rows x cols` matrix of zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix by evaluating `f(row, col)` for every cell
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Number of student frames
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of teacher frames
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Row-major cells, for filling in place
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Swap the roles of rows and columns
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self.get(c, r))
    }

    /// Smallest and largest diagonal offset (`student - teacher`)
    pub fn offset_range(&self) -> Option<(i64, i64)> {
        if self.is_empty() {
            return None;
        }
        Some((-(self.cols as i64 - 1), self.rows as i64 - 1))
    }

    /// First teacher index and number of cells on the diagonal at `offset`
    pub fn diagonal_span(&self, offset: i64) -> (usize, usize) {
        let first_teacher = if offset < 0 { (-offset) as usize } else { 0 };
        let first_student = if offset > 0 { offset as usize } else { 0 };
        if first_teacher >= self.cols || first_student >= self.rows {
            return (first_teacher, 0);
        }
        let len = (self.cols - first_teacher).min(self.rows - first_student);
        (first_teacher, len)
    }

    /// Values along the diagonal at `offset`, ordered by teacher index
    pub fn diagonal(&self, offset: i64) -> Vec<f32> {
        let (first_teacher, len) = self.diagonal_span(offset);
        (0..len)
            .map(|i| {
                let t = first_teacher + i;
                let s = (t as i64 + offset) as usize;
                self.get(s, t)
            })
            .collect()
    }
}
