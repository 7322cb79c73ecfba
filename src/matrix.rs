//! Dense matrix operations backing the regression solver

use crate::error::{ForecastError, Result};

/// Pivot magnitude below which Gauss-Jordan elimination reports a singular
/// system. Tunable so tests can force the singular path deliberately.
pub const DEFAULT_PIVOT_EPSILON: f64 = 1e-12;

/// Dense row-major matrix of f64 values
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create an n-by-n identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build a matrix from row slices. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows.first().ok_or_else(|| {
            ForecastError::DataError("Cannot build a matrix from zero rows".to_string())
        })?;

        let cols = first.len();
        let mut m = Self::zeros(rows.len(), cols);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ForecastError::DimensionMismatch {
                    expected: cols,
                    got: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                m.set(r, c, value);
            }
        }
        Ok(m)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Read the value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Write the value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Transposed copy of the matrix
    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                t.set(c, r, self.get(r, c));
            }
        }
        t
    }

    /// Standard triple-loop matrix product
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(ForecastError::DimensionMismatch {
                expected: self.cols,
                got: other.rows,
            });
        }

        let mut product = Matrix::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.get(r, k) * other.get(k, c);
                }
                product.set(r, c, sum);
            }
        }
        Ok(product)
    }

    /// Matrix-vector product
    pub fn multiply_vec(&self, vector: &[f64]) -> Result<Vec<f64>> {
        if self.cols != vector.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.cols,
                got: vector.len(),
            });
        }

        let mut product = vec![0.0; self.rows];
        for r in 0..self.rows {
            let mut sum = 0.0;
            for c in 0..self.cols {
                sum += self.get(r, c) * vector[c];
            }
            product[r] = sum;
        }
        Ok(product)
    }

    /// Invert a square matrix with Gauss-Jordan elimination and partial
    /// pivoting.
    ///
    /// The elimination runs on a single augmented `[M | I]` working buffer
    /// allocated up front. At each column the row with the largest absolute
    /// pivot is swapped in; when that magnitude falls below `pivot_epsilon`
    /// the matrix is reported as [`ForecastError::SingularMatrix`], which
    /// callers must treat as recoverable.
    pub fn invert(&self, pivot_epsilon: f64) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(ForecastError::DimensionMismatch {
                expected: self.rows,
                got: self.cols,
            });
        }

        let n = self.rows;
        let width = 2 * n;

        // Augmented working buffer [M | I], reused across all pivot steps.
        let mut work = vec![0.0; n * width];
        for r in 0..n {
            for c in 0..n {
                work[r * width + c] = self.get(r, c);
            }
            work[r * width + n + r] = 1.0;
        }

        for col in 0..n {
            // Partial pivoting: bring up the row with the largest magnitude
            // in this column to bound numerical error.
            let mut pivot_row = col;
            for r in (col + 1)..n {
                if work[r * width + col].abs() > work[pivot_row * width + col].abs() {
                    pivot_row = r;
                }
            }

            if work[pivot_row * width + col].abs() < pivot_epsilon {
                return Err(ForecastError::SingularMatrix);
            }

            if pivot_row != col {
                for c in 0..width {
                    work.swap(pivot_row * width + c, col * width + c);
                }
            }

            let pivot = work[col * width + col];
            for c in 0..width {
                work[col * width + c] /= pivot;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = work[r * width + col];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..width {
                    work[r * width + c] -= factor * work[col * width + c];
                }
            }
        }

        let mut inverse = Matrix::zeros(n, n);
        for r in 0..n {
            for c in 0..n {
                inverse.set(r, c, work[r * width + n + c]);
            }
        }
        Ok(inverse)
    }
}
