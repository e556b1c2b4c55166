use alloc::format;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::error::{Result, SerialError};
use crate::persist::Persist;
use crate::serializer::Serializer;

use super::load_element;

// -----------------------------------------------------------------------------
// Matrix

/// A dense matrix stored in row-major order.
///
/// # Examples
///
/// ```
/// use ogre_serial::Matrix;
///
/// let m = Matrix::from_fn(2, 3, |row, col| row * 10 + col);
/// assert_eq!(m[(1, 2)], 12);
/// assert_eq!(m.row(0), &[0, 1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// An empty `0 x 0` matrix.
    #[inline]
    pub const fn new() -> Self {
        Self {
            rows: 0,
            cols: 0,
            data: Vec::new(),
        }
    }

    /// Wraps row-major `data`, `None` unless it has `rows * cols` elements.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (rows.checked_mul(cols) == Some(data.len())).then_some(Self { rows, cols, data })
    }

    /// Builds every element from its `(row, col)` index.
    ///
    /// # Panics
    ///
    /// If `rows * cols` overflows.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let Some(len) = rows.checked_mul(cols) else {
            panic!("{rows}x{cols} matrix overflows usize");
        };
        let mut data = Vec::with_capacity(len);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows && col < self.cols {
            self.data.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// # Panics
    ///
    /// If `row` is out of bounds.
    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "row {row} out of bounds for {} rows", self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// All elements in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Clone> Matrix<T> {
    /// A `rows x cols` matrix of copies of `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_fn(rows, cols, |_, _| value.clone())
    }
}

impl<T> Default for Matrix<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        match self.get(row, col) {
            Some(value) => value,
            None => panic!(
                "index ({row}, {col}) out of bounds for a {}x{} matrix",
                self.rows, self.cols
            ),
        }
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let (rows, cols) = (self.rows, self.cols);
        match self.get_mut(row, col) {
            Some(value) => value,
            None => panic!("index ({row}, {col}) out of bounds for a {rows}x{cols} matrix"),
        }
    }
}

impl<T: Persist + Default> Persist for Matrix<T> {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_len(self.rows)?;
        s.write_len(self.cols)?;
        self.data.iter().try_for_each(|element| element.save(s))
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        let position = s.read_position();
        let rows = s.read_len()?;
        let cols = s.read_len()?;
        let len = rows.checked_mul(cols).ok_or_else(|| {
            SerialError::corrupt(position, format!("{rows}x{cols} matrix overflows usize"))
        })?;

        self.data.clear();
        self.data.reserve(s.capacity_hint(len));
        for _ in 0..len {
            self.data.push(load_element(s)?);
        }
        self.rows = rows;
        self.cols = cols;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::Matrix;
    use crate::{Format, SerialError, Serializer};

    #[test]
    fn row_major_layout() {
        let m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(m[(0, 1)], 2);
        assert_eq!(m[(1, 0)], 3);
        assert_eq!(m.get(2, 0), None);
        assert!(Matrix::from_vec(2, 3, vec![0; 4]).is_none());
    }

    #[test]
    fn round_trip() {
        for (rows, cols) in [(0, 0), (0, 4), (1, 1), (3, 2)] {
            let m = Matrix::from_fn(rows, cols, |row, col| (row as f64) - (col as f64) * 0.5);
            for format in [Format::Binary, Format::Text] {
                let mut s = Serializer::builder().format(format).build();
                s.save("stiffness", &m).unwrap();
                s.save("stiffness", &m).unwrap();

                let mut larger = Matrix::filled(4, 5, 7.0);
                let mut empty = Matrix::new();
                s.load("stiffness", &mut larger).unwrap();
                s.load("stiffness", &mut empty).unwrap();
                assert_eq!(larger, m, "{rows}x{cols} {format:?}");
                assert_eq!(empty, m, "{rows}x{cols} {format:?}");
                assert_eq!((empty.rows(), empty.cols()), (rows, cols));
            }
        }
    }

    #[test]
    fn overflowing_shape_is_corrupt() {
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&2_u64.to_le_bytes());
        let mut s = Serializer::from_bytes(bytes);
        let mut back = Matrix::<u8>::new();
        assert!(matches!(
            s.load("m", &mut back),
            Err(SerialError::CorruptData { position: 0, .. })
        ));
    }
}
