use nalgebra::{DMatrix, Scalar};

pub trait MatTrait {
    fn shape(&self) -> (usize, usize);
    fn nrows(&self) -> usize { self.shape().0 }
    fn ncols(&self) -> usize { self.shape().1 }
    fn size(&self) -> usize {
        let (m, n) = self.shape();
        m * n
    }
    fn is_square(&self) -> bool {
        let (m, n) = self.shape();
        m == n
    }
}

/// Element access on row-major dense storage.
///
/// `get` / `set` address the linear offset `i * ncols + j`; `get_at` /
/// `set_at` address `(i, j)`. The checked methods panic when out of range.
/// The `_unchecked` methods skip the check and are meant for inner loops
/// whose indices are already known to be valid.
pub trait MatAccess<R>: MatTrait
where R: Copy {
    fn get(&self, index: usize) -> R;
    fn set(&mut self, index: usize, value: R);

    /// # Safety
    /// `index < self.size()`.
    unsafe fn get_unchecked(&self, index: usize) -> R;

    /// # Safety
    /// `index < self.size()`.
    unsafe fn set_unchecked(&mut self, index: usize, value: R);

    fn get_at(&self, i: usize, j: usize) -> R {
        let (m, n) = self.shape();
        assert!(i < m && j < n, "index ({i}, {j}) out of range for shape ({m}, {n})");
        self.get(i * n + j)
    }

    fn set_at(&mut self, i: usize, j: usize, value: R) {
        let (m, n) = self.shape();
        assert!(i < m && j < n, "index ({i}, {j}) out of range for shape ({m}, {n})");
        self.set(i * n + j, value)
    }

    /// # Safety
    /// `i < self.nrows()` and `j < self.ncols()`.
    unsafe fn get_at_unchecked(&self, i: usize, j: usize) -> R {
        self.get_unchecked(i * self.ncols() + j)
    }
}

// A slice is a column vector.
impl<R> MatTrait for [R] {
    fn shape(&self) -> (usize, usize) {
        (self.len(), 1)
    }
}

impl<R> MatAccess<R> for [R]
where R: Copy {
    fn get(&self, index: usize) -> R {
        self[index]
    }

    fn set(&mut self, index: usize, value: R) {
        self[index] = value
    }

    unsafe fn get_unchecked(&self, index: usize) -> R {
        debug_assert!(index < self.len());
        *<[R]>::get_unchecked(self, index)
    }

    unsafe fn set_unchecked(&mut self, index: usize, value: R) {
        debug_assert!(index < self.len());
        *<[R]>::get_unchecked_mut(self, index) = value
    }
}

impl<R> MatTrait for Vec<R> {
    fn shape(&self) -> (usize, usize) {
        (self.len(), 1)
    }
}

impl<R> MatAccess<R> for Vec<R>
where R: Copy {
    fn get(&self, index: usize) -> R {
        MatAccess::get(self.as_slice(), index)
    }

    fn set(&mut self, index: usize, value: R) {
        MatAccess::set(self.as_mut_slice(), index, value)
    }

    unsafe fn get_unchecked(&self, index: usize) -> R {
        MatAccess::get_unchecked(self.as_slice(), index)
    }

    unsafe fn set_unchecked(&mut self, index: usize, value: R) {
        MatAccess::set_unchecked(self.as_mut_slice(), index, value)
    }
}

// nalgebra stores column-major, so the row-major offset is translated.
impl<R> MatTrait for DMatrix<R> {
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl<R> MatAccess<R> for DMatrix<R>
where R: Scalar + Copy {
    fn get(&self, index: usize) -> R {
        let n = self.ncols();
        self[(index / n, index % n)]
    }

    fn set(&mut self, index: usize, value: R) {
        let n = self.ncols();
        self[(index / n, index % n)] = value
    }

    unsafe fn get_unchecked(&self, index: usize) -> R {
        let n = self.ncols();
        *self.get_unchecked((index / n, index % n))
    }

    unsafe fn set_unchecked(&mut self, index: usize, value: R) {
        let n = self.ncols();
        *self.get_unchecked_mut((index / n, index % n)) = value
    }
}
