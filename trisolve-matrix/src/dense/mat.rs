use std::fmt::{self, Display};
use std::ops::{Index, IndexMut, Mul, MulAssign, Range};
use std::str::FromStr;
use auto_impl_ops::auto_ops;
use delegate::delegate;
use itertools::Itertools;
use nalgebra::DMatrix;
use rand::Rng;
use regex::Regex;
use trisolve::{ensure, Error, Real, Tolerance};
use crate::{MatAccess, MatTrait};
use crate::dense::triang::TriangularType;

/// Dense matrix stored row-major: entry `(i, j)` lives at `i * ncols + j`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat<R> {
    shape: (usize, usize),
    data: Vec<R>
}

impl<R> MatTrait for Mat<R> {
    fn shape(&self) -> (usize, usize) {
        self.shape
    }
}

impl<R> Mat<R> {
    pub fn from_data<I>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = R> {
        let data = data.into_iter().collect_vec();
        assert_eq!(data.len(), shape.0 * shape.1, "data length does not match shape {shape:?}");
        Self { shape, data }
    }

    pub fn from_fn<F>(shape: (usize, usize), mut f: F) -> Self
    where F: FnMut(usize, usize) -> R {
        let (m, n) = shape;
        let data = (0..m).flat_map(|i| (0..n).map(move |j| (i, j))).map(|(i, j)| f(i, j));
        Self::from_data(shape, data)
    }

    pub fn into_data(self) -> Vec<R> {
        self.data
    }

    delegate! {
        to self.data {
            pub fn as_slice(&self) -> &[R];
            pub fn as_mut_slice(&mut self) -> &mut [R];
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &R)> {
        let n = self.ncols();
        self.data.iter().enumerate().map(move |(k, a)|
            (k / n, k % n, a)
        )
    }
}

impl<R> Mat<R>
where R: Real {
    pub fn zero(shape: (usize, usize)) -> Self {
        Self::from_fn(shape, |_, _| R::zero())
    }

    pub fn id(size: usize) -> Self {
        Self::from_fn((size, size), |i, j|
            if i == j { R::one() } else { R::zero() }
        )
    }

    pub fn is_id(&self) -> bool {
        self.is_square() && self.iter().all(|(i, j, a)|
            i == j && a.is_one() ||
            i != j && a.is_zero()
        )
    }

    pub fn col_vec(v: &[R]) -> Self {
        Self::from_data((v.len(), 1), v.iter().cloned())
    }

    pub fn transpose(&self) -> Self {
        let (m, n) = self.shape();
        Self::from_fn((n, m), |i, j| self[(j, i)])
    }

    pub fn submat(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        let (i0, i1) = (rows.start, rows.end);
        let (j0, j1) = (cols.start, cols.end);

        assert!(i0 <= i1 && i1 <= self.nrows());
        assert!(j0 <= j1 && j1 <= self.ncols());

        Self::from_fn((i1 - i0, j1 - j0), |i, j| self[(i0 + i, j0 + j)])
    }

    pub fn col(&self, j: usize) -> Vec<R> {
        assert!(j < self.ncols());
        (0..self.nrows()).map(|i| self[(i, j)]).collect()
    }

    pub fn set_col(&mut self, j: usize, v: &[R]) {
        assert!(j < self.ncols());
        assert_eq!(v.len(), self.nrows());
        for (i, &a) in v.iter().enumerate() {
            self[(i, j)] = a;
        }
    }

    pub fn is_lower_triangular(&self) -> bool {
        self.is_square() && self.iter().all(|(i, j, a)|
            i >= j || a.is_zero()
        )
    }

    pub fn is_upper_triangular(&self) -> bool {
        self.is_square() && self.iter().all(|(i, j, a)|
            i <= j || a.is_zero()
        )
    }

    pub fn is_triangular(&self, t: TriangularType) -> bool {
        if t.is_upper() {
            self.is_upper_triangular()
        } else {
            self.is_lower_triangular()
        }
    }

    pub fn approx_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        self.shape() == other.shape() &&
        self.data.iter().zip(other.data.iter()).all(|(&a, &b)|
            tol.approx_eq_rel(a, b)
        )
    }

    /// Random `n × n` triangular matrix with off-diagonal entries in
    /// `[-1, 1)` and diagonal entries of magnitude in `[n, n + 1)`. The
    /// result is diagonally dominant by rows and by columns, hence
    /// non-singular and well conditioned.
    pub fn rand_triangular<G>(t: TriangularType, n: usize, rng: &mut G) -> Self
    where G: Rng {
        use cartesian::cartesian;

        let mut a = Self::zero((n, n));
        let d = n.max(1) as f64;

        for (i, j) in cartesian!(0..n, 0..n) {
            let in_tri = if t.is_upper() { i <= j } else { i >= j };
            if !in_tri { continue }

            let x: f64 = if i == j {
                let s = if rng.gen::<bool>() { 1.0 } else { -1.0 };
                s * rng.gen_range(d..d + 1.0)
            } else {
                rng.gen_range(-1.0_f64..1.0)
            };
            a[(i, j)] = R::from(x).unwrap_or_else(R::one);
        }
        a
    }

    pub fn rand<G>(shape: (usize, usize), rng: &mut G) -> Self
    where G: Rng {
        Self::from_fn(shape, |_, _|
            R::from(rng.gen_range(-1.0_f64..1.0)).unwrap_or_else(R::zero)
        )
    }

    pub fn to_na(&self) -> DMatrix<R> {
        let (m, n) = self.shape();
        DMatrix::from_row_slice(m, n, &self.data)
    }
}

impl<R> Mat<R>
where R: Real + FromStr {
    /// Parses whitespace-separated numbers, filling `ncols` entries per row.
    pub fn parse(s: &str, ncols: usize) -> Result<Self, Error> {
        ensure!(ncols > 0, "ncols must be positive");

        let sep = Regex::new(r"\s+").map_err(|e| Error::new(e.to_string()))?;
        let vals = sep.split(s.trim()).filter(|v| !v.is_empty()).collect_vec();

        ensure!(
            vals.len() % ncols == 0,
            "{} values do not fill rows of {ncols} columns", vals.len()
        );

        let data = vals.iter().map(|v|
            v.parse::<R>().map_err(|_| Error::new(format!("invalid number: '{v}'")))
        ).collect::<Result<Vec<_>, _>>()?;

        let nrows = data.len() / ncols;
        Ok(Self::from_data((nrows, ncols), data))
    }
}

impl<R> MatAccess<R> for Mat<R>
where R: Copy {
    fn get(&self, index: usize) -> R {
        self.data[index]
    }

    fn set(&mut self, index: usize, value: R) {
        self.data[index] = value
    }

    unsafe fn get_unchecked(&self, index: usize) -> R {
        debug_assert!(index < self.data.len());
        *<[R]>::get_unchecked(&self.data, index)
    }

    unsafe fn set_unchecked(&mut self, index: usize, value: R) {
        debug_assert!(index < self.data.len());
        *<[R]>::get_unchecked_mut(&mut self.data, index) = value
    }
}

impl<R> Index<(usize, usize)> for Mat<R> {
    type Output = R;
    fn index(&self, (i, j): (usize, usize)) -> &R {
        let (m, n) = self.shape;
        assert!(i < m && j < n, "index ({i}, {j}) out of range for shape ({m}, {n})");
        &self.data[i * n + j]
    }
}

impl<R> IndexMut<(usize, usize)> for Mat<R> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut R {
        let (m, n) = self.shape;
        assert!(i < m && j < n, "index ({i}, {j}) out of range for shape ({m}, {n})");
        &mut self.data[i * n + j]
    }
}

impl<R> From<DMatrix<R>> for Mat<R>
where R: Real {
    fn from(a: DMatrix<R>) -> Self {
        Self::from_fn(a.shape(), |i, j| a[(i, j)])
    }
}

impl<R> Default for Mat<R>
where R: Real {
    fn default() -> Self {
        Self::zero((0, 0))
    }
}

#[auto_ops]
impl<'a, 'b, R> Mul<&'b Mat<R>> for &'a Mat<R>
where R: Real {
    type Output = Mat<R>;
    fn mul(self, rhs: &'b Mat<R>) -> Self::Output {
        let (m, l) = self.shape();
        let n = rhs.ncols();
        assert_eq!(l, rhs.nrows());

        // k ascending, matching the order the solvers accumulate in.
        Mat::from_fn((m, n), |i, j|
            (0..l).fold(R::zero(), |s, k| s + self[(i, k)] * rhs[(k, j)])
        )
    }
}

impl<R> Display for Mat<R>
where R: Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (m, n) = self.shape();
        let width = f.width().unwrap_or(6);
        let prec = f.precision().unwrap_or(3);

        writeln!(f, "Mat numRows = {m} numCols = {n}")?;
        for i in 0..m {
            let row = (0..n).map(|j|
                format!("{:width$.prec$}", self[(i, j)])
            ).join(" ");
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
