//! Solvers for `T·x = b` where `T` is a non-singular triangular matrix.
//!
//! `b` is overwritten with `x`. The `_unchecked` kernels perform no
//! validation at all and are meant to be called from decompositions that
//! already know their shapes. The checked wrappers only validate dimensions:
//! triangularity and non-singularity remain the caller's responsibility, and
//! a zero on the diagonal shows up as `inf` / `NaN` in the result.
//!
//! Rows are resolved in dependency order and every inner sum runs over
//! ascending indices, so results are reproducible bit-for-bit.

use log::info;
use derive_more::Display;
use trisolve::{ensure, Error, Real};
use crate::{Config, MatAccess, MatTrait};
use super::Mat;

cfg_if::cfg_if! { if #[cfg(feature = "multithread")] {
    use std::sync::Mutex;
    use rayon::prelude::*;
}}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum TriangularType {
    Upper, Lower
}

impl TriangularType {
    pub fn is_upper(&self) -> bool {
        match self {
            Self::Upper => true,
            Self::Lower => false
        }
    }
}

/// Forward substitution: `b = L⁻¹ b` for an `n × n` lower triangular `L`.
///
/// # Safety
/// `l` must have `n` columns and at least `n` rows, and `b` at least `n`
/// entries.
pub unsafe fn solve_lower_unchecked<R, L, B>(l: &L, b: &mut B, n: usize)
where R: Real, L: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    for i in 0..n {
        let mut sum = b.get_unchecked(i);
        let mut index_l = i * n;
        for k in 0..i {
            sum = sum - l.get_unchecked(index_l) * b.get_unchecked(k);
            index_l += 1;
        }
        b.set_unchecked(i, sum / l.get_unchecked(index_l));
    }
}

/// `B = L⁻¹ B` for an `m × m` lower triangular `L` and an `m × n` row-major
/// `B`, one column at a time.
///
/// # Safety
/// `l` must be `m × m` and `b` must hold at least `m * n` entries.
pub unsafe fn solve_lower_mat_unchecked<R, L, B>(l: &L, b: &mut B, m: usize, n: usize)
where R: Real, L: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    for j in 0..n {
        for i in 0..m {
            let mut sum = b.get_unchecked(i * n + j);
            for k in 0..i {
                sum = sum - l.get_at_unchecked(i, k) * b.get_unchecked(k * n + j);
            }
            b.set_unchecked(i * n + j, sum / l.get_at_unchecked(i, i));
        }
    }
}

/// `b = (Lᵗ)⁻¹ b` for an `n × n` lower triangular `L`, reading `L` through
/// transposed indices. This is backward substitution.
///
/// # Safety
/// `l` must be `n × n` and `b` must hold at least `n` entries.
pub unsafe fn solve_lower_transposed_unchecked<R, L, B>(l: &L, b: &mut B, n: usize)
where R: Real, L: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    for i in (0..n).rev() {
        let mut sum = b.get_unchecked(i);
        for k in i + 1 .. n {
            sum = sum - l.get_at_unchecked(k, i) * b.get_unchecked(k);
        }
        b.set_unchecked(i, sum / l.get_at_unchecked(i, i));
    }
}

/// Backward substitution: `b = U⁻¹ b` for an `n × n` upper triangular `U`.
///
/// # Safety
/// `u` must be `n × n` and `b` must hold at least `n` entries.
pub unsafe fn solve_upper_unchecked<R, U, B>(u: &U, b: &mut B, n: usize)
where R: Real, U: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    solve_upper_range_unchecked(u, b, n, 0, n)
}

/// Backward substitution on the diagonal block `[min_row, max_row)` of a
/// `side × side` upper triangular `U`. Entries outside the block, in `U` as
/// well as in `b`, are neither read nor written.
///
/// # Safety
/// `u` must be `side × side`, `min_row <= max_row <= side`, and `b` must
/// hold at least `max_row` entries.
pub unsafe fn solve_upper_range_unchecked<R, U, B>(u: &U, b: &mut B, side: usize, min_row: usize, max_row: usize)
where R: Real, U: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    for i in (min_row .. max_row).rev() {
        let mut sum = b.get_unchecked(i);
        let mut index_u = i * side + i + 1;
        for j in i + 1 .. max_row {
            sum = sum - u.get_unchecked(index_u) * b.get_unchecked(j);
            index_u += 1;
        }
        b.set_unchecked(i, sum / u.get_unchecked(i * side + i));
    }
}

pub fn solve_lower<R, L, B>(l: &L, b: &mut B, n: usize) -> Result<(), Error>
where R: Real, L: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    check_tri(l, n)?;
    check_rhs_vec(b, n)?;

    unsafe { solve_lower_unchecked(l, b, n) };
    Ok(())
}

pub fn solve_lower_mat<R, L, B>(l: &L, b: &mut B, m: usize, n: usize) -> Result<(), Error>
where R: Real, L: MatAccess<R> + Sync + ?Sized, B: MatAccess<R> + Sync + ?Sized {
    solve_lower_mat_with(&Config::default(), l, b, m, n)
}

/// Same as [`solve_lower_mat`]. When `cfg` enables multithreading the
/// columns are solved in parallel; the result is identical either way.
pub fn solve_lower_mat_with<R, L, B>(cfg: &Config, l: &L, b: &mut B, m: usize, n: usize) -> Result<(), Error>
where R: Real, L: MatAccess<R> + Sync + ?Sized, B: MatAccess<R> + Sync + ?Sized {
    check_tri(l, m)?;
    check_rhs_mat(b, m, n)?;

    cfg_if::cfg_if! {
        if #[cfg(feature = "multithread")] {
            if cfg.is_multithread_enabled() && n > 1 {
                solve_lower_mat_m(l, b, m, n);
                return Ok(())
            }
        } else {
            let _ = cfg;
        }
    }

    solve_lower_mat_s(l, b, m, n);
    Ok(())
}

pub fn solve_lower_transposed<R, L, B>(l: &L, b: &mut B, n: usize) -> Result<(), Error>
where R: Real, L: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    check_tri(l, n)?;
    check_rhs_vec(b, n)?;

    unsafe { solve_lower_transposed_unchecked(l, b, n) };
    Ok(())
}

pub fn solve_upper<R, U, B>(u: &U, b: &mut B, n: usize) -> Result<(), Error>
where R: Real, U: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    check_tri(u, n)?;
    check_rhs_vec(b, n)?;

    unsafe { solve_upper_unchecked(u, b, n) };
    Ok(())
}

pub fn solve_upper_range<R, U, B>(u: &U, b: &mut B, side: usize, min_row: usize, max_row: usize) -> Result<(), Error>
where R: Real, U: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    check_tri(u, side)?;
    ensure!(
        min_row <= max_row && max_row <= side,
        "invalid row range {min_row}..{max_row} for side {side}"
    );
    check_rhs_vec(b, max_row)?;

    unsafe { solve_upper_range_unchecked(u, b, side, min_row, max_row) };
    Ok(())
}

/// Solves `a·x = b` in place, `a` being square and triangular of type `t`.
pub fn solve_triangular<R, A, B>(t: TriangularType, a: &A, b: &mut B) -> Result<(), Error>
where R: Real, A: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    ensure!(a.is_square(), "{t} triangular matrix must be square, got {:?}", a.shape());

    let n = a.nrows();
    match t {
        TriangularType::Upper => solve_upper(a, b, n),
        TriangularType::Lower => solve_lower(a, b, n),
    }
}

pub fn inv_triangular<R>(t: TriangularType, a: &Mat<R>) -> Result<Mat<R>, Error>
where R: Real {
    ensure!(a.is_square(), "{t} triangular matrix must be square, got {:?}", a.shape());

    let n = a.nrows();
    let mut e = Mat::id(n);

    match t {
        TriangularType::Lower => solve_lower_mat(a, &mut e, n, n)?,
        TriangularType::Upper => for j in 0..n {
            let mut x = e.col(j);
            solve_upper(a, &mut x, n)?;
            e.set_col(j, &x);
        }
    }

    Ok(e)
}

fn solve_lower_mat_s<R, L, B>(l: &L, b: &mut B, m: usize, n: usize)
where R: Real, L: MatAccess<R> + ?Sized, B: MatAccess<R> + ?Sized {
    info!("solve lower: L = {:?}, B = {:?}", (m, m), (m, n));

    unsafe { solve_lower_mat_unchecked(l, b, m, n) }
}

// Each column is copied into its own contiguous buffer, solved there with
// the vector kernel, and written back once all columns are done.
#[cfg(feature = "multithread")]
fn solve_lower_mat_m<R, L, B>(l: &L, b: &mut B, m: usize, n: usize)
where R: Real, L: MatAccess<R> + Sync + ?Sized, B: MatAccess<R> + Sync + ?Sized {
    let nth = rayon::current_num_threads();

    info!("solve lower: L = {:?}, B = {:?} (multi-thread: {nth})", (m, m), (m, n));

    let report = log::max_level() >= log::LevelFilter::Info && n >= 10_000;
    let col_count = Mutex::new(0);

    let mut cols = vec![R::zero(); m * n];
    let src = &*b;

    cols.par_chunks_mut(m.max(1)).enumerate().for_each(|(j, x)| {
        for (i, x_i) in x.iter_mut().enumerate() {
            *x_i = unsafe { src.get_unchecked(i * n + j) };
        }

        unsafe { solve_lower_unchecked(l, x, m) };

        if report {
            let c = {
                let mut c = col_count.lock().unwrap();
                *c += 1;
                *c
            };
            if c % 10_000 == 0 {
                info!("  solved {c}/{n}");
            }
        }
    });

    for (j, x) in cols.chunks(m.max(1)).enumerate() {
        for (i, &x_i) in x.iter().enumerate() {
            unsafe { b.set_unchecked(i * n + j, x_i) };
        }
    }
}

fn check_tri<T>(t: &T, n: usize) -> Result<(), Error>
where T: MatTrait + ?Sized {
    ensure!(
        t.shape() == (n, n),
        "triangular matrix must be {n} x {n}, got {:?}", t.shape()
    );
    Ok(())
}

fn check_rhs_vec<B>(b: &B, n: usize) -> Result<(), Error>
where B: MatTrait + ?Sized {
    ensure!(
        b.size() >= n,
        "right-hand side must have at least {n} entries, got {}", b.size()
    );
    Ok(())
}

// An `m × n` matrix, or a flat buffer of `m * n` entries in row-major order.
fn check_rhs_mat<B>(b: &B, m: usize, n: usize) -> Result<(), Error>
where B: MatTrait + ?Sized {
    let shape = b.shape();
    ensure!(
        shape == (m, n) || (shape.1 == 1 && shape.0 == m * n),
        "right-hand side must be {m} x {n}, got {shape:?}"
    );
    Ok(())
}
