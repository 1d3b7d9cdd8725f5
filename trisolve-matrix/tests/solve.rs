use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trisolve::Tolerance;
use trisolve::util::log::init_test_logger;
use trisolve_matrix::{Config, MatAccess};
use trisolve_matrix::dense::Mat;
use trisolve_matrix::dense::triang::*;
use trisolve_matrix::dense::triang::TriangularType::{Lower, Upper};

const SIZES: [usize; 5] = [1, 2, 5, 17, 40];

fn rng() -> StdRng {
    StdRng::seed_from_u64(2010)
}

fn rand_vec(n: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect()
}

fn assert_close(x: &[f64], y: &[f64]) {
    let tol = Tolerance::default();
    assert_eq!(x.len(), y.len());
    for (a, b) in x.iter().zip(y) {
        assert!(tol.approx_eq_rel(*a, *b), "{a} != {b}");
    }
}

#[test]
fn recovers_lower() {
    let mut rng = rng();
    for n in SIZES {
        let l: Mat<f64> = Mat::rand_triangular(Lower, n, &mut rng);
        let x = rand_vec(n, &mut rng);
        let mut b = (&l * &Mat::col_vec(&x)).into_data();

        solve_lower(&l, &mut b, n).unwrap();
        assert_close(&b, &x);
    }
}

#[test]
fn recovers_upper() {
    let mut rng = rng();
    for n in SIZES {
        let u: Mat<f64> = Mat::rand_triangular(Upper, n, &mut rng);
        let x = rand_vec(n, &mut rng);
        let mut b = (&u * &Mat::col_vec(&x)).into_data();

        solve_upper(&u, &mut b, n).unwrap();
        assert_close(&b, &x);
    }
}

#[test]
fn recovers_lower_transposed() {
    let mut rng = rng();
    for n in SIZES {
        let l: Mat<f64> = Mat::rand_triangular(Lower, n, &mut rng);
        let x = rand_vec(n, &mut rng);
        let mut b = (&l.transpose() * &Mat::col_vec(&x)).into_data();

        solve_lower_transposed(&l, &mut b, n).unwrap();
        assert_close(&b, &x);
    }
}

#[test]
fn transposed_lower_is_upper_of_transpose() {
    let mut rng = rng();
    for n in SIZES {
        let l: Mat<f64> = Mat::rand_triangular(Lower, n, &mut rng);
        let b = rand_vec(n, &mut rng);

        let mut x0 = b.clone();
        let mut x1 = b.clone();
        solve_lower_transposed(&l, &mut x0, n).unwrap();
        solve_upper(&l.transpose(), &mut x1, n).unwrap();

        assert_eq!(x0, x1);
    }
}

#[test]
fn mat_equals_columnwise() {
    let mut rng = rng();
    let (m, n) = (17, 6);

    let l: Mat<f64> = Mat::rand_triangular(Lower, m, &mut rng);
    let b: Mat<f64> = Mat::rand((m, n), &mut rng);

    let mut x = b.clone();
    solve_lower_mat(&l, &mut x, m, n).unwrap();

    for j in 0..n {
        let mut c = b.col(j);
        solve_lower(&l, &mut c, m).unwrap();
        assert_eq!(x.col(j), c);
    }
}

#[test]
fn mat_parallel_equals_serial() {
    init_test_logger(log::LevelFilter::Info);

    let mut rng = rng();
    let (m, n) = (30, 200);

    let l: Mat<f64> = Mat::rand_triangular(Lower, m, &mut rng);
    let b: Mat<f64> = Mat::rand((m, n), &mut rng);

    let mut x0 = b.clone();
    let mut x1 = b.clone();
    solve_lower_mat_with(&Config::serial(), &l, &mut x0, m, n).unwrap();
    solve_lower_mat_with(&Config { multithread: true }, &l, &mut x1, m, n).unwrap();

    assert_eq!(x0, x1);
}

#[test]
fn mat_parallel_many_columns() {
    init_test_logger(log::LevelFilter::Info);

    let n = 20_000;
    let l = Mat::from_data((2, 2), [2., 0., 3., 4.]);
    let mut b = Mat::from_fn((2, n), |i, _| if i == 0 { 4. } else { 11. });

    solve_lower_mat_with(&Config { multithread: true }, &l, &mut b, 2, n).unwrap();

    for j in 0..n {
        assert_eq!(b.col(j), vec![2., 1.25]);
    }
}

#[test]
fn range_equals_extracted_block() {
    let mut rng = rng();
    let side = 12;
    let u: Mat<f64> = Mat::rand_triangular(Upper, side, &mut rng);

    for (min_row, max_row) in [(0, 12), (0, 4), (4, 9), (9, 12), (11, 12)] {
        let b = rand_vec(side, &mut rng);

        let mut x = b.clone();
        solve_upper_range(&u, &mut x, side, min_row, max_row).unwrap();

        let k = max_row - min_row;
        let mut y = b[min_row..max_row].to_vec();
        solve_upper(&u.submat(min_row..max_row, min_row..max_row), &mut y, k).unwrap();

        assert_eq!(&x[min_row..max_row], &y[..]);
        assert_eq!(&x[..min_row], &b[..min_row]);
        assert_eq!(&x[max_row..], &b[max_row..]);
    }
}

#[test]
fn garbage_outside_triangle() {
    let mut rng = rng();
    let n = 9;
    let l: Mat<f64> = Mat::rand_triangular(Lower, n, &mut rng);
    let g = Mat::from_fn((n, n), |i, j|
        if i < j { f64::NAN } else { l[(i, j)] }
    );
    let b = rand_vec(n, &mut rng);

    let mut x0 = b.clone();
    let mut x1 = b.clone();
    solve_lower(&l, &mut x0, n).unwrap();
    solve_lower(&g, &mut x1, n).unwrap();
    assert_eq!(x0, x1);

    let mut x0 = b.clone();
    let mut x1 = b.clone();
    solve_lower_transposed(&l, &mut x0, n).unwrap();
    solve_lower_transposed(&g, &mut x1, n).unwrap();
    assert_eq!(x0, x1);
}

#[test]
fn nan_poisons_dependent_rows() {
    let l = Mat::from_data((3, 3), [
        1., 0., 0.,
        1., 1., 0.,
        0., 0., 1.
    ]);
    let mut b = vec![f64::NAN, 1., 1.];
    solve_lower(&l, &mut b, 3).unwrap();

    assert!(Tolerance::is_uncountable(b[0]));
    assert!(Tolerance::is_uncountable(b[1]));
    // 0 * NaN is NaN, so row 2 is poisoned as well.
    assert!(Tolerance::is_uncountable(b[2]));
}

#[test]
fn agrees_with_nalgebra() {
    let mut rng = rng();
    let n = 25;

    let l: Mat<f64> = Mat::rand_triangular(Lower, n, &mut rng);
    let b = rand_vec(n, &mut rng);

    let expected = l.to_na()
        .solve_lower_triangular(&DVector::from_vec(b.clone()))
        .unwrap();

    let mut x = b.clone();
    solve_lower(&l, &mut x, n).unwrap();
    assert_close(&x, expected.as_slice());
}

#[test]
fn solves_on_dmatrix() {
    let u = DMatrix::from_row_slice(2, 2, &[2., 3., 0., 4.]);
    let mut b = DMatrix::from_row_slice(2, 1, &[11., 8.]);

    solve_triangular(Upper, &u, &mut b).unwrap();
    assert_eq!(b.get_at(0, 0), 2.5);
    assert_eq!(b.get_at(1, 0), 2.);
}

#[test]
fn inverse() {
    let mut rng = rng();
    let tol = Tolerance::default().with_tol(1e-6);

    for t in [Lower, Upper] {
        let a: Mat<f64> = Mat::rand_triangular(t, 10, &mut rng);
        let ainv = inv_triangular(t, &a).unwrap();
        assert!(ainv.is_triangular(t));
        assert!((&a * &ainv).approx_eq(&Mat::id(10), &tol));
    }
}
