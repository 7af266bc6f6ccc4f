use num_traits::Float;

use crate::error::{Error, Result};

use super::{AxpyParams, GemmParams, PotrfParams, PotrsParams, SyrkParams, UpLo};

fn convert<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

pub(crate) fn gemm<T: Float>(p: &GemmParams, a: &[T], b: &[T], c: &mut [T]) {
    let alpha = convert::<T>(p.alpha);
    let beta = convert::<T>(p.beta);

    let get_a = |row: usize, col: usize| -> T {
        if p.trans_a.is_trans() {
            a[p.offset_a + row * p.lda + col]
        } else {
            a[p.offset_a + col * p.lda + row]
        }
    };
    let get_b = |row: usize, col: usize| -> T {
        if p.trans_b.is_trans() {
            b[p.offset_b + row * p.ldb + col]
        } else {
            b[p.offset_b + col * p.ldb + row]
        }
    };

    for j in 0..p.n {
        for i in 0..p.m {
            let mut sum = T::zero();
            for l in 0..p.k {
                sum = sum + get_a(i, l) * get_b(l, j);
            }
            let slot = &mut c[p.offset_c + j * p.ldc + i];
            // beta == 0 must not propagate NaN from an uninitialized C
            *slot = if p.beta == 0.0 {
                alpha * sum
            } else {
                alpha * sum + beta * *slot
            };
        }
    }
}

pub(crate) fn syrk<T: Float>(p: &SyrkParams, a: &[T], c: &mut [T]) {
    let alpha = convert::<T>(p.alpha);
    let beta = convert::<T>(p.beta);

    // op(A) is n x k
    let get_a = |row: usize, col: usize| -> T {
        if p.trans.is_trans() {
            a[p.offset_a + row * p.lda + col]
        } else {
            a[p.offset_a + col * p.lda + row]
        }
    };

    for j in 0..p.n {
        let rows = match p.uplo {
            UpLo::Upper => 0..j + 1,
            UpLo::Lower => j..p.n,
        };
        for i in rows {
            let mut sum = T::zero();
            for l in 0..p.k {
                sum = sum + get_a(i, l) * get_a(j, l);
            }
            let slot = &mut c[p.offset_c + j * p.ldc + i];
            *slot = if p.beta == 0.0 {
                alpha * sum
            } else {
                alpha * sum + beta * *slot
            };
        }
    }
}

pub(crate) fn axpy<T: Float>(p: &AxpyParams, x: &[T], y: &mut [T]) {
    let a = convert::<T>(p.a);
    for i in 0..p.n {
        let yi = &mut y[i * p.incy];
        *yi = a * x[i * p.incx] + *yi;
    }
}

/// Overwrites the `uplo` triangle of `A` with its Cholesky factor. Reports
/// the 1-based order of the first leading minor that is not positive.
pub(crate) fn potrf<T: Float>(p: &PotrfParams, a: &mut [T]) -> Result<()> {
    let n = p.n;
    let lda = p.lda;
    // Lower: A = L * L^T with L(i, j) at [j * lda + i]. Upper: A = U^T * U,
    // U(j, i) is stored at [i * lda + j], the transpose of the lower layout.
    let at = |i: usize, j: usize| match p.uplo {
        UpLo::Lower => j * lda + i,
        UpLo::Upper => i * lda + j,
    };

    for j in 0..n {
        let mut diagonal = a[at(j, j)];
        for l in 0..j {
            diagonal = diagonal - a[at(j, l)] * a[at(j, l)];
        }
        if diagonal <= T::zero() || !diagonal.is_finite() {
            return Err(Error::NotPositiveDefinite(j + 1).into());
        }
        let diagonal = diagonal.sqrt();
        a[at(j, j)] = diagonal;

        for i in j + 1..n {
            let mut value = a[at(i, j)];
            for l in 0..j {
                value = value - a[at(i, l)] * a[at(j, l)];
            }
            a[at(i, j)] = value / diagonal;
        }
    }
    Ok(())
}

/// Solves with the factor produced by [`potrf`]: forward substitution with
/// `L` (or `U^T`), then back substitution with `L^T` (or `U`).
pub(crate) fn potrs<T: Float>(p: &PotrsParams, a: &[T], b: &mut [T]) {
    let n = p.n;
    let lda = p.lda;
    let at = |i: usize, j: usize| match p.uplo {
        UpLo::Lower => j * lda + i,
        UpLo::Upper => i * lda + j,
    };

    for r in 0..p.nrhs {
        let column = r * p.ldb;
        for i in 0..n {
            let mut value = b[column + i];
            for l in 0..i {
                value = value - a[at(i, l)] * b[column + l];
            }
            b[column + i] = value / a[at(i, i)];
        }
        for i in (0..n).rev() {
            let mut value = b[column + i];
            for l in i + 1..n {
                value = value - a[at(l, i)] * b[column + l];
            }
            b[column + i] = value / a[at(i, i)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blas::Transpose;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_gemm_column_major() {
        // A = [1 3; 2 4], B = [5 7; 6 8]
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        let mut c = [f64::NAN; 4];
        gemm(&GemmParams::new(2, 2, 2), &a, &b, &mut c);
        assert!(close(&c, &[23.0, 34.0, 31.0, 46.0]));

        let mut params = GemmParams::new(2, 2, 2);
        params.trans_a = Transpose::Trans;
        params.alpha = 2.0;
        params.beta = 1.0;
        let mut c = [1.0; 4];
        gemm(&params, &a, &b, &mut c);
        // A^T * B = [17 23; 39 53]
        assert!(close(&c, &[35.0, 79.0, 47.0, 107.0]));
    }

    #[test]
    fn test_syrk_updates_one_triangle() {
        // A = [1 2; 3 4] column-major, A * A^T = [5 11; 11 25]
        let a = [1.0, 3.0, 2.0, 4.0];
        let mut c = [0.0, -1.0, 0.0, 0.0];
        syrk(&SyrkParams::new(UpLo::Upper, 2, 2), &a, &mut c);
        assert!(close(&c, &[5.0, -1.0, 11.0, 25.0]));
    }

    #[test]
    fn test_axpy() {
        let x = [1.0f32, 2.0, 3.0];
        let mut y = [1.0f32, 1.0, 1.0];
        axpy(&AxpyParams::new(3, 2.0), &x, &mut y);
        assert_eq!(y, [3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_cholesky_solve_both_triangles() {
        // A = [4 2; 2 3], b = A * [1, 2] = [8, 8]
        for uplo in [UpLo::Lower, UpLo::Upper] {
            let mut a = [4.0, 2.0, 2.0, 3.0];
            potrf(&PotrfParams::new(uplo, 2), &mut a).unwrap();
            let mut b = [8.0, 8.0];
            potrs(&PotrsParams::new(uplo, 2, 1), &a, &mut b);
            assert!(close(&b, &[1.0, 2.0]), "{:?}: {:?}", uplo, b);
        }
    }

    #[test]
    fn test_potrf_rejects_indefinite() {
        let mut a = [1.0, 2.0, 2.0, 1.0];
        let status = potrf(&PotrfParams::new(UpLo::Lower, 2), &mut a).unwrap_err();
        assert_eq!(status.errors(), &[Error::NotPositiveDefinite(2)]);
    }
}
