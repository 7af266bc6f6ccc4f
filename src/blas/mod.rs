//! Parameter records for the dense linear algebra primitives of the execution
//! context. Matrices are column-major with explicit leading dimensions and
//! element offsets into their buffers, as in BLAS and LAPACK.

pub(crate) mod reference;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Transpose {
    #[default]
    NoTrans,
    Trans,
}

impl Transpose {
    pub fn is_trans(self) -> bool {
        self == Transpose::Trans
    }
}

/// Which triangle of a symmetric matrix is referenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UpLo {
    #[default]
    Upper,
    Lower,
}

/// `C = alpha * op(A) * op(B) + beta * C`, `op(A)` is `m x k`, `op(B)` is
/// `k x n` and `C` is `m x n`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GemmParams {
    pub trans_a: Transpose,
    pub trans_b: Transpose,
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub alpha: f64,
    pub lda: usize,
    pub offset_a: usize,
    pub ldb: usize,
    pub offset_b: usize,
    pub beta: f64,
    pub ldc: usize,
    pub offset_c: usize,
}

impl GemmParams {
    /// Plain `C = A * B` over tightly packed matrices.
    pub fn new(m: usize, n: usize, k: usize) -> Self {
        Self {
            trans_a: Transpose::NoTrans,
            trans_b: Transpose::NoTrans,
            m,
            n,
            k,
            alpha: 1.0,
            lda: m.max(1),
            offset_a: 0,
            ldb: k.max(1),
            offset_b: 0,
            beta: 0.0,
            ldc: m.max(1),
            offset_c: 0,
        }
    }

    pub(crate) fn validate(&self, len_a: usize, len_b: usize, len_c: usize) -> Result<()> {
        let (rows_a, cols_a) = stored(self.trans_a, self.m, self.k);
        let (rows_b, cols_b) = stored(self.trans_b, self.k, self.n);
        check_matrix("gemm", "A", rows_a, cols_a, self.lda, self.offset_a, len_a)?;
        check_matrix("gemm", "B", rows_b, cols_b, self.ldb, self.offset_b, len_b)?;
        check_matrix("gemm", "C", self.m, self.n, self.ldc, self.offset_c, len_c)
    }
}

/// `C = alpha * A * A^T + beta * C` (or `A^T * A` when transposed), only the
/// `uplo` triangle of the `n x n` matrix `C` is updated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyrkParams {
    pub uplo: UpLo,
    pub trans: Transpose,
    pub n: usize,
    pub k: usize,
    pub alpha: f64,
    pub lda: usize,
    pub offset_a: usize,
    pub beta: f64,
    pub ldc: usize,
    pub offset_c: usize,
}

impl SyrkParams {
    pub fn new(uplo: UpLo, n: usize, k: usize) -> Self {
        Self {
            uplo,
            trans: Transpose::NoTrans,
            n,
            k,
            alpha: 1.0,
            lda: n.max(1),
            offset_a: 0,
            beta: 0.0,
            ldc: n.max(1),
            offset_c: 0,
        }
    }

    pub(crate) fn validate(&self, len_a: usize, len_c: usize) -> Result<()> {
        let (rows_a, cols_a) = stored(self.trans, self.n, self.k);
        check_matrix("syrk", "A", rows_a, cols_a, self.lda, self.offset_a, len_a)?;
        check_matrix("syrk", "C", self.n, self.n, self.ldc, self.offset_c, len_c)
    }
}

/// `y = a * x + y` over `n` strided elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxpyParams {
    pub n: usize,
    pub a: f64,
    pub incx: usize,
    pub incy: usize,
}

impl AxpyParams {
    pub fn new(n: usize, a: f64) -> Self {
        Self {
            n,
            a,
            incx: 1,
            incy: 1,
        }
    }

    pub(crate) fn validate(&self, len_x: usize, len_y: usize) -> Result<()> {
        check_vector("x", self.n, self.incx, len_x)?;
        check_vector("y", self.n, self.incy, len_y)
    }
}

/// Cholesky factorization of the `n x n` matrix `A` in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PotrfParams {
    pub uplo: UpLo,
    pub n: usize,
    pub lda: usize,
}

impl PotrfParams {
    pub fn new(uplo: UpLo, n: usize) -> Self {
        Self {
            uplo,
            n,
            lda: n.max(1),
        }
    }

    pub(crate) fn validate(&self, len_a: usize) -> Result<()> {
        check_matrix("potrf", "A", self.n, self.n, self.lda, 0, len_a)
    }
}

/// Solves `A * X = B` for `nrhs` right-hand sides with `A` factored by
/// potrf. `B` is overwritten with `X`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PotrsParams {
    pub uplo: UpLo,
    pub n: usize,
    pub nrhs: usize,
    pub lda: usize,
    pub ldb: usize,
}

impl PotrsParams {
    pub fn new(uplo: UpLo, n: usize, nrhs: usize) -> Self {
        Self {
            uplo,
            n,
            nrhs,
            lda: n.max(1),
            ldb: n.max(1),
        }
    }

    pub(crate) fn validate(&self, len_a: usize, len_b: usize) -> Result<()> {
        check_matrix("potrs", "A", self.n, self.n, self.lda, 0, len_a)?;
        check_matrix("potrs", "B", self.n, self.nrhs, self.ldb, 0, len_b)
    }
}

/// Stored shape of `op(X)` with logical shape `rows x cols`.
fn stored(trans: Transpose, rows: usize, cols: usize) -> (usize, usize) {
    if trans.is_trans() {
        (cols, rows)
    } else {
        (rows, cols)
    }
}

fn check_matrix(
    op: &str,
    name: &str,
    rows: usize,
    cols: usize,
    ld: usize,
    offset: usize,
    len: usize,
) -> Result<()> {
    if ld < rows.max(1) {
        return Err(Error::incorrect_parameter(format!(
            "{}: leading dimension {} of {} is smaller than its {} rows",
            op, ld, name, rows
        ))
        .into());
    }
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let needed = ld
        .checked_mul(cols - 1)
        .and_then(|span| span.checked_add(rows))
        .and_then(|span| span.checked_add(offset))
        .ok_or_else(|| {
            Error::incorrect_parameter(format!(
                "{}: {} with leading dimension {} and offset {} exceeds the address space",
                op, name, ld, offset
            ))
        })?;
    if needed > len {
        return Err(Error::incorrect_parameter(format!(
            "{}: {} needs {} elements but its buffer holds {}",
            op, name, needed, len
        ))
        .into());
    }
    Ok(())
}

fn check_vector(name: &str, n: usize, inc: usize, len: usize) -> Result<()> {
    if inc == 0 {
        return Err(Error::incorrect_parameter(format!("axpy: increment of {} is zero", name)).into());
    }
    if n == 0 {
        return Ok(());
    }
    let needed = (n - 1)
        .checked_mul(inc)
        .and_then(|span| span.checked_add(1))
        .ok_or_else(|| {
            Error::incorrect_parameter(format!(
                "axpy: {} with {} elements of stride {} exceeds the address space",
                name, n, inc
            ))
        })?;
    if needed > len {
        return Err(Error::incorrect_parameter(format!(
            "axpy: {} needs {} elements but its buffer holds {}",
            name, needed, len
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_gemm_validation() {
        let params = GemmParams::new(2, 3, 4);
        assert!(params.validate(8, 12, 6).is_ok());
        assert!(params.validate(7, 12, 6).is_err());

        let mut transposed = params;
        transposed.trans_a = Transpose::Trans;
        transposed.lda = 4;
        assert!(transposed.validate(8, 12, 6).is_ok());

        let mut offset = params;
        offset.offset_c = 1;
        let status = offset.validate(8, 12, 6).unwrap_err();
        assert!(status.contains(ErrorKind::IncorrectParameter));
    }

    #[test]
    fn test_leading_dimension_too_small() {
        let mut params = PotrfParams::new(UpLo::Lower, 3);
        params.lda = 2;
        assert!(params.validate(100).is_err());
    }

    #[test]
    fn test_axpy_strides() {
        let mut params = AxpyParams::new(3, 2.0);
        params.incx = 2;
        assert!(params.validate(5, 3).is_ok());
        assert!(params.validate(4, 3).is_err());
        params.incy = 0;
        assert!(params.validate(5, 3).is_err());
    }

    #[test]
    fn test_huge_dimensions_are_rejected() {
        let mut gemm = GemmParams::new(2, 3, 2);
        gemm.ldc = usize::MAX / 2 + 1;
        let status = gemm.validate(4, 6, 6).unwrap_err();
        assert!(status.contains(ErrorKind::IncorrectParameter));

        let mut offset = GemmParams::new(2, 2, 2);
        offset.offset_a = usize::MAX;
        assert!(offset.validate(4, 4, 4).is_err());

        let mut axpy = AxpyParams::new(3, 1.0);
        axpy.incy = usize::MAX;
        let status = axpy.validate(3, 3).unwrap_err();
        assert!(status.contains(ErrorKind::IncorrectParameter));
    }

    #[test]
    fn test_empty_operands_are_valid() {
        assert!(GemmParams::new(0, 0, 0).validate(0, 0, 0).is_ok());
        assert!(SyrkParams::new(UpLo::Upper, 0, 5).validate(0, 0).is_ok());
    }
}
