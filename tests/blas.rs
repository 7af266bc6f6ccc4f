use hetexec::{
    AxpyParams, ContextConfig, DeviceExecutionContext, ErrorKind, ExecutionContext, GemmParams,
    HostArray, PotrfParams, PotrsParams, SyrkParams, Transpose, TypeId, UniversalBuffer, UpLo,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOLERANCE: f64 = 1e-9;

fn context() -> DeviceExecutionContext {
    DeviceExecutionContext::new(ContextConfig {
        memory_limit: Some(1 << 20),
        ..Default::default()
    })
    .unwrap()
}

fn upload(context: &DeviceExecutionContext, data: &[f64]) -> UniversalBuffer {
    let buffer = context.allocate(TypeId::Float64, data.len()).unwrap();
    context
        .copy_from_host(&buffer, 0, HostArray::new(data), 0, data.len())
        .unwrap();
    buffer
}

fn download(buffer: &UniversalBuffer) -> Vec<f64> {
    buffer.get::<f64>().to_vec().unwrap()
}

fn random(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < TOLERANCE, "element {}: {} != {}", i, a, e);
    }
}

/// Column-major symmetric positive definite matrix.
fn spd(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let g = random(rng, n * n);
    let mut m = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let dot: f64 = (0..n).map(|l| g[l * n + i] * g[l * n + j]).sum();
            m[j * n + i] = dot + if i == j { n as f64 } else { 0.0 };
        }
    }
    m
}

#[test]
fn test_gemm_matches_naive_product() {
    let mut rng = StdRng::seed_from_u64(1);
    let (m, n, k) = (5, 4, 3);
    // A is stored k x m and used transposed.
    let a = random(&mut rng, k * m);
    let b = random(&mut rng, k * n);
    let c = random(&mut rng, m * n);

    let params = GemmParams {
        trans_a: Transpose::Trans,
        lda: k,
        alpha: 1.5,
        beta: 0.5,
        ..GemmParams::new(m, n, k)
    };

    let mut expected = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            let dot: f64 = (0..k).map(|l| a[i * k + l] * b[j * k + l]).sum();
            expected[j * m + i] = 1.5 * dot + 0.5 * c[j * m + i];
        }
    }

    let context = context();
    let (da, db, dc) = (upload(&context, &a), upload(&context, &b), upload(&context, &c));
    context.gemm(&params, &da, &db, &dc).unwrap();
    assert_close(&download(&dc), &expected);
}

#[test]
fn test_syrk_updates_one_triangle() {
    let mut rng = StdRng::seed_from_u64(2);
    let (n, k) = (4, 3);
    let a = random(&mut rng, n * k);
    let c = random(&mut rng, n * n);
    let params = SyrkParams {
        alpha: 2.0,
        beta: 1.0,
        ..SyrkParams::new(UpLo::Lower, n, k)
    };

    let mut expected = c.clone();
    for j in 0..n {
        for i in j..n {
            let dot: f64 = (0..k).map(|l| a[l * n + i] * a[l * n + j]).sum();
            expected[j * n + i] = 2.0 * dot + c[j * n + i];
        }
    }

    let context = context();
    let (da, dc) = (upload(&context, &a), upload(&context, &c));
    context.syrk(&params, &da, &dc).unwrap();
    assert_close(&download(&dc), &expected);
}

#[test]
fn test_axpy_with_strides() {
    let mut rng = StdRng::seed_from_u64(3);
    let x = random(&mut rng, 8);
    let y = random(&mut rng, 12);
    let params = AxpyParams {
        incx: 2,
        incy: 3,
        ..AxpyParams::new(4, -0.5)
    };

    let mut expected = y.clone();
    for i in 0..4 {
        expected[i * 3] += -0.5 * x[i * 2];
    }

    let context = context();
    let (dx, dy) = (upload(&context, &x), upload(&context, &y));
    context.axpy(&params, &dx, &dy).unwrap();
    assert_close(&download(&dy), &expected);
    assert_close(&download(&dx), &x);
}

#[test]
fn test_cholesky_factor_reproduces_matrix() {
    let mut rng = StdRng::seed_from_u64(4);
    let n = 5;
    let m = spd(&mut rng, n);

    let context = context();
    let da = upload(&context, &m);
    context.potrf(&PotrfParams::new(UpLo::Lower, n), &da).unwrap();
    let l = download(&da);

    for i in 0..n {
        for j in 0..=i {
            let dot: f64 = (0..=j).map(|p| l[p * n + i] * l[p * n + j]).sum();
            assert!((dot - m[j * n + i]).abs() < TOLERANCE);
        }
    }
}

#[test]
fn test_cholesky_solve_recovers_solution() {
    let mut rng = StdRng::seed_from_u64(5);
    let (n, nrhs) = (6, 2);
    let m = spd(&mut rng, n);
    let x = random(&mut rng, n * nrhs);

    let mut b = vec![0.0; n * nrhs];
    for r in 0..nrhs {
        for i in 0..n {
            b[r * n + i] = (0..n).map(|j| m[j * n + i] * x[r * n + j]).sum();
        }
    }

    for uplo in [UpLo::Lower, UpLo::Upper] {
        let context = context();
        let (da, db) = (upload(&context, &m), upload(&context, &b));
        context.potrf(&PotrfParams::new(uplo, n), &da).unwrap();
        context.potrs(&PotrsParams::new(uplo, n, nrhs), &da, &db).unwrap();

        let solved = download(&db);
        for (s, e) in solved.iter().zip(&x) {
            assert!((s - e).abs() < 1e-8, "{:?}: {} != {}", uplo, s, e);
        }
    }
}

#[test]
fn test_indefinite_matrix_is_reported() {
    let context = context();
    let da = upload(&context, &[1.0, 2.0, 2.0, 1.0]);
    let status = context.potrf(&PotrfParams::new(UpLo::Lower, 2), &da).unwrap_err();
    assert!(status.contains(ErrorKind::Numeric));
    assert!(status.to_string().contains("leading minor 2"));
}

#[test]
fn test_operands_are_validated() {
    let context = context();
    let a = upload(&context, &[1.0; 6]);
    let b = upload(&context, &[1.0; 6]);
    let c = upload(&context, &[0.0; 4]);

    let short = GemmParams { lda: 1, ..GemmParams::new(2, 2, 3) };
    let status = context.gemm(&short, &a, &b, &c).unwrap_err();
    assert!(status.contains(ErrorKind::IncorrectParameter));
    assert_eq!(download(&c), vec![0.0; 4]);

    let single = context.allocate(TypeId::Float32, 4).unwrap();
    let status = context.gemm(&GemmParams::new(2, 2, 2), &a, &b, &single).unwrap_err();
    assert!(status.contains(ErrorKind::IncorrectParameter));

    let overflowing = GemmParams { ldc: usize::MAX / 2 + 1, ..GemmParams::new(2, 2, 3) };
    let status = context.gemm(&overflowing, &a, &b, &c).unwrap_err();
    assert!(status.contains(ErrorKind::IncorrectParameter));

    context.gemm(&GemmParams::new(2, 2, 3), &a, &b, &c).unwrap();
    assert_eq!(download(&c), vec![3.0; 4]);
}
