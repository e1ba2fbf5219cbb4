#![allow(clippy::float_cmp)]
use super::*;

use crate::consts::TWOPI;
use crate::mesh::grid_width::GridWidth;
use crate::test_helper::close;
use ndarray::Axis;
use quickcheck::TestResult;

const TOL: f64 = 1e-9;

fn unit_box() -> BoxSize {
    BoxSize {
        x: 1.,
        y: 1.,
        z: 1.,
    }
}

/// Grid point positions in table order (x fastest).
fn points(gs: GridSize, bs: BoxSize) -> Vec<[f64; 3]> {
    let gw = GridWidth::new(gs, bs);
    let mut p = Vec::with_capacity(gs.len());
    for iz in 0..gs.z {
        for iy in 0..gs.y {
            for ix in 0..gs.x {
                p.push([ix as f64 * gw.x, iy as f64 * gw.y, iz as f64 * gw.z]);
            }
        }
    }
    p
}

/// Samples `f` at all grid points and builds a field from the resulting
/// table rows.
fn sample<F>(gs: GridSize, bs: BoxSize, kind: FieldKind, f: F) -> StructuredField
where
    F: Fn([f64; 3]) -> Vec<f64>,
{
    let p = points(gs, bs);
    let mut rows = Array2::zeros((p.len(), kind.components()));

    for (mut row, x) in rows.axis_iter_mut(Axis(0)).zip(&p) {
        let v = f(*x);
        assert_eq!(v.len(), kind.components());
        for (r, v) in row.iter_mut().zip(v) {
            *r = v;
        }
    }

    StructuredField::from_rows(rows.view(), gs, bs, kind).unwrap()
}

fn rows_of(res: &DivergenceResult) -> Array2<f64> {
    res.to_rows().unwrap()
}

#[test]
fn test_constant_vector_field_has_no_divergence() {
    let gs = GridSize { x: 5, y: 4, z: 3 };
    let f = sample(gs, unit_box(), FieldKind::Vector, |_| vec![1.5, -2., 0.25]);

    let div = divergence(&f).unwrap();

    assert_eq!(div.data.shape(), &[3, 4, 5]);
    assert!(div.data.iter().all(|v| close(*v, 0., TOL)));
}

#[test]
fn test_constant_tensor_field_has_no_divergence() {
    let gs = GridSize { x: 4, y: 4, z: 4 };
    let f = sample(gs, unit_box(), FieldKind::Tensor, |_| {
        (1..10).map(|v| v as f64).collect()
    });

    let div = divergence(&f).unwrap();

    assert_eq!(div.data.shape(), &[4, 4, 4, 3]);
    assert!(div.data.iter().all(|v| close(*v, 0., TOL)));
}

#[test]
fn test_rank_mapping() {
    let gs = GridSize { x: 3, y: 2, z: 2 };
    let mut solver = SpectralSolver::new(gs, unit_box()).unwrap();

    let v = sample(gs, unit_box(), FieldKind::Vector, |_| vec![0.; 3]);
    let t = sample(gs, unit_box(), FieldKind::Tensor, |_| vec![0.; 9]);

    let dv = solver.divergence(&v).unwrap();
    let dt = solver.divergence(&t).unwrap();

    assert_eq!(dv.output_components(), 1);
    assert_eq!(rows_of(&dv).dim(), (12, 1));
    assert_eq!(dt.output_components(), 3);
    assert_eq!(rows_of(&dt).dim(), (12, 3));
}

#[test]
fn test_sine_along_x() {
    let gs = GridSize { x: 4, y: 4, z: 4 };
    let bs = unit_box();
    let f = sample(gs, bs, FieldKind::Vector, |p| {
        vec![(TWOPI * p[0]).sin(), 0., 0.]
    });

    let div = rows_of(&divergence(&f).unwrap());

    for (d, p) in div.column(0).iter().zip(points(gs, bs)) {
        let e = TWOPI * (TWOPI * p[0]).cos();
        assert!(close(*d, e, TOL), "{} != {} at {:?}", d, e, p);
    }
}

#[test]
fn test_sine_against_central_differences() {
    // the second order stencil needs some points per wavelength to agree
    // within a few percent
    let gs = GridSize { x: 32, y: 2, z: 2 };
    let bs = unit_box();
    let h = 1. / 32.;
    let u = |x: f64| (TWOPI * x).sin();

    let f = sample(gs, bs, FieldKind::Vector, |p| vec![u(p[0]), 0., 0.]);
    let div = rows_of(&divergence(&f).unwrap());

    for (d, p) in div.column(0).iter().zip(points(gs, bs)) {
        let fd = (u(p[0] + h) - u(p[0] - h)) / (2. * h);
        assert!(
            (d - fd).abs() <= 0.05 * TWOPI,
            "spectral {} vs central difference {} at {:?}",
            d,
            fd,
            p
        );
    }
}

#[test]
fn test_axes_are_not_mixed_up() {
    let gs = GridSize { x: 4, y: 6, z: 8 };
    let bs = BoxSize {
        x: 1.,
        y: 2.,
        z: 3.,
    };

    let f = sample(gs, bs, FieldKind::Vector, |p| {
        vec![
            0.,
            (TWOPI * p[1] / bs.y).sin(),
            (2. * TWOPI * p[2] / bs.z).cos(),
        ]
    });

    let div = rows_of(&divergence(&f).unwrap());

    for (d, p) in div.column(0).iter().zip(points(gs, bs)) {
        let e = TWOPI / bs.y * (TWOPI * p[1] / bs.y).cos()
            - 2. * TWOPI / bs.z * (2. * TWOPI * p[2] / bs.z).sin();
        assert!(close(*d, e, TOL), "{} != {} at {:?}", d, e, p);
    }
}

#[test]
fn test_tensor_contracts_over_columns() {
    let gs = GridSize { x: 4, y: 5, z: 6 };
    let bs = BoxSize {
        x: 2.,
        y: 1.,
        z: 0.5,
    };

    // T_01 depends on y, T_12 on z, T_20 on x. Everything else is constant.
    let f = sample(gs, bs, FieldKind::Tensor, |p| {
        let mut t = vec![3.; 9];
        t[1] = (TWOPI * p[1] / bs.y).sin();
        t[5] = (TWOPI * p[2] / bs.z).sin();
        t[6] = (TWOPI * p[0] / bs.x).cos();
        t
    });

    let div = rows_of(&divergence(&f).unwrap());

    for (d, p) in div.axis_iter(Axis(0)).zip(points(gs, bs)) {
        let e = [
            TWOPI / bs.y * (TWOPI * p[1] / bs.y).cos(),
            TWOPI / bs.z * (TWOPI * p[2] / bs.z).cos(),
            -TWOPI / bs.x * (TWOPI * p[0] / bs.x).sin(),
        ];
        for i in 0..3 {
            assert!(close(d[i], e[i], TOL), "{} != {} at {:?}", d[i], e[i], p);
        }
    }
}

#[test]
fn test_nyquist_mode_is_ignored_on_even_axes() {
    let gs = GridSize { x: 4, y: 6, z: 4 };
    let bs = BoxSize {
        x: 1.,
        y: 1.5,
        z: 2.,
    };
    let gw = GridWidth::new(gs, bs);
    let base = |p: [f64; 3]| {
        vec![
            (TWOPI * p[0]).sin(),
            (TWOPI * p[1] / bs.y).cos(),
            (TWOPI * p[2] / bs.z).sin(),
        ]
    };

    // alternating signs are exactly the Nyquist modes
    let nyquist = |x: f64, h: f64| (::std::f64::consts::PI * x / h).cos();

    let plain = sample(gs, bs, FieldKind::Vector, base);
    let perturbed = sample(gs, bs, FieldKind::Vector, |p| {
        let mut v = base(p);
        v[0] += 0.7 * nyquist(p[0], gw.x);
        v[1] -= 1.3 * nyquist(p[1], gw.y);
        v[2] += 2.0 * nyquist(p[2], gw.z);
        v
    });

    let mut solver = SpectralSolver::new(gs, bs).unwrap();
    let a = solver.divergence(&plain).unwrap();
    let b = solver.divergence(&perturbed).unwrap();

    for (a, b) in a.data.iter().zip(b.data.iter()) {
        assert!(close(*a, *b, TOL), "{} != {}", a, b);
    }
}

#[test]
fn test_degenerate_axis() {
    // a single layer in z with the spacing of the other axes
    let gs = GridSize { x: 4, y: 4, z: 1 };
    let bs = BoxSize {
        x: 1.,
        y: 1.,
        z: 0.25,
    };

    let f = sample(gs, bs, FieldKind::Vector, |p| {
        vec![(TWOPI * p[0]).sin(), 0., 5.]
    });

    let div = rows_of(&divergence(&f).unwrap());

    assert_eq!(div.dim(), (16, 1));
    for (d, p) in div.column(0).iter().zip(points(gs, bs)) {
        assert!(d.is_finite());
        assert!(close(*d, TWOPI * (TWOPI * p[0]).cos(), TOL));
    }
}

#[test]
fn test_deterministic() {
    let gs = GridSize { x: 6, y: 5, z: 4 };
    let bs = unit_box();
    let f = sample(gs, bs, FieldKind::Tensor, |p| {
        (0..9)
            .map(|i| ((i + 1) as f64 * p[i % 3] + 0.1 * i as f64).sin())
            .collect()
    });

    let a = divergence(&f).unwrap();
    let b = divergence(&f).unwrap();

    assert_eq!(a.data, b.data);
}

#[test]
fn test_solver_rejects_other_grid() {
    let mut solver = SpectralSolver::new(GridSize { x: 4, y: 4, z: 4 }, unit_box()).unwrap();
    let f = sample(
        GridSize { x: 4, y: 4, z: 2 },
        unit_box(),
        FieldKind::Vector,
        |_| vec![0.; 3],
    );

    match solver.divergence(&f) {
        Err(Error(ErrorKind::ShapeMismatch(_), _)) => (),
        other => panic!("expected shape mismatch, got {:?}", other.map(|r| r.data)),
    }
}

#[test]
fn test_solver_rejects_degenerate_box() {
    let gs = GridSize { x: 2, y: 2, z: 2 };

    for bs in &[
        BoxSize {
            x: 0.,
            y: 1.,
            z: 1.,
        },
        BoxSize {
            x: 1.,
            y: -1.,
            z: 1.,
        },
        BoxSize {
            x: 1.,
            y: 1.,
            z: ::std::f64::NAN,
        },
    ] {
        match SpectralSolver::new(gs, *bs) {
            Err(Error(ErrorKind::DegenerateGrid(_), _)) => (),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("accepted domain size {:?}", bs),
        }
    }
}

/// Two fixed, non-trivial tensor fields on an odd/even mixed grid.
fn linearity_fields() -> (StructuredField, StructuredField) {
    let gs = GridSize { x: 5, y: 4, z: 3 };
    let bs = BoxSize {
        x: 1.,
        y: 2.,
        z: 1.5,
    };

    let f1 = sample(gs, bs, FieldKind::Tensor, |p| {
        (0..9)
            .map(|i| (TWOPI * p[i % 3] * (1 + i / 3) as f64).sin() + p[0] * p[1])
            .collect()
    });
    let f2 = sample(gs, bs, FieldKind::Tensor, |p| {
        (0..9)
            .map(|i| (TWOPI * p[(i + 1) % 3]).cos() * i as f64 - p[2])
            .collect()
    });

    (f1, f2)
}

quickcheck! {
    fn divergence_is_linear(a: f64, b: f64) -> TestResult {
        if !(a.is_finite() && b.is_finite()) || a.abs() > 1e3 || b.abs() > 1e3 {
            return TestResult::discard();
        }

        let (f1, f2) = linearity_fields();
        let combined = &(f1.data() * a) + &(f2.data() * b);
        let combined = StructuredField::from_array(combined, f1.size()).unwrap();

        let mut solver = SpectralSolver::new(f1.grid(), f1.size()).unwrap();
        let d1 = solver.divergence(&f1).unwrap().data;
        let d2 = solver.divergence(&f2).unwrap().data;
        let dc = solver.divergence(&combined).unwrap().data;

        let tol = 1e-9 * (1. + a.abs() + b.abs());
        let ok = dc
            .iter()
            .zip(d1.iter().zip(d2.iter()))
            .all(|(c, (x, y))| close(*c, a * x + b * y, tol));

        TestResult::from_bool(ok)
    }
}
