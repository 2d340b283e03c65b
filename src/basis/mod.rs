//! Interpolation bases: Lagrange polynomials, B-splines and the quadratic
//! triangle element
//!
//! ```rust
//! use sunpath::basis::{open_knots, bspline_basis};
//! use ndarray::Array1;
//!
//! let knots = open_knots(5, 2).unwrap();
//! let t = Array1::linspace(0.0, 0.99, 50);
//! let b = bspline_basis(&t, &knots, 5, 2).unwrap();
//! for col in b.columns() {
//!     assert!((col.sum() - 1.0).abs() < 1e-12);
//! }
//! ```

mod triangle;

pub use triangle::QuadraticTriangle;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SunpathError};

/// Lagrange polynomial `φ_i(t)` on `nodes`
///
/// `φ_i(nodes[j]) = δ_ij`.
pub fn lagrange(t: f64, nodes: &[f64], i: usize) -> f64 {
    nodes
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .fold(1.0, |phi, (_, &tj)| phi * (t - tj) / (nodes[i] - tj))
}

/// Every Lagrange polynomial of `nodes` sampled at `t`, one row per node
pub fn lagrange_basis(t: &Array1<f64>, nodes: &[f64]) -> Result<Array2<f64>> {
    if nodes.is_empty() {
        return Err(SunpathError::EmptyInput("interpolation nodes"));
    }
    for (j, a) in nodes.iter().enumerate() {
        if nodes[..j].contains(a) {
            return Err(SunpathError::invalid(
                "node",
                *a,
                "interpolation nodes must be distinct",
            ));
        }
    }

    Ok(Array2::from_shape_fn((nodes.len(), t.len()), |(i, k)| {
        lagrange(t[k], nodes, i)
    }))
}

fn cox_de_boor(t: f64, knots: &[f64], i: usize, p: usize) -> f64 {
    if p == 0 {
        return if knots[i] <= t && t < knots[i + 1] {
            1.0
        } else {
            0.0
        };
    }
    let mut b = 0.0;
    let left = knots[i + p] - knots[i];
    if left != 0.0 {
        b += (t - knots[i]) / left * cox_de_boor(t, knots, i, p - 1);
    }
    let right = knots[i + p + 1] - knots[i + 1];
    if right != 0.0 {
        b += (knots[i + p + 1] - t) / right * cox_de_boor(t, knots, i + 1, p - 1);
    }
    b
}

fn check_span(knots: &[f64], i: usize, p: usize) -> Result<()> {
    if i + p + 1 >= knots.len() {
        return Err(SunpathError::LengthMismatch {
            what: "knot vector",
            expected: i + p + 2,
            found: knots.len(),
        });
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(SunpathError::invalid(
            "knots",
            f64::NAN,
            "knot vector must be non-decreasing",
        ));
    }
    Ok(())
}

/// B-spline `B_{i,p}(t)` by the Cox–de Boor recursion
///
/// Degree zero splines are indicators of the half-open span
/// `[knots[i], knots[i+1])`; terms over zero-width spans are dropped.
pub fn bspline(t: f64, knots: &[f64], i: usize, p: usize) -> Result<f64> {
    check_span(knots, i, p)?;
    Ok(cox_de_boor(t, knots, i, p))
}

/// The first `n` B-splines of degree `p` sampled at `t`, one row per spline
pub fn bspline_basis(t: &Array1<f64>, knots: &[f64], n: usize, p: usize) -> Result<Array2<f64>> {
    if n == 0 {
        return Err(SunpathError::EmptyInput("control points"));
    }
    check_span(knots, n - 1, p)?;
    Ok(Array2::from_shape_fn((n, t.len()), |(i, k)| {
        cox_de_boor(t[k], knots, i, p)
    }))
}

/// Clamped knot vector for `n` control points: `p` zeros, a uniform
/// partition of `[0, 1]` and `p` ones
pub fn open_knots(n: usize, p: usize) -> Result<Vec<f64>> {
    if n <= p {
        return Err(SunpathError::invalid(
            "control points",
            n as f64,
            "an open curve needs more control points than its degree",
        ));
    }
    let inner = n - p;
    let mut knots = vec![0.0; p];
    knots.extend((0..=inner).map(|k| k as f64 / inner as f64));
    knots.extend(std::iter::repeat(1.0).take(p));
    Ok(knots)
}

/// Uniform knot vector `k/(n+p)`, `k = 0..=n+p`, for `n` control points
pub fn closed_knots(n: usize, p: usize) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(SunpathError::EmptyInput("control points"));
    }
    let m = n + p;
    Ok((0..=m).map(|k| k as f64 / m as f64).collect())
}

/// Whether a spline curve is clamped at its ends or periodic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    Open,
    Closed,
}

/// Evaluate the spline curve of degree `p` with the given control polygon
///
/// The parameter runs over `[knots[p], knots[n])` in `n_eval` uniform
/// samples. Closed curves repeat the first `p` control points.
pub fn spline_curve(
    control: &[[f64; 2]],
    p: usize,
    kind: CurveKind,
    n_eval: usize,
) -> Result<Vec<[f64; 2]>> {
    if control.is_empty() {
        return Err(SunpathError::EmptyInput("control points"));
    }

    let (points, knots) = match kind {
        CurveKind::Open => (control.to_vec(), open_knots(control.len(), p)?),
        CurveKind::Closed => {
            if control.len() < p {
                return Err(SunpathError::invalid(
                    "control points",
                    control.len() as f64,
                    "a closed curve needs at least as many control points as its degree",
                ));
            }
            let mut wrapped = control.to_vec();
            wrapped.extend_from_slice(&control[..p]);
            let knots = closed_knots(wrapped.len(), p)?;
            (wrapped, knots)
        }
    };

    let n = points.len();
    let (start, end) = (knots[p], knots[n]);
    let t = crate::sampling::half_open(start, end, n_eval);
    let basis = bspline_basis(&t, &knots, n, p)?;

    Ok(basis
        .columns()
        .into_iter()
        .map(|b| {
            points.iter().zip(b.iter()).fold([0.0, 0.0], |acc, (pt, w)| {
                [acc[0] + w * pt[0], acc[1] + w * pt[1]]
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lagrange_is_cardinal() {
        let nodes = [0.0, 0.7, 1.5, 3.0];
        for i in 0..nodes.len() {
            for (j, &tj) in nodes.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(lagrange(tj, &nodes, i), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn lagrange_basis_sums_to_one() {
        let nodes = [0.0, 1.0, 2.0, 3.0];
        let t = Array1::linspace(-0.5, 3.5, 41);
        let b = lagrange_basis(&t, &nodes).unwrap();
        for col in b.columns() {
            assert_relative_eq!(col.sum(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn duplicate_nodes_are_rejected() {
        let t = Array1::linspace(0.0, 1.0, 3);
        assert!(lagrange_basis(&t, &[0.0, 0.5, 0.5]).is_err());
    }

    #[test]
    fn degree_zero_is_half_open() {
        let knots = [0.0, 0.5, 1.0];
        assert_eq!(bspline(0.0, &knots, 0, 0).unwrap(), 1.0);
        assert_eq!(bspline(0.5, &knots, 0, 0).unwrap(), 0.0);
        assert_eq!(bspline(0.5, &knots, 1, 0).unwrap(), 1.0);
        assert_eq!(bspline(1.0, &knots, 1, 0).unwrap(), 0.0);
    }

    #[test]
    fn knot_vectors() {
        assert_eq!(
            open_knots(5, 2).unwrap(),
            vec![0.0, 0.0, 0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 1.0, 1.0]
        );
        assert_eq!(closed_knots(3, 1).unwrap(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(open_knots(3, 3).is_err());
    }

    #[test]
    fn bspline_partition_of_unity() {
        for p in 1..=3 {
            let n = 7;
            let knots = open_knots(n, p).unwrap();
            let t = crate::sampling::half_open(0.0, 1.0, 64);
            let b = bspline_basis(&t, &knots, n, p).unwrap();
            for col in b.columns() {
                assert_relative_eq!(col.sum(), 1.0, epsilon = 1e-12);
                assert!(col.iter().all(|v| *v >= 0.0));
            }
        }
    }

    #[test]
    fn short_knot_vector_is_rejected() {
        assert!(bspline(0.5, &[0.0, 1.0], 0, 1).is_err());
        assert!(bspline(0.5, &[1.0, 0.0, 2.0], 0, 1).is_err());
    }

    #[test]
    fn open_curve_interpolates_first_control_point() {
        let control = [[0.0, 0.0], [1.0, 2.0], [2.0, -1.0], [3.0, 0.5], [4.0, 0.0]];
        let curve = spline_curve(&control, 3, CurveKind::Open, 100).unwrap();
        assert_eq!(curve.len(), 100);
        assert_relative_eq!(curve[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(curve[0][1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn degree_one_open_curve_is_the_polygon() {
        let control = [[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]];
        let curve = spline_curve(&control, 1, CurveKind::Open, 4).unwrap();
        // t = 0, 0.25, 0.5, 0.75
        assert_relative_eq!(curve[1][0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(curve[1][1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(curve[2][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(curve[3][1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn closed_curve_is_periodic() {
        let control = [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];
        let curve = spline_curve(&control, 2, CurveKind::Closed, 400).unwrap();
        let first = curve[0];
        let last = curve[curve.len() - 1];
        assert!((first[0] - last[0]).hypot(first[1] - last[1]) < 0.05);
        // symmetric control polygon gives a curve centred at the origin
        let cx: f64 = curve.iter().map(|p| p[0]).sum::<f64>() / curve.len() as f64;
        assert!(cx.abs() < 1e-2);
    }
}
