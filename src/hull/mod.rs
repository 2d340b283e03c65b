//! Convex hull of planar point sets by gift wrapping
//!
//! The walk starts at the point of largest `x` and turns clockwise: from
//! the current vertex it picks the candidate that leaves no remaining
//! point strictly on its left. Each visited vertex is removed from the
//! candidate set except the start, so the walk ends when it comes back.
//!
//! Collinear candidates are the only subtle part. [`HullMode::Vertices`]
//! jumps to the farthest of them and returns the corners only, while
//! [`HullMode::Boundary`] steps to the nearest and keeps every point lying
//! on the hull edges, which is what mesh boundaries need.
//!
//! ```rust
//! use sunpath::hull::{convex_hull, HullMode};
//!
//! let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]];
//! let hull = convex_hull(&square, HullMode::Vertices).unwrap();
//! assert_eq!(hull, vec![1, 0, 3, 2, 1]);
//! ```

pub mod grains;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SunpathError};

/// Threshold on the cross product below which points count as collinear
const COLLINEAR_EPS: f64 = 1e-6;

/// Twice the signed area of `(a, b, c)`; positive when `c` is left of `a → b`
pub fn is_left(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Which points of the hull boundary to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HullMode {
    /// Corners only
    #[default]
    Vertices,
    /// Every input point lying on the boundary
    Boundary,
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Indices of the hull of `points`, as a closed sequence (last == first)
pub fn convex_hull(points: &[[f64; 2]], mode: HullMode) -> Result<Vec<usize>> {
    if points.is_empty() {
        return Err(SunpathError::EmptyInput("hull points"));
    }
    let n = points.len();

    let start = (1..n).fold(0, |best, k| {
        if points[k][0] > points[best][0] {
            k
        } else {
            best
        }
    });
    if n == 1 {
        return Ok(vec![start, start]);
    }

    let mut remaining = vec![true; n];
    let mut hull = vec![start];
    let mut current = start;

    loop {
        let steps = hull.len() - 1;
        if steps > n {
            return Err(SunpathError::DegenerateHull { points: n, steps });
        }

        let first = (0..n)
            .find(|&k| remaining[k] && k != current)
            .ok_or(SunpathError::DegenerateHull { points: n, steps })?;
        let mut next = first;

        for k in 0..n {
            if !remaining[k] || k == first {
                continue;
            }
            if mode == HullMode::Boundary && k == current {
                continue;
            }
            let side = is_left(points[current], points[next], points[k]);
            if side.abs() < COLLINEAR_EPS {
                let dk = distance(points[current], points[k]);
                let dn = distance(points[current], points[next]);
                let better = match mode {
                    HullMode::Vertices => dk > dn,
                    HullMode::Boundary => dk < dn,
                };
                if better {
                    next = k;
                }
            } else if side > 0.0 {
                next = k;
            }
        }

        tracing::trace!("hull step {}: {} -> {}", steps, current, next);
        hull.push(next);
        remaining[next] = false;
        current = next;
        if next == start {
            break;
        }
    }

    Ok(hull)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<[f64; 2]> {
        vec![
            [0.0, 0.0],
            [0.5, 1.0],
            [0.5, 0.0],
            [0.0, 0.5],
            [1.0, 0.5],
            [0.5, 0.5],
            [0.0, 1.0],
            [1.0, 0.0],
            [1.0, 1.0],
        ]
    }

    #[test]
    fn is_left_sign() {
        assert!(is_left([0.0, 0.0], [1.0, 0.0], [0.5, 1.0]) > 0.0);
        assert!(is_left([0.0, 0.0], [1.0, 0.0], [0.5, -1.0]) < 0.0);
        assert_eq!(is_left([0.0, 0.0], [1.0, 0.0], [3.0, 0.0]), 0.0);
    }

    #[test]
    fn grid_corners() {
        let hull = convex_hull(&grid(), HullMode::Vertices).unwrap();
        assert_eq!(hull, vec![4, 7, 0, 6, 8, 4]);
    }

    #[test]
    fn grid_boundary_keeps_edge_points() {
        let hull = convex_hull(&grid(), HullMode::Boundary).unwrap();
        assert_eq!(hull, vec![4, 7, 2, 0, 3, 6, 1, 8, 4]);
        assert!(!hull.contains(&5));
    }

    #[test]
    fn start_is_first_max_x() {
        let pts = [[0.0, 0.0], [2.0, 1.0], [2.0, -1.0], [1.0, 3.0]];
        let hull = convex_hull(&pts, HullMode::Vertices).unwrap();
        assert_eq!(hull[0], 1);
        assert_eq!(hull.last(), Some(&1));
    }

    #[test]
    fn degenerate_inputs() {
        assert!(matches!(
            convex_hull(&[], HullMode::Vertices),
            Err(SunpathError::EmptyInput(_))
        ));
        assert_eq!(convex_hull(&[[1.0, 2.0]], HullMode::Boundary).unwrap(), vec![0, 0]);
        let pair = convex_hull(&[[0.0, 0.0], [1.0, 0.0]], HullMode::Vertices).unwrap();
        assert_eq!(pair, vec![1, 0, 1]);
    }
}
