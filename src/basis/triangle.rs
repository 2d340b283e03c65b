use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SunpathError};

/// Reference outward directions of the edges `y = 0`, `x + y = 1`, `x = 0`
const REFERENCE_NORMALS: [[f64; 2]; 3] = [[0.0, -1.0], [1.0, 1.0], [-1.0, 0.0]];

/// Six-node (P2) triangle mapped from the reference triangle
///
/// Nodes are ordered counterclockwise starting at the origin corner:
/// `(0,0)`, `(½,0)`, `(1,0)`, `(½,½)`, `(0,1)`, `(0,½)` in reference
/// coordinates. Moving a mid-edge node bends the corresponding edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticTriangle {
    pub nodes: [[f64; 2]; 6],
}

impl Default for QuadraticTriangle {
    fn default() -> Self {
        Self::reference()
    }
}

impl QuadraticTriangle {
    pub fn new(nodes: [[f64; 2]; 6]) -> Self {
        Self { nodes }
    }

    /// The identity element
    pub fn reference() -> Self {
        Self {
            nodes: [
                [0.0, 0.0],
                [0.5, 0.0],
                [1.0, 0.0],
                [0.5, 0.5],
                [0.0, 1.0],
                [0.0, 0.5],
            ],
        }
    }

    /// Shape functions `ψ_k(ξ, η)`
    pub fn shape_functions(xi: f64, eta: f64) -> [f64; 6] {
        let l = 1.0 - xi - eta;
        [
            l * (1.0 - 2.0 * xi - 2.0 * eta),
            4.0 * xi * l,
            xi * (2.0 * xi - 1.0),
            4.0 * xi * eta,
            eta * (2.0 * eta - 1.0),
            4.0 * eta * l,
        ]
    }

    /// Gradients `(∂ψ_k/∂ξ, ∂ψ_k/∂η)`
    pub fn shape_gradients(xi: f64, eta: f64) -> [[f64; 2]; 6] {
        let c = -3.0 + 4.0 * xi + 4.0 * eta;
        [
            [c, c],
            [4.0 - 8.0 * xi - 4.0 * eta, -4.0 * xi],
            [4.0 * xi - 1.0, 0.0],
            [4.0 * eta, 4.0 * xi],
            [0.0, 4.0 * eta - 1.0],
            [-4.0 * eta, 4.0 - 4.0 * xi - 8.0 * eta],
        ]
    }

    /// Physical point of reference coordinates `(ξ, η)`
    pub fn map(&self, xi: f64, eta: f64) -> Vector2<f64> {
        Self::shape_functions(xi, eta)
            .iter()
            .zip(&self.nodes)
            .fold(Vector2::zeros(), |acc, (psi, x)| {
                acc + Vector2::new(x[0], x[1]) * *psi
            })
    }

    /// `∂x/∂ξ`, columns along `ξ` and `η`
    pub fn jacobian_matrix(&self, xi: f64, eta: f64) -> Matrix2<f64> {
        Self::shape_gradients(xi, eta)
            .iter()
            .zip(&self.nodes)
            .fold(Matrix2::zeros(), |acc, (g, x)| {
                acc + Vector2::new(x[0], x[1]) * Vector2::new(g[0], g[1]).transpose()
            })
    }

    /// Jacobian determinant of the map
    pub fn jacobian(&self, xi: f64, eta: f64) -> f64 {
        self.jacobian_matrix(xi, eta).determinant()
    }

    /// Edge normals transported by the cofactor matrix
    ///
    /// Their lengths are the local stretch of each edge.
    pub fn edge_normals(&self, xi: f64, eta: f64) -> [Vector2<f64>; 3] {
        let j = self.jacobian_matrix(xi, eta);
        let cof = Matrix2::new(j[(1, 1)], -j[(1, 0)], -j[(0, 1)], j[(0, 0)]);
        REFERENCE_NORMALS.map(|n| cof * Vector2::new(n[0], n[1]))
    }

    /// Reference point at parameter `s ∈ [0, 1]` along `edge`
    pub fn edge_point(edge: usize, s: f64) -> Result<(f64, f64)> {
        match edge {
            0 => Ok((s, 0.0)),
            1 => Ok((1.0 - s, s)),
            2 => Ok((0.0, 1.0 - s)),
            _ => Err(SunpathError::invalid("edge", edge as f64, "must be 0, 1 or 2")),
        }
    }

    /// Length of a physical edge by the trapezoidal rule over `n_points`
    /// samples of the edge parameter
    pub fn edge_length(&self, edge: usize, n_points: usize) -> Result<f64> {
        if n_points < 2 {
            return Err(SunpathError::invalid(
                "n_points",
                n_points as f64,
                "the trapezoidal rule needs two points",
            ));
        }
        let h = 1.0 / (n_points - 1) as f64;
        let mut integral = 0.0;
        for k in 0..n_points {
            let (xi, eta) = Self::edge_point(edge, k as f64 * h)?;
            let weight = if k == 0 || k == n_points - 1 { 0.5 } else { 1.0 };
            integral += weight * h * self.edge_normals(xi, eta)[edge].norm();
        }
        Ok(integral)
    }

    /// Whether the map stays orientation preserving at every sample of a
    /// uniform grid with `n` subdivisions
    pub fn is_valid(&self, n: usize) -> bool {
        let n = n.max(1);
        (0..=n).all(|i| {
            (0..=n - i).all(|j| {
                let (xi, eta) = (i as f64 / n as f64, j as f64 / n as f64);
                self.jacobian(xi, eta) > 0.0
            })
        })
    }
}
