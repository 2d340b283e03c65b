//! Kepler's equation: mean anomaly → eccentric anomaly → true anomaly
//!
//! For an elliptic orbit of eccentricity `e`, the mean anomaly `M` grows
//! uniformly with time while the eccentric anomaly `E` satisfies
//!
//! ```text
//! E - e·sin(E) = M
//! ```
//!
//! The equation has no closed-form inverse, so `E` is found with Newton's
//! method, vectorised over a whole array of mean anomalies: the iteration
//! stops once the largest update over all samples is below the tolerance.
//!
//! # Usage
//!
//! ```rust
//! use sunpath::kepler::{solve_eccentric_anomaly, true_anomaly, NewtonOptions};
//! use sunpath::sampling::mean_anomalies;
//!
//! let m = mean_anomalies(365);
//! let solution = solve_eccentric_anomaly(0.0167, &m, &NewtonOptions::default()).unwrap();
//! assert!(solution.converged);
//!
//! let nu = true_anomaly(0.0167, &solution.eccentric).unwrap();
//! assert_eq!(nu.cos.len(), 365);
//! ```

use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SunpathError};

/// Stopping rules of a vectorised Newton iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonOptions {
    /// Iteration budget (default: 15)
    pub max_iterations: usize,
    /// Stop once the largest absolute update is below this value (default: 1e-12)
    pub tolerance: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            tolerance: 1e-12,
        }
    }
}

impl NewtonOptions {
    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance on the update
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Result of [`solve_eccentric_anomaly`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeplerSolution {
    /// Eccentric anomaly for each input mean anomaly
    pub eccentric: Array1<f64>,
    /// Newton iterations performed
    pub iterations: usize,
    /// Largest absolute update of the last iteration
    pub max_update: f64,
    /// Whether `max_update` fell below the tolerance within the budget
    pub converged: bool,
}

/// Cosine, sine and orbital radius at each sample
///
/// The radius is in units of the semi-major axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueAnomaly {
    pub cos: Array1<f64>,
    pub sin: Array1<f64>,
    pub radius: Array1<f64>,
}

impl TrueAnomaly {
    /// True anomaly in radians, in (-π, π]
    pub fn angle(&self) -> Array1<f64> {
        Zip::from(&self.sin)
            .and(&self.cos)
            .map_collect(|&s, &c| s.atan2(c))
    }

    pub fn len(&self) -> usize {
        self.cos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cos.is_empty()
    }
}

pub(crate) fn check_eccentricity(e: f64) -> Result<()> {
    if !e.is_finite() || !(0.0..1.0).contains(&e) {
        return Err(SunpathError::invalid(
            "eccentricity",
            e,
            "must lie in [0, 1)",
        ));
    }
    Ok(())
}

/// Solve Kepler's equation for every mean anomaly in `mean`
///
/// Newton's method starts from `E₀ = M + e·sin(M)`. A circular orbit
/// (`e == 0`) returns `E = M` without iterating.
///
/// Running out of iterations is not an error: a warning is logged and the
/// last estimate is returned with `converged == false`.
///
/// # Errors
///
/// [`SunpathError::InvalidParameter`] if `e` is not in `[0, 1)`.
pub fn solve_eccentric_anomaly(
    e: f64,
    mean: &Array1<f64>,
    options: &NewtonOptions,
) -> Result<KeplerSolution> {
    check_eccentricity(e)?;

    if e == 0.0 {
        return Ok(KeplerSolution {
            eccentric: mean.clone(),
            iterations: 0,
            max_update: 0.0,
            converged: true,
        });
    }

    let mut eccentric = mean.mapv(|m| m + e * m.sin());
    let mut max_update = f64::INFINITY;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        max_update = 0.0;
        Zip::from(&mut eccentric).and(mean).for_each(|ea, &m| {
            let f = *ea - e * ea.sin() - m;
            let df = 1.0 - e * ea.cos();
            let delta = f / df;
            *ea -= delta;
            max_update = f64::max(max_update, delta.abs());
        });
        iterations += 1;
        if max_update < options.tolerance {
            break;
        }
    }

    let converged = max_update < options.tolerance;
    if !converged {
        tracing::warn!(
            "Kepler solver did not converge after {} iterations (e = {}, max update = {:.3e})",
            iterations,
            e,
            max_update
        );
    }

    Ok(KeplerSolution {
        eccentric,
        iterations,
        max_update,
        converged,
    })
}

/// Convert eccentric anomalies to true anomalies and orbital radii
///
/// ```text
/// r     = 1 - e·cos(E)
/// cos ν = (cos(E) - e) / r
/// sin ν = √(1 - e²)·sin(E) / r
/// ```
pub fn true_anomaly(e: f64, eccentric: &Array1<f64>) -> Result<TrueAnomaly> {
    check_eccentricity(e)?;
    let b = (1.0 - e * e).sqrt();

    let radius = eccentric.mapv(|ea| 1.0 - e * ea.cos());
    let cos = Zip::from(eccentric)
        .and(&radius)
        .map_collect(|&ea, &r| (ea.cos() - e) / r);
    let sin = Zip::from(eccentric)
        .and(&radius)
        .map_collect(|&ea, &r| b * ea.sin() / r);

    Ok(TrueAnomaly { cos, sin, radius })
}

/// Solve Kepler's equation and convert the result to true anomalies
pub fn solve_kepler(
    e: f64,
    mean: &Array1<f64>,
    options: &NewtonOptions,
) -> Result<(KeplerSolution, TrueAnomaly)> {
    let solution = solve_eccentric_anomaly(e, mean, options)?;
    let nu = true_anomaly(e, &solution.eccentric)?;
    Ok((solution, nu))
}

/// Eccentric anomaly `(cos E, sin E)` of the point at true anomaly `nu`
///
/// Used to place a given direction (e.g. the solstice) on the orbit
/// ellipse, whose points are `(cos E, √(1-e²)·sin E)` in units of the
/// semi-major axis.
pub fn eccentric_from_true(e: f64, nu: f64) -> Result<(f64, f64)> {
    check_eccentricity(e)?;
    let coef = 1.0 + e * nu.cos();
    let cos_e = (e + nu.cos()) / coef;
    let sin_e = (1.0 - e * e).sqrt() * nu.sin() / coef;
    Ok((cos_e, sin_e))
}
