//! The analemma: direction of the Sun at a fixed clock time over one year
//!
//! A planet is described by its obliquity `ε` (axial tilt), the
//! eccentricity `e` of its orbit and the angle `γ` from the winter solstice
//! to the perihelion. For each mean anomaly of the year the planet-to-Sun
//! unit vector is expressed in the frame of an equatorial observer at
//! clock noon:
//!
//! | component | direction |
//! |-----------|-----------|
//! | `x1` | zenith |
//! | `x2` | west → east (negated on the sky) |
//! | `x3` | north |
//!
//! Two models are available:
//!
//! - [`solve_analemma`]: exact, through the Kepler solver
//! - [`approx_analemma`]: closed form, first order in `e`
//!
//! Samples where the Sun is below the horizon are masked with NaN by
//! [`SunDirections::project`] so a drawn curve breaks there.

mod grid;

pub use grid::{AnalemmaGrid, GridCell};

use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{Result, SunpathError};
use crate::kepler::{self, check_eccentricity, NewtonOptions};
use crate::sampling::gradient;

/// Orbital and rotational parameters of a planet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitParams {
    /// Obliquity in radians, in `[0, π/2]`
    pub tilt: f64,
    /// Orbital eccentricity, in `[0, 1)`
    pub eccentricity: f64,
    /// Winter solstice to perihelion angle in radians, in `[0, 2π]`
    pub perihelion: f64,
    /// Fraction of a year from the start of the calendar to the perihelion
    #[serde(default)]
    pub year_offset: f64,
}

impl OrbitParams {
    pub fn new(tilt: f64, eccentricity: f64, perihelion: f64) -> Self {
        Self {
            tilt,
            eccentricity,
            perihelion,
            year_offset: 0.0,
        }
    }

    /// Earth: ε = 23.44°, e = 0.0167, γ = 12.93°
    pub fn earth() -> Self {
        Self::new(23.44_f64.to_radians(), 0.0167, 12.93_f64.to_radians())
    }

    /// Set the calendar offset, as a fraction of a year in `[0, 1)`
    pub fn with_year_offset(mut self, year_offset: f64) -> Self {
        self.year_offset = year_offset;
        self
    }

    /// Check every parameter against its admissible range
    pub fn validate(&self) -> Result<()> {
        check_eccentricity(self.eccentricity)?;
        if !(0.0..=FRAC_PI_2).contains(&self.tilt) {
            return Err(SunpathError::invalid(
                "tilt",
                self.tilt,
                "must lie in [0, π/2]",
            ));
        }
        if !(0.0..=TAU).contains(&self.perihelion) {
            return Err(SunpathError::invalid(
                "perihelion",
                self.perihelion,
                "must lie in [0, 2π]",
            ));
        }
        if !(0.0..1.0).contains(&self.year_offset) {
            return Err(SunpathError::invalid(
                "year_offset",
                self.year_offset,
                "must lie in [0, 1)",
            ));
        }
        Ok(())
    }

    /// Calendar mean anomaly from the astronomical one
    fn civil(&self, mean: &Array1<f64>) -> Array1<f64> {
        let shift = self.year_offset * TAU;
        mean.mapv(|m| m - shift)
    }
}

/// Planet-to-Sun vectors in the observer frame, one entry per sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunDirections {
    /// Zenith component
    pub x1: Array1<f64>,
    pub x2: Array1<f64>,
    pub x3: Array1<f64>,
}

impl SunDirections {
    pub fn len(&self) -> usize {
        self.x1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x1.is_empty()
    }

    /// Normalize every vector and mask those below the horizon
    ///
    /// After this call each sample is either a unit vector with a positive
    /// zenith component or `(NaN, NaN, NaN)`.
    pub fn project(&mut self) {
        Zip::from(&mut self.x1)
            .and(&mut self.x2)
            .and(&mut self.x3)
            .for_each(|x1, x2, x3| {
                let norm = (*x1 * *x1 + *x2 * *x2 + *x3 * *x3).sqrt();
                *x1 /= norm;
                *x2 /= norm;
                *x3 /= norm;
                if x1.is_nan() || *x1 <= 0.0 {
                    *x1 = f64::NAN;
                    *x2 = f64::NAN;
                    *x3 = f64::NAN;
                }
            });
    }

    /// Consuming variant of [`SunDirections::project`]
    pub fn projected(mut self) -> Self {
        self.project();
        self
    }

    /// Planar sky coordinates `(east-west, north-south)` = `(-x2, x3)`
    ///
    /// Samples at or below the horizon are NaN.
    pub fn sky(&self) -> (Array1<f64>, Array1<f64>) {
        let mask = |z: f64, v: f64| if z > 0.0 { v } else { f64::NAN };
        let x = Zip::from(&self.x1)
            .and(&self.x2)
            .map_collect(|&z, &v| mask(z, -v));
        let y = Zip::from(&self.x1)
            .and(&self.x3)
            .map_collect(|&z, &v| mask(z, v));
        (x, y)
    }

    /// Number of samples above the horizon
    pub fn visible_count(&self) -> usize {
        self.x1.iter().filter(|&&z| z > 0.0).count()
    }
}

/// Exact analemma for the mean anomalies `mean`
///
/// The Kepler solver gives the true anomaly `ν` and radius `r`; the orbit
/// position is rotated by the perihelion angle `γ`, the observer's noon
/// meridian turns with `θ = -(M + γ)`, and the tilt `ε` couples both:
///
/// ```text
/// x1 = r·(-cos ε·cos(ν+γ)·cos θ - sin(ν+γ)·sin θ)
/// x2 = r·( cos ε·cos(ν+γ)·sin θ - sin(ν+γ)·cos θ)
/// x3 = r·(-sin ε·cos(ν+γ))
/// ```
///
/// The vectors are not normalized; call [`SunDirections::project`].
pub fn solve_analemma(
    params: &OrbitParams,
    mean: &Array1<f64>,
    options: &NewtonOptions,
) -> Result<SunDirections> {
    params.validate()?;
    let m = params.civil(mean);
    let (_, nu) = kepler::solve_kepler(params.eccentricity, &m, options)?;

    let (sin_g, cos_g) = params.perihelion.sin_cos();
    let (sin_ep, cos_ep) = params.tilt.sin_cos();
    let g = params.perihelion;

    let n = m.len();
    let mut x1 = Array1::zeros(n);
    let mut x2 = Array1::zeros(n);
    let mut x3 = Array1::zeros(n);

    for k in 0..n {
        let cos_nu_g = nu.cos[k] * cos_g - nu.sin[k] * sin_g;
        let sin_nu_g = nu.sin[k] * cos_g + nu.cos[k] * sin_g;
        let cos_th = -(m[k] + g).cos();
        let sin_th = -(m[k] + g).sin();
        let r = nu.radius[k];

        x1[k] = r * (-cos_ep * cos_nu_g * cos_th - sin_nu_g * sin_th);
        x2[k] = r * (cos_ep * cos_nu_g * sin_th - sin_nu_g * cos_th);
        x3[k] = r * (-sin_ep * cos_nu_g);
    }

    Ok(SunDirections { x1, x2, x3 })
}

/// Analemma expanded to first order in eccentricity
///
/// With `μ = M + γ` the circular-orbit figure is
///
/// ```text
/// x1 = (1 + cos ε)/2 - (1 - cos ε)/2·cos 2μ
/// x2 = (1 - cos ε)/2·sin 2μ
/// x3 = -sin ε·cos μ
/// ```
///
/// to which the `O(e)` corrections are added. The error with respect to
/// [`solve_analemma`] is of order `e²`.
pub fn approx_analemma(params: &OrbitParams, mean: &Array1<f64>) -> Result<SunDirections> {
    params.validate()?;
    let e = params.eccentricity;
    let g = params.perihelion;
    let (se, ce) = params.tilt.sin_cos();
    let mu = params.civil(mean).mapv(|m| m + g);

    let x1 = mu.mapv(|mu| {
        (1.0 + ce) / 2.0 - (1.0 - ce) / 2.0 * (2.0 * mu).cos()
            - e * (1.0 + ce) * (mu - g).cos() / 2.0
            + e * (1.0 - ce) * (3.0 * (mu + g).cos() - (3.0 * mu - g).cos()) / 4.0
    });
    let x2 = mu.mapv(|mu| {
        (1.0 - ce) / 2.0 * (2.0 * mu).sin() + e * (1.0 + ce) * (mu - g).sin()
            - e * (1.0 - ce) * (3.0 * (mu + g).sin() - (3.0 * mu - g).sin()) / 4.0
    });
    let x3 = mu.mapv(|mu| {
        -se * mu.cos() + e * se * (3.0 * g.cos() - (2.0 * mu - g).cos()) / 2.0
    });

    Ok(SunDirections { x1, x2, x3 })
}

/// Speed of the projected point along the sky, per unit of mean anomaly
///
/// `spacing` is the step between consecutive mean anomalies. Useful to
/// scale a line width inversely to how fast the Sun moves.
pub fn angular_speed(directions: &SunDirections, spacing: f64) -> Array1<f64> {
    let dx2 = gradient(&directions.x2, spacing);
    let dx3 = gradient(&directions.x3, spacing);
    Zip::from(&dx2)
        .and(&dx3)
        .map_collect(|&a, &b| (a * a + b * b).sqrt())
}

/// Mean anomalies where the circular-orbit analemma meets the horizon
///
/// Below a tilt of π/2 the Sun stays above the horizon at noon all year
/// and the result is empty. Otherwise four symmetric crossings exist.
pub fn horizon_cutoffs(tilt: f64) -> Vec<f64> {
    if tilt.abs() < FRAC_PI_2 {
        return Vec::new();
    }
    let arg = (1.0 + tilt.cos()) / (1.0 - tilt.cos());
    let t1 = arg.min(1.0).acos() / 2.0;
    vec![t1, PI - t1, PI + t1, TAU - t1]
}

/// Sky coordinates of [`horizon_cutoffs`]
pub fn cutoff_points(tilt: f64) -> Vec<(f64, f64)> {
    horizon_cutoffs(tilt)
        .into_iter()
        .map(|t| {
            (
                -0.5 * (1.0 - tilt.cos()) * (2.0 * t).sin(),
                -tilt.sin() * t.cos(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::mean_anomalies;
    use approx::assert_relative_eq;

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(OrbitParams::earth().validate().is_ok());
        assert!(OrbitParams::new(2.0, 0.0, 0.0).validate().is_err());
        assert!(OrbitParams::new(0.4, 1.2, 0.0).validate().is_err());
        assert!(OrbitParams::new(0.4, 0.1, 7.0).validate().is_err());
        assert!(OrbitParams::earth()
            .with_year_offset(1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn circular_models_coincide() {
        let params = OrbitParams::new(0.6, 0.0, 0.7);
        let m = mean_anomalies(181);
        let exact = solve_analemma(&params, &m, &NewtonOptions::default()).unwrap();
        let approx = approx_analemma(&params, &m).unwrap();
        for k in 0..m.len() {
            assert_relative_eq!(exact.x1[k], approx.x1[k], epsilon = 1e-12);
            assert_relative_eq!(exact.x2[k], approx.x2[k], epsilon = 1e-12);
            assert_relative_eq!(exact.x3[k], approx.x3[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn projection_masks_below_horizon() {
        let mut d = SunDirections {
            x1: Array1::from(vec![2.0, -1.0, 0.0]),
            x2: Array1::from(vec![0.0, 1.0, 1.0]),
            x3: Array1::from(vec![0.0, 0.0, 0.0]),
        };
        d.project();
        assert_relative_eq!(d.x1[0], 1.0);
        assert!(d.x1[1].is_nan() && d.x2[1].is_nan() && d.x3[1].is_nan());
        assert!(d.x1[2].is_nan());
        assert_eq!(d.visible_count(), 1);
    }

    #[test]
    fn cutoffs_only_past_right_angle() {
        assert!(horizon_cutoffs(1.0).is_empty());
        let ts = horizon_cutoffs(FRAC_PI_2);
        assert_eq!(ts.len(), 4);
        assert_relative_eq!(ts[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(ts[3], TAU, epsilon = 1e-12);
        assert_eq!(cutoff_points(FRAC_PI_2).len(), 4);
    }

    #[test]
    fn year_offset_shifts_samples() {
        let m = mean_anomalies(49);
        let base = OrbitParams::new(0.4, 0.1, 0.3);
        let shifted = base.with_year_offset(0.25);
        let a = approx_analemma(&shifted, &m).unwrap();
        let b = approx_analemma(&base, &m.mapv(|v| v - TAU * 0.25)).unwrap();
        for k in 0..m.len() {
            assert_relative_eq!(a.x2[k], b.x2[k], epsilon = 1e-12);
        }
    }
}
