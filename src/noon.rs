//! Equation of time caused by the obliquity alone
//!
//! On a circular orbit a tilted planet still sees solar noon drift away
//! from clock noon: the Sun moves along the ecliptic at a uniform rate,
//! but its projection on the equator does not. The shift is found by
//! solving, for each day `x`, the time `t` near `x·D + D/2` at which
//!
//! ```text
//! f(t) = sin(NΩt)·(1 - c·cos²(Ωt)) - ½c·cos(NΩt)·sin(2Ωt) = 0
//! ```
//!
//! with `c = 1 - cos ε`, `D` the day length, `N` the number of days per
//! year and `Ω = 2π / (N·D)` the orbital rate.

use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{Result, SunpathError};
use crate::kepler::NewtonOptions;

/// Length of a solar day in seconds
pub const DAY: f64 = 86_400.0;
/// Days per year
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Closed-form approximations of the noon shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoonApproximation {
    /// `D/2π · atan(c/2 · sin 2λ / (1 - c·cos² λ))`
    Arctan,
    /// `D/2π · c/2 · sin 2λ / (1 - c·cos² λ)`
    Ratio,
    /// `D/2π · c/2 · sin 2λ`
    Linear,
}

/// Newton options suited to times of order a year in seconds
///
/// Rounding of `t ≈ 3·10⁷ s` alone produces updates of a few nanoseconds,
/// so the tolerance is looser than for angles.
pub fn default_options() -> NewtonOptions {
    NewtonOptions::default()
        .with_max_iterations(10)
        .with_tolerance(1e-6)
}

fn check_tilt(tilt: f64) -> Result<()> {
    if !(0.0..=FRAC_PI_2).contains(&tilt) {
        return Err(SunpathError::invalid("tilt", tilt, "must lie in [0, π/2]"));
    }
    Ok(())
}

/// Newton step `-f/f'` at time `t`
fn newton_step(t: f64, c: f64) -> f64 {
    let n_om = TAU / DAY;
    let om = n_om / DAYS_PER_YEAR;

    let tmp1 = (n_om * t).sin();
    let tmp2 = 1.0 - c * (om * t).cos().powi(2);
    let tmp3 = 0.5 * c * (n_om * t).cos();
    let tmp4 = (2.0 * om * t).sin();

    let tmp5 = (n_om * t).cos() * n_om;
    let tmp6 = c * om * (2.0 * om * t).sin();
    let tmp7 = -0.5 * c * (n_om * t).sin() * n_om;
    let tmp8 = 2.0 * om * (2.0 * om * t).cos();

    let f = tmp1 * tmp2 - tmp3 * tmp4;
    let df = tmp5 * tmp2 + tmp1 * tmp6 - (tmp3 * tmp8 + tmp4 * tmp7);
    -f / df
}

/// Shift of solar noon with respect to clock noon, in seconds
///
/// `days` are day numbers counted from the winter solstice. A positive
/// shift means the Sun crosses the meridian after clock noon.
pub fn noon_shift(tilt: f64, days: &Array1<f64>, options: &NewtonOptions) -> Result<Array1<f64>> {
    check_tilt(tilt)?;
    let c = 1.0 - tilt.cos();

    let y_zero = days.mapv(|x| x * DAY + DAY / 2.0);
    let mut y = y_zero.clone();
    let mut max_update = f64::INFINITY;

    for it in 0..options.max_iterations {
        max_update = 0.0;
        y.mapv_inplace(|t| {
            let delta = newton_step(t, c);
            max_update = f64::max(max_update, delta.abs());
            t + delta
        });
        tracing::debug!("noon shift iteration {}: max update {:.5e}", it, max_update);
        if max_update < options.tolerance {
            break;
        }
    }

    if max_update >= options.tolerance {
        tracing::warn!(
            "noon shift did not converge (tilt = {}, max update = {:.3e} s)",
            tilt,
            max_update
        );
    }

    Ok(Zip::from(&y).and(&y_zero).map_collect(|&a, &b| a - b))
}

/// Closed-form estimate of [`noon_shift`]
pub fn approximate_noon_shift(
    tilt: f64,
    days: &Array1<f64>,
    method: NoonApproximation,
) -> Result<Array1<f64>> {
    check_tilt(tilt)?;
    let c = 1.0 - tilt.cos();
    let scale = DAY / TAU;

    Ok(days.mapv(|x| {
        let num = (4.0 * PI * (x + 0.5) / DAYS_PER_YEAR).sin();
        let den = 1.0 - c * (TAU * (x + 0.5) / DAYS_PER_YEAR).cos().powi(2);
        match method {
            NoonApproximation::Arctan => scale * (c / 2.0 * num / den).atan(),
            NoonApproximation::Ratio => scale * c / 2.0 * num / den,
            NoonApproximation::Linear => scale * c / 2.0 * num,
        }
    }))
}
