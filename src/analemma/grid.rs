use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{approx_analemma, solve_analemma, OrbitParams, SunDirections};
use crate::error::{Result, SunpathError};
use crate::kepler::{eccentric_from_true, NewtonOptions};

/// One (eccentricity, perihelion shift) entry of an [`AnalemmaGrid`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    pub params: OrbitParams,
    /// Projected exact analemma
    pub exact: SunDirections,
    /// Projected first-order analemma
    pub approx: SunDirections,
    /// Solstice on the orbit ellipse, `(cos E, √(1-e²)·sin E)`
    pub solstice: (f64, f64),
}

/// Analemmas of a fixed tilt over an eccentricity × perihelion-shift grid
///
/// Cells are stored row by row: one row per shift, one column per
/// eccentricity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalemmaGrid {
    pub eccentricities: Vec<f64>,
    pub shifts: Vec<f64>,
    pub cells: Vec<GridCell>,
}

impl AnalemmaGrid {
    /// Compute every cell in parallel
    ///
    /// `shifts` are perihelion angles in radians.
    pub fn compute(
        tilt: f64,
        eccentricities: &[f64],
        shifts: &[f64],
        mean: &Array1<f64>,
        options: &NewtonOptions,
    ) -> Result<Self> {
        if eccentricities.is_empty() || shifts.is_empty() {
            return Err(SunpathError::EmptyInput("analemma grid axes"));
        }

        let pairs: Vec<(f64, f64)> = shifts
            .iter()
            .flat_map(|&g| eccentricities.iter().map(move |&e| (e, g)))
            .collect();

        let cells = pairs
            .par_iter()
            .map(|&(e, g)| -> Result<GridCell> {
                let params = OrbitParams::new(tilt, e, g);
                let exact = solve_analemma(&params, mean, options)?.projected();
                let approx = approx_analemma(&params, mean)?.projected();
                let (cos_e, sin_e) = eccentric_from_true(e, g)?;
                Ok(GridCell {
                    params,
                    exact,
                    approx,
                    solstice: (cos_e, -sin_e * (1.0 - e * e).sqrt()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "computed analemma grid of {} x {} cells",
            shifts.len(),
            eccentricities.len()
        );

        Ok(Self {
            eccentricities: eccentricities.to_vec(),
            shifts: shifts.to_vec(),
            cells,
        })
    }

    /// Cell at row `shift_idx`, column `ecc_idx`
    pub fn cell(&self, shift_idx: usize, ecc_idx: usize) -> Option<&GridCell> {
        if shift_idx >= self.shifts.len() || ecc_idx >= self.eccentricities.len() {
            return None;
        }
        self.cells
            .get(shift_idx * self.eccentricities.len() + ecc_idx)
    }

    /// Largest distance between the exact and approximate sky positions
    ///
    /// Samples masked in either model are skipped.
    pub fn max_deviation(cell: &GridCell) -> f64 {
        let (xa, ya) = cell.exact.sky();
        let (xb, yb) = cell.approx.sky();
        let mut worst: f64 = 0.0;
        for k in 0..xa.len() {
            let d = (xa[k] - xb[k]).hypot(ya[k] - yb[k]);
            if d.is_finite() {
                worst = worst.max(d);
            }
        }
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::mean_anomalies;
    use std::f64::consts::TAU;

    #[test]
    fn grid_layout_is_row_major_by_shift() {
        let m = mean_anomalies(97);
        let eccs = [0.01, 0.05, 0.15];
        let shifts = [0.0, 0.25 * TAU];
        let grid = AnalemmaGrid::compute(0.6, &eccs, &shifts, &m, &NewtonOptions::default())
            .unwrap();
        assert_eq!(grid.cells.len(), 6);
        let cell = grid.cell(1, 2).unwrap();
        assert_eq!(cell.params.eccentricity, 0.15);
        assert_eq!(cell.params.perihelion, 0.25 * TAU);
        assert!(grid.cell(2, 0).is_none());
    }

    #[test]
    fn deviation_grows_with_eccentricity() {
        let m = mean_anomalies(181);
        let grid =
            AnalemmaGrid::compute(0.6, &[0.01, 0.3], &[0.5], &m, &NewtonOptions::default())
                .unwrap();
        let small = AnalemmaGrid::max_deviation(&grid.cells[0]);
        let large = AnalemmaGrid::max_deviation(&grid.cells[1]);
        assert!(small < large);
        assert!(small < 1e-3);
    }

    #[test]
    fn empty_axes_are_rejected() {
        let m = mean_anomalies(10);
        assert!(AnalemmaGrid::compute(0.6, &[], &[0.0], &m, &NewtonOptions::default()).is_err());
    }
}
