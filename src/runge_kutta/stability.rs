//! Linear stability of explicit Runge–Kutta schemes
//!
//! Applied to `u' = λu`, one step multiplies the solution by the
//! amplification factor `G(z)`, `z = λ·Δt`. The scheme is stable where
//! `|G(z)| ≤ 1`. For an order `p` scheme with `p` stages `G` is the
//! exponential series truncated after `z^p / p!`.

use nalgebra::{Complex, DMatrix, Schur};
use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};

use super::Scheme;
use crate::error::{Result, SunpathError};

const SCAN_STEP: f64 = 1e-3;

/// Highest series degree whose companion matrix is still well conditioned
pub const MAX_ROOT_ORDER: usize = 16;
/// Iteration budget of the Schur decomposition
const SCHUR_MAX_ITERATIONS: usize = 10_000;

impl Scheme {
    /// Amplification factor `G(z)` of the scheme
    pub fn amplification(&self, z: Complex<f64>) -> Complex<f64> {
        let one = Complex::new(1.0, 0.0);
        let mut k = Complex::new(0.0, 0.0);
        let mut g = one;
        for (j, (&alpha, &gamma)) in self.alphas.iter().zip(&self.gammas).enumerate() {
            k = if j == 0 { z } else { z * (one + k * alpha) };
            g += k * gamma;
        }
        g
    }
}

/// Exponential series `Σ_{i≤order} z^i / i!`
pub fn taylor_amplification(order: usize, z: Complex<f64>) -> Complex<f64> {
    let mut term = Complex::new(1.0, 0.0);
    let mut sum = term;
    for i in 1..=order {
        term = term * z / i as f64;
        sum += term;
    }
    sum
}

/// Rectangle of the complex `λΔt` plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityOptions {
    pub re_min: f64,
    pub re_max: f64,
    pub im_min: f64,
    pub im_max: f64,
    /// Samples along each axis
    pub resolution: usize,
}

impl Default for StabilityOptions {
    fn default() -> Self {
        Self {
            re_min: -4.0,
            re_max: 2.0,
            im_min: -3.0,
            im_max: 3.0,
            resolution: 301,
        }
    }
}

impl StabilityOptions {
    pub fn with_real_range(mut self, min: f64, max: f64) -> Self {
        self.re_min = min;
        self.re_max = max;
        self
    }

    pub fn with_imag_range(mut self, min: f64, max: f64) -> Self {
        self.im_min = min;
        self.im_max = max;
        self
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

/// `|G|` sampled on a rectangle; rows follow the imaginary axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityGrid {
    pub re: Array1<f64>,
    pub im: Array1<f64>,
    pub magnitude: Array2<f64>,
}

impl StabilityGrid {
    /// Fraction of samples where `|G| ≤ 1`
    pub fn stable_fraction(&self) -> f64 {
        let stable = self.magnitude.iter().filter(|m| **m <= 1.0).count();
        stable as f64 / self.magnitude.len() as f64
    }
}

/// Sample `|g(z)|` over the rectangle described by `options`
pub fn stability_grid<G>(g: G, options: &StabilityOptions) -> Result<StabilityGrid>
where
    G: Fn(Complex<f64>) -> Complex<f64> + Sync,
{
    if options.resolution < 2 {
        return Err(SunpathError::invalid(
            "resolution",
            options.resolution as f64,
            "needs at least two samples per axis",
        ));
    }
    if options.re_min >= options.re_max || options.im_min >= options.im_max {
        return Err(SunpathError::invalid(
            "stability window",
            options.re_max - options.re_min,
            "bounds must be increasing",
        ));
    }

    let n = options.resolution;
    let re = Array1::linspace(options.re_min, options.re_max, n);
    let im = Array1::linspace(options.im_min, options.im_max, n);
    let mut magnitude = Array2::zeros((n, n));

    Zip::indexed(&mut magnitude).par_for_each(|(i, j), m| {
        *m = g(Complex::new(re[j], im[i])).norm();
    });

    Ok(StabilityGrid { re, im, magnitude })
}

/// Left end of the stability interval on the negative real axis
///
/// Scans `[-limit, 0]` and refines the first crossing of `|G| = 1` by
/// bisection. Returns `None` if the scheme is stable on the whole scan.
pub fn real_stability_boundary<G>(g: G, limit: f64) -> Option<f64>
where
    G: Fn(Complex<f64>) -> Complex<f64>,
{
    let unstable = |x: f64| g(Complex::new(x, 0.0)).norm() > 1.0;
    let steps = (limit / SCAN_STEP).ceil() as usize;

    let k = (1..=steps).find(|&k| unstable(-(k as f64) * SCAN_STEP))?;
    let (mut stable_x, mut unstable_x) = (-((k - 1) as f64) * SCAN_STEP, -(k as f64) * SCAN_STEP);

    for _ in 0..60 {
        let mid = 0.5 * (stable_x + unstable_x);
        if unstable(mid) {
            unstable_x = mid;
        } else {
            stable_x = mid;
        }
        if (stable_x - unstable_x).abs() < 1e-13 {
            break;
        }
    }
    Some(stable_x)
}

/// Roots of the truncated exponential series of degree `order`
///
/// The series is scaled by `order!` to a monic polynomial with
/// coefficients `order!/i!` and its roots are the eigenvalues of the
/// companion matrix. Roots are sorted by imaginary part.
///
/// The coefficients grow like `order!`, so degrees above
/// [`MAX_ROOT_ORDER`] are rejected.
pub fn amplification_roots(order: usize) -> Result<Vec<Complex<f64>>> {
    if order == 0 {
        return Err(SunpathError::invalid("order", 0.0, "must be at least 1"));
    }
    if order > MAX_ROOT_ORDER {
        return Err(SunpathError::invalid(
            "order",
            order as f64,
            "must be at most 16",
        ));
    }

    // a_i = order!/i!, built downward from a_order = 1
    let mut coeffs = vec![1.0; order + 1];
    for i in (0..order).rev() {
        coeffs[i] = coeffs[i + 1] * (i + 1) as f64;
    }
    if order == 1 {
        return Ok(vec![Complex::new(-coeffs[0], 0.0)]);
    }

    let mut companion = DMatrix::<f64>::zeros(order, order);
    for i in 1..order {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..order {
        companion[(i, order - 1)] = -coeffs[i];
    }

    let schur = Schur::try_new(companion, f64::EPSILON, SCHUR_MAX_ITERATIONS).ok_or(
        SunpathError::NoConvergence {
            what: "companion matrix eigenvalues",
            iterations: SCHUR_MAX_ITERATIONS,
        },
    )?;
    let mut roots: Vec<Complex<f64>> = schur.complex_eigenvalues().iter().copied().collect();
    roots.sort_by(|a, b| a.im.total_cmp(&b.im).then(a.re.total_cmp(&b.re)));
    tracing::debug!("order {} amplification roots: {:?}", order, roots);
    Ok(roots)
}
