//! Scalar initial value problems with closed-form solutions

use super::{Scheme, Trajectory};

/// Initial value problem `u' = f(u, t)`, `u(t0) = u0`
#[derive(Debug, Clone, Copy)]
pub struct Problem {
    pub name: &'static str,
    pub t0: f64,
    pub u0: f64,
    /// Step length used when a single step is illustrated
    pub dt: f64,
    rhs: fn(f64, f64) -> f64,
    /// Exact solution as a function of `(t0, u0, t)`
    exact: fn(f64, f64, f64) -> f64,
}

impl Problem {
    /// `u' = -u·t` from `u(-0.5) = 1`
    ///
    /// Solution `u0·exp(-(t² - t0²)/2)`.
    pub fn case_1() -> Self {
        Self {
            name: "u' = -ut",
            t0: -0.5,
            u0: 1.0,
            dt: 1.5,
            rhs: |u, t| -u * t,
            exact: |t0, u0, t| u0 * (-(t * t - t0 * t0) / 2.0).exp(),
        }
    }

    /// `u' = t²/(1 + u²)` from `u(-1.75) = -0.25`
    ///
    /// Separating variables gives the cubic `u³ + 3u = t³ + k`, solved with
    /// Cardano's formula.
    pub fn case_2() -> Self {
        Self {
            name: "u' = t^2/(1+u^2)",
            t0: -1.75,
            u0: -0.25,
            dt: 2.0,
            rhs: |u, t| t * t / (1.0 + u * u),
            exact: |t0, u0, t| {
                let k = 3.0 * u0 + u0.powi(3) - t0.powi(3);
                let s = t.powi(3) + k;
                let root = (s * s / 4.0 + 1.0).sqrt();
                (s / 2.0 + root).cbrt() + (s / 2.0 - root).cbrt()
            },
        }
    }

    pub fn all() -> [Problem; 2] {
        [Self::case_1(), Self::case_2()]
    }

    pub fn rhs(&self, u: f64, t: f64) -> f64 {
        (self.rhs)(u, t)
    }

    pub fn exact(&self, t: f64) -> f64 {
        (self.exact)(self.t0, self.u0, t)
    }

    /// Integrate up to `t0 + n_steps·dt` with `scheme`
    pub fn solve(&self, scheme: &Scheme, dt: f64, n_steps: usize) -> Trajectory {
        scheme.integrate(self.rhs, self.t0, self.u0, dt, n_steps)
    }

    /// Absolute error at the end of a run over `[t0, t_end]` with `n_steps` steps
    pub fn final_error(&self, scheme: &Scheme, t_end: f64, n_steps: usize) -> f64 {
        let dt = (t_end - self.t0) / n_steps as f64;
        let traj = self.solve(scheme, dt, n_steps);
        match traj.last() {
            Some((t, u)) => (u - self.exact(t)).abs(),
            None => f64::NAN,
        }
    }
}
