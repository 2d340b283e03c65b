//! Explicit Runge–Kutta schemes for scalar ODEs `du/dt = f(u, t)`
//!
//! A scheme is described by its nodes `α` and weights `γ`. Stage `k` is
//! evaluated at
//!
//! ```text
//! t_k = t + α_k·Δt
//! u_k = u + α_k·Δt·K_{k-1}
//! K_k = f(u_k, t_k)
//! ```
//!
//! and the step is `u + Δt·Σ γ_k·K_k`. Each stage only uses the previous
//! slope, which covers the classical schemes listed in [`Scheme::builtin`].
//!
//! [`Scheme::step`] returns every intermediate evaluation point so a step
//! can be inspected stage by stage; [`stability`] studies the linear test
//! equation `u' = λu`.

pub mod problems;
pub mod stability;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SunpathError};

/// Explicit Runge–Kutta scheme with a single-slope stage recurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub name: String,
    /// Stage nodes, `α_0 = 0`
    pub alphas: Vec<f64>,
    /// Stage weights, summing to one for a consistent scheme
    pub gammas: Vec<f64>,
}

/// One function evaluation inside a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub t: f64,
    pub u: f64,
    pub slope: f64,
}

/// A single step with its stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub stages: Vec<Stage>,
    pub next: f64,
}

impl Step {
    /// Weighted contributions `Δt·γ_k·K_k` whose sum is the increment
    pub fn increments(&self, scheme: &Scheme, dt: f64) -> Vec<f64> {
        self.stages
            .iter()
            .zip(&scheme.gammas)
            .map(|(stage, gamma)| dt * gamma * stage.slope)
            .collect()
    }
}

/// Discrete solution of an initial value problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Trajectory {
    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.times.last()?, *self.values.last()?))
    }
}

impl Scheme {
    /// Build a scheme, checking that nodes and weights pair up
    pub fn new(name: impl Into<String>, alphas: Vec<f64>, gammas: Vec<f64>) -> Result<Self> {
        if alphas.is_empty() {
            return Err(SunpathError::EmptyInput("Runge-Kutta stages"));
        }
        if alphas.len() != gammas.len() {
            return Err(SunpathError::LengthMismatch {
                what: "Runge-Kutta weights",
                expected: alphas.len(),
                found: gammas.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            alphas,
            gammas,
        })
    }

    pub fn euler() -> Self {
        Self::known("Euler", &[0.0], &[1.0])
    }

    /// Midpoint rule
    pub fn rk2c() -> Self {
        Self::known("RK2C", &[0.0, 0.5], &[0.0, 1.0])
    }

    pub fn heun() -> Self {
        Self::known("Heun", &[0.0, 1.0], &[0.5, 0.5])
    }

    /// Heun's third-order method
    pub fn heun3() -> Self {
        Self::known("Heun 3", &[0.0, 1.0 / 3.0, 2.0 / 3.0], &[0.25, 0.0, 0.75])
    }

    /// Classical fourth-order scheme
    pub fn rk4c() -> Self {
        Self::known(
            "RK4C",
            &[0.0, 0.5, 0.5, 1.0],
            &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
        )
    }

    fn known(name: &str, alphas: &[f64], gammas: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            alphas: alphas.to_vec(),
            gammas: gammas.to_vec(),
        }
    }

    /// All built-in schemes, from first to fourth order
    pub fn builtin() -> Vec<Scheme> {
        vec![
            Self::euler(),
            Self::rk2c(),
            Self::heun(),
            Self::heun3(),
            Self::rk4c(),
        ]
    }

    /// Look up a built-in scheme, ignoring case and spaces
    pub fn by_name(name: &str) -> Result<Scheme> {
        let key = |s: &str| s.replace(' ', "").to_ascii_lowercase();
        let wanted = key(name);
        Self::builtin()
            .into_iter()
            .find(|s| key(&s.name) == wanted)
            .ok_or_else(|| SunpathError::UnknownScheme(name.to_string()))
    }

    pub fn stages(&self) -> usize {
        self.alphas.len()
    }

    /// Advance `u` at time `t` by one step of size `dt`
    pub fn step<F>(&self, f: F, t: f64, u: f64, dt: f64) -> Step
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut stages = Vec::with_capacity(self.stages());
        let mut slope = 0.0;
        let mut increment = 0.0;

        for (k, (&alpha, &gamma)) in self.alphas.iter().zip(&self.gammas).enumerate() {
            let (tk, uk) = if k == 0 {
                (t, u)
            } else {
                (t + alpha * dt, u + alpha * dt * slope)
            };
            slope = f(uk, tk);
            increment += gamma * slope;
            stages.push(Stage {
                t: tk,
                u: uk,
                slope,
            });
        }

        Step {
            stages,
            next: u + dt * increment,
        }
    }

    /// Take `n_steps` steps of size `dt` from `(t0, u0)`
    pub fn integrate<F>(&self, f: F, t0: f64, u0: f64, dt: f64, n_steps: usize) -> Trajectory
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut times = Vec::with_capacity(n_steps + 1);
        let mut values = Vec::with_capacity(n_steps + 1);
        let (mut t, mut u) = (t0, u0);
        times.push(t);
        values.push(u);

        for i in 1..=n_steps {
            u = self.step(&f, t, u, dt).next;
            t = t0 + i as f64 * dt;
            times.push(t);
            values.push(u);
        }

        Trajectory { times, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lookup_ignores_case_and_spaces() {
        assert_eq!(Scheme::by_name("heun3").unwrap(), Scheme::heun3());
        assert_eq!(Scheme::by_name("rk4c").unwrap().stages(), 4);
        assert!(matches!(
            Scheme::by_name("rk45"),
            Err(SunpathError::UnknownScheme(_))
        ));
    }

    #[test]
    fn new_checks_lengths() {
        assert!(Scheme::new("bad", vec![0.0, 0.5], vec![1.0]).is_err());
        assert!(Scheme::new("empty", vec![], vec![]).is_err());
        assert!(Scheme::new("ok", vec![0.0], vec![1.0]).is_ok());
    }

    #[test]
    fn builtin_schemes_are_consistent() {
        for s in Scheme::builtin() {
            assert_relative_eq!(s.gammas.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
            assert_eq!(s.alphas[0], 0.0);
        }
    }

    #[test]
    fn stages_follow_previous_slope() {
        let f = |u: f64, t: f64| -u * t;
        let step = Scheme::rk4c().step(f, -0.5, 1.0, 1.5);
        assert_eq!(step.stages.len(), 4);
        let k1 = step.stages[0].slope;
        assert_relative_eq!(k1, 0.5);
        assert_relative_eq!(step.stages[1].t, 0.25);
        assert_relative_eq!(step.stages[1].u, 1.0 + 0.75 * k1);
        assert_relative_eq!(step.stages[3].t, 1.0);

        let increments: f64 = step.increments(&Scheme::rk4c(), 1.5).iter().sum();
        assert_relative_eq!(step.next, 1.0 + increments, epsilon = 1e-14);
    }

    #[test]
    fn euler_matches_hand_computation() {
        let traj = Scheme::euler().integrate(|u, _t| u, 0.0, 1.0, 0.5, 2);
        assert_eq!(traj.values, vec![1.0, 1.5, 2.25]);
        assert_eq!(traj.last(), Some((1.0, 2.25)));
    }
}
