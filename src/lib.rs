//! Geometry of the Sun's apparent path and the numerical tools behind it
//!
//! - [`kepler`]: eccentric and true anomalies from Kepler's equation
//! - [`analemma`]: exact and first-order analemmas, projected on the sky
//! - [`noon`]: equation of time due to the obliquity alone
//! - [`orientation`]: planet obliquity and perihelion angles from orbital elements
//! - [`runge_kutta`]: explicit Runge–Kutta schemes and their stability
//! - [`basis`]: Lagrange, B-spline and quadratic triangle bases
//! - [`hull`]: gift-wrapping convex hull and grain boundary extraction

pub mod analemma;
pub mod basis;
pub mod error;
pub mod hull;
pub mod kepler;
pub mod noon;
pub mod orientation;
pub mod runge_kutta;
pub mod sampling;

pub use error::{Result, SunpathError};
pub use nalgebra::Complex;

pub mod prelude {
    pub mod orbits {
        pub use crate::analemma::{
            approx_analemma, solve_analemma, AnalemmaGrid, OrbitParams, SunDirections,
        };
        pub use crate::kepler::{solve_kepler, KeplerSolution, NewtonOptions, TrueAnomaly};
        pub use crate::noon::{approximate_noon_shift, noon_shift, NoonApproximation};
        pub use crate::orientation::{orientation, Orientation, Planet, PlanetElements};
    }
    pub mod numerics {
        pub use crate::basis::{
            bspline_basis, lagrange_basis, spline_curve, CurveKind, QuadraticTriangle,
        };
        pub use crate::runge_kutta::problems::Problem;
        pub use crate::runge_kutta::stability::{
            amplification_roots, real_stability_boundary, stability_grid, StabilityOptions,
        };
        pub use crate::runge_kutta::Scheme;
    }

    pub use crate::hull::{convex_hull, HullMode};
    pub use crate::sampling::mean_anomalies;
    pub use crate::{Result, SunpathError};
}
