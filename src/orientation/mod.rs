//! Planet pole orientation from orbital elements
//!
//! The north pole of a planet is given in equatorial coordinates (right
//! ascension `α`, declination `δ`, IAU 2009 report). Rotating it to the
//! ecliptic and then to the planet's own orbital frame gives
//!
//! - the obliquity `ε`: angle between the pole and the orbit normal
//! - the angle from the vernal equinox to the perihelion
//! - the angle `γ` from the winter solstice to the perihelion, the
//!   parameter the analemma depends on
//!
//! Orbital elements follow the JPL "approximate positions of the planets"
//! tables.
//!
//! ```rust
//! use sunpath::orientation::{orientation, Planet, EARTH_OBLIQUITY};
//!
//! let earth = orientation(&Planet::Earth.elements(), EARTH_OBLIQUITY);
//! assert!((earth.tilt - 23.4393).abs() < 1e-3);
//! ```

mod planets;

pub use planets::{Planet, PlanetElements};

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::analemma::OrbitParams;

/// Obliquity of the ecliptic (J2000), in degrees
pub const EARTH_OBLIQUITY: f64 = 23.439_281_08;

/// Projected pole length below which the equinox direction is undefined
const POLE_EPS: f64 = 1e-12;

/// Coordinate axis of an elementary rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Elementary frame rotation of angle `theta` (radians) about `axis`
///
/// These are passive rotations: they give the coordinates of a fixed
/// vector in a frame turned by `theta`.
pub fn rotation(axis: Axis, theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    match axis {
        Axis::X => Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c),
        Axis::Y => Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c),
        Axis::Z => Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0),
    }
}

/// Pole direction and perihelion angles of a planet, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Obliquity, in `[0, 180]`
    pub tilt: f64,
    /// Angle from the vernal equinox to the perihelion, in `[0, 360)`
    pub vernal_to_perihelion: f64,
    /// Angle from the winter solstice to the perihelion, in `[0, 360)`
    pub winter_to_perihelion: f64,
}

impl Orientation {
    /// Analemma parameters for an orbit of eccentricity `e`
    pub fn orbit_params(&self, e: f64) -> OrbitParams {
        OrbitParams::new(
            self.tilt.to_radians(),
            e,
            self.winter_to_perihelion.to_radians(),
        )
    }
}

/// Unit pole vector of `elements` in the planet's orbital frame
pub fn pole_in_orbit_frame(elements: &PlanetElements, ecliptic_obliquity: f64) -> Vector3<f64> {
    let ra = elements.pole_ra.to_radians();
    let dec = elements.pole_dec.to_radians();
    let node = elements.ascending_node.to_radians();
    let inc = elements.inclination.to_radians();
    // argument of periapsis from the longitude of periapsis
    let arg = (elements.perihelion_longitude - elements.ascending_node).to_radians();

    let frame = rotation(Axis::Z, arg)
        * rotation(Axis::X, inc)
        * rotation(Axis::Z, node)
        * rotation(Axis::X, ecliptic_obliquity.to_radians())
        * rotation(Axis::Z, -ra)
        * rotation(Axis::Y, dec);

    frame * Vector3::x()
}

/// Obliquity and perihelion angles of a planet
///
/// `ecliptic_obliquity` is the Earth's obliquity in degrees, used to move
/// the pole from equatorial to ecliptic coordinates.
///
/// A pole along the orbit normal has no solstices, so both perihelion
/// angles are NaN in that case.
pub fn orientation(elements: &PlanetElements, ecliptic_obliquity: f64) -> Orientation {
    let w = pole_in_orbit_frame(elements, ecliptic_obliquity);
    let tilt = w.z.clamp(-1.0, 1.0).acos();

    let h = w.x.hypot(w.y);
    if h < POLE_EPS {
        tracing::warn!(
            "{}: pole is normal to the orbit, perihelion angles are undefined",
            elements.name
        );
        return Orientation {
            tilt: tilt.to_degrees(),
            vernal_to_perihelion: f64::NAN,
            winter_to_perihelion: f64::NAN,
        };
    }
    let beta = (w.x / h).atan2(-w.y / h).to_degrees();

    Orientation {
        tilt: tilt.to_degrees(),
        vernal_to_perihelion: (360.0 - beta).rem_euclid(360.0),
        winter_to_perihelion: (90.0 - beta).rem_euclid(360.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotations_are_orthonormal() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let r = rotation(axis, 0.7);
            assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-14);
            assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn passive_rotation_about_z() {
        let v = rotation(Axis::Z, std::f64::consts::FRAC_PI_2) * Vector3::x();
        assert_relative_eq!(v, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn earth_pole_matches_obliquity() {
        let o = orientation(&Planet::Earth.elements(), EARTH_OBLIQUITY);
        assert_relative_eq!(o.tilt, EARTH_OBLIQUITY, epsilon = 1e-9);
        // 180° minus the longitude of perihelion, mirrored
        assert_relative_eq!(o.vernal_to_perihelion, 282.937_681_93, epsilon = 1e-8);
        assert_relative_eq!(o.winter_to_perihelion, 12.937_681_93, epsilon = 1e-8);
    }

    #[test]
    fn orbit_params_use_winter_angle() {
        let o = orientation(&Planet::Earth.elements(), EARTH_OBLIQUITY);
        let params = o.orbit_params(0.0167);
        assert!(params.validate().is_ok());
        assert_relative_eq!(params.perihelion, 12.937_681_93_f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn untilted_pole_has_no_perihelion_angles() {
        let body = PlanetElements {
            name: "upright".to_string(),
            eccentricity: 0.1,
            inclination: 0.0,
            perihelion_longitude: 0.0,
            ascending_node: 0.0,
            pole_ra: 0.0,
            pole_dec: 90.0,
            reference_tilt: None,
            reference_lambda: None,
        };
        let o = orientation(&body, 0.0);
        assert_relative_eq!(o.tilt, 0.0, epsilon = 1e-9);
        assert!(o.vernal_to_perihelion.is_nan());
        assert!(o.winter_to_perihelion.is_nan());
        assert!(o.orbit_params(body.eccentricity).validate().is_err());
    }
}
