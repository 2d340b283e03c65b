use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{Result, SunpathError};

/// Orbital elements and pole coordinates of a body, all angles in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetElements {
    pub name: String,
    pub eccentricity: f64,
    /// Orbit inclination on the ecliptic
    pub inclination: f64,
    /// Longitude of the perihelion
    pub perihelion_longitude: f64,
    /// Longitude of the ascending node
    pub ascending_node: f64,
    /// Right ascension of the north pole
    pub pole_ra: f64,
    /// Declination of the north pole
    pub pole_dec: f64,
    /// Published obliquity, for comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_tilt: Option<f64>,
    /// Published vernal equinox to perihelion angle, for comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_lambda: Option<f64>,
}

impl PlanetElements {
    /// Parse one body or a list of bodies from JSON
    pub fn from_json(json: &str) -> Result<Vec<PlanetElements>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(PlanetElements),
            Many(Vec<PlanetElements>),
        }

        Ok(match serde_json::from_str::<OneOrMany>(json)? {
            OneOrMany::One(p) => vec![p],
            OneOrMany::Many(v) => v,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The eight planets of the solar system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Planet {
    pub const ALL: [Planet; 8] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Earth,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
    ];

    /// Built-in elements of the planet
    ///
    /// Venus and Uranus rotate retrograde; their pole is given as the
    /// opposite (south) pole so that the obliquity stays below 90°.
    pub fn elements(self) -> PlanetElements {
        // e, i, ϖ, Ω, α, δ, reference ε, reference λ
        #[rustfmt::skip]
        let (e, i, w, o, a, d, tilt, lambda) = match self {
            Planet::Mercury => (0.20563661, 7.00559432, 77.45771895, 48.33961819, 281.0097, 61.4144, 0.035, 104.0),
            Planet::Venus => (0.00676399, 3.39777545, 131.76755713, 76.67261496, 272.76, 67.16, 180.0 - 177.36, 253.7),
            Planet::Earth => (0.01673163, 0.0, 102.93768193, 0.0, 0.0, 90.0, 23.44, 282.94),
            Planet::Mars => (0.09336511, 1.85181869, -23.91744784, 49.71320984, 317.68143, 52.88650, 25.19, 251.6),
            Planet::Jupiter => (0.04853590, 1.29861416, 14.27495244, 100.29282654, 268.056595, 64.495303, 3.13, 57.0),
            Planet::Saturn => (0.05550825, 2.49424102, 92.86136063, 113.63998702, 40.589, 83.537, 26.73, 280.1),
            Planet::Uranus => (0.04685740, 0.77298127, 172.43404441, 73.96250215, 257.311, -15.175, 180.0 - 97.77, 182.0),
            Planet::Neptune => (0.00895439, 1.77005520, 46.68158724, 131.78635853, 299.36, 43.46, 28.3, 10.2),
        };
        PlanetElements {
            name: self.to_string(),
            eccentricity: e,
            inclination: i,
            perihelion_longitude: w,
            ascending_node: o,
            pole_ra: a,
            pole_dec: d,
            reference_tilt: Some(tilt),
            reference_lambda: Some(lambda),
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Planet {
    type Err = SunpathError;

    fn from_str(s: &str) -> Result<Self> {
        Planet::ALL
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SunpathError::UnknownPlanet(s.to_string()))
    }
}
