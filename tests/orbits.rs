use approx::assert_relative_eq;
use ndarray::Array1;
use sunpath::analemma::{
    angular_speed, approx_analemma, solve_analemma, AnalemmaGrid, OrbitParams,
};
use sunpath::kepler::{solve_eccentric_anomaly, solve_kepler, NewtonOptions};
use sunpath::noon::{approximate_noon_shift, default_options, noon_shift, NoonApproximation};
use sunpath::orientation::{orientation, Planet, PlanetElements, EARTH_OBLIQUITY};
use sunpath::sampling::{half_open, mean_anomalies};

#[test]
fn kepler_residual_is_small_across_eccentricities() {
    let m = half_open(0.0, std::f64::consts::TAU, 500);
    let options = NewtonOptions::default();
    for k in 0..=18 {
        let e = 0.05 * k as f64;
        let sol = solve_eccentric_anomaly(e, &m, &options).expect("valid eccentricity");
        assert!(sol.converged, "e = {} did not converge", e);
        for (big_e, mean) in sol.eccentric.iter().zip(m.iter()) {
            assert!((big_e - e * big_e.sin() - mean).abs() < 1e-8);
        }
    }
}

#[test]
fn circular_orbit_is_trivial() {
    let m = mean_anomalies(33);
    let (sol, nu) = solve_kepler(0.0, &m, &NewtonOptions::default()).expect("valid");
    assert_eq!(sol.iterations, 0);
    assert_eq!(sol.eccentric, m);
    for k in 0..m.len() {
        assert_relative_eq!(nu.cos[k], m[k].cos(), epsilon = 1e-14);
        assert_relative_eq!(nu.radius[k], 1.0, epsilon = 1e-14);
    }
}

#[test]
fn true_anomaly_lies_on_unit_circle() {
    let m = mean_anomalies(200);
    let (_, nu) = solve_kepler(0.6, &m, &NewtonOptions::default()).expect("valid");
    for k in 0..nu.len() {
        assert_relative_eq!(nu.cos[k].powi(2) + nu.sin[k].powi(2), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn invalid_eccentricity_is_rejected() {
    let m = mean_anomalies(10);
    assert!(solve_kepler(1.0, &m, &NewtonOptions::default()).is_err());
    assert!(solve_kepler(-0.1, &m, &NewtonOptions::default()).is_err());
    assert!(solve_kepler(f64::NAN, &m, &NewtonOptions::default()).is_err());
}

#[test]
fn projected_directions_are_unit_or_masked() {
    let m = mean_anomalies(365);
    let params = OrbitParams::new(1.2, 0.2, 1.0);
    let dirs = solve_analemma(&params, &m, &NewtonOptions::default())
        .expect("valid params")
        .projected();
    for k in 0..dirs.len() {
        let (a, b, c) = (dirs.x1[k], dirs.x2[k], dirs.x3[k]);
        if a.is_nan() {
            assert!(b.is_nan() && c.is_nan());
        } else {
            assert!(a > 0.0);
            assert_relative_eq!(a * a + b * b + c * c, 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn earth_first_order_model_is_accurate() {
    let m = mean_anomalies(365);
    let params = OrbitParams::earth();
    let exact = solve_analemma(&params, &m, &NewtonOptions::default())
        .expect("valid")
        .projected();
    let approx = approx_analemma(&params, &m).expect("valid").projected();
    for k in 0..m.len() {
        let d = (exact.x2[k] - approx.x2[k]).hypot(exact.x3[k] - approx.x3[k]);
        assert!(d < 1e-3, "sample {}: {}", k, d);
    }
}

#[test]
fn solstice_reaches_the_tilt() {
    let m = mean_anomalies(2001);
    let params = OrbitParams::new(23.44_f64.to_radians(), 0.0, 0.0);
    let dirs = solve_analemma(&params, &m, &NewtonOptions::default())
        .expect("valid")
        .projected();
    let lowest = dirs.x3.iter().cloned().fold(f64::MAX, f64::min);
    assert_relative_eq!(lowest, -(23.44_f64.to_radians().sin()), epsilon = 1e-6);
}

#[test]
fn speed_is_smooth_and_positive() {
    let n = 365;
    let m = mean_anomalies(n);
    let spacing = m[1] - m[0];
    let params = OrbitParams::earth();
    let dirs = solve_analemma(&params, &m, &NewtonOptions::default()).expect("valid");
    let speed = angular_speed(&dirs.projected(), spacing);
    assert_eq!(speed.len(), n);
    assert!(speed.iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn grid_deviation_tracks_eccentricity() {
    let m = mean_anomalies(181);
    let eccs = [0.01, 0.1, 0.3];
    let grid = AnalemmaGrid::compute(0.6, &eccs, &[0.5, 2.0], &m, &NewtonOptions::default())
        .expect("grid");
    for row in 0..2 {
        let d: Vec<f64> = (0..3)
            .map(|col| AnalemmaGrid::max_deviation(grid.cell(row, col).expect("cell")))
            .collect();
        assert!(d[0] < d[1] && d[1] < d[2], "{:?}", d);
    }
}

#[test]
fn noon_shift_is_half_yearly() {
    let days = Array1::linspace(0.0, 365.0, 366);
    let tilt = 23.44_f64.to_radians();
    let exact = noon_shift(tilt, &days, &default_options()).expect("valid tilt");
    let linear = approximate_noon_shift(tilt, &days, NoonApproximation::Linear).expect("valid");
    // half a year apart the shift repeats
    assert_relative_eq!(exact[10], exact[10 + 182], epsilon = 30.0);
    // the linear model overshoots slightly but keeps the sign
    for k in 0..days.len() {
        if exact[k].abs() > 10.0 {
            assert_eq!(exact[k].signum(), linear[k].signum());
        }
    }
}

/// Obliquity and vernal-equinox-to-perihelion angle for each planet
const REFERENCE: [(Planet, f64, f64); 8] = [
    (Planet::Mercury, 0.0348, 52.28),
    (Planet::Venus, 2.6407, 253.95),
    (Planet::Earth, 23.4393, 282.9377),
    (Planet::Mars, 25.1872, 251.0324),
    (Planet::Jupiter, 3.1128, 57.051),
    (Planet::Saturn, 26.7268, 279.253),
    (Planet::Uranus, 82.2292, 184.89),
    (Planet::Neptune, 27.8478, 0.768),
];

#[test]
fn planet_orientations() {
    for (planet, tilt, vernal) in REFERENCE {
        let o = orientation(&planet.elements(), EARTH_OBLIQUITY);
        assert!((o.tilt - tilt).abs() < 1e-3, "{}: tilt {}", planet, o.tilt);
        assert!(
            (o.vernal_to_perihelion - vernal).abs() < 1e-2,
            "{}: vernal {}",
            planet,
            o.vernal_to_perihelion
        );
        let winter = (o.vernal_to_perihelion + 90.0).rem_euclid(360.0);
        assert_relative_eq!(o.winter_to_perihelion, winter, epsilon = 1e-9);
    }
}

#[test]
fn computed_tilts_match_published_values() {
    for planet in Planet::ALL {
        let elements = planet.elements();
        let o = orientation(&elements, EARTH_OBLIQUITY);
        let published = elements.reference_tilt.expect("built-in reference");
        assert!((o.tilt - published).abs() < 0.5, "{}", planet);
    }
}

#[test]
fn user_supplied_body_from_json() {
    let mut mars = Planet::Mars.elements();
    mars.name = "Mars bis".to_string();
    let json = serde_json::to_string(&vec![mars]).expect("serialize");
    let bodies = PlanetElements::from_json(&json).expect("parse");
    let o = orientation(&bodies[0], EARTH_OBLIQUITY);
    assert!((o.tilt - 25.1872).abs() < 1e-3);
    let params = o.orbit_params(bodies[0].eccentricity);
    assert!(params.validate().is_ok());
}
