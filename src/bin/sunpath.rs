//! Command line front end for the sunpath library.
//!
//! Every subcommand prints a table on stdout, as CSV by default or as JSON
//! with `--json`.
//!
//! Usage:
//! ```text
//! sunpath kepler -e 0.3 -n 64
//! sunpath analemma --tilt 23.44 --eccentricity 0.0167 --perihelion 12.94
//! sunpath noon --tilt 23.44 --approx arctan
//! sunpath orient --planet mars
//! sunpath stability --scheme rk4c --grid
//! sunpath hull points.csv --boundary
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ndarray::Array1;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sunpath::analemma::{approx_analemma, solve_analemma, OrbitParams};
use sunpath::hull::grains::{
    extract_grain_boundaries, parse_element_sets, parse_elements, parse_nodes,
};
use sunpath::hull::{convex_hull, HullMode};
use sunpath::kepler::{solve_kepler, NewtonOptions};
use sunpath::noon::{self, NoonApproximation};
use sunpath::orientation::{orientation, Planet, PlanetElements, EARTH_OBLIQUITY};
use sunpath::runge_kutta::stability::{
    amplification_roots, real_stability_boundary, stability_grid, StabilityOptions,
};
use sunpath::runge_kutta::Scheme;
use sunpath::sampling::mean_anomalies;
use sunpath::Complex;

#[derive(Parser)]
#[command(name = "sunpath")]
#[command(about = "Analemmas, Kepler orbits and the numerics behind them")]
#[command(version)]
struct Cli {
    /// Print JSON instead of CSV
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve Kepler's equation over one orbit
    Kepler {
        #[arg(short, long)]
        eccentricity: f64,
        /// Number of mean anomaly samples over [0, 2π]
        #[arg(short = 'n', long, default_value_t = 100)]
        samples: usize,
        #[arg(long, default_value_t = 15)]
        max_iterations: usize,
        #[arg(long, default_value_t = 1e-12)]
        tolerance: f64,
    },

    /// Sun directions over one year, projected on the sky
    Analemma {
        /// Obliquity in degrees
        #[arg(long, default_value_t = 23.44)]
        tilt: f64,
        #[arg(short, long, default_value_t = 0.0167)]
        eccentricity: f64,
        /// Angle from the winter solstice to the perihelion, in degrees
        #[arg(long, default_value_t = 12.94)]
        perihelion: f64,
        /// Fraction of a year from the start of the calendar to the perihelion
        #[arg(long, default_value_t = 0.0)]
        year_offset: f64,
        /// JSON file holding the orbit parameters (angles in radians)
        #[arg(long, conflicts_with_all = ["tilt", "eccentricity", "perihelion", "year_offset"])]
        params: Option<PathBuf>,
        #[arg(short = 'n', long, default_value_t = 366)]
        samples: usize,
        /// Use the first-order model instead of solving Kepler's equation
        #[arg(long)]
        approx: bool,
    },

    /// Shift of solar noon due to the obliquity, day by day
    Noon {
        /// Obliquity in degrees
        #[arg(long, default_value_t = 23.44)]
        tilt: f64,
        /// Closed-form approximation to print next to the exact shift
        #[arg(long, value_enum)]
        approx: Option<ApproxArg>,
    },

    /// Obliquity and perihelion angles of planets
    Orient {
        /// Planet name; all planets when omitted
        #[arg(short, long)]
        planet: Option<String>,
        /// JSON file with one or more bodies, instead of the built-in table
        #[arg(long, conflicts_with = "planet")]
        elements: Option<PathBuf>,
        /// Earth obliquity in degrees
        #[arg(long, default_value_t = EARTH_OBLIQUITY)]
        obliquity: f64,
    },

    /// Linear stability of Runge-Kutta schemes
    Stability {
        /// Scheme name; all built-in schemes when omitted
        #[arg(short, long)]
        scheme: Option<String>,
        /// Print |G| over the complex plane instead of the real boundary
        #[arg(long)]
        grid: bool,
        #[arg(long, default_value_t = 121)]
        resolution: usize,
        /// Print the zeros of the order-p Taylor amplification factor (p at most 16)
        #[arg(long, value_name = "ORDER", conflicts_with = "grid")]
        roots: Option<usize>,
    },

    /// Convex hull of a CSV file of x,y points
    Hull {
        input: PathBuf,
        /// Keep points lying on hull edges
        #[arg(long)]
        boundary: bool,
        /// The input has a header row
        #[arg(long)]
        header: bool,
    },

    /// Grain outlines of a 2D mesh
    Grains {
        nodes: PathBuf,
        elements: PathBuf,
        sets: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ApproxArg {
    Arctan,
    Ratio,
    Linear,
}

impl From<ApproxArg> for NoonApproximation {
    fn from(a: ApproxArg) -> Self {
        match a {
            ApproxArg::Arctan => NoonApproximation::Arctan,
            ApproxArg::Ratio => NoonApproximation::Ratio,
            ApproxArg::Linear => NoonApproximation::Linear,
        }
    }
}

#[derive(Serialize)]
struct KeplerRow {
    mean: f64,
    eccentric: f64,
    true_anomaly: f64,
    radius: f64,
}

#[derive(Serialize)]
struct AnalemmaRow {
    mean: f64,
    x1: f64,
    x2: f64,
    x3: f64,
}

#[derive(Serialize)]
struct NoonRow {
    day: f64,
    shift: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    approx: Option<f64>,
}

#[derive(Serialize)]
struct OrientRow {
    name: String,
    tilt: f64,
    vernal_to_perihelion: f64,
    winter_to_perihelion: f64,
    reference_tilt: Option<f64>,
    reference_lambda: Option<f64>,
}

#[derive(Serialize)]
struct BoundaryRow {
    scheme: String,
    stages: usize,
    real_boundary: Option<f64>,
}

#[derive(Serialize)]
struct GridRow {
    scheme: String,
    re: f64,
    im: f64,
    magnitude: f64,
}

#[derive(Serialize)]
struct RootRow {
    re: f64,
    im: f64,
}

#[derive(Serialize)]
struct HullRow {
    index: usize,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct PolygonRow {
    grain: String,
    vertex: usize,
    node: usize,
    x: f64,
    y: f64,
}

/// Write rows to stdout as CSV, or as a JSON array
fn emit<T: Serialize>(rows: &[T], json: bool) -> Result<()> {
    let stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(stdout, rows)?;
        println!();
    } else {
        let mut writer = csv::Writer::from_writer(stdout);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn schemes(name: Option<&str>) -> Result<Vec<Scheme>> {
    Ok(match name {
        Some(name) => vec![Scheme::by_name(name)?],
        None => Scheme::builtin(),
    })
}

fn read_points(path: &Path, header: bool) -> Result<Vec<[f64; 2]>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(header)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut points = Vec::new();
    for record in reader.deserialize() {
        let (x, y): (f64, f64) = record?;
        points.push([x, y]);
    }
    Ok(points)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Kepler {
            eccentricity,
            samples,
            max_iterations,
            tolerance,
        } => {
            let options = NewtonOptions::default()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            let m = mean_anomalies(samples);
            let (solution, anomaly) = solve_kepler(eccentricity, &m, &options)?;
            let nu = anomaly.angle();
            let rows: Vec<KeplerRow> = (0..m.len())
                .map(|k| KeplerRow {
                    mean: m[k],
                    eccentric: solution.eccentric[k],
                    true_anomaly: nu[k],
                    radius: anomaly.radius[k],
                })
                .collect();
            emit(&rows, cli.json)?;
        }

        Commands::Analemma {
            tilt,
            eccentricity,
            perihelion,
            year_offset,
            params,
            samples,
            approx,
        } => {
            let params = match params {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    serde_json::from_str::<OrbitParams>(&text)
                        .with_context(|| format!("invalid orbit parameters in {}", path.display()))?
                }
                None => OrbitParams::new(tilt.to_radians(), eccentricity, perihelion.to_radians())
                    .with_year_offset(year_offset),
            };
            let m = mean_anomalies(samples);
            let dirs = if approx {
                approx_analemma(&params, &m)?
            } else {
                solve_analemma(&params, &m, &NewtonOptions::default())?
            }
            .projected();
            let rows: Vec<AnalemmaRow> = (0..m.len())
                .map(|k| AnalemmaRow {
                    mean: m[k],
                    x1: dirs.x1[k],
                    x2: dirs.x2[k],
                    x3: dirs.x3[k],
                })
                .collect();
            emit(&rows, cli.json)?;
        }

        Commands::Noon { tilt, approx } => {
            let tilt = tilt.to_radians();
            let days = Array1::linspace(0.0, noon::DAYS_PER_YEAR, noon::DAYS_PER_YEAR as usize + 1);
            let shift = noon::noon_shift(tilt, &days, &noon::default_options())?;
            let estimate = approx
                .map(|a| noon::approximate_noon_shift(tilt, &days, a.into()))
                .transpose()?;
            let rows: Vec<NoonRow> = (0..days.len())
                .map(|k| NoonRow {
                    day: days[k],
                    shift: shift[k],
                    approx: estimate.as_ref().map(|e| e[k]),
                })
                .collect();
            emit(&rows, cli.json)?;
        }

        Commands::Orient {
            planet,
            elements,
            obliquity,
        } => {
            let bodies = match (planet, elements) {
                (_, Some(path)) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    PlanetElements::from_json(&text)?
                }
                (Some(name), None) => vec![name.parse::<Planet>()?.elements()],
                (None, None) => Planet::ALL.iter().map(|p| p.elements()).collect(),
            };
            let rows: Vec<OrientRow> = bodies
                .into_iter()
                .map(|body| {
                    let o = orientation(&body, obliquity);
                    OrientRow {
                        name: body.name,
                        tilt: o.tilt,
                        vernal_to_perihelion: o.vernal_to_perihelion,
                        winter_to_perihelion: o.winter_to_perihelion,
                        reference_tilt: body.reference_tilt,
                        reference_lambda: body.reference_lambda,
                    }
                })
                .collect();
            emit(&rows, cli.json)?;
        }

        Commands::Stability {
            scheme,
            grid,
            resolution,
            roots,
        } => {
            if let Some(order) = roots {
                let rows: Vec<RootRow> = amplification_roots(order)?
                    .into_iter()
                    .map(|z| RootRow { re: z.re, im: z.im })
                    .collect();
                return emit(&rows, cli.json);
            }

            let schemes = schemes(scheme.as_deref())?;
            if grid {
                let options = StabilityOptions::default().with_resolution(resolution);
                let mut rows = Vec::new();
                for s in &schemes {
                    let g = stability_grid(|z: Complex<f64>| s.amplification(z), &options)?;
                    for ((i, j), m) in g.magnitude.indexed_iter() {
                        rows.push(GridRow {
                            scheme: s.name.clone(),
                            re: g.re[j],
                            im: g.im[i],
                            magnitude: *m,
                        });
                    }
                }
                emit(&rows, cli.json)?;
            } else {
                let rows: Vec<BoundaryRow> = schemes
                    .iter()
                    .map(|s| BoundaryRow {
                        scheme: s.name.clone(),
                        stages: s.stages(),
                        real_boundary: real_stability_boundary(|z| s.amplification(z), 10.0),
                    })
                    .collect();
                emit(&rows, cli.json)?;
            }
        }

        Commands::Hull {
            input,
            boundary,
            header,
        } => {
            let points = read_points(&input, header)?;
            let mode = if boundary {
                HullMode::Boundary
            } else {
                HullMode::Vertices
            };
            let hull = convex_hull(&points, mode)?;
            let rows: Vec<HullRow> = hull
                .into_iter()
                .map(|index| HullRow {
                    index,
                    x: points[index][0],
                    y: points[index][1],
                })
                .collect();
            emit(&rows, cli.json)?;
        }

        Commands::Grains {
            nodes,
            elements,
            sets,
        } => {
            let read = |path: &PathBuf| {
                fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
            };
            let nodes = parse_nodes(&read(&nodes)?)?;
            let elements = parse_elements(&read(&elements)?)?;
            let sets = parse_element_sets(&read(&sets)?)?;
            let grains = extract_grain_boundaries(&nodes, &elements, &sets)?;

            if cli.json {
                serde_json::to_writer_pretty(io::stdout().lock(), &grains)?;
                println!();
            } else {
                let mut rows = Vec::new();
                for (name, polygon) in grains.names.iter().zip(&grains.polygons) {
                    for &v in polygon {
                        rows.push(PolygonRow {
                            grain: name.clone(),
                            vertex: v,
                            node: grains.node_ids[v],
                            x: grains.vertices[v][0],
                            y: grains.vertices[v][1],
                        });
                    }
                }
                emit(&rows, false)?;
            }
        }
    }

    Ok(())
}
