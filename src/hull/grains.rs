//! Grain boundaries of a 2D polycrystal mesh
//!
//! Input is an Abaqus-style mesh: a node table (`id, x, y`), an element
//! table (`id, n1, n2, ...`) and element sets introduced by
//! `*ELSET, ELSET=GRAINk` lines. Each grain's outline is the boundary hull
//! of the nodes of its elements. Outlines share one vertex table so that
//! neighbouring grains reference the same vertices.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{convex_hull, HullMode};
use crate::error::{Result, SunpathError};

/// Node coordinates keyed by node id
pub type Nodes = BTreeMap<usize, [f64; 2]>;
/// Node ids of each element keyed by element id
pub type Elements = BTreeMap<usize, Vec<usize>>;

/// Data rows of a mesh table; keyword lines (`*Node`, `*ELSET`, ...) are
/// skipped whatever their indentation
fn records(text: &str) -> impl Iterator<Item = Result<csv::StringRecord>> + '_ {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes())
        .into_records()
        .map(|record| record.map_err(SunpathError::from))
        .filter(|record| match record {
            Ok(r) => !r.get(0).is_some_and(|f| f.starts_with('*')),
            Err(_) => true,
        })
}

fn line_of(record: &csv::StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

fn field<T: std::str::FromStr>(record: &csv::StringRecord, k: usize) -> Result<T> {
    let raw = record.get(k).unwrap_or_default();
    raw.parse().map_err(|_| SunpathError::Parse {
        line: line_of(record),
        reason: format!("cannot parse field {} ({:?})", k + 1, raw),
    })
}

/// Parse `id, x, y` rows; lines starting with `*` are skipped
pub fn parse_nodes(text: &str) -> Result<Nodes> {
    let mut nodes = Nodes::new();
    for record in records(text) {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let id = field(&record, 0)?;
        let x = field(&record, 1)?;
        let y = field(&record, 2)?;
        nodes.insert(id, [x, y]);
    }
    Ok(nodes)
}

/// Parse `id, n1, n2, ...` rows; trailing commas are allowed
pub fn parse_elements(text: &str) -> Result<Elements> {
    let mut elements = Elements::new();
    for record in records(text) {
        let record = record?;
        let fields: Vec<usize> = (0..record.len())
            .filter(|&k| !record[k].is_empty())
            .map(|k| field(&record, k))
            .collect::<Result<_>>()?;
        if let Some((&id, connectivity)) = fields.split_first() {
            if connectivity.is_empty() {
                return Err(SunpathError::Parse {
                    line: line_of(&record),
                    reason: format!("element {} has no nodes", id),
                });
            }
            elements.insert(id, connectivity.to_vec());
        }
    }
    Ok(elements)
}

/// Parse `*ELSET, ELSET=NAME` blocks into element id lists
pub fn parse_element_sets(text: &str) -> Result<BTreeMap<String, Vec<usize>>> {
    let mut sets: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (k, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('*') {
            current = if line.to_ascii_uppercase().starts_with("*ELSET") {
                let name = line
                    .split_once('=')
                    .map(|(_, name)| name.trim().to_string())
                    .ok_or_else(|| SunpathError::Parse {
                        line: k + 1,
                        reason: "element set without a name".to_string(),
                    })?;
                sets.entry(name.clone()).or_default();
                Some(name)
            } else {
                None
            };
            continue;
        }

        let Some(name) = current.as_ref() else {
            continue;
        };
        let ids = line
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>().map_err(|_| SunpathError::Parse {
                    line: k + 1,
                    reason: format!("invalid element id {:?}", s),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        sets.entry(name.clone()).or_default().extend(ids);
    }

    Ok(sets)
}

/// Shared vertex table and one open polygon per grain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrainBoundaries {
    pub vertices: Vec<[f64; 2]>,
    /// Mesh node id of each vertex
    pub node_ids: Vec<usize>,
    /// Grain names, in the order of `polygons`
    pub names: Vec<String>,
    /// Indices into `vertices`; the closing edge is implied
    pub polygons: Vec<Vec<usize>>,
}

/// Number `k` of a set named `GRAINk`
fn grain_number(name: &str) -> Option<usize> {
    name.strip_prefix("GRAIN")?.parse().ok()
}

/// Outline every `GRAINk` element set, in increasing `k`
///
/// Vertices are numbered in the order they are first met.
pub fn extract_grain_boundaries(
    nodes: &Nodes,
    elements: &Elements,
    sets: &BTreeMap<String, Vec<usize>>,
) -> Result<GrainBoundaries> {
    let mut grains: Vec<(usize, &String, &Vec<usize>)> = sets
        .iter()
        .filter_map(|(name, ids)| grain_number(name).map(|k| (k, name, ids)))
        .collect();
    grains.sort_by_key(|(k, _, _)| *k);
    if grains.is_empty() {
        return Err(SunpathError::EmptyInput("grain element sets"));
    }

    let mut out = GrainBoundaries::default();
    let mut index_of: HashMap<usize, usize> = HashMap::new();

    for (_, name, element_ids) in grains {
        let node_ids: BTreeSet<usize> = element_ids
            .iter()
            .filter_map(|id| elements.get(id))
            .flatten()
            .copied()
            .collect();
        let node_ids: Vec<usize> = node_ids.into_iter().collect();

        let coords = node_ids
            .iter()
            .map(|id| {
                nodes.get(id).copied().ok_or_else(|| SunpathError::Parse {
                    line: 0,
                    reason: format!("grain {} references unknown node {}", name, id),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if coords.is_empty() {
            tracing::warn!("grain {} has no nodes, skipped", name);
            continue;
        }

        let mut hull = convex_hull(&coords, HullMode::Boundary)?;
        hull.pop();

        let polygon = hull
            .into_iter()
            .map(|local| {
                let node = node_ids[local];
                *index_of.entry(node).or_insert_with(|| {
                    out.vertices.push(coords[local]);
                    out.node_ids.push(node);
                    out.vertices.len() - 1
                })
            })
            .collect();

        out.names.push(name.clone());
        out.polygons.push(polygon);
    }

    tracing::debug!(
        "extracted {} grains sharing {} vertices",
        out.polygons.len(),
        out.vertices.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two unit squares side by side, each split into two triangles
    const NODES: &str = "*Node
        1, 0.0, 0.0
        2, 1.0, 0.0
        3, 2.0, 0.0
        4, 0.0, 1.0
        5, 1.0, 1.0
        6, 2.0, 1.0
    ";
    const ELEMENTS: &str = "*Element, type=CPS3
        1 ,1 ,2 ,5
        2 ,1 ,5 ,4
        3 ,2 ,3 ,6
        4 ,2 ,6 ,5
    ";
    const SETS: &str = "*ELSET, ELSET=GRAIN2
        3, 4,
        *ELSET, ELSET=GRAIN1
        1,
        2,
        *ELSET, ELSET=ALL
        1, 2, 3, 4
    ";

    #[test]
    fn parses_tables() {
        let nodes = parse_nodes(NODES).unwrap();
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[&6], [2.0, 1.0]);

        let elements = parse_elements(ELEMENTS).unwrap();
        assert_eq!(elements[&4], vec![2, 6, 5]);

        let sets = parse_element_sets(SETS).unwrap();
        assert_eq!(sets["GRAIN1"], vec![1, 2]);
        assert_eq!(sets["GRAIN2"], vec![3, 4]);
        assert_eq!(sets.len(), 3);
    }

    #[test]
    fn indented_keywords_are_skipped() {
        let nodes = parse_nodes("  *Node\n1, 0.0, 0.0\n  2, 1.0, 0.5\n").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[&2], [1.0, 0.5]);

        let elements = parse_elements("\t*Element, type=CPS3\n1, 1, 2, 3\n").unwrap();
        assert_eq!(elements[&1], vec![1, 2, 3]);
    }

    #[test]
    fn reports_bad_lines() {
        let err = parse_nodes("1, 0.0, 0.0\n2, x, 1.0\n").unwrap_err();
        assert!(matches!(err, SunpathError::Parse { line: 2, .. }));
        assert!(parse_element_sets("*ELSET\n1, 2\n").is_err());
    }

    #[test]
    fn grains_share_vertices() {
        let nodes = parse_nodes(NODES).unwrap();
        let elements = parse_elements(ELEMENTS).unwrap();
        let sets = parse_element_sets(SETS).unwrap();
        let b = extract_grain_boundaries(&nodes, &elements, &sets).unwrap();

        assert_eq!(b.names, vec!["GRAIN1", "GRAIN2"]);
        assert_eq!(b.vertices.len(), 6);
        // GRAIN1 starts at its first max-x node (node 2) and turns clockwise
        assert_eq!(b.node_ids[..4], [2, 1, 4, 5]);
        assert_eq!(b.polygons[0], vec![0, 1, 2, 3]);
        // GRAIN2 reuses nodes 2 and 5
        let shared: Vec<usize> = b.polygons[1].iter().copied().filter(|&v| v == 0 || v == 3).collect();
        assert_eq!(shared.len(), 2);
        assert_eq!(b.polygons[1].len(), 4);
    }

    #[test]
    fn unknown_nodes_are_errors() {
        let nodes = parse_nodes("1, 0.0, 0.0\n").unwrap();
        let elements = parse_elements("1, 1, 2, 3\n").unwrap();
        let sets = parse_element_sets("*ELSET, ELSET=GRAIN1\n1\n").unwrap();
        assert!(extract_grain_boundaries(&nodes, &elements, &sets).is_err());
    }
}
