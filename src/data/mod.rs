mod error;

pub use error::LoadError;

use crate::atlas::{normalize, Choropleth, CrosswalkTable, MapKind, RawRow, StateFipsTable};
use crate::map::{RegionShape, Ring};
use csv::ReaderBuilder;
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use topojson::TopoJson;
use tracing::{debug, info};

/// Files feeding one map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSources {
    World {
        boundaries: PathBuf,
        /// Topology object holding the country features
        object: String,
        stats: PathBuf,
        crosswalk: PathBuf,
    },
    Us {
        boundaries: PathBuf,
        object: String,
        stats: PathBuf,
    },
}

impl MapSources {
    pub fn kind(&self) -> MapKind {
        match self {
            MapSources::World { .. } => MapKind::World,
            MapSources::Us { .. } => MapKind::Us,
        }
    }
}

/// Everything a map needs after initialization
pub struct LoadedMap {
    pub choropleth: Choropleth,
    pub regions: Vec<RegionShape>,
}

/// Load all of a map's inputs in parallel and join them.
///
/// Returns only once every input has loaded; the first failure fails the
/// whole map.
pub fn load_map(sources: &MapSources) -> Result<LoadedMap, LoadError> {
    let kind = sources.kind();
    let schema = kind.schema();

    let (regions, choropleth) = match sources {
        MapSources::World {
            boundaries,
            object,
            stats,
            crosswalk,
        } => {
            let (regions, (rows, crosswalk)) = rayon::join(
                || load_boundaries(boundaries, object),
                || {
                    rayon::join(
                        || load_stat_rows(stats, schema.key_column),
                        || load_crosswalk(crosswalk),
                    )
                },
            );
            let (regions, rows, crosswalk) = (regions?, rows?, crosswalk?);
            let row_count = rows.len();
            let dataset = normalize(rows, &schema, Some(&crosswalk.key_set()));
            info!(
                rows = row_count,
                kept = dataset.len(),
                crosswalk = crosswalk.len(),
                "normalized world statistics"
            );
            (regions, Choropleth::new(kind, dataset, Box::new(crosswalk)))
        }
        MapSources::Us {
            boundaries,
            object,
            stats,
        } => {
            let (regions, rows) = rayon::join(
                || load_boundaries(boundaries, object),
                || load_stat_rows(stats, schema.key_column),
            );
            let (regions, rows) = (regions?, rows?);
            let dataset = normalize(rows, &schema, None);
            info!(states = dataset.len(), "normalized US statistics");
            (regions, Choropleth::new(kind, dataset, Box::new(StateFipsTable)))
        }
    };

    let unresolved = regions
        .iter()
        .filter(|r| r.id.as_deref().and_then(|id| choropleth.resolve(id)).is_none())
        .count();
    info!(map = ?kind, features = regions.len(), unresolved, "loaded boundaries");

    Ok(LoadedMap { choropleth, regions })
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a statistics table into raw rows, one column name → cell map per row
pub fn load_stat_rows(path: &Path, key_column: &str) -> Result<Vec<RawRow>, LoadError> {
    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error(path))?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if !headers.iter().any(|h| h == key_column) {
        return Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: key_column.to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "read statistics table");
    Ok(rows)
}

/// Read the numeric id → alpha-3 crosswalk object
pub fn load_crosswalk(path: &Path) -> Result<CrosswalkTable, LoadError> {
    let mut bytes = fs::read(path).map_err(io_error(path))?;
    let raw: HashMap<String, String> =
        simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(CrosswalkTable::from_raw(raw))
}

/// Read boundary features from the `object` collection of a TopoJSON
/// topology, or from a plain GeoJSON FeatureCollection
pub fn load_boundaries(path: &Path, object: &str) -> Result<Vec<RegionShape>, LoadError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let fc = if is_topology(&content) {
        topology_features(path, &content, object)?
    } else {
        geojson_features(path, &content)?
    };

    let regions = fc
        .features
        .iter()
        .map(|feature| {
            let mut rings = Vec::new();
            if let Some(ref geometry) = feature.geometry {
                collect_rings(geometry, &mut rings);
            }
            RegionShape::new(feature_id(feature), rings)
        })
        .collect();

    Ok(regions)
}

#[derive(Deserialize)]
struct TypeTag {
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn is_topology(content: &str) -> bool {
    serde_json::from_str::<TypeTag>(content).is_ok_and(|tag| tag.kind.as_deref() == Some("Topology"))
}

fn topology_features(path: &Path, content: &str, object: &str) -> Result<FeatureCollection, LoadError> {
    let topo_error = |source: topojson::Error| LoadError::TopoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    };

    let TopoJson::Topology(topology) = content.parse::<TopoJson>().map_err(topo_error)? else {
        return Err(LoadError::NotFeatureCollection {
            path: path.to_path_buf(),
        });
    };

    if !topology.list_names().iter().any(|name| name == object) {
        return Err(LoadError::MissingObject {
            path: path.to_path_buf(),
            object: object.to_string(),
        });
    }

    debug!(path = %path.display(), object, "decoding topology");
    topojson::to_geojson(&topology, object).map_err(topo_error)
}

fn geojson_features(path: &Path, content: &str) -> Result<FeatureCollection, LoadError> {
    let geojson: GeoJson = content.parse().map_err(|source| LoadError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(LoadError::NotFeatureCollection {
            path: path.to_path_buf(),
        }),
    }
}

/// Integral numbers lose any `.0` so `4.0` resolves like `4`
fn numeric_id(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Top-level `id`, falling back to an `id` property
fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(numeric_id(n)),
        None => match feature.property("id")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(numeric_id(n)),
            _ => None,
        },
    }
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

/// Gather every polygon ring (outer and holes); lines and points are ignored
fn collect_rings(geometry: &Geometry, rings: &mut Vec<Ring>) {
    match &geometry.value {
        Value::Polygon(polygon) => {
            rings.extend(polygon.iter().map(|ring| to_ring(ring)));
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                rings.extend(polygon.iter().map(|ring| to_ring(ring)));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_rings(g, rings);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, TempDir};

    const WORLD_CSV: &str = "\
Country Name,Country Code,1961,1962,2023
Afghanistan,AFG,5.1,,3.42
World,WLD,2.9,2.8,1.9
France,FRA,N/A,1.2,0.7
";

    const CROSSWALK: &str = r#"{"4": "AFG", "250": "FRA", "276": "DEU", "n/a": "XXX"}"#;

    const COUNTRIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "004", "properties": {"name": "Afghanistan"},
     "geometry": {"type": "Polygon", "coordinates": [[[60,29],[75,29],[75,38],[60,38],[60,29]]]}},
    {"type": "Feature", "id": 250, "properties": {},
     "geometry": {"type": "MultiPolygon", "coordinates": [
        [[[-5,42],[8,42],[8,51],[-5,51],[-5,42]]],
        [[[8.5,41],[9.5,41],[9.5,43],[8.5,43],[8.5,41]]]
     ]}},
    {"type": "Feature", "properties": {"id": "010"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,-80],[10,-80],[10,-70],[0,-80]]]}},
    {"type": "Feature", "properties": {},
     "geometry": {"type": "Point", "coordinates": [0, 0]}}
  ]
}"#;

    const US_CSV: &str = "\
Area Name,1970,1980,1990,2000,2010
California,90.9,91.3,92.6,94.4,95.0
Vermont,32.2,33.8,32.2,38.2,38.9
";

    const STATES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "06", "properties": {},
     "geometry": {"type": "Polygon", "coordinates": [[[-124,32],[-114,32],[-114,42],[-124,42],[-124,32]]]}},
    {"type": "Feature", "id": "72", "properties": {},
     "geometry": {"type": "Polygon", "coordinates": [[[-67,17],[-65,17],[-65,18.5],[-67,18.5],[-67,17]]]}}
  ]
}"#;

    // Quantized topology: arcs are delta-encoded under the transform
    const STATES_TOPOLOGY: &str = r#"{
  "type": "Topology",
  "transform": {"scale": [1, 1], "translate": [0, 0]},
  "objects": {
    "states": {
      "type": "GeometryCollection",
      "geometries": [
        {"type": "Polygon", "id": "06", "properties": {"name": "California"}, "arcs": [[0]]},
        {"type": "MultiPolygon", "id": "72", "properties": {"name": "Puerto Rico"}, "arcs": [[[1]]]}
      ]
    }
  },
  "arcs": [
    [[-124, 32], [10, 0], [0, 10], [-10, 0], [0, -10]],
    [[-67, 17], [2, 0], [0, 1], [-2, 0], [0, -1]]
  ]
}"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn world_sources(dir: &TempDir) -> MapSources {
        MapSources::World {
            boundaries: write(dir, "countries.geojson", COUNTRIES),
            object: "countries".to_string(),
            stats: write(dir, "growth.csv", WORLD_CSV),
            crosswalk: write(dir, "crosswalk.json", CROSSWALK),
        }
    }

    #[test]
    fn test_load_stat_rows() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "growth.csv", WORLD_CSV);
        let rows = load_stat_rows(&path, "Country Code").unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Country Code"], "AFG");
        assert_eq!(rows[0]["1962"], "");
        assert_eq!(rows[2]["1961"], "N/A");
    }

    #[test]
    fn test_missing_key_column() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "growth.csv", WORLD_CSV);
        let err = load_stat_rows(&path, "Area Name").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "Area Name"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = load_stat_rows(&path, "Area Name").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn test_load_crosswalk_skips_bad_ids() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "crosswalk.json", CROSSWALK);
        let table = load_crosswalk(&path).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(250), Some("FRA"));
        assert!(!table.key_set().contains("XXX"));
    }

    #[test]
    fn test_bad_crosswalk_json() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "crosswalk.json", "{not json");
        assert!(matches!(load_crosswalk(&path), Err(LoadError::Json { .. })));
    }

    #[test]
    fn test_load_boundaries() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "countries.geojson", COUNTRIES);
        let regions = load_boundaries(&path, "countries").unwrap();

        assert_eq!(regions.len(), 4);
        assert_eq!(regions[0].id.as_deref(), Some("004"));
        assert_eq!(regions[1].id.as_deref(), Some("250"));
        assert_eq!(regions[1].rings.len(), 2);
        assert_eq!(regions[2].id.as_deref(), Some("010"));
        assert_eq!(regions[3].id, None);
        assert!(regions[3].rings.is_empty());
        assert_eq!(regions[0].bbox, (60.0, 29.0, 75.0, 38.0));
    }

    #[test]
    fn test_boundaries_must_be_collection() {
        let dir = tempdir().unwrap();
        let path = write(
            &dir,
            "point.geojson",
            r#"{"type": "Point", "coordinates": [0, 0]}"#,
        );
        assert!(matches!(
            load_boundaries(&path, "countries"),
            Err(LoadError::NotFeatureCollection { .. })
        ));
    }

    #[test]
    fn test_load_boundaries_from_topology() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "states-10m.json", STATES_TOPOLOGY);
        let regions = load_boundaries(&path, "states").unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id.as_deref(), Some("06"));
        assert_eq!(regions[0].bbox, (-124.0, 32.0, -114.0, 42.0));
        assert_eq!(regions[1].id.as_deref(), Some("72"));
        assert_eq!(regions[1].rings.len(), 1);
    }

    #[test]
    fn test_topology_without_named_object() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "states-10m.json", STATES_TOPOLOGY);
        let err = load_boundaries(&path, "counties").unwrap_err();
        assert!(matches!(err, LoadError::MissingObject { ref object, .. } if object == "counties"));
        assert!(err.to_string().contains("counties"));
    }

    #[test]
    fn test_integral_float_ids_are_normalized() {
        let dir = tempdir().unwrap();
        let path = write(
            &dir,
            "ids.geojson",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "id": 4.0, "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {"id": 250.0}, "geometry": null},
                {"type": "Feature", "id": 4.5, "properties": {}, "geometry": null}
            ]}"#,
        );
        let ids: Vec<Option<String>> = load_boundaries(&path, "countries")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![Some("4".to_string()), Some("250".to_string()), Some("4.5".to_string())]);
    }

    #[test]
    fn test_load_world_map() {
        let dir = tempdir().unwrap();
        let loaded = load_map(&world_sources(&dir)).unwrap();
        let map = &loaded.choropleth;

        assert_eq!(map.kind(), MapKind::World);
        // WLD is not in the crosswalk
        assert_eq!(map.dataset().len(), 2);
        assert!(map.dataset().keys().all(|k| k == "AFG" || k == "FRA"));
        assert_eq!(map.dataset().value("AFG", 2023), Some(3.42));
        assert_eq!(map.feature_color(Some("004"), 1961), map.scale().color(5.1));
        assert_eq!(map.feature_color(Some("010"), 1961), map.scale().no_data());
        assert_eq!(loaded.regions.len(), 4);
    }

    #[test]
    fn test_load_us_map() {
        let dir = tempdir().unwrap();
        let sources = MapSources::Us {
            boundaries: write(&dir, "states.geojson", STATES),
            object: "states".to_string(),
            stats: write(&dir, "urban.csv", US_CSV),
        };
        let loaded = load_map(&sources).unwrap();
        let map = &loaded.choropleth;

        assert_eq!(map.kind(), MapKind::Us);
        assert_eq!(map.dataset().value("Vermont", 1990), Some(32.2));
        assert_eq!(map.feature_color(Some("06"), 2010), map.scale().color(95.0));
        assert_eq!(map.feature_color(Some("72"), 2010), map.scale().no_data());
    }

    #[test]
    fn test_load_us_map_from_topology() {
        let dir = tempdir().unwrap();
        let sources = MapSources::Us {
            boundaries: write(&dir, "states-10m.json", STATES_TOPOLOGY),
            object: "states".to_string(),
            stats: write(&dir, "urban.csv", US_CSV),
        };
        let loaded = load_map(&sources).unwrap();
        let map = &loaded.choropleth;

        let fills = map.recolor(&[Some("06"), Some("72")], 1970);
        assert_eq!(fills, vec![map.scale().color(90.9), map.scale().no_data()]);
        assert_eq!(loaded.regions.len(), 2);
    }

    #[test]
    fn test_one_failed_input_fails_the_map() {
        let dir = tempdir().unwrap();
        let sources = MapSources::World {
            boundaries: write(&dir, "countries.geojson", COUNTRIES),
            object: "countries".to_string(),
            stats: write(&dir, "growth.csv", WORLD_CSV),
            crosswalk: dir.path().join("missing.json"),
        };
        assert!(matches!(load_map(&sources), Err(LoadError::Io { .. })));
    }
}
