use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to parse crosswalk JSON {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("Failed to parse GeoJSON {}: {source}", .path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("Failed to parse TopoJSON {}: {source}", .path.display())]
    TopoJson {
        path: PathBuf,
        #[source]
        source: Box<topojson::Error>,
    },

    #[error("{} has no `{object}` object", .path.display())]
    MissingObject { path: PathBuf, object: String },

    #[error("{} is not a GeoJSON FeatureCollection", .path.display())]
    NotFeatureCollection { path: PathBuf },

    #[error("{} has no `{column}` column", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}
