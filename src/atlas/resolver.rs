use std::collections::{HashMap, HashSet};

use tracing::warn;

/// Maps a boundary feature id to the key its statistics are stored under.
/// Absence is the only failure mode.
pub trait RegionResolver: Send + Sync {
    fn resolve(&self, feature_id: &str) -> Option<&str>;
}

/// ISO 3166 numeric id → alpha-3 code
#[derive(Debug, Clone, Default)]
pub struct CrosswalkTable {
    numeric_id_to_key: HashMap<i64, String>,
}

impl CrosswalkTable {
    /// Build from the raw JSON object. Keys that are not decimal integers are skipped.
    pub fn from_raw(raw: HashMap<String, String>) -> Self {
        let mut numeric_id_to_key = HashMap::with_capacity(raw.len());
        for (id, key) in raw {
            match id.trim().parse::<i64>() {
                Ok(numeric) => {
                    numeric_id_to_key.insert(numeric, key);
                }
                Err(_) => warn!(id = %id, key = %key, "skipping non-numeric crosswalk id"),
            }
        }
        Self { numeric_id_to_key }
    }

    /// Every region key the crosswalk can produce
    pub fn key_set(&self) -> HashSet<String> {
        self.numeric_id_to_key.values().cloned().collect()
    }

    pub fn get(&self, numeric_id: i64) -> Option<&str> {
        self.numeric_id_to_key.get(&numeric_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.numeric_id_to_key.len()
    }
}

impl FromIterator<(i64, String)> for CrosswalkTable {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        Self {
            numeric_id_to_key: iter.into_iter().collect(),
        }
    }
}

impl RegionResolver for CrosswalkTable {
    fn resolve(&self, feature_id: &str) -> Option<&str> {
        let numeric = feature_id.trim().parse::<i64>().ok()?;
        self.get(numeric)
    }
}

/// Two-digit state FIPS code → state name, sorted by code
const STATE_FIPS: &[(&str, &str)] = &[
    ("01", "Alabama"),
    ("02", "Alaska"),
    ("04", "Arizona"),
    ("05", "Arkansas"),
    ("06", "California"),
    ("08", "Colorado"),
    ("09", "Connecticut"),
    ("10", "Delaware"),
    ("11", "District of Columbia"),
    ("12", "Florida"),
    ("13", "Georgia"),
    ("15", "Hawaii"),
    ("16", "Idaho"),
    ("17", "Illinois"),
    ("18", "Indiana"),
    ("19", "Iowa"),
    ("20", "Kansas"),
    ("21", "Kentucky"),
    ("22", "Louisiana"),
    ("23", "Maine"),
    ("24", "Maryland"),
    ("25", "Massachusetts"),
    ("26", "Michigan"),
    ("27", "Minnesota"),
    ("28", "Mississippi"),
    ("29", "Missouri"),
    ("30", "Montana"),
    ("31", "Nebraska"),
    ("32", "Nevada"),
    ("33", "New Hampshire"),
    ("34", "New Jersey"),
    ("35", "New Mexico"),
    ("36", "New York"),
    ("37", "North Carolina"),
    ("38", "North Dakota"),
    ("39", "Ohio"),
    ("40", "Oklahoma"),
    ("41", "Oregon"),
    ("42", "Pennsylvania"),
    ("44", "Rhode Island"),
    ("45", "South Carolina"),
    ("46", "South Dakota"),
    ("47", "Tennessee"),
    ("48", "Texas"),
    ("49", "Utah"),
    ("50", "Vermont"),
    ("51", "Virginia"),
    ("53", "Washington"),
    ("54", "West Virginia"),
    ("55", "Wisconsin"),
    ("56", "Wyoming"),
];

/// The fixed US state table: 50 states plus the District of Columbia
#[derive(Debug, Clone, Copy, Default)]
pub struct StateFipsTable;

impl StateFipsTable {
    /// Exact two-digit lookup
    pub fn name(&self, code: &str) -> Option<&'static str> {
        STATE_FIPS
            .binary_search_by(|(c, _)| (*c).cmp(code))
            .ok()
            .map(|idx| STATE_FIPS[idx].1)
    }
}

impl RegionResolver for StateFipsTable {
    fn resolve(&self, feature_id: &str) -> Option<&str> {
        self.name(&format!("{:0>2}", feature_id))
    }
}
