use std::collections::{BTreeMap, HashMap, HashSet};

/// Key agreed between a dataset and its region resolver
/// (ISO alpha-3 for the world table, full state name for the US table)
pub type RegionKey = String;

/// One row of a statistics table, column name → raw cell text
pub type RawRow = HashMap<String, String>;

/// The fixed, ascending set of years a dataset covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearAxis {
    years: Vec<i32>,
}

impl YearAxis {
    /// Every year in `first..=last`
    pub fn span(first: i32, last: i32) -> Self {
        let (first, last) = (first.min(last), first.max(last));
        Self {
            years: (first..=last).collect(),
        }
    }

    /// Annual world series, 1961 through 2023
    pub fn annual() -> Self {
        Self::span(1961, 2023)
    }

    /// US decennial census years
    pub fn census() -> Self {
        Self {
            years: vec![1970, 1980, 1990, 2000, 2010],
        }
    }

    pub fn first(&self) -> i32 {
        self.years[0]
    }

    pub fn last(&self) -> i32 {
        self.years[self.years.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    /// Year at `index` on the axis
    pub fn get(&self, index: usize) -> Option<i32> {
        self.years.get(index).copied()
    }

    /// Index of `year` on the axis
    pub fn position(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    /// The next axis year after `year`, saturating at the last one
    pub fn next(&self, year: i32) -> i32 {
        let idx = self.years.partition_point(|&y| y <= year);
        self.years.get(idx).copied().unwrap_or(self.last())
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }
}

/// Per-region statistics, immutable once normalized
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStatRecord {
    pub display_name: String,
    pub values_by_year: BTreeMap<i32, Option<f64>>,
}

impl RegionStatRecord {
    /// Observation for `year`, `None` for a missing cell or unknown year
    pub fn value(&self, year: i32) -> Option<f64> {
        self.values_by_year.get(&year).copied().flatten()
    }
}

/// Normalized table of region statistics
#[derive(Debug, Clone)]
pub struct StatDataset {
    records_by_key: HashMap<RegionKey, RegionStatRecord>,
    axis: YearAxis,
}

impl StatDataset {
    pub fn get(&self, key: &str) -> Option<&RegionStatRecord> {
        self.records_by_key.get(key)
    }

    pub fn value(&self, key: &str, year: i32) -> Option<f64> {
        self.get(key).and_then(|r| r.value(year))
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records_by_key.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records_by_key.len()
    }

    pub fn axis(&self) -> &YearAxis {
        &self.axis
    }
}

/// Column layout of a statistics table
#[derive(Debug, Clone)]
pub struct DatasetSchema {
    pub key_column: &'static str,
    /// Column holding the display name; the key doubles as the name when `None`
    pub name_column: Option<&'static str>,
    pub axis: YearAxis,
}

impl DatasetSchema {
    /// World Bank style table: one row per country, one column per year
    pub fn world() -> Self {
        Self {
            key_column: "Country Code",
            name_column: Some("Country Name"),
            axis: YearAxis::annual(),
        }
    }

    /// US census table keyed by state name
    pub fn us() -> Self {
        Self {
            key_column: "Area Name",
            name_column: None,
            axis: YearAxis::census(),
        }
    }
}

/// Parse one numeric cell. Blank, malformed, or non-finite text is "no value".
pub fn parse_cell(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Build a dataset from raw rows.
///
/// When `valid_keys` is given, rows whose key is not in the set are dropped
/// without notice. Rows with an empty key are always dropped. A later row
/// replaces an earlier one with the same key. Every record gets an entry for
/// every year of the schema's axis.
pub fn normalize<I>(rows: I, schema: &DatasetSchema, valid_keys: Option<&HashSet<String>>) -> StatDataset
where
    I: IntoIterator<Item = RawRow>,
{
    let mut records_by_key = HashMap::new();

    for row in rows {
        let key = match row.get(schema.key_column).map(|k| k.trim()) {
            Some(k) if !k.is_empty() => k,
            _ => continue,
        };
        if valid_keys.is_some_and(|valid| !valid.contains(key)) {
            continue;
        }

        let display_name = schema
            .name_column
            .and_then(|col| row.get(col))
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .unwrap_or(key)
            .to_string();

        let values_by_year = schema
            .axis
            .iter()
            .map(|year| (year, parse_cell(row.get(&year.to_string()).map(String::as_str))))
            .collect();

        records_by_key.insert(
            key.to_string(),
            RegionStatRecord {
                display_name,
                values_by_year,
            },
        );
    }

    StatDataset {
        records_by_key,
        axis: schema.axis.clone(),
    }
}
