mod annotations;
mod color;
mod dataset;
mod resolver;
mod view_state;

pub use annotations::annotation_for;
pub use color::{ColorScale, Rgb};
pub use dataset::{normalize, DatasetSchema, RawRow, StatDataset};
pub use resolver::{CrosswalkTable, RegionResolver, StateFipsTable};
pub use view_state::{ViewEvent, ViewState, YearChanged};

use rayon::prelude::*;

/// Which of the two maps a pipeline feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MapKind {
    World,
    Us,
}

impl MapKind {
    pub fn title(self) -> &'static str {
        match self {
            MapKind::World => "Urban Population Growth",
            MapKind::Us => "US Urban Population",
        }
    }

    pub fn legend_title(self) -> &'static str {
        match self {
            MapKind::World => "Urban Population Growth (%)",
            MapKind::Us => "Urban Population (%)",
        }
    }

    pub fn legend_ticks(self) -> &'static [f64] {
        match self {
            MapKind::World => &[-2.0, 0.0, 2.0, 4.0, 6.0, 8.0, 10.0],
            MapKind::Us => &[30.0, 50.0, 75.0, 100.0],
        }
    }

    pub fn schema(self) -> DatasetSchema {
        match self {
            MapKind::World => DatasetSchema::world(),
            MapKind::Us => DatasetSchema::us(),
        }
    }

    pub fn scale(self) -> ColorScale {
        match self {
            MapKind::World => ColorScale::urban_growth(),
            MapKind::Us => ColorScale::urban_share(),
        }
    }

    pub fn supports_playback(self) -> bool {
        matches!(self, MapKind::World)
    }

    /// Annotation text for `year`; only the world map carries notes
    pub fn annotation(self, year: i32) -> &'static str {
        match self {
            MapKind::World => annotation_for(&year.to_string()),
            MapKind::Us => "",
        }
    }

    pub fn other(self) -> Self {
        match self {
            MapKind::World => MapKind::Us,
            MapKind::Us => MapKind::World,
        }
    }
}

/// Hover text for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub body: String,
}

/// Dataset, resolver, and scale joined for one map
pub struct Choropleth {
    kind: MapKind,
    dataset: StatDataset,
    resolver: Box<dyn RegionResolver>,
    scale: ColorScale,
}

impl Choropleth {
    pub fn new(kind: MapKind, dataset: StatDataset, resolver: Box<dyn RegionResolver>) -> Self {
        Self {
            kind,
            dataset,
            resolver,
            scale: kind.scale(),
        }
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    pub fn dataset(&self) -> &StatDataset {
        &self.dataset
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    pub fn resolve(&self, feature_id: &str) -> Option<&str> {
        self.resolver.resolve(feature_id)
    }

    /// Fill for a region key; the no-data color when the key or year has no value
    pub fn color_for(&self, key: &str, year: i32) -> Rgb {
        self.scale.color_or_no_data(self.dataset.value(key, year))
    }

    /// Fill for a boundary feature; unresolved features get the no-data color
    pub fn feature_color(&self, feature_id: Option<&str>, year: i32) -> Rgb {
        feature_id
            .and_then(|id| self.resolve(id))
            .map_or(self.scale.no_data(), |key| self.color_for(key, year))
    }

    /// Recolor every feature for `year`, in feature order
    pub fn recolor<S>(&self, feature_ids: &[Option<S>], year: i32) -> Vec<Rgb>
    where
        S: AsRef<str> + Sync,
    {
        feature_ids
            .par_iter()
            .map(|id| self.feature_color(id.as_ref().map(|s| AsRef::<str>::as_ref(s)), year))
            .collect()
    }

    /// Hover text, or `None` when the feature does not resolve to anything showable
    pub fn tooltip(&self, feature_id: &str, year: i32) -> Option<Tooltip> {
        let key = self.resolve(feature_id)?;
        match self.kind {
            MapKind::World => {
                let record = self.dataset.get(key)?;
                let body = match record.value(year) {
                    Some(v) => format!("POG: {v:.2}%"),
                    None => "POG: No data".to_string(),
                };
                Some(Tooltip {
                    title: format!("Country: {}", record.display_name),
                    body,
                })
            }
            MapKind::Us => {
                let body = match self.dataset.value(key, year) {
                    Some(v) => format!("{year}: {v}%"),
                    None => format!("{year}: N/A"),
                };
                Some(Tooltip {
                    title: key.to_string(),
                    body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn world() -> Choropleth {
        let crosswalk: CrosswalkTable = [(4, "AFG".to_string()), (250, "FRA".to_string()), (276, "DEU".to_string())]
            .into_iter()
            .collect();
        let rows = vec![
            row(&[("Country Code", "AFG"), ("Country Name", "Afghanistan"), ("1995", "3.42"), ("1996", "")]),
            row(&[("Country Code", "FRA"), ("Country Name", "France"), ("1995", "0")]),
        ];
        let dataset = normalize(rows, &DatasetSchema::world(), Some(&crosswalk.key_set()));
        Choropleth::new(MapKind::World, dataset, Box::new(crosswalk))
    }

    fn us() -> Choropleth {
        let rows = vec![row(&[("Area Name", "California"), ("1970", "90.9"), ("1980", "")])];
        let dataset = normalize(rows, &DatasetSchema::us(), None);
        Choropleth::new(MapKind::Us, dataset, Box::new(StateFipsTable))
    }

    #[test]
    fn test_color_for_present_value() {
        let map = world();
        assert_eq!(map.color_for("AFG", 1995), map.scale().color(3.42));
        assert_eq!(map.color_for("FRA", 1995), map.scale().color(0.0));
    }

    #[test]
    fn test_missing_data_is_sentinel() {
        let map = world();
        let no_data = map.scale().no_data();
        assert_eq!(map.color_for("AFG", 1996), no_data);
        assert_eq!(map.color_for("AFG", 1950), no_data);
        assert_eq!(map.color_for("XXX", 1995), no_data);
        // In the crosswalk but absent from the statistics
        assert_eq!(map.feature_color(Some("276"), 1995), no_data);
        assert_eq!(map.feature_color(Some("999"), 1995), no_data);
        assert_eq!(map.feature_color(None, 1995), no_data);
    }

    #[test]
    fn test_feature_color_resolves_padded_ids() {
        let map = world();
        assert_eq!(map.feature_color(Some("004"), 1995), map.color_for("AFG", 1995));

        let map = us();
        assert_eq!(map.feature_color(Some("6"), 1970), map.scale().color(90.9));
    }

    #[test]
    fn test_recolor_keeps_feature_order() {
        let map = world();
        let ids = vec![Some("250"), None, Some("4")];
        let fills = map.recolor(&ids, 1995);
        assert_eq!(
            fills,
            vec![map.color_for("FRA", 1995), map.scale().no_data(), map.color_for("AFG", 1995)]
        );
    }

    #[test]
    fn test_world_tooltip() {
        let map = world();
        assert_eq!(
            map.tooltip("4", 1995),
            Some(Tooltip {
                title: "Country: Afghanistan".into(),
                body: "POG: 3.42%".into(),
            })
        );
        assert_eq!(map.tooltip("4", 1996).map(|t| t.body), Some("POG: No data".into()));
        assert_eq!(map.tooltip("276", 1995), None);
        assert_eq!(map.tooltip("999", 1995), None);
    }

    #[test]
    fn test_us_tooltip() {
        let map = us();
        assert_eq!(
            map.tooltip("06", 1970),
            Some(Tooltip {
                title: "California".into(),
                body: "1970: 90.9%".into(),
            })
        );
        assert_eq!(map.tooltip("6", 1980).map(|t| t.body), Some("1980: N/A".into()));
        assert_eq!(map.tooltip("36", 1970).map(|t| t.title), Some("New York".into()));
        assert_eq!(map.tooltip("72", 1970), None);
    }

    #[test]
    fn test_annotations_only_on_world() {
        assert!(!MapKind::World.annotation(1975).is_empty());
        assert_eq!(MapKind::World.annotation(1976), "");
        assert_eq!(MapKind::Us.annotation(1975), "");
    }

    #[test]
    fn test_crosswalk_from_raw_matches_collected() {
        let raw: HashMap<String, String> = HashMap::from([("4".to_string(), "AFG".to_string())]);
        assert_eq!(CrosswalkTable::from_raw(raw).resolve("4"), Some("AFG"));
    }
}
