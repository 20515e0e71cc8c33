use crate::atlas::Rgb;
use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_line, fill_rings};
use crate::map::projection::Viewport;

/// A geographic ring (sequence of lon/lat coordinates)
pub type Ring = Vec<(f64, f64)>;

/// One boundary feature: its id plus every ring of every polygon part
#[derive(Clone, Debug)]
pub struct RegionShape {
    pub id: Option<String>,
    pub rings: Vec<Ring>,
    /// (min_lon, min_lat, max_lon, max_lat)
    pub bbox: (f64, f64, f64, f64),
}

impl RegionShape {
    pub fn new(id: Option<String>, rings: Vec<Ring>) -> Self {
        let bbox = rings.iter().flatten().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_lon, min_lat, max_lon, max_lat), &(lon, lat)| {
                (min_lon.min(lon), min_lat.min(lat), max_lon.max(lon), max_lat.max(lat))
            },
        );
        Self { id, rings, bbox }
    }
}

/// Display settings for the region layer
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    /// Carve region outlines out of the fill
    pub show_borders: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { show_borders: true }
    }
}

/// Boundary features of one map, drawn as filled braille regions
pub struct RegionLayer {
    pub regions: Vec<RegionShape>,
    pub settings: DisplaySettings,
}

impl RegionLayer {
    pub fn new(regions: Vec<RegionShape>) -> Self {
        Self {
            regions,
            settings: DisplaySettings::default(),
        }
    }

    /// Feature ids in region order, as fed to the recolor pass
    pub fn feature_ids(&self) -> Vec<Option<String>> {
        self.regions.iter().map(|r| r.id.clone()).collect()
    }

    pub fn id_of(&self, region: usize) -> Option<&str> {
        self.regions.get(region).and_then(|r| r.id.as_deref())
    }

    /// Paint every visible region with its fill; `fills` is indexed like `regions`
    pub fn render(&self, canvas: &mut BrailleCanvas, viewport: &Viewport, fills: &[Rgb]) {
        let (width, height) = canvas.pixel_size();

        for (idx, (region, &fill)) in self.regions.iter().zip(fills).enumerate() {
            let (min_lon, min_lat, max_lon, max_lat) = region.bbox;
            if !min_lon.is_finite() {
                continue;
            }
            // Mercator flips latitude: north is the smaller y
            let top_left = viewport.project_f(min_lon, max_lat);
            let bottom_right = viewport.project_f(max_lon, min_lat);
            if !viewport.bbox_visible(top_left, bottom_right) {
                continue;
            }

            let projected: Vec<Vec<(f64, f64)>> = region
                .rings
                .iter()
                .map(|ring| ring.iter().map(|&(lon, lat)| viewport.project_f(lon, lat)).collect())
                .collect();

            fill_rings(&projected, width, height, |x, y| canvas.paint_pixel(x, y, fill, idx));
        }

        if self.settings.show_borders {
            for region in &self.regions {
                self.carve_outline(canvas, region, viewport);
            }
        }
    }

    /// Clear the pixels along a region's rings so neighbours stay distinguishable
    fn carve_outline(&self, canvas: &mut BrailleCanvas, region: &RegionShape, viewport: &Viewport) {
        for ring in &region.rings {
            if ring.len() < 2 {
                continue;
            }

            let mut prev: Option<(i32, i32)> = None;
            for &(lon, lat) in ring {
                let (px, py) = viewport.project(lon, lat);

                if let Some((prev_x, prev_y)) = prev {
                    let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
                    if dist < viewport.width && segment_might_be_visible(viewport, (prev_x, prev_y), (px, py)) {
                        draw_line(prev_x, prev_y, px, py, |x, y| canvas.clear_pixel_signed(x, y));
                    }
                }

                prev = Some((px, py));
            }
        }
    }

    /// Toggle region outlines
    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }
}

/// Rough bounding box check for a projected segment
fn segment_might_be_visible(viewport: &Viewport, p1: (i32, i32), p2: (i32, i32)) -> bool {
    let min_x = p1.0.min(p2.0);
    let max_x = p1.0.max(p2.0);
    let min_y = p1.1.min(p2.1);
    let max_y = p1.1.max(p2.1);

    max_x >= 0 && min_x < viewport.width as i32 && max_y >= 0 && min_y < viewport.height as i32
}
