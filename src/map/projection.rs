use std::f64::consts::PI;

use crate::atlas::MapKind;

/// Web Mercator breaks down at the poles; clamp before projecting
const MAX_LAT: f64 = 85.05;

/// How far a map may be zoomed relative to its home view
const ZOOM_EXTENT: f64 = 8.0;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Zoom of the home view; zoom stays within home..home*8
    pub home_zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            home_zoom: zoom,
            width,
            height,
        }
    }

    /// Whole world
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    /// Contiguous United States
    pub fn us(width: usize, height: usize) -> Self {
        Self::new(-96.0, 38.5, 5.0, width, height)
    }

    /// Home view for a map
    pub fn home(kind: MapKind, width: usize, height: usize) -> Self {
        match kind {
            MapKind::World => Self::world(width, height),
            MapKind::Us => Self::us(width, height),
        }
    }

    fn min_zoom(&self) -> f64 {
        self.home_zoom
    }

    fn max_zoom(&self) -> f64 {
        self.home_zoom * ZOOM_EXTENT
    }

    /// Zoom relative to the home view (1x..8x)
    pub fn relative_zoom(&self) -> f64 {
        self.zoom / self.home_zoom
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width.max(1) as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        self.center_lat = self.center_lat.clamp(-MAX_LAT, MAX_LAT);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(self.max_zoom());
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(self.min_zoom());
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor, keeping the point under the cursor in place
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom * factor).clamp(self.min_zoom(), self.max_zoom());

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    fn mercator_y(lat: f64) -> f64 {
        let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT) * PI / 180.0;
        (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
    }

    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.scale();
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = Self::mercator_y(self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI;

        (lon, lat)
    }

    /// Project to fractional pixel coordinates
    pub fn project_f(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon + 180.0) / 360.0;
        let y = Self::mercator_y(lat);

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = Self::mercator_y(self.center_lat);
        let scale = self.scale();

        (
            (x - center_x) * scale + self.width as f64 / 2.0,
            (y - center_y) * scale + self.height as f64 / 2.0,
        )
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (px, py) = self.project_f(lon, lat);
        (px as i32, py as i32)
    }

    /// Check if a projected bounding box overlaps the canvas
    pub fn bbox_visible(&self, min: (f64, f64), max: (f64, f64)) -> bool {
        max.0 >= 0.0 && min.0 < self.width as f64 && max.1 >= 0.0 && min.1 < self.height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::world(200, 120);
        let (px, py) = vp.project_f(-74.0, 40.7);
        let (lon, lat) = vp.unproject(px.round() as i32, py.round() as i32);
        assert!((lon - -74.0).abs() < 2.0);
        assert!((lat - 40.7).abs() < 2.0);
    }

    #[test]
    fn test_poles_stay_finite() {
        let vp = Viewport::world(100, 100);
        let (x, y) = vp.project_f(0.0, -90.0);
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_zoom_limits_follow_home() {
        let mut vp = Viewport::us(100, 100);
        for _ in 0..20 {
            vp.zoom_in();
        }
        assert_eq!(vp.relative_zoom(), 8.0);
        for _ in 0..20 {
            vp.zoom_out_at(10, 10);
        }
        assert_eq!(vp.zoom, vp.home_zoom);
    }
}
