use crate::atlas::{Choropleth, MapKind, Rgb, Tooltip, ViewEvent, ViewState, YearChanged};
use crate::braille::BrailleCanvas;
use crate::data::LoadedMap;
use crate::map::{RegionLayer, Viewport};
use crate::ui;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tracing::debug;

/// Upper bound on how long the event loop waits for input (~60fps)
pub const FRAME_TIMEOUT: Duration = Duration::from_millis(16);

/// One map: its data, shapes, selected year, and camera
pub struct MapView {
    pub choropleth: Choropleth,
    pub layer: RegionLayer,
    pub state: ViewState,
    pub viewport: Viewport,
    feature_ids: Vec<Option<String>>,
    fills: Vec<Rgb>,
}

impl MapView {
    pub fn new(loaded: LoadedMap, initial_year: i32, interval: Duration, area: Rect) -> Self {
        let kind = loaded.choropleth.kind();
        let axis = loaded.choropleth.dataset().axis().clone();
        let mut state = ViewState::new(axis, initial_year);
        if kind.supports_playback() {
            state = state.with_playback(interval);
        }

        let layer = RegionLayer::new(loaded.regions);
        let feature_ids = layer.feature_ids();
        let fills = loaded.choropleth.recolor(&feature_ids, state.year());

        Self {
            viewport: Viewport::home(kind, area.width as usize * 2, area.height as usize * 4),
            choropleth: loaded.choropleth,
            layer,
            state,
            feature_ids,
            fills,
        }
    }

    pub fn kind(&self) -> MapKind {
        self.choropleth.kind()
    }

    pub fn year(&self) -> i32 {
        self.state.year()
    }

    pub fn fills(&self) -> &[Rgb] {
        &self.fills
    }

    /// Feed an event to the year state machine, recoloring on change
    pub fn handle(&mut self, event: ViewEvent) -> Option<YearChanged> {
        let change = self.state.dispatch(event)?;
        self.fills = self.choropleth.recolor(&self.feature_ids, change.to);
        debug!(map = ?self.kind(), from = change.from, to = change.to, "year changed");
        Some(change)
    }

    pub fn annotation(&self) -> &'static str {
        self.kind().annotation(self.year())
    }

    pub fn tooltip(&self, region: usize) -> Option<Tooltip> {
        let id = self.layer.id_of(region)?;
        self.choropleth.tooltip(id, self.year())
    }

    pub fn reset_view(&mut self) {
        self.viewport = Viewport::home(self.kind(), self.viewport.width, self.viewport.height);
    }

    fn resize(&mut self, area: Rect) {
        self.viewport.width = area.width as usize * 2;
        self.viewport.height = area.height as usize * 4;
    }
}

/// Application state
pub struct App {
    pub world: MapView,
    pub us: MapView,
    pub active: MapKind,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for hover
    pub mouse_pos: Option<(u16, u16)>,
    /// Screen area of the map inside its border
    pub map_area: Rect,
    /// Screen cells of the year slider line
    pub slider_track: Rect,
    /// Left button went down on the slider and is still held
    pub scrubbing: bool,
    /// Active map rendered at the current size; doubles as the hover hit map
    pub canvas: BrailleCanvas,
    dirty: bool,
}

impl App {
    pub fn new(world: MapView, us: MapView, active: MapKind, width: u16, height: u16) -> Self {
        let mut app = Self {
            world,
            us,
            active,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            map_area: Rect::default(),
            slider_track: Rect::default(),
            scrubbing: false,
            canvas: BrailleCanvas::new(0, 0),
            dirty: true,
        };
        app.resize(width, height);
        app
    }

    pub fn view(&self) -> &MapView {
        match self.active {
            MapKind::World => &self.world,
            MapKind::Us => &self.us,
        }
    }

    fn view_mut(&mut self) -> &mut MapView {
        match self.active {
            MapKind::World => &mut self.world,
            MapKind::Us => &mut self.us,
        }
    }

    /// Update viewport sizes when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_inner_area(Rect::new(0, 0, width, height));
        self.slider_track = ui::slider_track(Rect::new(0, 0, width, height));
        let area = self.map_area;
        self.world.resize(area);
        self.us.resize(area);
        self.dirty = true;
    }

    /// Re-render the active map if anything it depends on changed
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        let mut canvas = BrailleCanvas::new(self.map_area.width as usize, self.map_area.height as usize);
        let view = self.view();
        view.layer.render(&mut canvas, &view.viewport, view.fills());
        self.canvas = canvas;
        self.dirty = false;
    }

    /// Route a year event to the active map
    pub fn dispatch(&mut self, event: ViewEvent) {
        if self.view_mut().handle(event).is_some() {
            self.dirty = true;
        }
    }

    pub fn step_year(&mut self, delta: i32) {
        self.dispatch(ViewEvent::Step(delta));
    }

    pub fn first_year(&mut self) {
        self.dispatch(ViewEvent::Home);
    }

    pub fn last_year(&mut self) {
        self.dispatch(ViewEvent::End);
    }

    pub fn toggle_playback(&mut self, now: Instant) {
        self.dispatch(ViewEvent::TogglePlayback(now));
    }

    /// Drive playback timers; the world map keeps playing while hidden
    pub fn tick(&mut self, now: Instant) {
        let world = self.world.handle(ViewEvent::Tick(now)).is_some();
        let us = self.us.handle(ViewEvent::Tick(now)).is_some();
        let visible = match self.active {
            MapKind::World => world,
            MapKind::Us => us,
        };
        if visible {
            self.dirty = true;
        }
    }

    /// How long the event loop may block before the next frame or playback tick
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        [&self.world, &self.us]
            .iter()
            .filter_map(|view| view.state.until_next_tick(now))
            .fold(FRAME_TIMEOUT, Duration::min)
    }

    pub fn switch_map(&mut self) {
        self.active = self.active.other();
        self.last_mouse = None;
        self.dirty = true;
        debug!(map = ?self.active, "switched map");
    }

    pub fn toggle_borders(&mut self) {
        self.view_mut().layer.toggle_borders();
        self.dirty = true;
    }

    pub fn reset_view(&mut self) {
        self.view_mut().reset_view();
        self.dirty = true;
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.view_mut().viewport.pan(dx, dy);
        self.dirty = true;
    }

    /// Zoom in
    pub fn zoom_in(&mut self) {
        self.view_mut().viewport.zoom_in();
        self.dirty = true;
    }

    /// Zoom out
    pub fn zoom_out(&mut self) {
        self.view_mut().viewport.zoom_out();
        self.dirty = true;
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.screen_to_pixel(col, row) {
            self.view_mut().viewport.zoom_in_at(px, py);
            self.dirty = true;
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.screen_to_pixel(col, row) {
            self.view_mut().viewport.zoom_out_at(px, py);
            self.dirty = true;
        }
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Zoom relative to the map's home view
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.view().viewport.relative_zoom())
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let viewport = &self.view().viewport;
        format!(
            "{:.1}°{}, {:.1}°{}",
            viewport.center_lat.abs(),
            if viewport.center_lat >= 0.0 { "N" } else { "S" },
            viewport.center_lon.abs(),
            if viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Pan by the mouse movement since the last drag event
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // Braille cells are 2x4 pixels
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
        self.scrubbing = false;
    }

    /// A press on the slider line selects the year under it; false elsewhere
    pub fn press_slider(&mut self, col: u16, row: u16) -> bool {
        let track = self.slider_track;
        if row != track.y || col < track.x || col >= track.right() {
            return false;
        }
        self.scrubbing = true;
        self.scrub(col);
        true
    }

    /// Drag along the slider; columns past either end clamp to it
    pub fn scrub(&mut self, col: u16) {
        if let Some(year) = self.slider_year(col) {
            self.dispatch(ViewEvent::SetYear(year));
        }
    }

    fn slider_year(&self, col: u16) -> Option<i32> {
        let track = self.slider_track;
        if track.width == 0 {
            return None;
        }
        let axis = self.view().state.axis();
        let offset = col.saturating_sub(track.x).min(track.width - 1);
        let last = axis.len().saturating_sub(1);
        let idx = if track.width > 1 {
            (offset as f64 / (track.width - 1) as f64 * last as f64).round() as usize
        } else {
            0
        };
        axis.get(idx)
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Map-relative cell under the mouse, if it is over the map
    pub fn hovered_cell(&self) -> Option<(u16, u16)> {
        let (col, row) = self.mouse_pos?;
        let area = self.map_area;
        let inside = col >= area.x && col < area.right() && row >= area.y && row < area.bottom();
        inside.then(|| (col - area.x, row - area.y))
    }

    /// Region painted under the mouse in the last rendered frame
    pub fn hovered_region(&self) -> Option<usize> {
        let (cx, cy) = self.hovered_cell()?;
        self.canvas.region_at(cx as usize, cy as usize)
    }

    pub fn hover_tooltip(&self) -> Option<Tooltip> {
        self.view().tooltip(self.hovered_region()?)
    }

    /// Convert terminal coords to braille pixel coords within the map
    fn screen_to_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        if col < area.x || row < area.y {
            return None;
        }
        Some(((col - area.x) as i32 * 2, (row - area.y) as i32 * 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{normalize, CrosswalkTable, DatasetSchema, RawRow, StateFipsTable};
    use crate::map::RegionShape;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn square(id: &str, lon: f64, lat: f64, size: f64) -> RegionShape {
        RegionShape::new(
            Some(id.to_string()),
            vec![vec![(lon, lat), (lon + size, lat), (lon + size, lat + size), (lon, lat + size)]],
        )
    }

    fn world_map() -> LoadedMap {
        let crosswalk: CrosswalkTable = [(4, "AFG".to_string())].into_iter().collect();
        let rows = vec![row(&[
            ("Country Code", "AFG"),
            ("Country Name", "Afghanistan"),
            ("1961", "-1.5"),
            ("1962", "6.2"),
        ])];
        let dataset = normalize(rows, &DatasetSchema::world(), Some(&crosswalk.key_set()));
        LoadedMap {
            choropleth: Choropleth::new(MapKind::World, dataset, Box::new(crosswalk)),
            regions: vec![square("4", -60.0, -40.0, 120.0)],
        }
    }

    fn us_map() -> LoadedMap {
        let rows = vec![row(&[("Area Name", "Kansas"), ("1970", "66.1"), ("1980", "66.7")])];
        let dataset = normalize(rows, &DatasetSchema::us(), None);
        LoadedMap {
            choropleth: Choropleth::new(MapKind::Us, dataset, Box::new(StateFipsTable)),
            regions: vec![square("20", -102.0, 37.0, 7.0)],
        }
    }

    fn app() -> App {
        let area = ui::map_inner_area(Rect::new(0, 0, 80, 30));
        let interval = Duration::from_millis(100);
        let world = MapView::new(world_map(), 1961, interval, area);
        let us = MapView::new(us_map(), 1970, interval, area);
        App::new(world, us, MapKind::World, 80, 30)
    }

    fn center_of(area: Rect) -> (u16, u16) {
        (area.x + area.width / 2, area.y + area.height / 2)
    }

    #[test]
    fn test_step_year_recolors() {
        let mut app = app();
        let before = app.world.fills()[0];
        app.step_year(1);
        assert_eq!(app.world.year(), 1962);
        assert_ne!(app.world.fills()[0], before);
        assert_eq!(app.world.annotation(), "");
    }

    #[test]
    fn test_switch_map_keeps_each_year() {
        let mut app = app();
        app.step_year(3);
        app.switch_map();
        assert_eq!(app.view().kind(), MapKind::Us);
        app.last_year();
        assert_eq!(app.us.year(), 2010);
        app.switch_map();
        assert_eq!(app.view().year(), 1964);
    }

    #[test]
    fn test_us_map_has_no_playback() {
        let mut app = app();
        app.switch_map();
        app.toggle_playback(Instant::now());
        assert!(!app.us.state.is_playing());
        assert_eq!(app.poll_timeout(Instant::now()), FRAME_TIMEOUT);
    }

    #[test]
    fn test_world_plays_while_hidden() {
        let mut app = app();
        let start = Instant::now();
        app.toggle_playback(start);
        assert!(app.poll_timeout(start) <= Duration::from_millis(16));
        app.switch_map();
        app.tick(start + Duration::from_millis(100));
        assert_eq!(app.world.year(), 1962);
        assert_eq!(app.us.year(), 1970);
    }

    #[test]
    fn test_hover_tooltip() {
        let mut app = app();
        app.refresh();
        let (col, row) = center_of(app.map_area);
        app.set_mouse_pos(col, row);
        let tooltip = app.hover_tooltip().unwrap();
        assert_eq!(tooltip.title, "Country: Afghanistan");
        assert_eq!(tooltip.body, "POG: -1.50%");

        app.set_mouse_pos(0, 0);
        assert_eq!(app.hovered_cell(), None);
        assert_eq!(app.hover_tooltip(), None);
    }

    #[test]
    fn test_zoom_and_reset() {
        let mut app = app();
        let (col, row) = center_of(app.map_area);
        app.zoom_in_at(col, row);
        assert_eq!(app.zoom_level(), "1.5x");
        app.reset_view();
        assert_eq!(app.zoom_level(), "1.0x");
        assert_eq!(app.view().viewport.width, app.map_area.width as usize * 2);
    }

    #[test]
    fn test_slider_press_sets_year() {
        let mut app = app();
        let track = app.slider_track;
        assert!(app.press_slider(track.x + track.width / 2, track.y));
        assert_eq!(app.world.year(), 1992);
        assert!(app.scrubbing);

        app.scrub(track.right() + 20);
        assert_eq!(app.world.year(), 2023);
        app.scrub(0);
        assert_eq!(app.world.year(), 1961);
        app.end_drag();
        assert!(!app.scrubbing);

        assert!(!app.press_slider(track.x, track.y + 5));
        assert_eq!(app.world.year(), 1961);
    }

    #[test]
    fn test_slider_press_on_census_map() {
        let mut app = app();
        app.switch_map();
        let track = app.slider_track;
        assert!(app.press_slider(track.right() - 1, track.y));
        assert_eq!(app.us.year(), 2010);
        assert_eq!(app.world.year(), 1961);
    }

    #[test]
    fn test_drag_pans() {
        let mut app = app();
        app.last_mouse = Some((40, 15));
        app.handle_drag(30, 15);
        assert!(app.view().viewport.center_lon > 0.0);
        app.end_drag();
        assert_eq!(app.last_mouse, None);
    }
}
