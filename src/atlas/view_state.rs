use std::time::{Duration, Instant};

use super::dataset::YearAxis;

pub const PLAY_LABEL: &str = "▶ Play";
pub const PAUSE_LABEL: &str = "⏸ Pause";

/// Input that can move the selected year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// Slider set to an exact year
    SetYear(i32),
    /// Slider nudged by a number of axis steps (negative = backwards)
    Step(i32),
    /// Jump to the first or last axis year
    Home,
    End,
    TogglePlayback(Instant),
    Tick(Instant),
}

/// Emitted whenever the selected year actually changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearChanged {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Playback {
    Idle,
    Playing { next_tick: Instant },
}

/// Selected year plus playback timer for one map
#[derive(Debug, Clone)]
pub struct ViewState {
    axis: YearAxis,
    year: i32,
    playback: Playback,
    interval: Duration,
    playback_enabled: bool,
}

impl ViewState {
    /// Starts at `initial_year`, or the first axis year if that is not on the axis
    pub fn new(axis: YearAxis, initial_year: i32) -> Self {
        let year = if axis.contains(initial_year) {
            initial_year
        } else {
            axis.first()
        };
        Self {
            axis,
            year,
            playback: Playback::Idle,
            interval: Duration::from_millis(1000),
            playback_enabled: false,
        }
    }

    /// Enable timer-driven playback advancing one year per `interval`
    pub fn with_playback(mut self, interval: Duration) -> Self {
        self.playback_enabled = true;
        self.interval = interval;
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn axis(&self) -> &YearAxis {
        &self.axis
    }

    pub fn playback_enabled(&self) -> bool {
        self.playback_enabled
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Playing { .. })
    }

    pub fn play_label(&self) -> &'static str {
        if self.is_playing() { PAUSE_LABEL } else { PLAY_LABEL }
    }

    /// Slider position in [0, 1]
    pub fn progress(&self) -> f64 {
        match (self.axis.position(self.year), self.axis.len()) {
            (Some(idx), len) if len > 1 => idx as f64 / (len - 1) as f64,
            _ => 0.0,
        }
    }

    pub fn dispatch(&mut self, event: ViewEvent) -> Option<YearChanged> {
        match event {
            ViewEvent::SetYear(year) => self.set_year(year),
            ViewEvent::Step(delta) => self.step(delta),
            ViewEvent::Home => self.set_year(self.axis.first()),
            ViewEvent::End => self.set_year(self.axis.last()),
            ViewEvent::TogglePlayback(now) => {
                self.toggle_playback(now);
                None
            }
            ViewEvent::Tick(now) => self.tick(now),
        }
    }

    /// Years that are not on the axis are ignored
    pub fn set_year(&mut self, year: i32) -> Option<YearChanged> {
        if !self.axis.contains(year) || year == self.year {
            return None;
        }
        let from = self.year;
        self.year = year;
        Some(YearChanged { from, to: year })
    }

    /// Move by `delta` axis positions, saturating at either end
    pub fn step(&mut self, delta: i32) -> Option<YearChanged> {
        let idx = self.axis.position(self.year)? as i64;
        let last = self.axis.len() as i64 - 1;
        let target = (idx + i64::from(delta)).clamp(0, last) as usize;
        self.set_year(self.axis.get(target)?)
    }

    /// Returns false when playback is disabled or already running
    pub fn start_playback(&mut self, now: Instant) -> bool {
        if !self.playback_enabled || self.is_playing() {
            return false;
        }
        self.playback = Playback::Playing {
            next_tick: now + self.interval,
        };
        true
    }

    /// The current year stays as the resume point
    pub fn stop_playback(&mut self) {
        self.playback = Playback::Idle;
    }

    pub fn toggle_playback(&mut self, now: Instant) {
        if self.is_playing() {
            self.stop_playback();
        } else {
            self.start_playback(now);
        }
    }

    /// Advance one year if the deadline has passed. A tick at the last
    /// axis year ends playback instead.
    pub fn tick(&mut self, now: Instant) -> Option<YearChanged> {
        let Playback::Playing { next_tick } = self.playback else {
            return None;
        };
        if now < next_tick {
            return None;
        }

        if self.year >= self.axis.last() {
            self.stop_playback();
            return None;
        }

        let scheduled = next_tick + self.interval;
        self.playback = Playback::Playing {
            next_tick: if scheduled > now { scheduled } else { now + self.interval },
        };
        let next = self.axis.next(self.year);
        self.set_year(next)
    }

    /// Time left before the next playback tick is due
    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        match self.playback {
            Playback::Playing { next_tick } => Some(next_tick.saturating_duration_since(now)),
            Playback::Idle => None,
        }
    }
}
