use glam::DVec3;

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    fn to_vec3(self) -> DVec3 {
        DVec3::new(self.r as f64, self.g as f64, self.b as f64)
    }

    /// Round each channel and clamp it into 0..=255
    fn from_vec3(v: DVec3) -> Self {
        let v = v.round().clamp(DVec3::ZERO, DVec3::splat(255.0));
        Self::new(v.x as u8, v.y as u8, v.z as u8)
    }
}

/// ColorBrewer RdBu, 11 classes (red → near-white → blue)
const RD_BU: &str = "67001fb2182bd6604df4a582fddbc7f7f7f7d1e5f092c5de4393c32166ac053061";
/// ColorBrewer Blues, 9 classes (near-white → dark blue)
const BLUES: &str = "f7fbffdeebf7c6dbef9ecae16baed64292c62171b508519c08306b";

/// Continuous color ramp through a list of stops using a uniform cubic B-spline.
///
/// The first and last stops are reproduced exactly at t=0 and t=1; inner stops
/// act as spline control points. Input outside [0, 1] is clamped.
#[derive(Debug, Clone)]
pub struct Interpolator {
    stops: Vec<DVec3>,
}

impl Interpolator {
    /// Build from a packed string of 6-digit hex colors
    fn from_scheme(scheme: &str) -> Self {
        let stops = scheme
            .as_bytes()
            .chunks(6)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok())
            .filter_map(Rgb::from_hex)
            .map(Rgb::to_vec3)
            .collect();
        Self { stops }
    }

    pub fn rd_bu() -> Self {
        Self::from_scheme(RD_BU)
    }

    pub fn blues() -> Self {
        Self::from_scheme(BLUES)
    }

    pub fn at(&self, t: f64) -> Rgb {
        match self.stops.len() {
            0 => return Rgb::new(0, 0, 0),
            1 => return Rgb::from_vec3(self.stops[0]),
            _ => {}
        }

        let n = self.stops.len() - 1;
        let (i, t) = if t.is_nan() || t <= 0.0 {
            (0, 0.0)
        } else if t >= 1.0 {
            (n - 1, 1.0)
        } else {
            (((t * n as f64).floor() as usize).min(n - 1), t)
        };

        let v1 = self.stops[i];
        let v2 = self.stops[i + 1];
        let v0 = if i > 0 { self.stops[i - 1] } else { 2.0 * v1 - v2 };
        let v3 = if i < n - 1 { self.stops[i + 2] } else { 2.0 * v2 - v1 };

        Rgb::from_vec3(basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3))
    }
}

#[inline(always)]
fn basis(t1: f64, v0: DVec3, v1: DVec3, v2: DVec3, v3: DVec3) -> DVec3 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// How a data value is normalized before it reaches the interpolator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// low → 0, pivot → 0.5, high → 1, each half linear on its own
    Diverging { low: f64, pivot: f64, high: f64 },
    /// low → 0, high → 1
    Sequential { low: f64, high: f64 },
}

impl Domain {
    /// Normalized position of `value`; not clamped
    pub fn normalize(&self, value: f64) -> f64 {
        match *self {
            Domain::Diverging { low, pivot, high } => {
                let k = if value < pivot {
                    if pivot == low { 0.0 } else { 0.5 / (pivot - low) }
                } else if high == pivot {
                    0.0
                } else {
                    0.5 / (high - pivot)
                };
                0.5 + (value - pivot) * k
            }
            Domain::Sequential { low, high } => {
                if high == low {
                    0.5
                } else {
                    (value - low) / (high - low)
                }
            }
        }
    }

    /// Lowest and highest domain value
    pub fn extent(&self) -> (f64, f64) {
        match *self {
            Domain::Diverging { low, high, .. } => (low, high),
            Domain::Sequential { low, high } => (low, high),
        }
    }
}

/// A fixed value → color scale with a reserved no-data color
#[derive(Debug, Clone)]
pub struct ColorScale {
    domain: Domain,
    interpolator: Interpolator,
    no_data: Rgb,
}

impl ColorScale {
    pub fn new(domain: Domain, interpolator: Interpolator, no_data: Rgb) -> Self {
        Self {
            domain,
            interpolator,
            no_data,
        }
    }

    /// Annual urban growth: diverging RdBu over -2% .. 0% .. 10%
    pub fn urban_growth() -> Self {
        Self::new(
            Domain::Diverging {
                low: -2.0,
                pivot: 0.0,
                high: 10.0,
            },
            Interpolator::rd_bu(),
            Rgb::new(0xee, 0xee, 0xee),
        )
    }

    /// Urban share of population: sequential Blues over 30% .. 100%
    pub fn urban_share() -> Self {
        Self::new(
            Domain::Sequential {
                low: 30.0,
                high: 100.0,
            },
            Interpolator::blues(),
            Rgb::new(0xcc, 0xcc, 0xcc),
        )
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn no_data(&self) -> Rgb {
        self.no_data
    }

    pub fn color(&self, value: f64) -> Rgb {
        if !value.is_finite() {
            return self.no_data;
        }
        self.interpolator.at(self.domain.normalize(value))
    }

    pub fn color_or_no_data(&self, value: Option<f64>) -> Rgb {
        value.map_or(self.no_data, |v| self.color(v))
    }

    /// Evenly spaced colors from the low to the high end of the domain
    pub fn sample(&self, steps: usize) -> Vec<Rgb> {
        let (low, high) = self.domain.extent();
        match steps {
            0 => Vec::new(),
            1 => vec![self.color(low)],
            _ => (0..steps)
                .map(|i| low + (high - low) * i as f64 / (steps - 1) as f64)
                .map(|v| self.color(v))
                .collect(),
        }
    }
}
