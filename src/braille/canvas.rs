use crate::atlas::Rgb;

/// One terminal cell: 8 braille dots plus the region that last painted it
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Cell {
    pub dots: u8,
    pub color: Option<Rgb>,
    pub region: Option<usize>,
}

impl Cell {
    pub fn glyph(&self) -> char {
        char::from_u32(0x2800 + self.dots as u32).unwrap_or(' ')
    }
}

/// Braille Unicode canvas for filled, colored regions.
/// Each character cell represents a 2x4 pixel grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<Cell>,
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel resolution (width*2, height*4)
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width * 2, self.height * 4)
    }

    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return None;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        Some((cy * self.width + cx, bit))
    }

    /// Set a pixel and hand its cell to `region`, painted `color`
    pub fn paint_pixel(&mut self, x: usize, y: usize, color: Rgb, region: usize) {
        if let Some((idx, bit)) = self.locate(x, y) {
            let cell = &mut self.cells[idx];
            cell.dots |= bit;
            cell.color = Some(color);
            cell.region = Some(region);
        }
    }

    /// Clear a pixel (used to carve borders out of filled regions)
    pub fn clear_pixel(&mut self, x: usize, y: usize) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.cells[idx].dots &= !bit;
        }
    }

    /// Clear a pixel using signed coordinates (ignores negative values)
    pub fn clear_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.clear_pixel(x as usize, y as usize);
        }
    }

    /// Cell at character position
    pub fn cell(&self, cx: usize, cy: usize) -> Option<&Cell> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        self.cells.get(cy * self.width + cx)
    }

    /// Region that last painted the cell at character position
    pub fn region_at(&self, cx: usize, cy: usize) -> Option<usize> {
        self.cell(cx, cy).and_then(|c| c.region)
    }

    /// Iterate one row of cells
    pub fn row(&self, row: usize) -> &[Cell] {
        if row >= self.height {
            return &[];
        }
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    /// Convert the canvas to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height)
            .map(|r| self.row(r).iter().map(Cell::glyph).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.paint_pixel(0, 0, RED, 2);
        assert_eq!(canvas.to_string(), "⠁"); // U+2801
        assert_eq!(canvas.region_at(0, 0), Some(2));
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.paint_pixel(x, y, RED, 0);
            }
        }
        assert_eq!(canvas.to_string(), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn test_last_painter_owns_cell() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.paint_pixel(0, 0, RED, 3);
        canvas.paint_pixel(1, 1, BLUE, 7);

        let cell = canvas.cell(0, 0).unwrap();
        assert_eq!(cell.dots, 0x01 | 0x10);
        assert_eq!(cell.color, Some(BLUE));
        assert_eq!(canvas.region_at(0, 0), Some(7));
        assert_eq!(canvas.region_at(1, 0), None);
        assert_eq!(canvas.region_at(5, 0), None);
    }

    #[test]
    fn test_clear_keeps_owner() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.paint_pixel(0, 0, RED, 1);
        canvas.paint_pixel(1, 0, RED, 1);
        canvas.clear_pixel_signed(0, 0);
        canvas.clear_pixel_signed(-1, 0);

        assert_eq!(canvas.to_string(), "⠈");
        assert_eq!(canvas.region_at(0, 0), Some(1));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.paint_pixel(2, 0, RED, 0);
        canvas.paint_pixel(0, 4, BLUE, 1);
        assert_eq!(canvas.to_string(), "\u{2800}");
        assert!(canvas.row(1).is_empty());
        assert_eq!(canvas.pixel_size(), (2, 4));
    }
}
