/// Walk a line with Bresenham's algorithm, calling `plot` for every pixel
pub fn draw_line<F>(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: F)
where
    F: FnMut(i32, i32),
{
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        plot(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Scanline-fill a set of projected rings with the even-odd rule.
///
/// Rings are closed implicitly. Pixel rows are sampled at their centers and
/// only rows in `0..height` / columns in `0..width` are reported, so holes
/// and multi-part regions come out right as long as all of their rings are
/// passed together.
pub fn fill_rings<F>(rings: &[Vec<(f64, f64)>], width: usize, height: usize, mut plot: F)
where
    F: FnMut(usize, usize),
{
    let (min_y, max_y) = rings
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    if !min_y.is_finite() || !max_y.is_finite() || height == 0 || width == 0 {
        return;
    }

    let first_row = min_y.floor().max(0.0) as usize;
    let last_row = (max_y.ceil().min(height as f64 - 1.0)).max(0.0) as usize;
    let mut crossings: Vec<f64> = Vec::new();

    for row in first_row..=last_row {
        let sy = row as f64 + 0.5;
        crossings.clear();

        for ring in rings {
            if ring.len() < 3 {
                continue;
            }
            let mut prev = ring[ring.len() - 1];
            for &point in ring {
                let (x0, y0) = prev;
                let (x1, y1) = point;
                if (y0 <= sy) != (y1 <= sy) {
                    crossings.push(x0 + (sy - y0) / (y1 - y0) * (x1 - x0));
                }
                prev = point;
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0);
            let end = (span[1] - 0.5).floor().min(width as f64 - 1.0);
            if start > end {
                continue;
            }
            for col in start as usize..=end as usize {
                plot(col, row);
            }
        }
    }
}
