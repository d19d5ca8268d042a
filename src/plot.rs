use crate::error::Result;
use crate::global_variables::*;
use crate::grid::{Domain, Field, D};
use image::{ImageFormat, Rgb, RgbImage};
use rayon::prelude::*;
use std::path::Path;

/// Reversed below: the lowest stop is drawn for the largest values.
const COOLWARM_STOPS: [(f64, f64, f64); 5] = [
    (59.0, 76.0, 192.0),   // blue      (0.00)
    (141.0, 176.0, 254.0), // light blue (0.25)
    (221.0, 221.0, 221.0), // grey      (0.50)
    (244.0, 154.0, 123.0), // salmon    (0.75)
    (180.0, 4.0, 38.0),    // red       (1.00)
];

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

const BAR_GAP: u32 = 8;
const BAR_WIDTH: u32 = 24;
const PANEL_GAP: u32 = 12;

/// Symmetric-log normalisation onto `[0, 1]` for the range `[-vmax, vmax]`,
/// linear inside `[-linthresh, linthresh]` (base 10).
pub fn symlog_normalize(value: Float, vmax: Float) -> Float {
    if !(vmax > 0.0) {
        return 0.5;
    }
    let t = 0.5 + 0.5 * symlog(value) / symlog(vmax);
    t.clamp(0.0, 1.0)
}

fn symlog(value: Float) -> Float {
    let linscale = SYMLOG_LINSCALE / (1.0 - 1.0 / 10.0);
    let magnitude = value.abs();
    if magnitude <= SYMLOG_LINTHRESH {
        value * linscale
    } else {
        value.signum() * SYMLOG_LINTHRESH * (linscale + (magnitude / SYMLOG_LINTHRESH).log10())
    }
}

/// Reversed coolwarm: `0` is red, `1` is blue.
pub fn coolwarm_r(t: Float) -> Rgb<u8> {
    let t = 1.0 - t.clamp(0.0, 1.0);
    let seg = t * 4.0;
    let i = (seg as usize).min(3);
    let s = seg - i as f64;
    let (r0, g0, b0) = COOLWARM_STOPS[i];
    let (r1, g1, b1) = COOLWARM_STOPS[i + 1];
    Rgb([
        (r0 + s * (r1 - r0)) as u8,
        (g0 + s * (g1 - g0)) as u8,
        (b0 + s * (b1 - b0)) as u8,
    ])
}

struct Layout {
    panel_width: u32,
    panel_height: u32,
}

impl Layout {
    fn new(domain: &Domain, width: u32) -> Self {
        let panel_width = width.max(1);
        let panel_height =
            (panel_width as Float * domain.ly * PLOT_ASPECT / domain.lx).round() as u32;
        Self {
            panel_width,
            panel_height: panel_height.max(1),
        }
    }

    fn image_width(&self) -> u32 {
        self.panel_width + BAR_GAP + BAR_WIDTH
    }

    fn image_height(&self, panels: u32) -> u32 {
        panels * self.panel_height + panels.saturating_sub(1) * PANEL_GAP
    }

    /// Panel index and row inside it, `None` for the gaps between panels.
    fn panel_row(&self, y: u32) -> Option<(usize, u32)> {
        let stride = self.panel_height + PANEL_GAP;
        let row = y % stride;
        (row < self.panel_height).then(|| ((y / stride) as usize, row))
    }
}

/// Three stacked panels (x-velocity, y-velocity, pressure) with a colorbar
/// each. The box `[lower, upper]` is painted white on every panel.
pub fn render_figure(
    fields: [&Field; 3],
    domain: &Domain,
    lower: [Float; D],
    upper: [Float; D],
    width: u32,
) -> RgbImage {
    let layout = Layout::new(domain, width);
    let image_width = layout.image_width();
    let mut image = RgbImage::from_pixel(image_width, layout.image_height(3), WHITE);
    let vmax = fields.map(|field| field.max_abs());
    let row_length = 3 * image_width as usize;

    image
        .par_chunks_mut(row_length)
        .enumerate()
        .for_each(|(y, row)| {
            let (panel, py) = match layout.panel_row(y as u32) {
                Some(panel_row) => panel_row,
                None => return,
            };
            let field = fields[panel];
            let fy = 1.0 - (py as Float + 0.5) / layout.panel_height as Float;
            let j = ((fy * field.ny as Float) as usize).min(field.ny - 1);
            let position_y = fy * domain.ly;
            for px in 0..layout.panel_width {
                let fx = (px as Float + 0.5) / layout.panel_width as Float;
                let position_x = fx * domain.lx;
                let inside_box = (lower[0]..=upper[0]).contains(&position_x)
                    && (lower[1]..=upper[1]).contains(&position_y)
                    && upper[0] > lower[0]
                    && upper[1] > lower[1];
                let color = if inside_box {
                    WHITE
                } else {
                    let i = ((fx * field.nx as Float) as usize).min(field.nx - 1);
                    coolwarm_r(symlog_normalize(field.get(i, j), vmax[panel]))
                };
                let start = 3 * px as usize;
                row[start..start + 3].copy_from_slice(&color.0);
            }
            let bar_color = coolwarm_r(fy);
            for px in layout.panel_width + BAR_GAP..image_width {
                let start = 3 * px as usize;
                row[start..start + 3].copy_from_slice(&bar_color.0);
            }
        });
    image
}

pub fn save_figure<P>(image: &RgbImage, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    image.save_with_format(path, ImageFormat::Jpeg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::InflowRegion;
    use approx::assert_relative_eq;

    #[test]
    fn symlog_is_odd_and_centered() {
        assert_eq!(symlog_normalize(0.0, 5.0), 0.5);
        assert_eq!(symlog_normalize(5.0, 5.0), 1.0);
        assert_eq!(symlog_normalize(-5.0, 5.0), 0.0);
        for value in [0.01, 0.03, 0.2, 1.7, 4.9] {
            let up = symlog_normalize(value, 5.0);
            let down = symlog_normalize(-value, 5.0);
            assert_relative_eq!(up - 0.5, 0.5 - down, epsilon = 1e-12);
            assert!(up > 0.5);
        }
        assert_eq!(symlog_normalize(3.0, 0.0), 0.5);
    }

    #[test]
    fn symlog_grows_monotonically() {
        let values: Vec<Float> = (0..50).map(|k| -2.5 + 0.1 * k as Float).collect();
        for pair in values.windows(2) {
            assert!(symlog_normalize(pair[0], 2.5) < symlog_normalize(pair[1], 2.5));
        }
    }

    #[test]
    fn colormap_is_reversed() {
        assert_eq!(coolwarm_r(1.0), Rgb([59, 76, 192]));
        assert_eq!(coolwarm_r(0.0), Rgb([180, 4, 38]));
        assert_eq!(coolwarm_r(0.5), Rgb([221, 221, 221]));
    }

    #[test]
    fn overlay_box_is_white_on_every_panel() {
        let domain = Domain::new(16.0, 12.0, 160, 120);
        let region = InflowRegion::new(&domain);
        let u = Field::zeros(161, 120, [0.0, 0.5]);
        let v = Field::zeros(160, 121, [0.5, 0.0]);
        let p = Field::zeros(160, 120, [0.5, 0.5]);
        let image = render_figure(
            [&u, &v, &p],
            &domain,
            region.lower(&domain),
            region.upper(&domain),
            160,
        );
        let panel_height = 480;
        assert_eq!(image.width(), 160 + BAR_GAP + BAR_WIDTH);
        assert_eq!(image.height(), 3 * panel_height + 2 * PANEL_GAP);
        for panel in 0..3 {
            let top = panel * (panel_height + PANEL_GAP);
            assert_eq!(*image.get_pixel(75, top + 240), WHITE);
            assert_eq!(*image.get_pixel(10, top + 10), Rgb([221, 221, 221]));
        }
    }

    #[test]
    fn field_sign_picks_the_palette_end() {
        let domain = Domain::new(2.0, 1.0, 2, 1);
        let mut u = Field::zeros(2, 1, [0.5, 0.5]);
        u.set(0, 0, -1.0);
        u.set(1, 0, 1.0);
        let image = render_figure([&u, &u, &u], &domain, [0.0; D], [0.0; D], 40);
        assert_eq!(*image.get_pixel(5, 10), coolwarm_r(0.0));
        assert_eq!(*image.get_pixel(35, 10), coolwarm_r(1.0));
    }
}
