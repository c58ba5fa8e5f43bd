use crate::config::ReportConfig;
use crate::error::Result;
use crate::model::TrendMatrix;
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use palette::{FromColor, Lch, Srgb};
use std::path::Path;
use tracing::{info, warn};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([205, 205, 205]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const MARGIN_LEFT: u32 = 80;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 56;
const LEGEND_SWATCH: i64 = 12;
const LEGEND_ROW: i64 = 18;
const MARKER_RADIUS: i64 = 3;
const Y_TICKS: u64 = 5;
/// Side of one font8x8 glyph cell, in pixels.
const GLYPH: i64 = 8;
const TITLE_SCALE: i64 = 2;
const X_LABEL: &str = "Month";
const Y_LABEL: &str = "Number of Commits";

/// Pixel geometry of the plotting area.
struct Frame {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl Frame {
    fn new(width: u32, height: u32) -> Self {
        let legend = (width / 5).min(220);
        Self {
            left: MARGIN_LEFT as i64,
            right: (width - legend) as i64,
            top: MARGIN_TOP as i64,
            bottom: (height - MARGIN_BOTTOM) as i64,
        }
    }

    fn x(&self, index: usize, len: usize) -> i64 {
        if len <= 1 {
            return (self.left + self.right) / 2;
        }
        self.left + (self.right - self.left) * index as i64 / (len as i64 - 1)
    }

    fn y(&self, count: u64, max: u64) -> i64 {
        self.bottom - (self.bottom - self.top) * count as i64 / max.max(1) as i64
    }

    /// Top-left corner of legend row `index`.
    fn legend_row(&self, index: usize) -> (i64, i64) {
        (self.right + 20, self.top + index as i64 * LEGEND_ROW)
    }
}

/// Top of the y axis: the smallest multiple of `Y_TICKS` at or above `max`, so every tick is a
/// whole number of commits.
fn axis_max(max: u64) -> u64 {
    max.max(1).div_ceil(Y_TICKS) * Y_TICKS
}

/// Evenly spread hues, so adjacent series stay distinguishable.
pub fn series_colors(n: usize) -> Vec<Rgb<u8>> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 * 137.508) % 360.0;
            let srgb: Srgb<f32> = Srgb::from_color(Lch::new(55.0f32, 75.0f32, hue));
            let (r, g, b) = srgb.into_components();
            let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb([channel(r), channel(g), channel(b)])
        })
        .collect()
}

/// Draw one line per author across every month and save it as PNG.
pub fn render_trend_chart(matrix: &TrendMatrix, config: &ReportConfig, path: &Path) -> Result<()> {
    if matrix.is_empty() {
        warn!("No data available for visualization");
        return Ok(());
    }

    let image = draw(matrix, &config.graph_title, config.graph_width, config.graph_height);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;

    info!("Generated contribution graph: {}", path.display());
    Ok(())
}

pub fn draw(matrix: &TrendMatrix, title: &str, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let frame = Frame::new(width, height);
    let top = axis_max(matrix.max_count());
    let step = top / Y_TICKS;
    let n_months = matrix.months.len();

    for i in 0..n_months {
        let x = frame.x(i, n_months);
        dashed_line(&mut img, (x, frame.top), (x, frame.bottom), GRID);
    }
    for tick in 1..=Y_TICKS {
        let y = frame.y(step * tick, top);
        dashed_line(&mut img, (frame.left, y), (frame.right, y), GRID);
    }

    line(&mut img, (frame.left, frame.top), (frame.left, frame.bottom), AXIS);
    line(&mut img, (frame.left, frame.bottom), (frame.right, frame.bottom), AXIS);

    let title = fit(title, (width as i64 / (GLYPH * TITLE_SCALE)).max(0) as usize);
    draw_text(&mut img, (width as i64 - text_width(&title, TITLE_SCALE)) / 2, 16, &title, TITLE_SCALE, TEXT);

    // Thin out month labels until neighbours no longer overlap.
    let label_width = matrix.months.iter().map(|m| text_width(m, 1)).max().unwrap_or(0) + GLYPH;
    let spacing = if n_months > 1 { (frame.right - frame.left) / (n_months as i64 - 1) } else { label_width };
    let every = (label_width / spacing.max(1) + 1).max(1) as usize;
    for (i, month) in matrix.months.iter().enumerate() {
        let x = frame.x(i, n_months);
        line(&mut img, (x, frame.bottom), (x, frame.bottom + 5), AXIS);
        if i % every == 0 {
            draw_text(&mut img, x - text_width(month, 1) / 2, frame.bottom + 10, month, 1, TEXT);
        }
    }
    let plot_center = (frame.left + frame.right) / 2;
    draw_text(&mut img, plot_center - text_width(X_LABEL, 1) / 2, frame.bottom + 34, X_LABEL, 1, TEXT);

    for tick in 0..=Y_TICKS {
        let value = (step * tick).to_string();
        let y = frame.y(step * tick, top);
        draw_text(&mut img, frame.left - 8 - text_width(&value, 1), y - GLYPH / 2, &value, 1, TEXT);
    }
    let middle = (frame.top + frame.bottom) / 2;
    draw_text_vertical(&mut img, 8, middle + text_width(Y_LABEL, 1) / 2, Y_LABEL, TEXT);

    let colors = series_colors(matrix.authors.len());
    for (series, color) in matrix.counts.iter().zip(&colors) {
        let points: Vec<(i64, i64)> = series
            .iter()
            .enumerate()
            .map(|(i, &c)| (frame.x(i, n_months), frame.y(c, top)))
            .collect();
        for pair in points.windows(2) {
            thick_line(&mut img, pair[0], pair[1], *color);
        }
        for &(x, y) in &points {
            fill_rect(&mut img, x - MARKER_RADIUS, y - MARKER_RADIUS, x + MARKER_RADIUS, y + MARKER_RADIUS, *color);
        }
    }

    for (i, (author, color)) in matrix.authors.iter().zip(&colors).enumerate() {
        let (x, y) = frame.legend_row(i);
        fill_rect(&mut img, x, y, x + LEGEND_SWATCH, y + LEGEND_SWATCH, *color);
        let name_x = x + LEGEND_SWATCH + 6;
        let room = ((width as i64 - name_x - 4) / GLYPH).max(0) as usize;
        draw_text(&mut img, name_x, y + 2, &fit(author, room), 1, TEXT);
    }

    img
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH * scale
}

/// `text` cut to at most `max_chars` characters, marking the cut with a trailing `.`.
fn fit(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    if max_chars > 0 {
        cut.push('.');
    }
    cut
}

/// Left-to-right text with its top-left corner at `(x, y)`. Each glyph bit becomes a
/// `scale`×`scale` block; bit 0 of a row is its leftmost pixel.
fn draw_text(img: &mut RgbImage, x: i64, y: i64, text: &str, scale: i64, color: Rgb<u8>) {
    for (i, ch) in text.chars().enumerate() {
        let origin = x + i as i64 * GLYPH * scale;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1 << col) != 0 {
                    let px = origin + col * scale;
                    let py = y + row as i64 * scale;
                    fill_rect(img, px, py, px + scale - 1, py + scale - 1, color);
                }
            }
        }
    }
}

/// Text turned a quarter counter-clockwise, reading upwards from the bottom-left corner `(x, y)`.
fn draw_text_vertical(img: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
    for (i, ch) in text.chars().enumerate() {
        let origin = y - i as i64 * GLYPH;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1 << col) != 0 {
                    set(img, x + row as i64, origin - col, color);
                }
            }
        }
    }
}

fn set(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            set(img, x, y, color);
        }
    }
}

/// Bresenham; `keep` decides per step whether the pixel is painted.
fn stroke<F: FnMut(usize) -> bool>(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>, mut keep: F) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut step = 0usize;

    loop {
        if keep(step) {
            set(img, x, y, color);
        }
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

fn line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    stroke(img, from, to, color, |_| true);
}

fn dashed_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    stroke(img, from, to, color, |step| step % 8 < 4);
}

fn thick_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    for offset in -1..=1 {
        stroke(img, (from.0, from.1 + offset), (to.0, to.1 + offset), color, |_| true);
    }
}
