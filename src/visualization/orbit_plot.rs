//! Static scatter plot of the recorded trajectories as a one-page vector PDF.
//!
//! Figure is 6.4 x 4.8 in. The axes use an equal aspect ratio: the data
//! ranges (plus a 5% margin) are drawn at one common scale and the axes box
//! shrinks to fit, centred in the default subplot area. Gridlines sit at the
//! tick positions underneath the markers.

use std::fs;
use std::path::Path;

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::info;

use crate::error::Result;
use crate::simulation::sampling::Trajectories;

const PAGE_W: f32 = 460.8;
const PAGE_H: f32 = 345.6;

// subplot area as fractions of the page
const AXES_LEFT: f32 = 0.125;
const AXES_RIGHT: f32 = 0.9;
const AXES_BOTTOM: f32 = 0.11;
const AXES_TOP: f32 = 0.88;

const MARGIN: f64 = 0.05;
const MAX_TICKS: usize = 9;
const FONT_SIZE: f32 = 10.0;
const TICK_LEN: f32 = 3.5;
const TICK_PAD: f32 = 3.5;
const LINE_W: f32 = 0.8;

/// Marker colors by body index: yellow, blue, then a fixed cycle.
const PALETTE: [[f32; 3]; 7] = [
    [0.75, 0.75, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.5, 0.0],
    [0.0, 0.75, 0.75],
    [0.75, 0.0, 0.75],
    [0.0, 0.0, 0.0],
];

const FONT: Name<'static> = Name(b"F1");

pub struct PlotStyle {
    pub x_label: String,
    pub y_label: String,
    pub marker_radius: f32, // points
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            x_label: "x-coordinate".into(),
            y_label: "y-coordinate".into(),
            marker_radius: (1.0 / std::f32::consts::PI).sqrt(), // marker area of 1 pt^2
        }
    }
}

/// Data range shown on the axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// Tight bounds of all finite points, `None` when there are none.
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a [f64; 2]>) -> Option<Self> {
        let mut b: Option<Bounds> = None;
        for &[x, y] in points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            b = Some(match b {
                None => Bounds { x_min: x, x_max: x, y_min: y, y_max: y },
                Some(b) => Bounds {
                    x_min: b.x_min.min(x),
                    x_max: b.x_max.max(x),
                    y_min: b.y_min.min(y),
                    y_max: b.y_max.max(y),
                },
            });
        }
        b
    }

    /// Pad each axis by `frac` of its span; a zero span is widened first.
    pub fn padded(self, frac: f64) -> Self {
        let (x_min, x_max) = pad(self.x_min, self.x_max, frac);
        let (y_min, y_max) = pad(self.y_min, self.y_max, frac);
        Bounds { x_min, x_max, y_min, y_max }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

fn pad(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    let (lo, hi) = if hi - lo > 0.0 {
        (lo, hi)
    } else {
        let half = if lo == 0.0 { 0.5 } else { 0.05 * lo.abs() };
        (lo - half, hi + half)
    };
    let m = frac * (hi - lo);
    (lo - m, hi + m)
}

/// Tick spacing of 1, 2, 2.5 or 5 times a power of ten giving at most `max_ticks` intervals.
pub fn tick_step(span: f64, max_ticks: usize) -> f64 {
    let raw = span / max_ticks as f64;
    let mag = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|m| m * mag)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * mag)
}

/// Multiples of `step` inside `[lo, hi]`.
pub fn ticks(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Tick label with just enough decimals for `step`.
pub fn tick_label(value: f64, step: f64) -> String {
    let exp = step.log10().floor();
    let mantissa = step / 10f64.powf(exp);
    let mut decimals = (-exp).max(0.0) as usize;
    if (mantissa - 2.5).abs() < 1e-9 {
        decimals += 1;
    }
    let value = if value.abs() < step * 1e-9 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

/// Approximate Helvetica advance width of `s` at `size`.
fn text_width(s: &str, size: f32) -> f32 {
    let em: f32 = s
        .chars()
        .map(|c| match c {
            '0'..='9' => 0.556,
            '.' | ',' => 0.278,
            '-' => 0.333,
            'i' | 'j' | 'l' => 0.222,
            'f' | 't' | 'r' => 0.3,
            'm' | 'w' => 0.833,
            _ => 0.556,
        })
        .sum();
    em * size
}

/// Maps data coordinates onto the page.
struct Frame {
    bounds: Bounds,
    left: f32,
    bottom: f32,
    width: f32,
    height: f32,
    scale: f64,
}

impl Frame {
    fn equal_aspect(bounds: Bounds) -> Self {
        let area_w = (AXES_RIGHT - AXES_LEFT) * PAGE_W;
        let area_h = (AXES_TOP - AXES_BOTTOM) * PAGE_H;
        let scale = (area_w as f64 / bounds.width()).min(area_h as f64 / bounds.height());
        let width = (bounds.width() * scale) as f32;
        let height = (bounds.height() * scale) as f32;
        Self {
            bounds,
            left: AXES_LEFT * PAGE_W + 0.5 * (area_w - width),
            bottom: AXES_BOTTOM * PAGE_H + 0.5 * (area_h - height),
            width,
            height,
            scale,
        }
    }

    fn px(&self, x: f64) -> f32 {
        self.left + ((x - self.bounds.x_min) * self.scale) as f32
    }

    fn py(&self, y: f64) -> f32 {
        self.bottom + ((y - self.bounds.y_min) * self.scale) as f32
    }
}

fn circle(content: &mut Content, cx: f32, cy: f32, r: f32) {
    let k = 0.552_284_8 * r;
    content.move_to(cx + r, cy);
    content.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
    content.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
    content.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
    content.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
    content.close_path();
}

fn text(content: &mut Content, s: &str, matrix: [f32; 6]) {
    content.begin_text();
    content.set_font(FONT, FONT_SIZE);
    content.set_text_matrix(matrix);
    content.show(Str(s.as_bytes()));
    content.end_text();
}

/// Draw gridlines, frame, ticks, labels and one marker series per track.
fn draw(content: &mut Content, traj: &Trajectories, style: &PlotStyle) {
    let bounds = Bounds::of_points(traj.tracks.iter().flat_map(|t| t.points.iter()))
        .unwrap_or(Bounds { x_min: -1.0, x_max: 1.0, y_min: -1.0, y_max: 1.0 })
        .padded(MARGIN);
    let frame = Frame::equal_aspect(bounds);
    let (left, bottom) = (frame.left, frame.bottom);
    let (right, top) = (left + frame.width, bottom + frame.height);

    let x_step = tick_step(bounds.width(), MAX_TICKS);
    let y_step = tick_step(bounds.height(), MAX_TICKS);
    let x_ticks = ticks(bounds.x_min, bounds.x_max, x_step);
    let y_ticks = ticks(bounds.y_min, bounds.y_max, y_step);

    // gridlines
    content.save_state();
    content.set_stroke_rgb(0.69, 0.69, 0.69);
    content.set_line_width(LINE_W);
    for &x in &x_ticks {
        let p = frame.px(x);
        content.move_to(p, bottom);
        content.line_to(p, top);
    }
    for &y in &y_ticks {
        let p = frame.py(y);
        content.move_to(left, p);
        content.line_to(right, p);
    }
    content.stroke();
    content.restore_state();

    // scatter series
    for (i, track) in traj.tracks.iter().enumerate() {
        let [r, g, b] = PALETTE[i % PALETTE.len()];
        content.set_fill_rgb(r, g, b);
        let mut any = false;
        for &[x, y] in &track.points {
            if x.is_finite() && y.is_finite() {
                circle(content, frame.px(x), frame.py(y), style.marker_radius);
                any = true;
            }
        }
        if any {
            content.fill_nonzero();
        }
    }

    // frame and tick marks
    content.set_stroke_rgb(0.0, 0.0, 0.0);
    content.set_line_width(LINE_W);
    content.rect(left, bottom, frame.width, frame.height);
    for &x in &x_ticks {
        let p = frame.px(x);
        content.move_to(p, bottom);
        content.line_to(p, bottom - TICK_LEN);
    }
    for &y in &y_ticks {
        let p = frame.py(y);
        content.move_to(left, p);
        content.line_to(left - TICK_LEN, p);
    }
    content.stroke();

    // tick labels
    content.set_fill_rgb(0.0, 0.0, 0.0);
    let x_label_base = bottom - TICK_LEN - TICK_PAD - 0.72 * FONT_SIZE;
    for &x in &x_ticks {
        let label = tick_label(x, x_step);
        let w = text_width(&label, FONT_SIZE);
        text(content, &label, [1.0, 0.0, 0.0, 1.0, frame.px(x) - 0.5 * w, x_label_base]);
    }
    let mut widest = 0.0f32;
    for &y in &y_ticks {
        let label = tick_label(y, y_step);
        let w = text_width(&label, FONT_SIZE);
        widest = widest.max(w);
        let x = left - TICK_LEN - TICK_PAD - w;
        text(content, &label, [1.0, 0.0, 0.0, 1.0, x, frame.py(y) - 0.36 * FONT_SIZE]);
    }

    // axis labels, y label rotated a quarter turn
    let w = text_width(&style.x_label, FONT_SIZE);
    let x_mid = left + 0.5 * frame.width;
    text(content, &style.x_label, [1.0, 0.0, 0.0, 1.0, x_mid - 0.5 * w, x_label_base - FONT_SIZE - 4.0]);

    let w = text_width(&style.y_label, FONT_SIZE);
    let y_mid = bottom + 0.5 * frame.height;
    let x = left - TICK_LEN - TICK_PAD - widest - 4.0;
    text(content, &style.y_label, [0.0, 1.0, -1.0, 0.0, x, y_mid - 0.5 * w]);
}

/// Render every track of `traj` into PDF bytes.
pub fn render_orbit_pdf(traj: &Trajectories, style: &PlotStyle) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let font_id = Ref::new(4);
    let content_id = Ref::new(5);
    let info_id = Ref::new(6);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().fonts().pair(FONT, font_id);
    page.finish();

    pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
    pdf.document_info(info_id).title(TextStr("orbit")).producer(TextStr("gravml"));

    let mut content = Content::new();
    draw(&mut content, traj, style);
    pdf.stream(content_id, &content.finish());

    pdf.finish()
}

pub fn save_orbit_plot(path: &Path, traj: &Trajectories, style: &PlotStyle) -> Result<()> {
    let bytes = render_orbit_pdf(traj, style);
    fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), series = traj.tracks.len(), "orbit plot written");
    Ok(())
}
