use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

pub use tiny_skia::Rect;

use crate::error::Error;

/// Angular slice width used to approximate sweep gradients.
const GRADIENT_SLICE_DEG: f32 = 4.0;
/// Extra sweep added to every slice so antialiased seams stay covered.
const GRADIENT_SLICE_OVERLAP_DEG: f32 = 1.0;

/// A canvas backed by a tiny-skia Pixmap.
/// Stores pixels in straight RGBA order, premultiplied by tiny-skia.
pub struct Canvas {
    pub(crate) pixmap: Pixmap,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: Pixmap::new(width, height).expect("invalid canvas dimensions"),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fills the entire canvas with a color.
    pub fn fill(&mut self, color: Rgba) {
        self.pixmap.fill(color.into());
    }

    /// Strokes an elliptical arc spanning `sweep_deg` degrees clockwise from
    /// `start_deg`. Sweeps of 360 degrees or more stroke the whole oval.
    pub fn stroke_arc(
        &mut self,
        rect: Rect,
        start_deg: f32,
        sweep_deg: f32,
        width: f32,
        cap: StrokeCap,
        color: Rgba,
    ) {
        let path = match arc_path(rect, start_deg, sweep_deg) {
            Some(p) => p,
            None => return,
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            line_cap: cap.to_line_cap(),
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Strokes an arc colored by a sweep gradient. The gradient is
    /// approximated with short butt-capped slices, each solid-colored by the
    /// slice midpoint angle; rounded ends are emulated with filled disks in
    /// the end-stop colors.
    pub fn stroke_arc_gradient(
        &mut self,
        rect: Rect,
        start_deg: f32,
        sweep_deg: f32,
        width: f32,
        rounded: bool,
        gradient: &SweepGradient,
    ) {
        if sweep_deg == 0.0 || !sweep_deg.is_finite() {
            return;
        }
        let sweep = sweep_deg.clamp(-360.0, 360.0);
        let slices = (sweep.abs() / GRADIENT_SLICE_DEG).ceil().max(1.0) as u32;
        let step = sweep / slices as f32;
        for i in 0..slices {
            let a0 = start_deg + step * i as f32;
            let color = gradient.color_at(turn_fraction(a0 + step / 2.0));
            let mut span = step;
            if i + 1 < slices {
                span += step.signum() * GRADIENT_SLICE_OVERLAP_DEG;
            }
            self.stroke_arc(rect, a0, span, width, StrokeCap::Butt, color);
        }
        if rounded && sweep.abs() < 360.0 {
            let r = width / 2.0;
            let (sx, sy) = point_on_oval(rect, start_deg);
            let (ex, ey) = point_on_oval(rect, start_deg + sweep);
            self.fill_circle(sx, sy, r, gradient.color_at(turn_fraction(start_deg)));
            self.fill_circle(ex, ey, r, gradient.color_at(turn_fraction(start_deg + sweep)));
        }
    }

    /// Strokes a full oval outline.
    pub fn stroke_oval(&mut self, rect: Rect, width: f32, color: Rgba) {
        let path = match PathBuilder::from_oval(rect) {
            Some(p) => p,
            None => return,
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Fills a circle with a color.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        let path = match PathBuilder::from_circle(cx, cy, radius) {
            Some(p) => p,
            None => return,
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Strokes a circle outline.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, width: f32, color: Rgba) {
        let path = match PathBuilder::from_circle(cx, cy, radius) {
            Some(p) => p,
            None => return,
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Returns the raw premultiplied RGBA pixel data.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Writes the canvas to a PNG file.
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Error> {
        self.pixmap
            .save_png(path)
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
    }
}

/// Builds an arc path over the oval inscribed in `rect`, as cubic segments of
/// at most a quarter turn each. Angles are degrees, clockwise from 3 o'clock.
fn arc_path(rect: Rect, start_deg: f32, sweep_deg: f32) -> Option<tiny_skia::Path> {
    if sweep_deg == 0.0 || !sweep_deg.is_finite() || !start_deg.is_finite() {
        return None;
    }
    if sweep_deg.abs() >= 360.0 {
        return PathBuilder::from_oval(rect);
    }
    let cx = rect.left() + rect.width() / 2.0;
    let cy = rect.top() + rect.height() / 2.0;
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;

    let segments = (sweep_deg.abs() / 90.0).ceil().max(1.0) as u32;
    let step = (sweep_deg / segments as f32).to_radians();
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let mut angle = start_deg.to_radians();
    let (sin, cos) = angle.sin_cos();
    let mut pb = PathBuilder::new();
    pb.move_to(cx + rx * cos, cy + ry * sin);
    for _ in 0..segments {
        let next = angle + step;
        let (sin0, cos0) = angle.sin_cos();
        let (sin1, cos1) = next.sin_cos();
        pb.cubic_to(
            cx + rx * (cos0 - k * sin0),
            cy + ry * (sin0 + k * cos0),
            cx + rx * (cos1 + k * sin1),
            cy + ry * (sin1 - k * cos1),
            cx + rx * cos1,
            cy + ry * sin1,
        );
        angle = next;
    }
    pb.finish()
}

/// Point on the oval inscribed in `rect` at the given angle.
fn point_on_oval(rect: Rect, angle_deg: f32) -> (f32, f32) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    (
        rect.left() + rect.width() / 2.0 * (1.0 + cos),
        rect.top() + rect.height() / 2.0 * (1.0 + sin),
    )
}

/// Maps an angle in degrees to its fraction of a full turn, in `[0, 1)`.
pub(crate) fn turn_fraction(angle_deg: f32) -> f32 {
    angle_deg.rem_euclid(360.0) / 360.0
}

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a,
        }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: 255,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self {
            a,
            ..self
        }
    }

    /// Component-wise linear interpolation towards `to`.
    pub fn lerp(self, to: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::new(
            mix(self.r, to.r),
            mix(self.g, to.g),
            mix(self.b, to.b),
            mix(self.a, to.a),
        )
    }
}

impl From<Rgba> for tiny_skia::Color {
    fn from(c: Rgba) -> Self {
        tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

/// Convenience function to create an RGB color.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    Rgba::rgb(r, g, b)
}

/// How stroked arc ends are finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    Butt,
    Round,
}

impl StrokeCap {
    fn to_line_cap(self) -> LineCap {
        match self {
            StrokeCap::Butt => LineCap::Butt,
            StrokeCap::Round => LineCap::Round,
        }
    }
}

/// Angular gradient anchored at a center point. Stops are laid out over one
/// full clockwise turn starting at the 3 o'clock axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGradient {
    pub(crate) colors: Vec<Rgba>,
    pub(crate) positions: Vec<f32>,
    pub(crate) cx: f32,
    pub(crate) cy: f32,
}

impl SweepGradient {
    pub(crate) fn new(colors: Vec<Rgba>, positions: Vec<f32>, cx: f32, cy: f32) -> Self {
        Self {
            colors,
            positions,
            cx,
            cy,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.cx, self.cy)
    }

    /// Samples the gradient at a fraction of the full turn. Fractions outside
    /// the stop range clamp to the first or last color.
    pub fn color_at(&self, fraction: f32) -> Rgba {
        let f = fraction.clamp(0.0, 1.0);
        let (first, rest) = match self.colors.split_first() {
            Some(split) => split,
            None => return Rgba::default(),
        };
        if rest.is_empty() || f <= self.positions[0] {
            return *first;
        }
        for i in 1..self.colors.len() {
            if f <= self.positions[i] {
                let span = self.positions[i] - self.positions[i - 1];
                let t = if span > 0.0 {
                    (f - self.positions[i - 1]) / span
                } else {
                    1.0
                };
                return self.colors[i - 1].lerp(self.colors[i], t);
            }
        }
        self.colors[self.colors.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_path_quarter_turn_bounds() {
        let rect = Rect::from_xywh(0.0, 0.0, 100.0, 100.0).unwrap();
        let path = arc_path(rect, 0.0, 90.0).unwrap();
        let b = path.bounds();
        assert!((b.left() - 50.0).abs() < 0.5);
        assert!((b.top() - 50.0).abs() < 0.5);
        assert!((b.right() - 100.0).abs() < 0.5);
        assert!((b.bottom() - 100.0).abs() < 0.5);
    }

    #[test]
    fn arc_path_closes_to_oval_past_full_turn() {
        let rect = Rect::from_xywh(10.0, 10.0, 80.0, 80.0).unwrap();
        let path = arc_path(rect, 270.0, 400.0).unwrap();
        let b = path.bounds();
        assert!((b.left() - 10.0).abs() < 0.5);
        assert!((b.right() - 90.0).abs() < 0.5);
    }

    #[test]
    fn arc_path_rejects_zero_sweep() {
        let rect = Rect::from_xywh(0.0, 0.0, 50.0, 50.0).unwrap();
        assert!(arc_path(rect, 0.0, 0.0).is_none());
    }

    #[test]
    fn turn_fraction_wraps_negative_angles() {
        assert!((turn_fraction(270.0) - 0.75).abs() < 1e-6);
        assert!((turn_fraction(-90.0) - 0.75).abs() < 1e-6);
        assert!((turn_fraction(450.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn gradient_samples_between_stops() {
        let g = SweepGradient::new(
            vec![Rgba::rgb(0, 0, 0), Rgba::rgb(255, 255, 255)],
            vec![0.0, 1.0],
            0.0,
            0.0,
        );
        assert_eq!(g.color_at(0.0), Rgba::rgb(0, 0, 0));
        assert_eq!(g.color_at(1.0), Rgba::rgb(255, 255, 255));
        assert_eq!(g.color_at(0.5), Rgba::rgb(128, 128, 128));
    }

    #[test]
    fn gradient_clamps_outside_stop_range() {
        let g = SweepGradient::new(
            vec![Rgba::rgb(10, 0, 0), Rgba::rgb(0, 10, 0)],
            vec![0.25, 0.5],
            0.0,
            0.0,
        );
        assert_eq!(g.color_at(0.0), Rgba::rgb(10, 0, 0));
        assert_eq!(g.color_at(0.9), Rgba::rgb(0, 10, 0));
    }

    #[test]
    fn fill_circle_covers_center_pixel() {
        let mut canvas = Canvas::new(20, 20);
        canvas.fill(rgb(255, 255, 255));
        canvas.fill_circle(10.0, 10.0, 5.0, rgb(255, 0, 0));
        let px = canvas.pixmap.pixel(10, 10).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 0, 0));
    }

    #[test]
    fn stroke_arc_hits_ring_band() {
        let mut canvas = Canvas::new(100, 100);
        let rect = Rect::from_xywh(10.0, 10.0, 80.0, 80.0).unwrap();
        canvas.stroke_arc(rect, 0.0, 360.0, 10.0, StrokeCap::Butt, rgb(0, 0, 255));
        // Top of the ring sits at y = 10 for center column x = 50.
        let on_band = canvas.pixmap.pixel(50, 10).unwrap();
        assert!(on_band.alpha() > 0);
        let center = canvas.pixmap.pixel(50, 50).unwrap();
        assert_eq!(center.alpha(), 0);
    }
}
