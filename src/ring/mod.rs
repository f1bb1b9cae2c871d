//! Circular progress ring widget: a square, animatable arc gauge with
//! optional shadow, thumb marker and multi-arc rendering.

pub mod animation;
pub mod geometry;
pub mod style;

use std::time::{Duration, Instant};

use bitflags::bitflags;
use tracing::debug;

use crate::error::Error;
use crate::render::{Canvas, Rgba, StrokeCap, SweepGradient, turn_fraction};
use animation::{Animator, Easing, RingCallbacks, SessionKind};
use geometry::{
    DEFAULT_SIDE_DP, Density, LayoutParams, MAX_THUMB_SIZE_RATE, RingGeometry,
    STROKE_THICKNESS_DP, THUMB_SIZE_DP, ThumbScale,
};
use style::{
    DrawOp, GradientStops, MULTI_ARC_GLUE_DEG, PaintFill, PaintSpec, PaintStyle, RingPaints,
    StyleInputs, resolve_paints,
};

pub use animation::{DEFAULT_ANIMATION, FnCallbacks};
pub use tiny_skia::Rect;

const DEFAULT_MAX: f32 = 100.0;
const DEFAULT_STARTING_ANGLE: i32 = 270;
const DEFAULT_COLOR: Rgba = Rgba::rgb(0, 0, 0);

bitflags! {
    /// Pending invalidation work, drained through the host protocol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Dirty: u8 {
        const REDRAW = 1 << 0;
        const LAYOUT = 1 << 1;
        const PAINTS = 1 << 2;
        const SHADER = 1 << 3;
    }
}

/// Declarative configuration for a [`ProgressRing`]. Pixel quantities left
/// unset fall back to density-scaled defaults at build time.
#[derive(Debug, Clone)]
pub struct RingAttrs {
    max: f32,
    progress: f32,
    starting_angle: i32,
    shadow: bool,
    rounded: bool,
    background_alpha: bool,
    reverse: bool,
    thumb: bool,
    thumb_scale: ThumbScale,
    thumb_size_rate: f32,
    max_thumb_size_rate: f32,
    progress_color: Rgba,
    background_color: Option<Rgba>,
    thickness: Option<f32>,
    thumb_size: Option<f32>,
    stops: Option<GradientStops>,
}

impl Default for RingAttrs {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX,
            progress: 0.0,
            starting_angle: DEFAULT_STARTING_ANGLE,
            shadow: true,
            rounded: false,
            background_alpha: true,
            reverse: false,
            thumb: false,
            thumb_scale: ThumbScale::Auto,
            thumb_size_rate: MAX_THUMB_SIZE_RATE,
            max_thumb_size_rate: MAX_THUMB_SIZE_RATE,
            progress_color: DEFAULT_COLOR,
            background_color: None,
            thickness: None,
            thumb_size: None,
            stops: None,
        }
    }
}

impl RingAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max(mut self, max: f32) -> Self {
        self.max = max;
        self
    }

    pub fn progress(mut self, progress: f32) -> Self {
        self.progress = progress;
        self
    }

    /// Angle the progress arc grows from. 270 degrees is 12 o'clock.
    pub fn starting_angle(mut self, degrees: i32) -> Self {
        self.starting_angle = degrees;
        self
    }

    pub fn shadow(mut self, enabled: bool) -> Self {
        self.shadow = enabled;
        self
    }

    pub fn rounded(mut self, enabled: bool) -> Self {
        self.rounded = enabled;
        self
    }

    pub fn background_alpha(mut self, enabled: bool) -> Self {
        self.background_alpha = enabled;
        self
    }

    pub fn reverse(mut self, enabled: bool) -> Self {
        self.reverse = enabled;
        self
    }

    pub fn thumb(mut self, enabled: bool) -> Self {
        self.thumb = enabled;
        self
    }

    pub fn thumb_scale(mut self, scale: ThumbScale) -> Self {
        self.thumb_scale = scale;
        self
    }

    pub fn thumb_size_rate(mut self, rate: f32) -> Self {
        self.thumb_size_rate = rate;
        self
    }

    pub fn max_thumb_size_rate(mut self, rate: f32) -> Self {
        self.max_thumb_size_rate = rate;
        self
    }

    /// Sets the progress and background color at once.
    pub fn color(mut self, color: Rgba) -> Self {
        self.progress_color = color;
        self.background_color = Some(color);
        self
    }

    pub fn progress_color(mut self, color: Rgba) -> Self {
        self.progress_color = color;
        self
    }

    pub fn background_color(mut self, color: Rgba) -> Self {
        self.background_color = Some(color);
        self
    }

    /// Colors the progress arc with a sweep gradient, like
    /// [`ProgressRing::set_progress_colors`]. Fails on fewer than two colors
    /// or a position list that does not cover every stop.
    pub fn progress_colors(
        mut self,
        colors: &[Rgba],
        positions: Option<&[f32]>,
        duplicate_first: bool,
    ) -> Result<Self, Error> {
        self.stops = Some(GradientStops::resolve(colors, positions, duplicate_first)?);
        Ok(self)
    }

    /// Stroke thickness in pixels.
    pub fn thickness(mut self, px: f32) -> Self {
        self.thickness = Some(px);
        self
    }

    /// Thumb radius in pixels, used by [`ThumbScale::Point`].
    pub fn thumb_size(mut self, px: f32) -> Self {
        self.thumb_size = Some(px);
        self
    }

    pub fn build(self, density: Density) -> ProgressRing {
        ProgressRing::new(self, density)
    }
}

/// The ring widget. The host owns the event loop and drives it through
/// [`layout`](Self::layout), [`tick`](Self::tick) and
/// [`draw`](Self::draw), polling
/// [`take_redraw_request`](Self::take_redraw_request) and
/// [`take_layout_request`](Self::take_layout_request) between frames.
pub struct ProgressRing {
    density: Density,
    max: f32,
    starting_angle: i32,
    reverse: bool,
    shadow: bool,
    rounded: bool,
    background_alpha: bool,
    thumb: bool,
    thumb_scale: ThumbScale,
    thumb_size: f32,
    thumb_rate: f32,
    max_thumb_rate: f32,
    thickness: f32,
    progress_color: Rgba,
    background_color: Rgba,
    stops: Option<GradientStops>,
    interpolator: Easing,

    progress: f32,
    multi_arc: bool,
    segments: Vec<f32>,
    segment_colors: Vec<Rgba>,
    segments_total: f32,

    geometry: RingGeometry,
    paints: RingPaints,
    shader: Option<SweepGradient>,
    dirty: Dirty,

    animator: Animator,
    callbacks: Option<Box<dyn RingCallbacks>>,
}

impl ProgressRing {
    fn new(attrs: RingAttrs, density: Density) -> Self {
        let thickness = attrs
            .thickness
            .unwrap_or_else(|| density.dp(STROKE_THICKNESS_DP));
        let thumb_size = attrs
            .thumb_size
            .unwrap_or_else(|| density.dp(THUMB_SIZE_DP));
        let background_color = attrs.background_color.unwrap_or(attrs.progress_color);
        let paints = resolve_paints(&StyleInputs {
            thickness,
            rounded: attrs.rounded,
            background_alpha: attrs.background_alpha,
            progress_color: attrs.progress_color,
            background_color,
            shader: None,
            segment_colors: &[],
            segment_count: 0,
        });
        let mut dirty = Dirty::REDRAW | Dirty::LAYOUT;
        if attrs.stops.is_some() {
            dirty.insert(Dirty::SHADER);
        }
        Self {
            density,
            max: attrs.max,
            starting_angle: attrs.starting_angle,
            reverse: attrs.reverse,
            shadow: attrs.shadow,
            rounded: attrs.rounded,
            background_alpha: attrs.background_alpha,
            thumb: attrs.thumb,
            thumb_scale: attrs.thumb_scale,
            thumb_size,
            thumb_rate: attrs.thumb_size_rate,
            max_thumb_rate: attrs.max_thumb_size_rate,
            thickness,
            progress_color: attrs.progress_color,
            background_color,
            stops: attrs.stops,
            interpolator: Easing::default(),
            progress: attrs.progress,
            multi_arc: false,
            segments: Vec::new(),
            segment_colors: Vec::new(),
            segments_total: 0.0,
            geometry: RingGeometry::new(density, thickness, thumb_size),
            paints,
            shader: None,
            dirty,
            animator: Animator::default(),
            callbacks: None,
        }
    }

    /// Lays the ring out in a `width` x `height` box, returning the measured
    /// square side. An unusable box falls back to the last valid geometry and
    /// may rewrite thickness and thumb sizing to match it.
    pub fn layout(&mut self, width: f32, height: f32) -> f32 {
        let params = self.layout_params();
        let previous_side = self.geometry.side();
        let outcome = self.geometry.layout(width, height, params);
        if outcome.params != params {
            self.thickness = outcome.params.thickness;
            self.thumb_size = outcome.params.thumb_size;
            self.thumb_rate = outcome.params.thumb_rate;
            self.dirty.insert(Dirty::PAINTS);
        }
        if self.geometry.side() != previous_side {
            // The oval center moved with the size, the gradient follows it.
            self.dirty.insert(Dirty::SHADER);
        }
        self.dirty.remove(Dirty::LAYOUT);
        self.dirty.insert(Dirty::REDRAW);
        self.geometry.side()
    }

    /// Advances the animation clock. Fires the host callbacks for the tick
    /// and returns true while a session is still running, so the host knows
    /// to keep scheduling frames.
    pub fn tick(&mut self, now: Instant) -> bool {
        let update = match self.animator.tick(now) {
            Some(update) => update,
            None => return false,
        };
        self.progress = update.value;
        self.dirty.insert(Dirty::REDRAW);
        if let Some(callbacks) = self.callbacks.as_mut() {
            callbacks.on_progress_changed(update.value);
            if update.finished {
                callbacks.on_animation_finished(update.value);
            }
        }
        self.animator.is_animating()
    }

    /// True when the frame changed since the last call. Clears the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        let wants = self.dirty.contains(Dirty::REDRAW);
        self.dirty.remove(Dirty::REDRAW);
        wants
    }

    /// True when a configuration change needs a fresh [`layout`](Self::layout)
    /// pass. Clears the flag.
    pub fn take_layout_request(&mut self) -> bool {
        let wants = self.dirty.contains(Dirty::LAYOUT);
        self.dirty.remove(Dirty::LAYOUT);
        wants
    }

    /// Fallback square side for hosts with no size constraint of their own.
    pub fn default_size(&self) -> f32 {
        self.density.dp(DEFAULT_SIDE_DP)
    }

    /// Measured square side of the last layout pass.
    pub fn side(&self) -> f32 {
        self.geometry.side()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn stroke_thickness(&self) -> f32 {
        self.thickness
    }

    pub fn progress_color(&self) -> Rgba {
        self.progress_color
    }

    pub fn thumb_scale(&self) -> ThumbScale {
        self.thumb_scale
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn is_multi_arc_enabled(&self) -> bool {
        self.multi_arc
    }

    /// Sets the progress value immediately. Cancels any running animation
    /// without callbacks and switches back to single-arc rendering.
    pub fn set_progress(&mut self, progress: f32) {
        self.multi_arc = false;
        self.animator.cancel();
        self.progress = progress;
        self.dirty.insert(Dirty::REDRAW);
    }

    /// Animates the progress from its current value to `progress`. A running
    /// session is replaced without its finished callback. Switches back to
    /// single-arc rendering.
    pub fn set_progress_animated(&mut self, progress: f32, duration: Duration) {
        self.multi_arc = false;
        self.animator.start(
            self.progress,
            progress,
            duration,
            self.interpolator,
            SessionKind::Forward,
            Instant::now(),
        );
    }

    /// Snaps the progress back to zero.
    pub fn reset_progress(&mut self) {
        self.set_progress(0.0);
    }

    /// Animates the progress back to zero.
    pub fn reset_progress_animated(&mut self, duration: Duration) {
        self.multi_arc = false;
        self.animator.start(
            self.progress,
            0.0,
            duration,
            self.interpolator,
            SessionKind::Reset,
            Instant::now(),
        );
    }

    /// Switches to multi-arc rendering: one arc per value, glued clockwise
    /// from the starting angle. Fails without touching any state when the
    /// values overrun [`max`](Self::max); missing colors pad as transparent.
    /// Rounded caps are force-disabled, and any running animation stops.
    pub fn set_segments(&mut self, values: &[f32], colors: &[Rgba]) -> Result<(), Error> {
        let mut total = 0.0;
        for value in values {
            total += value;
            if total > self.max {
                return Err(Error::SegmentSumExceedsMax {
                    sum: total,
                    max: self.max,
                });
            }
        }
        debug!(count = values.len(), total, "enabling multi-arc rendering");
        self.multi_arc = true;
        self.rounded = false;
        self.segments = values.to_vec();
        self.segment_colors = colors.to_vec();
        self.segments_total = total;
        self.animator.cancel();
        self.dirty.insert(Dirty::PAINTS | Dirty::REDRAW);
        Ok(())
    }

    pub fn set_max(&mut self, max: f32) {
        self.max = max;
        self.dirty.insert(Dirty::REDRAW);
    }

    pub fn set_starting_angle(&mut self, degrees: i32) {
        self.starting_angle = degrees;
        self.dirty.insert(Dirty::REDRAW);
    }

    pub fn set_reverse(&mut self, enabled: bool) {
        self.reverse = enabled;
        self.dirty.insert(Dirty::REDRAW);
    }

    pub fn set_shadow(&mut self, enabled: bool) {
        self.shadow = enabled;
        self.dirty.insert(Dirty::REDRAW);
    }

    pub fn set_rounded(&mut self, enabled: bool) {
        self.rounded = enabled;
        self.dirty.insert(Dirty::PAINTS | Dirty::REDRAW);
    }

    pub fn set_background_alpha(&mut self, enabled: bool) {
        self.background_alpha = enabled;
        self.dirty.insert(Dirty::PAINTS | Dirty::REDRAW);
    }

    pub fn set_thumb_enabled(&mut self, enabled: bool) {
        self.thumb = enabled;
        self.dirty.insert(Dirty::LAYOUT | Dirty::REDRAW);
    }

    pub fn set_thumb_scale(&mut self, scale: ThumbScale) {
        self.thumb_scale = scale;
        self.dirty.insert(Dirty::LAYOUT | Dirty::REDRAW);
    }

    /// Thumb radius in pixels, used by [`ThumbScale::Point`].
    pub fn set_thumb_size(&mut self, px: f32) {
        self.thumb_size = px;
        self.dirty.insert(Dirty::LAYOUT | Dirty::REDRAW);
    }

    /// Thumb rate for [`ThumbScale::Rate`], silently clamped to
    /// `[0, max_thumb_size_rate]`.
    pub fn set_thumb_size_rate(&mut self, rate: f32) {
        self.thumb_rate = rate.min(self.max_thumb_rate).max(0.0);
        self.dirty.insert(Dirty::LAYOUT | Dirty::REDRAW);
    }

    pub fn set_max_thumb_size_rate(&mut self, rate: f32) {
        self.max_thumb_rate = rate;
        self.dirty.insert(Dirty::LAYOUT | Dirty::REDRAW);
    }

    /// Sets a solid progress color, dropping any gradient.
    pub fn set_progress_color(&mut self, color: Rgba) {
        self.progress_color = color;
        self.stops = None;
        self.shader = None;
        self.dirty.insert(Dirty::PAINTS | Dirty::REDRAW);
    }

    pub fn set_background_color(&mut self, color: Rgba) {
        self.background_color = color;
        self.dirty.insert(Dirty::PAINTS | Dirty::REDRAW);
    }

    /// Sets the progress and background color at once, dropping any gradient.
    pub fn set_color(&mut self, color: Rgba) {
        self.set_progress_color(color);
        self.set_background_color(color);
    }

    /// Colors the progress arc with a sweep gradient around the oval center.
    /// `duplicate_first` repeats the first color at the end of the turn for a
    /// seamless wrap; explicit positions must then cover that extra stop too.
    pub fn set_progress_colors(
        &mut self,
        colors: &[Rgba],
        positions: Option<&[f32]>,
        duplicate_first: bool,
    ) -> Result<(), Error> {
        self.stops = Some(GradientStops::resolve(colors, positions, duplicate_first)?);
        self.dirty.insert(Dirty::SHADER | Dirty::PAINTS | Dirty::REDRAW);
        Ok(())
    }

    /// Stroke thickness in pixels for the arc, track and shadow.
    pub fn set_stroke_thickness(&mut self, px: f32) {
        self.thickness = px;
        self.dirty.insert(Dirty::PAINTS | Dirty::LAYOUT | Dirty::REDRAW);
    }

    /// Easing curve for sessions started after this call.
    pub fn set_interpolator(&mut self, curve: Easing) {
        self.interpolator = curve;
    }

    pub fn set_callbacks<C: RingCallbacks + 'static>(&mut self, callbacks: C) {
        self.callbacks = Some(Box::new(callbacks));
    }

    pub fn clear_callbacks(&mut self) {
        self.callbacks = None;
    }

    /// Resolves the current frame into an ordered list of draw primitives:
    /// shadow first, then per-arc track, arc and thumb. Empty while the
    /// measured box cannot hold a ring.
    pub fn render_ops(&mut self) -> Vec<DrawOp> {
        if self.dirty.contains(Dirty::SHADER) {
            self.shader = self.stops.as_ref().map(|stops| {
                let (cx, cy) = self.geometry.center();
                stops.anchored(cx, cy)
            });
            self.dirty.remove(Dirty::SHADER);
            self.dirty.insert(Dirty::PAINTS);
        }
        if self.dirty.contains(Dirty::PAINTS) {
            self.paints = resolve_paints(&StyleInputs {
                thickness: self.thickness,
                rounded: self.rounded,
                background_alpha: self.background_alpha,
                progress_color: self.progress_color,
                background_color: self.background_color,
                shader: self.shader.as_ref(),
                segment_colors: &self.segment_colors,
                segment_count: self.segments.len(),
            });
            self.dirty.remove(Dirty::PAINTS);
        }

        let progress_rect = match self.geometry.progress_rect() {
            Some(rect) if rect.width() > 0.0 => rect,
            _ => return Vec::new(),
        };

        let params = self.layout_params();
        let thumb = self.geometry.thumb_layout(params);
        let single = !self.multi_arc;
        let start = self.starting_angle as f32;
        let mut ops = Vec::new();

        if self.shadow {
            if let Some(shadow_rect) = self.geometry.shadow_rect() {
                let total = if single { self.progress } else { self.segments_total };
                let sweep = geometry::sweep_angle(total, self.max, self.reverse);
                ops.push(DrawOp::Arc {
                    rect: shadow_rect,
                    start_deg: start,
                    sweep_deg: sweep,
                    paint: self.paints.shadow.clone(),
                });
                if single && self.thumb {
                    let (cx, cy) = rect_center(shadow_rect);
                    let (dx, dy) = geometry::polar_offset(thumb.orbit_radius, start + sweep);
                    ops.push(DrawOp::Circle {
                        cx: cx + dx,
                        cy: cy + dy,
                        radius: thumb.size,
                        paint: thumb_paint(&self.paints.shadow, thumb.filled, start + sweep),
                    });
                }
            }
        }

        let values: &[f32] = if single {
            std::slice::from_ref(&self.progress)
        } else {
            &self.segments
        };
        let mut previous = start;
        for (i, &value) in values.iter().enumerate() {
            if single {
                // The track would bleed through the gaps between arcs, so
                // multi-arc mode draws none.
                ops.push(DrawOp::Oval {
                    rect: progress_rect,
                    paint: self.paints.background.clone(),
                });
            }
            let sweep = geometry::sweep_angle(value, self.max, self.reverse);
            let glue = if !self.reverse && self.multi_arc {
                MULTI_ARC_GLUE_DEG
            } else {
                0.0
            };
            let paint = if single {
                self.paints.progress.clone()
            } else {
                self.paints.segments[i].clone()
            };
            ops.push(DrawOp::Arc {
                rect: progress_rect,
                start_deg: previous - glue,
                sweep_deg: sweep + glue,
                paint,
            });
            if single && self.thumb {
                let (cx, cy) = rect_center(progress_rect);
                let (dx, dy) = geometry::polar_offset(thumb.orbit_radius, previous + sweep);
                ops.push(DrawOp::Circle {
                    cx: cx + dx,
                    cy: cy + dy,
                    radius: thumb.size,
                    paint: thumb_paint(&self.paints.progress, thumb.filled, previous + sweep),
                });
            }
            previous += sweep;
        }
        ops
    }

    /// Rasterizes the current frame onto a canvas.
    pub fn draw(&mut self, canvas: &mut Canvas) {
        for op in self.render_ops() {
            match op {
                DrawOp::Arc {
                    rect,
                    start_deg,
                    sweep_deg,
                    paint,
                } => {
                    let (width, cap) = stroke_of(paint.style);
                    match &paint.fill {
                        PaintFill::Solid(color) => {
                            canvas.stroke_arc(rect, start_deg, sweep_deg, width, cap, *color);
                        }
                        PaintFill::Sweep(gradient) => {
                            canvas.stroke_arc_gradient(
                                rect,
                                start_deg,
                                sweep_deg,
                                width,
                                cap == StrokeCap::Round,
                                gradient,
                            );
                        }
                    }
                }
                DrawOp::Oval { rect, paint } => {
                    let (width, _) = stroke_of(paint.style);
                    if let PaintFill::Solid(color) = paint.fill {
                        canvas.stroke_oval(rect, width, color);
                    }
                }
                DrawOp::Circle {
                    cx,
                    cy,
                    radius,
                    paint,
                } => {
                    if let PaintFill::Solid(color) = paint.fill {
                        match paint.style {
                            PaintStyle::Fill => canvas.fill_circle(cx, cy, radius, color),
                            PaintStyle::Stroke { width, .. } => {
                                canvas.stroke_circle(cx, cy, radius, width, color)
                            }
                        }
                    }
                }
            }
        }
    }

    fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            thickness: self.thickness,
            thumb_enabled: self.thumb,
            thumb_scale: self.thumb_scale,
            thumb_size: self.thumb_size,
            thumb_rate: self.thumb_rate,
            max_thumb_rate: self.max_thumb_rate,
        }
    }
}

fn rect_center(rect: Rect) -> (f32, f32) {
    (
        rect.left() + rect.width() / 2.0,
        rect.top() + rect.height() / 2.0,
    )
}

fn stroke_of(style: PaintStyle) -> (f32, StrokeCap) {
    match style {
        PaintStyle::Stroke { width, cap } => (width, cap),
        PaintStyle::Fill => (0.0, StrokeCap::Butt),
    }
}

/// Thumb paint derived from the arc paint it rides on: filled disk or
/// stroked ring, solid-colored by the gradient sample at the thumb angle.
fn thumb_paint(base: &PaintSpec, filled: bool, angle_deg: f32) -> PaintSpec {
    let color = match &base.fill {
        PaintFill::Solid(color) => *color,
        PaintFill::Sweep(gradient) => gradient.color_at(turn_fraction(angle_deg)),
    };
    if filled {
        PaintSpec::fill(color)
    } else {
        let (width, cap) = stroke_of(base.style);
        PaintSpec::stroke(color, width, cap)
    }
}
