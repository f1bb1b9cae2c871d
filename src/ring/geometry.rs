//! Layout math for the ring: square measurement, arc insets, thumb sizing and
//! the guard that keeps unusable sizes from sticking.

use tiny_skia::Rect;
use tracing::warn;

pub(crate) const VIEW_PADDING_DP: f32 = 10.0;
pub(crate) const SHADOW_PADDING_DP: f32 = 5.0;
pub(crate) const STROKE_THICKNESS_DP: f32 = 10.0;
pub(crate) const THUMB_SIZE_DP: f32 = 10.0;
pub(crate) const DEFAULT_SIDE_DP: f32 = 100.0;
pub(crate) const MAX_THUMB_SIZE_RATE: f32 = 2.0;

/// Display density factor. Converts density-independent units to pixels,
/// rounding up so hairline values never collapse to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Density(pub f32);

impl Density {
    pub fn dp(self, dp: f32) -> f32 {
        (dp * self.0).ceil()
    }
}

impl Default for Density {
    fn default() -> Self {
        Density(1.0)
    }
}

/// How the thumb is sized relative to the progress stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbScale {
    /// Half the stroke thickness, drawn as a stroked ring riding the arc.
    #[default]
    Auto,
    /// An explicit radius in pixels.
    Point,
    /// Half the stroke thickness scaled by a rate.
    Rate,
}

/// Geometry inputs for a measure pass. The pass may hand back a rewritten
/// copy when it falls back to the last valid configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LayoutParams {
    pub thickness: f32,
    pub thumb_enabled: bool,
    pub thumb_scale: ThumbScale,
    pub thumb_size: f32,
    pub thumb_rate: f32,
    pub max_thumb_rate: f32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutOutcome {
    pub params: LayoutParams,
    pub degenerate: bool,
}

/// Placement of the thumb for the current draw configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ThumbLayout {
    /// Radius of the circle the thumb center rides on.
    pub orbit_radius: f32,
    /// Thumb radius in pixels.
    pub size: f32,
    /// Filled disk when true, stroked ring otherwise.
    pub filled: bool,
}

/// Measured state of the ring. Keeps the last configuration that produced a
/// drawable ring so a bad resize or thickness change degrades instead of
/// collapsing the composition.
#[derive(Debug, Clone)]
pub(crate) struct RingGeometry {
    view_padding: f32,
    shadow_padding: f32,
    side: f32,
    inset: f32,
    last_valid_inset: f32,
    last_valid_thickness: f32,
    last_valid_thumb_size: f32,
    last_valid_thumb_rate: f32,
}

impl RingGeometry {
    pub(crate) fn new(density: Density, thickness: f32, thumb_size: f32) -> Self {
        Self {
            view_padding: density.dp(VIEW_PADDING_DP),
            shadow_padding: density.dp(SHADOW_PADDING_DP),
            side: 0.0,
            inset: 0.0,
            last_valid_inset: 0.0,
            last_valid_thickness: thickness,
            last_valid_thumb_size: thumb_size,
            last_valid_thumb_rate: MAX_THUMB_SIZE_RATE,
        }
    }

    /// Runs a measure pass for a `width` x `height` box. The ring is always
    /// square, sized by the smaller edge. Returns the parameters actually in
    /// effect afterwards, which differ from the requested ones when the box
    /// cannot fit them.
    pub(crate) fn layout(&mut self, width: f32, height: f32, params: LayoutParams) -> LayoutOutcome {
        let side = width.min(height).max(0.0);
        self.side = side;

        let measure_thumb = match params.thumb_scale {
            ThumbScale::Point => params.thumb_size,
            ThumbScale::Rate => params.thickness / 2.0 * params.thumb_rate,
            ThumbScale::Auto => params.thickness,
        };
        let mut stroke_extent = params.thickness;
        if params.thumb_enabled && params.thumb_scale != ThumbScale::Auto {
            // A thumb wider than the stroke widens the inset instead.
            stroke_extent = if measure_thumb * 2.0 > params.thickness {
                measure_thumb
            } else {
                params.thickness / 2.0
            };
        }

        let inset = stroke_extent.max(0.0) + self.view_padding;
        if side - inset * 2.0 <= stroke_extent.max(measure_thumb) {
            self.inset = self.last_valid_inset;
            let mut applied = params;
            applied.thickness = self.last_valid_thickness;
            applied.thumb_size = self.last_valid_thumb_size;
            applied.thumb_rate = self
                .last_valid_thumb_rate
                .min(params.max_thumb_rate)
                .max(0.0);
            warn!(side, inset, "box too small for ring, keeping last valid geometry");
            LayoutOutcome {
                params: applied,
                degenerate: true,
            }
        } else {
            self.inset = inset;
            self.last_valid_inset = inset;
            self.last_valid_thickness = params.thickness;
            self.last_valid_thumb_size = params.thumb_size;
            self.last_valid_thumb_rate = params.thumb_rate;
            LayoutOutcome {
                params,
                degenerate: false,
            }
        }
    }

    /// Measured square side in pixels.
    pub(crate) fn side(&self) -> f32 {
        self.side
    }

    /// Bounds of the progress oval, or `None` while the measured box cannot
    /// hold one.
    pub(crate) fn progress_rect(&self) -> Option<Rect> {
        Rect::from_ltrb(
            self.inset,
            self.inset,
            self.side - self.inset,
            self.side - self.inset,
        )
    }

    /// Bounds of the shadow oval: the progress bounds shifted down.
    pub(crate) fn shadow_rect(&self) -> Option<Rect> {
        Rect::from_ltrb(
            self.inset,
            self.inset + self.shadow_padding,
            self.side - self.inset,
            self.side - self.inset + self.shadow_padding,
        )
    }

    /// Center of the progress oval.
    pub(crate) fn center(&self) -> (f32, f32) {
        (self.side / 2.0, self.side / 2.0)
    }

    /// Thumb orbit radius, size and style for the draw pass.
    pub(crate) fn thumb_layout(&self, params: LayoutParams) -> ThumbLayout {
        let free = self.side / 2.0 - self.view_padding;
        match params.thumb_scale {
            ThumbScale::Auto => {
                let icon = params.thickness / 2.0;
                ThumbLayout {
                    orbit_radius: free - (icon + params.thickness / 2.0),
                    size: icon,
                    filled: false,
                }
            }
            ThumbScale::Point => {
                let size = params.thumb_size;
                let thicker = size * 2.0 > params.thickness;
                ThumbLayout {
                    orbit_radius: free - if thicker { size } else { params.thickness / 2.0 },
                    size,
                    filled: true,
                }
            }
            ThumbScale::Rate => {
                let size = params.thickness / 2.0 * params.thumb_rate;
                let thicker = params.thumb_rate > 1.0;
                ThumbLayout {
                    orbit_radius: free - if thicker { size } else { params.thickness / 2.0 },
                    size,
                    filled: true,
                }
            }
        }
    }
}

/// Sweep for a value as a fraction of `max`, in degrees. Values past `max`
/// keep growing past a full turn.
pub(crate) fn sweep_angle(value: f32, max: f32, reverse: bool) -> f32 {
    let angle = 360.0 * value / max;
    if reverse { -angle } else { angle }
}

/// Offset of a point at `angle_deg` on a circle of `radius`, relative to the
/// circle center.
pub(crate) fn polar_offset(radius: f32, angle_deg: f32) -> (f32, f32) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    (cos * radius, sin * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_params(thickness: f32) -> LayoutParams {
        LayoutParams {
            thickness,
            thumb_enabled: false,
            thumb_scale: ThumbScale::Auto,
            thumb_size: 10.0,
            thumb_rate: MAX_THUMB_SIZE_RATE,
            max_thumb_rate: MAX_THUMB_SIZE_RATE,
        }
    }

    #[test]
    fn density_rounds_up() {
        assert_eq!(Density(2.75).dp(10.0), 28.0);
        assert_eq!(Density(1.0).dp(10.0), 10.0);
    }

    #[test]
    fn layout_insets_by_stroke_and_padding() {
        let mut geo = RingGeometry::new(Density(1.0), 10.0, 10.0);
        let out = geo.layout(200.0, 240.0, plain_params(10.0));
        assert!(!out.degenerate);
        assert_eq!(geo.side(), 200.0);
        let rect = geo.progress_rect().unwrap();
        assert_eq!(
            (rect.left(), rect.top(), rect.right(), rect.bottom()),
            (20.0, 20.0, 180.0, 180.0)
        );
        let shadow = geo.shadow_rect().unwrap();
        assert_eq!(
            (shadow.left(), shadow.top(), shadow.right(), shadow.bottom()),
            (20.0, 25.0, 180.0, 185.0)
        );
    }

    #[test]
    fn oversized_thumb_widens_the_inset() {
        let mut geo = RingGeometry::new(Density(1.0), 10.0, 15.0);
        let mut params = plain_params(10.0);
        params.thumb_enabled = true;
        params.thumb_scale = ThumbScale::Point;
        params.thumb_size = 15.0;
        let out = geo.layout(200.0, 200.0, params);
        assert!(!out.degenerate);
        let rect = geo.progress_rect().unwrap();
        assert_eq!(rect.left(), 25.0);
    }

    #[test]
    fn degenerate_layout_keeps_last_valid_geometry() {
        let mut geo = RingGeometry::new(Density(1.0), 10.0, 10.0);
        let ok = geo.layout(200.0, 200.0, plain_params(10.0));
        assert!(!ok.degenerate);

        let out = geo.layout(200.0, 200.0, plain_params(95.0));
        assert!(out.degenerate);
        assert_eq!(out.params.thickness, 10.0);
        let rect = geo.progress_rect().unwrap();
        assert_eq!(rect.left(), 20.0);
    }

    #[test]
    fn first_layout_can_degenerate_to_zero_inset() {
        let mut geo = RingGeometry::new(Density(1.0), 10.0, 10.0);
        let out = geo.layout(10.0, 10.0, plain_params(10.0));
        assert!(out.degenerate);
        let rect = geo.progress_rect().unwrap();
        assert_eq!(
            (rect.left(), rect.top(), rect.right(), rect.bottom()),
            (0.0, 0.0, 10.0, 10.0)
        );
    }

    #[test]
    fn shrunk_box_can_leave_no_drawable_rect() {
        let mut geo = RingGeometry::new(Density(1.0), 10.0, 10.0);
        geo.layout(200.0, 200.0, plain_params(10.0));
        let out = geo.layout(30.0, 30.0, plain_params(10.0));
        assert!(out.degenerate);
        // Cached inset of 20 cannot fit in a 30px side.
        assert!(geo.progress_rect().is_none());
    }

    #[test]
    fn degenerate_layout_clamps_thumb_rate() {
        let mut geo = RingGeometry::new(Density(1.0), 10.0, 10.0);
        let mut params = plain_params(10.0);
        params.thumb_enabled = true;
        params.thumb_scale = ThumbScale::Rate;
        params.thumb_rate = 5.0;
        params.max_thumb_rate = 5.0;
        let ok = geo.layout(300.0, 300.0, params);
        assert!(!ok.degenerate);

        params.max_thumb_rate = 2.0;
        let out = geo.layout(20.0, 20.0, params);
        assert!(out.degenerate);
        assert_eq!(out.params.thumb_rate, 2.0);
    }

    #[test]
    fn thumb_layout_per_scale_mode() {
        let mut geo = RingGeometry::new(Density(1.0), 10.0, 10.0);
        geo.layout(200.0, 200.0, plain_params(10.0));

        let auto = geo.thumb_layout(plain_params(10.0));
        assert_eq!(auto.orbit_radius, 80.0);
        assert_eq!(auto.size, 5.0);
        assert!(!auto.filled);

        let mut point = plain_params(10.0);
        point.thumb_scale = ThumbScale::Point;
        point.thumb_size = 15.0;
        let thick = geo.thumb_layout(point);
        assert_eq!(thick.orbit_radius, 75.0);
        assert!(thick.filled);

        let mut rate = plain_params(10.0);
        rate.thumb_scale = ThumbScale::Rate;
        rate.thumb_rate = 0.5;
        let thin = geo.thumb_layout(rate);
        assert_eq!(thin.orbit_radius, 85.0);
        assert_eq!(thin.size, 2.5);
    }

    #[test]
    fn sweep_angle_scales_and_reverses() {
        assert_eq!(sweep_angle(50.0, 100.0, false), 180.0);
        assert_eq!(sweep_angle(50.0, 100.0, true), -180.0);
        assert_eq!(sweep_angle(150.0, 100.0, false), 540.0);
    }

    #[test]
    fn polar_offset_tracks_the_circle() {
        let (x, y) = polar_offset(10.0, 0.0);
        assert!((x - 10.0).abs() < 1e-4 && y.abs() < 1e-4);
        let (x, y) = polar_offset(10.0, 270.0);
        assert!(x.abs() < 1e-3 && (y + 10.0).abs() < 1e-3);
    }
}
