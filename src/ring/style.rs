//! Paint resolution: stroke caps, alpha scaling, gradient stops and the draw
//! primitives the ring renders through.

use tiny_skia::Rect;

use crate::error::Error;
use crate::render::{Rgba, StrokeCap, SweepGradient};

/// Alpha factor applied to the background track when dimming is enabled.
pub(crate) const BACKGROUND_ALPHA_FACTOR: f32 = 0.3;
/// The shadow is plain black scaled by this factor.
pub(crate) const SHADOW_ALPHA_FACTOR: f32 = 0.2;
/// Extra sweep gluing adjacent arcs together in multi-arc mode.
pub(crate) const MULTI_ARC_GLUE_DEG: f32 = 6.0;

/// Scales a color's alpha channel, leaving the other channels alone.
pub(crate) fn adjust_alpha(color: Rgba, factor: f32) -> Rgba {
    color.with_alpha((color.a as f32 * factor).round() as u8)
}

/// Validated gradient stops, not yet anchored to a center point.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradientStops {
    pub colors: Vec<Rgba>,
    pub positions: Vec<f32>,
}

impl GradientStops {
    /// Resolves a stop list. `duplicate_first` appends the first color at the
    /// end for a seamless wrap; explicit positions must then cover that extra
    /// stop too. Missing or empty positions are spaced evenly from 0 to 1.
    pub(crate) fn resolve(
        colors: &[Rgba],
        positions: Option<&[f32]>,
        duplicate_first: bool,
    ) -> Result<Self, Error> {
        if colors.len() < 2 {
            return Err(Error::GradientColors {
                count: colors.len(),
            });
        }
        let mut resolved = colors.to_vec();
        if duplicate_first {
            resolved.push(colors[0]);
        }
        let positions = match positions {
            Some(p) if !p.is_empty() => {
                if p.len() != resolved.len() {
                    return Err(Error::GradientPositions {
                        colors: resolved.len(),
                        positions: p.len(),
                    });
                }
                p.to_vec()
            }
            _ => even_positions(resolved.len()),
        };
        Ok(Self {
            colors: resolved,
            positions,
        })
    }

    /// Anchors the stops at a center point.
    pub(crate) fn anchored(&self, cx: f32, cy: f32) -> SweepGradient {
        SweepGradient::new(self.colors.clone(), self.positions.clone(), cx, cy)
    }
}

fn even_positions(count: usize) -> Vec<f32> {
    let last = (count - 1) as f32;
    (0..count).map(|i| i as f32 / last).collect()
}

/// Brush for a draw primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintFill {
    Solid(Rgba),
    Sweep(SweepGradient),
}

/// Whether a primitive is filled or stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintStyle {
    Fill,
    Stroke { width: f32, cap: StrokeCap },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaintSpec {
    pub fill: PaintFill,
    pub style: PaintStyle,
}

impl PaintSpec {
    pub(crate) fn stroke(color: Rgba, width: f32, cap: StrokeCap) -> Self {
        Self {
            fill: PaintFill::Solid(color),
            style: PaintStyle::Stroke {
                width,
                cap,
            },
        }
    }

    pub(crate) fn fill(color: Rgba) -> Self {
        Self {
            fill: PaintFill::Solid(color),
            style: PaintStyle::Fill,
        }
    }
}

/// One primitive of the ring's draw pass, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Arc over the oval inscribed in `rect`. Angles are degrees, clockwise
    /// from 3 o'clock.
    Arc {
        rect: Rect,
        start_deg: f32,
        sweep_deg: f32,
        paint: PaintSpec,
    },
    /// Full oval outline.
    Oval { rect: Rect, paint: PaintSpec },
    /// Disk or stroked ring at an absolute point.
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        paint: PaintSpec,
    },
}

/// Cached paints for the ring's layers, rebuilt when a styling input changes.
#[derive(Debug, Clone)]
pub(crate) struct RingPaints {
    pub background: PaintSpec,
    pub progress: PaintSpec,
    pub shadow: PaintSpec,
    pub segments: Vec<PaintSpec>,
}

/// Styling inputs resolved into concrete paints.
pub(crate) struct StyleInputs<'a> {
    pub thickness: f32,
    pub rounded: bool,
    pub background_alpha: bool,
    pub progress_color: Rgba,
    pub background_color: Rgba,
    pub shader: Option<&'a SweepGradient>,
    pub segment_colors: &'a [Rgba],
    pub segment_count: usize,
}

pub(crate) fn resolve_paints(inputs: &StyleInputs) -> RingPaints {
    let cap = if inputs.rounded {
        StrokeCap::Round
    } else {
        StrokeCap::Butt
    };
    let background_color = if inputs.background_alpha {
        adjust_alpha(inputs.background_color, BACKGROUND_ALPHA_FACTOR)
    } else {
        inputs.background_color
    };
    let progress_fill = match inputs.shader {
        Some(gradient) => PaintFill::Sweep(gradient.clone()),
        None => PaintFill::Solid(inputs.progress_color),
    };
    // Missing segment colors pad out as transparent.
    let segments = (0..inputs.segment_count)
        .map(|i| {
            let color = inputs.segment_colors.get(i).copied().unwrap_or_default();
            PaintSpec::stroke(color, inputs.thickness, StrokeCap::Butt)
        })
        .collect();
    RingPaints {
        background: PaintSpec::stroke(background_color, inputs.thickness, StrokeCap::Butt),
        progress: PaintSpec {
            fill: progress_fill,
            style: PaintStyle::Stroke {
                width: inputs.thickness,
                cap,
            },
        },
        shadow: PaintSpec::stroke(
            adjust_alpha(Rgba::rgb(0, 0, 0), SHADOW_ALPHA_FACTOR),
            inputs.thickness,
            cap,
        ),
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(shader: Option<&'a SweepGradient>, segment_colors: &'a [Rgba]) -> StyleInputs<'a> {
        StyleInputs {
            thickness: 10.0,
            rounded: false,
            background_alpha: true,
            progress_color: Rgba::rgb(200, 30, 30),
            background_color: Rgba::rgb(200, 30, 30),
            shader,
            segment_colors,
            segment_count: segment_colors.len(),
        }
    }

    #[test]
    fn adjust_alpha_scales_only_alpha() {
        let dimmed = adjust_alpha(Rgba::new(10, 20, 30, 255), 0.3);
        assert_eq!(dimmed, Rgba::new(10, 20, 30, 77));
        assert_eq!(adjust_alpha(Rgba::new(0, 0, 0, 100), 0.2).a, 20);
    }

    #[test]
    fn stops_space_evenly_without_positions() {
        let stops = GradientStops::resolve(
            &[Rgba::rgb(255, 0, 0), Rgba::rgb(0, 255, 0), Rgba::rgb(0, 0, 255)],
            None,
            false,
        )
        .unwrap();
        assert_eq!(stops.positions, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn duplicate_first_stitches_the_wrap() {
        let stops = GradientStops::resolve(
            &[Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255)],
            None,
            true,
        )
        .unwrap();
        assert_eq!(
            stops.colors,
            vec![Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255), Rgba::rgb(255, 0, 0)]
        );
        assert_eq!(stops.positions, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn too_few_colors_is_an_error() {
        let err = GradientStops::resolve(&[Rgba::rgb(1, 2, 3)], None, false).unwrap_err();
        assert!(matches!(err, Error::GradientColors { count: 1 }));
    }

    #[test]
    fn position_count_must_match_resolved_colors() {
        let colors = [Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255)];
        let err = GradientStops::resolve(&colors, Some(&[0.0, 0.4, 1.0]), false).unwrap_err();
        assert!(matches!(
            err,
            Error::GradientPositions {
                colors: 2,
                positions: 3
            }
        ));
        // With duplication the extra stop needs a position as well.
        assert!(GradientStops::resolve(&colors, Some(&[0.0, 0.4, 1.0]), true).is_ok());
    }

    #[test]
    fn empty_positions_fall_back_to_even_spacing() {
        let stops = GradientStops::resolve(
            &[Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255)],
            Some(&[]),
            false,
        )
        .unwrap();
        assert_eq!(stops.positions, vec![0.0, 1.0]);
    }

    #[test]
    fn background_paint_dims_when_alpha_enabled() {
        let paints = resolve_paints(&inputs(None, &[]));
        match &paints.background.fill {
            PaintFill::Solid(c) => assert_eq!(*c, Rgba::new(200, 30, 30, 77)),
            PaintFill::Sweep(_) => panic!("background must stay solid"),
        }

        let mut raw = inputs(None, &[]);
        raw.background_alpha = false;
        let paints = resolve_paints(&raw);
        match &paints.background.fill {
            PaintFill::Solid(c) => assert_eq!(*c, Rgba::rgb(200, 30, 30)),
            PaintFill::Sweep(_) => panic!("background must stay solid"),
        }
    }

    #[test]
    fn rounded_cap_applies_to_progress_and_shadow() {
        let mut raw = inputs(None, &[]);
        raw.rounded = true;
        let paints = resolve_paints(&raw);
        assert_eq!(
            paints.progress.style,
            PaintStyle::Stroke {
                width: 10.0,
                cap: StrokeCap::Round
            }
        );
        assert_eq!(
            paints.shadow.style,
            PaintStyle::Stroke {
                width: 10.0,
                cap: StrokeCap::Round
            }
        );
        // The track never rounds.
        assert_eq!(
            paints.background.style,
            PaintStyle::Stroke {
                width: 10.0,
                cap: StrokeCap::Butt
            }
        );
    }

    #[test]
    fn shader_replaces_the_solid_progress_fill() {
        let gradient = GradientStops::resolve(
            &[Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255)],
            None,
            false,
        )
        .unwrap()
        .anchored(50.0, 50.0);
        let raw = inputs(Some(&gradient), &[]);
        let paints = resolve_paints(&raw);
        assert!(matches!(paints.progress.fill, PaintFill::Sweep(_)));
    }

    #[test]
    fn missing_segment_colors_pad_as_transparent() {
        let colors = [Rgba::rgb(255, 0, 0), Rgba::rgb(0, 255, 0)];
        let mut raw = inputs(None, &colors);
        raw.segment_count = 3;
        let paints = resolve_paints(&raw);
        assert_eq!(paints.segments.len(), 3);
        match &paints.segments[2].fill {
            PaintFill::Solid(c) => assert_eq!(*c, Rgba::default()),
            PaintFill::Sweep(_) => panic!("segments must stay solid"),
        }
    }

    #[test]
    fn shadow_is_translucent_black_at_stroke_width() {
        let paints = resolve_paints(&inputs(None, &[]));
        match &paints.shadow.fill {
            PaintFill::Solid(c) => assert_eq!(*c, Rgba::new(0, 0, 0, 51)),
            PaintFill::Sweep(_) => panic!("shadow must stay solid"),
        }
    }
}
