//! progress-ring - Circular progress indicator rendered with tiny-skia.
//!
//! The host application owns the window and the event loop; this crate owns
//! the ring itself: layout, animation timing, styling and rasterization onto
//! an offscreen canvas.

pub mod error;
pub mod render;
pub mod ring;

pub use error::Error;
pub use render::{Canvas, Rect, Rgba, StrokeCap, SweepGradient, rgb};
pub use ring::animation::{DEFAULT_ANIMATION, Easing, FnCallbacks, RingCallbacks};
pub use ring::geometry::{Density, ThumbScale};
pub use ring::style::{DrawOp, PaintFill, PaintSpec, PaintStyle};
pub use ring::{ProgressRing, RingAttrs};

/// Creates a new ring configuration with the stock look: black, 10dp stroke,
/// shadow on, growing clockwise from 12 o'clock.
///
/// # Example
///
/// ```
/// use progress_ring::{ring, Density, rgb};
///
/// let mut gauge = ring()
///     .color(rgb(63, 81, 181))
///     .rounded(true)
///     .progress(42.0)
///     .build(Density(1.0));
/// gauge.layout(200.0, 200.0);
/// assert_eq!(gauge.side(), 200.0);
/// ```
pub fn ring() -> RingAttrs {
    RingAttrs::new()
}
