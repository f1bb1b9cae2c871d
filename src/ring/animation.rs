//! Progress animation: easing curves and a single-session animator advanced
//! by host ticks.

use std::time::{Duration, Instant};

use tracing::debug;

/// Default animation length.
pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(1000);

/// Easing curve applied to the animation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Fast start easing out, `1 - (1 - t)^2`.
    #[default]
    Decelerate,
    Linear,
    /// Slow start speeding up, `t^2`.
    Accelerate,
    /// Smoothstep in and out.
    EaseInOut,
}

impl Easing {
    /// Maps linear time `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::Accelerate => t * t,
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionKind {
    Forward,
    /// Always lands on zero, whatever the requested target was.
    Reset,
}

/// One in-flight progress animation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AnimationSession {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
    curve: Easing,
    kind: SessionKind,
}

/// Result of advancing the animator by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TickUpdate {
    pub value: f32,
    pub finished: bool,
}

/// Drives at most one animation session at a time. Starting a new session
/// replaces an in-flight one without reporting it as finished.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum Animator {
    #[default]
    Idle,
    Animating(AnimationSession),
}

impl Animator {
    pub(crate) fn start(
        &mut self,
        from: f32,
        to: f32,
        duration: Duration,
        curve: Easing,
        kind: SessionKind,
        now: Instant,
    ) {
        let to = match kind {
            SessionKind::Forward => to,
            SessionKind::Reset => 0.0,
        };
        if self.is_animating() {
            debug!(from, to, "replacing in-flight animation session");
        } else {
            debug!(from, to, ?duration, "starting animation session");
        }
        *self = Animator::Animating(AnimationSession {
            from,
            to,
            started: now,
            duration,
            curve,
            kind,
        });
    }

    pub(crate) fn cancel(&mut self) {
        if self.is_animating() {
            debug!("cancelling animation session");
        }
        *self = Animator::Idle;
    }

    pub(crate) fn is_animating(&self) -> bool {
        matches!(self, Animator::Animating(_))
    }

    /// Samples the active session at `now`, returning the progress value for
    /// this tick. `finished` is reported exactly once, when the session runs
    /// out and the animator lands back on idle. Idle ticks return `None`.
    pub(crate) fn tick(&mut self, now: Instant) -> Option<TickUpdate> {
        let session = match self {
            Animator::Idle => return None,
            Animator::Animating(s) => *s,
        };
        let elapsed = now.saturating_duration_since(session.started);
        let t = if session.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / session.duration.as_secs_f32()).min(1.0)
        };
        let eased = session.curve.apply(t);
        let value = (session.from + (session.to - session.from) * eased).round();
        let finished = t >= 1.0;
        if finished {
            debug!(value, kind = ?session.kind, "animation session finished");
            *self = Animator::Idle;
        }
        Some(TickUpdate { value, finished })
    }
}

/// Host hooks observing animator-driven progress changes.
pub trait RingCallbacks {
    /// A tick moved the progress value.
    fn on_progress_changed(&mut self, progress: f32) {
        let _ = progress;
    }

    /// A session ran to natural completion. Replaced or cancelled sessions
    /// never report.
    fn on_animation_finished(&mut self, progress: f32) {
        let _ = progress;
    }
}

/// Adapts a pair of closures into [`RingCallbacks`].
pub struct FnCallbacks<C, F>
where
    C: FnMut(f32),
    F: FnMut(f32),
{
    changed: C,
    finished: F,
}

impl<C, F> FnCallbacks<C, F>
where
    C: FnMut(f32),
    F: FnMut(f32),
{
    pub fn new(changed: C, finished: F) -> Self {
        Self {
            changed,
            finished,
        }
    }
}

impl<C, F> RingCallbacks for FnCallbacks<C, F>
where
    C: FnMut(f32),
    F: FnMut(f32),
{
    fn on_progress_changed(&mut self, progress: f32) {
        (self.changed)(progress)
    }

    fn on_animation_finished(&mut self, progress: f32) {
        (self.finished)(progress)
    }
}
