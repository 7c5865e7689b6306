//! Sequence and parallel composites
//!
//! A [`Timeline`] owns an ordered list of child animations and replays its
//! own transitions onto them. In a sequence every child is offset by the
//! children before it; in a parallel group they all start together.
//!
//! ```ignore
//! let mut manager = TweenManager::new();
//! Timeline::sequence()
//!     .push(Tween::set(&registry, &sprite, POSITION).target(&[0.0, 0.0]))
//!     .push(Tween::to(&registry, &sprite, OPACITY, 0.5).target(&[1.0]))
//!     .begin_parallel()
//!         .push(Tween::to(&registry, &sprite, POSITION, 1.0).target(&[100.0, 0.0]))
//!         .push(Tween::to(&registry, &sprite, SCALE, 1.0).target(&[2.0, 2.0]))
//!     .end()
//!     .push_pause(1.0)
//!     .push(Tween::to(&registry, &sprite, OPACITY, 0.5).target(&[0.0]))
//!     .repeat_yoyo(Repeat::Times(2), 0.5)
//!     .start_in(&mut manager)?;
//! ```

use crate::accessor::TargetId;
use crate::animation::{Animation, IntoAnimation, Timing};
use crate::error::{check_time, BuildError, Result};
use crate::events::{EventMask, TweenCallback, TweenEvent};
use crate::manager::{AnimationId, TweenManager};
use crate::stepper::{Repeat, StepHooks, Stepper, Transition};
use crate::tween::Tween;

/// How a timeline lays out its children
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineMode {
    /// Children play one after another
    Sequence,
    /// Children start together
    Parallel,
}

/// A composite animation owning its children
pub struct Timeline {
    mode: TimelineMode,
    children: Vec<Animation>,
}

impl Timeline {
    /// Start building a timeline whose children play one after another
    pub fn sequence() -> TimelineBuilder {
        TimelineBuilder::new(TimelineMode::Sequence)
    }

    /// Start building a timeline whose children play together
    pub fn parallel() -> TimelineBuilder {
        TimelineBuilder::new(TimelineMode::Parallel)
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn children(&self) -> &[Animation] {
        &self.children
    }

    pub(crate) fn start_children(&mut self) {
        for child in &mut self.children {
            child.start();
        }
    }

    pub(crate) fn free(&mut self) {
        while let Some(mut child) = self.children.pop() {
            child.free();
        }
    }

    pub(crate) fn contains_target(&self, id: TargetId) -> bool {
        self.children.iter().any(|c| c.contains_target_id(id))
    }

    fn update_ascending(&mut self, dt: f32) {
        for child in self.children.iter_mut() {
            child.update(dt);
        }
    }

    fn update_descending(&mut self, dt: f32) {
        for child in self.children.iter_mut().rev() {
            child.update(dt);
        }
    }

    fn update_children(&mut self, dt: f32) {
        if dt >= 0.0 {
            self.update_ascending(dt);
        } else {
            self.update_descending(dt);
        }
    }
}

impl StepHooks for Timeline {
    fn apply(&mut self, state: &Stepper, t: Transition) {
        let reverse_last = state.is_reverse(t.last_step);

        if !t.iteration && t.step > t.last_step {
            debug_assert!(t.delta >= 0.0, "forward boundary with delta {}", t.delta);
            // Overshoot so every child crosses its own end
            let dt = if reverse_last { -(t.delta + 1.0) } else { t.delta + 1.0 };
            self.update_ascending(dt);
        } else if !t.iteration && t.step < t.last_step {
            debug_assert!(t.delta <= 0.0, "backward boundary with delta {}", t.delta);
            let dt = if reverse_last { -(t.delta - 1.0) } else { t.delta - 1.0 };
            self.update_descending(dt);
        } else if t.step > t.last_step {
            debug_assert!(t.delta >= 0.0, "forward entry with delta {}", t.delta);
            if state.is_reverse(t.step) {
                self.force_end_values(state);
            } else {
                self.force_start_values(state);
            }
            self.update_ascending(t.delta);
        } else if t.step < t.last_step {
            debug_assert!(t.delta <= 0.0, "backward entry with delta {}", t.delta);
            if state.is_reverse(t.step) {
                self.force_start_values(state);
            } else {
                self.force_end_values(state);
            }
            self.update_descending(t.delta);
        } else {
            let dt = if state.is_reverse(t.step) { -t.delta } else { t.delta };
            self.update_children(dt);
        }
    }

    fn force_start_values(&mut self, _state: &Stepper) {
        for child in self.children.iter_mut().rev() {
            child.force_to_start();
        }
    }

    fn force_end_values(&mut self, state: &Stepper) {
        let duration = state.duration();
        for child in self.children.iter_mut() {
            child.force_to_end(duration);
        }
    }
}

struct Scope {
    mode: TimelineMode,
    children: Vec<Animation>,
}

impl Scope {
    fn new(mode: TimelineMode) -> Self {
        Self {
            mode,
            children: Vec::new(),
        }
    }

    /// Lays the children out and computes the scope's iteration length
    fn finalize(mut self, timing: Timing) -> Result<Animation> {
        let mut duration = 0.0_f32;
        for child in &mut self.children {
            let full = child.full_duration().ok_or(BuildError::InfiniteChild)?;
            match self.mode {
                TimelineMode::Sequence => {
                    child.offset(duration);
                    duration += full;
                }
                TimelineMode::Parallel => duration = duration.max(full),
            }
        }

        let timeline = Timeline {
            mode: self.mode,
            children: self.children,
        };
        Animation::timeline(duration, timeline, timing)
    }
}

/// Builds a [`Timeline`] tree.
///
/// Nested scopes are opened with [`begin_parallel`](Self::begin_parallel) /
/// [`begin_sequence`](Self::begin_sequence) and closed with
/// [`end`](Self::end). Errors are recorded as they happen and reported by
/// [`build`](Self::build); every call after the first error is ignored.
pub struct TimelineBuilder {
    scopes: Vec<Scope>,
    timing: Timing,
    error: Option<BuildError>,
}

impl TimelineBuilder {
    fn new(mode: TimelineMode) -> Self {
        Self {
            scopes: vec![Scope::new(mode)],
            timing: Timing::default(),
            error: None,
        }
    }

    fn fail(&mut self, error: BuildError) {
        tracing::warn!(%error, "timeline builder error");
        self.error = Some(error);
    }

    fn current(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Append a child to the innermost open scope
    pub fn push(mut self, child: impl IntoAnimation) -> Self {
        if self.error.is_some() {
            return self;
        }
        match child.into_animation() {
            Ok(animation) if animation.full_duration().is_none() => {
                self.fail(BuildError::InfiniteChild)
            }
            Ok(animation) => self.current().children.push(animation),
            Err(error) => self.fail(error),
        }
        self
    }

    /// Append a placeholder that only consumes `duration`
    pub fn push_pause(mut self, duration: f32) -> Self {
        if self.error.is_some() {
            return self;
        }
        match check_time("pause", duration) {
            Ok(duration) => self.push(Tween::mark().delay(duration)),
            Err(error) => {
                self.fail(error);
                self
            }
        }
    }

    /// Open a nested scope whose children play together
    pub fn begin_parallel(mut self) -> Self {
        self.scopes.push(Scope::new(TimelineMode::Parallel));
        self
    }

    /// Open a nested scope whose children play one after another
    pub fn begin_sequence(mut self) -> Self {
        self.scopes.push(Scope::new(TimelineMode::Sequence));
        self
    }

    /// Close the innermost scope and push it into its parent
    pub fn end(mut self) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.scopes.len() < 2 {
            self.fail(BuildError::UnmatchedEnd);
            return self;
        }
        let Some(scope) = self.scopes.pop() else {
            return self;
        };
        match scope.finalize(Timing::default()) {
            Ok(animation) => self.current().children.push(animation),
            Err(error) => self.fail(error),
        }
        self
    }

    // ========================================================================
    // Root timing
    // ========================================================================

    pub fn repeat(mut self, repeat: Repeat, repeat_delay: f32) -> Self {
        self.timing.repeat(repeat, repeat_delay, false);
        self
    }

    /// Repeat, playing every other iteration backward
    pub fn repeat_yoyo(mut self, repeat: Repeat, repeat_delay: f32) -> Self {
        self.timing.repeat(repeat, repeat_delay, true);
        self
    }

    /// Add to the initial delay
    pub fn delay(mut self, delay: f32) -> Self {
        self.timing.delay += delay;
        self
    }

    pub fn callback(mut self, callback: impl FnMut(TweenEvent) + 'static, triggers: EventMask) -> Self {
        self.timing.callback = Some(Box::new(callback) as TweenCallback);
        self.timing.triggers = triggers;
        self
    }

    /// Keep the timeline in its manager once finished
    pub fn auto_remove(mut self, auto_remove: bool) -> Self {
        self.timing.auto_remove = auto_remove;
        self
    }

    // ========================================================================
    // Finalization
    // ========================================================================

    pub fn build(mut self) -> Result<Animation> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.scopes.len() > 1 {
            return Err(BuildError::UnclosedScope {
                depth: self.scopes.len() - 1,
            });
        }
        let Some(root) = self.scopes.pop() else {
            return Err(BuildError::UnmatchedEnd);
        };
        root.finalize(self.timing)
    }

    /// Build and arm the timeline
    pub fn start(self) -> Result<Animation> {
        let mut animation = self.build()?;
        animation.start();
        Ok(animation)
    }

    /// Build, arm and hand the timeline to a manager
    pub fn start_in(self, manager: &mut TweenManager) -> Result<AnimationId> {
        Ok(manager.add(self.start()?))
    }
}
