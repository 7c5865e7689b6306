//! The animation node: a stepper driving either a tween or a timeline

use std::fmt;

use crate::accessor::{Target, TargetId};
use crate::error::{check_time, Result};
use crate::events::{EventMask, TweenCallback};
use crate::manager::{AnimationId, TweenManager};
use crate::stepper::{Repeat, Stepper};
use crate::timeline::{Timeline, TimelineBuilder, TimelineMode};
use crate::tween::{Tween, TweenBuilder};

enum Body {
    Tween(Tween),
    Timeline(Timeline),
}

/// A started or startable animation, the unit a [`TweenManager`] owns.
///
/// Leaves are [`Tween`]s; composites are [`Timeline`]s owning their
/// children. Both share the same delay/repeat stepping.
pub struct Animation {
    state: Stepper,
    body: Body,
    auto_remove: bool,
}

impl Animation {
    pub(crate) fn tween(duration: f32, tween: Tween, timing: Timing) -> Result<Self> {
        Self::assemble(duration, Body::Tween(tween), timing)
    }

    pub(crate) fn timeline(duration: f32, timeline: Timeline, timing: Timing) -> Result<Self> {
        Self::assemble(duration, Body::Timeline(timeline), timing)
    }

    fn assemble(duration: f32, body: Body, timing: Timing) -> Result<Self> {
        let mut state = Stepper::new(check_time("duration", duration)?);
        let auto_remove = timing.auto_remove;
        timing.configure(&mut state)?;
        Ok(Self {
            state,
            body,
            auto_remove,
        })
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance by a signed delta (negative rewinds)
    pub fn update(&mut self, delta: f32) {
        match &mut self.body {
            Body::Tween(tween) => self.state.update(delta, tween),
            Body::Timeline(timeline) => self.state.update(delta, timeline),
        }
    }

    /// Jump to the state before the initial delay
    pub fn force_to_start(&mut self) {
        match &mut self.body {
            Body::Tween(tween) => self.state.force_to_start(tween),
            Body::Timeline(timeline) => self.state.force_to_start(timeline),
        }
    }

    /// Jump to the completed state, `time` being the parent's clock
    pub fn force_to_end(&mut self, time: f32) {
        match &mut self.body {
            Body::Tween(tween) => self.state.force_to_end(time, tween),
            Body::Timeline(timeline) => self.state.force_to_end(time, timeline),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Arm the animation (and every child) at local time zero
    pub fn start(&mut self) {
        self.state.arm();
        if let Body::Timeline(timeline) = &mut self.body {
            timeline.start_children();
        }
    }

    /// Arm the animation and hand it to a manager
    pub fn start_in(mut self, manager: &mut TweenManager) -> AnimationId {
        self.start();
        manager.add(self)
    }

    /// Release targets, callbacks and children; updates are ignored afterwards
    pub fn free(&mut self) {
        match &mut self.body {
            Body::Tween(tween) => tween.free(),
            Body::Timeline(timeline) => timeline.free(),
        }
        self.state.release();
    }

    /// Stop for good; the manager drops it on its next update
    pub fn kill(&mut self) {
        self.state.kill();
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn resume(&mut self) {
        self.state.resume();
    }

    pub fn set_auto_remove(&mut self, auto_remove: bool) {
        self.auto_remove = auto_remove;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether this animation or any descendant moves `target`
    pub fn contains_target<T>(&self, target: &Target<T>) -> bool {
        self.contains_target_id(TargetId::of(target))
    }

    pub fn contains_target_id(&self, id: TargetId) -> bool {
        match &self.body {
            Body::Tween(tween) => tween.contains_target(id),
            Body::Timeline(timeline) => timeline.contains_target(id),
        }
    }

    /// Phase and timing state
    pub fn state(&self) -> &Stepper {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_started(&self) -> bool {
        self.state.is_started()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn auto_remove(&self) -> bool {
        self.auto_remove
    }

    pub fn delay(&self) -> f32 {
        self.state.delay()
    }

    pub fn duration(&self) -> f32 {
        self.state.duration()
    }

    pub fn full_duration(&self) -> Option<f32> {
        self.state.full_duration()
    }

    pub fn as_tween(&self) -> Option<&Tween> {
        match &self.body {
            Body::Tween(tween) => Some(tween),
            Body::Timeline(_) => None,
        }
    }

    pub fn as_timeline(&self) -> Option<&Timeline> {
        match &self.body {
            Body::Timeline(timeline) => Some(timeline),
            Body::Tween(_) => None,
        }
    }

    /// Number of leaf tweens in this tree
    pub fn tween_count(&self) -> usize {
        match &self.body {
            Body::Tween(_) => 1,
            Body::Timeline(timeline) => timeline.children().iter().map(Animation::tween_count).sum(),
        }
    }

    /// Number of timelines in this tree, this one included
    pub fn timeline_count(&self) -> usize {
        match &self.body {
            Body::Tween(_) => 0,
            Body::Timeline(timeline) => {
                1 + timeline
                    .children()
                    .iter()
                    .map(Animation::timeline_count)
                    .sum::<usize>()
            }
        }
    }

    /// Shift the start when laid out in a sequence
    pub(crate) fn offset(&mut self, delay: f32) {
        self.state.add_delay(delay);
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.body {
            Body::Tween(_) => "Tween",
            Body::Timeline(timeline) => match timeline.mode() {
                TimelineMode::Sequence => "Sequence",
                TimelineMode::Parallel => "Parallel",
            },
        };
        f.debug_struct("Animation")
            .field("kind", &kind)
            .field("delay", &self.state.delay())
            .field("duration", &self.state.duration())
            .field("repeat", &self.state.repeat())
            .field("step", &self.state.step())
            .field("finished", &self.state.is_finished())
            .finish_non_exhaustive()
    }
}

/// Timing options shared by tween and timeline builders
pub(crate) struct Timing {
    pub delay: f32,
    repeat: Repeat,
    repeat_delay: f32,
    yoyo: bool,
    pub callback: Option<TweenCallback>,
    pub triggers: EventMask,
    pub auto_remove: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            delay: 0.0,
            repeat: Repeat::default(),
            repeat_delay: 0.0,
            yoyo: false,
            callback: None,
            triggers: EventMask::default(),
            auto_remove: true,
        }
    }
}

impl Timing {
    pub fn repeat(&mut self, repeat: Repeat, repeat_delay: f32, yoyo: bool) {
        self.repeat = repeat;
        self.repeat_delay = repeat_delay;
        self.yoyo = yoyo;
    }

    fn configure(self, stepper: &mut Stepper) -> Result<()> {
        stepper.add_delay(check_time("delay", self.delay)?);
        stepper.set_repeat(
            self.repeat,
            check_time("repeat delay", self.repeat_delay)?,
            self.yoyo,
        );
        stepper.set_callback(self.callback, self.triggers);
        Ok(())
    }
}

/// Anything a timeline can take as a child
pub trait IntoAnimation {
    fn into_animation(self) -> Result<Animation>;
}

impl IntoAnimation for Animation {
    fn into_animation(self) -> Result<Animation> {
        Ok(self)
    }
}

impl IntoAnimation for Result<Animation> {
    fn into_animation(self) -> Result<Animation> {
        self
    }
}

impl IntoAnimation for TweenBuilder {
    fn into_animation(self) -> Result<Animation> {
        self.build()
    }
}

impl IntoAnimation for TimelineBuilder {
    fn into_animation(self) -> Result<Animation> {
        self.build()
    }
}
