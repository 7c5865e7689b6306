//! Leaf tweens: interpolate the channels of one target

use smallvec::SmallVec;

use crate::accessor::{AccessorRegistry, Binding, Target, TargetId};
use crate::animation::{Animation, Timing};
use crate::easing::Easing;
use crate::error::{BuildError, Result};
use crate::events::{EventMask, TweenCallback, TweenEvent};
use crate::manager::{AnimationId, TweenManager};
use crate::stepper::{Repeat, StepHooks, Stepper, Transition};

/// Most property groups have four channels or fewer
type Values = SmallVec<[f32; 4]>;

/// Durations below this are treated as instantaneous
const INSTANT: f32 = 1e-11;

/// A leaf animation: moves a target's channels from start to end values.
///
/// Tweens without a target (markers, pauses, callbacks) only consume time.
pub struct Tween {
    binding: Option<Box<dyn Binding>>,
    tween_type: u32,
    easing: Easing,
    from: bool,
    relative: bool,
    requested: Values,
    start: Values,
    end: Values,
    buffer: Values,
}

impl Tween {
    /// Animate from the target's current values to the given ones
    pub fn to<T: 'static>(
        registry: &AccessorRegistry,
        target: &Target<T>,
        tween_type: u32,
        duration: f32,
    ) -> TweenBuilder {
        TweenBuilder::bound(registry, target, tween_type, duration, false)
    }

    /// Animate from the given values to the target's current ones
    pub fn from<T: 'static>(
        registry: &AccessorRegistry,
        target: &Target<T>,
        tween_type: u32,
        duration: f32,
    ) -> TweenBuilder {
        TweenBuilder::bound(registry, target, tween_type, duration, true)
    }

    /// Snap the target to the given values when reached
    pub fn set<T: 'static>(
        registry: &AccessorRegistry,
        target: &Target<T>,
        tween_type: u32,
    ) -> TweenBuilder {
        TweenBuilder::bound(registry, target, tween_type, 0.0, false)
    }

    /// A zero-length marker that fires `callback` when reached
    pub fn call(callback: impl FnMut(TweenEvent) + 'static) -> TweenBuilder {
        TweenBuilder::unbound().callback(callback, EventMask::START)
    }

    /// A zero-length marker with no effect, useful as a delay holder
    pub fn mark() -> TweenBuilder {
        TweenBuilder::unbound()
    }

    pub fn tween_type(&self) -> u32 {
        self.tween_type
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn target_id(&self) -> Option<TargetId> {
        self.binding.as_ref().map(|b| b.target_id())
    }

    /// Start values captured when the tween initialized
    pub fn start_values(&self) -> &[f32] {
        &self.start
    }

    /// End values resolved when the tween initialized
    pub fn end_values(&self) -> &[f32] {
        &self.end
    }

    pub(crate) fn contains_target(&self, id: TargetId) -> bool {
        self.target_id() == Some(id)
    }

    pub(crate) fn free(&mut self) {
        self.binding = None;
    }

    fn write(&self, values: &[f32]) {
        if let Some(binding) = &self.binding {
            binding.write(self.tween_type, values);
        }
    }
}

impl StepHooks for Tween {
    fn initialize(&mut self, _state: &Stepper) {
        let Some(binding) = &self.binding else {
            return;
        };

        binding.read(self.tween_type, &mut self.start);
        for i in 0..self.start.len() {
            let requested = self.requested[i];
            self.end[i] = if self.relative {
                self.start[i] + requested
            } else {
                requested
            };
            if self.from {
                std::mem::swap(&mut self.start[i], &mut self.end[i]);
            }
        }
    }

    fn apply(&mut self, state: &Stepper, t: Transition) {
        if self.binding.is_none() {
            return;
        }

        if !t.iteration {
            // Boundary: land exactly on the side the iteration ended on
            let at_end = (t.step > t.last_step) != state.is_reverse(t.last_step);
            self.write(if at_end { &self.end } else { &self.start });
            return;
        }

        let duration = state.duration();
        let time = state.current_time();
        debug_assert!(
            (0.0..=duration).contains(&time),
            "tween time {time} outside iteration 0..={duration}"
        );

        if duration < INSTANT {
            let at_end = (t.delta >= 0.0) != state.is_reverse(t.step);
            self.write(if at_end { &self.end } else { &self.start });
            return;
        }

        let time = if state.is_reverse(t.step) {
            duration - time
        } else {
            time
        };
        let eased = self.easing.apply(time / duration);

        for i in 0..self.buffer.len() {
            self.buffer[i] = self.start[i] + eased * (self.end[i] - self.start[i]);
        }
        self.write(&self.buffer);
    }

    fn force_start_values(&mut self, _state: &Stepper) {
        self.write(&self.start);
    }

    fn force_end_values(&mut self, _state: &Stepper) {
        self.write(&self.end);
    }
}

/// Configures a [`Tween`] before it is built
pub struct TweenBuilder {
    binding: Result<Option<Box<dyn Binding>>>,
    tween_type: u32,
    duration: f32,
    from: bool,
    relative: bool,
    values: Values,
    easing: Easing,
    timing: Timing,
}

impl TweenBuilder {
    fn bound<T: 'static>(
        registry: &AccessorRegistry,
        target: &Target<T>,
        tween_type: u32,
        duration: f32,
        from: bool,
    ) -> Self {
        Self {
            binding: registry.bind(target).map(Some),
            tween_type,
            duration,
            from,
            relative: false,
            values: Values::new(),
            easing: Easing::default(),
            timing: Timing::default(),
        }
    }

    fn unbound() -> Self {
        Self {
            binding: Ok(None),
            tween_type: 0,
            duration: 0.0,
            from: false,
            relative: false,
            values: Values::new(),
            easing: Easing::default(),
            timing: Timing::default(),
        }
    }

    /// Set the end values (start values for `from` tweens)
    pub fn target(mut self, values: &[f32]) -> Self {
        self.values = Values::from_slice(values);
        self.relative = false;
        self
    }

    /// Set the values as offsets from the target's values at initialization
    pub fn target_relative(mut self, values: &[f32]) -> Self {
        self.values = Values::from_slice(values);
        self.relative = true;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Add to the initial delay
    pub fn delay(mut self, delay: f32) -> Self {
        self.timing.delay += delay;
        self
    }

    pub fn repeat(mut self, repeat: Repeat, repeat_delay: f32) -> Self {
        self.timing.repeat(repeat, repeat_delay, false);
        self
    }

    /// Repeat, playing every other iteration backward
    pub fn repeat_yoyo(mut self, repeat: Repeat, repeat_delay: f32) -> Self {
        self.timing.repeat(repeat, repeat_delay, true);
        self
    }

    pub fn callback(mut self, callback: impl FnMut(TweenEvent) + 'static, triggers: EventMask) -> Self {
        self.timing.callback = Some(Box::new(callback) as TweenCallback);
        self.timing.triggers = triggers;
        self
    }

    /// Keep the tween in its manager once finished
    pub fn auto_remove(mut self, auto_remove: bool) -> Self {
        self.timing.auto_remove = auto_remove;
        self
    }

    pub fn build(self) -> Result<Animation> {
        let binding = self.binding?;

        let channels = match &binding {
            Some(b) => {
                let expected = b.channels(self.tween_type);
                if self.values.len() != expected {
                    return Err(BuildError::ChannelMismatch {
                        expected,
                        got: self.values.len(),
                    });
                }
                expected
            }
            None => 0,
        };

        let tween = Tween {
            binding,
            tween_type: self.tween_type,
            easing: self.easing,
            from: self.from,
            relative: self.relative,
            requested: self.values,
            start: SmallVec::from_elem(0.0, channels),
            end: SmallVec::from_elem(0.0, channels),
            buffer: SmallVec::from_elem(0.0, channels),
        };

        Animation::tween(self.duration, tween, self.timing)
    }

    /// Build and arm the tween
    pub fn start(self) -> Result<Animation> {
        let mut animation = self.build()?;
        animation.start();
        Ok(animation)
    }

    /// Build, arm and hand the tween to a manager
    pub fn start_in(self, manager: &mut TweenManager) -> Result<AnimationId> {
        Ok(manager.add(self.start()?))
    }
}
