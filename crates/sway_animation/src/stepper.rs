//! Delay / iteration / repeat stepping shared by tweens and timelines.
//!
//! Every animation walks the same phase counter:
//!
//! ```text
//!   step:  -1        0        1          2        ...   2n       2n+1
//!        [delay][iteration][repeat delay][iteration] ... [iteration][done]
//! ```
//!
//! Iterations sit on even steps and repeat delays on odd ones. A finite
//! animation with `n` repeats is valid while `0 <= step <= 2n`; leaving that
//! range in either direction finishes it. Odd iterations (`step % 4 == 2`)
//! play backward when yoyo is enabled.
//!
//! [`Stepper::update`] turns one signed delta into a series of
//! [`Transition`]s handed to a [`StepHooks`] implementation, which is where
//! tweens interpolate and timelines propagate to their children.

use crate::events::{EventMask, TweenCallback, TweenEvent};

/// Steps replayed one boundary at a time before a large jump short-circuits
const REPLAY_LIMIT: i64 = 8;

/// How many times an animation plays after its first iteration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Play once plus `n` repetitions
    Times(u32),
    /// Never finish
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(0)
    }
}

/// One step of the phase state machine, as seen by the animation body.
///
/// `iteration == false` marks an iteration boundary being crossed: `delta`
/// is then the time needed to reach it (`>= 0` forward, `<= 0` backward).
/// An iteration transition with `step != last_step` marks entry into a new
/// iteration and always carries a zero delta; with `step == last_step` it
/// carries the time elapsed inside the current iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub step: i64,
    pub last_step: i64,
    pub iteration: bool,
    pub delta: f32,
}

/// Callbacks a stepper drives while it advances.
pub(crate) trait StepHooks {
    /// Called once, when the initial delay elapses for the first time
    fn initialize(&mut self, _state: &Stepper) {}

    fn apply(&mut self, state: &Stepper, transition: Transition);

    fn force_start_values(&mut self, state: &Stepper);

    fn force_end_values(&mut self, state: &Stepper);
}

/// Timing parameters plus the runtime phase of one animation
pub struct Stepper {
    delay: f32,
    duration: f32,
    repeat: Repeat,
    repeat_delay: f32,
    yoyo: bool,

    step: i64,
    current_time: f32,
    iteration_step: bool,

    started: bool,
    initialized: bool,
    finished: bool,
    killed: bool,
    paused: bool,

    callback: Option<TweenCallback>,
    triggers: EventMask,
}

impl Stepper {
    pub(crate) fn new(duration: f32) -> Self {
        Self {
            delay: 0.0,
            duration,
            repeat: Repeat::default(),
            repeat_delay: 0.0,
            yoyo: false,
            step: -1,
            current_time: 0.0,
            iteration_step: false,
            started: false,
            initialized: false,
            finished: false,
            killed: false,
            paused: false,
            callback: None,
            triggers: EventMask::default(),
        }
    }

    // ========================================================================
    // Configuration (fixed once started)
    // ========================================================================

    pub(crate) fn add_delay(&mut self, delay: f32) {
        debug_assert!(!self.started, "timing changed after start");
        self.delay += delay;
    }

    pub(crate) fn set_repeat(&mut self, repeat: Repeat, repeat_delay: f32, yoyo: bool) {
        debug_assert!(!self.started, "timing changed after start");
        self.repeat = repeat;
        self.repeat_delay = repeat_delay.max(0.0);
        self.yoyo = yoyo;
    }

    pub(crate) fn set_callback(&mut self, callback: Option<TweenCallback>, triggers: EventMask) {
        self.callback = callback;
        self.triggers = triggers;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn repeat_delay(&self) -> f32 {
        self.repeat_delay
    }

    pub fn is_yoyo(&self) -> bool {
        self.yoyo
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Time inside the current phase (iteration or repeat delay)
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// True once every repetition played out (or rewound past the start),
    /// or the animation was killed
    pub fn is_finished(&self) -> bool {
        self.finished || self.killed
    }

    /// Delay plus every iteration and repeat delay; `None` when repeating forever
    pub fn full_duration(&self) -> Option<f32> {
        match self.repeat {
            Repeat::Times(n) => {
                Some(self.delay + self.duration + (self.repeat_delay + self.duration) * n as f32)
            }
            Repeat::Forever => None,
        }
    }

    /// Whether the iteration at `step` plays its interpolation backward
    pub fn is_reverse(&self, step: i64) -> bool {
        self.yoyo && step.rem_euclid(4) == 2
    }

    /// Step of the final iteration; every `u32` repeat count fits in `i64`
    fn last_iteration(&self) -> Option<i64> {
        match self.repeat {
            Repeat::Times(n) => Some(2 * i64::from(n)),
            Repeat::Forever => None,
        }
    }

    fn is_valid(&self, step: i64) -> bool {
        match self.last_iteration() {
            Some(last) => (0..=last).contains(&step),
            None => true,
        }
    }

    /// Time elapsed since iteration 0 started, for a valid step
    fn position(&self) -> f32 {
        let cycle = self.duration + self.repeat_delay;
        if self.step % 2 == 0 {
            (self.step / 2) as f32 * cycle + self.current_time
        } else {
            let done = (self.step + 1) / 2;
            done as f32 * self.duration + (done - 1) as f32 * self.repeat_delay + self.current_time
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Resets the phase to the beginning and arms the stepper
    pub(crate) fn arm(&mut self) {
        self.step = -1;
        self.current_time = 0.0;
        self.iteration_step = false;
        self.initialized = false;
        self.finished = false;
        self.killed = false;
        self.started = true;
    }

    pub(crate) fn pause(&mut self) {
        self.paused = true;
    }

    pub(crate) fn resume(&mut self) {
        self.paused = false;
    }

    pub(crate) fn kill(&mut self) {
        self.killed = true;
    }

    /// Drops the callback and disarms the stepper for good
    pub(crate) fn release(&mut self) {
        self.callback = None;
        self.killed = true;
        self.started = false;
    }

    fn emit(&mut self, event: TweenEvent) {
        if !self.triggers.contains(event) {
            return;
        }
        if let Some(callback) = self.callback.as_mut() {
            callback(event);
        }
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advances by a signed delta, dispatching every resulting transition.
    pub(crate) fn update<H: StepHooks>(&mut self, delta: f32, hooks: &mut H) {
        if !self.started || self.paused || self.killed {
            return;
        }

        let mut pending = delta;

        if !self.initialized {
            self.initialize(&mut pending, hooks);
        }

        if self.initialized {
            self.relaunch(&mut pending, hooks);
            if !self.short_circuit(&mut pending, hooks) {
                self.skip_cycles(&mut pending);
                self.advance(&mut pending, hooks);
            }
            self.finished = match self.last_iteration() {
                Some(last) => self.step < 0 || self.step > last,
                None => false,
            };
        }

        self.current_time += pending;
    }

    fn initialize<H: StepHooks>(&mut self, pending: &mut f32, hooks: &mut H) {
        if self.current_time + *pending < self.delay {
            return;
        }

        hooks.initialize(self);
        self.initialized = true;
        self.iteration_step = true;
        self.step = 0;
        *pending -= self.delay - self.current_time;
        self.current_time = 0.0;
        self.emit(TweenEvent::Begin);
        self.emit(TweenEvent::Start);
    }

    /// Re-enters the first or last iteration of a finished animation
    fn relaunch<H: StepHooks>(&mut self, pending: &mut f32, hooks: &mut H) {
        let Some(last) = self.last_iteration() else {
            return;
        };
        if self.iteration_step {
            return;
        }

        if self.step < 0 && self.current_time + *pending >= 0.0 {
            self.iteration_step = true;
            self.step = 0;
            *pending += self.current_time;
            self.current_time = 0.0;
            self.emit(TweenEvent::Begin);
            self.emit(TweenEvent::Start);
            let transition = Transition {
                step: 0,
                last_step: -1,
                iteration: true,
                delta: 0.0,
            };
            hooks.apply(self, transition);
        } else if self.step > last && self.current_time + *pending < 0.0 {
            self.iteration_step = true;
            self.step = last;
            *pending += self.current_time;
            self.current_time = self.duration;
            self.emit(TweenEvent::BackBegin);
            self.emit(TweenEvent::BackStart);
            let transition = Transition {
                step: last,
                last_step: last + 1,
                iteration: true,
                delta: 0.0,
            };
            hooks.apply(self, transition);
        }
    }

    /// Jumps straight to the forced end (or start) state when the delta
    /// overshoots the remaining span and more than [`REPLAY_LIMIT`] steps
    /// would otherwise be replayed.
    fn short_circuit<H: StepHooks>(&mut self, pending: &mut f32, hooks: &mut H) -> bool {
        let Some(last) = self.last_iteration() else {
            return false;
        };
        if !self.is_valid(self.step) {
            return false;
        }

        let position = self.position();
        let span = self.full_duration().unwrap_or(0.0) - self.delay;

        if *pending > 0.0 && last - self.step > REPLAY_LIMIT && position + *pending > span {
            tracing::trace!(step = self.step, delta = *pending, "jumping to end");
            *pending -= span - position;
            self.step = last + 1;
            self.iteration_step = false;
            self.current_time = 0.0;
            if self.is_reverse(last) {
                hooks.force_start_values(self);
            } else {
                hooks.force_end_values(self);
            }
            self.emit(TweenEvent::End);
            self.emit(TweenEvent::Complete);
            return true;
        }

        if *pending < 0.0 && self.step > REPLAY_LIMIT && position + *pending < 0.0 {
            tracing::trace!(step = self.step, delta = *pending, "jumping to start");
            *pending += position;
            self.step = -1;
            self.iteration_step = false;
            self.current_time = 0.0;
            if self.is_reverse(0) {
                hooks.force_end_values(self);
            } else {
                hooks.force_start_values(self);
            }
            self.emit(TweenEvent::BackEnd);
            self.emit(TweenEvent::BackComplete);
            return true;
        }

        false
    }

    /// Drops whole yoyo periods from an endless animation's delta.
    ///
    /// A period covers two iterations, so the step parity and the visible
    /// state are unchanged by the skip; one period is always left for the
    /// regular loop so the next iteration is entered and forced normally.
    fn skip_cycles(&mut self, pending: &mut f32) {
        if self.repeat != Repeat::Forever {
            return;
        }
        let period = 2.0 * (self.duration + self.repeat_delay);
        if period <= 0.0 {
            return;
        }
        let cycles = (pending.abs() / period).floor() - 1.0;
        if cycles >= 1.0 {
            *pending -= pending.signum() * cycles * period;
        }
    }

    fn advance<H: StepHooks>(&mut self, pending: &mut f32, hooks: &mut H) {
        while self.is_valid(self.step) {
            if !self.iteration_step && self.current_time + *pending <= 0.0 {
                // Back from a repeat delay into the previous iteration
                self.iteration_step = true;
                self.step -= 1;
                *pending += self.current_time;
                self.current_time = self.duration;
                self.emit(TweenEvent::BackStart);
                let transition = Transition {
                    step: self.step,
                    last_step: self.step + 1,
                    iteration: true,
                    delta: 0.0,
                };
                hooks.apply(self, transition);
            } else if !self.iteration_step && self.current_time + *pending >= self.repeat_delay {
                // Out of a repeat delay into the next iteration
                self.iteration_step = true;
                self.step += 1;
                *pending -= self.repeat_delay - self.current_time;
                self.current_time = 0.0;
                self.emit(TweenEvent::Start);
                let transition = Transition {
                    step: self.step,
                    last_step: self.step - 1,
                    iteration: true,
                    delta: 0.0,
                };
                hooks.apply(self, transition);
            } else if self.iteration_step && self.current_time + *pending < 0.0 {
                // Rewound past the start of the iteration
                self.iteration_step = false;
                self.step -= 1;
                let delta = -self.current_time;
                *pending -= delta;
                self.current_time = 0.0;
                tracing::trace!(step = self.step, "crossed iteration start backward");
                let transition = Transition {
                    step: self.step,
                    last_step: self.step + 1,
                    iteration: false,
                    delta,
                };
                hooks.apply(self, transition);
                self.emit(TweenEvent::BackEnd);

                if self.step < 0 && self.repeat != Repeat::Forever {
                    self.emit(TweenEvent::BackComplete);
                } else {
                    self.current_time = self.repeat_delay;
                }
            } else if self.iteration_step && self.current_time + *pending > self.duration {
                // Played past the end of the iteration
                self.iteration_step = false;
                self.step += 1;
                let delta = self.duration - self.current_time;
                *pending -= delta;
                self.current_time = self.duration;
                tracing::trace!(step = self.step, "crossed iteration end forward");
                let transition = Transition {
                    step: self.step,
                    last_step: self.step - 1,
                    iteration: false,
                    delta,
                };
                hooks.apply(self, transition);
                self.emit(TweenEvent::End);

                if matches!(self.last_iteration(), Some(last) if self.step > last) {
                    self.emit(TweenEvent::Complete);
                }
                self.current_time = 0.0;
            } else if self.iteration_step {
                let delta = std::mem::take(pending);
                self.current_time += delta;
                let transition = Transition {
                    step: self.step,
                    last_step: self.step,
                    iteration: true,
                    delta,
                };
                hooks.apply(self, transition);
                break;
            } else {
                self.current_time += std::mem::take(pending);
                break;
            }
        }
    }

    // ========================================================================
    // Forcing
    // ========================================================================

    /// Puts the animation back before its delay without stepping through
    /// the iterations in between.
    pub(crate) fn force_to_start<H: StepHooks>(&mut self, hooks: &mut H) {
        if !self.initialized {
            // Nothing was applied yet, only rewind the local clock
            self.current_time = 0.0;
            return;
        }

        self.current_time = -self.delay;
        self.step = -1;
        self.iteration_step = false;
        if self.is_reverse(0) {
            hooks.force_end_values(self);
        } else {
            hooks.force_start_values(self);
        }
    }

    /// Puts the animation in its completed state, as seen at `time` on the
    /// parent's clock.
    pub(crate) fn force_to_end<H: StepHooks>(&mut self, time: f32, hooks: &mut H) {
        if !self.initialized {
            hooks.initialize(self);
            self.initialized = true;
        }

        let (Some(last), Some(full)) = (self.last_iteration(), self.full_duration()) else {
            hooks.force_end_values(self);
            return;
        };

        self.current_time = time - full;
        self.step = last + 1;
        self.iteration_step = false;
        if self.is_reverse(last) {
            hooks.force_start_values(self);
        } else {
            hooks.force_end_values(self);
        }
    }
}
