//! Sway Animation
//!
//! Tick-driven tweens and timelines for single-threaded hosts.
//!
//! # Features
//!
//! - **Tweens**: Interpolate numeric channels of any target through a registered accessor
//! - **Timelines**: Compose animations into nested sequences and parallel groups
//! - **Repeat & Yoyo**: Delays, repeat delays and alternating direction at every level
//! - **Reversible**: Negative deltas rewind, and large jumps never replay every iteration
//! - **Manager**: Ticks top-level animations and cancels them by target

pub mod accessor;
pub mod animation;
pub mod easing;
pub mod error;
pub mod events;
pub mod manager;
pub mod stepper;
pub mod timeline;
pub mod tween;

pub use accessor::{AccessorRegistry, Target, TargetId, TweenAccessor};
pub use animation::{Animation, IntoAnimation};
pub use easing::{Curve, Easing};
pub use error::{BuildError, Result};
pub use events::{EventMask, TweenCallback, TweenEvent};
pub use manager::{AnimationId, TweenManager};
pub use stepper::{Repeat, Stepper, Transition};
pub use timeline::{Timeline, TimelineBuilder, TimelineMode};
pub use tween::{Tween, TweenBuilder};
