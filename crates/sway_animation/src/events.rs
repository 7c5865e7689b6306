//! Lifecycle events fired while an animation steps

use std::fmt;
use std::ops::BitOr;

/// A lifecycle event of a tween or timeline.
///
/// Forward playback fires `Begin` once, then `Start`/`End` around every
/// iteration and `Complete` after the last one. Rewinding fires the `Back*`
/// mirror images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenEvent {
    Begin,
    Start,
    End,
    Complete,
    BackBegin,
    BackStart,
    BackEnd,
    BackComplete,
}

impl TweenEvent {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of events a callback is interested in
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventMask(u8);

impl EventMask {
    pub const NONE: Self = Self(0);
    pub const BEGIN: Self = Self(TweenEvent::Begin.bit());
    pub const START: Self = Self(TweenEvent::Start.bit());
    pub const END: Self = Self(TweenEvent::End.bit());
    pub const COMPLETE: Self = Self(TweenEvent::Complete.bit());
    pub const BACK_BEGIN: Self = Self(TweenEvent::BackBegin.bit());
    pub const BACK_START: Self = Self(TweenEvent::BackStart.bit());
    pub const BACK_END: Self = Self(TweenEvent::BackEnd.bit());
    pub const BACK_COMPLETE: Self = Self(TweenEvent::BackComplete.bit());
    pub const ANY_FORWARD: Self = Self(0x0f);
    pub const ANY_BACKWARD: Self = Self(0xf0);
    pub const ANY: Self = Self(0xff);

    pub const fn contains(self, event: TweenEvent) -> bool {
        self.0 & event.bit() != 0
    }

    pub const fn with(self, event: TweenEvent) -> Self {
        Self(self.0 | event.bit())
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::COMPLETE
    }
}

impl From<TweenEvent> for EventMask {
    fn from(event: TweenEvent) -> Self {
        Self(event.bit())
    }
}

impl BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ALL: [TweenEvent; 8] = [
            TweenEvent::Begin,
            TweenEvent::Start,
            TweenEvent::End,
            TweenEvent::Complete,
            TweenEvent::BackBegin,
            TweenEvent::BackStart,
            TweenEvent::BackEnd,
            TweenEvent::BackComplete,
        ];
        f.debug_set()
            .entries(ALL.iter().filter(|e| self.contains(**e)))
            .finish()
    }
}

/// Callback invoked for every event matching the animation's mask
pub type TweenCallback = Box<dyn FnMut(TweenEvent)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mask_is_complete_only() {
        let mask = EventMask::default();
        assert!(mask.contains(TweenEvent::Complete));
        assert!(!mask.contains(TweenEvent::Start));
        assert!(!mask.contains(TweenEvent::BackComplete));
    }

    #[test]
    fn test_mask_composition() {
        let mask = EventMask::START | EventMask::BACK_START;
        assert!(mask.contains(TweenEvent::Start));
        assert!(mask.contains(TweenEvent::BackStart));
        assert!(!mask.contains(TweenEvent::End));

        let mask = EventMask::NONE.with(TweenEvent::End);
        assert_eq!(mask, EventMask::END);
    }

    #[test]
    fn test_forward_backward_halves() {
        for event in [
            TweenEvent::Begin,
            TweenEvent::Start,
            TweenEvent::End,
            TweenEvent::Complete,
        ] {
            assert!(EventMask::ANY_FORWARD.contains(event));
            assert!(!EventMask::ANY_BACKWARD.contains(event));
        }
        assert!(EventMask::ANY_BACKWARD.contains(TweenEvent::BackEnd));
        assert_eq!(EventMask::ANY_FORWARD | EventMask::ANY_BACKWARD, EventMask::ANY);
    }
}
