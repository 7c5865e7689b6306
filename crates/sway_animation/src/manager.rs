//! Tween manager
//!
//! Owns the top-level animations and forwards the host's tick to them.

use slotmap::{new_key_type, SlotMap};

use crate::accessor::{Target, TargetId};
use crate::animation::Animation;

new_key_type! {
    /// Handle to an animation owned by a [`TweenManager`]
    pub struct AnimationId;
}

/// Updates every top-level animation once per tick and drops finished ones
pub struct TweenManager {
    animations: SlotMap<AnimationId, Animation>,
    paused: bool,
}

impl TweenManager {
    pub fn new() -> Self {
        Self {
            animations: SlotMap::with_key(),
            paused: false,
        }
    }

    /// Take ownership of an animation, arming it if it wasn't started yet
    pub fn add(&mut self, mut animation: Animation) -> AnimationId {
        if !animation.is_started() {
            animation.start();
        }
        let id = self.animations.insert(animation);
        tracing::debug!(?id, count = self.animations.len(), "animation added");
        id
    }

    /// Advance every animation by `delta`, then drop the finished ones
    pub fn update(&mut self, delta: f32) {
        if self.paused {
            return;
        }

        for (_, animation) in self.animations.iter_mut() {
            animation.update(delta);
        }

        self.animations.retain(|id, animation| {
            let done = animation.state().is_killed()
                || (animation.is_finished() && animation.auto_remove());
            if done {
                tracing::debug!(?id, "animation finished");
                animation.free();
            }
            !done
        });
    }

    /// Remove and free every animation that moves `target`
    pub fn kill_target<T>(&mut self, target: &Target<T>) -> usize {
        self.kill_target_id(TargetId::of(target))
    }

    pub fn kill_target_id(&mut self, target: TargetId) -> usize {
        let before = self.animations.len();
        self.animations.retain(|_, animation| {
            let hit = animation.contains_target_id(target);
            if hit {
                animation.free();
            }
            !hit
        });
        let killed = before - self.animations.len();
        tracing::debug!(?target, killed, "killed animations by target");
        killed
    }

    /// Remove and free every animation
    pub fn kill_all(&mut self) {
        for (_, mut animation) in self.animations.drain() {
            animation.free();
        }
    }

    pub fn contains_target<T>(&self, target: &Target<T>) -> bool {
        let id = TargetId::of(target);
        self.animations
            .values()
            .any(|animation| animation.contains_target_id(id))
    }

    /// Stop forwarding ticks until [`resume`](Self::resume)
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(id)
    }

    pub fn get_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.animations.get_mut(id)
    }

    /// Detach an animation without freeing it
    pub fn remove(&mut self, id: AnimationId) -> Option<Animation> {
        self.animations.remove(id)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnimationId, &Animation)> {
        self.animations.iter()
    }

    /// Leaf tweens inside unfinished animations, nested ones included
    pub fn running_tweens(&self) -> usize {
        self.running().map(Animation::tween_count).sum()
    }

    /// Timelines inside unfinished animations, nested ones included
    pub fn running_timelines(&self) -> usize {
        self.running().map(Animation::timeline_count).sum()
    }

    fn running(&self) -> impl Iterator<Item = &Animation> {
        self.animations.values().filter(|a| !a.is_finished())
    }
}

impl Default for TweenManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::accessor::{AccessorRegistry, TweenAccessor};
    use crate::stepper::Repeat;
    use crate::timeline::Timeline;
    use crate::tween::Tween;

    struct Lamp(f32);

    struct LampAccessor;

    impl TweenAccessor<Lamp> for LampAccessor {
        fn channels(&self, _tween_type: u32) -> usize {
            1
        }

        fn get(&self, target: &Lamp, _tween_type: u32, _channel: usize) -> f32 {
            target.0
        }

        fn set(&self, target: &mut Lamp, _tween_type: u32, _channel: usize, value: f32) {
            target.0 = value;
        }
    }

    fn setup() -> (AccessorRegistry, Target<Lamp>, Target<Lamp>) {
        let registry = AccessorRegistry::new().with(LampAccessor);
        let a = Rc::new(RefCell::new(Lamp(0.0)));
        let b = Rc::new(RefCell::new(Lamp(0.0)));
        (registry, a, b)
    }

    #[test]
    fn test_finished_animations_are_reaped() {
        let (registry, a, _) = setup();
        let mut manager = TweenManager::new();
        let id = Tween::to(&registry, &a, 0, 1.0)
            .target(&[1.0])
            .start_in(&mut manager)
            .unwrap();

        manager.update(0.5);
        assert!(manager.get(id).is_some());

        manager.update(0.6);
        assert!(manager.is_empty());
        assert_eq!(a.borrow().0, 1.0);
        assert_eq!(Rc::strong_count(&a), 1);
    }

    #[test]
    fn test_auto_remove_disabled_keeps_animation() {
        let (registry, a, _) = setup();
        let mut manager = TweenManager::new();
        let id = Tween::to(&registry, &a, 0, 1.0)
            .target(&[10.0])
            .auto_remove(false)
            .start_in(&mut manager)
            .unwrap();

        manager.update(2.0);
        assert!(manager.get(id).is_some_and(Animation::is_finished));
        assert_eq!(manager.running_tweens(), 0);

        // Still rewindable
        manager.update(-1.5);
        assert!((a.borrow().0 - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_kill_target() {
        let (registry, a, b) = setup();
        let mut manager = TweenManager::new();
        Tween::to(&registry, &a, 0, 1.0)
            .target(&[1.0])
            .start_in(&mut manager)
            .unwrap();
        Timeline::sequence()
            .push(Tween::to(&registry, &b, 0, 1.0).target(&[1.0]))
            .push(Tween::to(&registry, &a, 0, 1.0).target(&[2.0]))
            .start_in(&mut manager)
            .unwrap();
        Tween::to(&registry, &b, 0, 1.0)
            .target(&[3.0])
            .start_in(&mut manager)
            .unwrap();

        assert_eq!(manager.kill_target(&a), 2);
        assert_eq!(manager.len(), 1);
        assert!(!manager.contains_target(&a));
        assert!(manager.contains_target(&b));

        manager.update(0.5);
        assert_eq!(a.borrow().0, 0.0);
    }

    #[test]
    fn test_pause_stops_ticks() {
        let (registry, a, _) = setup();
        let mut manager = TweenManager::new();
        Tween::to(&registry, &a, 0, 1.0)
            .target(&[1.0])
            .start_in(&mut manager)
            .unwrap();

        manager.pause();
        manager.update(0.5);
        assert_eq!(a.borrow().0, 0.0);
        assert!(manager.is_paused());

        manager.resume();
        manager.update(0.5);
        assert!((a.borrow().0 - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_killed_animation_dropped_next_update() {
        let (registry, a, _) = setup();
        let mut manager = TweenManager::new();
        let id = Tween::to(&registry, &a, 0, 1.0)
            .target(&[1.0])
            .repeat(Repeat::Forever, 0.0)
            .auto_remove(false)
            .start_in(&mut manager)
            .unwrap();

        manager.update(0.25);
        if let Some(animation) = manager.get_mut(id) {
            animation.kill();
        }
        manager.update(0.25);

        assert!(manager.get(id).is_none());
        assert!((a.borrow().0 - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_running_counts_and_kill_all() {
        let (registry, a, b) = setup();
        let mut manager = TweenManager::default();
        Timeline::parallel()
            .push(Tween::to(&registry, &a, 0, 1.0).target(&[1.0]))
            .begin_sequence()
            .push(Tween::to(&registry, &b, 0, 1.0).target(&[1.0]))
            .push_pause(1.0)
            .end()
            .start_in(&mut manager)
            .unwrap();
        Tween::to(&registry, &b, 0, 1.0)
            .target(&[1.0])
            .start_in(&mut manager)
            .unwrap();

        assert_eq!(manager.running_tweens(), 4);
        assert_eq!(manager.running_timelines(), 2);

        manager.kill_all();
        assert!(manager.is_empty());
        assert_eq!(Rc::strong_count(&b), 1);
    }

    #[test]
    fn test_remove_detaches_without_freeing() {
        let (registry, a, _) = setup();
        let mut manager = TweenManager::new();
        let id = Tween::to(&registry, &a, 0, 1.0)
            .target(&[4.0])
            .start_in(&mut manager)
            .unwrap();

        let mut animation = manager.remove(id).unwrap();
        assert!(manager.is_empty());
        animation.update(2.0);
        assert_eq!(a.borrow().0, 4.0);
    }
}
