//! Integration tests for tween and timeline stepping
//!
//! These tests verify that:
//! - Sequences hand over between children at the right time
//! - Parallel children behave exactly as if they ran alone
//! - Results don't depend on how time is chunked into ticks
//! - Rewinding retraces the forward path, and yoyo iterations mirror it

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use sway_animation::{
    AccessorRegistry, Animation, Repeat, Target, Timeline, Tween, TweenAccessor,
};

const VALUE: u32 = 0;

struct Knob {
    value: f32,
}

struct KnobAccessor;

impl TweenAccessor<Knob> for KnobAccessor {
    fn channels(&self, _tween_type: u32) -> usize {
        1
    }

    fn get(&self, target: &Knob, _tween_type: u32, _channel: usize) -> f32 {
        target.value
    }

    fn set(&self, target: &mut Knob, _tween_type: u32, _channel: usize, value: f32) {
        target.value = value;
    }
}

fn registry() -> AccessorRegistry {
    AccessorRegistry::new().with(KnobAccessor)
}

fn knob() -> Target<Knob> {
    Rc::new(RefCell::new(Knob { value: 0.0 }))
}

fn read(target: &Target<Knob>) -> f32 {
    target.borrow().value
}

/// Values rounded to 1e-3 so structured comparisons ignore float noise
fn snapshot(targets: &[&Target<Knob>]) -> Vec<f32> {
    targets
        .iter()
        .map(|t| (read(t) * 1000.0).round() / 1000.0)
        .collect()
}

/// Sequence [a(1), b(2)]: b stays untouched until a's span is over
#[test]
fn test_sequence_of_two_tweens() {
    let registry = registry();
    let (a, b) = (knob(), knob());

    let mut timeline = Timeline::sequence()
        .push(Tween::to(&registry, &a, VALUE, 1.0).target(&[10.0]))
        .push(Tween::to(&registry, &b, VALUE, 2.0).target(&[10.0]))
        .start()
        .unwrap();

    timeline.update(0.5);
    assert_eq!(snapshot(&[&a, &b]), vec![5.0, 0.0]);
    let children = timeline.as_timeline().unwrap().children();
    assert!(!children[1].state().is_initialized());

    timeline.update(1.5);
    assert_eq!(snapshot(&[&a, &b]), vec![10.0, 5.0]);

    timeline.update(1.5);
    assert_eq!(snapshot(&[&a, &b]), vec![10.0, 10.0]);
    assert!(timeline.is_finished());
}

/// Parallel [a(1), b(3)] advanced by 3 in one jump lands both on their end values
#[test]
fn test_parallel_single_jump() {
    let registry = registry();
    let (a, b) = (knob(), knob());

    let mut timeline = Timeline::parallel()
        .push(Tween::to(&registry, &a, VALUE, 1.0).target(&[10.0]))
        .push(Tween::to(&registry, &b, VALUE, 3.0).target(&[30.0]))
        .start()
        .unwrap();
    assert_eq!(timeline.duration(), 3.0);

    timeline.update(3.0);
    assert_eq!(snapshot(&[&a, &b]), vec![10.0, 30.0]);
}

/// Parallel children produce the same values they would produce alone
#[test]
fn test_parallel_children_are_independent() {
    let registry = registry();
    let (a, b) = (knob(), knob());
    let (solo_a, solo_b) = (knob(), knob());

    let mut timeline = Timeline::parallel()
        .push(Tween::to(&registry, &a, VALUE, 1.0).target(&[10.0]))
        .push(
            Tween::to(&registry, &b, VALUE, 2.0)
                .target(&[10.0])
                .delay(0.5)
                .repeat_yoyo(Repeat::Times(1), 0.25),
        )
        .start()
        .unwrap();
    let mut alone_a = Tween::to(&registry, &solo_a, VALUE, 1.0)
        .target(&[10.0])
        .start()
        .unwrap();
    let mut alone_b = Tween::to(&registry, &solo_b, VALUE, 2.0)
        .target(&[10.0])
        .delay(0.5)
        .repeat_yoyo(Repeat::Times(1), 0.25)
        .start()
        .unwrap();

    for _ in 0..9 {
        timeline.update(0.55);
        alone_a.update(0.55);
        alone_b.update(0.55);
        assert_eq!(snapshot(&[&a, &b]), snapshot(&[&solo_a, &solo_b]));
    }
}

fn nested_yoyo(
    registry: &AccessorRegistry,
    targets: &[Target<Knob>; 3],
    repeats: u32,
) -> Animation {
    let [a, b, c] = targets;
    Timeline::sequence()
        .push(Tween::to(registry, a, VALUE, 1.0).target(&[10.0]))
        .begin_parallel()
        .push(Tween::to(registry, b, VALUE, 1.0).target(&[10.0]))
        .push(Tween::to(registry, c, VALUE, 0.5).target(&[10.0]))
        .end()
        .push_pause(0.5)
        .repeat_yoyo(Repeat::Times(repeats), 0.25)
        .start()
        .unwrap()
}

/// One large tick or many small ones reach the same visible state
#[test]
fn test_time_chunking_invariance() {
    let registry = registry();
    let coarse_targets = [knob(), knob(), knob()];
    let fine_targets = [knob(), knob(), knob()];
    let mut coarse = nested_yoyo(&registry, &coarse_targets, 1);
    let mut fine = nested_yoyo(&registry, &fine_targets, 1);
    assert_eq!(coarse.full_duration(), Some(5.25));

    const TICK: f32 = 0.05;
    let samples = [11, 27, 53, 71, 97, 120];
    let mut reached = 0;
    for sample in samples {
        coarse.update((sample - reached) as f32 * TICK);
        for _ in reached..sample {
            fine.update(TICK);
        }
        reached = sample;

        let [a, b, c] = &coarse_targets;
        let [fa, fb, fc] = &fine_targets;
        assert_eq!(
            snapshot(&[a, b, c]),
            snapshot(&[fa, fb, fc]),
            "diverged at t = {}",
            sample as f32 * TICK
        );
    }

    // Past the end the backward iteration left everything at its start
    let [a, b, c] = &coarse_targets;
    assert_eq!(snapshot(&[a, b, c]), vec![0.0, 0.0, 0.0]);
}

/// Rewinding in one large tick or many small ones reaches the same visible state
#[test]
fn test_time_chunking_invariance_backward() {
    let registry = registry();
    let coarse_targets = [knob(), knob(), knob()];
    let fine_targets = [knob(), knob(), knob()];
    let mut coarse = nested_yoyo(&registry, &coarse_targets, 1);
    let mut fine = nested_yoyo(&registry, &fine_targets, 1);
    coarse.update(5.5);
    fine.update(5.5);
    assert!(coarse.is_finished());

    const TICK: f32 = 0.05;
    let samples = [3, 17, 38, 64, 91, 110, 120];
    let mut reached = 0;
    for sample in samples {
        coarse.update(-((sample - reached) as f32) * TICK);
        for _ in reached..sample {
            fine.update(-TICK);
        }
        reached = sample;

        let [a, b, c] = &coarse_targets;
        let [fa, fb, fc] = &fine_targets;
        assert_eq!(
            snapshot(&[a, b, c]),
            snapshot(&[fa, fb, fc]),
            "diverged at t = {}",
            5.5 - sample as f32 * TICK
        );
    }

    // Rewound past the start, everything is back where it began
    let [a, b, c] = &coarse_targets;
    assert_eq!(snapshot(&[a, b, c]), vec![0.0, 0.0, 0.0]);
    assert!(coarse.is_finished());
}

/// A large rewind from deep inside a long yoyo jumps straight to the start
#[test]
fn test_large_rewind_restarts_timeline() {
    let registry = registry();
    let targets = [knob(), knob(), knob()];
    let mut timeline = nested_yoyo(&registry, &targets, 5);
    let [a, b, c] = &targets;

    // Iteration 5 (step 10) starts at 13.75
    timeline.update(15.0);
    assert_eq!(timeline.state().step(), 10);

    timeline.update(-20.0);
    assert_eq!(snapshot(&[a, b, c]), vec![0.0, 0.0, 0.0]);
    assert_eq!(timeline.state().step(), -1);
    assert!(timeline.is_finished());

    // Playing forward again relaunches from the first iteration
    timeline.update(5.4);
    assert_eq!(snapshot(&[a, b, c]), vec![4.0, 0.0, 0.0]);
    assert!(!timeline.is_finished());
}

/// Known values inside the backward iteration of a yoyo timeline
#[test]
fn test_yoyo_timeline_plays_children_backward() {
    let registry = registry();
    let targets = [knob(), knob(), knob()];
    let mut timeline = nested_yoyo(&registry, &targets, 1);
    let [a, b, c] = &targets;

    timeline.update(3.55);
    // 0.8 into the reverse iteration mirrors t = 1.7
    assert_eq!(snapshot(&[a, b, c]), vec![10.0, 7.0, 10.0]);

    timeline.update(1.3);
    // mirrors t = 0.4
    assert_eq!(snapshot(&[a, b, c]), vec![4.0, 0.0, 0.0]);

    timeline.update(1.0);
    assert_eq!(snapshot(&[a, b, c]), vec![0.0, 0.0, 0.0]);
    assert!(timeline.is_finished());
}

/// Rewinding through the same instants shows the same values
#[test]
fn test_reversibility() {
    let registry = registry();
    let (a, b) = (knob(), knob());
    let mut timeline = Timeline::sequence()
        .push(Tween::to(&registry, &a, VALUE, 1.0).target(&[10.0]))
        .push(Tween::to(&registry, &b, VALUE, 1.0).target(&[10.0]))
        .start()
        .unwrap();

    let mut forward = Vec::new();
    timeline.update(0.25);
    forward.push(snapshot(&[&a, &b]));
    for _ in 0..3 {
        timeline.update(0.5);
        forward.push(snapshot(&[&a, &b]));
    }
    assert_eq!(forward[3], vec![10.0, 7.5]);

    let mut backward = vec![snapshot(&[&a, &b])];
    for _ in 0..3 {
        timeline.update(-0.5);
        backward.push(snapshot(&[&a, &b]));
    }
    backward.reverse();
    assert_eq!(forward, backward);

    timeline.update(-1.0);
    assert_eq!(snapshot(&[&a, &b]), vec![0.0, 0.0]);
    assert!(timeline.is_finished());
}

/// A yoyo iteration shows at time t what the forward one showed at d - t
#[test]
fn test_yoyo_symmetry() {
    let registry = registry();
    let forward_target = knob();
    let mirror_target = knob();

    let make = |target: &Target<Knob>| {
        Tween::to(&registry, target, VALUE, 2.0)
            .target(&[8.0])
            .ease(sway_animation::Easing::QUAD_INOUT)
            .repeat_yoyo(Repeat::Times(1), 0.0)
            .start()
            .unwrap()
    };
    let mut forward = make(&forward_target);
    let mut mirror = make(&mirror_target);

    for t in [0.3_f32, 0.9, 1.4] {
        forward.update(t);
        mirror.update(4.0 - t);
        assert!(
            (read(&forward_target) - read(&mirror_target)).abs() < 1e-4,
            "asymmetric at {t}"
        );
        forward.force_to_start();
        mirror.force_to_start();
    }
}

/// A jump far past the end of a long repeat doesn't replay every iteration
#[test]
fn test_large_jump_finishes_timeline() {
    let registry = registry();
    let (a, b) = (knob(), knob());
    let mut timeline = Timeline::sequence()
        .push(Tween::to(&registry, &a, VALUE, 1.0).target(&[10.0]))
        .push(Tween::to(&registry, &b, VALUE, 1.0).target(&[10.0]))
        .repeat(Repeat::Times(1000), 0.0)
        .start()
        .unwrap();

    timeline.update(0.5);
    timeline.update(1.0e9);

    assert!(timeline.is_finished());
    assert_eq!(snapshot(&[&a, &b]), vec![10.0, 10.0]);
}
