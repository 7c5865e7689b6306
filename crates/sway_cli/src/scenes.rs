//! Built-in demo scenes

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use sway_animation::{
    AccessorRegistry, Animation, Curve, Easing, EventMask, Repeat, Result, Target, Timeline,
    Tween, TweenAccessor,
};

pub const POSITION: u32 = 0;
pub const SCALE: u32 = 1;
pub const ALPHA: u32 = 2;
pub const ROTATION: u32 = 3;

/// A 2D sprite, the only target type the demo scenes animate
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub alpha: f32,
    pub rotation: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            alpha: 1.0,
            rotation: 0.0,
        }
    }
}

pub struct SpriteAccessor;

impl TweenAccessor<Sprite> for SpriteAccessor {
    fn channels(&self, tween_type: u32) -> usize {
        match tween_type {
            POSITION => 2,
            _ => 1,
        }
    }

    fn get(&self, target: &Sprite, tween_type: u32, channel: usize) -> f32 {
        match (tween_type, channel) {
            (POSITION, 0) => target.x,
            (POSITION, _) => target.y,
            (SCALE, _) => target.scale,
            (ALPHA, _) => target.alpha,
            _ => target.rotation,
        }
    }

    fn set(&self, target: &mut Sprite, tween_type: u32, channel: usize, value: f32) {
        match (tween_type, channel) {
            (POSITION, 0) => target.x = value,
            (POSITION, _) => target.y = value,
            (SCALE, _) => target.scale = value,
            (ALPHA, _) => target.alpha = value,
            _ => target.rotation = value,
        }
    }
}

pub fn registry() -> AccessorRegistry {
    AccessorRegistry::new().with(SpriteAccessor)
}

/// Named sprites a scene animates, in print order
#[derive(Default)]
pub struct Stage {
    sprites: Vec<(&'static str, Target<Sprite>)>,
}

impl Stage {
    fn sprite(&mut self, name: &'static str, sprite: Sprite) -> Target<Sprite> {
        let target = Rc::new(RefCell::new(sprite));
        self.sprites.push((name, target.clone()));
        target
    }

    pub fn sprites(&self) -> impl Iterator<Item = (&'static str, &Target<Sprite>)> {
        self.sprites.iter().map(|(name, target)| (*name, target))
    }
}

/// Formats a sprite's channels with a fixed number of decimals
pub struct SpriteLine<'a> {
    pub sprite: &'a Sprite,
    pub precision: usize,
}

impl fmt::Display for SpriteLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.precision;
        let s = self.sprite;
        write!(
            f,
            "x={:.p$} y={:.p$} scale={:.p$} alpha={:.p$} rot={:.p$}",
            s.x, s.y, s.scale, s.alpha, s.rotation
        )
    }
}

pub struct Scene {
    pub name: &'static str,
    pub about: &'static str,
    build: fn(&AccessorRegistry, &mut Stage) -> Result<Animation>,
}

impl Scene {
    pub fn build(&self, registry: &AccessorRegistry) -> Result<(Stage, Animation)> {
        let mut stage = Stage::default();
        let animation = (self.build)(registry, &mut stage)?;
        Ok((stage, animation))
    }
}

pub const SCENES: &[Scene] = &[
    Scene {
        name: "sequence",
        about: "fade in, move and grow together, hold, fade out; yoyo twice",
        build: sequence,
    },
    Scene {
        name: "yoyo",
        about: "a pendulum swinging forever",
        build: swing,
    },
    Scene {
        name: "parallel",
        about: "three sprites racing with staggered starts",
        build: race,
    },
];

pub fn find(name: &str) -> Option<&'static Scene> {
    SCENES.iter().find(|scene| scene.name == name)
}

fn sequence(registry: &AccessorRegistry, stage: &mut Stage) -> Result<Animation> {
    let hero = stage.sprite("hero", Sprite::default());

    Timeline::sequence()
        .push(Tween::set(registry, &hero, POSITION).target(&[0.0, 0.0]))
        .push(Tween::set(registry, &hero, ALPHA).target(&[0.0]))
        .push(Tween::to(registry, &hero, ALPHA, 0.5).target(&[1.0]))
        .begin_parallel()
        .push(
            Tween::to(registry, &hero, POSITION, 1.0)
                .target(&[100.0, 40.0])
                .ease(Easing::CUBIC_INOUT),
        )
        .push(
            Tween::to(registry, &hero, SCALE, 1.0)
                .target(&[2.0])
                .ease(Easing::BACK_OUT),
        )
        .end()
        .push_pause(0.5)
        .push(Tween::to(registry, &hero, ALPHA, 0.5).target(&[0.0]))
        .repeat_yoyo(Repeat::Times(2), 0.25)
        .callback(
            |event| tracing::info!(?event, "sequence"),
            EventMask::ANY,
        )
        .build()
}

fn swing(registry: &AccessorRegistry, stage: &mut Stage) -> Result<Animation> {
    let pendulum = stage.sprite("pendulum", Sprite {
        rotation: -30.0,
        ..Sprite::default()
    });

    Tween::to(registry, &pendulum, ROTATION, 1.0)
        .target(&[30.0])
        .ease(Easing::InOut(Curve::Sine))
        .repeat_yoyo(Repeat::Forever, 0.0)
        .build()
}

fn race(registry: &AccessorRegistry, stage: &mut Stage) -> Result<Animation> {
    let runners = [
        ("red", 1.0, Easing::Linear),
        ("green", 1.5, Easing::Out(Curve::Quad)),
        ("blue", 2.0, Easing::Out(Curve::Bounce)),
    ];

    let mut timeline = Timeline::parallel();
    for (lane, (name, duration, easing)) in runners.into_iter().enumerate() {
        let sprite = stage.sprite(name, Sprite {
            y: lane as f32 * 20.0,
            ..Sprite::default()
        });
        timeline = timeline.push(
            Tween::to(registry, &sprite, POSITION, duration)
                .target_relative(&[200.0, 0.0])
                .ease(easing)
                .delay(lane as f32 * 0.25)
                .callback(
                    move |_| tracing::info!(runner = name, "finished"),
                    EventMask::COMPLETE,
                ),
        );
    }
    timeline.build()
}
