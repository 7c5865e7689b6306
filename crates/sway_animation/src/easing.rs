//! Easing curves applied to a tween's normalized progress

use std::f32::consts::PI;

/// Easing curve family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    Quad,
    Cubic,
    Quart,
    Quint,
    Sine,
    Expo,
    Circ,
    Back,
    Elastic,
    Bounce,
}

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    In(Curve),
    Out(Curve),
    InOut(Curve),
    /// CSS-style `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    pub const QUAD_IN: Self = Easing::In(Curve::Quad);
    pub const QUAD_OUT: Self = Easing::Out(Curve::Quad);
    pub const QUAD_INOUT: Self = Easing::InOut(Curve::Quad);
    pub const CUBIC_INOUT: Self = Easing::InOut(Curve::Cubic);
    pub const BACK_OUT: Self = Easing::Out(Curve::Back);
    pub const EASE: Self = Easing::CubicBezier(0.25, 0.1, 0.25, 1.0);

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match *self {
            Easing::Linear => t,
            Easing::In(curve) => curve.ease_in(t),
            Easing::Out(curve) => 1.0 - curve.ease_in(1.0 - t),
            Easing::InOut(curve) => {
                if t < 0.5 {
                    curve.ease_in(2.0 * t) / 2.0
                } else {
                    1.0 - curve.ease_in(2.0 - 2.0 * t) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
        }
    }
}

impl Curve {
    /// The "in" flavour; out and in-out are derived by reflection.
    fn ease_in(self, t: f32) -> f32 {
        match self {
            Curve::Quad => t * t,
            Curve::Cubic => t * t * t,
            Curve::Quart => t.powi(4),
            Curve::Quint => t.powi(5),
            Curve::Sine => 1.0 - (t * PI / 2.0).cos(),
            Curve::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Curve::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Curve::Back => {
                const S: f32 = 1.70158;
                t * t * ((S + 1.0) * t - S)
            }
            Curve::Elastic => {
                if t <= 0.0 || t >= 1.0 {
                    return t.clamp(0.0, 1.0);
                }
                let period = 0.3;
                let s = period / 4.0;
                let t = t - 1.0;
                -(2f32.powf(10.0 * t) * ((t - s) * (2.0 * PI) / period).sin())
            }
            Curve::Bounce => 1.0 - bounce_out(1.0 - t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Cubic bezier easing (CSS semantics): find the curve parameter whose x
/// is `t`, then read y there. Solved in f64 so small steps don't jitter.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = BezierAxis::new(x1, x2);
    let y = BezierAxis::new(y1, y2);
    y.at(x.solve(t as f64)) as f32
}

/// One coordinate of a bezier running from 0 to 1, as `((a·p + b)·p + c)·p`
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    fn new(p1: f32, p2: f32) -> Self {
        let (p1, p2) = (f64::from(p1), f64::from(p2));
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self { a: 1.0 - c - b, b, c }
    }

    fn at(&self, p: f64) -> f64 {
        ((self.a * p + self.b) * p + self.c) * p
    }

    fn slope(&self, p: f64) -> f64 {
        (3.0 * self.a * p + 2.0 * self.b) * p + self.c
    }

    /// Parameter in `0..=1` where the axis reaches `target`.
    ///
    /// Newton steps inside a shrinking bracket; a step that leaves the
    /// bracket or meets a flat slope bisects instead.
    fn solve(&self, target: f64) -> f64 {
        const EPSILON: f64 = 1e-7;
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut p = target;

        for _ in 0..24 {
            let err = self.at(p) - target;
            if err.abs() < EPSILON {
                break;
            }
            if err < 0.0 {
                lo = p;
            } else {
                hi = p;
            }

            let slope = self.slope(p);
            let newton = p - err / slope;
            p = if slope.abs() > EPSILON && (lo..=hi).contains(&newton) {
                newton
            } else {
                (lo + hi) * 0.5
            };
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Curve; 10] = [
        Curve::Quad,
        Curve::Cubic,
        Curve::Quart,
        Curve::Quint,
        Curve::Sine,
        Curve::Expo,
        Curve::Circ,
        Curve::Back,
        Curve::Elastic,
        Curve::Bounce,
    ];

    #[test]
    fn test_endpoints_are_exact_enough() {
        for curve in CURVES {
            for easing in [Easing::In(curve), Easing::Out(curve), Easing::InOut(curve)] {
                assert!(easing.apply(0.0).abs() < 1e-3, "{easing:?} at 0");
                assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{easing:?} at 1");
            }
        }
    }

    #[test]
    fn test_in_out_is_symmetric() {
        let easing = Easing::QUAD_INOUT;
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-6);
        let a = easing.apply(0.2);
        let b = easing.apply(0.8);
        assert!((a + b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::In(Curve::Back).apply(0.2) < 0.0);
        assert!(Easing::BACK_OUT.apply(0.8) > 1.0);
    }

    #[test]
    fn test_cubic_bezier_linear_and_ease() {
        let linear = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((linear.apply(t) - t).abs() < 1e-4);
        }
        // CSS `ease` runs ahead of linear in the middle
        assert!(Easing::EASE.apply(0.5) > 0.5);
    }

    #[test]
    fn test_bezier_solver_inverts_x() {
        // Steep ends and a flat middle stress both Newton and bisection
        for (x1, x2) in [(0.25, 0.25), (0.9, 0.1), (0.0, 1.0), (1.0, 0.0)] {
            let axis = BezierAxis::new(x1, x2);
            for i in 1..20 {
                let target = i as f64 / 20.0;
                let p = axis.solve(target);
                assert!((0.0..=1.0).contains(&p), "{x1},{x2} at {target}");
                assert!((axis.at(p) - target).abs() < 1e-5, "{x1},{x2} at {target}");
            }
        }
    }
}
