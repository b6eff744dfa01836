use serde::{Deserialize, Serialize};

/// Direction of an easing curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EaseDir {
    /// Accelerate from zero velocity.
    In,
    /// Decelerate to zero velocity.
    Out,
    /// Accelerate then decelerate.
    InOut,
}

impl EaseDir {
    fn suffix(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inOut",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "inOut" => Some(Self::InOut),
            _ => None,
        }
    }
}

/// Easing curve mapping linear progress to eased progress.
///
/// Names follow the GSAP vocabulary the site's sections were authored with (`power2.out`,
/// `sine.inOut`, `none`), plus CSS-style cubic beziers and a physical spring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    /// Identity.
    Linear,
    /// Polynomial ease of degree `degree + 1` (`power1` is quadratic).
    Power {
        /// GSAP power, `1..=4`.
        degree: u8,
        /// Curve direction.
        dir: EaseDir,
    },
    /// Sinusoidal ease.
    Sine(EaseDir),
    /// Exponential ease.
    Expo(EaseDir),
    /// Overshooting deceleration.
    BackOut,
    /// Elastic deceleration.
    ElasticOut,
    /// Bouncing deceleration.
    BounceOut,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier {
        /// First control point x.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
    /// Damped spring step response (settles at 1 when `t` reaches 1).
    Spring {
        /// Spring stiffness.
        stiffness: f64,
        /// Damping coefficient.
        damping: f64,
        /// Mass.
        mass: f64,
    },
}

impl Default for Ease {
    /// GSAP's default ease, `power1.out`.
    fn default() -> Self {
        Self::Power {
            degree: 1,
            dir: EaseDir::Out,
        }
    }
}

impl Ease {
    /// Apply the curve to `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power { degree, dir } => power(degree, dir, t),
            Self::Sine(dir) => sine(dir, t),
            Self::Expo(dir) => expo(dir, t),
            Self::BackOut => back_out(t),
            Self::ElasticOut => elastic_out(t),
            Self::BounceOut => bounce_out(t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier_ease(t, x1, y1, x2, y2),
            Self::Spring {
                stiffness,
                damping,
                mass,
            } => {
                if t >= 1.0 {
                    1.0
                } else {
                    spring_step(t, stiffness, damping, mass)
                }
            }
        }
    }

    /// Parse a GSAP-style ease name.
    pub fn parse_name(name: &str) -> Option<Self> {
        let name = name.trim();
        match name {
            "none" | "linear" | "power0" | "power0.none" => return Some(Self::Linear),
            "ease_in" => return Some(Self::css(0.42, 0.0, 1.0, 1.0)),
            "ease_out" => return Some(Self::css(0.0, 0.0, 0.58, 1.0)),
            "ease_in_out" => return Some(Self::css(0.42, 0.0, 0.58, 1.0)),
            "back.out" | "back" => return Some(Self::BackOut),
            "elastic.out" | "elastic" => return Some(Self::ElasticOut),
            "bounce.out" | "bounce" => return Some(Self::BounceOut),
            _ => {}
        }

        let (family, dir) = match name.split_once('.') {
            Some((family, dir)) => (family, EaseDir::parse(dir)?),
            None => (name, EaseDir::Out),
        };
        match family {
            "power1" | "quad" => Some(Self::Power { degree: 1, dir }),
            "power2" | "cubic" => Some(Self::Power { degree: 2, dir }),
            "power3" | "quart" => Some(Self::Power { degree: 3, dir }),
            "power4" | "quint" | "strong" => Some(Self::Power { degree: 4, dir }),
            "sine" => Some(Self::Sine(dir)),
            "expo" => Some(Self::Expo(dir)),
            _ => None,
        }
    }

    fn css(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    fn name(self) -> Option<String> {
        match self {
            Self::Linear => Some("none".to_owned()),
            Self::Power { degree, dir } => Some(format!("power{degree}.{}", dir.suffix())),
            Self::Sine(dir) => Some(format!("sine.{}", dir.suffix())),
            Self::Expo(dir) => Some(format!("expo.{}", dir.suffix())),
            Self::BackOut => Some("back.out".to_owned()),
            Self::ElasticOut => Some("elastic.out".to_owned()),
            Self::BounceOut => Some("bounce.out".to_owned()),
            Self::CubicBezier { .. } | Self::Spring { .. } => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SpringParams {
    stiffness: f64,
    damping: f64,
    mass: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Repr {
    Str(String),
    CubicBezier { cubic_bezier: [f64; 4] },
    Spring { spring: SpringParams },
}

impl Serialize for Ease {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let repr = match *self {
            Self::CubicBezier { x1, y1, x2, y2 } => Repr::CubicBezier {
                cubic_bezier: [x1, y1, x2, y2],
            },
            Self::Spring {
                stiffness,
                damping,
                mass,
            } => Repr::Spring {
                spring: SpringParams {
                    stiffness,
                    damping,
                    mass,
                },
            },
            other => Repr::Str(other.name().unwrap_or_default()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ease {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Self::parse_name(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown ease \"{s}\""))),
            Repr::CubicBezier { cubic_bezier } => Ok(Self::css(
                cubic_bezier[0],
                cubic_bezier[1],
                cubic_bezier[2],
                cubic_bezier[3],
            )),
            Repr::Spring { spring } => Ok(Self::Spring {
                stiffness: spring.stiffness,
                damping: spring.damping,
                mass: spring.mass,
            }),
        }
    }
}

fn power(degree: u8, dir: EaseDir, t: f64) -> f64 {
    let n = i32::from(degree.clamp(1, 4)) + 1;
    match dir {
        EaseDir::In => t.powi(n),
        EaseDir::Out => 1.0 - (1.0 - t).powi(n),
        EaseDir::InOut => {
            if t < 0.5 {
                (2.0 * t).powi(n) / 2.0
            } else {
                1.0 - (2.0 * (1.0 - t)).powi(n) / 2.0
            }
        }
    }
}

fn sine(dir: EaseDir, t: f64) -> f64 {
    use std::f64::consts::PI;
    match dir {
        EaseDir::In => {
            if t >= 1.0 {
                1.0
            } else {
                1.0 - (t * PI / 2.0).cos()
            }
        }
        EaseDir::Out => (t * PI / 2.0).sin(),
        EaseDir::InOut => -((PI * t).cos() - 1.0) / 2.0,
    }
}

fn expo(dir: EaseDir, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    match dir {
        EaseDir::In => 2f64.powf(10.0 * t - 10.0),
        EaseDir::Out => 1.0 - 2f64.powf(-10.0 * t),
        EaseDir::InOut => {
            if t < 0.5 {
                2f64.powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
            }
        }
    }
}

fn back_out(t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let c1 = 1.70158;
    let c3 = c1 + 1.0;
    1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
}

fn cubic_bezier_ease(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    // CSS cubic-bezier: given x in [0,1], solve u such that bx(u)=x, then return by(u).
    fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
    }
    fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    // Newton-Raphson, falling back to bisection when it stalls.
    let mut t = x;
    for _ in 0..8 {
        let x_t = sample_curve(x1, x2, t) - x;
        if x_t.abs() < 1e-9 {
            return sample_curve(y1, y2, t);
        }
        let d = sample_curve_derivative(x1, x2, t);
        if d.abs() < 1e-7 {
            break;
        }
        t = (t - x_t / d).clamp(0.0, 1.0);
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    t = x;
    for _ in 0..60 {
        let x_t = sample_curve(x1, x2, t);
        if (x_t - x).abs() < 1e-9 {
            break;
        }
        if x_t < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }

    sample_curve(y1, y2, t)
}

fn spring_step(t: f64, stiffness: f64, damping: f64, mass: f64) -> f64 {
    // Step response from 0 to 1 with x(0)=0, v(0)=0.
    let k = stiffness.max(0.0);
    let c = damping.max(0.0);
    let m = mass.max(1e-9);

    let w0 = (k / m).sqrt();
    if w0 == 0.0 {
        return t;
    }
    let zeta = c / (2.0 * (k * m).sqrt()).max(1e-9);

    if (zeta - 1.0).abs() < 1e-6 {
        let e = (-w0 * t).exp();
        1.0 - e * (1.0 + w0 * t)
    } else if zeta < 1.0 {
        let wd = w0 * (1.0 - zeta * zeta).sqrt();
        let e = (-zeta * w0 * t).exp();
        let c1 = (wd * t).cos();
        let s1 = (wd * t).sin();
        let k = zeta / (1.0 - zeta * zeta).sqrt();
        1.0 - e * (c1 + k * s1)
    } else {
        let z2 = (zeta * zeta - 1.0).sqrt();
        let r1 = -w0 * (zeta - z2);
        let r2 = -w0 * (zeta + z2);
        let c2 = (zeta + z2) / (2.0 * z2);
        let c1 = (zeta - z2) / (2.0 * z2);
        1.0 - (c2 * (r1 * t).exp() - c1 * (r2 * t).exp())
    }
}

fn elastic_out(t: f64) -> f64 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let p = 0.3;
    (2f64).powf(-10.0 * t) * ((t - p / 4.0) * (2.0 * std::f64::consts::PI) / p).sin() + 1.0
}

fn bounce_out(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
