use crate::foundation::error::{ScrollyteError, ScrollyteResult};

pub use kurbo::{Rect, Vec2};

/// Stable identifier of a document element (a selector or DOM id).
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Build an element id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(v: &str) -> Self {
        Self(v.to_owned())
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visible viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
}

impl Viewport {
    /// Build a viewport; both dimensions must be finite and positive.
    pub fn new(width: f64, height: f64) -> ScrollyteResult<Self> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(ScrollyteError::validation(
                "Viewport width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Parse a `WIDTHxHEIGHT` string such as `1280x800`.
    pub fn parse(s: &str) -> ScrollyteResult<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| ScrollyteError::validation(format!("invalid viewport '{s}'")))?;
        let w: f64 = w
            .trim()
            .parse()
            .map_err(|_| ScrollyteError::validation(format!("invalid viewport width '{w}'")))?;
        let h: f64 = h
            .trim()
            .parse()
            .map_err(|_| ScrollyteError::validation(format!("invalid viewport height '{h}'")))?;
        Self::new(w, h)
    }
}

/// An animatable visual property of an element.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Property {
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Horizontal translation in pixels.
    X,
    /// Vertical translation in pixels.
    Y,
    /// Uniform scale.
    Scale,
    /// Horizontal scale.
    ScaleX,
    /// Vertical scale.
    ScaleY,
    /// 2D rotation in degrees.
    Rotation,
    /// Rotation around the X axis in degrees.
    RotationX,
    /// Rotation around the Y axis in degrees.
    RotationY,
    /// Any other numeric style property (e.g. a CSS variable).
    Custom(String),
}

impl Property {
    /// Canonical name used in scene JSON.
    pub fn name(&self) -> &str {
        match self {
            Self::Opacity => "opacity",
            Self::X => "x",
            Self::Y => "y",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::Rotation => "rotation",
            Self::RotationX => "rotationX",
            Self::RotationY => "rotationY",
            Self::Custom(name) => name,
        }
    }

    /// Value an element shows when nothing drives the property.
    pub fn rest_value(&self) -> f64 {
        match self {
            Self::Opacity | Self::Scale | Self::ScaleX | Self::ScaleY => 1.0,
            _ => 0.0,
        }
    }
}

impl From<String> for Property {
    fn from(s: String) -> Self {
        match s.as_str() {
            "opacity" | "autoAlpha" => Self::Opacity,
            "x" => Self::X,
            "y" => Self::Y,
            "scale" => Self::Scale,
            "scaleX" => Self::ScaleX,
            "scaleY" => Self::ScaleY,
            "rotation" | "rotate" => Self::Rotation,
            "rotationX" | "rotateX" => Self::RotationX,
            "rotationY" | "rotateY" => Self::RotationY,
            _ => Self::Custom(s),
        }
    }
}

impl From<Property> for String {
    fn from(p: Property) -> Self {
        p.name().to_owned()
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One computed property write.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PropertyWrite {
    /// Target element.
    pub target: ElementId,
    /// Written property.
    pub property: Property,
    /// Written value.
    pub value: f64,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
