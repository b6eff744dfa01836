use crate::foundation::error::{ScrollyteError, ScrollyteResult};

/// Responsive layout tier derived from viewport width.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ViewportTier {
    /// Narrow screens.
    Mobile,
    /// Medium screens.
    Tablet,
    /// Wide screens.
    Desktop,
}

/// Emitted when a resize moves the viewport into another tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TierChange {
    /// Previous tier.
    pub from: ViewportTier,
    /// New tier.
    pub to: ViewportTier,
}

/// Single source of truth for the current responsive tier.
///
/// Resolved once per resize instead of each section reading raw widths ad hoc.
#[derive(Clone, Debug)]
pub struct BreakpointObserver {
    tablet_min: f64,
    desktop_min: f64,
    current: ViewportTier,
}

impl BreakpointObserver {
    /// Default breakpoints: tablet from 768px, desktop from 1024px.
    pub fn new(width: f64) -> Self {
        Self {
            tablet_min: 768.0,
            desktop_min: 1024.0,
            current: classify(width, 768.0, 1024.0),
        }
    }

    /// Observer with custom breakpoints.
    pub fn with_breakpoints(width: f64, tablet_min: f64, desktop_min: f64) -> ScrollyteResult<Self> {
        if !(tablet_min > 0.0 && tablet_min < desktop_min) {
            return Err(ScrollyteError::validation(
                "breakpoints must satisfy 0 < tablet_min < desktop_min",
            ));
        }
        Ok(Self {
            tablet_min,
            desktop_min,
            current: classify(width, tablet_min, desktop_min),
        })
    }

    /// Current tier.
    pub fn tier(&self) -> ViewportTier {
        self.current
    }

    /// Recompute for a new width; `Some` only when the tier changed.
    pub fn update(&mut self, width: f64) -> Option<TierChange> {
        let next = classify(width, self.tablet_min, self.desktop_min);
        if next == self.current {
            return None;
        }
        let change = TierChange {
            from: self.current,
            to: next,
        };
        self.current = next;
        tracing::debug!(from = ?change.from, to = ?change.to, "viewport tier changed");
        Some(change)
    }
}

fn classify(width: f64, tablet_min: f64, desktop_min: f64) -> ViewportTier {
    if width >= desktop_min {
        ViewportTier::Desktop
    } else if width >= tablet_min {
        ViewportTier::Tablet
    } else {
        ViewportTier::Mobile
    }
}

#[cfg(test)]
#[path = "../tests/unit/breakpoint/observer.rs"]
mod tests;
