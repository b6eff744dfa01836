//! Region registrar: binds a trigger element to the scroll position.
//!
//! Start and end conditions use the "element edge meets viewport edge" vocabulary:
//! `"top bottom"` starts when the trigger's top reaches the viewport bottom,
//! `"bottom+=100 center-=50"` when 100px below the trigger's bottom reaches 50px above the
//! viewport center. An end of `"+=150%"` means one and a half viewport heights after start.

use std::{cell::Cell, collections::BTreeMap, rc::Rc};

use crate::{
    breakpoint::ViewportTier,
    foundation::core::{ElementId, Viewport},
    foundation::error::{ScrollyteError, ScrollyteResult},
    host::{Host, ListenerId, ListenerKind},
    pin::PinLifecycle,
};

/// Reference point along an element or the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    /// Top edge.
    Top,
    /// Vertical center.
    Center,
    /// Bottom edge.
    Bottom,
    /// Percentage of the height from the top.
    Percent(f64),
    /// Pixels from the top.
    Px(f64),
}

impl Edge {
    /// Offset of this point from the top of a box of height `len`.
    pub fn resolve(self, len: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => len / 2.0,
            Self::Bottom => len,
            Self::Percent(p) => len * p / 100.0,
            Self::Px(v) => v,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            _ => {
                if let Some(p) = s.strip_suffix('%') {
                    p.parse().ok().map(Self::Percent)
                } else {
                    s.strip_suffix("px").unwrap_or(s).parse().ok().map(Self::Px)
                }
            }
        }
    }

    fn fmt_into(self, out: &mut String) {
        match self {
            Self::Top => out.push_str("top"),
            Self::Center => out.push_str("center"),
            Self::Bottom => out.push_str("bottom"),
            Self::Percent(p) => out.push_str(&format!("{p}%")),
            Self::Px(v) => out.push_str(&format!("{v}px")),
        }
    }
}

/// Scroll condition for a region boundary.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Anchor {
    /// A point on the trigger meets a point on the viewport.
    Edges {
        /// Point on the trigger element.
        element: Edge,
        /// Pixel offset added to the element point.
        element_offset: f64,
        /// Point on the viewport.
        viewport: Edge,
        /// Pixel offset added to the viewport point.
        viewport_offset: f64,
    },
    /// A distance after the resolved start (only valid as an end condition).
    AfterStart(Edge),
}

impl Anchor {
    /// `element` edge meets `viewport` edge, no offsets.
    pub fn edges(element: Edge, viewport: Edge) -> Self {
        Self::Edges {
            element,
            element_offset: 0.0,
            viewport,
            viewport_offset: 0.0,
        }
    }

    /// Parse the `"<element> <viewport>"` / `"+=<distance>"` form.
    pub fn parse(s: &str) -> ScrollyteResult<Self> {
        let s = s.trim();
        let bad = || ScrollyteError::validation(format!("invalid scroll anchor '{s}'"));

        if let Some(rest) = s.strip_prefix("+=") {
            return Edge::parse(rest.trim()).map(Self::AfterStart).ok_or_else(bad);
        }

        let mut parts = s.split_whitespace();
        let el = parts.next().ok_or_else(bad)?;
        let vp = parts.next().unwrap_or("top");
        if parts.next().is_some() {
            return Err(bad());
        }
        let (element, element_offset) = parse_with_offset(el).ok_or_else(bad)?;
        let (viewport, viewport_offset) = parse_with_offset(vp).ok_or_else(bad)?;
        Ok(Self::Edges {
            element,
            element_offset,
            viewport,
            viewport_offset,
        })
    }
}

fn parse_with_offset(token: &str) -> Option<(Edge, f64)> {
    for (op, sign) in [("+=", 1.0), ("-=", -1.0)] {
        if let Some((base, off)) = token.split_once(op) {
            let off: f64 = off.strip_suffix("px").unwrap_or(off).parse().ok()?;
            return Some((Edge::parse(base)?, sign * off));
        }
    }
    Some((Edge::parse(token)?, 0.0))
}

fn fmt_offset(out: &mut String, off: f64) {
    if off > 0.0 {
        out.push_str(&format!("+={off}"));
    } else if off < 0.0 {
        out.push_str(&format!("-={}", -off));
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        match *self {
            Self::Edges {
                element,
                element_offset,
                viewport,
                viewport_offset,
            } => {
                element.fmt_into(&mut out);
                fmt_offset(&mut out, element_offset);
                out.push(' ');
                viewport.fmt_into(&mut out);
                fmt_offset(&mut out, viewport_offset);
            }
            Self::AfterStart(edge) => {
                out.push_str("+=");
                edge.fmt_into(&mut out);
            }
        }
        f.write_str(&out)
    }
}

impl TryFrom<String> for Anchor {
    type Error = ScrollyteError;

    fn try_from(s: String) -> ScrollyteResult<Self> {
        Self::parse(&s)
    }
}

impl From<Anchor> for String {
    fn from(a: Anchor) -> Self {
        a.to_string()
    }
}

/// How region progress drives timelines.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scrub {
    /// Progress is only used for threshold callbacks and triggers.
    #[default]
    Off,
    /// Progress follows scroll position exactly.
    Immediate,
    /// Progress follows scroll position with inertia.
    Smoothed {
        /// Time constant of the exponential catch-up.
        secs: f64,
    },
}

/// Start/end pair, used for tier overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionBounds {
    /// Start condition.
    pub start: Anchor,
    /// End condition.
    pub end: Anchor,
}

/// Declarative scroll region.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionDef {
    /// Trigger element.
    pub trigger: ElementId,
    /// Start condition.
    #[serde(default = "default_start")]
    pub start: Anchor,
    /// End condition.
    #[serde(default = "default_end")]
    pub end: Anchor,
    /// Pin the trigger while the region is active.
    #[serde(default)]
    pub pin: bool,
    /// Scrub behaviour.
    #[serde(default)]
    pub scrub: Scrub,
    /// Per-tier start/end overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responsive: BTreeMap<ViewportTier, RegionBounds>,
}

fn default_start() -> Anchor {
    Anchor::edges(Edge::Top, Edge::Bottom)
}

fn default_end() -> Anchor {
    Anchor::edges(Edge::Bottom, Edge::Top)
}

impl RegionDef {
    /// Region over `trigger` with the default `"top bottom"` to `"bottom top"` range.
    pub fn new(trigger: impl Into<ElementId>) -> Self {
        Self {
            trigger: trigger.into(),
            start: default_start(),
            end: default_end(),
            pin: false,
            scrub: Scrub::Off,
            responsive: BTreeMap::new(),
        }
    }

    /// Set start and end from anchor strings.
    pub fn range(mut self, start: &str, end: &str) -> ScrollyteResult<Self> {
        self.start = Anchor::parse(start)?;
        self.end = Anchor::parse(end)?;
        Ok(self)
    }

    /// Enable pinning.
    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }

    /// Set scrub behaviour.
    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    /// Override start/end for one viewport tier.
    pub fn on_tier(mut self, tier: ViewportTier, start: &str, end: &str) -> ScrollyteResult<Self> {
        self.responsive.insert(
            tier,
            RegionBounds {
                start: Anchor::parse(start)?,
                end: Anchor::parse(end)?,
            },
        );
        Ok(self)
    }

    /// Static checks that do not need layout.
    pub fn validate(&self) -> ScrollyteResult<()> {
        let all = std::iter::once((&self.start, &self.end))
            .chain(self.responsive.values().map(|b| (&b.start, &b.end)));
        for (start, _) in all {
            if matches!(start, Anchor::AfterStart(_)) {
                return Err(ScrollyteError::validation(format!(
                    "region '{}': start cannot be relative to itself",
                    self.trigger
                )));
            }
        }
        if let Scrub::Smoothed { secs } = self.scrub {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ScrollyteError::validation(
                    "smoothed scrub duration must be > 0",
                ));
            }
        }
        Ok(())
    }

    fn bounds_for(&self, tier: ViewportTier) -> (&Anchor, &Anchor) {
        match self.responsive.get(&tier) {
            Some(b) => (&b.start, &b.end),
            None => (&self.start, &self.end),
        }
    }

    /// Resolve to pixel boundaries for the given layout.
    #[tracing::instrument(skip(self, host), fields(trigger = %self.trigger))]
    pub fn resolve(&self, host: &dyn Host, tier: ViewportTier) -> ScrollyteResult<ResolvedRegion> {
        let rect = host.measure(&self.trigger).ok_or_else(|| {
            ScrollyteError::layout_not_ready(format!("trigger '{}' is not in the document", self.trigger))
        })?;
        if rect.height() <= 0.0 {
            return Err(ScrollyteError::layout_not_ready(format!(
                "trigger '{}' has zero height",
                self.trigger
            )));
        }
        let vp = host.viewport();
        let (start, end) = self.bounds_for(tier);
        let start_px = anchor_px(start, rect.y0, rect.height(), vp, None)?;
        let end_px = anchor_px(end, rect.y0, rect.height(), vp, Some(start_px))?;
        if start_px >= end_px {
            return Err(ScrollyteError::validation(format!(
                "region '{}' resolves to start {start_px} >= end {end_px}",
                self.trigger
            )));
        }
        Ok(ResolvedRegion {
            start: start_px,
            end: end_px,
            trigger_top: rect.y0,
        })
    }
}

fn anchor_px(
    anchor: &Anchor,
    top: f64,
    height: f64,
    vp: Viewport,
    start: Option<f64>,
) -> ScrollyteResult<f64> {
    match *anchor {
        Anchor::Edges {
            element,
            element_offset,
            viewport,
            viewport_offset,
        } => Ok(top + element.resolve(height) + element_offset
            - (viewport.resolve(vp.height) + viewport_offset)),
        Anchor::AfterStart(distance) => {
            let start = start.ok_or_else(|| {
                ScrollyteError::validation("relative anchor used as region start")
            })?;
            Ok(start + distance.resolve(vp.height))
        }
    }
}

/// Pixel boundaries of a region for the current layout.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedRegion {
    /// Scroll offset where progress is 0.
    pub start: f64,
    /// Scroll offset where progress is 1.
    pub end: f64,
    /// Document-space top of the trigger at resolution time.
    pub trigger_top: f64,
}

impl ResolvedRegion {
    /// Linear progress for a scroll offset, clamped to `[0, 1]`.
    pub fn progress(&self, scroll: f64) -> f64 {
        ((scroll - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    fn zone(&self, scroll: f64) -> Zone {
        if scroll < self.start {
            Zone::Before
        } else if scroll > self.end {
            Zone::After
        } else {
            Zone::Active
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Before,
    Active,
    After,
}

/// Registration state of a region.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum RegionStatus {
    /// Waiting for the trigger to be laid out.
    Pending,
    /// Resolved and live.
    Active(ResolvedRegion),
    /// Torn down.
    Released,
}

/// Boundary crossing reported by a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ThresholdEvent {
    /// Crossed `start` scrolling down.
    Enter,
    /// Crossed `end` scrolling down.
    Leave,
    /// Crossed `end` scrolling up.
    EnterBack,
    /// Crossed `start` scrolling up.
    LeaveBack,
}

/// Live, read-only view of a region's progress.
///
/// Cloning shares the same underlying value; this is how one section observes another.
#[derive(Clone, Debug, Default)]
pub struct ProgressSignal(Rc<Cell<f64>>);

impl ProgressSignal {
    /// Current progress in `[0, 1]`.
    pub fn get(&self) -> f64 {
        self.0.get()
    }

    fn set(&self, v: f64) {
        self.0.set(v);
    }
}

/// Runtime of one registered region.
#[derive(Debug)]
pub struct Region {
    def: RegionDef,
    status: RegionStatus,
    listeners: Vec<ListenerId>,
    signal: ProgressSignal,
    last_scroll: Option<f64>,
    raw: f64,
    last_time: Option<f64>,
    pin: Option<PinLifecycle>,
}

impl Region {
    /// Attach listeners and try to resolve immediately; zero-size triggers stay pending.
    pub fn register(def: RegionDef, host: &mut dyn Host, tier: ViewportTier) -> ScrollyteResult<Self> {
        def.validate()?;
        let listeners = vec![
            host.add_listener(ListenerKind::Scroll),
            host.add_listener(ListenerKind::Resize),
        ];
        let pin = def.pin.then(|| PinLifecycle::new(def.trigger.clone()));
        let mut region = Self {
            def,
            status: RegionStatus::Pending,
            listeners,
            signal: ProgressSignal::default(),
            last_scroll: None,
            raw: 0.0,
            last_time: None,
            pin,
        };
        if let Err(e) = region.refresh(host, tier) {
            region.teardown(host);
            return Err(e);
        }
        Ok(region)
    }

    /// Definition this region was registered with.
    pub fn def(&self) -> &RegionDef {
        &self.def
    }

    /// Current status.
    pub fn status(&self) -> RegionStatus {
        self.status
    }

    /// Shared progress handle.
    pub fn signal(&self) -> ProgressSignal {
        self.signal.clone()
    }

    /// Exact (unsmoothed) progress of the last sample.
    pub fn raw_progress(&self) -> f64 {
        self.raw
    }

    /// Whether the trigger is pinned right now.
    pub fn is_pinned(&self) -> bool {
        self.pin.as_ref().is_some_and(PinLifecycle::is_pinned)
    }

    /// Re-derive pixel boundaries (layout pass or resize). Layout-not-ready keeps the region pending.
    pub fn refresh(&mut self, host: &mut dyn Host, tier: ViewportTier) -> ScrollyteResult<()> {
        if self.status == RegionStatus::Released {
            return Ok(());
        }
        if let Some(pin) = self.pin.as_mut() {
            pin.release(host);
        }
        match self.def.resolve(host, tier) {
            Ok(resolved) => {
                self.status = RegionStatus::Active(resolved);
                Ok(())
            }
            Err(ScrollyteError::LayoutNotReady(msg)) => {
                tracing::debug!(trigger = %self.def.trigger, %msg, "region registration deferred");
                self.status = RegionStatus::Pending;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Compute progress from one scroll sample and report crossed thresholds.
    pub(crate) fn sample(&mut self, scroll: f64, now: f64) -> Vec<ThresholdEvent> {
        let RegionStatus::Active(resolved) = self.status else {
            return Vec::new();
        };

        self.raw = resolved.progress(scroll);
        let shown = match self.def.scrub {
            Scrub::Smoothed { secs } => match self.last_time {
                Some(t0) => {
                    let dt = (now - t0).max(0.0);
                    let alpha = 1.0 - (-dt / secs).exp();
                    let cur = self.signal.get();
                    let next = cur + (self.raw - cur) * alpha;
                    if (self.raw - next).abs() < 1e-4 {
                        self.raw
                    } else {
                        next
                    }
                }
                None => self.raw,
            },
            Scrub::Off | Scrub::Immediate => self.raw,
        };
        self.last_time = Some(now);
        self.signal.set(shown);

        let prev = self.last_scroll.replace(scroll);
        let from = prev.map_or(Zone::Before, |p| resolved.zone(p));
        crossings(from, resolved.zone(scroll))
    }

    /// Apply pin state for the sampled scroll position.
    pub(crate) fn apply_pin(&mut self, host: &mut dyn Host, scroll: f64) {
        if let (RegionStatus::Active(resolved), Some(pin)) = (self.status, self.pin.as_mut()) {
            pin.update(host, &resolved, scroll);
        }
    }

    /// Whether smoothing still has distance to cover.
    pub(crate) fn is_settling(&self) -> bool {
        matches!(self.def.scrub, Scrub::Smoothed { .. }) && self.signal.get() != self.raw
    }

    /// Remove listeners and restore normal flow. Safe to call repeatedly.
    pub fn teardown(&mut self, host: &mut dyn Host) {
        for id in self.listeners.drain(..) {
            host.remove_listener(id);
        }
        if let Some(pin) = self.pin.as_mut() {
            pin.release(host);
        }
        self.status = RegionStatus::Released;
    }
}

fn crossings(from: Zone, to: Zone) -> Vec<ThresholdEvent> {
    use ThresholdEvent::*;
    match (from, to) {
        (Zone::Before, Zone::Active) => vec![Enter],
        (Zone::Before, Zone::After) => vec![Enter, Leave],
        (Zone::Active, Zone::After) => vec![Leave],
        (Zone::After, Zone::Active) => vec![EnterBack],
        (Zone::After, Zone::Before) => vec![EnterBack, LeaveBack],
        (Zone::Active, Zone::Before) => vec![LeaveBack],
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "../tests/unit/region/region.rs"]
mod tests;
