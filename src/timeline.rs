use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    animation::ease::Ease,
    foundation::core::{ElementId, Property, PropertyWrite},
    foundation::error::{ScrollyteError, ScrollyteResult},
    host::Host,
};

/// Placement of a keyframe on its timeline.
///
/// String forms follow GSAP's position parameter: `"+=0.5"` / `"-=0.2"` relative to the current
/// end of the timeline, `"<"` / `"<0.3"` relative to the previous keyframe's start, `">"` /
/// `">-0.1"` relative to its end, and `"intro"` / `"intro+=1"` relative to a label.
#[derive(Clone, Debug, PartialEq)]
pub enum Position {
    /// Absolute seconds from timeline start.
    Absolute(f64),
    /// Offset from the end of everything declared so far.
    AfterEnd(f64),
    /// Offset from the previous keyframe's start.
    WithPrevious(f64),
    /// Offset from the previous keyframe's end.
    AfterPrevious(f64),
    /// Offset from a label declared by an earlier keyframe.
    Label(String, f64),
}

impl Default for Position {
    fn default() -> Self {
        Self::AfterEnd(0.0)
    }
}

impl Position {
    /// Parse the GSAP string form.
    pub fn parse(s: &str) -> ScrollyteResult<Self> {
        let s = s.trim();
        let bad = || ScrollyteError::validation(format!("invalid timeline position '{s}'"));
        let num = |v: &str| -> ScrollyteResult<f64> {
            if v.is_empty() {
                Ok(0.0)
            } else {
                v.parse::<f64>().map_err(|_| bad())
            }
        };

        if let Some(v) = s.strip_prefix("+=") {
            return Ok(Self::AfterEnd(num(v)?));
        }
        if let Some(v) = s.strip_prefix("-=") {
            return Ok(Self::AfterEnd(-num(v)?));
        }
        if let Some(v) = s.strip_prefix('<') {
            return Ok(Self::WithPrevious(num(v)?));
        }
        if let Some(v) = s.strip_prefix('>') {
            return Ok(Self::AfterPrevious(num(v)?));
        }
        if let Ok(v) = s.parse::<f64>() {
            return Ok(Self::Absolute(v));
        }
        for (op, sign) in [("+=", 1.0), ("-=", -1.0)] {
            if let Some((label, off)) = s.split_once(op) {
                return Ok(Self::Label(label.to_owned(), sign * num(off)?));
            }
        }
        if s.is_empty() {
            return Err(bad());
        }
        Ok(Self::Label(s.to_owned(), 0.0))
    }
}

impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        fn signed(v: f64) -> String {
            if v < 0.0 { format!("-={}", -v) } else { format!("+={v}") }
        }
        match self {
            Self::Absolute(v) => serializer.serialize_f64(*v),
            Self::AfterEnd(v) => serializer.serialize_str(&signed(*v)),
            Self::WithPrevious(v) => serializer.serialize_str(&format!("<{v}")),
            Self::AfterPrevious(v) => serializer.serialize_str(&format!(">{v}")),
            Self::Label(l, v) => serializer.serialize_str(&format!("{l}{}", signed(*v))),
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Self::Absolute(v)),
            Repr::Str(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

fn default_duration() -> f64 {
    0.5
}

/// One declared `(target, properties, position, duration, easing)` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Element the keyframe animates.
    pub target: ElementId,
    /// Explicit start values; missing properties start from the value the track has at `position`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub from: BTreeMap<Property, f64>,
    /// End values; missing properties end at the value the track has at `position`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub to: BTreeMap<Property, f64>,
    /// Placement on the timeline.
    #[serde(default)]
    pub position: Position,
    /// Duration in timeline seconds.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Easing curve.
    #[serde(default)]
    pub ease: Ease,
    /// Label defined at this keyframe's resolved start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Keyframe {
    /// Keyframe animating `target` toward `to` values.
    pub fn to(target: impl Into<ElementId>, to: impl IntoIterator<Item = (Property, f64)>) -> Self {
        Self {
            target: target.into(),
            from: BTreeMap::new(),
            to: to.into_iter().collect(),
            position: Position::default(),
            duration: default_duration(),
            ease: Ease::default(),
            label: None,
        }
    }

    /// Keyframe animating `target` from `from` values to `to` values.
    pub fn from_to(
        target: impl Into<ElementId>,
        from: impl IntoIterator<Item = (Property, f64)>,
        to: impl IntoIterator<Item = (Property, f64)>,
    ) -> Self {
        let mut kf = Self::to(target, to);
        kf.from = from.into_iter().collect();
        kf
    }

    /// Set the position.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the duration.
    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = secs;
        self
    }

    /// Set the easing curve.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Define a label at this keyframe's start.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn validate(&self, index: usize) -> ScrollyteResult<()> {
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(ScrollyteError::animation(format!(
                "keyframe {index}: duration must be finite and >= 0"
            )));
        }
        if self.from.is_empty() && self.to.is_empty() {
            return Err(ScrollyteError::animation(format!(
                "keyframe {index}: no properties to animate"
            )));
        }
        if self.from.values().chain(self.to.values()).any(|v| !v.is_finite()) {
            return Err(ScrollyteError::animation(format!(
                "keyframe {index}: property values must be finite"
            )));
        }
        Ok(())
    }
}

/// Declarative timeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDef {
    /// Ordered keyframes.
    pub keyframes: Vec<Keyframe>,
    /// Values the targets show before any keyframe touches them (defaults to property rest values).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub initial: BTreeMap<ElementId, BTreeMap<Property, f64>>,
}

impl TimelineDef {
    /// Empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a keyframe.
    pub fn push(mut self, kf: Keyframe) -> Self {
        self.keyframes.push(kf);
        self
    }

    /// Declare a starting value.
    pub fn initial(mut self, target: impl Into<ElementId>, prop: Property, value: f64) -> Self {
        self.initial
            .entry(target.into())
            .or_default()
            .insert(prop, value);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Segment {
    start: f64,
    duration: f64,
    from: f64,
    to: f64,
    ease: Ease,
}

#[derive(Clone, Debug, PartialEq)]
struct Track {
    base: f64,
    segments: Vec<Segment>, // sorted by start, then declaration order
}

impl Track {
    fn value_at(&self, t: f64) -> f64 {
        let Some(first) = self.segments.first() else {
            return self.base;
        };
        let idx = self.segments.partition_point(|s| s.start <= t);
        if idx == 0 {
            return first.from;
        }
        let seg = &self.segments[idx - 1];
        let local = if seg.duration <= 0.0 {
            1.0
        } else {
            (t - seg.start) / seg.duration
        };
        let te = seg.ease.apply(local);
        seg.from + (seg.to - seg.from) * te
    }

    fn insert(&mut self, seg: Segment) {
        let idx = self.segments.partition_point(|s| s.start <= seg.start);
        self.segments.insert(idx, seg);
    }
}

/// Resolved timeline; sampling is a pure function of time.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    duration: f64,
    tracks: BTreeMap<(ElementId, Property), Track>,
    labels: BTreeMap<String, f64>,
    starts: Vec<f64>,
}

impl Timeline {
    /// Resolve positions in one left-to-right walk and bake implicit start values.
    #[tracing::instrument(skip(def), fields(keyframes = def.keyframes.len()))]
    pub fn build(def: &TimelineDef) -> ScrollyteResult<Self> {
        let mut tracks: BTreeMap<(ElementId, Property), Track> = BTreeMap::new();
        let mut labels: BTreeMap<String, f64> = BTreeMap::new();
        let mut starts = Vec::with_capacity(def.keyframes.len());
        let mut end = 0.0f64;
        let mut prev: Option<(f64, f64)> = None;

        for (i, kf) in def.keyframes.iter().enumerate() {
            kf.validate(i)?;

            let start = match &kf.position {
                Position::Absolute(t) => *t,
                Position::AfterEnd(off) => end + off,
                Position::WithPrevious(off) => prev.map_or(0.0, |(s, _)| s) + off,
                Position::AfterPrevious(off) => prev.map_or(0.0, |(_, e)| e) + off,
                Position::Label(name, off) => {
                    let at = labels.get(name).ok_or_else(|| {
                        ScrollyteError::validation(format!(
                            "keyframe {i}: label '{name}' is not defined by an earlier keyframe"
                        ))
                    })?;
                    at + off
                }
            };
            if !start.is_finite() {
                return Err(ScrollyteError::animation(format!(
                    "keyframe {i}: position is not finite"
                )));
            }
            let start = start.max(0.0);

            if let Some(label) = &kf.label {
                if labels.insert(label.clone(), start).is_some() {
                    return Err(ScrollyteError::validation(format!(
                        "keyframe {i}: duplicate label '{label}'"
                    )));
                }
            }

            let props: std::collections::BTreeSet<&Property> =
                kf.from.keys().chain(kf.to.keys()).collect();
            for prop in props {
                let key = (kf.target.clone(), prop.clone());
                let track = tracks.entry(key).or_insert_with(|| Track {
                    base: def
                        .initial
                        .get(&kf.target)
                        .and_then(|m| m.get(prop))
                        .copied()
                        .unwrap_or_else(|| prop.rest_value()),
                    segments: Vec::new(),
                });
                let before = track.value_at(start);
                track.insert(Segment {
                    start,
                    duration: kf.duration,
                    from: kf.from.get(prop).copied().unwrap_or(before),
                    to: kf.to.get(prop).copied().unwrap_or(before),
                    ease: kf.ease,
                });
            }

            let kf_end = start + kf.duration;
            end = end.max(kf_end);
            prev = Some((start, kf_end));
            starts.push(start);
        }

        Ok(Self {
            duration: end,
            tracks,
            labels,
            starts,
        })
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Resolved start of each keyframe, in declaration order.
    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    /// Resolved label time.
    pub fn label(&self, name: &str) -> Option<f64> {
        self.labels.get(name).copied()
    }

    /// Every `(target, property)` pair this timeline drives.
    pub fn properties(&self) -> impl Iterator<Item = (&ElementId, &Property)> {
        self.tracks.keys().map(|(e, p)| (e, p))
    }

    /// All property values at time `t` (clamped to `[0, duration]`).
    pub fn sample(&self, t: f64) -> Vec<PropertyWrite> {
        let t = t.clamp(0.0, self.duration);
        self.tracks
            .iter()
            .map(|((target, property), track)| PropertyWrite {
                target: target.clone(),
                property: property.clone(),
                value: track.value_at(t),
            })
            .collect()
    }

    /// All property values at normalized progress `p` in `[0, 1]`.
    pub fn sample_progress(&self, p: f64) -> Vec<PropertyWrite> {
        self.sample(p.clamp(0.0, 1.0) * self.duration)
    }

    /// Write the state at time `t`; returns the number of writes that landed.
    pub fn apply(&self, t: f64, host: &mut dyn Host) -> usize {
        let mut landed = 0;
        for w in self.sample(t) {
            if host.write(&w.target, &w.property, w.value) {
                landed += 1;
            } else {
                tracing::debug!(target_el = %w.target, property = w.property.name(), "stale target, write skipped");
            }
        }
        landed
    }
}

/// Repeat count for autonomous playback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Play `n` extra times (`Count(0)` plays once).
    Count(u32),
    /// Loop forever.
    Infinite,
    /// Play once.
    #[default]
    Once,
}

/// What starts an autonomous timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoTrigger {
    /// Start as soon as the timeline is created.
    #[default]
    Immediate,
    /// Start the first time the owning region is entered.
    OnEnter,
}

/// How a timeline's time is derived.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Drive {
    /// Time is `progress * duration` of the owning region; fully reversible.
    Scrub,
    /// Time advances with the wall clock once triggered.
    Autonomous {
        /// Start condition.
        #[serde(default)]
        trigger: AutoTrigger,
        /// Seconds between trigger and playback.
        #[serde(default)]
        delay: f64,
        /// Repeat behaviour.
        #[serde(default)]
        repeat: Repeat,
        /// Alternate direction on every repeat.
        #[serde(default)]
        yoyo: bool,
    },
}

impl Drive {
    /// One-shot autonomous playback starting on region entry.
    pub fn entrance() -> Self {
        Self::Autonomous {
            trigger: AutoTrigger::OnEnter,
            delay: 0.0,
            repeat: Repeat::Once,
            yoyo: false,
        }
    }

    /// Endless ping-pong loop starting immediately.
    pub fn looping() -> Self {
        Self::Autonomous {
            trigger: AutoTrigger::Immediate,
            delay: 0.0,
            repeat: Repeat::Infinite,
            yoyo: true,
        }
    }
}

/// Map elapsed seconds since trigger to timeline time.
pub fn playback_time(elapsed: f64, delay: f64, repeat: Repeat, yoyo: bool, duration: f64) -> f64 {
    let e = (elapsed - delay).max(0.0);
    if duration <= 0.0 {
        return 0.0;
    }
    let iterations = match repeat {
        Repeat::Once => Some(1u64),
        Repeat::Count(n) => Some(u64::from(n) + 1),
        Repeat::Infinite => None,
    };
    if let Some(n) = iterations {
        if e >= n as f64 * duration {
            let last = n - 1;
            return if yoyo && last % 2 == 1 { 0.0 } else { duration };
        }
    }
    let k = (e / duration).floor();
    let local = e - k * duration;
    if yoyo && (k as u64) % 2 == 1 {
        duration - local
    } else {
        local
    }
}

/// Whether autonomous playback has reached its final state.
pub fn playback_finished(elapsed: f64, delay: f64, repeat: Repeat, duration: f64) -> bool {
    match repeat {
        Repeat::Infinite => false,
        Repeat::Once => elapsed - delay >= duration,
        Repeat::Count(n) => elapsed - delay >= (f64::from(n) + 1.0) * duration,
    }
}

#[cfg(test)]
#[path = "../tests/unit/timeline/timeline.rs"]
mod tests;
