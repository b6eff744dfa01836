//! Sections: the unit a page mounts, made of one region plus the motion attached to it.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    driver::{Handle, IdleHandle, MotionDriver, RegionHandle, StageHandle, TimelineHandle},
    foundation::core::{ElementId, Rect, Viewport},
    foundation::error::{ScrollyteError, ScrollyteResult},
    host::MemoryHost,
    idle::IdleDef,
    region::{ProgressSignal, RegionDef},
    stage::StageDef,
    timeline::{Drive, Timeline, TimelineDef},
};

/// A timeline and the way it is driven.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineBinding {
    /// Drive mode.
    pub drive: Drive,
    /// Keyframes.
    #[serde(flatten)]
    pub timeline: TimelineDef,
}

/// Declarative section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionDef {
    /// Stable id, used in stage change reports.
    pub id: String,
    /// Region over the section's root element.
    pub region: RegionDef,
    /// Timelines bound to the region.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timelines: Vec<TimelineBinding>,
    /// Optional stage set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<StageDef>,
    /// Ambient loops, started on mount.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub idle: Vec<IdleDef>,
}

impl SectionDef {
    /// Section with just a region.
    pub fn new(id: impl Into<String>, region: RegionDef) -> Self {
        Self {
            id: id.into(),
            region,
            timelines: Vec::new(),
            stages: None,
            idle: Vec::new(),
        }
    }

    /// Attach a timeline.
    pub fn timeline(mut self, drive: Drive, timeline: TimelineDef) -> Self {
        self.timelines.push(TimelineBinding { drive, timeline });
        self
    }

    /// Attach a stage set.
    pub fn stages(mut self, stages: StageDef) -> Self {
        self.stages = Some(stages);
        self
    }

    /// Attach an ambient loop.
    pub fn idle(mut self, idle: IdleDef) -> Self {
        self.idle.push(idle);
        self
    }

    /// Checks that need no layout: region anchors, keyframes and stage thresholds.
    pub fn validate(&self) -> ScrollyteResult<()> {
        let ctx = |e: ScrollyteError| ScrollyteError::validation(format!("section '{}': {e}", self.id));
        self.region.validate().map_err(ctx)?;
        for b in &self.timelines {
            Timeline::build(&b.timeline).map_err(ctx)?;
        }
        if let Some(stages) = &self.stages {
            stages.validate().map_err(ctx)?;
        }
        Ok(())
    }
}

/// Live section; owns every handle it registered.
#[derive(Debug)]
pub struct MountedSection {
    id: String,
    region: Option<RegionHandle>,
    timelines: Vec<TimelineHandle>,
    stages: Option<StageHandle>,
    idle: Option<IdleHandle>,
    signal: ProgressSignal,
    degraded: Option<String>,
}

/// Mounting entry point.
pub struct Section;

impl Section {
    /// Register everything `def` declares on `driver`.
    ///
    /// A failure part-way releases what was already registered and leaves the section static;
    /// the reason is kept in [`MountedSection::degraded`].
    pub fn mount(def: &SectionDef, driver: &mut dyn MotionDriver) -> MountedSection {
        let mut mounted = MountedSection {
            id: def.id.clone(),
            region: None,
            timelines: Vec::new(),
            stages: None,
            idle: None,
            signal: ProgressSignal::default(),
            degraded: None,
        };
        if let Err(e) = mount_into(&mut mounted, def, driver) {
            tracing::warn!(section = %def.id, error = %e, "section mount failed, rendering static");
            mounted.teardown(driver);
            mounted.degraded = Some(e.to_string());
        }
        mounted
    }
}

fn mount_into(
    mounted: &mut MountedSection,
    def: &SectionDef,
    driver: &mut dyn MotionDriver,
) -> ScrollyteResult<()> {
    let region = driver.register_region(def.region.clone())?;
    mounted.region = Some(region);
    if let Some(signal) = driver.progress(region) {
        mounted.signal = signal;
    }
    for b in &def.timelines {
        let h = driver.create_timeline(&b.timeline, b.drive, Some(region))?;
        mounted.timelines.push(h);
    }
    if let Some(stages) = &def.stages {
        mounted.stages = Some(driver.register_stages(&def.id, stages.clone(), region)?);
    }
    if !def.idle.is_empty() {
        mounted.idle = Some(driver.create_idle(def.idle.clone())?);
    }
    Ok(())
}

impl MountedSection {
    /// Section id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Region handle, absent once torn down or when mounting failed.
    pub fn region(&self) -> Option<RegionHandle> {
        self.region
    }

    /// Stage set handle.
    pub fn stages(&self) -> Option<StageHandle> {
        self.stages
    }

    /// Idle animator handle.
    pub fn idle(&self) -> Option<IdleHandle> {
        self.idle
    }

    /// Timeline handles in declaration order.
    pub fn timelines(&self) -> &[TimelineHandle] {
        &self.timelines
    }

    /// Progress of the section's region, shareable with other sections.
    pub fn progress(&self) -> ProgressSignal {
        self.signal.clone()
    }

    /// Why the section fell back to static rendering, if it did.
    pub fn degraded(&self) -> Option<&str> {
        self.degraded.as_deref()
    }

    /// Release every handle. Safe to call repeatedly.
    pub fn teardown(&mut self, driver: &mut dyn MotionDriver) {
        let mut handles: Vec<Handle> = self.timelines.drain(..).map(Handle::from).collect();
        handles.extend(self.stages.take().map(Handle::from));
        handles.extend(self.idle.take().map(Handle::from));
        handles.extend(self.region.take().map(Handle::from));
        for h in handles {
            driver.teardown(h);
        }
    }
}

/// A headless page: document layout plus the sections mounted on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    /// Viewport size.
    pub viewport: Viewport,
    /// Total document height in pixels.
    pub height: f64,
    /// Layout boxes in document coordinates.
    pub elements: BTreeMap<ElementId, Rect>,
    /// Sections in page order.
    pub sections: Vec<SectionDef>,
}

impl SceneDef {
    /// Parse a scene from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrollyteResult<Self> {
        let scene: Self = serde_json::from_reader(r)
            .map_err(|e| ScrollyteError::validation(format!("parse scene JSON: {e}")))?;
        Ok(scene)
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScrollyteResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollyteError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Static checks over every section plus layout sanity.
    pub fn validate(&self) -> ScrollyteResult<()> {
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ScrollyteError::validation("scene height must be > 0"));
        }
        for (id, rect) in &self.elements {
            if rect.width() < 0.0 || rect.height() < 0.0 {
                return Err(ScrollyteError::validation(format!(
                    "element '{id}' has a negative size"
                )));
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        for s in &self.sections {
            if !seen.insert(s.id.as_str()) {
                return Err(ScrollyteError::validation(format!(
                    "duplicate section id '{}'",
                    s.id
                )));
            }
            s.validate()?;
        }
        Ok(())
    }

    /// Largest scroll offset the document allows.
    pub fn max_scroll(&self) -> f64 {
        (self.height - self.viewport.height).max(0.0)
    }

    /// In-memory document laid out as described.
    pub fn host(&self) -> MemoryHost {
        let mut host = MemoryHost::new(self.viewport);
        for (id, rect) in &self.elements {
            host.insert(id.clone(), *rect);
        }
        host
    }
}

#[cfg(test)]
#[path = "../tests/unit/section/section.rs"]
mod tests;
