use serde::Serialize;

use crate::{
    foundation::error::ScrollyteResult,
    idle::IdleDef,
    region::{ProgressSignal, RegionDef},
    stage::StageDef,
    timeline::{Drive, TimelineDef},
};

macro_rules! handle {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(pub u64);
    };
}

handle!(
    /// Registered region.
    RegionHandle
);
handle!(
    /// Created timeline.
    TimelineHandle
);
handle!(
    /// Registered stage set.
    StageHandle
);
handle!(
    /// Running idle animator.
    IdleHandle
);

/// Anything a section can ask a driver to release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Handle {
    /// A region.
    Region(RegionHandle),
    /// A timeline.
    Timeline(TimelineHandle),
    /// A stage set.
    Stages(StageHandle),
    /// An idle animator.
    Idle(IdleHandle),
}

impl From<RegionHandle> for Handle {
    fn from(h: RegionHandle) -> Self {
        Self::Region(h)
    }
}

impl From<TimelineHandle> for Handle {
    fn from(h: TimelineHandle) -> Self {
        Self::Timeline(h)
    }
}

impl From<StageHandle> for Handle {
    fn from(h: StageHandle) -> Self {
        Self::Stages(h)
    }
}

impl From<IdleHandle> for Handle {
    fn from(h: IdleHandle) -> Self {
        Self::Idle(h)
    }
}

/// Motion capabilities a section depends on.
///
/// Sections are written against this trait only; whether anything actually moves is the driver's
/// business.
pub trait MotionDriver {
    /// Whether this driver produces motion at all.
    fn is_animated(&self) -> bool;

    /// Register a scroll region.
    fn register_region(&mut self, def: RegionDef) -> ScrollyteResult<RegionHandle>;

    /// Shared progress of a region, for cross-section observers.
    fn progress(&self, region: RegionHandle) -> Option<ProgressSignal>;

    /// Build a timeline and attach it to `region` (required for [`Drive::Scrub`] and
    /// on-enter autonomous playback).
    fn create_timeline(
        &mut self,
        def: &TimelineDef,
        drive: Drive,
        region: Option<RegionHandle>,
    ) -> ScrollyteResult<TimelineHandle>;

    /// Attach a stage set to `region`; stage changes are reported under `section`.
    fn register_stages(
        &mut self,
        section: &str,
        def: StageDef,
        region: RegionHandle,
    ) -> ScrollyteResult<StageHandle>;

    /// Start ambient loops.
    fn create_idle(&mut self, defs: Vec<IdleDef>) -> ScrollyteResult<IdleHandle>;

    /// Release whatever `handle` names. Unknown or already released handles are ignored.
    fn teardown(&mut self, handle: Handle);
}

/// Driver for environments without a motion runtime: every request succeeds and nothing moves.
#[derive(Debug, Default)]
pub struct NullDriver {
    next: u64,
}

impl NullDriver {
    /// New null driver.
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl MotionDriver for NullDriver {
    fn is_animated(&self) -> bool {
        false
    }

    fn register_region(&mut self, def: RegionDef) -> ScrollyteResult<RegionHandle> {
        def.validate()?;
        Ok(RegionHandle(self.next()))
    }

    fn progress(&self, _region: RegionHandle) -> Option<ProgressSignal> {
        Some(ProgressSignal::default())
    }

    fn create_timeline(
        &mut self,
        _def: &TimelineDef,
        _drive: Drive,
        _region: Option<RegionHandle>,
    ) -> ScrollyteResult<TimelineHandle> {
        Ok(TimelineHandle(self.next()))
    }

    fn register_stages(
        &mut self,
        _section: &str,
        def: StageDef,
        _region: RegionHandle,
    ) -> ScrollyteResult<StageHandle> {
        def.validate()?;
        Ok(StageHandle(self.next()))
    }

    fn create_idle(&mut self, _defs: Vec<IdleDef>) -> ScrollyteResult<IdleHandle> {
        Ok(IdleHandle(self.next()))
    }

    fn teardown(&mut self, _handle: Handle) {}
}
