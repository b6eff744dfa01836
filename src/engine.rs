use std::collections::BTreeMap;

use crate::{
    breakpoint::{BreakpointObserver, TierChange, ViewportTier},
    driver::{Handle, IdleHandle, MotionDriver, RegionHandle, StageHandle, TimelineHandle},
    foundation::core::ElementId,
    foundation::error::{ScrollyteError, ScrollyteResult},
    host::{FrameHandle, Host},
    idle::{IdleAnimator, IdleDef, OwnerId, OwnershipLedger},
    region::{ProgressSignal, Region, RegionDef, RegionStatus, Scrub, ThresholdEvent},
    stage::{StageChange, StageDef, StageDispatcher},
    timeline::{AutoTrigger, Drive, Timeline, TimelineDef, playback_finished, playback_time},
};

/// Threshold crossing tagged with its region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RegionEvent {
    /// Region that crossed.
    pub region: RegionHandle,
    /// Crossing.
    pub event: ThresholdEvent,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// What happened during one [`Engine::tick`].
pub struct FrameReport {
    /// Scroll offset sampled for the frame.
    pub scroll: f64,
    /// Threshold crossings, in region registration order.
    pub events: Vec<RegionEvent>,
    /// Stage transitions.
    pub stage_changes: Vec<StageChange>,
    /// Style writes that landed on present elements.
    pub writes: usize,
}

#[derive(Debug)]
struct TimelineRun {
    timeline: Timeline,
    drive: Drive,
    region: Option<RegionHandle>,
    started_at: Option<f64>,
    frame: Option<FrameHandle>,
    last_t: Option<f64>,
}

#[derive(Debug)]
struct StageRun {
    dispatcher: StageDispatcher,
    region: RegionHandle,
}

/// Scroll-driven motion runtime over a [`Host`].
#[derive(Debug)]
pub struct Engine<H: Host> {
    host: H,
    breakpoints: BreakpointObserver,
    next_id: u64,
    regions: BTreeMap<RegionHandle, Region>,
    timelines: BTreeMap<TimelineHandle, TimelineRun>,
    stages: BTreeMap<StageHandle, StageRun>,
    idles: BTreeMap<IdleHandle, IdleAnimator>,
    ledger: OwnershipLedger,
    pins: BTreeMap<ElementId, RegionHandle>,
    settle_frame: Option<FrameHandle>,
    now: f64,
}

impl<H: Host> Engine<H> {
    /// Engine with default breakpoints.
    pub fn new(host: H) -> Self {
        let breakpoints = BreakpointObserver::new(host.viewport().width);
        Self::with_breakpoints(host, breakpoints)
    }

    /// Engine with a custom breakpoint observer.
    pub fn with_breakpoints(host: H, breakpoints: BreakpointObserver) -> Self {
        Self {
            host,
            breakpoints,
            next_id: 0,
            regions: BTreeMap::new(),
            timelines: BTreeMap::new(),
            stages: BTreeMap::new(),
            idles: BTreeMap::new(),
            ledger: OwnershipLedger::new(),
            pins: BTreeMap::new(),
            settle_frame: None,
            now: 0.0,
        }
    }

    /// Underlying host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host, e.g. to scroll or change layout.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the engine, returning its host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Current viewport tier.
    pub fn tier(&self) -> ViewportTier {
        self.breakpoints.tier()
    }

    /// Status of a region.
    pub fn region_status(&self, region: RegionHandle) -> Option<RegionStatus> {
        self.regions.get(&region).map(Region::status)
    }

    /// Current stage of a stage set.
    pub fn current_stage(&self, stages: StageHandle) -> Option<usize> {
        self.stages.get(&stages).map(|s| s.dispatcher.current())
    }

    /// Resolved duration of a timeline.
    pub fn timeline_duration(&self, timeline: TimelineHandle) -> Option<f64> {
        self.timelines.get(&timeline).map(|t| t.timeline.duration())
    }

    /// Whether an idle animator is running.
    pub fn idle_running(&self, idle: IdleHandle) -> Option<bool> {
        self.idles.get(&idle).map(IdleAnimator::is_running)
    }

    /// Number of live registrations of any kind.
    pub fn live_handles(&self) -> usize {
        self.regions.len() + self.timelines.len() + self.stages.len() + self.idles.len()
    }

    /// Number of `(element, property)` pairs currently owned by a timeline or idle loop.
    pub fn owned_properties(&self) -> usize {
        self.ledger.len()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Advance one frame at wall-clock `now`.
    ///
    /// Scroll is sampled once and every region's progress is computed before any style is
    /// written, so all sections observe the same frame.
    #[tracing::instrument(skip(self), fields(regions = self.regions.len()))]
    pub fn tick(&mut self, now: f64) -> FrameReport {
        self.now = now;
        let scroll = self.host.scroll_y();
        let mut report = FrameReport {
            scroll,
            ..FrameReport::default()
        };

        let tier = self.breakpoints.tier();
        for (handle, region) in &mut self.regions {
            if region.status() == RegionStatus::Pending
                && let Err(e) = region.refresh(&mut self.host, tier)
            {
                tracing::warn!(trigger = %region.def().trigger, error = %e, "pending region retry failed");
            }
            for event in region.sample(scroll, now) {
                report.events.push(RegionEvent {
                    region: *handle,
                    event,
                });
            }
        }

        for region in self.regions.values_mut() {
            region.apply_pin(&mut self.host, scroll);
        }

        for run in self.stages.values_mut() {
            let Some(region) = self.regions.get(&run.region) else {
                continue;
            };
            if !matches!(region.status(), RegionStatus::Active(_)) {
                continue;
            }
            if let Some(change) = run.dispatcher.update(region.signal().get()) {
                report.stage_changes.push(change);
            }
        }

        for run in self.timelines.values_mut() {
            report.writes += advance_timeline(run, &self.regions, &report.events, &mut self.host, now);
        }

        for idle in self.idles.values() {
            report.writes += idle.tick(&mut self.host, now);
        }

        self.update_settle_frame();
        report
    }

    fn update_settle_frame(&mut self) {
        let settling = self.regions.values().any(Region::is_settling);
        match (settling, self.settle_frame) {
            (true, None) => self.settle_frame = Some(self.host.request_frame()),
            (false, Some(frame)) => {
                self.host.cancel_frame(frame);
                self.settle_frame = None;
            }
            _ => {}
        }
    }

    /// Re-measure after a layout change or viewport resize.
    ///
    /// Re-evaluates the viewport tier, re-resolves every region (retrying pending ones) and
    /// forces scrubbed timelines to rewrite on the next tick.
    pub fn resize(&mut self) -> ScrollyteResult<Option<TierChange>> {
        let change = self.breakpoints.update(self.host.viewport().width);
        let tier = self.breakpoints.tier();
        let mut first_err = None;
        for region in self.regions.values_mut() {
            if let Err(e) = region.refresh(&mut self.host, tier) {
                tracing::warn!(trigger = %region.def().trigger, error = %e, "region refresh failed");
                first_err.get_or_insert(e);
            }
        }
        for run in self.timelines.values_mut() {
            if run.drive == Drive::Scrub {
                run.last_t = None;
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(change),
        }
    }

    /// Release every registration.
    pub fn teardown_all(&mut self) {
        let handles: Vec<Handle> = self
            .timelines
            .keys()
            .map(|h| Handle::Timeline(*h))
            .chain(self.stages.keys().map(|h| Handle::Stages(*h)))
            .chain(self.idles.keys().map(|h| Handle::Idle(*h)))
            .chain(self.regions.keys().map(|h| Handle::Region(*h)))
            .collect();
        for h in handles {
            self.teardown(h);
        }
        if let Some(frame) = self.settle_frame.take() {
            self.host.cancel_frame(frame);
        }
    }

    /// Pause an idle animator in place.
    pub fn pause_idle(&mut self, idle: IdleHandle) {
        if let Some(anim) = self.idles.get_mut(&idle) {
            anim.pause(&mut self.host, self.now);
        }
    }

    /// Resume a paused idle animator.
    pub fn resume_idle(&mut self, idle: IdleHandle) {
        if let Some(anim) = self.idles.get_mut(&idle) {
            anim.resume(&mut self.host, self.now);
        }
    }
}

fn advance_timeline(
    run: &mut TimelineRun,
    regions: &BTreeMap<RegionHandle, Region>,
    events: &[RegionEvent],
    host: &mut dyn Host,
    now: f64,
) -> usize {
    let duration = run.timeline.duration();
    let t = match run.drive {
        Drive::Scrub => {
            let Some(region) = run.region.and_then(|r| regions.get(&r)) else {
                return 0;
            };
            if !matches!(region.status(), RegionStatus::Active(_)) {
                return 0;
            }
            region.signal().get() * duration
        }
        Drive::Autonomous {
            trigger,
            delay,
            repeat,
            yoyo,
        } => {
            if run.started_at.is_none() {
                let go = match trigger {
                    AutoTrigger::Immediate => true,
                    AutoTrigger::OnEnter => events
                        .iter()
                        .any(|e| Some(e.region) == run.region && e.event == ThresholdEvent::Enter),
                };
                if go {
                    run.started_at = Some(now);
                    run.frame = Some(host.request_frame());
                }
            }
            let Some(started) = run.started_at else {
                return 0;
            };
            let elapsed = now - started;
            if playback_finished(elapsed, delay, repeat, duration) {
                if let Some(frame) = run.frame.take() {
                    host.cancel_frame(frame);
                }
            }
            playback_time(elapsed, delay, repeat, yoyo, duration)
        }
    };

    if run.last_t == Some(t) {
        return 0;
    }
    run.last_t = Some(t);
    run.timeline.apply(t, host)
}

impl<H: Host> MotionDriver for Engine<H> {
    fn is_animated(&self) -> bool {
        true
    }

    fn register_region(&mut self, def: RegionDef) -> ScrollyteResult<RegionHandle> {
        if def.pin {
            if let Some(existing) = self.pins.get(&def.trigger) {
                return Err(ScrollyteError::validation(format!(
                    "'{}' is already pinned by region {}",
                    def.trigger, existing.0
                )));
            }
        }
        let trigger = def.trigger.clone();
        let pin = def.pin;
        let region = Region::register(def, &mut self.host, self.breakpoints.tier())?;
        let handle = RegionHandle(self.next_id());
        if pin {
            self.pins.insert(trigger, handle);
        }
        self.regions.insert(handle, region);
        Ok(handle)
    }

    fn progress(&self, region: RegionHandle) -> Option<ProgressSignal> {
        self.regions.get(&region).map(Region::signal)
    }

    fn create_timeline(
        &mut self,
        def: &TimelineDef,
        drive: Drive,
        region: Option<RegionHandle>,
    ) -> ScrollyteResult<TimelineHandle> {
        let needs_region = match drive {
            Drive::Scrub => true,
            Drive::Autonomous { trigger, .. } => trigger == AutoTrigger::OnEnter,
        };
        if needs_region {
            let r = region
                .and_then(|r| self.regions.get(&r))
                .ok_or_else(|| ScrollyteError::validation("timeline needs a registered region"))?;
            if drive == Drive::Scrub && r.def().scrub == Scrub::Off {
                return Err(ScrollyteError::validation(format!(
                    "scrubbed timeline bound to region '{}' which does not scrub",
                    r.def().trigger
                )));
            }
        }

        let timeline = Timeline::build(def)?;
        let handle = TimelineHandle(self.next_id());
        self.ledger.claim(OwnerId(handle.0), timeline.properties())?;

        let mut run = TimelineRun {
            timeline,
            drive,
            region,
            started_at: None,
            frame: None,
            last_t: None,
        };
        if matches!(drive, Drive::Autonomous { .. }) {
            run.timeline.apply(0.0, &mut self.host);
            run.last_t = Some(0.0);
        }
        self.timelines.insert(handle, run);
        Ok(handle)
    }

    fn register_stages(
        &mut self,
        section: &str,
        def: StageDef,
        region: RegionHandle,
    ) -> ScrollyteResult<StageHandle> {
        if !self.regions.contains_key(&region) {
            return Err(ScrollyteError::validation("stage set needs a registered region"));
        }
        let dispatcher = StageDispatcher::new(section, def)?;
        let handle = StageHandle(self.next_id());
        self.stages.insert(handle, StageRun { dispatcher, region });
        Ok(handle)
    }

    fn create_idle(&mut self, defs: Vec<IdleDef>) -> ScrollyteResult<IdleHandle> {
        let handle = IdleHandle(self.next_id());
        self.ledger.claim(
            OwnerId(handle.0),
            defs.iter().map(|d| (&d.target, &d.property)),
        )?;
        let anim = IdleAnimator::start(defs, &mut self.host, self.now);
        self.idles.insert(handle, anim);
        Ok(handle)
    }

    fn teardown(&mut self, handle: Handle) {
        match handle {
            Handle::Region(h) => {
                if let Some(mut region) = self.regions.remove(&h) {
                    region.teardown(&mut self.host);
                    self.pins.retain(|_, owner| *owner != h);
                }
            }
            Handle::Timeline(h) => {
                if let Some(mut run) = self.timelines.remove(&h) {
                    if let Some(frame) = run.frame.take() {
                        self.host.cancel_frame(frame);
                    }
                    self.ledger.release(OwnerId(h.0));
                }
            }
            Handle::Stages(h) => {
                self.stages.remove(&h);
            }
            Handle::Idle(h) => {
                if let Some(mut anim) = self.idles.remove(&h) {
                    anim.stop(&mut self.host);
                    self.ledger.release(OwnerId(h.0));
                }
            }
        }
        if self.regions.is_empty() {
            if let Some(frame) = self.settle_frame.take() {
                self.host.cancel_frame(frame);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine/engine.rs"]
mod tests;
