use super::*;
use crate::animation::ease::Ease;
use crate::foundation::core::{Property, Rect, Viewport};
use crate::host::{ListenerKind, MemoryHost};
use crate::timeline::{Keyframe, Repeat};

fn host() -> MemoryHost {
    MemoryHost::new(Viewport::new(1200.0, 800.0).unwrap())
        .with_element("hero", Rect::new(0.0, 1000.0, 1200.0, 2000.0))
        .with_element("title", Rect::new(100.0, 1100.0, 1100.0, 1300.0))
        .with_element("orb", Rect::new(500.0, 1500.0, 700.0, 1700.0))
}

fn scrub_region() -> RegionDef {
    RegionDef::new("hero")
        .range("top top", "bottom top")
        .unwrap()
        .scrub(Scrub::Immediate)
}

fn fade_in() -> TimelineDef {
    TimelineDef::new().push(
        Keyframe::from_to("title", [(Property::Opacity, 0.0)], [(Property::Opacity, 1.0)])
            .duration(1.0)
            .ease(Ease::Linear),
    )
}

fn opacity(e: &Engine<MemoryHost>) -> Option<f64> {
    e.host().style(&"title".into(), &Property::Opacity)
}

#[test]
fn scrubbed_state_depends_only_on_scroll() {
    let build = || {
        let mut e = Engine::new(host());
        let r = e.register_region(scrub_region()).unwrap();
        e.create_timeline(&fade_in(), Drive::Scrub, Some(r)).unwrap();
        e
    };

    let mut direct = build();
    direct.host_mut().set_scroll_y(1500.0);
    direct.tick(0.0);

    let mut wandering = build();
    for (i, y) in [1200.0, 1900.0, 300.0, 1500.0].into_iter().enumerate() {
        wandering.host_mut().set_scroll_y(y);
        wandering.tick(i as f64 * 0.1);
    }

    assert_eq!(opacity(&direct), Some(0.5));
    assert_eq!(
        direct.host().styles_of(&"title".into()),
        wandering.host().styles_of(&"title".into())
    );
}

#[test]
fn every_region_is_sampled_before_writes() {
    let mut e = Engine::new(host());
    let a = e.register_region(scrub_region()).unwrap();
    let b = e
        .register_region(RegionDef::new("orb").range("top bottom", "bottom top").unwrap())
        .unwrap();
    e.host_mut().set_scroll_y(1200.0);
    let report = e.tick(0.0);
    assert_eq!(report.scroll, 1200.0);
    assert_eq!(
        report.events,
        vec![
            RegionEvent {
                region: a,
                event: ThresholdEvent::Enter
            },
            RegionEvent {
                region: b,
                event: ThresholdEvent::Enter
            },
        ]
    );
}

#[test]
fn scrub_requires_scrubbing_region() {
    let mut e = Engine::new(host());
    let r = e
        .register_region(RegionDef::new("hero").range("top top", "bottom top").unwrap())
        .unwrap();
    assert!(matches!(
        e.create_timeline(&fade_in(), Drive::Scrub, Some(r)),
        Err(ScrollyteError::Validation(_))
    ));
    assert!(e.create_timeline(&fade_in(), Drive::Scrub, None).is_err());
}

#[test]
fn one_pinning_region_per_trigger() {
    let mut e = Engine::new(host());
    let pinned = scrub_region().pinned();
    let first = e.register_region(pinned.clone()).unwrap();
    assert!(matches!(
        e.register_region(pinned.clone()),
        Err(ScrollyteError::Validation(_))
    ));
    e.teardown(first.into());
    assert!(e.register_region(pinned).is_ok());
}

#[test]
fn leaving_a_pinned_region_restores_flow() {
    let mut e = Engine::new(host());
    let def = RegionDef::new("hero").range("top top", "+=600").unwrap().pinned();
    e.register_region(def).unwrap();

    e.host_mut().set_scroll_y(1300.0);
    e.tick(0.0);
    assert_eq!(e.host().pinned_count(), 1);

    e.host_mut().set_scroll_y(1700.0);
    e.tick(0.1);
    assert_eq!(e.host().pinned_count(), 0);

    e.host_mut().set_scroll_y(500.0);
    e.tick(0.2);
    assert_eq!(e.host().pinned_count(), 0);
}

#[test]
fn entrance_plays_on_enter_and_stops_its_frame_loop() {
    let mut e = Engine::new(host());
    let r = e
        .register_region(RegionDef::new("hero").range("top center", "bottom top").unwrap())
        .unwrap();
    let t = e.create_timeline(&fade_in(), Drive::entrance(), Some(r)).unwrap();
    assert_eq!(opacity(&e), Some(0.0));
    assert_eq!(e.timeline_duration(t), Some(1.0));

    e.tick(0.0);
    assert_eq!(e.host().active_frames(), 0);

    e.host_mut().set_scroll_y(700.0);
    e.tick(1.0);
    assert_eq!(e.host().active_frames(), 1);
    e.tick(1.5);
    assert_eq!(opacity(&e), Some(0.5));

    e.host_mut().set_scroll_y(0.0);
    e.tick(2.5);
    assert_eq!(opacity(&e), Some(1.0));
    assert_eq!(e.host().active_frames(), 0);
}

#[test]
fn immediate_loop_starts_on_first_tick() {
    let mut e = Engine::new(host());
    let drive = Drive::Autonomous {
        trigger: AutoTrigger::Immediate,
        delay: 0.0,
        repeat: Repeat::Infinite,
        yoyo: true,
    };
    e.create_timeline(&fade_in(), drive, None).unwrap();
    e.tick(10.0);
    assert_eq!(opacity(&e), Some(0.0));
    e.tick(11.5);
    assert_eq!(opacity(&e), Some(0.5));
    e.tick(11.75);
    assert_eq!(opacity(&e), Some(0.25));
}

#[test]
fn conflicting_owners_are_rejected_until_released() {
    let mut e = Engine::new(host());
    let r = e.register_region(scrub_region()).unwrap();
    let t = e.create_timeline(&fade_in(), Drive::Scrub, Some(r)).unwrap();
    let idle = IdleDef {
        target: "title".into(),
        property: Property::Opacity,
        source: crate::animation::proc::ProcScalar::Sine {
            amp: 0.1,
            freq_hz: 1.0,
            phase: 0.0,
            offset: 0.9,
        },
    };
    assert!(matches!(
        e.create_idle(vec![idle.clone()]),
        Err(ScrollyteError::Validation(_))
    ));
    e.teardown(t.into());
    assert!(e.create_idle(vec![idle]).is_ok());
}

#[test]
fn stages_follow_region_progress() {
    let mut e = Engine::new(host());
    let r = e.register_region(scrub_region()).unwrap();
    let s = e
        .register_stages("challenge", StageDef::evenly(3), r)
        .unwrap();
    let mut seen = Vec::new();
    for y in (1000..=2000).step_by(50).chain((1000..=2000).rev().step_by(50)) {
        e.host_mut().set_scroll_y(f64::from(y));
        for c in e.tick(0.0).stage_changes {
            seen.push(c.to);
        }
    }
    assert_eq!(seen, vec![1, 2, 1, 0]);
    assert_eq!(e.current_stage(s), Some(0));
}

#[test]
fn resize_retries_pending_regions_and_updates_tier() {
    let h = host().with_element("late", Rect::new(0.0, 2500.0, 1200.0, 2500.0));
    let mut e = Engine::new(h);
    let r = e
        .register_region(RegionDef::new("late").range("top top", "+=400").unwrap())
        .unwrap();
    assert_eq!(e.region_status(r), Some(RegionStatus::Pending));

    e.host_mut()
        .insert("late", Rect::new(0.0, 2500.0, 700.0, 3100.0));
    e.host_mut().set_viewport(Viewport::new(700.0, 900.0).unwrap());
    let change = e.resize().unwrap();
    assert_eq!(change.map(|c| c.to), Some(ViewportTier::Mobile));
    assert!(matches!(e.region_status(r), Some(RegionStatus::Active(_))));
}

#[test]
fn tick_retries_pending_regions_once_layout_lands() {
    let h = host()
        .with_element("late", Rect::new(0.0, 2500.0, 1200.0, 2500.0))
        .with_element("late-title", Rect::new(0.0, 2500.0, 1200.0, 2600.0));
    let mut e = Engine::new(h);
    let r = e
        .register_region(
            RegionDef::new("late")
                .range("top top", "bottom top")
                .unwrap()
                .scrub(Scrub::Immediate),
        )
        .unwrap();
    let fade = TimelineDef::new().push(
        Keyframe::from_to("late-title", [(Property::Opacity, 0.0)], [(Property::Opacity, 1.0)])
            .duration(1.0)
            .ease(Ease::Linear),
    );
    e.create_timeline(&fade, Drive::Scrub, Some(r)).unwrap();

    e.tick(0.0);
    assert_eq!(e.region_status(r), Some(RegionStatus::Pending));

    e.host_mut()
        .insert("late", Rect::new(0.0, 2500.0, 1200.0, 3100.0));
    e.host_mut().set_scroll_y(2800.0);
    e.tick(0.1);

    assert!(matches!(e.region_status(r), Some(RegionStatus::Active(_))));
    let opacity = e.host().style(&"late-title".into(), &Property::Opacity).unwrap();
    assert!((opacity - 0.5).abs() < 1e-9, "opacity {opacity}");
}

#[test]
fn smoothing_holds_a_frame_loop_until_settled() {
    let mut e = Engine::new(host());
    e.register_region(
        RegionDef::new("hero")
            .range("top top", "bottom top")
            .unwrap()
            .scrub(Scrub::Smoothed { secs: 0.3 }),
    )
    .unwrap();
    e.host_mut().set_scroll_y(1000.0);
    e.tick(0.0);
    e.host_mut().set_scroll_y(2000.0);
    e.tick(0.05);
    assert_eq!(e.host().active_frames(), 1);

    let mut now = 0.05;
    while e.host().active_frames() > 0 && now < 20.0 {
        now += 1.0 / 60.0;
        e.tick(now);
    }
    assert_eq!(e.host().active_frames(), 0);
}

#[test]
fn teardown_all_leaves_nothing_behind() {
    let mut e = Engine::new(host());
    let r = e.register_region(scrub_region().pinned()).unwrap();
    e.create_timeline(&fade_in(), Drive::Scrub, Some(r)).unwrap();
    e.register_stages("hero", StageDef::evenly(2), r).unwrap();
    e.create_idle(vec![IdleDef::spin("orb", 30.0)]).unwrap();
    e.host_mut().set_scroll_y(1400.0);
    e.tick(0.0);
    assert!(e.host().listener_count_of(ListenerKind::Scroll) > 0);
    assert_eq!(e.host().pinned_count(), 1);

    e.teardown_all();
    e.teardown_all();
    assert_eq!(e.live_handles(), 0);
    assert_eq!(e.owned_properties(), 0);
    assert_eq!(e.host().listener_count(), 0);
    assert_eq!(e.host().active_frames(), 0);
    assert_eq!(e.host().pinned_count(), 0);
}
