use super::*;
use crate::driver::NullDriver;
use crate::engine::Engine;
use crate::foundation::core::Property;
use crate::host::Host as _;
use crate::region::Scrub;
use crate::timeline::Keyframe;

fn scene() -> SceneDef {
    SceneDef::from_reader(
        r#"{
            "viewport": { "width": 1200, "height": 800 },
            "height": 4000,
            "elements": {
                "hero": { "x0": 0, "y0": 0, "x1": 1200, "y1": 1600 },
                "hero-title": { "x0": 100, "y0": 300, "x1": 1100, "y1": 500 }
            },
            "sections": [
                {
                    "id": "hero",
                    "region": { "trigger": "hero", "start": "top top", "end": "bottom top", "pin": true, "scrub": "immediate" },
                    "timelines": [
                        { "drive": { "mode": "scrub" }, "keyframes": [ { "target": "hero-title", "to": { "opacity": 0 }, "duration": 1 } ] }
                    ],
                    "stages": { "thresholds": [0, 0.5] }
                }
            ]
        }"#
        .as_bytes(),
    )
    .unwrap()
}

#[test]
fn scene_json_parses_and_validates() {
    let s = scene();
    s.validate().unwrap();
    assert_eq!(s.sections[0].region.scrub, Scrub::Immediate);
    assert_eq!(s.max_scroll(), 3200.0);
    assert!(s.host().measure(&"hero".into()).is_some());
}

#[test]
fn duplicate_section_ids_are_rejected() {
    let mut s = scene();
    s.sections.push(s.sections[0].clone());
    assert!(s.validate().is_err());
}

#[test]
fn mount_registers_and_teardown_releases() {
    let s = scene();
    let mut engine = Engine::new(s.host());
    let mut mounted = Section::mount(&s.sections[0], &mut engine);
    assert!(mounted.degraded().is_none());
    assert!(mounted.region().is_some());
    assert_eq!(mounted.timelines().len(), 1);
    assert!(mounted.stages().is_some());

    engine.host_mut().set_scroll_y(400.0);
    engine.tick(0.0);
    assert!((mounted.progress().get() - 0.25).abs() < 1e-12);
    assert_eq!(engine.host().pinned_count(), 1);

    mounted.teardown(&mut engine);
    mounted.teardown(&mut engine);
    assert_eq!(engine.live_handles(), 0);
    assert_eq!(engine.host().listener_count(), 0);
    assert_eq!(engine.host().pinned_count(), 0);
}

#[test]
fn failed_mount_degrades_to_static() {
    let s = scene();
    let mut engine = Engine::new(s.host());
    let def = SectionDef::new("broken", RegionDef::new("hero")).timeline(
        Drive::Scrub,
        TimelineDef::new().push(Keyframe::to("hero-title", [(Property::Y, 10.0)])),
    );
    let mounted = Section::mount(&def, &mut engine);
    assert!(mounted.degraded().is_some());
    assert_eq!(mounted.region(), None);
    assert_eq!(engine.live_handles(), 0);
    assert_eq!(engine.host().listener_count(), 0);
}

#[test]
fn null_driver_mounts_without_motion() {
    let s = scene();
    let mut driver = NullDriver::new();
    let mut mounted = Section::mount(&s.sections[0], &mut driver);
    assert!(mounted.degraded().is_none());
    assert_eq!(mounted.progress().get(), 0.0);
    mounted.teardown(&mut driver);
    assert_eq!(mounted.region(), None);
}

#[test]
fn sections_share_progress_signals() {
    let s = scene();
    let mut engine = Engine::new(s.host());
    let hero = Section::mount(&s.sections[0], &mut engine);
    let observer = hero.progress();
    engine.host_mut().set_scroll_y(800.0);
    engine.tick(0.0);
    assert_eq!(observer.get(), 0.5);
}
