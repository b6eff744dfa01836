use super::*;
use crate::foundation::core::Rect;
use crate::host::{MemoryHost, PinStyle};

fn host() -> MemoryHost {
    MemoryHost::new(Viewport::new(1200.0, 800.0).unwrap())
        .with_element("section", Rect::new(0.0, 1000.0, 1200.0, 2000.0))
}

#[test]
fn anchors_parse_gsap_strings() {
    assert_eq!(
        Anchor::parse("top bottom").unwrap(),
        Anchor::edges(Edge::Top, Edge::Bottom)
    );
    assert_eq!(
        Anchor::parse("top+=100 center-=50").unwrap(),
        Anchor::Edges {
            element: Edge::Top,
            element_offset: 100.0,
            viewport: Edge::Center,
            viewport_offset: -50.0,
        }
    );
    assert_eq!(
        Anchor::parse("bottom 80%").unwrap(),
        Anchor::edges(Edge::Bottom, Edge::Percent(80.0))
    );
    assert_eq!(
        Anchor::parse("+=150%").unwrap(),
        Anchor::AfterStart(Edge::Percent(150.0))
    );
    assert!(Anchor::parse("top bottom left").is_err());
    assert!(Anchor::parse("middle top").is_err());
}

#[test]
fn anchor_display_parses_back() {
    for s in ["top bottom", "top+=100 center-=50", "bottom 80%", "+=600px"] {
        let a = Anchor::parse(s).unwrap();
        assert_eq!(Anchor::parse(&a.to_string()).unwrap(), a);
    }
}

#[test]
fn resolve_maps_edges_to_scroll_offsets() {
    let h = host();
    let def = RegionDef::new("section").range("top top", "bottom top").unwrap();
    let r = def.resolve(&h, ViewportTier::Desktop).unwrap();
    assert_eq!(r.start, 1000.0);
    assert_eq!(r.end, 2000.0);

    let def = RegionDef::new("section")
        .range("top center", "+=400")
        .unwrap();
    let r = def.resolve(&h, ViewportTier::Desktop).unwrap();
    assert_eq!(r.start, 600.0);
    assert_eq!(r.end, 1000.0);
    assert_eq!(r.progress(800.0), 0.5);
    assert_eq!(r.progress(0.0), 0.0);
    assert_eq!(r.progress(5000.0), 1.0);
}

#[test]
fn inverted_range_is_rejected() {
    let h = host();
    let def = RegionDef::new("section").range("bottom top", "top top").unwrap();
    assert!(matches!(
        def.resolve(&h, ViewportTier::Desktop),
        Err(ScrollyteError::Validation(_))
    ));
}

#[test]
fn start_relative_to_itself_is_invalid() {
    let mut def = RegionDef::new("section");
    def.start = Anchor::parse("+=100").unwrap();
    assert!(def.validate().is_err());
}

#[test]
fn responsive_override_applies_for_tier() {
    let h = host();
    let def = RegionDef::new("section")
        .range("top top", "bottom top")
        .unwrap()
        .on_tier(ViewportTier::Mobile, "top 80%", "bottom 20%")
        .unwrap();
    let desktop = def.resolve(&h, ViewportTier::Desktop).unwrap();
    let mobile = def.resolve(&h, ViewportTier::Mobile).unwrap();
    assert_eq!(desktop.start, 1000.0);
    assert_eq!(mobile.start, 1000.0 - 640.0);
    assert_eq!(mobile.end, 2000.0 - 160.0);
}

#[test]
fn zero_height_trigger_defers_registration() {
    let mut h = host().with_element("late", Rect::new(0.0, 3000.0, 1200.0, 3000.0));
    let def = RegionDef::new("late").range("top top", "+=500").unwrap();
    let mut region = Region::register(def, &mut h, ViewportTier::Desktop).unwrap();
    assert_eq!(region.status(), RegionStatus::Pending);
    assert!(region.sample(3200.0, 0.0).is_empty());
    assert_eq!(region.signal().get(), 0.0);

    h.insert("late", Rect::new(0.0, 3000.0, 1200.0, 3600.0));
    region.refresh(&mut h, ViewportTier::Desktop).unwrap();
    assert!(matches!(region.status(), RegionStatus::Active(_)));
    region.sample(3250.0, 0.1);
    assert_eq!(region.signal().get(), 0.5);
}

#[test]
fn thresholds_fire_in_both_directions() {
    let mut h = host();
    let def = RegionDef::new("section").range("top top", "bottom top").unwrap();
    let mut region = Region::register(def, &mut h, ViewportTier::Desktop).unwrap();

    assert!(region.sample(0.0, 0.0).is_empty());
    assert_eq!(region.sample(1500.0, 0.1), vec![ThresholdEvent::Enter]);
    assert!(region.sample(1600.0, 0.2).is_empty());
    assert_eq!(region.sample(2500.0, 0.3), vec![ThresholdEvent::Leave]);
    assert_eq!(region.sample(1900.0, 0.4), vec![ThresholdEvent::EnterBack]);
    assert_eq!(region.sample(10.0, 0.5), vec![ThresholdEvent::LeaveBack]);
    assert_eq!(
        region.sample(2600.0, 0.6),
        vec![ThresholdEvent::Enter, ThresholdEvent::Leave]
    );
}

#[test]
fn first_sample_past_start_reports_enter() {
    let mut h = host();
    let def = RegionDef::new("section").range("top top", "bottom top").unwrap();
    let mut region = Region::register(def, &mut h, ViewportTier::Desktop).unwrap();
    assert_eq!(region.sample(1200.0, 0.0), vec![ThresholdEvent::Enter]);
}

#[test]
fn smoothed_scrub_lags_then_settles() {
    let mut h = host();
    let def = RegionDef::new("section")
        .range("top top", "bottom top")
        .unwrap()
        .scrub(Scrub::Smoothed { secs: 0.5 });
    let mut region = Region::register(def, &mut h, ViewportTier::Desktop).unwrap();
    region.sample(1000.0, 0.0);
    assert_eq!(region.signal().get(), 0.0);

    region.sample(2000.0, 0.1);
    let lagging = region.signal().get();
    assert!(lagging > 0.0 && lagging < 1.0);
    assert!(region.is_settling());

    let mut t = 0.1;
    while region.is_settling() && t < 30.0 {
        t += 1.0 / 60.0;
        region.sample(2000.0, t);
    }
    assert_eq!(region.signal().get(), 1.0);
}

#[test]
fn pin_applies_inside_and_releases_outside() {
    let mut h = host();
    let def = RegionDef::new("section")
        .range("top top", "+=600")
        .unwrap()
        .pinned();
    let mut region = Region::register(def, &mut h, ViewportTier::Desktop).unwrap();

    region.sample(1200.0, 0.0);
    region.apply_pin(&mut h, 1200.0);
    assert!(region.is_pinned());
    assert_eq!(
        h.pin(&"section".into()),
        Some(PinStyle {
            top_px: 0.0,
            spacer_px: 600.0
        })
    );

    region.sample(1700.0, 0.1);
    region.apply_pin(&mut h, 1700.0);
    assert!(!region.is_pinned());
    assert_eq!(h.pinned_count(), 0);
}

#[test]
fn teardown_releases_listeners_and_pin_once() {
    let mut h = host();
    let def = RegionDef::new("section")
        .range("top top", "+=600")
        .unwrap()
        .pinned();
    let mut region = Region::register(def, &mut h, ViewportTier::Desktop).unwrap();
    assert_eq!(h.listener_count(), 2);
    region.apply_pin(&mut h, 1100.0);
    assert_eq!(h.pinned_count(), 1);

    region.teardown(&mut h);
    region.teardown(&mut h);
    assert_eq!(h.listener_count(), 0);
    assert_eq!(h.pinned_count(), 0);
    assert_eq!(region.status(), RegionStatus::Released);
}
