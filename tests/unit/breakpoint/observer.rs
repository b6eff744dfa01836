use super::*;

#[test]
fn classifies_default_breakpoints() {
    assert_eq!(BreakpointObserver::new(375.0).tier(), ViewportTier::Mobile);
    assert_eq!(BreakpointObserver::new(768.0).tier(), ViewportTier::Tablet);
    assert_eq!(BreakpointObserver::new(1440.0).tier(), ViewportTier::Desktop);
}

#[test]
fn update_reports_only_tier_changes() {
    let mut obs = BreakpointObserver::new(1280.0);
    assert_eq!(obs.update(1100.0), None);
    assert_eq!(
        obs.update(800.0),
        Some(TierChange {
            from: ViewportTier::Desktop,
            to: ViewportTier::Tablet
        })
    );
    assert_eq!(obs.update(790.0), None);
    assert_eq!(obs.tier(), ViewportTier::Tablet);
}

#[test]
fn custom_breakpoints_are_validated() {
    assert!(BreakpointObserver::with_breakpoints(500.0, 900.0, 600.0).is_err());
    let obs = BreakpointObserver::with_breakpoints(650.0, 600.0, 1200.0).unwrap();
    assert_eq!(obs.tier(), ViewportTier::Tablet);
}
