use super::*;
use crate::foundation::core::{Rect, Viewport};
use crate::host::MemoryHost;

fn host() -> MemoryHost {
    MemoryHost::new(Viewport::new(1200.0, 800.0).unwrap())
        .with_element("orb", Rect::new(0.0, 0.0, 100.0, 100.0))
}

#[test]
fn ledger_rejects_conflicting_claims() {
    let mut ledger = OwnershipLedger::new();
    let orb = ElementId::from("orb");
    ledger
        .claim(OwnerId(1), [(&orb, &Property::Y), (&orb, &Property::Opacity)])
        .unwrap();
    assert!(ledger.claim(OwnerId(2), [(&orb, &Property::Y)]).is_err());
    assert!(ledger.claim(OwnerId(1), [(&orb, &Property::Y)]).is_ok());

    ledger.release(OwnerId(1));
    assert!(ledger.is_empty());
    ledger.claim(OwnerId(2), [(&orb, &Property::Y)]).unwrap();
    assert_eq!(ledger.owner(&orb, &Property::Y), Some(OwnerId(2)));
}

#[test]
fn failed_claim_takes_nothing() {
    let mut ledger = OwnershipLedger::new();
    let a = ElementId::from("a");
    let b = ElementId::from("b");
    ledger.claim(OwnerId(1), [(&b, &Property::X)]).unwrap();
    assert!(
        ledger
            .claim(OwnerId(2), [(&a, &Property::X), (&b, &Property::X)])
            .is_err()
    );
    assert_eq!(ledger.owner(&a, &Property::X), None);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn pause_and_resume_preserve_phase() {
    let mut h = host();
    let mut anim = IdleAnimator::start(vec![IdleDef::spin("orb", 90.0)], &mut h, 10.0);
    assert_eq!(h.active_frames(), 1);

    anim.tick(&mut h, 11.0);
    assert_eq!(h.style(&"orb".into(), &Property::Rotation), Some(90.0));

    anim.pause(&mut h, 11.0);
    assert_eq!(h.active_frames(), 0);
    assert_eq!(anim.local_time(50.0), 1.0);

    anim.resume(&mut h, 20.0);
    anim.tick(&mut h, 21.0);
    assert_eq!(h.style(&"orb".into(), &Property::Rotation), Some(180.0));
}

#[test]
fn stop_cancels_frame_loop_once() {
    let mut h = host();
    let mut anim = IdleAnimator::start(vec![IdleDef::float("orb", 8.0, 4.0)], &mut h, 0.0);
    anim.stop(&mut h);
    anim.stop(&mut h);
    assert_eq!(h.active_frames(), 0);
    let before = h.write_count();
    anim.tick(&mut h, 5.0);
    assert_eq!(h.write_count(), before);
}

#[test]
fn absent_target_is_skipped() {
    let mut h = host();
    let anim = IdleAnimator::start(vec![IdleDef::spin("ghost", 45.0)], &mut h, 0.0);
    anim.tick(&mut h, 1.0);
    assert_eq!(h.write_count(), 0);
}
