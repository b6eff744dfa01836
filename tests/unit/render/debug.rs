use super::*;
use crate::foundation::core::Viewport;
use crate::host::PinStyle;

const BG: [u8; 4] = [18, 20, 28, 255];

fn host() -> MemoryHost {
    MemoryHost::new(Viewport::new(100.0, 100.0).unwrap())
        .with_element("box", Rect::new(10.0, 10.0, 30.0, 30.0))
}

#[test]
fn frame_matches_viewport() {
    let f = render_debug_frame(&host()).unwrap();
    assert_eq!((f.width, f.height), (100, 100));
    assert_eq!(f.data.len(), 100 * 100 * 4);
    assert_eq!(f.pixel(90, 90), Some(BG));
    assert_eq!(f.pixel(100, 0), None);
}

#[test]
fn visible_element_is_painted() {
    let f = render_debug_frame(&host()).unwrap();
    assert_ne!(f.pixel(20, 20), Some(BG));
}

#[test]
fn transparent_and_scrolled_away_elements_are_not() {
    let mut h = host();
    h.write(&"box".into(), &Property::Opacity, 0.0);
    assert_eq!(render_debug_frame(&h).unwrap().pixel(20, 20), Some(BG));

    let mut h = host();
    h.set_scroll_y(50.0);
    assert_eq!(render_debug_frame(&h).unwrap().pixel(20, 20), Some(BG));
}

#[test]
fn pinned_elements_stay_in_view() {
    let mut h = host();
    h.set_scroll_y(50.0);
    h.set_pin(
        &"box".into(),
        Some(PinStyle {
            top_px: 10.0,
            spacer_px: 100.0,
        }),
    );
    assert_ne!(render_debug_frame(&h).unwrap().pixel(20, 20), Some(BG));
}

#[test]
fn translation_moves_the_box() {
    let mut h = host();
    h.write(&"box".into(), &Property::X, 50.0);
    let f = render_debug_frame(&h).unwrap();
    assert_eq!(f.pixel(20, 20), Some(BG));
    assert_ne!(f.pixel(70, 20), Some(BG));
}

#[test]
fn huge_viewports_are_rejected() {
    let h = MemoryHost::new(Viewport::new(20_000.0, 100.0).unwrap());
    assert!(render_debug_frame(&h).is_err());
}
