use super::*;

#[test]
fn viewport_parse_accepts_width_by_height() {
    let vp = Viewport::parse("1280x800").unwrap();
    assert_eq!(vp.width, 1280.0);
    assert_eq!(vp.height, 800.0);
    assert!(Viewport::parse("1280").is_err());
    assert!(Viewport::parse("0x800").is_err());
}

#[test]
fn property_names_follow_gsap_aliases() {
    assert_eq!(Property::from("autoAlpha".to_owned()), Property::Opacity);
    assert_eq!(Property::from("rotate".to_owned()), Property::Rotation);
    assert_eq!(
        Property::from("--glow".to_owned()),
        Property::Custom("--glow".to_owned())
    );
    let p: Property = serde_json::from_str("\"scaleX\"").unwrap();
    assert_eq!(p, Property::ScaleX);
    assert_eq!(serde_json::to_string(&Property::RotationY).unwrap(), "\"rotationY\"");
}

#[test]
fn rest_values_match_css_identity() {
    assert_eq!(Property::Opacity.rest_value(), 1.0);
    assert_eq!(Property::Scale.rest_value(), 1.0);
    assert_eq!(Property::Y.rest_value(), 0.0);
    assert_eq!(Property::Custom("--t".to_owned()).rest_value(), 0.0);
}
