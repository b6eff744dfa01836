use super::*;

fn all() -> Vec<Ease> {
    let mut out = vec![
        Ease::Linear,
        Ease::BackOut,
        Ease::ElasticOut,
        Ease::BounceOut,
        Ease::CubicBezier {
            x1: 0.25,
            y1: 0.1,
            x2: 0.25,
            y2: 1.0,
        },
        Ease::Spring {
            stiffness: 120.0,
            damping: 14.0,
            mass: 1.0,
        },
    ];
    for dir in [EaseDir::In, EaseDir::Out, EaseDir::InOut] {
        for degree in 1..=4 {
            out.push(Ease::Power { degree, dir });
        }
        out.push(Ease::Sine(dir));
        out.push(Ease::Expo(dir));
    }
    out
}

#[test]
fn endpoints_are_stable() {
    for ease in all() {
        assert!(ease.apply(0.0).abs() < 1e-9, "{ease:?} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at 1");
    }
}

#[test]
fn input_is_clamped() {
    for ease in all() {
        assert_eq!(ease.apply(-3.0), ease.apply(0.0));
        assert_eq!(ease.apply(7.0), ease.apply(1.0));
    }
}

#[test]
fn monotonic_spot_check_for_non_overshooting_curves() {
    for dir in [EaseDir::In, EaseDir::Out, EaseDir::InOut] {
        for ease in [
            Ease::Power { degree: 2, dir },
            Ease::Sine(dir),
            Ease::Expo(dir),
        ] {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b, "{ease:?}");
            assert!(b < c, "{ease:?}");
        }
    }
}

#[test]
fn gsap_names_parse() {
    assert_eq!(Ease::parse_name("none"), Some(Ease::Linear));
    assert_eq!(
        Ease::parse_name("power2.inOut"),
        Some(Ease::Power {
            degree: 2,
            dir: EaseDir::InOut
        })
    );
    assert_eq!(
        Ease::parse_name("power3"),
        Some(Ease::Power {
            degree: 3,
            dir: EaseDir::Out
        })
    );
    assert_eq!(Ease::parse_name("sine.in"), Some(Ease::Sine(EaseDir::In)));
    assert_eq!(Ease::parse_name("wobble.out"), None);
    assert_eq!(Ease::parse_name("power2.sideways"), None);
}

#[test]
fn serde_accepts_strings_and_objects() {
    let e: Ease = serde_json::from_str("\"expo.out\"").unwrap();
    assert_eq!(e, Ease::Expo(EaseDir::Out));
    let e: Ease = serde_json::from_str("{\"cubic_bezier\": [0.25, 0.1, 0.25, 1.0]}").unwrap();
    assert!(matches!(e, Ease::CubicBezier { .. }));
    let e: Ease =
        serde_json::from_str("{\"spring\": {\"stiffness\": 100, \"damping\": 10, \"mass\": 1}}")
            .unwrap();
    assert!(matches!(e, Ease::Spring { .. }));
    assert!(serde_json::from_str::<Ease>("\"nope\"").is_err());
    assert_eq!(
        serde_json::to_string(&Ease::default()).unwrap(),
        "\"power1.out\""
    );
}

#[test]
fn identity_bezier_tracks_its_input() {
    let e = Ease::CubicBezier {
        x1: 0.25,
        y1: 0.25,
        x2: 0.75,
        y2: 0.75,
    };
    for i in 1..100 {
        let x = f64::from(i) / 100.0;
        assert!((e.apply(x) - x).abs() < 1e-6, "x={x} -> {}", e.apply(x));
    }
    assert!((e.apply(0.999) - 0.999).abs() < 1e-6);
}

#[test]
fn css_ease_matches_reference_points() {
    let e = Ease::CubicBezier {
        x1: 0.25,
        y1: 0.1,
        x2: 0.25,
        y2: 1.0,
    };
    assert!((e.apply(0.5) - 0.802_403).abs() < 1e-4, "{}", e.apply(0.5));
}
