use super::*;

fn path(t: &str, f: i64) -> String {
    OutputTemplate::parse(t)
        .unwrap()
        .path_for(FrameIndex(f))
        .to_string_lossy()
        .into_owned()
}

#[test]
fn zero_padded_frame_number() {
    assert_eq!(path("frame_%04d.exr", 7), "frame_0007.exr");
    assert_eq!(path("output_%04d.png", 12345), "output_12345.png");
}

#[test]
fn plain_and_space_padded_conversions() {
    assert_eq!(path("f%d.png", 42), "f42.png");
    assert_eq!(path("f%3d.png", 5), "f  5.png");
}

#[test]
fn negative_frames_follow_printf() {
    assert_eq!(path("f_%04d.png", -7), "f_-007.png");
    assert_eq!(path("f_%d.png", -7), "f_-7.png");
}

#[test]
fn literal_percent_is_kept() {
    assert_eq!(path("100%%/f_%02d.png", 3), "100%/f_03.png");
    assert_eq!(path("f_%02d_%%.png", 3), "f_03_%.png");
}

#[test]
fn rejects_missing_repeated_or_foreign_conversions() {
    for bad in [
        "frame.png",
        "f_%d_%d.png",
        "f_%s.png",
        "f_%04x.png",
        "f_%",
        "f_%-4d.png",
    ] {
        let err = OutputTemplate::parse(bad).unwrap_err();
        assert!(
            matches!(err, StagecastError::Config(_)),
            "{bad} gave {err}"
        );
    }
}

#[test]
fn display_round_trips_raw_text() {
    let t = OutputTemplate::parse("out/f_%04d.png").unwrap();
    assert_eq!(t.to_string(), "out/f_%04d.png");
    assert_eq!(t.as_str(), "out/f_%04d.png");
}
