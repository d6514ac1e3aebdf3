use super::*;

fn valid() -> RenderConfig {
    RenderConfig {
        camera: "/World/cam".to_string(),
        ..RenderConfig::default()
    }
}

#[test]
fn defaults_match_cli_defaults() {
    let c = RenderConfig::default();
    assert_eq!((c.width, c.height), (512, 512));
    assert_eq!(c.output, "output_%04d.png");
    assert_eq!((c.first_frame, c.last_frame), (1, 1));
    assert_eq!(c.select, "/");
    assert_eq!(c.camera, "");
    assert_eq!(c.renderer, RendererKind::Opt);
    assert_eq!(c.conform, ConformPolicy::MatchVertically);
    assert_eq!(c.frame_range().len_frames(), 1);
}

#[test]
fn empty_camera_is_required_error() {
    let err = RenderConfig::default().validate().unwrap_err();
    assert!(matches!(err, StagecastError::Config(_)));
    assert!(err.to_string().contains("camera path is required"));
    valid().validate().unwrap();
}

#[test]
fn rejects_bad_fields() {
    let cases = [
        RenderConfig { width: 0, ..valid() },
        RenderConfig { complexity: 2.5, ..valid() },
        RenderConfig { complexity: f64::NAN, ..valid() },
        RenderConfig { camera: "cam".to_string(), ..valid() },
        RenderConfig { select: "/a/".to_string(), ..valid() },
        RenderConfig { output: "frame.png".to_string(), ..valid() },
        RenderConfig { output: "frame_%04d.xyz".to_string(), ..valid() },
        RenderConfig { output: "frame_%04d".to_string(), ..valid() },
    ];
    for c in cases {
        let err = c.validate().unwrap_err();
        assert!(matches!(err, StagecastError::Config(_)), "{c:?}: {err}");
    }
}

#[test]
fn reversed_range_is_valid_and_empty() {
    let c = RenderConfig {
        first_frame: 10,
        last_frame: 2,
        ..valid()
    };
    c.validate().unwrap();
    assert!(c.frame_range().is_empty());
}

#[test]
fn render_params_carry_run_constants() {
    let c = RenderConfig {
        complexity: 1.4,
        draw_mode: DrawMode::Wireframe,
        cull_style: CullStyle::Nothing,
        ..valid()
    };
    let p = c.render_params();
    assert_eq!(p.complexity, 1.4);
    assert_eq!(p.draw_mode, DrawMode::Wireframe);
    assert_eq!(p.cull_style, CullStyle::Nothing);
    assert!(p.show_guides);
}

#[test]
fn thread_hint_resolution() {
    assert_eq!(resolve_thread_count(0, 8), 8);
    assert_eq!(resolve_thread_count(3, 8), 3);
    assert_eq!(resolve_thread_count(-2, 8), 6);
    assert_eq!(resolve_thread_count(-20, 8), 1);
    assert_eq!(resolve_thread_count(0, 0), 1);
    assert_eq!(resolve_thread_count(i32::MIN, 4), 1);
}

#[test]
fn pool_honors_positive_hint() {
    let pool = build_thread_pool(2).unwrap();
    assert_eq!(pool.current_num_threads(), 2);
}

#[test]
fn config_round_trips_through_json() {
    let c = RenderConfig {
        renderer: RendererKind::Simple,
        ..valid()
    };
    let json = serde_json::to_string(&c).unwrap();
    assert!(json.contains("\"renderer\":\"simple\""));
    let back: RenderConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);

    let partial: RenderConfig = serde_json::from_str(r#"{ "camera": "/c" }"#).unwrap();
    assert_eq!(partial.width, 512);
}
