use super::*;
use crate::foundation::math::{Vec3, transform_point};
use crate::scene::resolver::MemoryResolver;
use approx::assert_relative_eq;

const ROOT: &str = r#"
{
  "version": "1",
  "prims": [
    {
      "name": "World",
      "transform": { "translate": [0, 1, 0] },
      "children": [
        {
          "name": "cam",
          "kind": { "camera": {} },
          "transform": {
            "time_samples": [
              { "time": 1, "value": { "translate": [0, 0, 10] } },
              { "time": 11, "value": { "translate": [10, 0, 10] } }
            ]
          }
        },
        {
          "name": "hidden",
          "visibility": "invisible",
          "children": [ { "name": "inner", "kind": { "cube": {} } } ]
        },
        { "name": "set", "references": ["props/set.json"] }
      ]
    }
  ]
}
"#;

const SET: &str = r#"
{
  "version": "1",
  "prims": [
    { "name": "table", "kind": { "cube": { "size": 1.0 } }, "transform": { "scale": [2, 1, 1] } },
    { "name": "lamp", "references": ["lamp.json"] }
  ]
}
"#;

const LAMP: &str = r#"{ "version": "1", "prims": [ { "name": "bulb", "kind": { "sphere": {} } } ] }"#;

fn resolver() -> MemoryResolver {
    MemoryResolver::new()
        .with_asset("memory://shot/root.json", ROOT)
        .with_asset("memory://shot/props/set.json", SET)
        .with_asset("memory://shot/props/lamp.json", LAMP)
}

fn path(s: &str) -> ScenePath {
    ScenePath::parse(s).unwrap()
}

#[test]
fn opens_and_grafts_references() {
    let stage = Stage::open_with_resolver("memory://shot/root.json", &resolver()).unwrap();
    assert_eq!(
        stage.layer_identifiers(),
        &[
            "memory://shot/root.json".to_string(),
            "memory://shot/props/set.json".to_string(),
            "memory://shot/props/lamp.json".to_string(),
        ]
    );

    for p in [
        "/World",
        "/World/cam",
        "/World/hidden/inner",
        "/World/set/table",
        "/World/set/lamp/bulb",
    ] {
        assert!(stage.prim_at_path(&path(p)).is_some(), "missing {p}");
    }
    assert!(stage.prim_at_path(&path("/World/nope")).is_none());
    assert_eq!(stage.prim_count(), 8);

    let bulb = stage.prim_at_path(&path("/World/set/lamp/bulb")).unwrap();
    assert_eq!(stage.prim(bulb).layer, 2);
}

#[test]
fn world_transform_composes_ancestors_and_samples_time() {
    let stage = Stage::open_with_resolver("memory://shot/root.json", &resolver()).unwrap();
    let cam = stage.prim_at_path(&path("/World/cam")).unwrap();

    let at = |t: f64| transform_point(&stage.world_transform(cam, t).unwrap(), &Vec3::zeros());
    assert_relative_eq!(at(1.0), Vec3::new(0.0, 1.0, 10.0));
    assert_relative_eq!(at(6.0), Vec3::new(5.0, 1.0, 10.0));
    assert_relative_eq!(at(50.0), Vec3::new(10.0, 1.0, 10.0));
}

#[test]
fn visibility_is_inherited() {
    let stage = Stage::open_with_resolver("memory://shot/root.json", &resolver()).unwrap();
    let inner = stage.prim_at_path(&path("/World/hidden/inner")).unwrap();
    let table = stage.prim_at_path(&path("/World/set/table")).unwrap();
    assert!(stage.is_hidden(inner));
    assert!(!stage.is_hidden(table));
}

#[test]
fn reference_cycles_are_scene_errors() {
    let r = MemoryResolver::new()
        .with_asset(
            "memory://a.json",
            r#"{ "version": "1", "prims": [ { "name": "A", "references": ["b.json"] } ] }"#,
        )
        .with_asset(
            "memory://b.json",
            r#"{ "version": "1", "prims": [ { "name": "B", "references": ["a.json"] } ] }"#,
        );
    let err = Stage::open_with_resolver("memory://a.json", &r).unwrap_err();
    assert!(matches!(err, StagecastError::Scene(_)));
    assert!(err.to_string().contains("reference cycle"));
}

#[test]
fn conflicting_grafts_and_missing_assets_fail() {
    let r = MemoryResolver::new()
        .with_asset(
            "memory://root.json",
            r#"{ "version": "1", "prims": [ { "name": "A", "children": [ { "name": "x" } ], "references": ["x.json"] } ] }"#,
        )
        .with_asset(
            "memory://x.json",
            r#"{ "version": "1", "prims": [ { "name": "x" } ] }"#,
        );
    let err = Stage::open_with_resolver("memory://root.json", &r).unwrap_err();
    assert!(err.to_string().contains("defined more than once"));

    let r = MemoryResolver::new().with_asset(
        "memory://root.json",
        r#"{ "version": "1", "prims": [ { "name": "A", "references": ["gone.json"] } ] }"#,
    );
    assert!(Stage::open_with_resolver("memory://root.json", &r).is_err());
}

#[test]
fn invalid_layer_errors_name_the_layer() {
    let r = MemoryResolver::new().with_asset("memory://bad.json", "{ \"version\": 1 ");
    let err = Stage::open_with_resolver("memory://bad.json", &r).unwrap_err();
    assert!(matches!(err, StagecastError::Serde(_)));
    assert!(err.to_string().contains("memory://bad.json"));
}

#[test]
fn opens_from_filesystem() {
    let dir = std::path::PathBuf::from("target").join("stage_tests").join("fs_open");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("props")).unwrap();
    std::fs::write(dir.join("root.json"), ROOT).unwrap();
    std::fs::write(dir.join("props").join("set.json"), SET).unwrap();
    std::fs::write(dir.join("props").join("lamp.json"), LAMP).unwrap();

    let stage = Stage::open(dir.join("root.json")).unwrap();
    assert!(stage.prim_at_path(&path("/World/set/lamp/bulb")).is_some());
    assert_eq!(stage.layer_identifiers().len(), 3);
}

#[test]
fn scope_ignores_authored_transform() {
    let layer = Layer::from_json(
        r#"{ "version": "1", "prims": [ { "name": "S", "kind": "scope", "transform": { "translate": [5, 0, 0] } } ] }"#,
    )
    .unwrap();
    let stage = Stage::from_layer("memory://inline.json", &layer, &MemoryResolver::new()).unwrap();
    let s = stage.prim_at_path(&path("/S")).unwrap();
    assert_relative_eq!(stage.world_transform(s, 1.0).unwrap(), Mat4::identity());
}
