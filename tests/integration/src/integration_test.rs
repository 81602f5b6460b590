//! End-to-end integration test for the resolution pipeline
//!
//! Exercises the complete flow against an on-disk config tree: key-file
//! resolution -> chain expansion -> merge -> substitution -> provenance.

use cascade_core::{CascadeResolver, Context, TransformRegistry, template};
use cascade_fs::{ConfigDocument, DocumentInfo, DocumentStore, NormalizedPath};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_doc(store: &DocumentStore, path: &NormalizedPath, parent: Option<&str>, data: Value) {
    let doc = ConfigDocument {
        info: DocumentInfo {
            name: path.file_name().map(|n| n.trim_end_matches(".yml").to_string()),
            parent: parent.map(String::from),
            ..Default::default()
        },
        data,
    };
    store.save(path, &doc).unwrap();
}

/// A production-shaped tree: show-wide defaults, per-episode override,
/// per-shot override, with env lists merged by name.
fn setup_show(dir: &NormalizedPath) {
    let store = DocumentStore::new();

    write_doc(
        &store,
        &dir.join("base.yml"),
        None,
        json!({
            "general": {
                "app": "maya2018.exe",
                "env": [
                    {"name": "MODULE1", "path": "C:/aaaa", "mode": "set"},
                    {"name": "TEMP", "path": "C:/trush/xxxx", "mode": "append"}
                ]
            },
            "shot": {"fps": 24, "width": 640, "height": 360},
            "asset": {
                "camera": "<workspace>/camera/<project>_master_camera.ma",
                "toolA": "@../tools/toolA"
            }
        }),
    );
    write_doc(
        &store,
        &dir.join("ep01.yml"),
        Some("../base.yml"),
        json!({
            "general": {
                "app": "maya2020.exe",
                "env": [{"name": "MODULE1", "path": "C:/bbbb", "mode": "set"}]
            },
            "shot": {"fps": 30}
        }),
    );
    write_doc(
        &store,
        &dir.join("ep01_s01.yml"),
        Some("../ep01.yml"),
        json!({"shot": {"width": 1920, "height": 1080}}),
    );
}

#[test]
fn test_full_resolution_pipeline() {
    let temp = TempDir::new().unwrap();
    let dir = NormalizedPath::new(temp.path().join("env"));
    setup_show(&dir);

    let context = Context::new()
        .with("episode", "ep01")
        .with("scene", "s01")
        .with("project", "PROJ1")
        .with("workspace", "/shows/proj1/scenes");
    let resolver = CascadeResolver::new(dir.clone()).with_context(context);

    // most specific existing file wins (no cut/progress files exist)
    let key = resolver
        .key_file("<episode>_<scene>_<cut>_<progress>")
        .unwrap()
        .unwrap();
    assert_eq!(key.file_name(), Some("ep01_s01.yml"));

    let chain = resolver.expand_chain(&key).unwrap();
    let names: Vec<_> = chain.iter().filter_map(|p| p.file_name()).collect();
    assert_eq!(names, vec!["base.yml", "ep01.yml", "ep01_s01.yml"]);

    let merged = resolver.fold_chain(&chain, true).unwrap();
    assert_eq!(
        merged,
        json!({
            "general": {
                "app": "maya2020.exe",
                "env": [
                    {"name": "MODULE1", "path": "C:/bbbb", "mode": "set"},
                    {"name": "TEMP", "path": "C:/trush/xxxx", "mode": "append"}
                ]
            },
            "shot": {"fps": 30, "width": 1920, "height": 1080},
            "asset": {
                "camera": "/shows/proj1/scenes/camera/PROJ1_master_camera.ma",
                "toolA": dir.parent().unwrap().join("tools/toolA").as_str()
            }
        })
    );
}

#[test]
fn test_resolve_matches_stepwise_pipeline() {
    let temp = TempDir::new().unwrap();
    let dir = NormalizedPath::new(temp.path().join("env"));
    setup_show(&dir);

    let context = Context::new().with("episode", "ep01").with("scene", "s01");
    let resolver = CascadeResolver::new(dir).with_context(context);

    let via_resolve = resolver
        .resolve("<episode>_<scene>_<cut>_<progress>", false)
        .unwrap();

    let key = resolver
        .key_file("<episode>_<scene>_<cut>_<progress>")
        .unwrap()
        .unwrap();
    let chain = resolver.expand_chain(&key).unwrap();
    let stepwise = resolver.fold_chain(&chain, false).unwrap();

    assert_eq!(via_resolve, stepwise);
}

#[test]
fn test_provenance_tracks_most_specific_contributor() {
    let temp = TempDir::new().unwrap();
    let dir = NormalizedPath::new(temp.path().join("env"));
    setup_show(&dir);

    let context = Context::new().with("episode", "ep01").with("scene", "s01");
    let resolver = CascadeResolver::new(dir).with_context(context);

    let key = resolver
        .key_file("<episode>_<scene>_<cut>_<progress>")
        .unwrap()
        .unwrap();
    let chain = resolver.expand_chain(&key).unwrap();
    let merged = resolver.fold_chain(&chain, false).unwrap();
    let annotated = resolver.annotate(merged, &chain).unwrap();

    assert_eq!(annotated["shot"]["fps"], json!("30--->env/ep01.yml"));
    assert_eq!(annotated["shot"]["width"], json!("1920--->env/ep01_s01.yml"));
    assert_eq!(
        annotated["general"]["app"],
        json!("maya2020.exe--->env/ep01.yml")
    );
}

#[test]
fn test_transform_backed_key_resolution() {
    let temp = TempDir::new().unwrap();
    let dir = NormalizedPath::new(temp.path().join("env"));
    let store = DocumentStore::new();
    write_doc(&store, &dir.join("ep01_s05_c20.yml"), None, json!({"ok": 1}));

    // derive scene/cut fields from a composite shot id like "s05c20"
    let mut registry = TransformRegistry::new();
    registry.register(
        "shot-split",
        |unresolved: &[String], context: &mut Context| {
            for token in unresolved {
                let Some((base, modifier)) = template::token_modifier(token) else {
                    continue;
                };
                let Some(composite) = context.get(&base).map(String::from) else {
                    continue;
                };
                let Some(c_pos) = composite.rfind('c') else {
                    continue;
                };
                let derived = match modifier.as_str() {
                    "scene" => composite[..c_pos].to_string(),
                    "cut" => composite[c_pos..].to_string(),
                    _ => continue,
                };
                context.insert(token.clone(), derived);
            }
        },
    );

    let context = Context::new().with("episode", "ep01").with("shot", "s05c20");
    let resolver = CascadeResolver::new(dir)
        .with_context(context)
        .with_transforms(registry)
        .with_transform("shot-split");

    let key = resolver
        .key_file("<episode>_<shot{scene}>_<shot{cut}>")
        .unwrap()
        .unwrap();
    assert_eq!(key.file_name(), Some("ep01_s05_c20.yml"));
}
