//! End-to-end flows: stage a bundle, then drive the gateway over it

use anpr_app::{open_command_gateway, AssetBootstrap, Config, EngineState};
use anpr_domain::RecognitionRequest;
use anpr_infra::assets::{AssetStager, FsAssetSource};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use walkdir::WalkDir;

/// Relative path -> file bytes for every file under `root`
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_staged_tree_matches_source_and_restaging_is_stable() {
    let src = tempdir().unwrap();
    fs::create_dir_all(src.path().join("a/c")).unwrap();
    fs::write(src.path().join("a/b.txt"), b"plate model").unwrap();
    fs::write(src.path().join("a/c/d.txt"), [0u8, 159, 146, 150]).unwrap();
    let dst = tempdir().unwrap();
    let source = FsAssetSource::new(src.path());
    let stager = AssetStager::new(&source);

    let first = stager.materialize("", dst.path());
    assert!(first.is_clean(), "{}", first.display());
    assert_eq!(snapshot(dst.path()), snapshot(src.path()));

    let second = stager.materialize("", dst.path());
    assert!(second.is_clean());
    assert_eq!(second.dirs_created, 0);
    assert_eq!(snapshot(dst.path()), snapshot(src.path()));
}

#[cfg(unix)]
#[test]
fn test_recognition_queued_before_init_runs_against_staged_assets() {
    let bundle = tempdir().unwrap();
    let vendor = bundle.path().join("openalpr");
    fs::create_dir_all(vendor.join("runtime_data/region")).unwrap();
    fs::write(vendor.join("openalpr.conf"), "[common]\n").unwrap();
    fs::write(vendor.join("runtime_data/region/us.xml"), "<cascade/>").unwrap();
    fs::write(vendor.join("no-plate-large.jpg"), [0xFF, 0xD8]).unwrap();

    let tools = tempdir().unwrap();
    let script = tools.path().join("recognizer.sh");
    fs::write(
        &script,
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then exit 0; fi
echo '{"epoch_time":5,"frame_number":0,"img_width":2,"img_height":2,"total_processing_time_ms":0.5,"plates":[],"regionsOfInterest":[]}'
"#,
    )
    .unwrap();

    let data = tempdir().unwrap();
    let config = Config {
        engine_command: format!("sh {}", script.display()),
        data_dir: Some(data.path().to_path_buf()),
        ..Config::default()
    };

    let bootstrap = AssetBootstrap::new(config.data_dir().unwrap());
    let staged = bootstrap.stage(&FsAssetSource::new(bundle.path()));
    assert!(staged.report.is_clean(), "{}", staged.report.display());

    let gateway = open_command_gateway(&config, &staged.paths);
    let handle = gateway.recognize(RecognitionRequest::from_path(&staged.paths.fallback_image));
    assert_eq!(gateway.state(), EngineState::Uninitialized);

    gateway.initialize(config.init_params()).unwrap();

    let result = handle.wait().unwrap();
    assert_eq!(result.epoch_time, 5.0);
    assert!(result.plates.is_empty());
}
