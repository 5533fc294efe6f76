//! Integration tests for the model store commands.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sprig(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sprig").unwrap();
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("SPRIG_STORAGE", "local")
        .env("SPRIG_STORAGE_ROOT", temp.path().join("store"))
        .env_remove("SPRIG_BUCKET");
    cmd
}

fn upload(temp: &TempDir, version: &str) {
    sprig(temp)
        .args(["upload", "model.bin", "--model-name", "demo", "--version", version, "--meta", "val_accuracy=0.9"])
        .args(["--file", "notes.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Upload complete"));
}

fn setup() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("model.bin"), vec![7u8; 4096]).unwrap();
    std::fs::write(temp.path().join("notes.txt"), "trained on spring photos").unwrap();
    temp
}

#[test]
fn test_upload_list_latest() {
    let temp = setup();
    upload(&temp, "20240101_000000");
    upload(&temp, "20240601_000000");

    let listed = sprig(&temp).args(["list", "demo", "--json"]).assert().success();
    let versions: Vec<String> = serde_json::from_slice(&listed.get_output().stdout).unwrap();
    assert_eq!(versions, vec!["v20240601_000000", "v20240101_000000"]);

    sprig(&temp)
        .args(["latest", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v20240601_000000"));
}

#[test]
fn test_show_prints_manifest() {
    let temp = setup();
    upload(&temp, "3");

    let shown = sprig(&temp).args(["show", "demo", "v3", "--json"]).assert().success();
    let manifest: serde_json::Value = serde_json::from_slice(&shown.get_output().stdout).unwrap();
    assert_eq!(manifest["model_file"], "demo/v3/model.bin");
    assert_eq!(manifest["metadata"]["val_accuracy"], 0.9);
    assert_eq!(manifest["additional_files"][0], "demo/v3/notes.txt");
    assert_eq!(manifest["checksum"].as_str().unwrap().len(), 64);
}

#[test]
fn test_download_round_trip() {
    let temp = setup();
    upload(&temp, "1");

    sprig(&temp)
        .args(["download", "demo", "1", "--dest", "out", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verified"));

    assert_eq!(std::fs::read(temp.path().join("out/model.bin")).unwrap(), vec![7u8; 4096]);
    assert!(temp.path().join("out/notes.txt").is_file());
}

#[test]
fn test_download_unknown_version_fails() {
    let temp = setup();
    upload(&temp, "1");

    sprig(&temp)
        .args(["download", "demo", "9", "--dest", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest not found"));
}

#[test]
fn test_delete_version() {
    let temp = setup();
    upload(&temp, "1");
    upload(&temp, "10");

    sprig(&temp).args(["delete", "demo", "1"]).assert().success().stdout(predicate::str::contains("Deleted"));

    let listed = sprig(&temp).args(["list", "demo", "--json"]).assert().success();
    let versions: Vec<String> = serde_json::from_slice(&listed.get_output().stdout).unwrap();
    assert_eq!(versions, vec!["v10"]);
}

#[test]
fn test_upload_missing_checkpoint_fails() {
    let temp = setup();
    sprig(&temp)
        .args(["upload", "nope.bin", "--model-name", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn test_latest_without_versions_fails() {
    let temp = setup();
    sprig(&temp)
        .args(["latest", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No versions found"));
}

#[test]
fn test_config_file_selects_bucket() {
    let temp = setup();
    std::fs::write(temp.path().join("sprig.toml"), "[storage]\nbucket = \"archive\"\n").unwrap();

    sprig(&temp)
        .args(["--config", "sprig.toml", "upload", "model.bin", "--model-name", "demo", "--version", "1"])
        .assert()
        .success();
    assert!(temp.path().join("store/archive/demo/v1/manifest.json").is_file());
}
