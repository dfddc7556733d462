use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn notesync() -> Command {
    Command::cargo_bin("notesync").unwrap()
}

#[test]
fn sync_rewrites_the_file_and_creates_the_store() {
    let dir = tempdir().unwrap();
    let md_path = dir.path().join("outline.md");
    let store_path = dir.path().join("notes.json");
    fs::write(&md_path, "# T #tag_a\n\nbody line\n").unwrap();

    notesync()
        .args(["sync"])
        .arg(&md_path)
        .arg("--store")
        .arg(&store_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    let rewritten = fs::read_to_string(&md_path).unwrap();
    assert!(rewritten.contains("[note](note://store/notes/?id="));
    assert!(store_path.exists());

    // Second run is a fixed point.
    notesync()
        .args(["sync"])
        .arg(&md_path)
        .arg("--store")
        .arg(&store_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));
    assert_eq!(fs::read_to_string(&md_path).unwrap(), rewritten);
}

#[test]
fn unknown_id_fails_without_touching_the_file() {
    let dir = tempdir().unwrap();
    let md_path = dir.path().join("outline.md");
    let store_path = dir.path().join("notes.json");
    let original = "# T\n\n[note](note://store/notes/?id=424242)\n\nbody\n";
    fs::write(&md_path, original).unwrap();

    notesync()
        .args(["sync"])
        .arg(&md_path)
        .arg("--store")
        .arg(&store_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert_eq!(fs::read_to_string(&md_path).unwrap(), original);
}

#[test]
fn duplicate_anchor_fails_without_touching_the_file() {
    let dir = tempdir().unwrap();
    let md_path = dir.path().join("outline.md");
    let store_path = dir.path().join("notes.json");
    let original =
        "# T\n\n[note](note://store/notes/?id=1)\n[note](note://store/notes/?id=2)\n";
    fs::write(&md_path, original).unwrap();

    notesync()
        .args(["sync"])
        .arg(&md_path)
        .arg("--store")
        .arg(&store_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than one anchor"));

    assert_eq!(fs::read_to_string(&md_path).unwrap(), original);
    assert!(!store_path.exists(), "no store writes on a parse error");
}

#[test]
fn status_reports_without_writing() {
    let dir = tempdir().unwrap();
    let md_path = dir.path().join("outline.md");
    let store_path = dir.path().join("notes.json");
    let original = "# Fresh leaf\n\nbody\n";
    fs::write(&md_path, original).unwrap();

    notesync()
        .args(["status"])
        .arg(&md_path)
        .arg("--store")
        .arg(&store_path)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"action\": \"create\""));

    assert_eq!(fs::read_to_string(&md_path).unwrap(), original);
    assert!(!store_path.exists());
}
