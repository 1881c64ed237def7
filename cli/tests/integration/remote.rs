//! Transfers involving the object store.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, count_files_recursive};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

#[test]
fn test_upload_file_into_prefix() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "hello");

    fx.ocp()
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg("s3://bucket/dir/")
        .assert()
        .success()
        .stdout(predicate::str::contains("s3://bucket/dir/a.txt"));

    assert_eq!(fx.read_object("bucket", "dir/a.txt").as_deref(), Some("hello"));
}

#[test]
fn test_upload_file_to_plain_key_appends_name() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "hello");

    fx.ocp()
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg("s3://bucket/dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("s3://bucket/dir/a.txt"));

    assert_eq!(fx.read_object("bucket", "dir/a.txt").as_deref(), Some("hello"));
    assert!(!fx.object_path("bucket", "dir").is_file());
}

#[test]
fn test_upload_directory_is_recursive() {
    let fx = TestFixture::new();
    fx.write_local("src/top.txt", "top");
    fx.write_local("src/sub/deep.txt", "deep");

    fx.ocp()
        .arg("cp")
        .arg(fx.local_arg("src"))
        .arg("s3://bucket/flat/")
        .assert()
        .success();

    assert_eq!(fx.read_object("bucket", "flat/top.txt").as_deref(), Some("top"));
    assert_eq!(fx.read_object("bucket", "flat/deep.txt").as_deref(), Some("deep"));
}

#[test]
fn test_upload_directory_with_parents() {
    let fx = TestFixture::new();
    fx.write_local("src/top.txt", "top");
    fx.write_local("src/sub/deep.txt", "deep");

    fx.ocp()
        .arg("cp")
        .arg("--parents")
        .arg(fx.local_arg("src"))
        .arg("s3://bucket/tree/")
        .assert()
        .success();

    assert_eq!(fx.read_object("bucket", "tree/top.txt").as_deref(), Some("top"));
    assert_eq!(
        fx.read_object("bucket", "tree/sub/deep.txt").as_deref(),
        Some("deep")
    );
}

#[test]
fn test_upload_with_storage_class_jsonl() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "abc");

    let output = fx
        .ocp()
        .arg("--output")
        .arg("jsonl")
        .arg("cp")
        .arg("--storage-class")
        .arg("glacier")
        .arg(fx.local_arg("a.txt"))
        .arg("s3://bucket/")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let record: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(record["destination"], "s3://bucket/a.txt");
    assert_eq!(record["storage_class"], "GLACIER");
    assert_eq!(record["size"], 3);
}

#[test]
fn test_download_glob_is_not_recursive_by_default() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "logs/a.gz", "a");
    fx.put_object("bucket", "logs/b.gz", "b");
    fx.put_object("bucket", "logs/sub/c.gz", "c");
    fx.put_object("bucket", "logs/readme.md", "r");

    fx.ocp()
        .arg("cp")
        .arg("s3://bucket/logs/*.gz")
        .arg(fx.local_arg("out/"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/a.gz"), "a");
    fx.assert_file_content(&fx.local_path("out/b.gz"), "b");
    assert_eq!(count_files_recursive(&fx.local_path("out")), 2);
}

#[test]
fn test_recursive_download_with_parents() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "logs/a.gz", "a");
    fx.put_object("bucket", "logs/sub/c.gz", "c");

    fx.ocp()
        .arg("cp")
        .arg("-R")
        .arg("--parents")
        .arg("s3://bucket/logs/*")
        .arg(fx.local_arg("out"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/a.gz"), "a");
    fx.assert_file_content(&fx.local_path("out/sub/c.gz"), "c");
}

#[test]
fn test_download_single_object() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "dir/report.csv", "x,y");
    fs::create_dir_all(fx.local_path("out")).unwrap();

    fx.ocp()
        .arg("cp")
        .arg("s3://bucket/dir/report.csv")
        .arg(fx.local_arg("out"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/report.csv"), "x,y");
}

#[test]
fn test_remote_rename() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "a.txt", "data");

    fx.ocp()
        .arg("cp")
        .arg("s3://bucket/a.txt")
        .arg("s3://bucket/b.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains("cp s3://bucket/a.txt s3://bucket/b.txt"));

    assert_eq!(fx.read_object("bucket", "a.txt").as_deref(), Some("data"));
    assert_eq!(fx.read_object("bucket", "b.txt").as_deref(), Some("data"));
}

#[test]
fn test_remote_move_glob_into_prefix() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "in/a.txt", "a");
    fx.put_object("bucket", "in/b.txt", "b");

    fx.ocp()
        .arg("mv")
        .arg("s3://bucket/in/*")
        .arg("s3://other/out/")
        .assert()
        .success();

    assert_eq!(fx.read_object("other", "out/a.txt").as_deref(), Some("a"));
    assert_eq!(fx.read_object("other", "out/b.txt").as_deref(), Some("b"));
    assert!(fx.read_object("bucket", "in/a.txt").is_none());
    assert!(fx.read_object("bucket", "in/b.txt").is_none());
}

#[test]
fn test_remote_move_onto_itself_keeps_object() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "dir/a.txt", "only copy");

    fx.ocp()
        .arg("mv")
        .arg("s3://bucket/dir/a.txt")
        .arg("s3://bucket/dir/")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("same object"));

    assert_eq!(fx.read_object("bucket", "dir/a.txt").as_deref(), Some("only copy"));
}

#[test]
fn test_move_download_deletes_source() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "a.txt", "a");

    fx.ocp()
        .arg("mv")
        .arg("s3://bucket/a.txt")
        .arg(fx.local_arg("a.txt"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("a.txt"), "a");
    assert!(fx.read_object("bucket", "a.txt").is_none());
}

#[test]
fn test_remote_root_from_env() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "a.txt", "from env");

    cargo_bin_cmd!("ocp")
        .env("OCP_REMOTE_ROOT", fx.remote.path())
        .arg("cp")
        .arg("s3://bucket/a.txt")
        .arg(fx.local_arg("a.txt"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("a.txt"), "from env");
}
