//! Basic functionality integration tests for the ocp CLI.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, count_files_recursive, ocp_local};
use predicates::prelude::*;
use rstest::rstest;
use serde_json::Value;
use std::fs;

#[test]
fn test_basic_file_copy() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "hello world");

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("cp "))
        .stdout(predicate::str::contains("b.txt"));

    fx.assert_file_content(&fx.local_path("b.txt"), "hello world");
    assert!(fx.local_path("a.txt").exists());
}

#[test]
fn test_copy_file_into_existing_directory() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "content");
    fs::create_dir_all(fx.local_path("out")).unwrap();

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("out"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/a.txt"), "content");
}

#[test]
fn test_directory_copy_is_not_recursive_by_default() {
    let fx = TestFixture::new();
    fx.write_local("src/top.txt", "top");
    fx.write_local("src/sub/deep.txt", "deep");

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("src"))
        .arg(fx.local_arg("out"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/top.txt"), "top");
    assert_eq!(count_files_recursive(&fx.local_path("out")), 1);
}

#[test]
fn test_recursive_copy_flattens_without_parents() {
    let fx = TestFixture::new();
    fx.write_local("src/top.txt", "top");
    fx.write_local("src/sub/deep.txt", "deep");

    ocp_local()
        .arg("cp")
        .arg("-R")
        .arg(fx.local_arg("src"))
        .arg(fx.local_arg("out"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/top.txt"), "top");
    fx.assert_file_content(&fx.local_path("out/deep.txt"), "deep");
    assert!(!fx.local_path("out/sub").exists());
}

#[test]
fn test_recursive_copy_with_parents_keeps_structure() {
    let fx = TestFixture::new();
    fx.write_local("src/top.txt", "top");
    fx.write_local("src/sub/nested/deep.txt", "deep");

    ocp_local()
        .arg("cp")
        .arg("-R")
        .arg("--parents")
        .arg(fx.local_arg("src"))
        .arg(fx.local_arg("out"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/top.txt"), "top");
    fx.assert_file_content(&fx.local_path("out/sub/nested/deep.txt"), "deep");
}

#[test]
fn test_local_glob_copy() {
    let fx = TestFixture::new();
    fx.write_local("src/a.txt", "a");
    fx.write_local("src/b.txt", "b");
    fx.write_local("src/c.log", "c");

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("src/*.txt"))
        .arg(fx.local_arg("out/"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("out/a.txt"), "a");
    fx.assert_file_content(&fx.local_path("out/b.txt"), "b");
    assert!(!fx.local_path("out/c.log").exists());
}

#[test]
fn test_move_local_file() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "moving");

    ocp_local()
        .arg("mv")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("mv "));

    assert!(!fx.local_path("a.txt").exists());
    fx.assert_file_content(&fx.local_path("b.txt"), "moving");
}

#[test]
fn test_jsonl_output() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "12345");

    let output = ocp_local()
        .arg("--output")
        .arg("jsonl")
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["operation"], "cp");
    assert_eq!(record["size"], 5);
    assert!(record["destination"].as_str().unwrap().ends_with("b.txt"));
    assert!(record["storage_class"].is_null());
}

#[test]
fn test_quiet_keeps_records() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "a");

    ocp_local()
        .arg("-q")
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("b.txt"))
        .stderr(predicate::str::is_empty());
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(16)]
fn test_parallel_jobs(#[case] jobs: usize) {
    let fx = TestFixture::new();
    for i in 0..20 {
        fx.write_local(&format!("src/file{i}.txt"), &format!("content {i}"));
    }

    let output = ocp_local()
        .arg("-j")
        .arg(jobs.to_string())
        .arg("cp")
        .arg(fx.local_arg("src"))
        .arg(fx.local_arg("out"))
        .output()
        .unwrap();
    assert!(output.status.success());

    assert_eq!(count_files_recursive(&fx.local_path("out")), 20);
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 20);
    fx.assert_file_content(&fx.local_path("out/file7.txt"), "content 7");
}
