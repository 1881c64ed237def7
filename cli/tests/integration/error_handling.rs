//! Usage errors, batch failures and exit codes.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, ocp_local};
use predicates::prelude::*;
use rstest::rstest;
use std::fs;

#[rstest]
#[case::no_operands(&["cp"])]
#[case::one_operand(&["cp", "a"])]
#[case::three_operands(&["mv", "a", "b", "c"])]
#[case::unknown_storage_class(&["cp", "--storage-class", "PLATINUM", "a", "b"])]
fn test_bad_arguments_exit_with_two(#[case] args: &[&str]) {
    ocp_local().args(args).assert().failure().code(2);
}

#[test]
fn test_glob_in_destination() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "a");

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("out/*"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("can not contain glob characters"));

    assert!(!fx.local_path("out").exists());
}

#[rstest]
#[case::remote_source("s3://bucket/a.txt", "local.txt")]
#[case::remote_destination("local.txt", "s3://bucket/a.txt")]
fn test_remote_without_root(#[case] src: &str, #[case] dst: &str) {
    ocp_local()
        .arg("cp")
        .arg(src)
        .arg(dst)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("No remote storage configured"));
}

#[test]
fn test_missing_local_source() {
    let fx = TestFixture::new();

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("missing.txt"))
        .arg(fx.local_arg("out.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_missing_remote_object() {
    let fx = TestFixture::new();

    fx.ocp()
        .arg("cp")
        .arg("s3://bucket/missing.txt")
        .arg(fx.local_arg("out.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("1 error occurred"))
        .stderr(predicate::str::contains("s3://bucket/missing.txt"));

    assert!(!fx.local_path("out.txt").exists());
}

#[test]
fn test_glob_without_matches_succeeds_with_warning() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "a.txt", "a");

    fx.ocp()
        .arg("cp")
        .arg("s3://bucket/*.none")
        .arg(fx.local_arg("out/"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no objects matched"));
}

#[test]
fn test_empty_directory_succeeds() {
    let fx = TestFixture::new();
    fs::create_dir_all(fx.local_path("empty")).unwrap();

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("empty"))
        .arg(fx.local_arg("out"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[rstest]
#[case::literal_path("a.txt")]
#[case::containing_directory("")]
fn test_move_onto_itself_keeps_file(#[case] dst: &str) {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "only copy");

    ocp_local()
        .arg("mv")
        .arg(fx.local_arg("a.txt"))
        .arg(format!("{}/{dst}", fx.local.path().display()))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("same object"));

    fx.assert_file_content(&fx.local_path("a.txt"), "only copy");
}

#[test]
fn test_partial_failure_reports_every_error() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "in/a.txt", "a");
    fx.put_object("bucket", "in/b.txt", "b");
    fx.put_object("bucket", "in/c.txt", "c");
    // A non-empty directory where a.txt has to land.
    fx.write_local("out/a.txt/blocker", "x");

    let output = fx
        .ocp()
        .arg("mv")
        .arg("s3://bucket/in/*")
        .arg(fx.local_arg("out"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stderr.contains("1 error occurred"));
    assert!(stderr.contains("mv s3://bucket/in/a.txt"));

    fx.assert_file_content(&fx.local_path("out/b.txt"), "b");
    fx.assert_file_content(&fx.local_path("out/c.txt"), "c");
    // Only the successful transfers removed their source.
    assert_eq!(fx.read_object("bucket", "in/a.txt").as_deref(), Some("a"));
    assert!(fx.read_object("bucket", "in/b.txt").is_none());
    assert!(fx.read_object("bucket", "in/c.txt").is_none());
}

#[test]
fn test_glob_into_existing_file() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "in/a.txt", "a");
    fx.write_local("out", "i am a file");

    fx.ocp()
        .arg("cp")
        .arg("s3://bucket/in/*")
        .arg(fx.local_arg("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("expected to be a directory"));

    assert_eq!(fs::read_to_string(fx.local_path("out")).unwrap(), "i am a file");
}
