//! Overwrite policy tests: -n, -s and -u.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, ocp_local};
use predicates::prelude::*;
use rstest::rstest;

#[test]
fn test_overwrites_by_default() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "new");
    fx.write_local("b.txt", "old content");

    ocp_local()
        .arg("cp")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("b.txt"), "new");
}

#[test]
fn test_no_clobber_skips_existing() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "new");
    fx.write_local("b.txt", "old");

    ocp_local()
        .arg("cp")
        .arg("-n")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    fx.assert_file_content(&fx.local_path("b.txt"), "old");
}

#[test]
fn test_no_clobber_copies_missing() {
    let fx = TestFixture::new();
    fx.write_local("src/a.txt", "a");
    fx.write_local("src/b.txt", "b");
    fx.write_local("out/a.txt", "kept");

    let output = ocp_local()
        .arg("cp")
        .arg("--no-clobber")
        .arg(fx.local_arg("src/*.txt"))
        .arg(fx.local_arg("out"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("b.txt"));
    fx.assert_file_content(&fx.local_path("out/a.txt"), "kept");
    fx.assert_file_content(&fx.local_path("out/b.txt"), "b");
}

#[test]
fn test_move_skipped_keeps_source() {
    let fx = TestFixture::new();
    fx.put_object("bucket", "a.txt", "remote");
    fx.write_local("a.txt", "local");

    fx.ocp()
        .arg("mv")
        .arg("-n")
        .arg("s3://bucket/a.txt")
        .arg(fx.local_arg("a.txt"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("a.txt"), "local");
    assert_eq!(fx.read_object("bucket", "a.txt").as_deref(), Some("remote"));
}

#[rstest]
#[case::same_size_skips("abc", "xyz", "xyz")]
#[case::different_size_overwrites("abcd", "xyz", "abcd")]
fn test_if_size_differ(#[case] src: &str, #[case] dst: &str, #[case] expected: &str) {
    let fx = TestFixture::new();
    fx.write_local("a.txt", src);
    fx.write_local("b.txt", dst);

    ocp_local()
        .arg("cp")
        .arg("-s")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("b.txt"), expected);
}

#[test]
fn test_if_source_newer_skips_older_source() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "older");
    // Written second, so never older than the source.
    fx.write_local("b.txt", "newer");

    ocp_local()
        .arg("cp")
        .arg("-u")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    fx.assert_file_content(&fx.local_path("b.txt"), "newer");
}

#[test]
fn test_if_source_newer_copies_missing_destination() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "data");

    ocp_local()
        .arg("cp")
        .arg("--if-source-newer")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success();

    fx.assert_file_content(&fx.local_path("b.txt"), "data");
}

#[test]
fn test_any_failing_check_skips() {
    let fx = TestFixture::new();
    fx.write_local("a.txt", "longer source");
    fx.write_local("b.txt", "short");

    // The sizes differ, but the source is not newer.
    ocp_local()
        .arg("cp")
        .arg("-s")
        .arg("-u")
        .arg(fx.local_arg("a.txt"))
        .arg(fx.local_arg("b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    fx.assert_file_content(&fx.local_path("b.txt"), "short");
}
