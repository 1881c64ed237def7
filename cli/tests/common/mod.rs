//! Common test utilities for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A local working directory plus a directory-backed object store.
///
/// Objects live at `<remote>/<bucket>/<key>`, the layout `ocp` expects
/// under `--remote-root`.
pub struct TestFixture {
    pub local: TempDir,
    pub remote: TempDir,
}

impl TestFixture {
    /// Create a new fixture with fresh local and remote directories.
    pub fn new() -> Self {
        Self {
            local: TempDir::new().expect("Failed to create temp local dir"),
            remote: TempDir::new().expect("Failed to create temp remote dir"),
        }
    }

    /// Path below the local directory.
    pub fn local_path(&self, rel: &str) -> PathBuf {
        self.local.path().join(rel)
    }

    /// Path string below the local directory, as passed on the command line.
    pub fn local_arg(&self, rel: &str) -> String {
        self.local_path(rel).to_string_lossy().into_owned()
    }

    /// Path of an object inside the store.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.remote.path().join(bucket).join(key)
    }

    /// Write a local file, creating parent directories.
    pub fn write_local(&self, rel: &str, content: &str) {
        write_file(&self.local_path(rel), content);
    }

    /// Store an object.
    pub fn put_object(&self, bucket: &str, key: &str, content: &str) {
        write_file(&self.object_path(bucket, key), content);
    }

    /// Read an object back, `None` if it does not exist.
    pub fn read_object(&self, bucket: &str, key: &str) -> Option<String> {
        fs::read_to_string(self.object_path(bucket, key)).ok()
    }

    /// An `ocp` command wired to this fixture's object store.
    pub fn ocp(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("ocp");
        cmd.env_remove("RUST_LOG")
            .arg("--remote-root")
            .arg(self.remote.path());
        cmd
    }

    /// Check that a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read_to_string(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An `ocp` command with no object store configured.
pub fn ocp_local() -> Command {
    let mut cmd = cargo_bin_cmd!("ocp");
    cmd.env_remove("RUST_LOG").env_remove("OCP_REMOTE_ROOT");
    cmd
}

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Count all files below a directory.
pub fn count_files_recursive(dir: &Path) -> usize {
    let mut count = 0;
    if dir.is_dir() {
        for entry in fs::read_dir(dir).expect("Failed to read directory") {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                count += count_files_recursive(&path);
            } else {
                count += 1;
            }
        }
    }
    count
}
