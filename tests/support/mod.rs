#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Scratch working directory for driving the `tracker` binary.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default data file location from the built-in config.
    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("data").join("tasks.csv")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn read_data(&self) -> String {
        fs::read_to_string(self.data_file()).expect("read data file")
    }

    /// `tracker` running inside this directory, isolated from the caller's env.
    pub fn tracker(&self) -> Command {
        let mut cmd = Command::cargo_bin("tracker").expect("binary");
        cmd.current_dir(self.dir.path())
            .env_remove("TRACKER_FILE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run with `--json` and parse stdout.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .tracker()
            .arg("--json")
            .args(args)
            .output()
            .expect("run tracker");
        assert!(
            output.status.success(),
            "tracker {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json output")
    }
}
