//! Shared test utilities for identity and box integration tests
#![allow(dead_code)]

use std::path::PathBuf;

use common::identity::Identity;
use tempfile::TempDir;

/// A scratch directory and a key file path inside it that does not exist yet
pub fn scratch_keyfile() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("secret");
    (temp_dir, path)
}

/// `n` fresh random identities
pub fn identities(n: usize) -> Vec<Identity> {
    (0..n).map(|_| Identity::random()).collect()
}

/// Number of entries directly inside `dir`
pub fn entry_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}
