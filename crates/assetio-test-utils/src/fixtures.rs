// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk plugin directory fixtures.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary root holding one directory per requested name.
pub struct PluginDirs {
    root: TempDir,
    dirs: Vec<PathBuf>,
}

impl PluginDirs {
    pub fn new(names: &[&str]) -> Self {
        let root = match tempfile::tempdir() {
            Ok(root) => root,
            Err(e) => panic!("cannot create temporary directory: {e}"),
        };
        let dirs = names
            .iter()
            .map(|name| {
                let dir = root.path().join(name);
                if let Err(e) = std::fs::create_dir_all(&dir) {
                    panic!("cannot create {}: {e}", dir.display());
                }
                dir
            })
            .collect();
        Self { root, dirs }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// The directory created for the `index`th name.
    pub fn dir(&self, index: usize) -> &Path {
        &self.dirs[index]
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.dirs.clone()
    }

    /// The directories in the given order, as a search path list.
    pub fn ordered(&self, order: &[usize]) -> Vec<PathBuf> {
        order.iter().map(|&i| self.dirs[i].clone()).collect()
    }

    /// The directories joined with the platform path separator, in the
    /// form an environment variable search path takes.
    pub fn joined(&self, order: &[usize]) -> std::ffi::OsString {
        match std::env::join_paths(self.ordered(order)) {
            Ok(joined) => joined,
            Err(e) => panic!("cannot join search paths: {e}"),
        }
    }
}
