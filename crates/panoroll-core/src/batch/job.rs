//! Jobs and the input list they are built from.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::decode::is_supported_path;

/// One unit of batch work: a source image, the shared angle and the shared
/// output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub source: PathBuf,
    pub angle_degrees: f64,
    pub destination_dir: PathBuf,
}

impl Job {
    pub fn new(
        source: impl Into<PathBuf>,
        angle_degrees: f64,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            angle_degrees,
            destination_dir: destination_dir.into(),
        }
    }
}

/// Why a path was not added to a [`BatchInputs`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Already in the list.
    Duplicate,
    /// Missing, or not a regular file.
    NotAFile,
    /// Extension outside the supported set.
    UnsupportedExtension,
}

/// Ordered, de-duplicated list of input files.
///
/// Paths keep the order of their first insertion. Only the extension and
/// the existence of the file are checked here; unreadable or corrupt files
/// are accepted and fail later as individual jobs.
#[derive(Debug, Clone, Default)]
pub struct BatchInputs {
    paths: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl BatchInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single file.
    ///
    /// Duplicates are detected on the canonical path, so `dir/a.png`,
    /// `dir/sub/../a.png` and an absolute spelling count as one file. The
    /// first spelling given is the one kept.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Result<(), Rejection> {
        let path = path.into();
        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if self.seen.contains(&key) {
            return Err(Rejection::Duplicate);
        }
        if !path.is_file() {
            return Err(Rejection::NotAFile);
        }
        if !is_supported_path(&path) {
            return Err(Rejection::UnsupportedExtension);
        }

        self.seen.insert(key);
        self.paths.push(path);
        Ok(())
    }

    /// Add several files, returning how many were accepted.
    pub fn extend<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .map(|path| self.add(path))
            .filter(Result::is_ok)
            .count()
    }

    /// Add every supported file under `dir`, in file name order.
    ///
    /// Without `recursive` only the directory's immediate children are
    /// considered. Returns how many files were accepted.
    pub fn add_directory(&mut self, dir: &Path, recursive: bool) -> usize {
        let max_depth = if recursive { usize::MAX } else { 1 };
        let files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_supported_path(path))
            .collect();
        self.extend(files)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.seen.clear();
    }

    /// One job per input, all sharing the angle and destination.
    pub fn jobs(&self, angle_degrees: f64, destination_dir: &Path) -> Vec<Job> {
        self.paths
            .iter()
            .map(|source| Job::new(source.clone(), angle_degrees, destination_dir))
            .collect()
    }
}
