//! Recursive asset mirroring

use super::source::{AssetNode, AssetSource};
use anpr_types::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Join a relative asset path and a child name with `/`
pub fn join_asset_path(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Outcome of one staging pass
#[derive(Debug, Default)]
pub struct StageReport {
    pub files_copied: usize,
    pub dirs_created: usize,
    pub bytes_copied: u64,
    /// Per-node failures; each one skipped a subtree or file, never the whole walk
    pub failures: Vec<Error>,
}

impl StageReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: StageReport) {
        self.files_copied += other.files_copied;
        self.dirs_created += other.dirs_created;
        self.bytes_copied += other.bytes_copied;
        self.failures.extend(other.failures);
    }

    fn record_failure(&mut self, path: &str, source: io::Error) {
        tracing::warn!(asset = path, error = %source, "failed to stage asset");
        self.failures.push(Error::AssetCopy {
            path: path.to_string(),
            source,
        });
    }

    pub fn display(&self) -> String {
        let mut out = format!(
            "Asset Staging\n\
             =============\n\
             Files copied:  {}\n\
             Dirs created:  {}\n\
             Bytes copied:  {}\n\
             Failures:      {}",
            self.files_copied,
            self.dirs_created,
            self.bytes_copied,
            self.failures.len()
        );
        for failure in &self.failures {
            out.push_str(&format!("\n  - {}", failure));
        }
        out
    }
}

/// Mirrors a read-only [`AssetSource`] into a writable directory
pub struct AssetStager<'a, S: AssetSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: AssetSource + ?Sized> AssetStager<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Mirror `source_root` (relative to the source) onto `destination_root`.
    ///
    /// Best effort: failures are collected in the report and the walk carries
    /// on with the remaining nodes.
    pub fn materialize(&self, source_root: &str, destination_root: &Path) -> StageReport {
        let mut report = StageReport::default();
        self.stage_node(source_root, destination_root, &mut report);
        tracing::debug!(
            source = source_root,
            destination = %destination_root.display(),
            files = report.files_copied,
            failures = report.failures.len(),
            "materialized asset tree"
        );
        report
    }

    fn stage_node(&self, path: &str, destination: &Path, report: &mut StageReport) {
        let node = match AssetNode::resolve(self.source, path) {
            Ok(node) => node,
            Err(e) => {
                report.record_failure(path, e);
                return;
            }
        };

        match node {
            AssetNode::Directory { path, children } => {
                if !destination.is_dir() {
                    if let Err(e) = fs::create_dir_all(destination) {
                        report.record_failure(&path, e);
                        return;
                    }
                    report.dirs_created += 1;
                }

                for child in &children {
                    let child_path = join_asset_path(&path, child);
                    self.stage_node(&child_path, &destination.join(child), report);
                }
            }
            AssetNode::File { path } => match self.copy_file(&path, destination) {
                Ok(bytes) => {
                    report.files_copied += 1;
                    report.bytes_copied += bytes;
                }
                Err(e) => report.record_failure(&path, e),
            },
        }
    }

    /// Copy one file, truncating whatever is at `destination`
    fn copy_file(&self, path: &str, destination: &Path) -> io::Result<u64> {
        let mut reader = self.source.open(path)?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(destination)?);
        let bytes = io::copy(&mut reader, &mut writer)?;
        writer.into_inner().map_err(|e| e.into_error())?;
        Ok(bytes)
    }
}

/// Relative paths of every file under `root`, sorted
pub fn staged_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}
