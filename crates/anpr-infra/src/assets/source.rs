//! Read-only asset sources

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A read-only hierarchical store of bundled assets.
///
/// Paths are `/`-separated and relative to the store root; `""` is the root.
pub trait AssetSource {
    /// Names of the direct children of `path`. Files list as empty.
    fn list(&self, path: &str) -> io::Result<Vec<String>>;

    /// Open the file at `path` for reading
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;

    /// Whether `path` is a directory, when the store can tell.
    ///
    /// Flat bundles that only expose listings return `None`; an empty listing
    /// is then taken to mean a file.
    fn is_dir(&self, _path: &str) -> Option<bool> {
        None
    }

    /// Whether anything is stored at `path`
    fn exists(&self, path: &str) -> bool {
        if self.is_dir(path) == Some(true) {
            return true;
        }
        match self.list(path) {
            Ok(children) if !children.is_empty() => true,
            _ => self.open(path).is_ok(),
        }
    }
}

/// A source node, classified once so callers branch on kind explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetNode {
    Directory { path: String, children: Vec<String> },
    File { path: String },
}

impl AssetNode {
    /// Classify `path` in `source`
    pub fn resolve<S: AssetSource + ?Sized>(source: &S, path: &str) -> io::Result<Self> {
        let children = source.list(path)?;
        if !children.is_empty() {
            return Ok(AssetNode::Directory {
                path: path.to_string(),
                children,
            });
        }

        // Empty listing: a file, or a directory with nothing in it
        if source.is_dir(path) == Some(true) {
            Ok(AssetNode::Directory {
                path: path.to_string(),
                children,
            })
        } else {
            Ok(AssetNode::File {
                path: path.to_string(),
            })
        }
    }

    pub fn path(&self) -> &str {
        match self {
            AssetNode::Directory { path, .. } | AssetNode::File { path } => path,
        }
    }
}

/// Asset source backed by a directory on disk
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl AssetSource for FsAssetSource {
    fn list(&self, path: &str) -> io::Result<Vec<String>> {
        let full = self.resolve_path(path);
        let metadata = fs::metadata(&full)?;
        if !metadata.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&full)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.resolve_path(path))?;
        Ok(Box::new(file))
    }

    fn is_dir(&self, path: &str) -> Option<bool> {
        fs::metadata(self.resolve_path(path)).ok().map(|m| m.is_dir())
    }
}
