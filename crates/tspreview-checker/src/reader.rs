//! Source-reading capability.
//!
//! The program never touches the file system directly: every read goes
//! through a [`Reader`], so the same analysis runs over the disk, over an
//! in-memory overlay of unsaved editor buffers, or over a stack of both.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

/// What a reader knows about a path.
#[derive(Clone, Debug)]
pub enum Entry {
    File(FileEntry),
    Directory,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }
}

#[derive(Clone, Debug)]
pub struct FileEntry {
    source: FileSource,
}

#[derive(Clone, Debug)]
enum FileSource {
    Disk(PathBuf),
    Memory(Arc<str>),
}

impl FileEntry {
    pub fn on_disk(path: impl Into<PathBuf>) -> Self {
        FileEntry {
            source: FileSource::Disk(path.into()),
        }
    }

    pub fn in_memory(text: Arc<str>) -> Self {
        FileEntry {
            source: FileSource::Memory(text),
        }
    }

    pub fn read(&self) -> io::Result<String> {
        match &self.source {
            FileSource::Disk(path) => std::fs::read_to_string(path),
            FileSource::Memory(text) => Ok(text.to_string()),
        }
    }
}

pub trait Reader: Send + Sync {
    fn read(&self, path: &Path) -> Option<Entry>;

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.read(path), Some(Entry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.read(path), Some(Entry::Directory))
    }

    /// Read a file's text; `None` for directories and unknown paths.
    fn read_to_string(&self, path: &Path) -> Option<io::Result<String>> {
        match self.read(path)? {
            Entry::File(file) => Some(file.read()),
            Entry::Directory => None,
        }
    }
}

/// Reads from the real file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsReader;

impl Reader for FsReader {
    fn read(&self, path: &Path) -> Option<Entry> {
        let metadata = std::fs::metadata(path).ok()?;
        if metadata.is_dir() {
            Some(Entry::Directory)
        } else if metadata.is_file() {
            Some(Entry::File(FileEntry::on_disk(path)))
        } else {
            None
        }
    }
}

/// In-memory file overlay. Directories exist implicitly as ancestors of
/// stored files.
#[derive(Debug, Default)]
pub struct MemoryReader {
    files: DashMap<PathBuf, Arc<str>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<P, S>(files: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let reader = MemoryReader::new();
        for (path, text) in files {
            reader.update(path, text.as_ref());
        }
        reader
    }

    /// Insert or replace a file.
    pub fn update(&self, path: impl AsRef<Path>, text: &str) {
        self.files
            .insert(normalize_path(path.as_ref()), Arc::from(text));
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.files.remove(&normalize_path(path.as_ref())).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }
}

impl Reader for MemoryReader {
    fn read(&self, path: &Path) -> Option<Entry> {
        let path = normalize_path(path);
        if let Some(text) = self.files.get(&path) {
            return Some(Entry::File(FileEntry::in_memory(text.value().clone())));
        }
        self.files
            .iter()
            .any(|entry| entry.key().starts_with(&path))
            .then_some(Entry::Directory)
    }
}

/// Consults readers in order; the first reader that knows a path wins.
#[derive(Clone, Default)]
pub struct StackedReader {
    layers: Vec<Arc<dyn Reader>>,
}

impl StackedReader {
    pub fn new(layers: Vec<Arc<dyn Reader>>) -> Self {
        StackedReader { layers }
    }

    pub fn push(&mut self, layer: Arc<dyn Reader>) {
        self.layers.push(layer);
    }
}

impl Reader for StackedReader {
    fn read(&self, path: &Path) -> Option<Entry> {
        self.layers.iter().find_map(|layer| layer.read(path))
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding segment. Symlinks are not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `path` relative to `root` with `/` separators, or the normalized path
/// itself when it lies outside `root`.
pub fn relative_display_path(root: &Path, path: &Path) -> String {
    let normalized = normalize_path(path);
    let root = normalize_path(root);
    let relative = normalized.strip_prefix(&root).unwrap_or(&normalized);
    let mut out = String::new();
    for component in relative.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../tests/reader_tests.rs"]
mod reader_tests;
