use anyhow::Result;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::catalog::count_archive_classes;

const ARCHIVE_EXTENSIONS: [&str; 4] = ["jar", "war", "zip", "ear"];

/// Collects the directories and archives holding class files to analyze.
#[derive(Debug, Clone)]
pub struct FileManager {
    roots: Vec<PathBuf>,
    accept_inner_classes: bool,
}

impl Default for FileManager {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            accept_inner_classes: true,
        }
    }
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept_inner_classes(&mut self, accept: bool) {
        self.accept_inner_classes = accept;
    }

    pub fn accepts_inner_classes(&self) -> bool {
        self.accept_inner_classes
    }

    /// Adds a directory or archive root.
    pub fn add_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_dir() && !(path.is_file() && is_archive(path)) {
            anyhow::bail!("Invalid directory or archive: {}", path.display());
        }
        self.roots.push(path.to_path_buf());
        Ok(())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Accepted class files and archives below every root, sorted.
    pub fn extract_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = BTreeSet::new();
        for root in &self.roots {
            if root.is_file() {
                files.insert(root.clone());
                continue;
            }
            files.extend(walk(root, |path| self.accept_file(path)));
        }
        Ok(files.into_iter().collect())
    }

    pub fn accept_class_file_name(&self, name: &str) -> bool {
        if !name.to_ascii_lowercase().ends_with(".class") {
            return false;
        }
        self.accept_inner_classes || !is_inner_class_name(name)
    }

    pub fn accept_class_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.accept_class_file_name(n))
    }

    fn accept_file(&self, path: &Path) -> bool {
        self.accept_class_file(path) || is_archive(path)
    }

    /// Number of accepted class files, archive entries included.
    pub fn count_classes(&self) -> Result<usize> {
        let mut count = 0;
        for file in self.extract_files()? {
            if is_archive(&file) {
                count += count_archive_classes(&file, self)?;
            } else {
                count += 1;
            }
        }
        Ok(count)
    }
}

pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ARCHIVE_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)))
}

/// `Outer$Inner.class`; a leading `$` does not count.
fn is_inner_class_name(name: &str) -> bool {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.char_indices().any(|(i, c)| c == '$' && i > 0)
}

fn walk<F>(base_path: &Path, accept: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool + Sync,
{
    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel();

    let accept = &accept;
    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && accept(path) {
                    let _ = tx.send(path.to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    rx.iter().collect()
}
