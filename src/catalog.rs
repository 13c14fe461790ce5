use anyhow::{Context, Result};
use memmap2::Mmap;
use serde::Serialize;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::scan::{FileManager, is_archive};

/// Largest archive entry read as a class file.
pub const MAX_CLASS_BYTES: u64 = 64 * 1024 * 1024;

/// Bytes of one class file and where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInput {
    /// File path, or `archive!/entry` for archive members.
    pub origin: String,
    pub bytes: Vec<u8>,
}

/// A file or archive entry that contributed nothing to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub origin: String,
    pub message: String,
}

/// A loaded class, or the reason one entry could not be read.
pub type LoadedInput = std::result::Result<ClassInput, Failure>;

fn open_archive(archive_path: &Path) -> Result<Mmap> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap archive: {}", archive_path.display()))
}

/// Reads every accepted class entry of a jar/war/zip/ear archive.
///
/// Only an archive that cannot be opened fails as a whole; unreadable
/// entries come back as per-entry failures.
pub fn archive_classes(archive_path: &Path, files: &FileManager) -> Result<Vec<LoadedInput>> {
    let mmap = open_archive(archive_path)?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read archive: {}", archive_path.display()))?;

    let mut classes = Vec::new();
    for i in 0..archive.len() {
        let name = match archive.by_index_raw(i) {
            Ok(entry) if entry.is_dir() => continue,
            Ok(entry) => entry.name().to_string(),
            Err(e) => {
                classes.push(Err(Failure {
                    origin: format!("{}!/#{i}", archive_path.display()),
                    message: format!("Failed to read archive entry: {e}"),
                }));
                continue;
            }
        };
        if !files.accept_class_file_name(&name) {
            continue;
        }

        let origin = format!("{}!/{name}", archive_path.display());
        match read_entry(&mut archive, i) {
            Ok(bytes) => classes.push(Ok(ClassInput { origin, bytes })),
            Err(e) => classes.push(Err(Failure {
                message: format!("Failed to read archive entry: {origin}: {e:#}"),
                origin,
            })),
        }
    }
    Ok(classes)
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, index: usize) -> Result<Vec<u8>> {
    let entry = archive.by_index(index)?;
    let declared = entry.size();
    if declared > MAX_CLASS_BYTES {
        anyhow::bail!("entry declares {declared} bytes, more than the {MAX_CLASS_BYTES} byte limit");
    }

    let mut bytes = Vec::with_capacity(declared as usize);
    entry.take(MAX_CLASS_BYTES + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > MAX_CLASS_BYTES {
        anyhow::bail!("entry is larger than the {MAX_CLASS_BYTES} byte limit");
    }
    Ok(bytes)
}

pub fn count_archive_classes(archive_path: &Path, files: &FileManager) -> Result<usize> {
    let mmap = open_archive(archive_path)?;
    let archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read archive: {}", archive_path.display()))?;
    Ok(archive
        .file_names()
        .filter(|name| !name.ends_with('/') && files.accept_class_file_name(name))
        .count())
}

/// Loads a class file, or every class inside an archive.
pub fn load_inputs(path: &Path, files: &FileManager) -> Result<Vec<LoadedInput>> {
    if is_archive(path) {
        return archive_classes(path, files);
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read class file: {}", path.display()))?;
    Ok(vec![Ok(ClassInput {
        origin: path.display().to_string(),
        bytes,
    })])
}
