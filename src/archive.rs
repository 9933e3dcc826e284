use std::{
    fs::{File, OpenOptions},
    path::{Component, Path, PathBuf},
};

use anyhow::Context as _;
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Appends filesystem entries below `root` to a stored (uncompressed) zip.
///
/// Every [`ArchiveWriter::add`] call opens the destination, appends one
/// top-level entry with all its descendants and finalizes the archive again,
/// so the file on disk is a complete zip between calls.
#[derive(Clone, Debug)]
pub struct ArchiveWriter {
    dest: PathBuf,
    root: PathBuf,
}

impl ArchiveWriter {
    pub fn new(dest: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            root: root.into(),
        }
    }

    /// Adds `rel` (relative to the root). Directories are written before their
    /// children and siblings in ascending name order. Returns the entry count.
    pub fn add(&self, rel: &Path) -> BootAnimResult<usize> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.dest)
            .with_context(|| format!("open archive '{}'", self.dest.display()))?;
        let mut zip = if file.metadata()?.len() == 0 {
            ZipWriter::new(file)
        } else {
            ZipWriter::new_append(file)?
        };
        let dest_abs = std::fs::canonicalize(&self.dest).ok();

        let mut written = 0usize;
        for entry in WalkDir::new(self.root.join(rel)).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walk '{}'", rel.display()))?;
            let path = entry.path();
            if dest_abs.is_some() && std::fs::canonicalize(path).ok() == dest_abs {
                continue;
            }

            let name = entry_name(&self.root, path)?;
            if entry.file_type().is_dir() {
                zip.add_directory(name.as_str(), stored())?;
            } else {
                zip.start_file(name.as_str(), stored())?;
                let mut src =
                    File::open(path).with_context(|| format!("open '{}'", path.display()))?;
                std::io::copy(&mut src, &mut zip)
                    .with_context(|| format!("store '{}'", path.display()))?;
            }
            tracing::debug!(entry = %name, "archived");
            written += 1;
        }

        zip.finish()?;
        Ok(written)
    }
}

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

/// Adds each of `entries` in the given order. Returns the total entry count.
#[tracing::instrument(skip_all, fields(dest = %dest.display(), root = %root.display()))]
pub fn assemble<P: AsRef<Path>>(dest: &Path, root: &Path, entries: &[P]) -> BootAnimResult<usize> {
    let writer = ArchiveWriter::new(dest, root);
    let mut total = 0usize;
    for entry in entries {
        total += writer.add(entry.as_ref())?;
    }
    tracing::info!(entries = total, "archive written");
    Ok(total)
}

/// Zip member name for `path`: relative to `root`, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> BootAnimResult<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        BootAnimError::validation(format!(
            "'{}' is not below '{}'",
            path.display(),
            root.display()
        ))
    })?;
    let mut parts = Vec::new();
    for c in rel.components() {
        match c {
            Component::Normal(s) => parts.push(s.to_str().ok_or_else(|| {
                BootAnimError::validation(format!("non UTF-8 path '{}'", path.display()))
            })?),
            Component::CurDir => {}
            _ => {
                return Err(BootAnimError::validation(format!(
                    "unsupported path component in '{}'",
                    rel.display()
                )));
            }
        }
    }
    if parts.is_empty() {
        return Err(BootAnimError::validation("cannot archive the root itself"));
    }
    Ok(parts.join("/"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub is_dir: bool,
    pub stored: bool,
    pub size: u64,
    pub compressed_size: u64,
}

/// Central-directory listing of an archive, in archive order.
pub fn inspect(path: &Path) -> BootAnimResult<Vec<EntryInfo>> {
    let file = File::open(path).with_context(|| format!("open archive '{}'", path.display()))?;
    let mut archive = ZipArchive::new(file)?;
    let mut out = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        out.push(EntryInfo {
            name: entry.name().to_string(),
            is_dir: entry.is_dir(),
            stored: entry.compression() == CompressionMethod::Stored,
            size: entry.size(),
            compressed_size: entry.compressed_size(),
        });
    }
    Ok(out)
}
