use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    archive::assemble,
    extract::Animation,
    foundation::{
        core::PartDescriptor,
        error::{BootAnimError, BootAnimResult},
    },
    geometry::{ResizePolicy, needs_reconcile, reconcile_dir},
    interact::Interaction,
    manifest::{MANIFEST_FILE, Manifest},
};

pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Inputs of the animated-image to archive build.
#[derive(Clone, Debug)]
pub struct GifBuild {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Where `desc.txt` and the part directory are staged.
    pub work_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct BuildReport {
    pub output: PathBuf,
    pub manifest: Manifest,
    pub frames: usize,
    pub source_size: (u32, u32),
    pub resized: Option<ResizePolicy>,
    pub entries: usize,
}

#[derive(Clone, Debug)]
pub struct ArchiveReport {
    pub output: PathBuf,
    pub dirs: Vec<String>,
    pub entries: usize,
}

pub fn ensure_zip_target(output: &Path) -> BootAnimResult<()> {
    if !output.to_string_lossy().ends_with(ARCHIVE_SUFFIX) {
        return Err(BootAnimError::InvalidOutputTarget(output.to_path_buf()));
    }
    Ok(())
}

/// Removes an existing file or directory at `path` once the user agrees.
pub fn clear_destination(path: &Path, interaction: &mut dyn Interaction) -> BootAnimResult<()> {
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return Ok(());
    };
    if !interaction.confirm_overwrite(path)? {
        return Err(BootAnimError::OverwriteDeclined(path.to_path_buf()));
    }
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    removed.map_err(|source| BootAnimError::DestinationRemoval {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "removed existing destination");
    Ok(())
}

/// Extracts, reconciles and archives an animated GIF as a single looping part.
#[tracing::instrument(skip_all, fields(source = %req.source.display(), output = %req.output.display()))]
pub fn build_from_gif(
    req: &GifBuild,
    interaction: &mut dyn Interaction,
) -> BootAnimResult<BuildReport> {
    ensure_zip_target(&req.output)?;
    let animation = Animation::open(&req.source)?;
    animation.ensure_animated()?;

    clear_destination(&req.output, interaction)?;

    std::fs::create_dir_all(&req.work_dir)
        .with_context(|| format!("create work dir '{}'", req.work_dir.display()))?;
    let part = PartDescriptor::looping();
    let part_dir = req.work_dir.join(&part.dir_name);
    clear_destination(&part_dir, interaction)?;
    std::fs::create_dir_all(&part_dir)
        .with_context(|| format!("create part dir '{}'", part_dir.display()))?;

    let source_size = animation.dimensions();
    let total = animation.frame_count();
    let mut frames = 0usize;
    for frame in animation.frames()? {
        frame?.save_png(&part_dir, total)?;
        frames += 1;
    }
    tracing::info!(frames, dir = %part_dir.display(), "extracted frames");

    let spec = interaction.animation_spec()?;
    let resized = if needs_reconcile(source_size, spec.dimensions()) {
        let policy = interaction.resize_policy(source_size, spec.dimensions())?;
        reconcile_dir(&part_dir, source_size, spec.dimensions(), policy)?;
        Some(policy)
    } else {
        None
    };

    let manifest = Manifest::single_part(spec);
    manifest.write_to(&req.work_dir)?;

    let entries = assemble(
        &req.output,
        &req.work_dir,
        &[MANIFEST_FILE, part.dir_name.as_str()],
    )?;

    Ok(BuildReport {
        output: req.output.clone(),
        manifest,
        frames,
        source_size,
        resized,
        entries,
    })
}

/// Non-file top-level entries of `work_dir`, sorted by name.
///
/// Entries that are not directories either (dangling links, sockets) are
/// rejected up front since they cannot be archived.
pub fn content_dirs(work_dir: &Path, exclude: &Path) -> BootAnimResult<Vec<String>> {
    let exclude = std::fs::canonicalize(exclude).ok();
    let mut dirs = Vec::new();
    for entry in
        std::fs::read_dir(work_dir).with_context(|| format!("read '{}'", work_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            continue;
        }
        if exclude.is_some() && std::fs::canonicalize(&path).ok() == exclude {
            continue;
        }
        let name = entry.file_name().into_string().map_err(|n| {
            BootAnimError::validation(format!("non UTF-8 entry name {n:?}"))
        })?;
        if !path.is_dir() {
            return Err(BootAnimError::validation(format!(
                "'{}' is neither a file nor a directory (dangling link?)",
                path.display()
            )));
        }
        dirs.push(name);
    }
    dirs.sort();
    Ok(dirs)
}

/// Packages an existing `desc.txt` plus every directory of `work_dir`.
#[tracing::instrument(skip_all, fields(work_dir = %work_dir.display(), output = %output.display()))]
pub fn archive_directory(
    work_dir: &Path,
    output: &Path,
    interaction: &mut dyn Interaction,
) -> BootAnimResult<ArchiveReport> {
    ensure_zip_target(output)?;

    if !work_dir.join(MANIFEST_FILE).is_file() {
        return Err(BootAnimError::MissingManifest(work_dir.to_path_buf()));
    }
    let dirs = content_dirs(work_dir, output)?;
    if dirs.is_empty() {
        return Err(BootAnimError::MissingContent(work_dir.to_path_buf()));
    }

    clear_destination(output, interaction)?;

    let mut top_level = Vec::with_capacity(dirs.len() + 1);
    top_level.push(MANIFEST_FILE.to_string());
    top_level.extend(dirs.iter().cloned());
    let entries = assemble(output, work_dir, top_level.as_slice())?;

    Ok(ArchiveReport {
        output: output.to_path_buf(),
        dirs,
        entries,
    })
}
