use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{Rgba, RgbaImage, imageops::FilterType};

use crate::{
    extract::frame_file_name,
    foundation::error::{BootAnimError, BootAnimResult},
};

/// How frames are reconciled with a target resolution they do not match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// Exact target size, aspect ratio ignored.
    Stretch,
    /// Target height, width scaled by the same factor.
    Fit,
    /// Unscaled, centered on a black target-size canvas (cropped where larger).
    Center,
}

impl ResizePolicy {
    /// Single-character menu selection, case-insensitive.
    pub fn from_choice(answer: &str) -> Option<Self> {
        let mut chars = answer.trim().chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match c.to_ascii_lowercase() {
            's' => Some(Self::Stretch),
            'f' => Some(Self::Fit),
            'c' => Some(Self::Center),
            _ => None,
        }
    }

    /// Output dimensions for a frame of `source` size.
    pub fn output_size(self, source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
        match self {
            Self::Stretch | Self::Center => target,
            Self::Fit => (fit_width(source, target.1), target.1),
        }
    }

    pub fn apply(self, frame: &RgbaImage, source: (u32, u32), target: (u32, u32)) -> RgbaImage {
        match self {
            Self::Stretch => {
                image::imageops::resize(frame, target.0, target.1, FilterType::Triangle)
            }
            Self::Fit => {
                let (w, h) = self.output_size(source, target);
                image::imageops::resize(frame, w, h, FilterType::Triangle)
            }
            Self::Center => center_on_canvas(frame, target),
        }
    }
}

impl std::fmt::Display for ResizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stretch => "stretch",
            Self::Fit => "fit",
            Self::Center => "center",
        })
    }
}

/// `round(source_width * target_height / source_height)`, never below 1.
pub fn fit_width(source: (u32, u32), target_height: u32) -> u32 {
    let (sw, sh) = source;
    if sh == 0 {
        return sw.max(1);
    }
    let scale = f64::from(target_height) / f64::from(sh);
    ((f64::from(sw) * scale).round() as u32).max(1)
}

pub fn needs_reconcile(source: (u32, u32), target: (u32, u32)) -> bool {
    source != target
}

fn center_on_canvas(frame: &RgbaImage, target: (u32, u32)) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(target.0, target.1, Rgba([0, 0, 0, 255]));
    let x = (i64::from(target.0) - i64::from(frame.width())) / 2;
    let y = (i64::from(target.1) - i64::from(frame.height())) / 2;
    image::imageops::overlay(&mut canvas, frame, x, y);
    canvas
}

/// Frame files of `dir` in lexicographic order.
pub fn list_frames(dir: &Path) -> BootAnimResult<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read '{}'", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

/// Rewrites every frame of `part_dir` per `policy`, renumbering from zero.
///
/// Resized frames are staged in a sibling directory and swapped in only once
/// all of them were written, so a failure leaves the original frames intact.
#[tracing::instrument(skip_all, fields(dir = %part_dir.display(), policy = %policy))]
pub fn reconcile_dir(
    part_dir: &Path,
    source: (u32, u32),
    target: (u32, u32),
    policy: ResizePolicy,
) -> BootAnimResult<usize> {
    let frames = list_frames(part_dir)?;
    let staging = staging_dir(part_dir)?;
    if staging.exists() {
        std::fs::remove_dir_all(&staging)
            .with_context(|| format!("clear staging dir '{}'", staging.display()))?;
    }
    std::fs::create_dir_all(&staging)
        .with_context(|| format!("create staging dir '{}'", staging.display()))?;

    if let Err(err) = write_resized(&frames, &staging, source, target, policy) {
        std::fs::remove_dir_all(&staging).ok();
        return Err(err);
    }

    swap_in(part_dir, &staging)?;

    tracing::info!(frames = frames.len(), "resized frames");
    Ok(frames.len())
}

/// Moves `staging` into `part_dir`. The original frames are renamed aside
/// first and only deleted once the new ones are in place; if moving the new
/// ones in fails, the originals are put back.
fn swap_in(part_dir: &Path, staging: &Path) -> BootAnimResult<()> {
    let backup = sibling_dir(part_dir, ".orig")?;
    if backup.exists() {
        std::fs::remove_dir_all(&backup)
            .with_context(|| format!("clear backup dir '{}'", backup.display()))?;
    }
    std::fs::rename(part_dir, &backup).with_context(|| {
        format!(
            "move original frames '{}' -> '{}'",
            part_dir.display(),
            backup.display()
        )
    })?;

    if let Err(err) = std::fs::rename(staging, part_dir) {
        std::fs::rename(&backup, part_dir).ok();
        std::fs::remove_dir_all(staging).ok();
        return Err(anyhow::Error::new(err)
            .context(format!(
                "move resized frames '{}' -> '{}'",
                staging.display(),
                part_dir.display()
            ))
            .into());
    }

    std::fs::remove_dir_all(&backup)
        .with_context(|| format!("remove original frames '{}'", backup.display()))?;
    Ok(())
}

fn staging_dir(part_dir: &Path) -> BootAnimResult<PathBuf> {
    sibling_dir(part_dir, ".resize")
}

fn sibling_dir(part_dir: &Path, suffix: &str) -> BootAnimResult<PathBuf> {
    let name = part_dir.file_name().ok_or_else(|| {
        BootAnimError::validation(format!(
            "part directory '{}' has no name",
            part_dir.display()
        ))
    })?;
    let mut sibling = name.to_os_string();
    sibling.push(suffix);
    Ok(part_dir.with_file_name(sibling))
}

fn write_resized(
    frames: &[PathBuf],
    staging: &Path,
    source: (u32, u32),
    target: (u32, u32),
    policy: ResizePolicy,
) -> BootAnimResult<()> {
    for (i, path) in frames.iter().enumerate() {
        let img = image::open(path)
            .with_context(|| format!("open frame '{}'", path.display()))?
            .to_rgba8();
        let out = policy.apply(&img, source, target);
        let out_path = staging.join(frame_file_name(i, frames.len()));
        out.save_with_format(&out_path, image::ImageFormat::Png)
            .with_context(|| format!("write frame '{}'", out_path.display()))?;
        tracing::debug!(
            from = %path.display(),
            to = %out_path.display(),
            width = out.width(),
            height = out.height(),
            "resized frame"
        );
    }
    Ok(())
}
