use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::{
    core::{AnimationSpec, PartDescriptor},
    error::{BootAnimError, BootAnimResult},
};

pub const MANIFEST_FILE: &str = "desc.txt";

/// The `desc.txt` control file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub spec: AnimationSpec,
    pub parts: Vec<PartDescriptor>,
}

impl Manifest {
    pub fn new(spec: AnimationSpec, parts: Vec<PartDescriptor>) -> BootAnimResult<Self> {
        if parts.is_empty() {
            return Err(BootAnimError::validation(
                "a boot animation needs at least one part",
            ));
        }
        Ok(Self { spec, parts })
    }

    pub fn single_part(spec: AnimationSpec) -> Self {
        Self {
            spec,
            parts: vec![PartDescriptor::looping()],
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.parts.len());
        lines.push(format!(
            "{} {} {}",
            self.spec.width(),
            self.spec.height(),
            self.spec.fps()
        ));
        lines.extend(
            self.parts
                .iter()
                .map(|p| format!("p {} {} {}", p.count, p.pause, p.dir_name)),
        );
        lines
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Writes `desc.txt` into `dir`, replacing any existing one.
    pub fn write_to(&self, dir: &Path) -> BootAnimResult<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        std::fs::write(&path, self.render())
            .with_context(|| format!("write manifest '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote manifest");
        Ok(path)
    }
}

impl std::fmt::Display for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
