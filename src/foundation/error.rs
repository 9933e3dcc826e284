use std::path::PathBuf;

pub type BootAnimResult<T> = Result<T, BootAnimError>;

#[derive(thiserror::Error, Debug)]
pub enum BootAnimError {
    #[error("Output target must be a .zip file.  (Did you forget the extension?) got '{}'", .0.display())]
    InvalidOutputTarget(PathBuf),

    #[error("desc.txt must be present to create a boot animation (looked in '{}')", .0.display())]
    MissingManifest(PathBuf),

    #[error("no directories found to add to the archive in '{}'", .0.display())]
    MissingContent(PathBuf),

    #[error("invalid path to animated image '{}'", .0.display())]
    SourceNotFound(PathBuf),

    #[error("'{}' does not appear to be an animated .gif ({frames} frame(s))", .path.display())]
    NotAnimated { path: PathBuf, frames: usize },

    #[error("please rename/relocate '{}' or choose a different filename", .0.display())]
    OverwriteDeclined(PathBuf),

    #[error("failed to remove existing '{}': {source}", .path.display())]
    DestinationRemoval {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BootAnimError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
