#![forbid(unsafe_code)]

pub mod archive;
pub mod extract;
pub mod foundation;
pub mod geometry;
pub mod interact;
pub mod manifest;
pub mod pipeline;

pub use archive::{ArchiveWriter, EntryInfo, assemble, inspect};
pub use extract::{Animation, Frame, Frames, frame_file_name};
pub use foundation::core::{AnimationSpec, PartDescriptor};
pub use foundation::error::{BootAnimError, BootAnimResult};
pub use geometry::{ResizePolicy, reconcile_dir};
pub use interact::{Field, InputRejection, Interaction, Preset, Terminal};
pub use manifest::{MANIFEST_FILE, Manifest};
pub use pipeline::{
    ArchiveReport, BuildReport, GifBuild, archive_directory, build_from_gif, clear_destination,
    ensure_zip_target,
};
