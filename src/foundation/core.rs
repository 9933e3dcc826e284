use std::ops::RangeInclusive;

use crate::foundation::error::{BootAnimError, BootAnimResult};

pub const WIDTH_RANGE: RangeInclusive<u32> = 320..=3840;
pub const HEIGHT_RANGE: RangeInclusive<u32> = 360..=2560;
pub const MIN_FPS: u32 = 1;
/// Frame rates above this are accepted but not recommended for device playback.
pub const RECOMMENDED_MAX_FPS: u32 = 60;

/// Target device geometry and frame rate for one boot animation.
///
/// Always validated: constructing one (directly or through serde) checks the
/// device ranges, and the fields cannot be changed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawAnimationSpec")]
pub struct AnimationSpec {
    width: u32,
    height: u32,
    fps: u32,
}

#[derive(serde::Deserialize)]
struct RawAnimationSpec {
    width: u32,
    height: u32,
    fps: u32,
}

impl TryFrom<RawAnimationSpec> for AnimationSpec {
    type Error = BootAnimError;

    fn try_from(raw: RawAnimationSpec) -> BootAnimResult<Self> {
        Self::new(raw.width, raw.height, raw.fps)
    }
}

impl AnimationSpec {
    pub fn new(width: u32, height: u32, fps: u32) -> BootAnimResult<Self> {
        if !WIDTH_RANGE.contains(&width) {
            return Err(BootAnimError::validation(format!(
                "width {width} is outside {}..={}",
                WIDTH_RANGE.start(),
                WIDTH_RANGE.end()
            )));
        }
        if !HEIGHT_RANGE.contains(&height) {
            return Err(BootAnimError::validation(format!(
                "height {height} is outside {}..={}",
                HEIGHT_RANGE.start(),
                HEIGHT_RANGE.end()
            )));
        }
        if fps < MIN_FPS {
            return Err(BootAnimError::validation(format!(
                "fps must be >= {MIN_FPS}"
            )));
        }
        if fps > RECOMMENDED_MAX_FPS {
            tracing::debug!(
                fps,
                "frame rates greater than {RECOMMENDED_MAX_FPS}fps not recommended"
            );
        }
        Ok(Self { width, height, fps })
    }

    /// Any non-zero geometry, bypassing the device range checks of [`AnimationSpec::new`].
    pub fn custom(width: u32, height: u32, fps: u32) -> BootAnimResult<Self> {
        if width == 0 || height == 0 {
            return Err(BootAnimError::validation("width/height must be non-zero"));
        }
        if fps < MIN_FPS {
            return Err(BootAnimError::validation(format!(
                "fps must be >= {MIN_FPS}"
            )));
        }
        Ok(Self { width, height, fps })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// One playable segment: `p <count> <pause> <dir>` in desc.txt.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartDescriptor {
    /// 0 loops forever.
    pub count: u32,
    pub pause: u32,
    pub dir_name: String,
}

impl PartDescriptor {
    pub const DEFAULT_DIR: &'static str = "part0";

    pub fn new(count: u32, pause: u32, dir_name: impl Into<String>) -> BootAnimResult<Self> {
        let dir_name = dir_name.into();
        if dir_name.is_empty()
            || dir_name.contains(['/', '\\'])
            || dir_name.contains(char::is_whitespace)
        {
            return Err(BootAnimError::validation(format!(
                "part directory name '{dir_name}' must be a single non-empty path component without whitespace"
            )));
        }
        Ok(Self {
            count,
            pause,
            dir_name,
        })
    }

    /// The single looping part every generated animation uses.
    pub fn looping() -> Self {
        Self {
            count: 0,
            pause: 0,
            dir_name: Self::DEFAULT_DIR.to_string(),
        }
    }
}
