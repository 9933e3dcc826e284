use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    foundation::{
        core::{AnimationSpec, HEIGHT_RANGE, MIN_FPS, RECOMMENDED_MAX_FPS, WIDTH_RANGE},
        error::{BootAnimError, BootAnimResult},
    },
    geometry::ResizePolicy,
};

/// Numeric values asked for when building an animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Width,
    Height,
    Fps,
}

impl Field {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Width => "Enter target device resolution width: ",
            Self::Height => "Enter target device resolution height: ",
            Self::Fps => "Enter target frame rate: ",
        }
    }

    pub fn check(self, value: i64) -> Result<u32, InputRejection> {
        let out_of_range = InputRejection::OutOfRangeValue { field: self };
        let value = u32::try_from(value).map_err(|_| out_of_range.clone())?;
        let ok = match self {
            Self::Width => WIDTH_RANGE.contains(&value),
            Self::Height => HEIGHT_RANGE.contains(&value),
            Self::Fps => value >= MIN_FPS,
        };
        if ok { Ok(value) } else { Err(out_of_range) }
    }

    /// Parses and range-checks one line of user input.
    pub fn validate(self, text: &str) -> Result<u32, InputRejection> {
        let value = text
            .trim()
            .parse::<i64>()
            .map_err(|_| InputRejection::InvalidNumericInput)?;
        self.check(value)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::Fps => "frame rate",
        })
    }
}

/// Why an answer was refused; the question is simply asked again.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum InputRejection {
    #[error("Value must be an integer.")]
    InvalidNumericInput,

    #[error("Value for {field} is outside acceptable range.")]
    OutOfRangeValue { field: Field },
}

/// `y`/`n` answers, case-insensitive; anything else is `None`.
pub fn parse_confirmation(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

/// Decisions the build pipeline needs from its user.
pub trait Interaction {
    /// Whether the existing `path` may be removed.
    fn confirm_overwrite(&mut self, path: &Path) -> BootAnimResult<bool>;

    fn value(&mut self, field: Field) -> BootAnimResult<u32>;

    fn resize_policy(
        &mut self,
        source: (u32, u32),
        target: (u32, u32),
    ) -> BootAnimResult<ResizePolicy>;

    fn animation_spec(&mut self) -> BootAnimResult<AnimationSpec> {
        let width = self.value(Field::Width)?;
        let height = self.value(Field::Height)?;
        let fps = self.value(Field::Fps)?;
        AnimationSpec::new(width, height, fps)
    }
}

/// Line-oriented prompting over any reader/writer pair (stdin/stdout in the CLI).
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn ask(&mut self, prompt: &str) -> BootAnimResult<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(BootAnimError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            )));
        }
        Ok(line)
    }

    fn say(&mut self, msg: &str) -> BootAnimResult<()> {
        writeln!(self.output, "{msg}")?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Interaction for Terminal<R, W> {
    fn confirm_overwrite(&mut self, path: &Path) -> BootAnimResult<bool> {
        let prompt = format!(
            "{} exists and will be OVERWRITTEN.  Proceed? (y/n) ",
            path.display()
        );
        loop {
            let answer = self.ask(&prompt)?;
            match parse_confirmation(&answer) {
                Some(yes) => return Ok(yes),
                None => self.say("Sorry, I didn't get that.")?,
            }
        }
    }

    fn value(&mut self, field: Field) -> BootAnimResult<u32> {
        loop {
            let answer = self.ask(field.prompt())?;
            match field.validate(&answer) {
                Ok(v) => {
                    if field == Field::Fps && v > RECOMMENDED_MAX_FPS {
                        self.say("Frame rates greater than 60fps not recommended.")?;
                    }
                    return Ok(v);
                }
                Err(rejection) => self.say(&rejection.to_string())?,
            }
        }
    }

    fn resize_policy(
        &mut self,
        _source: (u32, u32),
        _target: (u32, u32),
    ) -> BootAnimResult<ResizePolicy> {
        self.say(
            "Image size and target resolution differ. \nWould you prefer to:\n[s]tretch, [f]it, or [c]enter your image?",
        )?;
        let mut answer = self.ask("")?;
        loop {
            if let Some(policy) = ResizePolicy::from_choice(&answer) {
                return Ok(policy);
            }
            answer = self.ask("Choose from: s, f, c ")?;
        }
    }
}

/// Answers fixed up front (command-line flags, spec file) with fallback to
/// another [`Interaction`] for anything left open.
pub struct Preset<I> {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub policy: Option<ResizePolicy>,
    pub assume_yes: bool,
    inner: I,
}

impl<I: Interaction> Preset<I> {
    pub fn new(inner: I) -> Self {
        Self {
            width: None,
            height: None,
            fps: None,
            policy: None,
            assume_yes: false,
            inner,
        }
    }

    pub fn with_spec(mut self, spec: AnimationSpec) -> Self {
        self.width = Some(spec.width());
        self.height = Some(spec.height());
        self.fps = Some(spec.fps());
        self
    }

    fn preset(&self, field: Field) -> Option<u32> {
        match field {
            Field::Width => self.width,
            Field::Height => self.height,
            Field::Fps => self.fps,
        }
    }
}

impl<I: Interaction> Interaction for Preset<I> {
    fn confirm_overwrite(&mut self, path: &Path) -> BootAnimResult<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        self.inner.confirm_overwrite(path)
    }

    fn value(&mut self, field: Field) -> BootAnimResult<u32> {
        match self.preset(field) {
            Some(v) => field
                .check(i64::from(v))
                .map_err(|r| BootAnimError::validation(format!("{r} (got {v})"))),
            None => self.inner.value(field),
        }
    }

    fn resize_policy(
        &mut self,
        source: (u32, u32),
        target: (u32, u32),
    ) -> BootAnimResult<ResizePolicy> {
        match self.policy {
            Some(p) => Ok(p),
            None => self.inner.resize_policy(source, target),
        }
    }
}
