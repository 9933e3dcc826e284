use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use image::{Rgba, RgbaImage};

use crate::foundation::error::{BootAnimError, BootAnimResult};

/// One fully composited animation frame, owned independently of the decoder.
#[derive(Clone, Debug)]
pub struct Frame {
    pub index: usize,
    pub image: RgbaImage,
    /// RGB triples the frame's indices were resolved through.
    pub palette: Option<Vec<u8>>,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn save_png(&self, dir: &Path, total: usize) -> BootAnimResult<PathBuf> {
        let path = dir.join(frame_file_name(self.index, total));
        self.image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write frame '{}'", path.display()))?;
        Ok(path)
    }
}

/// Zero-padded stem width: two digits, wider only when `total` needs it.
pub fn index_width(total: usize) -> usize {
    let last = total.saturating_sub(1);
    last.to_string().len().max(2)
}

pub fn frame_file_name(index: usize, total: usize) -> String {
    format!("{index:0width$}.png", width = index_width(total))
}

/// A GIF held in memory whose frame count and logical screen size are known.
#[derive(Debug)]
pub struct Animation {
    path: PathBuf,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    frame_count: usize,
}

impl Animation {
    pub fn open(path: &Path) -> BootAnimResult<Self> {
        if !path.is_file() {
            return Err(BootAnimError::SourceNotFound(path.to_path_buf()));
        }
        let bytes =
            std::fs::read(path).map_err(|_| BootAnimError::SourceNotFound(path.to_path_buf()))?;

        let (width, height, frame_count) = match probe(&bytes) {
            Ok(probed) => probed,
            Err(err) => {
                // A decodable still image in another format is simply not animated.
                if image::load_from_memory(&bytes).is_ok() {
                    return Err(BootAnimError::NotAnimated {
                        path: path.to_path_buf(),
                        frames: 1,
                    });
                }
                return Err(BootAnimError::decode(format!(
                    "'{}': {err}",
                    path.display()
                )));
            }
        };

        tracing::debug!(
            path = %path.display(),
            width,
            height,
            frame_count,
            "probed animation"
        );

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            width,
            height,
            frame_count,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn ensure_animated(&self) -> BootAnimResult<()> {
        if self.frame_count < 2 {
            return Err(BootAnimError::NotAnimated {
                path: self.path.clone(),
                frames: self.frame_count,
            });
        }
        Ok(())
    }

    /// Consumes the animation; the returned sequence can be walked once.
    pub fn frames(self) -> BootAnimResult<Frames> {
        let decoder = indexed_decoder(Cursor::new(self.bytes))
            .map_err(|e| BootAnimError::decode(format!("'{}': {e}", self.path.display())))?;
        let global_palette = decoder.global_palette().map(<[u8]>::to_vec);
        Ok(Frames {
            decoder,
            canvas: RgbaImage::new(self.width, self.height),
            global_palette,
            first_palette: None,
            next_index: 0,
            done: false,
        })
    }
}

fn probe(bytes: &[u8]) -> Result<(u32, u32, usize), gif::DecodingError> {
    let mut decoder = indexed_decoder(bytes)?;
    let mut frame_count = 0usize;
    while decoder.read_next_frame()?.is_some() {
        frame_count += 1;
    }
    Ok((
        u32::from(decoder.width()),
        u32::from(decoder.height()),
        frame_count,
    ))
}

fn indexed_decoder<R: std::io::Read>(reader: R) -> Result<gif::Decoder<R>, gif::DecodingError> {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    opts.read_info(reader)
}

/// Forward-only frame sequence in source temporal order.
///
/// The first frame's color table (its local one, else the global one) is
/// reapplied to every later frame that has no local table. A later frame that
/// carries its own local table keeps it, since its indices refer to that table.
pub struct Frames {
    decoder: gif::Decoder<Cursor<Vec<u8>>>,
    canvas: RgbaImage,
    global_palette: Option<Vec<u8>>,
    first_palette: Option<Vec<u8>>,
    next_index: usize,
    done: bool,
}

impl Iterator for Frames {
    type Item = BootAnimResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let raw = match self.decoder.read_next_frame() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(BootAnimError::decode(format!(
                    "frame {}: {e}",
                    self.next_index
                ))));
            }
        };

        let index = self.next_index;
        let palette = if index == 0 {
            let p = raw.palette.clone().or_else(|| self.global_palette.clone());
            self.first_palette.clone_from(&p);
            p
        } else {
            raw.palette.clone().or_else(|| self.first_palette.clone())
        };
        let Some(palette) = palette else {
            self.done = true;
            return Some(Err(BootAnimError::decode(format!(
                "frame {index} has no color table"
            ))));
        };

        let snapshot = (raw.dispose == gif::DisposalMethod::Previous).then(|| self.canvas.clone());
        draw_indexed(&mut self.canvas, raw, &palette);
        let image = self.canvas.clone();

        match raw.dispose {
            gif::DisposalMethod::Background => clear_rect(&mut self.canvas, raw),
            gif::DisposalMethod::Previous => {
                if let Some(prev) = snapshot {
                    self.canvas = prev;
                }
            }
            gif::DisposalMethod::Any | gif::DisposalMethod::Keep => {}
        }

        self.next_index += 1;
        tracing::trace!(index, "decoded frame");
        Some(Ok(Frame {
            index,
            image,
            palette: Some(palette),
        }))
    }
}

fn draw_indexed(canvas: &mut RgbaImage, raw: &gif::Frame<'_>, palette: &[u8]) {
    let (cw, ch) = canvas.dimensions();
    let fw = u32::from(raw.width);
    for (i, &idx) in raw.buffer.iter().enumerate() {
        if raw.transparent == Some(idx) {
            continue;
        }
        let x = u32::from(raw.left) + (i as u32 % fw.max(1));
        let y = u32::from(raw.top) + (i as u32 / fw.max(1));
        if x >= cw || y >= ch {
            continue;
        }
        let base = usize::from(idx) * 3;
        let Some(rgb) = palette.get(base..base + 3) else {
            continue;
        };
        canvas.put_pixel(x, y, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    }
}

fn clear_rect(canvas: &mut RgbaImage, raw: &gif::Frame<'_>) {
    let (cw, ch) = canvas.dimensions();
    let x0 = u32::from(raw.left);
    let y0 = u32::from(raw.top);
    let x1 = (x0 + u32::from(raw.width)).min(cw);
    let y1 = (y0 + u32::from(raw.height)).min(ch);
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, Rgba([0, 0, 0, 0]));
        }
    }
}
