// session.rs
//
//! Animated GIF encoding session
//!
//! Drives quantization, compression and block writing across a frame
//! sequence delivered one frame at a time.
use crate::block::{
    Application, ColorTableConfig, ColorTableExistence, ColorTableOrdering,
    GlobalColorTable, GraphicControl, Header, ImageData, ImageDesc,
    LogicalScreenDesc, Trailer,
};
use crate::encode::BlockEnc;
use crate::error::{Error, Result};
use crate::quant::Palette;
use pix::rgb::SRgba8;
use pix::Raster;
use std::convert::TryFrom;

/// Default palette sampling factor
const DEFAULT_SAMPLE_FACTOR: u8 = 10;

/// LZW minimum code size for 8-bit palette indices
const MIN_CODE_SIZE: u8 = 8;

/// Session state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Waiting for the first frame
    Ready,
    /// Accepting frames
    Encoding,
    /// Trailer written, buffer yielded
    Finished,
    /// Cancelled, no further writes
    Aborted,
}

/// Animated GIF encoder
///
/// Frames are submitted strictly in order.  The palette is learned
/// from the first frame and shared by the whole animation; the
/// output buffer is appended to in the exact block order of the
/// format and never rewritten.
///
/// ## Encoding Example
/// ```
/// use gifloom::Encoder;
/// use pix::rgb::SRgba8;
/// use pix::Raster;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut enc = Encoder::new(2, 2, 1, 100)?.with_loop_count(0);
/// let raster = Raster::<SRgba8>::with_u8_buffer(
///     2,
///     2,
///     vec![
///         255, 0, 0, 255, 255, 0, 0, 255,
///         255, 0, 0, 255, 255, 0, 0, 255,
///     ],
/// );
/// enc.frame(0, &raster)?;
/// let gif = enc.finish()?;
/// assert!(gif.starts_with(b"GIF89a"));
/// # Ok(())
/// # }
/// ```
pub struct Encoder {
    /// Screen width
    width: u16,
    /// Screen height
    height: u16,
    /// Total number of frames
    frame_count: u32,
    /// Frame delay in centiseconds
    delay_cs: u16,
    /// Animation loop count (zero loops forever)
    loop_count: u16,
    /// Palette sampling factor
    sample_factor: u8,
    /// Palette learned from the first frame
    palette: Option<Palette>,
    /// Frames encoded so far
    frames_done: u32,
    /// Session state
    state: State,
    /// Block encoder over the output buffer
    blocks: BlockEnc<Vec<u8>>,
}

impl Encoder {
    /// Create an encoder for a frame sequence.
    ///
    /// Writes the signature and logical screen descriptor
    /// immediately; the global color table follows once the first
    /// frame has trained the palette.
    ///
    /// * `width` / `height`: dimensions of every frame, in pixels.
    /// * `frame_count`: number of frames that will be submitted.
    /// * `frame_delay_ms`: per-frame delay, rounded to hundredths
    ///   of a second.
    pub fn new(width: u32, height: u32, frame_count: u32, frame_delay_ms: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions);
        }
        let width = u16::try_from(width)?;
        let height = u16::try_from(height)?;
        let delay_cs = u16::try_from((frame_delay_ms + 5) / 10)?;
        let mut blocks = BlockEnc::new(Vec::with_capacity(1024));
        blocks.encode(Header::default())?;
        blocks.encode(
            LogicalScreenDesc::default()
                .with_screen_width(width)
                .with_screen_height(height)
                .with_color_table_config(&global_table_config()),
        )?;
        Ok(Encoder {
            width,
            height,
            frame_count,
            delay_cs,
            loop_count: 0,
            sample_factor: DEFAULT_SAMPLE_FACTOR,
            palette: None,
            frames_done: 0,
            state: State::Ready,
            blocks,
        })
    }

    /// Adjust the loop count (zero loops forever)
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Adjust the palette sampling factor.
    ///
    /// 1 samples every pixel; 30 is fastest.  Out-of-range values
    /// are rejected when the first frame is encoded.
    pub fn with_sample_factor(mut self, sample_factor: u8) -> Self {
        self.sample_factor = sample_factor;
        self
    }

    /// Get the screen width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get the screen height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get the configured frame count
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Get the number of frames encoded so far
    pub fn frames_done(&self) -> u32 {
        self.frames_done
    }

    /// Encode one frame.
    ///
    /// `index` must equal the number of frames already encoded;
    /// frames cannot be reordered once written.  The first frame
    /// trains the palette and appends the global color table and
    /// looping extension; every frame appends one graphic control
    /// extension, image descriptor and compressed image block.
    pub fn frame(&mut self, index: u32, raster: &Raster<SRgba8>) -> Result<()> {
        match self.state {
            State::Ready => self.state = State::Encoding,
            State::Encoding => (),
            State::Finished | State::Aborted => return Err(Error::SessionClosed),
        }
        if index != self.frames_done {
            return Err(Error::FrameOutOfOrder {
                expected: self.frames_done,
                got: index,
            });
        }
        if self.frames_done >= self.frame_count {
            return Err(Error::FrameCountMismatch {
                expected: self.frame_count,
                got: self.frames_done + 1,
            });
        }
        if raster.width() != u32::from(self.width)
            || raster.height() != u32::from(self.height)
        {
            return Err(Error::FrameSizeMismatch);
        }
        let rgba = raster.as_u8_slice();
        let palette = match self.palette.take() {
            Some(palette) => palette,
            None => {
                let palette = Palette::train(rgba, self.sample_factor)?;
                self.blocks
                    .encode(GlobalColorTable::with_colors(palette.colors()))?;
                self.blocks
                    .encode(Application::with_loop_count(self.loop_count))?;
                palette
            }
        };
        let mut indexed = Vec::with_capacity(rgba.len() / 4);
        for px in rgba.chunks_exact(4) {
            indexed.push(palette.nearest_index(px[0], px[1], px[2]));
        }
        self.palette = Some(palette);
        let mut control = GraphicControl::default();
        control.set_delay_time_cs(self.delay_cs);
        self.blocks.encode(control)?;
        self.blocks.encode(
            ImageDesc::default()
                .with_width(self.width)
                .with_height(self.height)
                .with_color_table_config(&local_table_config()),
        )?;
        self.blocks.encode(ImageData::new(indexed, MIN_CODE_SIZE))?;
        self.frames_done += 1;
        debug!("frame {} of {} encoded", self.frames_done, self.frame_count);
        Ok(())
    }

    /// Finish the animation.
    ///
    /// Appends the trailer and yields the completed buffer.  Fails
    /// if the submitted frames do not cover the configured count.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        match self.state {
            State::Ready | State::Encoding => (),
            State::Finished | State::Aborted => return Err(Error::SessionClosed),
        }
        if self.frames_done != self.frame_count {
            return Err(Error::FrameCountMismatch {
                expected: self.frame_count,
                got: self.frames_done,
            });
        }
        if self.palette.is_none() {
            // zero-frame session: keep the file well formed
            self.blocks
                .encode(GlobalColorTable::with_colors(&gray_ramp()))?;
            self.blocks
                .encode(Application::with_loop_count(self.loop_count))?;
        }
        self.blocks.encode(Trailer::default())?;
        self.state = State::Finished;
        Ok(self.blocks.take())
    }

    /// Abort the session.
    ///
    /// No further writes occur; the partial buffer is yielded so
    /// the caller can inspect or discard it.
    pub fn abort(&mut self) -> Vec<u8> {
        self.state = State::Aborted;
        self.blocks.take()
    }
}

/// Configuration for the 256-entry global color table
fn global_table_config() -> ColorTableConfig {
    ColorTableConfig::new(
        ColorTableExistence::Present,
        ColorTableOrdering::NotSorted,
        256,
    )
}

/// Configuration for the (absent) local color tables
fn local_table_config() -> ColorTableConfig {
    ColorTableConfig::new(
        ColorTableExistence::Absent,
        ColorTableOrdering::NotSorted,
        256,
    )
}

/// Grayscale ramp used when no palette was learned
fn gray_ramp() -> Vec<u8> {
    let mut colors = Vec::with_capacity(768);
    for i in 0..=255u8 {
        colors.push(i);
        colors.push(i);
        colors.push(i);
    }
    colors
}
