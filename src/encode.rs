// encode.rs
//
//! Block encoding for the GIF byte layout
use crate::block::*;
use crate::error::Result;
use crate::lzw::Compressor;
use std::io::{self, Write};

/// Low-level block encoder.
///
/// Formats [Block](block/enum.Block.html)s to a writer, one after
/// another; callers are responsible for the block order.
pub struct BlockEnc<W: Write> {
    /// Writer for output data
    writer: W,
}

impl<W: Write> BlockEnc<W> {
    /// Create a new block encoder
    pub fn new(writer: W) -> Self {
        BlockEnc { writer }
    }

    /// Encode one block
    pub fn encode<B: Into<Block>>(&mut self, block: B) -> Result<()> {
        use crate::block::Block::*;
        let w = &mut self.writer;
        match block.into() {
            Header(b) => b.format(w),
            LogicalScreenDesc(b) => b.format(w),
            GlobalColorTable(b) => b.format(w),
            GraphicControl(b) => b.format(w),
            Application(b) => b.format(w),
            ImageDesc(b) => b.format(w),
            ImageData(b) => b.format(w),
            Trailer(b) => b.format(w),
        }
    }

    /// Convert back into the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl BlockEnc<Vec<u8>> {
    /// Take the bytes written so far
    pub(crate) fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.writer)
    }
}

impl Header {
    /// Format the block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(b"GIF")?;
        w.write_all(&self.version())?;
        Ok(())
    }
}

impl LogicalScreenDesc {
    /// Format the block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut buf = Vec::with_capacity(7);
        let width = self.screen_width();
        buf.push(width as u8);
        buf.push((width >> 8) as u8);
        let height = self.screen_height();
        buf.push(height as u8);
        buf.push((height >> 8) as u8);
        buf.push(self.flags());
        buf.push(self.background_color_idx());
        buf.push(self.pixel_aspect_ratio());
        w.write_all(&buf)?;
        Ok(())
    }
}

impl GlobalColorTable {
    /// Format the block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(self.colors())?;
        Ok(())
    }
}

impl GraphicControl {
    /// Format the block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        let mut buf = Vec::with_capacity(7);
        buf.push(ExtensionCode::GraphicControl_.into());
        buf.push(4); // block size
        buf.push(self.flags());
        let delay = self.delay_time_cs();
        buf.push(delay as u8);
        buf.push((delay >> 8) as u8);
        buf.push(self.transparent_color_idx());
        buf.push(0); // block terminator
        w.write_all(&buf)?;
        Ok(())
    }
}

impl Application {
    /// Format the block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::Application_.into()])?;
        for c in self.app_data() {
            assert!(c.len() < 256);
            let len = c.len() as u8;
            w.write_all(&[len])?; // block size
            w.write_all(c)?;
        }
        w.write_all(&[0])?; // block terminator
        Ok(())
    }
}

impl ImageDesc {
    /// Format the block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::ImageDesc_.signature())?;
        let mut buf = Vec::with_capacity(9);
        let left = self.left();
        buf.push(left as u8);
        buf.push((left >> 8) as u8);
        let top = self.top();
        buf.push(top as u8);
        buf.push((top >> 8) as u8);
        let width = self.width();
        buf.push(width as u8);
        buf.push((width >> 8) as u8);
        let height = self.height();
        buf.push(height as u8);
        buf.push((height >> 8) as u8);
        buf.push(self.flags());
        w.write_all(&buf)?;
        Ok(())
    }
}

impl ImageData {
    /// Format the block: minimum code size, compressed data in
    /// length-prefixed sub-blocks, then a zero-length terminator
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[self.min_code_size()])?;
        let mut compressed = Vec::with_capacity(self.data().len() / 2 + 16);
        let mut compressor = Compressor::new(self.min_code_size());
        compressor.compress(self.data(), &mut compressed)?;
        let mut bw = BlockWriter::new(w);
        bw.write_all(&compressed)?;
        bw.flush()?;
        w.write_all(&[0])?; // block terminator
        Ok(())
    }
}

impl Trailer {
    /// Format the block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Trailer_.signature())?;
        Ok(())
    }
}

/// Writer framing data into sub-blocks of at most 255 bytes
struct BlockWriter<'a, W: Write> {
    /// Inner writer
    writer: &'a mut W,
    /// Sub-block accumulator
    buf: Vec<u8>,
}

impl<'a, W: Write> BlockWriter<'a, W> {
    /// Create a new block writer
    fn new(writer: &'a mut W) -> Self {
        let buf = Vec::with_capacity(256);
        BlockWriter { writer, buf }
    }
}

impl<'a, W: Write> Write for BlockWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = 0xFF - self.buf.len();
        let consumed = remaining.min(buf.len());
        self.buf.extend_from_slice(&buf[..consumed]);
        if self.buf.len() == 0xFF {
            self.writer.write_all(&[0xFF])?;
            self.writer.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(consumed)
    }

    fn flush(&mut self) -> io::Result<()> {
        let len = self.buf.len();
        if len > 0 {
            self.writer.write_all(&[len as u8])?;
            self.writer.write_all(&self.buf[..len])?;
            self.buf.clear();
        }
        Ok(())
    }
}
