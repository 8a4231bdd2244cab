// block.rs
//
//! GIF container blocks
//!
//! Every section of the output byte layout has a typed block here;
//! [BlockEnc](../struct.BlockEnc.html) formats them in order.

/// Color channels per palette entry
const CHANNELS: usize = 3;

/// Color table existence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableExistence {
    /// Not present
    Absent,
    /// Present
    Present,
}

/// Color table ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableOrdering {
    /// Not sorted
    NotSorted,
    /// Sorted by decreasing importance
    Sorted,
}

/// Color table configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    /// Existence of color table
    existence: ColorTableExistence,
    /// Ordering of color table
    ordering: ColorTableOrdering,
    /// Length of table (must be between 2...256)
    table_len: usize,
}

impl Default for ColorTableConfig {
    fn default() -> Self {
        let existence = ColorTableExistence::Absent;
        let ordering = ColorTableOrdering::NotSorted;
        let table_len = 2;
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }
}

impl ColorTableConfig {
    /// Create a new color table configuration
    pub fn new(
        existence: ColorTableExistence,
        ordering: ColorTableOrdering,
        table_len: u16,
    ) -> Self {
        let table_len = (table_len as usize).max(2).next_power_of_two().min(256);
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }

    /// Get the existence of the color table
    pub fn existence(&self) -> ColorTableExistence {
        self.existence
    }

    /// Get the length of the color table
    pub fn len(&self) -> usize {
        match self.existence {
            ColorTableExistence::Absent => 0,
            ColorTableExistence::Present => self.table_len,
        }
    }

    /// Check if the color table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of size bits for the packed flags
    pub(crate) fn len_bits(&self) -> u8 {
        let sz = self.table_len;
        for b in 0..7 {
            if (sz >> (b + 1)) == 1 {
                return b;
            }
        }
        7
    }

    /// Get the size of the color table in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * CHANNELS
    }
}

/// Method for disposing a frame before the next one is drawn
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// Replaced by the next frame
    NoAction,
    /// Kept in place
    Keep,
    /// Restored to background color
    Background,
    /// Restored to previous frame
    Previous,
    /// Reserved methods
    Reserved(u8),
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::NoAction
    }
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            _ => Reserved(n),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Block codes for the block signatures
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    /// Image descriptor
    ImageDesc_,
    /// Extension block
    Extension_,
    /// File trailer
    Trailer_,
}

impl BlockCode {
    /// Get the block signature
    pub fn signature(self) -> &'static [u8] {
        use self::BlockCode::*;
        match self {
            ImageDesc_ => b",", // (0x2C) Image separator
            Extension_ => b"!", // (0x21) Extension introducer
            Trailer_ => b";",   // (0x3B) GIF trailer
        }
    }
}

/// Extension codes for extension blocks
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    /// Graphic control extension
    GraphicControl_,
    /// Application extension
    Application_,
}

impl From<ExtensionCode> for u8 {
    fn from(t: ExtensionCode) -> Self {
        use self::ExtensionCode::*;
        match t {
            GraphicControl_ => 0xF9,
            Application_ => 0xFF,
        }
    }
}

/// Header block, always first
#[derive(Debug)]
pub struct Header {
    /// Format version
    version: [u8; 3],
}

impl Header {
    /// Create a header block with a given version
    pub fn with_version(version: [u8; 3]) -> Self {
        Header { version }
    }

    /// Get the version
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

impl Default for Header {
    fn default() -> Self {
        Header::with_version(*b"89a")
    }
}

/// Logical screen descriptor block
#[derive(Debug, Default)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    /// Index into the global color table
    background_color_idx: u8,
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Adjust the screen width
    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }

    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    /// Adjust the screen height
    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    /// Get the flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Adjust the color table configuration
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        let mut flags = tbl.len_bits() & Self::COLOR_TABLE_SIZE;
        flags |= (flags << 4) & Self::COLOR_RESOLUTION;
        if tbl.existence == ColorTableExistence::Present {
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        if tbl.ordering == ColorTableOrdering::Sorted {
            flags |= Self::COLOR_TABLE_ORDERING;
        }
        self.flags = flags;
        self
    }

    /// Adjust the background color index
    pub fn with_background_color_idx(mut self, background_color_idx: u8) -> Self {
        self.background_color_idx = background_color_idx;
        self
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    /// Get the pixel aspect ratio
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Global color table block, after the logical screen descriptor
#[derive(Debug)]
pub struct GlobalColorTable {
    colors: Vec<u8>,
}

impl GlobalColorTable {
    /// Create a global color table block
    pub fn with_colors(colors: &[u8]) -> Self {
        assert_eq!(colors.len() / CHANNELS * CHANNELS, colors.len());
        let colors = colors.to_vec();
        GlobalColorTable { colors }
    }

    /// Get the table length in bytes
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get the color data
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
}

/// Graphic control extension block, before each frame's image
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    /// Delay in centiseconds (hundredths of a second)
    delay_time_cs: u16,
    transparent_color_idx: u8,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    /// Get the flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }

    /// Adjust the disposal method
    pub fn set_disposal_method(&mut self, disposal_method: DisposalMethod) {
        let d: u8 = disposal_method.into();
        self.flags = (self.flags & !Self::DISPOSAL_METHOD) | (d << 2);
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Adjust the delay time in centiseconds
    pub fn set_delay_time_cs(&mut self, delay_time_cs: u16) {
        self.delay_time_cs = delay_time_cs;
    }

    /// Get the transparent color, if set
    pub fn transparent_color(&self) -> Option<u8> {
        if self.flags & Self::TRANSPARENT_COLOR != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }

    /// Get the transparent color index
    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }
}

/// Application extension block; only the animation looping
/// extension is written
#[derive(Debug, Default)]
pub struct Application {
    /// Sequence of sub-blocks
    app_data: Vec<Vec<u8>>,
}

impl Application {
    /// Create an application block for a loop count (zero means
    /// loop forever)
    pub fn with_loop_count(loop_count: u16) -> Self {
        let mut app_data = vec![];
        app_data.push(b"NETSCAPE2.0".to_vec());
        let mut v = vec![1];
        v.push(loop_count as u8);
        v.push((loop_count >> 8) as u8);
        app_data.push(v);
        Application { app_data }
    }

    /// Get the application data sub-blocks
    pub fn app_data(&self) -> &Vec<Vec<u8>> {
        &self.app_data
    }

    /// Get the loop count, if this is a looping extension
    pub fn loop_count(&self) -> Option<u16> {
        // NOTE: this block must follow immediately after
        //       GlobalColorTable.
        let d = &self.app_data;
        let exists = d.len() == 2 &&            // 2 sub-blocks
                     d[0] == b"NETSCAPE2.0" &&  // app ID / auth code
                     d[1].len() == 3 &&         // app data sub-block length
                     d[1][0] == 1; // sub-block ID
        if exists {
            let c = u16::from(d[1][1]) | (u16::from(d[1][2]) << 8);
            Some(c)
        } else {
            None
        }
    }
}

/// Image descriptor block, before each frame's image data
#[derive(Debug, Default)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    const RESERVED: u8 = 0b0001_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Get the left position
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Get the top position
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Adjust the width
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Get the width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Adjust the height
    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    /// Get the height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get the flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Adjust the color table configuration
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        let mut flags = self.flags & (Self::INTERLACED | Self::RESERVED);
        flags |= tbl.len_bits() & Self::COLOR_TABLE_SIZE;
        if tbl.existence == ColorTableExistence::Present {
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        if tbl.ordering == ColorTableOrdering::Sorted {
            flags |= Self::COLOR_TABLE_ORDERING;
        }
        self.flags = flags;
        self
    }

    /// Get the image size in pixels
    pub fn image_sz(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Image data block, holding one frame of palette indices
#[derive(Debug)]
pub struct ImageData {
    /// Palette indices, one per pixel
    data: Vec<u8>,
    /// Minimum LZW code size
    min_code_size: u8,
}

impl ImageData {
    /// Create an image data block
    pub fn new(data: Vec<u8>, min_code_size: u8) -> Self {
        ImageData {
            data,
            min_code_size,
        }
    }

    /// Get the minimum LZW code size
    pub fn min_code_size(&self) -> u8 {
        self.min_code_size.max(2) // must be >= 2
    }

    /// Get the palette index data
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Trailer block, always last
#[derive(Debug, Default)]
pub struct Trailer {}

/// A block of the output byte layout
#[derive(Debug)]
pub enum Block {
    /// Header block
    Header(Header),
    /// Logical screen descriptor block
    LogicalScreenDesc(LogicalScreenDesc),
    /// Global color table block
    GlobalColorTable(GlobalColorTable),
    /// Graphic control extension block
    GraphicControl(GraphicControl),
    /// Application extension block
    Application(Application),
    /// Image descriptor block
    ImageDesc(ImageDesc),
    /// Image data block
    ImageData(ImageData),
    /// Trailer block
    Trailer(Trailer),
}

impl From<Header> for Block {
    fn from(b: Header) -> Self {
        Block::Header(b)
    }
}

impl From<LogicalScreenDesc> for Block {
    fn from(b: LogicalScreenDesc) -> Self {
        Block::LogicalScreenDesc(b)
    }
}

impl From<GlobalColorTable> for Block {
    fn from(b: GlobalColorTable) -> Self {
        Block::GlobalColorTable(b)
    }
}

impl From<GraphicControl> for Block {
    fn from(b: GraphicControl) -> Self {
        Block::GraphicControl(b)
    }
}

impl From<Application> for Block {
    fn from(b: Application) -> Self {
        Block::Application(b)
    }
}

impl From<ImageDesc> for Block {
    fn from(b: ImageDesc) -> Self {
        Block::ImageDesc(b)
    }
}

impl From<ImageData> for Block {
    fn from(b: ImageData) -> Self {
        Block::ImageData(b)
    }
}

impl From<Trailer> for Block {
    fn from(b: Trailer) -> Self {
        Block::Trailer(b)
    }
}
