// common/mod.rs
//
//! Minimal GIF reader used to verify encoder output in tests.
//!
//! Panics with a description on any malformed byte, so every test
//! going through [parse] also checks the container framing.

/// Parsed GIF file
pub struct Gif {
    /// Screen width
    pub width: u16,
    /// Screen height
    pub height: u16,
    /// Global color table (RGB triples)
    pub global_colors: Vec<u8>,
    /// Loop count from the NETSCAPE extension
    pub loop_count: Option<u16>,
    /// Decoded frames, in stream order
    pub frames: Vec<Frame>,
    /// Whether the trailer byte was present
    pub trailer: bool,
}

/// One parsed frame
pub struct Frame {
    /// Delay in centiseconds
    pub delay_cs: u16,
    /// Frame width
    pub width: u16,
    /// Frame height
    pub height: u16,
    /// Decompressed palette indices, one per pixel
    pub indexed: Vec<u8>,
}

impl Gif {
    /// Smallest L1 distance from any global color to an RGB triple
    pub fn nearest_global_distance(&self, rgb: [u8; 3]) -> i32 {
        self.global_colors
            .chunks(3)
            .map(|c| {
                (i32::from(c[0]) - i32::from(rgb[0])).abs()
                    + (i32::from(c[1]) - i32::from(rgb[1])).abs()
                    + (i32::from(c[2]) - i32::from(rgb[2])).abs()
            })
            .min()
            .expect("empty global color table")
    }
}

/// Parse an encoded GIF, tolerating a missing trailer (aborted
/// sessions produce complete blocks with no trailer)
pub fn parse(bytes: &[u8]) -> Gif {
    let mut pos = 0;
    assert_eq!(&bytes[..6], b"GIF89a", "bad signature");
    pos += 6;
    let width = le16(bytes, pos);
    let height = le16(bytes, pos + 2);
    let flags = bytes[pos + 4];
    assert_ne!(flags & 0x80, 0, "global color table absent");
    let table_len = 2usize << (flags & 0x07);
    pos += 7;
    let global_colors = bytes[pos..pos + table_len * 3].to_vec();
    pos += table_len * 3;
    let mut loop_count = None;
    let mut delay_cs = 0;
    let mut frames = Vec::new();
    let mut trailer = false;
    while pos < bytes.len() {
        match bytes[pos] {
            0x21 => {
                pos += 1;
                match bytes[pos] {
                    0xF9 => {
                        assert_eq!(bytes[pos + 1], 4, "bad graphic control size");
                        delay_cs = le16(bytes, pos + 3);
                        assert_eq!(bytes[pos + 6], 0, "missing terminator");
                        pos += 7;
                    }
                    0xFF => {
                        assert_eq!(bytes[pos + 1], 11, "bad application size");
                        let app_id = &bytes[pos + 2..pos + 13];
                        pos += 13;
                        while bytes[pos] != 0 {
                            let len = bytes[pos] as usize;
                            let data = &bytes[pos + 1..pos + 1 + len];
                            if app_id == b"NETSCAPE2.0" && len == 3 && data[0] == 1 {
                                loop_count = Some(
                                    u16::from(data[1]) | (u16::from(data[2]) << 8),
                                );
                            }
                            pos += 1 + len;
                        }
                        pos += 1;
                    }
                    label => panic!("unexpected extension label {:#04x}", label),
                }
            }
            0x2C => {
                pos += 1;
                let left = le16(bytes, pos);
                let top = le16(bytes, pos + 2);
                assert_eq!((left, top), (0, 0), "frame not at origin");
                let fw = le16(bytes, pos + 4);
                let fh = le16(bytes, pos + 6);
                let fflags = bytes[pos + 8];
                assert_eq!(fflags & 0x80, 0, "unexpected local color table");
                assert_eq!(fflags & 0x40, 0, "unexpected interlacing");
                pos += 9;
                let min_code_bits = bytes[pos];
                pos += 1;
                let mut data = Vec::new();
                loop {
                    let len = bytes[pos] as usize;
                    pos += 1;
                    if len == 0 {
                        break;
                    }
                    assert!(pos + len <= bytes.len(), "truncated sub-block");
                    data.extend_from_slice(&bytes[pos..pos + len]);
                    pos += len;
                }
                let indexed = lzw_decode(&data, min_code_bits);
                assert_eq!(
                    indexed.len(),
                    usize::from(fw) * usize::from(fh),
                    "frame pixel count"
                );
                frames.push(Frame {
                    delay_cs,
                    width: fw,
                    height: fh,
                    indexed,
                });
            }
            0x3B => {
                trailer = true;
                pos += 1;
                assert_eq!(pos, bytes.len(), "data after trailer");
            }
            b => panic!("unexpected block introducer {:#04x}", b),
        }
    }
    Gif {
        width,
        height,
        global_colors,
        loop_count,
        frames,
        trailer,
    }
}

/// Read a little-endian u16
fn le16(bytes: &[u8], pos: usize) -> u16 {
    u16::from(bytes[pos]) | (u16::from(bytes[pos + 1]) << 8)
}

/// Decode an LZW code stream back to palette indices
fn lzw_decode(data: &[u8], min_code_bits: u8) -> Vec<u8> {
    let clear = 1u16 << min_code_bits;
    let end = clear + 1;
    let mut width = min_code_bits + 1;
    let mut acc = 0u32;
    let mut n_bits = 0u8;
    let mut pos = 0;
    let mut dict: Vec<Vec<u8>> = Vec::new();
    let mut out = Vec::new();
    let mut prev: Option<Vec<u8>> = None;
    loop {
        while n_bits < width {
            assert!(pos < data.len(), "truncated code stream");
            acc |= u32::from(data[pos]) << n_bits;
            pos += 1;
            n_bits += 8;
        }
        let code = (acc & ((1 << width) - 1)) as u16;
        acc >>= width;
        n_bits -= width;
        if code == clear {
            dict.clear();
            for b in 0..=end {
                dict.push(if b < clear { vec![b as u8] } else { vec![] });
            }
            width = min_code_bits + 1;
            prev = None;
            continue;
        }
        if code == end {
            break;
        }
        let entry = if (code as usize) < dict.len() {
            dict[code as usize].clone()
        } else {
            assert_eq!(code as usize, dict.len(), "code out of range");
            let p = prev.clone().expect("code before any data");
            let mut e = p.clone();
            e.push(p[0]);
            e
        };
        out.extend_from_slice(&entry);
        if let Some(p) = prev {
            let mut n = p;
            n.push(entry[0]);
            dict.push(n);
            if dict.len() == (1usize << width) && width < 12 {
                width += 1;
            }
        }
        prev = Some(entry);
    }
    out
}
