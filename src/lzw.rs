// lzw.rs
//
//! Lempel-Ziv-Welch compression for GIF image data
use crate::error::{Error, Result};
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }
}

/// Code type
type Code = u16;

/// Hash table slots; prime, with headroom over the maximum number
/// of live codes so probe chains stay short
const TABLE_SIZE: usize = 5003;

/// String table mapping (prefix code, byte) pairs to codes
///
/// Capacity is the format's hard ceiling, never resized.
struct Table {
    /// Packed `(byte << 12) | prefix` keys, -1 when empty
    keys: Vec<i32>,
    /// Code assigned to each occupied slot
    codes: Vec<Code>,
    /// Minimum code bits
    min_code_bits: u8,
    /// Next code to assign
    next_code: Code,
}

impl Table {
    /// Create a new string table
    fn new(min_code_bits: u8) -> Self {
        let mut table = Table {
            keys: vec![-1; TABLE_SIZE],
            codes: vec![0; TABLE_SIZE],
            min_code_bits,
            next_code: 0,
        };
        table.reset();
        table
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.next_code
    }

    /// Reset the table to only the reserved codes
    fn reset(&mut self) {
        for key in self.keys.iter_mut() {
            *key = -1;
        }
        self.next_code = self.end_code() + 1;
    }

    /// Check whether every code has been assigned
    fn is_full(&self) -> bool {
        self.next_code >= Bits::MAX.entries()
    }

    /// Find the code for (prefix, byte), inserting on a miss.
    ///
    /// Returns the existing code on a hit.  On a miss the pair is
    /// assigned the next code and `None` is returned; a full table
    /// also returns `None`, without inserting.
    fn search_insert(&mut self, prefix: Code, byte: u8) -> Option<Code> {
        let key = (i32::from(byte) << 12) | i32::from(prefix);
        let mut slot = ((usize::from(byte) << 4) ^ usize::from(prefix)) % TABLE_SIZE;
        while self.keys[slot] >= 0 {
            if self.keys[slot] == key {
                return Some(self.codes[slot]);
            }
            slot += 1;
            if slot == TABLE_SIZE {
                slot = 0;
            }
        }
        if !self.is_full() {
            self.keys[slot] = key;
            self.codes[slot] = self.next_code;
            self.next_code += 1;
        }
        None
    }
}

/// LZW Data Compressor
pub struct Compressor {
    /// String table
    table: Table,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Current code accumulator
    code: u32,
    /// Number of bits in current code
    n_bits: u8,
}

impl Compressor {
    /// Create a new compressor
    pub fn new(min_code_bits: u8) -> Self {
        let min_code_bits = min_code_bits.max(2);
        let table = Table::new(min_code_bits);
        let code_bits = Bits::from(min_code_bits + 1);
        Compressor {
            table,
            min_code_bits,
            code_bits,
            code: 0,
            n_bits: 0,
        }
    }

    /// Pack a code into a buffer, least significant bits first
    fn pack(&mut self, code: Code, buffer: &mut Vec<u8>) {
        self.code |= u32::from(code) << self.n_bits;
        self.n_bits += u8::from(self.code_bits);
        while self.n_bits >= 8 {
            buffer.push(self.code as u8);
            self.code >>= 8;
            self.n_bits -= 8;
        }
    }

    /// Flush a final partial byte, padding the high bits with zero
    fn flush(&mut self, buffer: &mut Vec<u8>) {
        if self.n_bits > 0 {
            buffer.push(self.code as u8);
            self.code = 0;
            self.n_bits = 0;
        }
    }

    /// Grow the code width once the next code no longer fits
    fn grow(&mut self) {
        if self.table.next_code() > self.code_bits.entries() {
            self.code_bits += 1;
        }
    }

    /// Compress a byte buffer of color indices.
    ///
    /// Appends the full code stream to `buffer`: clear code, data
    /// codes, end code, with the last partial byte padded.
    pub fn compress(&mut self, bytes: &[u8], buffer: &mut Vec<u8>) -> Result<()> {
        self.pack(self.table.clear_code(), buffer);
        let mut bytes = bytes.iter().copied();
        let mut ent = match bytes.next() {
            Some(byte) => Code::from(byte),
            None => {
                self.pack(self.table.end_code(), buffer);
                self.flush(buffer);
                return Ok(());
            }
        };
        for byte in bytes {
            if let Some(code) = self.table.search_insert(ent, byte) {
                ent = code;
                continue;
            }
            self.pack(ent, buffer);
            ent = Code::from(byte);
            if self.table.is_full() {
                // reset must land before the table can overflow
                self.pack(self.table.clear_code(), buffer);
                self.table.reset();
                self.code_bits = Bits::from(self.min_code_bits + 1);
            } else {
                self.grow();
            }
            if self.table.next_code() > Bits::MAX.entries() {
                return Err(Error::LzwTableOverflow);
            }
        }
        self.pack(ent, buffer);
        self.pack(self.table.end_code(), buffer);
        self.flush(buffer);
        Ok(())
    }
}
