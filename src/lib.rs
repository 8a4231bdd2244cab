// lib.rs      gifloom crate.
//
//! Animated GIF encoder.
//!
//! RGBA frames go in one at a time; one GIF89a byte stream comes
//! out, index-encoded through a palette learned from the first
//! frame and compressed with LZW.
#[macro_use]
extern crate log;

pub mod block;
mod encode;
mod error;
mod lzw;
mod quant;
mod session;
pub mod worker;

pub use crate::encode::BlockEnc;
pub use crate::error::{Error, Result};
pub use crate::quant::Palette;
pub use crate::session::Encoder;
