// worker.rs
//
//! Worker actor for off-thread encoding
//!
//! The encoding session runs on a dedicated thread reached only
//! through typed request/response messages.  Pixel buffers move
//! through the channel, so the sender gives up access once a frame
//! is submitted; nothing mutable is shared across the boundary.
use crate::error::{Error, Result};
use crate::session::Encoder;
use pix::rgb::SRgba8;
use pix::Raster;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

/// Request messages accepted by the worker
#[derive(Debug)]
pub enum Request {
    /// Start an encoding session, replacing any active one
    Init {
        /// Screen width in pixels
        width: u32,
        /// Screen height in pixels
        height: u32,
        /// Number of frames that will be submitted
        frame_count: u32,
        /// Per-frame delay in milliseconds
        frame_delay_ms: u32,
        /// Loop count (zero loops forever)
        loop_count: u16,
        /// Palette sampling factor (1..=30)
        sample_factor: u8,
    },
    /// Submit one frame of RGBA pixels (width × height × 4 bytes)
    Frame {
        /// Frame index, starting at zero
        index: u32,
        /// RGBA pixel buffer, handed over to the worker
        pixels: Vec<u8>,
    },
    /// Finish the animation
    Finish,
    /// Cancel the session, discarding the partial buffer
    Abort,
}

/// Response messages emitted by the worker
#[derive(Debug)]
pub enum Response {
    /// Progress after each frame
    Progress {
        /// Percent of frames encoded, rounded
        percent: u8,
    },
    /// The finished GIF
    Complete {
        /// Complete file bytes
        bytes: Vec<u8>,
    },
    /// Terminal session failure
    Error {
        /// Frame index that triggered the failure, if any
        frame: Option<u32>,
        /// Failure description
        message: String,
    },
}

/// Handle to an encoder worker thread
pub struct Worker {
    /// Request sender
    tx: Option<Sender<Request>>,
    /// Response receiver
    rx: Receiver<Response>,
    /// Worker thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn an encoder worker thread
    pub fn spawn() -> Self {
        let (tx, requests) = channel();
        let (responses, rx) = channel();
        let handle = thread::spawn(move || run(requests, &responses));
        Worker {
            tx: Some(tx),
            rx,
            handle: Some(handle),
        }
    }

    /// Send a request to the worker
    pub fn send(&self, request: Request) -> Result<()> {
        match &self.tx {
            Some(tx) => tx.send(request).map_err(|_| Error::SessionClosed),
            None => Err(Error::SessionClosed),
        }
    }

    /// Wait for the next response.
    ///
    /// Returns `None` once the worker has exited and every pending
    /// response has been taken.
    pub fn recv(&self) -> Option<Response> {
        self.rx.recv().ok()
    }

    /// Take a response without waiting
    pub fn try_recv(&self) -> Option<Response> {
        match self.rx.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // closing the request channel ends the worker loop
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Worker loop: a single-threaded actor over the request channel.
///
/// Cancellation is cooperative: an abort submitted while a frame is
/// encoding is seen once that frame's message completes, so frames
/// are never half-written.
fn run(requests: Receiver<Request>, responses: &Sender<Response>) {
    let mut encoder: Option<Encoder> = None;
    for request in requests {
        match request {
            Request::Init {
                width,
                height,
                frame_count,
                frame_delay_ms,
                loop_count,
                sample_factor,
            } => match Encoder::new(width, height, frame_count, frame_delay_ms) {
                Ok(enc) => {
                    encoder = Some(
                        enc.with_loop_count(loop_count)
                            .with_sample_factor(sample_factor),
                    );
                }
                Err(err) => {
                    encoder = None;
                    respond_error(responses, None, &err);
                }
            },
            Request::Frame { index, pixels } => {
                match frame_request(&mut encoder, index, pixels) {
                    Ok(percent) => {
                        let _ = responses.send(Response::Progress { percent });
                    }
                    Err(err) => {
                        // frame failures are terminal for the session
                        encoder = None;
                        respond_error(responses, Some(index), &err);
                    }
                }
            }
            Request::Finish => match encoder.take() {
                Some(mut enc) => match enc.finish() {
                    Ok(bytes) => {
                        let _ = responses.send(Response::Complete { bytes });
                    }
                    Err(err) => respond_error(responses, None, &err),
                },
                None => respond_error(responses, None, &Error::SessionClosed),
            },
            Request::Abort => {
                if let Some(mut enc) = encoder.take() {
                    enc.abort();
                }
            }
        }
    }
}

/// Encode one frame, returning the rounded progress percent.
///
/// The buffer length is validated before any codec work so a bad
/// frame never reaches the quantizer.
fn frame_request(encoder: &mut Option<Encoder>, index: u32, pixels: Vec<u8>) -> Result<u8> {
    let enc = match encoder.as_mut() {
        Some(enc) => enc,
        None => return Err(Error::SessionClosed),
    };
    let expected = usize::from(enc.width()) * usize::from(enc.height()) * 4;
    if pixels.len() != expected {
        return Err(Error::FrameSizeMismatch);
    }
    let raster = Raster::<SRgba8>::with_u8_buffer(
        u32::from(enc.width()),
        u32::from(enc.height()),
        pixels,
    );
    enc.frame(index, &raster)?;
    let percent =
        (f64::from(enc.frames_done()) * 100.0 / f64::from(enc.frame_count())).round();
    Ok(percent as u8)
}

/// Report a terminal session error
fn respond_error(responses: &Sender<Response>, frame: Option<u32>, err: &Error) {
    match frame {
        Some(frame) => warn!("encoding failed at frame {}: {}", frame, err),
        None => warn!("encoding failed: {}", err),
    }
    let _ = responses.send(Response::Error {
        frame,
        message: err.to_string(),
    });
}
