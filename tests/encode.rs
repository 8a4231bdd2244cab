// encode.rs
//
//! End-to-end encoding tests against a reference reader.
mod common;

use common::parse;
use gifloom::worker::{Request, Response, Worker};
use gifloom::{Encoder, Error};
use pix::rgb::SRgba8;
use pix::Raster;

fn solid_raster(width: u32, height: u32, rgb: [u8; 3]) -> Raster<SRgba8> {
    let mut buf = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        buf.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    Raster::with_u8_buffer(width, height, buf)
}

fn gradient_raster(width: u32, height: u32, phase: u32) -> Raster<SRgba8> {
    let mut buf = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            buf.push(((x * 8 + phase * 16) % 256) as u8);
            buf.push(((y * 8) % 256) as u8);
            buf.push((((x + y) * 4) % 256) as u8);
            buf.push(255);
        }
    }
    Raster::with_u8_buffer(width, height, buf)
}

#[test]
fn single_red_frame() {
    // scenario: one 2x2 all-red frame, factor 5, 100 ms, loop 0
    let mut enc = Encoder::new(2, 2, 1, 100)
        .unwrap()
        .with_sample_factor(5)
        .with_loop_count(0);
    enc.frame(0, &solid_raster(2, 2, [255, 0, 0])).unwrap();
    let gif = enc.finish().unwrap();
    assert!(gif.starts_with(b"GIF89a"));
    assert_eq!(*gif.last().unwrap(), 0x3B);
    let parsed = parse(&gif);
    assert_eq!((parsed.width, parsed.height), (2, 2));
    assert_eq!(parsed.global_colors.len(), 768);
    assert_eq!(parsed.loop_count, Some(0));
    assert_eq!(parsed.frames.len(), 1);
    assert_eq!(parsed.frames[0].delay_cs, 10);
    assert!(parsed.trailer);
    // all four pixels map to one color close to pure red
    let indexed = &parsed.frames[0].indexed;
    assert_eq!(indexed.len(), 4);
    assert!(indexed.iter().all(|i| *i == indexed[0]));
    let idx = usize::from(indexed[0]) * 3;
    let rgb = &parsed.global_colors[idx..idx + 3];
    let dist = (255 - i32::from(rgb[0])) + i32::from(rgb[1]) + i32::from(rgb[2]);
    assert!(dist <= 8, "red mapped to {:?}", rgb);
}

#[test]
fn alternating_frames() {
    // ten 50x50 frames alternating red and blue, factor 10
    let mut enc = Encoder::new(50, 50, 10, 50).unwrap().with_sample_factor(10);
    for i in 0..10 {
        let rgb = if i % 2 == 0 { [255, 0, 0] } else { [0, 0, 255] };
        enc.frame(i, &solid_raster(50, 50, rgb)).unwrap();
    }
    let gif = enc.finish().unwrap();
    let parsed = parse(&gif);
    assert_eq!(parsed.frames.len(), 10);
    for frame in &parsed.frames {
        assert_eq!((frame.width, frame.height), (50, 50));
        assert_eq!(frame.indexed.len(), 2500);
    }
    // the palette is learned from the first (red) frame
    assert!(parsed.nearest_global_distance([255, 0, 0]) <= 8);
}

#[test]
fn abort_after_three_frames() {
    // scenario: abort 3 frames into a 10 frame session
    let mut enc = Encoder::new(8, 8, 10, 40).unwrap();
    for i in 0..3 {
        enc.frame(i, &gradient_raster(8, 8, i)).unwrap();
    }
    let partial = enc.abort();
    let parsed = parse(&partial);
    assert_eq!(parsed.frames.len(), 3);
    assert!(!parsed.trailer);
    assert!(enc.finish().is_err());
}

#[test]
fn zero_area_frame_rejected() {
    // scenario: a 0x0 frame never reaches the quantizer
    assert!(matches!(
        Encoder::new(0, 0, 1, 100),
        Err(Error::InvalidDimensions)
    ));
    let worker = Worker::spawn();
    worker
        .send(Request::Init {
            width: 4,
            height: 4,
            frame_count: 1,
            frame_delay_ms: 100,
            loop_count: 0,
            sample_factor: 10,
        })
        .unwrap();
    worker
        .send(Request::Frame {
            index: 0,
            pixels: vec![], // zero pixels
        })
        .unwrap();
    match worker.recv().unwrap() {
        Response::Error { frame, .. } => assert_eq!(frame, Some(0)),
        r => panic!("unexpected response {:?}", r),
    }
}

#[test]
fn deterministic_bytes() {
    let encode = || {
        let mut enc = Encoder::new(32, 24, 4, 80).unwrap().with_sample_factor(3);
        for i in 0..4 {
            enc.frame(i, &gradient_raster(32, 24, i)).unwrap();
        }
        enc.finish().unwrap()
    };
    assert_eq!(encode(), encode());
}

#[test]
fn round_trip_gradient() {
    // every decoded index maps inside the 256-entry table and the
    // frame covers the full screen
    let mut enc = Encoder::new(64, 48, 2, 30).unwrap().with_sample_factor(1);
    enc.frame(0, &gradient_raster(64, 48, 0)).unwrap();
    enc.frame(1, &gradient_raster(64, 48, 7)).unwrap();
    let gif = enc.finish().unwrap();
    let parsed = parse(&gif);
    assert_eq!(parsed.global_colors.len(), 768);
    assert_eq!(parsed.frames.len(), 2);
    for frame in &parsed.frames {
        assert_eq!(frame.indexed.len(), 64 * 48);
    }
}

#[test]
fn large_frame_exercises_table_resets() {
    // enough high-variance pixels to fill the LZW table repeatedly
    let mut enc = Encoder::new(200, 200, 1, 100).unwrap().with_sample_factor(10);
    let mut buf = Vec::with_capacity(200 * 200 * 4);
    let mut seed = 0x9e37_79b9u32;
    for _ in 0..200 * 200 {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [r, g, b, _] = seed.to_le_bytes();
        buf.extend_from_slice(&[r, g, b, 255]);
    }
    enc.frame(0, &Raster::with_u8_buffer(200, 200, buf)).unwrap();
    let gif = enc.finish().unwrap();
    let parsed = parse(&gif);
    assert_eq!(parsed.frames[0].indexed.len(), 40_000);
}

#[test]
fn worker_end_to_end() {
    let worker = Worker::spawn();
    worker
        .send(Request::Init {
            width: 16,
            height: 16,
            frame_count: 3,
            frame_delay_ms: 100,
            loop_count: 2,
            sample_factor: 10,
        })
        .unwrap();
    for index in 0..3 {
        let mut pixels = Vec::with_capacity(16 * 16 * 4);
        for p in 0..16 * 16u32 {
            pixels.extend_from_slice(&[(p % 256) as u8, (index * 80) as u8, 0, 255]);
        }
        worker.send(Request::Frame { index, pixels }).unwrap();
    }
    worker.send(Request::Finish).unwrap();
    let mut percents = Vec::new();
    let bytes = loop {
        match worker.recv().expect("worker hung up") {
            Response::Progress { percent } => percents.push(percent),
            Response::Complete { bytes } => break bytes,
            Response::Error { frame, message } => {
                panic!("error at {:?}: {}", frame, message)
            }
        }
    };
    assert_eq!(percents, vec![33, 67, 100]);
    let parsed = parse(&bytes);
    assert_eq!(parsed.frames.len(), 3);
    assert_eq!(parsed.loop_count, Some(2));
    assert_eq!(parsed.frames[0].delay_cs, 10);
}
