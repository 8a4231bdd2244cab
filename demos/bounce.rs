// bounce.rs
use gifloom::Encoder;
use pix::rgb::SRgba8;
use pix::Raster;
use std::error::Error;
use std::fs;

const SIZE: u32 = 64;
const FRAMES: u32 = 24;

/// Render one frame of a bouncing ball
fn render(frame: u32) -> Raster<SRgba8> {
    let t = frame as f32 / FRAMES as f32;
    let cx = SIZE as f32 / 2.0;
    let cy = 10.0 + (t * std::f32::consts::PI * 2.0).sin().abs() * (SIZE as f32 - 24.0);
    let mut buf = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy < 64.0 {
                buf.extend_from_slice(&[255, 64, 32, 255]);
            } else {
                let sky = 200 - (y * 2) as u8;
                buf.extend_from_slice(&[32, 48, sky, 255]);
            }
        }
    }
    Raster::with_u8_buffer(SIZE, SIZE, buf)
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut enc = Encoder::new(SIZE, SIZE, FRAMES, 40)?
        .with_loop_count(0)
        .with_sample_factor(5);
    for frame in 0..FRAMES {
        enc.frame(frame, &render(frame))?;
    }
    fs::write("bounce.gif", enc.finish()?)?;
    Ok(())
}
