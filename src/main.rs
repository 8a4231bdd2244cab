// main.rs      gifloom command
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifloom::Encoder;
use pix::rgb::SRgba8;
use pix::Raster;
use std::error::Error;
use std::fs;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    match create_app().get_matches().subcommand() {
        ("wrap", Some(matches)) => wrap(&mut out, matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifloom")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("Animated GIF encoder")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("wrap")
                .about("Wrap raw RGBA frames into an animated GIF")
                .arg(
                    Arg::with_name("width")
                        .long("width")
                        .takes_value(true)
                        .required(true)
                        .help("frame width in pixels"),
                )
                .arg(
                    Arg::with_name("height")
                        .long("height")
                        .takes_value(true)
                        .required(true)
                        .help("frame height in pixels"),
                )
                .arg(
                    Arg::with_name("delay")
                        .long("delay")
                        .takes_value(true)
                        .default_value("100")
                        .help("frame delay in milliseconds"),
                )
                .arg(
                    Arg::with_name("loops")
                        .long("loops")
                        .takes_value(true)
                        .default_value("0")
                        .help("loop count (0 loops forever)"),
                )
                .arg(
                    Arg::with_name("quality")
                        .long("quality")
                        .takes_value(true)
                        .default_value("10")
                        .help("palette sampling factor (1-30, lower is better)"),
                )
                .arg(
                    Arg::with_name("out")
                        .long("out")
                        .short("o")
                        .takes_value(true)
                        .required(true)
                        .help("output file"),
                )
                .arg(
                    Arg::with_name("frames")
                        .required(true)
                        .min_values(1)
                        .help("raw RGBA frame file(s), in order"),
                ),
        )
}

/// Get a required argument value
fn req<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

/// Wrap raw RGBA frame files into a GIF
fn wrap(out: &mut StandardStream, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White)).set_intense(true).set_bold(true);
    let width: u32 = req(matches, "width").parse()?;
    let height: u32 = req(matches, "height").parse()?;
    let delay: u32 = req(matches, "delay").parse()?;
    let loops: u16 = req(matches, "loops").parse()?;
    let quality: u8 = req(matches, "quality").parse()?;
    let path = req(matches, "out");
    let files: Vec<&str> = match matches.values_of("frames") {
        Some(v) => v.collect(),
        None => vec![],
    };
    let mut enc = Encoder::new(width, height, files.len() as u32, delay)?
        .with_loop_count(loops)
        .with_sample_factor(quality);
    for (i, file) in files.iter().enumerate() {
        let pixels = fs::read(file)?;
        if pixels.len() != (width * height * 4) as usize {
            out.set_color(&red)?;
            writeln!(
                out,
                "{}: expected {} bytes, found {}",
                file,
                width * height * 4,
                pixels.len()
            )?;
            out.reset()?;
            return Err(Box::new(gifloom::Error::FrameSizeMismatch));
        }
        let raster = Raster::<SRgba8>::with_u8_buffer(width, height, pixels);
        enc.frame(i as u32, &raster)?;
        out.set_color(&bold)?;
        write!(out, "\r{:3}%", enc.frames_done() * 100 / enc.frame_count())?;
        out.flush()?;
    }
    let gif = enc.finish()?;
    fs::write(path, &gif)?;
    out.set_color(&bold)?;
    writeln!(out, "\r{} ({} bytes)", path, gif.len())?;
    Ok(())
}
