//! progress-ring - Render circular progress rings to PNG from the command line.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use lexopt::prelude::*;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

use progress_ring::{Canvas, Density, Easing, FnCallbacks, Rgba, ThumbScale, rgb, ring};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const CANVAS_COLOR: Rgba = rgb(255, 255, 255);

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("progress-ring: {e}");
            ExitCode::from(100)
        }
    }
}

fn run() -> Result<i32, Box<dyn std::error::Error>> {
    let mut parser = lexopt::Parser::from_env();

    let mut attrs = ring();
    let mut mode = Mode::Still;
    let mut out: Option<PathBuf> = None;
    let mut size: Option<u32> = None;
    let mut scale = 1.0f32;
    let mut progress = 65.0f32;
    let mut duration_ms = 1000u64;
    let mut fps = 30u32;
    let mut easing = Easing::Decelerate;
    let mut segments: Option<String> = None;
    let mut gradient: Option<String> = None;
    let mut gradient_positions: Option<String> = None;
    let mut gradient_wrap = true;

    while let Some(arg) = parser.next()? {
        match arg {
            Long("help") | Short('h') => {
                print_help();
                return Ok(0);
            }
            Long("version") => {
                println!("progress-ring {VERSION}");
                return Ok(0);
            }

            // Render modes
            Long("still") => mode = Mode::Still,
            Long("animate") => mode = Mode::Animate,
            Long("segments") => segments = Some(parser.value()?.string()?),

            // Ring look
            Long("max") => attrs = attrs.max(parser.value()?.parse()?),
            Long("starting-angle") => attrs = attrs.starting_angle(parser.value()?.parse()?),
            Long("thickness") => attrs = attrs.thickness(parser.value()?.parse()?),
            Long("color") => attrs = attrs.color(parse_color(&parser.value()?.string()?)?),
            Long("background") => {
                attrs = attrs.background_color(parse_color(&parser.value()?.string()?)?)
            }
            Long("gradient") => gradient = Some(parser.value()?.string()?),
            Long("gradient-positions") => gradient_positions = Some(parser.value()?.string()?),
            Long("gradient-no-wrap") => gradient_wrap = false,
            Long("rounded") => attrs = attrs.rounded(true),
            Long("reverse") => attrs = attrs.reverse(true),
            Long("no-shadow") => attrs = attrs.shadow(false),
            Long("no-background-alpha") => attrs = attrs.background_alpha(false),
            Long("thumb") => attrs = attrs.thumb(true),
            Long("thumb-scale") => {
                attrs = attrs.thumb_scale(parse_thumb_scale(&parser.value()?.string()?)?)
            }
            Long("thumb-size") => attrs = attrs.thumb_size(parser.value()?.parse()?),
            Long("thumb-rate") => attrs = attrs.thumb_size_rate(parser.value()?.parse()?),

            // Output
            Long("out") => out = Some(PathBuf::from(parser.value()?)),
            Long("size") => size = Some(parser.value()?.parse()?),
            Long("scale") => scale = parser.value()?.parse()?,

            // Animation
            Long("progress") => progress = parser.value()?.parse()?,
            Long("duration-ms") => duration_ms = parser.value()?.parse()?,
            Long("fps") => fps = parser.value()?.parse()?,
            Long("easing") => easing = parse_easing(&parser.value()?.string()?)?,

            // Positional argument is the progress value
            Value(val) => progress = val.parse()?,

            _ => return Err(arg.unexpected().into()),
        }
    }

    if let Some(list) = &gradient {
        let colors = parse_color_list(list)?;
        let positions = match &gradient_positions {
            Some(p) => Some(parse_float_list(p)?),
            None => None,
        };
        attrs = attrs.progress_colors(&colors, positions.as_deref(), gradient_wrap)?;
    }

    let mut gauge = attrs.build(Density(scale));
    let side = size.unwrap_or(gauge.default_size() as u32).max(1);
    gauge.layout(side as f32, side as f32);
    gauge.set_interpolator(easing);

    let mut canvas = Canvas::new(side, side);

    if let Some(list) = &segments {
        let (values, colors) = parse_segments(list)?;
        gauge.set_segments(&values, &colors)?;
        let out = out.unwrap_or_else(|| PathBuf::from("ring.png"));
        render_frame(&mut gauge, &mut canvas, &out)?;
        info!(path = %out.display(), "wrote multi-arc still");
        return Ok(0);
    }

    match mode {
        Mode::Still => {
            gauge.set_progress(progress);
            let out = out.unwrap_or_else(|| PathBuf::from("ring.png"));
            render_frame(&mut gauge, &mut canvas, &out)?;
            info!(path = %out.display(), progress, "wrote ring still");
        }
        Mode::Animate => {
            let dir = out.unwrap_or_else(|| PathBuf::from("frames"));
            std::fs::create_dir_all(&dir)?;
            gauge.set_callbacks(FnCallbacks::new(
                |value| trace!(value, "progress tick"),
                |value| debug!(value, "animation finished"),
            ));

            let duration = Duration::from_millis(duration_ms);
            gauge.set_progress_animated(progress, duration);
            let started = Instant::now();
            let step = Duration::from_secs_f32(1.0 / fps.max(1) as f32);
            let frames = (duration_ms as f32 / 1000.0 * fps as f32).ceil() as u32 + 1;
            for i in 0..frames {
                gauge.tick(started + step * i);
                render_frame(&mut gauge, &mut canvas, &dir.join(format!("frame_{i:03}.png")))?;
            }
            info!(frames, path = %dir.display(), "wrote animation frames");
        }
    }
    Ok(0)
}

/// Repaints the canvas if the ring changed since the last frame, then writes
/// it out.
fn render_frame(
    gauge: &mut progress_ring::ProgressRing,
    canvas: &mut Canvas,
    path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if gauge.take_redraw_request() {
        canvas.fill(CANVAS_COLOR);
        gauge.draw(canvas);
    }
    canvas.save_png(path)?;
    Ok(())
}

fn parse_color(hex: &str) -> Result<Rgba, String> {
    let hex = hex.trim_start_matches('#');
    let value =
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid color {hex:?}: {e}"))?;
    match hex.len() {
        6 => Ok(rgb(
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        )),
        8 => Ok(Rgba::new(
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        )),
        _ => Err(format!("color must be RRGGBB or RRGGBBAA, got {hex:?}")),
    }
}

/// Comma-separated color list, e.g. `ff0000,ffa500,ff0000`.
fn parse_color_list(list: &str) -> Result<Vec<Rgba>, String> {
    list.split(',').map(|c| parse_color(c.trim())).collect()
}

/// Comma-separated fractions, e.g. `0.0,0.3,1.0`.
fn parse_float_list(list: &str) -> Result<Vec<f32>, std::num::ParseFloatError> {
    list.split(',').map(|f| f.trim().parse()).collect()
}

/// Comma-separated `VALUE:RRGGBB` pairs, e.g. `25:ff0000,10:00ff00`. Colors
/// may be omitted from the tail; those arcs render transparent.
fn parse_segments(list: &str) -> Result<(Vec<f32>, Vec<Rgba>), Box<dyn std::error::Error>> {
    let mut values = Vec::new();
    let mut colors = Vec::new();
    for (i, entry) in list.split(',').enumerate() {
        let entry = entry.trim();
        match entry.split_once(':') {
            Some((value, color)) => {
                values.push(value.parse::<f32>()?);
                if colors.len() == i {
                    colors.push(parse_color(color)?);
                } else {
                    return Err(format!("segment {entry:?} has a color after a colorless one").into());
                }
            }
            None => values.push(entry.parse::<f32>()?),
        }
    }
    Ok((values, colors))
}

fn parse_thumb_scale(name: &str) -> Result<ThumbScale, String> {
    match name {
        "auto" => Ok(ThumbScale::Auto),
        "point" => Ok(ThumbScale::Point),
        "rate" => Ok(ThumbScale::Rate),
        other => Err(format!("unknown thumb scale {other:?} (auto, point, rate)")),
    }
}

fn parse_easing(name: &str) -> Result<Easing, String> {
    match name {
        "linear" => Ok(Easing::Linear),
        "decelerate" => Ok(Easing::Decelerate),
        "accelerate" => Ok(Easing::Accelerate),
        "ease-in-out" => Ok(Easing::EaseInOut),
        other => Err(format!(
            "unknown easing {other:?} (linear, decelerate, accelerate, ease-in-out)"
        )),
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Still,
    Animate,
}

fn print_help() {
    println!(
        r#"progress-ring {VERSION} - Render circular progress rings to PNG

USAGE:
    progress-ring [OPTIONS] [PROGRESS]

MODES:
    --still                 Render a single frame (default)
    --animate               Render an animation as a frame sequence
    --segments=LIST         Render multi-arc segments, e.g. "25:ff0000,10:00ff00"

RING OPTIONS:
    --max=VALUE             Value mapped to a full turn (default 100)
    --starting-angle=DEG    Angle the arc grows from (default 270, 12 o'clock)
    --thickness=PX          Stroke thickness in pixels (default 10dp)
    --color=RRGGBB          Progress and track color (default black)
    --background=RRGGBB     Track color override
    --gradient=LIST         Sweep gradient colors, e.g. "ff0000,ffa500"
    --gradient-positions=LIST
                            Stop fractions for --gradient, e.g. "0.0,0.3,1.0"
    --gradient-no-wrap      Do not repeat the first gradient color at the end
    --rounded               Round the arc caps
    --reverse               Grow counter-clockwise
    --no-shadow             Disable the drop shadow
    --no-background-alpha   Draw the track at full opacity
    --thumb                 Draw a thumb at the leading edge
    --thumb-scale=MODE      Thumb sizing: auto, point or rate (default auto)
    --thumb-size=PX         Thumb radius for point scaling
    --thumb-rate=RATE       Thumb rate for rate scaling

OUTPUT OPTIONS:
    --out=PATH              Output file, or directory for --animate
    --size=PX               Canvas side in pixels (default 100dp)
    --scale=FACTOR          Display density factor (default 1.0)

ANIMATION OPTIONS:
    --progress=VALUE        Target progress value (default 65)
    --duration-ms=MS        Animation length (default 1000)
    --fps=N                 Frames per second (default 30)
    --easing=NAME           linear, decelerate, accelerate or ease-in-out

EXAMPLES:
    progress-ring 42
    progress-ring --rounded --thumb --color=3f51b5 --out=gauge.png 80
    progress-ring --animate --duration-ms=1500 --easing=linear --out=frames
    progress-ring --segments="25:ff0000,30:00ff00,19:0000ff"
    progress-ring --gradient="ff0000,ffa500,ffff00" --rounded 75

EXIT CODES:
    0   Image(s) written
    100 Error occurred
"#
    );
}
