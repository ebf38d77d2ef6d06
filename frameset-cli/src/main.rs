use argh::FromArgs;
use frameset::{
    error::DecodeSnafu,
    inject::inject_file,
    pipeline::{process_image, process_video, to_frameset},
    serialize::render_block,
    BlockInfo, DitherMode, FrameRequest, Frameset, ProcessOptions, ProcessedFrame, SourceKind,
};
use snafu::ResultExt;
use std::{
    fs,
    path::{Path, PathBuf},
};

mod ffmpeg;
mod preview;

/// Converts images and videos into framesets for the 32x32 display.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Image(ImageArgs),
    Video(VideoArgs),
}

/// Converts a still image into a single-frame frameset.
#[derive(FromArgs)]
#[argh(subcommand, name = "image")]
struct ImageArgs {
    /// disable Floyd-Steinberg dithering
    #[argh(switch)]
    no_dither: bool,

    /// use this palette (0-15) instead of auto-selecting one
    #[argh(option, short = 'p')]
    palette: Option<i32>,

    /// base name of the preview GIF
    #[argh(option, short = 'o', default = "String::from(\"output\")")]
    output: String,

    /// the source file the frameset is patched into
    #[argh(option, default = "PathBuf::from(\"src/design.hpp\")")]
    target: PathBuf,

    /// directory the preview GIF is written to
    #[argh(option, default = "PathBuf::from(\"preview_gifs\")")]
    preview_dir: PathBuf,

    /// the input image (PNG, JPG, BMP, TIFF or GIF)
    #[argh(positional)]
    input: PathBuf,
}

/// Converts a video into a multi-frame frameset. Requires ffmpeg.
#[derive(FromArgs)]
#[argh(subcommand, name = "video")]
struct VideoArgs {
    /// target frames per second, the video's own rate if omitted
    #[argh(option)]
    fps: Option<f64>,

    /// maximum number of frames to extract
    #[argh(option)]
    max_frames: Option<u32>,

    /// first frame to extract (0-based)
    #[argh(option)]
    start_frame: Option<u32>,

    /// frame to stop at (0-based, exclusive)
    #[argh(option)]
    stop_frame: Option<u32>,

    /// disable Floyd-Steinberg dithering
    #[argh(switch)]
    no_dither: bool,

    /// use this palette (0-15) for all frames instead of auto-selecting per frame
    #[argh(option, short = 'p')]
    palette: Option<i32>,

    /// write one preview GIF per frame instead of a single animated GIF
    #[argh(switch)]
    separate_frames: bool,

    /// base name of the preview GIFs, the input file name if omitted
    #[argh(option, short = 'o')]
    output: Option<String>,

    /// the source file the frameset is patched into
    #[argh(option, default = "PathBuf::from(\"src/design.hpp\")")]
    target: PathBuf,

    /// directory the preview GIFs are written to
    #[argh(option, default = "PathBuf::from(\"preview_gifs\")")]
    preview_dir: PathBuf,

    /// the input video
    #[argh(positional)]
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let Cli { command } = argh::from_env();

    match command {
        Command::Image(options) => convert_image(options),
        Command::Video(options) => convert_video(options),
    }
}

fn dither_mode(no_dither: bool) -> DitherMode {
    if no_dither {
        DitherMode::None
    } else {
        DitherMode::FloydSteinberg
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn convert_image(options: ImageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ImageArgs {
        no_dither,
        palette,
        output,
        target,
        preview_dir,
        input,
    } = options;

    println!("Converting `{}`", input.display());

    let source = image::open(&input).context(DecodeSnafu)?;
    let process_options = ProcessOptions {
        dither: dither_mode(no_dither),
        forced_palette: palette,
    };
    let processed = process_image(&source.into_rgb8(), &process_options)?;

    fs::create_dir_all(&preview_dir)?;
    let preview = preview_dir.join(format!("{output}.gif"));
    preview::write_gif(&preview, [&processed.quantized]).map_err(|e| {
        remove_all(&[preview.clone()]);
        e
    })?;

    let palette_index = processed.frame.palette_index;
    let frameset = Frameset::single(processed.frame);
    let block = render_block(
        &frameset,
        &BlockInfo::new(SourceKind::Image, file_name(&input)),
    );
    commit(&target, &block, &[preview.clone()])?;

    summary(palette, palette_index, no_dither);
    println!("Output GIF: `{}`", preview.display());
    println!("Frameset written to `{}`", target.display());

    Ok(())
}

fn convert_video(options: VideoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let VideoArgs {
        fps,
        max_frames,
        start_frame,
        stop_frame,
        no_dither,
        palette,
        separate_frames,
        output,
        target,
        preview_dir,
        input,
    } = options;

    let mut source = ffmpeg::FfmpegSource::new(&input)?;
    let output = output.unwrap_or_else(|| {
        input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("output"))
    });

    println!("Extracting frames from `{}`", input.display());

    let request = FrameRequest {
        fps,
        max_frames,
        start_frame,
        stop_frame,
    };
    let process_options = ProcessOptions {
        dither: dither_mode(no_dither),
        forced_palette: palette,
    };
    let processed = process_video(&mut source, &request, &process_options)?;
    println!("Processed {} frames", processed.len());

    fs::create_dir_all(&preview_dir)?;
    let previews = write_video_previews(&processed, &preview_dir, &output, separate_frames)?;

    let frameset = to_frameset(&processed)?;
    let block = render_block(
        &frameset,
        &BlockInfo::new(SourceKind::Video, file_name(&input)),
    );
    commit(&target, &block, &previews)?;

    match palette {
        Some(index) => println!("Using specified palette for all frames: {index}"),
        None => println!("Using auto-selected palette for each frame"),
    }
    println!("Dithering: {}", if no_dither { "disabled" } else { "enabled" });
    if separate_frames {
        println!(
            "Output GIFs: `{}`",
            preview_dir.join(format!("{output}_frame_*.gif")).display()
        );
    } else {
        for preview in &previews {
            println!("Output GIF: `{}`", preview.display());
        }
    }
    println!(
        "{}-frame frameset written to `{}`",
        frameset.len(),
        target.display()
    );

    Ok(())
}

fn write_video_previews(
    processed: &[ProcessedFrame],
    dir: &Path,
    output: &str,
    separate_frames: bool,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut written = Vec::new();

    let result = if separate_frames {
        processed.iter().enumerate().try_for_each(|(i, p)| {
            let path = dir.join(format!("{output}_frame_{:04}.gif", i + 1));
            written.push(path.clone());
            preview::write_gif(&path, [&p.quantized])
        })
    } else {
        let path = dir.join(format!("{output}_animated.gif"));
        written.push(path.clone());
        preview::write_gif(&path, processed.iter().map(|p| &p.quantized))
    };

    match result {
        Ok(()) => Ok(written),
        Err(e) => {
            remove_all(&written);
            Err(e.into())
        }
    }
}

/// Patches `block` into `target`. Previews already written for this run are removed if that fails.
fn commit(target: &Path, block: &str, previews: &[PathBuf]) -> Result<(), frameset::Error> {
    inject_file(target, block).map(|_| ()).map_err(|e| {
        remove_all(previews);
        e
    })
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

fn summary(forced: Option<i32>, palette_index: u8, no_dither: bool) {
    match forced {
        Some(_) => println!("Using specified palette: {palette_index}"),
        None => println!("Auto-selected palette: {palette_index}"),
    }
    println!("Dithering: {}", if no_dither { "disabled" } else { "enabled" });
}
