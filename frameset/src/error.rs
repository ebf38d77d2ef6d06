use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// An input image or extracted video frame could not be read or decoded.
    #[snafu(display("failed to decode input image: {source}"))]
    Decode { source: image::ImageError },

    /// An external tool is missing or exited with a non-zero status.
    #[snafu(display("`{tool}` failed: {message}"))]
    ExternalTool { tool: String, message: String },

    #[snafu(display(
        "expected {expected} frames but {actual} were extracted; the video may be shorter than requested"
    ))]
    FrameCountMismatch { expected: usize, actual: usize },

    #[snafu(display("frame window {start}..{stop} selects no frames"))]
    InvalidFrameWindow { start: u32, stop: u32 },

    #[snafu(display("input image is empty ({width}x{height})"))]
    EmptyImage { width: u32, height: u32 },

    #[snafu(display("no frames were extracted from the video"))]
    NoFrames,

    #[snafu(display("palette index {index} is out of range (0..=15)"))]
    PaletteIndexOutOfRange { index: i32 },

    #[snafu(display("failed to read target file `{}`: {source}", path.display()))]
    TargetFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write `{}`: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display(
        "frame data of {len} bytes is not a sequence of valid 1025-byte frames"
    ))]
    MalformedFrameData { len: usize },

    #[snafu(display("a frameset needs at least one frame"))]
    EmptyFrameset,
}
