//! Rendering of a [`Frameset`] into the C++ block that the firmware compiles in.

use crate::frame::Frameset;
use itertools::Itertools;
use std::{fmt::Write, time::SystemTime};

/// First line prefix of every generated block. The injector locates blocks by it.
pub const BLOCK_HEADER: &str = "// Initialize with a generated streaming frameset";

/// Declaration of the frame byte array inside a block.
pub const FRAME_DATA_DECL: &str = "static const uint8_t streamingFrameData[]";

/// Opening line of the initialization routine that ends a block.
pub const INIT_DECL: &str = "inline void initGeneratedFrameset() {";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Video,
}

impl SourceKind {
    fn describe(self) -> &'static str {
        match self {
            SourceKind::Image => "an image",
            SourceKind::Video => "a video",
        }
    }
}

/// Header metadata of a generated block.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub kind: SourceKind,
    /// `YYYY-MM-DD HH:MM:SS UTC`, see [`timestamp_now`].
    pub generated_at: String,
    /// File name of the input, if known. The header line is left out otherwise.
    pub source_file: Option<String>,
}

impl BlockInfo {
    pub fn new(kind: SourceKind, source_file: Option<String>) -> Self {
        Self {
            kind,
            generated_at: timestamp_now(),
            source_file,
        }
    }
}

/// The current time as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn timestamp_now() -> String {
    format_timestamp(SystemTime::now())
}

/// Formats `time` as `YYYY-MM-DD HH:MM:SS UTC`. The zone is spelled out since it is not the
/// local time of whoever reads the generated file.
pub fn format_timestamp(time: SystemTime) -> String {
    let rfc3339 = humantime::format_rfc3339_seconds(time).to_string();
    format!("{} UTC", rfc3339.replacen('T', " ", 1).trim_end_matches('Z'))
}

/// Renders the generated block for `frameset`.
///
/// The block starts with [`BLOCK_HEADER`] and ends with the closing brace of the initialization
/// routine, without a trailing newline. Each frame is one line of the array: the palette id, then
/// the 1024 pixel bytes.
pub fn render_block(frameset: &Frameset, info: &BlockInfo) -> String {
    let count = frameset.len();
    let mut out = String::with_capacity(count * 4 * crate::consts::FRAME_LEN + 512);

    // writing into a String can't fail
    let _ = writeln!(out, "{BLOCK_HEADER} from {}", info.kind.describe());
    let _ = writeln!(out, "// Generated at: {}", info.generated_at);
    if let Some(source_file) = &info.source_file {
        let _ = writeln!(out, "// Source file: {source_file}");
    }
    let _ = writeln!(
        out,
        "// Frame count: {count} {} (using streaming mode)",
        if count == 1 { "frame" } else { "frames" }
    );
    out.push('\n');

    let _ = writeln!(out, "{FRAME_DATA_DECL} = {{");
    let mut rows = frameset.frames().iter().map(|frame| {
        std::iter::once(frame.palette_index)
            .chain(frame.pixels.as_slice().iter().copied())
            .join(", ")
    });
    out.push_str(&rows.join(",\n"));
    out.push_str("\n};\n\n");

    let _ = writeln!(
        out,
        "static StreamingFrameProvider streamingProvider(streamingFrameData, {count});"
    );
    out.push('\n');

    out.push_str(INIT_DECL);
    out.push_str(concat!(
        "\n",
        "    Frameset& fs = getCurrentFrameset();\n",
        "    fs.frames.clear();\n",
        "    fs.provider = &streamingProvider;\n",
        "    fs.currentFrameIndex = 0;\n",
        "}",
    ));

    out
}

/// Extracts the bytes of the frame data array from a rendered block.
///
/// Returns `None` if the block has no frame data array or it contains anything but byte values.
pub fn parse_frame_data(block: &str) -> Option<Vec<u8>> {
    let decl = block.find(FRAME_DATA_DECL)?;
    let body = &block[decl + FRAME_DATA_DECL.len()..];
    let open = body.find('{')?;
    let close = body[open..].find('}')? + open;

    body[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.parse::<u8>().ok())
        .collect()
}
