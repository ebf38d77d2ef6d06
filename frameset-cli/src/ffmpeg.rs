use frameset::{
    error::{DecodeSnafu, Error, ExternalToolSnafu},
    ExtractionPlan, FrameSource, Result,
};
use image::RgbImage;
use log::{debug, info, warn};
use snafu::ResultExt;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

/// Extracts video frames by running `ffmpeg` into a temporary directory.
pub struct FfmpegSource {
    input: PathBuf,
}

impl FfmpegSource {
    /// Fails if `ffmpeg` can't be run.
    pub fn new(input: impl Into<PathBuf>) -> Result<Self> {
        let available = Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);

        if !available {
            return ExternalToolSnafu {
                tool: "ffmpeg",
                message: "not installed or not in PATH",
            }
            .fail();
        }

        Ok(Self {
            input: input.into(),
        })
    }

    fn extract_to(&self, plan: &ExtractionPlan, dir: &Path) -> Result<()> {
        let mut cmd = Command::new("ffmpeg");

        if let Some(seek) = plan.seek_seconds {
            cmd.arg("-ss").arg(seek.to_string());
        }
        cmd.arg("-i").arg(&self.input);
        if let Some(start) = plan.select_from {
            cmd.arg("-vf").arg(format!("select='gte(n,{start})'"));
        }
        if let Some(fps) = plan.fps {
            cmd.arg("-r").arg(fps.to_string());
        }
        if let Some(count) = plan.frame_limit {
            cmd.arg("-vframes").arg(count.to_string());
        }
        cmd.arg(dir.join("frame_%04d.png"));

        info!("running {cmd:?}");
        let output = cmd.output().map_err(|e| ffmpeg_error(e.to_string()))?;

        if !output.status.success() {
            return ExternalToolSnafu {
                tool: "ffmpeg",
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .fail();
        }

        Ok(())
    }
}

impl FrameSource for FfmpegSource {
    fn native_fps(&mut self) -> Option<f64> {
        let output = Command::new("ffprobe")
            .args(["-v", "quiet", "-show_entries", "stream=r_frame_rate"])
            .args(["-select_streams", "v:0", "-of", "csv=p=0"])
            .arg(&self.input)
            .output()
            .ok()
            .filter(|output| output.status.success());

        let fps =
            output.and_then(|output| parse_frame_rate(&String::from_utf8_lossy(&output.stdout)));
        if fps.is_none() {
            warn!("could not determine the native frame rate, selecting frames by index");
        }
        fps
    }

    fn extract(&mut self, plan: &ExtractionPlan) -> Result<Vec<RgbImage>> {
        let dir = tempfile::tempdir()
            .map_err(|e| ffmpeg_error(format!("failed to create a temporary directory: {e}")))?;

        self.extract_to(plan, dir.path())?;

        let mut frames = fs::read_dir(dir.path())
            .map_err(|e| ffmpeg_error(format!("failed to list extracted frames: {e}")))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter_map(|path| Some((frame_number(&path)?, path)))
            .collect::<Vec<_>>();
        // numbers outgrow the zero padding past 9999 frames
        frames.sort_unstable_by_key(|&(number, _)| number);
        debug!("ffmpeg created {} frame files", frames.len());

        frames
            .iter()
            .map(|(_, path)| {
                image::open(path)
                    .map(|frame| frame.into_rgb8())
                    .context(DecodeSnafu)
            })
            .collect()
    }
}

fn ffmpeg_error(message: impl Into<String>) -> Error {
    Error::ExternalTool {
        tool: "ffmpeg".into(),
        message: message.into(),
    }
}

/// The sequence number of an extracted `frame_<n>.png` file.
fn frame_number(path: &Path) -> Option<u64> {
    path.file_name()?
        .to_str()?
        .strip_prefix("frame_")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Parses `r_frame_rate` output such as `25` or `30000/1001`.
fn parse_frame_rate(s: &str) -> Option<f64> {
    let s = s.lines().next()?.trim();
    let fps = match s.split_once('/') {
        Some((num, den)) => num.trim().parse::<f64>().ok()? / den.trim().parse::<f64>().ok()?,
        None => s.parse().ok()?,
    };

    (fps.is_finite() && fps > 0.0).then_some(fps)
}
