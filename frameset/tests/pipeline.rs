use frameset::{
    consts::PIXEL_COUNT,
    palette::PALETTES,
    pipeline::{process_frames, process_image, process_video, to_frameset},
    DitherMode, Error, ExtractionPlan, FrameRequest, FrameSource, ProcessOptions, Result,
};
use image::{Rgb, RgbImage};

/// A fake video whose frame `i` is a flat gray equal to entry `i % 15` of the gray palette.
struct Clip {
    frames: Vec<RgbImage>,
    fps: Option<f64>,
    plans: Vec<ExtractionPlan>,
}

impl Clip {
    fn new(len: usize, fps: Option<f64>) -> Self {
        let frames = (0..len)
            .map(|i| RgbImage::from_pixel(48, 36, Rgb(PALETTES[14][i % 15])))
            .collect();

        Self {
            frames,
            fps,
            plans: Vec::new(),
        }
    }
}

impl FrameSource for Clip {
    fn native_fps(&mut self) -> Option<f64> {
        self.fps
    }

    fn extract(&mut self, plan: &ExtractionPlan) -> Result<Vec<RgbImage>> {
        self.plans.push(*plan);

        let start = match (plan.seek_seconds, plan.select_from, self.fps) {
            (Some(seconds), _, Some(fps)) => (seconds * fps).round() as usize,
            (_, Some(start), _) => start as usize,
            _ => 0,
        };
        let frames = self.frames.iter().skip(start).cloned();

        Ok(match plan.frame_limit {
            Some(limit) => frames.take(limit as usize).collect(),
            None => frames.collect(),
        })
    }
}

const GRAY: ProcessOptions = ProcessOptions {
    dither: DitherMode::None,
    forced_palette: Some(14),
};

fn window(start: u32, stop: u32) -> FrameRequest {
    FrameRequest {
        start_frame: Some(start),
        stop_frame: Some(stop),
        ..FrameRequest::default()
    }
}

#[test]
fn start_and_stop_select_a_window_in_order() {
    for fps in [Some(25.0), None] {
        let mut clip = Clip::new(30, fps);
        let processed = process_video(&mut clip, &window(10, 20), &GRAY).unwrap();

        assert_eq!(processed.len(), 10);
        for (i, p) in processed.iter().enumerate() {
            let expected = ((10 + i) % 15) as u8;
            assert_eq!(p.frame.palette_index, 14);
            assert!(p.frame.pixels.as_slice().iter().all(|&v| v == expected));
        }

        let frameset = to_frameset(&processed).unwrap();
        assert_eq!(frameset.len(), 10);
        assert_eq!(frameset.to_bytes().len(), 10 * (PIXEL_COUNT + 1));
    }
}

#[test]
fn short_video_is_a_count_mismatch() {
    let mut clip = Clip::new(15, Some(25.0));
    match process_video(&mut clip, &window(10, 20), &GRAY) {
        Err(Error::FrameCountMismatch { expected, actual }) => {
            assert_eq!(expected, 10);
            assert_eq!(actual, 5);
        }
        other => panic!("expected a frame count mismatch, got {other:?}"),
    }
}

#[test]
fn empty_video_fails() {
    let mut clip = Clip::new(0, Some(25.0));
    assert!(matches!(
        process_video(&mut clip, &FrameRequest::default(), &GRAY),
        Err(Error::NoFrames)
    ));
}

#[test]
fn forced_palette_is_checked_before_extraction() {
    let mut clip = Clip::new(5, Some(25.0));
    let options = ProcessOptions {
        forced_palette: Some(16),
        ..ProcessOptions::default()
    };

    assert!(matches!(
        process_video(&mut clip, &FrameRequest::default(), &options),
        Err(Error::PaletteIndexOutOfRange { index: 16 })
    ));
    assert!(clip.plans.is_empty());
}

#[test]
fn whole_video_without_limits() {
    let mut clip = Clip::new(7, None);
    let processed = process_video(&mut clip, &FrameRequest::default(), &GRAY).unwrap();
    assert_eq!(processed.len(), 7);
    assert_eq!(clip.plans, [ExtractionPlan::default()]);
}

#[test]
fn plan_with_native_fps_seeks() {
    let plan = window(10, 20).plan(Some(25.0)).unwrap();
    assert_eq!(plan.seek_seconds, Some(0.4));
    assert_eq!(plan.select_from, None);
    assert_eq!(plan.frame_limit, Some(10));
    assert_eq!(plan.fps, None);
}

#[test]
fn plan_without_native_fps_selects() {
    let plan = window(10, 20).plan(None).unwrap();
    assert_eq!(plan.seek_seconds, None);
    assert_eq!(plan.select_from, Some(10));
    assert_eq!(plan.frame_limit, Some(10));
}

#[test]
fn plan_converts_window_to_target_fps() {
    let request = FrameRequest {
        fps: Some(10.0),
        ..window(0, 60)
    };
    // 60 frames at 30 fps are 2 seconds, 20 frames at 10 fps
    assert_eq!(request.plan(Some(30.0)).unwrap().frame_limit, Some(20));
    // unknown native rate: count source frames
    assert_eq!(request.plan(None).unwrap().frame_limit, Some(60));
}

#[test]
fn stop_frame_overrides_max_frames() {
    let request = FrameRequest {
        max_frames: Some(3),
        ..window(5, 9)
    };
    assert_eq!(request.plan(Some(25.0)).unwrap().frame_limit, Some(4));

    let stop_only = FrameRequest {
        max_frames: Some(3),
        stop_frame: Some(12),
        ..FrameRequest::default()
    };
    assert_eq!(stop_only.plan(None).unwrap().frame_limit, Some(12));

    let max_only = FrameRequest {
        max_frames: Some(3),
        ..FrameRequest::default()
    };
    assert_eq!(max_only.plan(None).unwrap().frame_limit, Some(3));
}

#[test]
fn frames_keep_input_order() {
    let images: Vec<RgbImage> = (0..12)
        .map(|i| RgbImage::from_pixel(40, 40, Rgb(PALETTES[14][i])))
        .collect();

    let processed = process_frames(&images, &GRAY).unwrap();
    for (i, p) in processed.iter().enumerate() {
        assert_eq!(p.frame.pixels.get(0, 0), Some(i as u8));
    }
}

#[test]
fn still_image_is_auto_selected() {
    let image = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 60]));
    let processed = process_image(&image, &ProcessOptions::default()).unwrap();

    assert_eq!(processed.quantized.dimensions(), (32, 32));
    assert!(processed.score.is_some());
    assert!(processed.frame.palette_index < 16);
    assert!(processed.frame.pixels.as_slice().iter().all(|&i| i < 15));
}

#[test]
fn still_image_with_bad_palette() {
    let image = RgbImage::new(32, 32);
    let options = ProcessOptions {
        forced_palette: Some(-1),
        ..ProcessOptions::default()
    };
    assert!(matches!(
        process_image(&image, &options),
        Err(Error::PaletteIndexOutOfRange { index: -1 })
    ));
}

#[test]
fn inverted_or_empty_window_is_rejected() {
    for (start, stop) in [(20, 10), (10, 10)] {
        assert!(matches!(
            window(start, stop).plan(Some(25.0)),
            Err(Error::InvalidFrameWindow { .. })
        ));

        let mut clip = Clip::new(100, Some(25.0));
        match process_video(&mut clip, &window(start, stop), &GRAY) {
            Err(Error::InvalidFrameWindow { start: s, stop: e }) => {
                assert_eq!((s, e), (start, stop));
            }
            other => panic!("expected an invalid frame window, got {other:?}"),
        }
        assert!(clip.plans.is_empty());
    }

    let stop_at_zero = FrameRequest {
        stop_frame: Some(0),
        ..FrameRequest::default()
    };
    assert!(stop_at_zero.plan(None).is_err());
}

#[test]
fn window_resampled_to_nothing_is_rejected() {
    let request = FrameRequest {
        fps: Some(1.0),
        ..window(0, 10)
    };
    // 10 frames at 30 fps last a third of a second, less than one frame at 1 fps
    assert!(matches!(
        request.plan(Some(30.0)),
        Err(Error::InvalidFrameWindow { start: 0, stop: 10 })
    ));
}

#[test]
fn zero_max_frames_is_unlimited() {
    let request = FrameRequest {
        max_frames: Some(0),
        ..FrameRequest::default()
    };
    assert_eq!(request.plan(Some(25.0)).unwrap().frame_limit, None);
}

#[test]
fn empty_images_are_rejected() {
    for (width, height) in [(0, 0), (0, 12), (12, 0)] {
        let image = RgbImage::new(width, height);
        match process_image(&image, &ProcessOptions::default()) {
            Err(Error::EmptyImage { width: w, height: h }) => assert_eq!((w, h), (width, height)),
            other => panic!("expected an empty image error, got {other:?}"),
        }
    }
}

#[test]
fn first_failing_frame_is_reported() {
    let mut images: Vec<RgbImage> = (0..32)
        .map(|i| RgbImage::from_pixel(32, 32, Rgb(PALETTES[14][i % 15])))
        .collect();
    images[7] = RgbImage::new(0, 5);
    images[20] = RgbImage::new(5, 0);

    for _ in 0..8 {
        assert!(matches!(
            process_frames(&images, &GRAY),
            Err(Error::EmptyImage {
                width: 0,
                height: 5
            })
        ));
    }
}
