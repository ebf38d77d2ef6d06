use frameset::{
    consts::{FRAME_LEN, PIXEL_COUNT},
    dither::map_nearest,
    palette::PALETTES,
    serialize::{format_timestamp, parse_frame_data, render_block, BLOCK_HEADER, INIT_DECL},
    BlockInfo, ColorIndexGrid, Error, Frame, Frameset, SourceKind,
};
use image::{Rgb, RgbImage};

fn frame(palette_index: u8, seed: u8) -> Frame {
    let indices = (0..PIXEL_COUNT)
        .map(|i| ((i + usize::from(seed)) % 15) as u8)
        .collect();

    Frame {
        palette_index,
        pixels: ColorIndexGrid::new(indices).unwrap(),
    }
}

fn info(kind: SourceKind, source_file: Option<&str>) -> BlockInfo {
    BlockInfo {
        kind,
        generated_at: String::from("2026-10-19 08:30:00"),
        source_file: source_file.map(String::from),
    }
}

#[test]
fn grid_rejects_wrong_sizes_and_indices() {
    assert!(ColorIndexGrid::new(vec![0; PIXEL_COUNT]).is_some());
    assert!(ColorIndexGrid::new(vec![14; PIXEL_COUNT]).is_some());
    assert!(ColorIndexGrid::new(vec![0; PIXEL_COUNT - 1]).is_none());
    assert!(ColorIndexGrid::new(vec![15; PIXEL_COUNT]).is_none());
}

#[test]
fn grid_rows_are_row_major() {
    let grid = frame(0, 0).pixels;
    let rows: Vec<&[u8]> = grid.rows().collect();
    assert_eq!(rows.len(), 32);
    assert_eq!(rows[1][0], grid.get(0, 1).unwrap());
    assert_eq!(grid.get(3, 2), Some(((2 * 32 + 3) % 15) as u8));
    assert_eq!(grid.get(32, 0), None);
}

#[test]
fn frame_reuses_quantizer_indices() {
    let image = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 90]));
    let palette = &PALETTES[9];
    let quantized = map_nearest(&image, palette);

    let frame = Frame::from_quantized(9, &quantized).unwrap();
    assert_eq!(frame.pixels.as_slice(), &quantized.indices[..]);

    let rederived = ColorIndexGrid::from_image(&quantized.image, palette).unwrap();
    assert_eq!(rederived, frame.pixels);
    assert!(frame.pixels.as_slice().iter().all(|&i| i < 15));
}

#[test]
fn frame_rejects_unnormalized_images() {
    let image = RgbImage::new(16, 16);
    let quantized = map_nearest(&image, &PALETTES[0]);
    assert!(Frame::from_quantized(0, &quantized).is_none());

    let image = RgbImage::new(32, 32);
    let quantized = map_nearest(&image, &PALETTES[0]);
    assert!(Frame::from_quantized(16, &quantized).is_none());
}

#[test]
fn flattened_layout() {
    let frameset = Frameset::new(vec![frame(3, 0), frame(12, 5), frame(0, 9)]).unwrap();
    let bytes = frameset.to_bytes();

    assert_eq!(bytes.len(), 3 * FRAME_LEN);
    assert_eq!(bytes[0], 3);
    assert_eq!(bytes[FRAME_LEN], 12);
    assert_eq!(bytes[2 * FRAME_LEN], 0);
    assert_eq!(&bytes[1..FRAME_LEN], frameset.frames()[0].pixels.as_slice());

    assert_eq!(Frameset::from_bytes(&bytes).unwrap(), frameset);
}

#[test]
fn malformed_frame_data() {
    let bytes = Frameset::single(frame(1, 1)).to_bytes();

    for data in [&bytes[..FRAME_LEN - 1], &[][..]] {
        assert!(matches!(
            Frameset::from_bytes(data),
            Err(Error::MalformedFrameData { .. })
        ));
    }

    let mut bad_palette = bytes.clone();
    bad_palette[0] = 16;
    assert!(Frameset::from_bytes(&bad_palette).is_err());

    let mut bad_pixel = bytes;
    bad_pixel[10] = 15;
    assert!(Frameset::from_bytes(&bad_pixel).is_err());
}

#[test]
fn empty_frameset_is_rejected() {
    assert!(matches!(Frameset::new(vec![]), Err(Error::EmptyFrameset)));
}

#[test]
fn single_frame_block() {
    let frameset = Frameset::single(frame(4, 2));
    let block = render_block(&frameset, &info(SourceKind::Image, Some("cat.png")));
    let lines: Vec<&str> = block.lines().collect();
    let first_row = frameset.frames()[0]
        .to_bytes()
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    assert_eq!(
        lines[..7],
        [
            "// Initialize with a generated streaming frameset from an image",
            "// Generated at: 2026-10-19 08:30:00",
            "// Source file: cat.png",
            "// Frame count: 1 frame (using streaming mode)",
            "",
            "static const uint8_t streamingFrameData[] = {",
            first_row.as_str(),
        ]
    );
    assert_eq!(
        lines[7..],
        [
            "};",
            "",
            "static StreamingFrameProvider streamingProvider(streamingFrameData, 1);",
            "",
            INIT_DECL,
            "    Frameset& fs = getCurrentFrameset();",
            "    fs.frames.clear();",
            "    fs.provider = &streamingProvider;",
            "    fs.currentFrameIndex = 0;",
            "}",
        ]
    );
    assert!(block.starts_with(BLOCK_HEADER));
    assert!(block.ends_with('}'));
}

#[test]
fn multi_frame_block() {
    let frameset = Frameset::new(vec![frame(1, 0), frame(2, 1), frame(3, 2)]).unwrap();
    let block = render_block(&frameset, &info(SourceKind::Video, None));

    assert!(block.starts_with("// Initialize with a generated streaming frameset from a video\n"));
    assert!(!block.contains("// Source file:"));
    assert!(block.contains("// Frame count: 3 frames (using streaming mode)"));
    assert!(block.contains("streamingProvider(streamingFrameData, 3);"));

    let rows: Vec<&str> = block
        .lines()
        .skip_while(|line| !line.starts_with("static const uint8_t"))
        .skip(1)
        .take_while(|line| *line != "};")
        .collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("1, ") && rows[0].ends_with(','));
    assert!(rows[1].starts_with("2, ") && rows[1].ends_with(','));
    assert!(rows[2].starts_with("3, ") && !rows[2].ends_with(','));
}

#[test]
fn block_data_parses_back() {
    let frameset = Frameset::new(vec![frame(15, 3), frame(0, 7)]).unwrap();
    let block = render_block(&frameset, &info(SourceKind::Video, Some("clip.mp4")));

    let data = parse_frame_data(&block).unwrap();
    assert_eq!(data.len(), 2 * PIXEL_COUNT + 2);
    assert_eq!(Frameset::from_bytes(&data).unwrap(), frameset);
}

#[test]
fn frame_data_parsing_rejects_garbage() {
    assert_eq!(parse_frame_data("int x = 3;"), None);
    assert_eq!(
        parse_frame_data("static const uint8_t streamingFrameData[] = { 1, 300 };"),
        None
    );
    assert_eq!(
        parse_frame_data("static const uint8_t streamingFrameData[] = { 1, 2, };"),
        Some(vec![1, 2])
    );
}

#[test]
fn timestamps_name_their_zone() {
    let time = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000_000);
    assert_eq!(format_timestamp(time), "2001-09-09 01:46:40 UTC");
}
