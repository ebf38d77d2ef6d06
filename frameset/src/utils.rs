#[inline]
const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit"),
    }
}

/// Parses a `rrggbb` hex triplet into its RGB components.
///
/// Panics on malformed input, which turns into a compile error when used in a constant.
pub const fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let b = hex.as_bytes();
    assert!(b.len() == 6, "hex color must have exactly 6 digits");

    [
        hex_digit(b[0]) << 4 | hex_digit(b[1]),
        hex_digit(b[2]) << 4 | hex_digit(b[3]),
        hex_digit(b[4]) << 4 | hex_digit(b[5]),
    ]
}

/// Squared Euclidean distance between two colors in RGB space.
#[inline]
pub const fn squared_distance([r1, g1, b1]: [u8; 3], [r2, g2, b2]: [u8; 3]) -> u32 {
    // widened so channel differences can't wrap
    let dr = r1 as i32 - r2 as i32;
    let dg = g1 as i32 - g2 as i32;
    let db = b1 as i32 - b2 as i32;

    (dr * dr + dg * dg + db * db) as u32
}

/// Truncates an error-diffused working value back into a color, the way a float-to-byte cast
/// does. Values are expected to already be clamped to `0.0..=255.0`.
#[inline]
pub fn truncate_rgb([r, g, b]: [f32; 3]) -> [u8; 3] {
    [r as u8, g as u8, b as u8]
}
