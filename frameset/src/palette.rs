//! The fixed palette table of the display and nearest-color lookup against it.

use crate::{
    consts::{PALETTE_COUNT, PALETTE_LEN},
    error::{PaletteIndexOutOfRangeSnafu, Result},
    utils::{hex_to_rgb, squared_distance},
};
use itertools::Itertools;
use snafu::ensure;

/// An RGB888 color.
pub type Color = [u8; 3];

/// The fifteen colors of one palette. Pixels refer to them by position.
pub type Palette = [Color; PALETTE_LEN];

const fn palette(hex: [&str; PALETTE_LEN]) -> Palette {
    let mut colors = [[0; 3]; PALETTE_LEN];
    let mut i = 0;
    while i < PALETTE_LEN {
        colors[i] = hex_to_rgb(hex[i]);
        i += 1;
    }
    colors
}

/// All palettes the device can display, indexed by palette id.
#[rustfmt::skip]
pub static PALETTES: [Palette; PALETTE_COUNT] = [
    palette(["cd4a4a", "de8341", "e6ac18", "e6c520", "d5de18", "b4e618", "83d552", "39c56a", "29acc5", "417bee", "6a4ae6", "945acd", "bd41b4", "000000", "ffffff"]),
    palette(["ff8b8b", "ffcd83", "ffe65a", "fff662", "ffff83", "deff52", "b4ff83", "7bf6ac", "62e616", "83c5ff", "a49cff", "d59cff", "ff9cf6", "8b8b8b", "ffffff"]),
    palette(["9c1818", "ac5208", "b47b00", "b49400", "a4ac00", "83b400", "52a431", "089439", "007b94", "104abd", "3918ac", "5a2994", "8b087b", "080808", "ffffff"]),
    palette(["41945a", "73c58b", "94e6ac", "008b7b", "5ab4ac", "83c5c5", "2073a4", "4a9ccd", "6aacde", "7383bd", "6a73ac", "525294", "39397b", "181862", "ffffff"]),
    palette(["9c8352", "bd945a", "d4bc82", "9c5252", "cd7362", "ee9c8b", "8b6283", "a483b4", "deb4de", "bd8383", "ac736a", "945252", "7b3939", "621810", "ffffff"]),
    palette(["ee5a00", "ff9c41", "ffcd83", "ffeea4", "8b4a29", "b47b5a", "e6ac8b", "ffdebd", "318bff", "62b4ff", "9cdeff", "c5e6ff", "6a6a6a", "000000", "ffffff"]),
    palette(["39b441", "62de5a", "8bee83", "b4ffac", "2020c5", "5252f6", "8383ff", "b4b4ff", "cd3939", "de6a6a", "e68b9c", "eebdbd", "6a6a6a", "000000", "ffffff"]),
    palette(["082000", "415a39", "6a8362", "9cb494", "5a2900", "7b4a20", "a4734a", "d5a47b", "947b00", "b49439", "cdb46a", "ded59c", "6a6a6a", "000000", "ffffff"]),
    palette(["2020ff", "ff2020", "d5d500", "6262ff", "ff6262", "d5d562", "9494ff", "ff9494", "d5d594", "acacff", "ffacac", "e6e6ac", "6a6a6a", "000000", "ffffff"]),
    palette(["20a420", "39acff", "9c52ee", "52bd52", "5ac5ff", "b49cff", "6ad573", "8be6ff", "cdb4ff", "93ddab", "bdf6ff", "d5cdff", "6a6a6a", "000000", "ffffff"]),
    palette(["d50000", "ffbd00", "eef631", "4acd41", "299c29", "528bbd", "414aac", "9452d5", "f67bde", "a49439", "9c4141", "5a3139", "6a6a6a", "000000", "ffffff"]),
    palette(["e6cd18", "20c518", "ff6a00", "0000ff", "9400bd", "e6cd18", "00a400", "cd4100", "0000d5", "5a008b", "9c8b18", "008300", "a42000", "0000a4", "4a005a"]),
    palette(["ff2020", "e6d500", "f639bd", "00d59c", "107310", "c52020", "bda400", "cd3994", "009c6a", "204a20", "8b2020", "836a00", "941862", "00734a", "183918"]),
    palette(["eed5d5", "dec5c5", "cdb4b4", "bda4a4", "ac9494", "9c8383", "8b7373", "7b6262", "6a5252", "5a4141", "4a3131", "392020", "291010", "180000", "100000"]),
    palette(["eeeeee", "dedede", "cdcdcd", "bdbdbd", "acacac", "9c9c9c", "8b8b8b", "7b7b7b", "6a6a6a", "5a5a5a", "4a4a4a", "393939", "292929", "181818", "101010"]),
    palette(["ee7b7b", "d51818", "f69418", "e6e652", "006a00", "39b439", "0039b4", "399cff", "940094", "ff6aff", "944108", "ee9c5a", "ffc594", "000000", "ffffff"]),
];

/// Looks up a palette by a caller-supplied id.
pub fn palette_by_index(index: i32) -> Result<&'static Palette> {
    ensure!(
        (0..PALETTE_COUNT as i32).contains(&index),
        PaletteIndexOutOfRangeSnafu { index }
    );

    Ok(&PALETTES[index as usize])
}

/// Returns the position of the palette color closest to `color`.
///
/// Ties go to the lowest position. Palette 11 lists the same yellow twice, so exact matches on it
/// always resolve to the first entry.
#[inline]
pub fn nearest(color: Color, palette: &Palette) -> u8 {
    palette
        .iter()
        .position_min_by_key(|&&candidate| squared_distance(color, candidate))
        .unwrap_or(0) as u8
}
