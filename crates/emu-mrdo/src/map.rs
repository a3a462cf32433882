//! Main CPU address decoding.
//!
//! | Range       | Device                                           |
//! |-------------|--------------------------------------------------|
//! | $0000-$7FFF | program ROM                                      |
//! | $8000-$8FFF | tile RAM: colour 0, field 0, colour 1, field 1   |
//! | $9000-$90FF | sprite RAM (write), mirrored to $97FF            |
//! | $9800       | flip screen (write)                              |
//! | $9801-$9802 | SN76489 data (write)                             |
//! | $9803       | protection PAL (read)                            |
//! | $A000-$A003 | P1, P2, DSW1, DSW2                               |
//! | $E000-$EFFF | work RAM                                         |
//! | $F000       | scroll X (write), mirrored to $F7FF              |
//! | $F800       | scroll Y (write), mirrored to $FFFF              |
//!
//! $9800-$9807 and $A000-$A007 repeat every 8 bytes up to $9FFF and
//! $AFFF. $9804-$9807, $A004-$A007 and $B000-$DFFF are decoded but
//! drive nothing.

pub(crate) const TILE_RAM_SIZE: usize = 0x1000;
pub(crate) const SPRITE_RAM_SIZE: usize = 0x100;
pub(crate) const WORK_RAM_SIZE: usize = 0x1000;
/// Each colour or field RAM page.
pub(crate) const TILE_PAGE_SIZE: usize = 0x400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    Rom(usize),
    TileRam(usize),
    SpriteRam(usize),
    FlipScreen,
    Sound(usize),
    Protection,
    Input(usize),
    WorkRam(usize),
    ScrollX,
    ScrollY,
    Unused,
}

pub(crate) fn decode(address: u16) -> Region {
    let a = usize::from(address);
    match address {
        0x0000..=0x7FFF => Region::Rom(a),
        0x8000..=0x8FFF => Region::TileRam(a - 0x8000),
        0x9000..=0x97FF => Region::SpriteRam(a & 0xFF),
        0x9800..=0x9FFF => match address & 7 {
            0 => Region::FlipScreen,
            1 => Region::Sound(0),
            2 => Region::Sound(1),
            3 => Region::Protection,
            _ => Region::Unused,
        },
        0xA000..=0xAFFF => match a & 7 {
            port @ 0..=3 => Region::Input(port),
            _ => Region::Unused,
        },
        0xB000..=0xDFFF => Region::Unused,
        0xE000..=0xEFFF => Region::WorkRam(a - 0xE000),
        0xF000..=0xF7FF => Region::ScrollX,
        0xF800..=0xFFFF => Region::ScrollY,
    }
}
