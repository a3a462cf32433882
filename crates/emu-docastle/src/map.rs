//! Address decoding for the main and sub CPUs.
//!
//! Main CPU, Do's Castle:
//!
//! | Range       | Device                            |
//! |-------------|-----------------------------------|
//! | $0000-$7FFF | program ROM                       |
//! | $8000-$97FF | work RAM                          |
//! | $9800-$99FF | sprite RAM                        |
//! | $A000-$A008 | latch                             |
//! | $A800       | watchdog (write)                  |
//! | $B000-$B3FF | video RAM, mirrored at $B800      |
//! | $B400-$B7FF | colour RAM, mirrored at $BC00     |
//! | $E000       | sub CPU NMI (write)               |
//!
//! Do! Run Run moves RAM down to $2000 and ROM up to $4000-$9FFF, drops
//! the video mirrors and puts the NMI trigger at $B800. Indoor Soccer
//! has RAM at $4000, ROM at $6000-$9FFF and an ADPCM port at $C000.
//!
//! Sub CPU: ROM at $0000-$3FFF, RAM at $8000-$87FF, latch at $A000 (Do!
//! Run Run: $E000), inputs at $C000-$C007 with select bit $0080, and four
//! SN76489A write ports at $E000/$E400/$E800/$EC00 (Do! Run Run: $A000).

use crate::DoCastleVariant;

pub(crate) const MAIN_RAM_SIZE: usize = 0x1800;
pub(crate) const SPRITE_RAM_SIZE: usize = 0x200;
pub(crate) const VIDEO_RAM_SIZE: usize = 0x400;
pub(crate) const SUB_RAM_SIZE: usize = 0x800;

/// What a main CPU address selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MainRegion {
    Rom(usize),
    Ram(usize),
    SpriteRam(usize),
    Latch(usize),
    Watchdog,
    VideoRam(usize),
    ColourRam(usize),
    Adpcm,
    NmiTrigger,
    Unmapped,
}

/// What a sub CPU address selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubRegion {
    Rom(usize),
    Ram(usize),
    Latch(usize),
    /// Offset within the decode window, bits 0-2 and 7.
    Inputs(u16),
    Sound(usize),
    Unmapped,
}

pub(crate) fn decode_main(variant: DoCastleVariant, address: u16) -> MainRegion {
    let a = usize::from(address);
    match variant {
        DoCastleVariant::DoCastle => match address {
            0x0000..=0x7FFF => MainRegion::Rom(a),
            0x8000..=0x97FF => MainRegion::Ram(a - 0x8000),
            0x9800..=0x99FF => MainRegion::SpriteRam(a - 0x9800),
            0xE000 => MainRegion::NmiTrigger,
            _ => decode_main_common(address, true),
        },
        DoCastleVariant::DoRunRun => match address {
            0x0000..=0x1FFF | 0x4000..=0x9FFF => MainRegion::Rom(a),
            0x2000..=0x37FF => MainRegion::Ram(a - 0x2000),
            0x3800..=0x39FF => MainRegion::SpriteRam(a - 0x3800),
            0xB800 => MainRegion::NmiTrigger,
            _ => decode_main_common(address, false),
        },
        DoCastleVariant::IdSoccer => match address {
            0x0000..=0x3FFF | 0x6000..=0x9FFF => MainRegion::Rom(a),
            0x4000..=0x57FF => MainRegion::Ram(a - 0x4000),
            0x5800..=0x59FF => MainRegion::SpriteRam(a - 0x5800),
            0xC000 => MainRegion::Adpcm,
            0xE000 => MainRegion::NmiTrigger,
            _ => decode_main_common(address, true),
        },
    }
}

/// Latch, watchdog and video RAM sit at the same place on every variant.
fn decode_main_common(address: u16, video_mirror: bool) -> MainRegion {
    let video = if video_mirror {
        address & !0x0800
    } else {
        address
    };
    match (address, video) {
        (0xA000..=0xA008, _) => MainRegion::Latch(usize::from(address - 0xA000)),
        (0xA800, _) => MainRegion::Watchdog,
        (_, 0xB000..=0xB3FF) => MainRegion::VideoRam(usize::from(video - 0xB000)),
        (_, 0xB400..=0xB7FF) => MainRegion::ColourRam(usize::from(video - 0xB400)),
        _ => MainRegion::Unmapped,
    }
}

pub(crate) fn decode_sub(variant: DoCastleVariant, address: u16) -> SubRegion {
    let (latch_base, sound_base) = match variant {
        DoCastleVariant::DoRunRun => (0xE000, 0xA000),
        DoCastleVariant::DoCastle | DoCastleVariant::IdSoccer => (0xA000, 0xE000),
    };
    match address {
        0x0000..=0x3FFF => SubRegion::Rom(usize::from(address)),
        0x8000..=0x87FF => SubRegion::Ram(usize::from(address - 0x8000)),
        _ if (latch_base..=latch_base + 8).contains(&address) => {
            SubRegion::Latch(usize::from(address - latch_base))
        }
        _ if address & !0x0087 == 0xC000 => SubRegion::Inputs(address & 0x0087),
        _ if address & 0x03FF == 0 && (sound_base..sound_base + 0x1000).contains(&address) => {
            SubRegion::Sound(usize::from((address - sound_base) >> 10))
        }
        _ => SubRegion::Unmapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docastle_main_map() {
        let v = DoCastleVariant::DoCastle;
        assert_eq!(decode_main(v, 0x7FFF), MainRegion::Rom(0x7FFF));
        assert_eq!(decode_main(v, 0x8000), MainRegion::Ram(0));
        assert_eq!(decode_main(v, 0x97FF), MainRegion::Ram(0x17FF));
        assert_eq!(decode_main(v, 0x9801), MainRegion::SpriteRam(1));
        assert_eq!(decode_main(v, 0xA008), MainRegion::Latch(8));
        assert_eq!(decode_main(v, 0xA009), MainRegion::Unmapped);
        assert_eq!(decode_main(v, 0xA800), MainRegion::Watchdog);
        assert_eq!(decode_main(v, 0xE000), MainRegion::NmiTrigger);
        assert_eq!(decode_main(v, 0xC000), MainRegion::Unmapped);
    }

    #[test]
    fn video_ram_mirror_depends_on_variant() {
        assert_eq!(
            decode_main(DoCastleVariant::DoCastle, 0xB805),
            MainRegion::VideoRam(5)
        );
        assert_eq!(
            decode_main(DoCastleVariant::DoCastle, 0xBC05),
            MainRegion::ColourRam(5)
        );
        assert_eq!(
            decode_main(DoCastleVariant::IdSoccer, 0xB805),
            MainRegion::VideoRam(5)
        );
        assert_eq!(
            decode_main(DoCastleVariant::DoRunRun, 0xB800),
            MainRegion::NmiTrigger
        );
        assert_eq!(
            decode_main(DoCastleVariant::DoRunRun, 0xBC05),
            MainRegion::Unmapped
        );
    }

    #[test]
    fn dorunrun_and_idsoccer_main_maps() {
        let drr = DoCastleVariant::DoRunRun;
        assert_eq!(decode_main(drr, 0x1FFF), MainRegion::Rom(0x1FFF));
        assert_eq!(decode_main(drr, 0x2000), MainRegion::Ram(0));
        assert_eq!(decode_main(drr, 0x3800), MainRegion::SpriteRam(0));
        assert_eq!(decode_main(drr, 0x9FFF), MainRegion::Rom(0x9FFF));

        let ids = DoCastleVariant::IdSoccer;
        assert_eq!(decode_main(ids, 0x4000), MainRegion::Ram(0));
        assert_eq!(decode_main(ids, 0x5800), MainRegion::SpriteRam(0));
        assert_eq!(decode_main(ids, 0x6000), MainRegion::Rom(0x6000));
        assert_eq!(decode_main(ids, 0xC000), MainRegion::Adpcm);
    }

    #[test]
    fn sub_maps() {
        let v = DoCastleVariant::DoCastle;
        assert_eq!(decode_sub(v, 0x3FFF), SubRegion::Rom(0x3FFF));
        assert_eq!(decode_sub(v, 0x8001), SubRegion::Ram(1));
        assert_eq!(decode_sub(v, 0xA008), SubRegion::Latch(8));
        assert_eq!(decode_sub(v, 0xC085), SubRegion::Inputs(0x85));
        assert_eq!(decode_sub(v, 0xC008), SubRegion::Unmapped);
        assert_eq!(decode_sub(v, 0xEC00), SubRegion::Sound(3));
        assert_eq!(decode_sub(v, 0xE001), SubRegion::Unmapped);

        let drr = DoCastleVariant::DoRunRun;
        assert_eq!(decode_sub(drr, 0xE008), SubRegion::Latch(8));
        assert_eq!(decode_sub(drr, 0xA400), SubRegion::Sound(1));
        assert_eq!(decode_sub(drr, 0xA000), SubRegion::Sound(0));
    }
}
