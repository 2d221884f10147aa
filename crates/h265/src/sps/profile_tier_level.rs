use std::io;

use byteorder::ReadBytesExt;
use loupe_bitio::BitReader;

bitflags::bitflags! {
    /// The 32 `general_profile_compatibility_flag` bits, packed with flag
    /// index 0 at bit 31 (the order they appear in the bitstream).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProfileCompatibilityFlags: u32 {
        /// Main profile (flag index 1).
        const MAIN = 1 << 30;
        /// Main 10 profile (flag index 2).
        const MAIN_10 = 1 << 29;
        /// Main Still Picture profile (flag index 3).
        const MAIN_STILL_PICTURE = 1 << 28;
        /// Format range extensions (flag index 4).
        const RANGE_EXTENSIONS = 1 << 27;
    }
}

/// The `profile_tier_level()` syntax structure.
///
/// ISO/IEC 23008-2 - 7.3.3. The general block is always present; per
/// sub-layer profile blocks are consumed but only their level codes are
/// retained.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTierLevel {
    /// The `general_profile_space`; must be 0 for conforming streams.
    pub profile_space: u8,

    /// The `general_tier_flag`: main (false) or high (true) tier.
    pub tier_flag: bool,

    /// The `general_profile_idc` (1 = Main, 2 = Main 10, ...).
    pub profile_idc: u8,

    /// The `general_profile_compatibility_flag` word.
    pub profile_compatibility_flags: ProfileCompatibilityFlags,

    /// The `general_progressive_source_flag`.
    pub progressive_source_flag: bool,

    /// The `general_interlaced_source_flag`.
    pub interlaced_source_flag: bool,

    /// The `general_non_packed_constraint_flag`.
    pub non_packed_constraint_flag: bool,

    /// The `general_frame_only_constraint_flag`.
    pub frame_only_constraint_flag: bool,

    /// The `general_max_12bit_constraint_flag`.
    pub max_12bit_constraint_flag: bool,

    /// The `general_max_10bit_constraint_flag`.
    pub max_10bit_constraint_flag: bool,

    /// The `general_max_8bit_constraint_flag`.
    pub max_8bit_constraint_flag: bool,

    /// The `general_max_422chroma_constraint_flag`.
    pub max_422chroma_constraint_flag: bool,

    /// The `general_max_420chroma_constraint_flag`.
    pub max_420chroma_constraint_flag: bool,

    /// The `general_max_monochrome_constraint_flag`.
    pub max_monochrome_constraint_flag: bool,

    /// The `general_intra_constraint_flag`.
    pub intra_constraint_flag: bool,

    /// The `general_one_picture_only_constraint_flag`.
    pub one_picture_only_constraint_flag: bool,

    /// The `general_lower_bit_rate_constraint_flag`.
    pub lower_bit_rate_constraint_flag: bool,

    /// The `general_max_14bit_constraint_flag`.
    pub max_14bit_constraint_flag: bool,

    /// The `general_level_idc`; the level number multiplied by 30
    /// (120 = level 4).
    pub level_idc: u8,

    /// One `sub_layer_profile_present_flag` per sub-layer below the highest.
    pub sub_layer_profile_present_flags: Vec<bool>,

    /// One `sub_layer_level_present_flag` per sub-layer below the highest.
    pub sub_layer_level_present_flags: Vec<bool>,

    /// The `sub_layer_level_idc` of each sub-layer that signals one.
    pub sub_layer_level_idcs: Vec<Option<u8>>,
}

impl ProfileTierLevel {
    pub fn parse<R: io::Read>(bit_reader: &mut BitReader<R>, max_num_sub_layers_minus1: u8) -> io::Result<Self> {
        let profile_space = bit_reader.read_bits(2)? as u8;
        let tier_flag = bit_reader.read_bit()?;
        let profile_idc = bit_reader.read_bits(5)? as u8;

        let profile_compatibility_flags = ProfileCompatibilityFlags::from_bits_retain(bit_reader.read_bits(32)? as u32);

        let progressive_source_flag = bit_reader.read_bit()?;
        let interlaced_source_flag = bit_reader.read_bit()?;
        let non_packed_constraint_flag = bit_reader.read_bit()?;
        let frame_only_constraint_flag = bit_reader.read_bit()?;

        let max_12bit_constraint_flag = bit_reader.read_bit()?;
        let max_10bit_constraint_flag = bit_reader.read_bit()?;
        let max_8bit_constraint_flag = bit_reader.read_bit()?;
        let max_422chroma_constraint_flag = bit_reader.read_bit()?;
        let max_420chroma_constraint_flag = bit_reader.read_bit()?;
        let max_monochrome_constraint_flag = bit_reader.read_bit()?;
        let intra_constraint_flag = bit_reader.read_bit()?;
        let one_picture_only_constraint_flag = bit_reader.read_bit()?;
        let lower_bit_rate_constraint_flag = bit_reader.read_bit()?;
        let max_14bit_constraint_flag = bit_reader.read_bit()?;

        bit_reader.seek_bits(34)?; // general_reserved_zero_33bits + general_reserved_zero_bit

        let level_idc = bit_reader.read_u8()?;

        let sub_layers = max_num_sub_layers_minus1 as usize;
        let mut sub_layer_profile_present_flags = Vec::with_capacity(sub_layers);
        let mut sub_layer_level_present_flags = Vec::with_capacity(sub_layers);
        for _ in 0..sub_layers {
            sub_layer_profile_present_flags.push(bit_reader.read_bit()?);
            sub_layer_level_present_flags.push(bit_reader.read_bit()?);
        }

        // reserved_zero_2bits, padding the flag pairs up to eight sub-layers
        if sub_layers > 0 {
            bit_reader.seek_bits(2 * (8 - sub_layers as u32))?;
        }

        let mut sub_layer_level_idcs = vec![None; sub_layers];
        for i in 0..sub_layers {
            if sub_layer_profile_present_flags[i] {
                bit_reader.seek_bits(
                    2 // sub_layer_profile_space
                    + 1 // sub_layer_tier_flag
                    + 5 // sub_layer_profile_idc
                    + 32 // sub_layer_profile_compatibility_flag[32]
                    + 4, // source/packing/frame-only flags
                )?;
                bit_reader.seek_bits(44)?; // constraint flags + reserved bits
            }

            if sub_layer_level_present_flags[i] {
                sub_layer_level_idcs[i] = Some(bit_reader.read_u8()?);
            }
        }

        Ok(ProfileTierLevel {
            profile_space,
            tier_flag,
            profile_idc,
            profile_compatibility_flags,
            progressive_source_flag,
            interlaced_source_flag,
            non_packed_constraint_flag,
            frame_only_constraint_flag,
            max_12bit_constraint_flag,
            max_10bit_constraint_flag,
            max_8bit_constraint_flag,
            max_422chroma_constraint_flag,
            max_420chroma_constraint_flag,
            max_monochrome_constraint_flag,
            intra_constraint_flag,
            one_picture_only_constraint_flag,
            lower_bit_rate_constraint_flag,
            max_14bit_constraint_flag,
            level_idc,
            sub_layer_profile_present_flags,
            sub_layer_level_present_flags,
            sub_layer_level_idcs,
        })
    }
}
