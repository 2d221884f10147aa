use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use loupe_bitio::BitReader;
use loupe_expgolomb::BitReaderExpGolombExt;

use crate::error::ParserError;
use crate::io::EmulationPreventionIo;
use crate::nal::NalUnit;
use crate::parser::MAX_SPS_COUNT;
use crate::range_check::range_check;
use crate::{AspectRatioIdc, NALUnitType};

/// Default 4x4 intra scaling list from ISO/IEC 14496-10 Table 7-2.
const DEFAULT_4X4_INTRA: [u8; 16] = [
    6, 13, 13, 20, 20, 20, 28, 28, 28, 28, 32, 32, 32, 37, 37, 42,
];

/// Default 4x4 inter scaling list from ISO/IEC 14496-10 Table 7-2.
const DEFAULT_4X4_INTER: [u8; 16] = [
    10, 14, 14, 20, 20, 20, 24, 24, 24, 24, 27, 27, 27, 30, 30, 34,
];

/// Default 8x8 intra scaling list from ISO/IEC 14496-10 Table 7-2.
const DEFAULT_8X8_INTRA: [u8; 64] = [
    6, 10, 10, 13, 11, 13, 16, 16, 16, 16, 18, 18, 18, 18, 18, 23, 23, 23, 23, 23, 23, 25, 25, 25, 25, 25, 25, 25, 27,
    27, 27, 27, 27, 27, 27, 27, 29, 29, 29, 29, 29, 29, 29, 31, 31, 31, 31, 31, 31, 33, 33, 33, 33, 33, 36, 36, 36, 36,
    38, 38, 38, 40, 40, 42,
];

/// Default 8x8 inter scaling list from ISO/IEC 14496-10 Table 7-2.
const DEFAULT_8X8_INTER: [u8; 64] = [
    9, 13, 13, 15, 13, 15, 17, 17, 17, 17, 19, 19, 19, 19, 19, 21, 21, 21, 21, 21, 21, 22, 22, 22, 22, 22, 22, 22, 24,
    24, 24, 24, 24, 24, 24, 24, 25, 25, 25, 25, 25, 25, 25, 27, 27, 27, 27, 27, 27, 28, 28, 28, 28, 28, 30, 30, 30, 30,
    32, 32, 32, 33, 33, 35,
];

/// `SubWidthC` per `chroma_format_idc` (ISO/IEC 14496-10 Table 6-1).
const SUB_WIDTH_C: [u32; 4] = [1, 2, 2, 1];

/// `SubHeightC` per `chroma_format_idc` (ISO/IEC 14496-10 Table 6-1).
const SUB_HEIGHT_C: [u32; 4] = [1, 2, 1, 1];

/// The colour description carried in the VUI video signal type.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorConfig {
    /// The `video_full_range_flag`.
    pub full_range: bool,
    /// The `colour_primaries` code (2 = unspecified).
    pub color_primaries: u8,
    /// The `transfer_characteristics` code (2 = unspecified).
    pub transfer_characteristics: u8,
    /// The `matrix_coefficients` code (2 = unspecified).
    pub matrix_coefficients: u8,
}

/// The cropping rectangle derived from the frame cropping offsets, in luma
/// samples relative to the top-left corner of the decoded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge of the rectangle.
    pub x: u32,
    /// Top edge of the rectangle.
    pub y: u32,
    /// Width of the rectangle; never larger than the decoded width.
    pub width: u32,
    /// Height of the rectangle; never larger than the decoded height.
    pub height: u32,
}

/// A decoded Sequence Parameter Set.
///
/// Field names follow the `seq_parameter_set_data()` syntax of
/// ISO/IEC 14496-10 - 7.3.2.1; derived values sit at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Sps {
    /// The `seq_parameter_set_id`, 0..=31.
    pub id: u8,

    /// The `profile_idc` (66 = baseline, 77 = main, 100 = high, ...).
    pub profile_idc: u8,

    /// The `constraint_set0_flag` (constraints of Annex A.2.1).
    pub constraint_set0_flag: bool,

    /// The `constraint_set1_flag` (constraints of Annex A.2.2).
    pub constraint_set1_flag: bool,

    /// The `constraint_set2_flag` (constraints of Annex A.2.3).
    pub constraint_set2_flag: bool,

    /// The `constraint_set3_flag` (meaning depends on `profile_idc`).
    pub constraint_set3_flag: bool,

    /// The `constraint_set4_flag` (meaning depends on `profile_idc`).
    pub constraint_set4_flag: bool,

    /// The `constraint_set5_flag` (meaning depends on `profile_idc`).
    pub constraint_set5_flag: bool,

    /// The `level_idc`; the level number multiplied by ten (31 = level 3.1).
    pub level_idc: u8,

    /// The `chroma_format_idc`: 0 = monochrome, 1 = 4:2:0, 2 = 4:2:2,
    /// 3 = 4:4:4. Inferred as 1 for profiles whose SPS carries no chroma
    /// syntax.
    pub chroma_format_idc: u8,

    /// The `separate_colour_plane_flag`; only coded for 4:4:4.
    pub separate_colour_plane_flag: bool,

    /// The `bit_depth_luma_minus8` (luma bit depth minus eight).
    pub bit_depth_luma_minus8: u8,

    /// The `bit_depth_chroma_minus8` (chroma bit depth minus eight).
    pub bit_depth_chroma_minus8: u8,

    /// The `qpprime_y_zero_transform_bypass_flag`.
    pub qpprime_y_zero_transform_bypass_flag: bool,

    /// The `seq_scaling_matrix_present_flag`. When unset both scaling list
    /// tables hold the flat value 16.
    pub scaling_matrix_present_flag: bool,

    /// The six 4x4 scaling lists in Table 7-2 order (intra Y/Cb/Cr, then
    /// inter Y/Cb/Cr).
    pub scaling_lists_4x4: [[u8; 16]; 6],

    /// The six 8x8 scaling lists in Table 7-2 order.
    pub scaling_lists_8x8: [[u8; 64]; 6],

    /// The `log2_max_frame_num_minus4`, 0..=12.
    pub log2_max_frame_num_minus4: u8,

    /// The `pic_order_cnt_type`, 0..=2. Selects which of the three picture
    /// order count sub-syntaxes follows.
    pub pic_order_cnt_type: u8,

    /// The `log2_max_pic_order_cnt_lsb_minus4`; coded when
    /// `pic_order_cnt_type` is 0.
    pub log2_max_pic_order_cnt_lsb_minus4: u8,

    /// The `delta_pic_order_always_zero_flag`; coded when
    /// `pic_order_cnt_type` is 1.
    pub delta_pic_order_always_zero_flag: bool,

    /// The `offset_for_non_ref_pic`; coded when `pic_order_cnt_type` is 1.
    pub offset_for_non_ref_pic: i32,

    /// The `offset_for_top_to_bottom_field`; coded when
    /// `pic_order_cnt_type` is 1.
    pub offset_for_top_to_bottom_field: i32,

    /// The `offset_for_ref_frame` list; one entry per picture in the order
    /// count cycle (at most 255).
    pub offsets_for_ref_frame: Vec<i32>,

    /// The `max_num_ref_frames`.
    pub num_ref_frames: u32,

    /// The `gaps_in_frame_num_value_allowed_flag`.
    pub gaps_in_frame_num_value_allowed_flag: bool,

    /// The `pic_width_in_mbs_minus1`.
    pub pic_width_in_mbs_minus1: u32,

    /// The `pic_height_in_map_units_minus1`.
    pub pic_height_in_map_units_minus1: u32,

    /// The `frame_mbs_only_flag`; when unset the stream may code fields and
    /// a map unit covers two macroblock rows.
    pub frame_mbs_only_flag: bool,

    /// The `mb_adaptive_frame_field_flag`; coded when `frame_mbs_only_flag`
    /// is unset.
    pub mb_adaptive_frame_field_flag: bool,

    /// The `direct_8x8_inference_flag`.
    pub direct_8x8_inference_flag: bool,

    /// The `frame_cropping_flag`.
    pub frame_cropping_flag: bool,

    /// The `frame_crop_left_offset`, in crop units.
    pub frame_crop_left_offset: u32,

    /// The `frame_crop_right_offset`, in crop units.
    pub frame_crop_right_offset: u32,

    /// The `frame_crop_top_offset`, in crop units.
    pub frame_crop_top_offset: u32,

    /// The `frame_crop_bottom_offset`, in crop units.
    pub frame_crop_bottom_offset: u32,

    /// The `vui_parameters_present_flag`.
    pub vui_parameters_present_flag: bool,

    /// Frame rate from the VUI timing info, in frames per second. Zero when
    /// the stream carries none or VUI parsing was not requested.
    pub frame_rate: f64,

    /// Colour description from the VUI video signal type, when present and
    /// parsed.
    pub color_config: Option<ColorConfig>,

    /// Derived `ChromaArrayType`: equal to [`Sps::chroma_format_idc`] unless
    /// the colour planes are coded separately, in which case it is 0.
    pub chroma_array_type: u8,

    /// Derived `MaxFrameNum` (`2^(log2_max_frame_num_minus4 + 4)`).
    pub max_frame_num: u32,

    /// Decoded picture width in luma samples, before cropping.
    pub width: u32,

    /// Decoded picture height in luma samples, before cropping.
    pub height: u32,

    /// The cropping rectangle; `None` when the stream codes no cropping.
    pub crop_rect: Option<CropRect>,
}

impl Sps {
    /// Parses a Sequence Parameter Set from an identified NAL unit.
    ///
    /// When `parse_vui` is set, the VUI prefix is decoded as well to recover
    /// the frame rate and colour description. Returns the decoded set, or an
    /// error when the payload runs out of bits or a syntax element is out of
    /// its legal range; no partially decoded set is ever returned.
    pub fn parse(nalu: &NalUnit<'_>, parse_vui: bool) -> Result<Self, ParserError> {
        if nalu.nal_unit_type != NALUnitType::Sps {
            return Err(ParserError::Parse(io::Error::new(
                io::ErrorKind::InvalidData,
                "nal unit type is not SPS",
            )));
        }

        tracing::trace!("parsing sps");
        let mut bit_reader = BitReader::new(EmulationPreventionIo::new(nalu.payload()));

        let profile_idc = bit_reader.read_u8()?;
        let constraint_set0_flag = bit_reader.read_bit()?;
        let constraint_set1_flag = bit_reader.read_bit()?;
        let constraint_set2_flag = bit_reader.read_bit()?;
        let constraint_set3_flag = bit_reader.read_bit()?;
        let constraint_set4_flag = bit_reader.read_bit()?;
        let constraint_set5_flag = bit_reader.read_bit()?;
        bit_reader.seek_bits(2)?; // reserved_zero_2bits

        let level_idc = bit_reader.read_u8()?;

        let id = bit_reader.read_exp_golomb()?;
        range_check!(id, 0, MAX_SPS_COUNT as u64 - 1)?;
        let id = id as u8;

        // Fields below are only coded for the profiles that support chroma
        // format and bit depth selection; everything else implies 4:2:0 at
        // eight bits with flat scaling lists.
        let mut chroma_format_idc = 1u8;
        let mut separate_colour_plane_flag = false;
        let mut bit_depth_luma_minus8 = 0u8;
        let mut bit_depth_chroma_minus8 = 0u8;
        let mut qpprime_y_zero_transform_bypass_flag = false;
        let mut scaling_matrix_present_flag = false;
        let mut scaling_lists_4x4 = [[16u8; 16]; 6];
        let mut scaling_lists_8x8 = [[16u8; 64]; 6];

        if matches!(profile_idc, 100 | 110 | 122 | 244 | 44 | 83 | 86 | 118 | 128) {
            let idc = bit_reader.read_exp_golomb()?;
            range_check!(idc, 0, 3)?;
            chroma_format_idc = idc as u8;

            if chroma_format_idc == 3 {
                separate_colour_plane_flag = bit_reader.read_bit()?;
            }

            let depth = bit_reader.read_exp_golomb()?;
            range_check!(depth, 0, 6)?;
            bit_depth_luma_minus8 = depth as u8;

            let depth = bit_reader.read_exp_golomb()?;
            range_check!(depth, 0, 6)?;
            bit_depth_chroma_minus8 = depth as u8;

            qpprime_y_zero_transform_bypass_flag = bit_reader.read_bit()?;

            scaling_matrix_present_flag = bit_reader.read_bit()?;
            if scaling_matrix_present_flag {
                let n_lists = if chroma_format_idc != 3 { 8 } else { 12 };
                parse_scaling_lists(&mut bit_reader, &mut scaling_lists_4x4, &mut scaling_lists_8x8, n_lists)?;
            }
        }

        let log2_max_frame_num_minus4 = bit_reader.read_exp_golomb()?;
        range_check!(log2_max_frame_num_minus4, 0, 12)?;
        let log2_max_frame_num_minus4 = log2_max_frame_num_minus4 as u8;
        let max_frame_num = 1u32 << (log2_max_frame_num_minus4 + 4);

        let pic_order_cnt_type = bit_reader.read_exp_golomb()?;
        range_check!(pic_order_cnt_type, 0, 2)?;
        let pic_order_cnt_type = pic_order_cnt_type as u8;

        let mut log2_max_pic_order_cnt_lsb_minus4 = 0u8;
        let mut delta_pic_order_always_zero_flag = false;
        let mut offset_for_non_ref_pic = 0i32;
        let mut offset_for_top_to_bottom_field = 0i32;
        let mut offsets_for_ref_frame = Vec::new();

        if pic_order_cnt_type == 0 {
            let log2 = bit_reader.read_exp_golomb()?;
            range_check!(log2, 0, 12)?;
            log2_max_pic_order_cnt_lsb_minus4 = log2 as u8;
        } else if pic_order_cnt_type == 1 {
            delta_pic_order_always_zero_flag = bit_reader.read_bit()?;
            offset_for_non_ref_pic = read_se_i32(&mut bit_reader)?;
            offset_for_top_to_bottom_field = read_se_i32(&mut bit_reader)?;

            let cycle_len = bit_reader.read_exp_golomb()?;
            range_check!(cycle_len, 0, 255)?;

            offsets_for_ref_frame = Vec::with_capacity(cycle_len as usize);
            for _ in 0..cycle_len {
                offsets_for_ref_frame.push(read_se_i32(&mut bit_reader)?);
            }
        }

        let num_ref_frames = read_ue_u32(&mut bit_reader)?;
        let gaps_in_frame_num_value_allowed_flag = bit_reader.read_bit()?;
        let pic_width_in_mbs_minus1 = read_ue_u32(&mut bit_reader)?;
        let pic_height_in_map_units_minus1 = read_ue_u32(&mut bit_reader)?;
        let frame_mbs_only_flag = bit_reader.read_bit()?;

        let mut mb_adaptive_frame_field_flag = false;
        if !frame_mbs_only_flag {
            mb_adaptive_frame_field_flag = bit_reader.read_bit()?;
        }

        let direct_8x8_inference_flag = bit_reader.read_bit()?;

        let frame_cropping_flag = bit_reader.read_bit()?;
        let mut frame_crop_left_offset = 0u32;
        let mut frame_crop_right_offset = 0u32;
        let mut frame_crop_top_offset = 0u32;
        let mut frame_crop_bottom_offset = 0u32;
        if frame_cropping_flag {
            frame_crop_left_offset = read_ue_u32(&mut bit_reader)?;
            frame_crop_right_offset = read_ue_u32(&mut bit_reader)?;
            frame_crop_top_offset = read_ue_u32(&mut bit_reader)?;
            frame_crop_bottom_offset = read_ue_u32(&mut bit_reader)?;
        }

        let chroma_array_type = if separate_colour_plane_flag { 0 } else { chroma_format_idc };

        let width = (pic_width_in_mbs_minus1 as u64 + 1) * 16;
        let height = (2 - frame_mbs_only_flag as u64) * (pic_height_in_map_units_minus1 as u64 + 1) * 16;
        if width > i32::MAX as u64 || height > i32::MAX as u64 {
            return Err(ParserError::Parse(io::Error::new(
                io::ErrorKind::InvalidData,
                "invalid width/height in sps",
            )));
        }
        let width = width as u32;
        let height = height as u32;

        let crop_rect = if frame_cropping_flag {
            let crop_unit_x = SUB_WIDTH_C[chroma_format_idc as usize] as u64;
            let crop_unit_y = SUB_HEIGHT_C[chroma_format_idc as usize] as u64 * (2 - frame_mbs_only_flag as u64);

            let horizontal = (frame_crop_left_offset as u64 + frame_crop_right_offset as u64) * crop_unit_x;
            let vertical = (frame_crop_top_offset as u64 + frame_crop_bottom_offset as u64) * crop_unit_y;

            let rect_width = (width as u64).checked_sub(horizontal);
            let rect_height = (height as u64).checked_sub(vertical);
            let (Some(rect_width), Some(rect_height)) = (rect_width, rect_height) else {
                return Err(ParserError::Parse(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "cropping rectangle is larger than the picture",
                )));
            };

            Some(CropRect {
                x: (frame_crop_left_offset as u64 * crop_unit_x) as u32,
                y: (frame_crop_top_offset as u64 * crop_unit_y) as u32,
                width: rect_width as u32,
                height: rect_height as u32,
            })
        } else {
            None
        };

        let vui_parameters_present_flag = bit_reader.read_bit()?;

        let mut frame_rate = 0.0;
        let mut color_config = None;

        if vui_parameters_present_flag && parse_vui {
            // aspect_ratio_info_present_flag
            if bit_reader.read_bit()? {
                let aspect_ratio_idc = AspectRatioIdc::from(bit_reader.read_u8()?);
                if aspect_ratio_idc == AspectRatioIdc::ExtendedSar {
                    bit_reader.seek_bits(16)?; // sar_width
                    bit_reader.seek_bits(16)?; // sar_height
                }
            }

            // overscan_info_present_flag
            if bit_reader.read_bit()? {
                bit_reader.seek_bits(1)?; // overscan_appropriate_flag
            }

            // video_signal_type_present_flag
            if bit_reader.read_bit()? {
                bit_reader.seek_bits(3)?; // video_format
                let full_range = bit_reader.read_bit()?;

                // colour_description_present_flag
                let (color_primaries, transfer_characteristics, matrix_coefficients) = if bit_reader.read_bit()? {
                    (bit_reader.read_u8()?, bit_reader.read_u8()?, bit_reader.read_u8()?)
                } else {
                    (2, 2, 2) // UNSPECIFIED
                };

                color_config = Some(ColorConfig {
                    full_range,
                    color_primaries,
                    transfer_characteristics,
                    matrix_coefficients,
                });
            }

            // chroma_loc_info_present_flag
            if bit_reader.read_bit()? {
                bit_reader.read_exp_golomb()?; // chroma_sample_loc_type_top_field
                bit_reader.read_exp_golomb()?; // chroma_sample_loc_type_bottom_field
            }

            // timing_info_present_flag
            if bit_reader.read_bit()? {
                let num_units_in_tick = bit_reader.read_u32::<BigEndian>()?;
                let time_scale = bit_reader.read_u32::<BigEndian>()?;

                if num_units_in_tick == 0 {
                    return Err(ParserError::Parse(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "num_units_in_tick cannot be zero",
                    )));
                }

                frame_rate = time_scale as f64 / (2.0 * num_units_in_tick as f64);
            }
        }

        Ok(Sps {
            id,
            profile_idc,
            constraint_set0_flag,
            constraint_set1_flag,
            constraint_set2_flag,
            constraint_set3_flag,
            constraint_set4_flag,
            constraint_set5_flag,
            level_idc,
            chroma_format_idc,
            separate_colour_plane_flag,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            qpprime_y_zero_transform_bypass_flag,
            scaling_matrix_present_flag,
            scaling_lists_4x4,
            scaling_lists_8x8,
            log2_max_frame_num_minus4,
            pic_order_cnt_type,
            log2_max_pic_order_cnt_lsb_minus4,
            delta_pic_order_always_zero_flag,
            offset_for_non_ref_pic,
            offset_for_top_to_bottom_field,
            offsets_for_ref_frame,
            num_ref_frames,
            gaps_in_frame_num_value_allowed_flag,
            pic_width_in_mbs_minus1,
            pic_height_in_map_units_minus1,
            frame_mbs_only_flag,
            mb_adaptive_frame_field_flag,
            direct_8x8_inference_flag,
            frame_cropping_flag,
            frame_crop_left_offset,
            frame_crop_right_offset,
            frame_crop_top_offset,
            frame_crop_bottom_offset,
            vui_parameters_present_flag,
            frame_rate,
            color_config,
            chroma_array_type,
            max_frame_num,
            width,
            height,
            crop_rect,
        })
    }
}

fn read_ue_u32<R: io::Read>(reader: &mut BitReader<R>) -> io::Result<u32> {
    let value = reader.read_exp_golomb()?;
    range_check!(value, 0, u32::MAX as u64)?;
    Ok(value as u32)
}

fn read_se_i32<R: io::Read>(reader: &mut BitReader<R>) -> io::Result<i32> {
    let value = reader.read_signed_exp_golomb()?;
    range_check!(value, i32::MIN as i64, i32::MAX as i64)?;
    Ok(value as i32)
}

/// Decodes `scaling_list()` for all twelve list slots.
///
/// Lists beyond `n_lists`, and coded lists whose first delta lands on zero,
/// fall back per the Table 7-2 rules: defaults for the first slot of each
/// group, the previous list of the same kind otherwise.
fn parse_scaling_lists<R: io::Read>(
    reader: &mut BitReader<R>,
    lists_4x4: &mut [[u8; 16]; 6],
    lists_8x8: &mut [[u8; 64]; 6],
    n_lists: usize,
) -> io::Result<()> {
    const DEFAULTS: [&[u8]; 12] = [
        &DEFAULT_4X4_INTRA,
        &DEFAULT_4X4_INTRA,
        &DEFAULT_4X4_INTRA,
        &DEFAULT_4X4_INTER,
        &DEFAULT_4X4_INTER,
        &DEFAULT_4X4_INTER,
        &DEFAULT_8X8_INTRA,
        &DEFAULT_8X8_INTER,
        &DEFAULT_8X8_INTRA,
        &DEFAULT_8X8_INTER,
        &DEFAULT_8X8_INTRA,
        &DEFAULT_8X8_INTER,
    ];

    for i in 0..12 {
        let mut use_default = true;

        if i < n_lists && reader.read_bit()? {
            // scaling_list_present_flag
            use_default = false;

            let list: &mut [u8] = if i < 6 { &mut lists_4x4[i] } else { &mut lists_8x8[i - 6] };

            let mut last_scale: u8 = 8;
            let mut next_scale: u8 = 8;
            for j in 0..list.len() {
                if next_scale != 0 {
                    let delta_scale = reader.read_signed_exp_golomb()?;
                    next_scale = (last_scale as i64 + delta_scale).rem_euclid(256) as u8;
                }

                if j == 0 && next_scale == 0 {
                    // Use default scaling lists (7.4.2.1.1.1)
                    list.copy_from_slice(DEFAULTS[i]);
                    break;
                }

                let value = if next_scale == 0 { last_scale } else { next_scale };
                list[j] = value;
                last_scale = value;
            }
        }

        if use_default {
            match i {
                0 => lists_4x4[0] = DEFAULT_4X4_INTRA,
                1 => lists_4x4[1] = lists_4x4[0],
                2 => lists_4x4[2] = lists_4x4[1],
                3 => lists_4x4[3] = DEFAULT_4X4_INTER,
                4 => lists_4x4[4] = lists_4x4[3],
                5 => lists_4x4[5] = lists_4x4[4],
                6 => lists_8x8[0] = DEFAULT_8X8_INTRA,
                7 => lists_8x8[1] = DEFAULT_8X8_INTER,
                8 => lists_8x8[2] = lists_8x8[0],
                9 => lists_8x8[3] = lists_8x8[1],
                10 => lists_8x8[4] = lists_8x8[2],
                _ => lists_8x8[5] = lists_8x8[3],
            }
        }
    }

    Ok(())
}
