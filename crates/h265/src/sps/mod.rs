use std::io;

use loupe_bitio::BitReader;
use loupe_expgolomb::BitReaderExpGolombExt;
use loupe_h264::EmulationPreventionIo;

use crate::NALUnitType;
use crate::error::ParserError;
use crate::nal::NalUnit;
use crate::parser::MAX_SPS_COUNT;
use crate::range_check::range_check;

mod conformance_window;
mod profile_tier_level;
mod sub_layer_ordering_info;

pub use self::conformance_window::ConformanceWindow;
pub use self::profile_tier_level::{ProfileCompatibilityFlags, ProfileTierLevel};
pub use self::sub_layer_ordering_info::SubLayerOrderingInfo;

/// `SubWidthC` per `chroma_format_idc` (ISO/IEC 23008-2 Table 6-1).
const SUB_WIDTH_C: [u32; 5] = [1, 2, 2, 1, 1];

/// `SubHeightC` per `chroma_format_idc` (ISO/IEC 23008-2 Table 6-1).
const SUB_HEIGHT_C: [u32; 5] = [1, 2, 1, 1, 1];

/// The cropping rectangle derived from the conformance window, in luma
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
/// Field names follow the `seq_parameter_set_rbsp()` syntax of
/// ISO/IEC 23008-2 - 7.3.2.2; derived values sit at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Sps {
    /// The `sps_seq_parameter_set_id`, 0..=15.
    pub id: u8,

    /// The `sps_max_sub_layers_minus1`: the number of temporal sub-layers
    /// minus one.
    pub max_sub_layers_minus1: u8,

    /// The `sps_temporal_id_nesting_flag`.
    pub temporal_id_nesting_flag: bool,

    /// The `profile_tier_level()` structure.
    pub profile_tier_level: ProfileTierLevel,

    /// The `chroma_format_idc`: 0 = monochrome, 1 = 4:2:0, 2 = 4:2:2,
    /// 3 = 4:4:4.
    pub chroma_format_idc: u8,

    /// The `separate_colour_plane_flag`; only coded for 4:4:4.
    pub separate_colour_plane_flag: bool,

    /// The `pic_width_in_luma_samples`; never zero.
    pub pic_width_in_luma_samples: u16,

    /// The `pic_height_in_luma_samples`; never zero.
    pub pic_height_in_luma_samples: u16,

    /// The conformance window offsets; `None` when the stream codes none.
    pub conformance_window: Option<ConformanceWindow>,

    /// The `bit_depth_luma_minus8` (luma bit depth minus eight).
    pub bit_depth_luma_minus8: u8,

    /// The `bit_depth_chroma_minus8` (chroma bit depth minus eight).
    pub bit_depth_chroma_minus8: u8,

    /// The `log2_max_pic_order_cnt_lsb_minus4`, 0..=12.
    pub log2_max_pic_order_cnt_lsb_minus4: u8,

    /// The per-sub-layer decoded picture buffering bounds.
    pub sub_layer_ordering_info: SubLayerOrderingInfo,

    /// The `log2_min_luma_coding_block_size_minus3`.
    pub log2_min_luma_coding_block_size_minus3: u8,

    /// The `log2_diff_max_min_luma_coding_block_size`.
    pub log2_diff_max_min_luma_coding_block_size: u8,

    /// The `log2_min_transform_block_size_minus2`.
    pub log2_min_transform_block_size_minus2: u8,

    /// The `log2_diff_max_min_transform_block_size`.
    pub log2_diff_max_min_transform_block_size: u8,

    /// The `max_transform_hierarchy_depth_inter`.
    pub max_transform_hierarchy_depth_inter: u8,

    /// The `max_transform_hierarchy_depth_intra`.
    pub max_transform_hierarchy_depth_intra: u8,

    /// Derived `ChromaArrayType`: equal to [`Sps::chroma_format_idc`] unless
    /// the colour planes are coded separately, in which case it is 0.
    pub chroma_array_type: u8,

    /// Decoded picture width in luma samples, before conformance cropping.
    pub width: u32,

    /// Decoded picture height in luma samples, before conformance cropping.
    pub height: u32,

    /// The cropping rectangle; `None` when the stream codes no conformance
    /// window.
    pub crop_rect: Option<CropRect>,
}

impl Sps {
    /// Parses a Sequence Parameter Set from an identified NAL unit.
    ///
    /// The unit must be of type [`NALUnitType::SpsNut`]. Returns the decoded
    /// set, or an error when the payload runs out of bits or a syntax
    /// element is out of its legal range; no partially decoded set is ever
    /// returned.
    pub fn parse(nalu: &NalUnit<'_>) -> Result<Self, ParserError> {
        if nalu.nal_unit_type != NALUnitType::SpsNut {
            return Err(ParserError::Parse(io::Error::new(
                io::ErrorKind::InvalidData,
                "nal unit type is not SPS_NUT",
            )));
        }

        tracing::trace!("parsing sps");
        let mut bit_reader = BitReader::new(EmulationPreventionIo::new(nalu.payload()));

        bit_reader.read_bits(4)?; // sps_video_parameter_set_id

        let max_sub_layers_minus1 = bit_reader.read_bits(3)? as u8;
        let temporal_id_nesting_flag = bit_reader.read_bit()?;

        let profile_tier_level = ProfileTierLevel::parse(&mut bit_reader, max_sub_layers_minus1)?;

        let id = bit_reader.read_exp_golomb()?;
        range_check!(id, 0, MAX_SPS_COUNT as u64 - 1)?;
        let id = id as u8;

        let chroma_format_idc = bit_reader.read_exp_golomb()?;
        range_check!(chroma_format_idc, 0, 3)?;
        let chroma_format_idc = chroma_format_idc as u8;

        let mut separate_colour_plane_flag = false;
        if chroma_format_idc == 3 {
            separate_colour_plane_flag = bit_reader.read_bit()?;
        }

        let pic_width_in_luma_samples = bit_reader.read_exp_golomb()?;
        range_check!(pic_width_in_luma_samples, 1, 16888)?;
        let pic_width_in_luma_samples = pic_width_in_luma_samples as u16;

        let pic_height_in_luma_samples = bit_reader.read_exp_golomb()?;
        range_check!(pic_height_in_luma_samples, 1, 16888)?;
        let pic_height_in_luma_samples = pic_height_in_luma_samples as u16;

        let conformance_window = if bit_reader.read_bit()? {
            Some(ConformanceWindow::parse(&mut bit_reader)?)
        } else {
            None
        };

        let bit_depth_luma_minus8 = bit_reader.read_exp_golomb()?;
        range_check!(bit_depth_luma_minus8, 0, 6)?;
        let bit_depth_luma_minus8 = bit_depth_luma_minus8 as u8;

        let bit_depth_chroma_minus8 = bit_reader.read_exp_golomb()?;
        range_check!(bit_depth_chroma_minus8, 0, 6)?;
        let bit_depth_chroma_minus8 = bit_depth_chroma_minus8 as u8;

        let log2_max_pic_order_cnt_lsb_minus4 = bit_reader.read_exp_golomb()?;
        range_check!(log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;
        let log2_max_pic_order_cnt_lsb_minus4 = log2_max_pic_order_cnt_lsb_minus4 as u8;

        let info_present = bit_reader.read_bit()?;
        let sub_layer_ordering_info = SubLayerOrderingInfo::parse(&mut bit_reader, info_present, max_sub_layers_minus1)?;

        // Bounds follow from the Annex-A profile constraint CtbLog2SizeY = 4..6.
        let log2_min_luma_coding_block_size_minus3 = bit_reader.read_exp_golomb()?;
        range_check!(log2_min_luma_coding_block_size_minus3, 0, 3)?;
        let log2_min_luma_coding_block_size_minus3 = log2_min_luma_coding_block_size_minus3 as u8;

        let log2_diff_max_min_luma_coding_block_size = bit_reader.read_exp_golomb()?;
        range_check!(log2_diff_max_min_luma_coding_block_size, 0, 6)?;
        let log2_diff_max_min_luma_coding_block_size = log2_diff_max_min_luma_coding_block_size as u8;

        let log2_min_transform_block_size_minus2 = bit_reader.read_exp_golomb()?;
        range_check!(log2_min_transform_block_size_minus2, 0, 3)?;
        let log2_min_transform_block_size_minus2 = log2_min_transform_block_size_minus2 as u8;

        let log2_diff_max_min_transform_block_size = bit_reader.read_exp_golomb()?;
        range_check!(log2_diff_max_min_transform_block_size, 0, 3)?;
        let log2_diff_max_min_transform_block_size = log2_diff_max_min_transform_block_size as u8;

        let max_transform_hierarchy_depth_inter = bit_reader.read_exp_golomb()?;
        range_check!(max_transform_hierarchy_depth_inter, 0, 4)?;
        let max_transform_hierarchy_depth_inter = max_transform_hierarchy_depth_inter as u8;

        let max_transform_hierarchy_depth_intra = bit_reader.read_exp_golomb()?;
        range_check!(max_transform_hierarchy_depth_intra, 0, 4)?;
        let max_transform_hierarchy_depth_intra = max_transform_hierarchy_depth_intra as u8;

        let chroma_array_type = if separate_colour_plane_flag { 0 } else { chroma_format_idc };

        let width = pic_width_in_luma_samples as u32;
        let height = pic_height_in_luma_samples as u32;

        let crop_rect = match &conformance_window {
            Some(window) => {
                let crop_unit_x = SUB_WIDTH_C[chroma_format_idc as usize] as u64;
                let crop_unit_y = SUB_HEIGHT_C[chroma_format_idc as usize] as u64;

                let horizontal = (window.left_offset as u64 + window.right_offset as u64) * crop_unit_x;
                let vertical = (window.top_offset as u64 + window.bottom_offset as u64) * crop_unit_y;

                let rect_width = (width as u64).checked_sub(horizontal);
                let rect_height = (height as u64).checked_sub(vertical);
                let (Some(rect_width), Some(rect_height)) = (rect_width, rect_height) else {
                    return Err(ParserError::Parse(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "conformance window is larger than the picture",
                    )));
                };

                Some(CropRect {
                    x: (window.left_offset as u64 * crop_unit_x) as u32,
                    y: (window.top_offset as u64 * crop_unit_y) as u32,
                    width: rect_width as u32,
                    height: rect_height as u32,
                })
            }
            None => None,
        };

        Ok(Sps {
            id,
            max_sub_layers_minus1,
            temporal_id_nesting_flag,
            profile_tier_level,
            chroma_format_idc,
            separate_colour_plane_flag,
            pic_width_in_luma_samples,
            pic_height_in_luma_samples,
            conformance_window,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            log2_max_pic_order_cnt_lsb_minus4,
            sub_layer_ordering_info,
            log2_min_luma_coding_block_size_minus3,
            log2_diff_max_min_luma_coding_block_size,
            log2_min_transform_block_size_minus2,
            log2_diff_max_min_transform_block_size,
            max_transform_hierarchy_depth_inter,
            max_transform_hierarchy_depth_intra,
            chroma_array_type,
            width,
            height,
            crop_rect,
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use loupe_bitio::BitWriter;
    use loupe_expgolomb::BitWriterExpGolombExt;
    use loupe_h264::EmulationPreventionIo;

    use crate::error::ParserError;
    use crate::nal::NalUnit;
    use crate::sps::{ConformanceWindow, CropRect, ProfileCompatibilityFlags, Sps};

    struct SpsParams {
        id: u64,
        max_sub_layers_minus1: u8,
        width: u64,
        height: u64,
        conformance_window: Option<ConformanceWindow>,
    }

    impl Default for SpsParams {
        fn default() -> Self {
            Self {
                id: 0,
                max_sub_layers_minus1: 0,
                width: 1920,
                height: 1088,
                conformance_window: None,
            }
        }
    }

    /// Writes a Main profile SPS NAL (header plus escaped payload).
    fn build_sps(params: SpsParams) -> Vec<u8> {
        let mut writer = BitWriter::new(EmulationPreventionIo::new(vec![0x42u8, 0x01]));

        writer.write_bits(0, 4).unwrap(); // sps_video_parameter_set_id
        writer.write_bits(params.max_sub_layers_minus1 as u64, 3).unwrap();
        writer.write_bit(true).unwrap(); // sps_temporal_id_nesting_flag

        // profile_tier_level: general block
        writer.write_bits(0, 2).unwrap(); // general_profile_space
        writer.write_bit(false).unwrap(); // general_tier_flag
        writer.write_bits(1, 5).unwrap(); // general_profile_idc (Main)
        writer.write_bits((1 << 30) as u64, 32).unwrap(); // compatibility: Main
        writer.write_bit(true).unwrap(); // general_progressive_source_flag
        writer.write_bit(false).unwrap(); // general_interlaced_source_flag
        writer.write_bit(false).unwrap(); // general_non_packed_constraint_flag
        writer.write_bit(true).unwrap(); // general_frame_only_constraint_flag
        writer.write_bits(0, 44).unwrap(); // constraint flags + reserved bits
        writer.write_bits(120, 8).unwrap(); // general_level_idc (level 4)

        for _ in 0..params.max_sub_layers_minus1 {
            writer.write_bit(false).unwrap(); // sub_layer_profile_present_flag
            writer.write_bit(false).unwrap(); // sub_layer_level_present_flag
        }
        if params.max_sub_layers_minus1 > 0 {
            writer.write_bits(0, 2 * (8 - params.max_sub_layers_minus1)).unwrap();
        }

        writer.write_exp_golomb(params.id).unwrap(); // sps_seq_parameter_set_id
        writer.write_exp_golomb(1).unwrap(); // chroma_format_idc (4:2:0)
        writer.write_exp_golomb(params.width).unwrap();
        writer.write_exp_golomb(params.height).unwrap();

        match &params.conformance_window {
            Some(window) => {
                writer.write_bit(true).unwrap();
                window.build(&mut writer).unwrap();
            }
            None => writer.write_bit(false).unwrap(),
        }

        writer.write_exp_golomb(0).unwrap(); // bit_depth_luma_minus8
        writer.write_exp_golomb(0).unwrap(); // bit_depth_chroma_minus8
        writer.write_exp_golomb(0).unwrap(); // log2_max_pic_order_cnt_lsb_minus4

        writer.write_bit(false).unwrap(); // sps_sub_layer_ordering_info_present_flag
        writer.write_exp_golomb(4).unwrap(); // sps_max_dec_pic_buffering_minus1
        writer.write_exp_golomb(1).unwrap(); // sps_max_num_reorder_pics
        writer.write_exp_golomb(0).unwrap(); // sps_max_latency_increase_plus1

        writer.write_exp_golomb(0).unwrap(); // log2_min_luma_coding_block_size_minus3
        writer.write_exp_golomb(3).unwrap(); // log2_diff_max_min_luma_coding_block_size
        writer.write_exp_golomb(0).unwrap(); // log2_min_transform_block_size_minus2
        writer.write_exp_golomb(3).unwrap(); // log2_diff_max_min_transform_block_size
        writer.write_exp_golomb(0).unwrap(); // max_transform_hierarchy_depth_inter
        writer.write_exp_golomb(0).unwrap(); // max_transform_hierarchy_depth_intra

        writer.finish().unwrap().into_inner()
    }

    fn parse(sps_nal: &[u8]) -> Result<Sps, ParserError> {
        let mut data = vec![0x00, 0x00, 0x01];
        data.extend_from_slice(sps_nal);

        let nalu = NalUnit::identify_unchecked(&data, 0).unwrap();
        Sps::parse(&nalu)
    }

    #[test]
    fn parse_main_profile_1080p() {
        let sps = parse(&build_sps(SpsParams::default())).unwrap();

        assert_eq!(sps.id, 0);
        assert_eq!(sps.max_sub_layers_minus1, 0);
        assert!(sps.temporal_id_nesting_flag);
        assert_eq!(sps.profile_tier_level.profile_idc, 1);
        assert_eq!(sps.profile_tier_level.level_idc, 120);
        assert!(
            sps.profile_tier_level
                .profile_compatibility_flags
                .contains(ProfileCompatibilityFlags::MAIN)
        );
        assert!(sps.profile_tier_level.progressive_source_flag);
        assert!(sps.profile_tier_level.frame_only_constraint_flag);
        assert_eq!(sps.chroma_format_idc, 1);
        assert_eq!(sps.chroma_array_type, 1);
        assert_eq!(sps.width, 1920);
        assert_eq!(sps.height, 1088);
        assert_eq!(sps.crop_rect, None);
        assert_eq!(sps.sub_layer_ordering_info.max_dec_pic_buffering_minus1, [4]);
        assert_eq!(sps.sub_layer_ordering_info.max_num_reorder_pics, [1]);
        assert_eq!(sps.log2_diff_max_min_luma_coding_block_size, 3);
    }

    #[test]
    fn conformance_window_produces_the_crop_rect() {
        // A bottom offset of 4 in 4:2:0 removes 8 luma rows.
        let sps = parse(&build_sps(SpsParams {
            conformance_window: Some(ConformanceWindow {
                left_offset: 0,
                right_offset: 0,
                top_offset: 0,
                bottom_offset: 4,
            }),
            ..Default::default()
        }))
        .unwrap();

        assert_eq!(sps.width, 1920);
        assert_eq!(sps.height, 1088);
        assert_eq!(
            sps.crop_rect,
            Some(CropRect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            })
        );
    }

    #[test]
    fn lower_sub_layers_inherit_the_ordering_info() {
        let sps = parse(&build_sps(SpsParams {
            max_sub_layers_minus1: 2,
            ..Default::default()
        }))
        .unwrap();

        assert_eq!(sps.max_sub_layers_minus1, 2);
        assert_eq!(sps.sub_layer_ordering_info.max_dec_pic_buffering_minus1, [4, 4, 4]);
        assert_eq!(sps.sub_layer_ordering_info.max_num_reorder_pics, [1, 1, 1]);
        assert_eq!(sps.sub_layer_ordering_info.max_latency_increase_plus1, [0, 0, 0]);
        assert_eq!(sps.profile_tier_level.sub_layer_level_idcs, [None, None]);
    }

    #[test]
    fn out_of_range_id_is_rejected() {
        let result = parse(&build_sps(SpsParams {
            id: 16,
            ..Default::default()
        }));

        assert!(matches!(result, Err(ParserError::Parse(_))));
    }

    #[test]
    fn zero_width_is_rejected() {
        let result = parse(&build_sps(SpsParams {
            width: 0,
            ..Default::default()
        }));

        assert!(matches!(result, Err(ParserError::Parse(_))));
    }

    #[test]
    fn oversized_conformance_window_is_rejected() {
        let result = parse(&build_sps(SpsParams {
            conformance_window: Some(ConformanceWindow {
                left_offset: 0,
                right_offset: 0,
                top_offset: 0,
                bottom_offset: 4000,
            }),
            ..Default::default()
        }));

        assert!(matches!(result, Err(ParserError::Parse(_))));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        assert!(matches!(
            parse(&[0x42, 0x01, 0x01]),
            Err(ParserError::Parse(_))
        ));
    }

    #[test]
    fn non_sps_unit_is_rejected() {
        let data = [0x00, 0x00, 0x01, 0x40, 0x01, 0xAA, 0xBB];
        let nalu = NalUnit::identify_unchecked(&data, 0).unwrap();
        assert!(matches!(Sps::parse(&nalu), Err(ParserError::Parse(_))));
    }
}
