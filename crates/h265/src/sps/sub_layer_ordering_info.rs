use std::io;

use loupe_bitio::BitReader;
use loupe_expgolomb::BitReaderExpGolombExt;

use crate::range_check::range_check;

/// The per-sub-layer decoded picture buffering bounds.
///
/// Each vector holds one entry per temporal sub-layer (index 0 up to
/// `sps_max_sub_layers_minus1`). When the bitstream codes only the highest
/// sub-layer, the lower layers inherit its values.
///
/// ISO/IEC 23008-2 - 7.4.3.2.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLayerOrderingInfo {
    /// The `sps_max_dec_pic_buffering_minus1` per sub-layer, 0..=16.
    pub max_dec_pic_buffering_minus1: Vec<u8>,
    /// The `sps_max_num_reorder_pics` per sub-layer; never larger than the
    /// buffering bound of the same sub-layer.
    pub max_num_reorder_pics: Vec<u8>,
    /// The `sps_max_latency_increase_plus1` per sub-layer.
    pub max_latency_increase_plus1: Vec<u32>,
}

impl SubLayerOrderingInfo {
    /// Parses the ordering info triples.
    ///
    /// When `info_present` is unset, only the highest sub-layer's triple is
    /// coded and every lower sub-layer inherits it.
    pub fn parse<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        info_present: bool,
        max_sub_layers_minus1: u8,
    ) -> io::Result<Self> {
        let layers = max_sub_layers_minus1 as usize + 1;
        let mut max_dec_pic_buffering_minus1 = vec![0u8; layers];
        let mut max_num_reorder_pics = vec![0u8; layers];
        let mut max_latency_increase_plus1 = vec![0u32; layers];

        let first = if info_present { 0 } else { max_sub_layers_minus1 as usize };
        for i in first..layers {
            let buffering = bit_reader.read_exp_golomb()?;
            range_check!(buffering, 0, 16)?;
            max_dec_pic_buffering_minus1[i] = buffering as u8;

            let reorder = bit_reader.read_exp_golomb()?;
            range_check!(reorder, 0, buffering)?;
            max_num_reorder_pics[i] = reorder as u8;

            let latency = bit_reader.read_exp_golomb()?;
            range_check!(latency, 0, u32::MAX as u64 - 1)?;
            max_latency_increase_plus1[i] = latency as u32;
        }

        if !info_present && max_sub_layers_minus1 > 0 {
            // Lower sub-layers inherit the highest sub-layer's values.
            let top = max_sub_layers_minus1 as usize;
            for i in 0..top {
                max_dec_pic_buffering_minus1[i] = max_dec_pic_buffering_minus1[top];
                max_num_reorder_pics[i] = max_num_reorder_pics[top];
                max_latency_increase_plus1[i] = max_latency_increase_plus1[top];
            }
        }

        Ok(SubLayerOrderingInfo {
            max_dec_pic_buffering_minus1,
            max_num_reorder_pics,
            max_latency_increase_plus1,
        })
    }
}
