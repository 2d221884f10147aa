use std::io;

use loupe_h264::scan_for_start_code;

use crate::NALUnitType;
use crate::error::ParserError;

/// One H.265 NAL unit located inside a caller-owned buffer.
///
/// The record only stores offsets into the buffer it was identified in; the
/// caller keeps ownership of the bytes and must keep them alive for as long
/// as the unit is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalUnit<'a> {
    data: &'a [u8],

    /// Offset of the start code prefix (or of the length prefix in
    /// length-prefixed mode). A zero byte directly in front of a three byte
    /// start code is folded in.
    pub sc_offset: usize,

    /// Offset of the first NAL unit header byte.
    pub offset: usize,

    /// Number of bytes in the unit counted from [`NalUnit::offset`], with
    /// trailing zero padding stripped in Annex-B mode.
    pub size: usize,

    /// Length of the NAL unit header in bytes. Always 2 for H.265.
    pub header_bytes: usize,

    /// The unit type from the header.
    pub nal_unit_type: NALUnitType,

    /// The `nuh_layer_id`: the layer this unit belongs or applies to.
    pub layer_id: u8,

    /// The `nuh_temporal_id_plus1`; the unit's temporal id plus one.
    pub temporal_id_plus1: u8,
}

impl<'a> NalUnit<'a> {
    /// Locates the next NAL unit in `data`, starting the scan at `offset`,
    /// without requiring the unit to be terminated inside the buffer.
    ///
    /// The returned unit's [`size`](NalUnit::size) extends to the end of the
    /// buffer (except for the fixed-size end-of-sequence and end-of-bitstream
    /// units). Use [`NalUnit::identify`] when the buffer is expected to hold
    /// the whole unit.
    pub fn identify_unchecked(data: &'a [u8], offset: usize) -> Result<Self, ParserError> {
        if data.len() < offset + 4 {
            return Err(ParserError::Parse(io::Error::new(
                io::ErrorKind::InvalidInput,
                "buffer too small to probe for a nal unit",
            )));
        }

        let Some(off) = scan_for_start_code(&data[offset..]) else {
            tracing::debug!("no start code prefix in this buffer");
            return Err(ParserError::NoNal);
        };

        // The start code may have a third zero byte in front; fold it in.
        let mut sc_offset = offset + off;
        if sc_offset > 0 && data[sc_offset - 1] == 0x00 {
            sc_offset -= 1;
        }

        let nal_offset = offset + off + 3;
        let size = data.len() - nal_offset;
        let (nal_unit_type, layer_id, temporal_id_plus1) = parse_header(&data[nal_offset..])?;

        // These two units are exactly two bytes and sit at the end of an
        // access unit; there is nothing to wait for after them.
        let size = if nal_unit_type == NALUnitType::EosNut || nal_unit_type == NALUnitType::EobNut {
            2
        } else {
            size
        };

        Ok(Self {
            data,
            sc_offset,
            offset: nal_offset,
            size,
            header_bytes: 2,
            nal_unit_type,
            layer_id,
            temporal_id_plus1,
        })
    }

    /// Locates the next complete NAL unit in `data`, starting the scan at
    /// `offset`.
    ///
    /// The unit's end is bounded by the next start code prefix; when none
    /// follows, [`ParserError::NoNalEnd`] asks the caller to supply more
    /// bytes and retry.
    pub fn identify(data: &'a [u8], offset: usize) -> Result<Self, ParserError> {
        let mut nalu = Self::identify_unchecked(data, offset)?;

        if nalu.nal_unit_type == NALUnitType::EosNut || nalu.nal_unit_type == NALUnitType::EobNut {
            return Ok(nalu);
        }

        let Some(mut end) = scan_for_start_code(&data[nalu.offset..]) else {
            tracing::debug!(offset = nalu.offset, "nal unit start found but no end");
            return Err(ParserError::NoNalEnd);
        };

        while end > 0 && data[nalu.offset + end - 1] == 0x00 {
            end -= 1;
        }

        if end < 3 {
            return Err(ParserError::BrokenData("nal unit is shorter than three bytes"));
        }

        nalu.size = end;
        Ok(nalu)
    }

    /// Locates a length-prefixed NAL unit, as stored in "hvcC" style sample
    /// data: a big-endian length of `nal_length_size` bytes (1 to 4)
    /// directly in front of the unit at `offset`.
    ///
    /// [`ParserError::NoNalEnd`] is returned when the declared length runs
    /// past the end of the buffer; no bytes outside the buffer are ever
    /// touched.
    pub fn identify_hevc(data: &'a [u8], offset: usize, nal_length_size: usize) -> Result<Self, ParserError> {
        if !(1..=4).contains(&nal_length_size) {
            return Err(ParserError::Parse(io::Error::new(
                io::ErrorKind::InvalidInput,
                "nal length size must be between 1 and 4 bytes",
            )));
        }

        if data.len() < offset + nal_length_size {
            return Err(ParserError::Parse(io::Error::new(
                io::ErrorKind::InvalidInput,
                "buffer too small to hold the length prefix",
            )));
        }

        let mut declared = 0usize;
        for &byte in &data[offset..offset + nal_length_size] {
            declared = (declared << 8) | byte as usize;
        }

        let available = data.len() - offset;
        if available < declared + nal_length_size {
            tracing::debug!(declared, available, "length prefix runs past the buffer");
            return Err(ParserError::NoNalEnd);
        }

        let nal_offset = offset + nal_length_size;
        let (nal_unit_type, layer_id, temporal_id_plus1) = parse_header(&data[nal_offset..nal_offset + declared])?;

        Ok(Self {
            data,
            sc_offset: offset,
            offset: nal_offset,
            size: declared,
            header_bytes: 2,
            nal_unit_type,
            layer_id,
            temporal_id_plus1,
        })
    }

    /// The unit's payload: the bytes after the two header bytes, still
    /// carrying any emulation prevention escapes.
    pub fn payload(&self) -> &'a [u8] {
        &self.data[self.offset + self.header_bytes..self.offset + self.size]
    }
}

/// Decodes the two byte NAL unit header
/// (`forbidden(1) type(6) layer_id(6) temporal_id_plus1(3)`).
fn parse_header(unit: &[u8]) -> Result<(NALUnitType, u8, u8), ParserError> {
    if unit.len() < 2 {
        return Err(ParserError::BrokenData("nal unit header is missing"));
    }

    let nal_unit_type = NALUnitType::from((unit[0] >> 1) & 0x3F);
    let layer_id = ((unit[0] & 0x01) << 5) | (unit[1] >> 3);
    let temporal_id_plus1 = unit[1] & 0x07;

    Ok((nal_unit_type, layer_id, temporal_id_plus1))
}
