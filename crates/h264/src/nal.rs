use std::io;

use crate::NALUnitType;
use crate::error::ParserError;

/// Scans `data` for a three byte start code prefix (`00 00 01`).
///
/// Returns the offset of the first `00` of the match, or `None` when the
/// buffer holds no start code.
pub fn scan_for_start_code(data: &[u8]) -> Option<usize> {
    data.windows(3).position(|w| w == [0x00, 0x00, 0x01])
}

/// One H.264 NAL unit located inside a caller-owned buffer.
///
/// The record only stores offsets into the buffer it was identified in; the
/// caller keeps ownership of the bytes and must keep them alive for as long
/// as the unit is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalUnit<'a> {
    data: &'a [u8],

    /// Offset of the start code prefix that introduced this unit. Points at
    /// the first `00` of the matched `00 00 01`, extended one byte to the
    /// left when a four byte start code is recognized (SPS, PPS and access
    /// unit delimiter units only).
    pub sc_offset: usize,

    /// Offset of the NAL unit header byte (`sc_offset` of the matched three
    /// byte prefix plus three).
    pub offset: usize,

    /// Number of bytes in the unit counted from [`NalUnit::offset`], with
    /// trailing zero padding stripped. Zero bytes in front of the next start
    /// code belong to that start code, not to this unit.
    pub size: usize,

    /// Length of the NAL unit header in bytes. Always 1 for H.264.
    pub header_bytes: usize,

    /// The `nal_ref_idc` field: non-zero when the unit carries data needed
    /// as a reference.
    pub ref_idc: u8,

    /// The unit type from the header.
    pub nal_unit_type: NALUnitType,

    /// Whether this unit is a coded slice of an IDR picture.
    pub idr_pic_flag: bool,
}

impl<'a> NalUnit<'a> {
    /// Locates the next NAL unit in `data`, starting the scan at `offset`,
    /// without requiring the unit to be terminated inside the buffer.
    ///
    /// The returned unit's [`size`](NalUnit::size) extends to the end of the
    /// buffer (except for the fixed-size end-of-sequence and end-of-stream
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

        let mut sc_offset = offset + off;
        let nal_offset = sc_offset + 3;
        let size = data.len() - nal_offset;
        if size < 1 {
            return Err(ParserError::BrokenData("nal unit header is missing"));
        }

        let header = data[nal_offset];
        let nal_unit_type = NALUnitType::from(header & 0x1F);
        let ref_idc = (header & 0x60) >> 5;
        let idr_pic_flag = nal_unit_type == NALUnitType::SliceIdr;

        // The start code may have a third zero byte in front; fold it in for
        // the unit types that are commonly written with four byte prefixes.
        if sc_offset > 0
            && data[sc_offset - 1] == 0x00
            && (nal_unit_type == NALUnitType::Sps
                || nal_unit_type == NALUnitType::Pps
                || nal_unit_type == NALUnitType::AuDelimiter)
        {
            sc_offset -= 1;
        }

        // These two units are exactly one byte and sit at the end of an
        // access unit; there is nothing to wait for after them.
        let size = if nal_unit_type == NALUnitType::SeqEnd || nal_unit_type == NALUnitType::StreamEnd {
            1
        } else {
            size
        };

        Ok(Self {
            data,
            sc_offset,
            offset: nal_offset,
            size,
            header_bytes: 1,
            ref_idc,
            nal_unit_type,
            idr_pic_flag,
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

        if nalu.nal_unit_type == NALUnitType::SeqEnd || nalu.nal_unit_type == NALUnitType::StreamEnd {
            return Ok(nalu);
        }

        let Some(mut end) = scan_for_start_code(&data[nalu.offset..]) else {
            tracing::debug!(offset = nalu.offset, "nal unit start found but no end");
            return Err(ParserError::NoNalEnd);
        };

        while end > 0 && data[nalu.offset + end - 1] == 0x00 {
            end -= 1;
        }

        if end < 2 {
            return Err(ParserError::BrokenData("nal unit is shorter than two bytes"));
        }

        nalu.size = end;
        Ok(nalu)
    }

    /// The unit's payload: the bytes after the header, still carrying any
    /// emulation prevention escapes.
    pub fn payload(&self) -> &'a [u8] {
        &self.data[self.offset + self.header_bytes..self.offset + self.size]
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use crate::error::ParserError;
    use crate::nal::{NalUnit, scan_for_start_code};
    use crate::NALUnitType;

    #[test]
    fn scan_finds_first_prefix() {
        assert_eq!(scan_for_start_code(&[0xAB, 0x00, 0x00, 0x01, 0x67]), Some(1));
        assert_eq!(scan_for_start_code(&[0x00, 0x00, 0x00, 0x01, 0x67]), Some(1));
        assert_eq!(scan_for_start_code(&[0x00, 0x00, 0x02, 0x67]), None);
    }

    #[test]
    fn identify_complete_unit() {
        let data = [
            0x00, 0x00, 0x01, 0x41, 0xAA, 0xBB, 0xCC, // non-IDR slice
            0x00, 0x00, 0x01, 0x65, 0xDD, 0xEE, // IDR slice
        ];

        let nalu = NalUnit::identify(&data, 0).unwrap();
        assert_eq!(nalu.sc_offset, 0);
        assert_eq!(nalu.offset, 3);
        assert_eq!(nalu.size, 4);
        assert_eq!(nalu.nal_unit_type, NALUnitType::Slice);
        assert_eq!(nalu.ref_idc, 2);
        assert!(!nalu.idr_pic_flag);
        assert_eq!(nalu.payload(), [0xAA, 0xBB, 0xCC]);

        let next = NalUnit::identify_unchecked(&data, nalu.offset + nalu.size).unwrap();
        assert_eq!(next.sc_offset, 7);
        assert_eq!(next.offset, 10);
        assert_eq!(next.nal_unit_type, NALUnitType::SliceIdr);
        assert!(next.idr_pic_flag);
    }

    #[test]
    fn trailing_zeros_belong_to_the_next_start_code() {
        let data = [
            0x00, 0x00, 0x01, 0x41, 0xAA, 0xBB, 0x00, 0x00, // unit + zero padding
            0x00, 0x00, 0x01, 0x67, 0xAA, 0xBB, 0xCC,
        ];

        let nalu = NalUnit::identify(&data, 0).unwrap();
        assert_eq!(nalu.size, 3);
        assert_eq!(nalu.payload(), [0xAA, 0xBB]);
    }

    #[test]
    fn four_byte_start_code_is_absorbed_for_sps() {
        let data = [
            0x00, 0x00, 0x00, 0x01, 0x67, 0xAA, 0xBB, // SPS, four byte prefix
            0x00, 0x00, 0x01, 0x68, 0xCC, 0xDD,
        ];

        let nalu = NalUnit::identify(&data, 0).unwrap();
        assert_eq!(nalu.sc_offset, 0);
        assert_eq!(nalu.offset, 4);
        assert_eq!(nalu.nal_unit_type, NALUnitType::Sps);
    }

    #[test]
    fn four_byte_start_code_is_not_absorbed_for_slices() {
        let data = [
            0x00, 0x00, 0x00, 0x01, 0x41, 0xAA, 0xBB, 0x00, 0x00, 0x01, 0x41, 0xCC, 0xDD,
        ];

        let nalu = NalUnit::identify(&data, 0).unwrap();
        assert_eq!(nalu.sc_offset, 1);
        assert_eq!(nalu.offset, 4);
    }

    #[test]
    fn unterminated_unit_wants_more_data() {
        let data = [0x00, 0x00, 0x01, 0x41, 0xAA, 0xBB, 0xCC];

        assert!(matches!(NalUnit::identify(&data, 0), Err(ParserError::NoNalEnd)));

        // The unchecked variant accepts the same buffer.
        let nalu = NalUnit::identify_unchecked(&data, 0).unwrap();
        assert_eq!(nalu.size, 4);
    }

    #[test]
    fn no_start_code() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A];
        assert!(matches!(NalUnit::identify(&data, 0), Err(ParserError::NoNal)));
    }

    #[test]
    fn buffer_too_small_to_probe() {
        let data = [0x00, 0x00, 0x01];
        assert!(matches!(NalUnit::identify(&data, 0), Err(ParserError::Parse(_))));
        assert!(matches!(NalUnit::identify(&data, 1), Err(ParserError::Parse(_))));
    }

    #[test]
    fn end_of_sequence_has_fixed_size() {
        // End-of-sequence is one byte; no terminating start code required.
        let data = [0x00, 0x00, 0x01, 0x0A, 0xFF, 0xFF];

        let nalu = NalUnit::identify(&data, 0).unwrap();
        assert_eq!(nalu.nal_unit_type, NALUnitType::SeqEnd);
        assert_eq!(nalu.size, 1);
    }

    #[test]
    fn empty_unit_is_broken_data() {
        // A unit consisting of only a header before the next start code.
        let data = [0x00, 0x00, 0x01, 0x41, 0x00, 0x00, 0x01, 0x41, 0xAA, 0xBB];

        assert!(matches!(
            NalUnit::identify(&data, 0),
            Err(ParserError::BrokenData(_))
        ));
    }
}
