use std::io;

use loupe_bitio::{BitReader, BitWriter};
use loupe_expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

use crate::range_check::range_check;

/// The conformance window cropping offsets, in chroma units.
///
/// The output rectangle is
/// `width = pic_width_in_luma_samples - SubWidthC * (left + right)` and
/// `height = pic_height_in_luma_samples - SubHeightC * (top + bottom)`.
///
/// ISO/IEC 23008-2 - 7.4.3.2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConformanceWindow {
    /// The `conf_win_left_offset`.
    pub left_offset: u32,
    /// The `conf_win_right_offset`.
    pub right_offset: u32,
    /// The `conf_win_top_offset`.
    pub top_offset: u32,
    /// The `conf_win_bottom_offset`.
    pub bottom_offset: u32,
}

impl ConformanceWindow {
    /// Parses the four offsets coded when `conformance_window_flag` is set.
    pub fn parse<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let mut read_offset = || -> io::Result<u32> {
            let offset = bit_reader.read_exp_golomb()?;
            range_check!(offset, 0, u32::MAX as u64)?;
            Ok(offset as u32)
        };

        Ok(ConformanceWindow {
            left_offset: read_offset()?,
            right_offset: read_offset()?,
            top_offset: read_offset()?,
            bottom_offset: read_offset()?,
        })
    }

    /// Writes the four offsets back to a bitstream.
    pub fn build<W: io::Write>(&self, writer: &mut BitWriter<W>) -> io::Result<()> {
        writer.write_exp_golomb(self.left_offset as u64)?;
        writer.write_exp_golomb(self.right_offset as u64)?;
        writer.write_exp_golomb(self.top_offset as u64)?;
        writer.write_exp_golomb(self.bottom_offset as u64)?;
        Ok(())
    }
}
