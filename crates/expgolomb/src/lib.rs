//! Exponential-Golomb coding as used by the H.264 and H.265 bitstream
//! syntax (`ue(v)` and `se(v)` descriptors).
//!
//! An unsigned value is coded as `k` leading zero bits, a one bit, and a
//! `k`-bit suffix; the decoded value is `2^k - 1 + suffix`. The signed
//! variant maps the unsigned sequence `0, 1, 2, 3, 4, ...` to
//! `0, 1, -1, 2, -2, ...`.
//!
//! The traits here extend [`BitReader`] and [`BitWriter`] so parsers can mix
//! fixed-width and Exp-Golomb reads on the same cursor.
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::missing_const_for_fn)]

use std::io;

use loupe_bitio::{BitReader, BitWriter};

/// Exp-Golomb read operations on a [`BitReader`].
pub trait BitReaderExpGolombExt {
    /// Reads an unsigned Exp-Golomb coded value (`ue(v)`).
    fn read_exp_golomb(&mut self) -> io::Result<u64>;

    /// Reads a signed Exp-Golomb coded value (`se(v)`).
    fn read_signed_exp_golomb(&mut self) -> io::Result<i64> {
        let value = self.read_exp_golomb()?;
        if value & 1 == 1 {
            Ok(value.div_ceil(2) as i64)
        } else {
            Ok(-((value / 2) as i64))
        }
    }
}

impl<R: io::Read> BitReaderExpGolombExt for BitReader<R> {
    fn read_exp_golomb(&mut self) -> io::Result<u64> {
        let mut leading_zeros = 0;
        while !self.read_bit()? {
            leading_zeros += 1;

            // A prefix this long cannot come from a valid stream; stop
            // before the suffix shift overflows.
            if leading_zeros > 63 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "exp golomb prefix longer than 63 bits",
                ));
            }
        }

        let suffix = self.read_bits(leading_zeros)?;
        Ok((1 << leading_zeros) - 1 + suffix)
    }
}

/// Exp-Golomb write operations on a [`BitWriter`].
pub trait BitWriterExpGolombExt {
    /// Writes an unsigned Exp-Golomb coded value (`ue(v)`).
    ///
    /// `u64::MAX` is not representable (the code space covers
    /// `0..=u64::MAX - 1`) and is rejected as invalid input.
    fn write_exp_golomb(&mut self, value: u64) -> io::Result<()>;

    /// Writes a signed Exp-Golomb coded value (`se(v)`).
    ///
    /// `i64::MIN` is not representable and is rejected as invalid input.
    fn write_signed_exp_golomb(&mut self, value: i64) -> io::Result<()> {
        let coded = if value <= 0 {
            value.unsigned_abs().checked_mul(2).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "value not representable as exp golomb")
            })?
        } else {
            value as u64 * 2 - 1
        };

        self.write_exp_golomb(coded)
    }
}

impl<W: io::Write> BitWriterExpGolombExt for BitWriter<W> {
    fn write_exp_golomb(&mut self, value: u64) -> io::Result<()> {
        let coded = value.checked_add(1).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "value not representable as exp golomb")
        })?;

        let bits = 64 - coded.leading_zeros() as u8;
        self.write_bits(0, bits - 1)?;
        self.write_bits(coded, bits)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use loupe_bitio::{BitReader, BitWriter};

    use crate::{BitReaderExpGolombExt, BitWriterExpGolombExt};

    #[test]
    fn decode_known_codewords() {
        // 1, 010, 011, 00100, 00101 back to back, padded to a byte.
        let mut reader = BitReader::new_from_slice([0b1_010_011_0, 0b0100_0010, 0b1000_0000]);

        assert_eq!(reader.read_exp_golomb().unwrap(), 0);
        assert_eq!(reader.read_exp_golomb().unwrap(), 1);
        assert_eq!(reader.read_exp_golomb().unwrap(), 2);
        assert_eq!(reader.read_exp_golomb().unwrap(), 3);
        assert_eq!(reader.read_exp_golomb().unwrap(), 4);
    }

    #[test]
    fn decode_known_signed_codewords() {
        // ue 0 => 0, ue 1 => 1, ue 2 => -1, ue 3 => 2, ue 4 => -2
        let mut reader = BitReader::new_from_slice([0b1_010_011_0, 0b0100_0010, 0b1000_0000]);

        assert_eq!(reader.read_signed_exp_golomb().unwrap(), 0);
        assert_eq!(reader.read_signed_exp_golomb().unwrap(), 1);
        assert_eq!(reader.read_signed_exp_golomb().unwrap(), -1);
        assert_eq!(reader.read_signed_exp_golomb().unwrap(), 2);
        assert_eq!(reader.read_signed_exp_golomb().unwrap(), -2);
    }

    #[test]
    fn unsigned_round_trip() {
        let values = [0u64, 1, 2, 255, 1000, 65536];

        let mut writer = BitWriter::new(Vec::new());
        for value in values {
            writer.write_exp_golomb(value).unwrap();
        }

        let mut reader = BitReader::new_from_slice(writer.finish().unwrap());
        for value in values {
            assert_eq!(reader.read_exp_golomb().unwrap(), value);
        }
    }

    #[test]
    fn signed_round_trip() {
        let values = [0i64, 1, -1, 2, -2, 255, -255, 1000, -1000];

        let mut writer = BitWriter::new(Vec::new());
        for value in values {
            writer.write_signed_exp_golomb(value).unwrap();
        }

        let mut reader = BitReader::new_from_slice(writer.finish().unwrap());
        for value in values {
            assert_eq!(reader.read_signed_exp_golomb().unwrap(), value);
        }
    }

    #[test]
    fn truncated_codeword_is_unexpected_eof() {
        // Prefix promises 6 suffix bits but the stream ends first.
        let mut reader = BitReader::new_from_slice([0b0000_0010]);

        let err = reader.read_exp_golomb().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn runaway_prefix_is_invalid_data() {
        let mut reader = BitReader::new_from_slice(vec![0u8; 16]);

        let err = reader.read_exp_golomb().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
