use std::io;

use byteorder::ReadBytesExt;

/// A reader that yields one to 64 bits at a time from an underlying
/// [`io::Read`].
///
/// The cursor starts at the most significant bit of the first byte. Running
/// out of input surfaces as [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct BitReader<R> {
    inner: R,
    bit_pos: u8,
    current_byte: u8,
}

impl<R: io::Read> BitReader<R> {
    /// Creates a new reader over the given byte source.
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            bit_pos: 0,
            current_byte: 0,
        }
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> io::Result<bool> {
        if self.is_aligned() {
            self.current_byte = self.inner.read_u8()?;
        }

        let bit = (self.current_byte >> (7 - self.bit_pos)) & 1;
        self.bit_pos = (self.bit_pos + 1) % 8;
        Ok(bit == 1)
    }

    /// Reads `count` bits (at most 64) into the low end of a `u64`.
    pub fn read_bits(&mut self, count: u8) -> io::Result<u64> {
        let mut value = 0;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u64;
        }

        Ok(value)
    }

    /// Advances the cursor by `count` bits without returning a value.
    pub fn seek_bits(&mut self, count: u32) -> io::Result<()> {
        for _ in 0..count {
            self.read_bit()?;
        }

        Ok(())
    }

    /// Discards the remainder of the current byte so that the next read is
    /// byte-aligned. A no-op when the cursor is already aligned.
    pub fn align(&mut self) -> io::Result<()> {
        self.bit_pos = 0;
        Ok(())
    }
}

impl<R> BitReader<R> {
    /// Returns `true` if the cursor sits on a byte boundary.
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// Consumes the reader and returns the underlying byte source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl BitReader<io::Cursor<Vec<u8>>> {
    /// Creates a new reader owning the given bytes.
    pub fn new_from_slice(data: impl Into<Vec<u8>>) -> Self {
        Self::new(io::Cursor::new(data.into()))
    }
}

impl<R: io::Read> io::Read for BitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_aligned() {
            return self.inner.read(buf);
        }

        // Unaligned byte reads are assembled bit by bit. Hitting the end of
        // input mid-buffer reports the bytes read so far, like any reader.
        for (idx, byte) in buf.iter_mut().enumerate() {
            match self.read_bits(8) {
                Ok(value) => *byte = value as u8,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && idx > 0 => return Ok(idx),
                Err(e) => return Err(e),
            }
        }

        Ok(buf.len())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io::{self, Read};

    use byteorder::{BigEndian, ReadBytesExt};

    use crate::BitReader;

    #[test]
    fn read_single_bits() {
        let mut reader = BitReader::new_from_slice([0b1010_1100u8]);

        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
    }

    #[test]
    fn read_bits_across_byte_boundary() {
        let mut reader = BitReader::new_from_slice([0b1111_0000, 0b1010_0101]);

        assert_eq!(reader.read_bits(4).unwrap(), 0b1111);
        assert_eq!(reader.read_bits(8).unwrap(), 0b0000_1010);
        assert_eq!(reader.read_bits(4).unwrap(), 0b0101);
    }

    #[test]
    fn read_past_end_is_unexpected_eof() {
        let mut reader = BitReader::new_from_slice([0xFFu8]);

        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
        let err = reader.read_bit().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn seek_and_align() {
        let mut reader = BitReader::new_from_slice([0b0001_0000, 0xAB]);

        reader.seek_bits(3).unwrap();
        assert!(reader.read_bit().unwrap());
        assert!(!reader.is_aligned());
        reader.align().unwrap();
        assert!(reader.is_aligned());
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
    }

    #[test]
    fn aligned_reads_pass_through() {
        let mut reader = BitReader::new_from_slice([0x12, 0x34, 0x56, 0x78, 0x9A]);

        assert_eq!(reader.read_u8().unwrap(), 0x12);
        assert_eq!(reader.read_u32::<BigEndian>().unwrap(), 0x3456_789A);
    }

    #[test]
    fn unaligned_byte_reads() {
        let mut reader = BitReader::new_from_slice([0b0000_1111, 0b1111_0000]);

        assert_eq!(reader.read_bits(4).unwrap(), 0);
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(buf[0], 0xFF);
    }
}
