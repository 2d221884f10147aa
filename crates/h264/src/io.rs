use std::io;

/// A wrapper around a [`std::io::Read`] or [`std::io::Write`] that removes or
/// inserts emulation prevention bytes while reading or writing respectively.
///
/// Inside a NAL unit the encoder escapes any `00 00 0x` (`x <= 3`) byte
/// sequence by inserting `03` after the two zero bytes; this adapter undoes
/// that escaping on the way in and applies it on the way out, so parsers can
/// work on the raw RBSP. [`crate::Sps::parse`] reads the unit payload through
/// this adapter.
///
/// Reads and writes go through one byte at a time, so the wrapped io should
/// be buffered (an in-memory slice or `Vec` is ideal).
pub struct EmulationPreventionIo<I> {
    inner: I,
    zero_count: u8,
}

impl<I> EmulationPreventionIo<I> {
    /// Wraps the given [`std::io::Read`] or [`std::io::Write`].
    pub const fn new(inner: I) -> Self {
        Self { inner, zero_count: 0 }
    }

    /// Consumes the wrapper and returns the underlying io.
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: io::Read> io::Read for EmulationPreventionIo<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut read_size = 0;
        let mut one_byte = [0u8; 1];

        while read_size < buf.len() {
            if self.inner.read(&mut one_byte)? == 0 {
                break;
            }

            match one_byte[0] {
                0x03 if self.zero_count >= 2 => {
                    self.zero_count = 0;
                    continue;
                }
                0x00 => self.zero_count += 1,
                _ => self.zero_count = 0,
            }

            buf[read_size] = one_byte[0];
            read_size += 1;
        }

        Ok(read_size)
    }
}

impl<I: io::Write> io::Write for EmulationPreventionIo<I> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if self.zero_count >= 2 && byte <= 0x03 {
                self.inner.write_all(&[0x03])?;
                self.zero_count = 0;
            }

            self.inner.write_all(&[byte])?;
            if byte == 0x00 {
                self.zero_count += 1;
            } else {
                self.zero_count = 0;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io::{Read, Write};

    use crate::EmulationPreventionIo;

    #[test]
    fn read_strips_escapes() {
        let escaped: &[u8] = &[0xAA, 0x00, 0x00, 0x03, 0x01, 0xBB, 0x00, 0x00, 0x03, 0x03];
        let mut reader = EmulationPreventionIo::new(escaped);

        let mut rbsp = Vec::new();
        reader.read_to_end(&mut rbsp).unwrap();
        assert_eq!(rbsp, [0xAA, 0x00, 0x00, 0x01, 0xBB, 0x00, 0x00, 0x03]);
    }

    #[test]
    fn write_inserts_escapes() {
        let mut writer = EmulationPreventionIo::new(Vec::new());

        writer.write_all(&[0xAA, 0x00, 0x00, 0x01, 0xBB, 0x00, 0x00, 0x00]).unwrap();
        writer.flush().unwrap();

        let escaped = writer.inner;
        assert_eq!(escaped, [0xAA, 0x00, 0x00, 0x03, 0x01, 0xBB, 0x00, 0x00, 0x03, 0x00]);
    }

    #[test]
    fn round_trip() {
        let rbsp = [0x00u8, 0x00, 0x02, 0x00, 0x00, 0x00, 0x7F, 0x00, 0x00, 0x03];

        let mut writer = EmulationPreventionIo::new(Vec::new());
        writer.write_all(&rbsp).unwrap();
        let escaped = writer.inner;

        let mut decoded = Vec::new();
        EmulationPreventionIo::new(escaped.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, rbsp);
    }
}
