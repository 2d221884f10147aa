//! Error types.

use std::io;

/// Error type for the H.265 parsing entry points.
///
/// The variants mirror the classic codec-parser result taxonomy so callers
/// can drive a streaming loop off them; a successful `Result` stands in for
/// the `OK` code.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// No start code prefix was found in the scanned range. The range holds
    /// no bitstream data, or more input is needed.
    #[error("no start code prefix in the scanned range")]
    NoNal,
    /// A unit was found but its end lies beyond the end of the buffer:
    /// either no terminating start code follows, or a length prefix declares
    /// more bytes than are available. Append more data and retry.
    #[error("nal unit end is beyond the supplied buffer")]
    NoNalEnd,
    /// A unit was identified but its contents are inconsistent. Discard it
    /// and resynchronize at the next start code.
    #[error("broken data: {0}")]
    BrokenData(&'static str),
    /// A referenced parameter set is missing. Defined for completeness of
    /// the result taxonomy; this crate never produces it.
    #[error("broken link: referenced parameter set is missing")]
    BrokenLink,
    /// The call was malformed, or a syntax element failed to decode (bit
    /// exhaustion, out-of-range value, bad derivation).
    #[error("parsing failed: {0}")]
    Parse(#[from] io::Error),
}
