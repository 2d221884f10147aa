use crate::error::ParserError;
use crate::nal::NalUnit;
use crate::sps::Sps;

/// The number of distinct `seq_parameter_set_id` values an H.264 stream may
/// use.
pub const MAX_SPS_COUNT: usize = 32;

/// A per-stream parsing context.
///
/// Identification and parsing work without any context; this type adds a
/// table that retains every successfully parsed SPS by its id, so that later
/// units referencing a parameter set can be resolved against it.
#[derive(Debug)]
pub struct NalParser {
    sps: [Option<Sps>; MAX_SPS_COUNT],
    last_sps: Option<u8>,
}

impl NalParser {
    /// Creates an empty parsing context.
    pub fn new() -> Self {
        Self {
            sps: std::array::from_fn(|_| None),
            last_sps: None,
        }
    }

    /// Parses a sequence parameter set from `nalu` and retains it.
    ///
    /// On success the set is stored in the table slot of its id (replacing
    /// any earlier set with the same id) and becomes the most recent one. On
    /// failure the table is left untouched.
    pub fn parse_sps(&mut self, nalu: &NalUnit<'_>, parse_vui: bool) -> Result<Sps, ParserError> {
        let sps = Sps::parse(nalu, parse_vui)?;

        tracing::debug!(id = sps.id, "retaining sequence parameter set");
        self.sps[sps.id as usize] = Some(sps.clone());
        self.last_sps = Some(sps.id);

        Ok(sps)
    }

    /// Returns the retained SPS with the given id, if any.
    pub fn sps(&self, id: u8) -> Option<&Sps> {
        self.sps.get(id as usize)?.as_ref()
    }

    /// Returns the most recently parsed SPS, if any.
    pub fn last_sps(&self) -> Option<&Sps> {
        self.sps(self.last_sps?)
    }
}

impl Default for NalParser {
    fn default() -> Self {
        Self::new()
    }
}
