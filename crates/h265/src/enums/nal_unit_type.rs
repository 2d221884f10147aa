use nutype_enum::nutype_enum;

nutype_enum! {
    /// NAL (Network Abstraction Layer) unit types as defined by
    /// ISO/IEC 23008-2 Table 7-1.
    ///
    /// Types 0..=31 carry coded slice segments (the VCL class); everything
    /// above is parameter sets and stream-level markers.
    pub enum NALUnitType(u8) {
        /// Trailing picture, sub-layer non-reference
        TrailN = 0,

        /// Trailing picture, sub-layer reference
        TrailR = 1,

        /// TSA picture, sub-layer non-reference
        TsaN = 2,

        /// TSA picture, sub-layer reference
        TsaR = 3,

        /// STSA picture, sub-layer non-reference
        StsaN = 4,

        /// STSA picture, sub-layer reference
        StsaR = 5,

        /// RADL picture, sub-layer non-reference
        RadlN = 6,

        /// RADL picture, sub-layer reference
        RadlR = 7,

        /// RASL picture, sub-layer non-reference
        RaslN = 8,

        /// RASL picture, sub-layer reference
        RaslR = 9,

        /// BLA picture with leading pictures
        BlaWLp = 16,

        /// BLA picture with RADL pictures
        BlaWRadl = 17,

        /// BLA picture without leading pictures
        BlaNLp = 18,

        /// IDR picture with RADL pictures
        IdrWRadl = 19,

        /// IDR picture without leading pictures
        IdrNLp = 20,

        /// CRA picture
        CraNut = 21,

        /// Video parameter set
        VpsNut = 32,

        /// Sequence parameter set
        SpsNut = 33,

        /// Picture parameter set
        PpsNut = 34,

        /// Access unit delimiter
        AudNut = 35,

        /// End of sequence
        EosNut = 36,

        /// End of bitstream
        EobNut = 37,

        /// Filler data
        FdNut = 38,

        /// Supplemental enhancement information, prefix
        PrefixSeiNut = 39,

        /// Supplemental enhancement information, suffix
        SuffixSeiNut = 40
    }
}

impl NALUnitType {
    /// Returns `true` when this type carries a coded slice segment (the VCL
    /// NAL unit type class of ISO/IEC 23008-2 Table 7-1).
    pub const fn is_vcl(&self) -> bool {
        self.0 <= 31
    }
}
