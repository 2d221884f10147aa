use nutype_enum::nutype_enum;

nutype_enum! {
    /// NAL (Network Abstraction Layer) unit types as defined by
    /// ISO/IEC 14496-10 Table 7-1.
    ///
    /// The `IdrPicFlag` derived by the standard is `1` exactly when the unit
    /// type is [`NALUnitType::SliceIdr`].
    pub enum NALUnitType(u8) {
        /// Unspecified (not used in decoding)
        Unknown = 0,

        /// Coded slice of a non-IDR picture
        Slice = 1,

        /// Coded slice data partition A
        SliceDpa = 2,

        /// Coded slice data partition B
        SliceDpb = 3,

        /// Coded slice data partition C
        SliceDpc = 4,

        /// Coded slice of an IDR picture
        SliceIdr = 5,

        /// Supplemental enhancement information
        Sei = 6,

        /// Sequence parameter set
        Sps = 7,

        /// Picture parameter set
        Pps = 8,

        /// Access unit delimiter
        AuDelimiter = 9,

        /// End of sequence
        SeqEnd = 10,

        /// End of stream
        StreamEnd = 11,

        /// Filler data
        FillerData = 12,

        /// Sequence parameter set extension
        SpsExt = 13,

        /// Prefix NAL unit
        PrefixUnit = 14,

        /// Subset sequence parameter set
        SubsetSps = 15,

        /// Depth parameter set
        DepthSps = 16,

        /// Coded slice of an auxiliary coded picture without partitioning
        SliceAux = 19,

        /// Coded slice extension
        SliceExt = 20,

        /// Coded slice extension for a depth view component
        SliceDepth = 21
    }
}
