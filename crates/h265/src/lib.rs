//! A pure Rust H.265 (HEVC) elementary stream header parser.
//!
//! The crate works on caller-owned byte buffers and never copies payload
//! data: [`NalUnit::identify`] locates the next NAL unit inside an Annex-B
//! fragment, [`NalUnit::identify_hevc`] does the same for length-prefixed
//! ("hvcC" style) sample data, and [`Sps::parse`] decodes a located sequence
//! parameter set. [`NalParser`] adds an optional per-stream table that
//! retains parameter sets by id.
//!
//! Emulation prevention bytes are stripped transparently while parsing,
//! through the shared [`loupe_h264::EmulationPreventionIo`] adapter.
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
// TODO: #![deny(missing_docs)]
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]
#![deny(clippy::missing_const_for_fn)]

mod enums;
mod range_check;

/// Error types.
pub mod error;
/// NAL unit identification.
pub mod nal;
/// The per-stream parsing context.
pub mod parser;
/// Sequence Parameter Set (SPS) functionality.
pub mod sps;

pub use self::enums::NALUnitType;
pub use self::error::ParserError;
pub use self::nal::NalUnit;
pub use self::parser::{MAX_SPS_COUNT, NalParser};
pub use self::sps::{
    ConformanceWindow, CropRect, ProfileCompatibilityFlags, ProfileTierLevel, Sps, SubLayerOrderingInfo,
};
