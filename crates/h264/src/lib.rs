//! A pure Rust H.264 (AVC) elementary stream header parser.
//!
//! The crate works on caller-owned byte buffers and never copies payload
//! data: [`NalUnit::identify`] locates the next NAL unit inside an Annex-B
//! fragment, [`Sps::parse`] decodes a located sequence parameter set, and
//! [`extract_sei_payload`] pulls unregistered user data out of SEI units.
//! [`NalParser`] adds an optional per-stream table that retains parameter
//! sets by id.
//!
//! ## Notable features
//!
//! - Streaming friendly: an unterminated unit reports
//!   [`ParserError::NoNalEnd`] so the caller can append bytes and retry.
//! - No partial records: every entry point either returns a fully decoded
//!   value or an error.
//! - Emulation prevention bytes (`00 00 03`) are stripped transparently while
//!   parsing ([`EmulationPreventionIo`]).
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

mod enums;
mod range_check;

/// Error types.
pub mod error;
/// Emulation prevention byte handling.
pub mod io;
/// NAL unit identification.
pub mod nal;
/// The per-stream parsing context.
pub mod parser;
/// SEI user data extraction.
pub mod sei;
/// Sequence Parameter Set (SPS) functionality.
pub mod sps;

pub use self::enums::{AspectRatioIdc, NALUnitType};
pub use self::error::ParserError;
pub use self::io::EmulationPreventionIo;
pub use self::nal::{NalUnit, scan_for_start_code};
pub use self::parser::{MAX_SPS_COUNT, NalParser};
pub use self::sei::extract_sei_payload;
pub use self::sps::{ColorConfig, CropRect, Sps};
