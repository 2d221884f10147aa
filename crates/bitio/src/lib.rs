//! Bit-level reading and writing on top of [`std::io`].
//!
//! Video bitstreams pack syntax elements at bit granularity. [`BitReader`]
//! and [`BitWriter`] wrap any [`std::io::Read`]/[`std::io::Write`] and track
//! a bit cursor, while still passing aligned byte accesses straight through
//! so the [`byteorder`] extension traits compose with them.
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

mod bit_read;
mod bit_write;

pub use self::bit_read::BitReader;
pub use self::bit_write::BitWriter;
