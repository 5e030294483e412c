//! # qrstamp
//!
//! A small Rust library for encoding text into version 1 and version 2 QR codes.
//!
//! `qrstamp` encodes ISO-8859-1 text in byte mode following the QR Code Model 2 rules for the
//! two smallest symbol sizes (21x21 and 25x25 modules). It picks the version and error
//! correction level automatically or takes them from the caller, chooses the mask with the
//! lowest penalty score, and can record a snapshot of the grid after each construction stage.
//!
//! ## Features
//!
//! - Byte mode encoding with all four error correction levels: Low, Medium, Quartile, High.
//! - Automatic or manual version and level selection, with partial manual requests resolved.
//! - Mask selection by penalty score, or a forced mask.
//! - Step snapshots of the grid for teaching and debugging.
//! - Parallel batch encoding.
//! - Rendering as text, SVG, PNG files or in-memory image buffers.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrstamp = "0.1"
//! ```
//!
//! ## Example
//!
//! Encode with automatic sizing:
//!
//! ```rust
//! use qrstamp::{encode, EccLevel, EncodeOptions};
//!
//! let symbol = encode("Scan me!", &EncodeOptions::automatic()).unwrap();
//! assert_eq!(symbol.version().value(), 1);
//! assert_eq!(symbol.ecc(), EccLevel::Quartile);
//! ```
//!
//! Record each construction stage:
//!
//! ```rust
//! use qrstamp::{encode_with_recorder, EncodeOptions, Snapshot, Stage};
//!
//! let mut steps: Vec<Snapshot> = Vec::new();
//! encode_with_recorder("Scan me!", &EncodeOptions::automatic(), &mut steps).unwrap();
//! assert_eq!(steps.len(), 4);
//! assert_eq!(steps[3].stage(), Stage::FormatInformation);
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Encoder, options and the finished symbol.
//! - [`capacity`]: Capacity tables and version/level resolution.
//! - [`bitstream`]: Data codeword assembly.
//! - [`ecc`]: Reed-Solomon error correction.
//! - [`matrix`]: Module grid, function patterns and placement.
//! - [`mask`]: Mask patterns and penalty scoring.
//! - [`format`]: Format information.
//! - [`steps`]: Stage snapshots.
//! - [`helper`]: Utilities for rendering symbols in various formats.

pub mod bitstream;
pub mod capacity;
pub mod ecc;
pub mod error;
pub mod format;
pub mod helper;
pub mod mask;
pub mod matrix;
pub mod qrcode;
pub mod steps;
pub mod validate;

pub use crate::ecc::{ErrorCorrector, ReedSolomon};
pub use crate::error::EncodeError;
pub use crate::mask::{Penalty, PenaltyTable};
pub use crate::qrcode::{
    encode, encode_batch, encode_with_recorder, EccLevel, EncodeOptions, Encoder, Mask, SizeMode, Symbol, Version,
};
pub use crate::steps::{NoRecorder, Snapshot, Stage, StepRecorder};
pub use crate::validate::validate_text;
