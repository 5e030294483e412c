#![forbid(unsafe_code)]
//! QR code encoding pipeline.
//!
//! This module holds the value types shared by every stage ([`Version`], [`EccLevel`], [`Mask`]),
//! the caller-facing options ([`EncodeOptions`], [`SizeMode`]), the finished [`Symbol`], and the
//! [`Encoder`] that drives a text through resolution, bitstream assembly, error correction,
//! function patterns, data placement, masking and format information.
use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::bitstream;
use crate::capacity::{self, Resolution};
use crate::ecc::{ErrorCorrector, ReedSolomon};
use crate::error::EncodeError;
use crate::format::{self, FormatWord};
use crate::mask::{self, Penalty, PenaltyTable};
use crate::matrix::{codeword_bits, ModuleGrid};
use crate::steps::{NoRecorder, Stage, StepRecorder};
use crate::validate::validate_text;

/// A finished QR Code symbol: a square grid of dark and light modules plus the
/// parameters it was built with.
///
/// Instances are immutable once [`encode`] returns them. Each symbol owns its own
/// grid, so symbols can be moved across threads and encoded in parallel freely.
///
/// # Example
///
/// ```rust
/// use qrstamp::{encode, EccLevel, EncodeOptions, Version};
///
/// let options = EncodeOptions::manual(Version::new(1), EccLevel::Low);
/// let symbol = encode("Scan me!", &options).unwrap();
///
/// assert_eq!(symbol.size(), 21);
/// assert_eq!(symbol.data_codewords().len(), 19);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    version: Version,
    ecc: EccLevel,
    grid: ModuleGrid,
    mask: Mask,
    penalty: Penalty,
    penalties: Option<PenaltyTable>,
    codewords: Vec<u8>,
    data_len: usize,
}

impl Symbol {
    /// Returns this symbol's version, 1 or 2.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this symbol's error correction level.
    pub fn ecc(&self) -> EccLevel {
        self.ecc
    }

    /// Returns the width and height in modules: 21 for version 1, 25 for version 2.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Returns the mask pattern applied to the data region.
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the penalty of the applied mask, scored before format information was written.
    pub fn penalty(&self) -> Penalty {
        self.penalty
    }

    /// Returns the score table of all eight candidates when the mask was chosen automatically.
    pub fn penalties(&self) -> Option<&PenaltyTable> {
        self.penalties.as_ref()
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the
    /// symbol return `false`, which lets renderers draw a quiet zone without special cases.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let size = self.size() as i32;
        let range = 0..size;
        range.contains(&x) && range.contains(&y) && self.grid.get(x as usize, y as usize)
    }

    /// Returns whether the module at the given coordinates belongs to a function pattern or
    /// the format area.
    pub fn is_reserved(&self, x: usize, y: usize) -> bool {
        self.grid.is_reserved(x, y)
    }

    /// Returns the underlying module grid.
    pub fn grid(&self) -> &ModuleGrid {
        &self.grid
    }

    /// Returns the full codeword sequence: data codewords followed by EC codewords.
    pub fn codewords(&self) -> &[u8] {
        &self.codewords
    }

    /// Returns the data codewords produced by the bitstream encoder.
    pub fn data_codewords(&self) -> &[u8] {
        &self.codewords[..self.data_len]
    }

    /// Returns the error correction codewords.
    pub fn ec_codewords(&self) -> &[u8] {
        &self.codewords[self.data_len..]
    }
}

/// How the version and error correction level are chosen.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SizeMode {
    /// Smallest version that holds the text, then the strongest level that still fits.
    #[default]
    Automatic,
    /// Caller-chosen version and/or level. A missing half is filled in deterministically;
    /// at least one must be given.
    Manual {
        version: Option<Version>,
        ecc: Option<EccLevel>,
    },
}

/// Options for a single encode call.
///
/// `Default` is fully automatic: version, level and mask are all chosen by the encoder.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EncodeOptions {
    pub mode: SizeMode,
    /// `None` selects the mask with the lowest penalty; `Some` forces a pattern.
    pub mask: Option<Mask>,
}

impl EncodeOptions {
    pub fn automatic() -> Self {
        Self::default()
    }

    /// Pins both the version and the error correction level.
    pub fn manual(version: Version, ecc: EccLevel) -> Self {
        Self {
            mode: SizeMode::Manual {
                version: Some(version),
                ecc: Some(ecc),
            },
            mask: None,
        }
    }

    pub fn with_mode(mut self, mode: SizeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// Drives text through the full encoding pipeline.
///
/// The error correction stage is pluggable through [`ErrorCorrector`]; the default is the
/// standard QR Reed-Solomon code.
#[derive(Clone, Debug, Default)]
pub struct Encoder<C = ReedSolomon> {
    options: EncodeOptions,
    corrector: C,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            options,
            corrector: ReedSolomon,
        }
    }
}

impl<C: ErrorCorrector> Encoder<C> {
    /// Replaces the error correction codeword generator.
    pub fn with_corrector<D: ErrorCorrector>(self, corrector: D) -> Encoder<D> {
        Encoder {
            options: self.options,
            corrector,
        }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encodes a text string into a symbol.
    pub fn encode(&self, text: &str) -> Result<Symbol, EncodeError> {
        self.encode_recorded(text, &mut NoRecorder)
    }

    /// Encodes a text string, handing a snapshot of the grid to `recorder` after each
    /// construction stage.
    ///
    /// Every call emits one `tracing` event describing the outcome (text length, version,
    /// level, mask, success or failure).
    #[instrument(level = "debug", skip_all, fields(text_len = text.chars().count()))]
    pub fn encode_recorded<R>(&self, text: &str, recorder: &mut R) -> Result<Symbol, EncodeError>
    where
        R: StepRecorder + ?Sized,
    {
        let result = self.build(text, recorder);
        match &result {
            Ok(symbol) => info!(
                text_len = text.chars().count(),
                version = symbol.version.value(),
                ecc = %symbol.ecc,
                mask = symbol.mask.value(),
                penalty = symbol.penalty.total(),
                "symbol encoded"
            ),
            Err(err) => warn!(text_len = text.chars().count(), error = %err, "encode failed"),
        }
        result
    }

    fn build<R>(&self, text: &str, recorder: &mut R) -> Result<Symbol, EncodeError>
    where
        R: StepRecorder + ?Sized,
    {
        validate_text(text)?;

        let resolution: Resolution = capacity::resolve(self.options.mode, text.chars().count())?;
        debug!(
            version = resolution.version.value(),
            ecc = %resolution.ecc,
            data_bits = resolution.data_bits,
            ec_codewords = resolution.ec_codewords,
            "resolved symbol parameters"
        );

        let data = bitstream::encode_data(text, &resolution)?;
        let codewords = self.corrector.encode(&data, resolution.ec_codewords);
        debug_assert_eq!(codewords.len(), data.len() + resolution.ec_codewords);

        // Function patterns depend only on the version, so nothing is drawn for a failed encode
        let mut grid = ModuleGrid::with_function_patterns(resolution.version);
        recorder.record(Stage::FunctionPatterns, &grid);

        let placed = grid.place_bits(codeword_bits(&codewords));
        debug!(placed, data_modules = grid.data_module_count(), "codewords placed");
        recorder.record(Stage::DataPlacement, &grid);

        let selection = mask::select_mask(&mut grid, self.options.mask);
        debug!(mask = selection.mask.value(), penalty = selection.penalty.total(), "mask applied");
        recorder.record(Stage::Masking, &grid);

        format::place_format(&mut grid, FormatWord::new(resolution.ecc, selection.mask));
        recorder.record(Stage::FormatInformation, &grid);

        Ok(Symbol {
            version: resolution.version,
            ecc: resolution.ecc,
            grid,
            mask: selection.mask,
            penalty: selection.penalty,
            penalties: selection.table,
            data_len: data.len(),
            codewords,
        })
    }
}

impl<C: ErrorCorrector + Sync> Encoder<C> {
    /// Encodes many texts in parallel. Results keep the order of `texts`.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Vec<Result<Symbol, EncodeError>>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|text| self.encode(text.as_ref())).collect()
    }
}

/// Encodes a text string into a QR code symbol.
///
/// The text is validated, the version and level are resolved from `options`, and the mask is
/// either forced or chosen by penalty score.
///
/// # Arguments
///
/// * `text` - The text to encode. Every character must be in ISO-8859-1.
/// * `options` - Version, level and mask selection.
///
/// # Returns
///
/// A `Result` containing the symbol, or an [`EncodeError`] describing why it cannot be built.
///
/// # Example
///
/// ```rust
/// use qrstamp::{encode, EncodeOptions};
///
/// let symbol = encode("Hello, World!", &EncodeOptions::automatic()).unwrap();
/// assert_eq!(symbol.version().value(), 1);
/// ```
pub fn encode(text: &str, options: &EncodeOptions) -> Result<Symbol, EncodeError> {
    Encoder::new(*options).encode(text)
}

/// Same as [`encode`], recording a grid snapshot after each construction stage.
pub fn encode_with_recorder<R>(
    text: &str,
    options: &EncodeOptions,
    recorder: &mut R
) -> Result<Symbol, EncodeError>
    where R: StepRecorder + ?Sized
{
    Encoder::new(*options).encode_recorded(text, recorder)
}

/// Encodes a batch of texts in parallel with the same options.
pub fn encode_batch<S>(texts: &[S], options: &EncodeOptions) -> Vec<Result<Symbol, EncodeError>>
    where S: AsRef<str> + Sync
{
    Encoder::new(*options).encode_batch(texts)
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EccLevel {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl EccLevel {
    /// All levels from weakest to strongest.
    pub const ALL: [EccLevel; 4] = [EccLevel::Low, EccLevel::Medium, EccLevel::Quartile, EccLevel::High];

    /// Returns an index in the range 0 to 3, weakest first.
    pub(crate) fn ordinal(self) -> usize {
        use EccLevel::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns the 2-bit code used in the format word.
    pub(crate) fn format_bits(self) -> u8 {
        use EccLevel::*;
        match self {
            Low => 0b01,
            Medium => 0b00,
            Quartile => 0b11,
            High => 0b10,
        }
    }

    pub(crate) fn from_format_bits(bits: u8) -> Self {
        use EccLevel::*;
        [Medium, Low, High, Quartile][usize::from(bits & 0b11)]
    }

    pub fn letter(self) -> char {
        use EccLevel::*;
        match self {
            Low => 'L',
            Medium => 'M',
            Quartile => 'Q',
            High => 'H',
        }
    }
}

impl fmt::Display for EccLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for EccLevel {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(EccLevel::Low),
            "M" | "MEDIUM" => Ok(EccLevel::Medium),
            "Q" | "QUARTILE" => Ok(EccLevel::Quartile),
            "H" | "HIGH" => Ok(EccLevel::High),
            _ => Err(EncodeError::unresolvable(format!("unknown ECC level {:?}", s))),
        }
    }
}

/// A QR code version. Only versions 1 and 2 are supported.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The smallest supported version.
    pub const MIN: Version = Version(1);

    /// The largest supported version.
    pub const MAX: Version = Version(2);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 2]. Use `Version::try_from` for
    /// untrusted input.
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 2].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the side length in modules.
    pub const fn size(self) -> usize {
        (self.0 as usize) * 4 + 17
    }

    /// All supported versions, smallest first.
    pub fn all() -> impl Iterator<Item = Version> {
        (Version::MIN.value()..=Version::MAX.value()).map(Version)
    }
}

impl TryFrom<u8> for Version {
    type Error = EncodeError;

    fn try_from(ver: u8) -> Result<Self, Self::Error> {
        if (Version::MIN.value()..=Version::MAX.value()).contains(&ver) {
            Ok(Version(ver))
        } else {
            Err(EncodeError::unresolvable(format!(
                "version {} is not supported, expected {} to {}",
                ver,
                Version::MIN.value(),
                Version::MAX.value()
            )))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// All eight patterns in id order.
    pub fn all() -> impl Iterator<Item = Mask> {
        (0u8..8).map(Mask)
    }
}

impl TryFrom<u8> for Mask {
    type Error = EncodeError;

    fn try_from(mask: u8) -> Result<Self, Self::Error> {
        if mask <= 7 {
            Ok(Mask(mask))
        } else {
            Err(EncodeError::unresolvable(format!("mask {} is out of range 0 to 7", mask)))
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::Snapshot;

    #[test]
    fn test_version_bounds() {
        assert_eq!(Version::new(1).size(), 21);
        assert_eq!(Version::new(2).size(), 25);
        assert!(Version::try_from(0u8).is_err());
        assert!(Version::try_from(3u8).is_err());
        assert_eq!(Version::all().count(), 2);
    }

    #[test]
    fn test_mask_bounds() {
        assert_eq!(Mask::try_from(7u8).unwrap().value(), 7);
        assert!(matches!(Mask::try_from(8u8), Err(EncodeError::UnresolvableRequest { .. })));
        assert_eq!(Mask::all().count(), 8);
    }

    #[test]
    fn test_ecc_parse() {
        assert_eq!("l".parse::<EccLevel>().unwrap(), EccLevel::Low);
        assert_eq!("High".parse::<EccLevel>().unwrap(), EccLevel::High);
        assert!("X".parse::<EccLevel>().is_err());
    }

    #[test]
    fn test_format_bits_round_trip() {
        for ecc in EccLevel::ALL {
            assert_eq!(EccLevel::from_format_bits(ecc.format_bits()), ecc);
        }
    }

    #[test]
    fn test_scan_me_manual_v1_low() {
        let options = EncodeOptions::manual(Version::new(1), EccLevel::Low);
        let symbol = encode("Scan me!", &options).unwrap();
        assert_eq!(symbol.size(), 21);
        assert_eq!(symbol.data_codewords().len() * 8, 152);
        assert_eq!(symbol.ec_codewords().len(), 7);
        assert!(symbol.mask().value() <= 7);
        assert!(symbol.penalties().is_some());
    }

    #[test]
    fn test_forced_mask_has_no_table() {
        let options = EncodeOptions::automatic().with_mask(Mask::new(5));
        let symbol = encode("Scan me!", &options).unwrap();
        assert_eq!(symbol.mask(), Mask::new(5));
        assert!(symbol.penalties().is_none());
        assert!(symbol.penalty().total() > 0);
    }

    #[test]
    fn test_empty_text_is_invalid() {
        let err = encode("", &EncodeOptions::automatic()).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput { .. }));
    }

    #[test]
    fn test_recorder_sees_four_stages() {
        let mut steps: Vec<Snapshot> = Vec::new();
        encode_with_recorder("Scan me!", &EncodeOptions::automatic(), &mut steps).unwrap();
        let stages: Vec<Stage> = steps.iter().map(|s| s.stage()).collect();
        assert_eq!(
            stages,
            vec![Stage::FunctionPatterns, Stage::DataPlacement, Stage::Masking, Stage::FormatInformation]
        );
    }

    #[test]
    fn test_failed_encode_records_nothing() {
        let mut steps: Vec<Snapshot> = Vec::new();
        let text = "x".repeat(40);
        let options = EncodeOptions::manual(Version::new(1), EccLevel::Low);
        assert!(encode_with_recorder(&text, &options, &mut steps).is_err());
        assert!(steps.is_empty());
    }
}
