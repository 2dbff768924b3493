//! Seven-segment encoding for one stage of the shift-register chain.
//!
//! Each stage holds eight bits. Bit 0 is an auxiliary "extra" bit whose meaning belongs to the
//! caller (the clock uses it to light the hour-tens "1"); bits 1 through 7 drive segments a-g.
//!
//! See [`encode`] for usage.

use crate::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// The number of bits in one shift-register stage (7 segments plus the extra bit).
pub const SEGMENT_COUNT: usize = 8;

/// Segments a-g for the digits 0-9.
const DIGITS: [[u8; SEGMENT_COUNT - 1]; 10] = [
    // a, b, c, d, e, f, g
    [1, 1, 1, 1, 1, 1, 0], // 0
    [0, 1, 1, 0, 0, 0, 0], // 1
    [1, 1, 0, 1, 1, 0, 1], // 2
    [1, 1, 1, 1, 0, 0, 1], // 3
    [0, 1, 1, 0, 0, 1, 1], // 4
    [1, 0, 1, 1, 0, 1, 1], // 5
    [1, 0, 1, 1, 1, 1, 1], // 6
    [1, 1, 1, 0, 0, 0, 0], // 7
    [1, 1, 1, 1, 1, 1, 1], // 8
    [1, 1, 1, 1, 0, 1, 1], // 9
];

// ============================================================================
// SegmentPattern
// ============================================================================

/// The eight output bits of one shift-register stage, `[x, a, b, c, d, e, f, g]`.
///
/// Every element is 0 or 1. The only ways to build one are [`encode`] and
/// [`SegmentPattern::from_raw`], which both check that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentPattern([u8; SEGMENT_COUNT]);

impl SegmentPattern {
    /// All segments dark and the extra bit clear.
    pub const BLANK: Self = Self([0; SEGMENT_COUNT]);

    /// Every output of the stage on: the digit 8 with the extra bit set.
    pub const ALL_ON: Self = Self([1; SEGMENT_COUNT]);

    /// Validates an explicit pattern and passes it through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `raw` is not exactly eight elements or holds a value
    /// other than 0 or 1.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let bits: [u8; SEGMENT_COUNT] = raw.try_into().map_err(|_| Error::InvalidPattern)?;
        if bits.iter().any(|&bit| bit > 1) {
            return Err(Error::InvalidPattern);
        }
        Ok(Self(bits))
    }

    /// The bits in source order, `[x, a, b, c, d, e, f, g]`.
    #[must_use]
    pub const fn bits(&self) -> &[u8; SEGMENT_COUNT] {
        &self.0
    }

    /// The auxiliary bit carried on output 0 of this stage.
    #[must_use]
    pub const fn extra_bit(&self) -> u8 {
        self.0[0]
    }

    /// The bits in the order they go onto the data line: index 7 first, index 0 last.
    ///
    /// The first bit shifted in ends up in the last output of the stage, so reversing puts
    /// `x` on output 0 once the whole stage has been clocked in.
    pub fn shift_order(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().rev().map(|&bit| bit == 1)
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// What one stage of the display should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol<'a> {
    /// A decimal digit, 0 through 9.
    Digit(u8),
    /// An explicit `[x, a, b, c, d, e, f, g]` pattern, used verbatim.
    Raw(&'a [u8]),
    /// No segments lit.
    Blank,
}

/// Encodes `symbol` for one shift-register stage, placing `extra_bit` on output 0.
///
/// The extra bit is independent of the symbol: callers use it to carry an unrelated signal on
/// the same stage. A [`Symbol::Raw`] pattern already contains its own extra bit, so
/// `extra_bit` is only checked, not applied, in that case.
///
/// # Example
///
/// ```
/// use shift_clock::segment::{Symbol, encode};
///
/// let seven = encode(1, Symbol::Digit(7))?;
/// assert_eq!(seven.bits(), &[1, 1, 1, 1, 0, 0, 0, 0]);
///
/// let blank = encode(0, Symbol::Blank)?;
/// assert_eq!(blank.bits(), &[0; 8]);
/// # Ok::<(), shift_clock::Error>(())
/// ```
///
/// # Errors
///
/// - [`Error::InvalidPattern`] if `extra_bit` is not 0 or 1, or a raw pattern is malformed.
/// - [`Error::InvalidDigit`] if a digit is greater than 9.
pub fn encode(extra_bit: u8, symbol: Symbol<'_>) -> Result<SegmentPattern> {
    if extra_bit > 1 {
        return Err(Error::InvalidPattern);
    }
    match symbol {
        Symbol::Raw(raw) => SegmentPattern::from_raw(raw),
        Symbol::Blank => Ok(with_extra_bit(extra_bit, &[0; SEGMENT_COUNT - 1])),
        Symbol::Digit(digit) => {
            let segments = DIGITS
                .get(usize::from(digit))
                .ok_or(Error::InvalidDigit(digit))?;
            Ok(with_extra_bit(extra_bit, segments))
        }
    }
}

fn with_extra_bit(extra_bit: u8, segments: &[u8; SEGMENT_COUNT - 1]) -> SegmentPattern {
    let mut bits = [extra_bit; SEGMENT_COUNT];
    for (bit, &segment) in bits.iter_mut().skip(1).zip(segments) {
        *bit = segment;
    }
    SegmentPattern(bits)
}
