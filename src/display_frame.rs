//! Mapping a time of day onto the three shift-register stages of the clock.
//!
//! The board has three 8-bit stages. The first stage shifted carries the hour-units digit, and
//! its extra bit lights the hour-tens "1" (a 12-hour clock's tens digit is only ever blank or 1).
//! The other two stages carry the minute digits with their extra bits set. This pairing follows
//! the board's wiring.

use crate::segment::{SegmentPattern, Symbol, encode};
use crate::{Error, Result};

/// The number of shift-register stages on the board.
pub const STAGE_COUNT: usize = 3;

/// The patterns for one display refresh, in shift order.
///
/// Built fresh whenever the displayed minute changes; see [`DisplayFrame::from_hour_minute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame([SegmentPattern; STAGE_COUNT]);

impl DisplayFrame {
    /// Every segment lit, i.e. `18:88`. Shown once at power-up.
    pub const LAMP_TEST: Self = Self([SegmentPattern::ALL_ON; STAGE_COUNT]);

    /// Builds a frame from the four clock digits.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHourTens`] if `hour_tens` is not 0 or 1.
    /// - [`Error::InvalidDigit`] if any other digit is above 9.
    pub fn from_digits(
        hour_tens: u8,
        hour_units: u8,
        minute_tens: u8,
        minute_units: u8,
    ) -> Result<Self> {
        if hour_tens > 1 {
            return Err(Error::InvalidHourTens(hour_tens));
        }
        Ok(Self([
            encode(hour_tens, Symbol::Digit(hour_units))?,
            encode(1, Symbol::Digit(minute_tens))?,
            encode(1, Symbol::Digit(minute_units))?,
        ]))
    }

    /// Builds a frame for a 12-hour time (`hour` 1..=12, `minute` 0..=59).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTime`] for an hour or minute outside those ranges.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Splitting decimal digits of values already bounded to 0..=59"
    )]
    pub fn from_hour_minute(hour: u8, minute: u8) -> Result<Self> {
        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(Error::InvalidTime { hour, minute });
        }
        Self::from_digits(hour / 10, hour % 10, minute / 10, minute % 10)
    }

    /// The patterns in shift order.
    #[must_use]
    pub const fn patterns(&self) -> &[SegmentPattern; STAGE_COUNT] {
        &self.0
    }
}

/// Converts a 24-hour hour (0..=23) to the 12-hour face value (1..=12).
///
/// Midnight shows as 12, and 13 shows as 1.
#[must_use]
#[expect(
    clippy::integer_division_remainder_used,
    reason = "Remainder by a non-zero constant"
)]
pub const fn hour12(hour24: u8) -> u8 {
    match hour24 % 12 {
        0 => 12,
        hour => hour,
    }
}
