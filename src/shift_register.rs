//! A device abstraction for the clock's serial-in, parallel-out shift-register chain.
//!
//! The chain (TPIC6B595 style) has three inputs:
//! - SERIN: the data line, sampled on each rising edge of SRCK
//! - SRCK: the shift clock, which moves every stage one position down the chain
//! - RCK: the latch clock, which copies the whole chain to the output pins at once
//!
//! Because shifting and latching are separate signals, a partially shifted frame is never
//! visible on the display.
//!
//! See [`ShiftRegister`] for usage.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};

#[cfg(feature = "display-trace")]
use defmt::info;

use crate::Result;
use crate::display_frame::DisplayFrame;
use crate::segment::SegmentPattern;

/// Drives the three-wire shift-register bus.
///
/// Pins are any `embedded-hal` outputs whose writes cannot fail, such as
/// `embassy_rp::gpio::Output`. No delay is inserted between clock edges; at the Pico's clock
/// speed each edge is far wider than the register's minimum pulse width.
///
/// # Example
///
/// ```no_run
/// # use core::convert::Infallible;
/// # use embedded_hal::digital::OutputPin;
/// use shift_clock::shift_register::ShiftRegister;
///
/// fn show_time<P: OutputPin<Error = Infallible>>(data: P, srck: P, rck: P) -> shift_clock::Result<()> {
///     let mut shift_register = ShiftRegister::new(data, srck, rck);
///     // 12:34 on the display
///     shift_register.load_digits(1, 2, 3, 4)
/// }
/// ```
pub struct ShiftRegister<D, S, L> {
    data: D,
    shift_clock: S,
    latch_clock: L,
}

impl<D, S, L> ShiftRegister<D, S, L>
where
    D: OutputPin<Error = Infallible>,
    S: OutputPin<Error = Infallible>,
    L: OutputPin<Error = Infallible>,
{
    /// Takes ownership of the bus pins and drives all three low.
    pub fn new(mut data: D, mut shift_clock: S, mut latch_clock: L) -> Self {
        let Ok(()) = data.set_low();
        let Ok(()) = shift_clock.set_low();
        let Ok(()) = latch_clock.set_low();
        Self {
            data,
            shift_clock,
            latch_clock,
        }
    }

    /// Shifts every pattern into the chain, in order, then latches once.
    ///
    /// The first pattern shifted travels furthest down the chain, so the caller lists patterns
    /// in wiring order. Each pattern goes out index 7 first; see
    /// [`SegmentPattern::shift_order`].
    pub fn shift_out_frame(&mut self, patterns: &[SegmentPattern]) {
        #[cfg(feature = "display-trace")]
        info!("shift_out_frame: {:?}", patterns);
        for pattern in patterns {
            for bit in pattern.shift_order() {
                let Ok(()) = self.data.set_state(PinState::from(bit));
                pulse(&mut self.shift_clock);
            }
        }
        pulse(&mut self.latch_clock);
    }

    /// Shifts out and latches a whole [`DisplayFrame`].
    pub fn show(&mut self, frame: &DisplayFrame) {
        self.shift_out_frame(frame.patterns());
    }

    /// Shows four clock digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHourTens`](crate::Error::InvalidHourTens) if `hour_tens` is not
    /// 0 or 1, or [`Error::InvalidDigit`](crate::Error::InvalidDigit) for a digit above 9.
    /// Nothing is shifted when an error is returned.
    pub fn load_digits(
        &mut self,
        hour_tens: u8,
        hour_units: u8,
        minute_tens: u8,
        minute_units: u8,
    ) -> Result<()> {
        let frame = DisplayFrame::from_digits(hour_tens, hour_units, minute_tens, minute_units)?;
        self.show(&frame);
        Ok(())
    }

    /// Gives the bus pins back.
    pub fn release(self) -> (D, S, L) {
        (self.data, self.shift_clock, self.latch_clock)
    }
}

/// Rising edge then falling edge; the register acts on the rising edge.
fn pulse<P: OutputPin<Error = Infallible>>(pin: &mut P) {
    let Ok(()) = pin.set_high();
    let Ok(()) = pin.set_low();
}
