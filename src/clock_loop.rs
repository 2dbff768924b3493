//! The clock's control loop: sync, read local time, redraw on a new minute, sleep.
//!
//! The loop owns the [`ShiftRegister`] outright, so nothing else can shift bits into the chain
//! while a frame is half-way through it.
//!
//! See [`ClockLoop`] for usage.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::convert::Infallible;

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use time::OffsetDateTime;

#[cfg(feature = "defmt")]
use defmt::{info, warn};
#[cfg(not(feature = "host"))]
use embassy_time::{Instant, Timer};

use crate::Result;
use crate::clock::{LocalClock, UnixSeconds, h12_m_s};
use crate::display_frame::DisplayFrame;
use crate::shift_register::ShiftRegister;
use crate::time_source::{TimeSource, TimeSyncError};

/// Keeps the display showing the local time.
///
/// # Example
///
/// ```
/// # use core::convert::Infallible;
/// # use embedded_hal::digital::OutputPin;
/// use shift_clock::clock::LocalClock;
/// use shift_clock::clock_loop::ClockLoop;
/// use shift_clock::shift_register::ShiftRegister;
/// use shift_clock::time_source::NoTimeSource;
///
/// fn first_frame<P: OutputPin<Error = Infallible>>(data: P, srck: P, rck: P) -> shift_clock::Result<()> {
///     let shift_register = ShiftRegister::new(data, srck, rck);
///     let mut clock_loop = ClockLoop::new(shift_register, LocalClock::new(-420), NoTimeSource);
///
///     // Never synced: boot is 1970-01-01 00:00 UTC, 17:00 the evening before in Arizona
///     let sleep = clock_loop.tick_at(0)?;
///     assert_eq!(clock_loop.displayed(), Some((5, 0)));
///     assert_eq!(sleep.as_secs(), 60);
///     Ok(())
/// }
/// ```
pub struct ClockLoop<D, S, L, T> {
    shift_register: ShiftRegister<D, S, L>,
    clock: LocalClock,
    time_source: T,
    displayed: Option<(u8, u8)>,
}

impl<D, S, L, T> ClockLoop<D, S, L, T>
where
    D: OutputPin<Error = Infallible>,
    S: OutputPin<Error = Infallible>,
    L: OutputPin<Error = Infallible>,
    T: TimeSource,
{
    /// Takes ownership of the display bus, the local clock and the time source.
    pub const fn new(shift_register: ShiftRegister<D, S, L>, clock: LocalClock, time_source: T) -> Self {
        Self {
            shift_register,
            clock,
            time_source,
            displayed: None,
        }
    }

    /// The local clock, as last synced.
    pub const fn clock(&self) -> &LocalClock {
        &self.clock
    }

    /// The hour (1..=12) and minute currently latched on the display, if any.
    pub const fn displayed(&self) -> Option<(u8, u8)> {
        self.displayed
    }

    /// Asks the time source for the time. The result is not applied; see
    /// [`record_sync`](Self::record_sync).
    ///
    /// # Errors
    ///
    /// Passes through the time source's [`TimeSyncError`].
    pub async fn fetch_time(&mut self) -> core::result::Result<UnixSeconds, TimeSyncError> {
        self.time_source.sync().await
    }

    /// Applies a sync result obtained `uptime_secs` after boot. A failure is logged and the
    /// clock keeps its previous time. Returns whether the clock was updated.
    pub fn record_sync(
        &mut self,
        result: core::result::Result<UnixSeconds, TimeSyncError>,
        uptime_secs: u64,
    ) -> bool {
        match result {
            Ok(unix_seconds) => {
                #[cfg(feature = "defmt")]
                info!("settime success");
                self.clock.set_from_unix_at(unix_seconds, uptime_secs);
                true
            }
            Err(_err) => {
                #[cfg(feature = "defmt")]
                warn!("settime failure: {}", _err);
                false
            }
        }
    }

    /// Redraws the display if `local` shows a different hour or minute than the one latched.
    /// Returns whether a frame was shifted out.
    ///
    /// # Errors
    ///
    /// Returns an error only if the time cannot be turned into a frame, which indicates a bug
    /// in the time source.
    pub fn refresh(&mut self, local: &OffsetDateTime) -> Result<bool> {
        let (hour, minute, _second) = h12_m_s(local);
        if self.displayed == Some((hour, minute)) {
            return Ok(false);
        }
        let frame = DisplayFrame::from_hour_minute(hour, minute)?;
        #[cfg(feature = "defmt")]
        info!("Display {}:{:02}", hour, minute);
        self.shift_register.show(&frame);
        self.displayed = Some((hour, minute));
        Ok(true)
    }

    /// Redraws for the time `uptime_secs` after boot and returns how long to sleep until the
    /// next minute boundary.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn tick_at(&mut self, uptime_secs: u64) -> Result<Duration> {
        let local = self.clock.local_at(uptime_secs);
        self.refresh(&local)?;
        Ok(till_next_minute(local.second()))
    }

    /// Runs forever: sync, redraw if the minute changed, sleep until the next minute.
    ///
    /// # Errors
    ///
    /// Returns only on a fatal error; see [`refresh`](Self::refresh).
    #[cfg(not(feature = "host"))]
    pub async fn run(mut self) -> Result<Infallible> {
        #[cfg(feature = "defmt")]
        info!(
            "Clock loop started (UTC offset: {} minutes)",
            self.clock.offset_minutes()
        );
        loop {
            let result = self.fetch_time().await;
            self.record_sync(result, Instant::now().as_secs());
            let sleep_duration = self.tick_at(Instant::now().as_secs())?;
            Timer::after(sleep_duration).await;
        }
    }

    /// Gives back the display bus, clock and time source.
    pub fn into_parts(self) -> (ShiftRegister<D, S, L>, LocalClock, T) {
        (self.shift_register, self.clock, self.time_source)
    }
}

/// Time until the next minute boundary, given the current second (0..=59).
#[must_use]
pub fn till_next_minute(second: u8) -> Duration {
    Duration::from_secs(60_u64.saturating_sub(u64::from(second.min(59))))
}
