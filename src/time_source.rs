//! The network time source the clock loop syncs against.
//!
//! A failed sync is recoverable: the loop logs it and keeps showing time from the last good
//! sync. See [`NtpTimeSource`](crate::time_sync::NtpTimeSource) for the Wi-Fi implementation.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use derive_more::derive::{Display, Error};

use crate::clock::UnixSeconds;

/// Why a time sync failed. Never fatal.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSyncError {
    #[display("No network available")]
    NoNetwork,
    #[display("DNS lookup failed")]
    DnsLookup,
    #[display("No DNS results")]
    NoDnsResults,
    #[display("Socket bind failed")]
    SocketBind,
    #[display("Network Time Protocol (NTP) send failed")]
    Send,
    #[display("Network Time Protocol (NTP) receive timeout")]
    ReceiveTimeout,
    #[display("Network Time Protocol (NTP) receive failed")]
    Receive,
    #[display("Network Time Protocol (NTP) response too short")]
    ShortResponse,
    #[display("Invalid Network Time Protocol (NTP) timestamp")]
    InvalidTimestamp,
}

/// Something that can tell the current UTC time.
#[expect(
    async_fn_in_trait,
    reason = "Implementations run on the single-threaded executor; no Send bound is needed"
)]
pub trait TimeSource {
    /// Fetch the current UTC time.
    ///
    /// # Errors
    ///
    /// Returns a [`TimeSyncError`] when the time cannot be fetched; callers keep their
    /// previous time.
    async fn sync(&mut self) -> Result<UnixSeconds, TimeSyncError>;
}

/// A time source for builds without networking. Every sync fails with
/// [`TimeSyncError::NoNetwork`], so the clock runs on its unsynced time.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTimeSource;

impl TimeSource for NoTimeSource {
    async fn sync(&mut self) -> Result<UnixSeconds, TimeSyncError> {
        Err(TimeSyncError::NoNetwork)
    }
}
