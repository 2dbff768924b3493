//! Local wall-clock time: a synced Unix timestamp carried forward by uptime, plus a UTC offset.
//!
//! Unlike most device abstractions in this crate, [`LocalClock`] spawns no task and needs no
//! static resources; the clock loop owns it directly.

use time::{OffsetDateTime, UtcOffset};

#[cfg(feature = "defmt")]
use defmt::{info, warn};
#[cfg(not(feature = "host"))]
use embassy_time::Instant;

// ============================================================================
// UnixSeconds
// ============================================================================

/// Units-safe wrapper for Unix timestamps (seconds since 1970-01-01 00:00:00 UTC).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    /// Get the underlying i64 value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Convert NTP seconds to Unix seconds.
    ///
    /// Values below the 1970 offset are read as NTP era 1, which starts at 2036-02-07 06:28:16
    /// UTC. Zero is the unsynchronized marker and gives `None`.
    #[must_use]
    pub const fn from_ntp_seconds(ntp: u32) -> Option<Self> {
        // 70 years including 17 leap days
        const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;
        const NTP_ERA_SECONDS: i64 = 4_294_967_296;
        if ntp == 0 {
            return None;
        }
        let ntp = ntp as i64;
        #[expect(
            clippy::arithmetic_side_effects,
            reason = "u32 plus one era minus a small constant always fits in i64"
        )]
        let seconds = if ntp < NTP_TO_UNIX_SECONDS {
            ntp + NTP_ERA_SECONDS - NTP_TO_UNIX_SECONDS
        } else {
            ntp - NTP_TO_UNIX_SECONDS
        };
        Some(Self(seconds))
    }
}

// ============================================================================
// LocalClock
// ============================================================================

/// Tracks local time of day from the last successful sync.
///
/// Until the first sync the clock counts up from the Unix epoch, so a never-synced display
/// still advances once a minute.
///
/// # Example
///
/// ```
/// use shift_clock::clock::{LocalClock, UnixSeconds, h12_m_s};
///
/// // Arizona: UTC-7, no daylight saving
/// let mut clock = LocalClock::new(-7 * 60);
///
/// // 2025-11-20 14:00:00 UTC, synced 30 s after boot
/// clock.set_from_unix_at(UnixSeconds(1_763_647_200), 30);
///
/// // Five minutes later
/// let (hour, minute, second) = h12_m_s(&clock.local_at(330));
/// assert_eq!((hour, minute, second), (7, 5, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    boot_unix_seconds: Option<i64>,
    offset: UtcOffset,
}

impl LocalClock {
    /// Creates an unsynced clock for the given UTC offset in minutes.
    ///
    /// An offset that `time` cannot represent (beyond ±25 hours) falls back to UTC.
    #[must_use]
    pub fn new(offset_minutes: i32) -> Self {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(|seconds| UtcOffset::from_whole_seconds(seconds).ok())
            .unwrap_or_else(|| {
                #[cfg(feature = "defmt")]
                warn!("UTC offset of {} minutes is out of range; using UTC", offset_minutes);
                UtcOffset::UTC
            });
        Self {
            boot_unix_seconds: None,
            offset,
        }
    }

    /// Whether any sync has succeeded.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.boot_unix_seconds.is_some()
    }

    /// The UTC offset in minutes.
    #[must_use]
    pub fn offset_minutes(&self) -> i32 {
        i32::from(self.offset.whole_minutes())
    }

    /// Records that `unix_seconds` was the time `uptime_secs` seconds after boot.
    #[expect(
        clippy::cast_possible_wrap,
        reason = "Uptime in seconds stays far below i64::MAX"
    )]
    pub fn set_from_unix_at(&mut self, unix_seconds: UnixSeconds, uptime_secs: u64) {
        let boot_unix = unix_seconds.as_i64().saturating_sub(uptime_secs as i64);
        self.boot_unix_seconds = Some(boot_unix);
        #[cfg(feature = "defmt")]
        info!(
            "Clock time set: {} (boot time: {})",
            unix_seconds.as_i64(),
            boot_unix
        );
    }

    /// Local date and time `uptime_secs` seconds after boot.
    #[must_use]
    #[expect(
        clippy::cast_possible_wrap,
        reason = "Uptime in seconds stays far below i64::MAX"
    )]
    pub fn local_at(&self, uptime_secs: u64) -> OffsetDateTime {
        let unix = self
            .boot_unix_seconds
            .unwrap_or(0)
            .saturating_add(uptime_secs as i64);
        OffsetDateTime::from_unix_timestamp(unix)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
            .to_offset(self.offset)
    }

    /// Records a sync that happened now.
    #[cfg(not(feature = "host"))]
    pub fn set_from_unix(&mut self, unix_seconds: UnixSeconds) {
        self.set_from_unix_at(unix_seconds, Instant::now().as_secs());
    }

    /// Local date and time now.
    #[cfg(not(feature = "host"))]
    #[must_use]
    pub fn now_local(&self) -> OffsetDateTime {
        self.local_at(Instant::now().as_secs())
    }
}

/// Hour on the 12-hour face (1..=12), minute and second of `dt`.
#[must_use]
pub fn h12_m_s(dt: &OffsetDateTime) -> (u8, u8, u8) {
    (
        crate::display_frame::hour12(dt.hour()),
        dt.minute(),
        dt.second(),
    )
}
