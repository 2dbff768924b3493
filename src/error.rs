use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Every variant is fatal: the control loop stops and the display stays frozen on the
/// last latched frame. Recoverable time-sync failures use
/// [`TimeSyncError`](crate::time_source::TimeSyncError) instead and never reach this type.
#[derive(Debug, Display, Error)]
pub enum Error {
    // `#[error(not(source))]` below tells `derive_more` that `embassy_executor::SpawnError` does
    // not implement Rust's `core::error::Error` trait.
    #[cfg(any(feature = "pico1", feature = "pico2"))]
    #[display("{_0:?}")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),

    /// A raw segment pattern was not eight 0/1 values (or the extra bit was not 0/1).
    #[display("Segment pattern must be eight 0/1 values")]
    InvalidPattern,

    /// A digit symbol outside 0..=9.
    #[display("Digit {_0} is not in 0..=9")]
    InvalidDigit(#[error(not(source))] u8),

    /// The hour-tens digit of a 12-hour clock can only be 0 or 1.
    #[display("Hour tens digit is {_0}!")]
    InvalidHourTens(#[error(not(source))] u8),

    /// A time that a 12-hour display cannot show.
    #[display("{hour}:{minute:02} is not a 12-hour time")]
    InvalidTime { hour: u8, minute: u8 },

    /// Wi-Fi SSID longer than 32 bytes or passphrase longer than 64 bytes.
    #[display("Wi-Fi credentials are too long")]
    CredentialsTooLong,
}

#[cfg(any(feature = "pico1", feature = "pico2"))]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(err)
    }
}
