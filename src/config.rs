//! Build-time configuration.
//!
//! `build.rs` loads `.env` files and exports `WIFI_SSID`, `WIFI_PASS` and `UTC_OFFSET_MINUTES`
//! to the compiler; [`ClockConfig::from_build_env`] gathers them with the runtime defaults.

use core::fmt;

use heapless::String;

use crate::brightness::{BrightnessModel, DEFAULT_PWM_FREQUENCY_HZ};
use crate::retry::RetryPolicy;
use crate::{Error, Result};

/// UTC offset used when the configured one is missing or malformed.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 0;

// ============================================================================
// Wi-Fi credentials
// ============================================================================

/// Network name and passphrase for client mode.
///
/// `Debug` shows the SSID only.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String<32>,
    pub password: String<64>,
}

impl WifiCredentials {
    /// Copies `ssid` and `password` into fixed-capacity storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CredentialsTooLong`] if either exceeds the 802.11 limits (32 byte SSID,
    /// 64 byte passphrase).
    pub fn new(ssid: &str, password: &str) -> Result<Self> {
        let ssid = String::try_from(ssid).map_err(|_| Error::CredentialsTooLong)?;
        let password = String::try_from(password).map_err(|_| Error::CredentialsTooLong)?;
        Ok(Self { ssid, password })
    }

    /// Whether an SSID was configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid.as_str())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ClockConfig
// ============================================================================

/// Everything the firmware needs that is decided before it runs.
#[derive(Clone, Debug)]
pub struct ClockConfig {
    pub wifi: WifiCredentials,
    pub utc_offset_minutes: i32,
    pub pwm_frequency_hz: u32,
    pub join_retry: RetryPolicy,
    pub brightness_model: BrightnessModel,
}

impl ClockConfig {
    /// Builds the configuration from the values `build.rs` exported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CredentialsTooLong`] if the configured credentials cannot be stored.
    pub fn from_build_env() -> Result<Self> {
        const WIFI_SSID: &str = env!("WIFI_SSID");
        const WIFI_PASS: &str = env!("WIFI_PASS");
        const UTC_OFFSET_MINUTES: i32 = parse_offset_minutes(env!("UTC_OFFSET_MINUTES"));

        Self::new(WIFI_SSID, WIFI_PASS, UTC_OFFSET_MINUTES)
    }

    /// Builds a configuration with the given credentials and offset and the default PWM
    /// frequency, join policy and brightness model.
    ///
    /// # Errors
    ///
    /// See [`WifiCredentials::new`].
    pub fn new(ssid: &str, password: &str, utc_offset_minutes: i32) -> Result<Self> {
        Ok(Self {
            wifi: WifiCredentials::new(ssid, password)?,
            utc_offset_minutes,
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            join_retry: RetryPolicy::NETWORK_JOIN,
            brightness_model: BrightnessModel::CALIBRATED,
        })
    }
}

/// Parses a signed decimal minute offset at compile time.
///
/// Surrounding ASCII whitespace is ignored. An empty or malformed value, or one that overflows
/// `i32`, gives [`DEFAULT_UTC_OFFSET_MINUTES`].
///
/// ```
/// use shift_clock::config::{DEFAULT_UTC_OFFSET_MINUTES, parse_offset_minutes};
///
/// const OFFSET: i32 = parse_offset_minutes("-420");
/// assert_eq!(OFFSET, -420);
/// assert_eq!(parse_offset_minutes(" +330 "), 330);
/// assert_eq!(parse_offset_minutes("7h"), DEFAULT_UTC_OFFSET_MINUTES);
/// assert_eq!(parse_offset_minutes(""), 0);
/// ```
#[must_use]
pub const fn parse_offset_minutes(text: &str) -> i32 {
    let mut bytes = text.as_bytes().trim_ascii();
    let negative = matches!(bytes, [b'-', ..]);
    if let [b'-' | b'+', rest @ ..] = bytes {
        bytes = rest;
    }
    if bytes.is_empty() {
        return DEFAULT_UTC_OFFSET_MINUTES;
    }

    let mut value: i32 = 0;
    while let [byte, rest @ ..] = bytes {
        if !byte.is_ascii_digit() {
            return DEFAULT_UTC_OFFSET_MINUTES;
        }
        let digit = byte.wrapping_sub(b'0') as i32;
        value = match value.checked_mul(10) {
            Some(tens) => match tens.checked_add(digit) {
                Some(sum) => sum,
                None => return DEFAULT_UTC_OFFSET_MINUTES,
            },
            None => return DEFAULT_UTC_OFFSET_MINUTES,
        };
        bytes = rest;
    }

    if negative { value.wrapping_neg() } else { value }
}
