#![cfg(feature = "host")]
//! Host-level tests for timekeeping, SNTP packets, retry policy and build-time configuration.

use core::num::NonZeroU32;

use embassy_time::Duration;
use shift_clock::Error;
use shift_clock::brightness::{BrightnessModel, DEFAULT_PWM_FREQUENCY_HZ};
use shift_clock::clock::{LocalClock, UnixSeconds, h12_m_s};
use shift_clock::config::{
    ClockConfig, DEFAULT_UTC_OFFSET_MINUTES, WifiCredentials, parse_offset_minutes,
};
use shift_clock::retry::RetryPolicy;
use shift_clock::time_source::TimeSyncError;
use shift_clock::time_sync::{NTP_PACKET_LEN, ntp_request, parse_ntp_response};

// ============================================================================
// Clock
// ============================================================================

#[test]
fn ntp_seconds_convert_to_unix() {
    assert_eq!(
        UnixSeconds::from_ntp_seconds(2_208_988_800),
        Some(UnixSeconds(0))
    );
    assert_eq!(
        UnixSeconds::from_ntp_seconds(3_972_632_820),
        Some(UnixSeconds(1_763_644_020))
    );
}

#[test]
fn zero_ntp_seconds_are_rejected() {
    assert_eq!(UnixSeconds::from_ntp_seconds(0), None);
}

#[test]
fn small_ntp_seconds_belong_to_the_next_era() {
    // 2036-02-07 06:28:16 UTC, where the 32-bit NTP seconds field wraps
    assert_eq!(
        UnixSeconds::from_ntp_seconds(1),
        Some(UnixSeconds(2_085_978_497))
    );
    assert_eq!(
        UnixSeconds::from_ntp_seconds(2_208_988_799),
        Some(UnixSeconds(4_294_967_295))
    );
}

#[test]
fn local_clock_carries_time_forward_by_uptime() {
    let mut clock = LocalClock::new(-420);
    assert!(!clock.is_synced());
    // 2025-11-20 14:00:00 UTC, 30 s after boot
    clock.set_from_unix_at(UnixSeconds(1_763_647_200), 30);
    assert!(clock.is_synced());

    assert_eq!(h12_m_s(&clock.local_at(30)), (7, 0, 0));
    assert_eq!(h12_m_s(&clock.local_at(30 + 5 * 3600 + 59)), (12, 0, 59));
}

#[test]
fn out_of_range_offset_falls_back_to_utc() {
    assert_eq!(LocalClock::new(-420).offset_minutes(), -420);
    assert_eq!(LocalClock::new(330).offset_minutes(), 330);
    assert_eq!(LocalClock::new(30 * 60).offset_minutes(), 0);
    assert_eq!(LocalClock::new(i32::MIN).offset_minutes(), 0);
}

// ============================================================================
// SNTP
// ============================================================================

#[test]
fn request_is_version_three_client_mode() {
    let request = ntp_request();
    assert_eq!(request.len(), NTP_PACKET_LEN);
    assert_eq!(request[0], 0x1B);
    assert!(request[1..].iter().all(|&byte| byte == 0));
}

#[test]
fn response_transmit_timestamp_is_read() {
    let mut response = [0_u8; NTP_PACKET_LEN];
    response[40..44].copy_from_slice(&3_972_632_820_u32.to_be_bytes());
    // Fraction and other fields are ignored
    response[44..48].copy_from_slice(&[0xFF; 4]);
    response[32..36].copy_from_slice(&[0x12; 4]);

    assert_eq!(parse_ntp_response(&response), Ok(UnixSeconds(1_763_644_020)));
}

#[test]
fn short_response_is_rejected() {
    assert_eq!(
        parse_ntp_response(&[0; 47]),
        Err(TimeSyncError::ShortResponse)
    );
    assert_eq!(parse_ntp_response(&[]), Err(TimeSyncError::ShortResponse));
}

#[test]
fn wrapped_timestamp_is_read_as_2036_or_later() {
    let mut response = [0_u8; NTP_PACKET_LEN];
    response[40..44].copy_from_slice(&1_000_u32.to_be_bytes());
    assert_eq!(
        parse_ntp_response(&response),
        Ok(UnixSeconds(2_085_978_496 + 1_000))
    );
}

#[test]
fn zero_timestamp_is_invalid() {
    assert_eq!(
        parse_ntp_response(&[0; NTP_PACKET_LEN]),
        Err(TimeSyncError::InvalidTimestamp)
    );
}

// ============================================================================
// Retry policy
// ============================================================================

#[test]
fn unbounded_policy_always_retries() {
    let policy = RetryPolicy::NETWORK_JOIN;
    for failed in [1, 2, 100, u32::MAX] {
        assert_eq!(policy.delay_after(failed), Some(Duration::from_millis(200)));
    }
    assert_eq!(RetryPolicy::default(), RetryPolicy::NETWORK_JOIN);
}

#[test]
fn bounded_policy_stops_after_its_limit() {
    let attempts = NonZeroU32::new(3).expect("non-zero");
    let policy = RetryPolicy::bounded(Duration::from_secs(1), attempts);
    assert_eq!(policy.delay_after(1), Some(Duration::from_secs(1)));
    assert_eq!(policy.delay_after(2), Some(Duration::from_secs(1)));
    assert_eq!(policy.delay_after(3), None);
    assert_eq!(policy.delay_after(4), None);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn offset_parsing_accepts_signed_integers() {
    const ARIZONA: i32 = parse_offset_minutes("-420");
    assert_eq!(ARIZONA, -420);
    assert_eq!(parse_offset_minutes("0"), 0);
    assert_eq!(parse_offset_minutes("330"), 330);
    assert_eq!(parse_offset_minutes("+60"), 60);
    assert_eq!(parse_offset_minutes("  -480\n"), -480);
}

#[test]
fn malformed_offsets_fall_back() {
    for text in ["", "-", "+", "7h", "--5", "1 2", "99999999999"] {
        assert_eq!(
            parse_offset_minutes(text),
            DEFAULT_UTC_OFFSET_MINUTES,
            "{text:?}"
        );
    }
}

#[test]
fn credentials_respect_802_11_limits() {
    let ssid = "s".repeat(32);
    let password = "p".repeat(64);
    let credentials = WifiCredentials::new(&ssid, &password).expect("fits");
    assert!(credentials.is_configured());
    assert_eq!(credentials.ssid.as_str(), ssid);

    assert!(matches!(
        WifiCredentials::new(&"s".repeat(33), ""),
        Err(Error::CredentialsTooLong)
    ));
    assert!(matches!(
        WifiCredentials::new("home", &"p".repeat(65)),
        Err(Error::CredentialsTooLong)
    ));
    assert!(!WifiCredentials::new("", "").expect("fits").is_configured());
}

#[test]
fn credentials_debug_hides_the_password() {
    let credentials = WifiCredentials::new("home", "hunter22").expect("fits");
    let shown = format!("{credentials:?}");
    assert!(shown.contains("home"), "{shown}");
    assert!(!shown.contains("hunter22"), "{shown}");

    let config = ClockConfig::new("home", "hunter22", 0).expect("fits");
    assert!(!format!("{config:?}").contains("hunter22"));
}

#[test]
fn config_defaults() {
    let config = ClockConfig::new("home", "secret", -420).expect("fits");
    assert_eq!(config.wifi.password.as_str(), "secret");
    assert_eq!(config.utc_offset_minutes, -420);
    assert_eq!(config.pwm_frequency_hz, DEFAULT_PWM_FREQUENCY_HZ);
    assert_eq!(config.join_retry, RetryPolicy::NETWORK_JOIN);
    assert_eq!(config.brightness_model, BrightnessModel::CALIBRATED);
}

#[test]
fn build_env_config_loads() {
    let config = ClockConfig::from_build_env().expect("build.rs exports valid values");
    assert_eq!(
        config.utc_offset_minutes,
        parse_offset_minutes(env!("UTC_OFFSET_MINUTES"))
    );
}
