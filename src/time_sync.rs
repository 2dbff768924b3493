//! Simple Network Time Protocol (SNTP) over the Wi-Fi stack.
//!
//! The packet format lives outside the `wifi` feature so it can be checked on the host.
//!
//! See [`NtpTimeSource`] for usage.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use crate::clock::UnixSeconds;
use crate::time_source::TimeSyncError;

/// Server queried for the time.
pub const NTP_SERVER: &str = "pool.ntp.org";
/// Server UDP port.
pub const NTP_PORT: u16 = 123;
/// Request and response size in bytes.
pub const NTP_PACKET_LEN: usize = 48;

/// A version 3 client-mode request: `LI=0, VN=3, Mode=3` then zeros.
#[must_use]
pub const fn ntp_request() -> [u8; NTP_PACKET_LEN] {
    let mut request = [0_u8; NTP_PACKET_LEN];
    request[0] = 0x1B;
    request
}

/// Reads the transmit timestamp (whole seconds, bytes 40..44 big-endian) from a response.
///
/// # Errors
///
/// [`TimeSyncError::ShortResponse`] if fewer than 48 bytes arrived, and
/// [`TimeSyncError::InvalidTimestamp`] for the zero (unsynchronized) timestamp.
pub fn parse_ntp_response(response: &[u8]) -> Result<UnixSeconds, TimeSyncError> {
    if response.len() < NTP_PACKET_LEN {
        return Err(TimeSyncError::ShortResponse);
    }
    let Some(&[b0, b1, b2, b3]) = response.get(40..44) else {
        return Err(TimeSyncError::ShortResponse);
    };
    UnixSeconds::from_ntp_seconds(u32::from_be_bytes([b0, b1, b2, b3]))
        .ok_or(TimeSyncError::InvalidTimestamp)
}

#[cfg(feature = "wifi")]
pub use wifi_impl::NtpTimeSource;

#[cfg(feature = "wifi")]
mod wifi_impl {
    use defmt::{info, warn};
    use embassy_net::dns::DnsQueryType;
    use embassy_net::udp::{PacketMetadata, UdpSocket};
    use embassy_net::Stack;
    use embassy_time::{Duration, with_timeout};

    use super::{NTP_PACKET_LEN, NTP_PORT, NTP_SERVER, ntp_request, parse_ntp_response};
    use crate::clock::UnixSeconds;
    use crate::time_source::{TimeSource, TimeSyncError};

    const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Fetches UTC from [`NTP_SERVER`] once per [`sync`](TimeSource::sync).
    ///
    /// ```no_run
    /// # #![no_std]
    /// # #![no_main]
    /// # use panic_probe as _;
    /// use embassy_net::Stack;
    /// use shift_clock::time_source::TimeSource;
    /// use shift_clock::time_sync::NtpTimeSource;
    ///
    /// async fn show_time(stack: &'static Stack<'static>) {
    ///     let mut source = NtpTimeSource::new(stack);
    ///     match source.sync().await {
    ///         Ok(unix_seconds) => defmt::info!("UTC: {}", unix_seconds.as_i64()),
    ///         Err(err) => defmt::warn!("sync failed: {}", err),
    ///     }
    /// }
    /// ```
    pub struct NtpTimeSource {
        stack: &'static Stack<'static>,
    }

    impl NtpTimeSource {
        /// Uses an already-configured network stack.
        #[must_use]
        pub const fn new(stack: &'static Stack<'static>) -> Self {
            Self { stack }
        }
    }

    impl TimeSource for NtpTimeSource {
        async fn sync(&mut self) -> Result<UnixSeconds, TimeSyncError> {
            info!("Resolving Network Time Protocol (NTP) host {}...", NTP_SERVER);
            let dns_result = self
                .stack
                .dns_query(NTP_SERVER, DnsQueryType::A)
                .await
                .map_err(|e| {
                    warn!("DNS lookup failed: {:?}", e);
                    TimeSyncError::DnsLookup
                })?;
            let server_addr = *dns_result.first().ok_or(TimeSyncError::NoDnsResults)?;

            let mut rx_meta = [PacketMetadata::EMPTY; 1];
            let mut rx_buffer = [0; 128];
            let mut tx_meta = [PacketMetadata::EMPTY; 1];
            let mut tx_buffer = [0; 128];
            let mut socket = UdpSocket::new(
                *self.stack,
                &mut rx_meta,
                &mut rx_buffer,
                &mut tx_meta,
                &mut tx_buffer,
            );
            socket.bind(0).map_err(|e| {
                warn!("Socket bind failed: {:?}", e);
                TimeSyncError::SocketBind
            })?;

            info!("Sending Network Time Protocol (NTP) request to {}...", server_addr);
            socket
                .send_to(&ntp_request(), (server_addr, NTP_PORT))
                .await
                .map_err(|e| {
                    warn!("Network Time Protocol (NTP) send failed: {:?}", e);
                    TimeSyncError::Send
                })?;

            let mut response = [0_u8; NTP_PACKET_LEN];
            let (len, _from) = with_timeout(RECEIVE_TIMEOUT, socket.recv_from(&mut response))
                .await
                .map_err(|_| TimeSyncError::ReceiveTimeout)?
                .map_err(|e| {
                    warn!("Network Time Protocol (NTP) receive failed: {:?}", e);
                    TimeSyncError::Receive
                })?;

            let unix_time = parse_ntp_response(response.get(..len).unwrap_or(&response))?;
            info!(
                "Network Time Protocol (NTP) time: {} (unix timestamp)",
                unix_time.as_i64()
            );
            Ok(unix_time)
        }
    }
}
