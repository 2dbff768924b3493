//! Wi-Fi client bring-up for the Pico W's CYW43439 radio.
//!
//! [`connect`] powers the radio, starts the DHCP network stack, joins the configured network
//! (retrying per the [`RetryPolicy`]) and waits for an address.
//!
//! ```no_run
//! # #![no_std]
//! # #![no_main]
//! # use panic_probe as _;
//! use shift_clock::config::ClockConfig;
//! use shift_clock::wifi::{WifiPins, connect};
//!
//! # async fn example(spawner: embassy_executor::Spawner) -> shift_clock::Result<()> {
//! let p = embassy_rp::init(Default::default());
//! let config = ClockConfig::from_build_env()?;
//! let pins = WifiPins {
//!     power: p.PIN_23,
//!     chip_select: p.PIN_25,
//!     pio: p.PIO0,
//!     clock: p.PIN_29,
//!     data: p.PIN_24,
//!     dma: p.DMA_CH0,
//! };
//! let stack = connect(pins, &config.wifi, config.join_retry, spawner).await?;
//! // ... use stack ...
//! # Ok(())
//! # }
//! ```

#![allow(clippy::future_not_send, reason = "single-threaded")]

use cyw43::JoinOptions;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::{Peri, bind_interrupts};
use embassy_time::Timer;
use static_cell::StaticCell;

use crate::Result;
use crate::config::WifiCredentials;
use crate::retry::RetryPolicy;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// The Pico W's fixed radio wiring.
pub struct WifiPins {
    pub power: Peri<'static, PIN_23>,
    pub chip_select: Peri<'static, PIN_25>,
    pub pio: Peri<'static, PIO0>,
    pub data: Peri<'static, PIN_24>,
    pub clock: Peri<'static, PIN_29>,
    pub dma: Peri<'static, DMA_CH0>,
}

/// Brings the radio up in client mode and returns the network stack once DHCP has
/// configured it.
///
/// A bounded `retry` that runs out of attempts is not an error: the stack is returned
/// unjoined and every later time sync fails, which the clock loop tolerates.
///
/// # Errors
///
/// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the radio or network task cannot
/// be spawned.
pub async fn connect(
    pins: WifiPins,
    credentials: &WifiCredentials,
    retry: RetryPolicy,
    spawner: Spawner,
) -> Result<&'static Stack<'static>> {
    info!("WiFi device initializing in client mode");

    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(pins.power, Level::Low);
    let cs = Output::new(pins.chip_select, Level::High);
    let mut pio = Pio::new(pins.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        pins.data,
        pins.clock,
        pins.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(wifi_task(runner)?);

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let config = Config::dhcpv4(Default::default());
    let seed = 0x7c8f_3a2e_9d14_6b5a;

    static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let (stack_val, runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::<3>::new()),
        seed,
    );
    let stack = STACK.init(stack_val);
    spawner.spawn(net_task(runner)?);

    info!("Connecting to WiFi: {}", credentials.ssid.as_str());
    let mut attempt = 1_u32;
    let joined = loop {
        match control
            .join(
                credentials.ssid.as_str(),
                JoinOptions::new(credentials.password.as_bytes()),
            )
            .await
        {
            Ok(()) => break true,
            Err(err) => {
                info!("Join attempt {} failed: {}", attempt, err.status);
                let Some(delay) = retry.delay_after(attempt) else {
                    break false;
                };
                Timer::after(delay).await;
                attempt = attempt.saturating_add(1);
            }
        }
    };

    if !joined {
        warn!("Giving up on WiFi; the clock will run unsynced");
        return Ok(stack);
    }

    info!("WiFi connected! Waiting for DHCP...");
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("IP Address: {}", config.address);
    }
    info!("WiFi client ready");
    Ok(stack)
}

#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}
