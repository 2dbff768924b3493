//! A four-digit shift-register clock that keeps network time.
//!
//! Lights every segment, sets the display brightness from the supply-current sense input,
//! joins Wi-Fi (with the `wifi` feature), then redraws once a minute.
//!
//! Configure with `WIFI_SSID`, `WIFI_PASS` and `UTC_OFFSET_MINUTES` in `.env` or `~/.pico.env`.
#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use panic_probe as _;
use shift_clock::Result;
use shift_clock::clock::LocalClock;
use shift_clock::clock_loop::ClockLoop;
use shift_clock::config::ClockConfig;
use shift_clock::display_frame::DisplayFrame;
use shift_clock::hardware::{Hardware, HardwarePins};

#[cfg(feature = "pico2")]
#[unsafe(link_section = ".start_block")]
#[used]
#[expect(unsafe_code, reason = "The boot ROM finds the image definition by section")]
pub static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    core::panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let config = ClockConfig::from_build_env()?;
    info!(
        "Starting shift-register clock (UTC offset: {} minutes)",
        config.utc_offset_minutes
    );

    let p = embassy_rp::init(Default::default());
    let Hardware {
        mut shift_register,
        mut dimmer,
        mut sensor,
    } = Hardware::new(
        HardwarePins {
            data: p.PIN_12,
            shift_clock: p.PIN_14,
            latch: p.PIN_16,
            output_enable: p.PIN_13,
            pwm_slice: p.PWM_SLICE6,
            adc: p.ADC,
            sense: p.PIN_26,
        },
        config.pwm_frequency_hz,
    );

    // 18:88 until the network is up
    shift_register.show(&DisplayFrame::LAMP_TEST);
    dimmer.calibrate(&mut sensor, &config.brightness_model);

    #[cfg(feature = "wifi")]
    let time_source = {
        use shift_clock::time_sync::NtpTimeSource;
        use shift_clock::wifi::{WifiPins, connect};

        let pins = WifiPins {
            power: p.PIN_23,
            chip_select: p.PIN_25,
            pio: p.PIO0,
            data: p.PIN_24,
            clock: p.PIN_29,
            dma: p.DMA_CH0,
        };
        let stack = connect(pins, &config.wifi, config.join_retry, spawner).await?;
        NtpTimeSource::new(stack)
    };
    #[cfg(not(feature = "wifi"))]
    let time_source = {
        let _ = spawner;
        info!("Built without wifi; the clock will run unsynced");
        shift_clock::time_source::NoTimeSource
    };

    let clock = LocalClock::new(config.utc_offset_minutes);
    ClockLoop::new(shift_register, clock, time_source).run().await
}
