//! The clock's board wiring, built once from the RP peripherals.
//!
//! | Signal                          | Pin    |
//! |---------------------------------|--------|
//! | Shift-register serial data      | GPIO12 |
//! | Shift-register clock (SRCK)     | GPIO14 |
//! | Latch / register clock (RCK)    | GPIO16 |
//! | Output enable (PWM, active low) | GPIO13 |
//! | Supply-current sense (ADC0)     | GPIO26 |

use core::convert::Infallible;

use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::peripherals::{ADC, PIN_12, PIN_13, PIN_14, PIN_16, PIN_26, PWM_SLICE6};
use embassy_rp::pwm::{Config, Pwm};
use embassy_rp::{Peri, bind_interrupts};
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use fixed::FixedU16;

#[cfg(feature = "defmt")]
use defmt::{info, warn};

use crate::brightness::{AnalogSensor, Dimmer, PwmTiming};
use crate::shift_register::ShiftRegister;

bind_interrupts!(struct AdcIrqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

/// The clock's display bus, dimmer and brightness sensor.
pub struct Hardware {
    pub shift_register: ShiftRegister<Output<'static>, Output<'static>, Output<'static>>,
    pub dimmer: Dimmer<RpDimmer<'static>>,
    pub sensor: RpSensor<'static>,
}

/// The peripherals [`Hardware::new`] consumes.
pub struct HardwarePins {
    pub data: Peri<'static, PIN_12>,
    pub shift_clock: Peri<'static, PIN_14>,
    pub latch: Peri<'static, PIN_16>,
    pub output_enable: Peri<'static, PIN_13>,
    pub pwm_slice: Peri<'static, PWM_SLICE6>,
    pub adc: Peri<'static, ADC>,
    pub sense: Peri<'static, PIN_26>,
}

impl Hardware {
    /// Claims the pins. All three bus lines start low and the PWM starts at the dimmest
    /// duty until brightness is calibrated.
    #[must_use]
    pub fn new(pins: HardwarePins, pwm_frequency_hz: u32) -> Self {
        let shift_register = ShiftRegister::new(
            Output::new(pins.data, Level::Low),
            Output::new(pins.shift_clock, Level::Low),
            Output::new(pins.latch, Level::Low),
        );

        let pwm = Pwm::new_output_b(pins.pwm_slice, pins.output_enable, Config::default());
        let dimmer = Dimmer::new(RpDimmer::new(pwm, pwm_frequency_hz));

        let adc = Adc::new(pins.adc, AdcIrqs, adc::Config::default());
        let channel = Channel::new_pin(pins.sense, Pull::None);
        let sensor = RpSensor { adc, channel };

        Self {
            shift_register,
            dimmer,
            sensor,
        }
    }
}

// ============================================================================
// PWM
// ============================================================================

/// One PWM channel (B) running at a fixed frequency.
///
/// Duty updates rewrite the stored config so the divider survives reconfiguration.
pub struct RpDimmer<'d> {
    pwm: Pwm<'d>,
    cfg: Config,
    timing: PwmTiming,
}

impl<'d> RpDimmer<'d> {
    /// Configures `pwm` for `frequency_hz`, starting at the dimmest duty.
    #[must_use]
    pub fn new(mut pwm: Pwm<'d>, frequency_hz: u32) -> Self {
        let clk = clk_sys_freq();
        let timing = PwmTiming::for_frequency(clk, frequency_hz);

        let mut cfg = Config::default();
        cfg.top = timing.top;
        cfg.phase_correct = false;
        cfg.divider = FixedU16::from_bits(timing.divider_16ths);
        cfg.compare_b = timing.top;
        cfg.enable = true;
        pwm.set_config(&cfg);

        #[cfg(feature = "defmt")]
        {
            info!(
                "dimmer clk={}Hz div={}/16 top={}",
                clk, timing.divider_16ths, timing.top
            );
            let achieved = timing.frequency_hz(clk);
            if achieved != frequency_hz {
                warn!("PWM runs at {}Hz, not the requested {}Hz", achieved, frequency_hz);
            }
        }

        Self { pwm, cfg, timing }
    }
}

impl ErrorType for RpDimmer<'_> {
    type Error = Infallible;
}

impl SetDutyCycle for RpDimmer<'_> {
    fn max_duty_cycle(&self) -> u16 {
        self.timing.counts()
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.cfg.compare_b = duty.min(self.timing.counts());
        self.pwm.set_config(&self.cfg);
        Ok(())
    }
}

// ============================================================================
// ADC
// ============================================================================

/// The supply-current sense input, scaled to 10 bits.
///
/// The RP converter is 12-bit over 0 to 3.3 V, so after the shift a count is about 3.2 mV.
/// [`BrightnessModel::CALIBRATED`](crate::brightness::BrightnessModel::CALIBRATED) was fitted on
/// a 0 to 1 V converter; set its `reading_gain` or refit before trusting the duty on this board.
pub struct RpSensor<'d> {
    adc: Adc<'d, adc::Async>,
    channel: Channel<'d>,
}

impl AnalogSensor for RpSensor<'_> {
    fn read(&mut self) -> u16 {
        match self.adc.blocking_read(&mut self.channel) {
            // 12-bit conversion down to the 10-bit scale
            Ok(raw) => raw >> 2,
            Err(_err) => {
                #[cfg(feature = "defmt")]
                warn!("ADC conversion failed: {}", _err);
                0
            }
        }
    }
}
