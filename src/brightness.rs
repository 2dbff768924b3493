//! Display brightness from the clock's supply-current sense input.
//!
//! The display's supply current tracks the input voltage, so the averaged reading picks the PWM
//! duty that gives the same perceived brightness across supplies. The PWM drives the shift
//! register's active-low output enable, so a *lower* duty is a *brighter* display.
//!
//! See [`compute_duty`] and [`Dimmer`].

use core::convert::Infallible;

use embedded_hal::pwm::SetDutyCycle;
use num_traits::float::FloatCore;

#[cfg(feature = "defmt")]
use defmt::info;

// ============================================================================
// Constants
// ============================================================================

/// Readings averaged per brightness decision.
pub const SAMPLE_COUNT: u32 = 100;

/// Duty values are fractions of this full scale (the 10-bit range the model was fitted on).
pub const DUTY_SCALE: u16 = 1023;

/// PWM frequency for the output-enable line.
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 500;

// ============================================================================
// Types
// ============================================================================

/// A synchronous analog input that always produces a reading.
pub trait AnalogSensor {
    /// Take one raw reading on the 10-bit scale the brightness model expects.
    fn read(&mut self) -> u16;
}

impl<F: FnMut() -> u16> AnalogSensor for F {
    fn read(&mut self) -> u16 {
        self()
    }
}

/// A PWM duty on the 0..=1023 scale, always within `1..=1022`.
///
/// The ends of the range are avoided: fully off and fully on both produce artifacts on the
/// driven hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle(u16);

impl DutyCycle {
    /// Lowest allowed duty (brightest).
    pub const MIN: Self = Self(1);
    /// Highest allowed duty (dimmest).
    pub const MAX: Self = Self(DUTY_SCALE - 1);

    /// Clamps `value` into the allowed range.
    #[must_use]
    pub const fn new_clamped(value: u16) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// The duty on the 0..=1023 scale.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// The fitted inverse-affine model from averaged reading to duty.
///
/// The constants come from bench calibration: the clock was run from a variable supply and at
/// each voltage the duty giving a fixed measured brightness was recorded, then
/// `duty = 1023 - 1 / ((avg - offset) / scale)` was fitted to the data. Treat them as opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessModel {
    /// Multiplies the averaged reading before the model sees it.
    ///
    /// The fit was made on a 10-bit converter spanning 0 to 1 V. A board whose converter spans
    /// a different voltage needs the ratio of the two spans here (3.3 for a 0 to 3.3 V input
    /// scaled to 10 bits) or a fresh fit.
    pub reading_gain: f64,
    /// Averages below this are treated as a disconnected sensor and get the brightest duty.
    pub min_average: f64,
    /// Reading at which the model has its singularity.
    pub offset: f64,
    /// Scale of the inverse term.
    pub scale: f64,
}

impl BrightnessModel {
    /// The bench-calibrated model.
    pub const CALIBRATED: Self = Self {
        reading_gain: 1.0,
        min_average: 15.0,
        offset: 10.1991,
        scale: 15284.0,
    };

    /// Maps an averaged reading to a duty, after applying [`Self::reading_gain`].
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Value is clamped into 1..=1022 before the cast"
    )]
    pub fn duty_from_average(&self, average: f64) -> DutyCycle {
        let average = average * self.reading_gain;
        if average < self.min_average {
            return DutyCycle::MIN;
        }
        let raw = FloatCore::floor(
            f64::from(DUTY_SCALE) - 1.0 / ((average - self.offset) / self.scale),
        );
        if raw.is_nan() {
            return DutyCycle::MIN;
        }
        let clamped = raw.clamp(f64::from(DutyCycle::MIN.0), f64::from(DutyCycle::MAX.0));
        DutyCycle::new_clamped(clamped as u16)
    }
}

impl Default for BrightnessModel {
    fn default() -> Self {
        Self::CALIBRATED
    }
}

// ============================================================================
// Sampling
// ============================================================================

/// Takes [`SAMPLE_COUNT`] sequential readings and returns their mean.
pub fn average_reading(sensor: &mut impl AnalogSensor) -> f64 {
    let sum: u32 = (0..SAMPLE_COUNT).map(|_| u32::from(sensor.read())).sum();
    f64::from(sum) / f64::from(SAMPLE_COUNT)
}

/// Samples `sensor` and picks the duty for the current supply.
pub fn compute_duty(sensor: &mut impl AnalogSensor, model: &BrightnessModel) -> DutyCycle {
    let average = average_reading(sensor);
    #[cfg(feature = "defmt")]
    info!("Avg analog reading: {}", average);
    let duty = model.duty_from_average(average);
    #[cfg(feature = "defmt")]
    info!("Duty set to: {}", duty.get());
    duty
}

// ============================================================================
// Dimmer
// ============================================================================

/// Applies [`DutyCycle`]s to the PWM output driving the display's output enable.
pub struct Dimmer<P> {
    pwm: P,
}

impl<P: SetDutyCycle<Error = Infallible>> Dimmer<P> {
    /// Wraps an already-configured PWM output.
    pub const fn new(pwm: P) -> Self {
        Self { pwm }
    }

    /// Sets the duty as the fraction `duty / 1023` of the PWM's range.
    pub fn set_duty(&mut self, duty: DutyCycle) {
        let Ok(()) = self.pwm.set_duty_cycle_fraction(duty.get(), DUTY_SCALE);
    }

    /// Samples `sensor`, then applies the resulting duty.
    pub fn calibrate(&mut self, sensor: &mut impl AnalogSensor, model: &BrightnessModel) -> DutyCycle {
        let duty = compute_duty(sensor, model);
        self.set_duty(duty);
        duty
    }

    /// Gives the PWM output back.
    pub fn release(self) -> P {
        self.pwm
    }
}

// ============================================================================
// PWM timing
// ============================================================================

/// Smallest RP PWM clock divider (1.0), in sixteenths.
pub const MIN_DIVIDER_16THS: u16 = 0x010;
/// Largest RP PWM clock divider (255 + 15/16), in sixteenths.
pub const MAX_DIVIDER_16THS: u16 = 0xFFF;

/// Counter wrap and 8.4 fixed-point clock divider for one RP PWM slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmTiming {
    /// The counter wraps after `top + 1` ticks.
    pub top: u16,
    /// Clock divider in sixteenths.
    pub divider_16ths: u16,
}

impl PwmTiming {
    /// Picks the timing nearest `frequency_hz` for a `clk_hz` system clock.
    ///
    /// The counter keeps [`DUTY_SCALE`] ticks while the divider can reach the frequency. Past the
    /// largest divider the divider is pinned and the counter is lengthened instead. Frequencies
    /// beyond either end are approximated; check [`Self::frequency_hz`].
    ///
    /// ```
    /// use shift_clock::brightness::PwmTiming;
    ///
    /// // RP2040 at 125 MHz: 244 + 6/16
    /// let timing = PwmTiming::for_frequency(125_000_000, 500);
    /// assert_eq!((timing.top, timing.divider_16ths), (1022, 3910));
    /// assert_eq!(timing.frequency_hz(125_000_000), 500);
    /// ```
    #[must_use]
    pub fn for_frequency(clk_hz: u32, frequency_hz: u32) -> Self {
        let clk_16ths = u64::from(clk_hz).saturating_mul(16);
        let frequency = u64::from(frequency_hz.max(1));
        let divider = div_round(clk_16ths, frequency.saturating_mul(u64::from(DUTY_SCALE)));
        if divider <= u64::from(MAX_DIVIDER_16THS) {
            return Self {
                top: DUTY_SCALE - 1,
                divider_16ths: clamp_u16(divider, MIN_DIVIDER_16THS, MAX_DIVIDER_16THS),
            };
        }

        let counts = div_round(
            clk_16ths,
            frequency.saturating_mul(u64::from(MAX_DIVIDER_16THS)),
        );
        Self {
            // `top + 1` must still fit a u16 duty range
            top: clamp_u16(counts.saturating_sub(1), DUTY_SCALE - 1, u16::MAX - 1),
            divider_16ths: MAX_DIVIDER_16THS,
        }
    }

    /// Ticks per PWM period, which is also the full-on compare value.
    #[must_use]
    pub const fn counts(&self) -> u16 {
        self.top.saturating_add(1)
    }

    /// The frequency this timing produces from `clk_hz`, to the nearest hertz.
    #[must_use]
    pub fn frequency_hz(&self, clk_hz: u32) -> u32 {
        let ticks = u64::from(self.divider_16ths).saturating_mul(u64::from(self.counts()));
        u32::try_from(div_round(u64::from(clk_hz).saturating_mul(16), ticks)).unwrap_or(u32::MAX)
    }
}

fn div_round(numerator: u64, denominator: u64) -> u64 {
    numerator
        .saturating_add(denominator >> 1)
        .checked_div(denominator)
        .unwrap_or(u64::MAX)
}

fn clamp_u16(value: u64, min: u16, max: u16) -> u16 {
    u16::try_from(value.clamp(u64::from(min), u64::from(max))).unwrap_or(max)
}
