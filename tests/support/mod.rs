//! Recording `embedded-hal` pins and a model of the shift-register chip for host tests.
#![allow(dead_code, reason = "Each test binary uses a different subset")]
#![allow(clippy::arithmetic_side_effects, reason = "Pulse counters in test code")]

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use shift_clock::shift_register::ShiftRegister;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Data,
    ShiftClock,
    Latch,
}

/// One pin write, in the order the driver made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub line: Line,
    pub high: bool,
}

pub type Log = Rc<RefCell<Vec<Write>>>;

pub struct RecordingPin {
    line: Line,
    log: Log,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Write {
            line: self.line,
            high: false,
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Write {
            line: self.line,
            high: true,
        });
        Ok(())
    }
}

pub type RecordingBus = ShiftRegister<RecordingPin, RecordingPin, RecordingPin>;

/// A driver over three recording pins that share one log.
pub fn recording_bus() -> (RecordingBus, Log) {
    let log = Log::default();
    let pin = |line| RecordingPin {
        line,
        log: Rc::clone(&log),
    };
    let bus = ShiftRegister::new(pin(Line::Data), pin(Line::ShiftClock), pin(Line::Latch));
    (bus, log)
}

/// Three TPIC6B595 stages fed by the recorded writes.
///
/// `outputs()[0..8]` is the stage nearest the data input, `outputs()[16..24]` the furthest.
/// Within a stage, output `i` holds the bit shifted in `i` clocks before the last one.
#[derive(Debug, Default)]
pub struct Chip {
    data: bool,
    shift_clock: bool,
    latch: bool,
    chain: Vec<bool>,
    outputs: Vec<bool>,
    pub shift_pulses: usize,
    pub latch_pulses: usize,
    /// Data level sampled at every shift-clock rising edge.
    pub sampled: Vec<bool>,
}

pub const CHAIN_LEN: usize = 24;

impl Chip {
    pub fn replay(writes: &[Write]) -> Self {
        let mut chip = Self {
            chain: vec![false; CHAIN_LEN],
            outputs: vec![false; CHAIN_LEN],
            ..Self::default()
        };
        for write in writes {
            chip.apply(*write);
        }
        chip
    }

    fn apply(&mut self, write: Write) {
        match write.line {
            Line::Data => self.data = write.high,
            Line::ShiftClock => {
                if write.high && !self.shift_clock {
                    self.shift_pulses += 1;
                    self.sampled.push(self.data);
                    self.chain.insert(0, self.data);
                    self.chain.truncate(CHAIN_LEN);
                }
                self.shift_clock = write.high;
            }
            Line::Latch => {
                if write.high && !self.latch {
                    self.latch_pulses += 1;
                    self.outputs.clone_from(&self.chain);
                }
                self.latch = write.high;
            }
        }
    }

    /// The latched outputs as 0/1, nearest stage first.
    pub fn outputs(&self) -> Vec<u8> {
        self.outputs.iter().map(|&bit| u8::from(bit)).collect()
    }

    /// The latched outputs of one stage (0 = nearest the data input).
    pub fn stage(&self, index: usize) -> Vec<u8> {
        self.outputs()
            .chunks(8)
            .nth(index)
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    }
}
