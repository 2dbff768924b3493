#![cfg(feature = "host")]
//! Host-level tests for the shift-register driver, replayed through a model of the chip.

mod support;

use shift_clock::Error;
use shift_clock::display_frame::DisplayFrame;
use shift_clock::segment::{SegmentPattern, Symbol, encode};
use support::{Chip, Line, Write, recording_bus};

fn pattern(extra: u8, digit: u8) -> SegmentPattern {
    encode(extra, Symbol::Digit(digit)).expect("digit must encode")
}

#[test]
fn new_drives_every_line_low() {
    let (_bus, log) = recording_bus();
    assert_eq!(
        *log.borrow(),
        [
            Write { line: Line::Data, high: false },
            Write { line: Line::ShiftClock, high: false },
            Write { line: Line::Latch, high: false },
        ]
    );
}

#[test]
fn one_pattern_is_eight_shifts_and_one_latch() {
    let (mut bus, log) = recording_bus();
    let seven = pattern(1, 7);
    bus.shift_out_frame(&[seven]);

    let chip = Chip::replay(&log.borrow());
    assert_eq!(chip.shift_pulses, 8);
    assert_eq!(chip.latch_pulses, 1);
    // [1,1,1,1,0,0,0,0] goes out index 7 first
    assert_eq!(
        chip.sampled,
        [false, false, false, false, true, true, true, true]
    );
    assert_eq!(chip.stage(0), seven.bits());
}

#[test]
fn latch_comes_after_the_last_shift() {
    let (mut bus, log) = recording_bus();
    bus.shift_out_frame(&[pattern(0, 1), pattern(1, 2)]);

    let writes = log.borrow();
    let last_shift = writes
        .iter()
        .rposition(|write| write.line == Line::ShiftClock && write.high)
        .expect("at least one shift");
    let latches: Vec<usize> = writes
        .iter()
        .enumerate()
        .filter(|(_, write)| write.line == Line::Latch && write.high)
        .map(|(index, _)| index)
        .collect();
    assert_eq!(latches.len(), 1);
    assert!(latches[0] > last_shift);
    assert_eq!(Chip::replay(&writes).shift_pulses, 16);
}

#[test]
fn first_pattern_shifted_lands_furthest_down_the_chain() {
    let (mut bus, log) = recording_bus();
    let frame = DisplayFrame::from_hour_minute(1, 7).expect("1:07 is a valid time");
    bus.show(&frame);

    let chip = Chip::replay(&log.borrow());
    let [hour, minute_tens, minute_units] = frame.patterns();
    assert_eq!(chip.shift_pulses, 24);
    assert_eq!(chip.latch_pulses, 1);
    assert_eq!(chip.stage(0), minute_units.bits());
    assert_eq!(chip.stage(1), minute_tens.bits());
    assert_eq!(chip.stage(2), hour.bits());
}

#[test]
fn shifting_the_same_frame_twice_keeps_the_display() {
    let (mut bus, log) = recording_bus();
    let frame = DisplayFrame::from_hour_minute(10, 42).expect("10:42 is a valid time");

    bus.show(&frame);
    let once = Chip::replay(&log.borrow()).outputs();
    bus.show(&frame);
    let chip = Chip::replay(&log.borrow());

    assert_eq!(chip.latch_pulses, 2);
    assert_eq!(chip.outputs(), once);
}

#[test]
fn lamp_test_latches_all_ones() {
    let (mut bus, log) = recording_bus();
    bus.show(&DisplayFrame::LAMP_TEST);
    assert_eq!(Chip::replay(&log.borrow()).outputs(), vec![1; 24]);
}

#[test]
fn load_digits_shows_the_clock_digits() {
    let (mut bus, log) = recording_bus();
    bus.load_digits(1, 2, 3, 4).expect("12:34 is valid");

    let chip = Chip::replay(&log.borrow());
    assert_eq!(chip.stage(2), pattern(1, 2).bits());
    assert_eq!(chip.stage(1), pattern(1, 3).bits());
    assert_eq!(chip.stage(0), pattern(1, 4).bits());
}

#[test]
fn rejected_digits_shift_nothing() {
    let (mut bus, log) = recording_bus();
    let writes_before = log.borrow().len();

    assert!(matches!(
        bus.load_digits(2, 0, 0, 0),
        Err(Error::InvalidHourTens(2))
    ));
    assert!(matches!(
        bus.load_digits(0, 1, 6, 10),
        Err(Error::InvalidDigit(10))
    ));
    assert_eq!(log.borrow().len(), writes_before);
}

#[test]
fn release_returns_the_pins() {
    let (bus, log) = recording_bus();
    let (_data, _shift_clock, _latch) = bus.release();
    assert_eq!(log.borrow().len(), 3);
}
