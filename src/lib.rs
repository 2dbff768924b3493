//! Firmware library for a four-digit, seven-segment clock driven through a TPIC6B595 shift
//! register chain on a Raspberry Pi Pico.
//!
//! The rendering pipeline ([`segment`], [`display_frame`], [`shift_register`]) and brightness
//! model ([`brightness`]) are hardware independent and build on the host with the `host`
//! feature. [`hardware`] and [`wifi`] bind them to the RP peripherals.
#![cfg_attr(not(test), no_std)]

pub mod brightness;
pub mod clock;
pub mod clock_loop;
pub mod config;
pub mod display_frame;
mod error;
#[cfg(all(any(feature = "pico1", feature = "pico2"), not(feature = "host")))]
pub mod hardware;
pub mod retry;
pub mod segment;
pub mod shift_register;
pub mod time_source;
pub mod time_sync;
#[cfg(all(feature = "wifi", not(feature = "host")))]
pub mod wifi;

// Re-export commonly used items
pub use error::{Error, Result};
