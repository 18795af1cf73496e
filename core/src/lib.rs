#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "mock", not(test)))]
extern crate std;

pub mod config;
pub mod display;
pub mod error;
pub mod firms;
pub mod framebuffer;
pub mod fs;
pub mod input;
pub mod menu;
pub mod power;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
