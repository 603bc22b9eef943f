// "blockface": stippled block-reveal watch face for a 144x168 memory LCD

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(feature = "firmware")]
pub mod board;
pub mod drivers;
pub mod face;
pub mod kernel;
pub mod ui;
