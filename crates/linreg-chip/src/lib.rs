//! Silicon model of the LiteX linear-regression accelerator CSR block.
//!
//! This crate has **no dependencies** and **no hardware access** — it is a
//! pure model of the gateware: register offsets, bit definitions, lane
//! geometry, and the fixed-point format the engines compute in.
//!
//! Three accelerator generations share one CSR window:
//!
//! | Module | Engine |
//! |--------|--------|
//! | [`regs::dot`] | 8-lane combinational Q16.16 dot product |
//! | [`regs::wide`] | 64-lane sequenced raw-integer MAC with bias |
//! | [`regs::scalar`] | single `y = w·x + b` MAC with start/done handshake |
//!
//! The window layout here is the driver's contract with the gateware, not a
//! copy of any generated `csr.h` — rebuild the SoC with these offsets or
//! adjust the constants to match your build.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fixedfmt;
pub mod regs;

/// Lanes in the combinational dot engine.
pub const DOT_LANES: usize = 8;

/// Lanes in the sequenced wide engine.
pub const WIDE_LANES: usize = 64;

/// Register width in bits. All CSRs are full 32-bit words.
pub const DATA_WIDTH: usize = 32;
