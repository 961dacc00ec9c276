// SPDX-License-Identifier: AGPL-3.0-only

//! Software model of the accelerator block
//!
//! Implements [`CsrBus`] with a register-accurate model of all three
//! engines, so every driver path runs in CI without the SoC:
//!
//! 1. **Parity baseline**: the benchmark and test suites compare the
//!    hardware window against this model's output.
//! 2. **Timeout testing**: a [`SimBus::stuck`] instance never raises the
//!    wide engine's done bit, exercising the driver's timeout path —
//!    something real gateware can't do on demand.
//!
//! The model mirrors the gateware semantics exactly: Q16.16 lane products
//! truncated before summing in the dot engine, raw wrapping 32-bit MAC in
//! the wide engine, and a done-latency countdown on the sequenced engines
//! so drivers actually poll.

// Register words flip between u32 (bus view) and i32 (engine arithmetic)
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use crate::bus::{BusType, CsrBus};
use linreg_chip::regs::{dot, scalar, wide, WINDOW_SIZE};
use linreg_chip::{DOT_LANES, WIDE_LANES};
use std::cell::Cell;

/// Default number of done polls before a sequenced engine completes.
const DEFAULT_DONE_LATENCY: u32 = 2;

/// Register-accurate software model of the accelerator window.
#[derive(Debug)]
pub struct SimBus {
    /// Shadow of the CSR window, one u32 per register slot
    window: Vec<u32>,
    /// Done polls a sequenced computation takes
    done_latency: u32,
    /// Polls left on the wide engine (0 = idle/done)
    wide_remaining: Cell<u32>,
    /// Polls left on the scalar engine
    scalar_remaining: Cell<u32>,
    /// Scalar engine has produced at least one result since reset
    scalar_started: bool,
    /// Never signal done (drives the driver timeout path)
    stuck: bool,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Create a model with the default done latency.
    pub fn new() -> Self {
        Self {
            window: vec![0u32; WINDOW_SIZE / 4],
            done_latency: DEFAULT_DONE_LATENCY,
            wide_remaining: Cell::new(0),
            scalar_remaining: Cell::new(0),
            scalar_started: false,
            stuck: false,
        }
    }

    /// Create a model whose sequenced engines take `polls` done reads.
    pub fn with_done_latency(polls: u32) -> Self {
        Self {
            done_latency: polls,
            ..Self::new()
        }
    }

    /// Create a model whose sequenced engines, once started, never signal
    /// done.
    pub fn stuck() -> Self {
        Self {
            stuck: true,
            ..Self::new()
        }
    }

    fn word(&self, offset: usize) -> u32 {
        self.window[offset / 4]
    }

    /// Dot engine: Q16.16 lane products truncated to Q16.16, wrapping sum.
    fn dot_result(&self) -> u32 {
        let mut sum = 0i32;
        for lane in 0..DOT_LANES {
            let a = self.word(dot::INPUT_BASE + lane * 4) as i32;
            let b = self.word(dot::WEIGHT_BASE + lane * 4) as i32;
            #[allow(clippy::cast_possible_truncation)]
            let product = ((i64::from(a) * i64::from(b)) >> 16) as i32;
            sum = sum.wrapping_add(product);
        }
        sum as u32
    }

    /// Wide engine: raw wrapping 32-bit MAC plus bias.
    fn wide_result(&self) -> u32 {
        let mut acc = 0u32;
        for lane in 0..WIDE_LANES {
            let a = self.word(wide::INPUT_BASE + lane * 4);
            let b = self.word(wide::WEIGHT_BASE + lane * 4);
            acc = acc.wrapping_add(a.wrapping_mul(b));
        }
        acc.wrapping_add(self.word(wide::BIAS))
    }

    /// Scalar engine: Q16.16 `w·x + b`.
    fn scalar_result(&self) -> u32 {
        let w = self.word(scalar::WEIGHT) as i32;
        let x = self.word(scalar::INPUT) as i32;
        let b = self.word(scalar::BIAS) as i32;
        #[allow(clippy::cast_possible_truncation)]
        let product = ((i64::from(w) * i64::from(x)) >> 16) as i32;
        product.wrapping_add(b) as u32
    }

    /// Countdown helper: one poll against a sequenced engine.
    fn poll(counter: &Cell<u32>) -> bool {
        let remaining = counter.get();
        if remaining > 0 {
            counter.set(remaining - 1);
            false
        } else {
            true
        }
    }
}

impl CsrBus for SimBus {
    fn read32(&self, offset: usize) -> u32 {
        assert!(offset + 4 <= WINDOW_SIZE, "CSR offset out of window");
        match offset {
            dot::RESULT => self.dot_result(),
            wide::DONE => u32::from(Self::poll(&self.wide_remaining)),
            scalar::STATUS => {
                let idle = Self::poll(&self.scalar_remaining);
                let mut status = 0u32;
                if idle {
                    status |= scalar::status::READY;
                    if self.scalar_started {
                        status |= scalar::status::DONE;
                    }
                } else {
                    status |= scalar::status::BUSY;
                }
                status
            }
            _ => self.word(offset),
        }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        assert!(offset + 4 <= WINDOW_SIZE, "CSR offset out of window");
        self.window[offset / 4] = value;

        match offset {
            wide::START if value & 1 != 0 => {
                self.window[wide::RESULT / 4] = self.wide_result();
                let latency = if self.stuck { u32::MAX } else { self.done_latency };
                self.wide_remaining.set(latency);
            }
            scalar::CONTROL => {
                if value & scalar::control::RESET != 0 {
                    for reg in [scalar::WEIGHT, scalar::BIAS, scalar::INPUT, scalar::RESULT] {
                        self.window[reg / 4] = 0;
                    }
                    self.scalar_remaining.set(0);
                    self.scalar_started = false;
                }
                if value & scalar::control::START != 0 {
                    self.window[scalar::RESULT / 4] = self.scalar_result();
                    let latency = if self.stuck { u32::MAX } else { self.done_latency };
                    self.scalar_remaining.set(latency);
                    self.scalar_started = true;
                }
            }
            _ => {}
        }
    }

    fn bus_type(&self) -> BusType {
        BusType::Sim
    }
}
