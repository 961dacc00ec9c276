//! Driver for the scalar `y = w·x + b` engine
//!
//! The oldest of the three generations: one Q16.16 MAC behind a
//! control/status handshake (START/RESET, READY/DONE/BUSY). Parameters are
//! latched once, then inputs stream through one at a time.

// Register words cross the bus as u32, engine arithmetic is Q16.16 i32
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use crate::bus::CsrBus;
use crate::error::{LinregError, Result};
use crate::fixed;
use linreg_chip::regs::scalar::{control, status, BIAS, CONTROL, INPUT, RESULT, STATUS, WEIGHT};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default poll timeout for one computation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Driver for the scalar MAC engine.
#[derive(Debug)]
pub struct ScalarAccel<B: CsrBus> {
    bus: B,
    timeout: Duration,
}

impl<B: CsrBus> ScalarAccel<B> {
    /// Attach to the engine and pulse its reset.
    pub fn new(bus: B) -> Self {
        let mut accel = Self {
            bus,
            timeout: DEFAULT_TIMEOUT,
        };
        accel.reset();
        accel
    }

    /// Override the poll timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pulse the reset bit, returning the pipeline to idle.
    pub fn reset(&mut self) {
        self.bus.write32(CONTROL, control::RESET);
        self.bus.write32(CONTROL, 0);
        debug!("scalar engine reset on {} bus", self.bus.bus_type());
    }

    /// Latch model parameters as floats.
    pub fn set_params(&mut self, weight: f64, bias: f64) {
        self.set_params_fixed(fixed::to_fixed(weight), fixed::to_fixed(bias));
    }

    /// Latch model parameters already in Q16.16.
    pub fn set_params_fixed(&mut self, weight: i32, bias: i32) {
        self.bus.write32(WEIGHT, weight as u32);
        self.bus.write32(BIAS, bias as u32);
    }

    /// Engine will accept a new input.
    pub fn is_ready(&self) -> bool {
        self.bus.read32(STATUS) & status::READY != 0
    }

    /// Result register holds a completed computation.
    pub fn is_done(&self) -> bool {
        self.bus.read32(STATUS) & status::DONE != 0
    }

    /// Computation in flight.
    pub fn is_busy(&self) -> bool {
        self.bus.read32(STATUS) & status::BUSY != 0
    }

    fn wait(&self, bit: u32) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        while self.bus.read32(STATUS) & bit == 0 {
            if Instant::now() >= deadline {
                return Err(LinregError::timeout(self.timeout));
            }
            std::hint::spin_loop();
        }
        Ok(())
    }

    /// Compute `w·x + b` for one Q16.16 input.
    ///
    /// Waits for READY, streams the input, pulses START, polls DONE.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::Timeout`] if either poll exceeds the timeout.
    pub fn compute_fixed(&mut self, input: i32) -> Result<i32> {
        self.wait(status::READY)?;

        self.bus.write32(INPUT, input as u32);
        self.bus.write32(CONTROL, control::START);
        self.bus.write32(CONTROL, 0);

        self.wait(status::DONE)?;
        Ok(self.bus.read32(RESULT) as i32)
    }

    /// Compute `w·x + b` for one float input.
    ///
    /// # Errors
    ///
    /// Same as [`compute_fixed`](Self::compute_fixed).
    pub fn compute(&mut self, input: f64) -> Result<f64> {
        let raw = self.compute_fixed(fixed::to_fixed(input))?;
        Ok(fixed::from_fixed(raw))
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }
}
