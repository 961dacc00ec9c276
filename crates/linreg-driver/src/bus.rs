//! CSR bus abstraction
//!
//! The engine drivers talk to the accelerator block through this trait so
//! the same code runs against a mapped hardware window ([`crate::MmioBus`])
//! or the register-accurate software model ([`crate::SimBus`]).

use std::fmt::Debug;

/// 32-bit CSR access to the accelerator window.
///
/// Offsets are byte offsets from the window base, as published in
/// [`linreg_chip::regs`]. Implementations bounds-check against the window
/// size and panic on out-of-range offsets — an out-of-window access is a
/// driver bug, not a runtime condition.
pub trait CsrBus: Debug + Send {
    /// Read a 32-bit register.
    fn read32(&self, offset: usize) -> u32;

    /// Write a 32-bit register.
    fn write32(&mut self, offset: usize, value: u32);

    /// Write consecutive 32-bit registers starting at `base`.
    fn write_block(&mut self, base: usize, words: &[u32]) {
        for (i, &w) in words.iter().enumerate() {
            self.write32(base + i * 4, w);
        }
    }

    /// Transport identifier for logging.
    fn bus_type(&self) -> BusType;
}

impl<T: CsrBus + ?Sized> CsrBus for Box<T> {
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }

    fn write_block(&mut self, base: usize, words: &[u32]) {
        (**self).write_block(base, words);
    }

    fn bus_type(&self) -> BusType {
        (**self).bus_type()
    }
}

/// Bus transport identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    /// Memory-mapped CSR window (/dev/mem or UIO resource)
    Mmio,
    /// Software model of the accelerator block
    Sim,
}

impl std::fmt::Display for BusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mmio => write!(f, "MMIO"),
            Self::Sim => write!(f, "Sim (software model)"),
        }
    }
}
