//! Driver for the LiteX linear/logistic-regression accelerator block.
//!
//! The SoC exposes three engine generations in one CSR window (see
//! [`linreg_chip`]); this crate drives all three over a pluggable bus:
//!
//! ```text
//! Hardware:
//!   MmioBus — mapped CSR window (/dev/mem or UIO resource)
//!
//! CI / bring-up:
//!   SimBus  — register-accurate software model, no SoC required
//! ```
//!
//! # Quick start
//!
//! ```
//! use linreg_driver::{DotAccel, SimBus};
//!
//! # fn main() -> linreg_driver::Result<()> {
//! let mut accel = DotAccel::new(SimBus::new());
//! accel.init();
//! accel.self_test()?;
//!
//! let x: Vec<f64> = (1..=100).map(f64::from).collect();
//! let w = vec![0.5f64; 100];
//! let dot = accel.dot(&x, &w)?;
//! println!("Σ x·w = {dot}");
//! # Ok(())
//! # }
//! ```
//!
//! On hardware, swap the bus:
//!
//! ```no_run
//! use linreg_driver::{DotAccel, MmioBus};
//!
//! # fn main() -> linreg_driver::Result<()> {
//! let bus = MmioBus::map("/dev/mem", 0xf000_0000)?;
//! let mut accel = DotAccel::new(bus);
//! accel.self_test()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod bus;
mod dot;
mod error;
pub mod fixed;
mod mmio;
pub mod model;
mod scalar;
mod sim;
mod wide;

pub use bus::{BusType, CsrBus};
pub use dot::DotAccel;
pub use error::{LinregError, Result};
pub use mmio::MmioBus;
pub use model::{LinearModel, LogisticModel, QuantizedLinearModel};
pub use scalar::ScalarAccel;
pub use sim::SimBus;
pub use wide::{InferenceOutcome, WideAccel};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        CsrBus, DotAccel, LinearModel, LinregError, LogisticModel, MmioBus, Result, ScalarAccel,
        SimBus, WideAccel,
    };
}
