//! CSR window layout for the accelerator block.
//!
//! One 4 KiB window holds all three engine generations. Offsets are in bytes
//! from the window base; every register is a naturally aligned 32-bit word.
//!
//! ```text
//! 0x0000  dot engine     8 inputs, 8 weights, result        (combinational)
//! 0x0100  scalar engine  weight/bias/input, ctrl/status     (sequenced)
//! 0x0400  wide engine    64 inputs, 64 weights, bias,       (sequenced)
//!                        start/done, result
//! ```

/// Total size of the CSR window in bytes.
pub const WINDOW_SIZE: usize = 0x1000;

/// 8-lane combinational dot engine.
///
/// Per lane the gateware computes the Q16.16 product `(a·b) >> 16`; the
/// result register is the wrapping 32-bit sum of the lanes and is valid
/// immediately after the operand writes — no handshake.
pub mod dot {
    /// First of 8 consecutive input registers.
    pub const INPUT_BASE: usize = 0x0000;
    /// First of 8 consecutive weight registers.
    pub const WEIGHT_BASE: usize = 0x0020;
    /// Dot-product result (read-only).
    pub const RESULT: usize = 0x0040;
}

/// Scalar `y = w·x + b` engine.
pub mod scalar {
    /// Weight operand (Q16.16).
    pub const WEIGHT: usize = 0x0100;
    /// Bias operand (Q16.16).
    pub const BIAS: usize = 0x0104;
    /// Input operand (Q16.16).
    pub const INPUT: usize = 0x0108;
    /// Control register — see [`control`].
    pub const CONTROL: usize = 0x010C;
    /// Status register — see [`status`].
    pub const STATUS: usize = 0x0110;
    /// Result register (Q16.16, read-only).
    pub const RESULT: usize = 0x0114;

    /// Control register bits.
    pub mod control {
        /// Start the MAC. Self-clearing in gateware; drivers pulse it.
        pub const START: u32 = 1 << 0;
        /// Soft reset of the engine pipeline.
        pub const RESET: u32 = 1 << 1;
    }

    /// Status register bits.
    pub mod status {
        /// Engine will accept a new input.
        pub const READY: u32 = 1 << 0;
        /// Result register holds the last computation.
        pub const DONE: u32 = 1 << 1;
        /// Computation in flight.
        pub const BUSY: u32 = 1 << 2;
    }
}

/// 64-lane sequenced wide engine.
///
/// Raw integer semantics: `result = Σ aᵢ·bᵢ + bias`, all arithmetic
/// wrapping 32-bit. Handshake: write operands, write 1 to `START`, poll
/// bit 0 of `DONE`, read `RESULT`.
pub mod wide {
    /// First of 64 consecutive input registers (0x100 bytes).
    pub const INPUT_BASE: usize = 0x0400;
    /// First of 64 consecutive weight registers (0x100 bytes).
    pub const WEIGHT_BASE: usize = 0x0500;
    /// Bias added to the accumulated sum.
    pub const BIAS: usize = 0x0600;
    /// Write 1 to start the MAC sequence.
    pub const START: usize = 0x0604;
    /// Bit 0 set when the result is valid.
    pub const DONE: usize = 0x0608;
    /// Accumulated result (read-only).
    pub const RESULT: usize = 0x060C;
}
