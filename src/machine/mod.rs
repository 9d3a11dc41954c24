//! VOLE machine simulation.
//!
//! This module provides the components of the simulated machine:
//!
//! - [`alu`] - pure byte-level arithmetic and logic
//! - [`memory`] - the byte-addressed storage
//! - [`registers`] - the general-purpose register file
//! - [`instruction`] - 16-bit instruction decoding
//! - [`control`] - the decode-execute step function
//! - [`engine`] - the machine driver that owns the cycle loop
//!
//! # Example
//!
//! ```
//! use vole_emu::machine::Machine;
//!
//! let mut machine = Machine::new(256, 16);
//! machine.load_image(&[0x22, 0xFF, 0xC0, 0x00]).unwrap();
//! machine.run();
//!
//! let state = machine.final_state();
//! assert_eq!(state.registers[2], 0xFF);
//! assert_eq!(state.pc, 2);
//! ```

pub mod alu;
pub mod control;
pub mod engine;
pub mod instruction;
pub mod memory;
pub mod registers;

pub use control::{ControlUnit, ExecuteResult};
pub use engine::{FinalState, Machine, MachineStatus};
pub use instruction::{Instruction, Op};
pub use memory::Memory;
pub use registers::RegisterFile;

use thiserror::Error;

/// A runtime fault raised by an out-of-bounds access.
///
/// Faults are explicit failures that stop the machine with a distinct
/// status; they never panic and never corrupt adjacent state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Memory address outside [0, capacity).
    #[error("memory address 0x{address:02X} out of range (capacity {capacity})")]
    MemoryOutOfRange { address: usize, capacity: usize },

    /// Register number outside [0, count).
    #[error("register r{index} out of range ({count} registers)")]
    RegisterOutOfRange { index: usize, count: usize },

    /// Program image larger than memory capacity.
    #[error("program image of {len} bytes exceeds memory capacity {capacity}")]
    ImageTooLarge { len: usize, capacity: usize },
}
