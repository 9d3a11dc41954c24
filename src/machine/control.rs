//! Control unit: the decode-execute step function.
//!
//! The control unit holds no state of its own. Each cycle it takes the
//! fetched instruction plus exclusive borrows of the register file and
//! memory, performs the operation, and tells the driver what to do with the
//! program counter. It never owns the arrays and never touches the counter
//! directly.

use super::instruction::{Instruction, Op};
use super::memory::Memory;
use super::registers::RegisterFile;
use super::{alu, Fault};

/// Result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteResult {
    /// Continue at the already-advanced program counter.
    Continue,
    /// Overwrite the program counter with an absolute address.
    Branch { target: u8 },
    /// The machine has halted normally.
    Halt,
    /// Unrecognized opcode; the driver reports it and stops.
    Unknown { opcode: u8 },
}

/// The decode-execute engine.
#[derive(Debug, Default)]
pub struct ControlUnit;

impl ControlUnit {
    /// Execute a single instruction against the register file and memory.
    ///
    /// Out-of-bounds accesses surface as a [`Fault`] before any state is
    /// mutated for that instruction. An unknown opcode mutates nothing.
    pub fn execute(
        &self,
        inst: Instruction,
        registers: &mut RegisterFile,
        memory: &mut Memory,
    ) -> Result<ExecuteResult, Fault> {
        match inst.op() {
            Op::Load { r, address } => {
                let value = memory.get(address as usize)?;
                registers.set(r as usize, value)?;
            }
            Op::LoadImmediate { r, value } => {
                registers.set(r as usize, value)?;
            }
            Op::Store { r, address } => {
                let value = registers.get(r as usize)?;
                memory.set(address as usize, value)?;
            }
            Op::Move { src, dst } => {
                let value = registers.get(src as usize)?;
                registers.set(dst as usize, value)?;
            }
            Op::Add { r, s, t } => {
                let result = alu::add(registers.get(s as usize)?, registers.get(t as usize)?);
                registers.set(r as usize, result)?;
            }
            Op::Or { r, s, t } => {
                let result = alu::or(registers.get(s as usize)?, registers.get(t as usize)?);
                registers.set(r as usize, result)?;
            }
            Op::And { r, s, t } => {
                let result = alu::and(registers.get(s as usize)?, registers.get(t as usize)?);
                registers.set(r as usize, result)?;
            }
            Op::Xor { r, s, t } => {
                let result = alu::xor(registers.get(s as usize)?, registers.get(t as usize)?);
                registers.set(r as usize, result)?;
            }
            Op::Rotate { r, amount } => {
                let cell = registers.get_mut(r as usize)?;
                alu::rotate(cell, amount);
            }
            Op::BranchZero { r, target } => {
                if registers.get(r as usize)? == 0 {
                    return Ok(ExecuteResult::Branch { target });
                }
            }
            Op::Halt => return Ok(ExecuteResult::Halt),
            Op::Unknown { opcode } => return Ok(ExecuteResult::Unknown { opcode }),
        }

        Ok(ExecuteResult::Continue)
    }
}
