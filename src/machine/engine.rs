//! Machine driver.
//!
//! The driver owns memory, the register file, the control unit, the program
//! counter, and the halted status, and runs the cycle loop:
//!
//! 1. Fetch the 16-bit word at the program counter (big-endian byte pair).
//! 2. Advance the counter by 2.
//! 3. Decode and execute; a taken branch overwrites the counter absolutely.
//! 4. Repeat until the machine stops.
//!
//! The reported final program counter is the fetch address of the
//! instruction that stopped the machine, not the post-increment value.
//!
//! # Usage
//!
//! ```
//! use vole_emu::machine::Machine;
//!
//! let mut machine = Machine::new(256, 16);
//! machine.load_image(&[0x22, 0xFF, 0xC0, 0x00]).unwrap();
//! machine.run();
//! assert_eq!(machine.final_state().registers[2], 0xFF);
//! ```

use std::path::Path;

use super::control::{ControlUnit, ExecuteResult};
use super::instruction::Instruction;
use super::memory::Memory;
use super::registers::RegisterFile;
use super::Fault;
use crate::config::Config;
use crate::loader::{self, LoadError};

/// Machine execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    /// No cycle has run yet.
    Idle,
    /// The cycle loop is in progress.
    Running,
    /// A halt instruction was executed.
    Halted,
    /// An unrecognized opcode was reported and treated as an implicit halt.
    UnknownOpcode,
    /// An out-of-bounds access stopped the machine.
    Faulted,
    /// The configured cycle limit was reached before any halt condition.
    CycleLimit,
}

impl MachineStatus {
    /// True once the machine can make no further progress.
    pub fn is_stopped(&self) -> bool {
        !matches!(self, MachineStatus::Idle | MachineStatus::Running)
    }
}

/// Snapshot of machine state after the cycle loop stops.
#[derive(Debug, Clone)]
pub struct FinalState {
    /// Fetch address of the instruction that stopped the machine.
    pub pc: usize,
    /// Why the machine stopped.
    pub status: MachineStatus,
    /// Register contents, in index order.
    pub registers: Vec<u8>,
    /// Memory contents, in address order.
    pub memory: Vec<u8>,
    /// Cycles executed.
    pub cycles: u64,
}

/// The simulated machine.
///
/// Owns all mutable state exclusively; nothing is shared across instances.
pub struct Machine {
    memory: Memory,
    registers: RegisterFile,
    control: ControlUnit,
    pc: usize,
    status: MachineStatus,
    /// Fetch address of the instruction that stopped the machine.
    stop_pc: usize,
    /// Fault that stopped the machine, if any.
    last_fault: Option<Fault>,
    cycles: u64,
    /// Cycle guard for non-terminating programs (0 = unlimited).
    ///
    /// The machine itself imposes no limit; this is an opt-in extension for
    /// callers that cannot trust a program to reach a halt instruction.
    max_cycles: u64,
}

impl Machine {
    /// Create a machine with the given memory capacity and register count.
    pub fn new(memory_size: usize, register_count: usize) -> Self {
        Self {
            memory: Memory::new(memory_size),
            registers: RegisterFile::new(register_count),
            control: ControlUnit,
            pc: 0,
            status: MachineStatus::Idle,
            stop_pc: 0,
            last_fault: None,
            cycles: 0,
            max_cycles: 0,
        }
    }

    /// Create a machine from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut machine = Self::new(config.memory_size(), config.register_count());
        machine.max_cycles = config.max_cycles();
        machine
    }

    /// Set the cycle guard (0 = unlimited).
    pub fn set_max_cycles(&mut self, max_cycles: u64) {
        self.max_cycles = max_cycles;
    }

    /// Load a program image into memory starting at address 0.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), Fault> {
        log::debug!("loading {}-byte program image", image.len());
        self.memory.load_image(image)
    }

    /// Parse a hex program file and load it into memory.
    ///
    /// A parse failure leaves memory untouched.
    pub fn load_program_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let image = loader::load_program_file(path)?;
        self.load_image(&image).map_err(LoadError::from)
    }

    /// Current program counter (the next fetch address while running).
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Current status.
    pub fn status(&self) -> MachineStatus {
        self.status
    }

    /// Fault that stopped the machine, if any.
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    /// The machine's memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The machine's register file.
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Fetch the 16-bit word at the program counter.
    fn fetch(&self) -> Result<Instruction, Fault> {
        let high = self.memory.get(self.pc)?;
        let low = self.memory.get(self.pc + 1)?;
        Ok(Instruction::new(u16::from(high) << 8 | u16::from(low)))
    }

    /// Execute one cycle.
    ///
    /// Returns true if the machine is still running afterwards.
    pub fn step(&mut self) -> bool {
        if self.status.is_stopped() {
            return false;
        }
        self.status = MachineStatus::Running;

        let fetch_pc = self.pc;
        let inst = match self.fetch() {
            Ok(inst) => inst,
            Err(fault) => {
                log::error!("fault at pc=0x{:02X}: {}", fetch_pc, fault);
                self.stop(MachineStatus::Faulted, fetch_pc, Some(fault));
                return false;
            }
        };

        self.pc += 2;
        log::trace!("pc=0x{:02X}: {}", fetch_pc, inst);

        match self.control.execute(inst, &mut self.registers, &mut self.memory) {
            Ok(ExecuteResult::Continue) => {}
            Ok(ExecuteResult::Branch { target }) => {
                self.pc = target as usize;
            }
            Ok(ExecuteResult::Halt) => {
                self.stop(MachineStatus::Halted, fetch_pc, None);
            }
            Ok(ExecuteResult::Unknown { opcode }) => {
                log::warn!("unknown opcode 0x{:X} at pc=0x{:02X}", opcode, fetch_pc);
                self.stop(MachineStatus::UnknownOpcode, fetch_pc, None);
            }
            Err(fault) => {
                log::error!("fault at pc=0x{:02X} ({}): {}", fetch_pc, inst, fault);
                self.stop(MachineStatus::Faulted, fetch_pc, Some(fault));
            }
        }

        self.cycles += 1;

        if self.status == MachineStatus::Running
            && self.max_cycles > 0
            && self.cycles >= self.max_cycles
        {
            log::warn!("cycle limit of {} reached", self.max_cycles);
            self.stop(MachineStatus::CycleLimit, self.pc, None);
        }

        self.status == MachineStatus::Running
    }

    /// Run the cycle loop until the machine stops.
    ///
    /// Returns the number of cycles executed.
    pub fn run(&mut self) -> u64 {
        let start = self.cycles;
        while self.step() {}
        self.cycles - start
    }

    fn stop(&mut self, status: MachineStatus, stop_pc: usize, fault: Option<Fault>) {
        self.status = status;
        self.stop_pc = stop_pc;
        self.last_fault = fault;
    }

    /// Snapshot the final machine state.
    pub fn final_state(&self) -> FinalState {
        FinalState {
            pc: self.stop_pc,
            status: self.status,
            registers: self.registers.as_slice().to_vec(),
            memory: self.memory.as_slice().to_vec(),
            cycles: self.cycles,
        }
    }

    /// Print the final state in the classic uppercase-hex layout.
    pub fn print_final_state(&self, dump_memory: bool) {
        println!("Final Program Counter (PC) = {:02X}", self.stop_pc);
        println!("Status: {:?}", self.status);
        println!("Cycles: {}", self.cycles);

        println!("Registers:");
        for (i, value) in self.registers.as_slice().iter().enumerate() {
            println!("  R{:<2} = {:02X}", i, value);
        }

        if dump_memory {
            println!("Memory:");
            for (addr, chunk) in self.memory.as_slice().chunks(16).enumerate() {
                print!("  {:02X}: ", addr * 16);
                for byte in chunk {
                    print!("{:02X} ", byte);
                }
                println!();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(machine: &mut Machine, words: &[u16]) {
        let mut image = Vec::new();
        for word in words {
            image.extend_from_slice(&word.to_be_bytes());
        }
        machine.load_image(&image).unwrap();
    }

    #[test]
    fn test_load_immediate_then_halt() {
        let mut machine = Machine::new(256, 16);
        load(&mut machine, &[0x20FF, 0xC000]);

        machine.run();

        let state = machine.final_state();
        assert_eq!(state.status, MachineStatus::Halted);
        assert_eq!(state.registers[0], 0xFF);
        // Reported pc is the fetch address of the halt instruction.
        assert_eq!(state.pc, 2);
        assert_eq!(state.cycles, 2);
    }

    #[test]
    fn test_reported_pc_for_register_2_program() {
        let mut machine = Machine::new(256, 16);
        // loadi r2, 0xFF; halt
        load(&mut machine, &[0x22FF, 0xC000]);

        machine.run();

        let state = machine.final_state();
        assert_eq!(state.registers[2], 255);
        assert_eq!(state.pc, 2);
    }

    #[test]
    fn test_branch_taken_overwrites_pc() {
        let mut machine = Machine::new(256, 16);
        // r0 starts at 0, so jmpz r0 jumps over the loadi to the halt at 6.
        load(&mut machine, &[0xB006, 0x2111, 0x2122, 0xC000]);

        machine.run();

        let state = machine.final_state();
        assert_eq!(state.status, MachineStatus::Halted);
        assert_eq!(state.registers[1], 0);
        assert_eq!(state.pc, 6);
    }

    #[test]
    fn test_branch_not_taken_falls_through() {
        let mut machine = Machine::new(256, 16);
        // r1 = 1, so jmpz r1 falls through and the loadi runs.
        load(&mut machine, &[0x2101, 0xB106, 0x2242, 0xC000]);

        machine.run();

        let state = machine.final_state();
        assert_eq!(state.registers[2], 0x42);
        assert_eq!(state.pc, 6);
    }

    #[test]
    fn test_store_and_load_round_trip_through_memory() {
        let mut machine = Machine::new(256, 16);
        // r1 = 0x5A; mem[0x80] = r1; r2 = mem[0x80]; halt
        load(&mut machine, &[0x215A, 0x3180, 0x1280, 0xC000]);

        machine.run();

        let state = machine.final_state();
        assert_eq!(state.memory[0x80], 0x5A);
        assert_eq!(state.registers[2], 0x5A);
    }

    #[test]
    fn test_unknown_opcode_stops_with_state_unchanged() {
        let mut machine = Machine::new(256, 16);
        // r1 = 0x11; then an undefined opcode D instruction.
        load(&mut machine, &[0x2111, 0xD000, 0xC000]);

        machine.run();

        let state = machine.final_state();
        assert_eq!(state.status, MachineStatus::UnknownOpcode);
        // State from before the offending cycle is intact.
        assert_eq!(state.registers[1], 0x11);
        assert_eq!(state.pc, 2);
        assert_eq!(state.cycles, 2);
    }

    #[test]
    fn test_fetch_past_end_of_memory_faults() {
        let mut machine = Machine::new(4, 16);
        // Two instructions fill memory; neither halts, so the next fetch
        // runs off the end.
        load(&mut machine, &[0x2101, 0x2202]);

        machine.run();

        let state = machine.final_state();
        assert_eq!(state.status, MachineStatus::Faulted);
        assert_eq!(state.pc, 4);
        assert!(machine.last_fault().is_some());
    }

    #[test]
    fn test_cycle_limit_stops_infinite_loop() {
        let mut machine = Machine::new(256, 16);
        // jmpz r0, 0x00 with r0 == 0 loops forever.
        load(&mut machine, &[0xB000]);
        machine.set_max_cycles(100);

        let cycles = machine.run();

        assert_eq!(cycles, 100);
        assert_eq!(machine.status(), MachineStatus::CycleLimit);
    }

    #[test]
    fn test_no_cycle_limit_by_default() {
        let machine = Machine::new(256, 16);
        assert_eq!(machine.max_cycles, 0);
    }

    #[test]
    fn test_step_after_stop_does_nothing() {
        let mut machine = Machine::new(256, 16);
        load(&mut machine, &[0xC000]);

        machine.run();
        assert_eq!(machine.status(), MachineStatus::Halted);

        let cycles_before = machine.cycles;
        assert!(!machine.step());
        assert_eq!(machine.cycles, cycles_before);
    }

    #[test]
    fn test_rotate_program() {
        let mut machine = Machine::new(256, 16);
        // r1 = 0x81; rot r1, 1; halt  =>  0x81 rotated right once is 0xC0
        load(&mut machine, &[0x2181, 0xA110, 0xC000]);

        machine.run();

        assert_eq!(machine.final_state().registers[1], 0xC0);
    }
}
