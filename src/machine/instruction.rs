//! VOLE instruction decoder.
//!
//! Instructions are 16-bit words split into four 4-bit fields:
//!
//! ```text
//! bits 15..12   opcode
//! bits 11..8    r
//! bits  7..4    s
//! bits  3..0    t
//! ```
//!
//! The address field used by memory references and branches is the s and t
//! nibbles concatenated: `(s << 4) | t`, an 8-bit value. Instructions are
//! decoded fresh each cycle and never persisted.

/// A raw 16-bit instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    raw: u16,
}

/// Decoded operation.
///
/// Opcodes 5 and 6 both decode to [`Op::Add`]: the VOLE instruction set
/// gives them identical semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// reg[r] = mem[address]
    Load { r: u8, address: u8 },

    /// reg[r] = address (the s,t nibbles as a literal)
    LoadImmediate { r: u8, value: u8 },

    /// mem[address] = reg[r]
    Store { r: u8, address: u8 },

    /// reg[dst] = reg[src] (the r field is unused)
    Move { src: u8, dst: u8 },

    /// reg[r] = reg[s] + reg[t], wrapping at 256
    Add { r: u8, s: u8, t: u8 },

    /// reg[r] = reg[s] | reg[t]
    Or { r: u8, s: u8, t: u8 },

    /// reg[r] = reg[s] & reg[t]
    And { r: u8, s: u8, t: u8 },

    /// reg[r] = reg[s] ^ reg[t]
    Xor { r: u8, s: u8, t: u8 },

    /// Rotate reg[r] right by `amount` bit positions, in place.
    Rotate { r: u8, amount: u8 },

    /// If reg[r] == 0, set pc to `target`.
    BranchZero { r: u8, target: u8 },

    /// Stop the machine.
    Halt,

    /// Unrecognized opcode nibble.
    Unknown { opcode: u8 },
}

impl Instruction {
    /// Wrap a raw 16-bit word.
    pub fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// The raw word.
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// Opcode field, bits 15..12.
    pub fn opcode(&self) -> u8 {
        ((self.raw >> 12) & 0xF) as u8
    }

    /// r field, bits 11..8.
    pub fn r(&self) -> u8 {
        ((self.raw >> 8) & 0xF) as u8
    }

    /// s field, bits 7..4.
    pub fn s(&self) -> u8 {
        ((self.raw >> 4) & 0xF) as u8
    }

    /// t field, bits 3..0.
    pub fn t(&self) -> u8 {
        (self.raw & 0xF) as u8
    }

    /// Address field: the s and t nibbles as one 8-bit value.
    pub fn address(&self) -> u8 {
        (self.raw & 0xFF) as u8
    }

    /// Decode into an operation.
    pub fn op(&self) -> Op {
        let r = self.r();
        let s = self.s();
        let t = self.t();
        let address = self.address();

        match self.opcode() {
            0x1 => Op::Load { r, address },
            0x2 => Op::LoadImmediate { r, value: address },
            0x3 => Op::Store { r, address },
            0x4 => Op::Move { src: s, dst: t },
            // Opcodes 5 and 6 are both add.
            0x5 | 0x6 => Op::Add { r, s, t },
            0x7 => Op::Or { r, s, t },
            0x8 => Op::And { r, s, t },
            0x9 => Op::Xor { r, s, t },
            0xA => Op::Rotate { r, amount: s },
            0xB => Op::BranchZero { r, target: address },
            0xC => Op::Halt,
            opcode => Op::Unknown { opcode },
        }
    }

    /// Get a human-readable disassembly string.
    pub fn disassemble(&self) -> String {
        match self.op() {
            Op::Load { r, address } => format!("load r{}, [0x{:02X}]", r, address),
            Op::LoadImmediate { r, value } => format!("loadi r{}, 0x{:02X}", r, value),
            Op::Store { r, address } => format!("store r{}, [0x{:02X}]", r, address),
            Op::Move { src, dst } => format!("move r{}, r{}", dst, src),
            Op::Add { r, s, t } => format!("add r{}, r{}, r{}", r, s, t),
            Op::Or { r, s, t } => format!("or r{}, r{}, r{}", r, s, t),
            Op::And { r, s, t } => format!("and r{}, r{}, r{}", r, s, t),
            Op::Xor { r, s, t } => format!("xor r{}, r{}, r{}", r, s, t),
            Op::Rotate { r, amount } => format!("rot r{}, {}", r, amount),
            Op::BranchZero { r, target } => format!("jmpz r{}, 0x{:02X}", r, target),
            Op::Halt => "halt".to_string(),
            Op::Unknown { .. } => format!(".word 0x{:04X}", self.raw),
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.disassemble())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extraction() {
        let inst = Instruction::new(0x12AB);
        assert_eq!(inst.opcode(), 0x1);
        assert_eq!(inst.r(), 0x2);
        assert_eq!(inst.s(), 0xA);
        assert_eq!(inst.t(), 0xB);
        assert_eq!(inst.address(), 0xAB);
    }

    #[test]
    fn test_decode_load() {
        assert_eq!(
            Instruction::new(0x12AB).op(),
            Op::Load {
                r: 2,
                address: 0xAB
            }
        );
    }

    #[test]
    fn test_decode_load_immediate() {
        assert_eq!(
            Instruction::new(0x20FF).op(),
            Op::LoadImmediate { r: 0, value: 0xFF }
        );
    }

    #[test]
    fn test_decode_move_uses_s_and_t() {
        assert_eq!(Instruction::new(0x4053).op(), Op::Move { src: 5, dst: 3 });
    }

    #[test]
    fn test_opcodes_5_and_6_both_decode_to_add() {
        let five = Instruction::new(0x5123).op();
        let six = Instruction::new(0x6123).op();
        assert_eq!(five, Op::Add { r: 1, s: 2, t: 3 });
        assert_eq!(six, five);
    }

    #[test]
    fn test_decode_rotate_amount_is_s_nibble() {
        assert_eq!(
            Instruction::new(0xA340).op(),
            Op::Rotate { r: 3, amount: 4 }
        );
    }

    #[test]
    fn test_decode_branch_and_halt() {
        assert_eq!(
            Instruction::new(0xB210).op(),
            Op::BranchZero { r: 2, target: 0x10 }
        );
        assert_eq!(Instruction::new(0xC000).op(), Op::Halt);
    }

    #[test]
    fn test_decode_unknown_opcodes() {
        assert_eq!(Instruction::new(0xD000).op(), Op::Unknown { opcode: 0xD });
        assert_eq!(Instruction::new(0x0000).op(), Op::Unknown { opcode: 0x0 });
        assert_eq!(Instruction::new(0xF123).op(), Op::Unknown { opcode: 0xF });
    }

    #[test]
    fn test_disassemble() {
        assert_eq!(Instruction::new(0x12AB).disassemble(), "load r2, [0xAB]");
        assert_eq!(Instruction::new(0x5123).disassemble(), "add r1, r2, r3");
        assert_eq!(Instruction::new(0xC000).disassemble(), "halt");
        assert_eq!(Instruction::new(0xD000).disassemble(), ".word 0xD000");
    }
}
