//! General-purpose register file.
//!
//! A fixed-size bank of byte-wide registers (16 for the standard machine),
//! bounds-checked the same way as memory. The rotate instruction mutates a
//! register in place, so the file also hands out a short-lived exclusive
//! borrow of a single cell.

use super::Fault;

/// The machine's register bank.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    regs: Vec<u8>,
}

impl RegisterFile {
    /// Create a file of `count` zeroed registers.
    pub fn new(count: usize) -> Self {
        Self {
            regs: vec![0; count],
        }
    }

    /// Number of registers.
    pub fn count(&self) -> usize {
        self.regs.len()
    }

    /// Read register `reg`.
    pub fn get(&self, reg: usize) -> Result<u8, Fault> {
        self.regs
            .get(reg)
            .copied()
            .ok_or(Fault::RegisterOutOfRange {
                index: reg,
                count: self.regs.len(),
            })
    }

    /// Write `value` to register `reg`.
    pub fn set(&mut self, reg: usize, value: u8) -> Result<(), Fault> {
        let count = self.regs.len();
        match self.regs.get_mut(reg) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Fault::RegisterOutOfRange { index: reg, count }),
        }
    }

    /// Exclusive handle to register `reg`, for in-place mutation.
    pub fn get_mut(&mut self, reg: usize) -> Result<&mut u8, Fault> {
        let count = self.regs.len();
        self.regs
            .get_mut(reg)
            .ok_or(Fault::RegisterOutOfRange { index: reg, count })
    }

    /// All registers, in index order.
    pub fn as_slice(&self) -> &[u8] {
        &self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_round_trip() {
        let mut regs = RegisterFile::new(16);
        regs.set(5, 0x7F).unwrap();
        assert_eq!(regs.get(5).unwrap(), 0x7F);
    }

    #[test]
    fn test_out_of_range_register_faults() {
        let mut regs = RegisterFile::new(16);
        assert_eq!(
            regs.get(16),
            Err(Fault::RegisterOutOfRange {
                index: 16,
                count: 16
            })
        );
        assert!(regs.set(20, 0).is_err());
        assert!(regs.get_mut(16).is_err());
    }

    #[test]
    fn test_get_mut_mutates_in_place() {
        let mut regs = RegisterFile::new(16);
        regs.set(3, 0x01).unwrap();
        {
            let cell = regs.get_mut(3).unwrap();
            *cell = cell.rotate_right(1);
        }
        assert_eq!(regs.get(3).unwrap(), 0x80);
    }
}
