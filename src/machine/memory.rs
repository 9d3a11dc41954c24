//! Byte-addressed storage.
//!
//! A fixed-size array of byte cells, sized once at construction (256 for
//! the standard machine). Every access is bounds-checked and returns a
//! [`Fault`] on an out-of-range address.

use super::Fault;

/// The machine's memory space.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a memory of `capacity` zeroed cells.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![0; capacity],
        }
    }

    /// Number of cells.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Read the cell at `address`.
    pub fn get(&self, address: usize) -> Result<u8, Fault> {
        self.cells
            .get(address)
            .copied()
            .ok_or(Fault::MemoryOutOfRange {
                address,
                capacity: self.cells.len(),
            })
    }

    /// Write `value` to the cell at `address`.
    pub fn set(&mut self, address: usize, value: u8) -> Result<(), Fault> {
        let capacity = self.cells.len();
        match self.cells.get_mut(address) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Fault::MemoryOutOfRange { address, capacity }),
        }
    }

    /// Copy a program image into memory starting at address 0.
    ///
    /// Fails without touching any cell if the image exceeds capacity.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), Fault> {
        if image.len() > self.cells.len() {
            return Err(Fault::ImageTooLarge {
                len: image.len(),
                capacity: self.cells.len(),
            });
        }
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// All cells, in address order.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let mem = Memory::new(256);
        assert_eq!(mem.capacity(), 256);
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut mem = Memory::new(256);
        mem.set(0xAB, 0x42).unwrap();
        assert_eq!(mem.get(0xAB).unwrap(), 0x42);
    }

    #[test]
    fn test_out_of_range_access_faults() {
        let mut mem = Memory::new(16);
        assert_eq!(
            mem.get(16),
            Err(Fault::MemoryOutOfRange {
                address: 16,
                capacity: 16
            })
        );
        assert!(mem.set(100, 0).is_err());
    }

    #[test]
    fn test_load_image() {
        let mut mem = Memory::new(256);
        mem.load_image(&[0x12, 0xAB, 0xC0, 0x00]).unwrap();
        assert_eq!(mem.get(0).unwrap(), 0x12);
        assert_eq!(mem.get(1).unwrap(), 0xAB);
        assert_eq!(mem.get(3).unwrap(), 0x00);
        assert_eq!(mem.get(4).unwrap(), 0x00);
    }

    #[test]
    fn test_load_image_too_large_leaves_memory_untouched() {
        let mut mem = Memory::new(4);
        let err = mem.load_image(&[0xFF; 5]).unwrap_err();
        assert_eq!(
            err,
            Fault::ImageTooLarge {
                len: 5,
                capacity: 4
            }
        );
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }
}
