//! Arithmetic/logic unit.
//!
//! Pure byte-level operations with no shared state. Every result is a
//! `u8`, so the 8-bit width invariant of the machine holds structurally:
//! nothing here can produce a value outside [0, 255].

/// Add two bytes with unsigned 8-bit wraparound. No carry-out is signaled.
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a.wrapping_add(b)
}

/// Bitwise OR.
#[inline]
pub fn or(a: u8, b: u8) -> u8 {
    a | b
}

/// Bitwise AND.
#[inline]
pub fn and(a: u8, b: u8) -> u8 {
    a & b
}

/// Bitwise XOR.
#[inline]
pub fn xor(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Circular right-rotate of a register's 8 bits by `amount` positions,
/// written back in place through the borrowed cell.
///
/// Amounts are taken modulo 8, so values outside [0, 7] wrap instead of
/// hitting undefined shift behavior.
#[inline]
pub fn rotate(reg: &mut u8, amount: u8) {
    *reg = reg.rotate_right(u32::from(amount));
}
