//! vole-emu library
//!
//! Core simulation logic for the VOLE teaching machine: a byte-addressed
//! memory, a bank of byte-wide registers, and a control unit that runs
//! 16-bit instructions until a halt condition.

pub mod config;
pub mod loader;
pub mod machine;
