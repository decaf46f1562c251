//! Constants used throughout the solver

pub mod access_flags;
pub mod defaults;
pub mod opcodes;
