//! Default tuning values for extraction and solving

/// Number of leading instructions that contribute an opcode feature
pub const MAX_OPCODE_POSITIONS: usize = 16;

/// Upper bound on the number of fingerprints returned per method
pub const MAX_SETS: usize = 8;

/// Feature lists up to this length also get a bounded exhaustive search
pub const EXHAUSTIVE_FEATURE_LIMIT: usize = 24;

/// Largest subset size tried by the exhaustive search
pub const EXHAUSTIVE_MAX_SIZE: usize = 3;
