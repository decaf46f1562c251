//! A library for fingerprinting methods of decompiled, obfuscated Dalvik programs
//!
//! Given a corpus of decompiled methods, this crate finds small sets of
//! structural features (access flags, return and parameter types, referenced
//! strings, invoked signatures, literals, opcodes at fixed positions) that
//! match one method and no other. Because the features describe structure
//! rather than names, the resulting fingerprints survive renaming and tend to
//! survive across releases of the same application.
//!
//! The pipeline is: extract features per method, index them once per loaded
//! corpus, search for minimal distinguishing subsets, render each subset as a
//! fingerprint predicate, and resolve the predicate back against the corpus
//! to confirm it lands on the same method.

pub mod analyzer;
pub mod constants;
pub mod corpus;
pub mod errors;
pub mod generator;
pub mod models;
pub mod resolver;
pub mod session;
pub mod utils;

use std::path::Path;
use anyhow::Result;

use crate::corpus::Corpus;
use crate::models::{FingerprintReport, MethodId};
use crate::session::{Session, SessionConfig};

pub use crate::errors::{FingerprintError, FingerprintResult};

/// Main entry point: load a corpus file and fingerprint one method
pub fn fingerprint_method(corpus_path: &Path, method: &MethodId, config: SessionConfig) -> Result<FingerprintReport> {
    // Load the corpus
    let corpus = Corpus::from_json_file(corpus_path)?;

    // Index it
    let session = Session::new(config);
    session.load(&corpus)?;

    // Solve, render and verify
    Ok(session.generate_fingerprints(method)?)
}

/// Version of the fingerprint solver
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
