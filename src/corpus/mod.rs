//! Corpus providers: where the decompiled methods come from

use anyhow::{Context, Result};
use log::debug;
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;

use crate::errors::FingerprintResult;
use crate::models::Member;

/// Source of the members of a loaded application
///
/// Must be re-enumerable in full: every index (re)build asks for the whole
/// member list again.
pub trait CorpusProvider: Send + Sync {
    /// Identity of the corpus, used in diagnostics and reports
    fn corpus_id(&self) -> String;

    /// Enumerate every member of the corpus
    fn members(&self) -> FingerprintResult<Vec<Member>>;
}

/// In-memory corpus, also the JSON interchange format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    /// Corpus identity (e.g., package name and version)
    pub id: String,
    /// Members in enumeration order
    pub members: Vec<Member>,
}

impl Corpus {
    /// Create a new corpus
    pub fn new(id: &str, members: Vec<Member>) -> Self {
        Self {
            id: id.to_string(),
            members,
        }
    }

    /// Parse a corpus from JSON text
    pub fn from_json_str(json: &str) -> FingerprintResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a corpus from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        debug!("Reading corpus from {}", path.display());
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
        let corpus = Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse corpus file: {}", path.display()))?;
        debug!("Read {} members of corpus {}", corpus.members.len(), corpus.id);
        Ok(corpus)
    }
}

impl CorpusProvider for Corpus {
    fn corpus_id(&self) -> String {
        self.id.clone()
    }

    fn members(&self) -> FingerprintResult<Vec<Member>> {
        Ok(self.members.clone())
    }
}
