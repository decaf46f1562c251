//! Feature extraction from decompiled methods

use log::{debug, trace};
use std::collections::HashSet;
use std::hash::Hash;

use crate::constants::access_flags::KNOWN_FLAGS;
use crate::constants::defaults;
use crate::errors::{FingerprintError, FingerprintResult};
use crate::models::{Feature, FeatureList, Member, MethodDef};

/// Extraction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Leading instructions that contribute an `OpcodeAt` feature
    pub max_opcode_positions: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_opcode_positions: defaults::MAX_OPCODE_POSITIONS,
        }
    }
}

/// Turns methods into ordered feature lists
///
/// Extraction order is fixed: access flags, return type, parameters, then
/// strings, invoked methods and literals in first-occurrence order, then
/// opcodes by position.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create a new extractor
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extraction settings in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the features of a corpus member
    ///
    /// Fields and classes are rejected with `UnsupportedMember`.
    pub fn extract(&self, member: &Member) -> FingerprintResult<FeatureList> {
        match member {
            Member::Method(method) => self.extract_method(method),
            other => Err(FingerprintError::UnsupportedMember {
                kind: other.kind_name(),
                id: other.id().to_string(),
            }),
        }
    }

    /// Extract the features of a method
    ///
    /// Access flag bits without a DSL name are left out of the
    /// `AccessFlags` feature, so every feature can be rendered.
    pub fn extract_method(&self, method: &MethodDef) -> FingerprintResult<FeatureList> {
        if method.id.as_str().is_empty() {
            return Err(malformed(method, "empty method id"));
        }
        if method.return_type.is_empty() {
            return Err(malformed(method, "empty return type"));
        }

        let flags = method.access_flags & KNOWN_FLAGS;
        if flags != method.access_flags {
            debug!(
                "Ignoring unnamed access flag bits {:#x} on {}",
                method.access_flags & !KNOWN_FLAGS,
                method.id
            );
        }

        let mut features = vec![
            Feature::AccessFlags(flags),
            Feature::ReturnType(method.return_type.clone()),
            Feature::Parameters(method.parameters.clone()),
        ];

        let mut strings = Vec::new();
        let mut invokes = Vec::new();
        let mut literals = Vec::new();
        let (mut seen_strings, mut seen_invokes, mut seen_literals) =
            (HashSet::new(), HashSet::new(), HashSet::new());

        for (index, insn) in method.instructions.iter().enumerate() {
            if insn.opcode.is_empty() {
                return Err(malformed(method, &format!("instruction {} has no opcode", index)));
            }
            if let Some(s) = &insn.string {
                push_unique(&mut strings, &mut seen_strings, s.as_str(), || Feature::StringLiteral(s.clone()));
            }
            if let Some(sig) = &insn.method {
                push_unique(&mut invokes, &mut seen_invokes, sig.as_str(), || Feature::InvokedMethod(sig.clone()));
            }
            if let Some(value) = insn.literal {
                push_unique(&mut literals, &mut seen_literals, value, || Feature::Literal(value));
            }
        }

        features.extend(strings);
        features.extend(invokes);
        features.extend(literals);

        for (index, insn) in method
            .instructions
            .iter()
            .take(self.config.max_opcode_positions)
            .enumerate()
        {
            features.push(Feature::OpcodeAt {
                index,
                opcode: insn.opcode.clone(),
            });
        }

        trace!("Extracted {} features from {}", features.len(), method.id);
        Ok(features)
    }
}

/// Extract features with the default configuration
pub fn extract(member: &Member) -> FingerprintResult<FeatureList> {
    FeatureExtractor::default().extract(member)
}

fn push_unique<K, F>(out: &mut Vec<Feature>, seen: &mut HashSet<K>, key: K, make: F)
where
    K: Eq + Hash,
    F: FnOnce() -> Feature,
{
    if seen.insert(key) {
        out.push(make());
    }
}

fn malformed(method: &MethodDef, reason: &str) -> FingerprintError {
    FingerprintError::MalformedMethod {
        id: method.id.to_string(),
        reason: reason.to_string(),
    }
}
