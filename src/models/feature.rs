//! Structural features extracted from a method

use serde::{Serialize, Deserialize};
use std::fmt;

/// A discrete structural property of a method
///
/// Two methods sharing a feature cannot be told apart by that feature alone.
/// Variant order is the extraction order; the derived `Ord` follows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Feature {
    /// Exact access flag word
    AccessFlags(u32),
    /// Return type descriptor
    ReturnType(String),
    /// Full parameter type sequence
    Parameters(Vec<String>),
    /// Referenced string literal
    StringLiteral(String),
    /// Invoked method signature
    InvokedMethod(String),
    /// Numeric constant used by the body
    Literal(i64),
    /// Opcode found at a fixed instruction position
    OpcodeAt {
        index: usize,
        opcode: String,
    },
}

/// The closed vocabulary of feature kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    AccessFlags,
    ReturnType,
    Parameters,
    StringLiteral,
    InvokedMethod,
    Literal,
    OpcodeAt,
}

impl Feature {
    /// Kind of this feature
    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::AccessFlags(_) => FeatureKind::AccessFlags,
            Feature::ReturnType(_) => FeatureKind::ReturnType,
            Feature::Parameters(_) => FeatureKind::Parameters,
            Feature::StringLiteral(_) => FeatureKind::StringLiteral,
            Feature::InvokedMethod(_) => FeatureKind::InvokedMethod,
            Feature::Literal(_) => FeatureKind::Literal,
            Feature::OpcodeAt { .. } => FeatureKind::OpcodeAt,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::AccessFlags(flags) => write!(f, "access:{:#x}", flags),
            Feature::ReturnType(ty) => write!(f, "returns:{}", ty),
            Feature::Parameters(params) => write!(f, "parameters:({})", params.join("")),
            Feature::StringLiteral(s) => write!(f, "string:{:?}", s),
            Feature::InvokedMethod(sig) => write!(f, "invokes:{}", sig),
            Feature::Literal(value) => write!(f, "literal:{}", value),
            Feature::OpcodeAt { index, opcode } => write!(f, "opcode[{}]:{}", index, opcode),
        }
    }
}

/// Ordered, deduplicated features of one method
pub type FeatureList = Vec<Feature>;
