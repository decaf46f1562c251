//! Decoded Dalvik instruction as supplied by the decompiler

use serde::{Serialize, Deserialize};

/// One instruction of a method body
///
/// Only the operands the solver cares about are kept: the referenced string,
/// the invoked method signature and any numeric literal. Register operands
/// change between builds and carry no structural meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Opcode mnemonic (e.g., "invoke-virtual")
    pub opcode: String,
    /// String literal referenced by `const-string` and friends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    /// Method reference of an invoke instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Numeric literal of a `const` or literal arithmetic instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<i64>,
}

impl Instruction {
    /// Create a new instruction without operands
    pub fn new(opcode: &str) -> Self {
        Self {
            opcode: opcode.to_string(),
            string: None,
            method: None,
            literal: None,
        }
    }

    /// `const-string` loading `value`
    pub fn const_string(value: &str) -> Self {
        let mut insn = Self::new("const-string");
        insn.string = Some(value.to_string());
        insn
    }

    /// Invoke instruction calling `signature`
    pub fn invoke(opcode: &str, signature: &str) -> Self {
        let mut insn = Self::new(opcode);
        insn.method = Some(signature.to_string());
        insn
    }

    /// Literal-carrying instruction
    pub fn literal(opcode: &str, value: i64) -> Self {
        let mut insn = Self::new(opcode);
        insn.literal = Some(value);
        insn
    }
}
