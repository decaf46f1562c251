//! Corpus members: methods, fields and classes

use serde::{Serialize, Deserialize};
use std::fmt;

use crate::models::instruction::Instruction;

/// Stable per-load method identifier
///
/// Dex style: defining class descriptor followed by the short id, for
/// example `Lcom/example/Foo;->bar(ILjava/lang/String;)V`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(String);

impl MethodId {
    /// Create a new method id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Defining class descriptor, when the id has the `Lfoo;->bar()V` form
    pub fn defining_class(&self) -> Option<&str> {
        self.0.split_once("->").map(|(class, _)| class)
    }

    /// Short id (`bar()V`), or the whole id when it has no class part
    pub fn short_id(&self) -> &str {
        self.0.split_once("->").map(|(_, short)| short).unwrap_or(&self.0)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MethodId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MethodId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A method with everything the extractor reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Method identifier
    pub id: MethodId,
    /// Dalvik access flags
    #[serde(default)]
    pub access_flags: u32,
    /// Return type descriptor (e.g., "V", "Ljava/lang/String;")
    pub return_type: String,
    /// Parameter type descriptors in declaration order
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Method body, empty for abstract and native methods
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

impl MethodDef {
    /// Create a new method with no parameters and an empty body
    pub fn new(id: impl Into<MethodId>, access_flags: u32, return_type: &str) -> Self {
        Self {
            id: id.into(),
            access_flags,
            return_type: return_type.to_string(),
            parameters: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Set the parameter types
    pub fn with_parameters(mut self, parameters: &[&str]) -> Self {
        self.parameters = parameters.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Append an instruction
    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Append an instruction in place
    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}

/// A field declaration. Carried so corpora can be enumerated as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field identifier (`Lfoo;->count:I`)
    pub id: String,
    /// Dalvik access flags
    #[serde(default)]
    pub access_flags: u32,
    /// Field type descriptor
    pub field_type: String,
}

/// A class declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Class descriptor
    pub id: String,
    /// Dalvik access flags
    #[serde(default)]
    pub access_flags: u32,
}

/// Anything the corpus provider can enumerate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Method(MethodDef),
    Field(FieldDef),
    Class(ClassDef),
}

impl Member {
    /// Member kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Member::Method(_) => "method",
            Member::Field(_) => "field",
            Member::Class(_) => "class",
        }
    }

    /// Raw identifier of the member
    pub fn id(&self) -> &str {
        match self {
            Member::Method(m) => m.id.as_str(),
            Member::Field(f) => &f.id,
            Member::Class(c) => &c.id,
        }
    }
}

impl From<MethodDef> for Member {
    fn from(method: MethodDef) -> Self {
        Member::Method(method)
    }
}
