//! Compiled fingerprint predicates

use crate::constants::access_flags::KNOWN_FLAGS;
use crate::constants::opcodes::dsl_name;
use crate::errors::EvalError;
use crate::models::MethodDef;

/// A compiled fingerprint
///
/// Every present clause must hold for a method to match. The semantics
/// mirror feature containment, so a predicate rendered from a feature set
/// matches exactly the methods carrying all of those features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    /// Exact access flag word, compared on the named bits only
    pub access_flags: Option<u32>,
    /// Exact return type descriptor
    pub return_type: Option<String>,
    /// Exact parameter list
    pub parameters: Option<Vec<String>>,
    /// Strings that must all be referenced
    pub strings: Vec<String>,
    /// Signatures that must all be invoked
    pub invokes: Vec<String>,
    /// Literals that must all be used
    pub literals: Vec<i64>,
    /// Positional opcode pattern from instruction 0; `None` is a wildcard
    pub opcodes: Vec<Option<String>>,
}

impl Predicate {
    /// Whether `method` satisfies every clause
    pub fn matches(&self, method: &MethodDef) -> bool {
        if let Some(flags) = self.access_flags {
            if method.access_flags & KNOWN_FLAGS != flags {
                return false;
            }
        }
        if let Some(ty) = &self.return_type {
            if &method.return_type != ty {
                return false;
            }
        }
        if let Some(params) = &self.parameters {
            if &method.parameters != params {
                return false;
            }
        }

        let insns = &method.instructions;
        let references_string = |s: &String| insns.iter().any(|i| i.string.as_ref() == Some(s));
        let invokes = |sig: &String| insns.iter().any(|i| i.method.as_ref() == Some(sig));
        let uses_literal = |value: &i64| insns.iter().any(|i| i.literal == Some(*value));

        if !self.strings.iter().all(references_string)
            || !self.invokes.iter().all(invokes)
            || !self.literals.iter().all(uses_literal)
        {
            return false;
        }

        self.opcodes.iter().enumerate().all(|(index, expected)| match expected {
            None => true,
            Some(name) => insns
                .get(index)
                .and_then(|insn| dsl_name(&insn.opcode))
                .map_or(false, |actual| &actual == name),
        })
    }
}

/// The sandboxed evaluator boundary: source text in, predicate or
/// diagnostic out
pub trait PredicateEvaluator: Send + Sync {
    /// Compile `source` into a predicate
    fn evaluate(&self, source: &str) -> Result<Predicate, EvalError>;
}
