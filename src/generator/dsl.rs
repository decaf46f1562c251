//! Fingerprint DSL rendering
//!
//! Each feature kind maps to one clause. Features of the same kind join
//! into a single clause placed where the first of them appears, so the
//! clause order follows the feature order and the output is byte-stable.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::constants::access_flags::{FLAG_NAMES, KNOWN_FLAGS};
use crate::constants::opcodes::dsl_name;
use crate::errors::{FingerprintError, FingerprintResult};
use crate::models::{Feature, FeatureKind, Fingerprint};

/// Indentation of clause lines
const INDENT: &str = "    ";

/// Clause under construction
enum Clause {
    AccessFlags(u32),
    Returns(String),
    Parameters(Vec<String>),
    Strings(Vec<String>),
    Invokes(Vec<String>),
    Literals(Vec<i64>),
    Opcodes(BTreeMap<usize, String>),
}

impl Clause {
    fn open(feature: &Feature) -> FingerprintResult<Self> {
        Ok(match feature {
            Feature::AccessFlags(flags) => Clause::AccessFlags(*flags),
            Feature::ReturnType(ty) => Clause::Returns(ty.clone()),
            Feature::Parameters(params) => Clause::Parameters(params.clone()),
            Feature::StringLiteral(s) => Clause::Strings(vec![s.clone()]),
            Feature::InvokedMethod(sig) => Clause::Invokes(vec![sig.clone()]),
            Feature::Literal(value) => Clause::Literals(vec![*value]),
            Feature::OpcodeAt { index, opcode } => {
                let mut positions = BTreeMap::new();
                positions.insert(*index, opcode_name(opcode)?);
                Clause::Opcodes(positions)
            }
        })
    }

    /// Feature kind the clause collects
    fn kind(&self) -> FeatureKind {
        match self {
            Clause::AccessFlags(_) => FeatureKind::AccessFlags,
            Clause::Returns(_) => FeatureKind::ReturnType,
            Clause::Parameters(_) => FeatureKind::Parameters,
            Clause::Strings(_) => FeatureKind::StringLiteral,
            Clause::Invokes(_) => FeatureKind::InvokedMethod,
            Clause::Literals(_) => FeatureKind::Literal,
            Clause::Opcodes(_) => FeatureKind::OpcodeAt,
        }
    }

    /// Fold a feature of the same kind into this clause
    fn absorb(&mut self, feature: &Feature) -> FingerprintResult<()> {
        match (self, feature) {
            (Clause::AccessFlags(current), Feature::AccessFlags(flags)) => {
                same_or_conflict("access flags", &*current, flags)?;
            }
            (Clause::Returns(current), Feature::ReturnType(ty)) => {
                same_or_conflict("return type", &*current, ty)?;
            }
            (Clause::Parameters(current), Feature::Parameters(params)) => {
                same_or_conflict("parameter list", &*current, params)?;
            }
            (Clause::Strings(values), Feature::StringLiteral(s)) => push_new(values, s.clone()),
            (Clause::Invokes(values), Feature::InvokedMethod(sig)) => push_new(values, sig.clone()),
            (Clause::Literals(values), Feature::Literal(value)) => push_new(values, *value),
            (Clause::Opcodes(positions), Feature::OpcodeAt { index, opcode }) => {
                let name = opcode_name(opcode)?;
                match positions.entry(*index) {
                    Entry::Occupied(existing) => {
                        same_or_conflict(&format!("opcode at {}", index), existing.get(), &name)?;
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(name);
                    }
                }
            }
            (clause, feature) => {
                return Err(FingerprintError::Render(format!(
                    "{:?} feature cannot join a {:?} clause",
                    feature.kind(),
                    clause.kind()
                )))
            }
        }
        Ok(())
    }

    fn write(&self, out: &mut String) -> FingerprintResult<()> {
        out.push_str(INDENT);
        match self {
            Clause::AccessFlags(flags) => {
                let names = flag_names(*flags)?;
                out.push_str(&format!("accessFlags({})", names.join(", ")));
            }
            Clause::Returns(ty) => out.push_str(&format!("returns({})", quote(ty))),
            Clause::Parameters(params) => out.push_str(&format!("parameters({})", quote_all(params))),
            Clause::Strings(values) => out.push_str(&format!("strings({})", quote_all(values))),
            Clause::Invokes(values) => out.push_str(&format!("invokes({})", quote_all(values))),
            Clause::Literals(values) => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                out.push_str(&format!("literals({})", values.join(", ")));
            }
            Clause::Opcodes(positions) => {
                let last = positions.keys().next_back().copied().unwrap_or(0);
                let pattern: Vec<String> = (0..=last)
                    .map(|i| match positions.get(&i) {
                        Some(name) => format!("Opcode.{}", name),
                        None => "null".to_string(),
                    })
                    .collect();
                out.push_str(&format!("opcodes({})", pattern.join(", ")));
            }
        }
        out.push('\n');
        Ok(())
    }
}

/// Render an ordered feature subset as a fingerprint predicate
pub fn render(features: &[Feature]) -> FingerprintResult<Fingerprint> {
    let mut clauses: Vec<Clause> = Vec::new();
    for feature in features {
        let kind = feature.kind();
        match clauses.iter_mut().find(|clause| clause.kind() == kind) {
            Some(clause) => clause.absorb(feature)?,
            None => clauses.push(Clause::open(feature)?),
        }
    }

    let mut out = String::from("fingerprint {\n");
    for clause in &clauses {
        clause.write(&mut out)?;
    }
    out.push('}');
    Ok(Fingerprint::new(out))
}

/// Quote a string as a DSL string literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' => out.push_str("\\$"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn quote_all(values: &[String]) -> String {
    values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(", ")
}

fn flag_names(flags: u32) -> FingerprintResult<Vec<String>> {
    let unknown = flags & !KNOWN_FLAGS;
    if unknown != 0 {
        return Err(FingerprintError::Render(format!(
            "access flag bits {:#x} have no DSL name",
            unknown
        )));
    }
    Ok(FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| format!("AccessFlags.{}", name))
        .collect())
}

fn opcode_name(mnemonic: &str) -> FingerprintResult<String> {
    dsl_name(mnemonic)
        .ok_or_else(|| FingerprintError::Render(format!("opcode {:?} has no DSL name", mnemonic)))
}

fn same_or_conflict<T: PartialEq + std::fmt::Debug>(what: &str, current: &T, new: &T) -> FingerprintResult<()> {
    if current == new {
        Ok(())
    } else {
        Err(FingerprintError::Render(format!(
            "conflicting {}: {:?} and {:?} cannot share one clause",
            what, current, new
        )))
    }
}

fn push_new<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}
