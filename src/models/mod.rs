//! Data models for corpora, features and fingerprints

pub mod instruction;
pub mod method;
pub mod feature;
pub mod fingerprint;
#[cfg(test)]
mod tests;

pub use self::instruction::Instruction;
pub use self::method::{ClassDef, FieldDef, Member, MethodDef, MethodId};
pub use self::feature::{Feature, FeatureKind, FeatureList};
pub use self::fingerprint::{Fingerprint, FingerprintReport, MinimalFeatureSet, RenderedSet, Strategy};
