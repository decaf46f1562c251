//! Fingerprint rendering and report output

mod dsl;
mod report;
#[cfg(test)]
mod tests;

pub use self::dsl::{quote, render};
pub use self::report::{format_resolution, format_text, to_json};
