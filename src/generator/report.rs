//! Human readable and JSON output for fingerprint reports

use anyhow::{Context, Result};

use crate::models::FingerprintReport;
use crate::resolver::Resolution;

/// Format a report the way the results window lays it out: the full method
/// fingerprint first, then every minimal fingerprint
pub fn format_text(report: &FingerprintReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Found {} fingerprint(s) for method : {}\n\n",
        report.fingerprints.len(),
        report.method
    ));

    out.push_str(&format!(
        "Full Method Fingerprint | {} feature(s)\n{}\n",
        report.full_feature_count, report.full_fingerprint
    ));

    for (i, set) in report.fingerprints.iter().enumerate() {
        out.push_str(&format!(
            "\nFingerprint #{} | {} feature(s) | {:?}\n{}\n",
            i + 1,
            set.features.len(),
            set.strategy,
            set.fingerprint
        ));
    }

    out
}

/// Format a resolution: the defining class and short id of the match, then
/// any other methods the predicate also matches
pub fn format_resolution(resolution: &Resolution) -> String {
    let method = &resolution.method;
    let mut out = match method.defining_class() {
        Some(class) => format!("Fingerprint found in class: {}
Method: {}
", class, method.short_id()),
        None => format!("Fingerprint found at method: {}
", method),
    };

    for other in &resolution.additional_matches {
        out.push_str(&format!("Also matches: {}
", other));
    }
    out
}

/// Serialize a report as pretty JSON
pub fn to_json(report: &FingerprintReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .with_context(|| format!("Failed to serialize report for {}", report.method))
}
