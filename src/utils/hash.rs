//! Hashing utilities

use sha2::{Sha256, Digest};

use crate::errors::FingerprintResult;
use crate::models::{Feature, MethodId};

/// Digest of a corpus snapshot: every method id with its feature list, in
/// corpus order
///
/// Two loads of the same corpus state yield the same digest, so a result
/// tagged with a digest can be checked against the snapshot it came from.
pub fn corpus_digest<'a, I>(methods: I) -> FingerprintResult<String>
where
    I: IntoIterator<Item = (&'a MethodId, &'a [Feature])>,
{
    let mut hasher = Sha256::new();
    for (id, features) in methods {
        hasher.update(id.as_str().as_bytes());
        hasher.update([0u8]);
        for feature in features {
            hasher.update(serde_json::to_vec(feature)?);
            hasher.update([0u8]);
        }
        hasher.update([0xffu8]);
    }

    Ok(hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect())
}
