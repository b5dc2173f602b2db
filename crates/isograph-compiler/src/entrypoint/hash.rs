use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the operation text, the persisted-query lookup key.
pub fn query_hash(query_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query_text.as_bytes());
    hex::encode(hasher.finalize())
}
