//! Password digest helper.
//!
//! Single-round unsalted SHA-256, hex-encoded. The stored-credential format
//! depends on this being deterministic, so swapping in a salted KDF is a
//! format-breaking change (see DESIGN.md).

use sha2::{Digest, Sha256};

pub fn hash_password(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    hex::encode(digest)
}
