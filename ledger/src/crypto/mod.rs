//! Cryptographic primitives. For VERA that means exactly one thing:
//! SHA-256 with hex output. Resist the urge to add more.

pub mod hash;

pub use hash::{sha256_hex, sha256_hex_multi};
