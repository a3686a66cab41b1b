//! # Entry
//!
//! The opaque payload unit. The ledger has no opinion about what an entry
//! means — in the original deployment it was `{id, choice, cast_at}` for a
//! ballot — it only promises to hash it verbatim and never reorder it.
//!
//! An entry is an **ordered** mapping of string keys to string values.
//! Insertion order is preserved and participates in the digest: the same
//! pairs in a different order are a different entry. That is deliberate —
//! canonical hashing needs one byte encoding per logical value, and the
//! cheapest way to get it is to make order part of the value.

use serde::{Deserialize, Serialize};

/// An ordered, immutable-by-contract mapping of string fields.
///
/// Backed by a `Vec` of pairs rather than a map type, because order is
/// semantic here and lookup volume is tiny (entries have a handful of
/// fields).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry {
    fields: Vec<(String, String)>,
}

impl Entry {
    /// Creates an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field append. Duplicate keys are kept as-is; the
    /// entry is opaque and the ledger does not police payloads.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Builds an entry from an ordered sequence of pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value for the first field with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates the fields in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the entry has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical byte encoding used for hashing.
    ///
    /// Layout: field count as `u32` LE, then for each field the key and
    /// value, each framed with its byte length as `u32` LE. The framing
    /// makes the encoding prefix-free: no two distinct entries (and no
    /// two distinct entry sequences) share a byte string, so the block
    /// digest cannot be collided by shuffling bytes across field or
    /// entry boundaries.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.fields.len() * 16);
        out.extend_from_slice(&(self.fields.len() as u32).to_le_bytes());
        for (key, value) in &self.fields {
            out.extend_from_slice(&(key.len() as u32).to_le_bytes());
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value.as_bytes());
        }
        out
    }
}
