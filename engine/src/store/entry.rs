//! The arena-resident record for one live key-value pair.
use crate::store::{EntryId, KEY_CAP, NIL, VALUE_CAP};

/// A single stored record. Lives inside the store's entry arena and is
/// simultaneously a hash-chain link (`chain_next`) and a recency-list node
/// (`recency_prev`/`recency_next`); both links are arena indices rather than
/// pointers so the arena alone owns the memory.
pub struct Entry {
    key: [u8; KEY_CAP],
    key_len: u8,
    value: [u8; VALUE_CAP],
    value_len: u8,
    /// Absolute unix-seconds expiry, or `None` for "never expires".
    pub expiry: Option<u64>,
    pub chain_next: EntryId,
    pub recency_prev: EntryId,
    pub recency_next: EntryId,
}

impl Entry {
    pub fn new(key: &[u8], value: &[u8], expiry: Option<u64>, chain_next: EntryId) -> Self {
        let mut entry = Entry {
            key: [0; KEY_CAP],
            key_len: key.len() as u8,
            value: [0; VALUE_CAP],
            value_len: 0,
            expiry,
            chain_next,
            recency_prev: NIL,
            recency_next: NIL,
        };
        entry.key[..key.len()].copy_from_slice(key);
        entry.set_value(value);
        entry
    }

    pub fn key(&self) -> &[u8] {
        &self.key[..self.key_len as usize]
    }

    pub fn value(&self) -> &[u8] {
        &self.value[..self.value_len as usize]
    }

    pub fn set_value(&mut self, value: &[u8]) {
        self.value[..value.len()].copy_from_slice(value);
        self.value_len = value.len() as u8;
    }
}
