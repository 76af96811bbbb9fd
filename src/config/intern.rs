//! Load-time deduplication of constant account entries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::StaticAccountEntry;

/// Shares identical static account entries across every variant parsed with it.
///
/// Lives only for the duration of a load; the built configs keep the shared
/// `Arc`s and the table itself is dropped.
#[derive(Debug, Default)]
pub struct AccountInterner {
    entries: HashMap<StaticAccountEntry, Arc<StaticAccountEntry>>,
}

impl AccountInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, entry: StaticAccountEntry) -> Arc<StaticAccountEntry> {
        self.entries
            .entry(entry)
            .or_insert_with_key(|entry| Arc::new(entry.clone()))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::AccountRef;
    use solana_pubkey::Pubkey;

    #[test]
    fn test_identical_entries_share_allocation() {
        let key = Pubkey::new_unique();
        let mut interner = AccountInterner::new();

        let a = interner.intern(StaticAccountEntry::new(AccountRef::readonly(key), 2));
        let b = interner.intern(StaticAccountEntry::new(AccountRef::readonly(key), 2));
        let c = interner.intern(StaticAccountEntry::new(AccountRef::writable(key), 2));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(interner.len(), 2);
    }
}
