//! Wire → config conversions.

use crate::config::intern::AccountInterner;
use crate::config::wire::{IxMapJson, ProgramMapJson, StaticAccountJson};
use crate::config::{IxMapConfig, ProgramMapConfig, StaticAccountEntry};
use crate::shared::AccountRef;

impl ProgramMapConfig {
    pub fn from_wire(wire: ProgramMapJson, interner: &mut AccountInterner) -> Self {
        let variants = wire
            .instructions
            .into_iter()
            .map(|ix| IxMapConfig::from_wire(ix, interner))
            .collect();
        Self::new(wire.program_id, variants)
    }
}

impl IxMapConfig {
    pub fn from_wire(wire: IxMapJson, interner: &mut AccountInterner) -> Self {
        let static_slots = wire
            .static_accounts
            .into_iter()
            .map(|s| interner.intern(StaticAccountEntry::from(s)))
            .collect();
        Self {
            source_name: wire.src_ix_name,
            source_tag: wire.src_discriminator,
            dest_name: wire.dst_ix_name,
            dest_tag: wire.dst_discriminator,
            dynamic_slots: wire.dynamic_accounts,
            static_slots,
            index_map: wire.index_map,
        }
    }
}

impl From<StaticAccountJson> for StaticAccountEntry {
    fn from(wire: StaticAccountJson) -> Self {
        Self::new(
            AccountRef::new(wire.account, wire.writable, wire.signer),
            wire.index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const DOC: &str = r#"{
        "program_id": "11111111111111111111111111111111",
        "instructions": [
            {
                "src_ix_name": "deposit",
                "src_discriminator": [1],
                "dst_ix_name": "vault_deposit",
                "dst_discriminator": [10, 11, 12, 13],
                "dynamic_accounts": [{"name": "glam_state", "index": 0, "writable": true}],
                "static_accounts": [{"account": "SysvarRent111111111111111111111111111111111", "index": 1}],
                "index_map": [2, -1]
            },
            {
                "src_ix_name": "withdraw",
                "src_discriminator": [2],
                "dst_discriminator": [20, 21, 22, 23],
                "static_accounts": [{"account": "SysvarRent111111111111111111111111111111111", "index": 0}],
                "index_map": [1]
            }
        ]
    }"#;

    #[test]
    fn test_program_map_from_json() {
        let mut interner = AccountInterner::new();
        let config = ProgramMapConfig::from_json(DOC.as_bytes(), &mut interner).unwrap();

        assert_eq!(config.variants().len(), 2);
        assert_eq!(config.tag_length(), 4);
        assert!(!config.source_program().writable);

        let deposit = &config.variants()[0];
        assert_eq!(deposit.source_name, "deposit");
        assert_eq!(deposit.dest_name.as_deref(), Some("vault_deposit"));
        assert_eq!(deposit.dynamic_slots[0].semantic_name, "glam_state");
        assert_eq!(deposit.index_map, vec![2, -1]);
        assert_eq!(deposit.num_accounts(), 3);
        // Two different indexes, so two distinct entries.
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_identical_static_accounts_are_shared() {
        let doc = DOC.replace(r#""index": 0}],
                "index_map": [1]"#, r#""index": 1}],
                "index_map": [0]"#);
        let mut interner = AccountInterner::new();
        let config = ProgramMapConfig::from_json(doc.as_bytes(), &mut interner).unwrap();

        let a = &config.variants()[0].static_slots[0];
        let b = &config.variants()[1].static_slots[0];
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_invalid_json_reports_json_error() {
        let mut interner = AccountInterner::new();
        let err = ProgramMapConfig::from_json(b"{\"program_id\": 5}", &mut interner).unwrap_err();
        assert!(matches!(err, crate::error::LoadError::Json { .. }));
    }
}
