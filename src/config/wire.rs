//! Wire types for mapping JSON documents.
//!
//! One document describes one source program. Unknown fields are rejected.

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use crate::config::DynamicAccountConfig;
use crate::shared::serde_util::pubkey_str;
use crate::shared::Discriminator;

/// Raw program mapping document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProgramMapJson {
    #[serde(with = "pubkey_str")]
    pub program_id: Pubkey,
    pub instructions: Vec<IxMapJson>,
}

/// Raw mapping for one source instruction variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IxMapJson {
    #[serde(default)]
    pub src_ix_name: String,
    pub src_discriminator: Discriminator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_ix_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_discriminator: Option<Discriminator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_accounts: Vec<DynamicAccountConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_accounts: Vec<StaticAccountJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_map: Vec<i32>,
}

/// Raw constant account pinned to a destination index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StaticAccountJson {
    #[serde(with = "pubkey_str")]
    pub account: Pubkey,
    pub index: usize,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub signer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ix_map_json_optional_fields_default() {
        let json = r#"{"src_ix_name":"transfer","src_discriminator":[2,0,0,0]}"#;
        let ix: IxMapJson = serde_json::from_str(json).unwrap();
        assert_eq!(ix.src_ix_name, "transfer");
        assert_eq!(ix.src_discriminator.as_bytes(), &[2, 0, 0, 0]);
        assert!(ix.dst_discriminator.is_none());
        assert!(ix.dynamic_accounts.is_empty());
        assert!(ix.static_accounts.is_empty());
        assert!(ix.index_map.is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"src_discriminator":[1],"extra":true}"#;
        assert!(serde_json::from_str::<IxMapJson>(json).is_err());

        let json = r#"{"program_id":"11111111111111111111111111111111","instructions":[],"version":2}"#;
        assert!(serde_json::from_str::<ProgramMapJson>(json).is_err());
    }

    #[test]
    fn test_static_account_json() {
        let json = r#"{"account":"11111111111111111111111111111111","index":3,"writable":true}"#;
        let account: StaticAccountJson = serde_json::from_str(json).unwrap();
        assert_eq!(account.account, Pubkey::default());
        assert_eq!(account.index, 3);
        assert!(account.writable);
        assert!(!account.signer);
    }

    #[test]
    fn test_negative_static_index_rejected() {
        let json = r#"{"account":"11111111111111111111111111111111","index":-1}"#;
        assert!(serde_json::from_str::<StaticAccountJson>(json).is_err());
    }
}
