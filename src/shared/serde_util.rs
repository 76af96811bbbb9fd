//! Custom serde helpers for the mapping JSON format.

/// Deserializes a base58 string into a `Pubkey`.
///
/// Mapping files carry program and account ids as base58 text.
pub mod pubkey_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_pubkey::Pubkey;
    use std::str::FromStr;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s)
            .map_err(|_| serde::de::Error::custom(format!("Invalid pubkey: {}", s)))
    }

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }
}
