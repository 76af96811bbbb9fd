//! Shared newtypes used by the config model, the proxies and the mapper.

pub mod serde_util;

use std::borrow::Borrow;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use solana_instruction::AccountMeta;
use solana_pubkey::Pubkey;

// ─── AccountRef ──────────────────────────────────────────────────────────────

/// An account identity plus the access flags it is passed with.
///
/// Two refs are equal only if the key and every flag match. `invoked` marks a
/// program entry point rather than a data account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccountRef {
    pub pubkey: Pubkey,
    pub writable: bool,
    pub signer: bool,
    pub fee_payer: bool,
    pub invoked: bool,
}

impl AccountRef {
    pub const fn new(pubkey: Pubkey, writable: bool, signer: bool) -> Self {
        Self {
            pubkey,
            writable,
            signer,
            fee_payer: false,
            invoked: false,
        }
    }

    pub const fn readonly(pubkey: Pubkey) -> Self {
        Self::new(pubkey, false, false)
    }

    pub const fn writable(pubkey: Pubkey) -> Self {
        Self::new(pubkey, true, false)
    }

    pub const fn readonly_signer(pubkey: Pubkey) -> Self {
        Self::new(pubkey, false, true)
    }

    pub const fn writable_signer(pubkey: Pubkey) -> Self {
        Self::new(pubkey, true, true)
    }

    /// The transaction fee payer: writable, signer and flagged as payer.
    pub const fn fee_payer(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            writable: true,
            signer: true,
            fee_payer: true,
            invoked: false,
        }
    }

    /// A program entry point.
    pub const fn invoked(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            writable: false,
            signer: false,
            fee_payer: false,
            invoked: true,
        }
    }

    /// Same key, read-only and not invoked. Used for the program passed as a CPI account.
    pub const fn as_readonly(&self) -> Self {
        Self::readonly(self.pubkey)
    }

    pub fn is_writable_signer(&self) -> bool {
        self.writable && self.signer
    }
}

impl From<&AccountMeta> for AccountRef {
    fn from(meta: &AccountMeta) -> Self {
        Self::new(meta.pubkey, meta.is_writable, meta.is_signer)
    }
}

impl From<AccountMeta> for AccountRef {
    fn from(meta: AccountMeta) -> Self {
        Self::from(&meta)
    }
}

impl From<&AccountRef> for AccountMeta {
    fn from(account: &AccountRef) -> Self {
        if account.writable {
            AccountMeta::new(account.pubkey, account.signer)
        } else {
            AccountMeta::new_readonly(account.pubkey, account.signer)
        }
    }
}

impl From<AccountRef> for AccountMeta {
    fn from(account: AccountRef) -> Self {
        Self::from(&account)
    }
}

impl std::fmt::Display for AccountRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pubkey)?;
        if self.writable {
            write!(f, " [w]")?;
        }
        if self.signer {
            write!(f, " [s]")?;
        }
        Ok(())
    }
}

// ─── Discriminator ───────────────────────────────────────────────────────────

/// Leading instruction-data bytes that select an instruction variant.
///
/// Serializes as a JSON array of byte values, e.g. `[186, 85, 17, 249]`.
/// Hashes like the underlying `[u8]` so maps keyed by it can be queried
/// with a plain data slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Discriminator(Box<[u8]>);

impl Discriminator {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `length` bytes are available from `offset` and they start with this tag.
    ///
    /// A tag longer than `length` never matches.
    pub fn matches_at(&self, data: &[u8], offset: usize, length: usize) -> bool {
        let len = self.0.len();
        if len > length {
            return false;
        }
        match offset.checked_add(len) {
            Some(end) if end <= data.len() => data[offset..end] == *self.0,
            _ => false,
        }
    }

    /// True if `data` starts with this tag.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.matches_at(data, 0, data.len())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Borrow<[u8]> for Discriminator {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Discriminator {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Discriminator {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }
}

impl From<Vec<u8>> for Discriminator {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl<const N: usize> From<[u8; N]> for Discriminator {
    fn from(bytes: [u8; N]) -> Self {
        Self(Box::new(bytes))
    }
}

impl std::fmt::Display for Discriminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", &self.0)
    }
}

impl Serialize for Discriminator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Discriminator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Ok(Discriminator::from(bytes))
    }
}
