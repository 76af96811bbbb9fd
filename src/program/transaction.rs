//! Transactions and the address lookup tables they reference.

use std::collections::HashSet;

use solana_pubkey::Pubkey;

use crate::program::instruction::Instruction;
use crate::shared::AccountRef;

/// An address lookup table referenced by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupTable {
    pub key: Pubkey,
    pub addresses: Vec<Pubkey>,
}

impl LookupTable {
    pub fn new(key: Pubkey, addresses: Vec<Pubkey>) -> Self {
        Self { key, addresses }
    }

    /// Position of `pubkey` in the table, if present.
    pub fn index_of(&self, pubkey: &Pubkey) -> Option<usize> {
        self.addresses.iter().position(|a| a == pubkey)
    }
}

/// Fee payer, ordered instructions and the lookup tables they may compress against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub fee_payer: AccountRef,
    pub instructions: Vec<Instruction>,
    pub lookup_tables: Vec<LookupTable>,
}

impl Transaction {
    pub fn new(fee_payer: AccountRef, instructions: Vec<Instruction>) -> Self {
        Self {
            fee_payer,
            instructions,
            lookup_tables: Vec::new(),
        }
    }

    pub fn with_lookup_tables(
        fee_payer: AccountRef,
        instructions: Vec<Instruction>,
        lookup_tables: Vec<LookupTable>,
    ) -> Self {
        Self {
            fee_payer,
            instructions,
            lookup_tables,
        }
    }

    /// Account keys referenced by instructions that are neither the fee payer
    /// nor present in any lookup table.
    ///
    /// These must be passed directly in the serialized message.
    pub fn static_account_keys(&self) -> Vec<Pubkey> {
        let tabled: HashSet<&Pubkey> = self.lookup_tables.iter().flat_map(|t| &t.addresses).collect();
        let mut seen: HashSet<Pubkey> = HashSet::from([self.fee_payer.pubkey]);
        self.instructions
            .iter()
            .flat_map(|ix| &ix.accounts)
            .map(|account| account.pubkey)
            .filter(|key| !tabled.contains(key) && seen.insert(*key))
            .collect()
    }
}
