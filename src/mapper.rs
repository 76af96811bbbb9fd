//! Transaction-level routing of instructions to their program's dispatcher.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use solana_pubkey::Pubkey;

use crate::config::{create_program_proxies, DynamicAccountConfig, ProgramMapConfig};
use crate::error::{ConfigError, ProxyResult};
use crate::program::instruction::Instruction;
use crate::program::transaction::{LookupTable, Transaction};
use crate::proxy::program::ProgramProxy;
use crate::proxy::resolver::DynamicAccountResolver;
use crate::shared::AccountRef;

/// Maps every instruction of a transaction into calls through `invoked_program`.
///
/// Instructions for programs without a registered dispatcher pass through
/// unchanged. Immutable once built and safe to share across threads.
pub struct TransactionMapper<A> {
    invoked_program: AccountRef,
    program_proxies: HashMap<Pubkey, ProgramProxy<A>>,
}

impl<A> TransactionMapper<A> {
    pub fn new(invoked_program: AccountRef, program_proxies: HashMap<Pubkey, ProgramProxy<A>>) -> Self {
        Self {
            invoked_program,
            program_proxies,
        }
    }

    /// Build a dispatcher per config; a program listed twice keeps its last config.
    pub fn from_configs<F>(
        invoked_program: AccountRef,
        configs: &[ProgramMapConfig],
        dynamic_account_factory: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(&DynamicAccountConfig) -> Result<DynamicAccountResolver<A>, ConfigError>,
    {
        let program_proxies = create_program_proxies(&invoked_program, dynamic_account_factory, configs)?;
        tracing::debug!(
            invoked = %invoked_program.pubkey,
            programs = program_proxies.len(),
            "Built transaction mapper"
        );
        Ok(Self::new(invoked_program, program_proxies))
    }

    pub fn invoked_program(&self) -> &AccountRef {
        &self.invoked_program
    }

    pub fn program_proxy(&self, program_id: &Pubkey) -> Option<&ProgramProxy<A>> {
        self.program_proxies.get(program_id)
    }

    pub fn program_proxies(&self) -> &HashMap<Pubkey, ProgramProxy<A>> {
        &self.program_proxies
    }

    pub fn map_instruction<'a>(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        ix: &'a Instruction,
    ) -> ProxyResult<Cow<'a, Instruction>> {
        match self.program_proxies.get(ix.program_id()) {
            Some(proxy) => proxy.map(fee_payer, ctx, ix),
            None => {
                tracing::trace!(program = %ix.program_id(), "Passing through unmapped program");
                Ok(Cow::Borrowed(ix))
            }
        }
    }

    /// Route like [`Self::map_instruction`] but skip per-variant program validation.
    pub fn map_instruction_unchecked<'a>(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        ix: &'a Instruction,
    ) -> ProxyResult<Cow<'a, Instruction>> {
        match self.program_proxies.get(ix.program_id()) {
            Some(proxy) => proxy.map_unchecked(fee_payer, ctx, ix),
            None => Ok(Cow::Borrowed(ix)),
        }
    }

    /// Map each instruction in order. Fails on the first instruction that cannot be mapped.
    pub fn map_instructions<'a>(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        instructions: &'a [Instruction],
    ) -> ProxyResult<Vec<Cow<'a, Instruction>>> {
        instructions
            .iter()
            .map(|ix| self.map_instruction(fee_payer, ctx, ix))
            .collect()
    }

    /// Map the instructions of `tx`, keeping its lookup tables.
    pub fn map_transaction(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        tx: &Transaction,
    ) -> ProxyResult<Transaction> {
        self.map_transaction_with_tables(fee_payer, ctx, tx, &[])
    }

    /// Map the instructions of `tx` and append `add_tables` after its existing tables.
    pub fn map_transaction_with_tables(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        tx: &Transaction,
        add_tables: &[LookupTable],
    ) -> ProxyResult<Transaction> {
        let instructions = self
            .map_instructions(fee_payer, ctx, &tx.instructions)?
            .into_iter()
            .map(Cow::into_owned)
            .collect();

        let mut lookup_tables = Vec::with_capacity(tx.lookup_tables.len() + add_tables.len());
        lookup_tables.extend_from_slice(&tx.lookup_tables);
        lookup_tables.extend_from_slice(add_tables);

        Ok(Transaction::with_lookup_tables(*fee_payer, instructions, lookup_tables))
    }

    /// Map `tx` with its own fee payer standing in for the runtime payer.
    pub fn map_transaction_with_own_payer(&self, ctx: &A, tx: &Transaction) -> ProxyResult<Transaction> {
        self.map_transaction_with_tables(&tx.fee_payer, ctx, tx, &[])
    }

    pub fn map_transaction_with_own_payer_and_tables(
        &self,
        ctx: &A,
        tx: &Transaction,
        add_tables: &[LookupTable],
    ) -> ProxyResult<Transaction> {
        self.map_transaction_with_tables(&tx.fee_payer, ctx, tx, add_tables)
    }
}

impl<A> fmt::Debug for TransactionMapper<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionMapper")
            .field("invoked_program", &self.invoked_program)
            .field("program_proxies", &self.program_proxies)
            .finish()
    }
}
