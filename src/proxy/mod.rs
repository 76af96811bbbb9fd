//! Per-variant instruction rewriting.
//!
//! An [`InstructionProxy`] is compiled once from an [`IxMapConfig`] and then
//! maps any number of matching instructions. The rewrite strategy is chosen at
//! build time:
//!
//! - [`ProxyKind::Identity`]: hands the source instruction back untouched.
//! - [`ProxyKind::Payer`]: swaps the fee payer into a single account position.
//! - [`ProxyKind::General`]: rewrites the tag, the payload and the whole account list.

pub mod program;
pub mod resolver;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::config::{DynamicAccountConfig, IxMapConfig, StaticAccountEntry};
use crate::error::{ConfigError, ValidationError};
use crate::program::instruction::Instruction;
use crate::shared::{AccountRef, Discriminator};

use resolver::{DynamicAccountResolver, SlotEnv};

// ─── DynamicSlot ─────────────────────────────────────────────────────────────

/// A dynamic slot config paired with the resolver that fills it.
pub struct DynamicSlot<A> {
    config: DynamicAccountConfig,
    resolver: DynamicAccountResolver<A>,
}

impl<A> DynamicSlot<A> {
    pub fn config(&self) -> &DynamicAccountConfig {
        &self.config
    }

    pub fn resolve(&self, env: &SlotEnv<'_>, ctx: &A) -> AccountRef {
        (self.resolver)(env, ctx)
    }
}

impl<A> fmt::Debug for DynamicSlot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicSlot")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ─── GeneralProxy ────────────────────────────────────────────────────────────

/// Full rewrite: destination tag, dynamic and static slots, index permutation.
pub struct GeneralProxy<A> {
    dest_tag: Discriminator,
    dynamic_slots: Vec<DynamicSlot<A>>,
    static_slots: Vec<Arc<StaticAccountEntry>>,
    index_map: Vec<i32>,
    num_accounts: usize,
    length_delta: isize,
}

impl<A> GeneralProxy<A> {
    fn build<F>(
        ix: &str,
        config: &IxMapConfig,
        dest_tag: &Discriminator,
        factory: &mut F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(&DynamicAccountConfig) -> Result<DynamicAccountResolver<A>, ConfigError>,
    {
        let num_accounts = config.num_accounts();

        // Every destination index must be claimed exactly once, which makes
        // the claimed set exactly 0..num_accounts.
        let mut claimed = vec![false; num_accounts];
        let indexes = config
            .dynamic_slots
            .iter()
            .map(|slot| slot.dest_index)
            .chain(config.static_slots.iter().map(|entry| entry.dest_index))
            .chain(
                config
                    .index_map
                    .iter()
                    .filter(|&&i| i >= 0)
                    .map(|&i| i as usize),
            );
        for index in indexes {
            match claimed.get_mut(index) {
                None => {
                    return Err(ConfigError::IndexOutOfRange {
                        ix: ix.to_string(),
                        index,
                        num_accounts,
                    })
                }
                Some(true) => {
                    return Err(ConfigError::DuplicateIndex {
                        ix: ix.to_string(),
                        index,
                    })
                }
                Some(seen) => *seen = true,
            }
        }

        let dynamic_slots = config
            .dynamic_slots
            .iter()
            .map(|slot| {
                Ok(DynamicSlot {
                    config: slot.clone(),
                    resolver: factory(slot)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            dest_tag: dest_tag.clone(),
            dynamic_slots,
            static_slots: config.static_slots.clone(),
            index_map: config.index_map.clone(),
            num_accounts,
            length_delta: dest_tag.len() as isize - config.source_tag.len() as isize,
        })
    }

    pub fn dest_tag(&self) -> &Discriminator {
        &self.dest_tag
    }

    pub fn dynamic_slots(&self) -> &[DynamicSlot<A>] {
        &self.dynamic_slots
    }

    pub fn static_slots(&self) -> &[Arc<StaticAccountEntry>] {
        &self.static_slots
    }

    pub fn index_map(&self) -> &[i32] {
        &self.index_map
    }

    /// Mapped destination accounts, excluding trailing extras.
    pub fn num_accounts(&self) -> usize {
        self.num_accounts
    }

    /// `dest_tag.len() - source_tag.len()`.
    pub fn length_delta(&self) -> isize {
        self.length_delta
    }

    fn rewrite(
        &self,
        env: &SlotEnv<'_>,
        ctx: &A,
        source_tag_len: usize,
        ix: &Instruction,
    ) -> Result<Instruction, ValidationError> {
        let body = ix
            .data
            .get(source_tag_len..)
            .ok_or(ValidationError::DataTooShort {
                expected: source_tag_len,
                actual: ix.data.len(),
            })?;
        let mut data = Vec::with_capacity(self.dest_tag.len() + body.len());
        data.extend_from_slice(self.dest_tag.as_bytes());
        data.extend_from_slice(body);

        let source = &ix.accounts;
        if source.len() < self.index_map.len() {
            return Err(ValidationError::MissingAccounts {
                expected: self.index_map.len(),
                actual: source.len(),
            });
        }
        let extra = source.len() - self.index_map.len();

        let mut mapped: Vec<Option<AccountRef>> = vec![None; self.num_accounts + extra];
        for slot in &self.dynamic_slots {
            mapped[slot.config.dest_index] = Some(slot.resolve(env, ctx));
        }
        for entry in &self.static_slots {
            mapped[entry.dest_index] = Some(entry.account);
        }
        for (account, &dest) in source.iter().zip(&self.index_map) {
            if dest >= 0 {
                mapped[dest as usize] = Some(*account);
            }
        }
        for (slot, account) in mapped[self.num_accounts..]
            .iter_mut()
            .zip(&source[self.index_map.len()..])
        {
            *slot = Some(*account);
        }

        let accounts = mapped
            .into_iter()
            .enumerate()
            .map(|(index, account)| account.ok_or(ValidationError::UnassignedAccount { index }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Instruction::new(*env.invoked_program, accounts, data))
    }
}

impl<A> fmt::Debug for GeneralProxy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneralProxy")
            .field("dest_tag", &self.dest_tag)
            .field("dynamic_slots", &self.dynamic_slots)
            .field("static_slots", &self.static_slots)
            .field("index_map", &self.index_map)
            .field("num_accounts", &self.num_accounts)
            .field("length_delta", &self.length_delta)
            .finish()
    }
}

// ─── ProxyKind ───────────────────────────────────────────────────────────────

/// Rewrite strategy, fixed at build time.
pub enum ProxyKind<A> {
    Identity,
    /// The account at `payer_index` must be the fee payer.
    Payer { payer_index: usize },
    General(GeneralProxy<A>),
}

impl<A> fmt::Debug for ProxyKind<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Payer { payer_index } => f
                .debug_struct("Payer")
                .field("payer_index", payer_index)
                .finish(),
            Self::General(general) => f.debug_tuple("General").field(general).finish(),
        }
    }
}

// ─── InstructionProxy ────────────────────────────────────────────────────────

/// Compiled mapping for one source instruction variant.
pub struct InstructionProxy<A> {
    source_program: AccountRef,
    invoked_program: AccountRef,
    source_name: String,
    source_tag: Discriminator,
    kind: ProxyKind<A>,
}

impl<A> InstructionProxy<A> {
    /// Compile `config`, rejecting malformed mappings.
    ///
    /// Without a destination tag the variant keeps its program and tag: it is
    /// either an identity (no slots, no index map) or a payer swap (exactly one
    /// writable signer dynamic slot and exactly one dropped account).
    pub fn build<F>(
        source_program: &AccountRef,
        invoked_program: &AccountRef,
        config: &IxMapConfig,
        factory: &mut F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(&DynamicAccountConfig) -> Result<DynamicAccountResolver<A>, ConfigError>,
    {
        let ix = config.display_name();
        let kind = match &config.dest_tag {
            Some(dest_tag) => ProxyKind::General(GeneralProxy::build(&ix, config, dest_tag, factory)?),
            None => {
                if !config.static_slots.is_empty() {
                    return Err(ConfigError::StaticAccountsWithoutDestination { ix });
                }
                match config.dynamic_slots.as_slice() {
                    [] if config.index_map.is_empty() => ProxyKind::Identity,
                    [] => return Err(ConfigError::IndexMapWithoutDestination { ix }),
                    [payer] => {
                        if !(payer.writable && payer.signer) {
                            return Err(ConfigError::PayerNotWritableSigner { ix });
                        }
                        let removed = config.num_dropped();
                        if removed != 1 {
                            return Err(ConfigError::PayerDropCount { ix, removed });
                        }
                        ProxyKind::Payer {
                            payer_index: payer.dest_index,
                        }
                    }
                    slots => {
                        return Err(ConfigError::TooManyPassThroughAccounts {
                            ix,
                            count: slots.len(),
                        })
                    }
                }
            }
        };

        tracing::trace!(
            program = %source_program.pubkey,
            ix = %ix,
            kind = ?kind,
            "Built instruction proxy"
        );

        Ok(Self {
            source_program: *source_program,
            invoked_program: *invoked_program,
            source_name: config.source_name.clone(),
            source_tag: config.source_tag.clone(),
            kind,
        })
    }

    pub fn source_program(&self) -> &AccountRef {
        &self.source_program
    }

    pub fn invoked_program(&self) -> &AccountRef {
        &self.invoked_program
    }

    /// Program a mapped instruction targets: the invoked program for general
    /// rewrites, the source program otherwise.
    pub fn target_program(&self) -> &AccountRef {
        match self.kind {
            ProxyKind::General(_) => &self.invoked_program,
            _ => &self.source_program,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source_tag(&self) -> &Discriminator {
        &self.source_tag
    }

    /// Tag a mapped instruction carries.
    pub fn dest_tag(&self) -> &Discriminator {
        match &self.kind {
            ProxyKind::General(general) => &general.dest_tag,
            _ => &self.source_tag,
        }
    }

    pub fn length_delta(&self) -> isize {
        match &self.kind {
            ProxyKind::General(general) => general.length_delta,
            _ => 0,
        }
    }

    pub fn kind(&self) -> &ProxyKind<A> {
        &self.kind
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, ProxyKind::Identity)
    }

    /// True if `data` starts with this variant's source tag.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.source_tag.matches(data)
    }

    pub fn matches_at(&self, data: &[u8], offset: usize, length: usize) -> bool {
        self.source_tag.matches_at(data, offset, length)
    }

    /// Check that `ix` targets the source program and carries the source tag.
    pub fn validate(&self, ix: &Instruction) -> Result<(), ValidationError> {
        if ix.program.pubkey != self.source_program.pubkey {
            return Err(ValidationError::ProgramMismatch {
                expected: self.source_program.pubkey,
                actual: ix.program.pubkey,
                invoked: self.invoked_program.pubkey,
            });
        }
        let len = self.source_tag.len();
        match ix.discriminator(len) {
            None => Err(ValidationError::DataTooShort {
                expected: len,
                actual: ix.data.len(),
            }),
            Some(tag) if tag != self.source_tag.as_bytes() => {
                Err(ValidationError::DiscriminatorMismatch {
                    expected: self.source_tag.to_hex(),
                    actual: hex::encode(tag),
                })
            }
            Some(_) => Ok(()),
        }
    }

    /// Validate `ix` and map it.
    pub fn map<'a>(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        ix: &'a Instruction,
    ) -> Result<Cow<'a, Instruction>, ValidationError> {
        self.validate(ix)?;
        self.map_unchecked(fee_payer, ctx, ix)
    }

    /// Map `ix` without checking its program or tag.
    ///
    /// Identity proxies and payer proxies that find the payer already in place
    /// return the input borrowed.
    pub fn map_unchecked<'a>(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        ix: &'a Instruction,
    ) -> Result<Cow<'a, Instruction>, ValidationError> {
        match &self.kind {
            ProxyKind::Identity => Ok(Cow::Borrowed(ix)),
            ProxyKind::Payer { payer_index } => map_payer(*payer_index, fee_payer, ix),
            ProxyKind::General(general) => {
                let env = SlotEnv {
                    source_program: &self.source_program,
                    invoked_program: &self.invoked_program,
                    fee_payer,
                };
                general
                    .rewrite(&env, ctx, self.source_tag.len(), ix)
                    .map(Cow::Owned)
            }
        }
    }
}

impl<A> fmt::Debug for InstructionProxy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionProxy")
            .field("source_program", &self.source_program)
            .field("invoked_program", &self.invoked_program)
            .field("source_name", &self.source_name)
            .field("source_tag", &self.source_tag)
            .field("kind", &self.kind)
            .finish()
    }
}

fn map_payer<'a>(
    payer_index: usize,
    fee_payer: &AccountRef,
    ix: &'a Instruction,
) -> Result<Cow<'a, Instruction>, ValidationError> {
    let current = ix
        .accounts
        .get(payer_index)
        .ok_or(ValidationError::MissingAccounts {
            expected: payer_index + 1,
            actual: ix.accounts.len(),
        })?;
    if current.is_writable_signer() && current.pubkey == fee_payer.pubkey {
        return Ok(Cow::Borrowed(ix));
    }
    let mut accounts = ix.accounts.clone();
    accounts[payer_index] = *fee_payer;
    Ok(Cow::Owned(Instruction::new(ix.program, accounts, ix.data.clone())))
}
