//! Per-program dispatch from an instruction's tag to its [`InstructionProxy`].

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use crate::error::{ProxyError, ProxyResult};
use crate::program::instruction::Instruction;
use crate::proxy::InstructionProxy;
use crate::shared::{AccountRef, Discriminator};

enum Dispatch<A> {
    /// Every source tag has `tag_length` bytes; keyed by exact tag.
    Fixed {
        tag_length: usize,
        proxies: HashMap<Discriminator, InstructionProxy<A>>,
    },
    /// Tried in declaration order, first prefix match wins.
    Linear(Vec<InstructionProxy<A>>),
}

/// Every compiled variant of one source program.
pub struct ProgramProxy<A> {
    source_program: AccountRef,
    dispatch: Dispatch<A>,
}

impl<A> ProgramProxy<A> {
    /// Hash dispatch over source tags of exactly `tag_length` bytes.
    ///
    /// Hands the proxies back if any source tag has another length. When two
    /// variants share a tag the first one declared is kept.
    pub fn fixed_length(
        source_program: AccountRef,
        tag_length: usize,
        proxies: Vec<InstructionProxy<A>>,
    ) -> Result<Self, Vec<InstructionProxy<A>>> {
        if tag_length == 0 || proxies.iter().any(|p| p.source_tag().len() != tag_length) {
            return Err(proxies);
        }

        let mut by_tag = HashMap::with_capacity(proxies.len());
        for proxy in proxies {
            match by_tag.entry(proxy.source_tag().clone()) {
                Entry::Occupied(existing) => {
                    let existing: &InstructionProxy<A> = existing.get();
                    tracing::warn!(
                        program = %source_program.pubkey,
                        tag = %proxy.source_tag(),
                        kept = existing.source_name(),
                        ignored = proxy.source_name(),
                        "Duplicate source discriminator"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(proxy);
                }
            }
        }

        tracing::debug!(
            program = %source_program.pubkey,
            tag_length,
            variants = by_tag.len(),
            "Fixed-length dispatch"
        );
        Ok(Self {
            source_program,
            dispatch: Dispatch::Fixed {
                tag_length,
                proxies: by_tag,
            },
        })
    }

    /// Ordered dispatch; a variant whose tag starts with an earlier variant's
    /// tag is unreachable and gets reported.
    pub fn linear(source_program: AccountRef, proxies: Vec<InstructionProxy<A>>) -> Self {
        for (i, later) in proxies.iter().enumerate() {
            let shadowing = proxies[..i]
                .iter()
                .find(|earlier| later.source_tag().as_bytes().starts_with(earlier.source_tag().as_bytes()));
            if let Some(earlier) = shadowing {
                tracing::warn!(
                    program = %source_program.pubkey,
                    shadowed = %later.source_tag(),
                    by = %earlier.source_tag(),
                    "Source discriminator is shadowed by an earlier variant"
                );
            }
        }

        tracing::debug!(
            program = %source_program.pubkey,
            variants = proxies.len(),
            "Linear dispatch"
        );
        Self {
            source_program,
            dispatch: Dispatch::Linear(proxies),
        }
    }

    pub fn source_program(&self) -> &AccountRef {
        &self.source_program
    }

    pub fn is_fixed_length(&self) -> bool {
        matches!(self.dispatch, Dispatch::Fixed { .. })
    }

    /// Tag length used for hash dispatch, if any.
    pub fn tag_length(&self) -> Option<usize> {
        match self.dispatch {
            Dispatch::Fixed { tag_length, .. } => Some(tag_length),
            Dispatch::Linear(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match &self.dispatch {
            Dispatch::Fixed { proxies, .. } => proxies.len(),
            Dispatch::Linear(proxies) => proxies.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The variant whose source tag prefixes `data`.
    pub fn lookup(&self, data: &[u8]) -> Option<&InstructionProxy<A>> {
        match &self.dispatch {
            Dispatch::Fixed {
                tag_length,
                proxies,
            } => data.get(..*tag_length).and_then(|tag| proxies.get(tag)),
            Dispatch::Linear(proxies) => proxies.iter().find(|p| p.matches(data)),
        }
    }

    pub fn lookup_instruction(&self, ix: &Instruction) -> Option<&InstructionProxy<A>> {
        self.lookup(&ix.data)
    }

    /// Map `ix` through the matching variant, validating program and tag.
    pub fn map<'a>(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        ix: &'a Instruction,
    ) -> ProxyResult<Cow<'a, Instruction>> {
        let proxy = self.find(ix)?;
        Ok(proxy.map(fee_payer, ctx, ix)?)
    }

    /// Map `ix` through the matching variant without checking its program.
    pub fn map_unchecked<'a>(
        &self,
        fee_payer: &AccountRef,
        ctx: &A,
        ix: &'a Instruction,
    ) -> ProxyResult<Cow<'a, Instruction>> {
        let proxy = self.find(ix)?;
        Ok(proxy.map_unchecked(fee_payer, ctx, ix)?)
    }

    fn find(&self, ix: &Instruction) -> ProxyResult<&InstructionProxy<A>> {
        self.lookup_instruction(ix)
            .ok_or_else(|| ProxyError::UnsupportedInstruction {
                program: self.source_program.pubkey,
                data: hex::encode(&ix.data),
            })
    }
}

impl<A> fmt::Debug for ProgramProxy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramProxy")
            .field("source_program", &self.source_program)
            .field("fixed_length", &self.is_fixed_length())
            .field("variants", &self.len())
            .finish()
    }
}
