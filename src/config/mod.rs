//! Mapping configuration: how each source instruction variant maps to a proxy call.
//!
//! Configs are immutable once built. They are produced from JSON by
//! [`ProgramMapConfig::from_json`] (or the [`crate::loader`]) and consumed by
//! [`ProgramMapConfig::create_program_proxy`].

pub mod convert;
pub mod intern;
pub mod wire;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use crate::error::{ConfigError, LoadError};
use crate::proxy::program::ProgramProxy;
use crate::proxy::resolver::DynamicAccountResolver;
use crate::proxy::InstructionProxy;
use crate::shared::{AccountRef, Discriminator};

pub use intern::AccountInterner;

/// `tag_length` value for a program whose variants use differing tag lengths.
pub const MIXED_TAG_LENGTH: i32 = -1;

// ─── Slot configs ────────────────────────────────────────────────────────────

/// A destination account supplied at call time by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicAccountConfig {
    #[serde(rename = "name")]
    pub semantic_name: String,
    #[serde(rename = "index")]
    pub dest_index: usize,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub signer: bool,
}

impl DynamicAccountConfig {
    pub fn new(semantic_name: impl Into<String>, dest_index: usize, writable: bool, signer: bool) -> Self {
        Self {
            semantic_name: semantic_name.into(),
            dest_index,
            writable,
            signer,
        }
    }
}

/// A constant account pinned to a destination index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticAccountEntry {
    pub account: AccountRef,
    pub dest_index: usize,
}

impl StaticAccountEntry {
    pub fn new(account: AccountRef, dest_index: usize) -> Self {
        Self {
            account,
            dest_index,
        }
    }
}

// ─── IxMapConfig ─────────────────────────────────────────────────────────────

/// Mapping for one source instruction variant.
///
/// `index_map[s]` is the destination index for source account `s`, or a
/// negative value to drop it. Source accounts past the end of `index_map` are
/// appended after all mapped slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IxMapConfig {
    pub source_name: String,
    pub source_tag: Discriminator,
    pub dest_name: Option<String>,
    /// `None` keeps the source tag and the source program.
    pub dest_tag: Option<Discriminator>,
    pub dynamic_slots: Vec<DynamicAccountConfig>,
    pub static_slots: Vec<Arc<StaticAccountEntry>>,
    pub index_map: Vec<i32>,
}

impl IxMapConfig {
    /// A variant that rewrites `source_tag` into `dest_tag`, with no slots yet.
    pub fn new(source_tag: impl Into<Discriminator>, dest_tag: Option<Discriminator>) -> Self {
        Self {
            source_name: String::new(),
            source_tag: source_tag.into(),
            dest_name: None,
            dest_tag,
            dynamic_slots: Vec::new(),
            static_slots: Vec::new(),
            index_map: Vec::new(),
        }
    }

    /// Number of mapped destination accounts, excluding trailing extras.
    pub fn num_accounts(&self) -> usize {
        self.dynamic_slots.len()
            + self.static_slots.len()
            + self.index_map.iter().filter(|&&i| i >= 0).count()
    }

    /// Number of source accounts the index map drops.
    pub fn num_dropped(&self) -> usize {
        self.index_map.iter().filter(|&&i| i < 0).count()
    }

    /// Tag the proxied instruction will carry.
    pub fn effective_dest_tag(&self) -> &Discriminator {
        self.dest_tag.as_ref().unwrap_or(&self.source_tag)
    }

    /// Name used in errors and logs.
    pub fn display_name(&self) -> String {
        if self.source_name.is_empty() {
            self.source_tag.to_string()
        } else {
            self.source_name.clone()
        }
    }

    pub fn create_proxy<A, F>(
        &self,
        source_program: &AccountRef,
        invoked_program: &AccountRef,
        dynamic_account_factory: &mut F,
    ) -> Result<InstructionProxy<A>, ConfigError>
    where
        F: FnMut(&DynamicAccountConfig) -> Result<DynamicAccountResolver<A>, ConfigError>,
    {
        InstructionProxy::build(source_program, invoked_program, self, dynamic_account_factory)
    }
}

// ─── ProgramMapConfig ────────────────────────────────────────────────────────

/// All variant mappings for one source program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMapConfig {
    source_program: AccountRef,
    variants: Vec<IxMapConfig>,
    tag_length: i32,
}

impl ProgramMapConfig {
    pub fn new(source_program: Pubkey, variants: Vec<IxMapConfig>) -> Self {
        let tag_length = common_length(variants.iter().map(|v| v.effective_dest_tag().len()));
        Self {
            source_program: AccountRef::readonly(source_program),
            variants,
            tag_length,
        }
    }

    /// Parse one mapping document, sharing static entries through `interner`.
    pub fn from_json(data: &[u8], interner: &mut AccountInterner) -> Result<Self, LoadError> {
        let wire: wire::ProgramMapJson =
            serde_json::from_slice(data).map_err(|source| LoadError::Json {
                origin: "mapping".to_string(),
                source,
            })?;
        Ok(Self::from_wire(wire, interner))
    }

    pub fn source_program(&self) -> &AccountRef {
        &self.source_program
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.source_program.pubkey
    }

    pub fn variants(&self) -> &[IxMapConfig] {
        &self.variants
    }

    /// Common destination tag length, `0` without variants, or [`MIXED_TAG_LENGTH`].
    pub fn tag_length(&self) -> i32 {
        self.tag_length
    }

    pub fn fixed_length_discriminator(&self) -> bool {
        self.tag_length > 0
    }

    /// Common source tag length, if every variant shares one.
    pub fn source_tag_length(&self) -> Option<usize> {
        match common_length(self.variants.iter().map(|v| v.source_tag.len())) {
            len if len > 0 => Some(len as usize),
            _ => None,
        }
    }

    /// Build the dispatcher for this program.
    ///
    /// Fixed-length dispatch keys on source tags, so it is used only when the
    /// destination tag length is uniform and the source tags share one length
    /// as well. Anything else dispatches linearly in declaration order.
    pub fn create_program_proxy<A, F>(
        &self,
        invoked_program: &AccountRef,
        mut dynamic_account_factory: F,
    ) -> Result<ProgramProxy<A>, ConfigError>
    where
        F: FnMut(&DynamicAccountConfig) -> Result<DynamicAccountResolver<A>, ConfigError>,
    {
        let proxies = self
            .variants
            .iter()
            .map(|v| v.create_proxy(&self.source_program, invoked_program, &mut dynamic_account_factory))
            .collect::<Result<Vec<_>, _>>()?;

        let source_len = self.source_tag_length();
        match source_len.filter(|_| self.fixed_length_discriminator()) {
            Some(len) => Ok(ProgramProxy::fixed_length(self.source_program, len, proxies)
                .unwrap_or_else(|proxies| ProgramProxy::linear(self.source_program, proxies))),
            None => {
                if self.fixed_length_discriminator() {
                    tracing::debug!(
                        program = %self.source_program.pubkey,
                        "Source discriminator lengths differ, using linear dispatch"
                    );
                }
                Ok(ProgramProxy::linear(self.source_program, proxies))
            }
        }
    }
}

/// Build one dispatcher per config, keyed by source program.
///
/// A program listed twice keeps the last config.
pub fn create_program_proxies<A, F>(
    invoked_program: &AccountRef,
    mut dynamic_account_factory: F,
    configs: &[ProgramMapConfig],
) -> Result<HashMap<Pubkey, ProgramProxy<A>>, ConfigError>
where
    F: FnMut(&DynamicAccountConfig) -> Result<DynamicAccountResolver<A>, ConfigError>,
{
    let mut proxies = HashMap::with_capacity(configs.len());
    for config in configs {
        let proxy = config.create_program_proxy(invoked_program, &mut dynamic_account_factory)?;
        if proxies.insert(*config.program_id(), proxy).is_some() {
            tracing::warn!(program = %config.program_id(), "Duplicate program mapping replaced");
        }
        tracing::debug!(
            program = %config.program_id(),
            variants = config.variants.len(),
            tag_length = config.tag_length,
            "Built program proxy"
        );
    }
    Ok(proxies)
}

fn common_length(mut lengths: impl Iterator<Item = usize>) -> i32 {
    let Some(first) = lengths.next() else {
        return 0;
    };
    if lengths.all(|len| len == first) {
        first as i32
    } else {
        MIXED_TAG_LENGTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::instruction::Instruction;

    fn variant(src: &[u8], dst: Option<&[u8]>) -> IxMapConfig {
        IxMapConfig::new(src, dst.map(Discriminator::from))
    }

    #[test]
    fn test_tag_length_empty() {
        let config = ProgramMapConfig::new(Pubkey::new_unique(), vec![]);
        assert_eq!(config.tag_length(), 0);
        assert!(!config.fixed_length_discriminator());
        assert_eq!(config.source_tag_length(), None);
    }

    #[test]
    fn test_tag_length_uniform_destination() {
        let config = ProgramMapConfig::new(
            Pubkey::new_unique(),
            vec![
                variant(&[1], Some(&[1, 2, 3, 4, 5, 6, 7, 8])),
                variant(&[2], Some(&[8, 7, 6, 5, 4, 3, 2, 1])),
            ],
        );
        assert_eq!(config.tag_length(), 8);
        assert_eq!(config.source_tag_length(), Some(1));
    }

    #[test]
    fn test_uniform_destination_mixed_source_uses_linear_dispatch() {
        let source = Pubkey::new_unique();
        let config = ProgramMapConfig::new(
            source,
            vec![variant(&[1], Some(&[9; 4])), variant(&[2, 0], Some(&[8; 4]))],
        );
        assert_eq!(config.tag_length(), 4);
        assert_eq!(config.source_tag_length(), None);

        let invoked = AccountRef::invoked(Pubkey::new_unique());
        let proxy: ProgramProxy<()> = config
            .create_program_proxy(&invoked, |_: &DynamicAccountConfig| {
                Err(ConfigError::UnknownDynamicAccount {
                    ix: "none".to_string(),
                    name: "none".to_string(),
                })
            })
            .unwrap();
        assert!(!proxy.is_fixed_length());
        assert_eq!(proxy.len(), 2);

        let payer = AccountRef::fee_payer(Pubkey::new_unique());
        let program = AccountRef::readonly(source);
        let two_byte = Instruction::new(program, vec![], vec![2, 0, 7]);
        assert_eq!(proxy.map(&payer, &(), &two_byte).unwrap().data, vec![8, 8, 8, 8, 7]);
        let one_byte = Instruction::new(program, vec![], vec![1, 5]);
        assert_eq!(proxy.map(&payer, &(), &one_byte).unwrap().data, vec![9, 9, 9, 9, 5]);
    }

    #[test]
    fn test_uniform_source_and_destination_uses_fixed_dispatch() {
        let config = ProgramMapConfig::new(
            Pubkey::new_unique(),
            vec![variant(&[1, 0], Some(&[9; 4])), variant(&[2, 0], Some(&[8; 4]))],
        );
        let invoked = AccountRef::invoked(Pubkey::new_unique());
        let proxy: ProgramProxy<()> = config
            .create_program_proxy(&invoked, |_: &DynamicAccountConfig| {
                Err(ConfigError::UnknownDynamicAccount {
                    ix: "none".to_string(),
                    name: "none".to_string(),
                })
            })
            .unwrap();
        assert!(proxy.is_fixed_length());
        assert_eq!(proxy.tag_length(), Some(2));
    }

    #[test]
    fn test_tag_length_mixed() {
        let config = ProgramMapConfig::new(
            Pubkey::new_unique(),
            vec![variant(&[1], Some(&[9; 8])), variant(&[2], Some(&[9; 4]))],
        );
        assert_eq!(config.tag_length(), MIXED_TAG_LENGTH);
        assert!(!config.fixed_length_discriminator());
    }

    #[test]
    fn test_tag_length_pass_through_uses_source_tag() {
        let config = ProgramMapConfig::new(
            Pubkey::new_unique(),
            vec![variant(&[0], None), variant(&[1], None)],
        );
        assert_eq!(config.tag_length(), 1);
    }

    #[test]
    fn test_num_accounts_counts_kept_indexes() {
        let mut ix = variant(&[1], Some(&[2]));
        ix.dynamic_slots = (0..4)
            .map(|i| DynamicAccountConfig::new(format!("slot_{i}"), i, false, false))
            .collect();
        ix.index_map = vec![4, 5, 6, -1];
        assert_eq!(ix.num_accounts(), 7);
        assert_eq!(ix.num_dropped(), 1);
    }

    #[test]
    fn test_dynamic_account_config_json_names() {
        let json = r#"{"name":"glam_vault","index":1,"writable":true}"#;
        let config: DynamicAccountConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, DynamicAccountConfig::new("glam_vault", 1, true, false));
        assert!(serde_json::from_str::<DynamicAccountConfig>(r#"{"name":"x","index":0,"mut":true}"#).is_err());
    }
}
