//! # ix-proxy
//!
//! Config-driven remapping of Solana instructions into calls through a proxy
//! (vault) program.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Account and instruction types, mapping config model
//! 2. **Proxies** : Per-variant rewriters and per-program dispatchers
//! 3. **Mapper** : `TransactionMapper` routing whole transactions
//! 4. **Loading** : Local directory and remote (HTTP, retry/backoff) config sources
//!
//! Everything built in layers 1 to 3 is immutable and `Send + Sync`; mapping is
//! synchronous and allocation-light. Only layer 4 performs I/O.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ix_proxy::prelude::*;
//!
//! let loader = ConfigLoader::from_json(&std::fs::read("loader.json")?)?;
//! let configs = loader.load_local_configs()?;
//!
//! let mapper = TransactionMapper::from_configs(vault_program, &configs, |slot| {
//!     match slot.semantic_name.as_str() {
//!         "fee_payer" => Ok(resolver::fee_payer()),
//!         "glam_state" => Ok(resolver::from_context(slot, |ctx: &Vault| ctx.state)),
//!         name => Err(ConfigError::UnknownDynamicAccount { ix: String::new(), name: name.into() }),
//!     }
//! })?;
//!
//! let mapped = mapper.map_transaction(&fee_payer, &vault, &tx)?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes: account references and discriminators.
pub mod shared;

/// Instructions, transactions and lookup tables.
pub mod program;

/// Mapping configuration model and its JSON wire format.
pub mod config;

/// Unified error types.
pub mod error;

// ── Layer 2: Proxies ─────────────────────────────────────────────────────────

/// Instruction proxies, dynamic account resolvers and program dispatchers.
pub mod proxy;

// ── Layer 3: Mapper ──────────────────────────────────────────────────────────

/// `TransactionMapper` : the primary entry point.
pub mod mapper;

// ── Layer 4: Loading ─────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

/// Config sources: local directory and remote endpoints.
pub mod loader;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{AccountRef, Discriminator};

    // Instructions + transactions
    pub use crate::program::{Instruction, LookupTable, Transaction};

    // Config model
    pub use crate::config::{
        create_program_proxies, AccountInterner, DynamicAccountConfig, IxMapConfig,
        ProgramMapConfig, StaticAccountEntry,
    };

    // Proxies
    pub use crate::proxy::program::ProgramProxy;
    pub use crate::proxy::resolver::{self, DynamicAccountResolver, SlotEnv};
    pub use crate::proxy::{InstructionProxy, ProxyKind};

    // Mapper
    pub use crate::mapper::TransactionMapper;

    // Errors
    pub use crate::error::{ConfigError, LoadError, ProxyError, ProxyResult, ValidationError};

    // Loading
    pub use crate::loader::{ConfigLoader, ConfigResource};
    #[cfg(feature = "http")]
    pub use crate::http::{ConfigHttp, RetryConfig, RetryPolicy};
}
