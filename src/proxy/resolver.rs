//! Callbacks that fill dynamic account slots at mapping time.

use crate::config::DynamicAccountConfig;
use crate::shared::AccountRef;

/// Accounts known to every resolver call, independent of the runtime context.
#[derive(Debug, Clone, Copy)]
pub struct SlotEnv<'a> {
    /// The program the source instruction targets, read-only.
    pub source_program: &'a AccountRef,
    /// The proxy program that will be invoked instead.
    pub invoked_program: &'a AccountRef,
    pub fee_payer: &'a AccountRef,
}

/// Produces the account for one dynamic slot.
///
/// `A` is the embedding application's runtime context; the proxies never
/// inspect it.
pub type DynamicAccountResolver<A> = Box<dyn Fn(&SlotEnv<'_>, &A) -> AccountRef + Send + Sync>;

/// Places the transaction fee payer.
pub fn fee_payer<A: 'static>() -> DynamicAccountResolver<A> {
    Box::new(|env: &SlotEnv<'_>, _: &A| *env.fee_payer)
}

/// Places the source program as a read-only account, for proxies that CPI into it.
pub fn source_program<A: 'static>() -> DynamicAccountResolver<A> {
    Box::new(|env: &SlotEnv<'_>, _: &A| env.source_program.as_readonly())
}

pub fn invoked_program<A: 'static>() -> DynamicAccountResolver<A> {
    Box::new(|env: &SlotEnv<'_>, _: &A| *env.invoked_program)
}

/// Always places `account`.
pub fn fixed<A: 'static>(account: AccountRef) -> DynamicAccountResolver<A> {
    Box::new(move |_: &SlotEnv<'_>, _: &A| account)
}

/// Reads the slot's key out of the runtime context and applies the slot's declared flags.
pub fn from_context<A, F>(config: &DynamicAccountConfig, key: F) -> DynamicAccountResolver<A>
where
    A: 'static,
    F: Fn(&A) -> solana_pubkey::Pubkey + Send + Sync + 'static,
{
    let (writable, signer) = (config.writable, config.signer);
    Box::new(move |_: &SlotEnv<'_>, ctx: &A| AccountRef::new(key(ctx), writable, signer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_pubkey::Pubkey;

    struct Vault {
        state: Pubkey,
    }

    #[test]
    fn test_builtin_resolvers() {
        let source = AccountRef::invoked(Pubkey::new_unique());
        let invoked = AccountRef::invoked(Pubkey::new_unique());
        let payer = AccountRef::fee_payer(Pubkey::new_unique());
        let env = SlotEnv {
            source_program: &source,
            invoked_program: &invoked,
            fee_payer: &payer,
        };
        let ctx = Vault {
            state: Pubkey::new_unique(),
        };

        assert_eq!(fee_payer::<Vault>()(&env, &ctx), payer);
        assert_eq!(source_program::<Vault>()(&env, &ctx), AccountRef::readonly(source.pubkey));
        assert_eq!(invoked_program::<Vault>()(&env, &ctx), invoked);

        let pinned = AccountRef::writable(Pubkey::new_unique());
        assert_eq!(fixed::<Vault>(pinned)(&env, &ctx), pinned);

        let config = DynamicAccountConfig::new("glam_state", 0, true, false);
        let resolver = from_context(&config, |v: &Vault| v.state);
        assert_eq!(resolver(&env, &ctx), AccountRef::writable(ctx.state));
    }
}
