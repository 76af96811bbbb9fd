//! The instruction shape the proxies read and produce.

use solana_pubkey::Pubkey;

use crate::shared::AccountRef;

/// A single program call: program, ordered accounts and opaque data.
///
/// Unlike `solana_instruction::Instruction` the program is carried as an
/// [`AccountRef`], so a mapped instruction can say it targets an invoked
/// proxy program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub program: AccountRef,
    pub accounts: Vec<AccountRef>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program: AccountRef, accounts: Vec<AccountRef>, data: Vec<u8>) -> Self {
        Self {
            program,
            accounts,
            data,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program.pubkey
    }

    /// The first `length` data bytes, or `None` if the data is shorter.
    pub fn discriminator(&self, length: usize) -> Option<&[u8]> {
        self.data.get(..length)
    }
}

impl From<solana_instruction::Instruction> for Instruction {
    fn from(ix: solana_instruction::Instruction) -> Self {
        Self {
            program: AccountRef::invoked(ix.program_id),
            accounts: ix.accounts.iter().map(AccountRef::from).collect(),
            data: ix.data,
        }
    }
}

impl From<Instruction> for solana_instruction::Instruction {
    fn from(ix: Instruction) -> Self {
        Self {
            program_id: ix.program.pubkey,
            accounts: ix.accounts.iter().map(Into::into).collect(),
            data: ix.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_instruction::AccountMeta;

    #[test]
    fn test_solana_instruction_roundtrip() {
        let program_id = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let target = Pubkey::new_unique();
        let ix = solana_instruction::Instruction {
            program_id,
            accounts: vec![AccountMeta::new(payer, true), AccountMeta::new_readonly(target, false)],
            data: vec![3, 1, 0],
        };

        let converted = Instruction::from(ix.clone());
        assert_eq!(converted.program, AccountRef::invoked(program_id));
        assert_eq!(converted.accounts[0], AccountRef::writable_signer(payer));
        assert_eq!(converted.accounts[1], AccountRef::readonly(target));
        assert_eq!(converted.discriminator(1), Some(&[3u8][..]));
        assert_eq!(converted.discriminator(4), None);

        let back: solana_instruction::Instruction = converted.into();
        assert_eq!(back, ix);
    }
}
