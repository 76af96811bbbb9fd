//! The instruction and transaction shapes the proxies read and produce.

pub mod instruction;
pub mod transaction;

pub use instruction::Instruction;
pub use transaction::{LookupTable, Transaction};
