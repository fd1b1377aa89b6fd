pub mod ids;
pub mod money;
pub mod transaction;

pub use ids::{AccountId, CategoryId, ContactId, RuleId, TaxId, TransactionId};
pub use money::Money;
pub use transaction::{BankTransaction, Direction};
