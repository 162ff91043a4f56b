use groflow_types::TrustPoints;

use crate::BookkeepingError;

/// The current user's spendable trust-point balance.
///
/// The balance can't go negative: a debit larger than the balance is
/// refused and changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    balance: TrustPoints,
}

impl Ledger {
    #[must_use]
    pub const fn new(seed: TrustPoints) -> Self {
        Self { balance: seed }
    }

    #[must_use]
    pub const fn balance(&self) -> TrustPoints {
        self.balance
    }

    pub fn credit(&mut self, amount: TrustPoints) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn debit(&mut self, amount: TrustPoints) -> Result<TrustPoints, BookkeepingError> {
        let remaining =
            self.balance
                .checked_sub(amount)
                .ok_or(BookkeepingError::InsufficientFunds {
                    balance: self.balance,
                    requested: amount,
                })?;
        self.balance = remaining;
        Ok(remaining)
    }

    #[must_use]
    pub fn can_afford(&self, amount: TrustPoints) -> bool {
        self.balance >= amount
    }
}
