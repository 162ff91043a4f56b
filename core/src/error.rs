//! Bookkeeping failures.
//!
//! Every variant is recoverable: the operation that produced it left the
//! session untouched, and the caller shows the message and waits for the
//! user to try again.

use groflow_types::{CampaignId, Money, TrustPoints};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookkeepingError {
    #[error("insufficient trust points: have {balance}, need {requested}")]
    InsufficientFunds {
        balance: TrustPoints,
        requested: TrustPoints,
    },

    #[error("insufficient liquidity: {available} available, {requested} requested")]
    InsufficientLiquidity { available: Money, requested: Money },

    #[error("campaign {0} has already been funded by an investor")]
    AlreadyFunded(CampaignId),

    #[error("campaign {0} does not exist")]
    CampaignNotFound(CampaignId),

    #[error("campaign {campaign} has reached its goal ({points} of {goal} points)")]
    CampaignFullyFunded {
        campaign: CampaignId,
        points: u64,
        goal: u64,
    },

    #[error("campaign {campaign} has {points} points; {threshold} are needed before investing")]
    NotEligible {
        campaign: CampaignId,
        points: u64,
        threshold: u64,
    },

    #[error("investment of {amount} is outside the allowed range {min} to {max}")]
    AmountOutOfBounds { amount: Money, min: Money, max: Money },
}
