//! Investor pool and its investment records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use groflow_types::{CampaignId, InvestmentId, Money};

use crate::{BookkeepingError, CampaignRegistry};

pub const DEFAULT_MIN_INVESTMENT_UNITS: u64 = 500;
pub const DEFAULT_MAX_INVESTMENT_UNITS: u64 = 10_000;
/// 5% per month.
pub const DEFAULT_MONTHLY_RETURN_BPS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvestmentRules {
    pub min_investment: Money,
    pub max_investment: Money,
    pub monthly_return_bps: u32,
}

impl Default for InvestmentRules {
    fn default() -> Self {
        Self {
            min_investment: Money::from_units(DEFAULT_MIN_INVESTMENT_UNITS),
            max_investment: Money::from_units(DEFAULT_MAX_INVESTMENT_UNITS),
            monthly_return_bps: DEFAULT_MONTHLY_RETURN_BPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvestmentStatus {
    Active,
}

impl InvestmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            InvestmentStatus::Active => "Active",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Investment {
    pub id: InvestmentId,
    pub campaign: CampaignId,
    /// Campaign name at the time of investing, for display only.
    pub business_name: String,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
    pub status: InvestmentStatus,
}

/// The investor's deployable capital and the investments made from it.
#[derive(Debug, Clone)]
pub struct InvestorPool {
    liquidity: Money,
    investments: Vec<Investment>,
    next_id: u64,
    rules: InvestmentRules,
}

impl InvestorPool {
    #[must_use]
    pub fn new(liquidity: Money, rules: InvestmentRules) -> Self {
        Self {
            liquidity,
            investments: Vec::new(),
            next_id: 1,
            rules,
        }
    }

    #[must_use]
    pub fn liquidity(&self) -> Money {
        self.liquidity
    }

    #[must_use]
    pub fn rules(&self) -> InvestmentRules {
        self.rules
    }

    pub fn add_liquidity(&mut self, amount: Money) {
        self.liquidity = self.liquidity.saturating_add(amount);
        tracing::info!(%amount, liquidity = %self.liquidity, "Liquidity added");
    }

    pub fn withdraw_liquidity(&mut self, amount: Money) -> Result<Money, BookkeepingError> {
        let remaining =
            self.liquidity
                .checked_sub(amount)
                .ok_or(BookkeepingError::InsufficientLiquidity {
                    available: self.liquidity,
                    requested: amount,
                })?;
        self.liquidity = remaining;
        Ok(remaining)
    }

    pub fn invest(
        &mut self,
        campaigns: &mut CampaignRegistry,
        campaign: CampaignId,
        amount: Money,
    ) -> Result<InvestmentId, BookkeepingError> {
        self.invest_at(campaigns, campaign, amount, Utc::now())
    }

    /// Fund an eligible campaign from the pool.
    ///
    /// Checks run in a fixed order (existence, eligibility, prior funding,
    /// amount bounds, liquidity) and the first failure is returned with no
    /// state changed.
    pub fn invest_at(
        &mut self,
        campaigns: &mut CampaignRegistry,
        id: CampaignId,
        amount: Money,
        timestamp: DateTime<Utc>,
    ) -> Result<InvestmentId, BookkeepingError> {
        let threshold = campaigns.rules().investment_threshold;
        let campaign = campaigns
            .get(id)
            .ok_or(BookkeepingError::CampaignNotFound(id))?;

        if !campaigns.is_eligible(campaign) {
            return Err(BookkeepingError::NotEligible {
                campaign: id,
                points: campaign.points.value(),
                threshold,
            });
        }
        if campaign.funded_by_investor {
            return Err(BookkeepingError::AlreadyFunded(id));
        }
        if amount < self.rules.min_investment || amount > self.rules.max_investment {
            return Err(BookkeepingError::AmountOutOfBounds {
                amount,
                min: self.rules.min_investment,
                max: self.rules.max_investment,
            });
        }

        self.withdraw_liquidity(amount)?;

        let campaign = campaigns
            .get_mut(id)
            .ok_or(BookkeepingError::CampaignNotFound(id))?;
        campaign.funded_by_investor = true;
        campaign.investor_funding = amount;

        let investment_id = InvestmentId::new(self.next_id);
        self.next_id += 1;
        self.investments.push(Investment {
            id: investment_id,
            campaign: id,
            business_name: campaign.name.to_string(),
            amount,
            timestamp,
            status: InvestmentStatus::Active,
        });

        tracing::info!(
            investment = %investment_id,
            campaign = %id,
            %amount,
            liquidity = %self.liquidity,
            "Investment made"
        );
        Ok(investment_id)
    }

    #[must_use]
    pub fn investments(&self) -> &[Investment] {
        &self.investments
    }

    pub fn for_campaign(&self, campaign: CampaignId) -> impl Iterator<Item = &Investment> {
        self.investments
            .iter()
            .filter(move |inv| inv.campaign == campaign)
    }

    #[must_use]
    pub fn total_invested(&self) -> Money {
        self.investments.iter().map(|inv| inv.amount).sum()
    }

    #[must_use]
    pub fn expected_monthly_return(&self) -> Money {
        self.total_invested()
            .apply_basis_points(self.rules.monthly_return_bps)
    }
}
