//! Campaign registry: the community marketplace of funding campaigns.
//!
//! Campaigns are appended in posting order and never removed. Their point
//! totals only ever grow, one vouch at a time. Names are not unique; the
//! registry keys everything by [`CampaignId`] and reports duplicate names
//! through [`CampaignRegistry::duplicate_names`] instead of rejecting them.

use std::collections::BTreeMap;
use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use serde::Serialize;

use groflow_types::{CampaignId, Money, NonEmptyString, TrustPoints};

use crate::{BookkeepingError, Ledger};

/// Points a single vouch moves from the voucher to the campaign.
pub const DEFAULT_VOUCH_POINTS: u64 = 10;
/// Points a campaign needs before investors may fund it.
pub const DEFAULT_INVESTMENT_THRESHOLD: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignRules {
    pub vouch_points: TrustPoints,
    pub investment_threshold: u64,
}

impl Default for CampaignRules {
    fn default() -> Self {
        Self {
            vouch_points: TrustPoints::new(DEFAULT_VOUCH_POINTS),
            investment_threshold: DEFAULT_INVESTMENT_THRESHOLD,
        }
    }
}

/// Input for posting a campaign.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: NonEmptyString,
    pub owner: NonEmptyString,
    pub description: String,
    pub goal: NonZeroU64,
    pub image_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: NonEmptyString,
    pub owner: NonEmptyString,
    pub description: String,
    pub image_reference: Option<String>,
    pub points: TrustPoints,
    pub goal: NonZeroU64,
    pub funded_by_investor: bool,
    pub investor_funding: Money,
    pub community_vouch_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    #[must_use]
    pub fn is_goal_reached(&self) -> bool {
        self.points.value() >= self.goal.get()
    }

    /// Fraction of the goal reached, capped at 1.0.
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.points.value() as f64 / self.goal.get() as f64).min(1.0)
    }
}

/// Result of a successful vouch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VouchReceipt {
    pub campaign: CampaignId,
    pub campaign_points: TrustPoints,
    pub voucher_balance: TrustPoints,
}

#[derive(Debug, Clone)]
pub struct CampaignRegistry {
    campaigns: Vec<Campaign>,
    next_id: u64,
    rules: CampaignRules,
}

impl Default for CampaignRegistry {
    fn default() -> Self {
        Self::new(CampaignRules::default())
    }
}

impl CampaignRegistry {
    #[must_use]
    pub fn new(rules: CampaignRules) -> Self {
        Self {
            campaigns: Vec::new(),
            next_id: 1,
            rules,
        }
    }

    #[must_use]
    pub fn rules(&self) -> CampaignRules {
        self.rules
    }

    /// Post a new campaign with zero progress.
    pub fn create(&mut self, campaign: NewCampaign) -> CampaignId {
        self.insert(campaign, TrustPoints::ZERO, 0)
    }

    /// Register a campaign that already carries community history from
    /// before this session (demo seeds and fixtures).
    pub fn import(
        &mut self,
        campaign: NewCampaign,
        points: TrustPoints,
        community_vouch_count: u64,
    ) -> CampaignId {
        self.insert(campaign, points, community_vouch_count)
    }

    fn insert(
        &mut self,
        campaign: NewCampaign,
        points: TrustPoints,
        community_vouch_count: u64,
    ) -> CampaignId {
        let id = CampaignId::new(self.next_id);
        self.next_id += 1;

        if self.campaigns.iter().any(|c| c.name == campaign.name) {
            tracing::warn!(
                %id,
                name = %campaign.name,
                "Campaign name already in use; campaigns are told apart by id only"
            );
        }

        tracing::info!(
            %id,
            name = %campaign.name,
            owner = %campaign.owner,
            goal = campaign.goal.get(),
            "Campaign posted"
        );
        self.campaigns.push(Campaign {
            id,
            name: campaign.name,
            owner: campaign.owner,
            description: campaign.description,
            image_reference: campaign.image_reference,
            points,
            goal: campaign.goal,
            funded_by_investor: false,
            investor_funding: Money::ZERO,
            community_vouch_count,
            created_at: Utc::now(),
        });
        id
    }

    #[must_use]
    pub fn get(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| c.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: CampaignId) -> Option<&mut Campaign> {
        self.campaigns.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Campaign> {
        self.campaigns.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    /// Fraction of the goal reached by `id`, capped at 1.0.
    #[must_use]
    pub fn progress(&self, id: CampaignId) -> Option<f64> {
        self.get(id).map(Campaign::progress)
    }

    /// Spend the vouch cost from `voucher` and add the same number of points
    /// to the campaign.
    ///
    /// A campaign that has reached its goal takes no more vouches. Nothing
    /// changes unless the whole vouch goes through.
    pub fn vouch(
        &mut self,
        id: CampaignId,
        voucher: &mut Ledger,
    ) -> Result<VouchReceipt, BookkeepingError> {
        let vouch_points = self.rules.vouch_points;
        let campaign = self
            .get_mut(id)
            .ok_or(BookkeepingError::CampaignNotFound(id))?;

        if campaign.is_goal_reached() {
            return Err(BookkeepingError::CampaignFullyFunded {
                campaign: id,
                points: campaign.points.value(),
                goal: campaign.goal.get(),
            });
        }

        let voucher_balance = voucher.debit(vouch_points)?;
        campaign.points = campaign.points.saturating_add(vouch_points);
        campaign.community_vouch_count += 1;

        tracing::info!(
            %id,
            points = campaign.points.value(),
            goal = campaign.goal.get(),
            balance = voucher_balance.value(),
            "Vouch recorded"
        );

        Ok(VouchReceipt {
            campaign: id,
            campaign_points: campaign.points,
            voucher_balance,
        })
    }

    #[must_use]
    pub fn is_eligible(&self, campaign: &Campaign) -> bool {
        campaign.points.value() >= self.rules.investment_threshold
    }

    /// Campaigns whose point total has reached the investment threshold, in
    /// posting order. Evaluated against current state on every call.
    pub fn list_eligible_for_investment(&self) -> impl Iterator<Item = &Campaign> + '_ {
        self.campaigns.iter().filter(|c| self.is_eligible(c))
    }

    /// Names shared by more than one campaign, with the ids that share them.
    #[must_use]
    pub fn duplicate_names(&self) -> BTreeMap<String, Vec<CampaignId>> {
        let mut by_name: BTreeMap<String, Vec<CampaignId>> = BTreeMap::new();
        for campaign in &self.campaigns {
            by_name
                .entry(campaign.name.to_string())
                .or_default()
                .push(campaign.id);
        }
        by_name.retain(|_, ids| ids.len() > 1);
        by_name
    }
}
