//! Session-scoped state.
//!
//! A [`Session`] is created when the dashboard starts and dropped when it
//! exits. It owns the trust-point ledger, both registries and the tracker,
//! and is handed by reference to whatever handles a user action.

use std::num::NonZeroU64;

use groflow_types::{CampaignId, InvestmentId, Money, NonEmptyString, TrustPoints};

use crate::{
    BookkeepingError, CampaignRegistry, CampaignRules, InvestmentRules, InvestorPool, Ledger,
    NewCampaign, Tracker, VouchReceipt,
};

pub const DEFAULT_STARTING_TRUST_POINTS: u64 = 120;
pub const DEFAULT_INVESTOR_LIQUIDITY_UNITS: u64 = 5000;

/// Everything needed to start a session.
#[derive(Debug, Clone)]
pub struct SessionSeed {
    pub trust_points: TrustPoints,
    pub liquidity: Money,
    pub campaign_rules: CampaignRules,
    pub investment_rules: InvestmentRules,
    pub recalibration_threshold_percent: u8,
    pub demo_campaigns: bool,
}

impl Default for SessionSeed {
    fn default() -> Self {
        Self {
            trust_points: TrustPoints::new(DEFAULT_STARTING_TRUST_POINTS),
            liquidity: Money::from_units(DEFAULT_INVESTOR_LIQUIDITY_UNITS),
            campaign_rules: CampaignRules::default(),
            investment_rules: InvestmentRules::default(),
            recalibration_threshold_percent:
                crate::tracker::DEFAULT_RECALIBRATION_THRESHOLD_PERCENT,
            demo_campaigns: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    ledger: Ledger,
    campaigns: CampaignRegistry,
    pool: InvestorPool,
    tracker: Tracker,
    recalibration_threshold_percent: u8,
}

impl Session {
    #[must_use]
    pub fn new(seed: SessionSeed) -> Self {
        let mut campaigns = CampaignRegistry::new(seed.campaign_rules);
        if seed.demo_campaigns {
            seed_demo_campaigns(&mut campaigns);
        }
        tracing::info!(
            trust_points = seed.trust_points.value(),
            liquidity = %seed.liquidity,
            campaigns = campaigns.len(),
            "Session started"
        );
        Self {
            ledger: Ledger::new(seed.trust_points),
            campaigns,
            pool: InvestorPool::new(seed.liquidity, seed.investment_rules),
            tracker: Tracker::new(),
            recalibration_threshold_percent: seed.recalibration_threshold_percent,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn campaigns(&self) -> &CampaignRegistry {
        &self.campaigns
    }

    #[must_use]
    pub fn pool(&self) -> &InvestorPool {
        &self.pool
    }

    #[must_use]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    #[must_use]
    pub fn recalibration_threshold_percent(&self) -> u8 {
        self.recalibration_threshold_percent
    }

    #[must_use]
    pub fn needs_recalibration(&self) -> bool {
        self.tracker
            .needs_recalibration(self.recalibration_threshold_percent)
    }

    pub fn post_campaign(&mut self, campaign: NewCampaign) -> CampaignId {
        self.campaigns.create(campaign)
    }

    pub fn vouch(&mut self, campaign: CampaignId) -> Result<VouchReceipt, BookkeepingError> {
        self.campaigns.vouch(campaign, &mut self.ledger)
    }

    pub fn invest(
        &mut self,
        campaign: CampaignId,
        amount: Money,
    ) -> Result<InvestmentId, BookkeepingError> {
        self.pool.invest(&mut self.campaigns, campaign, amount)
    }

    pub fn add_liquidity(&mut self, amount: Money) {
        self.pool.add_liquidity(amount);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSeed::default())
    }
}

struct DemoCampaign {
    name: &'static str,
    owner: &'static str,
    description: &'static str,
    goal: u64,
    points: u64,
}

/// Made-up sample businesses so the marketplace is not empty on first launch.
/// Mama Rosa's sits just under the investment threshold.
const DEMO_CAMPAIGNS: &[DemoCampaign] = &[
    DemoCampaign {
        name: "Mama Rosa's Kitchen",
        owner: "Rosa",
        description: "Home-cooked meal boxes for office workers; raising for a second stove.",
        goal: 1000,
        points: 850,
    },
    DemoCampaign {
        name: "Thread & Needle",
        owner: "Kofi",
        description: "Alterations and made-to-measure shirts; needs an industrial machine.",
        goal: 1500,
        points: 1200,
    },
    DemoCampaign {
        name: "Green Leaf Grocers",
        owner: "Mei",
        description: "Neighbourhood produce stand moving to a refrigerated kiosk.",
        goal: 2000,
        points: 1040,
    },
    DemoCampaign {
        name: "Pixel Print Studio",
        owner: "Sam",
        description: "Custom stickers and posters; first bulk vinyl order.",
        goal: 1200,
        points: 310,
    },
];

fn seed_demo_campaigns(registry: &mut CampaignRegistry) {
    let vouch_points = registry.rules().vouch_points.value().max(1);
    for demo in DEMO_CAMPAIGNS {
        let (Ok(name), Ok(owner), Some(goal)) = (
            NonEmptyString::new(demo.name),
            NonEmptyString::new(demo.owner),
            NonZeroU64::new(demo.goal),
        ) else {
            tracing::warn!(name = demo.name, "Skipping invalid demo campaign");
            continue;
        };
        registry.import(
            NewCampaign {
                name,
                owner,
                description: demo.description.to_string(),
                goal,
                image_reference: None,
            },
            TrustPoints::new(demo.points),
            demo.points / vouch_points,
        );
    }
}
