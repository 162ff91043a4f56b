//! Core domain logic for GroFlow.
//!
//! The session ledger, the campaign and investment registries, the adaptive
//! tracker and the prompt templates. Nothing here performs IO; the engine
//! owns a [`Session`] and calls into it for every user action.

mod campaign;
mod error;
mod investment;
mod ledger;
pub mod prompt;
mod session;
pub mod structured;
pub mod tracker;

pub use campaign::{
    Campaign, CampaignRegistry, CampaignRules, DEFAULT_INVESTMENT_THRESHOLD, DEFAULT_VOUCH_POINTS,
    NewCampaign, VouchReceipt,
};
pub use error::BookkeepingError;
pub use investment::{
    DEFAULT_MAX_INVESTMENT_UNITS, DEFAULT_MIN_INVESTMENT_UNITS, DEFAULT_MONTHLY_RETURN_BPS,
    Investment, InvestmentRules, InvestmentStatus, InvestorPool,
};
pub use ledger::Ledger;
pub use prompt::{PromptContext, PromptError, PromptKind, build_prompt};
pub use session::{
    DEFAULT_INVESTOR_LIQUIDITY_UNITS, DEFAULT_STARTING_TRUST_POINTS, Session, SessionSeed,
};
pub use structured::{MalformedAiResponse, MonthlyRoadmap, RoadmapWeek, parse_structured};
pub use tracker::{TrackedTask, Tracker, TrackerError};

pub use groflow_types;
