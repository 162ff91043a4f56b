//! Bookkeeping across the ledger, the campaign registry and the investor pool

use std::num::NonZeroU64;

use groflow_core::{BookkeepingError, NewCampaign, Session, SessionSeed};
use groflow_types::{CampaignId, Money, NonEmptyString, TrustPoints};

fn campaign_id(session: &Session, name: &str) -> CampaignId {
    session
        .campaigns()
        .iter()
        .find(|c| c.name.as_str() == name)
        .map(|c| c.id)
        .unwrap()
}

fn new_campaign(name: &str, goal: u64) -> NewCampaign {
    NewCampaign {
        name: NonEmptyString::new(name).unwrap(),
        owner: NonEmptyString::new("Lena").unwrap(),
        description: String::new(),
        goal: NonZeroU64::new(goal).unwrap(),
        image_reference: None,
    }
}

#[test]
fn community_vouches_unlock_investment() {
    let mut session = Session::new(SessionSeed {
        trust_points: TrustPoints::new(200),
        ..SessionSeed::default()
    });
    let rosa = campaign_id(&session, "Mama Rosa's Kitchen");

    let err = session.invest(rosa, Money::from_units(1000)).unwrap_err();
    assert!(matches!(err, BookkeepingError::NotEligible { points: 850, .. }));

    for _ in 0..15 {
        session.vouch(rosa).unwrap();
    }
    let rosa_campaign = session.campaigns().get(rosa).unwrap();
    assert_eq!(rosa_campaign.points, TrustPoints::new(1000));
    assert!(rosa_campaign.is_goal_reached());
    assert_eq!(session.ledger().balance(), TrustPoints::new(50));

    let err = session.vouch(rosa).unwrap_err();
    assert!(matches!(err, BookkeepingError::CampaignFullyFunded { .. }));
    assert_eq!(session.ledger().balance(), TrustPoints::new(50));

    let eligible: Vec<_> = session
        .campaigns()
        .list_eligible_for_investment()
        .map(|c| c.name.to_string())
        .collect();
    assert_eq!(
        eligible,
        ["Mama Rosa's Kitchen", "Thread & Needle", "Green Leaf Grocers"]
    );

    session.invest(rosa, Money::from_units(1000)).unwrap();
    assert_eq!(session.pool().liquidity(), Money::from_units(4000));
    assert!(session.campaigns().get(rosa).unwrap().funded_by_investor);
}

#[test]
fn portfolio_totals_and_monthly_return() {
    let mut session = Session::default();
    let thread = campaign_id(&session, "Thread & Needle");
    let green = campaign_id(&session, "Green Leaf Grocers");

    session.invest(thread, Money::from_units(2000)).unwrap();
    session.invest(green, Money::from_units(1500)).unwrap();

    let pool = session.pool();
    assert_eq!(pool.investments().len(), 2);
    assert_eq!(pool.investments()[0].business_name, "Thread & Needle");
    assert_eq!(pool.total_invested(), Money::from_units(3500));
    assert_eq!(pool.expected_monthly_return(), Money::from_units(175));
    assert_eq!(pool.liquidity(), Money::from_units(1500));
}

#[test]
fn failed_investment_changes_nothing() {
    let mut session = Session::default();
    let thread = campaign_id(&session, "Thread & Needle");
    let green = campaign_id(&session, "Green Leaf Grocers");
    session.invest(thread, Money::from_units(4000)).unwrap();

    let err = session.invest(green, Money::from_units(2000)).unwrap_err();
    assert!(matches!(err, BookkeepingError::InsufficientLiquidity { .. }));
    assert_eq!(session.pool().liquidity(), Money::from_units(1000));
    assert_eq!(session.pool().investments().len(), 1);
    assert!(!session.campaigns().get(green).unwrap().funded_by_investor);

    let err = session.invest(thread, Money::from_units(500)).unwrap_err();
    assert_eq!(err, BookkeepingError::AlreadyFunded(thread));

    session.add_liquidity(Money::from_units(1000));
    session.invest(green, Money::from_units(2000)).unwrap();
    assert_eq!(session.pool().liquidity(), Money::ZERO);
}

#[test]
fn new_campaigns_start_empty_and_may_share_names() {
    let mut session = Session::new(SessionSeed {
        demo_campaigns: false,
        ..SessionSeed::default()
    });
    let first = session.post_campaign(new_campaign("Corner Cafe", 300));
    let second = session.post_campaign(new_campaign("Corner Cafe", 500));

    assert_ne!(first, second);
    assert_eq!(session.campaigns().get(first).unwrap().points, TrustPoints::ZERO);
    let duplicates = session.campaigns().duplicate_names();
    assert_eq!(duplicates.get("Corner Cafe"), Some(&vec![first, second]));
}

#[test]
fn running_out_of_trust_points_is_reported() {
    let mut session = Session::new(SessionSeed {
        trust_points: TrustPoints::new(15),
        ..SessionSeed::default()
    });
    let pixel = campaign_id(&session, "Pixel Print Studio");

    session.vouch(pixel).unwrap();
    let err = session.vouch(pixel).unwrap_err();
    assert_eq!(
        err,
        BookkeepingError::InsufficientFunds {
            balance: TrustPoints::new(5),
            requested: TrustPoints::new(10),
        }
    );
    assert_eq!(
        session.campaigns().get(pixel).unwrap().points,
        TrustPoints::new(320)
    );
}
